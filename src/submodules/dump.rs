use std::{io::Write, path::Path};

use serde::Serialize;

use super::errors::{ComparatorError, ComparatorResult};

pub fn dump_json<T: Serialize + ?Sized>(item: &T, path: &Path) -> ComparatorResult<()> {
    let json = serde_json::to_string(item).map_err(|e| ComparatorError::Config(e.to_string()))?;
    let mut file = std::fs::File::create(path).map_err(|e| ComparatorError::io(path, e))?;
    file.write_all(json.as_bytes()).map_err(|e| ComparatorError::io(path, e))?;
    log::debug!("wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use tempfile::tempdir;

    #[test]
    fn test_dump_array() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("t.json");
        dump_json(&array![1.0, 2.5], &path).unwrap();
        let back: ndarray::Array1<f64> = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(back, array![1.0, 2.5]);
    }

    #[test]
    fn test_dump_into_missing_dir() {
        let dir = tempdir().unwrap();
        let result = dump_json(&[1, 2], &dir.path().join("nope").join("t.json"));
        assert!(matches!(result, Err(ComparatorError::Io { .. })));
    }
}
