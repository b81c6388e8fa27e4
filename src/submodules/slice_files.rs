//! Locating the most recent `<problem>*plt?????.slice` file in a run directory.

use std::{
    cmp::Ordering,
    ffi::OsString,
    path::{Path, PathBuf},
};

use super::errors::{ComparatorError, ComparatorResult};

const PLT_MARKER: &str = "plt";
const STEP_WIDTH: usize = 5;
const SLICE_SUFFIX: &str = ".slice";

pub fn slice_pattern(problem: &str) -> String {
    format!("{}*{}{}{}", problem, PLT_MARKER, "?".repeat(STEP_WIDTH), SLICE_SUFFIX)
}

/// The five characters between `plt` and `.slice`, if `name` matches the pattern.
fn step_field<'a>(name: &'a str, problem: &str) -> Option<&'a str> {
    let rest = name.strip_prefix(problem)?.strip_suffix(SLICE_SUFFIX)?;
    let split = rest.char_indices().rev().nth(STEP_WIDTH - 1)?.0;
    let (head, step) = rest.split_at(split);
    head.ends_with(PLT_MARKER).then_some(step)
}

pub fn matches_slice_pattern(name: &str, problem: &str) -> bool {
    step_field(name, problem).is_some()
}

pub fn step_number(name: &str, problem: &str) -> Option<u64> {
    let step = step_field(name, problem)?;
    if step.chars().all(|c| c.is_ascii_digit()) {
        step.parse().ok()
    } else {
        None
    }
}

/// Orders candidates by parsed step, then by name. Non-numeric steps sort first.
fn compare_candidates(a: &str, b: &str, problem: &str) -> Ordering {
    step_number(a, problem)
        .cmp(&step_number(b, problem))
        .then_with(|| a.cmp(b))
}

pub fn select_latest<'a, I: IntoIterator<Item = &'a str>>(names: I, problem: &str) -> Option<&'a str> {
    names
        .into_iter()
        .filter(|name| matches_slice_pattern(name, problem))
        .max_by(|a, b| compare_candidates(a, b, problem))
}

pub fn latest_slice(run_dir: &Path, problem: &str) -> ComparatorResult<PathBuf> {
    let entries = std::fs::read_dir(run_dir).map_err(|e| ComparatorError::io(run_dir, e))?;
    // (name used for matching, name on disk)
    let mut names: Vec<(String, OsString)> = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| ComparatorError::io(run_dir, e))?;
        let file_name = entry.file_name();
        let name = file_name.to_string_lossy().into_owned();
        if file_name.to_str().is_none() {
            log::debug!("{}: matching non UTF-8 entry as '{}'", run_dir.display(), name);
        }
        names.push((name, file_name));
    }

    let latest = select_latest(names.iter().map(|(name, _)| name.as_str()), problem).ok_or_else(|| {
        ComparatorError::NoSliceFiles {
            run_dir: run_dir.to_path_buf(),
            pattern: slice_pattern(problem),
        }
    })?;
    log::debug!("{}: selected {} out of {} entries", run_dir.display(), latest, names.len());
    let on_disk = names
        .iter()
        .find(|(name, _)| name == latest)
        .map_or_else(|| OsString::from(latest), |(_, file_name)| file_name.clone());
    Ok(run_dir.join(on_disk))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::tempdir;

    #[test]
    fn test_pattern_string() {
        assert_eq!(slice_pattern("test1"), "test1*plt?????.slice");
    }

    #[test]
    fn test_matches_pattern() {
        assert!(matches_slice_pattern("test1_00010_plt00010.slice", "test1"));
        assert!(matches_slice_pattern("test1plt00000.slice", "test1"));
        assert!(matches_slice_pattern("test1_pltabcde.slice", "test1"));
        assert!(!matches_slice_pattern("test2_plt00010.slice", "test1"));
        assert!(!matches_slice_pattern("test1_plt0010.slice", "test1"));
        assert!(!matches_slice_pattern("test1_plt000100.slice", "test1"));
        assert!(!matches_slice_pattern("test1_plt00010.slice.bak", "test1"));
        assert!(!matches_slice_pattern("test1_chk00010.slice", "test1"));
    }

    #[test]
    fn test_step_number() {
        assert_eq!(step_number("test1_00020_plt00020.slice", "test1"), Some(20));
        assert_eq!(step_number("test1_pltabcde.slice", "test1"), None);
        assert_eq!(step_number("other", "test1"), None);
    }

    #[test]
    fn test_select_lexicographically_last() {
        let names = ["test1_00010_plt00010.slice", "test1_00020_plt00020.slice"];
        assert_eq!(select_latest(names, "test1"), Some("test1_00020_plt00020.slice"));
    }

    #[test]
    fn test_select_by_step_not_prefix() {
        // Lexical order would pick the "z" prefix.
        let names = ["test1z_plt00010.slice", "test1a_plt00200.slice", "notes.txt"];
        assert_eq!(select_latest(names, "test1"), Some("test1a_plt00200.slice"));
    }

    #[test]
    fn test_select_prefers_numeric_steps() {
        let names = ["test1_pltxxxxx.slice", "test1_plt00001.slice"];
        assert_eq!(select_latest(names, "test1"), Some("test1_plt00001.slice"));
    }

    #[test]
    fn test_select_none() {
        let names = ["test2_plt00010.slice", "README"];
        assert_eq!(select_latest(names, "test1"), None);
    }

    #[test]
    fn test_latest_slice_in_directory() {
        let dir = tempdir().unwrap();
        for name in ["test1_00010_plt00010.slice", "test1_00020_plt00020.slice", "test1.exact.out"] {
            File::create(dir.path().join(name)).unwrap();
        }
        let latest = latest_slice(dir.path(), "test1").unwrap();
        assert_eq!(latest, dir.path().join("test1_00020_plt00020.slice"));
    }

    #[test]
    fn test_latest_slice_empty_directory() {
        let dir = tempdir().unwrap();
        match latest_slice(dir.path(), "test1") {
            Err(ComparatorError::NoSliceFiles { run_dir, pattern }) => {
                assert_eq!(run_dir, dir.path());
                assert_eq!(pattern, "test1*plt?????.slice");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_latest_slice_keeps_non_utf8_names() {
        use std::{ffi::OsStr, os::unix::ffi::OsStrExt};

        let dir = tempdir().unwrap();
        let odd = OsStr::from_bytes(b"test1_\xff_plt00030.slice");
        File::create(dir.path().join(odd)).unwrap();
        File::create(dir.path().join("test1_plt00020.slice")).unwrap();
        let latest = latest_slice(dir.path(), "test1").unwrap();
        assert_eq!(latest, dir.path().join(odd));
    }

    #[test]
    fn test_latest_slice_missing_directory() {
        let dir = tempdir().unwrap();
        let result = latest_slice(&dir.path().join("MC"), "test1");
        assert!(matches!(result, Err(ComparatorError::Io { .. })));
    }
}
