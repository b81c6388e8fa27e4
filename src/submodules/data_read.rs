//! Loader for whitespace-delimited numeric tables.
//!
//! ```text
//! # x  density  velocity  pressure  temperature
//! 0  5.0e3  1.0e-3  0.0  1.0e16  1.0e9
//! 1  1.5e4  1.0e-3  0.0  1.0e16  1.0e9
//! ```
//!
//! Lines starting with `#` and blank lines are skipped. Every data row must
//! have the same number of columns.

use std::path::Path;

use ndarray::Array2;

use super::{errors::{ComparatorError, ComparatorResult}, type_lib::{NumericData, Table}};

pub fn read_table(path: &Path) -> ComparatorResult<Table> {
    let content = std::fs::read_to_string(path).map_err(|e| ComparatorError::io(path, e))?;
    parse_table(&content, path)
}

pub fn parse_table(content: &str, origin: &Path) -> ComparatorResult<Table> {
    let mut values: Vec<NumericData> = Vec::new();
    let mut n_cols: Option<usize> = None;
    let mut n_rows = 0;

    for (line_num, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let row_start = values.len();
        for token in line.split_whitespace() {
            let value = parse_number(token).ok_or_else(|| ComparatorError::Parse {
                path: origin.to_path_buf(),
                line: line_num + 1,
                message: format!("invalid number '{}'", token),
            })?;
            values.push(value);
        }
        let width = values.len() - row_start;

        match n_cols {
            None => n_cols = Some(width),
            Some(expected) if expected != width => {
                return Err(ComparatorError::Parse {
                    path: origin.to_path_buf(),
                    line: line_num + 1,
                    message: format!("expected {} columns, found {}", expected, width),
                });
            }
            Some(_) => {}
        }
        n_rows += 1;
    }

    let n_cols = match n_cols {
        Some(n) if n_rows > 0 => n,
        _ => return Err(ComparatorError::EmptyTable { path: origin.to_path_buf() }),
    };

    Array2::from_shape_vec((n_rows, n_cols), values).map_err(|e| ComparatorError::Parse {
        path: origin.to_path_buf(),
        line: 0,
        message: e.to_string(),
    })
}

// Fortran output writes exponents as 1.0D+03.
fn parse_number(token: &str) -> Option<NumericData> {
    match token.parse::<NumericData>() {
        Ok(value) => Some(value),
        Err(_) if token.contains(['d', 'D']) => token.replace(['d', 'D'], "e").parse().ok(),
        Err(_) => None,
    }
}
