//! Post-collection transpose pass.
//!
//! Downstream trainers index the dataset per agent, not per frame, so once
//! collection stops the frame-major file is reshaped exactly once: field `i`
//! of every record becomes record `i` of the output (a matrix transpose).
//! For the 10-column frame-major layout that yields 10 wide records, each a
//! full per-column trajectory across every emitted row.
//!
//! The pass only runs on a fully flushed, closed file (the writer's
//! `finish()` hands over the path) and never modifies its input. Fields are
//! moved as verbatim strings, so numeric formatting survives the reshape.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::DatasetError;

/// Output path for the wide layout: `<stem>_transposed.csv` next to the
/// input file.
pub fn transposed_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    input.with_file_name(format!("{stem}_transposed.csv"))
}

/// Reshape a completed frame-major record file into the wide layout.
///
/// Returns the path of the transposed file.
///
/// # Errors
///
/// - [`DatasetError::InconsistentWidth`] when any record's field count
///   differs from the first record's. The input file is left untouched and
///   no output is written.
/// - [`DatasetError::Io`] when the input cannot be read or the output
///   cannot be written.
pub fn transpose_dataset(input: &Path) -> Result<PathBuf, DatasetError> {
    let contents = fs::read_to_string(input)?;
    let records: Vec<Vec<&str>> = contents
        .lines()
        .map(|line| line.split(',').collect())
        .collect();

    let output = transposed_path(input);

    if records.is_empty() {
        // Nothing was collected; hand over an equally empty wide file.
        warn!(path = %input.display(), "dataset is empty; transposing to empty file");
        fs::write(&output, "")?;
        return Ok(output);
    }

    let width = records[0].len();
    for (i, record) in records.iter().enumerate() {
        if record.len() != width {
            return Err(DatasetError::InconsistentWidth {
                line: i + 1,
                expected: width,
                found: record.len(),
            });
        }
    }

    let mut out = String::new();
    for column in 0..width {
        let mut first = true;
        for record in &records {
            if !first {
                out.push(',');
            }
            out.push_str(record[column]);
            first = false;
        }
        out.push('\n');
    }
    fs::write(&output, out)?;

    info!(
        input = %input.display(),
        output = %output.display(),
        records = records.len(),
        width,
        "dataset transposed"
    );
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_input(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut f = fs::File::create(&path).expect("create input");
        f.write_all(contents.as_bytes()).expect("write input");
        path
    }

    #[test]
    fn transposes_rows_into_columns() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let input = write_input(&dir, "run.csv", "0,1,-0.8\n0,2,-0.9\n1,1,-0.7\n");

        let output = transpose_dataset(&input).expect("transpose");
        let contents = fs::read_to_string(output).expect("read output");
        // 3 records x 3 fields in -> 3 records x 3 fields out, reshaped.
        assert_eq!(contents, "0,0,1\n1,2,1\n-0.8,-0.9,-0.7\n");
    }

    #[test]
    fn output_path_derives_from_input_stem() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let input = write_input(&dir, "pedsim_pos_1001.csv", "0,1\n");
        let output = transpose_dataset(&input).expect("transpose");
        assert_eq!(
            output.file_name().unwrap().to_string_lossy(),
            "pedsim_pos_1001_transposed.csv"
        );
    }

    #[test]
    fn input_is_left_untouched() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let original = "0,1,2\n3,4,5\n";
        let input = write_input(&dir, "run.csv", original);

        transpose_dataset(&input).expect("transpose");
        assert_eq!(fs::read_to_string(&input).expect("read input"), original);
    }

    #[test]
    fn inconsistent_width_is_surfaced() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let input = write_input(&dir, "run.csv", "0,1,2\n3,4\n");

        let err = transpose_dataset(&input).expect_err("must fail");
        match err {
            DatasetError::InconsistentWidth {
                line,
                expected,
                found,
            } => {
                assert_eq!(line, 2);
                assert_eq!(expected, 3);
                assert_eq!(found, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
        // No partial output on failure.
        assert!(!transposed_path(&input).exists());
    }

    #[test]
    fn empty_dataset_transposes_to_empty_file() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let input = write_input(&dir, "run.csv", "");

        let output = transpose_dataset(&input).expect("transpose");
        assert_eq!(fs::read_to_string(output).expect("read output"), "");
    }

    #[test]
    fn missing_input_is_an_io_error() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let result = transpose_dataset(&dir.path().join("absent.csv"));
        assert!(matches!(result, Err(DatasetError::Io(_))));
    }

    #[test]
    fn transpose_of_transpose_restores_the_matrix() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let original = "0,1,-0.8,0.5\n1,2,-0.7,0.4\n";
        let input = write_input(&dir, "run.csv", original);

        let wide = transpose_dataset(&input).expect("first transpose");
        let back = transpose_dataset(&wide).expect("second transpose");
        assert_eq!(fs::read_to_string(back).expect("read back"), original);
    }
}
