//! Bulk CSV decoding
//!
//! The bulk path accepts a comma-separated document whose header row is
//! exactly the model schema, in schema order, and whose body cells are
//! all finite numbers. Rows bypass the Feature Encoder and are fed to
//! inference as-is, so the decoder is strict: anything that does not
//! match the schema is rejected with the line and column named before it
//! can reach the model.
//!
//! The format is a closed, all-numeric table; there is no quoting or
//! escaping to handle.

use crate::error::{Error, Result};
use crate::schema::{FeatureRecord, FEATURE_COUNT, FEATURE_NAMES};

/// Decode a CSV document into feature records
pub fn decode_csv(document: &str) -> Result<Vec<FeatureRecord>> {
    let mut lines = document
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty());

    let (header_line, header) = lines.next().ok_or(Error::Csv {
        line: 1,
        message: "empty document".to_string(),
    })?;
    check_header(header_line, header)?;

    let mut records = Vec::new();
    for (line_number, line) in lines {
        records.push(decode_row(line_number, line)?);
    }
    if records.is_empty() {
        return Err(Error::Csv {
            line: header_line,
            message: "document has a header but no data rows".to_string(),
        });
    }
    Ok(records)
}

/// Header must carry the schema field names, all of them, in order
fn check_header(line_number: usize, header: &str) -> Result<()> {
    let columns: Vec<&str> = header.split(',').map(str::trim).collect();

    if columns.len() != FEATURE_COUNT {
        let missing: Vec<&str> = FEATURE_NAMES
            .iter()
            .copied()
            .filter(|name| !columns.contains(name))
            .collect();
        let extra: Vec<&str> = columns
            .iter()
            .copied()
            .filter(|name| !FEATURE_NAMES.contains(name))
            .collect();
        return Err(Error::Csv {
            line: line_number,
            message: format!(
                "expected {} columns, found {} (missing: [{}], unexpected: [{}])",
                FEATURE_COUNT,
                columns.len(),
                missing.join(", "),
                extra.join(", ")
            ),
        });
    }

    for (position, (found, expected)) in columns.iter().zip(FEATURE_NAMES.iter()).enumerate() {
        if found != expected {
            return Err(Error::Csv {
                line: line_number,
                message: format!(
                    "column {} must be {:?}, found {:?} (columns must match the model schema order)",
                    position + 1,
                    expected,
                    found
                ),
            });
        }
    }
    Ok(())
}

fn decode_row(line_number: usize, line: &str) -> Result<FeatureRecord> {
    let cells: Vec<&str> = line.split(',').map(str::trim).collect();
    if cells.len() != FEATURE_COUNT {
        return Err(Error::Csv {
            line: line_number,
            message: format!(
                "expected {} values, found {}",
                FEATURE_COUNT,
                cells.len()
            ),
        });
    }

    let mut values = [0.0f64; FEATURE_COUNT];
    for (index, cell) in cells.iter().enumerate() {
        let value: f64 = cell.parse().map_err(|_| Error::Csv {
            line: line_number,
            message: format!(
                "column {} ({}): not a number: {:?}",
                index + 1,
                FEATURE_NAMES[index],
                cell
            ),
        })?;
        if !value.is_finite() {
            return Err(Error::Csv {
                line: line_number,
                message: format!(
                    "column {} ({}): non-finite value {:?}",
                    index + 1,
                    FEATURE_NAMES[index],
                    cell
                ),
            });
        }
        values[index] = value;
    }
    Ok(FeatureRecord::from_values(values))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header() -> String {
        FEATURE_NAMES.join(",")
    }

    fn row(seed: f64) -> String {
        (0..FEATURE_COUNT)
            .map(|i| (seed + i as f64).to_string())
            .collect::<Vec<_>>()
            .join(",")
    }

    #[test]
    fn test_decode_valid_document() {
        let document = format!("{}\n{}\n{}\n", header(), row(1.0), row(2.5));
        let records = decode_csv(&document).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].age, 1.0);
        assert_eq!(records[1].gender_race_combo, 2.5 + 24.0);
    }

    #[test]
    fn test_blank_lines_skipped() {
        let document = format!("{}\n\n{}\n   \n", header(), row(0.0));
        let records = decode_csv(&document).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_empty_document_rejected() {
        let err = decode_csv("").unwrap_err();
        assert!(matches!(err, Error::Csv { line: 1, .. }), "{err:?}");
    }

    #[test]
    fn test_header_only_rejected() {
        let err = decode_csv(&header()).unwrap_err();
        match err {
            Error::Csv { message, .. } => assert!(message.contains("no data rows")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_missing_column_named() {
        let short = FEATURE_NAMES[..FEATURE_COUNT - 1].join(",");
        let document = format!("{}\n{}\n", short, row(1.0));
        let err = decode_csv(&document).unwrap_err();
        match err {
            Error::Csv { line, message } => {
                assert_eq!(line, 1);
                assert!(message.contains("gender_race_combo"), "{message}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_reordered_columns_rejected() {
        let mut names = FEATURE_NAMES;
        names.swap(0, 1);
        let document = format!("{}\n{}\n", names.join(","), row(1.0));
        let err = decode_csv(&document).unwrap_err();
        match err {
            Error::Csv { message, .. } => {
                assert!(message.contains("schema order"), "{message}")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_non_numeric_cell_located() {
        let mut cells: Vec<String> = (0..FEATURE_COUNT).map(|i| i.to_string()).collect();
        cells[16] = "Norm".to_string();
        let document = format!("{}\n{}\n", header(), cells.join(","));
        let err = decode_csv(&document).unwrap_err();
        match err {
            Error::Csv { line, message } => {
                assert_eq!(line, 2);
                assert!(message.contains("A1Cresult"), "{message}");
                assert!(message.contains("Norm"), "{message}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_non_finite_cell_rejected() {
        let mut cells: Vec<String> = (0..FEATURE_COUNT).map(|i| i.to_string()).collect();
        cells[3] = "inf".to_string();
        let document = format!("{}\n{}\n", header(), cells.join(","));
        let err = decode_csv(&document).unwrap_err();
        assert!(matches!(err, Error::Csv { line: 2, .. }), "{err:?}");
    }

    #[test]
    fn test_short_row_rejected() {
        let document = format!("{}\n1,2,3\n", header());
        let err = decode_csv(&document).unwrap_err();
        match err {
            Error::Csv { line, message } => {
                assert_eq!(line, 2);
                assert!(message.contains("expected 25 values"), "{message}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
