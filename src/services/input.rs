//! Split input parsing
//!
//! Turns a JSON array or a CSV table into [`RawSplit`] records. Anything that
//! cannot become a record at all (not an array, a bad amount, a broken CSV
//! row) is an input error raised before validation. Missing fields are not
//! errors here; the validator reports them.

use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use tracing::debug;

use crate::error::{TallyError, TallyResult};
use crate::models::{CategoryId, Money, RawSplit};

/// Input format for a split list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitFormat {
    Json,
    Csv,
}

impl SplitFormat {
    /// Choose a format from a file extension (`.csv` is CSV, anything else JSON)
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => Self::Csv,
            _ => Self::Json,
        }
    }

    /// Guess the format of piped text from its first non-blank character
    pub fn sniff(text: &str) -> Self {
        match text.trim_start().chars().next() {
            Some('[') | Some('{') => Self::Json,
            _ => Self::Csv,
        }
    }
}

/// Column positions of the split fields in a CSV header
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitColumns {
    pub merchant: Option<usize>,
    pub amount: Option<usize>,
    pub category: Option<usize>,
    pub notes: Option<usize>,
}

impl SplitColumns {
    /// Map header names to columns (case-insensitive)
    pub fn from_headers(headers: &StringRecord) -> TallyResult<Self> {
        let mut columns = Self::default();

        for (index, header) in headers.iter().enumerate() {
            let key = header.trim().to_lowercase().replace(|c: char| c == '_' || c == ' ', "");
            let slot = match key.as_str() {
                "merchant" => &mut columns.merchant,
                "amount" => &mut columns.amount,
                "category" | "categoryid" => &mut columns.category,
                "notes" | "note" => &mut columns.notes,
                _ => continue,
            };
            slot.get_or_insert(index);
        }

        if columns == Self::default() {
            return Err(TallyError::Input(
                "CSV header has none of: merchant, amount, category, notes".into(),
            ));
        }

        Ok(columns)
    }

    fn cell<'r>(&self, record: &'r StringRecord, column: Option<usize>) -> Option<&'r str> {
        column
            .and_then(|i| record.get(i))
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    fn parse_record(&self, record: &StringRecord, row: usize) -> TallyResult<RawSplit> {
        let amount = match self.cell(record, self.amount) {
            Some(text) => Some(Money::parse(text).map_err(|e| {
                TallyError::Input(format!("row {}: {}", row, e))
            })?),
            None => None,
        };

        Ok(RawSplit {
            merchant: self.cell(record, self.merchant).map(str::to_string),
            amount,
            category_id: self.cell(record, self.category).map(CategoryId::from),
            notes: self.cell(record, self.notes).map(str::to_string),
        })
    }
}

/// Parse a JSON array of split objects
pub fn parse_json(text: &str) -> TallyResult<Vec<RawSplit>> {
    let value: serde_json::Value = serde_json::from_str(text)
        .map_err(|e| TallyError::Input(format!("splits are not valid JSON: {}", e)))?;

    let items = match value {
        serde_json::Value::Array(items) => items,
        _ => {
            return Err(TallyError::Input(
                "splits must be a JSON array of objects".into(),
            ))
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            if !item.is_object() {
                return Err(TallyError::Input(format!(
                    "split {}: expected an object",
                    index + 1
                )));
            }
            serde_json::from_value(item)
                .map_err(|e| TallyError::Input(format!("split {}: {}", index + 1, e)))
        })
        .collect()
}

/// Parse a CSV table with a header row
pub fn parse_csv<R: Read>(reader: R) -> TallyResult<Vec<RawSplit>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let columns = SplitColumns::from_headers(reader.headers()?)?;
    debug!(?columns, "mapped CSV split columns");

    let mut splits = Vec::new();
    for (index, result) in reader.records().enumerate() {
        let record = result?;
        // Header is row 1
        splits.push(columns.parse_record(&record, index + 2)?);
    }

    Ok(splits)
}

/// Parse text in the given format
pub fn parse_splits(text: &str, format: SplitFormat) -> TallyResult<Vec<RawSplit>> {
    match format {
        SplitFormat::Json => parse_json(text),
        SplitFormat::Csv => parse_csv(text.as_bytes()),
    }
}

/// Read splits from a file, or from stdin when `path` is `-`
pub fn read_splits(path: &Path) -> TallyResult<Vec<RawSplit>> {
    let (text, format) = if path.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .map_err(|e| TallyError::Io(format!("Failed to read stdin: {}", e)))?;
        let format = SplitFormat::sniff(&text);
        (text, format)
    } else {
        let text = std::fs::read_to_string(path).map_err(|e| {
            TallyError::Io(format!("Failed to read {}: {}", path.display(), e))
        })?;
        (text, SplitFormat::from_path(path))
    };

    debug!(path = %path.display(), ?format, "reading splits");
    parse_splits(&text, format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_json() {
        let splits = parse_json(
            r#"[
                {"merchant": "Costco", "amount": -20.78, "categoryId": "catX", "notes": "milk, eggs"},
                {"merchant": "Costco", "amount": "-20.13", "category_id": "catY"}
            ]"#,
        )
        .unwrap();

        assert_eq!(splits.len(), 2);
        assert_eq!(splits[0].amount, Some(Money::from_cents(-2078)));
        assert_eq!(splits[1].amount, Some(Money::from_cents(-2013)));
        assert_eq!(splits[1].notes, None);
    }

    #[test]
    fn test_parse_json_missing_fields_are_not_errors() {
        let splits = parse_json(r#"[{}, {"merchant": "A"}]"#).unwrap();
        assert_eq!(splits[0], RawSplit::default());
        assert_eq!(splits[1].merchant.as_deref(), Some("A"));
    }

    #[test]
    fn test_parse_json_rejects_non_array() {
        let err = parse_json(r#"{"merchant": "A"}"#).unwrap_err();
        assert!(err.is_input());

        let err = parse_json("[1, 2]").unwrap_err();
        assert_eq!(err.to_string(), "Input error: split 1: expected an object");

        let err = parse_json(r#"[{"amount": "ten"}]"#).unwrap_err();
        assert!(err.to_string().starts_with("Input error: split 1:"));
    }

    #[test]
    fn test_parse_csv() {
        let csv = "Merchant,Amount,Category ID,Notes\n\
                   Costco,-20.78,catX,milk\n\
                   Costco,-20.13,catY,\n\
                   ,,,\n";
        let splits = parse_csv(csv.as_bytes()).unwrap();

        assert_eq!(splits.len(), 3);
        assert_eq!(splits[0].category_id, Some(CategoryId::from("catX")));
        assert_eq!(splits[1].notes, None);
        assert_eq!(splits[2], RawSplit::default());
    }

    #[test]
    fn test_parse_csv_bad_amount() {
        let csv = "merchant,amount,category\nCostco,abc,catX\n";
        let err = parse_csv(csv.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("row 2"));
    }

    #[test]
    fn test_parse_csv_requires_known_header() {
        let csv = "a,b\n1,2\n";
        assert!(parse_csv(csv.as_bytes()).unwrap_err().is_input());
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(SplitFormat::from_path(Path::new("s.CSV")), SplitFormat::Csv);
        assert_eq!(SplitFormat::from_path(Path::new("s.json")), SplitFormat::Json);
        assert_eq!(SplitFormat::from_path(Path::new("splits")), SplitFormat::Json);
        assert_eq!(SplitFormat::sniff("  [ {} ]"), SplitFormat::Json);
        assert_eq!(SplitFormat::sniff("merchant,amount"), SplitFormat::Csv);
    }

    #[test]
    fn test_read_splits_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("splits.csv");
        std::fs::write(&path, "merchant,amount,category\nTarget,-5,c1\n").unwrap();

        let splits = read_splits(&path).unwrap();
        assert_eq!(splits[0].amount, Some(Money::from_cents(-500)));

        let missing = read_splits(&temp_dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(missing, TallyError::Io(_)));
    }
}
