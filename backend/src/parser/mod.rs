//! Reading and writing series tables.
//!
//! - Raw workbooks (`.xlsx`, `.xls`, `.ods`) through `calamine`
//! - CSV with encoding and delimiter auto-detection
//! - Split/variation CSV files: `Libellé`, attribute columns, then one column
//!   per `YYYY-MM` period
//!
//! Numeric coercion never fails: a cell that is not a finite number becomes a
//! missing value.

use calamine::{open_workbook_auto, Data, Reader};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs::File;
use std::path::Path;

use crate::error::{CsvError, CsvResult, SpreadsheetError, SpreadsheetResult, TableError, TableResult};
use crate::models::{SeriesRow, SeriesTable};

/// Monthly period columns, 1990-01 to 2099-12.
static PERIOD_COLUMN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(199[0-9]|20[0-9][0-9])-(0[1-9]|1[0-2])$").expect("valid regex"));

/// Which source columns are the label and which are dropped on load.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnLayout {
    pub label_column: String,
    pub excluded_columns: Vec<String>,
}

impl Default for ColumnLayout {
    fn default() -> Self {
        Self {
            label_column: "Libellé".to_string(),
            excluded_columns: vec![
                "idBank".to_string(),
                "Dernière mise à jour".to_string(),
                "Période".to_string(),
            ],
        }
    }
}

/// A cell as it comes out of a workbook or CSV file.
#[derive(Debug, Clone, PartialEq)]
pub enum RawCell {
    Empty,
    Text(String),
    Number(f64),
}

impl RawCell {
    /// Numeric value, or `None` when the cell is not a finite number.
    pub fn to_number(&self) -> Option<f64> {
        match self {
            RawCell::Empty => None,
            RawCell::Number(v) => Some(*v).filter(|v| v.is_finite()),
            RawCell::Text(text) => coerce_number(text),
        }
    }

    pub fn to_text(&self) -> String {
        match self {
            RawCell::Empty => String::new(),
            RawCell::Text(text) => text.clone(),
            RawCell::Number(v) => format_number(*v),
        }
    }
}

impl From<&Data> for RawCell {
    fn from(cell: &Data) -> Self {
        match cell {
            Data::Empty => RawCell::Empty,
            Data::Int(v) => RawCell::Number(*v as f64),
            Data::Float(v) => RawCell::Number(*v),
            Data::String(s) => RawCell::Text(s.clone()),
            other => RawCell::Text(other.to_string()),
        }
    }
}

/// CSV parsing metadata alongside the table.
#[derive(Debug, Clone)]
pub struct ParseResult {
    pub table: SeriesTable,
    /// Detected encoding
    pub encoding: String,
    /// Detected delimiter
    pub delimiter: char,
}

/// `true` for `YYYY-MM` headers between 1990 and 2099.
pub fn is_period_column(header: &str) -> bool {
    PERIOD_COLUMN.is_match(header)
}

/// Parse text as a finite number; anything else is missing.
pub fn coerce_number(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Number as written in output files.
pub fn format_number(value: f64) -> String {
    value.to_string()
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    // chardet can mislabel short UTF-8 samples as Latin-1
    if std::str::from_utf8(bytes).is_ok() {
        return "utf-8".to_string();
    }

    let result = chardet::detect(bytes);
    let charset = result.0;

    // Normalize charset names
    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to string using the specified encoding
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    match encoding.to_lowercase().as_str() {
        "iso-8859-1" | "latin-1" | "latin1" => encoding_rs::ISO_8859_15.decode(bytes).0.into_owned(),
        "windows-1252" | "cp1252" => encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned(),
        // UTF-8 and anything unknown: lossy UTF-8
        _ => String::from_utf8_lossy(bytes).into_owned(),
    }
}

/// Detect the delimiter by counting occurrences in the first line
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [';', ',', '\t', '|'];
    let mut best_sep = ',';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Sort raw columns into label, attributes and periods, coercing period cells.
///
/// The label column must be present; excluded columns are dropped; other
/// non-period columns are kept as text attributes.
pub fn build_table(headers: &[String], rows: &[Vec<RawCell>], layout: &ColumnLayout) -> TableResult<SeriesTable> {
    let label_idx = headers
        .iter()
        .position(|h| h == &layout.label_column)
        .ok_or_else(|| TableError::MissingColumn(layout.label_column.clone()))?;

    let mut attribute_idx = Vec::new();
    let mut period_idx = Vec::new();
    for (i, header) in headers.iter().enumerate() {
        if i == label_idx || layout.excluded_columns.contains(header) {
            continue;
        }
        if is_period_column(header) {
            period_idx.push(i);
        } else {
            attribute_idx.push(i);
        }
    }

    let mut table = SeriesTable::new(
        layout.label_column.clone(),
        attribute_idx.iter().map(|&i| headers[i].clone()).collect(),
        period_idx.iter().map(|&i| headers[i].clone()).collect(),
    );

    let cell = |row: &[RawCell], i: usize| row.get(i).cloned().unwrap_or(RawCell::Empty);
    for row in rows {
        let row = row.as_slice();
        table.rows.push(SeriesRow {
            label: cell(row, label_idx).to_text(),
            attributes: attribute_idx.iter().map(|&i| cell(row, i).to_text()).collect(),
            values: period_idx.iter().map(|&i| cell(row, i).to_number()).collect(),
        });
    }

    Ok(table)
}

// =============================================================================
// Workbooks
// =============================================================================

/// Load the first worksheet of a workbook. The first row holds the headers.
pub fn load_workbook(path: &Path, layout: &ColumnLayout) -> SpreadsheetResult<SeriesTable> {
    let mut workbook = open_workbook_auto(path).map_err(|e| SpreadsheetError::Open {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| SpreadsheetError::NoSheet(path.to_path_buf()))?;

    let range = workbook.worksheet_range(&sheet).map_err(|e| SpreadsheetError::Open {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .ok_or_else(|| SpreadsheetError::EmptySheet(sheet.clone()))?
        .iter()
        .map(|c| c.to_string().trim().to_string())
        .collect();

    let cells: Vec<Vec<RawCell>> = rows.map(|r| r.iter().map(RawCell::from).collect()).collect();

    Ok(build_table(&headers, &cells, layout)?)
}

// =============================================================================
// CSV
// =============================================================================

/// Parse CSV text with an explicit delimiter.
pub fn parse_csv_str(content: &str, delimiter: char, layout: &ColumnLayout) -> CsvResult<SeriesTable> {
    if content.trim().is_empty() {
        return Err(CsvError::EmptyFile);
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().trim_start_matches('\u{feff}').to_string())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(
            record
                .iter()
                .map(|v| if v.is_empty() { RawCell::Empty } else { RawCell::Text(v.to_string()) })
                .collect(),
        );
    }

    Ok(build_table(&headers, &rows, layout)?)
}

/// Parse CSV bytes with auto-detection of encoding and delimiter.
pub fn parse_bytes_auto(bytes: &[u8], layout: &ColumnLayout) -> CsvResult<ParseResult> {
    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding);
    let delimiter = detect_delimiter(&content);
    let table = parse_csv_str(&content, delimiter, layout)?;

    Ok(ParseResult {
        table,
        encoding,
        delimiter,
    })
}

/// Parse a CSV file with auto-detection of encoding and delimiter.
pub fn parse_csv_file_auto(path: &Path, layout: &ColumnLayout) -> CsvResult<ParseResult> {
    let bytes = std::fs::read(path).map_err(|source| CsvError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_bytes_auto(&bytes, layout)
}

/// Read a split or variation file written by [`write_series_csv`].
pub fn read_series_csv(path: &Path, label_column: &str) -> CsvResult<SeriesTable> {
    let content = std::fs::read_to_string(path).map_err(|source| CsvError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let layout = ColumnLayout {
        label_column: label_column.to_string(),
        excluded_columns: Vec::new(),
    };
    parse_csv_str(&content, ',', &layout)
}

/// Write a table as CSV: label, attributes, periods. Missing values are empty.
pub fn write_series_csv(path: &Path, table: &SeriesTable) -> CsvResult<()> {
    let file = File::create(path).map_err(|source| CsvError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut writer = csv::Writer::from_writer(file);

    let mut header = vec![table.label_column.as_str()];
    header.extend(table.attributes.iter().map(String::as_str));
    header.extend(table.periods.iter().map(String::as_str));
    writer.write_record(&header)?;

    for row in &table.rows {
        let mut record = vec![row.label.clone()];
        record.extend(row.attributes.iter().cloned());
        record.extend(row.values.iter().map(|v| v.map(format_number).unwrap_or_default()));
        writer.write_record(&record)?;
    }

    writer.flush().map_err(|source| CsvError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_columns() {
        assert!(is_period_column("1990-01"));
        assert!(is_period_column("2024-12"));
        assert!(is_period_column("2099-07"));
        assert!(!is_period_column("1989-12"));
        assert!(!is_period_column("2100-01"));
        assert!(!is_period_column("2024-13"));
        assert!(!is_period_column("2024-00"));
        assert!(!is_period_column("Libellé"));
        assert!(!is_period_column("2024-1"));
    }

    #[test]
    fn test_coerce_number() {
        assert_eq!(coerce_number("101.3"), Some(101.3));
        assert_eq!(coerce_number(" 99 "), Some(99.0));
        assert_eq!(coerce_number("(s)"), None);
        assert_eq!(coerce_number(""), None);
        assert_eq!(coerce_number("NaN"), None);
    }

    #[test]
    fn test_build_table_sorts_columns() {
        let csv = "idBank;Libellé;Période;Dernière mise à jour;Unité;2024-01;2024-02\n\
                   001;IPC - Guyane;M;2024-03-01;indice;101.2;n.d.\n";
        let table = parse_csv_str(csv, ';', &ColumnLayout::default()).unwrap();

        assert_eq!(table.label_column, "Libellé");
        assert_eq!(table.attributes, vec!["Unité"]);
        assert_eq!(table.periods, vec!["2024-01", "2024-02"]);
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].label, "IPC - Guyane");
        assert_eq!(table.rows[0].attributes, vec!["indice"]);
        assert_eq!(table.rows[0].values, vec![Some(101.2), None]);
    }

    #[test]
    fn test_missing_label_column() {
        let result = parse_csv_str("a,b\n1,2\n", ',', &ColumnLayout::default());
        assert!(matches!(result, Err(CsvError::MissingColumn(col)) if col == "Libellé"));
    }

    #[test]
    fn test_empty_csv_error() {
        assert!(matches!(
            parse_csv_str("", ',', &ColumnLayout::default()),
            Err(CsvError::EmptyFile)
        ));
    }

    #[test]
    fn test_short_rows_are_padded() {
        let csv = "Libellé,2024-01,2024-02\nIPC,100\n";
        let table = parse_csv_str(csv, ',', &ColumnLayout::default()).unwrap();
        assert_eq!(table.rows[0].values, vec![Some(100.0), None]);
    }

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter("a;b;c\n1;2;3"), ';');
        assert_eq!(detect_delimiter("a,b,c\n1,2,3"), ',');
        assert_eq!(detect_delimiter("a\tb\tc\n1\t2\t3"), '\t');
        assert_eq!(detect_delimiter("a|b|c\n1|2|3"), '|');
    }

    #[test]
    fn test_auto_parse() {
        let csv = "Libellé;2024-01\nIPC - Mayotte;100.5\n";
        let result = parse_bytes_auto(csv.as_bytes(), &ColumnLayout::default()).unwrap();
        assert_eq!(result.delimiter, ';');
        assert_eq!(result.table.rows[0].values, vec![Some(100.5)]);
    }

    #[test]
    fn test_latin1_decoding() {
        // "Société" in ISO-8859-1
        let bytes: &[u8] = &[0x53, 0x6F, 0x63, 0x69, 0xE9, 0x74, 0xE9];
        assert_eq!(decode_content(bytes, "iso-8859-1"), "Société");
    }

    #[test]
    fn test_build_table_missing_label() {
        let headers = vec!["idBank".to_string(), "2024-01".to_string()];
        let err = build_table(&headers, &[], &ColumnLayout::default()).unwrap_err();
        assert_eq!(err, TableError::MissingColumn("Libellé".into()));
    }

    #[test]
    fn test_raw_cell_from_workbook_data() {
        assert_eq!(RawCell::from(&Data::Int(101)).to_number(), Some(101.0));
        assert_eq!(RawCell::from(&Data::Float(99.5)).to_number(), Some(99.5));
        assert_eq!(RawCell::from(&Data::String("(s)".into())).to_number(), None);
        assert_eq!(RawCell::from(&Data::Empty), RawCell::Empty);
        assert_eq!(RawCell::from(&Data::Bool(true)).to_number(), None);
    }

    #[test]
    fn test_load_workbook() {
        use super::test_workbook::{self, Cell::{Empty, Number, Text}};

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("donnees_brutes.xlsx");
        test_workbook::write(
            &path,
            &[
                vec![
                    Text("idBank"),
                    Text(" Libellé "),
                    Text("Dernière mise à jour"),
                    Text("Période"),
                    Text("2024-01"),
                    Text("2024-02"),
                    Text("2024-03"),
                ],
                vec![
                    Text("001759970"),
                    Text("IPC - Ensemble - Guadeloupe"),
                    Text("15/03/2024"),
                    Text("M"),
                    Number(101.0),
                    Number(101.5),
                    Text("(s)"),
                ],
                vec![
                    Text("001759971"),
                    Text("IPC - Ensemble - Guyane"),
                    Text("15/03/2024"),
                    Text("M"),
                    Empty,
                    Number(99.25),
                    Number(100.0),
                ],
            ],
        );

        let table = load_workbook(&path, &ColumnLayout::default()).unwrap();
        assert_eq!(table.label_column, "Libellé");
        assert!(table.attributes.is_empty());
        assert_eq!(table.periods, vec!["2024-01", "2024-02", "2024-03"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].label, "IPC - Ensemble - Guadeloupe");
        assert_eq!(table.rows[0].values, vec![Some(101.0), Some(101.5), None]);
        assert_eq!(table.rows[1].values, vec![None, Some(99.25), Some(100.0)]);
    }

    #[test]
    fn test_workbook_without_label_column() {
        use super::test_workbook::{self, Cell::{Number, Text}};

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("raw.xlsx");
        test_workbook::write(&path, &[vec![Text("Titre"), Text("2024-01")], vec![Text("IPC"), Number(1.0)]]);

        let err = load_workbook(&path, &ColumnLayout::default()).unwrap_err();
        assert!(matches!(err, SpreadsheetError::MissingColumn(c) if c == "Libellé"));
    }

    #[test]
    fn test_write_then_read_series_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("series.csv");

        let mut table = SeriesTable::new("Libellé", vec![], vec!["2024-01".into(), "2024-02".into()]);
        table.rows.push(SeriesRow {
            label: "IPC, Guyane".into(),
            attributes: vec![],
            values: vec![Some(100.0), None],
        });
        write_series_csv(&path, &table).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("Libellé,2024-01,2024-02\n"));
        assert!(written.contains("\"IPC, Guyane\",100,"));

        let back = read_series_csv(&path, "Libellé").unwrap();
        assert_eq!(back, table);
    }
}
