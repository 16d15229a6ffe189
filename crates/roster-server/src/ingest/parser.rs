//! Tabular parser
//!
//! Opens an uploaded workbook from memory and extracts the first sheet as rows of
//! trimmed text. The container format (xlsx, xls) is sniffed from the bytes, so
//! the file name only matters for the eligibility check upstream.

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader};

use super::error::IngestError;

/// The first sheet of a workbook, header row included
///
/// Leading blank rows are not stored; `first_row` keeps the zero-based sheet
/// index of the header so row numbers still match what a spreadsheet shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sheet {
    rows: Vec<Vec<String>>,
    first_row: usize,
}

impl Sheet {
    /// Build a sheet from already-extracted rows.
    ///
    /// Fails with [`IngestError::EmptyInput`] unless there is a header row and at
    /// least one row after it.
    pub fn from_rows(rows: Vec<Vec<String>>) -> Result<Self, IngestError> {
        Self::from_rows_at(rows, 0)
    }

    /// Like [`Sheet::from_rows`], with the header at zero-based sheet row `first_row`.
    pub fn from_rows_at(rows: Vec<Vec<String>>, first_row: usize) -> Result<Self, IngestError> {
        if rows.len() <= 1 {
            return Err(IngestError::EmptyInput);
        }
        Ok(Self { rows, first_row })
    }

    pub fn header(&self) -> &[String] {
        &self.rows[0]
    }

    /// Rows after the header, paired with their 1-based sheet row number.
    pub fn data_rows(&self) -> impl Iterator<Item = (usize, &[String])> {
        let first_row = self.first_row;
        self.rows
            .iter()
            .enumerate()
            .skip(1)
            .map(move |(index, row)| (first_row + index + 1, row.as_slice()))
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Parse workbook bytes into the first sheet's rows.
///
/// # Errors
///
/// - [`IngestError::MalformedInput`] if the bytes are not a workbook
/// - [`IngestError::NoSheet`] if the workbook has no sheets
/// - [`IngestError::EmptyInput`] if the first sheet has no data rows
#[tracing::instrument(skip(bytes), fields(size = bytes.len()))]
pub fn parse_workbook(bytes: &[u8]) -> Result<Sheet, IngestError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| IngestError::MalformedInput(e.to_string()))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or(IngestError::NoSheet)?
        .map_err(|e| IngestError::MalformedInput(e.to_string()))?;

    // The range begins at the first non-empty cell, not at A1
    let first_row = range.start().map_or(0, |(row, _)| row as usize);

    let rows: Vec<Vec<String>> = range
        .rows()
        .map(|row| row.iter().map(cell_text).collect())
        .collect();

    tracing::debug!(rows = rows.len(), first_row, "Extracted first sheet");

    Sheet::from_rows_at(rows, first_row)
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(text) => text.trim().to_string(),
        other => other.to_string().trim().to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook;

    fn workbook_bytes(rows: &[&[&str]]) -> Vec<u8> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        for (r, row) in rows.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                if !value.is_empty() {
                    sheet.write_string(r as u32, c as u16, *value).unwrap();
                }
            }
        }
        workbook.save_to_buffer().unwrap()
    }

    #[test]
    fn test_parse_trims_cells() {
        let bytes = workbook_bytes(&[
            &["first_name", "last_name", "email"],
            &["  Ann ", "Lee", " ann@x.com"],
        ]);

        let sheet = parse_workbook(&bytes).unwrap();
        assert_eq!(sheet.header(), ["first_name", "last_name", "email"]);

        let rows: Vec<_> = sheet.data_rows().collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].0, 2);
        assert_eq!(rows[0].1, ["Ann", "Lee", "ann@x.com"]);
    }

    #[test]
    fn test_row_numbers_follow_the_sheet_after_leading_blank_rows() {
        let bytes = workbook_bytes(&[
            &[],
            &["first_name", "last_name", "email"],
            &["Ann", "Lee", "ann@x.com"],
            &["Bo", "Ray", "broken"],
        ]);

        let sheet = parse_workbook(&bytes).unwrap();
        assert_eq!(sheet.header(), ["first_name", "last_name", "email"]);

        let numbers: Vec<usize> = sheet.data_rows().map(|(n, _)| n).collect();
        assert_eq!(numbers, vec![3, 4]);
    }

    #[test]
    fn test_numeric_cells_become_text() {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "postal").unwrap();
        sheet.write_number(1, 0, 12345).unwrap();
        let bytes = workbook.save_to_buffer().unwrap();

        let sheet = parse_workbook(&bytes).unwrap();
        let (_, row) = sheet.data_rows().next().unwrap();
        assert_eq!(row[0], "12345");
    }

    #[test]
    fn test_header_only_sheet_is_empty_input() {
        let bytes = workbook_bytes(&[&["first_name", "last_name", "email"]]);
        assert!(matches!(parse_workbook(&bytes), Err(IngestError::EmptyInput)));
    }

    #[test]
    fn test_blank_sheet_is_empty_input() {
        let mut workbook = Workbook::new();
        workbook.add_worksheet();
        let bytes = workbook.save_to_buffer().unwrap();
        assert!(matches!(parse_workbook(&bytes), Err(IngestError::EmptyInput)));
    }

    #[test]
    fn test_garbage_bytes_are_malformed() {
        let result = parse_workbook(b"first_name,last_name,email\nAnn,Lee,ann@x.com\n");
        assert!(matches!(result, Err(IngestError::MalformedInput(_))));
    }

    #[test]
    fn test_from_rows_numbers_rows_after_header() {
        let sheet = Sheet::from_rows(vec![
            vec!["h".to_string()],
            vec!["a".to_string()],
            vec!["b".to_string()],
        ])
        .unwrap();

        let numbers: Vec<usize> = sheet.data_rows().map(|(n, _)| n).collect();
        assert_eq!(numbers, vec![2, 3]);
        assert_eq!(sheet.row_count(), 3);
    }
}
