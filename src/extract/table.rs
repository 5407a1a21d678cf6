//! CSV-to-table adapter and its fixed-width text rendering.
//!
//! Invalid UTF-8 byte sequences are dropped before parsing rather than
//! failing the upload; the number of dropped bytes is logged.

use super::ExtractError;

/// Rows shown to the model when a question is asked about the data.
pub const PROMPT_ROWS: usize = 10;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Parse CSV bytes: first row is the header, every other row is data.
    ///
    /// Short rows are padded with empty cells; rows with more fields than
    /// the header are an error.
    pub fn from_csv_bytes(bytes: &[u8]) -> Result<Self, ExtractError> {
        let (text, dropped) = decode_dropping_invalid(bytes);
        if dropped > 0 {
            log::warn!("[CSV] Dropped {} invalid UTF-8 bytes", dropped);
        }
        let text = text.strip_prefix('\u{feff}').unwrap_or(&text);

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(text.as_bytes());

        let header = reader
            .headers()
            .map_err(|e| ExtractError::CsvParse(e.to_string()))?
            .clone();
        if header.is_empty() {
            return Err(ExtractError::CsvParse("No columns to parse from file".into()));
        }
        let columns = name_columns(header.iter());
        let width = columns.len();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| ExtractError::CsvParse(e.to_string()))?;
            if record.len() > width {
                let line = record.position().map_or(0, |p| p.line());
                return Err(ExtractError::CsvParse(format!(
                    "Expected {} fields in line {}, saw {}",
                    width,
                    line,
                    record.len()
                )));
            }
            let mut row: Vec<String> = record.iter().map(str::to_string).collect();
            row.resize(width, String::new());
            rows.push(row);
        }

        log::info!("[CSV] Parsed {} columns x {} rows", width, rows.len());
        Ok(Self { columns, rows })
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// First `n` rows, same columns.
    pub fn head(&self, n: usize) -> Table {
        Table {
            columns: self.columns.clone(),
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }

    /// Text handed to the model alongside a question.
    pub fn prompt_fragment(&self) -> String {
        self.head(PROMPT_ROWS).render()
    }

    /// Fixed-width rendering: a row-index column, then every column
    /// right-aligned to its widest cell, separated by two spaces.
    pub fn render(&self) -> String {
        if self.rows.is_empty() {
            return format!(
                "Empty DataFrame\nColumns: [{}]\nIndex: []",
                self.columns.join(", ")
            );
        }

        let index: Vec<String> = (0..self.rows.len()).map(|i| i.to_string()).collect();
        let index_width = index.iter().map(|s| s.len()).max().unwrap_or(0);

        let widths: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .map(|(col, name)| {
                self.rows
                    .iter()
                    .map(|row| display_width(cell(row, col)))
                    .chain(std::iter::once(display_width(name)))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let mut lines = Vec::with_capacity(self.rows.len() + 1);
        lines.push(render_line(" ".repeat(index_width), &self.columns, &widths));
        for (label, row) in index.iter().zip(&self.rows) {
            lines.push(render_line(format!("{:<index_width$}", label), row, &widths));
        }
        lines.join("\n")
    }
}

/// Missing cells render as empty.
fn cell(row: &[String], col: usize) -> &str {
    row.get(col).map_or("", String::as_str)
}

fn render_line(mut line: String, cells: &[String], widths: &[usize]) -> String {
    for (col, width) in widths.iter().enumerate() {
        let text = cell(cells, col);
        line.push_str("  ");
        line.push_str(&" ".repeat(width.saturating_sub(display_width(text))));
        line.push_str(text);
    }
    line
}

fn display_width(s: &str) -> usize {
    s.chars().count()
}

/// Blank header cells become `Unnamed: {i}`; repeated names get `.1`, `.2`, ...
fn name_columns<'a>(raw: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for (i, name) in raw.enumerate() {
        let base = if name.trim().is_empty() {
            format!("Unnamed: {}", i)
        } else {
            name.to_string()
        };
        let mut candidate = base.clone();
        let mut suffix = 1;
        while columns.contains(&candidate) {
            candidate = format!("{}.{}", base, suffix);
            suffix += 1;
        }
        columns.push(candidate);
    }
    columns
}

/// Decode as UTF-8, skipping invalid sequences. Returns the text and the
/// number of bytes skipped.
fn decode_dropping_invalid(bytes: &[u8]) -> (String, usize) {
    let mut text = String::with_capacity(bytes.len());
    let mut dropped = 0;
    for chunk in bytes.utf8_chunks() {
        text.push_str(chunk.valid());
        dropped += chunk.invalid().len();
    }
    (text, dropped)
}
