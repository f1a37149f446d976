//! Table projection: period rows × column headers.

use super::column_title;
use crate::compose::AlignedTimeline;
use crate::domain::ColumnKey;
use std::fmt;
use std::io;

/// Display token for a cell with no data.
pub const MISSING_CELL: &str = "—";

#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub label: String,
    pub cells: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<TableRow>,
    missing_token: String,
}

impl Table {
    /// Replace the token shown for absent cells.
    pub fn with_missing_token(mut self, token: impl Into<String>) -> Self {
        self.missing_token = token.into();
        self
    }

    pub fn missing_token(&self) -> &str {
        &self.missing_token
    }

    /// Display text of one cell.
    pub fn cell_text(&self, row: usize, col: usize) -> String {
        match self.rows.get(row).and_then(|r| r.cells.get(col)).copied().flatten() {
            Some(v) => format_value(v),
            None => self.missing_token.clone(),
        }
    }

    /// Write as CSV: a `period` column then one column per header. Absent
    /// cells are written as empty fields.
    pub fn write_csv<W: io::Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut wtr = csv::Writer::from_writer(writer);

        let mut header = Vec::with_capacity(self.headers.len() + 1);
        header.push("period");
        header.extend(self.headers.iter().map(String::as_str));
        wtr.write_record(&header)?;

        for row in &self.rows {
            let mut record = Vec::with_capacity(row.cells.len() + 1);
            record.push(row.label.clone());
            record.extend(row.cells.iter().map(|c| c.map(format_value).unwrap_or_default()));
            wtr.write_record(&record)?;
        }

        wtr.flush()?;
        Ok(())
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut grid: Vec<Vec<String>> = Vec::with_capacity(self.rows.len() + 1);
        let mut header = vec!["Period".to_string()];
        header.extend(self.headers.iter().cloned());
        grid.push(header);
        for (i, row) in self.rows.iter().enumerate() {
            let mut line = vec![row.label.clone()];
            line.extend((0..row.cells.len()).map(|c| self.cell_text(i, c)));
            grid.push(line);
        }

        let cols = grid[0].len();
        let widths: Vec<usize> = (0..cols)
            .map(|c| {
                grid.iter()
                    .filter_map(|line| line.get(c))
                    .map(|s| s.chars().count())
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        for line in &grid {
            let mut first = true;
            for (cell, width) in line.iter().zip(&widths) {
                if !first {
                    write!(f, "  ")?;
                }
                first = false;
                let pad = width - cell.chars().count();
                write!(f, "{cell}{}", " ".repeat(pad))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

fn format_value(v: f64) -> String {
    format!("{v}")
}

/// Project `columns` of the timeline into a table.
pub fn to_table(timeline: &AlignedTimeline, columns: &[ColumnKey]) -> Table {
    Table {
        headers: columns.iter().map(|key| column_title(timeline, key)).collect(),
        rows: timeline
            .rows()
            .iter()
            .map(|row| TableRow {
                label: row.period_label.clone(),
                cells: columns.iter().map(|key| row.get(key)).collect(),
            })
            .collect(),
        missing_token: MISSING_CELL.to_string(),
    }
}
