use crate::Error;
use crate::Result;
use std::path::Path;

/// CSV cells exactly as read. Blank cells are `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raw {
    columns: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

impl Raw {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Option<String>>>) -> Result<Self> {
        match rows.iter().position(|row| row.len() != columns.len()) {
            Some(i) => Err(Error::Validation(format!(
                "raw row {} has {} cells, expected {}",
                i,
                rows[i].len(),
                columns.len()
            ))),
            None => Ok(Self { columns, rows }),
        }
    }

    pub fn read(path: &Path) -> Result<Self> {
        let mut reader = csv::Reader::from_path(path)?;
        let columns = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect::<Vec<_>>();
        let rows = reader
            .records()
            .map(|record| {
                record.map(|r| {
                    r.iter()
                        .map(str::trim)
                        .map(|cell| (!cell.is_empty()).then(|| cell.to_string()))
                        .collect::<Vec<_>>()
                })
            })
            .collect::<std::result::Result<Vec<_>, csv::Error>>()?;
        Self::new(columns, rows)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }
    pub fn n(&self) -> usize {
        self.rows.len()
    }
    pub fn index(&self, column: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c == column)
            .ok_or_else(|| Error::Validation(format!("missing column {:?}", column)))
    }
    /// Cells of column `j`, top to bottom.
    pub fn cells(&self, j: usize) -> impl Iterator<Item = Option<&str>> + '_ {
        self.rows.iter().map(move |row| row[j].as_deref())
    }
}
