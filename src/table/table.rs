use crate::CLUSTER_COLUMN;
use crate::Energy;
use crate::Error;
use crate::Result;
use crate::kmeans::Assignment;
use std::path::Path;

/// Ordered named numeric columns, one row per entity.
///
/// Construction enforces the shape invariant (one value per column in every
/// row), unique column names, and that every value is finite. Anything
/// consuming a `Table` can therefore skip missing-value handling.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Energy>>,
}

impl Table {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Energy>>) -> Result<Self> {
        for (j, name) in columns.iter().enumerate() {
            if columns[..j].contains(name) {
                return Err(Error::Validation(format!("duplicate column {:?}", name)));
            }
        }
        for (i, row) in rows.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(Error::Validation(format!(
                    "row {} has {} values, expected {}",
                    i,
                    row.len(),
                    columns.len()
                )));
            }
            if let Some(j) = row.iter().position(|x| !x.is_finite()) {
                return Err(Error::Validation(format!(
                    "row {} column {:?} is not a finite number",
                    i, columns[j]
                )));
            }
        }
        Ok(Self { columns, rows })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }
    pub fn rows(&self) -> &[Vec<Energy>] {
        &self.rows
    }
    /// Number of rows.
    pub fn n(&self) -> usize {
        self.rows.len()
    }
    /// Number of columns.
    pub fn d(&self) -> usize {
        self.columns.len()
    }
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
    pub fn index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }
    pub fn column(&self, column: &str) -> Option<Vec<Energy>> {
        self.index(column)
            .map(|j| self.rows.iter().map(|row| row[j]).collect())
    }

    /// Copy of this table without the derived cluster column.
    pub fn features(&self) -> Self {
        match self.index(CLUSTER_COLUMN) {
            None => self.clone(),
            Some(j) => Self {
                columns: self
                    .columns
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| *i != j)
                    .map(|(_, c)| c.clone())
                    .collect(),
                rows: self
                    .rows
                    .iter()
                    .map(|row| {
                        row.iter()
                            .enumerate()
                            .filter(|(i, _)| *i != j)
                            .map(|(_, x)| *x)
                            .collect()
                    })
                    .collect(),
            },
        }
    }

    /// Appends the assignment as the derived cluster column.
    pub fn labeled(&self, assignment: &Assignment) -> Result<Self> {
        if self.index(CLUSTER_COLUMN).is_some() {
            return Err(Error::Validation(format!(
                "table already carries a {:?} column",
                CLUSTER_COLUMN
            )));
        }
        if assignment.n() != self.n() {
            return Err(Error::Validation(format!(
                "assignment covers {} rows, table has {}",
                assignment.n(),
                self.n()
            )));
        }
        let mut columns = self.columns.clone();
        columns.push(CLUSTER_COLUMN.to_string());
        let rows = self
            .rows
            .iter()
            .zip(assignment.labels())
            .map(|(row, label)| {
                let mut row = row.clone();
                row.push(*label as Energy);
                row
            })
            .collect();
        Ok(Self { columns, rows })
    }

    /// Cluster ids from the derived column, if present.
    pub fn labels(&self) -> Option<Vec<usize>> {
        self.column(CLUSTER_COLUMN)
            .map(|values| values.into_iter().map(|x| x as usize).collect())
    }

    pub fn read(path: &Path) -> Result<Self> {
        let mut reader = csv::Reader::from_path(path)?;
        let columns = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect::<Vec<_>>();
        let mut rows = Vec::new();
        for (i, record) in reader.records().enumerate() {
            let record = record?;
            let row = record
                .iter()
                .zip(columns.iter())
                .map(|(cell, column)| {
                    cell.trim().parse::<Energy>().map_err(|_| {
                        Error::Validation(format!(
                            "row {} column {:?}: {:?} is not a number",
                            i, column, cell
                        ))
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            rows.push(row);
        }
        Self::new(columns, rows)
    }

    /// Replaces the CSV at `path` in one step: rows go to a synced sibling
    /// temp file that is then renamed over the target, so readers never see
    /// a partial table.
    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let name = path
            .file_name()
            .ok_or_else(|| Error::Validation(format!("{} is not a file path", path.display())))?;
        let temp = path.with_file_name(format!(".{}.{}.tmp", name.to_string_lossy(), std::process::id()));
        let written = self
            .stage(&temp)
            .and_then(|_| std::fs::rename(&temp, path).map_err(Error::from));
        if written.is_err() {
            std::fs::remove_file(&temp).ok();
        }
        written
    }

    fn stage(&self, temp: &Path) -> Result<()> {
        let mut writer = csv::Writer::from_path(temp)?;
        writer.write_record(&self.columns)?;
        for row in self.rows.iter() {
            writer.write_record(row.iter().map(|x| x.to_string()))?;
        }
        writer
            .into_inner()
            .map_err(|e| e.into_error())?
            .sync_all()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(xs: &[&str]) -> Vec<String> {
        xs.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn rejects_ragged_rows() {
        let result = Table::new(names(&["a", "b"]), vec![vec![1., 2.], vec![3.]]);
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn rejects_missing_values() {
        let result = Table::new(names(&["a"]), vec![vec![Energy::NAN]]);
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn rejects_duplicate_columns() {
        let result = Table::new(names(&["a", "a"]), vec![vec![1., 2.]]);
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn labeled_then_features_restores_input() {
        let table = Table::new(names(&["a", "b"]), vec![vec![1., 2.], vec![3., 4.]]).unwrap();
        let labeled = table.labeled(&Assignment::new(vec![1, 0], 2)).unwrap();
        assert_eq!(labeled.columns().last().unwrap(), CLUSTER_COLUMN);
        assert_eq!(labeled.labels(), Some(vec![1, 0]));
        assert_eq!(labeled.features(), table);
    }

    #[test]
    fn csv_preserves_values() {
        let dir = std::env::temp_dir().join(format!("segments-table-{}", std::process::id()));
        let path = dir.join("nested").join("table.csv");
        let table = Table::new(
            names(&["Age", "Gender_Male"]),
            vec![vec![-1.2345678901234, 1.], vec![0.1, 0.]],
        )
        .unwrap();
        table.write(&path).unwrap();
        assert_eq!(Table::read(&path).unwrap(), table);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn failed_write_leaves_no_partial_file() {
        let dir = std::env::temp_dir().join(format!("segments-table-blocked-{}", std::process::id()));
        let path = dir.join("table.csv");
        std::fs::create_dir_all(path.join("occupied")).unwrap();
        let table = Table::new(names(&["a"]), vec![vec![1.]]).unwrap();
        assert!(table.write(&path).is_err());
        let leftovers = std::fs::read_dir(&dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .count();
        assert_eq!(leftovers, 0);
        assert!(path.join("occupied").is_dir());
        std::fs::remove_dir_all(&dir).ok();
    }
}
