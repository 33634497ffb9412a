use super::*;
use crate::Energy;
use crate::Error;
use crate::Result;
use std::collections::BTreeSet;

/// Turns a raw customer table into a numeric feature table.
///
/// 1. `drop` columns are removed (absent ones are ignored)
/// 2. `scale` columns have gaps filled with the column mean, then are
///    standardized to zero mean and unit population variance
/// 3. `encode` columns are expanded into `<col>_<category>` indicators,
///    categories sorted, appended after every other column
/// 4. anything else passes through and must already be complete and numeric
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preprocessor {
    scale: Vec<String>,
    encode: Vec<String>,
    drop: Vec<String>,
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self {
            scale: vec![
                "Age".to_string(),
                "Annual Income (k$)".to_string(),
                "Spending Score (1-100)".to_string(),
            ],
            encode: vec!["Gender".to_string()],
            drop: vec!["CustomerID".to_string()],
        }
    }
}

impl Preprocessor {
    pub fn new(scale: Vec<String>, encode: Vec<String>) -> Self {
        Self {
            scale,
            encode,
            drop: Vec::new(),
        }
    }
    pub fn dropping(mut self, drop: Vec<String>) -> Self {
        self.drop = drop;
        self
    }

    pub fn apply(&self, raw: &Raw) -> Result<Table> {
        for name in self.scale.iter().chain(self.encode.iter()) {
            raw.index(name)?;
        }
        let mut names = Vec::new();
        let mut values = Vec::<Vec<Energy>>::new();
        for (j, name) in raw.columns().iter().enumerate() {
            if self.drop.contains(name) || self.encode.contains(name) {
                continue;
            }
            let column = if self.scale.contains(name) {
                Self::standardize(name, &Self::impute(name, raw, j)?)
            } else {
                Self::passthrough(name, raw, j)?
            };
            names.push(name.clone());
            values.push(column);
        }
        for name in self.encode.iter() {
            for (category, column) in Self::indicators(name, raw, raw.index(name)?)? {
                names.push(format!("{}_{}", name, category));
                values.push(column);
            }
        }
        let rows = (0..raw.n())
            .map(|i| values.iter().map(|column| column[i]).collect())
            .collect();
        log::debug!("{:<32}{:<32}", "preprocessed columns", names.len());
        Table::new(names, rows)
    }

    fn number(name: &str, i: usize, cell: &str) -> Result<Energy> {
        cell.parse::<Energy>()
            .ok()
            .filter(|x| x.is_finite())
            .ok_or_else(|| {
                Error::Validation(format!("row {} column {:?}: {:?} is not a number", i, name, cell))
            })
    }

    fn passthrough(name: &str, raw: &Raw, j: usize) -> Result<Vec<Energy>> {
        raw.cells(j)
            .enumerate()
            .map(|(i, cell)| match cell {
                Some(cell) => Self::number(name, i, cell),
                None => Err(Error::Validation(format!(
                    "row {} column {:?} is missing and not imputed",
                    i, name
                ))),
            })
            .collect()
    }

    fn impute(name: &str, raw: &Raw, j: usize) -> Result<Vec<Energy>> {
        let parsed = raw
            .cells(j)
            .enumerate()
            .map(|(i, cell)| cell.map(|c| Self::number(name, i, c)).transpose())
            .collect::<Result<Vec<Option<Energy>>>>()?;
        let present = parsed.iter().flatten().copied().collect::<Vec<_>>();
        if present.is_empty() {
            return Err(Error::Validation(format!("column {:?} has no values", name)));
        }
        let mean = present.iter().sum::<Energy>() / present.len() as Energy;
        Ok(parsed.into_iter().map(|x| x.unwrap_or(mean)).collect())
    }

    fn standardize(name: &str, column: &[Energy]) -> Vec<Energy> {
        let n = column.len() as Energy;
        let mean = column.iter().sum::<Energy>() / n;
        let var = column.iter().map(|x| (x - mean) * (x - mean)).sum::<Energy>() / n;
        let std = if var > 0. { var.sqrt() } else { 1. };
        log::debug!("{:<32}{:<32}", "standardized", format!("{} μ={:.3} σ={:.3}", name, mean, std));
        column.iter().map(|x| (x - mean) / std).collect()
    }

    fn indicators(name: &str, raw: &Raw, j: usize) -> Result<Vec<(String, Vec<Energy>)>> {
        let cells = raw
            .cells(j)
            .enumerate()
            .map(|(i, cell)| {
                cell.ok_or_else(|| {
                    Error::Validation(format!("row {} column {:?} has no category", i, name))
                })
            })
            .collect::<Result<Vec<&str>>>()?;
        Ok(cells
            .iter()
            .copied()
            .collect::<BTreeSet<&str>>()
            .into_iter()
            .map(|category| {
                let column = cells
                    .iter()
                    .map(|cell| if *cell == category { 1. } else { 0. })
                    .collect();
                (category.to_string(), column)
            })
            .collect())
    }
}
