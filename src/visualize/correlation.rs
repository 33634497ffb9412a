use crate::Score;
use crate::table::Table;
use serde::Serialize;

/// Pearson correlation between every pair of columns. A zero-variance
/// column correlates 0 with everything, itself included.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Correlation {
    pub columns: Vec<String>,
    pub matrix: Vec<Vec<Score>>,
}

impl From<&Table> for Correlation {
    fn from(table: &Table) -> Self {
        let n = table.n().max(1) as Score;
        let centered = (0..table.d())
            .map(|j| {
                let mean = table.rows().iter().map(|row| row[j]).sum::<Score>() / n;
                table.rows().iter().map(|row| row[j] - mean).collect::<Vec<_>>()
            })
            .collect::<Vec<_>>();
        let norms = centered
            .iter()
            .map(|c| c.iter().map(|x| x * x).sum::<Score>().sqrt())
            .collect::<Vec<_>>();
        let matrix = (0..table.d())
            .map(|a| {
                (0..table.d())
                    .map(|b| {
                        let norm = norms[a] * norms[b];
                        if norm > 0. {
                            centered[a]
                                .iter()
                                .zip(centered[b].iter())
                                .map(|(x, y)| x * y)
                                .sum::<Score>()
                                / norm
                        } else {
                            0.
                        }
                    })
                    .collect()
            })
            .collect();
        Self {
            columns: table.columns().to_vec(),
            matrix,
        }
    }
}
