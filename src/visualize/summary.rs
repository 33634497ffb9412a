use crate::Energy;
use crate::table::Table;
use serde::Serialize;

/// Bins per histogram.
pub const BINS: usize = 10;

/// Equal-width histogram over `[min, max]`. The last bin is closed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    pub edges: Vec<Energy>,
    pub counts: Vec<usize>,
}

impl Histogram {
    pub fn new(values: &[Energy], bins: usize) -> Self {
        let min = values.iter().copied().fold(Energy::INFINITY, Energy::min);
        let max = values.iter().copied().fold(Energy::NEG_INFINITY, Energy::max);
        if values.is_empty() || bins == 0 {
            return Self {
                edges: Vec::new(),
                counts: Vec::new(),
            };
        }
        let width = (max - min) / bins as Energy;
        let edges = (0..=bins).map(|b| min + width * b as Energy).collect();
        let mut counts = vec![0; bins];
        for x in values {
            let b = match width > 0. {
                true => (((x - min) / width) as usize).min(bins - 1),
                false => 0,
            };
            counts[b] += 1;
        }
        Self { edges, counts }
    }
}

/// Shape of one column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Distribution {
    pub column: String,
    pub count: usize,
    pub mean: Energy,
    /// Population standard deviation.
    pub std: Energy,
    pub min: Energy,
    pub max: Energy,
    pub histogram: Histogram,
}

impl Distribution {
    pub fn new(column: &str, values: &[Energy]) -> Self {
        let n = values.len().max(1) as Energy;
        let mean = values.iter().sum::<Energy>() / n;
        let var = values.iter().map(|x| (x - mean) * (x - mean)).sum::<Energy>() / n;
        Self {
            column: column.to_string(),
            count: values.len(),
            mean,
            std: var.sqrt(),
            min: values.iter().copied().fold(Energy::INFINITY, Energy::min),
            max: values.iter().copied().fold(Energy::NEG_INFINITY, Energy::max),
            histogram: Histogram::new(values, BINS),
        }
    }
}

/// Distribution of every column of a table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub columns: Vec<Distribution>,
}

impl From<&Table> for Summary {
    fn from(table: &Table) -> Self {
        Self {
            columns: table
                .columns()
                .iter()
                .enumerate()
                .map(|(j, c)| {
                    let values = table.rows().iter().map(|row| row[j]).collect::<Vec<_>>();
                    Distribution::new(c, &values)
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn histogram_counts_every_value_once() {
        let h = Histogram::new(&[0., 1., 2., 3., 4., 5., 6., 7., 8., 9., 10.], BINS);
        assert_eq!(h.edges.len(), BINS + 1);
        assert_eq!(h.edges[0], 0.);
        assert_eq!(h.edges[BINS], 10.);
        assert_eq!(h.counts.iter().sum::<usize>(), 11);
        // the maximum lands in the closed last bin
        assert_eq!(h.counts[BINS - 1], 2);
    }

    #[test]
    fn constant_column_fills_first_bin() {
        let h = Histogram::new(&[3., 3., 3.], 4);
        assert_eq!(h.counts, vec![3, 0, 0, 0]);
    }

    #[test]
    fn summary_matches_moments() {
        let table = Table::new(vec!["a".into()], vec![vec![2.], vec![4.], vec![6.]]).unwrap();
        let summary = Summary::from(&table);
        let d = &summary.columns[0];
        assert_eq!(d.count, 3);
        assert_eq!(d.mean, 4.);
        assert!((d.std - (8f64 / 3.).sqrt()).abs() < 1e-12);
        assert_eq!((d.min, d.max), (2., 6.));
    }
}
