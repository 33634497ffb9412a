//! Model training and cluster-count selection.
//!
//! - [`Trainer`] — fits one k, scores it, produces the [`Artifact`](crate::store::Artifact)
//! - [`Search`] — sweeps k over `[2, max_k]` and records the metric curves
//! - [`Curves`] — elbow and quality curves of a sweep
mod curves;
mod search;
mod trainer;

pub use curves::*;
pub use search::*;
pub use trainer::*;

#[cfg(test)]
use crate::table::Table;

/// Twelve raw customer rows in the source CSV layout.
#[cfg(test)]
pub(crate) const MALL_CUSTOMERS: &str = "\
CustomerID,Gender,Age,Annual Income (k$),Spending Score (1-100)
1,Male,19,15,39
2,Male,21,15,81
3,Female,20,16,6
4,Female,23,16,77
5,Female,31,17,40
6,Female,22,17,76
7,Female,35,18,6
8,Female,23,18,94
9,Male,64,19,3
10,Female,30,19,72
11,Male,67,19,14
12,Female,35,19,99
";

/// Seven customers, one-hot encoded but not scaled:
/// Age, Annual Income, Spending, Gender_Female, Gender_Male
#[cfg(test)]
pub(crate) fn customers() -> Table {
    Table::new(
        vec![
            "Age".into(),
            "Annual Income (k$)".into(),
            "Spending Score (1-100)".into(),
            "Gender_Female".into(),
            "Gender_Male".into(),
        ],
        vec![
            vec![19., 15., 39., 0., 1.],
            vec![21., 16., 81., 1., 0.],
            vec![20., 17., 6., 1., 0.],
            vec![23., 18., 77., 0., 1.],
            vec![31., 19., 40., 1., 0.],
            vec![25., 20., 60., 0., 1.],
            vec![22., 21., 55., 1., 0.],
        ],
    )
    .unwrap()
}
