use crate::Energy;
use crate::Result;
use crate::Score;
use crate::metrics::Scores;
use serde::Serialize;
use std::path::Path;

/// One sweep point: inertia and quality scores at a given k.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub k: usize,
    pub inertia: Energy,
    #[serde(flatten)]
    pub scores: Scores,
}

/// Four parallel curves over ascending k. Choosing k is left to the reader.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Curves {
    points: Vec<Point>,
}

impl From<Vec<Point>> for Curves {
    fn from(points: Vec<Point>) -> Self {
        Self { points }
    }
}

impl Curves {
    pub fn points(&self) -> &[Point] {
        &self.points
    }
    pub fn ks(&self) -> Vec<usize> {
        self.points.iter().map(|p| p.k).collect()
    }
    /// Inertia by k, for the elbow plot.
    pub fn elbow(&self) -> Vec<(usize, Energy)> {
        self.points.iter().map(|p| (p.k, p.inertia)).collect()
    }
    pub fn silhouette(&self) -> Vec<(usize, Score)> {
        self.points.iter().map(|p| (p.k, p.scores.silhouette)).collect()
    }
    pub fn davies_bouldin(&self) -> Vec<(usize, Score)> {
        self.points.iter().map(|p| (p.k, p.scores.davies_bouldin)).collect()
    }
    pub fn calinski_harabasz(&self) -> Vec<(usize, Score)> {
        self.points.iter().map(|p| (p.k, p.scores.calinski_harabasz)).collect()
    }

    /// Writes `k,inertia,silhouette,davies_bouldin,calinski_harabasz` rows.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(["k", "inertia", "silhouette", "davies_bouldin", "calinski_harabasz"])?;
        for p in self.points.iter() {
            writer.write_record([
                p.k.to_string(),
                p.inertia.to_string(),
                p.scores.silhouette.to_string(),
                p.scores.davies_bouldin.to_string(),
                p.scores.calinski_harabasz.to_string(),
            ])?;
        }
        writer.flush()?;
        log::info!("{:<32}{:<32}", "saved metric curves", path.display());
        Ok(())
    }
}
