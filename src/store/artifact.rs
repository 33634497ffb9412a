use crate::Energy;
use crate::Error;
use crate::Result;
use crate::kmeans::nearest;
use chrono::DateTime;
use chrono::Utc;

/// A trained model: centroids, the ordered feature columns they were
/// trained on, and when.
///
/// The column list is the schema contract inference validates against.
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    columns: Vec<String>,
    centroids: Vec<Vec<Energy>>,
    trained: DateTime<Utc>,
}

impl Artifact {
    /// Binary signature, modeled on the PGCOPY header.
    pub const MAGIC: &'static [u8] = b"CENTROID\n\xFF\r\n\0";
    pub const VERSION: u16 = 1;
    pub const FOOTER: u16 = 0xFFFF;

    pub fn new(columns: Vec<String>, centroids: Vec<Vec<Energy>>) -> Result<Self> {
        Self::check(&columns, &centroids).map_err(Error::Validation)?;
        Ok(Self {
            columns,
            centroids,
            trained: millis(Utc::now()),
        })
    }

    pub fn k(&self) -> usize {
        self.centroids.len()
    }
    pub fn d(&self) -> usize {
        self.columns.len()
    }
    pub fn columns(&self) -> &[String] {
        &self.columns
    }
    pub fn centroids(&self) -> &[Vec<Energy>] {
        &self.centroids
    }
    pub fn trained(&self) -> DateTime<Utc> {
        self.trained
    }

    /// Cluster id of the nearest centroid; ties go to the lowest id.
    pub fn nearest(&self, x: &[Energy]) -> usize {
        nearest(x, &self.centroids).0
    }

    fn check(columns: &[String], centroids: &[Vec<Energy>]) -> std::result::Result<(), String> {
        if centroids.is_empty() {
            return Err("artifact has no centroids".to_string());
        }
        if columns.is_empty() {
            return Err("artifact has no feature columns".to_string());
        }
        for (j, name) in columns.iter().enumerate() {
            if columns[..j].contains(name) {
                return Err(format!("duplicate column {:?}", name));
            }
        }
        for (j, centroid) in centroids.iter().enumerate() {
            if centroid.len() != columns.len() {
                return Err(format!(
                    "centroid {} has {} coordinates, expected {}",
                    j,
                    centroid.len(),
                    columns.len()
                ));
            }
            if centroid.iter().any(|x| !x.is_finite()) {
                return Err(format!("centroid {} is not finite", j));
            }
        }
        Ok(())
    }

    /// Big-endian encoding:
    ///
    /// magic, u16 version, i64 trained millis, u32 k, u32 d,
    /// d × (u32 length + UTF-8 column name), k × d f64, u16 footer
    pub fn to_bytes(&self) -> std::io::Result<Vec<u8>> {
        use byteorder::BE;
        use byteorder::WriteBytesExt;
        use std::io::Write;
        let mut bytes = Vec::new();
        bytes.write_all(Self::MAGIC)?;
        bytes.write_u16::<BE>(Self::VERSION)?;
        bytes.write_i64::<BE>(self.trained.timestamp_millis())?;
        bytes.write_u32::<BE>(self.k() as u32)?;
        bytes.write_u32::<BE>(self.d() as u32)?;
        for name in self.columns.iter() {
            bytes.write_u32::<BE>(name.len() as u32)?;
            bytes.write_all(name.as_bytes())?;
        }
        for x in self.centroids.iter().flatten() {
            bytes.write_f64::<BE>(*x)?;
        }
        bytes.write_u16::<BE>(Self::FOOTER)?;
        Ok(bytes)
    }

    /// Inverse of [`Artifact::to_bytes`]. The error is a human readable
    /// reason the bytes are not a valid artifact.
    pub fn from_bytes(bytes: &[u8]) -> std::result::Result<Self, String> {
        use byteorder::BE;
        use byteorder::ReadBytesExt;
        use std::io::Read;
        let truncated = |e: std::io::Error| format!("truncated ({})", e);
        let ref mut reader = std::io::Cursor::new(bytes);
        let mut magic = vec![0u8; Self::MAGIC.len()];
        reader.read_exact(&mut magic).map_err(truncated)?;
        if magic != Self::MAGIC {
            return Err("bad magic".to_string());
        }
        let version = reader.read_u16::<BE>().map_err(truncated)?;
        if version != Self::VERSION {
            return Err(format!("unsupported version {}", version));
        }
        let millis = reader.read_i64::<BE>().map_err(truncated)?;
        let trained = DateTime::<Utc>::from_timestamp_millis(millis)
            .ok_or_else(|| format!("timestamp {} out of range", millis))?;
        let k = reader.read_u32::<BE>().map_err(truncated)? as usize;
        let d = reader.read_u32::<BE>().map_err(truncated)? as usize;
        if k.saturating_mul(d).saturating_mul(8) > remaining(&*reader) {
            return Err(format!("truncated ({}×{} centroids do not fit)", k, d));
        }
        let mut columns = Vec::with_capacity(d);
        for _ in 0..d {
            let len = reader.read_u32::<BE>().map_err(truncated)? as usize;
            if len > remaining(&*reader) {
                return Err("truncated (column name)".to_string());
            }
            let mut name = vec![0u8; len];
            reader.read_exact(&mut name).map_err(truncated)?;
            columns.push(String::from_utf8(name).map_err(|e| format!("column name: {}", e))?);
        }
        let mut centroids = Vec::with_capacity(k);
        for _ in 0..k {
            let centroid = (0..d)
                .map(|_| reader.read_f64::<BE>())
                .collect::<std::io::Result<Vec<Energy>>>()
                .map_err(truncated)?;
            centroids.push(centroid);
        }
        if reader.read_u16::<BE>().map_err(truncated)? != Self::FOOTER {
            return Err("bad footer".to_string());
        }
        if remaining(&*reader) > 0 {
            return Err(format!("{} trailing bytes", remaining(&*reader)));
        }
        Self::check(&columns, &centroids)?;
        Ok(Self {
            columns,
            centroids,
            trained,
        })
    }
}

fn remaining(reader: &std::io::Cursor<&[u8]>) -> usize {
    reader.get_ref().len().saturating_sub(reader.position() as usize)
}

fn millis(t: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp_millis(t.timestamp_millis()).unwrap_or(t)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifact() -> Artifact {
        Artifact::new(
            vec!["Age".into(), "Gender_Female".into()],
            vec![vec![-0.5, 1.], vec![0.5, 0.], vec![0.5, 1.]],
        )
        .unwrap()
    }

    #[test]
    fn bytes_round_trip() {
        let a = artifact();
        assert_eq!(Artifact::from_bytes(&a.to_bytes().unwrap()), Ok(a));
    }

    #[test]
    fn nearest_prefers_lowest_id_on_ties() {
        let a = artifact();
        assert_eq!(a.nearest(&[-0.4, 0.9]), 0);
        // equidistant from centroids 1 and 2
        assert_eq!(a.nearest(&[0.5, 0.5]), 1);
    }

    #[test]
    fn rejects_inconsistent_centroids() {
        let result = Artifact::new(vec!["Age".into()], vec![vec![0., 1.]]);
        assert!(matches!(result, Err(Error::Validation(_))));
        let result = Artifact::new(vec!["Age".into()], vec![]);
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn rejects_damaged_bytes() {
        let bytes = artifact().to_bytes().unwrap();
        let mut magic = bytes.clone();
        magic[0] = b'X';
        assert_eq!(Artifact::from_bytes(&magic), Err("bad magic".to_string()));
        for len in [0, 5, 20, bytes.len() - 1] {
            assert!(Artifact::from_bytes(&bytes[..len]).is_err(), "accepted {} bytes", len);
        }
        let mut trailing = bytes.clone();
        trailing.push(0);
        assert!(Artifact::from_bytes(&trailing).is_err());
        let mut version = bytes.clone();
        version[Artifact::MAGIC.len() + 1] = 9;
        assert!(Artifact::from_bytes(&version).is_err());
    }
}
