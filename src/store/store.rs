use super::*;
use crate::Error;
use crate::Result;
use std::path::Path;
use std::path::PathBuf;

/// Owner of the artifact file at one path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Store {
    path: PathBuf,
}

impl From<PathBuf> for Store {
    fn from(path: PathBuf) -> Self {
        Self { path }
    }
}

impl Store {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Atomically replaces the artifact at this path.
    ///
    /// Bytes go to a sibling temp file which is synced and then renamed over
    /// the target. On any failure the temp file is removed and the previous
    /// artifact, if any, is left as it was.
    pub fn save(&self, artifact: &Artifact) -> Result<()> {
        let temp = self.temp()?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let written = Self::write(&temp, &artifact.to_bytes()?)
            .and_then(|_| std::fs::rename(&temp, &self.path));
        if let Err(e) = written {
            if let Err(cleanup) = std::fs::remove_file(&temp) {
                if cleanup.kind() != std::io::ErrorKind::NotFound {
                    log::warn!("cannot remove {}: {}", temp.display(), cleanup);
                }
            }
            return Err(Error::Io(e));
        }
        log::info!("{:<32}{:<32}", "saved model", self.path.display());
        log::debug!("{:<32}{:<32}", "model clusters", artifact.k());
        Ok(())
    }

    pub fn load(&self) -> Result<Artifact> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::ModelNotFound(self.path.clone()));
            }
            Err(e) => return Err(Error::Io(e)),
        };
        let artifact = Artifact::from_bytes(&bytes).map_err(|reason| Error::ModelCorrupt {
            path: self.path.clone(),
            reason,
        })?;
        log::info!("{:<32}{:<32}", "loaded model", self.path.display());
        Ok(artifact)
    }

    fn temp(&self) -> Result<PathBuf> {
        let name = self
            .path
            .file_name()
            .ok_or_else(|| Error::Validation(format!("{} is not a file path", self.path.display())))?;
        Ok(self.path.with_file_name(format!(
            ".{}.{}.tmp",
            name.to_string_lossy(),
            std::process::id()
        )))
    }

    fn write(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
        use std::io::Write;
        let mut file = std::fs::File::create(path)?;
        file.write_all(bytes)?;
        file.sync_all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("segments-store-{}-{}", name, std::process::id()));
        std::fs::remove_dir_all(&dir).ok();
        dir
    }

    fn artifact(shift: f64) -> Artifact {
        Artifact::new(
            vec!["Age".into(), "Annual Income (k$)".into()],
            vec![vec![shift, 1.5], vec![-0.25, shift]],
        )
        .unwrap()
    }

    #[test]
    fn save_then_load() {
        let dir = scratch("roundtrip");
        let store = Store::new(dir.join("models").join("kmeans_model.bin"));
        let a = artifact(0.1);
        store.save(&a).unwrap();
        assert_eq!(store.load().unwrap(), a);
        let b = artifact(0.2);
        store.save(&b).unwrap();
        assert_eq!(store.load().unwrap(), b);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = scratch("missing");
        let store = Store::new(dir.join("absent.bin"));
        assert!(matches!(store.load(), Err(Error::ModelNotFound(_))));
    }

    #[test]
    fn damaged_file_is_corrupt() {
        let dir = scratch("corrupt");
        let store = Store::new(dir.join("model.bin"));
        store.save(&artifact(0.1)).unwrap();
        let bytes = std::fs::read(store.path()).unwrap();
        std::fs::write(store.path(), &bytes[..bytes.len() / 2]).unwrap();
        assert!(matches!(store.load(), Err(Error::ModelCorrupt { .. })));
        std::fs::write(store.path(), b"not a model").unwrap();
        assert!(matches!(store.load(), Err(Error::ModelCorrupt { .. })));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn failed_save_leaves_no_temp_file() {
        let dir = scratch("failed");
        let target = dir.join("model.bin");
        // a non-empty directory cannot be replaced by a file
        std::fs::create_dir_all(target.join("occupied")).unwrap();
        let store = Store::new(&target);
        assert!(store.save(&artifact(0.1)).is_err());
        let leftovers = std::fs::read_dir(&dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|name| name.ends_with(".tmp"))
            .collect::<Vec<_>>();
        assert!(leftovers.is_empty(), "{:?}", leftovers);
        assert!(target.join("occupied").is_dir());
        std::fs::remove_dir_all(&dir).ok();
    }
}
