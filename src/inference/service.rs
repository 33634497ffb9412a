use super::*;
use crate::Energy;
use crate::Error;
use crate::Result;
use crate::store::Artifact;
use crate::store::Store;
use chrono::Utc;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::PoisonError;
use std::sync::RwLock;

/// One inference record: column name to JSON value.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// Serves predictions from the artifact loaded out of a [`Store`].
///
/// The model sits behind `RwLock<Arc<_>>`. Requests clone the `Arc` and drop
/// the lock before doing any work, so a refresh only ever waits for a
/// pointer copy, and requests already in flight finish on the model they
/// started with.
pub struct Service {
    store: Store,
    model: RwLock<Arc<Artifact>>,
    audit: Box<dyn Audit>,
}

impl Service {
    pub fn new(store: Store, artifact: Artifact, audit: impl Audit + 'static) -> Self {
        Self {
            store,
            model: RwLock::new(Arc::new(artifact)),
            audit: Box::new(audit),
        }
    }

    /// Loads the current artifact. A missing or corrupt model is fatal here.
    pub fn load(store: Store, audit: impl Audit + 'static) -> Result<Self> {
        let artifact = store.load()?;
        Ok(Self::new(store, artifact, audit))
    }

    pub fn model(&self) -> Arc<Artifact> {
        self.model
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Reloads the artifact from the store. On failure the previous model
    /// keeps serving.
    pub fn refresh(&self) -> Result<Arc<Artifact>> {
        let artifact = Arc::new(self.store.load()?);
        *self.model.write().unwrap_or_else(PoisonError::into_inner) = artifact.clone();
        log::info!("{:<32}{:<32}", "refreshed model", artifact.trained());
        Ok(artifact)
    }

    /// Cluster id for every record, in request order.
    pub fn predict(&self, batch: &[Record]) -> Result<Vec<usize>> {
        let model = self.model();
        let clusters = Self::features(&model, batch)?
            .iter()
            .map(|x| model.nearest(x))
            .collect::<Vec<usize>>();
        let entry = Entry {
            at: Utc::now(),
            model: model.trained(),
            rows: batch.len(),
            clusters: clusters.clone(),
        };
        match std::panic::catch_unwind(AssertUnwindSafe(|| self.audit.record(&entry))) {
            Ok(Ok(())) => {}
            Ok(Err(e)) => log::error!("audit failed: {:#}", e),
            Err(_) => log::error!("audit panicked, {} predictions served unrecorded", entry.rows),
        }
        Ok(clusters)
    }

    /// Contract columns of every record, in training order. Extra keys are
    /// ignored.
    pub fn features(model: &Artifact, batch: &[Record]) -> Result<Vec<Vec<Energy>>> {
        if batch.is_empty() {
            return Err(Error::Validation("empty batch".to_string()));
        }
        let missing = model
            .columns()
            .iter()
            .filter(|c| batch.iter().any(|record| !record.contains_key(*c)))
            .cloned()
            .collect::<Vec<String>>();
        if !missing.is_empty() {
            return Err(Error::Validation(format!(
                "missing required columns: {}",
                missing.join(", ")
            )));
        }
        batch
            .iter()
            .enumerate()
            .map(|(i, record)| {
                model
                    .columns()
                    .iter()
                    .map(|c| {
                        record
                            .get(c)
                            .and_then(serde_json::Value::as_f64)
                            .filter(|x| x.is_finite())
                            .ok_or_else(|| {
                                Error::Validation(format!("record {} column {:?} is not a number", i, c))
                            })
                    })
                    .collect()
            })
            .collect()
    }

    /// Parses a request body into records. The body must be a JSON array of
    /// objects.
    pub fn records(body: &[u8]) -> Result<Vec<Record>> {
        let value = serde_json::from_slice::<serde_json::Value>(body)
            .map_err(|e| Error::Validation(format!("malformed JSON: {}", e)))?;
        match value {
            serde_json::Value::Array(items) => items
                .into_iter()
                .enumerate()
                .map(|(i, item)| match item {
                    serde_json::Value::Object(record) => Ok(record),
                    _ => Err(Error::Validation(format!("record {} is not an object", i))),
                })
                .collect(),
            _ => Err(Error::Validation("expected a JSON array of records".to_string())),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    /// Keeps every entry it is handed.
    #[derive(Default)]
    pub(crate) struct Tape(pub Mutex<Vec<Entry>>);

    impl Audit for Tape {
        fn record(&self, entry: &Entry) -> anyhow::Result<()> {
            self.0.lock().unwrap().push(entry.clone());
            Ok(())
        }
    }

    struct Broken;

    impl Audit for Broken {
        fn record(&self, _: &Entry) -> anyhow::Result<()> {
            anyhow::bail!("disk full")
        }
    }

    struct Panicking;

    impl Audit for Panicking {
        fn record(&self, _: &Entry) -> anyhow::Result<()> {
            panic!("sink exploded")
        }
    }

    pub(crate) fn columns() -> Vec<String> {
        ["Age", "Annual Income (k$)", "Spending Score (1-100)", "Gender_Female", "Gender_Male"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    pub(crate) fn artifact() -> Artifact {
        Artifact::new(
            columns(),
            vec![
                vec![0., 0., 0., 1., 0.],
                vec![1., 1., 1., 0., 1.],
                vec![-1., -1., 2., 1., 0.],
            ],
        )
        .unwrap()
    }

    pub(crate) fn record(x: [f64; 5]) -> Record {
        columns()
            .into_iter()
            .zip(x)
            .map(|(c, v)| (c, json!(v)))
            .collect()
    }

    fn service(audit: impl Audit + 'static) -> Service {
        Service::new(Store::new("unused.bin"), artifact(), audit)
    }

    #[test]
    fn predicts_nearest_in_request_order() {
        let tape = Arc::new(Tape::default());
        let service = service(tape.clone());
        let mut extra = record([-1., -1., 2., 1., 0.]);
        extra.insert("CustomerID".into(), json!("c-17"));
        let batch = vec![record([1., 1., 1., 0., 1.]), record([0.1, 0., 0., 1., 0.]), extra];
        assert_eq!(service.predict(&batch).unwrap(), vec![1, 0, 2]);
        assert_eq!(service.predict(&batch).unwrap(), vec![1, 0, 2]);
        let entries = tape.0.lock().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].rows, 3);
        assert_eq!(entries[0].clusters, vec![1, 0, 2]);
    }

    #[test]
    fn missing_column_predicts_nothing() {
        let tape = Arc::new(Tape::default());
        let service = service(tape.clone());
        let mut partial = record([0., 0., 0., 1., 0.]);
        partial.remove("Gender_Male");
        let result = service.predict(&[record([0., 0., 0., 1., 0.]), partial]);
        match result {
            Err(Error::Validation(msg)) => assert!(msg.contains("Gender_Male"), "{}", msg),
            other => panic!("expected validation error, got {:?}", other),
        }
        assert!(tape.0.lock().unwrap().is_empty());
    }

    #[test]
    fn non_numeric_values_are_rejected() {
        let service = service(LogAudit);
        let mut bad = record([0., 0., 0., 1., 0.]);
        bad.insert("Age".into(), json!("nineteen"));
        assert!(matches!(service.predict(&[bad]), Err(Error::Validation(_))));
        assert!(matches!(service.predict(&[]), Err(Error::Validation(_))));
    }

    #[test]
    fn broken_audit_does_not_fail_the_request() {
        let service = service(Broken);
        assert_eq!(service.predict(&[record([0., 0., 0., 1., 0.])]).unwrap(), vec![0]);
    }

    #[test]
    fn panicking_audit_does_not_fail_the_request() {
        let service = service(Panicking);
        assert_eq!(service.predict(&[record([0., 0., 0., 1., 0.])]).unwrap(), vec![0]);
        assert_eq!(service.predict(&[record([1., 1., 1., 0., 1.])]).unwrap(), vec![1]);
    }

    #[test]
    fn records_must_be_an_array_of_objects() {
        assert_eq!(Service::records(b"[{\"Age\": 1}]").unwrap().len(), 1);
        assert!(matches!(Service::records(b"{\"Age\": 1}"), Err(Error::Validation(_))));
        assert!(matches!(Service::records(b"[1, 2]"), Err(Error::Validation(_))));
        assert!(matches!(Service::records(b"[{"), Err(Error::Validation(_))));
    }

    #[test]
    fn refresh_swaps_model_and_failure_keeps_it() {
        let dir = std::env::temp_dir().join(format!("segments-refresh-{}", std::process::id()));
        let store = Store::new(dir.join("model.bin"));
        let service = Service::new(store.clone(), artifact(), LogAudit);
        assert!(matches!(service.refresh(), Err(Error::ModelNotFound(_))));
        assert_eq!(service.model().k(), 3);
        let smaller = Artifact::new(columns(), vec![vec![0.; 5], vec![9.; 5]]).unwrap();
        store.save(&smaller).unwrap();
        assert_eq!(service.refresh().unwrap().k(), 2);
        assert_eq!(service.predict(&[record([8., 8., 8., 8., 8.])]).unwrap(), vec![1]);
        std::fs::remove_dir_all(&dir).ok();
    }
}
