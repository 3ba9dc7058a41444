use super::batch::{batch_count, batches};
use super::RunPhase;
use crate::error::SnapshotResult;
use crate::record::MarketRecord;
use crate::store::SnapshotStore;
use tracing::{error, info};

/// Send `snapshot` to the store one batch at a time, in order.
///
/// The first rejected batch aborts the loop: earlier batches stay committed,
/// later ones are never sent. Returns the number of batches written.
pub async fn upsert_batches(
    store: &dyn SnapshotStore,
    table: &str,
    conflict_key: &str,
    snapshot: &[MarketRecord],
    batch_size: usize,
) -> SnapshotResult<usize> {
    let of = batch_count(snapshot.len(), batch_size);

    for (i, batch) in batches(snapshot, batch_size).enumerate() {
        let phase = RunPhase::Upserting { batch: i + 1, of };
        info!("{}: {} records", phase, batch.len());

        if let Err(e) = store.upsert(table, conflict_key, batch).await {
            let e = e.at_batch(i + 1, of);
            error!("{}", e);
            return Err(e);
        }
    }

    Ok(of)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SnapshotError;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingStore {
        calls: Mutex<Vec<(String, String, usize)>>,
    }

    #[async_trait]
    impl SnapshotStore for RecordingStore {
        async fn upsert(
            &self,
            table: &str,
            conflict_key: &str,
            batch: &[MarketRecord],
        ) -> SnapshotResult<()> {
            self.calls
                .lock()
                .unwrap()
                .push((table.to_string(), conflict_key.to_string(), batch.len()));
            Ok(())
        }
    }

    fn records(n: usize) -> Vec<MarketRecord> {
        (0..n)
            .map(|i| MarketRecord::try_from(json!({"id": format!("coin-{i}")})).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_batches_sent_in_order() {
        let store = RecordingStore::default();
        let written = upsert_batches(&store, "snapshot", "id", &records(450), 200)
            .await
            .unwrap();
        assert_eq!(written, 3);

        let calls = store.calls.lock().unwrap().clone();
        assert_eq!(
            calls,
            vec![
                ("snapshot".into(), "id".into(), 200),
                ("snapshot".into(), "id".into(), 200),
                ("snapshot".into(), "id".into(), 50),
            ]
        );
    }

    #[tokio::test]
    async fn test_empty_snapshot_sends_nothing() {
        let store = RecordingStore::default();
        let written = upsert_batches(&store, "snapshot", "id", &[], 200)
            .await
            .unwrap();
        assert_eq!(written, 0);
        assert!(store.calls.lock().unwrap().is_empty());
    }

    struct RejectsSecond {
        attempts: Mutex<usize>,
    }

    #[async_trait]
    impl SnapshotStore for RejectsSecond {
        async fn upsert(&self, _: &str, _: &str, _: &[MarketRecord]) -> SnapshotResult<()> {
            let mut attempts = self.attempts.lock().unwrap();
            *attempts += 1;
            if *attempts == 2 {
                return Err(SnapshotError::Persistence {
                    batch: 0,
                    of: 0,
                    detail: "HTTP 409 Conflict".into(),
                });
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_failure_aborts_remaining_batches() {
        let store = RejectsSecond {
            attempts: Mutex::new(0),
        };
        let err = upsert_batches(&store, "snapshot", "id", &records(600), 200)
            .await
            .unwrap_err();

        assert_eq!(*store.attempts.lock().unwrap(), 2);
        assert!(matches!(
            err,
            SnapshotError::Persistence { batch: 2, of: 3, .. }
        ));
        assert!(err.to_string().contains("409"));
    }
}
