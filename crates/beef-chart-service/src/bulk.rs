//! Admin bulk edit.
//!
//! Entries are keyed by id as posted. Each entry is read, coerced, validated
//! and applied on its own; a rejected entry never stops the rest of the batch.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use beef_chart_core::{coerce_id, BulkEditEntry, BulkEditReport, CutId, EditError};
use beef_chart_store::CatalogRepository;

/// Apply a batch of posted entries in ascending id order.
///
/// Keys that coerce to the same id (`"1"` and `"01"`) make the request
/// ambiguous, so every entry for that id is rejected.
pub async fn apply_bulk_edit(
    repository: &CatalogRepository,
    entries: &Map<String, Value>,
) -> BulkEditReport {
    let mut by_id: BTreeMap<u64, Vec<&Value>> = BTreeMap::new();
    for (key, value) in entries {
        by_id.entry(coerce_id(key)).or_default().push(value);
    }

    let mut report = BulkEditReport::default();
    for (id, values) in by_id {
        let outcome = match values.as_slice() {
            [value] => apply_entry(repository, id, value).await,
            _ => Err(EditError::DuplicateId { id }),
        };

        match outcome {
            Ok(()) => report.record_success(),
            Err(error) => {
                tracing::warn!(id, error = %error, "Bulk edit entry rejected");
                report.record_error(error);
            }
        }
    }

    tracing::info!(
        updated = report.updated,
        errors = report.errors.len(),
        status = ?report.status(),
        "Bulk edit applied"
    );
    report
}

async fn apply_entry(
    repository: &CatalogRepository,
    id: u64,
    value: &Value,
) -> Result<(), EditError> {
    let entry = BulkEditEntry::from_json(value).ok_or(EditError::Malformed { id })?;
    let update = entry.to_update(id)?;

    match repository.exists(id).await {
        Ok(true) => {}
        Ok(false) => return Err(EditError::NotFound { id }),
        Err(e) => {
            tracing::error!(id, error = %e, "Existence check failed");
            return Err(EditError::UpdateFailed { id });
        }
    }

    let cut_id = CutId::new(id).ok_or(EditError::NotFound { id })?;
    if repository.update(cut_id, &update).await {
        Ok(())
    } else {
        Err(EditError::UpdateFailed { id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use beef_chart_core::{default_catalog, BulkStatus};
    use beef_chart_store::{CacheConfig, MemoryStore};
    use serde_json::json;

    async fn seeded() -> CatalogRepository {
        let store = Arc::new(MemoryStore::new("wp_beef_chart_data"));
        let repo = CatalogRepository::new(store, CacheConfig::default());
        repo.create_table().await;
        for cut in default_catalog() {
            repo.insert(&cut).await;
        }
        repo
    }

    fn batch(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("not an object: {other}"),
        }
    }

    #[tokio::test]
    async fn partial_batch_reports_each_rejection() {
        let repo = seeded().await;
        let entries = batch(json!({
            "1": { "price": "18.50", "available": true },
            "2": { "price": "10000", "available": true },
            "999": { "price": "5", "available": true }
        }));

        let report = apply_bulk_edit(&repo, &entries).await;
        assert_eq!(report.updated, 1);
        assert_eq!(report.status(), BulkStatus::Partial);
        assert_eq!(
            report.errors,
            vec![
                EditError::InvalidPrice {
                    id: 2,
                    price: 10000.0
                },
                EditError::NotFound { id: 999 },
            ]
        );

        let all = repo.get_all().await.unwrap();
        assert_eq!(all[0].price.cents(), 1850);
        assert_eq!(all[1].price.cents(), 3500);
    }

    #[tokio::test]
    async fn entries_run_in_numeric_id_order() {
        let repo = seeded().await;
        let entries = batch(json!({
            "10": { "price": "abc" },
            "9": { "price": "-1", "available": true },
            "x": { "price": "1", "available": true }
        }));

        let report = apply_bulk_edit(&repo, &entries).await;
        assert_eq!(
            report.errors,
            vec![
                EditError::NotFound { id: 0 },
                EditError::InvalidPrice { id: 9, price: -1.0 },
            ]
        );
        assert_eq!(report.updated, 1);

        let tenth = repo.get_all().await.unwrap().remove(9);
        assert_eq!(tenth.price.cents(), 0);
        assert!(!tenth.available);
    }

    #[tokio::test]
    async fn missing_fields_default_to_zero_and_unavailable() {
        let repo = seeded().await;
        let entries = batch(json!({ "3": {} }));

        let report = apply_bulk_edit(&repo, &entries).await;
        assert_eq!(report.status(), BulkStatus::Success);

        let third = repo.get_all().await.unwrap().remove(2);
        assert_eq!(third.price.cents(), 0);
        assert!(!third.available);
    }

    #[tokio::test]
    async fn malformed_entry_does_not_block_the_batch() {
        let repo = seeded().await;
        let entries = batch(json!({
            "1": { "price": "20", "available": "on" },
            "2": "30",
            "3": { "price": true, "available": "1" },
            "4": { "price": "40" }
        }));

        let report = apply_bulk_edit(&repo, &entries).await;
        assert_eq!(report.updated, 3);
        assert_eq!(report.errors, vec![EditError::Malformed { id: 2 }]);

        let all = repo.get_all().await.unwrap();
        assert_eq!(all[0].price.cents(), 2000);
        assert!(all[0].available);
        assert_eq!(all[1].price.cents(), 3500);
        assert_eq!(all[2].price.cents(), 0);
        assert!(all[2].available);
        assert_eq!(all[3].price.cents(), 4000);
        assert!(!all[3].available);
    }

    #[tokio::test]
    async fn keys_naming_the_same_id_are_rejected() {
        let repo = seeded().await;
        let entries = batch(json!({
            "1": { "price": "20", "available": true },
            "01": { "price": "30", "available": true },
            "2": { "price": "40", "available": true }
        }));

        let report = apply_bulk_edit(&repo, &entries).await;
        assert_eq!(report.updated, 1);
        assert_eq!(report.errors, vec![EditError::DuplicateId { id: 1 }]);

        let all = repo.get_all().await.unwrap();
        assert_eq!(all[0].price.cents(), 1500);
        assert_eq!(all[1].price.cents(), 4000);
    }

    #[tokio::test]
    async fn empty_batch_is_failure() {
        let repo = seeded().await;
        let report = apply_bulk_edit(&repo, &Map::new()).await;
        assert_eq!(report.updated, 0);
        assert_eq!(report.status(), BulkStatus::Failure);
    }
}
