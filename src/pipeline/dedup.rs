//! Duplicate detection and last-write-wins deduplication.

use crate::record::{MarketRecord, RecordKey};
use std::collections::{HashMap, HashSet};

/// Keys that appear more than once, each reported once, in order of first
/// occurrence. Keyless records are ignored.
pub fn find_duplicates(records: &[MarketRecord], key_field: &str) -> Vec<RecordKey> {
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    let mut duplicates = Vec::new();

    for key in records.iter().filter_map(|r| r.key(key_field)) {
        if !seen.insert(key.clone()) && reported.insert(key.clone()) {
            duplicates.push(key);
        }
    }
    duplicates
}

/// Result of [`deduplicate`].
#[derive(Debug, Clone, PartialEq)]
pub struct Deduplicated {
    pub records: Vec<MarketRecord>,
    /// Records dropped because they had no usable key.
    pub keyless: usize,
}

/// Keep one record per key; the last record bearing a key wins.
///
/// Survivors stay in input order at the position of their last occurrence,
/// so `[1a, 2b, 1c]` becomes `[2b, 1c]`.
pub fn deduplicate(records: Vec<MarketRecord>, key_field: &str) -> Deduplicated {
    let keys: Vec<Option<RecordKey>> = records.iter().map(|r| r.key(key_field)).collect();

    let mut last_index: HashMap<&RecordKey, usize> = HashMap::with_capacity(keys.len());
    for (i, key) in keys.iter().enumerate() {
        if let Some(key) = key {
            last_index.insert(key, i);
        }
    }

    let mut keyless = 0;
    let mut out = Vec::with_capacity(last_index.len());
    for (i, record) in records.into_iter().enumerate() {
        match &keys[i] {
            Some(key) if last_index.get(key) == Some(&i) => out.push(record),
            Some(_) => {}
            None => keyless += 1,
        }
    }

    Deduplicated {
        records: out,
        keyless,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn records(values: Vec<Value>) -> Vec<MarketRecord> {
        values
            .into_iter()
            .map(|v| MarketRecord::try_from(v).unwrap())
            .collect()
    }

    #[test]
    fn test_reference_scenario() {
        let input = records(vec![
            json!({"id": 1, "v": "a"}),
            json!({"id": 2, "v": "b"}),
            json!({"id": 1, "v": "c"}),
        ]);

        assert_eq!(find_duplicates(&input, "id"), vec![RecordKey::from("1")]);

        let out = deduplicate(input, "id");
        assert_eq!(
            out.records,
            records(vec![json!({"id": 2, "v": "b"}), json!({"id": 1, "v": "c"})])
        );
        assert_eq!(out.keyless, 0);
    }

    #[test]
    fn test_no_duplicates_is_identity() {
        let input = records(vec![
            json!({"id": "bitcoin"}),
            json!({"id": "ethereum"}),
            json!({"id": "tether"}),
        ]);
        assert!(find_duplicates(&input, "id").is_empty());
        assert_eq!(deduplicate(input.clone(), "id").records, input);
    }

    #[test]
    fn test_duplicates_reported_once_in_first_seen_order() {
        let input = records(vec![
            json!({"id": "b"}),
            json!({"id": "a"}),
            json!({"id": "a"}),
            json!({"id": "b"}),
            json!({"id": "a"}),
        ]);
        assert_eq!(
            find_duplicates(&input, "id"),
            vec![RecordKey::from("a"), RecordKey::from("b")]
        );
    }

    #[test]
    fn test_last_record_wins_per_key() {
        let input = records(vec![
            json!({"id": "x", "rank": 1}),
            json!({"id": "y", "rank": 2}),
            json!({"id": "x", "rank": 3}),
            json!({"id": "z", "rank": 4}),
            json!({"id": "y", "rank": 5}),
        ]);
        let out = deduplicate(input, "id").records;
        assert_eq!(out.len(), 3);
        let ranks: Vec<_> = out.iter().map(|r| r.get("rank").cloned().unwrap()).collect();
        assert_eq!(ranks, vec![json!(3), json!(4), json!(5)]);
    }

    #[test]
    fn test_idempotent() {
        let input = records(vec![
            json!({"id": "x", "v": 1}),
            json!({"id": "y", "v": 2}),
            json!({"id": "x", "v": 3}),
        ]);
        let once = deduplicate(input, "id").records;
        let twice = deduplicate(once.clone(), "id").records;
        assert_eq!(once, twice);
    }

    #[test]
    fn test_keyless_records_dropped() {
        let input = records(vec![
            json!({"id": "x"}),
            json!({"symbol": "???"}),
            json!({"id": null}),
        ]);
        let out = deduplicate(input, "id");
        assert_eq!(out.records.len(), 1);
        assert_eq!(out.keyless, 2);
    }

    #[test]
    fn test_string_and_number_keys_same_row() {
        let input = records(vec![json!({"id": 1, "v": "a"}), json!({"id": "1", "v": "b"})]);
        assert_eq!(find_duplicates(&input, "id"), vec![RecordKey::from("1")]);
        let out = deduplicate(input, "id").records;
        assert_eq!(out, records(vec![json!({"id": "1", "v": "b"})]));
    }

    #[test]
    fn test_custom_key_field() {
        let input = records(vec![
            json!({"id": "a", "symbol": "btc"}),
            json!({"id": "b", "symbol": "btc"}),
        ]);
        let out = deduplicate(input, "symbol").records;
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].key("id").unwrap().as_str(), "b");
    }
}
