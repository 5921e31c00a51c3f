//! Property tests for result fusion ordering, truncation, and parallelism.

use proptest::prelude::*;
use ragfuse::{merge_and_sort, Metadata, QueryResult, SortOrder};

/// Generate one result set whose documents and metadata are tagged with a
/// unique (set, index) origin so parallelism can be checked after fusion.
fn tagged_result(set_idx: usize, distances: Vec<f32>) -> QueryResult {
    let mut result = QueryResult::new();
    for (i, distance) in distances.into_iter().enumerate() {
        let mut metadata = Metadata::new();
        metadata.insert(
            "origin".to_string(),
            serde_json::Value::String(format!("{set_idx}:{i}")),
        );
        result.push(distance, format!("doc {set_idx}:{i}"), metadata);
    }
    result
}

fn arb_result_sets() -> impl Strategy<Value = Vec<Vec<f32>>> {
    proptest::collection::vec(
        proptest::collection::vec(-10.0f32..10.0f32, 0..8),
        0..5,
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Ascending fusion yields non-decreasing distances; descending
    /// fusion yields non-increasing distances.
    #[test]
    fn fused_distances_are_ordered(sets in arb_result_sets(), k in 0usize..20) {
        let build = |sets: &[Vec<f32>]| -> Vec<QueryResult> {
            sets.iter().cloned().enumerate().map(|(i, d)| tagged_result(i, d)).collect()
        };

        let ascending = merge_and_sort(build(&sets), k, SortOrder::Ascending);
        prop_assert!(ascending.distances.windows(2).all(|w| w[0] <= w[1]));

        let descending = merge_and_sort(build(&sets), k, SortOrder::Descending);
        prop_assert!(descending.distances.windows(2).all(|w| w[0] >= w[1]));
    }

    /// The fused result holds exactly `min(k, total items)` entries.
    #[test]
    fn fused_length_is_min_of_k_and_total(sets in arb_result_sets(), k in 0usize..20) {
        let total: usize = sets.iter().map(Vec::len).sum();
        let results: Vec<QueryResult> =
            sets.into_iter().enumerate().map(|(i, d)| tagged_result(i, d)).collect();

        let fused = merge_and_sort(results, k, SortOrder::Ascending);
        prop_assert_eq!(fused.len(), total.min(k));
        prop_assert_eq!(fused.distances.len(), fused.documents.len());
        prop_assert_eq!(fused.documents.len(), fused.metadatas.len());
    }

    /// After fusion, index i of every array still describes the same
    /// source tuple.
    #[test]
    fn fused_arrays_stay_parallel(sets in arb_result_sets(), k in 0usize..20) {
        let results: Vec<QueryResult> =
            sets.into_iter().enumerate().map(|(i, d)| tagged_result(i, d)).collect();

        let fused = merge_and_sort(results, k, SortOrder::Descending);
        for i in 0..fused.len() {
            let origin = fused.metadatas[i]["origin"].as_str().unwrap();
            prop_assert_eq!(&fused.documents[i], &format!("doc {origin}"));
        }
    }
}

#[test]
fn empty_input_yields_empty_result() {
    let fused = merge_and_sort(Vec::new(), 7, SortOrder::Ascending);
    assert!(fused.distances.is_empty());
    assert!(fused.documents.is_empty());
    assert!(fused.metadatas.is_empty());
}
