//! Merge-and-sort fusion of per-collection result sets.

use crate::result::QueryResult;

/// The sort direction for fused distances.
///
/// Plain vector search populates `distances` with distance metrics (lower
/// is closer), so its results fuse [`Ascending`](SortOrder::Ascending).
/// Hybrid search populates `distances` with relevance scores (higher is
/// better), so its results fuse [`Descending`](SortOrder::Descending).
/// Never mix result sets carrying different metrics in one fusion call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Smallest first — distance semantics.
    Ascending,
    /// Largest first — relevance-score semantics.
    Descending,
}

/// Merge result sets from multiple collection queries into one globally
/// ranked, `k`-truncated result.
///
/// Flattens every input into (distance, document, metadata) tuples,
/// stable-sorts them by distance in the given order, and keeps the first
/// `k`. Empty input produces an empty [`QueryResult`]; this function never
/// fails.
pub fn merge_and_sort(results: Vec<QueryResult>, k: usize, order: SortOrder) -> QueryResult {
    let mut combined: Vec<(f32, String, crate::result::Metadata)> = Vec::new();
    for result in results {
        let QueryResult { distances, documents, metadatas } = result;
        for ((distance, document), metadata) in
            distances.into_iter().zip(documents).zip(metadatas)
        {
            combined.push((distance, document, metadata));
        }
    }

    // Stable sort: ties keep their flattened input order.
    match order {
        SortOrder::Ascending => combined.sort_by(|a, b| a.0.total_cmp(&b.0)),
        SortOrder::Descending => combined.sort_by(|a, b| b.0.total_cmp(&a.0)),
    }
    combined.truncate(k);

    let mut merged = QueryResult::with_capacity(combined.len());
    for (distance, document, metadata) in combined {
        merged.push(distance, document, metadata);
    }
    merged
}
