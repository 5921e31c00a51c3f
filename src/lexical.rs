//! Lexical (keyword) retrieval for the hybrid search path.

use std::collections::HashMap;

use crate::result::Metadata;

/// A keyword retriever that ranks raw texts against a query.
///
/// The hybrid path hands this the *entire* stored text set of a collection
/// and expects its own top-k back, paired with the metadata of each
/// surviving text. Implementations are synchronous and stateless across
/// calls; indexes are built per invocation over the given texts.
pub trait LexicalRetriever: Send + Sync {
    /// Rank `texts` against `query` and return the top `k` as
    /// (text, metadata) pairs, most relevant first.
    ///
    /// `texts` and `metadatas` are parallel arrays.
    fn top_k(
        &self,
        texts: &[String],
        metadatas: &[Metadata],
        query: &str,
        k: usize,
    ) -> Vec<(String, Metadata)>;
}

/// BM25 (Okapi) keyword retriever.
///
/// Builds an in-memory inverted index over the supplied texts on every
/// call and scores them with the BM25 formula. Tokenization is whitespace
/// splitting over lowercased, alphanumeric-filtered text.
#[derive(Debug, Clone)]
pub struct Bm25Retriever {
    k1: f32,
    b: f32,
}

impl Default for Bm25Retriever {
    fn default() -> Self {
        Self { k1: 1.2, b: 0.75 }
    }
}

impl Bm25Retriever {
    /// Create a retriever with the standard BM25 parameters
    /// (`k1 = 1.2`, `b = 0.75`).
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a retriever with custom BM25 parameters.
    pub fn with_params(k1: f32, b: f32) -> Self {
        Self { k1, b }
    }
}

fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

impl LexicalRetriever for Bm25Retriever {
    fn top_k(
        &self,
        texts: &[String],
        metadatas: &[Metadata],
        query: &str,
        k: usize,
    ) -> Vec<(String, Metadata)> {
        if texts.is_empty() || k == 0 {
            return Vec::new();
        }

        let tokenized: Vec<Vec<String>> = texts.iter().map(|t| tokenize(t)).collect();
        let doc_count = tokenized.len() as f32;
        let avg_doc_len =
            tokenized.iter().map(|t| t.len()).sum::<usize>() as f32 / doc_count.max(1.0);

        // Term -> document frequency across the corpus.
        let mut doc_freqs: HashMap<&str, f32> = HashMap::new();
        let mut term_freqs: Vec<HashMap<&str, f32>> = Vec::with_capacity(tokenized.len());
        for tokens in &tokenized {
            let mut freqs: HashMap<&str, f32> = HashMap::new();
            for token in tokens {
                *freqs.entry(token.as_str()).or_insert(0.0) += 1.0;
            }
            for term in freqs.keys() {
                *doc_freqs.entry(*term).or_insert(0.0) += 1.0;
            }
            term_freqs.push(freqs);
        }

        let query_terms = tokenize(query);
        let mut scored: Vec<(f32, usize)> = Vec::with_capacity(tokenized.len());
        for (idx, freqs) in term_freqs.iter().enumerate() {
            let doc_len = tokenized[idx].len() as f32;
            let mut score = 0.0;
            for term in &query_terms {
                let Some(&tf) = freqs.get(term.as_str()) else { continue };
                let df = doc_freqs.get(term.as_str()).copied().unwrap_or(0.0);
                let idf = ((doc_count - df + 0.5) / (df + 0.5) + 1.0).ln();
                score += idf * (tf * (self.k1 + 1.0))
                    / (tf + self.k1 * (1.0 - self.b + self.b * doc_len / avg_doc_len.max(1e-6)));
            }
            scored.push((score, idx));
        }

        scored.sort_by(|a, b| b.0.total_cmp(&a.0));
        scored
            .into_iter()
            .take(k)
            .map(|(_, idx)| {
                (texts[idx].clone(), metadatas.get(idx).cloned().unwrap_or_default())
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(name: &str) -> Metadata {
        let mut m = Metadata::new();
        m.insert("name".into(), serde_json::Value::String(name.into()));
        m
    }

    #[test]
    fn ranks_exact_term_matches_first() {
        let texts = vec![
            "the cat sat on the mat".to_string(),
            "dogs chase cars all day".to_string(),
            "a cat and another cat".to_string(),
        ];
        let metadatas = vec![meta("a"), meta("b"), meta("c")];

        let retriever = Bm25Retriever::new();
        let results = retriever.top_k(&texts, &metadatas, "cat", 2);

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].0, "a cat and another cat");
        assert_eq!(results[1].0, "the cat sat on the mat");
    }

    #[test]
    fn keeps_metadata_paired_with_text() {
        let texts = vec!["alpha beta".to_string(), "gamma delta".to_string()];
        let metadatas = vec![meta("first"), meta("second")];

        let retriever = Bm25Retriever::new();
        let results = retriever.top_k(&texts, &metadatas, "gamma", 1);

        assert_eq!(results[0].0, "gamma delta");
        assert_eq!(results[0].1["name"], "second");
    }

    #[test]
    fn empty_corpus_returns_nothing() {
        let retriever = Bm25Retriever::new();
        assert!(retriever.top_k(&[], &[], "query", 5).is_empty());
    }

    #[test]
    fn truncates_to_k() {
        let texts: Vec<String> = (0..10).map(|i| format!("term doc {i}")).collect();
        let metadatas = vec![Metadata::new(); 10];

        let retriever = Bm25Retriever::new();
        assert_eq!(retriever.top_k(&texts, &metadatas, "term", 3).len(), 3);
    }
}
