//! Context and citation assembly from referenced sources.
//!
//! Turns a request's sources (full files, raw text, indexed collections)
//! plus its conversation into the final context strings and citation
//! records, driving the [`Retriever`] fan-out for collection-backed
//! sources.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::pipeline::Retriever;
use crate::result::{Metadata, QueryResult};

/// The kind of a referenced source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// A named collection (possibly a legacy multi-collection group).
    Collection,
    /// Raw text content, no retrieval.
    Text,
    /// A single uploaded file backed by a per-file collection.
    File,
}

/// How a source's content enters the context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextMode {
    /// Inject the entire stored file content verbatim, bypassing retrieval.
    Full,
}

/// Embedded file payload carried by a source.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FileData {
    /// The stored file content, when the caller supplied it inline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// A caller-supplied reference to retrievable or inline content.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Source {
    /// Identifier of the file or collection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Display name, used in context prefixes and citations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// The source kind; absent means a plain file reference.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<SourceKind>,
    /// Whether this reference uses the legacy collection naming scheme.
    #[serde(default)]
    pub legacy: bool,
    /// Explicit collection name override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_name: Option<String>,
    /// Explicit collection name list (legacy multi-collection groups).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub collection_names: Vec<String>,
    /// When set to [`ContextMode::Full`], retrieval is bypassed entirely.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<ContextMode>,
    /// Inline content for `text` sources.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Embedded file payload for `full` context sources.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<FileData>,
}

impl Source {
    /// Resolve the collection names this source refers to.
    ///
    /// Resolution rule: a `collection` kind uses the explicit name list
    /// (legacy) or its single id; an explicit `collection_name` wins next;
    /// otherwise the name is derived from `id`, with a `file-` prefix for
    /// non-legacy references.
    pub fn resolve_collection_names(&self) -> Vec<String> {
        if self.kind == Some(SourceKind::Collection) {
            if self.legacy {
                return self.collection_names.clone();
            }
            return self.id.iter().cloned().collect();
        }
        if let Some(name) = &self.collection_name {
            return vec![name.clone()];
        }
        if let Some(id) = &self.id {
            if self.legacy {
                return vec![id.clone()];
            }
            return vec![format!("file-{id}")];
        }
        Vec::new()
    }

    /// Clone this source with its embedded file payload dropped, for
    /// attachment to citations without duplicating large content.
    fn without_payload(&self) -> Source {
        let mut stripped = self.clone();
        stripped.file = None;
        stripped
    }
}

/// One chat message; retrieval is anchored to the latest `user` turn.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    /// The speaker role (`user`, `assistant`, `system`, ...).
    pub role: String,
    /// The message text.
    pub content: String,
}

/// Return the content of the most recent `user` message, if any.
pub fn last_user_message(messages: &[Message]) -> Option<&str> {
    messages.iter().rev().find(|m| m.role == "user").map(|m| m.content.as_str())
}

/// Attribution of one context record back to its source and scores.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Citation {
    /// The originating source, with embedded file payload stripped.
    pub source: Source,
    /// The document texts that entered the context.
    pub document: Vec<String>,
    /// Metadata parallel to `document`.
    pub metadata: Vec<Metadata>,
    /// Distances or relevance scores, when retrieval produced them.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distances: Option<Vec<f32>>,
}

/// A retrieval result paired with the source that produced it.
struct ContextRecord {
    result: QueryResult,
    source: Source,
}

impl Retriever {
    /// Assemble context strings and citations for a set of sources.
    ///
    /// Processes sources in order: `full` context sources inject their
    /// stored content without retrieval, `text` sources pass their inline
    /// content through, and collection-backed sources are queried (hybrid
    /// first when enabled, silently downgraded to plain vector search on
    /// hybrid failure). Collections already consulted by an earlier source
    /// in the same call are skipped. Retrieval degradation is invisible:
    /// a failed source simply contributes nothing.
    pub async fn get_context(
        &self,
        sources: &[Source],
        messages: &[Message],
    ) -> (Vec<String>, Vec<Citation>) {
        let Some(query) = last_user_message(messages) else {
            warn!("no user message in conversation, skipping retrieval");
            return (Vec::new(), Vec::new());
        };

        let mut extracted: HashSet<String> = HashSet::new();
        let mut records: Vec<ContextRecord> = Vec::new();

        for source in sources {
            if source.context == Some(ContextMode::Full) {
                let Some(content) = source.file.as_ref().and_then(|f| f.content.clone())
                else {
                    debug!(source = ?source.name, "full-context source has no content");
                    continue;
                };
                let mut metadata = Metadata::new();
                if let Some(id) = &source.id {
                    metadata.insert("file_id".into(), serde_json::Value::String(id.clone()));
                }
                if let Some(name) = &source.name {
                    metadata.insert("name".into(), serde_json::Value::String(name.clone()));
                }
                let mut result = QueryResult::new();
                result.documents.push(content);
                result.metadatas.push(metadata);
                records.push(ContextRecord { result, source: source.without_payload() });
                continue;
            }

            let collection_names: Vec<String> = source
                .resolve_collection_names()
                .into_iter()
                .filter(|name| !extracted.contains(name))
                .collect();
            if collection_names.is_empty() {
                debug!(source = ?source.name, "skipping already extracted source");
                continue;
            }

            let result = if source.kind == Some(SourceKind::Text) {
                source.content.clone().map(|content| {
                    let mut metadata = Metadata::new();
                    if let Some(name) = &source.name {
                        metadata
                            .insert("name".into(), serde_json::Value::String(name.clone()));
                    }
                    let mut result = QueryResult::new();
                    result.documents.push(content);
                    result.metadatas.push(metadata);
                    result
                })
            } else {
                self.query_sources(&collection_names, query).await
            };

            extracted.extend(collection_names);

            if let Some(result) = result {
                if !result.documents.is_empty() {
                    records.push(ContextRecord { result, source: source.without_payload() });
                }
            }
        }

        assemble_records(records)
    }

    /// Query a set of collections: hybrid first when enabled, plain vector
    /// search as the silent fallback. Returns `None` when both paths fail.
    async fn query_sources(
        &self,
        collection_names: &[String],
        query: &str,
    ) -> Option<QueryResult> {
        if self.config().hybrid_search {
            match self.query_collection_hybrid(collection_names, query).await {
                Ok(result) => return Some(result),
                Err(e) => {
                    debug!(error = %e, "hybrid search failed, falling back to vector search");
                }
            }
        }

        let embedding = match self.embedding_provider().embed_query(query).await {
            Ok(embedding) => embedding,
            Err(e) => {
                warn!(error = %e, "query embedding failed");
                return None;
            }
        };
        match self.query_collection(collection_names, &embedding).await {
            Ok(result) => Some(result),
            Err(e) => {
                warn!(error = %e, "vector search failed");
                None
            }
        }
    }
}

/// Build the final context strings and citations from context records.
fn assemble_records(records: Vec<ContextRecord>) -> (Vec<String>, Vec<Citation>) {
    let mut contexts = Vec::with_capacity(records.len());
    let mut citations = Vec::with_capacity(records.len());

    for record in records {
        let ContextRecord { result, source } = record;

        // Distinct file names, first appearance order.
        let mut seen = HashSet::new();
        let mut file_names: Vec<&str> = Vec::new();
        for metadata in &result.metadatas {
            if let Some(name) = metadata.get("name").and_then(|v| v.as_str()) {
                if seen.insert(name) {
                    file_names.push(name);
                }
            }
        }

        let prefix = if file_names.is_empty() {
            String::new()
        } else {
            format!("{}:\n\n", file_names.join(", "))
        };
        contexts.push(format!("{prefix}{}", result.documents.join("\n\n")));

        let distances = (!result.distances.is_empty()).then_some(result.distances);
        citations.push(Citation {
            source,
            document: result.documents,
            metadata: result.metadatas,
            distances,
        });
    }

    (contexts, citations)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collection_kind_uses_legacy_name_list() {
        let source = Source {
            kind: Some(SourceKind::Collection),
            legacy: true,
            collection_names: vec!["a".into(), "b".into()],
            id: Some("ignored".into()),
            ..Source::default()
        };
        assert_eq!(source.resolve_collection_names(), vec!["a", "b"]);
    }

    #[test]
    fn collection_kind_uses_id_when_not_legacy() {
        let source = Source {
            kind: Some(SourceKind::Collection),
            id: Some("col-1".into()),
            ..Source::default()
        };
        assert_eq!(source.resolve_collection_names(), vec!["col-1"]);
    }

    #[test]
    fn explicit_collection_name_wins_over_id() {
        let source = Source {
            collection_name: Some("explicit".into()),
            id: Some("f1".into()),
            ..Source::default()
        };
        assert_eq!(source.resolve_collection_names(), vec!["explicit"]);
    }

    #[test]
    fn file_id_gets_prefixed_unless_legacy() {
        let source = Source { id: Some("f1".into()), ..Source::default() };
        assert_eq!(source.resolve_collection_names(), vec!["file-f1"]);

        let legacy = Source { id: Some("f1".into()), legacy: true, ..Source::default() };
        assert_eq!(legacy.resolve_collection_names(), vec!["f1"]);
    }

    #[test]
    fn last_user_message_skips_assistant_turns() {
        let messages = vec![
            Message { role: "user".into(), content: "first".into() },
            Message { role: "assistant".into(), content: "reply".into() },
            Message { role: "user".into(), content: "second".into() },
            Message { role: "assistant".into(), content: "another".into() },
        ];
        assert_eq!(last_user_message(&messages), Some("second"));
    }

    #[test]
    fn last_user_message_empty_conversation() {
        assert_eq!(last_user_message(&[]), None);
    }

    #[test]
    fn assemble_prefixes_distinct_file_names() {
        let mut result = QueryResult::new();
        let mut m1 = Metadata::new();
        m1.insert("name".into(), serde_json::Value::String("notes.txt".into()));
        let mut m2 = Metadata::new();
        m2.insert("name".into(), serde_json::Value::String("notes.txt".into()));
        result.push(0.1, "chunk one".into(), m1);
        result.push(0.2, "chunk two".into(), m2);

        let (contexts, citations) =
            assemble_records(vec![ContextRecord { result, source: Source::default() }]);

        assert_eq!(contexts, vec!["notes.txt:\n\nchunk one\n\nchunk two"]);
        assert_eq!(citations.len(), 1);
        assert_eq!(citations[0].distances, Some(vec![0.1, 0.2]));
    }

    #[test]
    fn assemble_without_names_has_no_prefix() {
        let mut result = QueryResult::new();
        result.documents.push("just text".into());
        result.metadatas.push(Metadata::new());

        let (contexts, citations) =
            assemble_records(vec![ContextRecord { result, source: Source::default() }]);

        assert_eq!(contexts, vec!["just text"]);
        assert_eq!(citations[0].distances, None);
    }
}
