//! Prompt template substitution for retrieved context.

use tracing::warn;
use uuid::Uuid;

/// The template used when the caller supplies an empty one.
pub const DEFAULT_RAG_TEMPLATE: &str = "\
Use the following context as your learned knowledge, inside <context></context> XML tags.
<context>
[context]
</context>

When answering the user:
- If you don't know, just say that you don't know.
- If you don't know when you are not sure, ask for clarification.
Avoid mentioning that you obtained the information from the context.
And answer according to the language of the user's question.

Given the context information, answer the query.
Query: [query]";

/// Substitute the retrieved context and the user's query into a prompt
/// template.
///
/// An empty template falls back to [`DEFAULT_RAG_TEMPLATE`]. Missing
/// placeholders and suspected prompt injection in the context are logged
/// as warnings, never fatal.
///
/// Literal `[query]` or `{{QUERY}}` text arriving *inside the context* is
/// treated as opaque content: before the context is inserted, the
/// template's own query placeholders are swapped for unique markers, so
/// the later query substitution cannot touch placeholder-like text that
/// the context brought along.
pub fn rag_template(template: &str, context: &str, query: &str) -> String {
    let mut template = if template.is_empty() {
        DEFAULT_RAG_TEMPLATE.to_string()
    } else {
        template.to_string()
    };

    if !template.contains("[context]") && !template.contains("{{CONTEXT}}") {
        warn!("RAG template does not contain the '[context]' or '{{{{CONTEXT}}}}' placeholder");
    }

    if context.contains("<context>") && context.contains("</context>") {
        warn!(
            "potential prompt injection: the RAG context contains '<context>' and '</context>'"
        );
    }

    let mut query_markers: Vec<String> = Vec::new();
    for placeholder in ["[query]", "{{QUERY}}"] {
        if context.contains(placeholder) {
            let marker = format!("{{{{QUERY{}}}}}", Uuid::new_v4());
            template = template.replace(placeholder, &marker);
            query_markers.push(marker);
        }
    }

    template = template.replace("[context]", context);
    template = template.replace("{{CONTEXT}}", context);

    // Placeholder styles that the context itself contains were already
    // swapped for markers above; replacing them here would clobber the
    // context's literal text.
    for placeholder in ["[query]", "{{QUERY}}"] {
        if !context.contains(placeholder) {
            template = template.replace(placeholder, query);
        }
    }

    for marker in query_markers {
        template = template.replace(&marker, query);
    }

    template
}
