use crate::{
    metadata::{FieldValue, Metadata},
    suggestion::Suggestion,
};

/// Whether a post still needs suggestions. Posts that already carry both
/// tags and keywords are left alone unless `force` is set.
pub(crate) fn should_process(metadata: &Metadata, force: bool) -> bool {
    force || !(is_populated(metadata, "tags") && is_populated(metadata, "keywords"))
}

fn is_populated(metadata: &Metadata, name: &str) -> bool {
    metadata.get(name).is_some_and(|v| !v.is_empty())
}

/// Replaces tags and keywords with the suggested lists and fills in a
/// missing author. Existing authors are never touched.
pub(crate) fn apply_suggestion(
    metadata: &mut Metadata,
    suggestion: &Suggestion,
    default_author: &str,
) {
    if let Some(tags) = &suggestion.tags {
        metadata.insert("tags", FieldValue::List(tags.clone()));
    }
    if let Some(keywords) = &suggestion.keywords {
        metadata.insert("keywords", FieldValue::List(keywords.clone()));
    }
    if metadata.get("author").map_or(true, FieldValue::is_empty) {
        metadata.insert("author", FieldValue::Text(default_author.to_string()));
    }
}
