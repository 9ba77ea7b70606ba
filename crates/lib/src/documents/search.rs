//! Search over the document listing.

use super::Document;

/// Case-insensitive substring match of `query` against display names.
///
/// Results keep listing order. A blank query matches nothing; the full
/// listing is a separate surface.
pub fn search<'a>(query: &str, documents: &'a [Document]) -> Vec<&'a Document> {
    if query.trim().is_empty() {
        return Vec::new();
    }

    let needle = query.to_lowercase();
    documents
        .iter()
        .filter(|doc| doc.display_name.to_lowercase().contains(&needle))
        .collect()
}
