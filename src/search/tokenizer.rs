/// Splits document content into terms on whitespace.
///
/// Terms keep their case and punctuation; every occurrence is yielded, in order,
/// so repeated words produce repeated postings.
pub fn tokenize_document(content: &str) -> impl Iterator<Item = &str> {
    content.split_whitespace()
}
