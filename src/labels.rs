pub const DEFAULT_LABEL_WORDS: usize = 3;

/// Shortens a term name for chart labels: everything from the first `(` on is
/// dropped and at most `max_words` words are kept.
pub fn clean_label(text: &str, max_words: usize) -> String {
    let head = text.split('(').next().unwrap_or_default().trim();
    head.split_whitespace()
        .take(max_words)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_go_identifier() {
        assert_eq!(
            clean_label("Apoptosis Regulation Pathway (GO:001234)", 3),
            "Apoptosis Regulation Pathway"
        );
    }

    #[test]
    fn short_labels_are_unchanged() {
        assert_eq!(clean_label("A B", 3), "A B");
    }

    #[test]
    fn truncates_and_collapses_whitespace() {
        assert_eq!(
            clean_label("positive   regulation of cell\tmigration (GO:0030335)", 3),
            "positive regulation of"
        );
        assert_eq!(
            clean_label("Cell Cycle R-HSA-1640170", DEFAULT_LABEL_WORDS),
            "Cell Cycle R-HSA-1640170"
        );
    }

    #[test]
    fn leading_parenthesis_yields_empty_label() {
        assert_eq!(clean_label("(unnamed)", 3), "");
    }
}
