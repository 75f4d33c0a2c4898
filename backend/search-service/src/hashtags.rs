//! Hashtag extraction
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

static HASHTAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"#(\w+)").expect("Invalid hashtag regex"));

/// Extract the set of hashtags from post content
///
/// Tags are matched as `#` followed by word characters, lowercased and
/// deduplicated. Empty content yields an empty set.
pub fn extract_hashtags(content: &str) -> Vec<String> {
    let unique: BTreeSet<String> = HASHTAG_RE
        .captures_iter(content)
        .map(|cap| cap[1].to_lowercase())
        .collect();
    unique.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_word_tags_lowercased() {
        let tags = extract_hashtags("Curtindo o #Carnaval2026 com #amigos! #carnaval2026");
        assert_eq!(tags, vec!["amigos", "carnaval2026"]);
    }

    #[test]
    fn empty_content_yields_no_tags() {
        assert!(extract_hashtags("").is_empty());
        assert!(extract_hashtags("no tags here").is_empty());
    }

    #[test]
    fn stops_at_non_word_characters() {
        let tags = extract_hashtags("#rust-lang #foo.bar");
        assert_eq!(tags, vec!["foo", "rust"]);
    }

    #[test]
    fn bare_hash_is_not_a_tag() {
        assert!(extract_hashtags("# nothing").is_empty());
    }

    #[test]
    fn underscores_and_digits_are_word_characters() {
        let tags = extract_hashtags("#bom_dia #top10");
        assert_eq!(tags, vec!["bom_dia", "top10"]);
    }
}
