/// Upper bound on the number of permanodes requested per search.
pub const MAX_IN_RESPONSE: usize = 100;

const TAG_PREFIX: &str = "tag:";
const TITLE_PREFIX: &str = "title:";

/// Attribute a search is scoped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchAttribute {
    Tag,
    Title,
}

impl SearchAttribute {
    /// Attribute name as the index knows it.
    pub fn as_str(self) -> &'static str {
        match self {
            SearchAttribute::Tag => "tag",
            SearchAttribute::Title => "title",
        }
    }
}

/// Structured permanode search.
///
/// A scoped search (`attribute` set) is never fuzzy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub attribute: Option<SearchAttribute>,
    pub value: String,
    pub fuzzy: bool,
    pub limit: usize,
}

impl SearchRequest {
    /// Attribute name for the wire, empty for an unscoped search.
    pub fn attribute_name(&self) -> &'static str {
        self.attribute.map(SearchAttribute::as_str).unwrap_or("")
    }
}

/// Classifies raw search text by its literal prefix.
///
/// `tag:` is checked before `title:`. Nothing is trimmed or unescaped and an
/// empty remainder is passed through as an empty value.
pub fn translate_query(raw: &str) -> SearchRequest {
    let (attribute, value, fuzzy) = if let Some(rest) = raw.strip_prefix(TAG_PREFIX) {
        (Some(SearchAttribute::Tag), rest, false)
    } else if let Some(rest) = raw.strip_prefix(TITLE_PREFIX) {
        (Some(SearchAttribute::Title), rest, false)
    } else {
        (None, raw, true)
    };

    SearchRequest {
        attribute,
        value: value.to_string(),
        fuzzy,
        limit: MAX_IN_RESPONSE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_match_is_case_sensitive() {
        let request = translate_query("TAG:beach");
        assert_eq!(request.attribute, None);
        assert!(request.fuzzy);
        assert_eq!(request.value, "TAG:beach");
    }

    #[test]
    fn whitespace_is_kept() {
        let request = translate_query("title: Annual Report ");
        assert_eq!(request.attribute, Some(SearchAttribute::Title));
        assert_eq!(request.value, " Annual Report ");
    }
}
