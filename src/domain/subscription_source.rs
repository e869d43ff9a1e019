use unicode_segmentation::UnicodeSegmentation;

const MAX_CHAR_LENGTH: usize = 64;
const FORBIDDEN_CHARS: [char; 9] = ['/', '{', '}', '"', '>', '<', '\\', '(', ')'];

/// Acquisition channel tag, e.g. `website` or `footer-form`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SubscriptionSource(String);

impl SubscriptionSource {
    pub fn parse(source: String) -> Result<SubscriptionSource, String> {
        let is_empty_or_whitespace = source.trim().is_empty();
        let is_too_long = source.graphemes(true).count() > MAX_CHAR_LENGTH;
        let contains_forbidden_chars = source.chars().any(|char| FORBIDDEN_CHARS.contains(&char));

        if is_empty_or_whitespace || is_too_long || contains_forbidden_chars {
            return Err(format!("{} is not a valid subscription source", source));
        }

        Ok(Self(source))
    }
}

impl AsRef<str> for SubscriptionSource {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SubscriptionSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
