use crate::utils::is_empty_or_whitespace;

/// Free-form extra instructions a subscriber attached to their topic.
///
/// Absent and blank values collapse to `None` so that the rendered prompt
/// never carries an empty supplementary block.
#[derive(Debug, Clone, PartialEq)]
pub struct SupplementaryText(String);

impl AsRef<str> for SupplementaryText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl SupplementaryText {
    pub fn parse(s: Option<&str>) -> Option<SupplementaryText> {
        match s {
            Some(text) if !is_empty_or_whitespace(text) => Some(Self(text.trim().to_string())),
            _ => None,
        }
    }
}
