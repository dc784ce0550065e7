use crate::utils::is_empty_or_whitespace;

#[derive(Debug, Clone, PartialEq)]
pub struct Topic(String);

impl AsRef<str> for Topic {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Topic {
    /// Only a missing topic is refused. Length is left to the downstream agent.
    pub fn parse(s: String) -> Result<Topic, String> {
        if is_empty_or_whitespace(&s) {
            Err(String::from("A topic is required."))
        } else {
            Ok(Self(s.trim().to_string()))
        }
    }
}
