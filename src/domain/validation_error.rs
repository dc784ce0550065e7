/// A subscription record that cannot be turned into an outbound message.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Invalid topic: {0}")]
    Topic(String),
    #[error("Undecodable subscription row: {0}")]
    Row(String),
}
