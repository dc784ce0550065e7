mod subscriber_email;
mod subscription_status;
mod supplementary_text;
mod topic;
mod validation_error;

pub use subscriber_email::SubscriberEmail;
pub use subscription_status::SubscriptionStatus;
pub use supplementary_text::SupplementaryText;
pub use topic::Topic;
pub use validation_error::ValidationError;
