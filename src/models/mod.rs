mod outbound_message;
mod subscription;

pub use outbound_message::OutboundMessage;
pub use subscription::{
    MalformedSubscription, StoredSubscription, SubscriptionRecord, SubscriptionStore,
    get_active_subscriptions,
};
