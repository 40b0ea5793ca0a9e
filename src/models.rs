use mongodb::bson::DateTime;
use serde::{Deserialize, Serialize};

/// A named list people can sign up to. `display_name` is the natural key;
/// the backing collection carries a unique index on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailingList {
    pub display_name: String,
    pub topic: String,
    /// Embedded signup records, in chronological signup order.
    #[serde(default)]
    pub subscriptions: Vec<Subscription>,
}

/// A person, identified by email. The email is the natural key of the
/// subscriber collection; the descriptive fields are optional.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscriber {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub surname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub email: String,
}

/// Membership of one subscriber in one mailing list. Stored inside the owning
/// list document; `subscriber_email` is a weak reference kept consistent by
/// the store operations, not by the database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    pub subscriber_email: String,
    pub subscription_date: DateTime,
}
