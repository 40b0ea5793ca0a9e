pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod mailer;
pub mod models;
pub mod store;

pub use config::Config;
pub use db::Backend;
pub use error::{Result, StoreError};
pub use models::{MailingList, Subscriber, Subscription};
pub use store::EntityStore;
