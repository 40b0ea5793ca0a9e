use lettre::SmtpTransport;
use log::info;
use mongodb::bson::Document;
use mongodb::options::IndexOptions;
use mongodb::{Client, Collection, Database, IndexModel};
use thiserror::Error;

use crate::config::{Config, ConfigError};
use crate::error::StoreError;
use crate::mailer::{self, MailerError};
use crate::models::{MailingList, Subscriber};

pub const MAILING_LIST_COLLECTION: &str = "mailing-list";
pub const SUBSCRIBER_COLLECTION: &str = "subscriber";

// Each collection with the field its unique index lives on.
const COLLECTIONS: &[(&str, &str)] = &[
    (MAILING_LIST_COLLECTION, "display_name"),
    (SUBSCRIBER_COLLECTION, "email"),
];

#[derive(Debug, Error)]
pub enum InitError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("smtp handshake failed: {0}")]
    Smtp(#[from] MailerError),

    #[error("storage initialization failed: {0}")]
    Store(#[from] StoreError),
}

/// The long-lived process resources: one MongoDB client plus the
/// handshake-verified SMTP transport. Cheap to clone and safe to share
/// across all request handlers.
#[derive(Clone)]
pub struct Backend {
    client: Client,
    db: Database,
    mailer: SmtpTransport,
}

impl Backend {
    /// Connects to MongoDB, verifies the SMTP credentials and makes sure the
    /// backing collections exist with their unique indexes. Any failure here
    /// is fatal to startup: without the indexes the uniqueness invariants
    /// cannot be relied upon.
    pub async fn init(config: &Config) -> Result<Self, InitError> {
        let client = Client::with_uri_str(&config.mongo.connection_uri)
            .await
            .map_err(StoreError::from)?;
        let db = client.database(&config.mongo.database_name);

        let mailer = mailer::connect(&config.smtp)?;
        init_collections(&db).await?;

        Ok(Backend { client, db, mailer })
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// The authenticated transport, held for the message-sending feature.
    pub fn mailer(&self) -> &SmtpTransport {
        &self.mailer
    }

    /// Releases the shared client, waiting for in-flight operations.
    pub async fn shutdown(self) {
        self.client.shutdown().await;
    }
}

pub fn mailing_lists(db: &Database) -> Collection<MailingList> {
    db.collection(MAILING_LIST_COLLECTION)
}

pub fn subscribers(db: &Database) -> Collection<Subscriber> {
    db.collection(SUBSCRIBER_COLLECTION)
}

/// Idempotently creates whichever backing collections are missing, each with
/// a unique index on its natural key. Collections that already exist are left
/// untouched, so this is safe to run on every startup.
pub async fn init_collections(db: &Database) -> Result<(), StoreError> {
    let existing = db.list_collection_names(None).await?;
    for (name, key) in collections_to_create(&existing) {
        db.create_collection(name, None).await?;

        let mut keys = Document::new();
        keys.insert(key, 1);
        let index = IndexModel::builder()
            .keys(keys)
            .options(IndexOptions::builder().unique(true).build())
            .build();
        db.collection::<Document>(name).create_index(index, None).await?;

        info!("created collection '{}' with unique index on '{}'", name, key);
    }
    Ok(())
}

fn collections_to_create(existing: &[String]) -> Vec<(&'static str, &'static str)> {
    COLLECTIONS
        .iter()
        .copied()
        .filter(|(name, _)| !existing.iter().any(|present| present == name))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_database_needs_both_collections() {
        let to_create = collections_to_create(&[]);
        assert_eq!(
            to_create,
            vec![
                (MAILING_LIST_COLLECTION, "display_name"),
                (SUBSCRIBER_COLLECTION, "email"),
            ]
        );
    }

    #[test]
    fn existing_collections_are_skipped() {
        let existing = vec![
            MAILING_LIST_COLLECTION.to_string(),
            "unrelated".to_string(),
        ];
        assert_eq!(
            collections_to_create(&existing),
            vec![(SUBSCRIBER_COLLECTION, "email")]
        );
    }

    #[test]
    fn fully_initialized_database_needs_nothing() {
        let existing = vec![
            MAILING_LIST_COLLECTION.to_string(),
            SUBSCRIBER_COLLECTION.to_string(),
        ];
        assert!(collections_to_create(&existing).is_empty());
    }
}
