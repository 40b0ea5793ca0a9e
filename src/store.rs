use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{doc, DateTime};
use mongodb::options::{DeleteOptions, FindOptions, Hint};
use mongodb::Database;
use serde::Serialize;

use crate::db;
use crate::error::{Result, StoreError};
use crate::models::{MailingList, Subscriber, Subscription};

/// Insert/delete capability shared by the independently stored entities, so
/// callers and tests can treat them uniformly. Subscriptions are not part of
/// it: their insert needs a parent lookup and carries its own signature.
#[async_trait]
pub trait EntityStore {
    /// Writes the entity as a new document.
    async fn insert(&self, db: &Database) -> Result<()>;

    /// Removes the entity's document(s), returning how many went away.
    async fn delete(&self, db: &Database) -> Result<u64>;
}

#[async_trait]
impl EntityStore for MailingList {
    async fn insert(&self, db: &Database) -> Result<()> {
        db::mailing_lists(db)
            .insert_one(self, None)
            .await
            .map_err(|err| StoreError::from_insert("mailing list", &self.display_name, err))?;
        Ok(())
    }

    async fn delete(&self, db: &Database) -> Result<u64> {
        MailingList::delete_by_name(db, &self.display_name).await
    }
}

impl MailingList {
    /// Removes the list with this name. Embedded subscriptions vanish with
    /// the document, so nothing else has to be cleaned up. Returns 0 or 1;
    /// the unique index guarantees there is at most one match.
    pub async fn delete_by_name(db: &Database, display_name: &str) -> Result<u64> {
        let options = DeleteOptions::builder()
            .hint(Hint::Keys(doc! { "display_name": 1 }))
            .build();
        let outcome = db::mailing_lists(db)
            .delete_one(doc! { "display_name": display_name }, options)
            .await?;
        Ok(outcome.deleted_count)
    }

    /// Fetches the single list with this name, embedded subscriptions
    /// included.
    pub async fn find_by_name(db: &Database, display_name: &str) -> Result<MailingList> {
        db::mailing_lists(db)
            .find_one(doc! { "display_name": display_name }, None)
            .await?
            .ok_or_else(|| StoreError::NotFound(display_name.to_string()))
    }

    /// Every stored list, in natural storage order.
    pub async fn find_all(db: &Database) -> Result<Vec<MailingList>> {
        let cursor = db::mailing_lists(db).find(None, None).await?;
        Ok(cursor.try_collect().await?)
    }

    /// Every list the subscriber belongs to, each trimmed down to that
    /// subscriber's own entry.
    pub async fn find_for_subscriber(db: &Database, email: &str) -> Result<Vec<MailingList>> {
        let options = FindOptions::builder()
            .projection(doc! {
                "display_name": 1,
                "topic": 1,
                "subscriptions": { "$elemMatch": { "subscriber_email": email } },
            })
            .build();
        let cursor = db::mailing_lists(db)
            .find(doc! { "subscriptions.subscriber_email": email }, options)
            .await?;
        Ok(cursor.try_collect().await?)
    }
}

/// Counts reported by the subscriber delete cascade, so callers can tell a
/// fully applied run from a partial one.
#[derive(Debug, Default, PartialEq, Eq, Serialize)]
pub struct CascadeCounts {
    pub subscribers_deleted: u64,
    pub lists_matched: u64,
    pub lists_modified: u64,
}

#[async_trait]
impl EntityStore for Subscriber {
    async fn insert(&self, db: &Database) -> Result<()> {
        db::subscribers(db)
            .insert_one(self, None)
            .await
            .map_err(|err| StoreError::from_insert("subscriber", &self.email, err))?;
        Ok(())
    }

    async fn delete(&self, db: &Database) -> Result<u64> {
        let counts = Subscriber::delete_cascading(db, &self.email).await?;
        Ok(counts.subscribers_deleted)
    }
}

impl Subscriber {
    /// Removes the subscriber document, then sweeps its embedded references
    /// out of every mailing list. The two steps share no transaction: if the
    /// sweep fails the subscriber stays deleted and a dangling reference
    /// remains until [`Subscriber::sweep_subscriptions`] is re-run. Deleting
    /// an absent subscriber is a no-op reported as all-zero counts.
    pub async fn delete_cascading(db: &Database, email: &str) -> Result<CascadeCounts> {
        let options = DeleteOptions::builder()
            .hint(Hint::Keys(doc! { "email": 1 }))
            .build();
        let deleted = db::subscribers(db)
            .delete_one(doc! { "email": email }, options)
            .await?
            .deleted_count;

        let (matched, modified) = Subscriber::sweep_subscriptions(db, email).await?;
        Ok(CascadeCounts {
            subscribers_deleted: deleted,
            lists_matched: matched,
            lists_modified: modified,
        })
    }

    /// Pulls every embedded reference to the email out of every list.
    /// Idempotent, so a partial cascade can be healed by running the sweep
    /// alone until it matches nothing.
    pub async fn sweep_subscriptions(db: &Database, email: &str) -> Result<(u64, u64)> {
        let outcome = db::mailing_lists(db)
            .update_many(
                doc! { "subscriptions.subscriber_email": email },
                doc! { "$pull": { "subscriptions": { "subscriber_email": email } } },
                None,
            )
            .await?;
        Ok((outcome.matched_count, outcome.modified_count))
    }
}

impl Subscription {
    /// Signs the email up to the named list: look the list up (NotFound if it
    /// does not exist), refuse a duplicate membership, then append the entry.
    /// The append filter re-checks the membership server-side, so two racing
    /// signups for the same pair can never both land.
    pub async fn insert(
        db: &Database,
        list_name: &str,
        email: &str,
        date: DateTime,
    ) -> Result<()> {
        let list = MailingList::find_by_name(db, list_name).await?;
        if list
            .subscriptions
            .iter()
            .any(|entry| entry.subscriber_email == email)
        {
            return Err(StoreError::AlreadySubscribed {
                list: list_name.to_string(),
                email: email.to_string(),
            });
        }

        let outcome = db::mailing_lists(db)
            .update_one(
                doc! {
                    "display_name": list_name,
                    "subscriptions.subscriber_email": { "$ne": email },
                },
                doc! {
                    "$push": {
                        "subscriptions": {
                            "subscriber_email": email,
                            "subscription_date": date,
                        }
                    }
                },
                None,
            )
            .await?;

        // A racing signup between the lookup and the guarded append leaves
        // nothing for the filter to match.
        if outcome.matched_count == 0 {
            return Err(StoreError::AlreadySubscribed {
                list: list_name.to_string(),
                email: email.to_string(),
            });
        }
        Ok(())
    }

    /// Cancels the membership, returning how many list documents changed
    /// (0 when no such subscription existed — a no-op, not an error).
    pub async fn delete(db: &Database, list_name: &str, email: &str) -> Result<u64> {
        let outcome = db::mailing_lists(db)
            .update_one(
                doc! { "display_name": list_name },
                doc! { "$pull": { "subscriptions": { "subscriber_email": email } } },
                None,
            )
            .await?;
        Ok(outcome.modified_count)
    }
}
