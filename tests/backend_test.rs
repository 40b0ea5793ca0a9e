//! Backend bootstrap tests. The malformed-URI case is offline (the driver
//! rejects the string before touching the network); the credential check
//! needs outbound DNS and is ignored by default.

use listkeeper::config::{Config, MongoConfig, SmtpConfig};
use listkeeper::db::Backend;

fn config(connection_uri: &str, smtp_hostname: &str) -> Config {
    Config {
        smtp: SmtpConfig {
            username: "user".to_string(),
            password: "password".to_string(),
            hostname: smtp_hostname.to_string(),
            tls_port: 587,
        },
        mongo: MongoConfig {
            connection_uri: connection_uri.to_string(),
            database_name: "listkeeper_test".to_string(),
        },
    }
}

#[tokio::test]
async fn init_rejects_a_malformed_mongodb_uri() {
    let bad = config("value", "smtp.example.com");
    assert!(Backend::init(&bad).await.is_err());
}

#[tokio::test]
#[ignore = "needs outbound network access"]
async fn init_rejects_an_unresolvable_smtp_host() {
    // Client construction is lazy, so the failure comes from the handshake.
    let bad = config("mongodb://localhost:27017", "smtp.invalid");
    assert!(Backend::init(&bad).await.is_err());
}
