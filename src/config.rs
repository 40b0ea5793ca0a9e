use std::env;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("you must set your '{0}' environment variable")]
    MissingVar(&'static str),

    #[error("invalid value \"{value}\" for environment variable '{var}'")]
    InvalidVar { var: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub username: String,
    pub password: String,
    pub hostname: String,
    pub tls_port: u16,
}

#[derive(Debug, Clone)]
pub struct MongoConfig {
    pub connection_uri: String,
    pub database_name: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub smtp: SmtpConfig,
    pub mongo: MongoConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Config {
            smtp: SmtpConfig::from_env()?,
            mongo: MongoConfig::from_env()?,
        })
    }
}

impl SmtpConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = required("SMTP_TLS_PORT")?;
        Ok(SmtpConfig {
            username: required("SMTP_USER")?,
            password: required("SMTP_PW")?,
            hostname: required("SMTP_HOSTNAME")?,
            tls_port: port.parse().map_err(|_| ConfigError::InvalidVar {
                var: "SMTP_TLS_PORT",
                value: port,
            })?,
        })
    }
}

impl MongoConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(MongoConfig {
            connection_uri: required("MONGODB_URI")?,
            database_name: required("MONGODB_DATABASE_NAME")?,
        })
    }
}

// An empty value counts as unset.
fn required(var: &'static str) -> Result<String, ConfigError> {
    env::var(var)
        .ok()
        .filter(|value| !value.is_empty())
        .ok_or(ConfigError::MissingVar(var))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_variable_is_reported_by_name() {
        env::remove_var("LISTKEEPER_TEST_UNSET");
        match required("LISTKEEPER_TEST_UNSET") {
            Err(ConfigError::MissingVar(var)) => assert_eq!(var, "LISTKEEPER_TEST_UNSET"),
            other => panic!("expected a missing-var error, got {other:?}"),
        }
    }

    #[test]
    fn empty_variable_counts_as_missing() {
        env::set_var("LISTKEEPER_TEST_EMPTY", "");
        assert!(required("LISTKEEPER_TEST_EMPTY").is_err());
        env::remove_var("LISTKEEPER_TEST_EMPTY");
    }

    #[test]
    fn set_variable_is_returned() {
        env::set_var("LISTKEEPER_TEST_SET", "value");
        assert_eq!(required("LISTKEEPER_TEST_SET").unwrap(), "value");
        env::remove_var("LISTKEEPER_TEST_SET");
    }
}
