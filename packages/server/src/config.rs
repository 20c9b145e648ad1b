use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;

use crate::domains::registration::actions::RegistrationPolicy;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    /// Approve new registrations immediately instead of queueing review.
    pub auto_approve_registrations: bool,
    /// Default payment requirement for newly created assemblies.
    pub payment_required_default: bool,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            auto_approve_registrations: env_flag("AUTO_APPROVE_REGISTRATIONS", false)?,
            payment_required_default: env_flag("PAYMENT_REQUIRED_DEFAULT", true)?,
        })
    }

    /// The registration policy handed into admission calls. Configuration is
    /// threaded explicitly; actions never read the environment themselves.
    pub fn registration_policy(&self) -> RegistrationPolicy {
        RegistrationPolicy {
            auto_approve: self.auto_approve_registrations,
        }
    }
}

fn env_flag(name: &str, default: bool) -> Result<bool> {
    match env::var(name) {
        Ok(value) => value
            .parse::<bool>()
            .with_context(|| format!("{} must be true or false", name)),
        Err(_) => Ok(default),
    }
}
