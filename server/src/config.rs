// SPDX-License-Identifier: MIT OR Apache-2.0

//! Service configuration from the environment

use anyhow::{Context, Result};
use std::env;

/// Tunables for the actor layer.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Capacity of each session actor's mailbox
    pub session_mailbox: usize,
    /// Komi stamped on newly created games
    pub komi: f32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            session_mailbox: 32,
            komi: baduk_core::DEFAULT_KOMI,
        }
    }
}

impl ServerConfig {
    /// Read configuration from the environment, falling back to defaults.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let session_mailbox = match env::var("BADUK_SESSION_MAILBOX") {
            Ok(raw) => raw
                .parse()
                .context("BADUK_SESSION_MAILBOX must be a number")?,
            Err(_) => defaults.session_mailbox,
        };
        let komi = match env::var("BADUK_KOMI") {
            Ok(raw) => raw.parse().context("BADUK_KOMI must be a number")?,
            Err(_) => defaults.komi,
        };

        Ok(Self {
            session_mailbox,
            komi,
        })
    }
}

/// Install the global tracing subscriber, filtered by `RUST_LOG`.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
