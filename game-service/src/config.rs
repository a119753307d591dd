use std::net::SocketAddr;
use thiserror::Error;

use dungeon_shared::store::dynamo::{CHARACTERS_TABLE_NAME, GAME_SAVES_TABLE_NAME};

use crate::routes::Operation;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("GAME_HANDLER: {0}")]
    InvalidHandler(String),

    #[error("LOCAL_ADDR '{0}' is not a socket address")]
    InvalidLocalAddr(String),
}

/// Process configuration, read once at start.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub characters_table: String,
    pub saves_table: String,
    /// Serve only this operation (one function per route deployments).
    pub handler: Option<Operation>,
    /// Serve HTTP locally on this address instead of running in Lambda.
    pub local_addr: Option<SocketAddr>,
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let set = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let handler = set("GAME_HANDLER")
            .map(|name| name.parse::<Operation>().map_err(ConfigError::InvalidHandler))
            .transpose()?;

        let local_addr = set("LOCAL_ADDR")
            .map(|addr| {
                addr.trim()
                    .parse::<SocketAddr>()
                    .map_err(|_| ConfigError::InvalidLocalAddr(addr.clone()))
            })
            .transpose()?;

        Ok(Self {
            characters_table: set("CHARACTERS_TABLE")
                .unwrap_or_else(|| CHARACTERS_TABLE_NAME.to_string()),
            saves_table: set("GAME_SAVES_TABLE")
                .unwrap_or_else(|| GAME_SAVES_TABLE_NAME.to_string()),
            handler,
            local_addr,
        })
    }
}
