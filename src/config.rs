use anyhow::Context;

use crate::recent::DEFAULT_RECENT_LIMIT;

const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub recent_limit: usize,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let max_connections = match lookup("ENROLLMENT_MAX_CONNECTIONS") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("ENROLLMENT_MAX_CONNECTIONS is not a number: '{raw}'"))?,
            None => DEFAULT_MAX_CONNECTIONS,
        };
        let recent_limit = match lookup("ENROLLMENT_RECENT_LIMIT") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("ENROLLMENT_RECENT_LIMIT is not a number: '{raw}'"))?,
            None => DEFAULT_RECENT_LIMIT,
        };

        Ok(Self {
            database_url: lookup("DATABASE_URL").filter(|url| !url.is_empty()),
            max_connections,
            recent_limit,
        })
    }

    pub fn database_url(&self) -> anyhow::Result<&str> {
        self.database_url
            .as_deref()
            .context("DATABASE_URL must be set to a Postgres instance (or pass --csv)")
    }
}
