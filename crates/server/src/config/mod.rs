// Server configuration loading
//
// Everything comes from environment variables (optionally seeded from `.env`
// by the binary). Auth settings live in `crate::auth::config`.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::auth::AuthConfig;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_STATIC_DIR: &str = "public";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the HTTP listener binds to
    pub bind_addr: SocketAddr,
    /// PostgreSQL URL; `None` selects the in-memory backend
    pub database_url: Option<String>,
    /// Directory served as the static fallback
    pub static_dir: PathBuf,
    pub auth: AuthConfig,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_addr = lookup("BIND_ADDR")
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_addr
            .parse()
            .with_context(|| format!("Invalid BIND_ADDR: {}", bind_addr))?;

        let database_url = lookup("DATABASE_URL").filter(|s| !s.is_empty());

        let static_dir = lookup("STATIC_DIR")
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_STATIC_DIR.to_string())
            .into();

        Ok(Self {
            bind_addr,
            database_url,
            static_dir,
            auth: AuthConfig::from_lookup(&lookup),
        })
    }
}
