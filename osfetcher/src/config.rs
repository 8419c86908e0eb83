use std::path::Path;

use crate::error::{FetcherError, Result};

const DEFAULT_DOMAIN: &str = "default";
const DEFAULT_INTERFACE: &str = "public";

/// Keystone v3 password credentials, read from the `OS_*` variables an
/// openrc file exports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenStackCredentials {
    pub auth_url: String,
    pub username: String,
    pub password: String,
    pub project_name: String,
    pub user_domain_id: String,
    pub project_domain_id: String,
    pub region_name: Option<String>,
    pub interface: String,
}

impl OpenStackCredentials {
    /// Loads `.env` from the working directory if present, then reads the process environment.
    pub fn from_env() -> Result<Self> {
        if let Err(err) = dotenvy::dotenv() {
            if !err.not_found() {
                log::warn!("Ignoring unreadable .env file: {}", err);
            }
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads the given env file first; values already in the environment win.
    pub fn from_env_file(path: &Path) -> Result<Self> {
        dotenvy::from_path(path).map_err(|err| {
            FetcherError::InvalidParam(format!("failed to load env file {:?}: {}", path, err))
        })?;
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let required = |key: &'static str| get(key).ok_or(FetcherError::MissingCredential(key));

        Ok(Self {
            auth_url: required("OS_AUTH_URL")?,
            username: required("OS_USERNAME")?,
            password: required("OS_PASSWORD")?,
            project_name: required("OS_PROJECT_NAME")?,
            user_domain_id: get("OS_USER_DOMAIN_ID").unwrap_or_else(|| DEFAULT_DOMAIN.into()),
            project_domain_id: get("OS_PROJECT_DOMAIN_ID")
                .unwrap_or_else(|| DEFAULT_DOMAIN.into()),
            region_name: get("OS_REGION_NAME"),
            interface: get("OS_INTERFACE").unwrap_or_else(|| DEFAULT_INTERFACE.into()),
        })
    }

    /// Token endpoint, tolerating an auth URL with or without the `/v3` suffix.
    pub fn token_url(&self) -> String {
        let base = self.auth_url.trim_end_matches('/');
        if base.ends_with("/v3") {
            format!("{}/auth/tokens", base)
        } else {
            format!("{}/v3/auth/tokens", base)
        }
    }
}
