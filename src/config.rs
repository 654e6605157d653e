#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{
    sync::{Arc, Mutex, OnceLock},
    time::Duration,
};

use anyhow::Result;
use postgrest::Postgrest;
use state::InitCell;

use crate::{
    constants::{DEFAULT_FETCH_TIMEOUT_SECS, DEFAULT_SCALE_TABLE},
    store::SupabaseScaleProvider,
};

/// Supabase credentials loaded from the environment, if available.
#[derive(Clone, Debug, PartialEq)]
struct SupabaseEnv {
    /// Fully qualified PostgREST endpoint.
    rest_endpoint: String,
    /// API key used for PostgREST requests.
    api_key:       String,
}

impl SupabaseEnv {
    /// Builds a Supabase credential bundle from environment-provided values.
    fn new(url: String, key: String) -> Self {
        let rest_endpoint = format!("{}/rest/v1", url.trim().trim_end_matches('/'));
        Self {
            rest_endpoint,
            api_key: key.trim().to_owned(),
        }
    }

    /// Returns credentials only when both values are present and non-blank.
    fn from_values(url: Option<String>, key: Option<String>) -> Option<Self> {
        match (url, key) {
            (Some(url), Some(key)) if !url.trim().is_empty() && !key.trim().is_empty() => {
                Some(Self::new(url, key))
            }
            _ => None,
        }
    }
}

/// Runtime configuration shared across the crate.
pub struct ConfigState {
    /// Supabase credentials, if configured.
    supabase:      Option<SupabaseEnv>,
    /// Lazily constructed Supabase PostgREST client.
    postgrest:     InitCell<Postgrest>,
    /// Table holding grade band rows.
    scale_table:   String,
    /// Timeout applied around each scale fetch.
    fetch_timeout: Duration,
}

impl ConfigState {
    /// Construct a new configuration instance from the process environment.
    fn new() -> Result<Self> {
        let supabase = SupabaseEnv::from_values(
            std::env::var("SUPABASE_URL").ok(),
            std::env::var("SUPABASE_ANON_KEY").ok(),
        );
        if supabase.is_none() {
            tracing::debug!(
                "SUPABASE_URL/SUPABASE_ANON_KEY not set; the default grading scale will be used"
            );
        }

        let scale_table = std::env::var("GRADESCALE_TABLE")
            .map(|value| value.trim().to_owned())
            .ok()
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_SCALE_TABLE.to_string());

        Ok(Self {
            supabase,
            postgrest: InitCell::new(),
            scale_table,
            fetch_timeout: read_timeout_secs(
                "GRADESCALE_FETCH_TIMEOUT_SECS",
                DEFAULT_FETCH_TIMEOUT_SECS,
            ),
        })
    }

    /// Returns the configured PostgREST client if credentials are available.
    pub fn postgrest(&self) -> Option<Postgrest> {
        if let Some(client) = self.postgrest.try_get() {
            return Some(client.clone());
        }

        let creds = self.supabase.as_ref()?;
        let client = Postgrest::new(creds.rest_endpoint.clone())
            .insert_header("apikey", creds.api_key.clone());
        self.postgrest.set(client);
        Some(self.postgrest.get().clone())
    }

    /// Whether Supabase credentials were found.
    pub fn supabase_configured(&self) -> bool {
        self.supabase.is_some()
    }

    /// Returns the table holding grade band rows.
    pub fn scale_table(&self) -> &str {
        &self.scale_table
    }

    /// Returns the timeout applied around each scale fetch.
    pub fn fetch_timeout(&self) -> Duration {
        self.fetch_timeout
    }

    /// Builds a provider reading the configured table.
    pub fn scale_provider(&self) -> SupabaseScaleProvider {
        SupabaseScaleProvider::new(self.postgrest(), self.scale_table.clone())
    }
}

/// Shared configuration handle used throughout the crate.
#[derive(Clone)]
pub struct ConfigHandle(Arc<ConfigState>);

impl std::ops::Deref for ConfigHandle {
    type Target = ConfigState;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Global storage for the lazily constructed configuration state.
static CONFIG_SLOT: OnceLock<Mutex<Option<Arc<ConfigState>>>> = OnceLock::new();

/// Returns the mutex guarding the global configuration slot.
fn slot() -> &'static Mutex<Option<Arc<ConfigState>>> {
    CONFIG_SLOT.get_or_init(|| Mutex::new(None))
}

/// Ensure the global configuration has been initialized and return a handle.
pub fn ensure_initialized() -> Result<ConfigHandle> {
    let mut guard = slot()
        .lock()
        .map_err(|_| anyhow::anyhow!("config slot poisoned"))?;
    if let Some(cfg) = guard.as_ref() {
        return Ok(ConfigHandle(Arc::clone(cfg)));
    }

    let cfg = Arc::new(ConfigState::new()?);
    *guard = Some(Arc::clone(&cfg));
    Ok(ConfigHandle(cfg))
}

/// Returns the active configuration, initializing it on demand.
pub fn get() -> ConfigHandle {
    ensure_initialized().expect("configuration initialization failed")
}

/// Parses an environment variable into a `Duration`, falling back to
/// `default_secs` when parsing fails or the variable is missing.
fn read_timeout_secs(env: &str, default_secs: u64) -> Duration {
    parse_timeout_secs(std::env::var(env).ok(), default_secs)
}

/// Parses a seconds value, falling back to `default_secs` when missing,
/// unparsable or zero.
fn parse_timeout_secs(value: Option<String>, default_secs: u64) -> Duration {
    value
        .and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
        .unwrap_or_else(|| Duration::from_secs(default_secs))
}
