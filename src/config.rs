//! Runtime configuration for the client and the list controller

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const API_BASE: &str = "https://pokeapi.co/api/v2";
pub const IMAGE_HOST: &str =
    "https://raw.githubusercontent.com/PokeAPI/sprites/master/sprites/pokemon";

/// Page size of the primary list in browse mode.
pub const BROWSE_PAGE_SIZE: u32 = 1000;
/// Page size of the bare list variant.
pub const BARE_PAGE_SIZE: u32 = 20;
/// Page size used while walking the full catalog for the search index.
pub const INDEX_PAGE_SIZE: u32 = 10_000;
/// The search pass stops once it holds more than this many results.
pub const SEARCH_CAP: usize = 20;
pub const SEARCH_DEBOUNCE_MS: u64 = 500;
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Connection settings for [`crate::api::CatalogClient`].
#[derive(Clone, Debug, PartialEq)]
pub struct ClientConfig {
    pub api_base: String,
    pub image_host: String,
    pub user_agent: Option<String>,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: API_BASE.to_string(),
            image_host: IMAGE_HOST.to_string(),
            user_agent: None,
            timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
        }
    }
}

impl ClientConfig {
    /// Point both endpoints at a single base, e.g. a local mock server.
    pub fn with_base(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            api_base: base.to_string(),
            image_host: format!("{base}/sprites"),
            ..Self::default()
        }
    }
}

/// Controller knobs. Lives inside the state so the reducer never reaches
/// for globals.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BrowseSettings {
    pub page_size: u32,
    pub index_page_size: u32,
    pub search_cap: usize,
    pub debounce_ms: u64,
    /// Minimal list screen: pagination only.
    pub bare: bool,
}

impl Default for BrowseSettings {
    fn default() -> Self {
        Self {
            page_size: BROWSE_PAGE_SIZE,
            index_page_size: INDEX_PAGE_SIZE,
            search_cap: SEARCH_CAP,
            debounce_ms: SEARCH_DEBOUNCE_MS,
            bare: false,
        }
    }
}

impl BrowseSettings {
    pub fn bare() -> Self {
        Self {
            page_size: BARE_PAGE_SIZE,
            bare: true,
            ..Self::default()
        }
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}
