use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tui_dispatch::DataResource;
use tui_dispatch_debug::debug::{DebugSection, DebugState, ron_string};

use crate::config::BrowseSettings;
use crate::sprite::SpriteData;

/// One catalog row. `url` is the stable key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListEntry {
    pub name: String,
    pub url: String,
}

impl ListEntry {
    pub fn numeric_id(&self) -> Option<&str> {
        id_from_url(&self.url)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailRecord {
    pub id: u32,
    pub name: String,
    pub sprite_url: Option<String>,
    pub types: Vec<String>,
    pub height: u32,
    pub weight: u32,
}

/// One page of the listing endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListPage {
    pub count: u32,
    pub entries: Vec<ListEntry>,
    pub next: Option<String>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndexStatus {
    #[default]
    Idle,
    Loading,
    Ready,
    /// The walk stopped early; the index holds what was gathered.
    Degraded,
}

/// Where the selected entry's image is being fetched from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpriteFetch {
    #[default]
    Idle,
    /// Image host request in flight.
    Host,
    /// Host had no image; waiting for the record's own sprite URL.
    AwaitingRecord,
    /// Fetching `DetailRecord::sprite_url`.
    Record,
    Unavailable,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ListState {
    pub entries: Vec<ListEntry>,
    pub cursor: Option<String>,
    pub total: Option<u32>,
    pub loading: bool,
    /// At least one page has arrived; with no cursor this means exhausted.
    pub started: bool,
    pub error: Option<String>,
}

impl ListState {
    pub fn is_exhausted(&self) -> bool {
        self.started && self.cursor.is_none()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchState {
    /// Input has keyboard focus.
    pub active: bool,
    pub raw: String,
    pub settled: String,
    pub results: Vec<ListEntry>,
    pub generation: u64,
    pub searching: bool,
    pub error: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppState {
    pub settings: BrowseSettings,
    pub list: ListState,
    pub index: Vec<String>,
    pub index_status: IndexStatus,
    pub search: SearchState,
    pub highlighted: usize,
    pub selected: Option<ListEntry>,
    pub detail: DataResource<DetailRecord>,
    pub sprite: Option<SpriteData>,
    pub sprite_fetch: SpriteFetch,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(BrowseSettings::default())
    }
}

impl AppState {
    pub fn new(settings: BrowseSettings) -> Self {
        Self {
            settings,
            list: ListState::default(),
            index: Vec::new(),
            index_status: IndexStatus::Idle,
            search: SearchState::default(),
            highlighted: 0,
            selected: None,
            detail: DataResource::Empty,
            sprite: None,
            sprite_fetch: SpriteFetch::Idle,
        }
    }

    /// Search results replace the primary list only while settled text is set.
    pub fn visible_entries(&self) -> &[ListEntry] {
        if self.search.settled.is_empty() {
            &self.list.entries
        } else {
            &self.search.results
        }
    }

    pub fn highlighted_entry(&self) -> Option<&ListEntry> {
        self.visible_entries().get(self.highlighted)
    }

    pub fn set_highlighted(&mut self, index: usize) -> bool {
        let len = self.visible_entries().len();
        let bounded = if len == 0 { 0 } else { index.min(len - 1) };
        if bounded != self.highlighted {
            self.highlighted = bounded;
            return true;
        }
        false
    }

    pub fn clamp_highlight(&mut self) {
        let len = self.visible_entries().len();
        if self.highlighted >= len {
            self.highlighted = len.saturating_sub(1);
        }
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected.as_ref().and_then(|entry| entry.numeric_id())
    }

    /// Whether a scroll-near-end signal may start another page load.
    pub fn can_load_more(&self) -> bool {
        !self.list.loading
            && self.selected.is_none()
            && self.search.raw.is_empty()
            && self.list.cursor.is_some()
            && self.list.error.is_none()
    }

    pub fn user_error(&self) -> Option<&str> {
        self.list
            .error
            .as_deref()
            .or(self.search.error.as_deref())
    }

    pub fn close_detail(&mut self) {
        self.selected = None;
        self.detail = DataResource::Empty;
        self.sprite = None;
        self.sprite_fetch = SpriteFetch::Idle;
    }

    /// Sprite URL carried by the loaded record, if any.
    pub fn record_sprite_url(&self) -> Option<&str> {
        match &self.detail {
            DataResource::Loaded(detail) => detail.sprite_url.as_deref(),
            _ => None,
        }
    }
}

/// Second-to-last `/` segment: `.../pokemon/25/` -> `25`.
pub fn id_from_url(url: &str) -> Option<&str> {
    let parts: Vec<&str> = url.split('/').collect();
    if parts.len() < 2 {
        return None;
    }
    let id = parts[parts.len() - 2];
    if id.is_empty() {
        None
    } else {
        Some(id)
    }
}

/// Case-insensitive substring filter that keeps index order.
pub fn filter_index(index: &[String], query: &str) -> Vec<String> {
    let query = query.to_lowercase();
    index
        .iter()
        .filter(|name| name.to_lowercase().contains(&query))
        .cloned()
        .collect()
}

/// URLs that occur more than once, in first-repeat order.
pub fn duplicate_urls(entries: &[ListEntry]) -> Vec<&str> {
    let mut seen = HashSet::new();
    let mut duplicates = Vec::new();
    for entry in entries {
        if !seen.insert(entry.url.as_str()) {
            duplicates.push(entry.url.as_str());
        }
    }
    duplicates
}

/// `pikachu` -> `Pikachu`
pub fn display_name(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl DebugState for AppState {
    fn debug_sections(&self) -> Vec<DebugSection> {
        vec![
            DebugSection::new("List")
                .entry("loaded", ron_string(&self.list.entries.len()))
                .entry("total", ron_string(&self.list.total))
                .entry("cursor", ron_string(&self.list.cursor))
                .entry("loading", ron_string(&self.list.loading))
                .entry("highlighted", ron_string(&self.highlighted))
                .entry("error", ron_string(&self.list.error)),
            DebugSection::new("Index")
                .entry("names", ron_string(&self.index.len()))
                .entry("status", ron_string(&self.index_status)),
            DebugSection::new("Search")
                .entry("raw", ron_string(&self.search.raw))
                .entry("settled", ron_string(&self.search.settled))
                .entry("generation", ron_string(&self.search.generation))
                .entry("results", ron_string(&self.search.results.len()))
                .entry("searching", ron_string(&self.search.searching))
                .entry("error", ron_string(&self.search.error)),
            DebugSection::new("Detail")
                .entry(
                    "selected",
                    ron_string(&self.selected.as_ref().map(|entry| entry.name.clone())),
                )
                .entry("loading", ron_string(&self.detail.is_loading()))
                .entry("sprite", ron_string(&self.sprite.is_some()))
                .entry("sprite_fetch", ron_string(&self.sprite_fetch)),
        ]
    }
}
