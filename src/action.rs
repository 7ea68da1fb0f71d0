use serde::{Deserialize, Serialize};

use crate::error::CatalogError;
use crate::sprite::SpriteData;
use crate::state::{DetailRecord, ListEntry, ListPage};

#[derive(tui_dispatch::Action, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[action(infer_categories)]
pub enum Action {
    Init,

    IndexDidLoad {
        names: Vec<String>,
        error: Option<CatalogError>,
    },

    /// Scroll reached the end of the loaded list.
    LoadMore,
    PageDidLoad { append: bool, page: ListPage },
    PageDidError(CatalogError),

    ListHighlight(usize),

    SearchStart,
    SearchStop,
    /// Raw search text edited.
    SearchQueryChange(String),
    SearchClear,
    /// The debounce quiet period elapsed with this text.
    SearchDidSettle(String),
    SearchDidLoad {
        generation: u64,
        results: Vec<ListEntry>,
    },
    SearchDidError {
        generation: u64,
        error: CatalogError,
    },

    DetailOpen,
    DetailClose,
    DetailDidLoad { url: String, detail: DetailRecord },
    DetailDidError { url: String, error: CatalogError },
    SpriteDidLoad { id: String, sprite: SpriteData },
    SpriteDidError { id: String, error: String },

    ErrorDismiss,
    Render,
    Quit,
}
