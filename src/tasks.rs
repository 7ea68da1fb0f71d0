//! Async work behind each effect
//!
//! The functions here are generic over [`CatalogSource`] so the same code
//! runs against the HTTP client and against in-memory fixtures.

use tracing::{debug, info, warn};

use crate::action::Action;
use crate::api::CatalogSource;
use crate::error::CatalogError;
use crate::sprite::decode_sprite;
use crate::state::ListEntry;

/// Outcome of walking every listing page.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct IndexWalk {
    /// Names in catalog order, as far as the walk got.
    pub names: Vec<String>,
    /// Set when a page failed and the walk stopped early.
    pub error: Option<CatalogError>,
}

pub async fn walk_index<S>(source: &S, page_size: u32) -> IndexWalk
where
    S: CatalogSource + ?Sized,
{
    let mut walk = IndexWalk::default();
    let mut page = source.list_page(page_size, 0).await;
    let mut pages = 0usize;
    loop {
        match page {
            Ok(current) => {
                pages += 1;
                walk.names
                    .extend(current.entries.into_iter().map(|entry| entry.name));
                let Some(next) = current.next else {
                    break;
                };
                page = source.list_page_at(&next).await;
            }
            Err(error) => {
                warn!(%error, pages, names = walk.names.len(), "index walk stopped");
                walk.error = Some(error);
                break;
            }
        }
    }
    info!(pages, names = walk.names.len(), "index walk finished");
    walk
}

/// Resolves candidate names to entries in order.
///
/// A missing name is skipped. Any other failure aborts the pass. The pass
/// stops once it holds more than `cap` results.
pub async fn search_pass<S>(
    source: &S,
    candidates: &[String],
    cap: usize,
) -> Result<Vec<ListEntry>, CatalogError>
where
    S: CatalogSource + ?Sized,
{
    let mut results = Vec::new();
    for name in candidates {
        let url = source.entry_url(name);
        match source.fetch_detail(&url).await {
            Ok(detail) => {
                results.push(ListEntry {
                    name: detail.name,
                    url: source.entry_url(&detail.id.to_string()),
                });
            }
            Err(error) if error.is_not_found() => {
                debug!(name = %name, "search candidate missing");
            }
            Err(error) => return Err(error),
        }
        if results.len() > cap {
            break;
        }
    }
    Ok(results)
}

pub async fn load_index<S>(source: &S, page_size: u32) -> Action
where
    S: CatalogSource + ?Sized,
{
    let IndexWalk { names, error } = walk_index(source, page_size).await;
    Action::IndexDidLoad { names, error }
}

pub async fn load_page<S>(source: &S, limit: u32, offset: u32, append: bool) -> Action
where
    S: CatalogSource + ?Sized,
{
    match source.list_page(limit, offset).await {
        Ok(page) => Action::PageDidLoad { append, page },
        Err(error) => {
            warn!(%error, limit, offset, "page load failed");
            Action::PageDidError(error)
        }
    }
}

pub async fn run_search<S>(source: &S, generation: u64, candidates: &[String], cap: usize) -> Action
where
    S: CatalogSource + ?Sized,
{
    match search_pass(source, candidates, cap).await {
        Ok(results) => Action::SearchDidLoad {
            generation,
            results,
        },
        Err(error) => {
            warn!(%error, generation, "search pass failed");
            Action::SearchDidError { generation, error }
        }
    }
}

pub async fn load_detail<S>(source: &S, url: String) -> Action
where
    S: CatalogSource + ?Sized,
{
    match source.fetch_detail(&url).await {
        Ok(detail) => Action::DetailDidLoad { url, detail },
        Err(error) => {
            warn!(%error, url = %url, "detail load failed");
            Action::DetailDidError { url, error }
        }
    }
}

pub async fn load_sprite<S>(source: &S, id: String) -> Action
where
    S: CatalogSource + ?Sized,
{
    let fetched = source.fetch_image(&id).await;
    sprite_action(id, fetched)
}

pub async fn load_sprite_at<S>(source: &S, id: String, url: String) -> Action
where
    S: CatalogSource + ?Sized,
{
    let fetched = source.fetch_image_at(&url).await;
    sprite_action(id, fetched)
}

fn sprite_action(id: String, fetched: Result<Vec<u8>, CatalogError>) -> Action {
    let decoded = fetched
        .map_err(|error| error.to_string())
        .and_then(|bytes| decode_sprite(&bytes));
    match decoded {
        Ok(sprite) => Action::SpriteDidLoad { id, sprite },
        Err(error) => Action::SpriteDidError { id, error },
    }
}
