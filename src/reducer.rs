//! Reducer - pure function: (state, action) -> DispatchResult

use tracing::{debug, info, warn};
use tui_dispatch::{DataResource, DispatchResult};

use crate::action::Action;
use crate::api::offset_from_cursor;
use crate::effect::Effect;
use crate::state::{AppState, IndexStatus, SpriteFetch, duplicate_urls, filter_index};

pub fn reducer(state: &mut AppState, action: Action) -> DispatchResult<Effect> {
    match action {
        Action::Init => {
            state.list.loading = true;
            state.list.error = None;
            let mut effects = vec![Effect::LoadPage {
                limit: state.settings.page_size,
                offset: 0,
                append: false,
            }];
            if !state.settings.bare {
                state.index_status = IndexStatus::Loading;
                effects.push(Effect::LoadIndex {
                    page_size: state.settings.index_page_size,
                });
            }
            DispatchResult::changed_with_many(effects)
        }

        // ===== Bootstrap index =====
        Action::IndexDidLoad { names, error } => {
            state.index = names;
            state.index_status = match error {
                Some(error) => {
                    warn!(%error, names = state.index.len(), "search index incomplete");
                    IndexStatus::Degraded
                }
                None => {
                    info!(names = state.index.len(), "search index ready");
                    IndexStatus::Ready
                }
            };
            if state.search.settled.is_empty() {
                return DispatchResult::changed();
            }
            // a search typed before the index arrived runs again on the full set
            match start_search_pass(state) {
                Some(effect) => DispatchResult::changed_with(effect),
                None => DispatchResult::changed(),
            }
        }

        // ===== Pagination =====
        Action::LoadMore => {
            if !state.can_load_more() {
                return DispatchResult::unchanged();
            }
            let Some(cursor) = state.list.cursor.as_deref() else {
                return DispatchResult::unchanged();
            };
            let offset = offset_from_cursor(cursor);
            state.list.loading = true;
            state.list.error = None;
            DispatchResult::changed_with(Effect::LoadPage {
                limit: state.settings.page_size,
                offset,
                append: true,
            })
        }

        Action::PageDidLoad { append, page } => {
            state.list.loading = false;
            state.list.started = true;
            state.list.total = Some(page.count);
            state.list.cursor = page.next;
            if append {
                state.list.entries.extend(page.entries);
            } else {
                state.list.entries = page.entries;
                state.highlighted = 0;
            }
            let duplicates = duplicate_urls(&state.list.entries);
            if !duplicates.is_empty() {
                warn!(?duplicates, "duplicate entry URLs in list");
            }
            info!(
                loaded = state.list.entries.len(),
                exhausted = state.list.is_exhausted(),
                "page loaded"
            );
            DispatchResult::changed()
        }

        Action::PageDidError(error) => {
            state.list.loading = false;
            state.list.error = Some(format!("Failed to load entries: {error}"));
            DispatchResult::changed()
        }

        Action::ListHighlight(index) => {
            if state.set_highlighted(index) {
                DispatchResult::changed()
            } else {
                DispatchResult::unchanged()
            }
        }

        // ===== Search =====
        Action::SearchStart => {
            if state.settings.bare || state.search.active {
                return DispatchResult::unchanged();
            }
            state.search.active = true;
            DispatchResult::changed()
        }

        Action::SearchStop => {
            if !state.search.active {
                return DispatchResult::unchanged();
            }
            state.search.active = false;
            DispatchResult::changed()
        }

        Action::SearchQueryChange(text) => {
            if state.settings.bare || text == state.search.raw {
                return DispatchResult::unchanged();
            }
            state.search.raw = text;
            DispatchResult::changed_with(settle_effect(state))
        }

        Action::SearchClear => {
            if state.search.raw.is_empty() {
                return DispatchResult::unchanged();
            }
            state.search.raw.clear();
            DispatchResult::changed_with(settle_effect(state))
        }

        Action::SearchDidSettle(text) => {
            if text == state.search.settled {
                return DispatchResult::unchanged();
            }
            state.search.settled = text;
            state.highlighted = 0;
            if state.search.settled.is_empty() {
                state.search.generation += 1;
                state.search.results.clear();
                state.search.searching = false;
                state.search.error = None;
                return DispatchResult::changed();
            }
            match start_search_pass(state) {
                Some(effect) => DispatchResult::changed_with(effect),
                None => DispatchResult::changed(),
            }
        }

        Action::SearchDidLoad {
            generation,
            results,
        } => {
            if generation != state.search.generation {
                debug!(generation, current = state.search.generation, "stale search pass dropped");
                return DispatchResult::unchanged();
            }
            state.search.results = results;
            state.search.searching = false;
            state.clamp_highlight();
            DispatchResult::changed()
        }

        Action::SearchDidError { generation, error } => {
            if generation != state.search.generation {
                debug!(generation, %error, "stale search failure dropped");
                return DispatchResult::unchanged();
            }
            state.search.searching = false;
            state.search.error = Some(format!("Search failed: {error}"));
            DispatchResult::changed()
        }

        // ===== Selection / detail =====
        Action::DetailOpen => {
            if state.settings.bare {
                return DispatchResult::unchanged();
            }
            let Some(entry) = state.highlighted_entry().cloned() else {
                return DispatchResult::unchanged();
            };
            if state.selected.as_ref() == Some(&entry) {
                return DispatchResult::unchanged();
            }
            let mut effects = vec![Effect::LoadDetail {
                url: entry.url.clone(),
            }];
            state.sprite_fetch = match entry.numeric_id() {
                Some(id) => {
                    effects.push(Effect::LoadSprite { id: id.to_string() });
                    SpriteFetch::Host
                }
                None => SpriteFetch::Unavailable,
            };
            state.selected = Some(entry);
            state.detail = DataResource::Loading;
            state.sprite = None;
            DispatchResult::changed_with_many(effects)
        }

        Action::DetailClose => {
            if state.selected.is_none() {
                return DispatchResult::unchanged();
            }
            state.close_detail();
            DispatchResult::changed()
        }

        Action::DetailDidLoad { url, detail } => {
            if !is_selected_url(state, &url) {
                return DispatchResult::unchanged();
            }
            state.detail = DataResource::Loaded(detail);
            if state.sprite_fetch != SpriteFetch::AwaitingRecord {
                return DispatchResult::changed();
            }
            match record_sprite_effect(state) {
                Some(effect) => DispatchResult::changed_with(effect),
                None => DispatchResult::changed(),
            }
        }

        Action::DetailDidError { url, error } => {
            if !is_selected_url(state, &url) {
                return DispatchResult::unchanged();
            }
            state.detail = DataResource::Failed(format!("Failed to load details: {error}"));
            if state.sprite_fetch == SpriteFetch::AwaitingRecord {
                state.sprite_fetch = SpriteFetch::Unavailable;
            }
            DispatchResult::changed()
        }

        Action::SpriteDidLoad { id, sprite } => {
            if state.selected_id() != Some(id.as_str()) {
                return DispatchResult::unchanged();
            }
            state.sprite = Some(sprite);
            state.sprite_fetch = SpriteFetch::Idle;
            DispatchResult::changed()
        }

        Action::SpriteDidError { id, error } => {
            if state.selected_id() != Some(id.as_str()) {
                return DispatchResult::unchanged();
            }
            debug!(id = %id, error = %error, source = ?state.sprite_fetch, "sprite unavailable");
            match state.sprite_fetch {
                SpriteFetch::Host if state.detail.is_loading() => {
                    state.sprite_fetch = SpriteFetch::AwaitingRecord;
                    DispatchResult::changed()
                }
                SpriteFetch::Host => match record_sprite_effect(state) {
                    Some(effect) => DispatchResult::changed_with(effect),
                    None => DispatchResult::changed(),
                },
                SpriteFetch::Record => {
                    state.sprite_fetch = SpriteFetch::Unavailable;
                    DispatchResult::changed()
                }
                _ => DispatchResult::unchanged(),
            }
        }

        Action::ErrorDismiss => {
            if state.list.error.is_none() && state.search.error.is_none() {
                return DispatchResult::unchanged();
            }
            state.list.error = None;
            state.search.error = None;
            DispatchResult::changed()
        }

        Action::Render => DispatchResult::changed(),

        Action::Quit => DispatchResult::unchanged(),
    }
}

/// Falls back to the record's sprite URL, or gives up when it has none.
fn record_sprite_effect(state: &mut AppState) -> Option<Effect> {
    let id = state.selected_id().map(str::to_string);
    let url = state.record_sprite_url().map(str::to_string);
    match id.zip(url) {
        Some((id, url)) => {
            state.sprite_fetch = SpriteFetch::Record;
            Some(Effect::LoadSpriteAt { id, url })
        }
        None => {
            state.sprite_fetch = SpriteFetch::Unavailable;
            None
        }
    }
}

fn settle_effect(state: &AppState) -> Effect {
    Effect::SettleSearch {
        text: state.search.raw.clone(),
        delay: state.settings.debounce(),
    }
}

/// Bumps the generation and returns the pass to run, if any name matches.
fn start_search_pass(state: &mut AppState) -> Option<Effect> {
    state.search.generation += 1;
    state.search.results.clear();
    state.search.error = None;
    state.highlighted = 0;

    let candidates = filter_index(&state.index, &state.search.settled);
    debug!(
        query = %state.search.settled,
        candidates = candidates.len(),
        generation = state.search.generation,
        "search pass"
    );
    if candidates.is_empty() {
        state.search.searching = false;
        return None;
    }
    state.search.searching = true;
    Some(Effect::RunSearch {
        generation: state.search.generation,
        candidates,
        cap: state.settings.search_cap,
    })
}

fn is_selected_url(state: &AppState, url: &str) -> bool {
    state
        .selected
        .as_ref()
        .is_some_and(|entry| entry.url == url)
}
