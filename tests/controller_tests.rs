//! Controller flows driven through EffectStoreTestHarness

use std::time::Duration;

use tui_dispatch::NumericComponentId;
use tui_dispatch::testing::*;

use pokelist::action::Action;
use pokelist::components::{CatalogView, CatalogViewProps, Component};
use pokelist::config::BrowseSettings;
use pokelist::effect::Effect;
use pokelist::error::CatalogError;
use pokelist::reducer::reducer;
use pokelist::state::{AppState, IndexStatus, ListEntry, ListPage};

fn entry(name: &str, id: u32) -> ListEntry {
    ListEntry {
        name: name.into(),
        url: format!("https://pokeapi.co/api/v2/pokemon/{id}/"),
    }
}

fn first_page() -> ListPage {
    ListPage {
        count: 1302,
        entries: vec![entry("bulbasaur", 1), entry("ivysaur", 2), entry("venusaur", 3)],
        next: Some("https://pokeapi.co/api/v2/pokemon?offset=3&limit=3".into()),
    }
}

fn index() -> Vec<String> {
    ["bulbasaur", "pikachu", "raichu", "pichu", "charmander"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// State past startup: first page and index loaded.
fn booted_state() -> AppState {
    let mut state = AppState::default();
    for action in [
        Action::Init,
        Action::PageDidLoad {
            append: false,
            page: first_page(),
        },
        Action::IndexDidLoad {
            names: index(),
            error: None,
        },
    ] {
        let _ = reducer(&mut state, action);
    }
    state
}

// ============================================================================
// Startup and pagination
// ============================================================================

#[test]
fn init_starts_page_and_index() {
    let mut harness = EffectStoreTestHarness::new(AppState::default(), reducer);
    harness.dispatch_collect(Action::Init);
    harness.assert_state(|s| s.list.loading && s.index_status == IndexStatus::Loading);

    let effects = harness.drain_effects();
    effects.effects_count(2);
    effects.effects_first_matches(|e| {
        matches!(
            e,
            Effect::LoadPage {
                offset: 0,
                append: false,
                ..
            }
        )
    });
}

#[test]
fn load_more_appends_next_page() {
    let mut harness = EffectStoreTestHarness::new(booted_state(), reducer);
    harness.dispatch_collect(Action::LoadMore);

    let effects = harness.drain_effects();
    effects.effects_count(1);
    effects.effects_first_matches(|e| {
        matches!(
            e,
            Effect::LoadPage {
                limit: 1000,
                offset: 3,
                append: true
            }
        )
    });

    harness.complete_action(Action::PageDidLoad {
        append: true,
        page: ListPage {
            count: 1302,
            entries: vec![entry("charmander", 4)],
            next: None,
        },
    });
    harness.process_emitted();
    harness.assert_state(|s| s.list.entries.len() == 4 && s.list.is_exhausted());

    harness.dispatch_collect(Action::LoadMore);
    harness.drain_effects().effects_empty();
}

#[test]
fn load_more_is_single_flight() {
    let mut harness = EffectStoreTestHarness::new(booted_state(), reducer);
    let results = harness.dispatch_all([Action::LoadMore, Action::LoadMore, Action::LoadMore]);
    assert_eq!(results, vec![true, false, false]);
    harness.drain_effects().effects_count(1);
}

#[test]
fn load_more_suspended_while_detail_open() {
    let mut harness = EffectStoreTestHarness::new(booted_state(), reducer);
    harness.dispatch_collect(Action::DetailOpen);
    harness.drain_effects();

    harness.dispatch_collect(Action::LoadMore);
    harness.drain_effects().effects_empty();

    harness.dispatch_collect(Action::DetailClose);
    harness.dispatch_collect(Action::LoadMore);
    harness.drain_effects().effects_count(1);
}

#[test]
fn page_failure_surfaces_error() {
    let mut harness = EffectStoreTestHarness::new(booted_state(), reducer);
    harness.dispatch_collect(Action::LoadMore);
    harness.complete_action(Action::PageDidError(CatalogError::Network(
        "connection reset".into(),
    )));
    harness.process_emitted();

    harness.assert_state(|s| !s.list.loading);
    harness.assert_state(|s| {
        s.user_error() == Some("Failed to load entries: request failed: connection reset")
    });
    harness.assert_state(|s| s.list.entries.len() == 3);
}

// ============================================================================
// Search
// ============================================================================

#[test]
fn every_edit_restarts_the_quiet_period() {
    let mut harness = EffectStoreTestHarness::new(booted_state(), reducer);
    harness.dispatch_collect(Action::SearchStart);
    harness.dispatch_collect(Action::SearchQueryChange("c".into()));
    harness.dispatch_collect(Action::SearchQueryChange("ch".into()));

    let effects = harness.drain_effects();
    effects.effects_count(2);
    effects.effects_all_match(|e| {
        matches!(e, Effect::SettleSearch { delay, .. } if *delay == Duration::from_millis(500))
    });
    harness.assert_state(|s| s.search.settled.is_empty());
}

#[test]
fn settled_text_filters_index_in_order() {
    let mut harness = EffectStoreTestHarness::new(booted_state(), reducer);
    harness.dispatch_collect(Action::SearchQueryChange("chu".into()));
    harness.drain_effects();
    harness.dispatch_collect(Action::SearchDidSettle("chu".into()));

    let effects = harness.drain_effects();
    effects.effects_count(1);
    effects.effects_first_matches(|e| match e {
        Effect::RunSearch {
            candidates, cap, ..
        } => {
            candidates == &vec!["pikachu".to_string(), "raichu".into(), "pichu".into()]
                && *cap == 20
        }
        _ => false,
    });
}

#[test]
fn clearing_search_restores_primary_list_without_requests() {
    let mut harness = EffectStoreTestHarness::new(booted_state(), reducer);
    harness.dispatch_collect(Action::SearchDidSettle("pika".into()));
    harness.drain_effects();
    harness.assert_state(|s| s.search.generation == 1);
    harness.complete_action(Action::SearchDidLoad {
        generation: 1,
        results: vec![entry("pikachu", 25)],
    });
    harness.process_emitted();
    harness.assert_state(|s| s.visible_entries().len() == 1);

    harness.dispatch_collect(Action::SearchDidSettle(String::new()));
    harness.drain_effects().effects_empty();
    harness.assert_state(|s| s.visible_entries() == first_page().entries.as_slice());

    // same again: nothing changes
    harness.dispatch_collect(Action::SearchDidSettle(String::new()));
    harness.drain_effects().effects_empty();
    harness.assert_state(|s| s.search.generation == 2);
    harness.assert_state(|s| s.visible_entries() == first_page().entries.as_slice());
}

#[test]
fn stale_pass_cannot_overwrite_newer_results() {
    let mut harness = EffectStoreTestHarness::new(booted_state(), reducer);
    harness.dispatch_collect(Action::SearchDidSettle("pi".into()));
    harness.dispatch_collect(Action::SearchDidSettle("pika".into()));
    harness.drain_effects();
    harness.assert_state(|s| s.search.generation == 2);
    let (stale, current) = (1, 2);

    harness.complete_action(Action::SearchDidLoad {
        generation: current,
        results: vec![entry("pikachu", 25)],
    });
    harness.complete_action(Action::SearchDidLoad {
        generation: stale,
        results: vec![entry("pikachu", 25), entry("pichu", 172)],
    });
    let (changed, total) = harness.process_emitted();

    assert_eq!(total, 2);
    assert_eq!(changed, 1);
    harness.assert_state(|s| s.visible_entries() == [entry("pikachu", 25)].as_slice());
}

#[test]
fn late_index_reruns_search() {
    let mut harness = EffectStoreTestHarness::new(AppState::default(), reducer);
    harness.dispatch_collect(Action::Init);
    harness.dispatch_collect(Action::SearchDidSettle("chu".into()));
    harness.drain_effects();

    harness.complete_action(Action::IndexDidLoad {
        names: index(),
        error: None,
    });
    harness.process_emitted();
    harness
        .drain_effects()
        .effects_first_matches(|e| matches!(e, Effect::RunSearch { candidates, .. } if candidates.len() == 3));
}

#[test]
fn degraded_index_stays_silent() {
    let mut harness = EffectStoreTestHarness::new(AppState::default(), reducer);
    harness.dispatch_collect(Action::Init);
    harness.complete_action(Action::IndexDidLoad {
        names: vec!["bulbasaur".into()],
        error: Some(CatalogError::Http { status: 500 }),
    });
    harness.process_emitted();
    harness.assert_state(|s| s.index_status == IndexStatus::Degraded);
    harness.assert_state(|s| s.user_error().is_none());
}

// ============================================================================
// Detail
// ============================================================================

#[test]
fn open_and_close_detail() {
    let mut harness = EffectStoreTestHarness::new(booted_state(), reducer);
    harness.dispatch_collect(Action::ListHighlight(2));
    harness.dispatch_collect(Action::DetailOpen);
    harness.assert_state(|s| s.detail.is_loading());

    let effects = harness.drain_effects();
    effects.effects_count(2);
    effects.effects_first_matches(|e| {
        matches!(e, Effect::LoadDetail { url } if url == "https://pokeapi.co/api/v2/pokemon/3/")
    });

    harness.dispatch_collect(Action::DetailClose);
    harness.assert_state(|s| s.selected.is_none() && s.detail.is_empty());
}

#[test]
fn bare_variant_only_paginates() {
    let mut harness = EffectStoreTestHarness::new(AppState::new(BrowseSettings::bare()), reducer);
    harness.dispatch_collect(Action::Init);
    let effects = harness.drain_effects();
    effects.effects_count(1);
    effects.effects_none_match(|e| matches!(e, Effect::LoadIndex { .. }));
    effects.effects_first_matches(|e| matches!(e, Effect::LoadPage { limit: 20, .. }));
}

// ============================================================================
// Keys through the view
// ============================================================================

#[test]
fn slash_then_typing_schedules_settle() {
    let mut harness = EffectStoreTestHarness::new(booted_state(), reducer);
    let mut view = CatalogView::new();

    let actions = harness.send_keys::<NumericComponentId, _, _>("/", |state, event| {
        let props = CatalogViewProps {
            state,
            is_focused: true,
        };
        view.handle_event(&event.kind, props)
            .into_iter()
            .collect::<Vec<_>>()
    });
    actions.assert_first(Action::SearchStart);
    for action in actions {
        harness.dispatch_collect(action);
    }

    let actions = harness.send_keys::<NumericComponentId, _, _>("p", |state, event| {
        let props = CatalogViewProps {
            state,
            is_focused: true,
        };
        view.handle_event(&event.kind, props)
            .into_iter()
            .collect::<Vec<_>>()
    });
    actions.assert_first(Action::SearchQueryChange("p".into()));
    for action in actions {
        harness.dispatch_collect(action);
    }
    harness
        .drain_effects()
        .effects_first_matches(|e| matches!(e, Effect::SettleSearch { text, .. } if text == "p"));
}
