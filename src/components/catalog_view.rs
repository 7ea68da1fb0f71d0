use crossterm::event::KeyCode;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph, Wrap},
};
use tui_dispatch::EventKind;
use tui_dispatch_components::{
    StatusBar, StatusBarHint, StatusBarProps, StatusBarSection, StatusBarStyle,
};

use super::{
    Component, DetailOverlay, DetailOverlayProps, EntryList, EntryListProps, SearchBar,
    SearchBarProps,
};
use crate::action::Action;
use crate::state::AppState;

pub const EMPTY_RESULTS: &str = "No entries found.";
pub const LOADING_MORE: &str = "Loading more...";

pub struct CatalogViewProps<'a> {
    pub state: &'a AppState,
    pub is_focused: bool,
}

/// The whole screen: search header, list body, footer and detail overlay.
pub struct CatalogView {
    pub list: EntryList,
    pub search: SearchBar,
    pub detail: DetailOverlay,
}

impl Default for CatalogView {
    fn default() -> Self {
        Self {
            list: EntryList::new(),
            search: SearchBar,
            detail: DetailOverlay::new(),
        }
    }
}

impl CatalogView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle_list_event(&mut self, event: &EventKind, state: &AppState) -> Vec<Action> {
        if let EventKind::Key(key) = event {
            match key.code {
                KeyCode::Char('q') => return vec![Action::Quit],
                KeyCode::Char('x') if state.user_error().is_some() => {
                    return vec![Action::ErrorDismiss];
                }
                KeyCode::Esc if state.user_error().is_some() => return vec![Action::ErrorDismiss],
                _ => {}
            }
        }
        let props = EntryListProps {
            entries: state.visible_entries(),
            highlighted: state.highlighted,
            query: &state.search.settled,
            is_focused: true,
            interactive: !state.settings.bare,
        };
        self.list.handle_event(event, props).into_iter().collect()
    }

    pub fn handle_search_event(&mut self, event: &EventKind, state: &AppState) -> Vec<Action> {
        self.search
            .handle_event(event, search_props(state, true))
            .into_iter()
            .collect()
    }

    pub fn handle_detail_event(&mut self, event: &EventKind, state: &AppState) -> Vec<Action> {
        self.detail
            .handle_event(event, detail_props(state, true))
            .into_iter()
            .collect()
    }

    fn render_body(&mut self, frame: &mut Frame, area: Rect, state: &AppState, is_focused: bool) {
        let area = match state.user_error() {
            Some(message) => {
                let chunks = Layout::vertical([Constraint::Length(4), Constraint::Min(1)]).split(area);
                render_error(frame, chunks[0], message);
                chunks[1]
            }
            None => area,
        };

        let entries = state.visible_entries();
        if entries.is_empty() {
            let message = if !state.search.settled.is_empty() {
                if state.search.searching {
                    "Searching..."
                } else {
                    EMPTY_RESULTS
                }
            } else if state.list.loading {
                "Loading..."
            } else {
                ""
            };
            frame.render_widget(
                Paragraph::new(message)
                    .style(Style::default().fg(Color::DarkGray))
                    .alignment(Alignment::Center),
                area,
            );
            return;
        }

        let props = EntryListProps {
            entries,
            highlighted: state.highlighted,
            query: &state.search.settled,
            is_focused: is_focused && !state.search.active && state.selected.is_none(),
            interactive: !state.settings.bare,
        };
        self.list.render(frame, area, props);
    }

    fn render_footer(&self, frame: &mut Frame, area: Rect, state: &AppState) {
        let chunks = Layout::vertical([Constraint::Length(1), Constraint::Length(1)]).split(area);

        // mirrors the load-more gate minus the in-flight check
        if state.search.raw.is_empty() && state.list.cursor.is_some() && state.selected.is_none() {
            frame.render_widget(
                Paragraph::new(LOADING_MORE)
                    .style(Style::default().fg(Color::DarkGray))
                    .alignment(Alignment::Center),
                chunks[0],
            );
        }

        let hints = status_hints(state);
        let mut status_bar = StatusBar::new();
        <StatusBar as Component<Action>>::render(
            &mut status_bar,
            frame,
            chunks[1],
            StatusBarProps {
                left: StatusBarSection::empty(),
                center: StatusBarSection::hints(&hints),
                right: StatusBarSection::empty(),
                style: StatusBarStyle::default(),
                is_focused: false,
            },
        );
    }
}

fn search_props(state: &AppState, is_focused: bool) -> SearchBarProps<'_> {
    SearchBarProps {
        raw: &state.search.raw,
        is_editing: state.search.active,
        searching: state.search.searching,
        loaded: state.list.entries.len(),
        total: state.list.total,
        index_status: state.index_status,
        index_len: state.index.len(),
        searchable: !state.settings.bare,
        is_focused,
    }
}

fn detail_props(state: &AppState, is_focused: bool) -> DetailOverlayProps<'_> {
    DetailOverlayProps {
        selected: state.selected.as_ref(),
        detail: &state.detail,
        sprite: state.sprite.as_ref(),
        is_focused,
    }
}

fn status_hints(state: &AppState) -> Vec<StatusBarHint<'static>> {
    if state.selected.is_some() {
        return vec![StatusBarHint::new("esc", "close")];
    }
    if state.search.active {
        return vec![
            StatusBarHint::new("enter", "done"),
            StatusBarHint::new("ctrl-u", "clear"),
        ];
    }
    let mut hints = vec![StatusBarHint::new("↑↓", "move")];
    if !state.settings.bare {
        hints.push(StatusBarHint::new("enter", "details"));
        hints.push(StatusBarHint::new("/", "search"));
    }
    if state.user_error().is_some() {
        hints.push(StatusBarHint::new("x", "dismiss"));
    }
    hints.push(StatusBarHint::new("q", "quit"));
    hints
}

fn render_error(frame: &mut Frame, area: Rect, message: &str) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red))
        .title(" Error (x to dismiss) ");
    frame.render_widget(
        Paragraph::new(Line::from(message.to_string()))
            .style(Style::default().fg(Color::Red))
            .wrap(Wrap { trim: true })
            .block(block),
        area,
    );
}

impl Component<Action> for CatalogView {
    type Props<'a> = CatalogViewProps<'a>;

    fn handle_event(
        &mut self,
        event: &EventKind,
        props: Self::Props<'_>,
    ) -> impl IntoIterator<Item = Action> {
        if !props.is_focused {
            return Vec::new();
        }
        let state = props.state;
        if state.selected.is_some() {
            self.handle_detail_event(event, state)
        } else if state.search.active {
            self.handle_search_event(event, state)
        } else {
            self.handle_list_event(event, state)
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, props: Self::Props<'_>) {
        let state = props.state;
        let chunks = Layout::vertical([
            Constraint::Length(3), // Search header
            Constraint::Min(1),    // List
            Constraint::Length(2), // Footer + help bar
        ])
        .split(area);

        self.search
            .render(frame, chunks[0], search_props(state, props.is_focused));
        self.render_body(frame, chunks[1], state, props.is_focused);
        self.render_footer(frame, chunks[2], state);

        if state.selected.is_some() {
            self.detail
                .render(frame, area, detail_props(state, props.is_focused));
        }
    }
}
