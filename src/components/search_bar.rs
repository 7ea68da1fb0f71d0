use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use tui_dispatch::EventKind;

use super::Component;
use crate::action::Action;
use crate::state::IndexStatus;

const PLACEHOLDER: &str = "Search (press /)";

pub struct SearchBarProps<'a> {
    pub raw: &'a str,
    pub is_editing: bool,
    pub searching: bool,
    pub loaded: usize,
    pub total: Option<u32>,
    pub index_status: IndexStatus,
    pub index_len: usize,
    /// False for the bare list, which has no search.
    pub searchable: bool,
    pub is_focused: bool,
}

/// Header with the search input and catalog counters.
#[derive(Default)]
pub struct SearchBar;

impl SearchBar {
    fn counters(props: &SearchBarProps<'_>) -> Line<'static> {
        let dim = Style::default().fg(Color::DarkGray);
        let total = props
            .total
            .map(|total| total.to_string())
            .unwrap_or_else(|| "?".to_string());
        let index = match props.index_status {
            IndexStatus::Idle => String::new(),
            IndexStatus::Loading => " · indexing".to_string(),
            IndexStatus::Ready => format!(" · {} indexed", props.index_len),
            IndexStatus::Degraded => format!(" · {} indexed (partial)", props.index_len),
        };
        let mut spans = vec![Span::styled(format!("{}/{total}{index}", props.loaded), dim)];
        if props.searching {
            spans.push(Span::styled(
                " · searching",
                Style::default().fg(Color::Yellow),
            ));
        }
        Line::from(spans)
    }
}

impl Component<Action> for SearchBar {
    type Props<'a> = SearchBarProps<'a>;

    fn handle_event(
        &mut self,
        event: &EventKind,
        props: Self::Props<'_>,
    ) -> impl IntoIterator<Item = Action> {
        if !props.is_focused || !props.is_editing || !props.searchable {
            return None;
        }

        let EventKind::Key(key) = event else {
            return None;
        };

        match key.code {
            KeyCode::Esc | KeyCode::Enter => Some(Action::SearchStop),
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(Action::SearchClear)
            }
            KeyCode::Backspace => {
                let mut text = props.raw.to_string();
                text.pop().map(|_| Action::SearchQueryChange(text))
            }
            KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(Action::SearchQueryChange(format!("{}{ch}", props.raw)))
            }
            _ => None,
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, props: Self::Props<'_>) {
        let border = if props.is_editing {
            Color::Yellow
        } else {
            Color::DarkGray
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .title(" Pokédex ");
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layout::horizontal([Constraint::Min(10), Constraint::Length(44)]).split(inner);

        let input = if !props.searchable {
            Line::default()
        } else if props.raw.is_empty() && !props.is_editing {
            Line::from(Span::styled(
                PLACEHOLDER,
                Style::default().fg(Color::DarkGray),
            ))
        } else {
            let mut spans = vec![Span::raw(props.raw.to_string())];
            if props.is_editing {
                spans.push(Span::styled(
                    "_",
                    Style::default().add_modifier(Modifier::SLOW_BLINK),
                ));
            }
            Line::from(spans)
        };
        frame.render_widget(Paragraph::new(input), chunks[0]);
        frame.render_widget(
            Paragraph::new(Self::counters(&props)).alignment(Alignment::Right),
            chunks[1],
        );
    }
}
