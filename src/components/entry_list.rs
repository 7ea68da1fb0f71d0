use crossterm::event::KeyCode;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::Line,
};
use tui_dispatch::EventKind;
use tui_dispatch_components::{
    BaseStyle, Padding, ScrollbarStyle, SelectList, SelectListBehavior, SelectListProps,
    SelectListStyle, SelectionStyle, highlight_substring,
};

use super::Component;
use crate::action::Action;
use crate::state::{ListEntry, display_name};

/// A highlight this close to the last row asks for the next page.
pub const NEAR_END_ROWS: usize = 5;
const PAGE_STEP: isize = 10;
const SCROLL_STEP: isize = 3;

pub struct EntryListProps<'a> {
    pub entries: &'a [ListEntry],
    pub highlighted: usize,
    /// Settled search text, highlighted inside each row.
    pub query: &'a str,
    pub is_focused: bool,
    /// Detail overlay and search are available (not the bare list).
    pub interactive: bool,
}

pub struct EntryList {
    list: SelectList,
}

impl Default for EntryList {
    fn default() -> Self {
        Self {
            list: SelectList::new(),
        }
    }
}

/// `#25 Pikachu`
pub fn entry_label(entry: &ListEntry) -> String {
    let name = display_name(&entry.name);
    match entry.numeric_id() {
        Some(id) => format!("#{id} {name}"),
        None => name,
    }
}

impl EntryList {
    pub fn new() -> Self {
        Self::default()
    }

    fn items(entries: &[ListEntry], query: &str) -> Vec<Line<'static>> {
        let base = Style::default().fg(Color::Reset);
        let highlight = Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD);
        entries
            .iter()
            .map(|entry| highlight_substring(&entry_label(entry), query, base, highlight))
            .collect()
    }

    fn move_to(props: &EntryListProps<'_>, delta: isize) -> Vec<Action> {
        let len = props.entries.len();
        if len == 0 {
            return Vec::new();
        }
        let last = len - 1;
        let target = (props.highlighted as isize + delta).clamp(0, last as isize) as usize;
        Self::jump_to(props, target)
    }

    fn jump_to(props: &EntryListProps<'_>, target: usize) -> Vec<Action> {
        let mut actions = Vec::new();
        if target != props.highlighted {
            actions.push(Action::ListHighlight(target));
        }
        if target + NEAR_END_ROWS >= props.entries.len().saturating_sub(1) {
            actions.push(Action::LoadMore);
        }
        actions
    }
}

impl Component<Action> for EntryList {
    type Props<'a> = EntryListProps<'a>;

    fn handle_event(
        &mut self,
        event: &EventKind,
        props: Self::Props<'_>,
    ) -> impl IntoIterator<Item = Action> {
        if !props.is_focused {
            return Vec::new();
        }

        match event {
            EventKind::Key(key) => match key.code {
                KeyCode::Down | KeyCode::Char('j') => Self::move_to(&props, 1),
                KeyCode::Up | KeyCode::Char('k') => Self::move_to(&props, -1),
                KeyCode::PageDown => Self::move_to(&props, PAGE_STEP),
                KeyCode::PageUp => Self::move_to(&props, -PAGE_STEP),
                KeyCode::Home => Self::move_to(&props, -(props.highlighted as isize)),
                KeyCode::End if !props.entries.is_empty() => {
                    Self::jump_to(&props, props.entries.len() - 1)
                }
                KeyCode::Enter if props.interactive && !props.entries.is_empty() => {
                    vec![Action::DetailOpen]
                }
                KeyCode::Char('/') if props.interactive => vec![Action::SearchStart],
                _ => Vec::new(),
            },
            EventKind::Scroll { delta, .. } => Self::move_to(&props, *delta as isize * SCROLL_STEP),
            _ => Vec::new(),
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, props: Self::Props<'_>) {
        let items = Self::items(props.entries, props.query);
        let list_props = SelectListProps {
            items: &items,
            count: items.len(),
            selected: props.highlighted.min(items.len().saturating_sub(1)),
            is_focused: props.is_focused,
            style: SelectListStyle {
                base: BaseStyle {
                    border: None,
                    padding: Padding::xy(1, 0),
                    bg: None,
                    fg: None,
                },
                selection: SelectionStyle::default(),
                scrollbar: ScrollbarStyle::default(),
            },
            behavior: SelectListBehavior {
                show_scrollbar: true,
                wrap_navigation: false,
            },
            on_select: Action::ListHighlight,
            render_item: &|item| item.clone(),
        };
        self.list.render(frame, area, list_props);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEvent, KeyModifiers};
    use tui_dispatch::testing::*;

    fn press(code: KeyCode) -> EventKind {
        EventKind::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn entries(n: u32) -> Vec<ListEntry> {
        (1..=n)
            .map(|id| ListEntry {
                name: format!("mon{id}"),
                url: format!("https://pokeapi.co/api/v2/pokemon/{id}/"),
            })
            .collect()
    }

    fn actions_for(entries: &[ListEntry], highlighted: usize, event: EventKind) -> Vec<Action> {
        let mut component = EntryList::new();
        let props = EntryListProps {
            entries,
            highlighted,
            query: "",
            is_focused: true,
            interactive: true,
        };
        component.handle_event(&event, props).into_iter().collect()
    }

    #[test]
    fn label_uses_numeric_id_and_capitalised_name() {
        let entry = ListEntry {
            name: "pikachu".into(),
            url: "https://pokeapi.co/api/v2/pokemon/25/".into(),
        };
        assert_eq!(entry_label(&entry), "#25 Pikachu");
    }

    #[test]
    fn down_moves_highlight() {
        let list = entries(30);
        let actions = actions_for(&list, 0, press(KeyCode::Down));
        actions.assert_count(1);
        actions.assert_first(Action::ListHighlight(1));
    }

    #[test]
    fn nearing_the_end_requests_more() {
        let list = entries(30);
        let actions = actions_for(&list, 23, press(KeyCode::Down));
        assert_eq!(actions, vec![Action::ListHighlight(24), Action::LoadMore]);
    }

    #[test]
    fn far_from_the_end_keeps_quiet() {
        let list = entries(30);
        let actions = actions_for(&list, 22, press(KeyCode::Down));
        assert_eq!(actions, vec![Action::ListHighlight(23)]);
    }

    #[test]
    fn end_jumps_to_last_row() {
        let list = entries(30);
        let actions = actions_for(&list, 0, press(KeyCode::End));
        assert_eq!(actions, vec![Action::ListHighlight(29), Action::LoadMore]);
    }

    #[test]
    fn enter_opens_detail() {
        let list = entries(3);
        let actions = actions_for(&list, 1, press(KeyCode::Enter));
        actions.assert_first(Action::DetailOpen);
    }

    #[test]
    fn bare_list_ignores_enter_and_slash() {
        let list = entries(3);
        let mut component = EntryList::new();
        let props = EntryListProps {
            entries: &list,
            highlighted: 0,
            query: "",
            is_focused: true,
            interactive: false,
        };
        let actions: Vec<_> = component
            .handle_event(&press(KeyCode::Char('/')), props)
            .into_iter()
            .collect();
        actions.assert_empty();
    }

    #[test]
    fn unfocused_list_ignores_keys() {
        let list = entries(3);
        let mut component = EntryList::new();
        let props = EntryListProps {
            entries: &list,
            highlighted: 0,
            query: "",
            is_focused: false,
            interactive: true,
        };
        let actions: Vec<_> = component
            .handle_event(&press(KeyCode::Down), props)
            .into_iter()
            .collect();
        actions.assert_empty();
    }

    #[test]
    fn render_shows_rows() {
        let list = entries(3);
        let mut render = RenderHarness::new(30, 6);
        let mut component = EntryList::new();
        let output = render.render_to_string_plain(|frame| {
            let props = EntryListProps {
                entries: &list,
                highlighted: 0,
                query: "",
                is_focused: true,
                interactive: true,
            };
            component.render(frame, frame.area(), props);
        });
        assert!(output.contains("#1 Mon1"));
        assert!(output.contains("#3 Mon3"));
    }
}
