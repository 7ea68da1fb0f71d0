use crossterm::event::KeyCode;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
};
use tui_dispatch::{DataResource, EventKind};
use tui_dispatch_components::{
    BaseStyle, Modal, ModalBehavior, ModalProps, ModalStyle, Padding, centered_rect,
};

use super::Component;
use crate::action::Action;
use crate::sprite::{SpriteData, SpriteView};
use crate::state::{DetailRecord, ListEntry};

pub struct DetailOverlayProps<'a> {
    pub selected: Option<&'a ListEntry>,
    pub detail: &'a DataResource<DetailRecord>,
    pub sprite: Option<&'a SpriteData>,
    pub is_focused: bool,
}

pub struct DetailOverlay {
    modal: Modal,
}

impl Default for DetailOverlay {
    fn default() -> Self {
        Self {
            modal: Modal::new(),
        }
    }
}

impl DetailOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    fn render_record(
        frame: &mut Frame,
        area: Rect,
        detail: &DetailRecord,
        sprite: Option<&SpriteData>,
    ) {
        let chunks = Layout::vertical([
            Constraint::Length(1), // Name
            Constraint::Min(4),    // Sprite
            Constraint::Length(3), // Facts
            Constraint::Length(1), // Hint
        ])
        .split(area);

        let title = Line::from(vec![
            Span::styled(
                detail.name.to_uppercase(),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  #{}", detail.id),
                Style::default().fg(Color::DarkGray),
            ),
        ]);
        frame.render_widget(Paragraph::new(title).alignment(Alignment::Center), chunks[0]);

        match sprite {
            Some(sprite) => frame.render_widget(SpriteView::new(sprite), chunks[1]),
            None => frame.render_widget(
                Paragraph::new("no image")
                    .style(Style::default().fg(Color::DarkGray))
                    .alignment(Alignment::Center),
                chunks[1],
            ),
        }

        let facts = vec![
            Line::from(format!("Types: {}", detail.types.join(", "))),
            Line::from(format!("Height: {}", detail.height)),
            Line::from(format!("Weight: {}", detail.weight)),
        ];
        frame.render_widget(Paragraph::new(facts).alignment(Alignment::Center), chunks[2]);
        render_hint(frame, chunks[3]);
    }

    fn render_message(frame: &mut Frame, area: Rect, message: Line<'static>) {
        let chunks = Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).split(area);
        frame.render_widget(
            Paragraph::new(message)
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true }),
            chunks[0],
        );
        render_hint(frame, chunks[1]);
    }
}

fn render_hint(frame: &mut Frame, area: Rect) {
    frame.render_widget(
        Paragraph::new("esc close")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center),
        area,
    );
}

impl Component<Action> for DetailOverlay {
    type Props<'a> = DetailOverlayProps<'a>;

    fn handle_event(
        &mut self,
        event: &EventKind,
        props: Self::Props<'_>,
    ) -> impl IntoIterator<Item = Action> {
        if !props.is_focused || props.selected.is_none() {
            return None;
        }

        match event {
            EventKind::Key(key) => match key.code {
                KeyCode::Esc | KeyCode::Enter | KeyCode::Char('c') => Some(Action::DetailClose),
                _ => None,
            },
            _ => None,
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, props: Self::Props<'_>) {
        let Some(selected) = props.selected else {
            return;
        };
        if area.width < 20 || area.height < 8 {
            return;
        }

        let modal_area = centered_rect(50, 22, area);
        let mut render_content = |frame: &mut Frame, content_area: Rect| match props.detail {
            DataResource::Loaded(detail) => {
                Self::render_record(frame, content_area, detail, props.sprite);
            }
            DataResource::Failed(error) => Self::render_message(
                frame,
                content_area,
                Line::from(Span::styled(
                    format!("{}: {error}", selected.name),
                    Style::default().fg(Color::Red),
                )),
            ),
            DataResource::Loading | DataResource::Empty => Self::render_message(
                frame,
                content_area,
                Line::from(format!("Loading {}...", selected.name)),
            ),
        };

        self.modal.render(
            frame,
            area,
            ModalProps {
                is_open: true,
                is_focused: props.is_focused,
                area: modal_area,
                style: ModalStyle {
                    base: BaseStyle {
                        bg: Some(Color::Rgb(35, 35, 45)),
                        padding: Padding::all(1),
                        border: None,
                        fg: None,
                    },
                    ..Default::default()
                },
                behavior: ModalBehavior::default(),
                on_close: || Action::DetailClose,
                render_content: &mut render_content,
            },
        );
    }
}
