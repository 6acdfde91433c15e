//! Listing screen rendering
//!
//! Renders the header with the auth widget and filter controls, the
//! horizontally scrolling card row, and the help bar.

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
    Frame,
};

use crate::app::App;
use crate::data::Rating;
use crate::listing::{Card, CARD_WIDTH};
use crate::session::AuthStatus;

/// Columns between two cards
const CARD_GAP: u16 = 2;

/// Renders the listing screen
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(6),    // Card row
            Constraint::Length(1), // Status note
            Constraint::Length(1), // Help text
        ])
        .split(area);

    render_header(frame, app, chunks[0]);
    render_cards(frame, app, chunks[1]);
    render_status(frame, app, chunks[2]);
    render_help(frame, chunks[3], app);
}

/// Auth status widget: greeting and logout hint, or login/register hints
fn auth_spans(auth: &AuthStatus) -> Vec<Span<'static>> {
    let key = Style::default().fg(Color::Yellow);
    match auth {
        AuthStatus::Unknown => vec![Span::styled(
            "Checking session...",
            Style::default().fg(Color::DarkGray),
        )],
        AuthStatus::LoggedIn(_) => vec![
            Span::styled(
                auth.welcome().unwrap_or_default(),
                Style::default().fg(Color::Green),
            ),
            Span::raw("  "),
            Span::styled("o", key),
            Span::raw(" Logout"),
        ],
        AuthStatus::LoggedOut => vec![
            Span::styled("L", key),
            Span::raw(" Login  "),
            Span::styled("R", key),
            Span::raw(" Register"),
        ],
    }
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1), Constraint::Length(1)])
        .split(area);

    let title = Paragraph::new(Line::from(Span::styled(
        "PLACEBOARD",
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )));
    frame.render_widget(title, rows[0]);

    let auth = Paragraph::new(Line::from(auth_spans(&app.auth))).alignment(Alignment::Right);
    frame.render_widget(auth, rows[0]);

    let filter = app.listing.filter();
    let mut spans = vec![
        Span::styled("Price: ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            filter.price_label(),
            if filter.max_price == 0 {
                Style::default().fg(Color::White)
            } else {
                Style::default().fg(Color::Yellow)
            },
        ),
        Span::raw("   "),
        Span::styled("Search: ", Style::default().fg(Color::DarkGray)),
    ];
    if app.search_editing {
        spans.push(Span::styled(
            format!("{}▏", app.search_input),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::UNDERLINED),
        ));
    } else if app.search_input.is_empty() {
        spans.push(Span::styled("(none)", Style::default().fg(Color::DarkGray)));
    } else {
        spans.push(Span::styled(
            app.search_input.clone(),
            Style::default().fg(Color::Yellow),
        ));
    }
    spans.push(Span::styled(
        format!(
            "   Showing {} of {}",
            app.listing.visible_count(),
            app.listing.cards().len()
        ),
        Style::default().fg(Color::DarkGray),
    ));
    frame.render_widget(Paragraph::new(Line::from(spans)), rows[1]);

    let separator = "─".repeat(area.width as usize);
    frame.render_widget(
        Paragraph::new(Span::styled(separator, Style::default().fg(Color::DarkGray))),
        rows[2],
    );
}

fn rating_span(rating: Rating) -> Span<'static> {
    match rating {
        Rating::Score(_) => Span::styled(format!("★ {}", rating), Style::default().fg(Color::Yellow)),
        Rating::New => Span::styled("★ New", Style::default().fg(Color::Magenta)),
    }
}

/// Builds the widget for one card
fn card_widget(card: &Card, selected: bool) -> Paragraph<'static> {
    let place = &card.place;
    let border_style = if selected {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let lines = vec![
        Line::from(vec![
            Span::styled(
                format!("{} gold", place.price),
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(" / night   ", Style::default().fg(Color::DarkGray)),
            rating_span(card.rating()),
        ]),
        Line::from(Span::styled(
            place.image.clone(),
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(""),
        Line::from(place.description.clone()),
        Line::from(""),
        Line::from(vec![
            Span::styled(card.amenity_summary(), Style::default().fg(Color::Cyan)),
            Span::styled(
                if selected { "   Enter: details" } else { "" },
                Style::default().fg(Color::Yellow),
            ),
        ]),
    ];

    let block = Block::default()
        .title(format!(" {} ", place.title))
        .borders(Borders::ALL)
        .border_style(border_style);

    Paragraph::new(lines).block(block).wrap(Wrap { trim: true })
}

/// Renders the visible cards side by side, shifted left by the scroll offset
///
/// Cards overlapping the viewport are drawn into a scratch buffer that starts
/// at the first such card, then the window at the eased offset is copied
/// into the frame. Partially visible cards are clipped, not dropped.
fn render_cards(frame: &mut Frame, app: &App, area: Rect) {
    let visible: Vec<&Card> = app.listing.visible_cards().collect();
    if visible.is_empty() {
        let text = if app.listing.cards().is_empty() {
            "No places to show."
        } else {
            "No places match your filters."
        };
        let empty = Paragraph::new(text)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
        frame.render_widget(empty, area);
        return;
    }
    if area.width == 0 || area.height == 0 {
        return;
    }

    let offset = app.listing.scroll().offset();
    let first = (offset / CARD_WIDTH) as usize;
    let base = first as u16 * CARD_WIDTH;
    let scratch_width = area.width.saturating_add(CARD_WIDTH);
    let mut scratch = Buffer::empty(Rect::new(0, 0, scratch_width, area.height));

    let selected = app.listing.selected_index();
    for (index, card) in visible.iter().enumerate().skip(first) {
        let x = index as u16 * CARD_WIDTH - base;
        if x >= scratch_width {
            break;
        }
        let width = (CARD_WIDTH - CARD_GAP).min(scratch_width - x);
        card_widget(card, index == selected).render(Rect::new(x, 0, width, area.height), &mut scratch);
    }

    let shift = offset - base;
    let buf = frame.buffer_mut();
    for y in 0..area.height {
        for x in 0..area.width {
            let source = scratch.cell((x + shift, y)).cloned();
            if let (Some(source), Some(target)) = (source, buf.cell_mut((area.x + x, area.y + y))) {
                *target = source;
            }
        }
    }
}

fn render_status(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(note) = app.listing.status_note() {
        let paragraph = Paragraph::new(note).style(Style::default().fg(Color::Yellow));
        frame.render_widget(paragraph, area);
    }
}

/// Renders the help text at the bottom of the screen
fn render_help(frame: &mut Frame, area: Rect, app: &App) {
    let key = Style::default().fg(Color::Yellow);
    let help_spans = if app.search_editing {
        vec![
            Span::raw("Type to search  "),
            Span::styled("Enter", key),
            Span::raw(" Keep  "),
            Span::styled("Esc", key),
            Span::raw(" Clear"),
        ]
    } else {
        vec![
            Span::styled("←/→", key),
            Span::raw(" Select  "),
            Span::styled("[ ]", key),
            Span::raw(" Scroll  "),
            Span::styled("Enter", key),
            Span::raw(" Open  "),
            Span::styled("f", key),
            Span::raw(" Price  "),
            Span::styled("/", key),
            Span::raw(" Search  "),
            Span::styled("r", key),
            Span::raw(" Reload  "),
            Span::styled("?", key),
            Span::raw(" Help  "),
            Span::styled("q", key),
            Span::raw(" Quit"),
        ]
    };

    let paragraph = Paragraph::new(Line::from(help_spans)).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(paragraph, area);
}
