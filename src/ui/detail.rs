//! Place detail screen rendering
//!
//! Place facts, the review list and the review form in one scrollable
//! column. A failed place lookup replaces the whole body with an error panel.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::app::App;
use crate::detail::{DetailStatus, PlaceDetail, ReviewsStatus};
use crate::forms::{CounterLevel, MessageKind, ReviewField, ReviewForm};

/// Renders the place detail screen
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(1)])
        .split(area);

    match &app.detail {
        None => render_message(frame, chunks[0], "Loading place...", Color::Cyan),
        Some(detail) => match &detail.status {
            DetailStatus::Loading => render_message(frame, chunks[0], "Loading place...", Color::Cyan),
            DetailStatus::Failed(message) => render_error(frame, chunks[0], message),
            DetailStatus::Loaded(_) => render_body(frame, app, detail, chunks[0]),
        },
    }

    render_help(frame, chunks[1], app);
}

fn render_message(frame: &mut Frame, area: Rect, text: &str, color: Color) {
    let paragraph = Paragraph::new(text.to_string())
        .style(Style::default().fg(color))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(paragraph, area);
}

fn render_error(frame: &mut Frame, area: Rect, message: &str) {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Could not load this place",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(message.to_string()),
        Line::from(""),
        Line::from(Span::styled(
            "Press Esc to go back, r to retry",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    let block = Block::default()
        .title(" Error ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red));
    frame.render_widget(
        Paragraph::new(lines).block(block).alignment(Alignment::Center),
        area,
    );
}

fn label(text: &'static str) -> Span<'static> {
    Span::styled(text, Style::default().fg(Color::DarkGray))
}

fn render_body(frame: &mut Frame, app: &App, detail: &PlaceDetail, area: Rect) {
    let Some(place) = detail.place() else {
        return;
    };

    let mut lines = vec![
        Line::from(vec![
            label("Host:      "),
            Span::raw(detail.host_name().unwrap_or("Loading...").to_string()),
        ]),
        Line::from(vec![
            label("Price:     "),
            Span::styled(
                format!("{} gold per night", place.price),
                Style::default().fg(Color::Green),
            ),
        ]),
        Line::from(vec![
            label("Location:  "),
            Span::raw(format!("{}, {}", place.latitude, place.longitude)),
        ]),
        Line::from(vec![
            label("Rating:    "),
            Span::styled(
                detail.average_rating().to_string(),
                Style::default().fg(Color::Yellow),
            ),
        ]),
        Line::from(vec![label("Image:     "), Span::raw(place.image.clone())]),
        Line::from(""),
        Line::from(place.description.clone()),
        Line::from(""),
        Line::from(Span::styled(
            "Amenities",
            Style::default().add_modifier(Modifier::BOLD),
        )),
    ];

    if place.amenities.is_empty() {
        lines.push(Line::from(Span::styled(
            "  No amenities listed",
            Style::default().fg(Color::DarkGray),
        )));
    } else {
        lines.push(Line::from(format!("  {}", place.amenities.join(" · "))));
    }

    lines.push(Line::from(""));
    lines.extend(review_lines(detail));
    lines.push(Line::from(""));
    lines.extend(form_lines(detail, app));

    if detail.is_offline() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Offline sample place",
            Style::default().fg(Color::Yellow),
        )));
    }

    let block = Block::default()
        .title(format!(" {} ", place.title))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.detail_scroll_offset, 0));
    frame.render_widget(paragraph, area);
}

fn review_lines(detail: &PlaceDetail) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(vec![
        Span::styled("Reviews", Style::default().add_modifier(Modifier::BOLD)),
        Span::styled(
            format!("  {}", detail.review_count_label()),
            Style::default().fg(Color::DarkGray),
        ),
    ])];

    match &detail.reviews {
        ReviewsStatus::Loading => lines.push(Line::from(Span::styled(
            "  Loading reviews...",
            Style::default().fg(Color::DarkGray),
        ))),
        ReviewsStatus::Failed => lines.push(Line::from(Span::styled(
            "  Failed to load reviews.",
            Style::default().fg(Color::Red),
        ))),
        ReviewsStatus::Loaded(reviews) if reviews.is_empty() => lines.push(Line::from(
            Span::styled("  No reviews yet.", Style::default().fg(Color::DarkGray)),
        )),
        ReviewsStatus::Loaded(reviews) => {
            for review in reviews {
                lines.push(Line::from(vec![
                    Span::raw("  "),
                    Span::styled(review.stars(), Style::default().fg(Color::Yellow)),
                    Span::raw("  "),
                    Span::styled(
                        review.author_name(),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                ]));
                lines.push(Line::from(format!("    {}", review.text)));
            }
        }
    }
    lines
}

fn counter_color(level: CounterLevel) -> Color {
    match level {
        CounterLevel::Normal => Color::DarkGray,
        CounterLevel::Warning => Color::Yellow,
        CounterLevel::Danger => Color::Red,
    }
}

fn field_style(form: &ReviewForm, field: ReviewField, editing: bool) -> Style {
    if form.invalid.contains(&field) {
        Style::default().fg(Color::Red)
    } else if editing && form.focus == field {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    }
}

fn form_lines(detail: &PlaceDetail, app: &App) -> Vec<Line<'static>> {
    let form = &detail.form;
    let mut lines = vec![Line::from(Span::styled(
        "Add a review",
        Style::default().add_modifier(Modifier::BOLD),
    ))];

    let access = detail.review_access(app.auth.user());
    if let Some(notice) = access.notice() {
        lines.push(Line::from(Span::styled(
            format!("  {}", notice),
            Style::default().fg(Color::DarkGray),
        )));
    } else {
        let editing = app.review_editing;
        let stars = match form.rating {
            Some(r) => {
                let r = r.min(5) as usize;
                format!("{}{}", "★".repeat(r), "☆".repeat(5 - r))
            }
            None => "☆☆☆☆☆".to_string(),
        };
        lines.push(Line::from(vec![
            label("  Rating:  "),
            Span::styled(stars, field_style(form, ReviewField::Rating, editing)),
        ]));
        let cursor = if editing && form.focus == ReviewField::Text { "▏" } else { "" };
        lines.push(Line::from(vec![
            label("  Review:  "),
            Span::styled(
                format!("{}{}", form.text, cursor),
                field_style(form, ReviewField::Text, editing),
            ),
        ]));
        lines.push(Line::from(Span::styled(
            format!("  {}", form.char_count_label()),
            Style::default().fg(counter_color(form.counter_level())),
        )));
        if form.submitting {
            lines.push(Line::from(Span::styled(
                "  Submitting...",
                Style::default().fg(Color::Cyan),
            )));
        } else if !editing {
            lines.push(Line::from(Span::styled(
                "  Press w to write a review",
                Style::default().fg(Color::DarkGray),
            )));
        }
    }

    if let Some(message) = &form.message {
        let color = match message.kind {
            MessageKind::Success => Color::Green,
            MessageKind::Error => Color::Red,
        };
        lines.push(Line::from(Span::styled(
            format!("  {}", message.text),
            Style::default().fg(color),
        )));
    }
    lines
}

fn render_help(frame: &mut Frame, area: Rect, app: &App) {
    let key = Style::default().fg(Color::Yellow);
    let spans = if app.review_editing {
        vec![
            Span::styled("1-5", key),
            Span::raw(" Rating  "),
            Span::styled("Tab", key),
            Span::raw(" Switch field  "),
            Span::styled("Enter", key),
            Span::raw(" Submit  "),
            Span::styled("Esc", key),
            Span::raw(" Stop editing"),
        ]
    } else {
        vec![
            Span::styled("↑/↓", key),
            Span::raw(" Scroll  "),
            Span::styled("w", key),
            Span::raw(" Review  "),
            Span::styled("r", key),
            Span::raw(" Reload  "),
            Span::styled("Esc", key),
            Span::raw(" Back  "),
            Span::styled("q", key),
            Span::raw(" Quit"),
        ]
    };
    frame.render_widget(
        Paragraph::new(Line::from(spans)).style(Style::default().fg(Color::DarkGray)),
        area,
    );
}
