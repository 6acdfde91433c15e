//! Login and registration screens

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::App;
use crate::forms::{LoginField, MessageKind, RegisterField};
use crate::ui::help_overlay::centered_rect;

fn field_line(name: &str, value: &str, focused: bool, masked: bool) -> Line<'static> {
    let shown = if masked {
        "*".repeat(value.chars().count())
    } else {
        value.to_string()
    };
    let (marker, style) = if focused {
        (
            "▸ ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
    } else {
        ("  ", Style::default())
    };
    let cursor = if focused { "▏" } else { "" };
    Line::from(vec![
        Span::styled(marker, style),
        Span::styled(format!("{:<18}", name), Style::default().fg(Color::DarkGray)),
        Span::styled(format!("{}{}", shown, cursor), style),
    ])
}

fn hint_line() -> Line<'static> {
    let key = Style::default().fg(Color::Yellow);
    Line::from(vec![
        Span::styled("Tab", key),
        Span::raw(" Next field  "),
        Span::styled("Enter", key),
        Span::raw(" Submit  "),
        Span::styled("Esc", key),
        Span::raw(" Back"),
    ])
}

fn form_area(frame: &Frame, height: u16) -> Rect {
    centered_rect(60, height, frame.area())
}

fn render_form(frame: &mut Frame, title: &str, lines: Vec<Line<'static>>, area: Rect) {
    frame.render_widget(Clear, area);
    let block = Block::default()
        .title(format!(" {} ", title))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Renders the login screen
pub fn render_login(frame: &mut Frame, app: &App) {
    let form = &app.login_form;
    let mut lines = vec![
        Line::from(""),
        field_line("Email", &form.email, form.focus == LoginField::Email, false),
        field_line("Password", &form.password, form.focus == LoginField::Password, true),
        Line::from(""),
    ];

    if let Some(notice) = &form.notice {
        lines.push(Line::from(Span::styled(
            format!("  {}", notice),
            Style::default().fg(Color::Green),
        )));
    }
    if let Some(error) = &form.error {
        lines.push(Line::from(Span::styled(
            format!("  {}", error),
            Style::default().fg(Color::Red),
        )));
    }
    if form.submitting {
        lines.push(Line::from(Span::styled(
            "  Logging in...",
            Style::default().fg(Color::Cyan),
        )));
    }
    lines.push(Line::from(""));
    lines.push(hint_line());

    let area = form_area(frame, 12);
    render_form(frame, "Login", lines, area);
}

/// Renders the registration screen
pub fn render_register(frame: &mut Frame, app: &App) {
    let form = &app.register_form;
    let mut lines = vec![
        Line::from(""),
        field_line("First name", &form.first_name, form.focus == RegisterField::FirstName, false),
        field_line("Last name", &form.last_name, form.focus == RegisterField::LastName, false),
        field_line("Email", &form.email, form.focus == RegisterField::Email, false),
        field_line("Password", &form.password, form.focus == RegisterField::Password, true),
        field_line("Confirm password", &form.confirm, form.focus == RegisterField::Confirm, true),
    ];

    // Live confirmation check
    if form.confirm_mismatch() {
        lines.push(Line::from(Span::styled(
            "  ✗ Passwords do not match",
            Style::default().fg(Color::Red),
        )));
    } else if !form.confirm.is_empty() {
        lines.push(Line::from(Span::styled(
            "  ✓ Passwords match",
            Style::default().fg(Color::Green),
        )));
    } else {
        lines.push(Line::from(""));
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
    if form.submitting {
        lines.push(Line::from(Span::styled(
            "  Creating account...",
            Style::default().fg(Color::Cyan),
        )));
    }
    lines.push(Line::from(""));
    lines.push(hint_line());

    let area = form_area(frame, 14);
    render_form(frame, "Create account", lines, area);
}
