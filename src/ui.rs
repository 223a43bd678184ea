pub mod leaderboard;
pub mod screen;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction as LayoutDirection, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Widget},
};

use crate::app::App;
use crate::stimulus::StimulusSource;

const HORIZONTAL_MARGIN: u16 = 2;
/// Seconds left at which the timer turns red
const LOW_TIME_SECS: u32 = 5;

impl<S: StimulusSource> Widget for &App<S> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(LayoutDirection::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .constraints([
                Constraint::Length(3), // hud
                Constraint::Min(8),    // play field
                Constraint::Length(1), // key help
            ])
            .split(area);

        render_hud(self, chunks[0], buf);

        let field = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::DarkGray));
        let inner = field.inner(chunks[1]);
        field.render(chunks[1], buf);
        screen::current_screen::<S>(self.status()).render(self, inner, buf);

        render_footer(self, chunks[2], buf);
    }
}

/// Formats a score the way a scoreboard would: 12,345
pub fn thousands(n: u32) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn stat<'a>(label: &'a str, value: String, style: Style) -> Paragraph<'a> {
    Paragraph::new(vec![
        Line::from(Span::styled(
            label,
            Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(value, style.add_modifier(Modifier::BOLD))),
    ])
    .alignment(Alignment::Center)
}

fn render_hud<S: StimulusSource>(app: &App<S>, area: Rect, buf: &mut Buffer) {
    let session = app.game.session();
    let columns = Layout::default()
        .direction(LayoutDirection::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(area);

    let time_style = if session.time_remaining() <= LOW_TIME_SECS {
        Style::default()
            .fg(Color::Red)
            .add_modifier(Modifier::SLOW_BLINK)
    } else {
        Style::default().fg(Color::White)
    };

    stat("SCORE", thousands(session.score), Style::default()).render(columns[0], buf);
    stat(
        "CORRECT",
        session.correct.to_string(),
        Style::default().fg(Color::Cyan),
    )
    .render(columns[1], buf);
    stat(
        "TIME LEFT",
        format!("{}s", session.time_remaining()),
        time_style,
    )
    .render(columns[2], buf);
    stat(
        "STREAK",
        format!("×{}", session.streak),
        Style::default().fg(Color::LightRed),
    )
    .render(columns[3], buf);
}

fn render_footer<S: StimulusSource>(app: &App<S>, area: Rect, buf: &mut Buffer) {
    let key_style = Style::default()
        .fg(Color::White)
        .add_modifier(Modifier::BOLD);
    let help_style = Style::default()
        .fg(Color::Gray)
        .add_modifier(Modifier::ITALIC);
    let toggle_style = if app.settings.auto_restart {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let line = Line::from(vec![
        Span::styled("↑ ← ↓ →", key_style),
        Span::styled(" respond   ", help_style),
        Span::styled("(r)", key_style),
        Span::styled(" reset   ", help_style),
        Span::styled("(a)", key_style),
        Span::styled(" auto-restart ", help_style),
        Span::styled(
            if app.settings.auto_restart { "ON" } else { "OFF" },
            toggle_style,
        ),
        Span::styled("   (esc)", key_style),
        Span::styled("ape", help_style),
    ]);

    Paragraph::new(line)
        .alignment(Alignment::Center)
        .render(area, buf);
}
