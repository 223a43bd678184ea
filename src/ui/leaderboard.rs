use chrono::{DateTime, Utc};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Table, Widget},
};
use time_humanize::{Accuracy, HumanTime, Tense};

use crate::app::App;
use crate::ranking::Connectivity;
use crate::stimulus::StimulusSource;
use crate::ui::thousands;

fn badge(connectivity: Connectivity) -> Span<'static> {
    let color = match connectivity {
        Connectivity::Live => Color::Green,
        Connectivity::Offline => Color::Red,
        Connectivity::Unknown => Color::Yellow,
    };
    Span::styled(
        format!(" {connectivity} "),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    )
}

fn when(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - timestamp).num_seconds().max(0);
    HumanTime::from_seconds(secs).to_text_en(Accuracy::Rough, Tense::Past)
}

/// Draws the top five with the player's own row picked out
pub fn render_leaderboard<S: StimulusSource>(app: &App<S>, area: Rect, buf: &mut Buffer) {
    let mut title = vec![Span::styled(
        " Leaderboard ",
        Style::default().add_modifier(Modifier::BOLD),
    )];
    if app.is_syncing() {
        title.push(Span::styled(
            "syncing… ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::ITALIC),
        ));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title(Line::from(title))
        .title_top(Line::from(badge(app.connectivity)).right_aligned());

    if app.leaderboard.is_empty() {
        let inner = block.inner(area);
        block.render(area, buf);
        let message = if app.is_syncing() {
            "Fetching rankings…"
        } else {
            "No rankings found."
        };
        Paragraph::new(message)
            .style(Style::default().fg(Color::Gray))
            .alignment(Alignment::Center)
            .render(inner, buf);
        return;
    }

    let header = Row::new(vec![
        Cell::from("#"),
        Cell::from("Score"),
        Cell::from("Correct"),
        Cell::from("Acc"),
        Cell::from("Streak"),
        Cell::from("When"),
    ])
    .style(
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    );

    let now = Utc::now();
    let rows: Vec<Row> = app
        .leaderboard
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let mine = app.highlight_id.as_deref() == Some(entry.id.as_str());
            let style = if mine {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            Row::new(vec![
                Cell::from(format!("{}", i + 1)),
                Cell::from(thousands(entry.score)),
                Cell::from(entry.correct.to_string()),
                Cell::from(format!("{:.0}%", entry.accuracy * 100.0)),
                Cell::from(format!("×{}", entry.max_streak)),
                Cell::from(when(entry.timestamp, now)),
            ])
            .style(style)
        })
        .collect();

    Table::new(
        rows,
        [
            Constraint::Length(3), // rank
            Constraint::Length(9), // score
            Constraint::Length(8), // correct
            Constraint::Length(6), // accuracy
            Constraint::Length(7), // streak
            Constraint::Min(10),   // when
        ],
    )
    .header(header)
    .block(block)
    .render(area, buf);
}
