use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction as LayoutDirection, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget, Wrap},
};

use crate::app::App;
use crate::game::{GameStatus, InputOutcome};
use crate::stimulus::StimulusSource;
use crate::ui::{leaderboard::render_leaderboard, thousands};

/// A UI Screen boundary: responsible for rendering the play field for one
/// game status
pub trait Screen<S: StimulusSource> {
    fn render(&self, app: &App<S>, area: Rect, buf: &mut Buffer);
}

/// Title card shown before the first run
pub struct IdleScreen;

/// The arrow flock
pub struct PlayingScreen;

/// Results, commentary and leaderboard
pub struct GameOverScreen;

fn centered_rows(area: Rect, rows: &[Constraint]) -> Vec<Rect> {
    let mut constraints = vec![Constraint::Min(0)];
    constraints.extend_from_slice(rows);
    constraints.push(Constraint::Min(0));

    let chunks = Layout::default()
        .direction(LayoutDirection::Vertical)
        .constraints(constraints)
        .split(area);

    chunks[1..chunks.len() - 1].to_vec()
}

fn personal_best_line<S: StimulusSource>(app: &App<S>) -> Option<Line<'static>> {
    let best = app.personal_best.as_ref()?;
    Some(Line::from(vec![
        Span::styled("Personal best ", Style::default().fg(Color::Gray)),
        Span::styled(
            thousands(best.result.score),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(
                "  ·  {}% acc  ·  {} run{}",
                (best.result.accuracy * 100.0).round() as u32,
                app.runs_played,
                if app.runs_played == 1 { "" } else { "s" }
            ),
            Style::default().fg(Color::Gray),
        ),
    ]))
}

impl<S: StimulusSource> Screen<S> for IdleScreen {
    fn render(&self, app: &App<S>, area: Rect, buf: &mut Buffer) {
        let rows = centered_rows(
            area,
            &[
                Constraint::Length(1), // title
                Constraint::Length(1),
                Constraint::Length(2), // blurb
                Constraint::Length(1),
                Constraint::Length(1), // prompt
                Constraint::Length(1),
                Constraint::Length(1), // personal best
            ],
        );

        Paragraph::new(Span::styled(
            "MIGRATION MIND",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center)
        .render(rows[0], buf);

        Paragraph::new(Line::from(vec![
            Span::raw("Focus on the "),
            Span::styled(
                "central arrow",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(". Ignore decoys. Use your arrow keys."),
        ]))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(rows[2], buf);

        Paragraph::new(Span::styled(
            "Press (r) to start the mission",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::ITALIC),
        ))
        .alignment(Alignment::Center)
        .render(rows[4], buf);

        if let Some(line) = personal_best_line(app) {
            Paragraph::new(line)
                .alignment(Alignment::Center)
                .render(rows[6], buf);
        }
    }
}

impl<S: StimulusSource> Screen<S> for PlayingScreen {
    fn render(&self, app: &App<S>, area: Rect, buf: &mut Buffer) {
        let stimulus = app.game.session().stimulus;
        let decoy_style = Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::DIM);
        let center_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);

        let rows = centered_rows(
            area,
            &[
                Constraint::Length(1), // top decoy
                Constraint::Length(1),
                Constraint::Length(1), // left decoy, target, right decoy
                Constraint::Length(1),
                Constraint::Length(1), // bottom decoy
                Constraint::Length(1),
                Constraint::Length(1), // feedback
            ],
        );

        let decoy = || Span::styled(stimulus.decoy.arrow(), decoy_style);

        for row in [rows[0], rows[4]] {
            Paragraph::new(decoy())
                .alignment(Alignment::Center)
                .render(row, buf);
        }

        Paragraph::new(Line::from(vec![
            decoy(),
            Span::raw("    "),
            Span::styled(stimulus.center.arrow(), center_style),
            Span::raw("    "),
            decoy(),
        ]))
        .alignment(Alignment::Center)
        .render(rows[2], buf);

        let feedback = match app.last_outcome {
            Some(InputOutcome::Correct { gained }) => Some(Span::styled(
                format!("+{gained}"),
                Style::default().fg(Color::Green),
            )),
            Some(InputOutcome::Incorrect) => {
                Some(Span::styled("miss", Style::default().fg(Color::Red)))
            }
            Some(InputOutcome::Restarted) => Some(Span::styled(
                "miss · run restarted",
                Style::default().fg(Color::Red),
            )),
            _ => None,
        };
        if let Some(span) = feedback {
            Paragraph::new(span)
                .alignment(Alignment::Center)
                .render(rows[6], buf);
        }
    }
}

impl<S: StimulusSource> Screen<S> for GameOverScreen {
    fn render(&self, app: &App<S>, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(LayoutDirection::Vertical)
            .vertical_margin(1)
            .constraints([
                Constraint::Length(1), // title
                Constraint::Length(1),
                Constraint::Length(2), // commentary
                Constraint::Length(1),
                Constraint::Min(4),    // leaderboard
                Constraint::Length(1), // personal best
                Constraint::Length(1), // restart prompt
            ])
            .split(area);

        Paragraph::new(Span::styled(
            "MISSION COMPLETE",
            Style::default().add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center)
        .render(chunks[0], buf);

        let commentary = match (&app.commentary, app.commentary_pending) {
            (Some(text), _) => Span::styled(
                format!("\"{text}\""),
                Style::default()
                    .fg(Color::LightCyan)
                    .add_modifier(Modifier::ITALIC),
            ),
            (None, true) => Span::styled("· · ·", Style::default().fg(Color::Cyan)),
            (None, false) => Span::raw(""),
        };
        Paragraph::new(commentary)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(chunks[2], buf);

        let board = Layout::default()
            .direction(LayoutDirection::Horizontal)
            .constraints([
                Constraint::Min(0),
                Constraint::Max(72),
                Constraint::Min(0),
            ])
            .split(chunks[4]);
        render_leaderboard(app, board[1], buf);

        if let Some(line) = personal_best_line(app) {
            Paragraph::new(line)
                .alignment(Alignment::Center)
                .render(chunks[5], buf);
        }

        Paragraph::new(Span::styled(
            "(r) Restart Mission",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center)
        .render(chunks[6], buf);
    }
}

/// Helper to construct the appropriate screen for the current state
pub fn current_screen<S: StimulusSource>(status: GameStatus) -> Box<dyn Screen<S>> {
    match status {
        GameStatus::Idle => Box::new(IdleScreen),
        GameStatus::Playing => Box::new(PlayingScreen),
        GameStatus::GameOver => Box::new(GameOverScreen),
    }
}
