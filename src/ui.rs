use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Widget, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::app::{App, AppState, QuitScope, Tone};
use crate::difficulty::Difficulty;

const HORIZONTAL_MARGIN: u16 = 2;
const PANEL_WIDTH: u16 = 60;

const PINK: Color = Color::Rgb(255, 77, 154);
const ROSE: Color = Color::Rgb(199, 37, 122);

/// Draw the whole screen and place the cursor in the guess field.
pub fn draw(app: &App, f: &mut Frame) {
    let area = f.area();
    f.render_widget(app, area);

    if app.state == AppState::Playing && app.confirm_quit.is_none() {
        let field = input_area(panel_area(area));
        let x = field.x + 1 + app.input.width() as u16;
        if x < field.right() {
            f.set_cursor_position((x, field.y + 1));
        }
    }
}

fn panel_area(area: Rect) -> Rect {
    let width = PANEL_WIDTH.min(area.width.saturating_sub(HORIZONTAL_MARGIN * 2));
    Rect {
        x: area.x + (area.width.saturating_sub(width)) / 2,
        y: area.y,
        width,
        height: area.height,
    }
}

fn panel_chunks(panel: Rect) -> std::rc::Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // title
            Constraint::Length(5), // difficulty
            Constraint::Length(3), // guess field
            Constraint::Length(4), // hint
            Constraint::Length(1), // attempts / timer
            Constraint::Length(2), // best score
            Constraint::Min(0),
            Constraint::Length(1), // legend
        ])
        .split(panel)
}

fn input_area(panel: Rect) -> Rect {
    panel_chunks(panel)[2]
}

fn tone_style(tone: Tone) -> Style {
    match tone {
        Tone::Info => Style::default().fg(ROSE),
        Tone::Warning => Style::default().fg(PINK).add_modifier(Modifier::BOLD),
        Tone::Success => Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        Tone::Failure => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
    }
}

fn difficulty_lines(selected: Difficulty, locked: bool) -> Vec<Line<'static>> {
    Difficulty::ALL
        .iter()
        .map(|d| {
            let marker = if *d == selected { "(•)" } else { "( )" };
            let mut style = Style::default();
            if *d == selected {
                style = style.fg(PINK).add_modifier(Modifier::BOLD);
            }
            if locked {
                style = style.add_modifier(Modifier::DIM);
            }
            Line::from(Span::styled(
                format!("{} {} {}", d.menu_key(), marker, d.label()),
                style,
            ))
        })
        .collect()
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let italic_style = Style::default()
            .fg(Color::Gray)
            .add_modifier(Modifier::ITALIC);

        let panel = panel_area(area);
        let chunks = panel_chunks(panel);

        Paragraph::new(vec![
            Line::from(Span::styled(
                "Guess the number",
                Style::default().patch(bold_style).fg(PINK),
            )),
            Line::from(Span::styled(
                format!("between {} and {}", self.config.min, self.config.max),
                Style::default().fg(ROSE),
            )),
        ])
        .alignment(Alignment::Center)
        .render(chunks[0], buf);

        let playing = self.state == AppState::Playing;
        Paragraph::new(difficulty_lines(self.difficulty(), playing))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .title("Difficulty"),
            )
            .render(chunks[1], buf);

        let field_style = if playing {
            Style::default().fg(PINK)
        } else {
            Style::default().add_modifier(Modifier::DIM)
        };
        Paragraph::new(Span::styled(self.input.as_str(), bold_style))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(field_style)
                    .title("Your guess"),
            )
            .render(chunks[2], buf);

        let mut hint = vec![Line::from(Span::styled(
            self.message.text.as_str(),
            tone_style(self.message.tone),
        ))];
        if let Some(note) = &self.record_note {
            hint.push(Line::from(Span::styled(
                note.as_str(),
                Style::default().patch(bold_style).fg(PINK),
            )));
        }
        Paragraph::new(hint)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(chunks[3], buf);

        let attempts = match &self.round {
            Some(round) => match round.attempt_limit() {
                Some(limit) => format!("Attempts: {}/{}", round.attempts_used(), limit),
                None => format!("Attempts: {}", round.attempts_used()),
            },
            None => "Attempts: 0".to_string(),
        };
        let status = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(chunks[4]);
        Paragraph::new(attempts).render(status[0], buf);
        Paragraph::new(format!(
            "Time: {:.1} s",
            self.elapsed_display.as_secs_f64()
        ))
        .alignment(Alignment::Right)
        .render(status[1], buf);

        let best = match self.scoreboard().best() {
            Some(record) => format!(
                "Best score: {} (set {})",
                record.summary(),
                record.saved_at.format("%Y-%m-%d")
            ),
            None => "Best score: none yet".to_string(),
        };
        Paragraph::new(Span::styled(best, Style::default().fg(ROSE)))
            .alignment(Alignment::Center)
            .render(chunks[5], buf);

        let legend = match self.state {
            AppState::Playing => "(0-9) type / (enter) guess / (esc) abandon round",
            AppState::Menu | AppState::Finished => {
                "(1-3 ←/→) difficulty / (n)ew round / (q)uit"
            }
        };
        Paragraph::new(Span::styled(legend, italic_style))
            .alignment(Alignment::Center)
            .render(chunks[7], buf);

        if let Some(scope) = self.confirm_quit {
            render_confirm(scope, area, buf);
        }
    }
}

fn render_confirm(scope: QuitScope, area: Rect, buf: &mut Buffer) {
    let question = match scope {
        QuitScope::Round => "Abandon this round? (y/n)",
        QuitScope::App => "Quit the game? (y/n)",
    };
    let width = (question.width() as u16 + 4).min(area.width);
    let height = 3.min(area.height);
    let popup = Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    };
    Clear.render(popup, buf);
    Paragraph::new(Span::styled(
        question,
        Style::default().fg(PINK).add_modifier(Modifier::BOLD),
    ))
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Double)
            .border_style(Style::default().fg(PINK)),
    )
    .render(popup, buf);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::score::{FileScoreStore, Scoreboard};
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::{backend::TestBackend, Terminal};
    use tempfile::tempdir;

    fn screen_text(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal.draw(|f| draw(app, f)).unwrap();
        let buffer = terminal.backend().buffer();
        let mut text = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                text.push_str(buffer[(x, y)].symbol());
            }
            text.push('\n');
        }
        text
    }

    fn app() -> (App, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let store = FileScoreStore::with_path(dir.path().join("highscore.json"));
        let app =
            App::new(Config::default(), Scoreboard::load(Box::new(store))).with_secret(Some(42));
        (app, dir)
    }

    #[test]
    fn menu_shows_presets_and_empty_record() {
        let (app, _dir) = app();
        let text = screen_text(&app);
        assert!(text.contains("Guess the number"));
        assert!(text.contains("Normal (10 attempts)"));
        assert!(text.contains("Best score: none yet"));
    }

    #[test]
    fn playing_shows_attempt_counter() {
        let (mut app, _dir) = app();
        app.new_round().unwrap();
        app.input = "50".into();
        app.submit();
        let text = screen_text(&app);
        assert!(text.contains("Attempts: 1/10"));
        assert!(text.contains("Too high."));
    }

    #[test]
    fn confirm_overlay_is_drawn() {
        let (mut app, _dir) = app();
        app.on_key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE));
        assert!(screen_text(&app).contains("Quit the game? (y/n)"));
    }

    #[test]
    fn tiny_terminal_does_not_panic() {
        let (mut app, _dir) = app();
        app.new_round().unwrap();
        app.on_key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE));
        let mut terminal = Terminal::new(TestBackend::new(10, 2)).unwrap();
        terminal.draw(|f| draw(&app, f)).unwrap();
    }
}
