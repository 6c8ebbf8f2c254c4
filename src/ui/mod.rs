//! Terminal screens. Each screen owns its loop and hands back an [`Action`]
//! telling the shell where to go next.

pub mod auth;
pub mod dashboard;
pub mod diary;
pub mod feed;
pub mod notifications;
pub mod profile;
pub mod public;
pub mod search;

use crate::form::Form;
use crate::notice::Notices;
use crate::router::Route;
use crate::textarea::TextArea;
use color_eyre::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame, Terminal,
};
use std::{
    io::{stdout, Stdout},
    time::{Duration, Instant},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Navigate(Route),
    Logout,
    Quit,
}

pub struct UI {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl UI {
    pub fn new() -> Result<Self> {
        enable_raw_mode()?;
        stdout().execute(EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout());
        let terminal = Terminal::new(backend)?;

        Ok(UI { terminal })
    }

    pub fn draw(&mut self, render: impl FnOnce(&mut Frame)) -> Result<()> {
        self.terminal.draw(render)?;
        Ok(())
    }
}

impl Drop for UI {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = stdout().execute(LeaveAlternateScreen);
    }
}

/// Waits up to one tick for a key press.
pub fn next_key() -> Result<Option<KeyEvent>> {
    if event::poll(Duration::from_millis(50))? {
        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                return Ok(Some(key));
            }
        }
    }
    Ok(None)
}

/// Title, body, notice line, navigation bar and key help.
pub struct PageLayout {
    pub title: Rect,
    pub body: Rect,
    pub notice: Rect,
    pub nav: Rect,
    pub help: Rect,
}

pub fn page_layout(area: Rect) -> PageLayout {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);

    PageLayout {
        title: chunks[0],
        body: chunks[1],
        notice: chunks[2],
        nav: chunks[3],
        help: chunks[4],
    }
}

pub fn title(text: &str) -> Paragraph<'_> {
    Paragraph::new(text)
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::BOTTOM))
}

pub fn help(text: &str) -> Paragraph<'_> {
    Paragraph::new(text)
        .style(Style::default().fg(Color::Yellow))
        .alignment(Alignment::Center)
}

pub fn notice_line(notices: &Notices, now: Instant) -> Paragraph<'static> {
    match notices.active(now) {
        Some(notice) => Paragraph::new(Line::from(Span::styled(
            format!("{} {}", notice.kind.icon(), notice.message),
            Style::default()
                .fg(notice.kind.color())
                .add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center),
        None => Paragraph::new(""),
    }
}

/// The app shell's navigation bar with the pending request badge.
pub fn nav_bar(pending: usize) -> Paragraph<'static> {
    let key = Style::default().add_modifier(Modifier::BOLD);
    let mut spans = vec![
        Span::styled("1", key),
        Span::raw(" Dashboard  "),
        Span::styled("2", key),
        Span::raw(" My Diary  "),
        Span::styled("3", key),
        Span::raw(" Close Circle  "),
        Span::styled("4", key),
        Span::raw(" Everyone  "),
        Span::styled("5", key),
        Span::raw(" Notifications"),
    ];
    if pending > 0 {
        spans.push(Span::styled(
            format!(" ({})", pending),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ));
    }
    spans.extend([
        Span::raw("  "),
        Span::styled("6", key),
        Span::raw(" Profile  "),
        Span::styled("/", key),
        Span::raw(" Search  "),
        Span::styled("L", key),
        Span::raw(" Logout  "),
        Span::styled("q", key),
        Span::raw(" Quit"),
    ]);
    Paragraph::new(Line::from(spans))
        .style(Style::default().fg(Color::Gray))
        .alignment(Alignment::Center)
}

/// What a navigation key means anywhere in the app shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellKey {
    Go(Action),
    Search,
}

pub fn shell_key(key: &KeyEvent) -> Option<ShellKey> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Some(ShellKey::Go(Action::Quit)),
            _ => None,
        };
    }
    let go = |route| Some(ShellKey::Go(Action::Navigate(route)));
    match key.code {
        KeyCode::Char('1') => go(Route::Dashboard),
        KeyCode::Char('2') => go(Route::MyDiary),
        KeyCode::Char('3') => go(Route::CloseCircle),
        KeyCode::Char('4') => go(Route::Everyone),
        KeyCode::Char('5') => go(Route::Notifications),
        KeyCode::Char('6') => go(Route::Profile),
        KeyCode::Char('/') => Some(ShellKey::Search),
        KeyCode::Char('L') => Some(ShellKey::Go(Action::Logout)),
        KeyCode::Char('q') => Some(ShellKey::Go(Action::Quit)),
        _ => None,
    }
}

/// A bordered input box; focused boxes are highlighted and show the cursor.
pub fn input_box<'a>(label: &'a str, input: &TextArea, focused: bool) -> Paragraph<'a> {
    let text = if focused {
        input.with_cursor('|')
    } else {
        input.text().to_string()
    };
    let border = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    Paragraph::new(text)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border)
                .title(label),
        )
}

/// Renders each field of `form` as a stacked input box and returns the space
/// left below them.
pub fn form_fields(f: &mut Frame, form: &Form, area: Rect) -> Rect {
    let mut constraints: Vec<Constraint> = form
        .fields
        .iter()
        .map(|field| Constraint::Length(if field.multiline { 6 } else { 3 }))
        .collect();
    constraints.push(Constraint::Min(0));
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    for (i, field) in form.fields.iter().enumerate() {
        let focused = i == form.focus;
        let border = if focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default()
        };
        let input = Paragraph::new(field.display(focused))
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(border)
                    .title(field.label),
            );
        f.render_widget(input, rows[i]);
    }
    rows[form.fields.len()]
}

pub fn loading(text: &str) -> Paragraph<'_> {
    Paragraph::new(text)
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center)
}

#[cfg(test)]
pub(crate) fn buffer_text(buffer: &ratatui::buffer::Buffer) -> String {
    buffer.content.iter().map(|c| c.symbol()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;

    #[test]
    fn test_shell_keys() {
        let key = |c| KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE);
        assert_eq!(
            shell_key(&key('2')),
            Some(ShellKey::Go(Action::Navigate(Route::MyDiary)))
        );
        assert_eq!(shell_key(&key('/')), Some(ShellKey::Search));
        assert_eq!(shell_key(&key('L')), Some(ShellKey::Go(Action::Logout)));
        assert_eq!(shell_key(&key('x')), None);
        assert_eq!(
            shell_key(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(ShellKey::Go(Action::Quit))
        );
    }

    #[test]
    fn test_nav_bar_badge() {
        let backend = TestBackend::new(140, 1);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| f.render_widget(nav_bar(3), f.area()))
            .unwrap();
        let text = buffer_text(terminal.backend().buffer());
        assert!(text.contains("Notifications (3)"));
    }
}
