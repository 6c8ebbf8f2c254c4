use super::{help, next_key, notice_line, title, Action, UI};
use crate::app::App;
use crate::notice::Notices;
use crate::router::Route;
use crate::search::{SearchState, SearchTrigger};
use color_eyre::Result;
use crossterm::event::KeyCode;
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};
use std::time::Instant;
use tracing::warn;

fn draw(f: &mut Frame, state: &SearchState, notices: &Notices, now: Instant) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(f.area());

    f.render_widget(title("Find Friends"), chunks[0]);

    let input = Paragraph::new(format!("🔍 {}|", state.query))
        .block(Block::default().borders(Borders::ALL).title("Search users"));
    f.render_widget(input, chunks[1]);

    if state.open {
        let items: Vec<ListItem> = state
            .results
            .iter()
            .map(|user| {
                ListItem::new(Line::from(vec![
                    Span::styled(
                        user.display_name(),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                    Span::raw(" "),
                    Span::styled(user.handle(), Style::default().fg(Color::DarkGray)),
                ]))
            })
            .collect();
        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title("Results"))
            .highlight_style(Style::default().add_modifier(Modifier::BOLD))
            .highlight_symbol("> ");
        f.render_stateful_widget(
            list,
            chunks[2],
            &mut ListState::default().with_selected(Some(state.selected)),
        );
    } else {
        let status = if state.loading {
            "Searching…"
        } else if state.query.trim().is_empty() {
            "Start typing a name or username."
        } else if state.debounce.is_pending() {
            ""
        } else {
            "No users found."
        };
        f.render_widget(
            Paragraph::new(status).style(Style::default().fg(Color::DarkGray)),
            chunks[2],
        );
    }

    f.render_widget(notice_line(notices, now), chunks[3]);
    f.render_widget(
        help("Type to search, Up/Down: Select, Enter: Open profile, Esc: Close"),
        chunks[4],
    );
}

/// The search popup. Returns where to go when a user was picked.
pub async fn run(ui: &mut UI, app: &mut App) -> Result<Option<Action>> {
    let mut state = SearchState::default();

    loop {
        let now = Instant::now();
        match state.debounce.due(now) {
            Some(SearchTrigger::Clear) => state.clear_results(),
            Some(SearchTrigger::Search(query)) => {
                state.loading = true;
                ui.draw(|f| draw(f, &state, &app.notices, now))?;
                match app.api.search_users(&query).await {
                    Ok(users) => state.set_results(users),
                    Err(e) => {
                        warn!("Error searching users: {}", e);
                        state.clear_results();
                    }
                }
            }
            None => {}
        }

        ui.draw(|f| draw(f, &state, &app.notices, now))?;

        if let Some(key) = next_key()? {
            match key.code {
                KeyCode::Esc => return Ok(None),
                KeyCode::Enter => {
                    if let Some(user) = state.choose() {
                        return Ok(Some(Action::Navigate(Route::PublicProfile(user.id))));
                    }
                }
                KeyCode::Up => state.select_prev(),
                KeyCode::Down => state.select_next(),
                KeyCode::Backspace => state.pop(Instant::now()),
                KeyCode::Char(c) => state.push(c, Instant::now()),
                _ => {}
            }
        }
    }
}
