use super::{
    help, loading, nav_bar, next_key, notice_line, page_layout, shell_key, title, Action,
    ShellKey, UI,
};
use crate::app::App;
use crate::friends::NotificationsState;
use color_eyre::Result;
use crossterm::event::KeyCode;
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};
use std::time::Instant;
use tracing::warn;

fn draw(f: &mut Frame, state: &NotificationsState, app: &App, fetching: bool, now: Instant) {
    let page = page_layout(f.area());
    f.render_widget(title("Notifications"), page.title);

    if fetching {
        f.render_widget(loading("Loading friend requests…"), page.body);
    } else if state.requests.is_empty() {
        f.render_widget(
            Paragraph::new("No pending friend requests.")
                .style(Style::default().fg(Color::DarkGray))
                .wrap(Wrap { trim: true }),
            page.body,
        );
    } else {
        let items: Vec<ListItem> = state
            .requests
            .iter()
            .map(|request| {
                let mut spans = vec![
                    Span::styled(
                        request.sender_name(),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                    Span::raw(" wants to join your close circle"),
                ];
                if let Some(sent) = request.created_at {
                    spans.push(Span::styled(
                        format!("  {}", sent.format("%b %-d, %Y")),
                        Style::default().fg(Color::DarkGray),
                    ));
                }
                if state.is_processing(&request.id) {
                    spans.push(Span::styled(
                        "  processing…",
                        Style::default().fg(Color::Yellow),
                    ));
                }
                ListItem::new(Line::from(spans))
            })
            .collect();
        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!("Friend requests ({})", state.pending_count())),
            )
            .highlight_style(Style::default().add_modifier(Modifier::BOLD))
            .highlight_symbol("> ");
        f.render_stateful_widget(
            list,
            page.body,
            &mut ListState::default().with_selected(Some(state.selected)),
        );
    }

    f.render_widget(notice_line(&app.notices, now), page.notice);
    f.render_widget(nav_bar(app.pending_requests), page.nav);
    f.render_widget(
        help("Up/Down: Navigate, a: Accept, r: Reject, F5: Refresh"),
        page.help,
    );
}

async fn fetch(app: &mut App, state: &mut NotificationsState) {
    match app.api.pending_requests().await {
        Ok(requests) => state.set_requests(requests),
        Err(e) => {
            warn!("Error fetching pending requests: {}", e);
            app.notices
                .error(e.message_or("Failed to load friend requests"));
        }
    }
    app.pending_requests = state.pending_count();
}

async fn answer(app: &mut App, state: &mut NotificationsState, accept: bool) {
    let Some(id) = state.selected_request().map(|r| r.id.clone()) else {
        return;
    };
    if !state.begin(&id) {
        return;
    }
    match app.api.answer_request(&id, accept).await {
        Ok(()) => {
            state.finish(&id, true);
            if accept {
                app.notices.success("Friend request accepted");
            } else {
                app.notices.info("Friend request rejected");
            }
        }
        Err(e) => {
            warn!("Error answering request {}: {}", id, e);
            state.finish(&id, false);
            let fallback = if accept {
                "Failed to accept request"
            } else {
                "Failed to reject request"
            };
            app.notices.error(e.message_or(fallback));
        }
    }
    app.pending_requests = state.pending_count();
}

pub async fn run(ui: &mut UI, app: &mut App) -> Result<Action> {
    let mut state = NotificationsState::default();
    let mut fetching = true;

    loop {
        let now = Instant::now();
        ui.draw(|f| draw(f, &state, app, fetching, now))?;

        if fetching {
            fetch(app, &mut state).await;
            fetching = false;
            continue;
        }

        let Some(key) = next_key()? else {
            app.poll_pending(Instant::now()).await;
            continue;
        };
        match key.code {
            KeyCode::Up => state.select_prev(),
            KeyCode::Down => state.select_next(),
            KeyCode::Char('a') => answer(app, &mut state, true).await,
            KeyCode::Char('r') => answer(app, &mut state, false).await,
            KeyCode::F(5) => fetching = true,
            _ => match shell_key(&key) {
                Some(ShellKey::Go(action)) => return Ok(action),
                Some(ShellKey::Search) => {
                    if let Some(action) = super::search::run(ui, app).await? {
                        return Ok(action);
                    }
                }
                None => {}
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiClient;
    use crate::config::ApiConfig;
    use crate::friends::FriendRequest;
    use crate::session::TokenStore;
    use crate::ui::buffer_text;
    use ratatui::{backend::TestBackend, Terminal};

    fn render(state: &NotificationsState, fetching: bool) -> String {
        let api = ApiClient::new(&ApiConfig::default(), Some("t".to_string())).unwrap();
        let mut app = App::new(api, TokenStore::new("unused-token"), ".".into());
        app.pending_requests = state.pending_count();
        let mut terminal = Terminal::new(TestBackend::new(100, 20)).unwrap();
        terminal
            .draw(|f| draw(f, state, &app, fetching, Instant::now()))
            .unwrap();
        buffer_text(terminal.backend().buffer())
    }

    #[test]
    fn test_requests_listed_with_processing_marker() {
        let requests: Vec<FriendRequest> = serde_json::from_str(
            r#"[{"_id":"r1","from":{"_id":"u1","name":"Ada Lovelace","username":"ada"}},
                {"_id":"r2","from":{"_id":"u2","username":"grace"}}]"#,
        )
        .unwrap();
        let mut state = NotificationsState::default();
        state.set_requests(requests);
        assert!(state.begin("r2"));

        let text = render(&state, false);
        assert!(text.contains("Ada Lovelace wants to join your close circle"));
        assert!(text.contains("processing…"));
        assert!(text.contains("Friend requests (2)"));
        assert!(text.contains("Notifications (2)"));
    }

    #[test]
    fn test_empty_and_loading() {
        let state = NotificationsState::default();
        assert!(render(&state, true).contains("Loading friend requests…"));
        assert!(render(&state, false).contains("No pending friend requests."));
    }
}
