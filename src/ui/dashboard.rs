use super::{help, nav_bar, next_key, notice_line, page_layout, shell_key, title, Action, ShellKey, UI};
use crate::app::App;
use crate::router::Route;
use color_eyre::Result;
use crossterm::event::KeyCode;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use std::time::Instant;

const CARDS: [(&str, &str, &str); 4] = [
    (
        "✍️",
        "Write Your Story",
        "My Diary > Start writing your thoughts, experiences, and dreams. Every word counts!",
    ),
    (
        "📖",
        "Read what your Peers Write",
        "Close Circle / Everyone > Explore stories from fellow writers. Get inspired and find your voice.",
    ),
    (
        "❤️",
        "React & Encourage",
        "Send hearts to stories you love.",
    ),
    (
        "👥",
        "Connect with Friends",
        "Search for friends with / and become friends to share your writing journey.",
    ),
];

fn draw(f: &mut Frame, app: &App, now: Instant) {
    let page = page_layout(f.area());
    f.render_widget(title("Welcome back, Writer! ✨"), page.title);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(0)])
        .split(page.body);

    let intro = Paragraph::new(vec![
        Line::from(
            "Your diary entries are stored securely and are never shared without your permission.",
        ),
        Line::from("Write with confidence, your thoughts are safe with us."),
        Line::from(Span::styled(
            "Press Enter to go to My Diary",
            Style::default().add_modifier(Modifier::BOLD),
        )),
    ])
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true });
    f.render_widget(intro, rows[0]);

    let grid = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[1]);
    for (r, row) in grid.iter().enumerate() {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(*row);
        for (c, col) in cols.iter().enumerate() {
            let (icon, heading, body) = CARDS[r * 2 + c];
            let card = Paragraph::new(body)
                .wrap(Wrap { trim: true })
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(Color::Magenta))
                        .title(format!("{} {}", icon, heading)),
                );
            f.render_widget(card, *col);
        }
    }

    f.render_widget(notice_line(&app.notices, now), page.notice);
    f.render_widget(nav_bar(app.pending_requests), page.nav);
    f.render_widget(help("Enter: Go to My Diary"), page.help);
}

pub async fn run(ui: &mut UI, app: &mut App) -> Result<Action> {
    app.refresh_pending_count().await;

    loop {
        let now = Instant::now();
        ui.draw(|f| draw(f, app, now))?;

        let Some(key) = next_key()? else {
            app.poll_pending(Instant::now()).await;
            continue;
        };
        if key.code == KeyCode::Enter {
            return Ok(Action::Navigate(Route::MyDiary));
        }
        match shell_key(&key) {
            Some(ShellKey::Go(action)) => return Ok(action),
            Some(ShellKey::Search) => {
                if let Some(action) = super::search::run(ui, app).await? {
                    return Ok(action);
                }
            }
            None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiClient;
    use crate::config::ApiConfig;
    use crate::session::TokenStore;
    use crate::ui::buffer_text;
    use ratatui::{backend::TestBackend, Terminal};

    #[test]
    fn test_dashboard_shows_cards_and_badge() {
        let api = ApiClient::new(&ApiConfig::default(), Some("t".to_string())).unwrap();
        let mut app = App::new(api, TokenStore::new("unused-token"), ".".into());
        app.pending_requests = 2;

        let mut terminal = Terminal::new(TestBackend::new(140, 30)).unwrap();
        terminal.draw(|f| draw(f, &app, Instant::now())).unwrap();
        let text = buffer_text(terminal.backend().buffer());
        assert!(text.contains("Welcome back, Writer!"));
        assert!(text.contains("Write Your Story"));
        assert!(text.contains("Connect with Friends"));
        assert!(text.contains("Notifications (2)"));
    }
}
