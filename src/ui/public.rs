use super::{
    help, loading, nav_bar, next_key, notice_line, page_layout, shell_key, title, Action,
    ShellKey, UI,
};
use crate::app::App;
use crate::friends::{Ack, FriendAction, FriendStatus};
use crate::profile::{consistency_label, member_since, PublicUser, UserSummary};
use crate::router::Route;
use color_eyre::Result;
use crossterm::event::KeyCode;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};
use std::time::Instant;
use tracing::warn;

struct PublicScreen {
    user_id: String,
    own: bool,
    user: Option<PublicUser>,
    error: Option<String>,
    status: FriendStatus,
    busy: bool,
    suggestions: Vec<UserSummary>,
    selected: usize,
}

impl PublicScreen {
    fn new(user_id: &str, viewer: Option<&str>) -> Self {
        PublicScreen {
            user_id: user_id.to_string(),
            own: viewer == Some(user_id),
            user: None,
            error: None,
            status: FriendStatus::None,
            busy: false,
            suggestions: Vec::new(),
            selected: 0,
        }
    }

    fn set_suggestions(&mut self, users: Vec<UserSummary>) {
        self.suggestions = users;
        self.selected = 0;
    }
}

fn draw_user(f: &mut Frame, screen: &PublicScreen, user: &PublicUser, area: Rect) {
    let label = Style::default().fg(Color::DarkGray);
    let mut lines = vec![Line::from(Span::styled(
        user.display_name(),
        Style::default().add_modifier(Modifier::BOLD),
    ))];
    if let Some(username) = &user.username {
        lines.push(Line::from(Span::styled(format!("@{}", username), label)));
    }
    if let Some(location) = user.location.as_deref().filter(|l| !l.is_empty()) {
        lines.push(Line::from(format!("📍 {}", location)));
    }
    if let Some(image) = user.profile_image.as_deref().filter(|i| !i.is_empty()) {
        lines.push(Line::from(Span::styled(
            format!("🖼  {}", image),
            Style::default().fg(Color::Blue),
        )));
    }
    let since = member_since(user.created_at);
    if !since.is_empty() {
        lines.push(Line::from(Span::styled(since, label)));
    }
    lines.push(Line::from(""));
    if let Some(bio) = user.bio.as_deref().filter(|b| !b.is_empty()) {
        lines.push(Line::from(bio));
        lines.push(Line::from(""));
    }
    lines.push(Line::from(vec![
        Span::styled("📔 Journals ", label),
        Span::raw(user.journal_count.to_string()),
        Span::styled("   ❤️ Likes ", label),
        Span::raw(user.total_likes.to_string()),
        Span::styled("   👁️ Reads ", label),
        Span::raw(user.total_reads.to_string()),
        Span::styled("   🔥 Consistency ", label),
        Span::raw(consistency_label(user.consistency.as_ref())),
    ]));

    if !screen.own {
        lines.push(Line::from(""));
        let button = if screen.busy {
            "[ … ]".to_string()
        } else {
            format!("[ {} ]", screen.status.action_label())
        };
        let style = match screen.status {
            FriendStatus::Accepted => Style::default().fg(Color::Green),
            FriendStatus::None => Style::default().fg(Color::Cyan),
            _ => Style::default().fg(Color::Yellow),
        };
        lines.push(Line::from(Span::styled(
            button,
            style.add_modifier(Modifier::BOLD),
        )));
    }

    f.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).title("Profile")),
        area,
    );
}

fn draw_suggestions(f: &mut Frame, screen: &PublicScreen, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title("People you may know");
    if screen.suggestions.is_empty() {
        f.render_widget(
            Paragraph::new("No suggestions right now.")
                .style(Style::default().fg(Color::DarkGray))
                .block(block),
            area,
        );
        return;
    }
    let items: Vec<ListItem> = screen
        .suggestions
        .iter()
        .map(|user| {
            let mut lines = vec![Line::from(vec![
                Span::styled(
                    user.display_name(),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::raw(" "),
                Span::styled(user.handle(), Style::default().fg(Color::DarkGray)),
            ])];
            if let Some(bio) = user.bio.as_deref().filter(|b| !b.is_empty()) {
                lines.push(Line::from(Span::styled(
                    bio,
                    Style::default().fg(Color::Gray),
                )));
            }
            ListItem::new(lines)
        })
        .collect();
    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");
    f.render_stateful_widget(
        list,
        area,
        &mut ListState::default().with_selected(Some(screen.selected)),
    );
}

fn draw(f: &mut Frame, screen: &PublicScreen, app: &App, now: Instant) {
    let page = page_layout(f.area());
    f.render_widget(title("Writer Profile"), page.title);

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(page.body);
    match (&screen.user, &screen.error) {
        (Some(user), _) => draw_user(f, screen, user, cols[0]),
        (None, Some(error)) => f.render_widget(
            Paragraph::new(error.as_str())
                .style(Style::default().fg(Color::Red))
                .wrap(Wrap { trim: true }),
            cols[0],
        ),
        (None, None) => f.render_widget(loading("Loading profile…"), cols[0]),
    }
    draw_suggestions(f, screen, cols[1]);

    let help_text = if screen.own {
        "r: Refresh suggestions, Up/Down: Select, Enter: View profile"
    } else {
        "f: Friend request, r: Refresh suggestions, Up/Down: Select, Enter: View profile"
    };
    f.render_widget(notice_line(&app.notices, now), page.notice);
    f.render_widget(nav_bar(app.pending_requests), page.nav);
    f.render_widget(help(help_text), page.help);
}

async fn load(app: &App, screen: &mut PublicScreen) {
    let (user, status, suggestions) = futures::join!(
        app.api.public_user(&screen.user_id),
        app.api.friend_status(&screen.user_id),
        app.api.suggested_users(&screen.user_id)
    );
    match user {
        Ok(user) => screen.user = Some(user),
        Err(e) => {
            warn!("Error loading user {}: {}", screen.user_id, e);
            screen.error = Some(e.message_or("Failed to load user profile"));
        }
    }
    screen.status = status.unwrap_or_else(|e| {
        warn!("Error checking friend status: {}", e);
        FriendStatus::None
    });
    match suggestions {
        Ok(users) => screen.set_suggestions(users),
        Err(e) => warn!("Error loading suggestions: {}", e),
    }
}

async fn refresh_suggestions(app: &mut App, screen: &mut PublicScreen) {
    match app.api.suggested_users(&screen.user_id).await {
        Ok(users) => screen.set_suggestions(users),
        Err(e) => {
            warn!("Error refreshing suggestions: {}", e);
            app.notices.error("Failed to load suggestions");
        }
    }
}

async fn friend_button(app: &mut App, screen: &mut PublicScreen) {
    if screen.own || screen.busy || screen.user.is_none() {
        return;
    }
    let Some(action) = screen.status.action() else {
        return;
    };
    screen.busy = true;
    let (result, done, fallback) = match action {
        FriendAction::Send => (
            app.api.send_friend_request(&screen.user_id).await,
            "Friend request sent!",
            "Failed to send friend request",
        ),
        FriendAction::Cancel => (
            app.api.cancel_friend_request(&screen.user_id).await,
            "Friend request cancelled",
            "Failed to cancel friend request",
        ),
    };
    screen.busy = false;
    match result {
        Ok(Ack { success: true, .. }) => {
            screen.status = screen.status.after(action);
            app.notices.success(done);
        }
        Ok(Ack { message, .. }) => {
            app.notices
                .error(message.unwrap_or_else(|| fallback.to_string()));
        }
        Err(e) => {
            warn!("Friend request to {} failed: {}", screen.user_id, e);
            app.notices.error(e.message_or(fallback));
        }
    }
}

pub async fn run(ui: &mut UI, app: &mut App, user_id: &str) -> Result<Action> {
    let mut screen = PublicScreen::new(user_id, app.user.user_id());
    let mut fetching = true;

    loop {
        let now = Instant::now();
        ui.draw(|f| draw(f, &screen, app, now))?;

        if fetching {
            load(app, &mut screen).await;
            fetching = false;
            continue;
        }

        let Some(key) = next_key()? else {
            app.poll_pending(Instant::now()).await;
            continue;
        };
        match key.code {
            KeyCode::Char('f') => friend_button(app, &mut screen).await,
            KeyCode::Char('r') => refresh_suggestions(app, &mut screen).await,
            KeyCode::Up => screen.selected = screen.selected.saturating_sub(1),
            KeyCode::Down => {
                if screen.selected + 1 < screen.suggestions.len() {
                    screen.selected += 1;
                }
            }
            KeyCode::Enter => {
                if let Some(user) = screen.suggestions.get(screen.selected) {
                    return Ok(Action::Navigate(Route::PublicProfile(user.id.clone())));
                }
            }
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
