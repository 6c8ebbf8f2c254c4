use super::{
    help, loading, nav_bar, next_key, notice_line, page_layout, shell_key, title, Action,
    ShellKey, UI,
};
use crate::app::App;
use crate::feed::{FeedKind, FeedState};
use crate::journal::{format_long_date, Journal};
use crate::router::Route;
use color_eyre::Result;
use crossterm::event::KeyCode;
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};
use std::time::Instant;
use tracing::{info, warn};

fn entry_item<'a>(journal: &'a Journal, kind: FeedKind, liked: bool) -> ListItem<'a> {
    let heart = if liked { "❤️" } else { "🤍" };
    let date = journal
        .date()
        .map(format_long_date)
        .unwrap_or_default();
    let mut author = vec![Span::styled(
        journal.author_label(kind.anonymous_label()),
        Style::default().fg(Color::Magenta),
    )];
    if let Some(location) = journal.author_location() {
        author.push(Span::styled(
            format!(" · 📍 {}", location),
            Style::default().fg(Color::DarkGray),
        ));
    }
    author.push(Span::styled(
        format!("  {}", date),
        Style::default().fg(Color::DarkGray),
    ));

    let mut lines = vec![
        Line::from(author),
        Line::from(Span::styled(
            journal.title.as_str(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
    ];
    lines.extend(journal.content.lines().map(Line::from));
    if let Some(image) = journal.first_image() {
        lines.push(Line::from(Span::styled(
            format!("🖼  {}", image),
            Style::default().fg(Color::Blue),
        )));
    }
    lines.push(Line::from(format!(
        "{} {}  👁️ {}",
        heart, journal.likes, journal.reads
    )));
    lines.push(Line::from(""));
    ListItem::new(lines)
}

fn draw(f: &mut Frame, state: &FeedState, app: &App, initial_load: bool, now: Instant) {
    let page = page_layout(f.area());
    f.render_widget(title(state.kind.title()), page.title);

    if initial_load {
        f.render_widget(loading("Loading journals…"), page.body);
    } else if let (Some(error), true) = (&state.error, state.journals.is_empty()) {
        f.render_widget(
            Paragraph::new(error.as_str())
                .style(Style::default().fg(Color::Red))
                .wrap(Wrap { trim: true }),
            page.body,
        );
    } else if state.journals.is_empty() {
        f.render_widget(loading(state.kind.empty_message()), page.body);
    } else {
        let items: Vec<ListItem> = state
            .journals
            .iter()
            .map(|j| entry_item(j, state.kind, state.is_liked(&j.id)))
            .collect();
        let footer = if state.loading_more {
            "Loading more…"
        } else if state.has_more {
            "m: Load more"
        } else {
            "You're all caught up"
        };
        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!("Journals ({})", state.journals.len()))
                    .title_bottom(footer),
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
        help("Up/Down: Navigate, Space: Like, m: Load more, r: Refresh, Enter: Author profile"),
        page.help,
    );
}

/// First page and liked ids together; the feed is usable even when the
/// liked list fails.
async fn load_first_page(app: &App, state: &mut FeedState) {
    let (page, liked) = futures::join!(
        app.api.feed_page(state.kind, 1),
        app.api.liked_journals()
    );
    match page {
        Ok(page) => {
            info!("Loaded {} {} journals", page.journals.len(), state.kind.title());
            state.apply_page(page, false);
        }
        Err(e) => {
            warn!("Error fetching {} feed: {}", state.kind.title(), e);
            state.fail(e.message_or("Failed to load journals"));
        }
    }
    match liked {
        Ok(ids) => state.set_liked(ids),
        Err(e) => warn!("Error fetching liked journals: {}", e),
    }
}

async fn load_more(app: &mut App, state: &mut FeedState) {
    let Some(page) = state.next_page() else {
        return;
    };
    match app.api.feed_page(state.kind, page).await {
        Ok(next) => state.apply_page(next, true),
        Err(e) => {
            warn!("Error fetching page {}: {}", page, e);
            state.fail(e.message_or("Failed to load more journals"));
            app.notices.error("Failed to load more journals");
        }
    }
}

async fn toggle_like(app: &mut App, state: &mut FeedState) {
    let Some(id) = state.selected_journal().map(|j| j.id.clone()) else {
        return;
    };
    let was_liked = state.toggle_like_optimistic(&id);
    match app.api.set_like(&id, !was_liked).await {
        Ok(count) => state.apply_like_count(&id, count),
        Err(e) => {
            warn!("Error toggling like on {}: {}", id, e);
            state.revert_like(&id, was_liked);
            app.notices.error(e.message_or("Failed to update like"));
        }
    }
}

pub async fn run(ui: &mut UI, app: &mut App, kind: FeedKind) -> Result<Action> {
    let mut state = FeedState::new(kind);
    let mut initial_load = true;

    loop {
        let now = Instant::now();
        ui.draw(|f| draw(f, &state, app, initial_load, now))?;

        if initial_load {
            load_first_page(app, &mut state).await;
            initial_load = false;
            continue;
        }

        let Some(key) = next_key()? else {
            app.poll_pending(Instant::now()).await;
            continue;
        };
        match key.code {
            KeyCode::Up => state.select_prev(),
            KeyCode::Down if state.is_at_end() => load_more(app, &mut state).await,
            KeyCode::Down => state.select_next(),
            KeyCode::Char(' ') => toggle_like(app, &mut state).await,
            KeyCode::Char('m') => load_more(app, &mut state).await,
            KeyCode::Char('r') => initial_load = true,
            KeyCode::Enter => {
                let author = state
                    .selected_journal()
                    .filter(|j| !j.is_anonymous)
                    .and_then(|j| j.author.as_ref())
                    .and_then(|a| a.id.clone());
                if let Some(id) = author {
                    return Ok(Action::Navigate(Route::PublicProfile(id)));
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
