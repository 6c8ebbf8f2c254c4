use super::{
    form_fields, help, loading, nav_bar, next_key, notice_line, page_layout, shell_key, title,
    Action, ShellKey, UI,
};
use crate::app::App;
use crate::export::{write_export, ExportError};
use crate::form::{Field, Form, FormEvent};
use crate::profile::{
    consistency_label, member_since, Community, Profile, ProfileForm, CLOSE_FRIEND_REMOVED,
};
use crate::router::Route;
use chrono::Local;
use color_eyre::Result;
use crossterm::event::KeyCode;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};

const NAME: usize = 0;
const USERNAME: usize = 1;
const BIO: usize = 2;
const LOCATION: usize = 3;
const IMAGE_URL: usize = 4;
const IMAGE_FILE: usize = 5;

#[derive(Default)]
struct ProfileScreen {
    profile: Option<Profile>,
    community: Community,
    editing: Option<Form>,
}

fn edit_form(profile: &Profile) -> Form {
    let current = ProfileForm::from_profile(profile);
    Form::new(vec![
        Field::text("Name").with_value(&current.name),
        Field::text("Username").with_value(&current.username),
        Field::multiline("Bio", None).with_value(&current.bio),
        Field::text("Location").with_value(&current.location),
        Field::text("Profile image URL").with_value(&current.profile_image),
        Field::text("Or upload an image file (path)"),
    ])
}

/// Reads the edit form back. A file path wins over a URL; leaving both
/// blank removes the picture.
fn profile_form(form: &Form, profile: &Profile) -> ProfileForm {
    let mut update = ProfileForm::from_profile(profile);
    update.name = form.value(NAME).to_string();
    update.username = form.value(USERNAME).to_string();
    update.bio = form.value(BIO).to_string();
    update.location = form.value(LOCATION).to_string();

    let url = form.value(IMAGE_URL).trim();
    let file = form.value(IMAGE_FILE).trim();
    if !file.is_empty() {
        update.set_image_file(PathBuf::from(file));
    } else if !url.is_empty() {
        update.set_image_url(url);
    } else {
        update.remove_image();
    }
    update
}

fn draw_details(f: &mut Frame, profile: &Profile, area: Rect) {
    let label = Style::default().fg(Color::DarkGray);
    let mut lines = vec![
        Line::from(Span::styled(
            profile.display_name(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
    ];
    if let Some(username) = &profile.username {
        lines.push(Line::from(Span::styled(format!("@{}", username), label)));
    }
    if let Some(email) = &profile.email {
        lines.push(Line::from(format!("✉️  {}", email)));
    }
    if let Some(location) = profile.location.as_deref().filter(|l| !l.is_empty()) {
        lines.push(Line::from(format!("📍 {}", location)));
    }
    if let Some(image) = profile.profile_image.as_deref().filter(|i| !i.is_empty()) {
        lines.push(Line::from(Span::styled(
            format!("🖼  {}", image),
            Style::default().fg(Color::Blue),
        )));
    }
    let since = member_since(profile.created_at);
    if !since.is_empty() {
        lines.push(Line::from(Span::styled(since, label)));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(
        profile
            .bio
            .clone()
            .filter(|b| !b.is_empty())
            .unwrap_or_else(|| "No bio yet.".to_string()),
    ));
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("❤️ Likes ", label),
        Span::raw(profile.total_likes.to_string()),
        Span::styled("   👁️ Reads ", label),
        Span::raw(profile.total_reads.to_string()),
        Span::styled("   🔥 Consistency ", label),
        Span::raw(consistency_label(profile.consistency.as_ref())),
    ]));

    f.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).title("About")),
        area,
    );
}

fn draw_community(f: &mut Frame, community: &Community, area: Rect) {
    let title = format!("Close friends ({})", community.close_friend_count);
    if community.close_friends.is_empty() {
        f.render_widget(
            Paragraph::new("No close friends yet.")
                .style(Style::default().fg(Color::DarkGray))
                .block(Block::default().borders(Borders::ALL).title(title)),
            area,
        );
        return;
    }
    let items: Vec<ListItem> = community
        .close_friends
        .iter()
        .map(|user| {
            let mut spans = vec![
                Span::styled(
                    user.display_name(),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::raw(" "),
                Span::styled(user.handle(), Style::default().fg(Color::DarkGray)),
            ];
            if community.removing.as_deref() == Some(user.id.as_str()) {
                spans.push(Span::styled(
                    "  removing…",
                    Style::default().fg(Color::Yellow),
                ));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");
    f.render_stateful_widget(
        list,
        area,
        &mut ListState::default().with_selected(Some(community.selected)),
    );
}

fn draw(f: &mut Frame, screen: &ProfileScreen, app: &App, now: Instant) {
    let page = page_layout(f.area());

    let help_text = if screen.editing.is_some() {
        f.render_widget(title("Edit Profile"), page.title);
        "Enter/Tab: Next field, Ctrl+S: Save, Esc: Cancel"
    } else {
        f.render_widget(title("My Profile"), page.title);
        "e: Edit, x: Export journals, Up/Down: Friends, d: Remove friend, Enter: View friend"
    };

    match (&screen.profile, &screen.editing) {
        (None, _) => f.render_widget(loading("Loading profile…"), page.body),
        (Some(_), Some(form)) => {
            let rest = form_fields(f, form, page.body);
            f.render_widget(
                Paragraph::new("Enter a URL or a file path. Clear both to remove the picture.")
                    .style(Style::default().fg(Color::DarkGray)),
                rest,
            );
        }
        (Some(profile), None) => {
            let cols = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
                .split(page.body);
            draw_details(f, profile, cols[0]);
            draw_community(f, &screen.community, cols[1]);
        }
    }

    f.render_widget(notice_line(&app.notices, now), page.notice);
    f.render_widget(nav_bar(app.pending_requests), page.nav);
    f.render_widget(help(help_text), page.help);
}

/// Loads the profile and its community. `false` means the session is no
/// longer valid.
async fn load(app: &mut App, screen: &mut ProfileScreen) -> bool {
    let profile = match app.api.my_profile().await {
        Ok(profile) => profile,
        Err(e) => {
            warn!("Error loading profile: {}", e);
            app.notices.error("Could not load your profile. Please login again.");
            return false;
        }
    };
    screen.profile = Some(profile);

    let (count, friends) = futures::join!(app.api.community_count(), app.api.close_friends());
    match count {
        Ok(count) => screen.community.close_friend_count = count.close_friends,
        Err(e) => warn!("Error loading community count: {}", e),
    }
    match friends {
        Ok(friends) => {
            screen.community.close_friends = friends;
            screen.community.selected = 0;
        }
        Err(e) => warn!("Error loading close friends: {}", e),
    }
    true
}

async fn save(app: &mut App, profile: &Profile, form: &Form) -> bool {
    let update = profile_form(form, profile);
    let uploaded = match &update.image_file {
        Some(path) => match app.api.upload_profile_image(path).await {
            Ok(url) => Some(url),
            Err(e) => {
                warn!("Error uploading profile image: {}", e);
                app.notices
                    .error(e.message_or("Failed to upload profile image"));
                return false;
            }
        },
        None => None,
    };
    match app.api.update_profile(&update.to_update(uploaded)).await {
        Ok(()) => {
            app.notices.success("Profile updated successfully");
            true
        }
        Err(e) => {
            warn!("Error updating profile: {}", e);
            app.notices.error(e.message_or("Failed to update profile"));
            false
        }
    }
}

async fn remove_friend(app: &mut App, community: &mut Community) {
    if community.removing.is_some() {
        return;
    }
    let Some(id) = community
        .close_friends
        .get(community.selected)
        .map(|u| u.id.clone())
    else {
        return;
    };
    community.removing = Some(id.clone());
    match app.api.remove_close_friend(&id).await {
        Ok(()) => {
            community.removed(&id);
            app.notices.success(CLOSE_FRIEND_REMOVED);
        }
        Err(e) => {
            warn!("Error removing close friend {}: {}", id, e);
            community.removing = None;
            app.notices.error(e.message_or("Failed to remove close friend"));
        }
    }
}

async fn export(app: &mut App, profile: &Profile) {
    let journals = match app.api.user_journals(&profile.id).await {
        Ok(journals) => journals,
        Err(e) => {
            warn!("Error fetching journals for export: {}", e);
            app.notices.error(e.message_or("Failed to download journals"));
            return;
        }
    };
    let today = Local::now().date_naive();
    match write_export(&app.export_dir, &profile.display_name(), journals, today) {
        Ok(path) => {
            info!("Exported journals to {}", path.display());
            app.notices
                .success(format!("Journals saved to {}", path.display()));
        }
        Err(ExportError::Empty) => app.notices.info(ExportError::Empty.to_string()),
        Err(e) => {
            warn!("Error writing export: {}", e);
            app.notices.error("Failed to download journals");
        }
    }
}

pub async fn run(ui: &mut UI, app: &mut App) -> Result<Action> {
    let mut screen = ProfileScreen::default();
    let mut fetching = true;

    loop {
        let now = Instant::now();
        ui.draw(|f| draw(f, &screen, app, now))?;

        if fetching {
            if !load(app, &mut screen).await {
                return Ok(Action::Logout);
            }
            fetching = false;
            continue;
        }

        let Some(key) = next_key()? else {
            app.poll_pending(Instant::now()).await;
            continue;
        };

        if let Some(form) = screen.editing.as_mut() {
            match form.handle_key(key) {
                FormEvent::Cancel => screen.editing = None,
                FormEvent::Submit => {
                    let Some(profile) = screen.profile.as_ref() else {
                        continue;
                    };
                    if save(app, profile, form).await {
                        screen.editing = None;
                        fetching = true;
                    }
                }
                FormEvent::Changed | FormEvent::Ignored => {}
            }
            continue;
        }

        match key.code {
            KeyCode::Char('e') => {
                screen.editing = screen.profile.as_ref().map(edit_form);
            }
            KeyCode::Char('x') => {
                if let Some(profile) = screen.profile.clone() {
                    export(app, &profile).await;
                }
            }
            KeyCode::Char('d') => remove_friend(app, &mut screen.community).await,
            KeyCode::Up => {
                screen.community.selected = screen.community.selected.saturating_sub(1);
            }
            KeyCode::Down => {
                if screen.community.selected + 1 < screen.community.close_friends.len() {
                    screen.community.selected += 1;
                }
            }
            KeyCode::Enter => {
                if let Some(friend) = screen.community.close_friends.get(screen.community.selected)
                {
                    return Ok(Action::Navigate(Route::PublicProfile(friend.id.clone())));
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiClient;
    use crate::config::ApiConfig;
    use crate::profile::UserSummary;
    use crate::session::TokenStore;
    use crate::ui::buffer_text;
    use ratatui::{backend::TestBackend, Terminal};

    fn profile() -> Profile {
        serde_json::from_str(
            r#"{"_id":"me","name":"Ada Lovelace","username":"ada","email":"ada@gmail.com",
                "bio":"Counting engines","location":"London",
                "profileImage":"https://img/ada.png","totalLikes":12,"totalReads":40,
                "consistency":80,"createdAt":"2023-03-01T10:00:00Z"}"#,
        )
        .unwrap()
    }

    fn render(screen: &ProfileScreen) -> String {
        let api = ApiClient::new(&ApiConfig::default(), Some("t".to_string())).unwrap();
        let app = App::new(api, TokenStore::new("unused-token"), ".".into());
        let mut terminal = Terminal::new(TestBackend::new(140, 30)).unwrap();
        terminal
            .draw(|f| draw(f, screen, &app, Instant::now()))
            .unwrap();
        buffer_text(terminal.backend().buffer())
    }

    #[test]
    fn test_details_and_close_friends() {
        let screen = ProfileScreen {
            profile: Some(profile()),
            community: Community {
                close_friend_count: 1,
                close_friends: vec![UserSummary {
                    id: "u2".into(),
                    name: Some("Grace Hopper".into()),
                    username: Some("grace".into()),
                    ..UserSummary::default()
                }],
                selected: 0,
                removing: Some("u2".into()),
            },
            editing: None,
        };
        let text = render(&screen);
        assert!(text.contains("Ada Lovelace"));
        assert!(text.contains("Member since March 2023"));
        assert!(text.contains("80%"));
        assert!(text.contains("Close friends (1)"));
        assert!(text.contains("Grace Hopper"));
        assert!(text.contains("removing…"));
    }

    #[test]
    fn test_edit_form_prefilled() {
        let profile = profile();
        let screen = ProfileScreen {
            editing: Some(edit_form(&profile)),
            profile: Some(profile),
            community: Community::default(),
        };
        let text = render(&screen);
        assert!(text.contains("Edit Profile"));
        assert!(text.contains("Counting engines"));
        assert!(text.contains("https://img/ada.png"));
    }

    #[test]
    fn test_file_path_replaces_url() {
        let profile = profile();
        let mut form = edit_form(&profile);
        form.fields[IMAGE_FILE].input.set_text(" /tmp/me.png ");
        let update = profile_form(&form, &profile);
        assert_eq!(update.image_file, Some(PathBuf::from("/tmp/me.png")));
        assert_eq!(update.profile_image, "");
        assert_eq!(
            update.to_update(Some("https://cdn/me.png".into())).profile_image,
            "https://cdn/me.png"
        );
    }

    #[test]
    fn test_clearing_both_removes_picture() {
        let profile = profile();
        let mut form = edit_form(&profile);
        form.fields[IMAGE_URL].input.set_text("");
        form.fields[NAME].input.set_text("  Ada King ");
        let update = profile_form(&form, &profile).to_update(None);
        assert_eq!(update.profile_image, "");
        assert_eq!(update.name, "Ada King");
    }
}
