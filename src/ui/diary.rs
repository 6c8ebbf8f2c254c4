use super::{
    help, input_box, loading, nav_bar, next_key, notice_line, page_layout, shell_key, title,
    Action, ShellKey, UI,
};
use crate::app::App;
use crate::calendar::CalendarWidget;
use crate::diary_state::{DiaryState, SaveMode};
use crate::journal::{format_long_date, ImageChoice, Journal, Visibility};
use crate::stores::SelectedDayStore;
use crate::textarea::TextArea;
use chrono::{Local, NaiveDate};
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use std::rc::Rc;
use std::time::Instant;
use tracing::{debug, warn};

const CONTENT_MIN_HEIGHT: u16 = 5;
const CONTENT_MAX_HEIGHT: u16 = 14;
/// Text rows the content box accepts: its borders take two rows and one more
/// stays free for the cursor marker.
const CONTENT_MAX_ROWS: u16 = CONTENT_MAX_HEIGHT - 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Calendar,
    Title,
    Content,
    Visibility,
    Anonymous,
    Image,
}

impl Focus {
    const EDITOR: [Focus; 5] = [
        Focus::Title,
        Focus::Content,
        Focus::Visibility,
        Focus::Anonymous,
        Focus::Image,
    ];

    fn step(self, forward: bool) -> Focus {
        let len = Self::EDITOR.len();
        let idx = Self::EDITOR.iter().position(|f| *f == self).unwrap_or(0);
        let next = if forward {
            (idx + 1) % len
        } else {
            (idx + len - 1) % len
        };
        Self::EDITOR[next]
    }
}

struct DiaryScreen {
    state: DiaryState,
    focus: Focus,
    image_input: TextArea,
    /// Inner width of the content box at the last draw.
    content_width: u16,
}

impl DiaryScreen {
    fn new(today: NaiveDate, days: SelectedDayStore) -> Self {
        DiaryScreen {
            state: DiaryState::new(today, days),
            focus: Focus::Calendar,
            image_input: TextArea::new(),
            content_width: 80,
        }
    }

    fn leave_editor(&mut self) {
        self.focus = Focus::Calendar;
        self.image_input.clear();
    }
}

fn draw_journal(f: &mut Frame, area: Rect, journal: &Journal) {
    let mut lines = vec![
        Line::from(Span::styled(
            journal.title.clone(),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        )),
        Line::from(vec![
            Span::raw(format!(
                "{} {}",
                journal.visibility.icon(),
                journal.visibility.label()
            )),
            Span::styled(
                if journal.is_anonymous {
                    " • 👤 Anonymous"
                } else {
                    ""
                },
                Style::default().fg(Color::Magenta),
            ),
        ]),
        Line::from(""),
    ];
    let content = if journal.content.is_empty() {
        "No content available."
    } else {
        journal.content.as_str()
    };
    lines.extend(content.split('\n').map(|l| Line::from(l.to_string())));
    lines.push(Line::from(""));
    if let Some(image) = journal.first_image() {
        lines.push(Line::from(Span::styled(
            format!("🖼  {}", image),
            Style::default().fg(Color::Blue),
        )));
    }
    lines.push(Line::from(Span::styled(
        format!(
            "{} characters • {} words    ❤️ {} • 👁️ {}",
            journal.content.chars().count(),
            journal.content.split_whitespace().count(),
            journal.likes,
            journal.reads
        ),
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::ITALIC),
    )));

    let display = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title("Journal"));
    f.render_widget(display, area);
}

fn columns(body: Rect) -> Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(24), Constraint::Min(0)])
        .split(body)
}

fn content_width(frame: Rect) -> u16 {
    columns(page_layout(frame).body)[1].width.saturating_sub(2)
}

fn draw_editor(f: &mut Frame, area: Rect, screen: &DiaryScreen) {
    let draft = &screen.state.draft;
    let inner_width = area.width.saturating_sub(2);
    let content_height =
        draft
            .content
            .height(inner_width, CONTENT_MIN_HEIGHT, CONTENT_MAX_HEIGHT);
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(content_height),
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Min(0),
        ])
        .split(area);

    f.render_widget(
        input_box("Title", &draft.title, screen.focus == Focus::Title),
        rows[0],
    );
    // entries loaded from elsewhere can be taller than the box; keep the end in view
    let overflow = draft
        .content
        .rows(inner_width)
        .saturating_sub(CONTENT_MAX_HEIGHT - 2);
    f.render_widget(
        input_box(
            "How was your day?",
            &draft.content,
            screen.focus == Focus::Content,
        )
        .scroll((overflow, 0)),
        rows[1],
    );

    let height_limited = draft.content.is_at_rows(inner_width, CONTENT_MAX_ROWS);
    let mut status = draft.content.status_line();
    if height_limited {
        status.push_str(" • Height limit reached, delete some text to keep writing");
    }
    let status_style = if draft.content.is_near_limit() || height_limited {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    f.render_widget(Paragraph::new(status).style(status_style), rows[2]);

    let mut options = Vec::new();
    for option in Visibility::OPTIONS {
        let style = if option == draft.visibility {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Magenta)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        options.push(Span::styled(
            format!(" {} {} ", option.icon(), option.label()),
            style,
        ));
        options.push(Span::raw(" "));
    }
    let border = if screen.focus == Focus::Visibility {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    f.render_widget(
        Paragraph::new(Line::from(options)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border)
                .title(format!("Who can see this? {}", draft.visibility.description())),
        ),
        rows[3],
    );

    let anonymous = if draft.visibility == Visibility::Private {
        Span::styled(
            "[ ] Post anonymously (not available for private entries)",
            Style::default().fg(Color::DarkGray),
        )
    } else {
        let mark = if draft.is_anonymous { "x" } else { " " };
        let style = if screen.focus == Focus::Anonymous {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default()
        };
        Span::styled(format!("[{}] Post anonymously", mark), style)
    };
    f.render_widget(Paragraph::new(Line::from(anonymous)), rows[4]);

    let image_label = match &draft.image {
        ImageChoice::None => "Image: none (type a file path, Enter to attach)".to_string(),
        ImageChoice::Existing(url) => format!("Image: {} (Ctrl+R to remove)", url),
        ImageChoice::New(path) => format!("Image: {} (Ctrl+R to remove)", path.display()),
    };
    f.render_widget(
        input_box(
            &image_label,
            &screen.image_input,
            screen.focus == Focus::Image,
        ),
        rows[5],
    );
}

fn help_for(screen: &DiaryScreen) -> &'static str {
    match screen.focus {
        Focus::Calendar if screen.state.is_writing() => {
            "Arrows: Move, Enter: Pick day, [ ]: Month, t: Today, Tab/w: Write"
        }
        Focus::Calendar => "Arrows: Move, Enter: Pick day, [ ]: Month, t: Today, e: Edit entry",
        Focus::Visibility => "Left/Right/Space: Change visibility, Tab: Next, Ctrl+S: Save, Esc: Back",
        Focus::Anonymous => "Space: Toggle anonymity, Tab: Next, Ctrl+S: Save, Esc: Back",
        Focus::Image => "Enter: Attach file, Ctrl+R: Remove image, Tab: Next, Ctrl+S: Save, Esc: Back",
        Focus::Title | Focus::Content => "Tab: Next field, Ctrl+S: Save, Esc: Back",
    }
}

fn draw(f: &mut Frame, screen: &DiaryScreen, app: &App, today: NaiveDate, now: Instant) {
    let page = page_layout(f.area());
    let heading = format!(
        "My Diary · {}",
        format_long_date(screen.state.days.day_or_today(today))
    );
    f.render_widget(title(&heading), page.title);

    let cols = columns(page.body);

    let cells = screen.state.cells(today);
    f.render_widget(
        CalendarWidget {
            view: screen.state.view,
            cells: &cells,
            loading: screen.state.loading_month,
        },
        cols[0],
    );

    if screen.state.loading_journal {
        f.render_widget(loading("Loading journal…"), cols[1]);
    } else if screen.state.saving {
        f.render_widget(loading("Saving…"), cols[1]);
    } else if screen.state.is_writing() {
        draw_editor(f, cols[1], screen);
    } else if let Some(journal) = &screen.state.current {
        draw_journal(f, cols[1], journal);
    }

    f.render_widget(notice_line(&app.notices, now), page.notice);
    f.render_widget(nav_bar(app.pending_requests), page.nav);
    f.render_widget(help(help_for(screen)), page.help);
}

async fn load_date(app: &mut App, screen: &mut DiaryScreen) {
    let date = screen.state.selected;
    match app.api.journal_by_date(date).await {
        Ok(journal) => {
            debug!("Journal for {}: {}", date, journal.is_some());
            screen.state.set_current_journal(journal);
        }
        Err(e) => {
            warn!("Error fetching journal for {}: {}", date, e);
            screen.state.set_current_journal(None);
            app.notices.error("Failed to fetch journal for this date");
        }
    }
    if !screen.state.is_writing() {
        screen.leave_editor();
    }
}

async fn load_month(app: &mut App, screen: &mut DiaryScreen) {
    let view = screen.state.view;
    match app.api.journals_for_month(view).await {
        Ok(journals) => screen.state.set_month_journals(&journals),
        Err(e) => {
            warn!("Error fetching journals for {}: {}", view.title(), e);
            screen.state.set_month_journals(&[]);
        }
    }
}

async fn save(app: &mut App, screen: &mut DiaryScreen) {
    if let Err(e) = screen.state.draft.validate() {
        app.notices.error(e.to_string());
        return;
    }
    screen.state.saving = true;
    let result = match screen.state.save_mode() {
        SaveMode::Create => app
            .api
            .create_journal(&screen.state.draft, screen.state.selected)
            .await
            .map(|()| "Journal saved!")
            .map_err(|e| e.message_or("Something went wrong.")),
        SaveMode::Update { id, .. } => app
            .api
            .update_journal(&id, &screen.state.draft, screen.state.removes_image())
            .await
            .map(|()| "Journal updated!")
            .map_err(|e| e.message_or("Failed to update journal.")),
    };

    match result {
        Ok(message) => {
            screen.state.mark_saved();
            screen.leave_editor();
            screen.state.loading_journal = true;
            screen.state.loading_month = true;
            app.notices.success(message);
        }
        Err(message) => {
            screen.state.saving = false;
            app.notices.error(message);
        }
    }
}

/// Keys while the calendar has focus; false when the key is not for it.
fn calendar_key(screen: &mut DiaryScreen, app: &mut App, key: KeyEvent, today: NaiveDate) -> bool {
    let state = &mut screen.state;
    match key.code {
        KeyCode::Left => {
            state.move_cursor(-1);
        }
        KeyCode::Right => {
            state.move_cursor(1);
        }
        KeyCode::Up => {
            state.move_cursor(-7);
        }
        KeyCode::Down => {
            state.move_cursor(7);
        }
        KeyCode::Char('[') => state.show_month(state.view.prev()),
        KeyCode::Char(']') => state.show_month(state.view.next()),
        KeyCode::Char('t') => state.today(today),
        KeyCode::Enter => {
            if let Err(e) = state.select(state.cursor, today) {
                app.notices.warning(e.to_string());
            }
        }
        KeyCode::Char('e') if state.current.is_some() && !state.editing => {
            state.begin_edit();
            screen.focus = Focus::Title;
        }
        KeyCode::Tab | KeyCode::Char('w') if state.is_writing() => {
            screen.focus = Focus::Title;
        }
        _ => return false,
    }
    true
}

fn editor_key(screen: &mut DiaryScreen, app: &mut App, key: KeyEvent) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match (screen.focus, key.code) {
        (_, KeyCode::Esc) => {
            if screen.state.editing {
                screen.state.cancel_edit();
            }
            screen.leave_editor();
        }
        (focus, KeyCode::Tab) => screen.focus = focus.step(true),
        (focus, KeyCode::BackTab) => screen.focus = focus.step(false),
        (_, KeyCode::Char('r')) if ctrl => {
            screen.state.draft.remove_image();
            app.notices.info("Image removed");
        }
        (Focus::Title, KeyCode::Enter) => screen.focus = Focus::Content,
        (Focus::Title, code) => edit_text(&mut screen.state.draft.title, code),
        (Focus::Content, KeyCode::Enter) => {
            let width = screen.content_width;
            screen
                .state
                .draft
                .content
                .insert_within('\n', width, CONTENT_MAX_ROWS);
        }
        (Focus::Content, KeyCode::Char(c)) => {
            let width = screen.content_width;
            screen
                .state
                .draft
                .content
                .insert_within(c, width, CONTENT_MAX_ROWS);
        }
        (Focus::Content, code) => edit_text(&mut screen.state.draft.content, code),
        (Focus::Visibility, KeyCode::Right | KeyCode::Char(' ')) => {
            screen.state.draft.cycle_visibility();
        }
        (Focus::Visibility, KeyCode::Left) => {
            let prev = screen.state.draft.visibility.next().next();
            screen.state.draft.set_visibility(prev);
        }
        (Focus::Anonymous, KeyCode::Char(' ') | KeyCode::Enter) => {
            screen.state.draft.toggle_anonymous();
        }
        (Focus::Image, KeyCode::Enter) => {
            let path = screen.image_input.text().trim().to_string();
            if path.is_empty() {
                return;
            }
            match screen.state.draft.attach_image(path) {
                Ok(()) => {
                    screen.image_input.clear();
                    app.notices.info("Image attached");
                }
                Err(e) => app.notices.error(e.to_string()),
            }
        }
        (Focus::Image, code) => edit_text(&mut screen.image_input, code),
        _ => {}
    }
}

fn edit_text(input: &mut TextArea, code: KeyCode) {
    match code {
        KeyCode::Char(c) => {
            input.insert(c);
        }
        KeyCode::Backspace => input.backspace(),
        KeyCode::Delete => input.delete(),
        KeyCode::Left => input.left(),
        KeyCode::Right => input.right(),
        KeyCode::Up => input.up(),
        KeyCode::Down => input.down(),
        KeyCode::Home => input.home(),
        KeyCode::End => input.end(),
        _ => {}
    }
}

/// The selected day outlives the screen so coming back to My Diary opens
/// the same page.
pub async fn run(ui: &mut UI, app: &mut App) -> Result<Action> {
    let days = std::mem::take(&mut app.days);
    let mut screen = DiaryScreen::new(Local::now().date_naive(), days);
    let action = drive(ui, app, &mut screen).await;
    app.days = std::mem::take(&mut screen.state.days);
    action
}

async fn drive(ui: &mut UI, app: &mut App, screen: &mut DiaryScreen) -> Result<Action> {
    loop {
        let today = Local::now().date_naive();
        let now = Instant::now();
        let mut width = screen.content_width;
        ui.draw(|f| {
            width = content_width(f.area());
            draw(f, screen, app, today, now)
        })?;
        screen.content_width = width;

        if screen.state.loading_month {
            load_month(app, screen).await;
            continue;
        }
        if screen.state.loading_journal {
            load_date(app, screen).await;
            continue;
        }

        let Some(key) = next_key()? else {
            app.poll_pending(Instant::now()).await;
            continue;
        };

        if screen.focus != Focus::Calendar {
            if key.code == KeyCode::Char('s') && key.modifiers.contains(KeyModifiers::CONTROL) {
                save(app, screen).await;
            } else {
                editor_key(screen, app, key);
            }
            continue;
        }

        if calendar_key(screen, app, key, today) {
            continue;
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

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn app() -> App {
        let api = ApiClient::new(&ApiConfig::default(), Some("t".to_string())).unwrap();
        App::new(api, TokenStore::new("unused-token"), ".".into())
    }

    fn render(screen: &DiaryScreen, today: NaiveDate) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal
            .draw(|f| draw(f, screen, &app(), today, Instant::now()))
            .unwrap();
        buffer_text(terminal.backend().buffer())
    }

    fn entry() -> Journal {
        serde_json::from_str(
            r#"{"_id":"j1","title":"Lake day","content":"Swam twice.","visibility":"close-circle",
                "isAnonymous":true,"journaldate":"2024-05-02","likes":4,"reads":9}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_focus_cycles_through_editor() {
        assert_eq!(Focus::Title.step(true), Focus::Content);
        assert_eq!(Focus::Image.step(true), Focus::Title);
        assert_eq!(Focus::Title.step(false), Focus::Image);
    }

    #[test]
    fn test_renders_existing_entry() {
        let today = ymd(2024, 5, 10);
        let mut screen = DiaryScreen::new(today, SelectedDayStore::default());
        screen.state.select(ymd(2024, 5, 2), today).unwrap();
        screen.state.set_month_journals(&[entry()]);
        screen.state.set_current_journal(Some(entry()));

        let text = render(&screen, today);
        assert!(text.contains("My Diary · Thursday, May 2, 2024"));
        assert!(text.contains("Lake day"));
        assert!(text.contains("Me & my friends"));
        assert!(text.contains("Anonymous"));
        assert!(text.contains("e: Edit entry"));
    }

    #[test]
    fn test_renders_editor_with_counter() {
        let today = ymd(2024, 5, 10);
        let mut screen = DiaryScreen::new(today, SelectedDayStore::default());
        screen.state.set_month_journals(&[]);
        screen.state.set_current_journal(None);
        screen.state.draft.content.set_text(&"a".repeat(460));
        screen.focus = Focus::Content;

        let text = render(&screen, today);
        assert!(text.contains("460/500 characters"));
        assert!(text.contains("40 characters remaining"));
        assert!(text.contains("Who can see this?"));
        assert!(text.contains("not available for private entries"));
    }

    #[test]
    fn test_future_day_warns() {
        let today = ymd(2024, 5, 10);
        let mut screen = DiaryScreen::new(today, SelectedDayStore::default());
        let mut app = app();
        screen.state.move_cursor(1);
        let handled = calendar_key(
            &mut screen,
            &mut app,
            KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE),
            today,
        );
        assert!(handled);
        assert_eq!(screen.state.selected, today);
        let notice = app.notices.active(Instant::now()).unwrap();
        assert_eq!(notice.message, "Can't write in future dates!");
    }

    #[test]
    fn test_editor_keys_edit_draft() {
        let today = ymd(2024, 5, 10);
        let mut screen = DiaryScreen::new(today, SelectedDayStore::default());
        let mut app = app();
        screen.focus = Focus::Title;
        let key = |code| KeyEvent::new(code, KeyModifiers::NONE);

        editor_key(&mut screen, &mut app, key(KeyCode::Char('H')));
        editor_key(&mut screen, &mut app, key(KeyCode::Char('i')));
        editor_key(&mut screen, &mut app, key(KeyCode::Enter));
        assert_eq!(screen.focus, Focus::Content);
        assert_eq!(screen.state.draft.title.text(), "Hi");

        screen.focus = Focus::Visibility;
        editor_key(&mut screen, &mut app, key(KeyCode::Right));
        assert_eq!(screen.state.draft.visibility, Visibility::CloseCircle);
        editor_key(&mut screen, &mut app, key(KeyCode::Left));
        assert_eq!(screen.state.draft.visibility, Visibility::Private);

        editor_key(&mut screen, &mut app, key(KeyCode::Esc));
        assert_eq!(screen.focus, Focus::Calendar);
    }

    #[test]
    fn test_content_box_stops_at_height_limit() {
        let today = ymd(2024, 5, 10);
        let mut screen = DiaryScreen::new(today, SelectedDayStore::default());
        let mut app = app();
        screen.state.set_month_journals(&[]);
        screen.state.set_current_journal(None);
        screen.focus = Focus::Content;
        screen.content_width = content_width(Rect::new(0, 0, 120, 40));
        let key = |code| KeyEvent::new(code, KeyModifiers::NONE);

        for line in 0..30 {
            if line > 0 {
                editor_key(&mut screen, &mut app, key(KeyCode::Enter));
            }
            for c in format!("L{:02}", line).chars() {
                editor_key(&mut screen, &mut app, key(KeyCode::Char(c)));
            }
        }
        let content = &screen.state.draft.content;
        assert_eq!(content.rows(screen.content_width), CONTENT_MAX_ROWS);
        assert_eq!(content.text().lines().count(), usize::from(CONTENT_MAX_ROWS));

        let text = render(&screen, today);
        assert!(text.contains("L00"));
        assert!(text.contains("L29|"));
        assert!(text.contains("Height limit reached"));
    }
}
