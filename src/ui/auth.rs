use super::{form_fields, help, next_key, notice_line, page_layout, title, Action, UI};
use crate::app::App;
use crate::auth::{
    google_login_url, reset_token_from_input, validate_email, validate_new_password, LoginForm,
    SignupForm,
};
use crate::form::{Field, Form, FormEvent};
use crate::notice::Notices;
use crate::router::Route;
use color_eyre::Result;
use crossterm::event::KeyCode;
use ratatui::{
    style::{Color, Style},
    text::Line,
    widgets::Paragraph,
    Frame,
};
use std::time::Instant;
use tracing::info;

/// Static parts of a signed-out form screen.
struct FormScreen {
    heading: &'static str,
    hints: Vec<String>,
    help: &'static str,
    shortcuts: Vec<(KeyCode, Action)>,
}

enum Step {
    Idle,
    Submit,
    Leave(Action),
}

fn draw_form(f: &mut Frame, screen: &FormScreen, form: &Form, notices: &Notices, now: Instant) {
    let page = page_layout(f.area());
    f.render_widget(title(screen.heading), page.title);

    let rest = form_fields(f, form, page.body);

    let hints: Vec<Line> = screen.hints.iter().map(|h| Line::from(h.as_str())).collect();
    f.render_widget(
        Paragraph::new(hints).style(Style::default().fg(Color::DarkGray)),
        rest,
    );

    f.render_widget(notice_line(notices, now), page.notice);
    f.render_widget(help(screen.help), page.help);
}

/// Switching between the signed-out screens drops the previous screen's
/// notice.
fn poll_form(
    ui: &mut UI,
    notices: &mut Notices,
    screen: &FormScreen,
    form: &mut Form,
) -> Result<Step> {
    let now = Instant::now();
    ui.draw(|f| draw_form(f, screen, form, notices, now))?;

    let Some(key) = next_key()? else {
        return Ok(Step::Idle);
    };
    if let Some((_, action)) = screen.shortcuts.iter().find(|(code, _)| *code == key.code) {
        notices.clear();
        return Ok(Step::Leave(action.clone()));
    }
    Ok(match form.handle_key(key) {
        FormEvent::Submit => Step::Submit,
        FormEvent::Cancel => Step::Leave(Action::Quit),
        FormEvent::Changed | FormEvent::Ignored => Step::Idle,
    })
}

pub async fn login(ui: &mut UI, app: &mut App) -> Result<Action> {
    let screen = FormScreen {
        heading: "Login",
        hints: vec![
            "Forgot password? Press F3.".to_string(),
            format!(
                "Continue with Google: open {} and pass the redirect URL to `close-circle oauth-callback`.",
                google_login_url(app.api.base_url())
            ),
        ],
        help: "Enter: Next/Login, Tab: Next field, F2: Sign up, F3: Forgot password, Esc: Quit",
        shortcuts: vec![
            (KeyCode::F(2), Action::Navigate(Route::Signup)),
            (KeyCode::F(3), Action::Navigate(Route::ForgotPassword)),
        ],
    };
    let mut form = Form::new(vec![Field::text("Username"), Field::password("Password")]);

    loop {
        match poll_form(ui, &mut app.notices, &screen, &mut form)? {
            Step::Idle => {}
            Step::Leave(action) => return Ok(action),
            Step::Submit => {
                let credentials = LoginForm {
                    username: form.value(0).trim().to_string(),
                    password: form.value(1).to_string(),
                };
                if let Err(e) = credentials.validate() {
                    app.notices.error(e.to_string());
                    continue;
                }
                match app.api.login(&credentials).await {
                    Ok(token) => {
                        app.sign_in(token).await?;
                        app.notices.success("Login successful");
                        return Ok(Action::Navigate(Route::Dashboard));
                    }
                    Err(e) => app
                        .notices
                        .error(format!("Login failed: {}", e.message_or("Something went wrong"))),
                }
            }
        }
    }
}

pub async fn signup(ui: &mut UI, app: &mut App) -> Result<Action> {
    let screen = FormScreen {
        heading: "Sign Up",
        hints: vec![
            "Use a Gmail address (must end with @gmail.com).".to_string(),
            format!("Or continue with Google: {}", google_login_url(app.api.base_url())),
        ],
        help: "Enter: Next/Sign up, Tab: Next field, F2: Back to login, Esc: Quit",
        shortcuts: vec![(KeyCode::F(2), Action::Navigate(Route::Login))],
    };
    let mut form = Form::new(vec![
        Field::text("Name"),
        Field::text("Username"),
        Field::text("Email"),
        Field::password("Password"),
    ]);

    loop {
        match poll_form(ui, &mut app.notices, &screen, &mut form)? {
            Step::Idle => {}
            Step::Leave(action) => return Ok(action),
            Step::Submit => {
                let details = SignupForm {
                    name: form.value(0).trim().to_string(),
                    username: form.value(1).trim().to_string(),
                    email: form.value(2).trim().to_string(),
                    password: form.value(3).to_string(),
                };
                if let Err(e) = details.validate() {
                    app.notices.error(e.to_string());
                    continue;
                }
                match app.api.register(&details).await {
                    Ok(()) => {
                        app.notices
                            .success("Signup successful. Please login to continue.");
                        return Ok(Action::Navigate(Route::Login));
                    }
                    Err(e) => app.notices.error(format!(
                        "Signup failed: {}",
                        e.message_or("Something went wrong")
                    )),
                }
            }
        }
    }
}

pub async fn forgot_password(ui: &mut UI, app: &mut App) -> Result<Action> {
    let screen = FormScreen {
        heading: "Forgot Password",
        hints: vec!["We'll email you a link to reset your password.".to_string()],
        help: "Enter: Send reset link, F2: Back to login, F4: I have a reset link, Esc: Quit",
        shortcuts: vec![
            (KeyCode::F(2), Action::Navigate(Route::Login)),
            (
                KeyCode::F(4),
                Action::Navigate(Route::ResetPassword(String::new())),
            ),
        ],
    };
    let mut form = Form::new(vec![Field::text("Email address")]);

    loop {
        match poll_form(ui, &mut app.notices, &screen, &mut form)? {
            Step::Idle => {}
            Step::Leave(action) => return Ok(action),
            Step::Submit => {
                let email = form.value(0).trim().to_string();
                if let Err(e) = validate_email(&email) {
                    app.notices.error(e.to_string());
                    continue;
                }
                match app.api.forgot_password(&email).await {
                    Ok(()) => {
                        info!("Password reset requested");
                        app.notices.success("Reset link sent to your email");
                    }
                    Err(e) => app.notices.error(e.message_or("Error sending email")),
                }
            }
        }
    }
}

/// `token` comes from the route; when it is empty the user pastes the link
/// from the email instead.
pub async fn reset_password(ui: &mut UI, app: &mut App, token: &str) -> Result<Action> {
    let screen = FormScreen {
        heading: "Reset Password",
        hints: vec!["Paste the token or the whole link from the email.".to_string()],
        help: "Enter: Next/Reset password, Tab: Next field, F2: Back to login, Esc: Quit",
        shortcuts: vec![(KeyCode::F(2), Action::Navigate(Route::Login))],
    };
    let mut form = Form::new(vec![
        Field::text("Reset token or link").with_value(token),
        Field::password("New Password"),
    ]);
    if !token.is_empty() {
        form.focus = 1;
    }

    loop {
        match poll_form(ui, &mut app.notices, &screen, &mut form)? {
            Step::Idle => {}
            Step::Leave(action) => return Ok(action),
            Step::Submit => {
                let Some(token) = reset_token_from_input(form.value(0)) else {
                    app.notices.error("Reset token is required");
                    continue;
                };
                let password = form.value(1).to_string();
                if let Err(e) = validate_new_password(&password) {
                    app.notices.error(e.to_string());
                    continue;
                }
                match app.api.reset_password(&token, &password).await {
                    Ok(()) => {
                        app.notices.success("Password reset successful");
                        return Ok(Action::Navigate(Route::Login));
                    }
                    Err(e) => app.notices.error(e.message_or("Reset failed")),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::buffer_text;
    use ratatui::{backend::TestBackend, Terminal};

    #[test]
    fn test_login_form_masks_password() {
        let screen = FormScreen {
            heading: "Login",
            hints: vec!["Forgot password? Press F3.".to_string()],
            help: "Esc: Quit",
            shortcuts: Vec::new(),
        };
        let mut form = Form::new(vec![Field::text("Username"), Field::password("Password")]);
        form.fields[0].input.set_text("ada");
        form.fields[1].input.set_text("hunter2");

        let mut terminal = Terminal::new(TestBackend::new(60, 20)).unwrap();
        terminal
            .draw(|f| draw_form(f, &screen, &form, &Notices::default(), Instant::now()))
            .unwrap();
        let text = buffer_text(terminal.backend().buffer());
        assert!(text.contains("ada|"));
        assert!(text.contains("•••••••"));
        assert!(!text.contains("hunter2"));
        assert!(text.contains("Forgot password? Press F3."));
    }
}
