mod api;
mod app;
mod auth;
mod calendar;
mod cli;
mod config;
mod diary_state;
mod export;
mod feed;
mod form;
mod friends;
mod journal;
mod logging;
mod notice;
mod profile;
mod router;
mod search;
mod session;
mod stores;
mod textarea;
mod ui;

use api::ApiClient;
use app::App;
use chrono::Local;
use clap::Parser;
use cli::{Cli, Command};
use color_eyre::eyre::{eyre, Result};
use config::Config;
use feed::FeedKind;
use router::{resolve, Route};
use session::TokenStore;
use std::path::PathBuf;
use tracing::{debug, info};
use ui::{Action, UI};

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    let mut config = Config::resolve(cli.config.as_deref())?;
    if let Some(url) = cli.api_url {
        config.api.url = url;
    }
    logging::init(&config.logging)?;

    let tokens = TokenStore::new(config.storage.token_file.clone());
    let token = tokens.load()?;
    let api = ApiClient::new(&config.api, token)?;
    let mut app = App::new(api, tokens, config.storage.export_dir.clone());
    app.refresh_user().await?;

    match cli.command {
        None => run_tui(&mut app, Route::Login).await,
        Some(Command::Tui { route }) => {
            let start = route.as_deref().map(Route::parse).unwrap_or(Route::Login);
            run_tui(&mut app, start).await
        }
        Some(Command::OauthCallback { url }) => oauth_callback(&mut app, &url).await,
        Some(Command::GoogleLoginUrl) => {
            println!("{}", auth::google_login_url(app.api.base_url()));
            Ok(())
        }
        Some(Command::Export { output }) => export_journals(&app, output).await,
        Some(Command::Logout) => {
            app.logout()?;
            println!("Signed out.");
            Ok(())
        }
    }
}

async fn run_tui(app: &mut App, start: Route) -> Result<()> {
    let mut ui = UI::new()?;
    let mut route = start;

    loop {
        route = resolve(route, app.is_authenticated());
        debug!("Showing {}", route.path());

        let action = match &route {
            Route::Login => ui::auth::login(&mut ui, app).await?,
            Route::Signup => ui::auth::signup(&mut ui, app).await?,
            Route::ForgotPassword => ui::auth::forgot_password(&mut ui, app).await?,
            Route::ResetPassword(token) => ui::auth::reset_password(&mut ui, app, token).await?,
            Route::Dashboard => ui::dashboard::run(&mut ui, app).await?,
            Route::MyDiary => ui::diary::run(&mut ui, app).await?,
            Route::CloseCircle => ui::feed::run(&mut ui, app, FeedKind::CloseCircle).await?,
            Route::Everyone => ui::feed::run(&mut ui, app, FeedKind::Everyone).await?,
            Route::Notifications => ui::notifications::run(&mut ui, app).await?,
            Route::Profile => ui::profile::run(&mut ui, app).await?,
            Route::PublicProfile(id) => ui::public::run(&mut ui, app, id).await?,
        };

        match action {
            Action::Navigate(next) => route = next,
            Action::Logout => {
                app.logout()?;
                app.notices.info("Logged out");
                route = Route::Login;
            }
            Action::Quit => break,
        }
    }

    Ok(())
}

async fn oauth_callback(app: &mut App, url: &str) -> Result<()> {
    let token = auth::oauth_token_from_url(url)
        .ok_or_else(|| eyre!("No token found in {}", url))?;
    app.sign_in(token).await?;
    if !app.is_authenticated() {
        return Err(eyre!("The backend rejected the token from that sign-in"));
    }
    info!("Signed in with Google");
    println!("Signed in. Run `close-circle` to start writing.");
    Ok(())
}

async fn export_journals(app: &App, output: Option<PathBuf>) -> Result<()> {
    if !app.user.is_logged_in() {
        return Err(eyre!("Not signed in. Run `close-circle` and log in first."));
    }
    let profile = app
        .api
        .my_profile()
        .await
        .map_err(|e| eyre!(e.message_or("Could not load your profile")))?;
    let journals = app
        .api
        .user_journals(&profile.id)
        .await
        .map_err(|e| eyre!(e.message_or("Failed to download journals")))?;

    let dir = output.unwrap_or_else(|| app.export_dir.clone());
    let path = export::write_export(
        &dir,
        &profile.display_name(),
        journals,
        Local::now().date_naive(),
    )?;
    println!("Journals saved to {}", path.display());
    Ok(())
}
