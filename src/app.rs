use crate::api::ApiClient;
use crate::notice::Notices;
use crate::session::TokenStore;
use crate::stores::{SelectedDayStore, UserStore};
use color_eyre::Result;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// How long the navigation badge may go without a refetch.
pub const PENDING_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Everything the screens share: the backend client, the stored token and
/// the client-side stores.
pub struct App {
    pub api: ApiClient,
    pub tokens: TokenStore,
    pub user: UserStore,
    pub days: SelectedDayStore,
    pub notices: Notices,
    pub pending_requests: usize,
    pub pending_checked_at: Option<Instant>,
    pub export_dir: PathBuf,
}

impl App {
    pub fn new(api: ApiClient, tokens: TokenStore, export_dir: PathBuf) -> Self {
        App {
            api,
            tokens,
            user: UserStore::default(),
            days: SelectedDayStore::default(),
            notices: Notices::default(),
            pending_requests: 0,
            pending_checked_at: None,
            export_dir,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.api.token().is_some()
    }

    /// Asks the backend who the token belongs to. A rejected token is
    /// forgotten so the next screen is the login page.
    pub async fn refresh_user(&mut self) -> Result<()> {
        if !self.is_authenticated() {
            return Ok(());
        }
        match self.api.me().await {
            Ok(me) => {
                info!("Signed in as user {}", me.id);
                self.user.set_user_id(me.id);
            }
            Err(e) if e.is_unauthorized() => {
                warn!("Stored token rejected, signing out");
                self.logout()?;
            }
            Err(e) => warn!("Could not load current user: {}", e),
        }
        Ok(())
    }

    pub async fn sign_in(&mut self, token: String) -> Result<()> {
        self.tokens.save(&token)?;
        debug!("Token saved to {:?}", self.tokens.path());
        self.api.set_token(token);
        self.refresh_user().await
    }

    pub fn logout(&mut self) -> Result<()> {
        self.tokens.clear()?;
        self.api.clear_token();
        self.user.clear_user_id();
        self.days.clear_selected_day();
        self.pending_requests = 0;
        self.pending_checked_at = None;
        info!("Signed out");
        Ok(())
    }

    pub async fn refresh_pending_count(&mut self) {
        self.pending_checked_at = Some(Instant::now());
        match self.api.pending_requests().await {
            Ok(requests) => self.pending_requests = requests.len(),
            Err(e) => warn!("Could not load pending requests: {}", e),
        }
    }

    /// True when a signed-in badge has never been fetched or is older than
    /// [`PENDING_POLL_INTERVAL`].
    pub fn pending_due(&self, now: Instant) -> bool {
        self.is_authenticated()
            && self
                .pending_checked_at
                .map_or(true, |at| now.saturating_duration_since(at) >= PENDING_POLL_INTERVAL)
    }

    /// Called from the screens' idle ticks to keep the badge fresh.
    pub async fn poll_pending(&mut self, now: Instant) {
        if self.pending_due(now) {
            debug!("Polling pending friend requests");
            self.refresh_pending_count().await;
        }
    }
}
