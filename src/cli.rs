use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "close-circle", version, about = "Write your diary and share it with your close circle")]
pub struct Cli {
    /// Config file to use instead of the default one
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Backend base URL, overriding config and environment
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the terminal UI (the default)
    Tui {
        /// Screen to open first, e.g. /my-diary or /public/<user id>
        #[arg(long)]
        route: Option<String>,
    },
    /// Finish a Google sign-in with the redirect URL the browser landed on
    OauthCallback { url: String },
    /// Print the URL that starts a Google sign-in
    GoogleLoginUrl,
    /// Save all of your journals as a printable HTML file
    Export {
        /// Directory to write into
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Forget the stored session token
    Logout,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_means_tui() {
        let cli = Cli::try_parse_from(["close-circle"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_global_options_after_subcommand() {
        let cli = Cli::try_parse_from([
            "close-circle",
            "tui",
            "--route",
            "/public/abc",
            "--api-url",
            "http://10.0.0.2:5000",
        ])
        .unwrap();
        assert_eq!(cli.api_url.as_deref(), Some("http://10.0.0.2:5000"));
        match cli.command {
            Some(Command::Tui { route }) => assert_eq!(route.as_deref(), Some("/public/abc")),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_oauth_callback_takes_url() {
        let cli = Cli::try_parse_from([
            "close-circle",
            "oauth-callback",
            "http://localhost:3000/oauth-success?token=abc",
        ])
        .unwrap();
        assert!(matches!(cli.command, Some(Command::OauthCallback { .. })));
    }
}
