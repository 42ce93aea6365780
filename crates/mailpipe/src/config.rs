//! Command line and environment configuration.

use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Parser};
use mailpipe_imap::{Config, Security};

/// Built-in message template, used when `--template` is not given.
pub const DEFAULT_TEMPLATE: &str = include_str!("template.txt");

/// Watch an IMAP mailbox and pipe each new message through a text
/// template to stdout. Processed messages are deleted from the server.
#[derive(Debug, Parser)]
#[command(name = "mailpipe", version, about)]
pub struct Args {
    /// IMAP server as host[:port]
    #[arg(value_name = "SERVER")]
    pub server: String,

    /// IMAP mailbox
    #[arg(long, default_value = "INBOX")]
    pub mailbox: String,

    /// IMAP username
    #[arg(long, env = "MAILPIPE_USERNAME", default_value = "", hide_env_values = true)]
    pub username: String,

    /// IMAP password
    #[arg(long, env = "MAILPIPE_PASSWORD", default_value = "", hide_env_values = true)]
    pub password: String,

    /// Message template file (built-in template when omitted)
    #[arg(long, value_name = "FILE")]
    pub template: Option<PathBuf>,

    /// Poll interval in seconds when IDLE is unavailable or needs
    /// renewing; 0 blocks on IDLE indefinitely
    #[arg(long, value_name = "SECONDS", default_value_t = 0)]
    pub poll_timeout: u64,

    /// Connect without TLS
    #[arg(long)]
    pub no_tls: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    /// Loads the template source from the configured file, or falls back
    /// to the built-in template.
    ///
    /// # Errors
    ///
    /// Returns an error if the template file cannot be read.
    pub fn template_source(&self) -> anyhow::Result<String> {
        match &self.template {
            Some(path) => std::fs::read_to_string(path)
                .map_err(|e| anyhow::anyhow!("reading template {}: {e}", path.display())),
            None => Ok(DEFAULT_TEMPLATE.to_string()),
        }
    }

    /// Builds the IMAP connection configuration.
    #[must_use]
    pub fn imap_config(&self) -> Config {
        let security = if self.no_tls {
            Security::None
        } else {
            Security::Tls
        };
        Config::from_addr(&self.server, security)
    }

    /// Returns the poll interval; `None` means wait indefinitely.
    #[must_use]
    pub const fn poll_interval(&self) -> Option<Duration> {
        if self.poll_timeout == 0 {
            None
        } else {
            Some(Duration::from_secs(self.poll_timeout))
        }
    }

    /// Default log filter derived from the verbosity flag; `RUST_LOG`
    /// overrides it.
    #[must_use]
    pub const fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "mailpipe=info,mailpipe_imap=info",
            1 => "mailpipe=debug,mailpipe_imap=debug",
            _ => "mailpipe=trace,mailpipe_imap=trace",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn server_argument_is_required() {
        assert!(Args::try_parse_from(["mailpipe"]).is_err());
        assert!(Args::try_parse_from(["mailpipe", "imap.example.com:993"]).is_ok());
    }

    #[test]
    fn defaults() {
        let args = Args::try_parse_from(["mailpipe", "imap.example.com"]).unwrap();
        assert_eq!(args.mailbox, "INBOX");
        assert_eq!(args.poll_timeout, 0);
        assert!(args.poll_interval().is_none());
        assert!(!args.no_tls);
        assert_eq!(args.verbose, 0);
    }

    #[test]
    fn no_tls_selects_plaintext_port() {
        let args =
            Args::try_parse_from(["mailpipe", "--no-tls", "imap.example.com"]).unwrap();
        let config = args.imap_config();
        assert_eq!(config.security, Security::None);
        assert_eq!(config.port, 143);
    }

    #[test]
    fn explicit_port_wins() {
        let args = Args::try_parse_from(["mailpipe", "imap.example.com:1993"]).unwrap();
        assert_eq!(args.imap_config().port, 1993);
    }

    #[test]
    fn poll_timeout_becomes_interval() {
        let args =
            Args::try_parse_from(["mailpipe", "--poll-timeout", "60", "x.example.com"]).unwrap();
        assert_eq!(args.poll_interval(), Some(Duration::from_secs(60)));
    }

    #[test]
    fn default_template_is_embedded() {
        let args = Args::try_parse_from(["mailpipe", "imap.example.com"]).unwrap();
        let template = args.template_source().unwrap();
        assert!(template.contains("{{ Header.Subject }}"));
    }

    #[test]
    fn verbosity_maps_to_filter() {
        let args = Args::try_parse_from(["mailpipe", "-vv", "imap.example.com"]).unwrap();
        assert!(args.log_filter().contains("trace"));
    }
}
