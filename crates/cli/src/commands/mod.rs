//! CLI arguments, the menu, and its handlers
//!
//! Each menu entry maps to one handler with the uniform signature
//! `(&mut Session) -> anyhow::Result<Outcome>`. Remote failures are reported
//! inside the handler; only unexpected failures surface as `Err`.

use std::path::PathBuf;

use clap::Parser;
use sdiag_core::credentials::{ANON_KEY_VAR, SERVICE_KEY_VAR, URL_VAR};
use sdiag_core::{Error, ObjectPath};

use crate::outcome::Outcome;
use crate::output::Formatter;
use crate::session::Session;

mod buckets;
mod connectivity;
mod diagnostics;
mod download;
mod files;
mod upload;

/// sdiag - storage API diagnostics
///
/// Interactive checks for a hosted object-storage project: bucket and file
/// listings, upload and download round-trips, and public URL reachability.
#[derive(Parser, Debug)]
#[command(name = "sdiag")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Project URL
    #[arg(long, env = URL_VAR)]
    pub url: Option<String>,

    /// Privileged (service role) API key
    #[arg(long, env = SERVICE_KEY_VAR, hide_env_values = true)]
    pub service_key: Option<String>,

    /// Restricted (anon) API key, used when no service key is set
    #[arg(long, env = ANON_KEY_VAR, hide_env_values = true)]
    pub anon_key: Option<String>,

    /// Scratch directory for generated and downloaded files
    #[arg(long, value_name = "DIR")]
    pub temp_dir: Option<PathBuf>,

    /// Reachability probe timeout in seconds
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub probe_timeout: Option<u64>,

    /// Disable colored output
    #[arg(long, default_value = "false")]
    pub no_color: bool,

    /// Disable spinners
    #[arg(long, default_value = "false")]
    pub no_progress: bool,

    /// Enable debug logging
    #[arg(long, default_value = "false")]
    pub debug: bool,
}

/// Menu entries, numbered 1-9
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuCommand {
    ListBuckets,
    ListFiles,
    UploadText,
    UploadImage,
    UploadCustom,
    Download,
    Connectivity,
    FullDiagnostics,
    Exit,
}

impl MenuCommand {
    /// All entries in menu order
    pub const ALL: [MenuCommand; 9] = [
        Self::ListBuckets,
        Self::ListFiles,
        Self::UploadText,
        Self::UploadImage,
        Self::UploadCustom,
        Self::Download,
        Self::Connectivity,
        Self::FullDiagnostics,
        Self::Exit,
    ];

    /// Parse a menu choice such as "3"
    pub fn from_choice(choice: &str) -> Option<Self> {
        let number: usize = choice.trim().parse().ok()?;
        Self::ALL.get(number.checked_sub(1)?).copied()
    }

    /// Menu number of this entry
    pub fn number(self) -> usize {
        Self::ALL
            .iter()
            .position(|c| *c == self)
            .map_or(0, |i| i + 1)
    }

    pub const fn description(self) -> &'static str {
        match self {
            Self::ListBuckets => "List buckets",
            Self::ListFiles => "List files in bucket",
            Self::UploadText => "Upload generated text file",
            Self::UploadImage => "Upload generated PNG image",
            Self::UploadCustom => "Upload custom local file",
            Self::Download => "Download file",
            Self::Connectivity => "Connectivity test",
            Self::FullDiagnostics => "Full diagnostics",
            Self::Exit => "Exit (clean up temp directory)",
        }
    }
}

/// Render the menu text
pub fn render_menu() -> String {
    let mut menu = String::from("=== Storage Diagnostics Menu ===");
    for command in MenuCommand::ALL {
        menu.push_str(&format!("\n{}. {}", command.number(), command.description()));
    }
    menu
}

/// Run the handler for a menu entry
pub async fn dispatch(command: MenuCommand, session: &mut Session) -> anyhow::Result<Outcome> {
    tracing::debug!(?command, "dispatching");
    match command {
        MenuCommand::ListBuckets => buckets::list(session).await,
        MenuCommand::ListFiles => files::list(session).await,
        MenuCommand::UploadText => upload::generated_text(session).await,
        MenuCommand::UploadImage => upload::generated_image(session).await,
        MenuCommand::UploadCustom => upload::custom_file(session).await,
        MenuCommand::Download => download::download(session).await,
        MenuCommand::Connectivity => connectivity::run(session).await,
        MenuCommand::FullDiagnostics => diagnostics::run(session).await,
        MenuCommand::Exit => Ok(exit(session)),
    }
}

/// Remove the scratch directory and leave the menu
fn exit(session: &Session) -> Outcome {
    match session.workspace.cleanup() {
        Ok(true) => session.out.success(&format!(
            "Removed temp directory {}",
            session.workspace.root().display()
        )),
        Ok(false) => {}
        Err(e) => session.out.warning(&format!(
            "Could not remove temp directory {}: {e}",
            session.workspace.root().display()
        )),
    }
    session.out.println("Goodbye!");
    Outcome::Exit
}

/// Print a remote failure with its remediation hint
pub(crate) fn report_error(out: &Formatter, context: &str, error: &Error) {
    out.error(&format!("{context}: {error}"));
    out.hint(&error.hint());
}

/// Build an object's public URL and probe it
///
/// An unreachable URL is a warning: the bucket may simply be private.
/// Returns whether the URL was reachable.
pub(crate) async fn check_public_url(session: &Session, path: &ObjectPath) -> bool {
    let url = match session.store.public_url(path) {
        Ok(url) => url,
        Err(e) => {
            session
                .out
                .warning(&format!("Could not build public URL for {path}: {e}"));
            return false;
        }
    };
    session.out.field("Public URL", &url);

    let result = session.prober.probe(&url).await;
    if result.accessible {
        session.out.success(&format!(
            "Public URL is reachable (HTTP {})",
            result.status_code
        ));
    } else if let Some(error) = result.error {
        session
            .out
            .warning(&format!("Public URL is not reachable: {error}"));
    } else {
        session.out.warning(&format!(
            "Public URL returned HTTP {}; the bucket may be private or blocked by its policy",
            result.status_code
        ));
    }
    result.accessible
}

/// Render a service timestamp for display
pub(crate) fn format_timestamp(raw: &str) -> String {
    match raw.parse::<jiff::Timestamp>() {
        Ok(ts) => ts.strftime("%Y-%m-%d %H:%M:%S UTC").to_string(),
        Err(_) => raw.to_string(),
    }
}

pub(crate) fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}

/// Milliseconds since the epoch, used for unique generated names
pub(crate) fn now_millis() -> i64 {
    jiff::Timestamp::now().as_millisecond()
}
