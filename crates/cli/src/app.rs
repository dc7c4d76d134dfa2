//! Startup and the menu loop
//!
//! Validates the environment, builds the session, probes the service
//! endpoint, then serves menu choices until the user exits or input ends.

use sdiag_core::{
    CheckStatus, ColorMode, ConfigManager, Credentials, Reachability, ReachabilityProbe as _,
    Settings,
};
use sdiag_rest::{HttpProber, StorageClient};

use crate::commands::{Cli, MenuCommand, dispatch, render_menu};
use crate::input::StdinInput;
use crate::outcome::Outcome;
use crate::output::{Formatter, OutputConfig};
use crate::session::Session;
use crate::workspace::TempWorkspace;

/// Run the whole interactive session
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let (mut settings, settings_error) = match ConfigManager::new().and_then(|m| m.load()) {
        Ok(settings) => (settings, None),
        Err(e) => (Settings::default(), Some(e)),
    };
    if let Some(dir) = &cli.temp_dir {
        settings.defaults.temp_dir = dir.to_string_lossy().into_owned();
    }
    if let Some(secs) = cli.probe_timeout {
        settings.defaults.probe_timeout_secs = secs;
    }

    let no_color = color_disabled(settings.color_mode(), cli.no_color);
    if !no_color && settings.color_mode() == ColorMode::Always {
        console::set_colors_enabled(true);
        console::set_colors_enabled_stderr(true);
    }
    let out = Formatter::new(OutputConfig {
        no_color,
        no_progress: cli.no_progress,
    });
    out.header(concat!("Storage Diagnostics v", env!("CARGO_PKG_VERSION")));
    if let Some(e) = settings_error {
        out.warning(&format!("Could not load settings ({e}); using defaults"));
    }

    out.section("Configuration");
    let validation = Credentials::new(cli.url, cli.service_key, cli.anon_key).validate();
    for check in &validation.checks {
        match check.status {
            CheckStatus::Pass => out.success(&check.message),
            CheckStatus::Warn => out.warning(&check.message),
            CheckStatus::Fail => out.error(&check.message),
        }
    }
    let Some(config) = validation.config.clone() else {
        out.error("Configuration is incomplete; set the variables above (or a .env file) and restart");
        return Ok(());
    };
    tracing::debug!(?config, "configuration validated");

    let store = StorageClient::new(&config)?;
    let prober = HttpProber::new(settings.probe_timeout())?;

    report_endpoint(&out, &prober.probe(config.base_url()).await);

    let mut session = Session {
        config,
        checks: validation.checks,
        workspace: TempWorkspace::new(&settings.defaults.temp_dir),
        settings,
        store: Box::new(store),
        prober: Box::new(prober),
        input: Box::new(StdinInput::new()),
        out,
    };
    run_menu(&mut session).await
}

/// Whether colors are off; the flag wins over the settings file
fn color_disabled(mode: ColorMode, no_color_flag: bool) -> bool {
    no_color_flag || mode == ColorMode::Never
}

/// Print the startup reachability of the service endpoint
fn report_endpoint(out: &Formatter, endpoint: &Reachability) {
    match (&endpoint.error, endpoint.accessible) {
        (Some(error), _) => out.warning(&format!(
            "Service endpoint not reachable ({error}); operations will probably fail"
        )),
        (None, true) => out.success(&format!(
            "Service endpoint responded (HTTP {})",
            endpoint.status_code
        )),
        (None, false) => out.warning(&format!(
            "Service endpoint returned HTTP {}; check the project URL and service status",
            endpoint.status_code
        )),
    }
}

/// Serve menu choices until exit or end of input
pub async fn run_menu(session: &mut Session) -> anyhow::Result<()> {
    loop {
        session.out.println("");
        session.out.println(&render_menu());
        let command = match session.read_line("Choose an option (1-9)").await? {
            None => {
                session.out.println("");
                MenuCommand::Exit
            }
            Some(line) => match MenuCommand::from_choice(&line) {
                Some(command) => command,
                None => {
                    session
                        .out
                        .error(&format!("Invalid option '{}'; choose 1-9", line.trim()));
                    continue;
                }
            },
        };

        match dispatch(command, session).await {
            Ok(Outcome::Exit) => return Ok(()),
            Ok(outcome) => tracing::debug!(?command, %outcome, "handler finished"),
            Err(e) => {
                session.out.error(&format!(
                    "Unexpected error during '{}': {e:#}",
                    command.description()
                ));
                if let Some(err) = e.downcast_ref::<sdiag_core::Error>()
                    && err.is_remote()
                {
                    session.out.hint(&err.hint());
                }
                tracing::error!(?command, error = %e, "handler failed");
            }
        }
    }
}
