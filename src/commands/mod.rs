//! Command dispatch and handlers.

pub mod apply;
pub mod destroy;
pub mod refresh;
pub mod show;
pub mod topology;

use std::env;
use std::path::PathBuf;

use tracing::debug;

use crate::cassette::config::CassetteConfig;
use crate::cli::{Command, GlobalArgs};
use crate::config::{self, ClientConfig, RECORD_ENV, REPLAY_ENV};
use crate::context::ServiceContext;

/// Dispatch a parsed command to its handler.
///
/// # Errors
///
/// Returns an error string if the selected command handler fails.
pub fn dispatch(global: &GlobalArgs, command: &Command) -> Result<(), String> {
    let state = state_file(global);
    debug!(state = %state.display(), "resolved state file");

    match command {
        Command::Apply { manifest, dry_run: true } => apply::preview(manifest, &state),
        Command::Apply { manifest, dry_run: false } => {
            apply::run_with_context(&connect(global)?, manifest, &state)
        }
        Command::Refresh => refresh::run_with_context(&connect(global)?, &state),
        Command::Destroy { link } => {
            destroy::run_with_context(&connect(global)?, &state, link.as_deref())
        }
        Command::Show => show::run(&state),
        Command::Topology { lab } => topology::run_with_context(&connect(global)?, lab),
    }
}

/// Builds the service context for commands that talk to the lab server.
///
/// `LABSYNC_REPLAY=<dir>` serves every call from cassettes and needs no
/// credentials. `LABSYNC_RECORD=<dir>` connects normally and records every
/// call into a timestamped directory under `<dir>`.
///
/// # Errors
///
/// Returns an error string if cassettes cannot be loaded, a connection
/// setting is missing, or the login fails.
pub fn connect(global: &GlobalArgs) -> Result<ServiceContext, String> {
    if let Some(dir) = env_dir(REPLAY_ENV) {
        debug!(dir = %dir.display(), "replaying cassettes");
        return ServiceContext::replaying_from(&CassetteConfig::from_dir(&dir)?);
    }

    let client = ClientConfig::from_env(&global.overrides()).map_err(|e| e.to_string())?;
    match env_dir(RECORD_ENV) {
        Some(dir) => ServiceContext::recording(&client, &dir),
        None => ServiceContext::live(&client)
            .map_err(|e| format!("failed to connect to {}: {e}", client.host)),
    }
}

fn state_file(global: &GlobalArgs) -> PathBuf {
    config::state_path(global.state.as_deref(), |key| env::var(key).ok())
}

fn env_dir(key: &str) -> Option<PathBuf> {
    env::var(key).ok().filter(|v| !v.trim().is_empty()).map(PathBuf::from)
}
