//! Command dispatch: bridges CLI args -> engine operations -> output formatting.

pub mod areas;
pub mod config_cmd;
pub mod draw;
pub mod search;
pub mod util;
pub mod viewport;

use aoi_config::Config;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a storage- or geocoder-bound command to its handler.
pub async fn dispatch(cmd: Command, cfg: &Config, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Areas(args) => areas::handle(cfg, args, global),
        Command::Draw(args) => draw::handle(cfg, args, global),
        Command::Viewport(args) => viewport::handle(cfg, args, global),
        Command::Search(args) => search::handle(cfg, args, global).await,
        Command::Reverse(args) => search::reverse(cfg, args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Err(CliError::Internal(
            "command must be handled before dispatch".into(),
        )),
    }
}
