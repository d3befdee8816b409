//! Shared helpers for command handlers.

use std::io::IsTerminal;

use aoi_core::{AoiId, AoiStore};

use crate::error::CliError;

/// Resolve an area reference to its id.
///
/// Accepts, in order: an exact id, a case-insensitive name (first match
/// wins), or a 1-based position in `areas list`. A name that looks like a
/// number shadows the position it spells.
pub fn resolve_area_id(store: &AoiStore, identifier: &str) -> Result<AoiId, CliError> {
    let snap = store.snapshot();

    let by_id = AoiId::from(identifier);
    if snap.get(&by_id).is_some() {
        return Ok(by_id);
    }

    if let Some(aoi) = snap
        .iter()
        .find(|aoi| aoi.name.eq_ignore_ascii_case(identifier))
    {
        return Ok(aoi.id.clone());
    }

    identifier
        .parse::<usize>()
        .ok()
        .and_then(|position| position.checked_sub(1))
        .and_then(|i| snap.iter().nth(i))
        .map(|aoi| aoi.id.clone())
        .ok_or_else(|| CliError::area_not_found(identifier))
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
///
/// Refuses instead of prompting when stdin is not a terminal.
pub fn confirm(message: &str, action: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

/// Reject anything but `#RRGGBB`.
pub fn validate_color(value: &str) -> Result<(), CliError> {
    if crate::output::is_hex_color(value) {
        Ok(())
    } else {
        Err(CliError::Validation {
            field: "color".into(),
            reason: format!("expected #RRGGBB, got '{value}'"),
        })
    }
}
