//! Area command handlers.

use std::fmt::Write as _;
use std::sync::Arc;

use tabled::Tabled;

use aoi_config::Config;
use aoi_core::{Aoi, AoiUpdate, feature_collection, format_coordinate};

use crate::cli::{AreasArgs, AreasCommand, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct AreaRow {
    #[tabled(rename = "#")]
    number: usize,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Color")]
    color: String,
    #[tabled(rename = "Center")]
    center: String,
    #[tabled(rename = "Created")]
    created: String,
}

fn center_label(aoi: &Aoi) -> String {
    aoi.bounds().map_or_else(String::new, |b| {
        let c = b.center();
        format!(
            "{}, {}",
            format_coordinate(c.lat, 5),
            format_coordinate(c.lng, 5)
        )
    })
}

fn area_row(number: usize, aoi: &Aoi, color: bool) -> AreaRow {
    AreaRow {
        number,
        name: aoi.name.clone(),
        kind: aoi
            .shape_kind()
            .unwrap_or_else(|| aoi.geometry.type_name())
            .to_owned(),
        color: output::swatch(&aoi.color, color),
        center: center_label(aoi),
        created: aoi
            .created_at
            .with_timezone(&chrono::Local)
            .format("%Y-%m-%d %H:%M")
            .to_string(),
    }
}

pub(crate) fn detail(aoi: &Aoi, color: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", output::highlight(&aoi.name, color));
    let _ = writeln!(out, "  ID:        {}", aoi.id);
    let _ = writeln!(
        out,
        "  Kind:      {}",
        aoi.shape_kind().unwrap_or_else(|| aoi.geometry.type_name())
    );
    let _ = writeln!(out, "  Geometry:  {}", aoi.geometry.type_name());
    let _ = writeln!(out, "  Vertices:  {}", aoi.geometry.positions().count());
    let _ = writeln!(out, "  Color:     {}", output::swatch(&aoi.color, color));
    if let Some(b) = aoi.bounds() {
        let _ = writeln!(out, "  Center:    {}", center_label(aoi));
        let _ = writeln!(
            out,
            "  Bounds:    {} W  {} S  {} E  {} N",
            format_coordinate(b.west, 5),
            format_coordinate(b.south, 5),
            format_coordinate(b.east, 5),
            format_coordinate(b.north, 5)
        );
    }
    let _ = write!(
        out,
        "  Created:   {}",
        output::muted(&aoi.created_at.to_rfc3339(), color)
    );
    out
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(cfg: &Config, args: AreasArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let ws = config::open_workspace(cfg, false);
    let store = ws.store();
    let color = output::should_color(&global.color);

    match args.command {
        AreasCommand::List => {
            let snap = store.snapshot();
            let aois: Vec<Arc<Aoi>> = snap.iter().cloned().collect();
            let out = output::render_list(
                &global.output,
                &aois,
                |aoi| {
                    let number = snap.aois.get_index_of(&aoi.id).map_or(0, |i| i + 1);
                    area_row(number, aoi, color)
                },
                |aoi| aoi.id.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        AreasCommand::Show { area } => {
            let id = util::resolve_area_id(store, &area)?;
            let aoi = store.get(&id).ok_or_else(|| CliError::area_not_found(&area))?;
            let out = output::render_single(
                &global.output,
                &aoi,
                |a| detail(a, color),
                |a| a.id.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        AreasCommand::Rename { area, name } => {
            let name = name.trim().to_owned();
            if name.is_empty() {
                return Err(CliError::Validation {
                    field: "name".into(),
                    reason: "must not be empty".into(),
                });
            }
            let id = util::resolve_area_id(store, &area)?;
            store.update(
                &id,
                AoiUpdate {
                    name: Some(name.clone()),
                    ..AoiUpdate::default()
                },
            );
            output::notice(&format!("Renamed to '{name}'"), global.quiet);
            Ok(())
        }

        AreasCommand::Recolor { area, color: hex } => {
            util::validate_color(&hex)?;
            let id = util::resolve_area_id(store, &area)?;
            store.update(
                &id,
                AoiUpdate {
                    color: Some(hex.to_uppercase()),
                    ..AoiUpdate::default()
                },
            );
            output::notice("Color updated", global.quiet);
            Ok(())
        }

        AreasCommand::Remove { area } => {
            let id = util::resolve_area_id(store, &area)?;
            let name = store.get(&id).map(|a| a.name.clone()).unwrap_or_default();
            if !util::confirm(&format!("Delete area '{name}'?"), "areas remove", global.yes)? {
                return Ok(());
            }
            store.remove(&id);
            output::notice(&format!("Removed '{name}'"), global.quiet);
            Ok(())
        }

        AreasCommand::Clear => {
            let count = store.len();
            if count == 0 {
                output::notice("No areas to clear", global.quiet);
                return Ok(());
            }
            if !util::confirm(
                &format!("Delete all {count} areas? This cannot be undone."),
                "areas clear",
                global.yes,
            )? {
                return Ok(());
            }
            store.clear();
            output::notice(&format!("Removed {count} areas"), global.quiet);
            Ok(())
        }

        AreasCommand::Focus { area } => {
            let id = util::resolve_area_id(store, &area)?;
            ws.focus(&id);
            let vp = store.viewport();
            output::notice(
                &format!(
                    "Viewport centered on {}, {}",
                    format_coordinate(vp.center.lat, 6),
                    format_coordinate(vp.center.lng, 6)
                ),
                global.quiet,
            );
            Ok(())
        }

        AreasCommand::Export { file } => {
            let aois: Vec<Arc<Aoi>> = store.aois();
            let collection = feature_collection(aois.iter().map(|a| &**a));
            let text = output::render_json(&collection, false)?;
            match file {
                Some(path) => {
                    std::fs::write(&path, format!("{text}\n"))?;
                    output::notice(
                        &format!("Exported {} areas to {}", aois.len(), path.display()),
                        global.quiet,
                    );
                }
                None => output::print_output(&text, false),
            }
            Ok(())
        }
    }
}
