//! Draw command handlers.
//!
//! Replays the given positions through the drawing machine exactly as a
//! map would deliver clicks, so stored shapes match interactive ones.

use aoi_config::Config;
use aoi_core::{AoiId, DrawMode, Workspace};

use crate::cli::{DrawArgs, DrawCommand, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output;

use super::{areas, util};

fn check_position((lng, lat): (f64, f64)) -> Result<(f64, f64), CliError> {
    if !(-180.0..=180.0).contains(&lng) {
        return Err(CliError::Validation {
            field: "longitude".into(),
            reason: format!("{lng} is outside -180..=180"),
        });
    }
    if !(-90.0..=90.0).contains(&lat) {
        return Err(CliError::Validation {
            field: "latitude".into(),
            reason: format!("{lat} is outside -90..=90"),
        });
    }
    Ok((lng, lat))
}

/// Feed every position and close the shape, storing it under `name` and
/// `color` when given. `None` if the machine did not produce one.
fn replay(
    ws: &Workspace,
    mode: DrawMode,
    positions: &[(f64, f64)],
    name: Option<String>,
    color: Option<String>,
) -> Option<AoiId> {
    ws.start_drawing(mode);
    let mut shape = positions
        .iter()
        .find_map(|&(lng, lat)| ws.drawing().add_coordinate(lng, lat));
    if shape.is_none() && mode == DrawMode::Polygon {
        shape = ws.drawing().finish();
    }
    let Some(shape) = shape else {
        ws.cancel_drawing();
        return None;
    };
    Some(ws.commit_with(shape, name, color))
}

pub fn handle(cfg: &Config, args: DrawArgs, global: &GlobalOpts) -> Result<(), CliError> {
    if let Some(ref fill) = args.fill {
        util::validate_color(fill)?;
    }
    let name = args
        .name
        .map(|n| n.trim().to_owned())
        .filter(|n| !n.is_empty());

    let (mode, positions) = match args.command {
        DrawCommand::Point { position } => (DrawMode::Point, vec![position]),
        DrawCommand::Polygon { vertices } => (DrawMode::Polygon, vertices),
        DrawCommand::Rectangle { corner, opposite } => (DrawMode::Rectangle, vec![corner, opposite]),
    };
    let positions = positions
        .into_iter()
        .map(check_position)
        .collect::<Result<Vec<_>, _>>()?;

    let ws = config::open_workspace(cfg, args.dry_run);
    let fill = args.fill.map(|c| c.to_uppercase());
    let id = replay(&ws, mode, &positions, name, fill).ok_or_else(|| CliError::Validation {
        field: "positions".into(),
        reason: format!("could not build a {mode} from {} positions", positions.len()),
    })?;

    let aoi = ws
        .store()
        .get(&id)
        .ok_or_else(|| CliError::Internal(format!("area {id} vanished after drawing")))?;
    let color = output::should_color(&global.color);
    let out = output::render_single(
        &global.output,
        &aoi,
        |a| areas::detail(a, color),
        |a| a.id.to_string(),
    )?;
    output::print_output(&out, global.quiet);
    if args.dry_run {
        output::notice("Dry run: area not saved", global.quiet);
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use aoi_core::{EngineConfig, Geometry, MemoryStorage};

    use super::*;

    fn workspace() -> Workspace {
        Workspace::open(Arc::new(MemoryStorage::new()), EngineConfig::default())
    }

    #[test]
    fn polygon_replay_closes_ring() {
        let ws = workspace();
        let id = replay(
            &ws,
            DrawMode::Polygon,
            &[(7.0, 51.0), (7.1, 51.0), (7.05, 51.1)],
            None,
            None,
        )
        .unwrap();
        let aoi = ws.store().get(&id).unwrap();
        let ring = aoi.geometry.outer_ring().unwrap();
        assert_eq!(ring.len(), 4);
        assert_eq!(ring.first(), ring.last());
        assert_eq!(aoi.shape_kind(), Some("polygon"));
        assert!(!ws.drawing().is_drawing());
    }

    #[test]
    fn rectangle_replay_uses_two_corners() {
        let ws = workspace();
        let id = replay(&ws, DrawMode::Rectangle, &[(7.0, 51.0), (7.2, 51.1)], None, None).unwrap();
        let aoi = ws.store().get(&id).unwrap();
        assert_eq!(aoi.geometry.outer_ring().unwrap().len(), 5);
        assert_eq!(aoi.shape_kind(), Some("rectangle"));
    }

    #[test]
    fn point_replay_stores_point() {
        let ws = workspace();
        let id = replay(&ws, DrawMode::Point, &[(7.0, 51.0)], None, None).unwrap();
        assert!(matches!(ws.store().get(&id).unwrap().geometry, Geometry::Point(_)));
    }

    #[test]
    fn incomplete_polygon_is_cancelled() {
        let ws = workspace();
        assert!(replay(&ws, DrawMode::Polygon, &[(7.0, 51.0), (7.1, 51.0)], None, None).is_none());
        assert!(ws.store().is_empty());
        assert!(!ws.drawing().is_drawing());
    }

    #[test]
    fn name_and_color_are_stored_in_one_write() {
        let storage = Arc::new(MemoryStorage::new());
        let ws = Workspace::open(storage.clone(), EngineConfig::default());
        let id = replay(
            &ws,
            DrawMode::Rectangle,
            &[(7.0, 51.0), (7.2, 51.1)],
            Some("Depot".into()),
            Some("#112233".into()),
        )
        .unwrap();

        assert_eq!(storage.save_count(), 1);
        let saved = storage.saved_aois();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].id, id);
        assert_eq!(saved[0].name, "Depot");
        assert_eq!(saved[0].color, "#112233");
        assert_eq!(saved[0].shape_kind(), Some("rectangle"));
    }

    #[test]
    fn out_of_range_positions_are_rejected() {
        assert!(check_position((181.0, 0.0)).is_err());
        assert!(check_position((0.0, -91.0)).is_err());
        assert_eq!(check_position((-3.7, 40.4)).unwrap(), (-3.7, 40.4));
    }
}
