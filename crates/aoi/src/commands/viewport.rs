//! Viewport command handlers.

use aoi_config::Config;
use aoi_core::{LatLng, Viewport, ViewportUpdate, format_coordinate};

use crate::cli::{GlobalOpts, ViewportArgs, ViewportCommand};
use crate::config;
use crate::error::CliError;
use crate::output;

fn detail(vp: &Viewport) -> String {
    format!(
        "Center:  {}, {}\nZoom:    {}",
        format_coordinate(vp.center.lat, 6),
        format_coordinate(vp.center.lng, 6),
        vp.zoom
    )
}

fn plain(vp: &Viewport) -> String {
    format!("{} {} {}", vp.center.lat, vp.center.lng, vp.zoom)
}

fn check_center(lat: f64, lng: f64) -> Result<(), CliError> {
    if !(-90.0..=90.0).contains(&lat) {
        return Err(CliError::Validation {
            field: "lat".into(),
            reason: format!("{lat} is outside -90..=90"),
        });
    }
    if !(-180.0..=180.0).contains(&lng) {
        return Err(CliError::Validation {
            field: "lng".into(),
            reason: format!("{lng} is outside -180..=180"),
        });
    }
    Ok(())
}

fn print_viewport(vp: &Viewport, global: &GlobalOpts) -> Result<(), CliError> {
    let out = output::render_single(&global.output, vp, detail, plain)?;
    output::print_output(&out, global.quiet);
    Ok(())
}

pub fn handle(cfg: &Config, args: ViewportArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let ws = config::open_workspace(cfg, false);
    let store = ws.store();

    match args.command {
        ViewportCommand::Show => print_viewport(&store.viewport(), global),

        ViewportCommand::Set { lat, lng, zoom } => {
            let current = store.viewport().center;
            let center = (lat.is_some() || lng.is_some())
                .then(|| LatLng::new(lat.unwrap_or(current.lat), lng.unwrap_or(current.lng)));
            if let Some(c) = center {
                check_center(c.lat, c.lng)?;
            }
            let update = ViewportUpdate { center, zoom };
            if update == ViewportUpdate::default() {
                return Err(CliError::Validation {
                    field: "viewport".into(),
                    reason: "pass at least one of --lat, --lng, --zoom".into(),
                });
            }
            if !store.set_viewport(update) {
                output::notice("Viewport unchanged", global.quiet);
            }
            print_viewport(&store.viewport(), global)
        }

        ViewportCommand::FlyTo { lat, lng, zoom } => {
            check_center(lat, lng)?;
            ws.fly_to(lat, lng, zoom);
            print_viewport(&store.viewport(), global)
        }

        ViewportCommand::Fit => {
            if !ws.fit_all() {
                output::notice("No areas to fit", global.quiet);
            }
            print_viewport(&store.viewport(), global)
        }
    }
}
