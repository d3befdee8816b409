//! Place search and reverse lookup handlers.

use std::fmt::Write as _;

use tabled::Tabled;

use aoi_api::SearchOptions;
use aoi_config::Config;
use aoi_core::{Geocoder, SearchResult, format_coordinate};

use crate::cli::{GlobalOpts, ReverseArgs, SearchArgs};
use crate::config;
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct ResultRow {
    #[tabled(rename = "#")]
    number: usize,
    #[tabled(rename = "Place")]
    name: String,
    #[tabled(rename = "Lat")]
    lat: String,
    #[tabled(rename = "Lng")]
    lng: String,
    #[tabled(rename = "Type")]
    kind: String,
}

fn kind_label(result: &SearchResult) -> String {
    match (&result.class, &result.kind) {
        (Some(class), Some(kind)) => format!("{class}/{kind}"),
        (Some(only), None) | (None, Some(only)) => only.clone(),
        (None, None) => String::new(),
    }
}

fn detail(result: &SearchResult, color: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", output::highlight(&result.display_name, color));
    let _ = write!(
        out,
        "  Location:  {}, {}",
        format_coordinate(result.location.lat, 6),
        format_coordinate(result.location.lng, 6)
    );
    let kind = kind_label(result);
    if !kind.is_empty() {
        let _ = write!(out, "\n  Type:      {kind}");
    }
    let _ = write!(
        out,
        "\n  Place ID:  {}",
        output::muted(&result.place_id.to_string(), color)
    );
    out
}

/// Per-invocation overrides on top of the configured search options.
fn search_options(base: &SearchOptions, args: &SearchArgs) -> SearchOptions {
    let mut options = base.clone();
    if let Some(limit) = args.limit {
        options.limit = limit;
    }
    if args.worldwide {
        options.country_codes.clear();
    } else if !args.countries.is_empty() {
        options.country_codes = args.countries.iter().map(|c| c.to_lowercase()).collect();
    }
    options
}

// ── Handlers ────────────────────────────────────────────────────────

pub async fn handle(cfg: &Config, args: SearchArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let query = args.query.join(" ");
    let query = query.trim();
    if query.is_empty() {
        return Err(CliError::Validation {
            field: "query".into(),
            reason: "must not be blank".into(),
        });
    }
    if args.limit == Some(0) {
        return Err(CliError::Validation {
            field: "limit".into(),
            reason: "must be at least 1".into(),
        });
    }

    let client = config::geocoder(cfg)?;
    let options = search_options(client.options(), &args);
    let client = client.with_options(options);

    tracing::info!(query, "searching");
    let results = Geocoder::search(&client, query).await?;

    if let Some(n) = args.go {
        let chosen = n
            .checked_sub(1)
            .and_then(|i| results.get(i))
            .ok_or_else(|| CliError::NotFound {
                resource_type: "result".into(),
                identifier: n.to_string(),
                list_command: format!("search {query}"),
            })?;
        let ws = config::open_workspace(cfg, false);
        ws.fly_to(chosen.location.lat, chosen.location.lng, None);
        output::notice(
            &format!("Viewport moved to {}", chosen.display_name),
            global.quiet,
        );
    }

    if results.is_empty() {
        output::notice(&format!("No places found for '{query}'"), global.quiet);
    }
    let out = output::render_list(
        &global.output,
        &results,
        |r| ResultRow {
            number: results
                .iter()
                .position(|x| std::ptr::eq(x, r))
                .map_or(0, |i| i + 1),
            name: r.display_name.clone(),
            lat: format_coordinate(r.location.lat, 5),
            lng: format_coordinate(r.location.lng, 5),
            kind: kind_label(r),
        },
        |r| format!("{} {}", r.location.lat, r.location.lng),
    )?;
    if !results.is_empty() {
        output::print_output(&out, global.quiet);
    }
    Ok(())
}

pub async fn reverse(cfg: &Config, args: ReverseArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let client = config::geocoder(cfg)?;
    let place = client
        .reverse(args.lat, args.lng)
        .await?
        .ok_or_else(|| CliError::NothingHere {
            lat: args.lat.to_string(),
            lng: args.lng.to_string(),
        })?;
    let result = SearchResult::try_from(place).map_err(CliError::from)?;

    let color = output::should_color(&global.color);
    let out = output::render_single(
        &global.output,
        &result,
        |r| detail(r, color),
        |r| r.display_name.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
