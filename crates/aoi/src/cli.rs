//! Clap derive structures for the `aoi` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// aoi -- draw and manage Areas of Interest from the command line
#[derive(Debug, Parser)]
#[command(
    name = "aoi",
    version,
    about = "Draw and manage geographic Areas of Interest",
    long_about = "Draw points, polygons and rectangles as Areas of Interest,\n\
        keep them in a local collection, move the saved map viewport\n\
        and look up places through a Nominatim-compatible geocoder.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Config file (defaults to the platform config directory)
    #[arg(long, env = "AOI_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding the saved AOIs and viewport
    #[arg(long, env = "AOI_STORAGE_DIR", global = true)]
    pub storage_dir: Option<PathBuf>,

    /// Geocoder base URL (overrides config)
    #[arg(long, env = "AOI_GEOCODER_URL", global = true)]
    pub geocoder_url: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "AOI_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Geocoder request timeout in seconds (overrides config)
    #[arg(long, env = "AOI_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Inspect and edit saved Areas of Interest
    #[command(alias = "a")]
    Areas(AreasArgs),

    /// Draw a new Area of Interest
    #[command(alias = "d")]
    Draw(DrawArgs),

    /// Show or move the saved map viewport
    #[command(alias = "vp")]
    Viewport(ViewportArgs),

    /// Look up places by name
    #[command(alias = "s")]
    Search(SearchArgs),

    /// Look up the place at a position
    Reverse(ReverseArgs),

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Positions ────────────────────────────────────────────────────────

/// Parse `LNG,LAT` (GeoJSON order) into a pair of finite degrees.
pub fn parse_position(raw: &str) -> Result<(f64, f64), String> {
    let (lng, lat) = raw
        .split_once(',')
        .ok_or_else(|| format!("expected LNG,LAT but got '{raw}'"))?;
    let parse = |s: &str, axis: &str| {
        s.trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| format!("invalid {axis} '{}'", s.trim()))
    };
    Ok((parse(lng, "longitude")?, parse(lat, "latitude")?))
}

// ── Areas ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct AreasArgs {
    #[command(subcommand)]
    pub command: AreasCommand,
}

#[derive(Debug, Subcommand)]
pub enum AreasCommand {
    /// List saved areas in creation order
    #[command(alias = "ls")]
    List,

    /// Show one area (by id, name, or list number)
    Show { area: String },

    /// Rename an area
    Rename { area: String, name: String },

    /// Change an area's display color
    Recolor {
        area: String,
        /// Color as #RRGGBB
        #[arg(id = "new_color", value_name = "COLOR")]
        color: String,
    },

    /// Delete an area
    #[command(alias = "rm")]
    Remove { area: String },

    /// Delete every area
    Clear,

    /// Select an area and move the saved viewport onto it
    Focus { area: String },

    /// Write all areas as a GeoJSON FeatureCollection
    Export {
        /// Destination file (stdout when omitted)
        #[arg(long, short = 'f')]
        file: Option<PathBuf>,
    },
}

// ── Draw ─────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct DrawArgs {
    #[command(subcommand)]
    pub command: DrawCommand,

    /// Name for the new area (default: "Area N")
    #[arg(long, short = 'n', global = true)]
    pub name: Option<String>,

    /// Display color as #RRGGBB (default: random palette color)
    #[arg(long, global = true)]
    pub fill: Option<String>,

    /// Build the shape without saving it
    #[arg(long, global = true)]
    pub dry_run: bool,
}

#[derive(Debug, Subcommand)]
pub enum DrawCommand {
    /// A single position
    Point {
        /// LNG,LAT
        #[arg(value_parser = parse_position, allow_hyphen_values = true)]
        position: (f64, f64),
    },

    /// A closed polygon through three or more vertices
    Polygon {
        /// LNG,LAT for each vertex, in order
        #[arg(
            value_parser = parse_position,
            num_args = 3..,
            required = true,
            allow_hyphen_values = true
        )]
        vertices: Vec<(f64, f64)>,
    },

    /// An axis-aligned rectangle from two opposite corners
    #[command(alias = "rect")]
    Rectangle {
        /// LNG,LAT of the first corner
        #[arg(value_parser = parse_position, allow_hyphen_values = true)]
        corner: (f64, f64),
        /// LNG,LAT of the opposite corner
        #[arg(value_parser = parse_position, allow_hyphen_values = true)]
        opposite: (f64, f64),
    },
}

// ── Viewport ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ViewportArgs {
    #[command(subcommand)]
    pub command: ViewportCommand,
}

#[derive(Debug, Subcommand)]
pub enum ViewportCommand {
    /// Show the saved viewport
    Show,

    /// Change center and/or zoom
    Set {
        #[arg(long, allow_hyphen_values = true)]
        lat: Option<f64>,
        #[arg(long, allow_hyphen_values = true)]
        lng: Option<f64>,
        #[arg(long, short = 'z')]
        zoom: Option<u8>,
    },

    /// Center on a position at the fly-to zoom
    FlyTo {
        #[arg(allow_hyphen_values = true)]
        lat: f64,
        #[arg(allow_hyphen_values = true)]
        lng: f64,
        /// Zoom level (default from config)
        #[arg(long, short = 'z')]
        zoom: Option<u8>,
    },

    /// Center on the extent of every saved area
    Fit,
}

// ── Search ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Free-text place query
    #[arg(required = true, num_args = 1..)]
    pub query: Vec<String>,

    /// Maximum number of results (overrides config)
    #[arg(long, short = 'l')]
    pub limit: Option<u32>,

    /// Restrict to ISO country codes (repeatable); overrides config
    #[arg(long = "country", short = 'c')]
    pub countries: Vec<String>,

    /// Search worldwide, ignoring configured country codes
    #[arg(long, conflicts_with = "countries")]
    pub worldwide: bool,

    /// Fly the saved viewport to result N (1-based)
    #[arg(long)]
    pub go: Option<usize>,
}

#[derive(Debug, Args)]
pub struct ReverseArgs {
    #[arg(allow_hyphen_values = true)]
    pub lat: f64,
    #[arg(allow_hyphen_values = true)]
    pub lng: f64,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Write a config file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Display current resolved configuration
    Show,

    /// Print the config file location
    Path,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_tree_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn positions_are_lng_first() {
        assert_eq!(parse_position("7.05,51.1").unwrap(), (7.05, 51.1));
        assert_eq!(parse_position(" -3.7 , 40.4 ").unwrap(), (-3.7, 40.4));
    }

    #[test]
    fn bad_positions_are_rejected() {
        assert!(parse_position("7.05").is_err());
        assert!(parse_position("east,51").is_err());
        assert!(parse_position("NaN,51").is_err());
    }

    #[test]
    fn polygon_needs_three_vertices() {
        assert!(Cli::try_parse_from(["aoi", "draw", "polygon", "7,51", "7.1,51"]).is_err());
        let cli =
            Cli::try_parse_from(["aoi", "draw", "polygon", "7,51", "7.1,51", "7.05,51.1"]).unwrap();
        match cli.command {
            Command::Draw(DrawArgs {
                command: DrawCommand::Polygon { vertices },
                ..
            }) => assert_eq!(vertices.len(), 3),
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
