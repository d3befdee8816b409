//! Config subcommand handlers.

use std::path::PathBuf;

use aoi_config::Config;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output;

fn target_path(global: &GlobalOpts) -> PathBuf {
    global
        .config
        .clone()
        .unwrap_or_else(aoi_config::config_path)
}

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init { force } => {
            let path = target_path(global);
            if path.exists() && !force {
                return Err(CliError::ConfigExists {
                    path: path.display().to_string(),
                });
            }
            aoi_config::save_config_to(&Config::default(), &path)?;
            output::notice(
                &format!("Config written to {}", path.display()),
                global.quiet,
            );
            Ok(())
        }

        ConfigCommand::Show => {
            let cfg = config::resolve(global)?;
            let toml_str = toml::to_string_pretty(&cfg).map_err(aoi_config::ConfigError::from)?;
            let storage = cfg.storage_dir();
            let out = output::render_single(
                &global.output,
                &cfg,
                |_| format!("# storage: {}\n{}", storage.display(), toml_str.trim_end()),
                |c| c.geocoder.url.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            output::print_output(&target_path(global).display().to_string(), global.quiet);
            Ok(())
        }
    }
}
