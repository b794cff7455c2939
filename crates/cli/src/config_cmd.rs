// config command

use std::path::Path;

use clap::Subcommand;

use geodash_config::Settings;

use crate::CliError;

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the settings file path
    Path,

    /// Print the effective settings as JSON
    Show,

    /// Write a commented settings file with the defaults
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

pub fn cmd_config(command: ConfigCommands, path: &Path, settings: &Settings) -> Result<(), CliError> {
    match command {
        ConfigCommands::Path => {
            println!("{}", path.display());
            Ok(())
        }
        ConfigCommands::Show => {
            let json = serde_json::to_string_pretty(settings)
                .map_err(|e| CliError::general(e.to_string()))?;
            println!("{}", json);
            Ok(())
        }
        ConfigCommands::Init { force } => {
            Settings::init(path, force).map_err(|e| {
                if path.exists() && !force {
                    CliError::usage(e).with_hint("pass --force to overwrite")
                } else {
                    CliError::output(e)
                }
            })?;
            eprintln!("wrote {}", path.display());
            Ok(())
        }
    }
}
