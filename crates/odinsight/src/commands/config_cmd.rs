//! Config subcommand handlers.

use odinsight_config::{Config, save_config};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output::Printer;

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let path = config::config_path(global);

    match args.command {
        ConfigCommand::Path => {
            let printer = Printer::new(global, &Config::default());
            printer.print(&path.display().to_string());
            Ok(())
        }

        ConfigCommand::Show => {
            let cfg = config::load(global)?;
            let printer = Printer::new(global, &cfg);
            let text = toml::to_string_pretty(&cfg)?;
            let out = printer.render_single(
                &cfg,
                |_| text.trim_end().to_owned(),
                |_| path.display().to_string(),
            )?;
            printer.print(&out);
            Ok(())
        }

        ConfigCommand::Init { force } => {
            if path.exists() && !force {
                return Err(CliError::ConfigExists {
                    path: path.display().to_string(),
                });
            }
            save_config(&Config::default(), &path)?;

            let printer = Printer::new(global, &Config::default());
            printer.note(&format!("Configuration written to {}", path.display()));
            printer.note("  Add [[sources]] entries to query your own backends first.");
            Ok(())
        }
    }
}
