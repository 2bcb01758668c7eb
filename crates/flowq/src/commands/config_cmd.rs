//! Config subcommand handlers.

use flowq_config::Config;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

pub fn handle(args: &ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Show => {
            let cfg = flowq_config::load_config()?;
            let format = global.output.clone().unwrap_or(OutputFormat::Table);
            let out = match format {
                OutputFormat::Table | OutputFormat::Plain => flowq_config::to_toml(&cfg)?,
                structured => output::render_single(
                    &structured,
                    &cfg,
                    |_| Ok(String::new()),
                    |_| String::new(),
                )?,
            };
            output::print_output(out.trim_end(), global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            output::print_output(&flowq_config::config_path().display().to_string(), global.quiet);
            Ok(())
        }

        ConfigCommand::Init { force } => {
            let path = flowq_config::config_path();
            if path.exists() && !force {
                return Err(CliError::Validation {
                    field: "config".into(),
                    reason: format!("{} already exists (use --force to overwrite)", path.display()),
                });
            }
            let path = flowq_config::save_config(&Config::default())?;
            if !global.quiet {
                eprintln!("Config written to {}", path.display());
            }
            Ok(())
        }
    }
}
