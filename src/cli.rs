use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use crossterm::style::Color;

use crate::config::{ColorMode, Config};
use crate::format::{self, Palette};
use crate::systemd::{self, UnitAction};

/// Journal lines appended to the `status` block.
const STATUS_LOG_LINES: u32 = 10;

#[derive(Debug, Parser)]
#[command(
    name = "userctl",
    version,
    about = "Manage systemd user units from the command line"
)]
pub struct Cli {
    /// When to color output
    #[arg(long, value_enum, global = true)]
    pub color: Option<ColorMode>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List user units
    List {
        /// Filter by unit type (service, timer, socket, ...)
        #[arg(long = "type")]
        kind: Option<String>,
        /// Print the listing as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show detailed status of a unit
    Status {
        unit: String,
        /// Print the status as JSON
        #[arg(long)]
        json: bool,
    },
    /// Start a unit
    Start { unit: String },
    /// Stop a unit
    Stop { unit: String },
    /// Restart a unit
    Restart { unit: String },
    /// Enable a unit
    Enable { unit: String },
    /// Disable a unit
    Disable { unit: String },
    /// Mask a unit so it cannot be started
    Mask { unit: String },
    /// Unmask a previously masked unit
    Unmask { unit: String },
    /// Show recent journal logs for a unit
    Logs {
        unit: String,
        /// Number of log lines to show (defaults to the configured value)
        #[arg(short = 'n', long)]
        lines: Option<u32>,
    },
    /// Browse and control units in a terminal UI
    Interactive,
}

pub fn run(args: Cli, cfg: &Config) -> Result<()> {
    let Some(command) = args.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    let palette = Palette::new(args.color.unwrap_or(cfg.color).enabled());

    // Fail fast when there is no systemctl or no user manager to talk to.
    systemd::check_user_manager()?;

    match command {
        Command::List { kind, json } => {
            let units = systemd::list_units(kind.as_deref())?;
            if json {
                println!("{}", serde_json::to_string_pretty(&units)?);
            } else {
                for line in format::unit_table(&units, &palette) {
                    println!("{line}");
                }
            }
        }
        Command::Status { unit, json } => {
            let detail = systemd::unit_status(&unit)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&detail)?);
            } else {
                let logs = match systemd::unit_logs(&unit, STATUS_LOG_LINES) {
                    Ok(logs) => logs,
                    Err(err) => {
                        eprintln!("warning: could not read journal for {unit}: {err}");
                        Vec::new()
                    }
                };
                for line in format::status_block(&detail, &logs, &palette) {
                    println!("{line}");
                }
            }
        }
        Command::Start { unit } => dispatch(UnitAction::Start, &unit, &palette)?,
        Command::Stop { unit } => dispatch(UnitAction::Stop, &unit, &palette)?,
        Command::Restart { unit } => dispatch(UnitAction::Restart, &unit, &palette)?,
        Command::Enable { unit } => dispatch(UnitAction::Enable, &unit, &palette)?,
        Command::Disable { unit } => dispatch(UnitAction::Disable, &unit, &palette)?,
        Command::Mask { unit } => dispatch(UnitAction::Mask, &unit, &palette)?,
        Command::Unmask { unit } => dispatch(UnitAction::Unmask, &unit, &palette)?,
        Command::Logs { unit, lines } => {
            for line in systemd::unit_logs(&unit, lines.unwrap_or(cfg.log_lines))? {
                println!("{line}");
            }
        }
        Command::Interactive => {
            #[cfg(feature = "tui")]
            crate::tui::run(cfg)?;
            #[cfg(not(feature = "tui"))]
            anyhow::bail!("this build does not include the interactive TUI");
        }
    }
    Ok(())
}

fn dispatch(action: UnitAction, unit: &str, palette: &Palette) -> Result<()> {
    systemd::apply(action, unit)?;
    println!(
        "{}",
        palette.paint(&format!("{} {unit}", action.done_str()), Color::Green)
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn list_accepts_type_filter() {
        let cli = Cli::try_parse_from(["userctl", "list", "--type", "timer"]).unwrap();
        match cli.command {
            Some(Command::List { kind, json }) => {
                assert_eq!(kind.as_deref(), Some("timer"));
                assert!(!json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn logs_lines_flag_is_optional() {
        let cli = Cli::try_parse_from(["userctl", "logs", "foo.service"]).unwrap();
        match cli.command {
            Some(Command::Logs { unit, lines }) => {
                assert_eq!(unit, "foo.service");
                assert_eq!(lines, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }

        let cli = Cli::try_parse_from(["userctl", "logs", "foo.service", "-n", "25"]).unwrap();
        match cli.command {
            Some(Command::Logs { lines, .. }) => assert_eq!(lines, Some(25)),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn color_flag_is_global() {
        let cli = Cli::try_parse_from(["userctl", "list", "--color", "never"]).unwrap();
        assert_eq!(cli.color, Some(ColorMode::Never));
    }

    #[test]
    fn no_subcommand_is_allowed() {
        let cli = Cli::try_parse_from(["userctl"]).unwrap();
        assert!(cli.command.is_none());
    }
}
