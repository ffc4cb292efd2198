mod cli;
mod config;
mod error;
mod format;
mod model;
mod systemd;
#[cfg(feature = "tui")]
mod tui;

use std::process::ExitCode;

use clap::Parser;

use crate::error::Error;
use crate::format::Palette;

fn main() -> ExitCode {
    let args = cli::Cli::parse();
    let cfg = config::load();
    let color = args.color.unwrap_or(cfg.color);

    match cli::run(args, &cfg) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let palette = Palette::new(color.enabled());
            eprintln!("{}", format::error_line(&err, &palette));
            ExitCode::from(exit_code(&err))
        }
    }
}

/// Being unable to launch the service manager at all is distinguished from an
/// ordinary command failure.
fn exit_code(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<Error>() {
        Some(Error::Spawn { .. }) => 2,
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawn_failures_exit_2() {
        let err = anyhow::Error::new(Error::Spawn {
            command: "systemctl".into(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        });
        assert_eq!(exit_code(&err), 2);
    }

    #[test]
    fn other_failures_exit_1() {
        let err = anyhow::Error::new(Error::UnitNotFound {
            unit: "x.service".into(),
        });
        assert_eq!(exit_code(&err), 1);

        let err = anyhow::anyhow!("anything else");
        assert_eq!(exit_code(&err), 1);
    }
}
