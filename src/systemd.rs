//! Shells out to `systemctl --user` and `journalctl --user` and parses their
//! textual output.
//!
//! All parsing is kept in free functions over `&str` so the format coupling
//! is pinned by tests against literal sample outputs. Every call is one
//! blocking subprocess invocation; nothing is cached between calls.

use std::collections::HashMap;
use std::ffi::OsStr;
use std::process::{Command, Output};

use crate::error::{Error, Result};
use crate::model::Unit;

const SYSTEMCTL: &str = "systemctl";
const JOURNALCTL: &str = "journalctl";

const SHOW_PROPERTIES: &str = "--property=LoadState,ActiveState,SubState,Description";

/// Lifecycle actions that map 1:1 onto `systemctl --user` subcommands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitAction {
    Start,
    Stop,
    Restart,
    Enable,
    Disable,
    Mask,
    Unmask,
}

impl UnitAction {
    pub fn as_str(self) -> &'static str {
        match self {
            UnitAction::Start => "start",
            UnitAction::Stop => "stop",
            UnitAction::Restart => "restart",
            UnitAction::Enable => "enable",
            UnitAction::Disable => "disable",
            UnitAction::Mask => "mask",
            UnitAction::Unmask => "unmask",
        }
    }

    /// Past-tense form for success messages ("Started foo.service").
    pub fn done_str(self) -> &'static str {
        match self {
            UnitAction::Start => "Started",
            UnitAction::Stop => "Stopped",
            UnitAction::Restart => "Restarted",
            UnitAction::Enable => "Enabled",
            UnitAction::Disable => "Disabled",
            UnitAction::Mask => "Masked",
            UnitAction::Unmask => "Unmasked",
        }
    }
}

fn run<S: AsRef<OsStr>>(program: &str, args: &[S]) -> Result<Output> {
    Command::new(program)
        .args(args)
        .output()
        .map_err(|source| Error::Spawn {
            command: program.to_string(),
            source,
        })
}

fn render_command<S: AsRef<OsStr>>(program: &str, args: &[S]) -> String {
    let mut rendered = String::from(program);
    for arg in args {
        rendered.push(' ');
        rendered.push_str(&arg.as_ref().to_string_lossy());
    }
    rendered
}

/// Verify the service manager is usable at all: the binary must launch, and a
/// user manager must be running (`systemctl --user status` exits 1 when not).
pub fn check_user_manager() -> Result<()> {
    let args = ["--version"];
    let output = run(SYSTEMCTL, &args)?;
    if !output.status.success() {
        return Err(Error::command_failed(render_command(SYSTEMCTL, &args), &output));
    }

    let args = ["--user", "status", "--no-pager"];
    let output = run(SYSTEMCTL, &args)?;
    if output.status.code() == Some(1) {
        return Err(Error::command_failed(render_command(SYSTEMCTL, &args), &output));
    }
    Ok(())
}

fn list_args(kind: Option<&str>) -> Vec<String> {
    let mut args: Vec<String> = ["--user", "list-units", "--all", "--no-pager", "--no-legend"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    if let Some(kind) = kind {
        args.push(format!("--type={kind}"));
    }
    args
}

/// List user units, optionally restricted to one unit type.
///
/// A nonzero systemctl exit yields an empty listing rather than an error; the
/// only hard failure here is being unable to launch systemctl at all.
pub fn list_units(kind: Option<&str>) -> Result<Vec<Unit>> {
    let output = run(SYSTEMCTL, &list_args(kind))?;
    if !output.status.success() {
        return Ok(Vec::new());
    }
    let mut units = parse_list_output(&String::from_utf8_lossy(&output.stdout));
    // One list-unit-files pass joined by name, not an is-enabled call per row.
    let states = unit_file_states()?;
    for unit in &mut units {
        unit.enabled = states.get(&unit.name).copied();
    }
    Ok(units)
}

/// Parse `list-units` output, one `Unit` per data line, input order preserved.
pub(crate) fn parse_list_output(stdout: &str) -> Vec<Unit> {
    stdout.lines().filter_map(parse_list_line).collect()
}

/// Split one listing line into name/load/active/sub plus the description
/// remainder. Header, footer, and summary lines do not fit the pattern and
/// are skipped, not errored.
fn parse_list_line(line: &str) -> Option<Unit> {
    // systemctl flags failed/inactive units with a leading marker column
    let line = line.trim_start_matches(['●', '○', '×', '*', '↻']);

    let (name, rest) = next_field(line)?;
    if !name.contains('.') {
        // "UNIT" header, "54 loaded units listed.", legend text
        return None;
    }
    let (load, rest) = next_field(rest)?;
    let (active, rest) = next_field(rest)?;
    let (sub, rest) = next_field(rest)?;
    Some(Unit::new(name, load, active, sub, rest.trim()))
}

fn next_field(s: &str) -> Option<(&str, &str)> {
    let s = s.trim_start();
    if s.is_empty() {
        return None;
    }
    match s.find(char::is_whitespace) {
        Some(end) => Some((&s[..end], &s[end..])),
        None => Some((s, "")),
    }
}

/// Whether the manager knows a unit file by this name.
///
/// `list-unit-files` prints a fixed summary line when the pattern matches
/// nothing; that is the only signal systemctl gives without an error exit.
pub fn unit_exists(name: &str) -> Result<bool> {
    let args = ["--user", "list-unit-files", "--no-pager", name];
    let output = run(SYSTEMCTL, &args)?;
    if !output.status.success() {
        return Ok(false);
    }
    Ok(files_listed(&String::from_utf8_lossy(&output.stdout)))
}

pub(crate) fn files_listed(stdout: &str) -> bool {
    !stdout.contains("0 unit files listed.")
}

/// Unit file states for every known unit, for joining enablement onto a
/// listing. A nonzero exit leaves enablement unknown rather than failing the
/// listing.
fn unit_file_states() -> Result<HashMap<String, bool>> {
    let args = ["--user", "list-unit-files", "--no-pager", "--no-legend"];
    let output = run(SYSTEMCTL, &args)?;
    if !output.status.success() {
        return Ok(HashMap::new());
    }
    Ok(parse_unit_files_output(&String::from_utf8_lossy(
        &output.stdout,
    )))
}

/// Parse `list-unit-files` output into name → enabled. Only the `enabled`
/// state counts as enabled; `disabled`, `static`, `masked`, and the rest are
/// all not.
pub(crate) fn parse_unit_files_output(stdout: &str) -> HashMap<String, bool> {
    let mut states = HashMap::new();
    for line in stdout.lines() {
        let Some((name, rest)) = next_field(line) else {
            continue;
        };
        if !name.contains('.') {
            // "UNIT FILE" header, "3 unit files listed." footer
            continue;
        }
        let Some((state, _)) = next_field(rest) else {
            continue;
        };
        states.insert(name.to_string(), state == "enabled");
    }
    states
}

/// Whether a unit is enabled. A nonzero exit means disabled (or static),
/// not an error.
pub fn is_enabled(name: &str) -> Result<bool> {
    let args = ["--user", "is-enabled", name];
    let output = run(SYSTEMCTL, &args)?;
    Ok(output.status.success() && String::from_utf8_lossy(&output.stdout).trim() == "enabled")
}

/// Detailed status for one unit, with enablement resolved via `is-enabled`.
///
/// Fails with `UnitNotFound` when the manager does not know the unit; never
/// returns a partially filled record.
pub fn unit_status(name: &str) -> Result<Unit> {
    if !unit_exists(name)? {
        return Err(Error::UnitNotFound {
            unit: name.to_string(),
        });
    }

    let args = ["--user", "show", SHOW_PROPERTIES, "--no-pager", name];
    let command = render_command(SYSTEMCTL, &args);
    let output = run(SYSTEMCTL, &args)?;
    if !output.status.success() {
        return Err(Error::command_failed(command, &output));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let (props, skipped) = parse_show_output(&stdout);
    if skipped > 0 {
        eprintln!("warning: skipped {skipped} malformed line(s) in `{command}` output");
    }
    if props.is_empty() {
        return Err(Error::Parse {
            command,
            context: "no KEY=VALUE properties in output".to_string(),
        });
    }
    if props.get("LoadState").map(String::as_str) == Some("not-found") {
        return Err(Error::UnitNotFound {
            unit: name.to_string(),
        });
    }

    let get = |key: &str| {
        props
            .get(key)
            .cloned()
            .unwrap_or_else(|| "unknown".to_string())
    };
    let mut unit = Unit::new(
        name,
        get("LoadState"),
        get("ActiveState"),
        get("SubState"),
        props.get("Description").cloned().unwrap_or_default(),
    );
    unit.enabled = Some(is_enabled(name)?);
    Ok(unit)
}

/// Parse `systemctl show` KEY=VALUE output. Returns the property map and the
/// count of lines that did not fit the shape (surfaced as a warning upstream).
pub(crate) fn parse_show_output(stdout: &str) -> (HashMap<String, String>, usize) {
    let mut props = HashMap::new();
    let mut skipped = 0;
    for line in stdout.lines() {
        if line.is_empty() {
            continue;
        }
        match line.split_once('=') {
            Some((key, value)) => {
                props.insert(key.to_string(), value.to_string());
            }
            None => skipped += 1,
        }
    }
    (props, skipped)
}

fn journalctl_args(name: &str, lines: u32) -> Vec<String> {
    vec![
        "--user".to_string(),
        "-u".to_string(),
        name.to_string(),
        "-n".to_string(),
        lines.to_string(),
        "--no-pager".to_string(),
    ]
}

/// The most recent journal lines for a unit, oldest first, unmodified.
pub fn unit_logs(name: &str, lines: u32) -> Result<Vec<String>> {
    if !unit_exists(name)? {
        return Err(Error::UnitNotFound {
            unit: name.to_string(),
        });
    }
    let args = journalctl_args(name, lines);
    let output = run(JOURNALCTL, &args)?;
    if !output.status.success() {
        return Err(Error::command_failed(render_command(JOURNALCTL, &args), &output));
    }
    Ok(String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::to_string)
        .collect())
}

/// Dispatch one lifecycle action. Success is purely the subprocess exit
/// status; on failure the manager's own stderr is carried in the error.
pub fn apply(action: UnitAction, name: &str) -> Result<()> {
    if !unit_exists(name)? {
        return Err(Error::UnitNotFound {
            unit: name.to_string(),
        });
    }
    let args = ["--user", action.as_str(), name];
    let output = run(SYSTEMCTL, &args)?;
    command_result(render_command(SYSTEMCTL, &args), &output)
}

pub(crate) fn command_result(command: String, output: &Output) -> Result<()> {
    if output.status.success() {
        Ok(())
    } else {
        Err(Error::command_failed(command, output))
    }
}
