//! Table and status-block rendering for CLI output.
//!
//! All coloring funnels through an explicit [`Palette`] so `--color=never`,
//! `NO_COLOR`, and piped output stay plain. Cells are padded before styling;
//! escape sequences would otherwise break the width math.

use std::fmt::Display;

use crossterm::style::{Color, Stylize};

use crate::model::Unit;

const MIN_NAME_WIDTH: usize = 20;
const MIN_STATE_WIDTH: usize = 10;
const ENABLED_HEADING: &str = "ENABLED";

#[derive(Debug, Clone, Copy)]
pub struct Palette {
    enabled: bool,
}

impl Palette {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn paint(&self, text: &str, color: Color) -> String {
        if self.enabled {
            text.with(color).to_string()
        } else {
            text.to_string()
        }
    }

    pub fn bold(&self, text: &str) -> String {
        if self.enabled {
            text.bold().to_string()
        } else {
            text.to_string()
        }
    }

    /// Conventional systemctl-ish coloring of the active state.
    pub fn active_color(active_state: &str) -> Color {
        match active_state {
            "active" => Color::Green,
            "failed" => Color::Red,
            "inactive" => Color::Yellow,
            _ => Color::White,
        }
    }
}

/// Pad to a display width in chars, not bytes; multibyte names must not
/// shift the columns after them.
fn pad(text: &str, width: usize) -> String {
    let len = text.chars().count();
    let fill = width.saturating_sub(len);
    format!("{text}{}", " ".repeat(fill))
}

fn enabled_text(enabled: Option<bool>) -> &'static str {
    match enabled {
        Some(true) => "yes",
        Some(false) => "no",
        None => "-",
    }
}

fn enabled_color(enabled: Option<bool>) -> Color {
    match enabled {
        Some(true) => Color::Green,
        Some(false) => Color::Yellow,
        None => Color::White,
    }
}

/// Render units as a width-aligned table, one line per unit plus a header.
pub fn unit_table(units: &[Unit], palette: &Palette) -> Vec<String> {
    if units.is_empty() {
        return vec!["No units found.".to_string()];
    }

    let width_of = |f: fn(&Unit) -> &str, min: usize| {
        units
            .iter()
            .map(|u| f(u).chars().count())
            .max()
            .unwrap_or(0)
            .max(min)
    };
    let name_w = width_of(|u| &u.name, MIN_NAME_WIDTH);
    let load_w = width_of(|u| &u.load_state, MIN_STATE_WIDTH);
    let active_w = width_of(|u| &u.active_state, MIN_STATE_WIDTH);
    let sub_w = width_of(|u| &u.sub_state, MIN_STATE_WIDTH);
    let enabled_w = ENABLED_HEADING.len();

    let mut lines = Vec::with_capacity(units.len() + 1);
    lines.push(format!(
        "{} {} {} {} {} {}",
        palette.bold(&pad("UNIT", name_w)),
        palette.bold(&pad("LOAD", load_w)),
        palette.bold(&pad("ACTIVE", active_w)),
        palette.bold(&pad("SUB", sub_w)),
        palette.bold(ENABLED_HEADING),
        palette.bold("DESCRIPTION"),
    ));

    for unit in units {
        lines.push(format!(
            "{} {} {} {} {} {}",
            palette.paint(&pad(&unit.name, name_w), Palette::active_color(&unit.active_state)),
            pad(&unit.load_state, load_w),
            pad(&unit.active_state, active_w),
            pad(&unit.sub_state, sub_w),
            palette.paint(&pad(enabled_text(unit.enabled), enabled_w), enabled_color(unit.enabled)),
            unit.description,
        ));
    }
    lines
}

/// systemctl-style status block for one unit, with a recent journal excerpt.
pub fn status_block(unit: &Unit, logs: &[String], palette: &Palette) -> Vec<String> {
    let dot = palette.paint("●", Palette::active_color(&unit.active_state));
    let enabled = match unit.enabled {
        Some(true) => palette.paint("enabled", Color::Green),
        Some(false) => palette.paint("disabled", Color::Yellow),
        None => "unknown".to_string(),
    };

    let mut lines = vec![
        format!("{dot} {} - {}", palette.bold(&unit.name), unit.description),
        String::new(),
        format!("     Loaded: {}", unit.load_state),
        format!("     Active: {} ({})", unit.active_state, unit.sub_state),
        format!("    Enabled: {enabled}"),
    ];
    if !logs.is_empty() {
        lines.push(String::new());
        lines.extend(logs.iter().cloned());
    }
    lines
}

/// One-line error rendering for the dispatch boundary.
pub fn error_line(err: &impl Display, palette: &Palette) -> String {
    format!("{} {err}", palette.paint("error:", Color::Red))
}
