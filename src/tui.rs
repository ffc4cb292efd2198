//! Interactive mode: a unit list with single-key actions.
//!
//! Strictly synchronous request/respond/redraw: the loop blocks on one key
//! event, dispatches to the systemd adapter, then redraws. No background
//! refresh.

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame, Terminal,
};
use std::io;

use crate::config::Config;
use crate::model::{Unit, UnitKind};
use crate::systemd::{self, UnitAction};

const FILTER_CYCLE: [Option<UnitKind>; 4] = [
    None,
    Some(UnitKind::Service),
    Some(UnitKind::Timer),
    Some(UnitKind::Socket),
];

pub fn run(cfg: &Config) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).ok();

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;
    terminal.clear().ok();

    let result = App::new(cfg).run(&mut terminal);

    disable_raw_mode().ok();
    let mut stdout = io::stdout();
    execute!(stdout, LeaveAlternateScreen).ok();
    result
}

struct App<'a> {
    cfg: &'a Config,
    units: Vec<Unit>,
    list_state: ListState,
    filter_idx: usize,
    message: Option<String>,
    /// `Some` while the log popup is open.
    logs: Option<Vec<String>>,
    log_scroll: u16,
    should_quit: bool,
}

impl<'a> App<'a> {
    fn new(cfg: &'a Config) -> Self {
        let mut list_state = ListState::default();
        list_state.select(Some(0));
        Self {
            cfg,
            units: Vec::new(),
            list_state,
            filter_idx: 0,
            message: None,
            logs: None,
            log_scroll: 0,
            should_quit: false,
        }
    }

    fn run<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        self.refresh();
        while !self.should_quit {
            terminal.draw(|frame| render(frame, self))?;
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    self.handle_key(key.code);
                }
            }
        }
        Ok(())
    }

    fn filter(&self) -> Option<UnitKind> {
        FILTER_CYCLE[self.filter_idx]
    }

    fn refresh(&mut self) {
        match systemd::list_units(self.filter().map(UnitKind::as_str)) {
            Ok(units) => {
                self.units = units;
                let selected = self.list_state.selected().unwrap_or(0);
                if selected >= self.units.len() {
                    self.list_state
                        .select(Some(self.units.len().saturating_sub(1)));
                }
            }
            Err(err) => self.message = Some(format!("error: {err}")),
        }
    }

    fn handle_key(&mut self, code: KeyCode) {
        if self.logs.is_some() {
            match code {
                KeyCode::Char('q') | KeyCode::Char('l') | KeyCode::Esc => {
                    self.logs = None;
                    self.log_scroll = 0;
                }
                KeyCode::Char('j') | KeyCode::Down => {
                    self.log_scroll = self.log_scroll.saturating_add(1);
                }
                KeyCode::Char('k') | KeyCode::Up => {
                    self.log_scroll = self.log_scroll.saturating_sub(1);
                }
                _ => {}
            }
            return;
        }

        match code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('j') | KeyCode::Down => self.next(),
            KeyCode::Char('k') | KeyCode::Up => self.previous(),
            KeyCode::Char('g') => {
                self.refresh();
                self.message = Some("Refreshed".to_string());
            }
            KeyCode::Char('f') => {
                self.filter_idx = (self.filter_idx + 1) % FILTER_CYCLE.len();
                self.list_state.select(Some(0));
                self.refresh();
            }
            KeyCode::Char('s') => self.dispatch(UnitAction::Start),
            KeyCode::Char('x') => self.dispatch(UnitAction::Stop),
            KeyCode::Char('r') => self.dispatch(UnitAction::Restart),
            KeyCode::Char('e') => self.dispatch(UnitAction::Enable),
            KeyCode::Char('d') => self.dispatch(UnitAction::Disable),
            KeyCode::Char('l') => self.open_logs(),
            _ => {}
        }
    }

    fn next(&mut self) {
        let i = match self.list_state.selected() {
            Some(i) if i + 1 < self.units.len() => i + 1,
            _ => 0,
        };
        self.list_state.select(Some(i));
    }

    fn previous(&mut self) {
        let i = match self.list_state.selected() {
            Some(0) | None => self.units.len().saturating_sub(1),
            Some(i) => i - 1,
        };
        self.list_state.select(Some(i));
    }

    fn selected_unit(&self) -> Option<&Unit> {
        self.list_state.selected().and_then(|i| self.units.get(i))
    }

    fn dispatch(&mut self, action: UnitAction) {
        let Some(name) = self.selected_unit().map(|u| u.name.clone()) else {
            return;
        };
        // Failures land in the message line; the loop never crashes on them.
        self.message = Some(match systemd::apply(action, &name) {
            Ok(()) => format!("{} {name}", action.done_str()),
            Err(err) => format!("error: {err}"),
        });
        self.refresh();
    }

    fn open_logs(&mut self) {
        let Some(name) = self.selected_unit().map(|u| u.name.clone()) else {
            return;
        };
        match systemd::unit_logs(&name, self.cfg.log_lines) {
            Ok(lines) => {
                self.logs = Some(lines);
                self.log_scroll = 0;
            }
            Err(err) => self.message = Some(format!("error: {err}")),
        }
    }
}

fn render(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(3),
        ])
        .split(frame.area());

    render_unit_list(frame, chunks[0], app);
    render_message(frame, chunks[1], app.message.as_deref());
    render_footer(frame, chunks[2], app.logs.is_some());

    if let Some(logs) = &app.logs {
        render_log_popup(frame, logs, app.log_scroll);
    }
}

fn render_unit_list(frame: &mut Frame, area: Rect, app: &mut App) {
    let items: Vec<ListItem> = app
        .units
        .iter()
        .map(|unit| {
            let (symbol, color) = if unit.is_running() {
                ("●", Color::Green)
            } else if unit.is_failed() {
                ("✖", Color::Red)
            } else {
                ("○", Color::DarkGray)
            };
            let mark = match unit.enabled {
                Some(true) => Span::styled("✓", Style::default().fg(Color::Green)),
                Some(false) => Span::styled("✗", Style::default().fg(Color::Yellow)),
                None => Span::raw(" "),
            };
            ListItem::new(Line::from(vec![
                Span::styled(symbol, Style::default().fg(color)),
                Span::raw(format!(" {:<40} ", unit.name)),
                mark,
                Span::styled(
                    format!(" [{}::{}] ", unit.load_state, unit.sub_state),
                    Style::default().fg(Color::Gray),
                ),
                Span::raw(unit.description.clone()),
            ]))
        })
        .collect();

    let title = match app.filter() {
        Some(kind) => format!(" User Units ({}) ", kind.as_str()),
        None => " User Units ".to_string(),
    };

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(
            Style::default()
                .add_modifier(Modifier::BOLD)
                .bg(Color::DarkGray),
        )
        .highlight_symbol(">> ");

    frame.render_stateful_widget(list, area, &mut app.list_state);
}

fn render_message(frame: &mut Frame, area: Rect, message: Option<&str>) {
    if let Some(message) = message {
        let style = if message.starts_with("error:") {
            Style::default().fg(Color::Red)
        } else {
            Style::default().fg(Color::Cyan)
        };
        frame.render_widget(Paragraph::new(message).style(style), area);
    }
}

fn render_footer(frame: &mut Frame, area: Rect, showing_logs: bool) {
    let help = if showing_logs {
        Line::from(vec![
            Span::raw("Scroll: "),
            Span::styled("j/k ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("| Close: "),
            Span::styled("Esc/q/l", Style::default().fg(Color::Red)),
        ])
    } else {
        Line::from(vec![
            Span::raw("Nav: "),
            Span::styled("j/k ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("| Filter: "),
            Span::styled("f ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("| Refresh: "),
            Span::styled("g ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("| Logs: "),
            Span::styled("l ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("| "),
            Span::styled(
                "s(start) x(stop) r(restart) e(enable) d(disable) ",
                Style::default().fg(Color::Cyan),
            ),
            Span::raw("| Quit: "),
            Span::styled("q", Style::default().fg(Color::Red)),
        ])
    };
    frame.render_widget(
        Paragraph::new(help).block(Block::default().borders(Borders::ALL).title(" Controls ")),
        area,
    );
}

fn render_log_popup(frame: &mut Frame, logs: &[String], scroll: u16) {
    let area = centered_rect(80, 80, frame.area());
    frame.render_widget(Clear, area);

    let content: Vec<Line> = logs.iter().map(|l| Line::from(l.as_str())).collect();
    let paragraph = Paragraph::new(content)
        .block(Block::default().borders(Borders::ALL).title(" Journal "))
        .scroll((scroll, 0));
    frame.render_widget(paragraph, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
