use anyhow::Result;
use chrono::NaiveDateTime;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use log::{debug, info, warn};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
    DefaultTerminal, Frame,
};
use rusqlite::Connection;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::time::Duration;

use crate::config::AppConfig;
use crate::db::repository::CompletionRepo;
use crate::db::store::{completed_for_day, toggle_completed};
use crate::models::{ActiveTiming, PrayerName};
use crate::prayer_times::{local_now, resolve_configured, tick, ResolvedDay};
use crate::tui::cards::{build_cards, PrayerCard};
use crate::tui::events::{spawn_resolution, Event, EventHandler, Ticker};
use crate::tui::theme;
use crate::tui::widgets::{countdown, header, prayers, statusbar};
use crate::utils::hijri::hijri_for_day;

const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Produces a resolved day for a given instant. Runs on a worker thread.
pub type ResolveJob = Arc<dyn Fn(NaiveDateTime) -> ResolvedDay + Send + Sync>;

#[derive(Debug, Clone, PartialEq)]
pub enum View {
    Dashboard,
    Help,
}

pub struct App {
    pub view: View,
    pub config: AppConfig,
    pub focus_idx: usize,
    pub should_quit: bool,
    pub message: Option<String>,

    // Current Islamic day (replaced wholesale by each accepted resolution)
    pub day: ResolvedDay,
    pub loading: bool,
    pub hijri_str: String,
    pub completed: HashSet<PrayerName>,

    // Refreshed every tick
    pub timing: Option<ActiveTiming>,
    pub now: NaiveDateTime,

    generation: u64,
    ticker: Option<Ticker>,
    tx: Sender<Event>,
    job: ResolveJob,
}

impl App {
    pub fn new(config: AppConfig, tx: Sender<Event>, job: ResolveJob, now: NaiveDateTime) -> Self {
        App {
            view: View::Dashboard,
            config,
            focus_idx: 0,
            should_quit: false,
            message: None,
            day: ResolvedDay::unavailable(),
            loading: false,
            hijri_str: String::new(),
            completed: HashSet::new(),
            timing: None,
            now,
            generation: 0,
            ticker: None,
            tx,
            job,
        }
    }

    #[cfg(test)]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[cfg(test)]
    pub fn is_ticking(&self) -> bool {
        self.ticker.is_some()
    }

    /// Start a new resolution pass. Anything still in flight from an older
    /// pass, and the old ticker, stop counting.
    pub fn begin_resolution(&mut self, now: NaiveDateTime) -> u64 {
        self.generation += 1;
        self.ticker = None;
        self.loading = true;

        let generation = self.generation;
        let job = Arc::clone(&self.job);
        spawn_resolution(generation, self.tx.clone(), move || job(now));
        debug!("resolution pass {} started", generation);
        generation
    }

    /// Accept a finished pass if it is the latest one. Returns whether it was
    /// applied.
    pub fn on_resolved(
        &mut self,
        generation: u64,
        day: ResolvedDay,
        now: NaiveDateTime,
        conn: &Connection,
    ) -> bool {
        if generation != self.generation {
            debug!("dropping stale resolution {} (current {})", generation, self.generation);
            return false;
        }

        self.loading = false;
        self.day = day;
        self.focus_idx = 0;
        self.hijri_str = self
            .day
            .day_key
            .map(|key| hijri_for_day(key, self.config.display.hijri_offset))
            .unwrap_or_default();
        self.load_completions(conn);

        if self.day.is_available() {
            self.message = None;
            self.ticker = Some(Ticker::start(generation, TICK_PERIOD, self.tx.clone()));
            self.on_tick(generation, now);
        } else {
            self.timing = None;
            self.message = Some("تعذر جلب أوقات الصلاة، اضغط r لإعادة المحاولة".to_string());
        }
        true
    }

    pub fn on_tick(&mut self, generation: u64, now: NaiveDateTime) {
        if generation != self.generation {
            return;
        }
        self.now = now;

        if self.day.schedule.has_ended(now) {
            info!("Islamic day {:?} has ended, resolving the next one", self.day.day_key);
            self.begin_resolution(now);
            return;
        }
        self.timing = tick(&self.day.schedule, now);
    }

    fn load_completions(&mut self, conn: &Connection) {
        self.completed = match self.day.day_key {
            Some(key) => completed_for_day(&CompletionRepo::new(conn), key).unwrap_or_else(|e| {
                warn!("could not load completions for {}: {}", key, e);
                HashSet::new()
            }),
            None => HashSet::new(),
        };
    }

    pub fn cards(&self) -> Vec<PrayerCard> {
        self.cards_at(self.now)
    }

    fn cards_at(&self, now: NaiveDateTime) -> Vec<PrayerCard> {
        build_cards(&self.day.schedule, self.timing.as_ref(), &self.completed, now)
    }

    pub fn handle_key(&mut self, key: KeyEvent, conn: &Connection, now: NaiveDateTime) {
        // Some terminals also report release/repeat
        if key.kind != KeyEventKind::Press {
            return;
        }
        match self.view {
            View::Dashboard => self.handle_dashboard_key(key, conn, now),
            View::Help => self.handle_help_key(key),
        }
    }

    fn handle_dashboard_key(&mut self, key: KeyEvent, conn: &Connection, now: NaiveDateTime) {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => {
                self.should_quit = true;
            }
            KeyCode::Char('?') => {
                self.view = View::Help;
            }
            KeyCode::Char('r') => {
                self.begin_resolution(now);
            }
            KeyCode::Up => {
                self.focus_idx = self.focus_idx.saturating_sub(1);
            }
            KeyCode::Down => {
                let max = self.day.schedule.display().len().saturating_sub(1);
                if self.focus_idx < max {
                    self.focus_idx += 1;
                }
            }
            KeyCode::Char('m') | KeyCode::Enter => {
                self.toggle_focused(conn, now);
            }
            _ => {}
        }
    }

    fn handle_help_key(&mut self, key: KeyEvent) {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?')) {
            self.view = View::Dashboard;
        }
    }

    /// Toggle the focused prayer on the day key of the day being shown. The
    /// prayer must have come by `now`, the moment of the key press.
    fn toggle_focused(&mut self, conn: &Connection, now: NaiveDateTime) {
        let Some(day_key) = self.day.day_key else {
            return;
        };
        let Some(card) = self.cards_at(now).into_iter().nth(self.focus_idx) else {
            return;
        };
        if !card.is_enabled {
            self.message = Some(format!("لم يحن وقت {} بعد", card.name.display_name()));
            return;
        }

        match toggle_completed(&CompletionRepo::new(conn), card.name, day_key) {
            Ok(done) => {
                info!("{} on {} marked {}", card.name.as_str(), day_key, done);
                self.message = None;
                self.load_completions(conn);
            }
            Err(e) => {
                warn!("could not save completion: {}", e);
                self.message = Some(format!("تعذر الحفظ: {}", e));
            }
        }
    }

    /// Release the ticker before the terminal goes away.
    pub fn shutdown(&mut self) {
        self.ticker = None;
    }

    pub fn draw(&self, frame: &mut Frame) {
        self.draw_dashboard(frame);
        if self.view == View::Help {
            self.draw_help_overlay(frame);
        }
    }

    fn draw_dashboard(&self, frame: &mut Frame) {
        let area = frame.area();

        // Clear background
        frame.render_widget(Block::default().style(theme::base()), area);

        let outer_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5), // header
                Constraint::Min(0),    // body
                Constraint::Length(1), // status bar
            ])
            .split(area);

        header::render(
            frame,
            outer_chunks[0],
            &self.config.location.name,
            self.day.day_key,
            &self.hijri_str,
        );
        statusbar::render(frame, outer_chunks[2], self.message.as_deref());

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(outer_chunks[1]);

        let left = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(7), Constraint::Min(0)])
            .split(columns[0]);

        prayers::render(frame, left[0], &self.cards(), self.focus_idx, self.loading);

        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(10), Constraint::Min(0)])
            .split(columns[1]);

        countdown::render(frame, right[0], self.timing.as_ref(), self.loading);
    }

    fn draw_help_overlay(&self, frame: &mut Frame) {
        let area = frame.area();

        // Center a help box
        let popup_area = Rect {
            x: area.width / 4,
            y: area.height / 4,
            width: area.width / 2,
            height: area.height / 2,
        };

        frame.render_widget(Clear, popup_area);

        let rows = [
            ("  [m] / Enter  ", "Toggle prayer done"),
            ("  [↑ ↓]        ", "Navigate prayers"),
            ("  [r]          ", "Fetch prayer times again"),
            ("  [?]          ", "Toggle help"),
            ("  [Esc] / [q]  ", "Quit"),
        ];

        let mut help_text = vec![
            Line::from(Span::styled(
                "  Keybindings",
                theme::gold().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
        ];
        for (key, label) in rows {
            help_text.push(Line::from(vec![
                Span::styled(key, theme::gold()),
                Span::styled(label, theme::dim()),
            ]));
        }
        help_text.push(Line::from(""));
        help_text.push(Line::from(Span::styled(
            "  A day runs from Fajr to the next Fajr.",
            theme::dim(),
        )));

        let block = Block::default()
            .title(Span::styled(" Help ", theme::gold()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::gold())
            .style(theme::surface());

        let paragraph = Paragraph::new(help_text).block(block);
        frame.render_widget(paragraph, popup_area);
    }
}

/// The production resolution job: configured source, cached through its own
/// database connection.
pub fn resolve_job(config: AppConfig, db_path: PathBuf) -> ResolveJob {
    Arc::new(move |now: NaiveDateTime| {
        let cache = Connection::open(&db_path)
            .map_err(|e| warn!("timings cache unavailable: {}", e))
            .ok();
        resolve_configured(&config, cache.as_ref(), now)
    })
}

/// Run the TUI event loop.
pub fn run(conn: Connection, config: AppConfig, db_path: PathBuf) -> Result<()> {
    let events = EventHandler::new();
    let job = resolve_job(config.clone(), db_path);
    let mut app = App::new(config, events.sender(), job, local_now());
    app.begin_resolution(local_now());

    let mut terminal = ratatui::init();
    events.listen_keys(250);
    let result = event_loop(&mut terminal, &mut app, &events, &conn);

    app.shutdown();
    ratatui::restore();
    result
}

fn event_loop(
    terminal: &mut DefaultTerminal,
    app: &mut App,
    events: &EventHandler,
    conn: &Connection,
) -> Result<()> {
    loop {
        terminal.draw(|frame| app.draw(frame))?;

        match events.next()? {
            Event::Key(key) => {
                app.handle_key(key, conn, local_now());
                if app.should_quit {
                    return Ok(());
                }
            }
            Event::Tick { generation } => {
                app.on_tick(generation, local_now());
            }
            Event::Resolved { generation, day } => {
                app.on_resolved(generation, day, local_now(), conn);
            }
        }
    }
}
