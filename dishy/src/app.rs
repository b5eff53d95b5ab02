//! App state and main loop: input handling, pushed telemetry, background
//! fetches and drawing. Everything runs on one task, one event at a time.

use std::{fs, io, path::PathBuf, time::Duration};

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout as Split, Rect},
    Terminal,
};
use tokio::sync::mpsc;
use tokio::time::{interval, sleep, timeout, MissedTickBehavior};
use tracing::{debug, info, warn};
use url::Url;

use crate::dashboard::{Dashboard, Layout};
use crate::decoder::time_label;
use crate::error::DashError;
use crate::http::{fetch_initial_data, fetch_obstruction_map, http_base};
use crate::types::{Command, InitialData};
use crate::ui::{
    charts::draw_chart,
    header::draw_header,
    status::{draw_alerts, draw_commands, draw_map_status, MapStatus},
};
use crate::ws::{connect, recv_frame, send_command, WsStream};

pub const MAP_REFRESH: Duration = Duration::from_secs(60);
const RECONNECT_EVERY: Duration = Duration::from_secs(2);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const INPUT_POLL: Duration = Duration::from_millis(50);

pub struct AppConfig {
    pub url: String,
    pub layout: Layout,
    pub map_out: Option<PathBuf>,
}

// Results of the HTTP side fetches, handed back to the loop
enum Background {
    Initial(Result<InitialData, String>),
    Map(Result<Vec<u8>, String>),
}

pub struct App {
    config: AppConfig,
    base: Url,
    http: reqwest::Client,

    dashboard: Dashboard,
    model: Option<String>,
    offline: Option<String>,
    map: MapStatus,
    last_command: Option<String>,

    pending: Option<Command>,
    should_quit: bool,
}

impl App {
    pub fn new(config: AppConfig) -> Result<Self, DashError> {
        let base = http_base(&config.url)?;
        let dashboard = Dashboard::for_layout(config.layout)?;
        Ok(Self {
            config,
            base,
            http: reqwest::Client::new(),
            dashboard,
            model: None,
            offline: None,
            map: MapStatus::default(),
            last_command: None,
            pending: None,
            should_quit: false,
        })
    }

    pub async fn run(&mut self) -> anyhow::Result<()> {
        // Connect before touching the terminal so a bad URL fails plainly
        let ws = connect(&self.config.url).await?;
        info!(url = %self.config.url, "connected");

        // Terminal setup
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;

        // Main loop
        let res = self.event_loop(&mut terminal, Some(ws)).await;

        // Teardown
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        res
    }

    async fn event_loop<B: ratatui::backend::Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
        mut ws: Option<WsStream>,
    ) -> anyhow::Result<()> {
        let (tx, mut rx) = mpsc::unbounded_channel();
        self.spawn_initial_fetch(tx.clone());

        // First tick fires immediately: the startup image
        let mut map_timer = interval(MAP_REFRESH);
        map_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut reconnect = interval(RECONNECT_EVERY);
        reconnect.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            // Input (non-blocking)
            while event::poll(Duration::ZERO)? {
                if let Event::Key(k) = event::read()? {
                    if k.kind == KeyEventKind::Press {
                        self.on_key(k.code);
                    }
                }
            }
            if self.should_quit {
                break;
            }
            if let Some(cmd) = self.pending.take() {
                self.dispatch(&mut ws, cmd).await;
            }

            let offline = ws.is_none();
            tokio::select! {
                frame = next_frame(&mut ws) => match frame {
                    Ok(text) => self.on_frame(&text),
                    Err(e) => {
                        self.on_disconnect(&e);
                        ws = None;
                    }
                },
                Some(bg) = rx.recv() => self.on_background(bg),
                _ = map_timer.tick() => self.spawn_map_fetch(tx.clone()),
                _ = reconnect.tick(), if offline => {
                    match timeout(CONNECT_TIMEOUT, connect(&self.config.url)).await {
                        Ok(Ok(stream)) => {
                            self.on_reconnected();
                            ws = Some(stream);
                        }
                        Ok(Err(e)) => {
                            debug!("reconnect failed: {e}");
                            self.offline = Some(e.to_string());
                        }
                        Err(_) => self.offline = Some("connect timed out".into()),
                    }
                }
                _ = sleep(INPUT_POLL) => {}
            }

            terminal.draw(|f| self.draw(f))?;
        }

        Ok(())
    }

    fn on_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('R') => self.pending = Some(Command::Reboot),
            KeyCode::Char('s') => self.pending = Some(Command::Stow),
            KeyCode::Char('u') => self.pending = Some(Command::Unstow),
            _ => {}
        }
    }

    async fn dispatch(&mut self, ws: &mut Option<WsStream>, cmd: Command) {
        let outcome = match ws.as_mut() {
            Some(stream) => match send_command(stream, cmd).await {
                Ok(()) => {
                    info!(%cmd, "command sent");
                    format!("{cmd} sent at {}", time_label())
                }
                Err(e) => {
                    warn!(%cmd, "command failed: {e}");
                    format!("{cmd} failed: {e}")
                }
            },
            None => format!("{cmd} not sent: offline"),
        };
        self.last_command = Some(outcome);
    }

    fn on_frame(&mut self, text: &str) {
        match self.dashboard.handle_frame(text, time_label()) {
            Ok(Some(r)) => debug!(appended = r.appended, redrawn = r.redrawn, "tick"),
            Ok(None) => debug!("ignoring non-telemetry frame"),
            Err(e) => warn!("dropping tick: {e}"),
        }
    }

    // Lanes are kept; the reconnect timer takes over from here
    fn on_disconnect(&mut self, e: &DashError) {
        warn!("{e}");
        self.offline = Some(e.to_string());
    }

    fn on_reconnected(&mut self) {
        info!("reconnected");
        self.offline = None;
    }

    fn on_background(&mut self, bg: Background) {
        match bg {
            Background::Initial(Ok(data)) => {
                info!(model = %data.dishy_model, "initial data");
                self.model = Some(data.dishy_model);
            }
            Background::Initial(Err(e)) => warn!("initial data: {e}"),
            Background::Map(Ok(bytes)) => {
                self.map.fetched_at = Some(time_label());
                self.map.bytes = bytes.len();
                self.map.error = None;
                if let Some(path) = &self.config.map_out {
                    match fs::write(path, &bytes) {
                        Ok(()) => self.map.saved_to = Some(path.display().to_string()),
                        Err(e) => {
                            warn!("write {}: {e}", path.display());
                            self.map.error = Some(format!("write failed: {e}"));
                        }
                    }
                }
            }
            Background::Map(Err(e)) => {
                warn!("obstruction map: {e}");
                self.map.error = Some(e);
            }
        }
    }

    fn spawn_initial_fetch(&self, tx: mpsc::UnboundedSender<Background>) {
        let client = self.http.clone();
        let base = self.base.clone();
        tokio::spawn(async move {
            let res = fetch_initial_data(&client, &base)
                .await
                .map_err(|e| format!("{e:#}"));
            let _ = tx.send(Background::Initial(res));
        });
    }

    fn spawn_map_fetch(&self, tx: mpsc::UnboundedSender<Background>) {
        let client = self.http.clone();
        let base = self.base.clone();
        let buster = chrono::Utc::now().timestamp_millis();
        tokio::spawn(async move {
            let res = fetch_obstruction_map(&client, &base, buster)
                .await
                .map_err(|e| format!("{e:#}"));
            let _ = tx.send(Background::Map(res));
        });
    }

    pub fn draw(&self, f: &mut ratatui::Frame<'_>) {
        let area = f.area();

        // Root rows: header, charts, alerts/map/commands
        let rows = Split::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Min(8),
                Constraint::Length(6),
            ])
            .split(area);

        draw_header(
            f,
            rows[0],
            &self.dashboard,
            self.model.as_deref(),
            self.offline.as_deref(),
        );

        let charts = self.dashboard.charts();
        for (chart, cell) in charts.iter().zip(chart_cells(rows[1], charts.len())) {
            draw_chart(f, cell, chart);
        }

        let bottom = Split::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(40),
                Constraint::Percentage(35),
                Constraint::Percentage(25),
            ])
            .split(rows[2]);
        draw_alerts(f, bottom[0], self.dashboard.alerts());
        draw_map_status(f, bottom[1], &self.map);
        draw_commands(f, bottom[2], self.last_command.as_deref());
    }
}

async fn next_frame(ws: &mut Option<WsStream>) -> Result<String, DashError> {
    match ws {
        Some(stream) => recv_frame(stream).await,
        None => std::future::pending().await,
    }
}

/// Grid of at most two columns, filled row by row.
fn chart_cells(area: Rect, n: usize) -> Vec<Rect> {
    if n == 0 {
        return Vec::new();
    }
    let cols = n.min(2);
    let rows = n.div_ceil(cols);
    let row_rects = Split::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Ratio(1, rows as u32); rows])
        .split(area);
    row_rects
        .iter()
        .flat_map(|r| {
            Split::default()
                .direction(Direction::Horizontal)
                .constraints(vec![Constraint::Ratio(1, cols as u32); cols])
                .split(*r)
                .to_vec()
        })
        .take(n)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;

    fn app(layout: Layout) -> App {
        App::new(AppConfig {
            url: "ws://127.0.0.1:3000/ws".into(),
            layout,
            map_out: None,
        })
        .unwrap()
    }

    fn frame(i: usize) -> String {
        let inner = format!(
            r#"{{"pop_ping_latency_ms":{},"downlink_throughput_bps":{},"uplink_throughput_bps":1000000,"power_usage_watts":50,"fraction_obstructed":0.01,"state":"CONNECTED","alerts":{{"thermal_throttle":{}}}}}"#,
            20 + i,
            i * 1_000_000,
            i % 2 == 0
        );
        serde_json::json!({ "event": "data_update", "data": inner }).to_string()
    }

    #[test]
    fn chart_cells_fill_a_two_column_grid() {
        let area = Rect::new(0, 0, 100, 40);
        let four = chart_cells(area, 4);
        assert_eq!(four.len(), 4);
        assert_eq!(four[0], Rect::new(0, 0, 50, 20));
        assert_eq!(four[3], Rect::new(50, 20, 50, 20));
        let two = chart_cells(area, 2);
        assert!(two.iter().all(|r| r.height == 40));
        assert!(chart_cells(area, 0).is_empty());
    }

    #[test]
    fn keys_queue_commands_and_quit() {
        let mut a = app(Layout::Full);
        a.on_key(KeyCode::Char('s'));
        assert_eq!(a.pending, Some(Command::Stow));
        a.on_key(KeyCode::Char('r'));
        assert_eq!(a.pending, Some(Command::Stow), "lowercase r must not reboot");
        a.on_key(KeyCode::Char('R'));
        assert_eq!(a.pending, Some(Command::Reboot));
        a.on_key(KeyCode::Esc);
        assert!(a.should_quit);
    }

    #[tokio::test]
    async fn offline_dispatch_is_reported() {
        let mut a = app(Layout::Full);
        let mut ws = None;
        a.dispatch(&mut ws, Command::Unstow).await;
        assert_eq!(a.last_command.as_deref(), Some("unstow not sent: offline"));
    }

    #[test]
    fn frames_and_background_results_reach_the_screen() {
        let mut a = app(Layout::Full);
        for i in 0..3 {
            a.on_frame(&frame(i));
        }
        a.on_frame("garbage");
        a.on_background(Background::Initial(Ok(InitialData {
            dishy_model: "Standard Actuated".into(),
        })));
        a.on_background(Background::Map(Ok(vec![0; 2048])));

        assert_eq!(a.dashboard.ticks(), 3);
        assert_eq!(a.dashboard.dropped(), 1);
        assert_eq!(a.map.bytes, 2048);

        let mut terminal = Terminal::new(TestBackend::new(140, 40)).unwrap();
        terminal.draw(|f| a.draw(f)).unwrap();
        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains("Standard Actuated"));
        assert!(text.contains("CONNECTED"));
        assert!(text.contains("Latency"));
        assert!(text.contains("Obstruction"));
        assert!(text.contains("thermal_throttle"));
        assert!(text.contains("2.0KB"));
    }

    fn screen_text(a: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(140, 40)).unwrap();
        terminal.draw(|f| a.draw(f)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn lost_socket_keeps_lanes_and_shows_offline_until_reconnected() {
        let mut a = app(Layout::Full);
        for i in 0..5 {
            a.on_frame(&frame(i));
        }
        let lens: Vec<usize> = a
            .dashboard
            .lane_ids()
            .iter()
            .map(|&id| a.dashboard.lane(id).unwrap().len())
            .collect();

        a.on_disconnect(&DashError::TransportUnavailable("connection closed".into()));
        assert!(a.offline.as_deref().unwrap().contains("connection closed"));
        let after: Vec<usize> = a
            .dashboard
            .lane_ids()
            .iter()
            .map(|&id| a.dashboard.lane(id).unwrap().len())
            .collect();
        assert_eq!(lens, after);
        assert!(screen_text(&a).contains("offline:"));

        a.on_reconnected();
        a.on_frame(&frame(5));
        assert!(a.offline.is_none());
        assert_eq!(a.dashboard.lane(crate::history::LaneId::Latency).unwrap().len(), 6);
        assert!(!screen_text(&a).contains("offline:"));
    }

    #[test]
    fn map_image_is_written_when_requested() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("map.svg");
        let mut a = App::new(AppConfig {
            url: "ws://127.0.0.1:3000/ws".into(),
            layout: Layout::Legacy,
            map_out: Some(path.clone()),
        })
        .unwrap();
        a.on_background(Background::Map(Ok(b"<svg/>".to_vec())));
        assert_eq!(fs::read(&path).unwrap(), b"<svg/>");
        assert!(a.map.saved_to.is_some());

        a.on_background(Background::Map(Err("503".into())));
        assert_eq!(a.map.error.as_deref(), Some("503"));
    }
}
