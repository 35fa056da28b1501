use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    DefaultTerminal, Frame, Terminal,
};
use std::time::{Duration, Instant};
use tracing::{info, warn};

use crate::config::Config;
use crate::settings::SharedSettings;
use crate::snapshot::SharedSnapshot;
use crate::supervisor::Supervisor;
use crate::ui::{render_dashboard, render_help_bar, render_status_bar, Panels, StatusLine};
use crate::widgets::{
    get_app_version, start_refresh, start_tail, BlockInfo, ChainInfo, InstanceInfo, LogDirLocator,
};

pub struct App {
    config: Config,
    settings: SharedSettings,
    snapshot: SharedSnapshot,
    panels: Panels,
    started: Instant,
    error: Option<String>,
    should_quit: bool,
}

impl App {
    pub fn new(config: Config, settings: SharedSettings, snapshot: SharedSnapshot) -> Self {
        Self {
            config,
            settings,
            snapshot,
            panels: Panels::default(),
            started: Instant::now(),
            error: None,
            should_quit: false,
        }
    }

    pub async fn run(mut self, mut terminal: DefaultTerminal) -> Result<()> {
        let mut supervisor = Supervisor::new();
        let result = match self.start(&mut terminal, &mut supervisor).await {
            Ok(()) => self.event_loop(&mut terminal, &mut supervisor).await,
            Err(e) => Err(e),
        };

        supervisor.shutdown().await;
        result
    }

    /// Show the empty dashboard, then start the widgets. The version probe
    /// may take up to the exec timeout.
    async fn start<B: Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
        supervisor: &mut Supervisor,
    ) -> Result<()> {
        terminal.draw(|frame| self.render(frame, 0))?;
        self.start_widgets(supervisor).await;
        Ok(())
    }

    /// Probe the node version, then start one task per widget.
    async fn start_widgets(&self, supervisor: &mut Supervisor) {
        let settings = self.settings.current();
        let version = get_app_version(&settings, &self.snapshot).await;

        supervisor.track(
            "instance",
            start_refresh(
                InstanceInfo::new(version),
                self.snapshot.clone(),
                self.settings.clone(),
                self.panels.instance.clone(),
                supervisor.token(),
            ),
        );
        supervisor.track(
            "chain",
            start_refresh(
                ChainInfo,
                self.snapshot.clone(),
                self.settings.clone(),
                self.panels.chain.clone(),
                supervisor.token(),
            ),
        );
        supervisor.track(
            "block",
            start_refresh(
                BlockInfo,
                self.snapshot.clone(),
                self.settings.clone(),
                self.panels.block.clone(),
                supervisor.token(),
            ),
        );

        let locator = LogDirLocator::new(&self.config.log_path);
        supervisor.track(
            "log",
            start_tail(
                &locator,
                &settings.log_category,
                self.panels.log.clone(),
                supervisor.token(),
                settings.log_poll_interval,
            ),
        );

        info!(widgets = supervisor.task_count(), "Widgets started");
    }

    async fn event_loop(
        &mut self,
        terminal: &mut DefaultTerminal,
        supervisor: &mut Supervisor,
    ) -> Result<()> {
        loop {
            let widgets = supervisor.task_count();
            terminal.draw(|frame| self.render(frame, widgets))?;

            if event::poll(Duration::from_millis(100))? {
                self.handle_events()?;
            }

            // A widget that cannot render takes the whole dashboard down
            if let Some(failure) = supervisor.poll_failure().await {
                return Err(failure.into());
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    fn handle_events(&mut self) -> Result<()> {
        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => {
                        self.should_quit = true;
                    }
                    KeyCode::Char('r') => self.reload_settings(),
                    _ => {}
                }
            }
        }
        Ok(())
    }

    fn reload_settings(&mut self) {
        match self.settings.reload() {
            Ok(()) => self.error = None,
            Err(e) => {
                warn!(error = %e, "Settings reload failed, keeping previous settings");
                self.error = Some(e.to_string());
            }
        }
    }

    fn render(&self, frame: &mut Frame, widgets: usize) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(frame.area());

        let settings = self.settings.current();

        render_status_bar(
            frame,
            chunks[0],
            &StatusLine {
                environment: self.config.environment.name(),
                uptime: self.started.elapsed(),
                refresh: settings.widget_interval,
                widgets,
                error: self.error.as_deref(),
            },
        );

        let log_title = format!(" {} log ", settings.log_category);
        render_dashboard(frame, chunks[1], &self.panels, &log_title);

        render_help_bar(frame, chunks[2]);
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use ratatui::backend::TestBackend;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;

    #[tokio::test]
    async fn test_dashboard_drawn_while_version_probe_hangs() {
        let dir = tempfile::tempdir().unwrap();
        let binary = dir.path().join("harmony");
        fs::write(&binary, "#!/bin/sh\nsleep 5\n").unwrap();
        fs::set_permissions(&binary, fs::Permissions::from_mode(0o755)).unwrap();

        let settings = SharedSettings::fixed(Settings {
            node_binary_dir: dir.path().to_path_buf(),
            node_binary_name: "harmony".to_string(),
            exec_timeout: Duration::from_secs(10),
            ..Settings::default()
        });
        let mut app = App::new(Config::select(""), settings, SharedSnapshot::default());
        let mut terminal = Terminal::new(TestBackend::new(80, 40)).unwrap();
        let mut supervisor = Supervisor::new();

        let started = tokio::time::timeout(
            Duration::from_millis(300),
            app.start(&mut terminal, &mut supervisor),
        )
        .await;
        assert!(started.is_err(), "version probe should still be running");
        assert_eq!(supervisor.task_count(), 0);

        let screen: String = terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(screen.contains("[q] quit"), "{}", screen);
        assert!(screen.contains(" Instance "), "{}", screen);
    }
}
