//! Terminal UI for `EcoTrack`: find collection points on a map, browse green jobs,
//! and ask the recycling assistants.

mod app;
mod input;
mod ui;

use std::{
    fs::OpenOptions,
    io,
    process::{Command, ExitStatus, Stdio},
    sync::{Arc, Mutex},
    time::Duration as StdDuration,
};

use anyhow::{Context, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event as CEvent, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use reqwest::{Client, Url};
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::task::{self, JoinHandle};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use ecotrack_core::{
    EcoTrackService, TextGenerator,
    config::{AppConfig, load_app_config},
};
use ecotrack_provider_gemini::GeminiClient;
use ecotrack_provider_osm::OsmTileProvider;

use crate::app::{App, ChatReply, InputMode};
use crate::input::Action;

#[tokio::main]
async fn main() -> Result<()> {
    let config = load_app_config()?;
    init_logging(&config)?;
    info!(?config, "starting ecotrack");

    // HTTP + service setup
    let client = Client::builder()
        .user_agent("ecotrack/0.1")
        .timeout(StdDuration::from_secs(config.http_timeout_secs))
        .build()?;

    let generator = match config.gemini_api_key.as_deref() {
        Some(key) => {
            let gemini = GeminiClient::with_base_url(
                client.clone(),
                key,
                &config.gemini_model,
                &config.gemini_base_url,
            )?;
            Some(Arc::new(gemini) as Arc<dyn TextGenerator>)
        }
        None => {
            warn!("ECOTRACK_GEMINI_API_KEY is not set; assistants will apologise");
            None
        }
    };
    let service = Arc::new(EcoTrackService::with_fixtures(generator));

    let provider = OsmTileProvider::new(client, &config.tile_base_url)?;
    let locator = service.locator(provider, config.home);

    // App state
    let (chat_tx, chat_rx) = mpsc::unbounded_channel();
    let app = App::new(service, locator, chat_tx);

    // Terminal init
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run event loop
    let res = run(&mut terminal, app, chat_rx).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    res
}

fn init_logging(config: &AppConfig) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_path)
        .with_context(|| format!("cannot open log file {}", config.log_path.display()))?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

async fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    mut app: App,
    mut chat_rx: UnboundedReceiver<ChatReply>,
) -> Result<()> {
    // Show the list while the map loads
    terminal.draw(|frame| ui::draw(frame, &app))?;
    if let Err(err) = app.locator.mount().await {
        warn!(error = %err, "map unavailable, continuing with the list only");
        app.error_message = Some("Map unavailable, showing the list only".into());
    }

    loop {
        while let Ok(reply) = chat_rx.try_recv() {
            app.finish_chat(reply);
        }

        // Draw current UI
        terminal.draw(|frame| ui::draw(frame, &app))?;

        // Poll for input (non-blocking, small timeout to keep CPU low)
        if !event::poll(StdDuration::from_millis(100))? {
            continue;
        }
        let action = match event::read()? {
            CEvent::Key(key) if key.kind == KeyEventKind::Press => {
                input::handle_key_event(key, &mut app)
            }
            CEvent::Mouse(mouse) => input::handle_mouse_event(mouse, &mut app),
            _ => Action::None,
        };

        match action {
            Action::Quit => break,
            Action::None => {}
            Action::OpenDirections => {
                let Some(url) = app.directions() else {
                    app.error_message = Some("Select a collection point first".into());
                    continue;
                };
                match open_in_browser(&url) {
                    Ok(()) => app.status_message = Some(format!("Opened {url}")),
                    Err(err) => {
                        warn!(%url, error = %err, "could not launch the browser");
                        app.error_message = Some(format!("Could not open {url}: {err}"));
                    }
                }
            }
            Action::SubmitChat => {
                let Some((assistant, request)) = app.begin_chat() else {
                    continue;
                };
                app.mode = InputMode::Normal;

                let service = Arc::clone(&app.service);
                let reply_tx = app.chat_tx.clone();
                tokio::spawn(async move {
                    let outcome = service.generate(&request).await;
                    if reply_tx.send(ChatReply { assistant, outcome }).is_err() {
                        debug!("chat reply arrived after shutdown");
                    }
                });
            }
        }
    }

    app.locator.unmount();
    info!("ecotrack stopped");
    Ok(())
}

fn open_in_browser(url: &Url) -> io::Result<()> {
    let mut command = if cfg!(target_os = "macos") {
        Command::new("open")
    } else if cfg!(target_os = "windows") {
        let mut shell = Command::new("cmd");
        shell.args(["/C", "start", ""]);
        shell
    } else {
        Command::new("xdg-open")
    };
    command.arg(url.as_str());
    launch(command).map(|_reaper| ())
}

// Spawns detached from the terminal and waits for the child off the UI thread
// so it never lingers as a zombie.
fn launch(mut command: Command) -> io::Result<JoinHandle<io::Result<ExitStatus>>> {
    let mut child = command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;
    Ok(task::spawn_blocking(move || {
        let status = child.wait();
        if let Ok(status) = &status {
            debug!(%status, "opener exited");
        }
        status
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[tokio::test]
    async fn launched_opener_is_waited_for() {
        let status = launch(Command::new("true"))
            .expect("spawn true")
            .await
            .expect("reaper task")
            .expect("wait");

        assert!(status.success());
    }

    #[tokio::test]
    async fn missing_opener_reports_spawn_error() {
        let err = launch(Command::new("ecotrack-no-such-opener")).expect_err("not on PATH");

        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
