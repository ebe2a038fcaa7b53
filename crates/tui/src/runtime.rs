//! Runtime: terminal lifecycle, event loop, and effect execution.
//!
//! A dedicated task blocks on `crossterm` input and forwards events over a
//! channel; data loads and icon resolution run as one-shot tasks reporting
//! back as messages. All state changes happen on the event loop, which keeps
//! the persisted store single-writer.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tokio::sync::mpsc::{self, UnboundedSender};
use tokio::{signal, time};
use tracing::{info, warn};

use lumebar_types::ActionMessage;
use lumebar_util::{CachedIconResolver, GlyphIconResolver, IconResolver, UiStateStore};

use crate::app::{App, Effect, Msg};
use crate::components::{BarComponent, Component};
use crate::source::{self, DataSource};

/// Configuration for one TUI run.
pub struct RunOptions {
    /// Where the data document comes from; `None` starts empty.
    pub source: Option<DataSource>,
    /// Injected persistence capability.
    pub ui_state: Arc<UiStateStore>,
    /// Refetch file sources when they change on disk.
    pub watch: bool,
    /// Outbound transport for data actions. `None` logs dispatches instead.
    pub action_tx: Option<UnboundedSender<ActionMessage>>,
}

/// Entry point for the TUI runtime: sets up the terminal, spawns the event
/// producers, runs the event loop, and restores the terminal on exit.
pub async fn run_app(options: RunOptions) -> Result<()> {
    let mut input_receiver = spawn_input_task();
    let mut app = App::new(Arc::clone(&options.ui_state));
    let mut bar = BarComponent::default();
    let icons = Arc::new(CachedIconResolver::new(GlyphIconResolver));
    let (msg_tx, mut msg_rx) = mpsc::unbounded_channel::<Msg>();

    let (watch_tx, mut watch_rx) = mpsc::unbounded_channel::<()>();
    let _watcher = match (&options.source, options.watch) {
        (Some(data_source), true) => match data_source.watch_path() {
            Some(path) => Some(source::spawn_watcher(path, watch_tx)?),
            None => {
                warn!("--watch only applies to file sources");
                None
            }
        },
        _ => None,
    };

    let mut effects: Vec<Effect> = vec![Effect::ResolveIcons(vec![
        "arrows-in-simple".to_string(),
        "arrows-out-simple".to_string(),
    ])];
    if options.source.is_some() {
        effects.push(Effect::ReloadData);
    }

    let mut terminal = setup_terminal()?;
    let mut ticker = time::interval(Duration::from_millis(250));
    ticker.set_missed_tick_behavior(time::MissedTickBehavior::Delay);
    render(&mut terminal, &mut app, &mut bar)?;

    'event_loop: loop {
        let mut needs_render = !effects.is_empty();

        if effects.is_empty() {
            tokio::select! {
                maybe_event = input_receiver.recv() => {
                    let Some(input_event) = maybe_event else { break };
                    match input_event {
                        Event::Key(key)
                            if key.code == KeyCode::Char('c')
                                && key.modifiers.contains(KeyModifiers::CONTROL) =>
                        {
                            break;
                        }
                        Event::Key(key) => effects.extend(bar.handle_key_events(&mut app, key)),
                        Event::Resize(width, height) => {
                            effects.extend(app.update(Msg::Resize(width, height)));
                        }
                        _ => {}
                    }
                    needs_render = true;
                }
                Some(msg) = msg_rx.recv() => {
                    effects.extend(app.update(msg));
                    needs_render = true;
                }
                Some(()) = watch_rx.recv() => {
                    effects.push(Effect::ReloadData);
                }
                _ = ticker.tick() => {
                    effects.extend(app.update(Msg::Tick));
                }
                _ = signal::ctrl_c() => break,
            }
        }

        for effect in std::mem::take(&mut effects) {
            match effect {
                Effect::Quit => break 'event_loop,
                Effect::ReloadData => match &options.source {
                    Some(data_source) => {
                        spawn_load(data_source.clone(), app.begin_load(), msg_tx.clone());
                    }
                    None => app.status = Some("No data source configured".to_string()),
                },
                Effect::SendAction(message) => deliver_action(&options.action_tx, message, &mut app),
                Effect::CopyLink(url) => copy_link(&url, &mut app),
                Effect::InvokeHandler(handler) => {
                    info!(handler, "Custom action handler left to the host");
                }
                Effect::ResolveIcons(names) => {
                    spawn_icon_resolution(names, Arc::clone(&icons), msg_tx.clone());
                }
            }
            needs_render = true;
        }

        if needs_render {
            render(&mut terminal, &mut app, &mut bar)?;
        }
    }

    cleanup_terminal(&mut terminal)?;
    Ok(())
}

/// Forward terminal input over a channel. Keeping `poll()` and `read()`
/// together on one task avoids lost events on some terminals.
fn spawn_input_task() -> mpsc::Receiver<Event> {
    let (sender, receiver) = mpsc::channel(500);
    tokio::task::spawn_blocking(move || {
        let poll_interval = Duration::from_millis(16);
        loop {
            match event::poll(poll_interval) {
                Ok(true) => match event::read() {
                    Ok(input_event) => {
                        if sender.blocking_send(input_event).is_err() {
                            break;
                        }
                    }
                    Err(error) => {
                        warn!(error = %error, "Failed to read terminal event");
                        break;
                    }
                },
                Ok(false) => {}
                Err(error) => {
                    warn!(error = %error, "Failed to poll terminal events");
                    break;
                }
            }
        }
    });
    receiver
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<std::io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
    Ok(terminal)
}

fn cleanup_terminal(terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn render(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    app: &mut App,
    bar: &mut BarComponent,
) -> Result<()> {
    terminal.draw(|frame| bar.render(frame, frame.area(), app))?;
    Ok(())
}

fn spawn_load(data_source: DataSource, generation: u64, tx: UnboundedSender<Msg>) {
    tokio::spawn(async move {
        let msg = match data_source.load().await {
            Ok(data) => Msg::DataLoaded { generation, data },
            Err(error) => Msg::DataFailed {
                generation,
                error: error.to_string(),
            },
        };
        let _ = tx.send(msg);
    });
}

fn spawn_icon_resolution(
    names: Vec<String>,
    resolver: Arc<CachedIconResolver<GlyphIconResolver>>,
    tx: UnboundedSender<Msg>,
) {
    tokio::spawn(async move {
        let mut resolved = HashMap::new();
        for name in names {
            if let Some(glyph) = resolver.resolve(&name).await {
                resolved.insert(name, glyph);
            }
        }
        let _ = tx.send(Msg::IconsResolved(resolved));
    });
}

fn deliver_action(tx: &Option<UnboundedSender<ActionMessage>>, message: ActionMessage, app: &mut App) {
    match tx {
        Some(tx) => {
            if tx.send(message).is_err() {
                warn!("Action channel closed; dropping dispatch");
                app.status = Some("Action channel closed".to_string());
            } else {
                app.status = Some("Action sent".to_string());
            }
        }
        None => {
            let payload = serde_json::to_string(&message).unwrap_or_default();
            info!(payload = %payload, "Action dispatched");
            app.status = Some("Action dispatched".to_string());
        }
    }
}

fn copy_link(url: &str, app: &mut App) {
    match arboard::Clipboard::new().and_then(|mut clipboard| clipboard.set_text(url.to_string())) {
        Ok(()) => app.status = Some(format!("Copied {url}")),
        Err(error) => {
            warn!(error = %error, "Clipboard unavailable");
            app.status = Some(format!("Open {url}"));
        }
    }
}
