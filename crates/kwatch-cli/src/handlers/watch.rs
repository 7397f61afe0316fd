use std::sync::mpsc::{channel, sync_channel, Receiver};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::Utc;
use crossterm::event::{self, Event, KeyEventKind};

use kwatch_core::{Msg, TableCommand, TableState};
use kwatch_runtime::{Error, KubeconfigWatcher, Options, ResourceClient, WatchController};
use kwatch_types::Theme;

use crate::presentation::keys::decode_key;
use crate::presentation::term::Screen;

/// How long the rendered row text stays valid before relative times need a
/// refresh.
const ROW_TICK: Duration = Duration::from_secs(1);
const SPINNER_TICK: Duration = Duration::from_millis(120);
const INPUT_POLL: Duration = Duration::from_millis(50);

/// Entry point for a watch session. Configuration errors surface from the
/// preflight, before the terminal is touched; the watch itself runs
/// concurrently with the UI loop, which shows the spinner until the first
/// snapshot lands. Fatal setup failures from the background watch (e.g. an
/// unknown resource type) quit the UI and propagate out.
pub fn handle(
    client: Arc<dyn ResourceClient>,
    options: Options,
    args: Vec<String>,
    theme: Theme,
) -> Result<()> {
    let (tx, rx) = sync_channel::<TableCommand>(64);
    let hide_deleted_expiry = options.hide_deleted.duration();
    let watch_kubeconfig = options.watch_kubeconfig;
    let config_paths = client.config_paths();

    let controller = Arc::new(WatchController::new(client, options, args, tx));
    controller.preflight()?;

    let (fatal_tx, fatal_rx) = channel::<Error>();
    {
        let controller = controller.clone();
        thread::Builder::new()
            .name("watch-setup".to_string())
            .spawn(move || {
                if let Err(err) = controller.watch() {
                    let _ = fatal_tx.send(err);
                }
            })?;
    }

    let _kubeconfig_watcher = if watch_kubeconfig {
        Some(KubeconfigWatcher::spawn(config_paths, controller.clone())?)
    } else {
        None
    };

    let mut table = TableState::new(false, hide_deleted_expiry);
    table.update(Msg::Command(TableCommand::StartSpinner), Utc::now());

    let result = run_ui(&mut table, &rx, &fatal_rx, theme);

    // Dropping the receiver unblocks any sender stuck on the bounded
    // channel before the workers are joined.
    drop(rx);
    controller.shutdown();
    result
}

fn run_ui(
    table: &mut TableState,
    rx: &Receiver<TableCommand>,
    fatal_rx: &Receiver<Error>,
    theme: Theme,
) -> Result<()> {
    let mut screen = Screen::new(theme)?;
    let result = ui_loop(table, rx, fatal_rx, &mut screen);
    // Terminal state is restored even when the loop errors.
    screen.restore();
    result
}

fn ui_loop(
    table: &mut TableState,
    rx: &Receiver<TableCommand>,
    fatal_rx: &Receiver<Error>,
    screen: &mut Screen,
) -> Result<()> {
    let (width, height) = crossterm::terminal::size()?;
    table.update(
        Msg::Resize {
            width: width as usize,
            height: height as usize,
        },
        Utc::now(),
    );

    let mut dirty = true;
    let mut last_row_tick = Instant::now();
    let mut last_spinner_tick = Instant::now();

    loop {
        if let Ok(err) = fatal_rx.try_recv() {
            return Err(err.into());
        }

        // Background tasks never touch the table; their commands drain
        // here, into the single writer.
        while let Ok(command) = rx.try_recv() {
            dirty |= table.update(Msg::Command(command), Utc::now()).redraw;
        }

        if last_row_tick.elapsed() >= ROW_TICK {
            last_row_tick = Instant::now();
            dirty |= table.update(Msg::Tick(Utc::now()), Utc::now()).redraw;
        }
        if last_spinner_tick.elapsed() >= SPINNER_TICK {
            last_spinner_tick = Instant::now();
            dirty |= table.update(Msg::SpinnerTick, Utc::now()).redraw;
        }

        if dirty {
            let frame = table.view(Utc::now());
            screen.draw(&frame)?;
            dirty = false;
        }

        if event::poll(INPUT_POLL)? {
            match event::read()? {
                Event::Key(key) if key.kind != KeyEventKind::Release => {
                    if let Some(key) = decode_key(key) {
                        let result = table.update(Msg::Key(key), Utc::now());
                        if result.quit {
                            return Ok(());
                        }
                        dirty |= result.redraw;
                    }
                }
                Event::Resize(width, height) => {
                    dirty |= table
                        .update(
                            Msg::Resize {
                                width: width as usize,
                                height: height as usize,
                            },
                            Utc::now(),
                        )
                        .redraw;
                }
                _ => {}
            }
        }
    }
}
