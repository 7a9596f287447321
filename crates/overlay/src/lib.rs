//! Taskbar overlay for `taskmon`.
//!
//! Owns the tick loop and wires together:
//! - the metrics sampler (CPU, memory, network, GPU)
//! - the renderer and the presenter that puts frames on screen
//! - tray-relative window placement
//! - the settings file watcher (live reload on change)
//!
//! Everything runs on one thread: a current-thread Tokio runtime multiplexes
//! the interval timer, reload notifications and Ctrl-C in a single `select!`,
//! so no two ticks can overlap.

pub mod overlay;
pub mod placement;
pub mod presenter;

pub use overlay::{Overlay, Phase};
pub use placement::{DisplayGeometry, ScreenRect, WindowBounds};
pub use presenter::{system_presenter, HeadlessPresenter, Presenter};

use std::future::Future;
use std::path::Path;
use taskmon_config::{default_path, load as load_settings, ConfigWatcher};
use taskmon_core::{Message, MonitorError, Result};
use taskmon_renderer::Renderer;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};
use tracing::info;

// ── Entry point ───────────────────────────────────────────────────────────────

/// Start the overlay. Returns after Ctrl-C.
pub fn run() -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        let presenter = system_presenter()?;
        run_loop(&default_path(), presenter, tokio::signal::ctrl_c()).await?;
        Ok::<_, MonitorError>(())
    })
}

/// Drive the overlay until `shutdown` resolves, then hand back the closed
/// presenter.
async fn run_loop<P, F>(settings_path: &Path, presenter: P, shutdown: F) -> Result<P>
where
    P: Presenter,
    F: Future,
{
    let settings = load_settings(settings_path);
    info!(
        "Sampling every {} ms, opacity {:.2}",
        settings.update_interval_ms, settings.opacity
    );

    let mut overlay = Overlay::new(
        taskmon_system::system_sampler(&settings),
        Renderer::new(&settings),
        presenter,
        placement::system_geometry(),
        settings,
    );

    let (_watcher, mut reloads) = ConfigWatcher::spawn(settings_path);
    let mut ticker = tick_interval(&overlay);

    // Polled across iterations so a signal that lands mid-tick is still seen.
    tokio::pin!(shutdown);

    overlay.on_layout_changed();

    loop {
        let message = tokio::select! {
            _ = ticker.tick() => Message::Tick,
            Some(()) = reloads.recv() => Message::ConfigReloaded,
            _ = &mut shutdown => Message::Shutdown,
        };

        match message {
            Message::Tick => overlay.on_tick(),
            Message::ConfigReloaded => {
                let before = overlay.interval();
                overlay.apply_settings(load_settings(settings_path));
                info!("Settings reloaded");
                if overlay.interval() != before {
                    ticker = tick_interval(&overlay);
                }
            }
            Message::Shutdown => break,
        }
    }

    info!("Shutting down");
    Ok(overlay.shutdown())
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Interval timer for the overlay's current period. The first tick fires one
/// period from now; late ticks are skipped rather than bunched up.
fn tick_interval<P: Presenter>(overlay: &Overlay<P>) -> Interval {
    let period = overlay.interval();
    let mut ticker = time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    ticker
}
