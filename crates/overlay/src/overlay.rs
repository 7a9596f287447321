use crate::placement::{place, DisplayGeometry, WindowBounds};
use crate::presenter::Presenter;
use std::time::Duration;
use taskmon_config::Settings;
use taskmon_renderer::Renderer;
use taskmon_system::Sampler;
use tracing::{debug, info};

/// Where the overlay is in its tick cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Sampling,
    Rendering,
    Presented,
}

/// The overlay window: owns the sampler, renderer and presenter and drives
/// them from a single thread.
///
/// `on_tick` is the only place metrics are written, so the renderer always sees
/// a complete snapshot.
pub struct Overlay<P: Presenter> {
    sampler:   Sampler,
    renderer:  Renderer,
    presenter: P,
    geometry:  Box<dyn DisplayGeometry>,
    settings:  Settings,
    phase:     Phase,
    bounds:    WindowBounds,
    /// Core count the current layout was computed for.
    cores:     usize,
}

impl<P: Presenter> Overlay<P> {
    pub fn new(
        sampler: Sampler,
        renderer: Renderer,
        presenter: P,
        geometry: Box<dyn DisplayGeometry>,
        settings: Settings,
    ) -> Self {
        let mut overlay = Self {
            sampler,
            renderer,
            presenter,
            geometry,
            settings,
            phase: Phase::Idle,
            bounds: WindowBounds::default(),
            cores: 0,
        };
        overlay.relayout();
        overlay
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn bounds(&self) -> WindowBounds {
        self.bounds
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn sampler(&self) -> &Sampler {
        &self.sampler
    }

    /// Timer period for the current settings.
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.settings.update_interval_ms)
    }

    /// Timer callback: sample, render, present.
    pub fn on_tick(&mut self) {
        self.phase = Phase::Sampling;
        let cores = self.sampler.sample().core_count();

        if cores != self.cores {
            debug!("Core count changed {} -> {cores}", self.cores);
            self.relayout();
        }

        self.render_and_present();
    }

    /// Resize or section toggle: redraw immediately from the current snapshot.
    pub fn on_layout_changed(&mut self) {
        self.relayout();
        self.render_and_present();
    }

    /// Swap settings wholesale and redraw.
    pub fn apply_settings(&mut self, settings: Settings) {
        let settings = settings.normalized();
        if self.settings.layout_differs(&settings) {
            info!("Section layout changed");
        }
        self.sampler.apply_settings(&settings);
        self.renderer.configure(&settings);
        self.settings = settings;
        self.on_layout_changed();
    }

    /// Release metric resources and close the surface, handing the closed
    /// presenter back.
    pub fn shutdown(self) -> P {
        let Self { sampler, mut presenter, .. } = self;
        sampler.shutdown();
        presenter.close();
        presenter
    }

    fn relayout(&mut self) {
        self.cores = self.sampler.snapshot().core_count();
        let width = self.renderer.layout(self.cores).total_width();
        let bounds = place(self.geometry.primary_display(), self.geometry.tray_rect(), width);
        if bounds != self.bounds {
            debug!(
                "Overlay bounds {}x{} at ({}, {})",
                bounds.width, bounds.height, bounds.x, bounds.y
            );
        }
        self.bounds = bounds;
    }

    fn render_and_present(&mut self) {
        self.phase = Phase::Rendering;
        let frame = self.renderer.render(
            self.sampler.snapshot(),
            self.bounds.width,
            self.bounds.height,
        );

        match frame {
            Some(frame) => {
                self.presenter.present(&frame, self.bounds, self.settings.opacity);
                self.phase = Phase::Presented;
            }
            // Nothing to show (no sections, zero-size surface); retry next tick.
            None => self.phase = Phase::Idle,
        }
    }
}
