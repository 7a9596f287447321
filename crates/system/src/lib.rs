//! Metric sampling for the overlay: OS counters, optional GPU telemetry and
//! the per-tick [`Sampler`] that folds them into a
//! [`taskmon_core::MetricsSnapshot`].

pub mod counters;
pub mod gpu;
pub mod network;
pub mod sampler;

pub use counters::{CounterSource, NetRates, SysinfoCounters};
pub use gpu::{GpuReader, GpuReading, GpuTelemetry};
pub use network::select_adapter;
pub use sampler::Sampler;

use taskmon_config::Settings;

/// Build a sampler over the real OS counters and whatever GPU is present.
pub fn system_sampler(settings: &Settings) -> Sampler {
    Sampler::new(Box::new(SysinfoCounters::new()), gpu::acquire(), settings)
}
