//! OS counter collaborator.

use std::time::Instant;
use sysinfo::{Networks, System};

const MIB: u64 = 1 << 20;

/// Byte rates for one network adapter over the last refresh interval.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NetRates {
    pub sent_per_sec:     f64,
    pub received_per_sec: f64,
}

/// Source of the raw OS counters the sampler reads once per tick.
///
/// `refresh` is called exactly once per tick, before any read. Reads return
/// `None` when a counter is unavailable; the sampler treats that as "skip this
/// metric for this tick".
pub trait CounterSource {
    fn refresh(&mut self);

    /// Aggregate CPU usage in percent.
    fn cpu_total(&self) -> Option<f32>;

    /// Per-logical-core usage in percent; empty when unavailable.
    fn cpu_per_core(&self) -> Vec<f32>;

    /// Installed physical memory in MiB.
    fn total_memory_mb(&self) -> Option<u64>;

    /// Physical memory still available in MiB.
    fn available_memory_mb(&self) -> Option<u64>;

    /// Every adapter name currently reported by the OS.
    fn adapter_names(&self) -> Vec<String>;

    /// Rates for the adapter called exactly `adapter`.
    fn net_rates(&self, adapter: &str) -> Option<NetRates>;
}

/// [`CounterSource`] backed by `sysinfo`.
///
/// Network figures from `sysinfo` are byte deltas since the previous refresh;
/// dividing by the measured elapsed time gives bytes/second.
pub struct SysinfoCounters {
    sys:          System,
    networks:     Networks,
    last_refresh: Instant,
    elapsed_secs: f64,
}

impl SysinfoCounters {
    pub fn new() -> Self {
        let mut sys = System::new();
        sys.refresh_cpu_usage();
        sys.refresh_memory();

        Self {
            sys,
            networks:     Networks::new_with_refreshed_list(),
            last_refresh: Instant::now(),
            elapsed_secs: 0.0,
        }
    }
}

impl Default for SysinfoCounters {
    fn default() -> Self {
        Self::new()
    }
}

impl CounterSource for SysinfoCounters {
    fn refresh(&mut self) {
        self.sys.refresh_cpu_usage();
        self.sys.refresh_memory();
        self.networks.refresh(true);

        let now = Instant::now();
        self.elapsed_secs = now.duration_since(self.last_refresh).as_secs_f64();
        self.last_refresh = now;
    }

    fn cpu_total(&self) -> Option<f32> {
        if self.sys.cpus().is_empty() {
            return None;
        }
        Some(self.sys.global_cpu_usage())
    }

    fn cpu_per_core(&self) -> Vec<f32> {
        self.sys.cpus().iter().map(|c| c.cpu_usage()).collect()
    }

    fn total_memory_mb(&self) -> Option<u64> {
        let total = self.sys.total_memory();
        (total > 0).then_some(total / MIB)
    }

    fn available_memory_mb(&self) -> Option<u64> {
        Some(self.sys.available_memory() / MIB)
    }

    fn adapter_names(&self) -> Vec<String> {
        // HashMap order is unstable; sort so "first adapter" means something.
        let mut names: Vec<String> = self.networks.iter().map(|(name, _)| name.clone()).collect();
        names.sort();
        names
    }

    fn net_rates(&self, adapter: &str) -> Option<NetRates> {
        if self.elapsed_secs <= 0.0 {
            return None;
        }
        let (_, data) = self.networks.iter().find(|(name, _)| name.as_str() == adapter)?;
        Some(NetRates {
            sent_per_sec:     data.transmitted() as f64 / self.elapsed_secs,
            received_per_sec: data.received() as f64 / self.elapsed_secs,
        })
    }
}
