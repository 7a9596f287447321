use crate::history::History;

/// Lowest value the network auto-scale peak may decay to (bytes/second).
pub const NET_PEAK_FLOOR: f32 = 10.0 * 1024.0;

/// Per-tick geometric decay of the network auto-scale peak.
///
/// Tuned for a one-second tick; applied per tick at every interval.
pub const NET_PEAK_DECAY: f32 = 0.9995;

/// Current metric values plus one history per plotted series.
///
/// Created once by the sampler and mutated in place every tick. Only the tick
/// loop touches it, so the renderer never sees a half-updated metric.
#[derive(Debug, Clone)]
pub struct MetricsSnapshot {
    /// Aggregate CPU usage (0.0 – 100.0).
    pub cpu_total:    f32,
    /// Per-logical-core CPU usage (0.0 – 100.0).
    pub cpu_per_core: Vec<f32>,
    /// Physical memory in use (0.0 – 100.0).
    pub memory_percent: f32,
    /// Network transmit rate in bytes/second.
    pub net_up:   f32,
    /// Network receive rate in bytes/second.
    pub net_down: f32,
    /// Decaying ceiling that both network sparklines are normalised against.
    pub net_peak: f32,
    /// GPU utilisation (0.0 – 100.0).
    pub gpu_util: f32,
    /// GPU core temperature in °C.
    pub gpu_temp: f32,

    pub cpu_history:      History,
    pub memory_history:   History,
    pub net_up_history:   History,
    pub net_down_history: History,
    pub gpu_history:      History,
}

impl Default for MetricsSnapshot {
    fn default() -> Self {
        Self {
            cpu_total:        0.0,
            cpu_per_core:     Vec::new(),
            memory_percent:   0.0,
            net_up:           0.0,
            net_down:         0.0,
            net_peak:         NET_PEAK_FLOOR,
            gpu_util:         0.0,
            gpu_temp:         0.0,
            cpu_history:      History::default(),
            memory_history:   History::default(),
            net_up_history:   History::default(),
            net_down_history: History::default(),
            gpu_history:      History::default(),
        }
    }
}

impl MetricsSnapshot {
    /// Number of logical cores seen in the last sample.
    #[must_use]
    pub fn core_count(&self) -> usize {
        self.cpu_per_core.len()
    }

    /// Raise the network peak to cover `observed`, then apply one decay step.
    pub fn update_net_peak(&mut self, observed: f32) {
        self.net_peak = next_peak(self.net_peak, observed);
    }
}

/// One tick of the auto-scale peak: grow instantly, decay slowly, never below
/// [`NET_PEAK_FLOOR`].
#[must_use]
pub fn next_peak(peak: f32, observed: f32) -> f32 {
    let grown = peak.max(observed);
    (grown * NET_PEAK_DECAY).max(NET_PEAK_FLOOR)
}

/// Memory in use as a percentage in `[0, 100]`; `0` when `total_mb` is zero.
#[must_use]
pub fn memory_percent(total_mb: u64, available_mb: u64) -> f32 {
    if total_mb == 0 {
        return 0.0;
    }
    let used = total_mb.saturating_sub(available_mb);
    (used as f64 / total_mb as f64 * 100.0).clamp(0.0, 100.0) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_percent_zero_total() {
        assert_eq!(memory_percent(0, 0), 0.0);
        assert_eq!(memory_percent(0, 512), 0.0);
    }

    #[test]
    fn memory_percent_stays_in_range() {
        for total in [1_u64, 7, 1024, 16_384, 65_536] {
            for available in [0_u64, 1, total / 2, total, total + 100] {
                let pct = memory_percent(total, available);
                assert!((0.0..=100.0).contains(&pct), "{total}/{available} -> {pct}");
            }
        }
    }

    #[test]
    fn memory_percent_half_used() {
        assert!((memory_percent(16_000, 8_000) - 50.0).abs() < 1e-4);
    }

    #[test]
    fn peak_never_below_floor() {
        let mut peak = NET_PEAK_FLOOR;
        for _ in 0..10_000 {
            peak = next_peak(peak, 0.0);
            assert!(peak >= NET_PEAK_FLOOR);
        }
        assert_eq!(peak, NET_PEAK_FLOOR);
    }

    #[test]
    fn peak_grows_instantly_and_decays_one_step() {
        let peak = next_peak(NET_PEAK_FLOOR, 1_000_000.0);
        assert!((peak - 1_000_000.0 * NET_PEAK_DECAY).abs() < 1.0);

        let next = next_peak(peak, 0.0);
        assert!(next >= peak * NET_PEAK_DECAY - 1e-3);
        assert!(next < peak);
    }

    #[test]
    fn snapshot_starts_at_floor() {
        let mut s = MetricsSnapshot::default();
        assert_eq!(s.net_peak, NET_PEAK_FLOOR);
        s.update_net_peak(50_000.0);
        assert!(s.net_peak > NET_PEAK_FLOOR);
    }
}
