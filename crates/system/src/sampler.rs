use crate::counters::CounterSource;
use crate::gpu::{GpuReader, GpuTelemetry};
use crate::network::select_adapter;
use taskmon_config::Settings;
use taskmon_core::state::{memory_percent, MetricsSnapshot};
use tracing::{debug, info};

/// Polls the shown metrics once per tick into a [`MetricsSnapshot`] it owns.
///
/// Metrics whose counter is missing at construction stay disabled for the
/// session; transient read failures keep the previous value for that tick.
/// Hidden sections are not read at all.
pub struct Sampler {
    counters: Box<dyn CounterSource>,
    gpu:      Option<GpuReader>,
    snapshot: MetricsSnapshot,
    shown:    Shown,

    cpu_enabled: bool,
    /// Installed memory, read once at startup; 0 when unknown.
    total_memory_mb: u64,
    adapter:         Option<String>,
    /// Raw `network_adapter` setting the current `adapter` was chosen from.
    adapter_setting: String,
}

impl Sampler {
    /// Build a sampler and prime the rate counters.
    ///
    /// The priming reading is discarded: rate-based counters report garbage on
    /// their first read, so the first real tick must be the second read.
    pub fn new(
        mut counters: Box<dyn CounterSource>,
        gpu: Option<Box<dyn GpuTelemetry>>,
        settings: &Settings,
    ) -> Self {
        counters.refresh();

        let cpu_enabled = counters.cpu_total().is_some();
        if !cpu_enabled {
            info!("CPU counters unavailable; CPU section disabled");
        }

        let total_memory_mb = counters.total_memory_mb().unwrap_or(0);
        if total_memory_mb == 0 {
            info!("Total memory unknown; memory reports 0%");
        }

        let adapter = pick_adapter(counters.as_ref(), settings);

        let snapshot = MetricsSnapshot {
            cpu_per_core: vec![0.0; counters.cpu_per_core().len()],
            ..MetricsSnapshot::default()
        };

        Self {
            counters,
            gpu: gpu.map(GpuReader::new),
            snapshot,
            shown: Shown::from(settings),
            cpu_enabled,
            total_memory_mb,
            adapter,
            adapter_setting: settings.network_adapter.clone(),
        }
    }

    /// Take one sample of every shown metric and return the updated snapshot.
    pub fn sample(&mut self) -> &MetricsSnapshot {
        self.counters.refresh();

        if self.shown.cpu {
            self.sample_cpu();
        }
        if self.shown.memory {
            self.sample_memory();
        }
        if self.shown.network {
            self.sample_network();
        }
        if self.shown.gpu {
            self.sample_gpu();
        }

        &self.snapshot
    }

    pub fn snapshot(&self) -> &MetricsSnapshot {
        &self.snapshot
    }

    /// Name of the adapter being monitored, if any.
    pub fn adapter(&self) -> Option<&str> {
        self.adapter.as_deref()
    }

    pub fn gpu_available(&self) -> bool {
        self.gpu.is_some()
    }

    /// React to new settings: pick up the shown sections and re-select the
    /// adapter if its setting changed.
    pub fn apply_settings(&mut self, settings: &Settings) {
        self.shown = Shown::from(settings);
        if settings.network_adapter != self.adapter_setting {
            self.adapter = pick_adapter(self.counters.as_ref(), settings);
            self.adapter_setting = settings.network_adapter.clone();
        }
    }

    /// Release counters and the GPU handle.
    pub fn shutdown(self) {
        info!("Releasing metric resources");
        drop(self);
    }

    fn sample_cpu(&mut self) {
        if !self.cpu_enabled {
            return;
        }
        let Some(total) = self.counters.cpu_total() else {
            debug!("CPU read failed; keeping last value");
            return;
        };

        self.snapshot.cpu_total = clamp_percent(total);
        self.snapshot.cpu_history.push(self.snapshot.cpu_total);

        let cores = self.counters.cpu_per_core();
        if !cores.is_empty() {
            self.snapshot.cpu_per_core = cores.into_iter().map(clamp_percent).collect();
        }
    }

    fn sample_memory(&mut self) {
        let Some(available) = self.counters.available_memory_mb() else {
            debug!("Memory read failed; keeping last value");
            return;
        };
        self.snapshot.memory_percent = memory_percent(self.total_memory_mb, available);
        self.snapshot.memory_history.push(self.snapshot.memory_percent);
    }

    fn sample_network(&mut self) {
        if let Some(adapter) = &self.adapter {
            match self.counters.net_rates(adapter) {
                Some(rates) => {
                    self.snapshot.net_up = clamp_rate(rates.sent_per_sec);
                    self.snapshot.net_down = clamp_rate(rates.received_per_sec);
                    self.snapshot.net_up_history.push(self.snapshot.net_up);
                    self.snapshot.net_down_history.push(self.snapshot.net_down);
                }
                None => debug!("Network read failed for '{adapter}'; keeping last value"),
            }
        }

        // Decays every tick, traffic or not.
        let observed = self.snapshot.net_up.max(self.snapshot.net_down);
        self.snapshot.update_net_peak(observed);
    }

    fn sample_gpu(&mut self) {
        let Some(gpu) = self.gpu.as_mut() else {
            return;
        };
        let reading = gpu.poll();
        if let Some(util) = reading.utilization {
            self.snapshot.gpu_util = clamp_percent(util);
            self.snapshot.gpu_history.push(self.snapshot.gpu_util);
        }
        if let Some(temp) = reading.temperature {
            self.snapshot.gpu_temp = temp;
        }
    }
}

/// Which metric groups have a visible section.
#[derive(Debug, Clone, Copy)]
struct Shown {
    cpu:     bool,
    memory:  bool,
    network: bool,
    gpu:     bool,
}

impl From<&Settings> for Shown {
    fn from(settings: &Settings) -> Self {
        Self {
            cpu:     settings.show_cpu,
            memory:  settings.show_memory,
            network: settings.show_net_up || settings.show_net_down,
            gpu:     settings.show_gpu,
        }
    }
}

fn pick_adapter(counters: &dyn CounterSource, settings: &Settings) -> Option<String> {
    let names = counters.adapter_names();
    let adapter = select_adapter(&names, settings.adapter_filter());
    match &adapter {
        Some(name) => info!("Monitoring network adapter '{name}'"),
        None => info!(
            "No network adapter matches '{}' (seen: {names:?}); network sections idle",
            settings.network_adapter
        ),
    }
    adapter
}

fn clamp_percent(value: f32) -> f32 {
    if value.is_finite() {
        value.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

fn clamp_rate(value: f64) -> f32 {
    if value.is_finite() {
        value.max(0.0) as f32
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::counters::NetRates;
    use crate::gpu::tests::FakeGpu;
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;
    use taskmon_core::state::{NET_PEAK_DECAY, NET_PEAK_FLOOR};

    /// One scripted tick of counter values.
    #[derive(Clone, Default)]
    struct Reading {
        cpu:       Option<f32>,
        cores:     Vec<f32>,
        available: Option<u64>,
        rates:     Option<NetRates>,
    }

    /// Replays scripted readings, one per `refresh`.
    struct FakeCounters {
        total_mb: Option<u64>,
        adapters: Vec<String>,
        script:   Rc<RefCell<VecDeque<Reading>>>,
        current:  Reading,
    }

    impl FakeCounters {
        fn new(total_mb: Option<u64>, adapters: &[&str], script: Vec<Reading>) -> Self {
            Self {
                total_mb,
                adapters: adapters.iter().map(|s| s.to_string()).collect(),
                script: Rc::new(RefCell::new(script.into())),
                current: Reading::default(),
            }
        }
    }

    impl CounterSource for FakeCounters {
        fn refresh(&mut self) {
            if let Some(next) = self.script.borrow_mut().pop_front() {
                self.current = next;
            }
        }
        fn cpu_total(&self) -> Option<f32> {
            self.current.cpu
        }
        fn cpu_per_core(&self) -> Vec<f32> {
            self.current.cores.clone()
        }
        fn total_memory_mb(&self) -> Option<u64> {
            self.total_mb
        }
        fn available_memory_mb(&self) -> Option<u64> {
            self.current.available
        }
        fn adapter_names(&self) -> Vec<String> {
            self.adapters.clone()
        }
        fn net_rates(&self, adapter: &str) -> Option<NetRates> {
            self.adapters.iter().any(|a| a == adapter).then_some(self.current.rates?)
        }
    }

    fn rates(up: f64, down: f64) -> Option<NetRates> {
        Some(NetRates { sent_per_sec: up, received_per_sec: down })
    }

    fn steady(cpu: f32, available: u64) -> Reading {
        Reading {
            cpu: Some(cpu),
            cores: vec![cpu; 4],
            available: Some(available),
            rates: rates(1_000.0, 2_000.0),
        }
    }

    #[test]
    fn first_reading_is_discarded() {
        let prime = Reading {
            cpu: Some(100.0),
            cores: vec![100.0; 4],
            available: Some(0),
            rates: rates(9e9, 9e9),
        };
        let counters = FakeCounters::new(Some(8_000), &["Ethernet"], vec![prime, steady(20.0, 6_000)]);
        let mut sampler = Sampler::new(Box::new(counters), None, &Settings::default());

        assert_eq!(sampler.snapshot().cpu_total, 0.0);
        let snap = sampler.sample();
        assert_eq!(snap.cpu_total, 20.0);
        assert!((snap.memory_percent - 25.0).abs() < 1e-4);
        assert_eq!(snap.net_up, 1_000.0);
        assert_eq!(snap.net_down, 2_000.0);
        assert_eq!(snap.cpu_history.latest(), 20.0);
    }

    #[test]
    fn readings_are_clamped() {
        let wild = Reading {
            cpu: Some(140.0),
            cores: vec![-5.0, 120.0, f32::NAN],
            available: Some(1_000),
            rates: rates(-300.0, 512.0),
        };
        let counters = FakeCounters::new(Some(4_000), &["eth0"], vec![steady(0.0, 0), wild]);
        let mut sampler = Sampler::new(Box::new(counters), None, &Settings::default());

        let snap = sampler.sample();
        assert_eq!(snap.cpu_total, 100.0);
        assert_eq!(snap.cpu_per_core, vec![0.0, 100.0, 0.0]);
        assert_eq!(snap.net_up, 0.0);
        assert_eq!(snap.net_down, 512.0);
    }

    #[test]
    fn zero_total_memory_reports_zero() {
        let counters = FakeCounters::new(None, &["eth0"], vec![steady(0.0, 0), steady(10.0, 500)]);
        let mut sampler = Sampler::new(Box::new(counters), None, &Settings::default());
        assert_eq!(sampler.sample().memory_percent, 0.0);
    }

    #[test]
    fn transient_failure_keeps_last_value() {
        let gap = Reading { cpu: None, cores: vec![], available: None, rates: None };
        let counters = FakeCounters::new(
            Some(1_000),
            &["eth0"],
            vec![steady(0.0, 0), steady(30.0, 500), gap],
        );
        let mut sampler = Sampler::new(Box::new(counters), None, &Settings::default());

        sampler.sample();
        let snap = sampler.sample();
        assert_eq!(snap.cpu_total, 30.0);
        assert!((snap.memory_percent - 50.0).abs() < 1e-4);
        assert_eq!(snap.net_down, 2_000.0);
        assert_eq!(snap.cpu_per_core, vec![30.0; 4]);
    }

    #[test]
    fn missing_cpu_counter_disables_only_cpu() {
        let no_cpu = Reading { cpu: None, ..steady(0.0, 500) };
        let later = steady(80.0, 250);
        let counters = FakeCounters::new(Some(1_000), &["eth0"], vec![no_cpu, later]);
        let mut sampler = Sampler::new(Box::new(counters), None, &Settings::default());

        let snap = sampler.sample();
        assert_eq!(snap.cpu_total, 0.0, "CPU stays disabled for the session");
        assert!((snap.memory_percent - 75.0).abs() < 1e-4);
        assert_eq!(snap.net_up, 1_000.0);
    }

    #[test]
    fn no_matching_adapter_leaves_network_idle() {
        let settings = Settings { network_adapter: "wlan".into(), ..Settings::default() };
        let counters = FakeCounters::new(Some(1_000), &["Ethernet"], vec![steady(0.0, 0), steady(5.0, 900)]);
        let mut sampler = Sampler::new(Box::new(counters), None, &settings);

        assert_eq!(sampler.adapter(), None);
        let snap = sampler.sample();
        assert_eq!(snap.net_up, 0.0);
        assert_eq!(snap.cpu_total, 5.0);
        assert_eq!(snap.net_peak, NET_PEAK_FLOOR);
    }

    #[test]
    fn adapter_reselected_when_setting_changes() {
        let counters = FakeCounters::new(Some(1_000), &["Loopback0", "Ethernet", "Wi-Fi"], vec![]);
        let mut sampler = Sampler::new(Box::new(counters), None, &Settings::default());
        assert_eq!(sampler.adapter(), Some("Ethernet"));

        let wifi = Settings { network_adapter: "wi-fi".into(), ..Settings::default() };
        sampler.apply_settings(&wifi);
        assert_eq!(sampler.adapter(), Some("Wi-Fi"));
    }

    #[test]
    fn net_peak_tracks_traffic_and_decays() {
        let burst = Reading { rates: rates(0.0, 1_000_000.0), ..steady(0.0, 0) };
        let quiet = Reading { rates: rates(0.0, 0.0), ..steady(0.0, 0) };
        let counters = FakeCounters::new(
            Some(1_000),
            &["eth0"],
            vec![steady(0.0, 0), burst, quiet.clone(), quiet],
        );
        let mut sampler = Sampler::new(Box::new(counters), None, &Settings::default());

        let after_burst = sampler.sample().net_peak;
        assert!((after_burst - 1_000_000.0 * NET_PEAK_DECAY).abs() < 1.0);

        let mut prev = after_burst;
        for _ in 0..2 {
            let peak = sampler.sample().net_peak;
            assert!(peak >= NET_PEAK_FLOOR);
            assert!(peak >= prev * NET_PEAK_DECAY - 1e-3);
            assert!(peak < prev);
            prev = peak;
        }
    }

    #[test]
    fn gpu_values_flow_into_snapshot() {
        let counters = FakeCounters::new(Some(1_000), &["eth0"], vec![steady(0.0, 0), steady(1.0, 1)]);
        let gpu = FakeGpu::healthy(64.0, 71.0);
        let mut sampler = Sampler::new(Box::new(counters), Some(Box::new(gpu)), &Settings::default());

        assert!(sampler.gpu_available());
        let snap = sampler.sample();
        assert_eq!(snap.gpu_util, 64.0);
        assert_eq!(snap.gpu_temp, 71.0);
        assert_eq!(snap.gpu_history.latest(), 64.0);
    }

    #[test]
    fn gpu_failure_keeps_previous_values() {
        let counters = FakeCounters::new(Some(1_000), &["eth0"], vec![]);
        let gpu = FakeGpu::healthy(33.0, 55.0);
        let failing = gpu.failing.clone();
        let mut sampler = Sampler::new(Box::new(counters), Some(Box::new(gpu)), &Settings::default());

        sampler.sample();
        failing.set(true);
        let snap = sampler.sample();
        assert_eq!(snap.gpu_util, 33.0);
        assert_eq!(snap.gpu_temp, 55.0);
    }

    #[test]
    fn absent_gpu_leaves_defaults() {
        let counters = FakeCounters::new(Some(1_000), &["eth0"], vec![steady(0.0, 0), steady(12.0, 400)]);
        let mut sampler = Sampler::new(Box::new(counters), None, &Settings::default());

        assert!(!sampler.gpu_available());
        let snap = sampler.sample();
        assert_eq!((snap.gpu_util, snap.gpu_temp), (0.0, 0.0));
        assert_eq!(snap.cpu_total, 12.0);
    }

    #[test]
    fn hidden_gpu_is_never_polled() {
        let counters = FakeCounters::new(Some(1_000), &["eth0"], vec![]);
        let gpu = FakeGpu::healthy(40.0, 60.0);
        let calls = gpu.calls.clone();
        let settings = Settings { show_gpu: false, ..Settings::default() };
        let mut sampler = Sampler::new(Box::new(counters), Some(Box::new(gpu)), &settings);

        for _ in 0..5 {
            sampler.sample();
        }
        assert_eq!(calls.get(), 0);
        assert_eq!(sampler.snapshot().gpu_util, 0.0);

        sampler.apply_settings(&Settings::default());
        assert_eq!(sampler.sample().gpu_util, 40.0);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn hidden_sections_are_not_sampled() {
        let counters = FakeCounters::new(
            Some(1_000),
            &["eth0"],
            vec![steady(0.0, 0), steady(30.0, 500), steady(30.0, 500)],
        );
        let settings = Settings {
            show_net_up: false,
            show_net_down: false,
            show_memory: false,
            ..Settings::default()
        };
        let mut sampler = Sampler::new(Box::new(counters), None, &settings);

        let snap = sampler.sample();
        assert_eq!(snap.cpu_total, 30.0);
        assert_eq!(snap.memory_percent, 0.0);
        assert_eq!((snap.net_up, snap.net_down), (0.0, 0.0));
        assert_eq!(snap.net_peak, NET_PEAK_FLOOR, "peak untouched while network is hidden");

        // One network section is enough to resume network sampling.
        sampler.apply_settings(&Settings { show_net_up: false, ..Settings::default() });
        let snap = sampler.sample();
        assert_eq!(snap.net_down, 2_000.0);
        assert!(snap.net_peak >= NET_PEAK_FLOOR);
        assert!((snap.memory_percent - 50.0).abs() < 1e-4);
    }
}
