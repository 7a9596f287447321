//! Best-effort GPU telemetry.
//!
//! Absence of a GPU (or of the vendor library) only disables the GPU section;
//! nothing here is allowed to stall or fail the tick loop.

use std::time::{Duration, Instant};
use taskmon_core::Result;
use tracing::{debug, info, warn};

/// A call slower than this puts GPU reads on cooldown.
pub const CALL_BUDGET: Duration = Duration::from_millis(250);
/// Consecutive failed reads before GPU reads go on cooldown.
pub const MAX_CONSECUTIVE_FAILURES: u32 = 3;
/// Ticks skipped once on cooldown.
pub const COOLDOWN_TICKS: u32 = 30;

/// A GPU telemetry handle. Dropping it releases the native resources.
pub trait GpuTelemetry {
    /// Human-readable device name, for logs.
    fn name(&self) -> &str;

    /// Utilisation of the graphics engine in percent.
    fn utilization(&mut self) -> Result<f32>;

    /// Core temperature in °C.
    fn temperature(&mut self) -> Result<f32>;
}

/// Acquire telemetry for the first GPU, or `None` when unavailable.
pub fn acquire() -> Option<Box<dyn GpuTelemetry>> {
    #[cfg(feature = "nvml")]
    {
        match nvml::NvmlTelemetry::init(0) {
            Ok(gpu) => {
                info!("GPU telemetry: {}", gpu.name());
                return Some(Box::new(gpu));
            }
            Err(e) => info!("GPU telemetry unavailable: {e}"),
        }
    }
    #[cfg(not(feature = "nvml"))]
    info!("GPU telemetry not compiled in");

    None
}

/// One GPU reading; a field is `None` when that read failed.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GpuReading {
    pub utilization: Option<f32>,
    pub temperature: Option<f32>,
}

/// Wraps a [`GpuTelemetry`] with the failure and latency bound.
pub struct GpuReader {
    telemetry: Box<dyn GpuTelemetry>,
    budget:    Duration,
    failures:  u32,
    cooldown:  u32,
}

impl GpuReader {
    pub fn new(telemetry: Box<dyn GpuTelemetry>) -> Self {
        Self::with_budget(telemetry, CALL_BUDGET)
    }

    pub fn with_budget(telemetry: Box<dyn GpuTelemetry>, budget: Duration) -> Self {
        Self {
            telemetry,
            budget,
            failures: 0,
            cooldown: 0,
        }
    }

    /// `true` while reads are being skipped.
    pub fn cooling_down(&self) -> bool {
        self.cooldown > 0
    }

    /// Read both values, or nothing while on cooldown.
    pub fn poll(&mut self) -> GpuReading {
        if self.cooldown > 0 {
            self.cooldown -= 1;
            return GpuReading::default();
        }

        let started = Instant::now();
        let utilization = self.telemetry.utilization();
        let temperature = self.telemetry.temperature();
        let elapsed = started.elapsed();

        if utilization.is_err() || temperature.is_err() {
            self.failures += 1;
        } else {
            self.failures = 0;
        }
        if let Err(e) = &utilization {
            debug!("GPU utilisation read failed: {e}");
        }
        if let Err(e) = &temperature {
            debug!("GPU temperature read failed: {e}");
        }

        if elapsed > self.budget {
            warn!(
                "GPU telemetry took {} ms; pausing GPU reads for {COOLDOWN_TICKS} ticks",
                elapsed.as_millis()
            );
            self.cooldown = COOLDOWN_TICKS;
        } else if self.failures >= MAX_CONSECUTIVE_FAILURES {
            warn!(
                "{} consecutive GPU read failures; pausing GPU reads for {COOLDOWN_TICKS} ticks",
                self.failures
            );
            self.failures = 0;
            self.cooldown = COOLDOWN_TICKS;
        }

        GpuReading {
            utilization: utilization.ok(),
            temperature: temperature.ok(),
        }
    }
}

#[cfg(feature = "nvml")]
pub mod nvml {
    use super::GpuTelemetry;
    use nvml_wrapper::enum_wrappers::device::TemperatureSensor;
    use nvml_wrapper::{Device, Nvml};
    use taskmon_core::{MonitorError, Result};

    /// NVIDIA GPU via NVML (the library behind `nvidia-smi`).
    ///
    /// Owns the NVML session; the session is shut down on drop, including when
    /// [`NvmlTelemetry::init`] fails after NVML itself came up.
    pub struct NvmlTelemetry {
        nvml:  Option<Nvml>,
        index: u32,
        name:  String,
    }

    impl NvmlTelemetry {
        pub fn init(index: u32) -> Result<Self> {
            let nvml = Nvml::init()
                .map_err(|e| MonitorError::Gpu(format!("NVML init failed: {e}")))?;

            let name = {
                let device = nvml.device_by_index(index).map_err(|e| {
                    MonitorError::Gpu(format!("no NVIDIA device at index {index}: {e}"))
                })?;
                device.name().unwrap_or_else(|_| format!("NVIDIA GPU {index}"))
            };

            Ok(Self {
                nvml: Some(nvml),
                index,
                name,
            })
        }

        fn device(&self) -> Result<Device<'_>> {
            let nvml = self
                .nvml
                .as_ref()
                .ok_or_else(|| MonitorError::Gpu("NVML already shut down".into()))?;
            nvml.device_by_index(self.index)
                .map_err(|e| MonitorError::Gpu(format!("device {}: {e}", self.index)))
        }
    }

    impl GpuTelemetry for NvmlTelemetry {
        fn name(&self) -> &str {
            &self.name
        }

        fn utilization(&mut self) -> Result<f32> {
            let rates = self
                .device()?
                .utilization_rates()
                .map_err(|e| MonitorError::Gpu(format!("utilisation: {e}")))?;
            Ok(rates.gpu as f32)
        }

        fn temperature(&mut self) -> Result<f32> {
            let celsius = self
                .device()?
                .temperature(TemperatureSensor::Gpu)
                .map_err(|e| MonitorError::Gpu(format!("temperature: {e}")))?;
            Ok(celsius as f32)
        }
    }

    impl Drop for NvmlTelemetry {
        fn drop(&mut self) {
            if let Some(nvml) = self.nvml.take() {
                match nvml.shutdown() {
                    Ok(()) => tracing::debug!("NVML shut down"),
                    Err(e) => tracing::debug!("NVML shutdown failed: {e}"),
                }
            }
        }
    }
}
