use thiserror::Error;

/// Top-level error type used across the entire application.
///
/// None of these are fatal to the overlay: callers log them and degrade the
/// affected metric or frame.
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("config error: {0}")]
    Config(String),

    #[error("GPU telemetry error: {0}")]
    Gpu(String),

    #[error("window error: {0}")]
    Window(String),

    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

pub type Result<T, E = MonitorError> = std::result::Result<T, E>;
