pub mod error;
pub mod event;
pub mod history;
pub mod state;

pub use error::{MonitorError, Result};
pub use event::Message;
pub use history::History;
pub use state::MetricsSnapshot;
