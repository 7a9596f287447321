/// All messages that can reach the overlay's tick loop.
///
/// Sources:
/// - Interval timer       → `Tick`
/// - Config watcher task  → `ConfigReloaded`
/// - Ctrl-C               → `Shutdown`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    /// Periodic timer fired: sample, render, present.
    Tick,
    /// Settings file changed on disk; triggers a live reload.
    ConfigReloaded,
    /// Graceful shutdown requested.
    Shutdown,
}
