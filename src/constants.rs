//! Application-wide constants for tuning and configuration
//!
//! Centralizes magic numbers to make them discoverable and configurable.

/// Polling fallback period in seconds while the push channel is down.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 4;

/// Fixed delay in seconds before a reconnect attempt. There is no backoff;
/// the polling fallback already bounds staleness while we retry.
pub const DEFAULT_RECONNECT_DELAY_SECS: u64 = 2;

/// Command channel capacity for the sync coordinator.
pub const COMMAND_CHANNEL_CAPACITY: usize = 64;

/// Event channel capacity for the sync and transport actors.
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Error message display duration in seconds before auto-dismiss.
pub const ERROR_TTL_SECS: u64 = 5;

/// Minimum terminal width to show split view (threads + conversation).
/// Below this width, only the focused pane is shown.
pub const MIN_SPLIT_VIEW_WIDTH: u16 = 80;

// === UI Constants ===

/// Minimum split ratio percentage for the thread list pane.
pub const SPLIT_RATIO_MIN: u16 = 20;

/// Maximum split ratio percentage for the thread list pane.
pub const SPLIT_RATIO_MAX: u16 = 60;

/// Terminal event poll timeout in milliseconds for the main loop tick.
pub const EVENT_POLL_MS: u64 = 100;
