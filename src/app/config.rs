// Application configuration types
//
// This module contains configuration structs, enums and constants for:
// - Service endpoint and polling intervals
// - Map backdrop and label settings
// - Threshold control steps

use clap::ValueEnum;
use std::path::PathBuf;
use std::time::Duration;

// ============================================================================
// Constants
// ============================================================================

/// Default monitoring service address
pub const DEFAULT_SERVER_URL: &str = "http://localhost:5000";

/// Event polling period in milliseconds
pub const EVENT_POLL_MS: u64 = 1000;

/// Stats polling period in milliseconds
pub const STATS_POLL_MS: u64 = 2000;

/// Per-request timeout; a timed-out poll is logged and skipped
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// UI frame interval (keyboard poll timeout)
pub const UI_TICK: Duration = Duration::from_millis(100);

/// Probability of labelling a simulated event on the map
pub const LABEL_PROBABILITY: f64 = 0.05;

/// Maximum number of lines kept in the console panel
pub const CONSOLE_MAX_LINES: usize = 50;

/// Default detection threshold in percent
pub const DEFAULT_THRESHOLD_PERCENT: u8 = 35;

/// Threshold adjustment step in percent
pub const THRESHOLD_STEP: u8 = 5;

/// How long a status-line notice stays visible
pub const NOTICE_DURATION: Duration = Duration::from_secs(4);

// ============================================================================
// Enums
// ============================================================================

/// World map backdrop drawn behind the event lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum MapBackdrop {
    /// High resolution coastlines (default)
    #[default]
    High,
    /// Low resolution coastlines
    Low,
    /// No backdrop; the draw pass skips it silently
    Off,
}

impl MapBackdrop {
    /// Cycle High -> Low -> Off -> High
    pub fn next(self) -> Self {
        match self {
            MapBackdrop::High => MapBackdrop::Low,
            MapBackdrop::Low => MapBackdrop::Off,
            MapBackdrop::Off => MapBackdrop::High,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MapBackdrop::High => "HI",
            MapBackdrop::Low => "LO",
            MapBackdrop::Off => "OFF",
        }
    }
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Runtime configuration assembled from the command line
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the monitoring service
    pub server_url: String,

    /// Event polling period
    pub event_interval: Duration,

    /// Stats polling period
    pub stats_interval: Duration,

    pub request_timeout: Duration,

    /// Start with alerts muted
    pub muted: bool,

    pub backdrop: MapBackdrop,

    /// Discord webhook to register with the service at startup
    pub webhook: Option<String>,

    /// Log destination (the TUI owns stdout)
    pub log_file: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            event_interval: Duration::from_millis(EVENT_POLL_MS),
            stats_interval: Duration::from_millis(STATS_POLL_MS),
            request_timeout: REQUEST_TIMEOUT,
            muted: false,
            backdrop: MapBackdrop::default(),
            webhook: None,
            log_file: PathBuf::from("threatscope.log"),
        }
    }
}

/// Map visual settings, toggled from the keyboard
#[derive(Debug, Clone)]
pub struct MapSettings {
    /// Show location labels (toggle with 't' key)
    pub labels_enabled: bool,

    /// Backdrop resolution (cycle with 'b' key)
    pub backdrop: MapBackdrop,
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            labels_enabled: true,
            backdrop: MapBackdrop::default(),
        }
    }
}
