// Application state management
//
// This module contains the session state that owns every piece of client
// data (event buffer, charts, metrics, rules, alert synthesizer) and applies
// service responses to it. Each field has a single writer: the UI loop.

pub mod config;
pub mod event;

pub use config::{ClientConfig, MapBackdrop, MapSettings};

use crate::audio::AlertSynthesizer;
use crate::poller::{Command, PollMessage};
use crate::telemetry::{
    ChartState, EventResponse, EventRingBuffer, ListType, Metrics, RuleStore, Scenario,
    SecurityEvent, StatsResponse,
};
use crate::ui::world_map::MapRenderer;
use config::{DEFAULT_THRESHOLD_PERCENT, NOTICE_DURATION, THRESHOLD_STEP};
use ratatui::widgets::ListState;
use std::time::Instant;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

/// Transient message shown in the status bar
#[derive(Debug, Clone)]
pub struct Notice {
    pub text: String,
    pub is_error: bool,
    pub shown_at: Instant,
}

/// IP being typed into the firewall panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleInput {
    pub text: String,
    pub list: ListType,
}

/// Main application state
pub struct AppState {
    /// Whether the application is running
    pub running: bool,

    /// Most recent events, oldest first
    pub buffer: EventRingBuffer,

    /// Probability series and category distribution
    pub charts: ChartState,

    /// Plain metric display values
    pub metrics: Metrics,

    /// Sequence number of the newest applied stats snapshot
    last_stats_seq: u64,

    /// Server-confirmed allow/deny lists
    pub rules: RuleStore,

    pub synth: AlertSynthesizer,

    /// Cached map scene, rebuilt after every push and on resize
    pub map: MapRenderer,

    pub map_settings: MapSettings,

    /// Scenario most recently requested from the simulator
    pub scenario: Scenario,

    /// Detection threshold in percent
    pub threshold_percent: u8,

    /// Active rule input line, if the user is typing an IP
    pub rule_input: Option<RuleInput>,

    /// Selection in the firewall rule list
    pub rule_list_state: ListState,

    pub notice: Option<Notice>,

    /// Outbound user commands
    commands: UnboundedSender<Command>,
}

impl AppState {
    /// Create the session and request the initial rule set
    pub fn new(config: &ClientConfig, synth: AlertSynthesizer, commands: UnboundedSender<Command>) -> Self {
        let mut state = Self {
            running: true,
            buffer: EventRingBuffer::new(),
            charts: ChartState::default(),
            metrics: Metrics::default(),
            last_stats_seq: 0,
            rules: RuleStore::new(),
            synth,
            map: MapRenderer::new(),
            map_settings: MapSettings {
                backdrop: config.backdrop,
                ..MapSettings::default()
            },
            scenario: Scenario::default(),
            threshold_percent: DEFAULT_THRESHOLD_PERCENT,
            rule_input: None,
            rule_list_state: ListState::default(),
            notice: None,
            commands,
        };

        state.send(Command::FetchRules);
        if let Some(url) = &config.webhook {
            state.send(Command::RegisterWebhook(url.clone()));
        }

        state
    }

    /// Update time-based state; returns `true` when a notice expired
    pub fn on_tick(&mut self) -> bool {
        let expired = self
            .notice
            .as_ref()
            .is_some_and(|notice| notice.shown_at.elapsed() >= NOTICE_DURATION);
        if expired {
            self.notice = None;
        }
        expired
    }

    /// Apply one message from the pollers or the command worker
    ///
    /// Returns `true` when visible state changed.
    pub fn apply(&mut self, message: PollMessage) -> bool {
        match message {
            PollMessage::Event(EventResponse::Idle) => false,
            PollMessage::Event(EventResponse::Event(event)) => {
                self.apply_event(*event);
                true
            }
            PollMessage::Stats { seq, response } => self.apply_stats(seq, &response),
            PollMessage::Rules(rules) => {
                let changed = self.rules.apply_server_rules(rules);
                self.clamp_rule_selection();
                changed
            }
            PollMessage::Ack { command, ack } => {
                if !ack.is_ok() {
                    let reason = ack.message.unwrap_or_else(|| ack.status.clone());
                    self.set_notice(format!("{command}: {reason}"), true);
                } else if let Some(message) = ack.message {
                    self.set_notice(message, false);
                }
                true
            }
            PollMessage::CommandFailed { command, reason } => {
                self.set_notice(format!("{command} failed: {reason}"), true);
                true
            }
        }
    }

    /// Push an event and refresh every view that depends on it
    pub fn apply_event(&mut self, event: SecurityEvent) {
        debug!(ip = %event.source_ip, severity = event.verdict.severity.as_str(), "Event received");
        let probability = event.verdict.probability;
        let alert = event.verdict.is_attack.then_some(event.verdict.severity);

        self.buffer.push(event);
        if let Some(severity) = alert {
            self.synth.play_alert(severity);
        }
        self.charts.push_sample(probability);
        self.map.redraw(&self.buffer, &self.map_settings);
    }

    /// Apply a stats snapshot unless a newer one was already applied
    pub fn apply_stats(&mut self, seq: u64, response: &StatsResponse) -> bool {
        if seq <= self.last_stats_seq {
            debug!(seq, last = self.last_stats_seq, "Discarding stale stats snapshot");
            return false;
        }
        self.last_stats_seq = seq;
        self.metrics.apply(response);
        if let Some(attack_types) = response.stats.as_ref().and_then(|s| s.attack_types.as_ref()) {
            self.charts.set_distribution(attack_types);
        }
        true
    }

    /// First user interaction grants the audio capability
    pub fn on_user_interaction(&mut self) {
        if !self.synth.is_activated() {
            self.synth.activate();
        }
    }

    pub fn toggle_mute(&mut self) {
        self.synth.activate();
        let muted = !self.synth.is_muted();
        self.synth.set_muted(muted);
        info!(muted, "Alert sound toggled");
    }

    pub fn set_scenario(&mut self, scenario: Scenario) {
        self.scenario = scenario;
        info!(scenario = scenario.as_wire(), "Scenario requested");
        self.send(Command::SetScenario(scenario));
    }

    /// Move the detection threshold by `steps` increments, clamped to 0..=100%
    pub fn adjust_threshold(&mut self, steps: i16) {
        let delta = steps * i16::from(THRESHOLD_STEP);
        let next = (i16::from(self.threshold_percent) + delta).clamp(0, 100) as u8;
        if next == self.threshold_percent {
            return;
        }
        self.threshold_percent = next;
        self.send(Command::SetThreshold(f64::from(next) / 100.0));
    }

    pub fn toggle_labels(&mut self) {
        self.map_settings.labels_enabled = !self.map_settings.labels_enabled;
        self.map.redraw(&self.buffer, &self.map_settings);
    }

    pub fn cycle_backdrop(&mut self) {
        self.map_settings.backdrop = self.map_settings.backdrop.next();
        self.map.redraw(&self.buffer, &self.map_settings);
    }

    /// Rebuild the map scene if the drawing surface changed size
    pub fn resize_map(&mut self, viewport_w: f64, viewport_h: f64) {
        if self.map.set_viewport(viewport_w, viewport_h) {
            self.map.redraw(&self.buffer, &self.map_settings);
        }
    }

    // ------------------------------------------------------------------------
    // Firewall rules
    // ------------------------------------------------------------------------

    pub fn begin_rule_input(&mut self) {
        self.rule_input = Some(RuleInput {
            text: String::new(),
            list: ListType::Deny,
        });
    }

    pub fn cancel_rule_input(&mut self) {
        self.rule_input = None;
    }

    /// Validate the typed IP and send the add request
    ///
    /// Malformed input is reported locally and never reaches the network.
    pub fn submit_rule_input(&mut self) {
        let Some(input) = self.rule_input.clone() else {
            return;
        };
        match self.rules.request_add(&input.text, input.list) {
            Ok(request) => {
                self.rule_input = None;
                self.send(Command::UpdateRule(request));
            }
            Err(e) => {
                warn!(input = %input.text, "Rejected rule input");
                self.set_notice(e.to_string(), true);
            }
        }
    }

    pub fn select_next_rule(&mut self) {
        let count = self.rules.rules().len();
        if count == 0 {
            self.rule_list_state.select(None);
            return;
        }
        let next = match self.rule_list_state.selected() {
            None => 0,
            Some(idx) => (idx + 1).min(count - 1),
        };
        self.rule_list_state.select(Some(next));
    }

    pub fn select_previous_rule(&mut self) {
        let count = self.rules.rules().len();
        if count == 0 {
            self.rule_list_state.select(None);
            return;
        }
        let prev = match self.rule_list_state.selected() {
            None => count - 1,
            Some(idx) => idx.saturating_sub(1),
        };
        self.rule_list_state.select(Some(prev));
    }

    /// Request removal of the selected rule; the list updates on confirmation
    pub fn remove_selected_rule(&mut self) {
        let Some(idx) = self.rule_list_state.selected() else {
            return;
        };
        let request = self
            .rules
            .rules()
            .entries()
            .get(idx)
            .map(|(list, ip)| self.rules.request_remove(ip, *list));
        if let Some(request) = request {
            self.send(Command::UpdateRule(request));
        }
    }

    fn clamp_rule_selection(&mut self) {
        let count = self.rules.rules().len();
        match self.rule_list_state.selected() {
            Some(_) if count == 0 => self.rule_list_state.select(None),
            Some(idx) if idx >= count => self.rule_list_state.select(Some(count - 1)),
            _ => {}
        }
    }

    // ------------------------------------------------------------------------

    pub fn set_notice(&mut self, text: impl Into<String>, is_error: bool) {
        self.notice = Some(Notice {
            text: text.into(),
            is_error,
            shown_at: Instant::now(),
        });
    }

    fn send(&mut self, command: Command) {
        if let Err(e) = self.commands.send(command) {
            warn!(command = e.0.name(), "Command worker unavailable");
            self.set_notice("service link unavailable", true);
        }
    }
}
