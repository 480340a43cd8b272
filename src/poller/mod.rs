// Polling scheduler and command worker
//
// Two independent interval tasks (events, stats) and one worker that runs
// user-triggered commands. Every fetch runs in its own task, so a slow
// request never delays the next tick; results reach the UI loop through
// one channel in arrival order.

use crate::api::{Ack, TelemetryApi};
use crate::app::config::ClientConfig;
use crate::telemetry::rules::RuleRequest;
use crate::telemetry::{EventResponse, RuleSet, Scenario, StatsResponse};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Data delivered to the UI loop
#[derive(Debug, Clone, PartialEq)]
pub enum PollMessage {
    /// One event-or-idle response
    Event(EventResponse),
    /// Stats snapshot, stamped with the sequence number of its request
    Stats { seq: u64, response: StatsResponse },
    /// Canonical rule set from the initial fetch or a confirmed mutation
    Rules(RuleSet),
    /// Acknowledgement of a control command
    Ack { command: &'static str, ack: Ack },
    /// A user-triggered command failed; the message is shown to the user
    CommandFailed { command: &'static str, reason: String },
}

/// User-triggered calls into the service
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SetScenario(Scenario),
    SetThreshold(f64),
    UpdateRule(RuleRequest),
    RegisterWebhook(String),
    FetchRules,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::SetScenario(_) => "scenario",
            Command::SetThreshold(_) => "threshold",
            Command::UpdateRule(_) => "rules",
            Command::RegisterWebhook(_) => "webhook",
            Command::FetchRules => "rules",
        }
    }
}

/// Drives the event and stats polling tasks
pub struct PollingScheduler {
    api: Arc<dyn TelemetryApi>,
    event_interval: Duration,
    stats_interval: Duration,
    tx: UnboundedSender<PollMessage>,
}

impl PollingScheduler {
    pub fn new(api: Arc<dyn TelemetryApi>, config: &ClientConfig, tx: UnboundedSender<PollMessage>) -> Self {
        Self {
            api,
            event_interval: config.event_interval,
            stats_interval: config.stats_interval,
            tx,
        }
    }

    /// Spawn both periodic tasks on the current runtime
    ///
    /// Tasks stop at their next tick once the receiving side is dropped.
    pub fn spawn(self) -> Vec<JoinHandle<()>> {
        info!(
            event_ms = self.event_interval.as_millis() as u64,
            stats_ms = self.stats_interval.as_millis() as u64,
            "Starting polling tasks"
        );
        vec![
            tokio::spawn(run_event_task(self.api.clone(), self.event_interval, self.tx.clone())),
            tokio::spawn(run_stats_task(self.api, self.stats_interval, self.tx)),
        ]
    }
}

fn ticker(period: Duration) -> tokio::time::Interval {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval
}

async fn run_event_task(api: Arc<dyn TelemetryApi>, period: Duration, tx: UnboundedSender<PollMessage>) {
    let mut interval = ticker(period);
    loop {
        interval.tick().await;
        if tx.is_closed() {
            debug!("Event poller stopping");
            return;
        }
        let api = api.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            match api.fetch_event().await {
                Ok(response) => {
                    let _ = tx.send(PollMessage::Event(response));
                }
                Err(e) => warn!(error = %e, "Event poll failed"),
            }
        });
    }
}

async fn run_stats_task(api: Arc<dyn TelemetryApi>, period: Duration, tx: UnboundedSender<PollMessage>) {
    let mut interval = ticker(period);
    let mut seq: u64 = 0;
    loop {
        interval.tick().await;
        if tx.is_closed() {
            debug!("Stats poller stopping");
            return;
        }
        seq += 1;
        let api = api.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            match api.fetch_stats().await {
                Ok(response) => {
                    let _ = tx.send(PollMessage::Stats { seq, response });
                }
                Err(e) => warn!(error = %e, seq, "Stats poll failed"),
            }
        });
    }
}

/// Run user commands as they arrive, each in its own task
pub fn spawn_command_worker(
    api: Arc<dyn TelemetryApi>,
    mut commands: UnboundedReceiver<Command>,
    tx: UnboundedSender<PollMessage>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(command) = commands.recv().await {
            let api = api.clone();
            let tx = tx.clone();
            tokio::spawn(async move {
                let message = execute_command(api.as_ref(), command).await;
                let _ = tx.send(message);
            });
        }
        debug!("Command worker stopping");
    })
}

async fn execute_command(api: &dyn TelemetryApi, command: Command) -> PollMessage {
    let name = command.name();
    let result = match command {
        Command::SetScenario(scenario) => api
            .set_scenario(scenario)
            .await
            .map(|ack| PollMessage::Ack { command: name, ack })
            .map_err(|e| e.to_string()),
        Command::SetThreshold(threshold) => api
            .set_threshold(threshold)
            .await
            .map(|ack| PollMessage::Ack { command: name, ack })
            .map_err(|e| e.to_string()),
        Command::RegisterWebhook(url) => api
            .set_webhook(&url)
            .await
            .map(|ack| PollMessage::Ack { command: name, ack })
            .map_err(|e| e.to_string()),
        Command::FetchRules => api
            .fetch_rules()
            .await
            .map(PollMessage::Rules)
            .map_err(|e| e.to_string()),
        Command::UpdateRule(request) => request
            .send(api)
            .await
            .map(PollMessage::Rules)
            .map_err(|e| e.to_string()),
    };

    match result {
        Ok(message) => {
            if let PollMessage::Ack { command, ack } = &message {
                info!(command, status = %ack.status, message = ?ack.message, "Control acknowledged");
            }
            message
        }
        Err(reason) => {
            warn!(command = name, %reason, "Command failed");
            PollMessage::CommandFailed { command: name, reason }
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::api::{ApiError, ApiResult, RuleAction};
    use crate::telemetry::{ListType, SecurityEvent};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// In-memory service: queued events, canned stats and a rule set
    #[derive(Default)]
    pub struct FakeApi {
        pub events: Mutex<VecDeque<SecurityEvent>>,
        pub stats: Mutex<StatsResponse>,
        pub rules: Mutex<RuleSet>,
        pub fail_stats: Mutex<bool>,
        pub calls: Mutex<Vec<String>>,
        /// Artificial latency of every event fetch
        pub event_latency: Mutex<Duration>,
        pub event_fetches: AtomicUsize,
    }

    impl FakeApi {
        pub fn with_events(events: impl IntoIterator<Item = SecurityEvent>) -> Self {
            Self {
                events: Mutex::new(events.into_iter().collect()),
                ..Self::default()
            }
        }

        fn record(&self, call: impl Into<String>) {
            self.calls.lock().unwrap().push(call.into());
        }

        fn ack() -> Ack {
            Ack {
                status: "ok".to_string(),
                message: None,
            }
        }
    }

    #[async_trait]
    impl TelemetryApi for FakeApi {
        async fn fetch_event(&self) -> ApiResult<EventResponse> {
            self.event_fetches.fetch_add(1, Ordering::SeqCst);
            let latency = *self.event_latency.lock().unwrap();
            if !latency.is_zero() {
                tokio::time::sleep(latency).await;
            }
            let next = self.events.lock().unwrap().pop_front();
            Ok(match next {
                Some(event) => EventResponse::Event(Box::new(event)),
                None => EventResponse::Idle,
            })
        }

        async fn fetch_stats(&self) -> ApiResult<StatsResponse> {
            if *self.fail_stats.lock().unwrap() {
                return Err(ApiError::Rejected("stats unavailable".to_string()));
            }
            Ok(self.stats.lock().unwrap().clone())
        }

        async fn set_scenario(&self, scenario: Scenario) -> ApiResult<Ack> {
            self.record(format!("scenario:{}", scenario.as_wire()));
            Ok(Self::ack())
        }

        async fn set_threshold(&self, threshold: f64) -> ApiResult<Ack> {
            self.record(format!("threshold:{threshold:.2}"));
            Ok(Self::ack())
        }

        async fn set_webhook(&self, url: &str) -> ApiResult<Ack> {
            self.record(format!("webhook:{url}"));
            Ok(Ack {
                status: "error".to_string(),
                message: Some("Invalid Discord URL".to_string()),
            })
        }

        async fn fetch_rules(&self) -> ApiResult<RuleSet> {
            self.record("rules");
            Ok(self.rules.lock().unwrap().clone())
        }

        async fn update_rule(&self, action: RuleAction, ip: &str, list: ListType) -> ApiResult<RuleSet> {
            self.record(format!("rule:{action:?}:{ip}"));
            let mut rules = self.rules.lock().unwrap();
            let target = match list {
                ListType::Allow => &mut rules.allow,
                ListType::Deny => &mut rules.deny,
            };
            match action {
                RuleAction::Add => {
                    target.insert(ip.to_string());
                }
                RuleAction::Remove => {
                    target.remove(ip);
                }
            }
            Ok(rules.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::FakeApi;
    use super::*;
    use crate::telemetry::fixtures::event;
    use crate::telemetry::{ListType, RuleStore, ServiceStats, Severity};
    use tokio::sync::mpsc;

    fn config(event_ms: u64, stats_ms: u64) -> ClientConfig {
        ClientConfig {
            event_interval: Duration::from_millis(event_ms),
            stats_interval: Duration::from_millis(stats_ms),
            ..ClientConfig::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_event_task_delivers_in_order_then_idle() {
        let api = Arc::new(FakeApi::with_events((0..3).map(|n| event(n, Severity::Low, false))));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let handles = PollingScheduler::new(api, &config(1000, 60_000), tx).spawn();

        let mut ids = Vec::new();
        let mut idle = 0;
        while ids.len() < 3 || idle < 2 {
            match rx.recv().await {
                Some(PollMessage::Event(EventResponse::Event(e))) => ids.push(e.id.unwrap()),
                Some(PollMessage::Event(EventResponse::Idle)) => idle += 1,
                Some(_) => {}
                None => break,
            }
        }
        assert_eq!(ids, vec![0, 1, 2]);
        for h in handles {
            h.abort();
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_event_fetch_does_not_delay_ticks() {
        let api = Arc::new(FakeApi::default());
        *api.event_latency.lock().unwrap() = Duration::from_secs(10);
        let (tx, mut rx) = mpsc::unbounded_channel();
        let handles = PollingScheduler::new(api.clone(), &config(1000, 60_000), tx).spawn();

        // Ticks at 0, 1, 2, 3 and 4 s; none of the 10 s fetches has finished
        tokio::time::sleep(Duration::from_millis(4500)).await;
        assert_eq!(api.event_fetches.load(std::sync::atomic::Ordering::SeqCst), 5);
        while let Ok(message) = rx.try_recv() {
            assert!(!matches!(message, PollMessage::Event(_)));
        }

        // The overlapping fetches all complete once their latency elapses
        tokio::time::sleep(Duration::from_secs(10)).await;
        let mut idle = 0;
        while let Ok(message) = rx.try_recv() {
            if message == PollMessage::Event(EventResponse::Idle) {
                idle += 1;
            }
        }
        assert!(idle >= 5);
        for h in handles {
            h.abort();
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_stats_task_stamps_increasing_sequence() {
        let api = Arc::new(FakeApi::default());
        *api.stats.lock().unwrap() = StatsResponse {
            stats: Some(ServiceStats {
                total_requests: Some(5),
                ..ServiceStats::default()
            }),
            system: None,
        };
        let (tx, mut rx) = mpsc::unbounded_channel();
        let handles = PollingScheduler::new(api, &config(60_000, 2000), tx).spawn();

        let mut seqs = Vec::new();
        while seqs.len() < 3 {
            if let Some(PollMessage::Stats { seq, response }) = rx.recv().await {
                assert_eq!(response.stats.and_then(|s| s.total_requests), Some(5));
                seqs.push(seq);
            }
        }
        assert_eq!(seqs, vec![1, 2, 3]);
        for h in handles {
            h.abort();
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_stats_poll_is_skipped() {
        let api = Arc::new(FakeApi::default());
        *api.fail_stats.lock().unwrap() = true;
        let (tx, mut rx) = mpsc::unbounded_channel();
        let handles = PollingScheduler::new(api.clone(), &config(60_000, 2000), tx).spawn();

        // Let a few ticks fail, then recover
        tokio::time::sleep(Duration::from_millis(4500)).await;
        *api.fail_stats.lock().unwrap() = false;

        let mut first_ok = None;
        while first_ok.is_none() {
            if let Some(PollMessage::Stats { seq, .. }) = rx.recv().await {
                first_ok = Some(seq);
            }
        }
        // Sequences 1..=3 failed and produced no message
        assert!(first_ok.unwrap() > 3);
        for h in handles {
            h.abort();
        }
    }

    #[tokio::test]
    async fn test_command_worker_round_trip() {
        let api = Arc::new(FakeApi::default());
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let worker = spawn_command_worker(api.clone(), cmd_rx, tx);

        let store = RuleStore::new();
        let request = store.request_add("10.0.0.5", ListType::Deny).unwrap();
        cmd_tx.send(Command::UpdateRule(request)).unwrap();

        match rx.recv().await {
            Some(PollMessage::Rules(rules)) => assert!(rules.contains("10.0.0.5", ListType::Deny)),
            other => panic!("unexpected message: {other:?}"),
        }

        cmd_tx.send(Command::RegisterWebhook("http://example.com".to_string())).unwrap();
        match rx.recv().await {
            Some(PollMessage::Ack { command, ack }) => {
                assert_eq!(command, "webhook");
                assert!(!ack.is_ok());
            }
            other => panic!("unexpected message: {other:?}"),
        }

        drop(cmd_tx);
        worker.await.unwrap();
        assert_eq!(api.calls.lock().unwrap().len(), 2);
    }
}
