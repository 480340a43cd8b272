// Alert synthesizer
//
// Procedural audio bursts keyed by severity. The sound-output context is a
// lazily created shared resource: it is only created (and resumed) after the
// user has interacted with the UI, and it is never re-created afterwards.

mod output;

pub use output::{AudioOutput, TerminalBell};

use crate::telemetry::Severity;
use tracing::{debug, info};

/// Oscillator shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sawtooth,
    Square,
}

/// Linear frequency ramp from the start frequency to `target_hz`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrequencyRamp {
    pub target_hz: f64,
    pub duration_s: f64,
}

/// Exponential gain decay from `start` toward `decay_target` over `duration_s`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GainEnvelope {
    pub start: f64,
    pub decay_target: f64,
    pub duration_s: f64,
}

/// Parameters of one alert burst
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlertEnvelope {
    pub waveform: Waveform,
    pub start_hz: f64,
    pub frequency_ramp: Option<FrequencyRamp>,
    pub gain: GainEnvelope,
}

impl AlertEnvelope {
    /// Rising sawtooth siren used for critical attacks
    pub const CRITICAL: AlertEnvelope = AlertEnvelope {
        waveform: Waveform::Sawtooth,
        start_hz: 800.0,
        frequency_ramp: Some(FrequencyRamp {
            target_hz: 1200.0,
            duration_s: 0.1,
        }),
        gain: GainEnvelope {
            start: 0.1,
            decay_target: 0.01,
            duration_s: 0.5,
        },
    };

    /// Short square blip used for every other attack severity
    pub const STANDARD: AlertEnvelope = AlertEnvelope {
        waveform: Waveform::Square,
        start_hz: 600.0,
        frequency_ramp: None,
        gain: GainEnvelope {
            start: 0.05,
            decay_target: 0.01,
            duration_s: 0.2,
        },
    };

    pub fn for_severity(severity: Severity) -> Self {
        match severity {
            Severity::Critical => Self::CRITICAL,
            _ => Self::STANDARD,
        }
    }

    /// Emission stops automatically when the gain envelope ends
    pub fn duration_s(&self) -> f64 {
        self.gain.duration_s
    }

    pub fn frequency_at(&self, t: f64) -> f64 {
        match self.frequency_ramp {
            Some(ramp) if ramp.duration_s > 0.0 => {
                let progress = (t / ramp.duration_s).clamp(0.0, 1.0);
                self.start_hz + (ramp.target_hz - self.start_hz) * progress
            }
            Some(ramp) => ramp.target_hz,
            None => self.start_hz,
        }
    }

    /// g(t) = start * (target / start)^(t / duration), held at the target afterwards
    pub fn gain_at(&self, t: f64) -> f64 {
        let g = self.gain;
        if g.duration_s <= 0.0 || g.start <= 0.0 {
            return g.decay_target;
        }
        let progress = (t / g.duration_s).clamp(0.0, 1.0);
        g.start * (g.decay_target / g.start).powf(progress)
    }
}

/// One independent sound instance
#[derive(Debug, Clone, PartialEq)]
pub struct Voice {
    pub id: u64,
    pub severity: Severity,
    pub envelope: AlertEnvelope,
}

impl Voice {
    /// Synthesize mono PCM for the whole burst
    pub fn render(&self, sample_rate: u32) -> Vec<f32> {
        let sr = f64::from(sample_rate.max(1));
        let total = (self.envelope.duration_s() * sr).round() as usize;
        let mut samples = Vec::with_capacity(total);
        let mut phase = 0.0f64;

        for n in 0..total {
            let t = n as f64 / sr;
            let osc = match self.envelope.waveform {
                Waveform::Sawtooth => 2.0 * phase - 1.0,
                Waveform::Square => {
                    if phase < 0.5 {
                        1.0
                    } else {
                        -1.0
                    }
                }
            };
            samples.push((osc * self.envelope.gain_at(t)) as f32);
            phase = (phase + self.envelope.frequency_at(t) / sr).fract();
        }

        samples
    }

    /// Peak amplitude per bucket, scaled to 0-100, for the alert scope
    pub fn scope(&self, buckets: usize) -> Vec<u64> {
        let samples = self.render(SCOPE_SAMPLE_RATE);
        if buckets == 0 || samples.is_empty() {
            return Vec::new();
        }
        let peak = self.envelope.gain.start.max(f64::EPSILON);
        let chunk = samples.len().div_ceil(buckets).max(1);
        samples
            .chunks(chunk)
            .map(|c| {
                let max = c.iter().fold(0.0f32, |acc, s| acc.max(s.abs()));
                ((f64::from(max) / peak) * 100.0).round().clamp(0.0, 100.0) as u64
            })
            .collect()
    }
}

/// Sample rate used when rendering the on-screen scope
const SCOPE_SAMPLE_RATE: u32 = 8_000;

/// Lifecycle of the sound-output context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextState {
    Suspended,
    Running,
}

/// The shared sound-output resource
pub struct AudioContext {
    state: ContextState,
    output: Box<dyn AudioOutput>,
}

impl AudioContext {
    /// Contexts start suspended until explicitly resumed
    fn new(output: Box<dyn AudioOutput>) -> Self {
        Self {
            state: ContextState::Suspended,
            output,
        }
    }

    fn resume(&mut self) {
        if self.state == ContextState::Suspended {
            self.output.resume();
            self.state = ContextState::Running;
        }
    }

    pub fn state(&self) -> ContextState {
        self.state
    }
}

/// Mute-gated, activation-gated alert player
pub struct AlertSynthesizer {
    /// Output waiting for the first user interaction
    pending_output: Option<Box<dyn AudioOutput>>,
    context: Option<AudioContext>,
    muted: bool,
    next_voice_id: u64,
    last_voice: Option<Voice>,
}

impl AlertSynthesizer {
    pub fn new(output: Box<dyn AudioOutput>, muted: bool) -> Self {
        Self {
            pending_output: Some(output),
            context: None,
            muted,
            next_voice_id: 0,
            last_voice: None,
        }
    }

    /// Grant the audio capability after a user interaction
    ///
    /// Creates the context on first call and resumes it if suspended;
    /// later calls reuse the same context.
    pub fn activate(&mut self) {
        if self.context.is_none() {
            if let Some(output) = self.pending_output.take() {
                info!("Audio context created after user interaction");
                self.context = Some(AudioContext::new(output));
            }
        }
        if let Some(ctx) = self.context.as_mut() {
            ctx.resume();
        }
    }

    pub fn is_activated(&self) -> bool {
        self.context
            .as_ref()
            .is_some_and(|c| c.state() == ContextState::Running)
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Does not stop sounds already playing
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Start an independent voice for `severity`
    ///
    /// Returns `None` without touching the output when muted or not yet
    /// activated.
    pub fn play_alert(&mut self, severity: Severity) -> Option<u64> {
        if self.muted {
            return None;
        }
        let ctx = self.context.as_mut().filter(|c| c.state == ContextState::Running)?;

        self.next_voice_id += 1;
        let voice = Voice {
            id: self.next_voice_id,
            severity,
            envelope: AlertEnvelope::for_severity(severity),
        };
        debug!(voice = voice.id, severity = severity.as_str(), "Playing alert");
        ctx.output.play(&voice);
        let id = voice.id;
        self.last_voice = Some(voice);
        Some(id)
    }

    pub fn last_voice(&self) -> Option<&Voice> {
        self.last_voice.as_ref()
    }
}
