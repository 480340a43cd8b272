// Sound output backends

use super::Voice;
use std::io::{self, Write};
use tracing::debug;

/// Host sound capability the synthesizer plays voices through
pub trait AudioOutput: Send {
    /// Start playing one voice; must not block or cancel earlier voices
    fn play(&mut self, voice: &Voice);

    /// Called once when the context leaves the suspended state
    fn resume(&mut self) {}
}

/// Rings the terminal bell once per voice
#[derive(Debug, Default)]
pub struct TerminalBell;

impl AudioOutput for TerminalBell {
    fn play(&mut self, voice: &Voice) {
        let mut stdout = io::stdout();
        if let Err(e) = stdout.write_all(b"\x07").and_then(|_| stdout.flush()) {
            debug!(error = %e, voice = voice.id, "Terminal bell unavailable");
        }
    }
}
