//! Built-in engines: a scripted simulator and an always-unavailable stub.
//!
//! The simulator replays a fixed sequence of transcript snapshots the way a
//! continuous recognizer re-sends everything heard so far, which makes the
//! whole dictation path exercisable on hosts with no recognizer at all.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::engine::{DictationError, DictationSession, SessionConfig, SpeechEngine};
use super::transcript::{DictationEvent, RecognitionAlternative, RecognitionResult};

/// Scripted engine that replays transcript snapshots on a timer.
pub struct SimulatedEngine {
    script: Vec<String>,
    interval: Duration,
}

impl SimulatedEngine {
    /// Create an engine that will replay `script`, one snapshot per tick.
    /// Each entry is the full transcript recognized up to that point.
    pub fn new(script: Vec<String>) -> Self {
        Self {
            script,
            interval: Duration::from_millis(400),
        }
    }

    /// Override the delay between snapshots.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }
}

impl Default for SimulatedEngine {
    fn default() -> Self {
        Self::new(vec![
            "lembrar de".to_string(),
            "lembrar de regar".to_string(),
            "lembrar de regar as plantas".to_string(),
        ])
    }
}

impl SpeechEngine for SimulatedEngine {
    fn name(&self) -> &'static str {
        "simulated"
    }

    fn is_available(&self) -> bool {
        true
    }

    fn open_session(
        &mut self,
        config: &SessionConfig,
        events_tx: mpsc::Sender<DictationEvent>,
    ) -> Result<Box<dyn DictationSession>, DictationError> {
        let stopped = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stopped);
        let script = self.script.clone();
        let interval = self.interval;
        let continuous = config.continuous;
        let interim_results = config.interim_results;

        tokio::spawn(async move {
            debug!(snapshots = script.len(), "simulated dictation session started");

            let last = script.len().saturating_sub(1);
            for (index, transcript) in script.into_iter().enumerate() {
                tokio::time::sleep(interval).await;
                if flag.load(Ordering::SeqCst) {
                    break;
                }

                let is_final = index == last;
                if !interim_results && !is_final {
                    continue;
                }

                let event = DictationEvent::Result {
                    results: vec![RecognitionResult {
                        alternatives: vec![RecognitionAlternative::new(transcript, 0.9)],
                        is_final,
                    }],
                };
                if events_tx.send(event).await.is_err() {
                    warn!("dictation event receiver dropped, ending session");
                    break;
                }
            }

            // A non-continuous recognizer ends itself after the first phrase;
            // a continuous one keeps listening (silently, here) until stopped.
            if !continuous {
                flag.store(true, Ordering::SeqCst);
            }

            debug!("simulated dictation script exhausted");
        });

        Ok(Box::new(SimulatedSession { stopped }))
    }
}

#[derive(Debug)]
struct SimulatedSession {
    stopped: Arc<AtomicBool>,
}

impl DictationSession for SimulatedSession {
    fn stop(&mut self) {
        if !self.stopped.swap(true, Ordering::SeqCst) {
            debug!("simulated dictation session stopped");
        }
    }

    fn is_active(&self) -> bool {
        !self.stopped.load(Ordering::SeqCst)
    }
}

/// Engine for hosts with no recognizer. Reports unavailable and refuses
/// to open sessions.
pub struct NullEngine;

impl SpeechEngine for NullEngine {
    fn name(&self) -> &'static str {
        "off"
    }

    fn is_available(&self) -> bool {
        false
    }

    fn open_session(
        &mut self,
        _config: &SessionConfig,
        _events_tx: mpsc::Sender<DictationEvent>,
    ) -> Result<Box<dyn DictationSession>, DictationError> {
        Err(DictationError::Unavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictation::assemble_transcript;

    fn fast_engine(script: &[&str]) -> SimulatedEngine {
        SimulatedEngine::new(script.iter().map(|s| s.to_string()).collect())
            .with_interval(Duration::from_millis(1))
    }

    async fn next_transcript(rx: &mut mpsc::Receiver<DictationEvent>) -> String {
        match rx.recv().await.expect("session ended early") {
            DictationEvent::Result { results } => assemble_transcript(&results),
            DictationEvent::Error { message } => panic!("unexpected error event: {message}"),
        }
    }

    #[tokio::test]
    async fn replays_snapshots_in_order() {
        let mut engine = fast_engine(&["hello", "hello world"]);
        let (tx, mut rx) = mpsc::channel(8);

        let session = engine
            .open_session(&SessionConfig::default(), tx)
            .expect("session should open");
        assert!(session.is_active());

        assert_eq!(next_transcript(&mut rx).await, "hello");
        assert_eq!(next_transcript(&mut rx).await, "hello world");
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn stop_ends_event_delivery() {
        let mut engine = fast_engine(&["one", "two", "three"]);
        let (tx, mut rx) = mpsc::channel(8);

        let mut session = engine
            .open_session(&SessionConfig::default(), tx)
            .expect("session should open");
        session.stop();
        session.stop();
        assert!(!session.is_active());

        // The task observes the flag before the first delivery.
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn interim_results_can_be_suppressed() {
        let mut engine = fast_engine(&["partial", "partial done"]);
        let (tx, mut rx) = mpsc::channel(8);

        let config = SessionConfig {
            interim_results: false,
            ..SessionConfig::default()
        };
        let _session = engine.open_session(&config, tx).expect("session should open");

        assert_eq!(next_transcript(&mut rx).await, "partial done");
        assert!(rx.recv().await.is_none());
    }

    #[test]
    fn null_engine_is_unavailable() {
        let mut engine = NullEngine;
        assert!(!engine.is_available());

        let (tx, _rx) = mpsc::channel(1);
        let err = engine
            .open_session(&SessionConfig::default(), tx)
            .expect_err("null engine must refuse sessions");
        assert!(matches!(err, DictationError::Unavailable));
    }
}
