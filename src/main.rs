//! voicenote-daemon: Background daemon for voice-first note composition
//!
//! The daemon owns the note composition core of a voice note-taking app:
//! - Explicit state machine for the three dialog modes (onboarding,
//!   free-text editing, live dictation)
//! - Dictation bridge: speech engines behind an injected capability trait
//! - IPC server so a UI front-end can drive composition and receive
//!   toasts, mode changes, live transcripts, and created notes

mod composer;
mod config;
mod dictation;
mod events;
mod ipc;
mod lifecycle;

use anyhow::Result;
use tokio::sync::{broadcast, mpsc};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::composer::Composer;
use crate::config::{Config, EngineKind};
use crate::dictation::{NullEngine, SimulatedEngine, SpeechEngine};
use crate::events::ComposerEvent;
use crate::ipc::Server;
use crate::lifecycle::ShutdownSignal;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "voicenote-daemon starting"
    );

    // Load configuration
    let config = Config::load()?;
    config.ensure_dirs()?;
    info!(?config.socket_path, engine = ?config.engine, "configuration loaded");

    // Create shutdown signal handler
    let shutdown = ShutdownSignal::new();

    // Create channels for inter-component communication
    // IPC server -> composer (UI commands)
    let (command_tx, command_rx) = mpsc::channel(32);
    // Dictation session -> composer (live transcripts and errors)
    let (dictation_tx, dictation_rx) = mpsc::channel(32);
    // Composer -> IPC server (status tracking and client notifications)
    let (event_tx, _event_rx) = broadcast::channel::<ComposerEvent>(64);

    // Pick the speech engine
    let engine: Box<dyn SpeechEngine> = match config.engine {
        EngineKind::Simulated => Box::new(SimulatedEngine::default()),
        EngineKind::Off => {
            warn!("dictation disabled, recording requests will be rejected");
            Box::new(NullEngine)
        }
    };
    let dictation_available = engine.is_available();

    // Create the composer
    let mut composer = Composer::new(
        engine,
        config.dictation.clone(),
        dictation_tx,
        event_tx.clone(),
    );

    // Create IPC server with command forwarding and event subscriptions
    let server = Server::new(
        &config.socket_path,
        command_tx,
        event_tx.clone(),
        dictation_available,
    )?;

    // Subscribe to composer events for IPC status updates
    let mut status_rx = event_tx.subscribe();
    let server_for_events = &server;

    info!("daemon initialized, entering main loop");

    // Main event loop
    tokio::select! {
        // Run the composer (processes UI commands and dictation events)
        _ = composer.run(command_rx, dictation_rx) => {
            info!("composer exited");
        }

        // Run the IPC server (accepts client connections)
        result = server.run() => {
            if let Err(e) = result {
                error!(?e, "IPC server error");
            }
        }

        // Mirror composer events into the server's status snapshot
        _ = async {
            loop {
                match status_rx.recv().await {
                    Ok(event) => {
                        server_for_events.apply_event(&event).await;
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!(skipped = n, "status event receiver lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        break;
                    }
                }
            }
        } => {
            info!("status event handler exited");
        }

        // Wait for shutdown signal
        _ = shutdown.wait() => {
            info!("shutdown signal received");
        }
    }

    // Cleanup
    info!("shutting down...");

    // A live dictation session is an external resource; release it before
    // the process exits rather than leaking it with the teardown.
    composer.shutdown();
    server.shutdown().await;

    info!("voicenote-daemon stopped");

    Ok(())
}
