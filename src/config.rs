//! Configuration loading and management

use std::path::PathBuf;

use anyhow::Result;

use crate::dictation::SessionConfig;

/// Which speech engine the daemon wires in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineKind {
    /// Built-in scripted engine, for hosts without a recognizer
    Simulated,
    /// No engine; dictation reports unavailable
    Off,
}

/// Daemon configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the Unix domain socket for IPC
    pub socket_path: PathBuf,

    /// Directory for runtime data
    pub data_dir: PathBuf,

    /// Engine selection (`VOICENOTE_ENGINE`: "simulated" or "off")
    pub engine: EngineKind,

    /// Dictation session settings (`VOICENOTE_LANG` overrides the language)
    pub dictation: SessionConfig,
}

impl Config {
    /// Load configuration from environment and defaults
    pub fn load() -> Result<Self> {
        let home = std::env::var("HOME")?;
        let data_dir = PathBuf::from(&home)
            .join(".local")
            .join("share")
            .join("voicenote");

        let socket_path = data_dir.join("daemon.sock");

        let engine = match std::env::var("VOICENOTE_ENGINE").ok().as_deref() {
            None | Some("") | Some("simulated") => EngineKind::Simulated,
            Some("off") => EngineKind::Off,
            Some(other) => anyhow::bail!("unknown VOICENOTE_ENGINE value: {other}"),
        };

        let mut dictation = SessionConfig::default();
        if let Ok(lang) = std::env::var("VOICENOTE_LANG") {
            if !lang.is_empty() {
                dictation.language = lang;
            }
        }

        Ok(Self {
            socket_path,
            data_dir,
            engine,
            dictation,
        })
    }

    /// Ensure data directory exists
    pub fn ensure_dirs(&self) -> Result<()> {
        std::fs::create_dir_all(&self.data_dir)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_load() {
        let config = Config::load().unwrap();
        assert!(config.socket_path.to_string_lossy().contains("voicenote"));
        assert!(config.dictation.continuous);
        assert!(config.dictation.interim_results);
        assert_eq!(config.dictation.max_alternatives, 1);
    }
}
