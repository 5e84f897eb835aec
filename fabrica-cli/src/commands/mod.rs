//! CLI command implementations

pub mod annotate;
pub mod artisan;
pub mod book;
pub mod chapter;
pub mod collection;
pub mod generate;
pub mod library;
pub mod media;
pub mod read;
pub mod settings;
pub mod transfer;

use anyhow::{Context, Result};
use fabrica_core::{AppState, Config, LocalStorage, Persistence};
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Loaded library plus the means to save it back
pub struct Workspace {
    pub config: Config,
    pub state: AppState,
    persistence: Persistence,
}

impl Workspace {
    pub async fn open(config: Config) -> Self {
        tracing::debug!(data_dir = %config.data_dir.display(), "opening library");
        let persistence = Persistence::new(Arc::new(LocalStorage::new(&config.data_dir)));
        let state = persistence.load().await;
        Self {
            config,
            state,
            persistence,
        }
    }

    /// Write changed documents. Failed writes are logged, not fatal.
    pub async fn save(&mut self) {
        let report = self.persistence.save(&mut self.state).await;
        for (document, reason) in &report.failed {
            eprintln!("Warning: could not save {}: {}", document.key(), reason);
        }
        tracing::debug!(written = report.written.len(), "library saved");
    }
}

/// Text given inline or read from a file
pub fn text_arg(text: Option<String>, file: Option<&Path>) -> Result<Option<String>> {
    match (text, file) {
        (Some(text), _) => Ok(Some(text)),
        (None, Some(path)) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))
            .map(Some),
        (None, None) => Ok(None),
    }
}

/// First `max` characters of `text` on one line
pub fn preview(text: &str, max: usize) -> String {
    let line: String = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if line.chars().count() > max {
        let cut: String = line.chars().take(max).collect();
        format!("{cut}…")
    } else {
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview() {
        assert_eq!(preview("uno\n dos", 20), "uno dos");
        assert_eq!(preview("abcdefgh", 3), "abc…");
    }
}
