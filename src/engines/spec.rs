//! Specification-presence engine.
//!
//! Passes iff at least one specification document exists under the
//! convention locations: `spec.md` at the repository root, or any `*.md`
//! anywhere under `specs/`.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use super::{emit, Engine};
use crate::config::EngineSettings;
use crate::model::{Violation, AXIOM_MISSING_SPEC};

pub struct SpecEngine {
    settings: EngineSettings,
    repo_root: PathBuf,
}

impl SpecEngine {
    pub fn new(settings: EngineSettings, repo_root: &Path) -> Self {
        Self {
            settings,
            repo_root: repo_root.to_path_buf(),
        }
    }

    async fn has_spec_document(&self) -> bool {
        if path_is_file(&self.repo_root.join("spec.md")).await {
            return true;
        }
        contains_markdown(&self.repo_root.join("specs")).await
    }
}

async fn path_is_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|meta| meta.is_file())
        .unwrap_or(false)
}

/// Scan for any `*.md` file under `root`, walking subdirectories with a
/// work stack. Unreadable directories count as empty.
async fn contains_markdown(root: &Path) -> bool {
    let mut pending = vec![root.to_path_buf()];
    while let Some(dir) = pending.pop() {
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(_) => continue,
        };
        while let Ok(Some(entry)) = entries.next_entry().await {
            let path = entry.path();
            match entry.file_type().await {
                Ok(file_type) if file_type.is_dir() => pending.push(path),
                Ok(_) => {
                    if path.extension().is_some_and(|ext| ext == "md") {
                        return true;
                    }
                }
                Err(_) => {}
            }
        }
    }
    false
}

#[async_trait]
impl Engine for SpecEngine {
    fn category(&self) -> &'static str {
        "spec"
    }

    fn should_run(&self) -> bool {
        self.settings.enabled
    }

    async fn check(&self, _files: &[String]) -> Vec<Violation> {
        if !self.should_run() {
            return Vec::new();
        }
        let mut violations = Vec::new();
        if !self.has_spec_document().await {
            emit(
                &mut violations,
                AXIOM_MISSING_SPEC,
                ".",
                "No specification found".to_string(),
            );
        }
        violations
    }
}
