use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU8, Ordering};

use thiserror::Error;
use tracing::info;

use crate::config::ConfigStore;
use crate::migrate::{MigrationError, MigrationRunner};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum InstallState {
    Uninitialized,
    Installing,
    Installed,
}

#[derive(Debug, Error)]
pub enum InstallError {
    #[error("install io error for {path}: {message}")]
    Io { path: String, message: String },
    #[error("migration failed during install: {0}")]
    Migration(#[from] MigrationError),
}

#[derive(Clone, Copy, Debug, Default)]
pub struct InstallOutcome {
    pub config_published: bool,
    pub migrations_applied: usize,
}

/// First-run installation. The marker file is written last, so a failed
/// install leaves the state uninstalled and the next startup retries.
pub struct Installer {
    marker_path: PathBuf,
    config_path: PathBuf,
    state: AtomicU8,
}

const STATE_UNINITIALIZED: u8 = 0;
const STATE_INSTALLING: u8 = 1;
const STATE_INSTALLED: u8 = 2;

impl Installer {
    pub fn new(marker_path: impl Into<PathBuf>, config_path: impl Into<PathBuf>) -> Self {
        Self {
            marker_path: marker_path.into(),
            config_path: config_path.into(),
            state: AtomicU8::new(STATE_UNINITIALIZED),
        }
    }

    pub fn from_config(config: &ConfigStore) -> Self {
        Self::new(
            config.get_string("install.marker_path"),
            config.get_string("install.config_path"),
        )
    }

    pub fn state(&self) -> InstallState {
        if self.marker_path.exists() {
            return InstallState::Installed;
        }
        match self.state.load(Ordering::Acquire) {
            STATE_INSTALLING => InstallState::Installing,
            STATE_INSTALLED => InstallState::Installed,
            _ => InstallState::Uninitialized,
        }
    }

    pub fn is_installed(&self) -> bool {
        self.state() == InstallState::Installed
    }

    pub fn install(
        &self,
        config: &ConfigStore,
        runner: Option<&dyn MigrationRunner>,
    ) -> Result<InstallOutcome, InstallError> {
        self.state.store(STATE_INSTALLING, Ordering::Release);
        let mut outcome = InstallOutcome::default();

        if !self.config_path.exists() {
            write_file(&self.config_path, &default_config_template(&self.config_path))?;
            outcome.config_published = true;
        }

        let driver = config.get_string("database.driver");
        if is_document_driver(&driver) {
            if let Some(runner) = runner {
                let migrations_path = config.get_string("database.migrations_path");
                outcome.migrations_applied = runner.run(Path::new(&migrations_path))?;
            }
        }

        write_file(&self.marker_path, "installed\n")?;
        self.state.store(STATE_INSTALLED, Ordering::Release);
        info!(
            config_published = outcome.config_published,
            migrations_applied = outcome.migrations_applied,
            "first-time installation complete"
        );
        Ok(outcome)
    }
}

/// The published template anchors the marker file next to the config file.
pub fn default_config_template(config_path: &Path) -> String {
    let marker_path = config_path.with_file_name(".chassis-installed");
    let mut lines = Vec::new();
    lines.push(format!(
        "install = {{ marker_path = \"{}\", config_path = \"{}\" }}",
        marker_path.display(),
        config_path.display()
    ));
    lines.push("database = { driver = \"sqlite\", migrations_path = \"migrations\" }".to_string());
    lines.push("[repositories]".to_string());
    lines.push("[events]".to_string());
    lines.push("[extensions]".to_string());
    format!("{}\n", lines.join("\n"))
}

fn is_document_driver(driver: &str) -> bool {
    matches!(driver.to_lowercase().as_str(), "mongodb" | "document")
}

fn write_file(path: &Path, content: &str) -> Result<(), InstallError> {
    std::fs::write(path, content.as_bytes()).map_err(|err| InstallError::Io {
        path: path.display().to_string(),
        message: err.to_string(),
    })
}
