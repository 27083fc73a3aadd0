use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use clap::ArgMatches;
use log::LevelFilter;

use crate::modules::auth::password::{Base64Obscurer, PasswordObscurer, Sha256Obscurer};
use crate::DEFAULT_STORE_FILE;

/// Which password obscuring strategy the store uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ObscurerKind {
    /// Reversible encoding, compatible with the legacy window-global store
    Base64,
    #[default]
    Sha256,
}

impl ObscurerKind {
    pub fn build(self) -> Box<dyn PasswordObscurer> {
        match self {
            ObscurerKind::Base64 => Box::new(Base64Obscurer),
            ObscurerKind::Sha256 => Box::new(Sha256Obscurer),
        }
    }
}

impl FromStr for ObscurerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "base64" => Ok(ObscurerKind::Base64),
            "sha256" | "sha-256" => Ok(ObscurerKind::Sha256),
            other => Err(format!(
                "Unknown obscurer '{}' (expected 'base64' or 'sha256')",
                other
            )),
        }
    }
}

impl fmt::Display for ObscurerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObscurerKind::Base64 => write!(f, "base64"),
            ObscurerKind::Sha256 => write!(f, "sha256"),
        }
    }
}

/// Runtime settings for the CLI
#[derive(Debug, Clone, PartialEq)]
pub struct AuthConfig {
    pub store_path: PathBuf,
    pub obscurer: ObscurerKind,
    pub seed_admin: bool, // Seed the admin account before login/register
    pub log_level: LevelFilter,
    pub log_file: Option<PathBuf>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from(DEFAULT_STORE_FILE),
            obscurer: ObscurerKind::default(),
            seed_admin: true,
            log_level: LevelFilter::Info,
            log_file: None,
        }
    }
}

impl AuthConfig {
    /// Build the configuration from the global command-line options
    pub fn from_matches(matches: &ArgMatches) -> Result<Self, String> {
        let mut config = Self::default();

        if let Some(path) = matches.get_one::<String>("store") {
            config.store_path = PathBuf::from(path);
        }
        if let Some(kind) = matches.get_one::<String>("obscurer") {
            config.obscurer = kind.parse()?;
        }
        if matches.get_flag("no-seed") {
            config.seed_admin = false;
        }
        if matches.get_flag("verbose") {
            config.log_level = LevelFilter::Debug;
        }
        if let Some(path) = matches.get_one::<String>("log-file") {
            config.log_file = Some(PathBuf::from(path));
        }

        Ok(config)
    }
}
