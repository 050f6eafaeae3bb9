//! Session configuration

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{ArError, ArResult, PlaybackOptions, TargetKind};

/// Session configuration, stored as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Root directory that relative asset paths resolve against
    pub asset_root: PathBuf,
    /// Reference image uploaded to the engine on every surface change
    pub reference_texture: PathBuf,
    /// Target kind passed to engine initialization
    pub target: TargetKind,
    /// Video asset played into the video texture
    pub video_asset: String,
    pub video_looping: bool,
    /// Delay before the camera focus mode is restored after a tap
    pub autofocus_restore_ms: u64,
    pub keep_screen_on: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            asset_root: PathBuf::from("assets"),
            reference_texture: PathBuf::from("ImageTargets/Astronaut.jpg"),
            target: TargetKind::Image,
            video_asset: "raw/vuforiasizzlereel.mp4".to_string(),
            video_looping: true,
            autofocus_restore_ms: 2000,
            keep_screen_on: true,
        }
    }
}

impl SessionConfig {
    /// Load and validate a config file.
    pub fn load(path: &Path) -> ArResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| ArError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        let config: SessionConfig = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from the platform config directory, falling back to defaults.
    pub fn load_or_default() -> Self {
        let Some(path) = Self::default_path() else {
            return Self::default();
        };

        if !path.exists() {
            return Self::default();
        }

        match Self::load(&path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Ignoring config at {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    /// Save as pretty-printed JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> ArResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ArError::ConfigIo {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents).map_err(|source| ArError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("vumark").join("session.json"))
    }

    pub fn validate(&self) -> ArResult<()> {
        if self.autofocus_restore_ms == 0 {
            return Err(ArError::InvalidConfig(
                "autofocus_restore_ms must be positive".to_string(),
            ));
        }
        if self.reference_texture.as_os_str().is_empty() {
            return Err(ArError::InvalidConfig(
                "reference_texture must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Absolute or `asset_root`-relative path of the reference texture.
    pub fn reference_texture_path(&self) -> PathBuf {
        self.asset_root.join(&self.reference_texture)
    }

    pub fn autofocus_restore_delay(&self) -> Duration {
        Duration::from_millis(self.autofocus_restore_ms)
    }

    pub fn playback_options(&self) -> PlaybackOptions {
        PlaybackOptions {
            asset: self.video_asset.clone(),
            looping: self.video_looping,
            play_when_ready: true,
        }
    }
}
