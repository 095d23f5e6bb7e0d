//! Game settings with persistence
//!
//! Settings are saved to `~/.config/shapeshift/settings.toml`

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use shapeshift_core::ShapeVariant;
use shapeshift_game::SessionConfig;
use shapeshift_physics::PhysicsConfig;
use tracing::{info, warn};

/// All game settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    pub gameplay: GameplaySettings,
    pub physics: PhysicsConfig,
    pub session: SessionConfig,
}

impl GameSettings {
    /// Get the config directory path
    fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("shapeshift"))
    }

    /// Load settings from disk, or return defaults if not found
    pub fn load() -> Self {
        let Some(dir) = Self::config_dir() else {
            warn!("Could not determine config directory");
            return Self::default();
        };
        Self::load_from(&dir.join("settings.toml"))
    }

    /// Load from a specific file, falling back to defaults on any failure
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            info!("No settings file found, using defaults");
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(settings) => {
                    info!("Loaded settings from {:?}", path);
                    settings
                }
                Err(e) => {
                    warn!("Failed to parse settings: {}, using defaults", e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read settings file: {}, using defaults", e);
                Self::default()
            }
        }
    }

    /// Save settings to disk
    pub fn save(&self) -> anyhow::Result<()> {
        let Some(dir) = Self::config_dir() else {
            anyhow::bail!("Could not determine config directory");
        };
        self.save_to(&dir.join("settings.toml"))
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {:?}", dir))?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).with_context(|| format!("Failed to write {:?}", path))?;
        info!("Saved settings to {:?}", path);
        Ok(())
    }
}

/// Gameplay settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameplaySettings {
    /// Shape the player starts in
    pub start_shape: ShapeVariant,
    /// Frame rate the headless driver simulates
    pub simulated_fps: f32,
    /// Write the telemetry report next to the settings file
    pub save_telemetry: bool,
}

impl Default for GameplaySettings {
    fn default() -> Self {
        Self {
            start_shape: ShapeVariant::Circle,
            simulated_fps: 60.0,
            save_telemetry: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shapeshift_game::SelectorMode;

    #[test]
    fn test_partial_file_fills_defaults() {
        let settings: GameSettings = toml::from_str(
            r#"
            [gameplay]
            start_shape = "Square"

            [session.selector]
            mode = "Mouse"
            "#,
        )
        .expect("valid toml");

        assert_eq!(settings.gameplay.start_shape, ShapeVariant::Square);
        assert_eq!(settings.gameplay.simulated_fps, 60.0);
        assert_eq!(settings.session.selector.mode, SelectorMode::Mouse);
        assert_eq!(settings.physics, PhysicsConfig::default());
    }

    #[test]
    fn test_save_then_load() {
        let path = std::env::temp_dir()
            .join(format!("shapeshift-settings-{}", std::process::id()))
            .join("settings.toml");
        let mut settings = GameSettings::default();
        settings.gameplay.simulated_fps = 30.0;

        settings.save_to(&path).expect("writable temp dir");
        assert_eq!(GameSettings::load_from(&path), settings);

        fs::write(&path, "not = [valid").expect("writable temp dir");
        assert_eq!(GameSettings::load_from(&path), GameSettings::default());
        let _ = fs::remove_dir_all(path.parent().expect("has parent"));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let path = std::env::temp_dir().join("shapeshift-missing").join("nope.toml");
        assert_eq!(GameSettings::load_from(&path), GameSettings::default());
    }
}
