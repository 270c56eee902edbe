use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, sync::RwLock};

use crate::movements::RuleThresholds;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineSettings {
    pub thresholds: RuleThresholds,
    /// Derive guidance text on each tick
    pub voice_enabled: bool,
    /// Start a fresh progress session when the active movement changes
    pub reset_on_movement_change: bool,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            thresholds: RuleThresholds::default(),
            voice_enabled: true,
            reset_on_movement_change: true,
        }
    }
}

impl EngineSettings {
    /// Replaces thresholds the geometry kernel cannot use with their defaults.
    pub fn sanitized(mut self) -> Self {
        let defaults = RuleThresholds::default();
        let t = &mut self.thresholds;

        if !(t.hip_movement_scale_px.is_finite() && t.hip_movement_scale_px > 0.0) {
            warn!(
                "hip_movement_scale_px {} is unusable, falling back to {}",
                t.hip_movement_scale_px, defaults.hip_movement_scale_px
            );
            t.hip_movement_scale_px = defaults.hip_movement_scale_px;
        }

        for (value, fallback) in [
            (&mut t.split_angle_deg, defaults.split_angle_deg),
            (&mut t.hip_square_max_deg, defaults.hip_square_max_deg),
            (&mut t.legs_behind_head_px, defaults.legs_behind_head_px),
            (&mut t.hip_movement_min_ratio, defaults.hip_movement_min_ratio),
        ] {
            if !value.is_finite() {
                *value = fallback;
            }
        }

        self
    }
}

/// JSON-backed settings, shared between the runner and whoever edits them.
pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<EngineSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str::<EngineSettings>(&contents)
                .unwrap_or_else(|err| {
                    warn!("Ignoring malformed settings in {}: {err}", path.display());
                    EngineSettings::default()
                })
                .sanitized()
        } else {
            EngineSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn engine(&self) -> EngineSettings {
        match self.data.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn update_engine(&self, settings: EngineSettings) -> Result<()> {
        let settings = settings.sanitized();
        let mut guard = match self.data.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = settings;
        self.persist(&guard)
    }

    fn persist(&self, data: &EngineSettings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("movecoach-{}-{name}.json", uuid::Uuid::new_v4()))
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let store = SettingsStore::new(temp_path("missing")).unwrap();
        assert_eq!(store.engine(), EngineSettings::default());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let path = temp_path("partial");
        fs::write(&path, r#"{"voiceEnabled":false,"thresholds":{"splitAngleDeg":150.0}}"#)
            .unwrap();

        let settings = SettingsStore::new(path.clone()).unwrap().engine();
        assert!(!settings.voice_enabled);
        assert!(settings.reset_on_movement_change);
        assert_eq!(settings.thresholds.split_angle_deg, 150.0);
        assert_eq!(settings.thresholds.hip_square_max_deg, 20.0);

        fs::remove_file(path).ok();
    }

    #[test]
    fn test_malformed_json_falls_back() {
        let path = temp_path("malformed");
        fs::write(&path, "{not json").unwrap();
        let store = SettingsStore::new(path.clone()).unwrap();
        assert_eq!(store.engine(), EngineSettings::default());
        fs::remove_file(path).ok();
    }

    #[test]
    fn test_update_persists_and_sanitizes() {
        let path = temp_path("update");
        let store = SettingsStore::new(path.clone()).unwrap();

        let mut settings = EngineSettings::default();
        settings.thresholds.hip_movement_scale_px = 0.0;
        settings.voice_enabled = false;
        store.update_engine(settings).unwrap();

        let reloaded = SettingsStore::new(path.clone()).unwrap().engine();
        assert!(!reloaded.voice_enabled);
        assert_eq!(reloaded.thresholds.hip_movement_scale_px, 100.0);

        fs::remove_file(path).ok();
    }
}
