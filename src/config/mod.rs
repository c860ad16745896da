use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::constants::{
    DEFAULT_CORRELATION_INTERVAL, DEFAULT_ERASER_RADIUS, DEFAULT_TOLERANCE_FLOOR,
};

/// System set for config loading (other plugins can run after this)
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConfigLoaded;

/// Application configuration persisted to disk.
///
/// The tuning values here are empirically chosen UI defaults, not contracts;
/// they can be edited in the config file without recompiling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfigData {
    /// Eraser radius in surface pixels
    #[serde(default = "default_eraser_radius")]
    pub eraser_radius: f32,

    /// Floor for the continuous-media match window, in seconds
    #[serde(default = "default_tolerance_floor")]
    pub tolerance_floor: f64,

    /// Seconds between playback correlation evaluations
    #[serde(default = "default_correlation_interval")]
    pub correlation_interval: f32,

    /// Last opened records file (remembered for quick access, not auto-loaded)
    #[serde(default)]
    pub last_records_path: Option<PathBuf>,
}

fn default_eraser_radius() -> f32 {
    DEFAULT_ERASER_RADIUS
}

fn default_tolerance_floor() -> f64 {
    DEFAULT_TOLERANCE_FLOOR
}

fn default_correlation_interval() -> f32 {
    DEFAULT_CORRELATION_INTERVAL
}

impl Default for AppConfigData {
    fn default() -> Self {
        Self {
            eraser_radius: default_eraser_radius(),
            tolerance_floor: default_tolerance_floor(),
            correlation_interval: default_correlation_interval(),
            last_records_path: None,
        }
    }
}

/// Runtime configuration resource
#[derive(Resource)]
pub struct AppConfig {
    /// The persisted configuration data
    pub data: AppConfigData,
    /// Path to the config file
    pub config_path: PathBuf,
    /// Whether config needs to be saved (dirty flag)
    pub dirty: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data: AppConfigData::default(),
            config_path: crate::paths::config_file(),
            dirty: false,
        }
    }
}

/// Message to trigger config save
#[derive(Message)]
pub struct SaveConfigRequest;

/// Message to update the last records path in config
#[derive(Message)]
pub struct UpdateLastRecordsPathRequest {
    pub path: PathBuf,
}

/// Load configuration from disk; parse failures fall back to defaults
fn load_config() -> AppConfig {
    let config_path = crate::paths::config_file();

    let data = if config_path.exists() {
        match std::fs::read_to_string(&config_path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(data) => {
                    info!("Loaded config from {:?}", config_path);
                    data
                }
                Err(e) => {
                    warn!("Failed to parse config file, using defaults: {}", e);
                    AppConfigData::default()
                }
            },
            Err(e) => {
                warn!("Failed to read config file, using defaults: {}", e);
                AppConfigData::default()
            }
        }
    } else {
        info!("No config file found, using defaults");
        AppConfigData::default()
    };

    AppConfig {
        data,
        config_path,
        dirty: false,
    }
}

/// Save configuration to disk
fn save_config(config: &AppConfig) {
    match serde_json::to_string_pretty(&config.data) {
        Ok(json) => {
            if let Err(e) = std::fs::write(&config.config_path, json) {
                error!("Failed to save config: {}", e);
            } else {
                info!("Config saved to {:?}", config.config_path);
            }
        }
        Err(e) => {
            error!("Failed to serialize config: {}", e);
        }
    }
}

/// Startup system to load config from disk into the existing resource
fn load_config_system(mut config: ResMut<AppConfig>) {
    let loaded = load_config();
    config.data = loaded.data;
    config.config_path = loaded.config_path;
    config.dirty = false;
}

/// System to save config when requested
fn save_config_system(
    mut events: MessageReader<SaveConfigRequest>,
    mut config: ResMut<AppConfig>,
) {
    for _ in events.read() {
        if config.dirty {
            save_config(&config);
            config.dirty = false;
        }
    }
}

/// System to update the last records path
fn update_last_records_path_system(
    mut events: MessageReader<UpdateLastRecordsPathRequest>,
    mut config: ResMut<AppConfig>,
    mut save_events: MessageWriter<SaveConfigRequest>,
) {
    for event in events.read() {
        config.data.last_records_path = Some(event.path.clone());
        config.dirty = true;
        save_events.write(SaveConfigRequest);
    }
}

pub struct ConfigPlugin;

impl Plugin for ConfigPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<AppConfig>()
            .add_message::<SaveConfigRequest>()
            .add_message::<UpdateLastRecordsPathRequest>()
            .add_systems(Startup, load_config_system.in_set(ConfigLoaded))
            .add_systems(
                Update,
                (
                    save_config_system.run_if(on_message::<SaveConfigRequest>),
                    update_last_records_path_system
                        .run_if(on_message::<UpdateLastRecordsPathRequest>),
                ),
            );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_config_data_default() {
        let data = AppConfigData::default();
        assert_eq!(data.eraser_radius, DEFAULT_ERASER_RADIUS);
        assert_eq!(data.tolerance_floor, DEFAULT_TOLERANCE_FLOOR);
        assert!(data.last_records_path.is_none());
    }

    #[test]
    fn test_app_config_data_serialization() {
        let data = AppConfigData {
            eraser_radius: 12.0,
            tolerance_floor: 0.25,
            correlation_interval: 0.05,
            last_records_path: Some(PathBuf::from("/path/to/records.json")),
        };

        let json = serde_json::to_string(&data).unwrap();
        let parsed: AppConfigData = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.eraser_radius, data.eraser_radius);
        assert_eq!(parsed.tolerance_floor, data.tolerance_floor);
        assert_eq!(parsed.last_records_path, data.last_records_path);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        // Older config files without the tuning fields still parse
        let parsed: AppConfigData = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed.eraser_radius, DEFAULT_ERASER_RADIUS);
        assert_eq!(parsed.correlation_interval, DEFAULT_CORRELATION_INTERVAL);
    }
}
