use std::net::SocketAddr;
use std::path::Path;
use std::str::FromStr;

use config_file::FromConfigFile;
use serde::Deserialize;

/// Daemon configuration, read from a TOML file. Every section falls back
/// to defaults so a missing file yields a usable local setup.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub osc: OscSettings,
    pub ola: OlaSettings,
    pub mqtt: Option<MqttSettings>,
    pub location: LocationSettings,
    pub light: LightSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OscSettings {
    pub listen_addr: SocketAddr,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OlaSettings {
    pub target_addr: SocketAddr,
    pub universe: u8,
    pub pixel_count: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MqttSettings {
    pub url: String,
    pub discovery_prefix: String,
    pub unique_id: String,
}

/// Where on the planet this light lives, for the astronomical sunrise.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LocationSettings {
    pub latitude: f64,
    pub longitude: f64,
    pub utc_offset: f64,
    pub is_dst: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LightSettings {
    pub fade_seconds: f32,
    pub min_brightness: f32,
    pub max_brightness: f32,
    pub sunrise_lead_minutes: u64,
    pub sunrise_ramp_minutes: u64,
    pub sunrise_hold_minutes: u64,
}

impl Settings {
    pub fn load(path: &Path) -> Result<Settings, String> {
        Settings::from_config_file(path).map_err(|error| format!("{:?}", error))
    }
}

impl Default for Settings {
    fn default() -> Settings {
        Settings {
            osc: OscSettings::default(),
            ola: OlaSettings::default(),
            mqtt: None,
            location: LocationSettings::default(),
            light: LightSettings::default(),
        }
    }
}

impl Default for OscSettings {
    fn default() -> OscSettings {
        OscSettings {
            listen_addr: SocketAddr::from_str("0.0.0.0:8000").unwrap(),
        }
    }
}

impl Default for OlaSettings {
    fn default() -> OlaSettings {
        OlaSettings {
            target_addr: SocketAddr::from_str("127.0.0.1:7770").unwrap(),
            universe: 0,
            pixel_count: 32,
        }
    }
}

impl Default for LocationSettings {
    fn default() -> LocationSettings {
        LocationSettings {
            latitude: 47.6097,
            longitude: -122.3331,
            utc_offset: -8.0,
            is_dst: false,
        }
    }
}

impl Default for LightSettings {
    fn default() -> LightSettings {
        LightSettings {
            fade_seconds: 4.0,
            min_brightness: 0.3,
            max_brightness: 1.0,
            sunrise_lead_minutes: 10,
            sunrise_ramp_minutes: 10,
            sunrise_hold_minutes: 60,
        }
    }
}
