use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub effects: EffectsSection,
}

#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_duration")]
    pub duration: f32,
    #[serde(default = "default_crossfade")]
    pub crossfade: f32,
}

#[derive(Debug, Deserialize)]
pub struct EffectsSection {
    #[serde(default)]
    pub bass_gain_db: f32,
    #[serde(default)]
    pub echo_amount: f32,
    #[serde(default)]
    pub flanger: bool,
    #[serde(default)]
    pub reverb: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            duration: default_duration(),
            crossfade: default_crossfade(),
        }
    }
}

impl Default for EffectsSection {
    fn default() -> Self {
        Self {
            bass_gain_db: 0.0,
            echo_amount: 0.0,
            flanger: false,
            reverb: false,
        }
    }
}

fn default_duration() -> f32 { 30.0 }
fn default_crossfade() -> f32 { 1.5 }

pub fn load_config(path: &PathBuf) -> Option<Config> {
    let content = std::fs::read_to_string(path).ok()?;
    toml::from_str(&content).ok()
}
