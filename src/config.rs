use anyhow::{ensure, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::warn;

#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub frame: FrameConfig,
    #[serde(default)]
    pub orientation: OrientationConfig,
    #[serde(default)]
    pub replay: ReplayConfig,
    #[serde(default)]
    pub debug: DebugConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FrameConfig {
    /// フレーム幅（ピクセル）
    #[serde(default = "default_frame_width")]
    pub width: u32,
    /// フレーム高さ（ピクセル）
    #[serde(default = "default_frame_height")]
    pub height: u32,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct OrientationConfig {
    /// この幅(度)を超えるrollでは人差し指の関節でyawを測る
    #[serde(default = "default_roll_deadband")]
    pub roll_deadband: f32,
    /// yaw の二次圧縮係数
    #[serde(default = "default_yaw_gain")]
    pub yaw_gain: f32,
    /// pitch の二次圧縮係数
    #[serde(default = "default_pitch_gain")]
    pub pitch_gain: f32,
    /// ソフトクランプ開始角度（度）
    #[serde(default = "default_clamp_limit")]
    pub clamp_limit: f32,
    /// クランプ超過分に掛ける減衰率
    #[serde(default = "default_clamp_damping")]
    pub clamp_damping: f32,
    /// 正規化後の手に掛ける作業スケール（gain はこのスケール前提で調整済み）
    #[serde(default = "default_working_scale")]
    pub working_scale: f32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReplayConfig {
    /// ランドマーク記録ファイル (JSON Lines)
    #[serde(default = "default_replay_path")]
    pub path: String,
    #[serde(default = "default_target_fps")]
    pub target_fps: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DebugConfig {
    /// 固定手（基準姿勢）描画時の拡大率
    #[serde(default = "default_hand_scale")]
    pub hand_scale: f32,
}

fn default_frame_width() -> u32 { 640 }
fn default_frame_height() -> u32 { 480 }
fn default_roll_deadband() -> f32 { 5.0 }
fn default_yaw_gain() -> f32 { 1666.0 }
fn default_pitch_gain() -> f32 { 31.0 }
fn default_clamp_limit() -> f32 { 90.0 }
fn default_clamp_damping() -> f32 { 0.1 }
fn default_working_scale() -> f32 { 100.0 }
fn default_replay_path() -> String { "landmarks.jsonl".to_string() }
fn default_target_fps() -> u32 { 30 }
fn default_hand_scale() -> f32 { 100.0 }

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            width: default_frame_width(),
            height: default_frame_height(),
        }
    }
}

impl Default for OrientationConfig {
    fn default() -> Self {
        Self {
            roll_deadband: default_roll_deadband(),
            yaw_gain: default_yaw_gain(),
            pitch_gain: default_pitch_gain(),
            clamp_limit: default_clamp_limit(),
            clamp_damping: default_clamp_damping(),
            working_scale: default_working_scale(),
        }
    }
}

impl OrientationConfig {
    /// 係数の範囲チェック（gain と作業スケールは正、減衰率は [0, 1]）
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.roll_deadband >= 0.0,
            "orientation.roll_deadband must be >= 0 (got {})",
            self.roll_deadband
        );
        ensure!(
            self.yaw_gain > 0.0,
            "orientation.yaw_gain must be > 0 (got {})",
            self.yaw_gain
        );
        ensure!(
            self.pitch_gain > 0.0,
            "orientation.pitch_gain must be > 0 (got {})",
            self.pitch_gain
        );
        ensure!(
            self.clamp_limit >= 0.0,
            "orientation.clamp_limit must be >= 0 (got {})",
            self.clamp_limit
        );
        ensure!(
            (0.0..=1.0).contains(&self.clamp_damping),
            "orientation.clamp_damping must be within [0, 1] (got {})",
            self.clamp_damping
        );
        ensure!(
            self.working_scale > 0.0 && self.working_scale.is_finite(),
            "orientation.working_scale must be a positive finite number (got {})",
            self.working_scale
        );
        Ok(())
    }
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            path: default_replay_path(),
            target_fps: default_target_fps(),
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            hand_scale: default_hand_scale(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).context("Failed to parse config")?;
        config.orientation.validate()?;
        Ok(config)
    }

    /// 読み込みに失敗した場合は既定値を使う
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match Self::load(&path) {
            Ok(config) => config,
            Err(e) => {
                warn!("{:#}; using defaults", e);
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.frame.width, 640);
        assert_eq!(config.frame.height, 480);
        assert_eq!(config.orientation, OrientationConfig::default());
        assert_eq!(config.replay.target_fps, 30);
        assert_eq!(config.debug.hand_scale, 100.0);
    }

    #[test]
    fn test_partial_table_keeps_other_defaults() {
        let config = Config::parse(
            r#"
            [orientation]
            yaw_gain = 2000.0

            [debug]
            hand_scale = 80.0
            "#,
        )
        .unwrap();
        assert_eq!(config.orientation.yaw_gain, 2000.0);
        assert_eq!(config.orientation.pitch_gain, 31.0);
        assert_eq!(config.orientation.working_scale, 100.0);
        assert_eq!(config.debug.hand_scale, 80.0);
    }

    #[test]
    fn test_invalid_toml_is_error() {
        assert!(Config::parse("[frame\nwidth = ").is_err());
    }

    fn parse_orientation(line: &str) -> Result<Config> {
        Config::parse(&format!("[orientation]\n{}\n", line))
    }

    #[test]
    fn test_zero_gains_are_rejected() {
        let err = parse_orientation("yaw_gain = 0.0").unwrap_err();
        assert!(format!("{:#}", err).contains("yaw_gain"));
        let err = parse_orientation("pitch_gain = 0.0").unwrap_err();
        assert!(format!("{:#}", err).contains("pitch_gain"));
        assert!(parse_orientation("pitch_gain = -31.0").is_err());
    }

    #[test]
    fn test_zero_working_scale_is_rejected() {
        let err = parse_orientation("working_scale = 0.0").unwrap_err();
        assert!(format!("{:#}", err).contains("working_scale"));
        assert!(parse_orientation("working_scale = inf").is_err());
    }

    #[test]
    fn test_negative_clamp_limit_is_rejected() {
        assert!(parse_orientation("clamp_limit = -1.0").is_err());
        assert!(parse_orientation("clamp_limit = 0.0").is_ok());
    }

    #[test]
    fn test_clamp_damping_outside_unit_range_is_rejected() {
        assert!(parse_orientation("clamp_damping = -0.1").is_err());
        assert!(parse_orientation("clamp_damping = 1.5").is_err());
        assert!(parse_orientation("clamp_damping = nan").is_err());
        assert!(parse_orientation("clamp_damping = 1.0").is_ok());
    }

    #[test]
    fn test_negative_roll_deadband_is_rejected() {
        assert!(parse_orientation("roll_deadband = -5.0").is_err());
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = Config::load_or_default("/nonexistent/gesture-tracker.toml");
        assert_eq!(config.frame.width, 640);
    }
}
