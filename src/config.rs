use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// UDP受信の設定
#[derive(Debug, Clone, Deserialize)]
pub struct NetworkConfig {
    /// 受信ポート番号
    #[serde(default = "default_port")]
    pub port: u16,
    /// バインドするアドレス
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    /// 受信タイムアウト (ミリ秒)。停止フラグの確認間隔を兼ねる
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,
}

fn default_port() -> u16 {
    5052
}
fn default_bind_addr() -> String {
    "0.0.0.0".to_string()
}
fn default_read_timeout_ms() -> u64 {
    250
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind_addr: default_bind_addr(),
            read_timeout_ms: default_read_timeout_ms(),
        }
    }
}

/// ランドマーク平滑化の設定
#[derive(Debug, Clone, Deserialize)]
pub struct SmoothConfig {
    /// 平滑化係数 (0.0〜1.0未満)。0で平滑化なし、1に近いほど強い
    #[serde(default = "default_factor")]
    pub factor: f32,
    /// 表示座標系のX倍率
    #[serde(default = "default_scale_xy")]
    pub scale_x: f32,
    /// 表示座標系のY倍率
    #[serde(default = "default_scale_xy")]
    pub scale_y: f32,
    /// 表示座標系のZ倍率
    #[serde(default = "default_scale_z")]
    pub scale_z: f32,
}

fn default_factor() -> f32 {
    0.8
}
fn default_scale_xy() -> f32 {
    5.0
}
fn default_scale_z() -> f32 {
    2.0
}

impl Default for SmoothConfig {
    fn default() -> Self {
        Self {
            factor: default_factor(),
            scale_x: default_scale_xy(),
            scale_y: default_scale_xy(),
            scale_z: default_scale_z(),
        }
    }
}

/// レップカウンタの設定
#[derive(Debug, Clone, Deserialize)]
pub struct CounterConfig {
    /// 収縮とみなす角度の下限閾値 (度)
    #[serde(default = "default_min_threshold")]
    pub min_threshold: f32,
    /// 伸展とみなす角度の上限閾値 (度)
    #[serde(default = "default_max_threshold")]
    pub max_threshold: f32,
    /// 状態遷移後のクールダウン (秒)
    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: f32,
    /// 合計何回ごとにマイルストーン通知を出すか。0で無効
    #[serde(default = "default_milestone_every")]
    pub milestone_every: u32,
}

fn default_min_threshold() -> f32 {
    38.0
}
fn default_max_threshold() -> f32 {
    150.0
}
fn default_cooldown_secs() -> f32 {
    0.5
}
fn default_milestone_every() -> u32 {
    10
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            min_threshold: default_min_threshold(),
            max_threshold: default_max_threshold(),
            cooldown_secs: default_cooldown_secs(),
            milestone_every: default_milestone_every(),
        }
    }
}

/// キャリブレーションの設定
#[derive(Debug, Clone, Deserialize)]
pub struct CalibrationConfig {
    /// サンプリング継続時間 (秒)
    #[serde(default = "default_duration_secs")]
    pub duration_secs: f32,
    /// 観測レンジの両端から内側に取る余白の割合
    #[serde(default = "default_margin")]
    pub margin: f32,
}

fn default_duration_secs() -> f32 {
    5.0
}
fn default_margin() -> f32 {
    0.2
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            duration_secs: default_duration_secs(),
            margin: default_margin(),
        }
    }
}

/// アプリケーション全体の設定
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub smooth: SmoothConfig,
    #[serde(default)]
    pub counter: CounterConfig,
    #[serde(default)]
    pub calibration: CalibrationConfig,
}

impl Config {
    /// TOMLファイルから設定を読み込む
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Config> {
        let content = fs::read_to_string(path.as_ref()).with_context(|| {
            format!("Failed to read config file: {}", path.as_ref().display())
        })?;
        let config: Config = toml::from_str(&content).with_context(|| {
            format!("Failed to parse config file: {}", path.as_ref().display())
        })?;
        Ok(config)
    }

    /// 読み込みに失敗したらデフォルト設定を返す
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Config {
        match Config::load(path.as_ref()) {
            Ok(config) => config,
            Err(e) => {
                eprintln!(
                    "設定ファイル {} を読み込めませんでした ({})。デフォルト設定を使用します",
                    path.as_ref().display(),
                    e
                );
                Config::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.network.port, 5052);
        assert_eq!(config.network.bind_addr, "0.0.0.0");
        assert_eq!(config.network.read_timeout_ms, 250);
        assert_eq!(config.smooth.factor, 0.8);
        assert_eq!(config.smooth.scale_x, 5.0);
        assert_eq!(config.smooth.scale_y, 5.0);
        assert_eq!(config.smooth.scale_z, 2.0);
        assert_eq!(config.counter.min_threshold, 38.0);
        assert_eq!(config.counter.max_threshold, 150.0);
        assert_eq!(config.counter.cooldown_secs, 0.5);
        assert_eq!(config.counter.milestone_every, 10);
        assert_eq!(config.calibration.duration_secs, 5.0);
        assert_eq!(config.calibration.margin, 0.2);
    }

    #[test]
    fn test_full_config_parses() {
        let toml_str = r#"
            [network]
            port = 6000
            bind_addr = "127.0.0.1"
            read_timeout_ms = 100

            [smooth]
            factor = 0.5
            scale_x = 2.0
            scale_y = 3.0
            scale_z = 1.0

            [counter]
            min_threshold = 45.0
            max_threshold = 140.0
            cooldown_secs = 1.0
            milestone_every = 5

            [calibration]
            duration_secs = 10.0
            margin = 0.1
        "#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.network.port, 6000);
        assert_eq!(config.network.bind_addr, "127.0.0.1");
        assert_eq!(config.smooth.factor, 0.5);
        assert_eq!(config.counter.min_threshold, 45.0);
        assert_eq!(config.counter.max_threshold, 140.0);
        assert_eq!(config.counter.milestone_every, 5);
        assert_eq!(config.calibration.duration_secs, 10.0);
        assert_eq!(config.calibration.margin, 0.1);
    }

    #[test]
    fn test_partial_section_fills_missing_fields() {
        let toml_str = r#"
            [counter]
            min_threshold = 50.0
        "#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.counter.min_threshold, 50.0);
        assert_eq!(config.counter.max_threshold, 150.0, "missing field should default");
        assert_eq!(config.network.port, 5052, "missing section should default");
    }

    #[test]
    fn test_load_missing_file_fails() {
        let result = Config::load("/nonexistent/config.toml");
        assert!(result.is_err());
    }
}
