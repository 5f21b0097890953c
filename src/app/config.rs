use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::peek::PeekDirection;

/// デーモンモード設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DaemonConfig {
    /// キャラクターのテキストアート（未設定時は組み込みアート）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub character: Option<String>,
    /// キャラクター領域の幅（列数）
    pub size: u16,
    /// 画面端からのマージン（セル数）
    pub margin: u16,
    /// 通知の既定表示時間（秒）。吹き出しはクリックでのみ消える
    pub default_duration: f64,
    /// 同時に表示する吹き出しの上限
    pub max_bubbles: usize,
    /// 吹き出し同士の間隔（行数）
    pub bubble_spacing: u16,
    /// 吹き出しの最大幅（列数）
    pub bubble_width: u16,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            character: None,
            size: 16,
            margin: 1,
            default_duration: 5.0,
            max_bubbles: 50,
            bubble_spacing: 1,
            bubble_width: 40,
        }
    }
}

/// ワンショット表示（peek）設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeekConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub character: Option<String>,
    /// 表示時間（秒）
    pub display_duration: f64,
    /// 出入りのアニメーション時間（秒）
    pub animation_duration: f64,
    /// 画面下端から顔を出す高さ（行数）
    pub peek_height: u16,
    /// 右端からのマージン（列数）
    pub margin: u16,
    /// クリックで呼び出し元にフォーカスするか
    pub clickable: bool,
    /// 顔を出す画面端
    pub direction: PeekDirection,
    /// ランダムな間隔で繰り返し顔を出す
    pub random: bool,
    /// 繰り返しのたびに画面端をランダムに選ぶ
    pub random_direction: bool,
    /// 次に顔を出すまでの最短間隔（秒）
    pub random_min_interval: f64,
    /// 次に顔を出すまでの最長間隔（秒）
    pub random_max_interval: f64,
}

impl Default for PeekConfig {
    fn default() -> Self {
        Self {
            character: None,
            display_duration: 3.0,
            animation_duration: 0.4,
            peek_height: 10,
            margin: 4,
            clickable: true,
            direction: PeekDirection::Bottom,
            random: false,
            random_direction: false,
            random_min_interval: 30.0,
            random_max_interval: 120.0,
        }
    }
}

/// アプリケーション設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// ログレベル
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// 通知に sound がないときに鳴らす音
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_sound: Option<String>,
    #[serde(default)]
    pub daemon: DaemonConfig,
    #[serde(default)]
    pub peek: PeekConfig,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            default_sound: None,
            daemon: DaemonConfig::default(),
            peek: PeekConfig::default(),
        }
    }
}

impl Config {
    /// 設定ファイルから読み込み（存在しない場合はデフォルトを作成して保存）
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)
                .with_context(|| format!("Failed to read {}", config_path.display()))?;
            let config: Config = toml::from_str(&content)
                .map_err(|e| anyhow::anyhow!("Failed to parse config: {}", e))?;
            Ok(config)
        } else {
            // 初回起動時はデフォルト設定をファイルに保存
            let config = Self::default();
            if let Err(e) = config.save_to(config_path) {
                tracing::warn!("Failed to save default config: {}", e);
            }
            Ok(config)
        }
    }

    /// 設定ファイルパスを取得
    pub fn config_path() -> Result<PathBuf> {
        // ~/.config/peekaboo/config.toml を使用
        let base_dirs = directories::BaseDirs::new()
            .ok_or_else(|| anyhow::anyhow!("Failed to determine home directory"))?;
        Ok(base_dirs.home_dir().join(".config/peekaboo/config.toml"))
    }

    fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;

        Ok(())
    }
}
