//! 設定
//!
//! リテラルエスケープとMeta / Control-Meta トリガーのトークン、ログレベルを保持する。
//! エピソード中は読み取り専用。

use crate::error::{ConfigError, Result};
use crate::input::key::{normalize_text, KeyToken};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// 設定ファイルのディレクトリ名
const CONFIG_DIR_NAME: &str = "altre-chord";
const CONFIG_FILE_NAME: &str = "config.json";

/// コード解釈器の設定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 次のトークンのControl付与を抑止するトークン
    pub literal_escape: String,
    /// Metaトリガー
    pub meta_trigger: String,
    /// Control-Metaトリガー
    pub control_meta_trigger: String,
    /// ログレベル名
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            literal_escape: " ".to_string(),
            meta_trigger: "g".to_string(),
            control_meta_trigger: "G".to_string(),
            log_level: "warn".to_string(),
        }
    }
}

impl Config {
    /// 既定の設定ファイルパス
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// `~` や環境変数を含むパスを展開
    pub fn expand_path(raw: &str) -> PathBuf {
        match shellexpand::full(raw) {
            Ok(expanded) => PathBuf::from(expanded.into_owned()),
            Err(_) => PathBuf::from(raw),
        }
    }

    /// JSONファイルから読み込み、検証する
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|err| ConfigError::InvalidFile {
            path: path.display().to_string(),
            message: err.to_string(),
        })?;
        Self::from_json(&text).map_err(|err| match err {
            crate::ChordError::Config(ConfigError::InvalidFile { message, .. }) => {
                ConfigError::InvalidFile {
                    path: path.display().to_string(),
                    message,
                }
                .into()
            }
            other => other,
        })
    }

    /// ファイルが存在しなければ既定値を返す
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            log::debug!("config file {} not found, using defaults", path.display());
            Ok(Self::default())
        }
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(text).map_err(|err| ConfigError::InvalidFile {
            path: "<inline>".to_string(),
            message: err.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// トリガーが空でなく、正規化後に互いに衝突しないことを確認
    pub fn validate(&self) -> Result<()> {
        let triggers = [
            ("literal_escape", &self.literal_escape),
            ("meta_trigger", &self.meta_trigger),
            ("control_meta_trigger", &self.control_meta_trigger),
        ];

        for (key, value) in triggers {
            if value.is_empty() {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    value: value.clone(),
                }
                .into());
            }
        }

        for (i, (first, first_value)) in triggers.iter().enumerate() {
            for (second, second_value) in &triggers[i + 1..] {
                let token = normalize_text(first_value);
                if token == normalize_text(second_value) {
                    return Err(ConfigError::ConflictingTriggers {
                        first: first.to_string(),
                        second: second.to_string(),
                        token: token.to_string(),
                    }
                    .into());
                }
            }
        }

        Ok(())
    }

    pub fn literal_escape_token(&self) -> KeyToken {
        normalize_text(&self.literal_escape)
    }

    pub fn meta_token(&self) -> KeyToken {
        normalize_text(&self.meta_trigger)
    }

    pub fn control_meta_token(&self) -> KeyToken {
        normalize_text(&self.control_meta_trigger)
    }

    pub fn log_level_filter(&self) -> log::LevelFilter {
        crate::logging::parse_level(&self.log_level)
    }
}
