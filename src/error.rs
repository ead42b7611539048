//! エラーハンドリングシステム
//!
//! コード解釈器全体で使用される統一されたエラー型と通知表示を定義

use std::time::{Duration, Instant};
use thiserror::Error;

/// クレート全体のエラー型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChordError {
    /// キー列がコマンドにもプレフィックスにも解決されなかった
    #[error(transparent)]
    Resolution(#[from] ResolutionFailure),

    /// 入力ソースのエラー
    #[error("Input source failed")]
    Input(#[from] InputError),

    /// キーマップ構築エラー
    #[error("Keymap error")]
    Keymap(#[from] KeymapError),

    /// 設定エラー
    #[error("Configuration error")]
    Config(#[from] ConfigError),

    /// 実行機構が失敗を報告した
    #[error("Command execution failed: {0}")]
    Execution(String),
}

/// 未解決のキー列
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{sequence} is undefined")]
pub struct ResolutionFailure {
    pub sequence: String,
}

impl ResolutionFailure {
    pub fn new(sequence: impl Into<String>) -> Self {
        Self { sequence: sequence.into() }
    }
}

/// 入力ソース固有のエラー
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("Input stream closed")]
    Closed,

    #[error("Terminal read failed: {message}")]
    Terminal { message: String },

    #[error("Interrupted by {key}")]
    Interrupted { key: String },
}

/// キーマップ固有のエラー
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeymapError {
    #[error("Empty key sequence")]
    EmptySequence,

    #[error("Invalid key description: {description}")]
    InvalidDescription { description: String },

    #[error("Key sequence {sequence} starts with non-prefix key {prefix}")]
    PrefixConflict { sequence: String, prefix: String },
}

/// 設定固有のエラー
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid configuration file: {path}: {message}")]
    InvalidFile { path: String, message: String },

    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },

    #[error("Configuration cannot change while an episode is in progress")]
    EpisodeInProgress,

    #[error("{first} and {second} both resolve to {token}")]
    ConflictingTriggers {
        first: String,
        second: String,
        token: String,
    },
}

impl ChordError {
    /// 駆動ループを止めるべきエラーか
    pub fn is_fatal(&self) -> bool {
        !matches!(self, ChordError::Resolution(_))
    }

    /// 未解決エラーならキー列を返す
    pub fn unresolved_sequence(&self) -> Option<&str> {
        match self {
            ChordError::Resolution(failure) => Some(&failure.sequence),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ChordError {
    fn from(error: std::io::Error) -> Self {
        ChordError::Input(InputError::Terminal { message: error.to_string() })
    }
}

/// 通知レベル
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Warning,
    Error,
}

/// エコーエリアに表示する通知
#[derive(Debug, Clone)]
pub struct Notification {
    /// 表示メッセージ
    pub message: String,
    /// 通知レベル
    pub level: NotificationLevel,
    /// 表示開始時刻
    pub start_time: Instant,
    /// 表示持続時間
    pub duration: Duration,
}

impl Notification {
    pub fn new(error: &ChordError) -> Self {
        let (message, level) = Self::format_error(error);
        Self {
            message,
            level,
            start_time: Instant::now(),
            duration: Duration::from_secs(5),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: NotificationLevel::Info,
            start_time: Instant::now(),
            duration: Duration::from_secs(2),
        }
    }

    fn format_error(error: &ChordError) -> (String, NotificationLevel) {
        match error {
            ChordError::Resolution(failure) => (failure.to_string(), NotificationLevel::Warning),
            ChordError::Input(InputError::Interrupted { key }) => {
                (format!("Quit ({key})"), NotificationLevel::Info)
            }
            ChordError::Input(inner) => (inner.to_string(), NotificationLevel::Error),
            ChordError::Keymap(inner) => (inner.to_string(), NotificationLevel::Error),
            ChordError::Config(inner) => (inner.to_string(), NotificationLevel::Error),
            ChordError::Execution(_) => (error.to_string(), NotificationLevel::Error),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.start_time.elapsed() >= self.duration
    }
}

/// プロジェクト標準のResult型
pub type Result<T> = std::result::Result<T, ChordError>;
