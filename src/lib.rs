//! altre-chord - 修飾キーなしで Emacs 風キー列を入力するためのコード解釈器
//!
//! 生のキー入力を "C-x C-s" のような修飾キー付きキー列へ書き換え、
//! キーマップで解決したコマンドを外部の実行機構へ渡す

// コアモジュール
pub mod config;
pub mod error;
pub mod logging;

// ロジック層
pub mod input;

// 公開API
pub use config::Config;
pub use error::{ChordError, Notification, ResolutionFailure, Result};
pub use input::{
    Binding, ChordInterpreter, CommandExecutor, Episode, EpisodeStep, KeySource, KeymapStore,
    PrefixKeymap, RawKey, Resolved,
};
