//! 入力処理モジュール
//!
//! 生キーの正規化、修飾キー解決、キー列構築、キーマップへのディスパッチを提供

pub mod dispatcher;
pub mod episode;
pub mod event_handler;
pub mod key;
pub mod keymap;
pub mod modifier;
pub mod sequence;
pub mod source;

// 公開API
pub use dispatcher::{ChordInterpreter, CommandExecutor, Resolved};
pub use episode::{Episode, EpisodeState, EpisodeStep};
pub use event_handler::{KeyFilter, RawModeGuard, TerminalKeySource};
pub use key::{normalize, KeyToken, RawKey};
pub use keymap::{Binding, KeymapStore, PrefixKeymap};
pub use modifier::{resolve, ModifierPrefix, Resolution};
pub use sequence::{BuildStep, KeyGroup, KeySequence, SequenceBuilder};
pub use source::{KeySource, ScriptedKeys};
