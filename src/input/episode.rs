//! エピソード
//!
//! 最初の生キーから終端（コマンド確定または未解決）までの1回の解釈。
//! 1キーずつ投入するプッシュ型の状態機械で、ブロッキングできないイベントループから使える。

use super::key::RawKey;
use super::keymap::{Binding, KeymapStore};
use super::sequence::{BuildStep, KeySequence, SequenceBuilder};
use crate::config::Config;
use crate::error::{ConfigError, ResolutionFailure, Result};

/// エピソードの状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpisodeState {
    /// 未開始
    Start,
    /// キー列を構築中
    Building,
    /// コマンドに解決した（終端）
    ResolvedCommand,
    /// 未解決で終了した（終端）
    ResolvedError,
}

impl EpisodeState {
    pub fn is_terminal(self) -> bool {
        matches!(self, EpisodeState::ResolvedCommand | EpisodeState::ResolvedError)
    }
}

/// キー投入の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EpisodeStep<C> {
    /// 続きの入力待ち（先読み中、またはプレフィックスキー）
    Pending,
    /// コマンドに解決した
    Command { sequence: String, command: C },
    /// 解決できなかった
    Unresolved(ResolutionFailure),
}

/// 進行中のエピソード
///
/// 終端状態に達した後に投入されたキーは、新しいエピソードを開始する。
#[derive(Debug, Clone)]
pub struct Episode {
    config: Config,
    sequence: KeySequence,
    builder: SequenceBuilder,
    state: EpisodeState,
    keys_consumed: usize,
}

impl Episode {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            sequence: KeySequence::new(),
            builder: SequenceBuilder::new(),
            state: EpisodeState::Start,
            keys_consumed: 0,
        }
    }

    pub fn state(&self) -> EpisodeState {
        self.state
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// 現在のエピソードで読んだキー数
    pub fn keys_consumed(&self) -> usize {
        self.keys_consumed
    }

    /// エピソードの間だけ設定を差し替えられる
    pub fn set_config(&mut self, config: Config) -> Result<()> {
        if self.state == EpisodeState::Building {
            return Err(ConfigError::EpisodeInProgress.into());
        }
        config.validate()?;
        self.config = config;
        Ok(())
    }

    /// 構築途中のキー記述（エコー表示用）
    ///
    /// 先読み待ちの修飾キーは末尾に付けて表示する（"C-x M-"）
    pub fn current_description(&self) -> String {
        let mut text = self.sequence.description();
        if let Some(prefix) = self.builder.pending_prefix() {
            if !text.is_empty() {
                text.push(' ');
            }
            text.push_str(prefix.as_str());
        }
        text
    }

    /// 外部からの中断。蓄積中のキー列を破棄する
    pub fn abort(&mut self) {
        if self.state == EpisodeState::Building {
            log::debug!("episode aborted at {:?}", self.current_description());
        }
        self.reset();
    }

    /// 生キーを1つ投入する
    pub fn feed<K: KeymapStore>(&mut self, key: &RawKey, keymap: &K) -> EpisodeStep<K::Command> {
        if self.state.is_terminal() {
            self.reset();
        }
        if self.state == EpisodeState::Start {
            log::debug!("episode started");
            self.state = EpisodeState::Building;
        }
        self.keys_consumed += 1;

        match self.builder.feed(key, &mut self.sequence, &self.config) {
            BuildStep::NeedsEvent => EpisodeStep::Pending,
            BuildStep::Appended(_) => self.dispatch(keymap),
        }
    }

    fn dispatch<K: KeymapStore>(&mut self, keymap: &K) -> EpisodeStep<K::Command> {
        let description = self.sequence.description();

        match keymap.resolve(&description) {
            Binding::Command(command) => {
                log::debug!("{} resolved to a command", description);
                self.finish(EpisodeState::ResolvedCommand);
                EpisodeStep::Command {
                    sequence: description,
                    command,
                }
            }
            Binding::NestedKeymap => {
                log::trace!("{} is a prefix key", description);
                EpisodeStep::Pending
            }
            Binding::Unbound => {
                log::warn!("{} is undefined", description);
                self.finish(EpisodeState::ResolvedError);
                EpisodeStep::Unresolved(ResolutionFailure::new(description))
            }
        }
    }

    fn finish(&mut self, state: EpisodeState) {
        self.state = state;
        self.sequence = KeySequence::new();
        self.builder = SequenceBuilder::new();
    }

    fn reset(&mut self) {
        self.finish(EpisodeState::Start);
        self.keys_consumed = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::keymap::PrefixKeymap;
    use crate::ChordError;

    fn keymap() -> PrefixKeymap<&'static str> {
        PrefixKeymap::with_bindings([
            ("C-x C-s", "save"),
            ("C-x C-p", "previous"),
            ("M-f", "forward-word"),
        ])
        .unwrap()
    }

    #[test]
    fn state_transitions_to_command() {
        let keymap = keymap();
        let mut episode = Episode::new(Config::default());
        assert_eq!(episode.state(), EpisodeState::Start);

        assert_eq!(episode.feed(&RawKey::Char('x'), &keymap), EpisodeStep::Pending);
        assert_eq!(episode.state(), EpisodeState::Building);
        assert_eq!(episode.current_description(), "C-x");

        assert_eq!(
            episode.feed(&RawKey::Char('s'), &keymap),
            EpisodeStep::Command {
                sequence: "C-x C-s".to_string(),
                command: "save",
            }
        );
        assert_eq!(episode.state(), EpisodeState::ResolvedCommand);
        assert_eq!(episode.current_description(), "");
        assert_eq!(episode.keys_consumed(), 2);
    }

    #[test]
    fn state_transitions_to_error() {
        let keymap = keymap();
        let mut episode = Episode::new(Config::default());

        episode.feed(&RawKey::Char('x'), &keymap);
        episode.feed(&RawKey::Char('x'), &keymap);
        assert_eq!(episode.state(), EpisodeState::ResolvedError);
    }

    #[test]
    fn pending_lookahead_is_echoed() {
        let keymap = keymap();
        let mut episode = Episode::new(Config::default());

        episode.feed(&RawKey::Char('x'), &keymap);
        assert_eq!(episode.feed(&RawKey::Char('g'), &keymap), EpisodeStep::Pending);
        assert_eq!(episode.current_description(), "C-x M-");
    }

    #[test]
    fn next_key_after_termination_starts_a_new_episode() {
        let keymap = keymap();
        let mut episode = Episode::new(Config::default());

        episode.feed(&RawKey::Char('q'), &keymap);
        assert_eq!(episode.state(), EpisodeState::ResolvedError);

        assert_eq!(episode.feed(&RawKey::Char('g'), &keymap), EpisodeStep::Pending);
        assert_eq!(
            episode.feed(&RawKey::Char('f'), &keymap),
            EpisodeStep::Command {
                sequence: "M-f".to_string(),
                command: "forward-word",
            }
        );
        assert_eq!(episode.keys_consumed(), 2);
    }

    #[test]
    fn abort_discards_sequence() {
        let keymap = keymap();
        let mut episode = Episode::new(Config::default());

        episode.feed(&RawKey::Char('x'), &keymap);
        episode.abort();
        assert_eq!(episode.state(), EpisodeState::Start);

        // C-x の続きではなく新しいエピソードとして解釈される
        assert_eq!(
            episode.feed(&RawKey::Char('s'), &keymap),
            EpisodeStep::Unresolved(ResolutionFailure::new("C-s"))
        );
    }

    #[test]
    fn config_is_frozen_while_building() {
        let keymap = keymap();
        let mut episode = Episode::new(Config::default());
        let custom = Config {
            meta_trigger: "m".to_string(),
            ..Config::default()
        };

        episode.feed(&RawKey::Char('x'), &keymap);
        assert_eq!(
            episode.set_config(custom.clone()),
            Err(ChordError::Config(ConfigError::EpisodeInProgress))
        );

        episode.feed(&RawKey::Char('s'), &keymap);
        episode.set_config(custom).unwrap();
        assert_eq!(episode.config().meta_trigger, "m");
        assert_eq!(episode.feed(&RawKey::Char('m'), &keymap), EpisodeStep::Pending);
        assert_eq!(episode.current_description(), "M-");
    }
}
