//! キーシーケンス
//!
//! 蓄積中のキー列（修飾キーとトークンのグループ列）と、その構築器。
//! 描画は標準のキー記述（"C-x C-s"）に従う。

use super::key::{normalize, KeyToken, RawKey};
use super::modifier::{resolve, ModifierPrefix, Resolution};
use super::source::KeySource;
use crate::config::Config;
use crate::error::{KeymapError, Result};
use std::fmt;

/// 修飾キー付きの1キー
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyGroup {
    pub prefix: ModifierPrefix,
    pub token: KeyToken,
}

impl KeyGroup {
    pub fn new(prefix: ModifierPrefix, token: KeyToken) -> Self {
        Self { prefix, token }
    }

    fn parse(part: &str) -> std::result::Result<Self, KeymapError> {
        let mut ctrl = false;
        let mut meta = false;
        let mut remaining = part;

        // 修飾キーの解析
        loop {
            if let Some(rest) = remaining.strip_prefix("C-") {
                ctrl = true;
                remaining = rest;
            } else if let Some(rest) = remaining.strip_prefix("M-") {
                meta = true;
                remaining = rest;
            } else {
                break;
            }
        }

        if remaining.is_empty() {
            return Err(KeymapError::InvalidDescription {
                description: part.to_string(),
            });
        }

        Ok(Self {
            prefix: ModifierPrefix::from_flags(ctrl, meta),
            token: KeyToken::from_description(remaining),
        })
    }
}

impl fmt::Display for KeyGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.prefix, self.token)
    }
}

/// 蓄積中のキー列
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct KeySequence {
    groups: Vec<KeyGroup>,
}

impl KeySequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// キー記述からパース
    ///
    /// 修飾キーの順序は正規化される（"M-C-x" は "C-M-x"）。
    /// 区切りは半角スペースのみで、タブや改行はトークンとして残る。
    pub fn parse(description: &str) -> std::result::Result<Self, KeymapError> {
        let groups = description
            .split(' ')
            .filter(|part| !part.is_empty())
            .map(KeyGroup::parse)
            .collect::<std::result::Result<Vec<_>, _>>()?;

        if groups.is_empty() {
            return Err(KeymapError::EmptySequence);
        }

        Ok(Self { groups })
    }

    pub fn push(&mut self, group: KeyGroup) {
        self.groups.push(group);
    }

    pub fn groups(&self) -> &[KeyGroup] {
        &self.groups
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// 前方一致チェック
    pub fn starts_with(&self, prefix: &KeySequence) -> bool {
        self.groups.starts_with(&prefix.groups)
    }

    /// 直前までのキー列（末尾のグループを除く）
    pub fn parent(&self) -> Option<KeySequence> {
        match self.groups.split_last() {
            Some((_, rest)) if !rest.is_empty() => Some(Self { groups: rest.to_vec() }),
            _ => None,
        }
    }

    /// キー記述テキスト
    pub fn description(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for KeySequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, group) in self.groups.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", group)?;
        }
        Ok(())
    }
}

/// 1イベント投入の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildStep {
    /// 先読みのためもう1イベント必要
    NeedsEvent,
    /// グループを1つ追加した
    Appended(KeyGroup),
}

/// キー列構築器
///
/// 正規化と修飾キー解決を交互に行い、解決1回につきちょうど1グループを追加する。
/// 先読み待ちは `pending` で表し、再帰はしない。
#[derive(Debug, Clone, Default)]
pub struct SequenceBuilder {
    pending: Option<ModifierPrefix>,
}

impl SequenceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// 先読み待ちか
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// 先読み待ちの修飾キー
    pub fn pending_prefix(&self) -> Option<ModifierPrefix> {
        self.pending
    }

    /// 生キーを1つ投入する
    pub fn feed(&mut self, key: &RawKey, sequence: &mut KeySequence, config: &Config) -> BuildStep {
        let token = normalize(key);

        if let Some(prefix) = self.pending.take() {
            return Self::append(sequence, KeyGroup::new(prefix, token));
        }

        match resolve(&token, sequence.is_empty(), config) {
            Resolution::Apply(prefix) => Self::append(sequence, KeyGroup::new(prefix, token)),
            Resolution::Lookahead(prefix) => {
                log::trace!("{} requests one more key", token);
                self.pending = Some(prefix);
                BuildStep::NeedsEvent
            }
        }
    }

    /// グループが1つ確定するまで入力ソースから読む
    pub fn extend<S: KeySource>(
        &mut self,
        source: &mut S,
        sequence: &mut KeySequence,
        config: &Config,
    ) -> Result<KeyGroup> {
        loop {
            let key = source.next_key()?;
            if let BuildStep::Appended(group) = self.feed(&key, sequence, config) {
                return Ok(group);
            }
        }
    }

    fn append(sequence: &mut KeySequence, group: KeyGroup) -> BuildStep {
        sequence.push(group.clone());
        log::trace!("sequence extended to {}", sequence);
        BuildStep::Appended(group)
    }
}
