//! 入力ソース
//!
//! 「次のキーイベントを1つ読む」ブロッキング入力の抽象

use super::key::RawKey;
use crate::error::{InputError, Result};
use std::collections::VecDeque;

/// 生キーイベントの供給元
pub trait KeySource {
    /// 次のキーイベントを読む（到着までブロックする）
    fn next_key(&mut self) -> Result<RawKey>;
}

impl<S: KeySource + ?Sized> KeySource for &mut S {
    fn next_key(&mut self) -> Result<RawKey> {
        (**self).next_key()
    }
}

/// 事前に用意したキー列を順に返す入力ソース
///
/// キー列の再生やテストに使う。尽きたら `InputError::Closed`
#[derive(Debug, Clone, Default)]
pub struct ScriptedKeys {
    keys: VecDeque<RawKey>,
    consumed: usize,
}

impl ScriptedKeys {
    pub fn new<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<RawKey>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
            consumed: 0,
        }
    }

    /// 文字列の各文字をキーとして扱う
    pub fn from_chars(text: &str) -> Self {
        Self::new(text.chars())
    }

    pub fn push(&mut self, key: impl Into<RawKey>) {
        self.keys.push_back(key.into());
    }

    /// これまでに読まれたキー数
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    pub fn remaining(&self) -> usize {
        self.keys.len()
    }
}

impl KeySource for ScriptedKeys {
    fn next_key(&mut self) -> Result<RawKey> {
        let key = self.keys.pop_front().ok_or(InputError::Closed)?;
        self.consumed += 1;
        Ok(key)
    }
}
