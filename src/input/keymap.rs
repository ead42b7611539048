//! キーマップ
//!
//! キー記述テキストを Command / NestedKeymap / Unbound に分類する外部ストアの契約と、
//! その参照実装であるプレフィックスキーマップ

use super::sequence::KeySequence;
use crate::error::KeymapError;
use std::collections::{HashMap, HashSet};

/// キー検索の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding<C> {
    /// コマンドが見つかった
    Command(C),
    /// プレフィックスキー（続きの入力待ち）
    NestedKeymap,
    /// バインドされていない
    Unbound,
}

/// キーマップストアの契約
pub trait KeymapStore {
    /// コマンドのハンドル
    type Command: Clone;

    /// キー記述テキストを検索する
    fn resolve(&self, description: &str) -> Binding<Self::Command>;
}

impl<K: KeymapStore + ?Sized> KeymapStore for &K {
    type Command = K::Command;

    fn resolve(&self, description: &str) -> Binding<Self::Command> {
        (**self).resolve(description)
    }
}

/// プレフィックスキーマップ
///
/// バインドは正規化したキー記述で保持し、その全ての真の前方部分をプレフィックスとして記録する
#[derive(Debug, Clone)]
pub struct PrefixKeymap<C> {
    bindings: HashMap<String, C>,
    prefixes: HashSet<String>,
}

impl<C> Default for PrefixKeymap<C> {
    fn default() -> Self {
        Self {
            bindings: HashMap::new(),
            prefixes: HashSet::new(),
        }
    }
}

impl<C: Clone> PrefixKeymap<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// キーバインドを追加
    ///
    /// コマンドにバインドされたキーを延長するもの、既存のプレフィックスをコマンドで
    /// 塞ぐものは拒否する。同じキー列の再バインドは上書き。
    pub fn bind(&mut self, description: &str, command: C) -> Result<(), KeymapError> {
        let sequence = KeySequence::parse(description)?;
        let canonical = sequence.description();

        if self.prefixes.contains(&canonical) {
            return Err(KeymapError::PrefixConflict {
                sequence: self.first_binding_under(&sequence),
                prefix: canonical,
            });
        }

        let mut ancestors = Vec::new();
        let mut current = sequence.parent();
        while let Some(parent) = current {
            let text = parent.description();
            if self.bindings.contains_key(&text) {
                return Err(KeymapError::PrefixConflict {
                    sequence: canonical,
                    prefix: text,
                });
            }
            current = parent.parent();
            ancestors.push(text);
        }

        self.prefixes.extend(ancestors);
        self.bindings.insert(canonical, command);
        Ok(())
    }

    /// 複数のバインドをまとめて追加
    pub fn with_bindings<'a, I>(bindings: I) -> Result<Self, KeymapError>
    where
        I: IntoIterator<Item = (&'a str, C)>,
    {
        let mut keymap = Self::new();
        for (description, command) in bindings {
            keymap.bind(description, command)?;
        }
        Ok(keymap)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// バインド済みのキー記述（整列済み）
    pub fn descriptions(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.bindings.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    fn first_binding_under(&self, prefix: &KeySequence) -> String {
        self.descriptions()
            .into_iter()
            .find(|text| {
                KeySequence::parse(text)
                    .map(|seq| seq.starts_with(prefix))
                    .unwrap_or(false)
            })
            .map(str::to_string)
            .unwrap_or_default()
    }
}

impl<C: Clone> KeymapStore for PrefixKeymap<C> {
    type Command = C;

    fn resolve(&self, description: &str) -> Binding<C> {
        // 呼び出し側の表記揺れ（"M-C-x" など）を吸収する
        let canonical = match KeySequence::parse(description) {
            Ok(sequence) => sequence.description(),
            Err(_) => return Binding::Unbound,
        };

        if let Some(command) = self.bindings.get(&canonical) {
            Binding::Command(command.clone())
        } else if self.prefixes.contains(&canonical) {
            Binding::NestedKeymap
        } else {
            Binding::Unbound
        }
    }
}
