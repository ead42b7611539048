//! 修飾キー解決
//!
//! トークンとエピソード内の位置から、付与する修飾キーと先読みの要否を決める。
//! 判定表は固定で、設定できるのはトリガーのトークンのみ。

use super::key::KeyToken;
use crate::config::Config;
use std::fmt;

/// 仮想的な修飾キー
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModifierPrefix {
    None,
    Meta,
    ControlMeta,
    Control,
}

impl ModifierPrefix {
    /// キー記述の接頭辞
    pub fn as_str(self) -> &'static str {
        match self {
            ModifierPrefix::None => "",
            ModifierPrefix::Meta => "M-",
            ModifierPrefix::ControlMeta => "C-M-",
            ModifierPrefix::Control => "C-",
        }
    }

    pub(crate) fn from_flags(ctrl: bool, meta: bool) -> Self {
        match (ctrl, meta) {
            (false, false) => ModifierPrefix::None,
            (false, true) => ModifierPrefix::Meta,
            (true, true) => ModifierPrefix::ControlMeta,
            (true, false) => ModifierPrefix::Control,
        }
    }
}

impl fmt::Display for ModifierPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 解決結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// 現在のトークンに修飾を付けて確定
    Apply(ModifierPrefix),
    /// もう1イベント読み、そのトークンに修飾を付けて確定
    Lookahead(ModifierPrefix),
}

impl Resolution {
    pub fn prefix(self) -> ModifierPrefix {
        match self {
            Resolution::Apply(prefix) | Resolution::Lookahead(prefix) => prefix,
        }
    }

    pub fn needs_lookahead(self) -> bool {
        matches!(self, Resolution::Lookahead(_))
    }
}

/// 判定表
///
/// 1. エスケープ（先頭以外）: 修飾なしで次のトークンをそのまま使う
/// 2. Metaトリガー: 次のトークンにM-
/// 3. Control-Metaトリガー: 次のトークンにC-M-
/// 4. それ以外: 現在のトークンにC-
///
/// エピソード先頭のエスケープはエスケープする対象がないため、それ自身を修飾なしで描画する。
pub fn resolve(token: &KeyToken, is_first: bool, config: &Config) -> Resolution {
    if *token == config.literal_escape_token() {
        return if is_first {
            Resolution::Apply(ModifierPrefix::None)
        } else {
            Resolution::Lookahead(ModifierPrefix::None)
        };
    }

    if *token == config.meta_token() {
        return Resolution::Lookahead(ModifierPrefix::Meta);
    }

    if *token == config.control_meta_token() {
        return Resolution::Lookahead(ModifierPrefix::ControlMeta);
    }

    Resolution::Apply(ModifierPrefix::Control)
}
