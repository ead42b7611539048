//! キー正規化
//!
//! 生のキーイベントを正規のテキストトークンへ変換する

use crossterm::event::{KeyCode as CrosstermKeyCode, KeyEvent};
use std::fmt;

/// 生のキーイベント（文字または名前付き特殊キー）
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RawKey {
    /// 文字キー
    Char(char),
    /// 名前付きキー（"backspace", "return" など）
    Named(String),
}

impl RawKey {
    pub fn named(name: impl Into<String>) -> Self {
        RawKey::Named(name.into())
    }

    pub fn backspace() -> Self {
        RawKey::named("backspace")
    }

    /// テキストから生キーを作る（1文字なら文字キー、それ以外は名前付きキー）
    pub fn from_text(text: &str) -> Self {
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(ch), None) => RawKey::Char(ch),
            _ => RawKey::Named(text.to_string()),
        }
    }

    /// 正規化してトークンにする
    pub fn normalize(&self) -> KeyToken {
        normalize(self)
    }
}

impl From<char> for RawKey {
    fn from(ch: char) -> Self {
        RawKey::Char(ch)
    }
}

/// crossterm統合
///
/// 修飾キーは無視する。修飾付きの入力を割り込みとして扱うかは入力層が決める
impl From<KeyEvent> for RawKey {
    fn from(event: KeyEvent) -> Self {
        match event.code {
            CrosstermKeyCode::Char(c) => RawKey::Char(c),
            CrosstermKeyCode::Backspace => RawKey::backspace(),
            CrosstermKeyCode::Enter => RawKey::named("return"),
            CrosstermKeyCode::Tab => RawKey::named("tab"),
            CrosstermKeyCode::BackTab => RawKey::named("backtab"),
            CrosstermKeyCode::Esc => RawKey::named("escape"),
            CrosstermKeyCode::Delete => RawKey::named("delete"),
            CrosstermKeyCode::Insert => RawKey::named("insert"),
            CrosstermKeyCode::Up => RawKey::named("up"),
            CrosstermKeyCode::Down => RawKey::named("down"),
            CrosstermKeyCode::Left => RawKey::named("left"),
            CrosstermKeyCode::Right => RawKey::named("right"),
            CrosstermKeyCode::Home => RawKey::named("home"),
            CrosstermKeyCode::End => RawKey::named("end"),
            CrosstermKeyCode::PageUp => RawKey::named("prior"),
            CrosstermKeyCode::PageDown => RawKey::named("next"),
            CrosstermKeyCode::F(n) => RawKey::Named(format!("f{}", n)),
            other => RawKey::Named(format!("{:?}", other).to_ascii_lowercase()),
        }
    }
}

/// 正規化済みキートークン
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyToken(String);

impl KeyToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub(crate) fn from_description(text: &str) -> Self {
        KeyToken(text.to_string())
    }
}

impl fmt::Display for KeyToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<str> for KeyToken {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for KeyToken {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// 生キーを正規トークンへ変換する全域関数
pub fn normalize(key: &RawKey) -> KeyToken {
    match key {
        RawKey::Char(' ') => KeyToken("SPC".to_string()),
        RawKey::Char(ch) => KeyToken(ch.to_string()),
        RawKey::Named(name) if name == "backspace" => KeyToken("DEL".to_string()),
        RawKey::Named(name) => KeyToken(name.clone()),
    }
}

/// 設定値などのテキストを正規トークンへ変換
pub fn normalize_text(text: &str) -> KeyToken {
    normalize(&RawKey::from_text(text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    #[test]
    fn space_becomes_spc() {
        assert_eq!(normalize(&RawKey::Char(' ')), "SPC");
    }

    #[test]
    fn backspace_becomes_del() {
        assert_eq!(normalize(&RawKey::backspace()), "DEL");
    }

    #[test]
    fn plain_characters_pass_through() {
        assert_eq!(normalize(&RawKey::Char('x')), "x");
        assert_eq!(normalize(&RawKey::Char('G')), "G");
        assert_eq!(normalize(&RawKey::Char('あ')), "あ");
    }

    #[test]
    fn unknown_named_keys_pass_through() {
        assert_eq!(normalize(&RawKey::named("f5")), "f5");
        assert_eq!(normalize(&RawKey::named("return")), "return");
    }

    #[test]
    fn text_normalization_matches_key_normalization() {
        assert_eq!(normalize_text(" "), "SPC");
        assert_eq!(normalize_text("g"), "g");
        assert_eq!(normalize_text("backspace"), "DEL");
    }

    #[test]
    fn crossterm_integration() {
        let event = KeyEvent::new(CrosstermKeyCode::Char('x'), KeyModifiers::NONE);
        assert_eq!(RawKey::from(event), RawKey::Char('x'));

        let event = KeyEvent::new(CrosstermKeyCode::Char('G'), KeyModifiers::SHIFT);
        assert_eq!(RawKey::from(event), RawKey::Char('G'));

        let event = KeyEvent::new(CrosstermKeyCode::Backspace, KeyModifiers::NONE);
        assert_eq!(RawKey::from(event).normalize(), "DEL");

        let event = KeyEvent::new(CrosstermKeyCode::F(3), KeyModifiers::NONE);
        assert_eq!(RawKey::from(event), RawKey::named("f3"));
    }
}
