//! イベントハンドリング
//!
//! crossterm の端末イベントを生キーとして供給する入力ソース

use super::key::RawKey;
use super::source::KeySource;
use crate::error::{InputError, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;

/// 端末入力のフィルタ結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyFilter {
    /// 生キーとして渡す
    Key(RawKey),
    /// 進行中のエピソードを中断
    Interrupt(String),
    /// 入力を閉じる
    Close,
    /// 無視
    Ignore,
}

/// 端末入力ソース
///
/// 本物の修飾キー付き入力は解釈対象ではなく入力層の制御として扱う。
/// C-g は中断、C-c と Esc は入力の終了。
#[derive(Debug, Default)]
pub struct TerminalKeySource;

impl TerminalKeySource {
    pub fn new() -> Self {
        Self
    }

    /// イベントを振り分ける
    pub fn filter_event(event: &Event) -> KeyFilter {
        match event {
            Event::Key(key_event) => Self::filter_key(key_event),
            // マウス、リサイズ、フォーカス、ペーストは対象外
            _ => KeyFilter::Ignore,
        }
    }

    fn filter_key(key_event: &KeyEvent) -> KeyFilter {
        if key_event.kind == KeyEventKind::Release {
            return KeyFilter::Ignore;
        }

        if key_event.modifiers.contains(KeyModifiers::CONTROL) {
            return match key_event.code {
                KeyCode::Char('c') => KeyFilter::Close,
                KeyCode::Char('g') => KeyFilter::Interrupt("C-g".to_string()),
                _ => KeyFilter::Ignore,
            };
        }

        if key_event.modifiers.contains(KeyModifiers::ALT) {
            return KeyFilter::Ignore;
        }

        if key_event.code == KeyCode::Esc {
            return KeyFilter::Close;
        }

        KeyFilter::Key(RawKey::from(*key_event))
    }
}

impl KeySource for TerminalKeySource {
    fn next_key(&mut self) -> Result<RawKey> {
        loop {
            let event = event::read()?;
            match Self::filter_event(&event) {
                KeyFilter::Key(key) => return Ok(key),
                KeyFilter::Interrupt(key) => return Err(InputError::Interrupted { key }.into()),
                KeyFilter::Close => return Err(InputError::Closed.into()),
                KeyFilter::Ignore => log::trace!("ignored terminal event {:?}", event),
            }
        }
    }
}

/// raw modeの有効期間を管理するガード
pub struct RawModeGuard;

impl RawModeGuard {
    pub fn enable() -> Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if let Err(err) = terminal::disable_raw_mode() {
            log::error!("failed to leave raw mode: {}", err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    #[test]
    fn plain_keys_pass_through() {
        let event = Event::Key(KeyEvent::new(KeyCode::Char('x'), KeyModifiers::NONE));
        assert_eq!(TerminalKeySource::filter_event(&event), KeyFilter::Key(RawKey::Char('x')));

        let event = Event::Key(KeyEvent::new(KeyCode::Char('G'), KeyModifiers::SHIFT));
        assert_eq!(TerminalKeySource::filter_event(&event), KeyFilter::Key(RawKey::Char('G')));

        let event = Event::Key(KeyEvent::new(KeyCode::Backspace, KeyModifiers::NONE));
        assert_eq!(TerminalKeySource::filter_event(&event), KeyFilter::Key(RawKey::backspace()));
    }

    #[test]
    fn control_keys_are_input_layer_controls() {
        let ctrl_g = Event::Key(KeyEvent::new(KeyCode::Char('g'), KeyModifiers::CONTROL));
        assert_eq!(
            TerminalKeySource::filter_event(&ctrl_g),
            KeyFilter::Interrupt("C-g".to_string())
        );

        let ctrl_c = Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert_eq!(TerminalKeySource::filter_event(&ctrl_c), KeyFilter::Close);

        let esc = Event::Key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE));
        assert_eq!(TerminalKeySource::filter_event(&esc), KeyFilter::Close);

        let alt_x = Event::Key(KeyEvent::new(KeyCode::Char('x'), KeyModifiers::ALT));
        assert_eq!(TerminalKeySource::filter_event(&alt_x), KeyFilter::Ignore);
    }

    #[test]
    fn releases_and_non_key_events_are_ignored() {
        let release = Event::Key(KeyEvent::new_with_kind_and_state(
            KeyCode::Char('x'),
            KeyModifiers::NONE,
            KeyEventKind::Release,
            KeyEventState::NONE,
        ));
        assert_eq!(TerminalKeySource::filter_event(&release), KeyFilter::Ignore);
        assert_eq!(TerminalKeySource::filter_event(&Event::Resize(80, 24)), KeyFilter::Ignore);
        assert_eq!(TerminalKeySource::filter_event(&Event::FocusGained), KeyFilter::Ignore);
    }
}
