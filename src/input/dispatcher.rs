//! バインディングディスパッチャ
//!
//! 入力ソースからエピソードを最後まで進め、解決したコマンドを外部の実行機構へ渡す

use super::episode::{Episode, EpisodeStep};
use super::keymap::KeymapStore;
use super::source::KeySource;
use crate::config::Config;
use crate::error::{ChordError, InputError, Notification, Result};

/// 外部の実行機構
pub trait CommandExecutor<C> {
    /// 「最後に実行したコマンド」を設定する（繰り返し実行用）
    fn set_last_command(&mut self, command: &C);

    /// コマンドを直接呼び出したのと同様に実行する
    fn execute(&mut self, command: &C) -> Result<()>;
}

impl<C, E: CommandExecutor<C> + ?Sized> CommandExecutor<C> for &mut E {
    fn set_last_command(&mut self, command: &C) {
        (**self).set_last_command(command)
    }

    fn execute(&mut self, command: &C) -> Result<()> {
        (**self).execute(command)
    }
}

/// 解決済みエピソード
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved<C> {
    /// 解決したキー記述
    pub sequence: String,
    /// バインドされたコマンド
    pub command: C,
    /// このエピソードで読んだキー数
    pub keys_consumed: usize,
}

/// コード解釈器
///
/// エピソードは `&self` で進むため、設定の変更（`&mut self`）はエピソードの間にしかできない
#[derive(Debug, Clone, Default)]
pub struct ChordInterpreter {
    config: Config,
}

impl ChordInterpreter {
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn set_config(&mut self, config: Config) -> Result<()> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    /// 実行せずにエピソードを終端まで進める
    ///
    /// 未解決の場合は `ChordError::Resolution` を返す
    pub fn lookup<S, K>(&self, source: &mut S, keymap: &K) -> Result<Resolved<K::Command>>
    where
        S: KeySource,
        K: KeymapStore,
    {
        let mut episode = Episode::new(self.config.clone());

        loop {
            let key = source.next_key()?;
            match episode.feed(&key, keymap) {
                EpisodeStep::Pending => continue,
                EpisodeStep::Command { sequence, command } => {
                    return Ok(Resolved {
                        sequence,
                        command,
                        keys_consumed: episode.keys_consumed(),
                    });
                }
                EpisodeStep::Unresolved(failure) => return Err(failure.into()),
            }
        }
    }

    /// 1エピソードを解釈し、解決したコマンドを実行する
    pub fn run_episode<S, K, E>(
        &self,
        source: &mut S,
        keymap: &K,
        executor: &mut E,
    ) -> Result<Resolved<K::Command>>
    where
        S: KeySource,
        K: KeymapStore,
        E: CommandExecutor<K::Command>,
    {
        let resolved = self.lookup(source, keymap)?;
        executor.set_last_command(&resolved.command);
        executor.execute(&resolved.command)?;
        Ok(resolved)
    }

    /// 入力が閉じるまでエピソードを繰り返す
    ///
    /// 未解決と中断は通知して次のエピソードへ進む。入力の終了で `Ok` を返し、
    /// それ以外のエラーはそのまま返す。
    pub fn run_until_closed<S, K, E, F>(
        &self,
        source: &mut S,
        keymap: &K,
        executor: &mut E,
        mut notify: F,
    ) -> Result<usize>
    where
        S: KeySource,
        K: KeymapStore,
        E: CommandExecutor<K::Command>,
        F: FnMut(Notification),
    {
        let mut executed = 0;

        loop {
            match self.run_episode(source, keymap, executor) {
                Ok(_) => executed += 1,
                Err(ChordError::Input(InputError::Closed)) => return Ok(executed),
                Err(error @ ChordError::Resolution(_))
                | Err(error @ ChordError::Input(InputError::Interrupted { .. })) => {
                    notify(Notification::new(&error));
                }
                Err(error) => return Err(error),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{NotificationLevel, ResolutionFailure};
    use crate::input::key::RawKey;
    use crate::input::keymap::PrefixKeymap;
    use crate::input::source::ScriptedKeys;

    #[derive(Default)]
    struct Recorder {
        last_command: Option<&'static str>,
        executed: Vec<&'static str>,
        fail_on: Option<&'static str>,
    }

    impl CommandExecutor<&'static str> for Recorder {
        fn set_last_command(&mut self, command: &&'static str) {
            self.last_command = Some(*command);
        }

        fn execute(&mut self, command: &&'static str) -> Result<()> {
            if self.fail_on == Some(*command) {
                return Err(ChordError::Execution(format!("{} failed", command)));
            }
            self.executed.push(*command);
            Ok(())
        }
    }

    fn keymap() -> PrefixKeymap<&'static str> {
        PrefixKeymap::with_bindings([("C-x C-s", "save"), ("M-f", "forward-word")]).unwrap()
    }

    #[test]
    fn run_episode_sets_last_command_and_executes() {
        let interpreter = ChordInterpreter::default();
        let mut source = ScriptedKeys::from_chars("xs");
        let mut recorder = Recorder::default();

        let resolved = interpreter
            .run_episode(&mut source, &keymap(), &mut recorder)
            .unwrap();

        assert_eq!(resolved.sequence, "C-x C-s");
        assert_eq!(resolved.keys_consumed, 2);
        assert_eq!(recorder.last_command, Some("save"));
        assert_eq!(recorder.executed, vec!["save"]);
    }

    #[test]
    fn lookup_does_not_execute() {
        let interpreter = ChordInterpreter::default();
        let mut source = ScriptedKeys::from_chars("gf");

        let resolved = interpreter.lookup(&mut source, &keymap()).unwrap();
        assert_eq!(resolved.command, "forward-word");
        assert_eq!(source.remaining(), 0);
    }

    #[test]
    fn unresolved_episode_does_not_touch_executor() {
        let interpreter = ChordInterpreter::default();
        let mut source = ScriptedKeys::from_chars("xb");
        let mut recorder = Recorder::default();

        let result = interpreter.run_episode(&mut source, &keymap(), &mut recorder);
        assert_eq!(result, Err(ChordError::from(ResolutionFailure::new("C-x C-b"))));
        assert!(recorder.last_command.is_none());
        assert!(recorder.executed.is_empty());
    }

    #[test]
    fn input_closing_mid_episode_is_reported() {
        let interpreter = ChordInterpreter::default();
        let mut source = ScriptedKeys::from_chars("xg");

        assert_eq!(
            interpreter.lookup(&mut source, &keymap()),
            Err(ChordError::Input(InputError::Closed))
        );
    }

    #[test]
    fn execution_failure_propagates_after_last_command_is_set() {
        let interpreter = ChordInterpreter::default();
        let mut source = ScriptedKeys::from_chars("gf");
        let mut recorder = Recorder {
            fail_on: Some("forward-word"),
            ..Recorder::default()
        };

        let result = interpreter.run_episode(&mut source, &keymap(), &mut recorder);
        assert!(matches!(result, Err(ChordError::Execution(_))));
        assert_eq!(recorder.last_command, Some("forward-word"));
    }

    #[test]
    fn run_until_closed_notifies_and_continues() {
        let interpreter = ChordInterpreter::default();
        let mut source = ScriptedKeys::new(vec![
            RawKey::Char('x'),
            RawKey::Char('s'),
            RawKey::Char(' '),
            RawKey::Char('g'),
            RawKey::Char('f'),
        ]);
        let mut recorder = Recorder::default();
        let mut notifications = Vec::new();

        let executed = interpreter
            .run_until_closed(&mut source, &keymap(), &mut recorder, |n| notifications.push(n))
            .unwrap();

        assert_eq!(executed, 2);
        assert_eq!(recorder.executed, vec!["save", "forward-word"]);
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].message, "SPC is undefined");
        assert_eq!(notifications[0].level, NotificationLevel::Warning);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = Config {
            control_meta_trigger: "g".to_string(),
            ..Config::default()
        };
        assert!(ChordInterpreter::new(config.clone()).is_err());

        let mut interpreter = ChordInterpreter::default();
        assert!(interpreter.set_config(config).is_err());
        assert_eq!(interpreter.config(), &Config::default());
    }
}
