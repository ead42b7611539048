use altre_chord::error::InputError;
use altre_chord::input::{RawModeGuard, TerminalKeySource};
use altre_chord::logging::{self, Logger};
use altre_chord::{
    ChordError, ChordInterpreter, CommandExecutor, Config, Notification, PrefixKeymap, Result,
};
use anyhow::Context;
use std::fmt;
use std::path::{Path, PathBuf};

/// デモ用のコマンド
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DemoCommand {
    SaveBuffer,
    FindFile,
    SwitchToBuffer,
    ForwardWord,
    BackwardWord,
    NextLine,
    PreviousLine,
    EvalDefun,
    DeleteBackwardChar,
}

impl fmt::Display for DemoCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DemoCommand::SaveBuffer => "save-buffer",
            DemoCommand::FindFile => "find-file",
            DemoCommand::SwitchToBuffer => "switch-to-buffer",
            DemoCommand::ForwardWord => "forward-word",
            DemoCommand::BackwardWord => "backward-word",
            DemoCommand::NextLine => "next-line",
            DemoCommand::PreviousLine => "previous-line",
            DemoCommand::EvalDefun => "eval-defun",
            DemoCommand::DeleteBackwardChar => "delete-backward-char",
        };
        f.write_str(name)
    }
}

fn demo_keymap() -> Result<PrefixKeymap<DemoCommand>> {
    Ok(PrefixKeymap::with_bindings([
        ("C-x C-s", DemoCommand::SaveBuffer),
        ("C-x C-f", DemoCommand::FindFile),
        ("C-x b", DemoCommand::SwitchToBuffer),
        ("M-f", DemoCommand::ForwardWord),
        ("M-b", DemoCommand::BackwardWord),
        ("C-n", DemoCommand::NextLine),
        ("C-p", DemoCommand::PreviousLine),
        ("C-M-x", DemoCommand::EvalDefun),
        ("C-DEL", DemoCommand::DeleteBackwardChar),
    ])?)
}

/// 実行したコマンドを表示するだけの実行機構
#[derive(Default)]
struct EchoExecutor {
    last_command: Option<DemoCommand>,
    previous_command: Option<DemoCommand>,
}

impl CommandExecutor<DemoCommand> for EchoExecutor {
    fn set_last_command(&mut self, command: &DemoCommand) {
        self.previous_command = self.last_command.replace(*command);
    }

    fn execute(&mut self, command: &DemoCommand) -> Result<()> {
        if self.previous_command == Some(*command) {
            print!("{} (repeated)\r\n", command);
        } else {
            print!("{}\r\n", command);
        }
        Ok(())
    }
}

struct Options {
    config_path: Option<PathBuf>,
    debug_log: Option<PathBuf>,
    describe: bool,
}

fn parse_options(args: &[String]) -> Options {
    let mut options = Options {
        config_path: None,
        debug_log: None,
        describe: false,
    };

    let mut iter = args.iter().peekable();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                if let Some(next) = iter.next() {
                    options.config_path = Some(Config::expand_path(next));
                }
            }
            "--debug-log" => {
                let path = iter
                    .peek()
                    .filter(|next| !next.starts_with('-'))
                    .map(|next| Config::expand_path(next));
                if path.is_some() {
                    iter.next();
                }
                options.debug_log = path.or_else(|| Some(PathBuf::from("debug.log")));
            }
            "--describe" => options.describe = true,
            _ => {}
        }
    }

    options
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let options = parse_options(&args);

    let config = load_config(options.config_path.as_deref())?;

    if let Some(path) = &options.debug_log {
        let logger = Logger::new(config.log_level_filter())
            .without_stderr()
            .with_file_output(path);
        logging::init(logger).context("failed to install logger")?;
    }

    let interpreter = ChordInterpreter::new(config)?;
    let keymap = demo_keymap()?;

    show(Notification::info(format!(
        "altre-chord {}: C-g aborts a key sequence, C-c or ESC quits.",
        env!("CARGO_PKG_VERSION")
    )));

    let _raw_mode = RawModeGuard::enable().context("failed to enable raw mode")?;
    let mut source = TerminalKeySource::new();

    if options.describe {
        describe_loop(&interpreter, &mut source, &keymap)?;
    } else {
        let mut executor = EchoExecutor::default();
        interpreter.run_until_closed(&mut source, &keymap, &mut executor, show)?;
    }

    Ok(())
}

/// 明示されたパスは必須、既定の場所はなければ既定値
fn load_config(explicit: Option<&Path>) -> anyhow::Result<Config> {
    let config = match explicit {
        Some(path) => Config::load(path),
        None => match Config::default_path() {
            Some(path) => Config::load_or_default(&path),
            None => Ok(Config::default()),
        },
    };
    config.context("failed to load config")
}

fn describe_loop(
    interpreter: &ChordInterpreter,
    source: &mut TerminalKeySource,
    keymap: &PrefixKeymap<DemoCommand>,
) -> Result<()> {
    loop {
        match interpreter.lookup(source, keymap) {
            Ok(resolved) => print!(
                "{} runs the command {}\r\n",
                resolved.sequence, resolved.command
            ),
            Err(error) if !error.is_fatal() => show(Notification::new(&error)),
            Err(ChordError::Input(InputError::Closed)) => return Ok(()),
            Err(error @ ChordError::Input(InputError::Interrupted { .. })) => {
                show(Notification::new(&error))
            }
            Err(error) => return Err(error),
        }
    }
}

fn show(notification: Notification) {
    print!("{}\r\n", notification.message);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn explicit_missing_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_config(Some(&dir.path().join("absent.json"))).is_err());
    }

    #[test]
    fn explicit_config_is_loaded() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "meta_trigger": "m" }}"#).unwrap();
        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.meta_trigger, "m");
    }
}
