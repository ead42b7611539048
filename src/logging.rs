//! ロギングシステム
//!
//! `log` ファサードのバックエンド。開発者向けにstderrと任意のファイルへ出力する

use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

/// ロガー
#[derive(Debug)]
pub struct Logger {
    level: LevelFilter,
    output_stderr: bool,
    output_file: Option<PathBuf>,
    // ファイル書き込みの直列化
    file_lock: Mutex<()>,
}

impl Logger {
    pub fn new(level: LevelFilter) -> Self {
        Self {
            level,
            output_stderr: true,
            output_file: None,
            file_lock: Mutex::new(()),
        }
    }

    /// 開発者向けロガー
    pub fn for_development() -> Self {
        Self::new(LevelFilter::Debug)
    }

    pub fn level(&self) -> LevelFilter {
        self.level
    }

    pub fn with_level(mut self, level: LevelFilter) -> Self {
        self.level = level;
        self
    }

    /// ファイル出力を設定
    pub fn with_file_output<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.output_file = Some(path.into());
        self
    }

    /// 標準エラー出力を無効化
    ///
    /// raw modeの端末ではstderrへの出力が画面を乱すため、ファイル出力のみにする場合に使う
    pub fn without_stderr(mut self) -> Self {
        self.output_stderr = false;
        self
    }

    fn format_line(record: &Record<'_>) -> String {
        match (record.file(), record.line()) {
            (Some(file), Some(line)) if record.level() >= log::Level::Debug => {
                format!("{}: {} at {}:{}", record.level(), record.args(), file, line)
            }
            _ => format!("{}: {}", record.level(), record.args()),
        }
    }

    fn write_line(&self, line: &str) {
        if self.output_stderr {
            eprintln!("{}", line);
        }

        if let Some(path) = &self.output_file {
            let _guard = self.file_lock.lock();
            if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(path) {
                let _ = writeln!(file, "{}", line);
            }
        }
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record<'_>) {
        if self.enabled(record.metadata()) {
            self.write_line(&Self::format_line(record));
        }
    }

    fn flush(&self) {}
}

/// `log` クレートのグローバルロガーとして登録
pub fn init(logger: Logger) -> Result<(), SetLoggerError> {
    let level = logger.level();
    log::set_boxed_logger(Box::new(logger))?;
    log::set_max_level(level);
    Ok(())
}

/// 設定ファイルのレベル名を解釈（不明な名前はwarn）
pub fn parse_level(name: &str) -> LevelFilter {
    name.parse().unwrap_or(LevelFilter::Warn)
}
