//! シェルのセッション状態を保持するモジュール。
//!
//! 履歴（[`History`]）、直前の終了ステータス、終了要求フラグを持ち、
//! 1 行ごとのディスパッチ（ビルトイン判定 → 履歴追加 → パース → 実行）を行う。
//! インタプリタ自身が持つ可変状態はここだけで、シングルスレッドからのみ触られる。

use std::io;

use log::debug;

use crate::builtins;
use crate::executor;
use crate::history::History;
use crate::parser;
use crate::process::ChildStatus;
use crate::signal;

/// シェルの実行状態。REPLループ全体で共有される。
pub struct Shell {
    /// コマンド履歴。受理した行ごとに 1 回だけ追加される。
    pub history: History,
    /// 直前のコマンドの終了ステータス。プロンプト表示と `-c` の終了コードに使う。
    pub last_status: i32,
    /// `exit` ビルトインで true にセットされ、REPLループを終了させる。
    pub should_exit: bool,
}

impl Shell {
    pub fn new(history_capacity: usize) -> Self {
        Self {
            history: History::with_capacity(history_capacity),
            last_status: 0,
            should_exit: false,
        }
    }

    /// プロンプト文字列。終了ステータスが非ゼロなら接頭辞に付ける。
    pub fn prompt(&self) -> String {
        if self.last_status == 0 {
            "vsh$ ".to_string()
        } else {
            format!("[{}] vsh$ ", self.last_status)
        }
    }

    /// 1 行を処理し、終了ステータスを返す。
    ///
    /// `record` が true なら（ビルトイン以外の）行を履歴に追加する。
    /// 起動ファイルの行は履歴に残さないため false で呼ばれる。
    pub fn dispatch(&mut self, line: &str, record: bool) -> i32 {
        if let Some(builtin) = builtins::recognize(line) {
            self.last_status = builtins::run(self, &builtin, &mut io::stdout());
            return self.last_status;
        }

        if record {
            self.history.push(line);
        }

        let Some(parsed) = parser::parse(line) else {
            return self.last_status;
        };
        debug!("dispatch: {:?}", parsed);

        let status = executor::run_line(&parsed);
        // 子の実行中に届いた Ctrl+C はここで消費する
        if signal::take_interrupt() || status == ChildStatus::Signaled(libc::SIGINT) {
            println!();
        }
        self.last_status = status.code();
        self.last_status
    }
}
