//! ビルトインコマンドの実装。
//!
//! ビルトインはパース前の生の行から認識し、fork せずにプロセス内で直接実行する。
//! [`recognize`] が `Some` を返せばビルトインとして処理し、
//! `None` なら通常のパース・実行に進む。

use std::io::{self, Write};

use crate::shell::Shell;
use crate::tokenizer::{self, MAX_ARGS};

/// 認識したビルトインと、その引数（あれば）。
#[derive(Debug, PartialEq, Eq)]
pub enum Builtin<'a> {
    /// `exit [N]`
    Exit(Option<&'a str>),
    /// `history [N]`
    History(Option<&'a str>),
}

/// 行の最初のワードがビルトイン名ならそれを返す。
///
/// 演算子（`|`, `;`, `&&`）を含む行はビルトインとして扱わず、通常のパースに回す。
pub fn recognize(line: &str) -> Option<Builtin<'_>> {
    if line.contains(['|', ';']) || line.contains("&&") {
        return None;
    }
    let words = tokenizer::split_words(line, MAX_ARGS);
    let arg = words.get(1).copied();
    match words.first().copied() {
        Some("exit") => Some(Builtin::Exit(arg)),
        Some("history") => Some(Builtin::History(arg)),
        _ => None,
    }
}

/// ビルトインを実行し、終了ステータスを返す。出力は `out` に書く。
pub fn run(shell: &mut Shell, builtin: &Builtin<'_>, out: &mut dyn Write) -> i32 {
    match *builtin {
        Builtin::Exit(arg) => builtin_exit(shell, arg),
        Builtin::History(arg) => builtin_history(shell, arg, out),
    }
}

/// `exit [N]` — シェルを終了する。N 省略時はステータス 0。
fn builtin_exit(shell: &mut Shell, arg: Option<&str>) -> i32 {
    shell.should_exit = true;
    match arg {
        None => 0,
        Some(n) => n.parse::<i32>().unwrap_or_else(|_| {
            eprintln!("vsh: exit: {}: numeric argument required", n);
            2
        }),
    }
}

/// `history [N]` — 履歴を 1 始まりの番号付きで表示する。N 指定時は末尾 N 件。
fn builtin_history(shell: &Shell, arg: Option<&str>, out: &mut dyn Write) -> i32 {
    let entries = shell.history.entries();
    let start = match arg {
        None => 0,
        Some(n_str) => match n_str.parse::<usize>() {
            Ok(n) => entries.len().saturating_sub(n),
            Err(_) => {
                eprintln!("vsh: history: {}: numeric argument required", n_str);
                return 2;
            }
        },
    };
    match print_entries(out, entries, start) {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("vsh: history: {}", e);
            1
        }
    }
}

fn print_entries(out: &mut dyn Write, entries: &[String], start: usize) -> io::Result<()> {
    for (i, entry) in entries[start..].iter().enumerate() {
        writeln!(out, "{:5}  {}", start + i + 1, entry)?;
    }
    out.flush()
}
