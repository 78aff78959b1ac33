//! `execvp()` の安全な Rust ラッパー。
//!
//! fork 済みの子プロセスの中で、解決済みの argv を使ってプロセスイメージを置き換える。
//! 成功すれば戻らない。失敗時は診断を出して非ゼロで終了するが、
//! それは子プロセスの中だけで起こり、親のインタプリタには影響しない。
//!
//! ## 構成
//!
//! | 型 / 関数 | 役割 |
//! |-----|------|
//! | [`CStringVec`] | argv 用の NULL 終端ポインタ配列 |
//! | [`exec`] | `execvp` を呼ぶ。戻ってきたら必ず失敗 |
//! | [`child_main`] | 子プロセスの本体（シグナル復元 → リダイレクト → exec） |

use std::ffi::{CString, NulError};
use std::io;

use log::debug;
use thiserror::Error;

use crate::redirect;
use crate::signal;

// ── エラー型 ──────────────────────────────────────────────────────

/// `execvp` の失敗を表すエラー。
#[derive(Debug, Error)]
pub enum LaunchError {
    /// argv が空。
    #[error("empty command")]
    Empty,
    /// 引数に NUL バイトが含まれる。
    #[error("{command}: argument contains a NUL byte")]
    Nul {
        command: String,
        #[source]
        source: NulError,
    },
    /// `execvp` 自体の失敗。
    #[error("{command}: {}", errno_message(.errno))]
    Exec { command: String, errno: i32 },
}

fn errno_message(errno: &i32) -> String {
    match *errno {
        libc::ENOENT => "command not found".to_string(),
        libc::EACCES => "permission denied".to_string(),
        e => io::Error::from_raw_os_error(e).to_string(),
    }
}

impl LaunchError {
    /// エラーに対応する終了ステータスを返す。
    /// 127 = command not found, 126 = permission denied, 1 = その他。
    pub fn exit_status(&self) -> i32 {
        match self {
            Self::Exec { errno: libc::ENOENT, .. } => 127,
            Self::Exec { errno: libc::EACCES, .. } => 126,
            _ => 1,
        }
    }
}

// ── CStringVec ────────────────────────────────────────────────────

/// argv 用の CString ベクタ。NULL 終端のポインタ配列を構築する。
struct CStringVec {
    _strings: Vec<CString>,
    ptrs: Vec<*const libc::c_char>,
}

impl CStringVec {
    /// 引数リストから構築する。各要素を `CString` に変換し、NULL 終端ポインタ配列を作る。
    fn from_args(args: &[&str]) -> Result<Self, NulError> {
        let strings = args
            .iter()
            .map(|s| CString::new(*s))
            .collect::<Result<Vec<_>, _>>()?;
        let mut ptrs: Vec<*const libc::c_char> = strings.iter().map(|s| s.as_ptr()).collect();
        ptrs.push(std::ptr::null()); // NULL 終端
        Ok(Self {
            _strings: strings,
            ptrs,
        })
    }

    /// プログラム名（`argv[0]`）。
    fn program(&self) -> *const libc::c_char {
        self.ptrs[0]
    }

    /// NULL 終端ポインタ配列を返す。
    fn as_ptr(&self) -> *const *const libc::c_char {
        self.ptrs.as_ptr()
    }
}

// ── exec ──────────────────────────────────────────────────────────

/// `execvp` で現在のプロセスを `args[0]` に置き換える（`$PATH` 検索付き）。
///
/// 成功すれば戻らないので、戻り値は常に失敗理由。
pub fn exec(args: &[&str]) -> LaunchError {
    let Some(&command) = args.first() else {
        return LaunchError::Empty;
    };
    let argv = match CStringVec::from_args(args) {
        Ok(v) => v,
        Err(source) => {
            return LaunchError::Nul {
                command: command.to_string(),
                source,
            }
        }
    };

    debug!("exec: {:?}", args);
    unsafe {
        libc::execvp(argv.program(), argv.as_ptr());
    }

    LaunchError::Exec {
        command: command.to_string(),
        errno: io::Error::last_os_error().raw_os_error().unwrap_or(0),
    }
}

/// 子プロセスの本体。fork 直後に呼ぶ。
///
/// SIGINT をデフォルトに戻し、リダイレクトを適用してから exec する。
/// 戻ってきた場合は失敗なので、診断を stderr に出して終了ステータスを返す。
/// リダイレクトのみで argv が空になった場合（`> f`）はファイル作成だけ行い 0 を返す。
pub fn child_main<S: AsRef<str>>(args: &[S]) -> i32 {
    signal::reset_in_child();

    let argv = match redirect::resolve(args) {
        Ok(argv) => argv,
        Err(e) => {
            eprintln!("vsh: {}", e);
            return 1;
        }
    };
    if argv.is_empty() {
        return 0;
    }

    let err = exec(&argv);
    eprintln!("vsh: {}", err);
    err.exit_status()
}

// ── Tests ─────────────────────────────────────────────────────────
