//! リダイレクト解決: 引数ベクタから `<`, `>`, `>>` を取り除き、標準入出力を付け替える。
//!
//! 処理は 2 段に分かれる。
//!
//! - [`plan`]: 純粋関数。演算子とファイル名を左から順に抜き出し、残りの argv を返す。
//! - [`apply`]: ファイルを開いて `dup2` で fd 0/1 を置き換える。
//!
//! [`apply`] は呼び出したプロセス自身の標準入出力を書き換えるため、
//! fork 直後の子プロセスの中でのみ呼ぶこと。

use std::fs::{File, OpenOptions};
use std::io;
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::{IntoRawFd, RawFd};

use log::debug;
use thiserror::Error;

/// `>` / `>>` で作成するファイルのパーミッション（rw-r--r--）。
const CREATE_MODE: u32 = 0o644;

/// リダイレクトの種別。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectKind {
    /// `<` — stdin をファイルから読み取り
    Input,
    /// `>` — stdout を上書き
    Output,
    /// `>>` — stdout を追記
    Append,
}

impl RedirectKind {
    /// 演算子トークンを種別に変換する。演算子でなければ `None`。
    fn from_token(token: &str) -> Option<Self> {
        match token {
            "<" => Some(Self::Input),
            ">" => Some(Self::Output),
            ">>" => Some(Self::Append),
            _ => None,
        }
    }

    fn operator(self) -> &'static str {
        match self {
            Self::Input => "<",
            Self::Output => ">",
            Self::Append => ">>",
        }
    }

    /// 置き換え対象の fd。
    fn target_fd(self) -> i32 {
        match self {
            Self::Input => libc::STDIN_FILENO,
            Self::Output | Self::Append => libc::STDOUT_FILENO,
        }
    }
}

/// ファイルリダイレクト指定。種別とターゲットファイルパスを持つ。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub kind: RedirectKind,
    pub target: String,
}

/// [`plan`] の結果。出現順のリダイレクトと、演算子を除いた argv。
#[derive(Debug, PartialEq, Eq)]
pub struct Resolved<'a> {
    pub redirects: Vec<Redirect>,
    pub args: Vec<&'a str>,
}

#[derive(Debug, Error)]
pub enum RedirectError {
    /// 演算子の後にファイル名がない。
    #[error("syntax error: missing target after `{0}`")]
    MissingTarget(&'static str),
    /// ファイルを開けない。
    #[error("{path}: {source}")]
    Open {
        path: String,
        #[source]
        source: io::Error,
    },
    /// `dup2` の失敗。
    #[error("{path}: dup2: {source}")]
    Dup {
        path: String,
        #[source]
        source: io::Error,
    },
}

/// argv を左から走査し、リダイレクトを抜き出す。
///
/// 同じ方向の演算子が複数あれば全て出現順に残す（[`apply`] で後勝ちになる）。
pub fn plan<S: AsRef<str>>(args: &[S]) -> Result<Resolved<'_>, RedirectError> {
    let mut redirects = Vec::new();
    let mut rest = Vec::with_capacity(args.len());
    let mut iter = args.iter().map(|s| AsRef::<str>::as_ref(s));

    while let Some(token) = iter.next() {
        match RedirectKind::from_token(token) {
            Some(kind) => {
                let target = iter
                    .next()
                    .ok_or(RedirectError::MissingTarget(kind.operator()))?;
                redirects.push(Redirect {
                    kind,
                    target: target.to_string(),
                });
            }
            None => rest.push(token),
        }
    }

    Ok(Resolved {
        redirects,
        args: rest,
    })
}

/// リダイレクトを出現順に適用する。
///
/// 各ファイルを開き、`dup2` で fd 0/1 に複製してから元の fd を close する。
pub fn apply(redirects: &[Redirect]) -> Result<(), RedirectError> {
    for r in redirects {
        let file = open_target(r).map_err(|source| RedirectError::Open {
            path: r.target.clone(),
            source,
        })?;
        let newfd = r.kind.target_fd();
        install_fd(file.into_raw_fd(), newfd).map_err(|source| RedirectError::Dup {
            path: r.target.clone(),
            source,
        })?;
        debug!("redirect: {} {} -> fd {}", r.kind.operator(), r.target, newfd);
    }
    Ok(())
}

/// [`plan`] + [`apply`]。演算子を除いた argv を返す。子プロセス専用。
pub fn resolve<S: AsRef<str>>(args: &[S]) -> Result<Vec<&str>, RedirectError> {
    let resolved = plan(args)?;
    apply(&resolved.redirects)?;
    Ok(resolved.args)
}

/// `fd` を `newfd` に据え付け、exec 後も残るようにする。
///
/// `fd` は close される。既に `newfd` だった場合（fd 0/1 が閉じていた）は
/// close-on-exec だけ外す。
fn install_fd(fd: RawFd, newfd: RawFd) -> io::Result<()> {
    if fd == newfd {
        if unsafe { libc::fcntl(fd, libc::F_SETFD, 0) } < 0 {
            return Err(io::Error::last_os_error());
        }
        return Ok(());
    }
    let ret = unsafe { libc::dup2(fd, newfd) };
    let err = io::Error::last_os_error();
    unsafe {
        libc::close(fd);
    }
    if ret < 0 {
        return Err(err);
    }
    Ok(())
}

fn open_target(r: &Redirect) -> io::Result<File> {
    match r.kind {
        RedirectKind::Input => File::open(&r.target),
        RedirectKind::Output => OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(CREATE_MODE)
            .open(&r.target),
        RedirectKind::Append => OpenOptions::new()
            .append(true)
            .create(true)
            .mode(CREATE_MODE)
            .open(&r.target),
    }
}

// ── Tests ───────────────────────────────────────────────────────────
