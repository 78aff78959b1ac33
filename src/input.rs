//! 入力読み取り: プロンプトを出し、1 行を読む。
//!
//! `libc::read` で 1 バイトずつ読む。行の先まで読み込まないので、
//! stdin を継承した子プロセス（`cat` など）は残りの入力をそのまま受け取れる。
//!
//! 読み取り中に SIGINT を受けると `read(2)` が `EINTR` で戻る。
//! フラグ（[`crate::signal::take_interrupt`]）が立っていれば途中までの入力を捨て、
//! [`ReadEvent::Interrupted`] を返して呼び出し側にプロンプトを出し直させる。

use std::fs::File;
use std::io::{self, Write};
use std::os::unix::io::{AsRawFd, RawFd};
use std::path::Path;

use log::warn;

use crate::signal;

/// [`LineReader::read_line`] の結果。
#[derive(Debug, PartialEq, Eq)]
pub enum ReadEvent {
    /// 1 行（改行を除く）。
    Line(String),
    /// 入力中に Ctrl+C を受けた。
    Interrupted,
    /// 入力終端（Ctrl+D / ファイル末尾）。
    Eof,
}

/// 行単位の入力ソース。stdin またはスクリプトファイル。
pub struct LineReader {
    fd: RawFd,
    /// スクリプトファイルを開いた場合の所有権。Drop で close される。
    _file: Option<File>,
    /// 端末入力のときだけプロンプトを表示する。
    interactive: bool,
}

impl LineReader {
    /// 標準入力から読む。端末ならインタラクティブ。
    pub fn stdin() -> Self {
        let fd = libc::STDIN_FILENO;
        Self {
            fd,
            _file: None,
            interactive: unsafe { libc::isatty(fd) } == 1,
        }
    }

    /// スクリプトファイルから読む。プロンプトは出さない。
    pub fn open(path: &Path) -> io::Result<Self> {
        File::open(path).map(Self::from_file)
    }

    pub fn from_file(file: File) -> Self {
        Self {
            fd: file.as_raw_fd(),
            _file: Some(file),
            interactive: false,
        }
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    /// プロンプトを表示し、1 行読み取る。
    pub fn read_line(&mut self, prompt: &str) -> ReadEvent {
        if self.interactive {
            let _ = io::stdout().flush();
            write_all(prompt);
        }

        let mut buf = Vec::new();
        loop {
            match read_byte(self.fd) {
                Ok(Some(b'\n')) => return ReadEvent::Line(String::from_utf8_lossy(&buf).into_owned()),
                Ok(Some(b)) => buf.push(b),
                Ok(None) if buf.is_empty() => return ReadEvent::Eof,
                Ok(None) => return ReadEvent::Line(String::from_utf8_lossy(&buf).into_owned()),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {
                    if signal::take_interrupt() {
                        if self.interactive {
                            write_all("\n");
                        }
                        return ReadEvent::Interrupted;
                    }
                }
                Err(e) => {
                    warn!("read: {}", e);
                    return ReadEvent::Eof;
                }
            }
        }
    }
}

/// `libc::read` で 1 バイト読み取る。EOF なら `Ok(None)`。
fn read_byte(fd: RawFd) -> io::Result<Option<u8>> {
    let mut buf = [0u8; 1];
    let n = unsafe { libc::read(fd, buf.as_mut_ptr() as *mut libc::c_void, 1) };
    match n {
        1 => Ok(Some(buf[0])),
        0 => Ok(None),
        _ => Err(io::Error::last_os_error()),
    }
}

/// libc::write で直接出力する（Rust の stdout バッファをバイパス）。
pub fn write_all(s: &str) {
    let bytes = s.as_bytes();
    let mut written = 0;
    while written < bytes.len() {
        let n = unsafe {
            libc::write(
                libc::STDOUT_FILENO,
                bytes[written..].as_ptr() as *const libc::c_void,
                bytes.len() - written,
            )
        };
        if n <= 0 {
            break;
        }
        written += n as usize;
    }
}

// ── Tests ─────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Seek;

    fn reader_over(content: &str) -> LineReader {
        let mut file = tempfile::tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.rewind().unwrap();
        LineReader::from_file(file)
    }

    #[test]
    fn reads_lines_then_eof() {
        let mut r = reader_over("echo a\necho b\n");
        assert_eq!(r.read_line(""), ReadEvent::Line("echo a".into()));
        assert_eq!(r.read_line(""), ReadEvent::Line("echo b".into()));
        assert_eq!(r.read_line(""), ReadEvent::Eof);
    }

    #[test]
    fn last_line_without_newline() {
        let mut r = reader_over("ls\npwd");
        assert_eq!(r.read_line(""), ReadEvent::Line("ls".into()));
        assert_eq!(r.read_line(""), ReadEvent::Line("pwd".into()));
        assert_eq!(r.read_line(""), ReadEvent::Eof);
    }

    #[test]
    fn empty_lines_are_returned() {
        let mut r = reader_over("\n\nx\n");
        assert_eq!(r.read_line(""), ReadEvent::Line(String::new()));
        assert_eq!(r.read_line(""), ReadEvent::Line(String::new()));
        assert_eq!(r.read_line(""), ReadEvent::Line("x".into()));
    }

    #[test]
    fn file_reader_is_not_interactive() {
        assert!(!reader_over("").is_interactive());
    }
}
