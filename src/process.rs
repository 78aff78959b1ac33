//! 子プロセスの生成と回収。
//!
//! fork した子は必ずちょうど 1 回 wait する。[`wait_child`] は特定の 1 つを、
//! [`wait_all`] はパイプラインの全ステージを終了順に回収する。
//! どちらも `EINTR`（インタプリタ自身への SIGINT）で中断されたら待機をやり直す。
//!
//! パイプの fd は close-on-exec 付きで作るため、exec 後のプログラムに
//! 意図しない fd が漏れることはない（`dup2` した fd 0/1 は対象外）。

use std::io::{self, Write};
use std::os::unix::io::RawFd;

use libc::pid_t;
use log::{debug, warn};
use thiserror::Error;

// ── 終了ステータス ──────────────────────────────────────────────────

/// 回収した子プロセスの終了状態。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildStatus {
    /// 正常終了。引数は終了コード。
    Exited(i32),
    /// シグナルで終了。引数はシグナル番号。
    Signaled(i32),
}

impl ChildStatus {
    pub const SUCCESS: Self = Self::Exited(0);

    /// `waitpid` が返した raw status を解釈する。
    pub fn from_raw(raw: i32) -> Self {
        if libc::WIFEXITED(raw) {
            Self::Exited(libc::WEXITSTATUS(raw))
        } else if libc::WIFSIGNALED(raw) {
            Self::Signaled(libc::WTERMSIG(raw))
        } else {
            Self::Exited(1)
        }
    }

    /// 正常終了かつ終了コード 0 のときだけ `true`。`&&` の判定に使う。
    pub fn success(self) -> bool {
        self == Self::SUCCESS
    }

    /// シェル慣習の数値ステータス。シグナル終了は `128 + signo`。
    pub fn code(self) -> i32 {
        match self {
            Self::Exited(code) => code,
            Self::Signaled(sig) => 128 + sig,
        }
    }
}

// ── エラー型 ──────────────────────────────────────────────────────

/// 親プロセス側のシステムコール失敗。
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("fork: {0}")]
    Fork(#[source] io::Error),
    #[error("pipe: {0}")]
    Pipe(#[source] io::Error),
    #[error("wait: {0}")]
    Wait(#[source] io::Error),
}

// ── fork ──────────────────────────────────────────────────────────

/// 子プロセスを fork し、子の中で `child` を実行してその戻り値で `_exit` する。
///
/// 親には子の PID を返す。fork 前に Rust の stdout バッファを flush し、
/// 同じ出力が親子で二重に書かれないようにする。
pub fn fork_child<F>(child: F) -> Result<pid_t, ProcessError>
where
    F: FnOnce() -> i32,
{
    let _ = io::stdout().flush();
    let _ = io::stderr().flush();

    let pid = unsafe { libc::fork() };
    match pid {
        -1 => Err(ProcessError::Fork(io::Error::last_os_error())),
        0 => exit_child(child()),
        pid => {
            debug!("fork: child {}", pid);
            Ok(pid)
        }
    }
}

/// 子プロセスを終了する。atexit ハンドラや親から継承したバッファを実行しないよう `_exit` を使う。
pub fn exit_child(status: i32) -> ! {
    let _ = io::stdout().flush();
    unsafe { libc::_exit(status) }
}

// ── wait ──────────────────────────────────────────────────────────

/// 指定した子プロセスの終了を待つ。`EINTR` なら待ち直す。
pub fn wait_child(pid: pid_t) -> Result<ChildStatus, ProcessError> {
    loop {
        let mut raw: i32 = 0;
        let ret = unsafe { libc::waitpid(pid, &mut raw, 0) };
        if ret == pid {
            let status = ChildStatus::from_raw(raw);
            debug!("wait: child {} -> {:?}", pid, status);
            return Ok(status);
        }
        let err = io::Error::last_os_error();
        if err.kind() == io::ErrorKind::Interrupted {
            continue;
        }
        return Err(ProcessError::Wait(err));
    }
}

/// `pids` の全ての子を終了順に回収し、`(pid, status)` を回収順に返す。
///
/// 各 PID はちょうど 1 回だけ回収される。集合外の子が回収された場合は記録だけして捨てる。
pub fn wait_all(pids: &[pid_t]) -> Result<Vec<(pid_t, ChildStatus)>, ProcessError> {
    let mut pending = pids.to_vec();
    let mut reaped = Vec::with_capacity(pids.len());

    while !pending.is_empty() {
        let mut raw: i32 = 0;
        let pid = unsafe { libc::waitpid(-1, &mut raw, 0) };
        if pid < 0 {
            let err = io::Error::last_os_error();
            match err.raw_os_error() {
                Some(libc::EINTR) => continue,
                Some(libc::ECHILD) => {
                    warn!("wait: {} child(ren) vanished before reaping", pending.len());
                    break;
                }
                _ => return Err(ProcessError::Wait(err)),
            }
        }

        match pending.iter().position(|&p| p == pid) {
            Some(i) => {
                pending.swap_remove(i);
                let status = ChildStatus::from_raw(raw);
                debug!("wait: child {} -> {:?}", pid, status);
                reaped.push((pid, status));
            }
            None => debug!("wait: reaped unrelated child {}", pid),
        }
    }

    Ok(reaped)
}

// ── fd ヘルパー ────────────────────────────────────────────────────

/// 無名パイプの両端。どちらも close-on-exec。
#[derive(Debug, Clone, Copy)]
pub struct Pipe {
    pub read: RawFd,
    pub write: RawFd,
}

impl Pipe {
    pub fn new() -> Result<Self, ProcessError> {
        let mut fds = [-1i32; 2];
        if unsafe { libc::pipe2(fds.as_mut_ptr(), libc::O_CLOEXEC) } != 0 {
            return Err(ProcessError::Pipe(io::Error::last_os_error()));
        }
        debug!("pipe: read={} write={}", fds[0], fds[1]);
        Ok(Self {
            read: fds[0],
            write: fds[1],
        })
    }

    /// 両端を close する。
    pub fn close(self) {
        close_fd(self.read);
        close_fd(self.write);
    }
}

/// fd を close する。負の fd は無視。
pub fn close_fd(fd: RawFd) {
    if fd >= 0 {
        unsafe {
            libc::close(fd);
        }
    }
}

/// `fd` を `target` に複製し、元の `fd` を close する。`fd == target` なら何もしない。
pub fn move_fd(fd: RawFd, target: RawFd) -> io::Result<()> {
    if fd == target {
        return Ok(());
    }
    if unsafe { libc::dup2(fd, target) } < 0 {
        return Err(io::Error::last_os_error());
    }
    close_fd(fd);
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────
//
// fork を伴うテストは並列実行中の他テストの子まで回収しうるため、
// tests/ 以下の結合テストに置く。

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_success() {
        assert!(ChildStatus::Exited(0).success());
        assert!(!ChildStatus::Exited(1).success());
        assert!(!ChildStatus::Signaled(libc::SIGINT).success());
    }

    #[test]
    fn status_code() {
        assert_eq!(ChildStatus::Exited(3).code(), 3);
        assert_eq!(ChildStatus::Signaled(libc::SIGINT).code(), 128 + libc::SIGINT);
    }

    #[test]
    fn wait_all_empty_set_returns_immediately() {
        assert!(wait_all(&[]).unwrap().is_empty());
    }

    #[test]
    fn pipe_is_cloexec_and_connected() {
        let pipe = Pipe::new().unwrap();
        for fd in [pipe.read, pipe.write] {
            let flags = unsafe { libc::fcntl(fd, libc::F_GETFD) };
            assert_ne!(flags & libc::FD_CLOEXEC, 0);
        }

        let msg = b"hi";
        let n = unsafe { libc::write(pipe.write, msg.as_ptr() as *const libc::c_void, msg.len()) };
        assert_eq!(n, 2);
        close_fd(pipe.write);

        let mut buf = [0u8; 8];
        let n = unsafe { libc::read(pipe.read, buf.as_mut_ptr() as *mut libc::c_void, buf.len()) };
        assert_eq!(&buf[..n as usize], b"hi");
        // 書き込み端を閉じたので EOF
        let n = unsafe { libc::read(pipe.read, buf.as_mut_ptr() as *mut libc::c_void, buf.len()) };
        assert_eq!(n, 0);
        close_fd(pipe.read);
    }

    #[test]
    fn move_fd_same_target_is_noop() {
        let pipe = Pipe::new().unwrap();
        move_fd(pipe.read, pipe.read).unwrap();
        let flags = unsafe { libc::fcntl(pipe.read, libc::F_GETFD) };
        assert!(flags >= 0);
        pipe.close();
    }
}
