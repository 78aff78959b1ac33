//! SIGINT の扱い。
//!
//! ハンドラはフラグを立てるだけで、出力もバッファ操作も行わない。
//! `SA_RESTART` を付けないため、入力待ちの `read(2)` は `EINTR` で戻り、
//! [`crate::input`] がフラグを消費してプロンプトを出し直す。
//!
//! 子プロセスはインタプリタと同じプロセスグループで動くので、端末の Ctrl+C は
//! フォアグラウンドの子にも直接届く。子側は [`reset_in_child`] でデフォルト動作に戻す。

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};

static INTERRUPTED: AtomicBool = AtomicBool::new(false);

extern "C" fn on_sigint(_sig: libc::c_int) {
    INTERRUPTED.store(true, Ordering::SeqCst);
}

/// SIGINT ハンドラを登録する。
pub fn install() -> io::Result<()> {
    unsafe {
        let mut action: libc::sigaction = std::mem::zeroed();
        action.sa_sigaction = on_sigint as extern "C" fn(libc::c_int) as libc::sighandler_t;
        libc::sigemptyset(&mut action.sa_mask);
        action.sa_flags = 0;
        if libc::sigaction(libc::SIGINT, &action, std::ptr::null_mut()) != 0 {
            return Err(io::Error::last_os_error());
        }
    }
    Ok(())
}

/// 割り込みフラグを取り出してクリアする。
pub fn take_interrupt() -> bool {
    INTERRUPTED.swap(false, Ordering::SeqCst)
}

/// fork 直後の子で SIGINT を `SIG_DFL` に戻す。
pub fn reset_in_child() {
    unsafe {
        libc::signal(libc::SIGINT, libc::SIG_DFL);
    }
}
