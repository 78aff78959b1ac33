//! vsh — 小さな対話型コマンドインタプリタ
//!
//! REPLループ: プロンプト表示 → 1 行読み取り → ビルトイン判定 → パース → 実行 → ループ
//!
//! モジュール構成は `lib.rs` を参照。

use std::path::Path;

use clap::Parser;
use log::{debug, warn};

use vsh::cli::Cli;
use vsh::input::{self, LineReader, ReadEvent};
use vsh::shell::Shell;
use vsh::signal;

/// 起動ファイルを読み込んで各行を実行する。ファイルが存在しなければサイレントスキップ。
fn load_rc(shell: &mut Shell, path: &Path) {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            debug!("rc: {}: {}", path.display(), e);
            return;
        }
    };
    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        shell.dispatch(trimmed, false);
        if shell.should_exit {
            break;
        }
    }
}

fn init_logger() {
    env_logger::Builder::from_env(env_logger::Env::new().filter_or("VSH_LOG", "warn"))
        .format_timestamp(None)
        .init();
}

fn main() {
    init_logger();
    let cli = Cli::parse();

    // シェル自体は Ctrl+C で終了しない。ハンドラはフラグを立てるだけ。
    if let Err(e) = signal::install() {
        warn!("cannot install SIGINT handler: {}", e);
    }

    let mut shell = Shell::new(cli.history_size);

    if let Some(line) = &cli.command {
        let status = shell.dispatch(line, true);
        std::process::exit(status);
    }

    let mut reader = match &cli.script {
        Some(path) => match LineReader::open(path) {
            Ok(r) => r,
            Err(e) => {
                eprintln!("vsh: {}: {}", path.display(), e);
                std::process::exit(127);
            }
        },
        None => LineReader::stdin(),
    };

    if reader.is_interactive() {
        if let Some(rc) = cli.rc_path() {
            load_rc(&mut shell, &rc);
        }
    }

    while !shell.should_exit {
        match reader.read_line(&shell.prompt()) {
            ReadEvent::Line(line) => {
                shell.dispatch(&line, true);
            }
            // Ctrl+C: 入力を捨ててプロンプトを出し直す
            ReadEvent::Interrupted => continue,
            ReadEvent::Eof => {
                if reader.is_interactive() {
                    input::write_all("\n");
                }
                break;
            }
        }
    }

    // `exit N` ならその値、入力終端なら成功で終了する
    let status = if shell.should_exit { shell.last_status } else { 0 };
    std::process::exit(status);
}
