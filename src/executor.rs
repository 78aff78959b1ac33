//! コマンド実行: パイプライン接続、シーケンス（`;`）、条件付き実行（`&&`）。
//!
//! - [`run_line`]: パース済みの 1 行を実行し、最後に回収した子の終了ステータスを返す
//! - [`run_pipeline`]: 全ステージを fork してからまとめて回収する
//! - [`run_sequence`] / [`run_segment`]: セグメントを左から順に 1 つずつ完了まで実行
//! - 条件付き: 左辺が成功したときだけ残りのシーケンスを再帰的に実行
//!
//! 子プロセス側はいずれも [`launch::child_main`]（リダイレクト → exec）を通る。
//! fork/pipe/wait の失敗は診断を出して失敗ステータスに変換し、インタプリタは継続する。

use std::os::unix::io::RawFd;

use log::{debug, warn};

use crate::launch;
use crate::parser::{Command, Line, Segment};
use crate::process::{self, ChildStatus, Pipe, ProcessError};

/// fork/pipe/wait が失敗したときに返すステータス。
const FAILURE: ChildStatus = ChildStatus::Exited(1);

/// パース済みの 1 行を実行する。
pub fn run_line(line: &Line) -> ChildStatus {
    match line {
        Line::Pipeline(stages) => settle(run_pipeline(stages)),
        Line::Sequence(segments) => run_sequence(segments),
    }
}

/// 親側のエラーを報告し、失敗ステータスに変換する。
fn settle(result: Result<ChildStatus, ProcessError>) -> ChildStatus {
    result.unwrap_or_else(|e| {
        warn!("{}", e);
        eprintln!("vsh: {}", e);
        FAILURE
    })
}

// ── シーケンス / 条件付き ───────────────────────────────────────────

/// セグメントを左から順に実行する。前のセグメントの成否にかかわらず全て実行する。
pub fn run_sequence(segments: &[Segment]) -> ChildStatus {
    let mut status = ChildStatus::SUCCESS;
    for segment in segments {
        status = run_segment(segment);
    }
    status
}

/// 1 セグメントを実行し、完了まで待つ。
pub fn run_segment(segment: &Segment) -> ChildStatus {
    match segment {
        Segment::Simple(cmd) => settle(run_simple(cmd)),
        Segment::Conditional { left, rest } => run_conditional(left.as_ref(), rest.as_deref()),
    }
}

/// `left && rest`。`left` が正常終了かつステータス 0 のときだけ `rest` を実行する。
///
/// `left` がない場合は何もしない。
fn run_conditional(left: Option<&Command>, rest: Option<&[Segment]>) -> ChildStatus {
    let Some(left) = left else {
        debug!("conditional: empty left-hand side, skipping chain");
        return ChildStatus::SUCCESS;
    };

    let status = settle(run_simple(left));
    match rest {
        Some(rest) if status.success() => run_sequence(rest),
        Some(_) => {
            debug!("conditional: `{}` -> {:?}, short-circuit", left.name(), status);
            status
        }
        None => status,
    }
}

/// 単一コマンドを fork して実行し、その子だけを待つ。
pub fn run_simple(cmd: &Command) -> Result<ChildStatus, ProcessError> {
    let pid = process::fork_child(|| launch::child_main(&cmd.args))?;
    process::wait_child(pid)
}

// ── パイプライン ──────────────────────────────────────────────────

/// パイプラインを実行し、最終ステージの終了ステータスを返す。
///
/// 処理の流れ:
/// 1. 「現在の入力元」を stdin で初期化
/// 2. 各ステージ: 最終段以外はパイプを作成 → fork
///    - 子: 入力元を fd 0 に、パイプ書き込み端を fd 1 に付け替えてから [`launch::child_main`]
///    - 親: 使い終わった入力元と書き込み端を close し、入力元を読み取り端に進める
/// 3. 全ステージを終了順に回収
///
/// 途中で pipe/fork が失敗した場合も、既に fork した子は全て回収してからエラーを返す。
pub fn run_pipeline(stages: &[Command]) -> Result<ChildStatus, ProcessError> {
    let n = stages.len();
    let mut pids = Vec::with_capacity(n);
    let mut input: RawFd = libc::STDIN_FILENO;
    let mut failure = None;

    for (i, stage) in stages.iter().enumerate() {
        let pipe = if i + 1 < n {
            match Pipe::new() {
                Ok(p) => Some(p),
                Err(e) => {
                    failure = Some(e);
                    break;
                }
            }
        } else {
            None
        };

        let spawned = process::fork_child(|| {
            if let Err(e) = process::move_fd(input, libc::STDIN_FILENO) {
                eprintln!("vsh: {}: stdin: {}", stage.name(), e);
                return 1;
            }
            if let Some(p) = pipe {
                process::close_fd(p.read);
                if let Err(e) = process::move_fd(p.write, libc::STDOUT_FILENO) {
                    eprintln!("vsh: {}: stdout: {}", stage.name(), e);
                    return 1;
                }
            }
            launch::child_main(&stage.args)
        });

        // 親: このステージに渡した入力元はもう不要
        if input != libc::STDIN_FILENO {
            process::close_fd(input);
            input = libc::STDIN_FILENO;
        }

        match spawned {
            Ok(pid) => {
                debug!("pipeline: stage {} `{}` -> pid {}", i, stage.name(), pid);
                pids.push(pid);
            }
            Err(e) => {
                if let Some(p) = pipe {
                    p.close();
                }
                failure = Some(e);
                break;
            }
        }

        if let Some(p) = pipe {
            process::close_fd(p.write);
            input = p.read;
        }
    }

    if input != libc::STDIN_FILENO {
        process::close_fd(input);
    }

    let reaped = process::wait_all(&pids)?;
    if let Some(e) = failure {
        return Err(e);
    }

    let last = pids.last().copied();
    Ok(reaped
        .iter()
        .find(|&&(pid, _)| Some(pid) == last)
        .map(|&(_, status)| status)
        .unwrap_or(FAILURE))
}

// ── Tests ─────────────────────────────────────────────────────────
//
// fork を伴う経路は tests/ 以下の結合テストで検証する。

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_left_skips_whole_chain() {
        let rest = vec![Segment::Simple(Command::parse("echo X").unwrap())];
        assert_eq!(run_conditional(None, Some(rest.as_slice())), ChildStatus::SUCCESS);
    }

    #[test]
    fn empty_sequence_is_success() {
        assert_eq!(run_sequence(&[]), ChildStatus::SUCCESS);
    }

    #[test]
    fn settle_converts_errors() {
        let err = ProcessError::Fork(std::io::Error::from_raw_os_error(libc::EAGAIN));
        assert_eq!(settle(Err(err)), FAILURE);
        assert_eq!(settle(Ok(ChildStatus::Exited(3))), ChildStatus::Exited(3));
    }
}
