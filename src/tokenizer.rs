//! トークナイザ: 入力行を区切り文字で分割し、スライス列を返す。
//!
//! 入力バッファは一切書き換えない。返すのは元の行への `&str` ビューなので、
//! 同じ行をパイプライン判定・`;` 分割・`&&` 分割の各段で何度でも参照できる。
//!
//! ## 制限
//!
//! - クォート・エスケープは扱わない。区切り文字は常に分割点になる。
//! - 上限（[`MAX_ARGS`] / [`MAX_STAGES`]）を超えた要素は黙って捨てる（エラーにしない）。

use log::debug;

/// 1 コマンドあたりの最大トークン数。
pub const MAX_ARGS: usize = 64;

/// 1 パイプラインあたりの最大ステージ数。
pub const MAX_STAGES: usize = 16;

/// `delim` の連続で区切られた空でない部分文字列を、最大 `limit` 個返す。
///
/// 連続した区切り文字は 1 つとして扱う（`"a||b"` を `'|'` で分割すると `["a", "b"]`）。
pub fn split_on(line: &str, delim: char, limit: usize) -> Vec<&str> {
    collect_bounded(line.split(delim).filter(|s| !s.is_empty()), limit)
}

/// ASCII 空白（スペース・タブ・CR・LF）の連続で分割し、最大 `limit` 個返す。
pub fn split_words(line: &str, limit: usize) -> Vec<&str> {
    collect_bounded(line.split_ascii_whitespace(), limit)
}

fn collect_bounded<'a>(pieces: impl Iterator<Item = &'a str>, limit: usize) -> Vec<&'a str> {
    let mut out = Vec::new();
    let mut dropped = 0usize;
    for piece in pieces {
        if out.len() < limit {
            out.push(piece);
        } else {
            dropped += 1;
        }
    }
    if dropped > 0 {
        debug!("tokenizer: dropped {} piece(s) beyond limit {}", dropped, limit);
    }
    out
}

// ── Tests ───────────────────────────────────────────────────────────
