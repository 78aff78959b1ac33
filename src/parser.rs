//! パーサー: 入力行から実行ツリー（[`Line`]）を構築する。
//!
//! トークナイザ（[`crate::tokenizer`]）の非破壊スライスを組み合わせ、
//! 文字列の再分割ではなく構造で表現した木を返す。
//!
//! ## 認識順序
//!
//! 1. 行に `|` が含まれる → 行全体を [`Line::Pipeline`] とする。
//!    ステージ内の `;` / `&&` は区切りとして扱わず、ただの引数トークンになる。
//! 2. それ以外 → `;` で [`Segment`] に分割した [`Line::Sequence`]。
//! 3. 各セグメント内の最初の `&&` で [`Segment::Conditional`] に分割し、
//!    残りは再帰的に [`Sequence`] としてパースする（`a && b && c` が連鎖になる）。
//!
//! リダイレクト演算子（`<`, `>`, `>>`）はここでは解釈せず、
//! 引数トークンのまま子プロセス側の [`crate::redirect`] に渡す。

use crate::tokenizer::{self, MAX_ARGS, MAX_STAGES};

// ── AST ─────────────────────────────────────────────────────────────

/// 単一コマンド。`args[0]` がプログラム名、残りが引数（リダイレクト演算子を含みうる）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub args: Vec<String>,
}

impl Command {
    /// 空白で分割してコマンドを作る。トークンがなければ `None`。
    pub fn parse(text: &str) -> Option<Self> {
        let words = tokenizer::split_words(text, MAX_ARGS);
        if words.is_empty() {
            return None;
        }
        Some(Self {
            args: words.into_iter().map(str::to_owned).collect(),
        })
    }

    /// プログラム名（`args[0]`）。
    pub fn name(&self) -> &str {
        &self.args[0]
    }
}

/// `;` で区切られたセグメント列。左から順に、1 つずつ完了まで実行される。
pub type Sequence = Vec<Segment>;

/// シーケンス内の 1 要素。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// 演算子を含まない単一コマンド。
    Simple(Command),
    /// `left && rest`。`left` が終了ステータス 0 の場合のみ `rest` を実行する。
    ///
    /// `left` が `None`（`&&` の左が空）の場合、チェーン全体が何もしない。
    Conditional {
        left: Option<Command>,
        rest: Option<Sequence>,
    },
}

/// 1 行分の実行単位。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    /// `cmd1 | cmd2 | ...`（1 ステージ以上）。
    Pipeline(Vec<Command>),
    /// `seg1 ; seg2 ; ...`。
    Sequence(Sequence),
}

// ── Parser ──────────────────────────────────────────────────────────

/// 入力行をパースする。実行すべきものがなければ `None`。
pub fn parse(line: &str) -> Option<Line> {
    if line.contains('|') {
        let stages: Vec<Command> = tokenizer::split_on(line, '|', MAX_STAGES)
            .into_iter()
            .filter_map(Command::parse)
            .collect();
        if stages.is_empty() {
            return None;
        }
        return Some(Line::Pipeline(stages));
    }
    parse_sequence(line).map(Line::Sequence)
}

/// `;` で分割したシーケンスをパースする。空セグメント（`;;` や末尾 `;`）は捨てる。
fn parse_sequence(text: &str) -> Option<Sequence> {
    let segments: Sequence = tokenizer::split_on(text, ';', usize::MAX)
        .into_iter()
        .filter_map(parse_segment)
        .collect();
    if segments.is_empty() {
        None
    } else {
        Some(segments)
    }
}

/// セグメントを最初の `&&` で分割する。`&&` がなければ単一コマンド。
fn parse_segment(text: &str) -> Option<Segment> {
    match text.split_once("&&") {
        Some((left, rest)) => Some(Segment::Conditional {
            left: Command::parse(left),
            rest: parse_sequence(rest),
        }),
        None => Command::parse(text).map(Segment::Simple),
    }
}

// ── Tests ───────────────────────────────────────────────────────────
