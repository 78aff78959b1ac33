//! vsh ベンチマーク: 分割、パーサー、ビルトイン、fork+exec、パイプラインの計測。
//!
//! `std::time::Instant` による手動計測（外部クレート不要）。
//!
//! 実行: `cargo bench`

use std::time::{Duration, Instant};

use vsh::parser::{self, Command, Line};
use vsh::{builtins, executor, tokenizer};

// ── ベンチマークインフラ ──────────────────────────────────────────

struct BenchResult {
    category: &'static str,
    name: &'static str,
    avg: Duration,
    iters: u64,
}

impl BenchResult {
    fn print(&self) {
        let avg_us = self.avg.as_nanos() as f64 / 1000.0;
        println!(
            "[{:<8}] {:<40}: avg {:>10.2}µs  ({} iters)",
            self.category, self.name, avg_us, self.iters,
        );
    }
}

fn bench<F: FnMut()>(category: &'static str, name: &'static str, iters: u64, mut f: F) -> BenchResult {
    // ウォームアップ
    for _ in 0..iters.min(100) {
        f();
    }

    let start = Instant::now();
    for _ in 0..iters {
        f();
    }
    let elapsed = start.elapsed();

    BenchResult {
        category,
        name,
        avg: elapsed / iters as u32,
        iters,
    }
}

fn report(results: &mut Vec<BenchResult>) {
    for r in results.iter() {
        r.print();
    }
    results.clear();
}

// ── メイン ────────────────────────────────────────────────────────

fn main() {
    println!("vsh benchmark suite");
    println!("{}", "=".repeat(80));

    let mut results = Vec::new();

    // ── 分割ベンチマーク ──
    println!("\n--- Tokenizer ---");

    results.push(bench("split", "words: ls -la /tmp /usr /var", 10_000, || {
        let _ = tokenizer::split_words("ls -la /tmp /usr /var", tokenizer::MAX_ARGS);
    }));

    results.push(bench("split", "pipe: a | b | c | d", 10_000, || {
        let _ = tokenizer::split_on("a | b | c | d", '|', tokenizer::MAX_STAGES);
    }));

    report(&mut results);

    // ── パーサーベンチマーク ──
    println!("\n--- Parser ---");

    results.push(bench("parser", "echo hello", 10_000, || {
        let _ = parser::parse("echo hello");
    }));

    results.push(bench("parser", "ls | grep Cargo | head -1", 10_000, || {
        let _ = parser::parse("ls | grep Cargo | head -1");
    }));

    results.push(bench("parser", "cat < in > out", 10_000, || {
        let _ = parser::parse("cat < in > out");
    }));

    results.push(bench("parser", "a && b && c ; d ; e", 10_000, || {
        let _ = parser::parse("a && b && c ; d ; e");
    }));

    report(&mut results);

    // ── ビルトイン判定 ──
    println!("\n--- Builtins ---");

    results.push(bench("builtin", "recognize(\"history 10\")", 10_000, || {
        let _ = builtins::recognize("history 10");
    }));

    results.push(bench("builtin", "recognize(\"ls -la\") (miss)", 10_000, || {
        let _ = builtins::recognize("ls -la");
    }));

    report(&mut results);

    // ── fork + exec ──
    println!("\n--- Spawn (fork + execvp) ---");

    if let Some(cmd) = Command::parse("true") {
        results.push(bench("spawn", "true", 1_000, || {
            let _ = executor::run_simple(&cmd);
        }));
    }

    report(&mut results);

    // ── フルパイプライン (parse → execute) ──
    println!("\n--- Full pipeline (parse + fork + wait) ---");

    results.push(bench("full", "true | true", 1_000, || {
        if let Some(line) = parser::parse("true | true") {
            let _ = executor::run_line(&line);
        }
    }));

    results.push(bench("full", "echo hello > /dev/null", 1_000, || {
        if let Some(line @ Line::Sequence(_)) = parser::parse("echo hello > /dev/null") {
            let _ = executor::run_line(&line);
        }
    }));

    report(&mut results);

    println!("\n{}", "=".repeat(80));
    println!("done.");
}
