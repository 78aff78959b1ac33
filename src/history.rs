//! コマンド履歴の管理。
//!
//! 受理した入力行を追加順に保持する。上限（[`History::capacity`]）に達した後の行は
//! 記録されないだけで、エラーにはならない。一度追加したエントリは変更しない。
//!
//! `history` ビルトイン自身の行は呼び出し側（[`crate::shell::Shell::dispatch`]）で除外される。

use log::debug;

/// 既定の最大エントリ数。
pub const DEFAULT_CAPACITY: usize = 100;

/// 上限付きの追記専用コマンド履歴。
#[derive(Debug)]
pub struct History {
    /// 履歴エントリのリスト（古い順）。
    entries: Vec<String>,
    /// 保持する最大エントリ数。
    capacity: usize,
}

impl History {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            capacity,
        }
    }

    /// エントリを入力どおりに追加する。空行、または上限到達時は追加せず `false` を返す。
    pub fn push(&mut self, line: &str) -> bool {
        if line.trim().is_empty() {
            return false;
        }
        if self.entries.len() >= self.capacity {
            debug!("history: full ({}), not recording", self.capacity);
            return false;
        }
        self.entries.push(line.to_string());
        true
    }

    /// 全エントリ（古い順）。
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_keeps_insertion_order() {
        let mut h = History::new();
        assert!(h.push("echo a"));
        assert!(h.push("ls -l"));
        assert_eq!(h.entries(), ["echo a", "ls -l"]);
    }

    #[test]
    fn push_skips_blank_lines() {
        let mut h = History::new();
        assert!(!h.push(""));
        assert!(!h.push("   "));
        assert!(h.is_empty());
    }

    #[test]
    fn duplicates_are_recorded() {
        let mut h = History::new();
        h.push("pwd");
        h.push("pwd");
        assert_eq!(h.len(), 2);
    }

    #[test]
    fn lines_beyond_capacity_are_dropped() {
        let mut h = History::with_capacity(2);
        assert!(h.push("a"));
        assert!(h.push("b"));
        assert!(!h.push("c"));
        assert_eq!(h.entries(), ["a", "b"]);
        assert_eq!(h.capacity(), 2);
    }

    #[test]
    fn entries_keep_raw_text() {
        let mut h = History::new();
        assert!(h.push("  echo   a  "));
        assert_eq!(h.entries(), ["  echo   a  "]);
    }
}
