//! コマンドライン引数と起動設定。

use std::path::PathBuf;

use clap::Parser;

use crate::history;

/// 起動ファイルの既定名（`$HOME` 直下）。
const RC_FILE: &str = ".vshrc";

#[derive(Debug, Parser)]
#[command(name = "vsh", version, about = "A small interactive command interpreter")]
pub struct Cli {
    /// 1 行だけ実行して終了する。終了コードはその行のステータス
    #[arg(short = 'c', long = "command", value_name = "LINE", help = "Run one line and exit with its status")]
    pub command: Option<String>,

    /// 履歴に保持する最大行数
    #[arg(
        long,
        env = "VSH_HISTORY_SIZE",
        value_name = "N",
        default_value_t = history::DEFAULT_CAPACITY,
        help = "Maximum number of lines kept in history"
    )]
    pub history_size: usize,

    /// 起動ファイル（既定: ~/.vshrc）。端末から対話実行するときだけ読む
    #[arg(long, value_name = "PATH", conflicts_with = "norc", help = "Startup file [default: ~/.vshrc]")]
    pub rcfile: Option<PathBuf>,

    /// 起動ファイルを読まない
    #[arg(long, help = "Do not read a startup file")]
    pub norc: bool,

    /// stdin の代わりにこのファイルから行を読む
    #[arg(value_name = "SCRIPT", conflicts_with = "command", help = "Read lines from this file instead of stdin")]
    pub script: Option<PathBuf>,
}

impl Cli {
    /// 読み込むべき起動ファイルのパス。`--norc` または `$HOME` 未設定なら `None`。
    pub fn rc_path(&self) -> Option<PathBuf> {
        if self.norc {
            return None;
        }
        if let Some(path) = &self.rcfile {
            return Some(path.clone());
        }
        std::env::var_os("HOME").map(|home| PathBuf::from(home).join(RC_FILE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["vsh"]).unwrap();
        assert_eq!(cli.command, None);
        assert_eq!(cli.script, None);
        assert!(!cli.norc);
    }

    #[test]
    fn command_flag() {
        let cli = Cli::try_parse_from(["vsh", "-c", "echo a ; echo b"]).unwrap();
        assert_eq!(cli.command.as_deref(), Some("echo a ; echo b"));
    }

    #[test]
    fn history_size_flag() {
        let cli = Cli::try_parse_from(["vsh", "--history-size", "5"]).unwrap();
        assert_eq!(cli.history_size, 5);
    }

    #[test]
    fn norc_disables_rc() {
        let cli = Cli::try_parse_from(["vsh", "--norc"]).unwrap();
        assert_eq!(cli.rc_path(), None);
    }

    #[test]
    fn explicit_rcfile() {
        let cli = Cli::try_parse_from(["vsh", "--rcfile", "/tmp/rc"]).unwrap();
        assert_eq!(cli.rc_path(), Some(PathBuf::from("/tmp/rc")));
    }

    #[test]
    fn rcfile_conflicts_with_norc() {
        assert!(Cli::try_parse_from(["vsh", "--rcfile", "x", "--norc"]).is_err());
    }

    #[test]
    fn script_conflicts_with_command() {
        assert!(Cli::try_parse_from(["vsh", "-c", "ls", "script.vsh"]).is_err());
    }

    #[test]
    fn script_path() {
        let cli = Cli::try_parse_from(["vsh", "run.vsh"]).unwrap();
        assert_eq!(cli.script, Some(PathBuf::from("run.vsh")));
    }
}
