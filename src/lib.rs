//! vsh ライブラリ — 結合テスト・ベンチマーク用にモジュールを公開する。
//!
//! バイナリ本体は `main.rs` の REPL ループ。
//! この `lib.rs` は `tests/` や `benches/bench_main.rs` から
//! パーサー・実行部・履歴に直接アクセスするために存在する。
//!
//! ## モジュール構成
//!
//! | モジュール | 役割 |
//! |-----------|------|
//! | [`tokenizer`] | 区切り文字による非破壊分割（上限付き） |
//! | [`parser`] | 実行ツリー構築（パイプライン `|`、シーケンス `;`、条件付き `&&`） |
//! | [`redirect`] | リダイレクト解決（`<`, `>`, `>>` の除去と fd 付け替え） |
//! | [`launch`] | `execvp` ラッパー（子プロセスの本体） |
//! | [`process`] | fork / wait / パイプの低レベルヘルパー |
//! | [`executor`] | パイプライン接続、シーケンス・条件付き実行 |
//! | [`signal`] | SIGINT ハンドラ（フラグのみ） |
//! | [`input`] | プロンプト表示と 1 行読み取り |
//! | [`history`] | 上限付き追記専用のコマンド履歴 |
//! | [`builtins`] | ビルトイン（`exit`, `history`） |
//! | [`shell`] | セッション状態と 1 行のディスパッチ |
//! | [`cli`] | コマンドライン引数 |

pub mod builtins;
pub mod cli;
pub mod executor;
pub mod history;
pub mod input;
pub mod launch;
pub mod parser;
pub mod process;
pub mod redirect;
pub mod shell;
pub mod signal;
pub mod tokenizer;
