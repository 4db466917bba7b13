use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "evidence-ai")]
#[command(about = "I+D証憑の割り当て・内容検証ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// 各コマンド共通のパス指定（未指定なら設定ファイルの値）
#[derive(clap::Args, Debug, Clone, Default)]
pub struct PathArgs {
    /// 元データのワークブック
    #[arg(long)]
    pub workbook: Option<PathBuf>,

    /// シート名
    #[arg(long)]
    pub sheet: Option<String>,

    /// 証憑フォルダ
    #[arg(long)]
    pub evidence_dir: Option<PathBuf>,

    /// 中間テーブル（CSV）
    #[arg(long)]
    pub records: Option<PathBuf>,

    /// 結果テーブル（CSV）
    #[arg(long)]
    pub results: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// ワークブックを読み込み、証憑を割り当てて中間テーブルを出力
    Prepare {
        #[command(flatten)]
        paths: PathArgs,
    },

    /// 中間テーブルの証憑を検証して結果テーブルを出力
    Validate {
        #[command(flatten)]
        paths: PathArgs,

        /// 先頭N件だけ処理
        #[arg(short, long)]
        limit: Option<usize>,

        /// キャッシュを使用（同じ証憑の再問い合わせをスキップ）
        #[arg(long)]
        use_cache: bool,

        /// 結果をExcelにも出力
        #[arg(long)]
        xlsx: Option<PathBuf>,
    },

    /// prepare と validate を続けて実行
    Run {
        #[command(flatten)]
        paths: PathArgs,

        /// 先頭N件だけ処理
        #[arg(short, long)]
        limit: Option<usize>,

        /// キャッシュを使用
        #[arg(long)]
        use_cache: bool,

        /// 結果をExcelにも出力
        #[arg(long)]
        xlsx: Option<PathBuf>,
    },

    /// レビュー用HTTPサーバーを起動
    Serve {
        #[command(flatten)]
        paths: PathArgs,

        /// 待ち受けホスト
        #[arg(long)]
        host: Option<String>,

        /// 待ち受けポート
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// 設定管理
    Config {
        /// APIキーを設定
        #[arg(long)]
        set_api_key: Option<String>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },

    /// キャッシュ管理
    Cache {
        /// 結果テーブル（キャッシュはこの隣に置かれる）
        #[arg(long)]
        results: Option<PathBuf>,

        /// キャッシュ情報を表示
        #[arg(long)]
        info: bool,

        /// キャッシュを削除
        #[arg(long)]
        clear: bool,
    },
}
