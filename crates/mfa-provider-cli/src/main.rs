mod commands;
mod offline;
mod output;

use clap::{Parser, Subcommand};
use commands::Session;
use mfa_provider::MfaProvider;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mfa-provider")]
#[command(about = "MFA ポリシーと認証設定をコードで管理する", long_about = None)]
struct Cli {
    /// デバッグログを出力する (RUST_LOG より優先)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 対応しているリソースとデータソースの一覧
    Resources,
    /// リソースまたはデータソースのスキーマを JSON で表示
    Schema {
        /// 型名 (mfa_policy, mfa_device_policies など)
        type_name: String,
        /// 同名のリソースがあってもデータソースとして扱う
        #[arg(long)]
        data_source: bool,
    },
    /// 設定ファイル (JSON) を検証
    Validate {
        /// 型名
        type_name: String,
        /// 設定ファイル (JSON)
        config: PathBuf,
        /// 同名のリソースがあってもデータソースとして扱う
        #[arg(long)]
        data_source: bool,
    },
    /// 変更計画を表示 (API は呼ばない)
    Plan {
        /// リソース型
        type_name: String,
        /// 設定ファイル (JSON)
        config: PathBuf,
        /// 現在の状態ファイル
        #[arg(short, long)]
        state: Option<PathBuf>,
    },
    /// 計画どおりに作成・更新し、状態ファイルを書き出す
    Apply {
        /// リソース型
        type_name: String,
        /// 設定ファイル (JSON)
        config: PathBuf,
        /// 状態ファイル (無ければ新規作成)
        #[arg(short, long)]
        state: PathBuf,
    },
    /// リモートの状態を読み直して状態ファイルを更新
    Refresh {
        /// 状態ファイル
        state: PathBuf,
    },
    /// 状態ファイルのリソースを削除
    Destroy {
        /// 状態ファイル
        state: PathBuf,
    },
    /// 既存のリソースを取り込む
    Import {
        /// リソース型
        type_name: String,
        /// インポート ID (例: environmentID/mfaPolicyID)
        id: String,
        /// 書き出す状態ファイル (省略時は標準出力)
        #[arg(short, long)]
        state: Option<PathBuf>,
    },
    /// 状態ファイルを現在のスキーマバージョンへ移行
    UpgradeState {
        /// 状態ファイル
        state: PathBuf,
    },
    /// データソースを照会
    Query {
        /// データソース名 (mfa_device_policies, mfa_policies)
        data_source: String,
        /// 環境 ID
        environment_id: String,
    },
    /// バージョン情報を表示
    Version,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    // 標準出力は状態ファイルや JSON の出力に使うので、ログは stderr へ
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // スキーマだけで完結するコマンドは設定ファイルも API トークンも不要
    let offline = MfaProvider::new(Arc::new(offline::OfflineApi));

    match cli.command {
        Commands::Version => {
            println!("mfa-provider {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::Resources => commands::catalog::resources(&offline),
        Commands::Schema {
            type_name,
            data_source,
        } => commands::catalog::schema(&offline, &type_name, data_source),
        Commands::Validate {
            type_name,
            config,
            data_source,
        } => commands::validate::handle(&offline, &type_name, &config, data_source),
        Commands::Plan {
            type_name,
            config,
            state,
        } => commands::plan::handle(&offline, &type_name, &config, state.as_deref()),
        Commands::UpgradeState { state } => commands::state::upgrade(&offline, &state),
        Commands::Apply {
            type_name,
            config,
            state,
        } => {
            let session = Session::connect()?;
            commands::apply::handle(&session, &type_name, &config, &state).await
        }
        Commands::Refresh { state } => {
            let session = Session::connect()?;
            commands::state::refresh(&session, &state).await
        }
        Commands::Destroy { state } => {
            let session = Session::connect()?;
            commands::state::destroy(&session, &state).await
        }
        Commands::Import {
            type_name,
            id,
            state,
        } => {
            let session = Session::connect()?;
            commands::state::import(&session, &type_name, &id, state.as_deref()).await
        }
        Commands::Query {
            data_source,
            environment_id,
        } => {
            let session = Session::connect()?;
            commands::query::handle(&session, &data_source, &environment_id).await
        }
    }
}
