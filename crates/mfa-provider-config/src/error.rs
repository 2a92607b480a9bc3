use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("MFA_PROVIDER_CONFIG_PATH で指定された設定ファイルが見つかりません: {0}")]
    ConfigFileNotFound(PathBuf),

    #[error(
        "API トークンが設定されていません。MFA_PROVIDER_API_TOKEN 環境変数、\
        または設定ファイルの api_token で指定してください"
    )]
    MissingApiToken,

    #[error("設定値が不正です: {0}")]
    InvalidValue(String),

    #[error("設定ファイルの解析に失敗しました ({path}): {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("HTTP クライアントの初期化に失敗しました: {0}")]
    Client(#[from] mfa_provider_client::ClientError),

    #[error("IO エラー: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
