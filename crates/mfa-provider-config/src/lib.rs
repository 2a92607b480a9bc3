pub mod error;

pub use error::*;

use mfa_provider_client::{ClientConfig, DEFAULT_API_URL_TEMPLATE, DEFAULT_REGION_SUFFIX};
use mfa_provider_core::{RequestContext, RetryConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

pub const CONFIG_PATH_ENV: &str = "MFA_PROVIDER_CONFIG_PATH";
pub const API_TOKEN_ENV: &str = "MFA_PROVIDER_API_TOKEN";
pub const REGION_SUFFIX_ENV: &str = "MFA_PROVIDER_REGION_SUFFIX";
pub const API_URL_ENV: &str = "MFA_PROVIDER_API_URL";

const LOCAL_CONFIG_FILE: &str = "mfa-provider.yaml";

/// プロバイダー設定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// リージョンの URL サフィックス (com, eu, ca, asia ...)
    pub region_suffix: String,

    /// API ベース URL のテンプレート。`{suffix}` がリージョンに置き換わる
    pub api_url_template: String,

    /// Bearer トークン
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,

    /// 1 リクエストあたりのタイムアウト (秒)
    pub request_timeout_secs: u64,

    pub retry: RetrySettings,
}

/// リトライ設定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    /// 操作全体のタイムアウト (秒、リトライ込み)
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            region_suffix: DEFAULT_REGION_SUFFIX.to_string(),
            api_url_template: DEFAULT_API_URL_TEMPLATE.to_string(),
            api_token: None,
            request_timeout_secs: 30,
            retry: RetrySettings::default(),
        }
    }
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            initial_delay_ms: 500,
            max_delay_ms: 30_000,
            timeout_secs: 600,
        }
    }
}

impl ProviderConfig {
    /// YAML ファイルから読み込む。省略された項目はデフォルト値
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// 環境変数で上書きする
    pub fn apply_env(&mut self) {
        if let Some(token) = non_empty_env(API_TOKEN_ENV) {
            self.api_token = Some(token);
        }
        if let Some(suffix) = non_empty_env(REGION_SUFFIX_ENV) {
            self.region_suffix = suffix;
        }
        if let Some(url) = non_empty_env(API_URL_ENV) {
            self.api_url_template = url;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.region_suffix.is_empty() {
            return Err(ConfigError::InvalidValue(
                "region_suffix が空です".to_string(),
            ));
        }
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::InvalidValue(
                "retry.max_attempts は 1 以上を指定してください".to_string(),
            ));
        }
        if self.retry.initial_delay_ms > self.retry.max_delay_ms {
            return Err(ConfigError::InvalidValue(
                "retry.initial_delay_ms が retry.max_delay_ms を超えています".to_string(),
            ));
        }
        Ok(())
    }

    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig {
            max_attempts: self.retry.max_attempts,
            initial_delay: Duration::from_millis(self.retry.initial_delay_ms),
            max_delay: Duration::from_millis(self.retry.max_delay_ms),
            timeout: Duration::from_secs(self.retry.timeout_secs),
            ..RetryConfig::default()
        }
    }

    /// HTTP クライアント設定。API トークンが必須
    pub fn client_config(&self) -> Result<ClientConfig> {
        let token = self
            .api_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or(ConfigError::MissingApiToken)?;

        Ok(ClientConfig::new(token)
            .with_api_url_template(self.api_url_template.clone())
            .with_region_suffix(self.region_suffix.clone())
            .with_request_timeout(Duration::from_secs(self.request_timeout_secs)))
    }

    /// この設定のリージョンとリトライ方針を持つリクエストコンテキスト
    pub fn request_context(&self) -> RequestContext {
        RequestContext::new()
            .with_retry(self.retry_config())
            .with_region_suffix(self.region_suffix.clone())
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

/// 設定ファイルを探す
///
/// 以下の優先順位で検索:
/// 1. 環境変数 MFA_PROVIDER_CONFIG_PATH (直接パス指定、存在しなければエラー)
/// 2. カレントディレクトリ: mfa-provider.yaml
/// 3. ~/.config/mfa-provider/config.yaml (グローバル設定)
///
/// どれも無ければ `None`
pub fn find_config_file() -> Result<Option<PathBuf>> {
    // 1. 環境変数で直接指定
    if let Some(config_path) = non_empty_env(CONFIG_PATH_ENV) {
        let path = PathBuf::from(config_path);
        if path.exists() {
            return Ok(Some(path));
        }
        return Err(ConfigError::ConfigFileNotFound(path));
    }

    // 2. カレントディレクトリ
    let local = std::env::current_dir()?.join(LOCAL_CONFIG_FILE);
    if local.exists() {
        return Ok(Some(local));
    }

    // 3. グローバル設定
    if let Some(config_dir) = dirs::config_dir() {
        let global = config_dir.join("mfa-provider").join("config.yaml");
        if global.exists() {
            return Ok(Some(global));
        }
    }

    Ok(None)
}

/// デフォルト → 設定ファイル → 環境変数 の順に重ねて読み込む
pub fn load() -> Result<ProviderConfig> {
    let mut config = match find_config_file()? {
        Some(path) => {
            debug!(path = %path.display(), "設定ファイルを読み込みます");
            ProviderConfig::from_file(&path)?
        }
        None => ProviderConfig::default(),
    };

    config.apply_env();
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;

    const ENV_VARS: [&str; 4] = [CONFIG_PATH_ENV, API_TOKEN_ENV, REGION_SUFFIX_ENV, API_URL_ENV];

    fn cleared() -> Vec<(&'static str, Option<&'static str>)> {
        ENV_VARS.iter().map(|name| (*name, None)).collect()
    }

    #[test]
    fn test_defaults() {
        let config = ProviderConfig::default();
        assert_eq!(config.region_suffix, "com");
        assert_eq!(config.api_url_template, "https://api.pingone.{suffix}/v1");
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.retry_config(), RetryConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.yaml");
        fs::write(&path, "region_suffix: eu\nretry:\n  max_attempts: 3\n").unwrap();

        let config = ProviderConfig::from_file(&path).unwrap();
        assert_eq!(config.region_suffix, "eu");
        assert_eq!(config.retry.max_attempts, 3);
        // 指定していない項目はデフォルト
        assert_eq!(config.retry.initial_delay_ms, 500);
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn test_invalid_yaml_reports_path() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("broken.yaml");
        fs::write(&path, "retry: [1, 2").unwrap();

        let err = ProviderConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("broken.yaml"));
    }

    #[test]
    #[serial]
    fn test_env_overrides_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("custom.yaml");
        fs::write(&path, "region_suffix: eu\napi_token: from-file\n").unwrap();

        let mut vars = cleared();
        vars.retain(|(name, _)| *name != CONFIG_PATH_ENV && *name != API_TOKEN_ENV);
        vars.push((API_TOKEN_ENV, Some("from-env")));
        let path_str = path.to_str().unwrap().to_string();

        temp_env::with_vars(
            vec![
                (CONFIG_PATH_ENV, Some(path_str.as_str())),
                (API_TOKEN_ENV, Some("from-env")),
                (REGION_SUFFIX_ENV, None),
                (API_URL_ENV, None),
            ],
            || {
                let config = load().unwrap();
                assert_eq!(config.region_suffix, "eu");
                assert_eq!(config.api_token.as_deref(), Some("from-env"));
            },
        );
    }

    #[test]
    #[serial]
    fn test_config_path_env_must_exist() {
        temp_env::with_vars(
            vec![(CONFIG_PATH_ENV, Some("/nonexistent/mfa-provider.yaml"))],
            || {
                let err = find_config_file().unwrap_err();
                assert!(matches!(err, ConfigError::ConfigFileNotFound(_)));
            },
        );
    }

    #[test]
    #[serial]
    fn test_find_local_config_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let original_dir = std::env::current_dir().unwrap();
        fs::write(temp_dir.path().join("mfa-provider.yaml"), "region_suffix: ca\n").unwrap();

        // テンポラリディレクトリに移動
        std::env::set_current_dir(&temp_dir).unwrap();

        temp_env::with_vars(cleared(), || {
            let found = find_config_file().unwrap().unwrap();
            assert!(found.ends_with("mfa-provider.yaml"));
            assert_eq!(load().unwrap().region_suffix, "ca");
        });

        // 元のディレクトリに戻る
        std::env::set_current_dir(original_dir).unwrap();
    }

    #[test]
    #[serial]
    fn test_region_and_url_from_env() {
        let mut config = ProviderConfig::default();
        temp_env::with_vars(
            vec![
                (REGION_SUFFIX_ENV, Some("asia")),
                (API_URL_ENV, Some("http://localhost:8080/v1")),
                (API_TOKEN_ENV, Some("")),
            ],
            || config.apply_env(),
        );

        assert_eq!(config.region_suffix, "asia");
        assert_eq!(config.api_url_template, "http://localhost:8080/v1");
        // 空文字は未設定扱い
        assert!(config.api_token.is_none());
    }

    #[test]
    fn test_client_config_requires_token() {
        let config = ProviderConfig::default();
        assert!(matches!(
            config.client_config(),
            Err(ConfigError::MissingApiToken)
        ));

        let config = ProviderConfig {
            api_token: Some("t".to_string()),
            region_suffix: "eu".to_string(),
            ..ProviderConfig::default()
        };
        let client = config.client_config().unwrap();
        assert_eq!(client.default_region_suffix, "eu");
        assert_eq!(client.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_validate_rejects_zero_attempts() {
        let mut config = ProviderConfig::default();
        config.retry.max_attempts = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue(_))
        ));
    }

    #[test]
    fn test_request_context_carries_region() {
        let config = ProviderConfig {
            region_suffix: "eu".to_string(),
            ..ProviderConfig::default()
        };
        let ctx = config.request_context();
        assert_eq!(ctx.region_suffix(), Some("eu"));
        assert_eq!(ctx.retry().max_attempts, 10);
    }
}
