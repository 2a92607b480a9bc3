pub mod apply;
pub mod catalog;
pub mod plan;
pub mod query;
pub mod state;
pub mod validate;

use crate::output;
use anyhow::Context;
use mfa_provider::MfaProvider;
use mfa_provider_client::HttpMfaClient;
use mfa_provider_core::{RequestContext, Resource, ResourceState, Schema, upgrade_state};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// API に接続するコマンドの実行環境
pub struct Session {
    pub provider: MfaProvider,
    pub ctx: RequestContext,
}

impl Session {
    /// 設定を読み込んでクライアントを組み立てる。Ctrl-C で実行中の呼び出しを取り消す
    pub fn connect() -> anyhow::Result<Self> {
        let config = mfa_provider_config::load().context("設定の読み込みに失敗しました")?;
        let client = HttpMfaClient::new(config.client_config()?)
            .context("API クライアントを初期化できません")?;

        let cancel = CancellationToken::new();
        let on_interrupt = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("中断を受け付けました。実行中の API 呼び出しを取り消します");
                on_interrupt.cancel();
            }
        });

        Ok(Self {
            provider: MfaProvider::new(Arc::new(client)),
            ctx: config.request_context().with_cancellation(cancel),
        })
    }
}

/// リソースかデータソースのスキーマ。同名ならリソースを優先する
pub fn schema_of(
    provider: &MfaProvider,
    type_name: &str,
    data_source: bool,
) -> anyhow::Result<Schema> {
    if !data_source && let Ok(resource) = provider.resource(type_name) {
        return Ok(resource.schema());
    }
    let data_source = provider
        .data_source(type_name)
        .with_context(|| format!("不明な型です: {}", type_name))?;
    Ok(data_source.schema())
}

pub fn ensure_type(state: &ResourceState, type_name: &str) -> anyhow::Result<()> {
    anyhow::ensure!(
        state.resource_type == type_name,
        "状態ファイルのリソース型 {} は {} と一致しません",
        state.resource_type,
        type_name
    );
    Ok(())
}

/// 状態を現在のスキーマバージョンへ移行する
pub fn current_state(resource: &dyn Resource, state: &ResourceState) -> anyhow::Result<ResourceState> {
    match upgrade_state(&resource.schema(), &resource.upgraders(), state) {
        Ok(state) => Ok(state),
        Err(diags) => {
            output::report(&diags)?;
            anyhow::bail!("状態ファイルを移行できません")
        }
    }
}
