//! Environment-scoped API calls
//!
//! Every call against an environment goes through [`call`], which adds the
//! environment existence probe in front of the response pipeline.

use mfa_provider_client::MfaApi;
use mfa_provider_core::{
    ApiResult, Diagnostics, ErrorMapper, RequestContext, Retryable,
    check_environment_exists_on_permissions_error, invoke,
};
use std::future::Future;

/// Replace a permission error with environment-not-found when the
/// environment itself is gone.
pub(crate) async fn probe_environment<T>(
    api: &dyn MfaApi,
    ctx: &RequestContext,
    environment_id: &str,
    result: ApiResult<T>,
) -> ApiResult<T> {
    check_environment_exists_on_permissions_error(environment_id, result, move || async move {
        api.read_environment(ctx, environment_id)
            .await
            .map(|response| response.map(|_| ()))
    })
    .await
}

/// Run `request` through the pipeline with the environment probe applied to
/// every attempt.
pub(crate) async fn call<T, F, Fut>(
    api: &dyn MfaApi,
    ctx: &RequestContext,
    environment_id: &str,
    operation: &str,
    mapper: ErrorMapper,
    retryable: Option<Retryable>,
    request: F,
) -> (Option<T>, Diagnostics)
where
    F: Fn() -> Fut,
    Fut: Future<Output = ApiResult<T>>,
{
    let request = &request;
    invoke(ctx, operation, mapper, retryable, move || async move {
        let result = request().await;
        probe_environment(api, ctx, environment_id, result).await
    })
    .await
}
