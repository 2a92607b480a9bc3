use super::Session;
use crate::output;
use mfa_provider_core::lifecycle::query;
use serde_json::json;

pub async fn handle(session: &Session, name: &str, environment_id: &str) -> anyhow::Result<()> {
    let data_source = session.provider.data_source(name)?;
    let config = json!({ "environment_id": environment_id });

    let (value, diags) = query(data_source.as_ref(), &session.ctx, &config).await;
    output::report(&diags)?;

    if let Some(value) = value {
        println!("{}", serde_json::to_string_pretty(&value)?);
    }
    Ok(())
}
