use super::{current_state, ensure_type};
use crate::output;
use colored::Colorize;
use mfa_provider::MfaProvider;
use mfa_provider_core::Plan;
use mfa_provider_core::lifecycle::plan;
use std::path::Path;

/// 状態ファイルと設定の差分だけを見る。リモートの読み直しは `refresh` で行う
pub fn handle(
    provider: &MfaProvider,
    type_name: &str,
    config_path: &Path,
    state_path: Option<&Path>,
) -> anyhow::Result<()> {
    let resource = provider.resource(type_name)?;
    let config = output::read_json(config_path)?;

    let prior = match state_path {
        Some(path) => output::read_state_if_exists(path)?,
        None => None,
    };
    let prior = match prior {
        Some(state) => {
            ensure_type(&state, type_name)?;
            Some(current_state(resource.as_ref(), &state)?)
        }
        None => None,
    };

    let (change, diags) = plan(resource.as_ref(), prior.as_ref(), Some(&config));
    output::report(&diags)?;
    let Some(change) = change else {
        return Ok(());
    };

    output::print_action(&change.action);
    println!();
    println!(
        "{} {}",
        "プラン:".bold(),
        Plan::new(vec![change.action]).summary()
    );
    Ok(())
}
