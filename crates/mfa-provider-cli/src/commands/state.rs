use super::{Session, current_state};
use crate::output;
use anyhow::Context;
use colored::Colorize;
use mfa_provider::MfaProvider;
use mfa_provider_core::lifecycle;
use std::path::Path;

pub async fn refresh(session: &Session, state_path: &Path) -> anyhow::Result<()> {
    let state = output::read_state(state_path)?;
    let resource = session.provider.resource(&state.resource_type)?;

    println!("{}", "リモートの状態を確認中...".blue());
    let (refreshed, diags) = lifecycle::refresh(resource.as_ref(), &session.ctx, &state).await;
    output::report(&diags)?;
    output::write_state(state_path, &refreshed)?;

    if refreshed.is_removed() {
        println!("{}", "リソースはリモートに存在しません".yellow());
    } else {
        println!("{}", "✓ 最新の状態を取得しました".green().bold());
    }
    Ok(())
}

pub async fn destroy(session: &Session, state_path: &Path) -> anyhow::Result<()> {
    let state = output::read_state(state_path)?;
    if state.is_removed() {
        println!("{}", "リソースは既に削除されています".yellow());
        return Ok(());
    }

    let resource = session.provider.resource(&state.resource_type)?;
    let state = current_state(resource.as_ref(), &state)?;

    let (change, diags) = lifecycle::plan(resource.as_ref(), Some(&state), None);
    output::report(&diags)?;
    let Some(change) = change else {
        return Ok(());
    };
    output::print_action(&change.action);

    println!("{}", "削除中...".blue());
    let (_, diags) = lifecycle::apply(resource.as_ref(), &session.ctx, &change, Some(&state)).await;
    output::report(&diags)?;

    std::fs::remove_file(state_path)
        .with_context(|| format!("状態ファイルを削除できません: {}", state_path.display()))?;
    println!("{}", "✓ 削除しました".green().bold());
    Ok(())
}

pub async fn import(
    session: &Session,
    type_name: &str,
    id: &str,
    state_path: Option<&Path>,
) -> anyhow::Result<()> {
    let resource = session.provider.resource(type_name)?;

    let (state, diags) = lifecycle::import(resource.as_ref(), &session.ctx, id).await;
    output::report(&diags)?;
    let Some(state) = state else {
        return Ok(());
    };

    match state_path {
        Some(path) => {
            output::write_state(path, &state)?;
            println!(
                "{} {} ({})",
                "✓ 取り込みました:".green().bold(),
                type_name.cyan(),
                state.id
            );
        }
        None => println!("{}", serde_json::to_string_pretty(&state)?),
    }
    Ok(())
}

/// API を呼ばずに状態ファイルのスキーマバージョンだけを上げる
pub fn upgrade(provider: &MfaProvider, state_path: &Path) -> anyhow::Result<()> {
    let state = output::read_state(state_path)?;
    let resource = provider.resource(&state.resource_type)?;

    let upgraded = current_state(resource.as_ref(), &state)?;
    if upgraded.schema_version == state.schema_version {
        println!(
            "{}",
            format!("状態ファイルは最新です (v{})", state.schema_version).green()
        );
        return Ok(());
    }

    output::write_state(state_path, &upgraded)?;
    println!(
        "{} v{} → v{}",
        "✓ 状態ファイルを移行しました:".green().bold(),
        state.schema_version,
        upgraded.schema_version
    );
    Ok(())
}
