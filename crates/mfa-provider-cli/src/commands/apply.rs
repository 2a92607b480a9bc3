use super::{Session, ensure_type};
use crate::output;
use colored::Colorize;
use mfa_provider_core::ActionType;
use mfa_provider_core::lifecycle::{apply, plan, refresh};
use std::path::Path;

pub async fn handle(
    session: &Session,
    type_name: &str,
    config_path: &Path,
    state_path: &Path,
) -> anyhow::Result<()> {
    let resource = session.provider.resource(type_name)?;
    let config = output::read_json(config_path)?;

    // 計画の前にリモートの状態を読み直す
    let prior = match output::read_state_if_exists(state_path)? {
        Some(state) => {
            ensure_type(&state, type_name)?;
            println!("{}", "リモートの状態を確認中...".blue());
            let (refreshed, diags) = refresh(resource.as_ref(), &session.ctx, &state).await;
            output::report(&diags)?;
            Some(refreshed)
        }
        None => None,
    };

    let (change, diags) = plan(resource.as_ref(), prior.as_ref(), Some(&config));
    output::report(&diags)?;
    let Some(change) = change else {
        return Ok(());
    };
    output::print_action(&change.action);

    if change.action.action_type == ActionType::NoOp {
        println!("{}", "変更はありません".green());
        if let Some(prior) = &prior {
            output::write_state(state_path, prior)?;
        }
        return Ok(());
    }

    println!("{}", "適用中...".blue());
    let (state, diags) = apply(resource.as_ref(), &session.ctx, &change, prior.as_ref()).await;

    // 失敗しても残っているリソースは状態ファイルに残す
    if let Some(state) = &state {
        output::write_state(state_path, state)?;
    }
    output::report(&diags)?;

    if let Some(state) = &state {
        println!(
            "{} {} ({})",
            "✓ 適用しました:".green().bold(),
            type_name.cyan(),
            state.id
        );
    }
    Ok(())
}
