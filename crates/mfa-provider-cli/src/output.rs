//! 端末出力と状態ファイルの読み書き

use anyhow::Context;
use colored::Colorize;
use mfa_provider_core::{Action, ActionType, Diagnostics, ResourceState, Severity};
use serde_json::Value;
use std::path::Path;

pub fn read_json(path: &Path) -> anyhow::Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("ファイルを読み込めません: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("JSON として解析できません: {}", path.display()))
}

pub fn read_state(path: &Path) -> anyhow::Result<ResourceState> {
    let value = read_json(path)?;
    serde_json::from_value(value)
        .with_context(|| format!("状態ファイルの形式が不正です: {}", path.display()))
}

/// 状態ファイルが無ければ `None`
pub fn read_state_if_exists(path: &Path) -> anyhow::Result<Option<ResourceState>> {
    if !path.exists() {
        return Ok(None);
    }
    read_state(path).map(Some)
}

pub fn write_state(path: &Path, state: &ResourceState) -> anyhow::Result<()> {
    let mut content = serde_json::to_string_pretty(state)?;
    content.push('\n');
    std::fs::write(path, content)
        .with_context(|| format!("状態ファイルを書き込めません: {}", path.display()))?;
    println!(
        "状態ファイルを書き出しました: {}",
        path.display().to_string().cyan()
    );
    Ok(())
}

pub fn print_diagnostics(diags: &Diagnostics) {
    for diag in diags.iter() {
        let label = match diag.severity {
            Severity::Error => "✗ エラー".red().bold(),
            Severity::Warning => "⚠ 警告".yellow().bold(),
        };
        eprintln!("{} {}", label, diag.summary);
        if let Some(path) = &diag.path {
            eprintln!("  属性: {}", path.cyan());
        }
        if !diag.detail.is_empty() {
            eprintln!("  {}", diag.detail);
        }
    }
}

/// 診断をすべて表示し、エラーが 1 件でもあれば失敗として返す
pub fn report(diags: &Diagnostics) -> anyhow::Result<()> {
    print_diagnostics(diags);

    let errors = diags.errors().count();
    if errors > 0 {
        anyhow::bail!("{} 件のエラーで中断しました", errors);
    }
    Ok(())
}

pub fn print_action(action: &Action) {
    let symbol = match action.action_type {
        ActionType::Create => "+".green().bold(),
        ActionType::Update => "~".yellow().bold(),
        ActionType::Replace => "-/+".red().bold(),
        ActionType::Delete => "-".red().bold(),
        ActionType::NoOp => "=".dimmed(),
    };
    println!(
        "{} {} {}",
        symbol,
        action.resource_type.cyan(),
        action.description
    );

    for change in &action.changes {
        let (before, after) = if change.sensitive {
            ("(sensitive)".to_string(), "(sensitive)".to_string())
        } else {
            (render(&change.before), render(&change.after))
        };
        let replace = if change.requires_replace {
            format!(" {}", "# 再作成が必要".red())
        } else {
            String::new()
        };
        println!("    {}: {} → {}{}", change.path, before, after, replace);
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::Null => "(なし)".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mfa_provider_core::Diagnostic;
    use serde_json::json;

    #[test]
    fn test_report_fails_only_on_errors() {
        let warnings: Diagnostics = Diagnostic::warning("Resource deprecated", "").into();
        assert!(report(&warnings).is_ok());

        let mut errors = warnings;
        errors.add_error("Invalid value", "bad");
        let err = report(&errors).unwrap_err();
        assert!(err.to_string().contains("1 件"));
    }

    #[test]
    fn test_state_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        assert!(read_state_if_exists(&path).unwrap().is_none());

        let state = ResourceState::new("mfa_settings", 1, "env-1", json!({ "id": "env-1" }));
        write_state(&path, &state).unwrap();
        assert_eq!(read_state(&path).unwrap(), state);
    }

    #[test]
    fn test_render_null_value() {
        assert_eq!(render(&Value::Null), "(なし)");
        assert_eq!(render(&json!("a")), "\"a\"");
    }
}
