use super::schema_of;
use crate::output;
use colored::Colorize;
use mfa_provider::MfaProvider;
use std::path::Path;

pub fn handle(
    provider: &MfaProvider,
    type_name: &str,
    config_path: &Path,
    data_source: bool,
) -> anyhow::Result<()> {
    println!("{}", "設定を検証中...".blue());

    let schema = schema_of(provider, type_name, data_source)?;
    let config = output::read_json(config_path)?;

    let mut diags = schema.validate_config(&config);
    if !data_source && !diags.has_error() && let Ok(resource) = provider.resource(type_name) {
        diags.append(resource.validate_config(&config));
    }
    output::report(&diags)?;

    println!("{}", "✓ 設定ファイルは正常です！".green().bold());
    println!("  型: {} (スキーマ v{})", type_name.cyan(), schema.version);
    Ok(())
}
