use super::schema_of;
use colored::Colorize;
use mfa_provider::MfaProvider;

pub fn resources(provider: &MfaProvider) -> anyhow::Result<()> {
    println!("{}", "リソース:".bold());
    for name in provider.resource_types() {
        println!("  - {}", name.cyan());
    }

    println!("{}", "データソース:".bold());
    for name in provider.data_source_types() {
        println!("  - {}", name.cyan());
    }
    Ok(())
}

pub fn schema(provider: &MfaProvider, type_name: &str, data_source: bool) -> anyhow::Result<()> {
    let schema = schema_of(provider, type_name, data_source)?;
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}
