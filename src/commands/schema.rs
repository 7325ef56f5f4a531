use schemars::schema_for;

use crate::config::FileConfig;

/// Print the JSON Schema of the config file to stdout.
pub fn run_schema() -> anyhow::Result<()> {
    let schema = schema_for!(FileConfig);
    let json = serde_json::to_string_pretty(&schema)?;
    println!("{json}");
    Ok(())
}
