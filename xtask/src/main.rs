// SPDX-License-Identifier: MIT OR Apache-2.0
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use schemars::schema_for;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "xtask", version, about = "Repo maintenance tasks")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate JSON Schemas for the wire and config contracts.
    Schema {
        /// Output directory.
        #[arg(long, default_value = "contracts/schemas")]
        out_dir: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Schema { out_dir } => schema(&out_dir),
    }
}

fn schema(out_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(out_dir).context("create schema output dir")?;

    let schemas = [
        ("dashboard_state", schema_for!(genui_core::DashboardState)),
        ("ui_envelope", schema_for!(genui_core::UiEnvelope)),
        ("chat_request", schema_for!(genui_core::ChatRequest)),
        ("basic_response", schema_for!(genui_core::BasicResponse)),
        ("config", schema_for!(genui_config::GenUiConfig)),
    ];
    for (name, schema) in &schemas {
        write_schema(&out_dir.join(format!("{name}.schema.json")), schema)?;
    }

    eprintln!("wrote {} schemas to {}", schemas.len(), out_dir.display());
    Ok(())
}

fn write_schema(path: &Path, schema: &schemars::Schema) -> Result<()> {
    let s = serde_json::to_string_pretty(schema)?;
    std::fs::write(path, s).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}
