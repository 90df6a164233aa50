//! `override` commands: manage locally persisted pronoun overrides.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use crate::cli::output::{list_table, output, render_list, CommandOutput};
use crate::domain::models::{Config, EntityId, OverrideRecord, PronounCode};

use super::build_resolver;

#[derive(Args, Debug)]
pub struct OverrideArgs {
    #[command(subcommand)]
    pub command: OverrideCommands,
}

#[derive(Subcommand, Debug)]
pub enum OverrideCommands {
    /// Set an override; `none` records an explicit "no pronouns"
    Set {
        /// Entity id
        id: String,
        /// Pronoun code (hh, sh, tt, ...), canonical text, or `none`
        value: String,
    },
    /// Show the override for an id
    Get {
        /// Entity id
        id: String,
    },
    /// Remove the override for an id
    Remove {
        /// Entity id
        id: String,
    },
    /// List ids that have an override
    List,
    /// Remove every override
    ClearAll,
}

/// Parse the `value` argument of `override set`.
pub fn parse_override_value(raw: &str) -> Result<Option<PronounCode>> {
    if raw.trim().eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    let code = raw
        .parse::<PronounCode>()
        .with_context(|| format!("Invalid override value: {raw}"))?;
    Ok(Some(code))
}

#[derive(Debug, serde::Serialize)]
pub struct OverrideOutput {
    pub id: String,
    /// `false` when no override exists for the id
    pub present: bool,
    pub code: Option<PronounCode>,
    pub pronouns: Option<String>,
}

impl OverrideOutput {
    fn new(id: &EntityId, record: Option<OverrideRecord>) -> Self {
        let code = record.and_then(OverrideRecord::value);
        Self {
            id: id.to_string(),
            present: record.is_some(),
            code,
            pronouns: code.map(|c| c.canonical().to_string()),
        }
    }
}

impl CommandOutput for OverrideOutput {
    fn to_human(&self) -> String {
        match (self.present, &self.pronouns) {
            (false, _) => format!("No override for {}", self.id),
            (true, Some(pronouns)) => format!("{}: {pronouns}", self.id),
            (true, None) => format!("{}: cleared (no pronouns shown)", self.id),
        }
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

#[derive(Debug, serde::Serialize)]
pub struct OverrideListOutput {
    pub ids: Vec<String>,
    pub total: usize,
}

impl CommandOutput for OverrideListOutput {
    fn to_human(&self) -> String {
        let mut table = list_table(&["id"]);
        for id in &self.ids {
            table.add_row(vec![id.clone()]);
        }
        render_list("override", &table, self.total)
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

#[derive(Debug, serde::Serialize)]
pub struct OverrideActionOutput {
    pub success: bool,
    pub message: String,
}

impl CommandOutput for OverrideActionOutput {
    fn to_human(&self) -> String {
        self.message.clone()
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: OverrideArgs, config: &Config, json_mode: bool) -> Result<()> {
    let resolver = build_resolver(config).await?;

    match args.command {
        OverrideCommands::Set { id, value } => {
            let code = parse_override_value(&value)?;
            let id = EntityId::from(id);
            resolver.set_override(&id, code).await?;

            let message = match code {
                Some(code) => format!("Override set: {id} -> {code}"),
                None => format!("Override set: {id} -> no pronouns"),
            };
            output(&OverrideActionOutput { success: true, message }, json_mode);
        }

        OverrideCommands::Get { id } => {
            let id = EntityId::from(id);
            let record = resolver.get_override(&id).await?;
            output(&OverrideOutput::new(&id, record), json_mode);
        }

        OverrideCommands::Remove { id } => {
            let id = EntityId::from(id);
            let removed = resolver.remove_override(&id).await?;
            let message = if removed {
                format!("Override removed: {id}")
            } else {
                format!("No override for {id}")
            };
            output(
                &OverrideActionOutput {
                    success: removed,
                    message,
                },
                json_mode,
            );
        }

        OverrideCommands::List => {
            let ids = resolver.list_overrides().await?;
            let out = OverrideListOutput {
                total: ids.len(),
                ids: ids.iter().map(ToString::to_string).collect(),
            };
            output(&out, json_mode);
        }

        OverrideCommands::ClearAll => {
            let cleared = resolver.clear_all_overrides().await?;
            output(
                &OverrideActionOutput {
                    success: true,
                    message: format!("Cleared {cleared} override(s)"),
                },
                json_mode,
            );
        }
    }

    Ok(())
}
