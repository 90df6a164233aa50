//! `resolve` command: look up pronouns for a set of ids.

use anyhow::Result;
use clap::Args;
use futures::future::join_all;

use crate::cli::output::{dash, list_table, output, render_list, CommandOutput};
use crate::domain::models::{Config, EntityId, PronounCode, PronounStyle};
use crate::services::format_pronouns;

use super::build_resolver;

#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Entity ids to resolve
    #[arg(required = true)]
    pub ids: Vec<String>,

    /// Casing of the rendered pronouns (capitalized, lowercase)
    #[arg(short, long)]
    pub style: Option<PronounStyle>,
}

#[derive(Debug, serde::Serialize)]
pub struct ResolvedEntry {
    pub id: String,
    pub code: Option<PronounCode>,
    pub pronouns: Option<String>,
}

#[derive(Debug, serde::Serialize)]
pub struct ResolveOutput {
    pub results: Vec<ResolvedEntry>,
    pub total: usize,
}

impl ResolveOutput {
    pub fn new(resolved: Vec<(EntityId, Option<PronounCode>)>, style: PronounStyle) -> Self {
        let results: Vec<ResolvedEntry> = resolved
            .into_iter()
            .map(|(id, code)| ResolvedEntry {
                id: id.to_string(),
                pronouns: code.map(|c| format_pronouns(c, style)),
                code,
            })
            .collect();
        Self {
            total: results.len(),
            results,
        }
    }
}

impl CommandOutput for ResolveOutput {
    fn to_human(&self) -> String {
        let mut table = list_table(&["id", "code", "pronouns"]);
        for entry in &self.results {
            table.add_row(vec![
                entry.id.clone(),
                entry.code.map_or_else(dash, |c| c.code().to_string()),
                entry.pronouns.clone().unwrap_or_else(dash),
            ]);
        }
        render_list("result", &table, self.total)
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: ResolveArgs, config: &Config, json_mode: bool) -> Result<()> {
    let resolver = build_resolver(config).await?;
    let style = args.style.unwrap_or(config.display.style);

    let ids: Vec<EntityId> = args.ids.into_iter().map(EntityId::from).collect();
    // All lookups are started before any is awaited so they share one window.
    let values = join_all(ids.iter().map(|id| resolver.resolve(id))).await;

    let out = ResolveOutput::new(ids.into_iter().zip(values).collect(), style);
    output(&out, json_mode);
    Ok(())
}
