//! Output formatting utilities for the CLI.

use comfy_table::{presets, Cell, CellAlignment, ContentArrangement, Table};
use console::style;
use serde::Serialize;

pub trait CommandOutput: Serialize {
    fn to_human(&self) -> String;
    fn to_json(&self) -> serde_json::Value;
}

pub fn output<T: CommandOutput>(result: &T, json_mode: bool) {
    if json_mode {
        println!("{}", serde_json::to_string_pretty(&result.to_json()).unwrap_or_default());
    } else {
        println!("{}", result.to_human());
    }
}

/// Borderless table with upper-cased, left-aligned headers.
pub fn list_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::NOTHING)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(
            headers
                .iter()
                .map(|h| Cell::new(h.to_uppercase()).set_alignment(CellAlignment::Left)),
        );
    table
}

/// Render `table` under a "N entity(s):" count line.
pub fn render_list(entity_name: &str, table: &Table, total: usize) -> String {
    if total == 0 {
        return format!("No {entity_name}s found.");
    }
    let noun = if total == 1 {
        entity_name.to_string()
    } else {
        format!("{entity_name}s")
    };
    format!("{} {noun}:\n{table}", style(total).bold())
}

/// Placeholder shown where a value is absent.
pub fn dash() -> String {
    style("-").dim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_list_empty() {
        let table = list_table(&["id"]);
        assert_eq!(render_list("override", &table, 0), "No overrides found.");
    }

    #[test]
    fn test_render_list_pluralizes() {
        console::set_colors_enabled(false);
        let mut table = list_table(&["id"]);
        table.add_row(vec!["1"]);
        table.add_row(vec!["2"]);

        let rendered = render_list("override", &table, 2);
        assert!(rendered.starts_with("2 overrides:"));
        assert!(rendered.contains("ID"));
    }
}
