// Copyright (c) 2024-2025 DDL Editor Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Plan formatting for CLI output

use super::commands::OutputFormat;
use colored::*;
use comfy_table::{presets::UTF8_FULL, Cell, Color, Table};
use ddl_editor::{CommitPlan, EditorConfig};

/// Formatter for generated DDL plans
pub struct PlanFormatter;

impl PlanFormatter {
    /// Format a plan in the specified format
    pub fn format(plan: &CommitPlan, config: &EditorConfig, format: OutputFormat) -> String {
        match format {
            OutputFormat::Sql => Self::format_sql(plan, config),
            OutputFormat::Table => Self::format_table(plan),
            OutputFormat::Json => Self::format_json(plan, config),
        }
    }

    fn format_sql(plan: &CommitPlan, config: &EditorConfig) -> String {
        if plan.is_empty() {
            return "-- No changes\n".to_string();
        }
        format!("{}\n", plan.script(config))
    }

    /// Format actions as a table using comfy-table
    fn format_table(plan: &CommitPlan) -> String {
        if plan.is_empty() {
            return format!("{}\n", "No changes".yellow());
        }

        let mut output = String::new();
        output.push_str(&format!("{}\n", "Persist Actions".bold().green()));
        output.push_str(&format!(
            "Commands: {}, actions: {}\n\n",
            plan.batches().len(),
            plan.action_count()
        ));

        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.set_header(
            ["#", "Command", "Action", "Script"]
                .into_iter()
                .map(|h| Cell::new(h).fg(Color::Green))
                .collect::<Vec<_>>(),
        );

        let mut position = 0;
        for batch in plan.batches() {
            for action in batch.actions() {
                position += 1;
                table.add_row(vec![
                    position.to_string(),
                    batch.title().to_string(),
                    action.title().to_string(),
                    action.script().to_string(),
                ]);
            }
        }

        output.push_str(&table.to_string());
        output.push('\n');
        output
    }

    /// Format the plan as JSON
    fn format_json(plan: &CommitPlan, config: &EditorConfig) -> String {
        let json = serde_json::json!({
            "status": "success",
            "batches": plan.batches(),
            "action_count": plan.action_count(),
            "script": plan.script(config),
        });

        serde_json::to_string_pretty(&json).unwrap_or_else(|_| {
            "{\"status\": \"error\", \"error\": \"Could not serialize plan to JSON\"}".to_string()
        })
    }
}
