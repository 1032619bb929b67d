use crate::cli::ListArgs;
use serde::Serialize;
use shortcut::{simulated::SimulatedBrowser, Action, Arity, Category, Registry};
use std::{fmt::Write as _, sync::Arc};

/// One row of `shortcut list --json`.
#[derive(Debug, Serialize)]
pub struct ActionInfo<'a> {
    pub name: &'a str,
    pub category: Category,
    pub arity: Arity,
    pub query: bool,
}

impl<'a> From<&'a Action> for ActionInfo<'a> {
    fn from(action: &'a Action) -> Self {
        Self {
            name: action.name(),
            category: action.category(),
            arity: action.arity(),
            query: action.has_query(),
        }
    }
}

pub fn run(args: ListArgs) -> anyhow::Result<()> {
    let registry = Registry::browser(Arc::new(SimulatedBrowser::new()))?;
    let output = if args.json {
        render_json(&registry, args.category)?
    } else {
        render_text(&registry, args.category)
    };
    print!("{output}");
    Ok(())
}

pub fn render_json(registry: &Registry, category: Option<Category>) -> anyhow::Result<String> {
    let rows: Vec<ActionInfo<'_>> = registry.list(category).map(ActionInfo::from).collect();
    let mut json = serde_json::to_string_pretty(&rows)?;
    json.push('\n');
    Ok(json)
}

/// Actions grouped under a heading per category, in registration order within each.
pub fn render_text(registry: &Registry, category: Option<Category>) -> String {
    let categories = match category {
        Some(category) => vec![category],
        None => Category::ALL.to_vec(),
    };

    let mut out = String::new();
    for category in categories {
        if !out.is_empty() {
            out.push('\n');
        }
        let _ = writeln!(out, "{category}:");
        for action in registry.list(Some(category)) {
            let mut notes = Vec::new();
            if action.arity() == Arity::Unary {
                notes.push("takes an argument");
            }
            if action.has_query() {
                notes.push("queryable");
            }
            if notes.is_empty() {
                let _ = writeln!(out, "  {}", action.name());
            } else {
                let _ = writeln!(out, "  {} ({})", action.name(), notes.join(", "));
            }
        }
    }
    out
}
