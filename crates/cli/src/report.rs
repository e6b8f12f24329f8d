//! Human and machine readable summaries of a rewrite pass

use anyhow::{Context, Result};
use serde::Serialize;
use std::fmt::Write as _;
use tplfold_engine::RewrittenUnit;

/// Occurrence counts over every unit of a pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub files: usize,
    pub changed_files: usize,
    pub folded: usize,
    pub unchanged: usize,
    pub skipped: usize,
}

impl Totals {
    pub fn of(units: &[RewrittenUnit]) -> Self {
        units.iter().fold(
            Self {
                files: units.len(),
                ..Self::default()
            },
            |mut totals, unit| {
                if unit.is_changed() {
                    totals.changed_files += 1;
                }
                totals.folded += unit.replacements.len();
                totals.unchanged += unit.unchanged;
                totals.skipped += unit.skipped.len();
                totals
            },
        )
    }
}

#[derive(Serialize)]
struct Report<'a> {
    totals: Totals,
    files: Vec<&'a RewrittenUnit>,
}

/// JSON report of every unit with at least one occurrence
pub fn render_json(units: &[RewrittenUnit]) -> Result<String> {
    let report = Report {
        totals: Totals::of(units),
        files: units.iter().filter(|unit| unit.occurrences() > 0).collect(),
    };
    serde_json::to_string_pretty(&report).context("Failed to serialize report")
}

/// Plain text report, one line per occurrence
pub fn render_text(units: &[RewrittenUnit]) -> String {
    let mut out = String::new();

    for unit in units.iter().filter(|unit| unit.occurrences() > 0) {
        let _ = writeln!(out, "{}", unit.path.display());
        for replacement in &unit.replacements {
            let _ = writeln!(
                out,
                "  {} folded to {}",
                replacement.location,
                preview(&replacement.literal)
            );
        }
        for skipped in &unit.skipped {
            let _ = writeln!(out, "  {} skipped: {}", skipped.location, skipped.reason);
        }
        if unit.unchanged > 0 {
            let _ = writeln!(out, "  {} already folded", unit.unchanged);
        }
    }

    let totals = Totals::of(units);
    let _ = writeln!(
        out,
        "{} folded, {} already folded, {} skipped in {} of {} files",
        totals.folded, totals.unchanged, totals.skipped, totals.changed_files, totals.files
    );
    out
}

fn preview(literal: &str) -> String {
    const MAX_CHARS: usize = 60;
    if literal.chars().count() <= MAX_CHARS {
        return literal.to_string();
    }
    let head: String = literal.chars().take(MAX_CHARS).collect();
    format!("{head}...")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tplfold_engine::transform::Identity;
    use tplfold_engine::{Program, RewriteOptions};

    fn units() -> Vec<RewrittenUnit> {
        Program::from_sources([
            ("a.ts", "const a = { template: '<a>' + '</a>' };"),
            ("b.ts", "const b = { template: '<b>' + missing };"),
            ("c.ts", "const c = 1;"),
        ])
        .unwrap()
        .rewrite_all(&Identity, RewriteOptions::default())
    }

    #[test]
    fn test_totals() {
        assert_eq!(
            Totals::of(&units()),
            Totals {
                files: 3,
                changed_files: 1,
                folded: 1,
                unchanged: 0,
                skipped: 1,
            }
        );
    }

    #[test]
    fn test_text_report() {
        let text = render_text(&units());
        assert!(text.contains("a.ts\n  1:23 folded to \"<a></a>\""));
        assert!(text.contains("b.ts\n  1:23 skipped: failed to visit"));
        assert!(!text.contains("c.ts"));
        assert!(text.ends_with("1 folded, 0 already folded, 1 skipped in 1 of 3 files\n"));
    }

    #[test]
    fn test_json_report() {
        let json: serde_json::Value = serde_json::from_str(&render_json(&units()).unwrap()).unwrap();
        assert_eq!(json["totals"]["folded"], 1);
        assert_eq!(json["files"].as_array().unwrap().len(), 2);
        assert_eq!(json["files"][1]["skipped"][0]["reason"], "traversal");
        assert_eq!(
            json["files"][1]["skipped"][0]["error"]["kind"],
            "unresolved_reference"
        );
    }
}
