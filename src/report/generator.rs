//! Markdown and JSON report generation.
//!
//! This module renders data previews attached to materializations and
//! the run report written at the end of an invocation.

use crate::error::PipelineResult;
use crate::models::{IrisRecord, Materialization, MetadataValue, RunReport, StoryTable};

/// Rows shown in data previews.
pub const PREVIEW_ROWS: usize = 5;

/// Make a value safe to place inside a Markdown table cell.
fn escape_cell(value: &str) -> String {
    value
        .replace('|', "\\|")
        .replace("\r\n", " ")
        .replace(['\n', '\r'], " ")
}

fn is_numeric_column(rows: &[Vec<String>], column: usize) -> bool {
    let mut cells = rows
        .iter()
        .filter_map(|row| row.get(column))
        .filter(|cell| !cell.is_empty())
        .peekable();

    cells.peek().is_some() && cells.all(|cell| cell.parse::<f64>().is_ok())
}

/// Render rows as a Markdown pipe table with a leading row-index column.
///
/// Numeric columns are right-aligned, everything else left-aligned.
pub fn markdown_table(columns: &[String], rows: &[Vec<String>]) -> String {
    let mut table = String::new();

    table.push_str("|    |");
    for column in columns {
        table.push_str(&format!(" {} |", escape_cell(column)));
    }
    table.push('\n');

    table.push_str("|---:|");
    for i in 0..columns.len() {
        table.push_str(if is_numeric_column(rows, i) { "---:|" } else { ":---|" });
    }
    table.push('\n');

    for (index, row) in rows.iter().enumerate() {
        table.push_str(&format!("| {} |", index));
        for i in 0..columns.len() {
            let cell = row.get(i).map(String::as_str).unwrap_or("");
            table.push_str(&format!(" {} |", escape_cell(cell)));
        }
        table.push('\n');
    }

    table
}

/// Preview of the first rows of a story table.
pub fn story_preview(table: &StoryTable, rows: usize) -> String {
    let (columns, cells) = table.to_cells();
    let shown = &cells[..cells.len().min(rows)];
    markdown_table(&columns, shown)
}

/// Preview of the first rows of an iris table.
pub fn iris_preview(records: &[IrisRecord], rows: usize) -> String {
    let columns: Vec<String> = [
        "sepal_length_cm",
        "sepal_width_cm",
        "petal_length_cm",
        "petal_width_cm",
        "species",
    ]
    .iter()
    .map(|c| c.to_string())
    .collect();

    let cells: Vec<Vec<String>> = records
        .iter()
        .take(rows)
        .map(|r| {
            vec![
                r.sepal_length_cm.to_string(),
                r.sepal_width_cm.to_string(),
                r.petal_length_cm.to_string(),
                r.petal_width_cm.to_string(),
                r.species.clone(),
            ]
        })
        .collect();

    markdown_table(&columns, &cells)
}

/// Generate a complete Markdown run report.
pub fn generate_markdown_report(report: &RunReport) -> String {
    let mut output = String::new();

    output.push_str("# hnassets Run Report\n\n");
    output.push_str(&generate_metadata_section(report));
    output.push_str(&generate_table_of_contents(report));

    for materialization in &report.materializations {
        output.push_str(&generate_asset_section(materialization));
    }

    output.push_str(&generate_footer());
    output
}

/// Generate the run metadata section.
fn generate_metadata_section(report: &RunReport) -> String {
    let mut section = String::new();

    section.push_str("## Run\n\n");
    section.push_str(&format!(
        "- **Started:** {}\n",
        report.started_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Data Directory:** `{}`\n", report.data_dir.display()));
    section.push_str(&format!(
        "- **Assets Materialized:** {}\n",
        report.materializations.len()
    ));
    section.push_str(&format!("- **Duration:** {:.1}s\n", report.duration_seconds));
    section.push('\n');

    section
}

/// Generate the table of contents.
fn generate_table_of_contents(report: &RunReport) -> String {
    if report.materializations.is_empty() {
        return String::new();
    }

    let mut toc = String::new();
    toc.push_str("## Assets\n\n");
    for m in &report.materializations {
        toc.push_str(&format!("- [{}](#{})\n", m.asset, m.asset));
    }
    toc.push('\n');

    toc
}

/// Generate the section for one materialized asset.
pub fn generate_asset_section(m: &Materialization) -> String {
    let mut section = String::new();

    section.push_str(&format!("## {}\n\n", m.asset));
    section.push_str(&format!(
        "*Materialized at {}*\n\n",
        m.materialized_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    for artifact in &m.artifacts {
        section.push_str(&format!("- **Artifact:** `{}`\n", artifact.display()));
    }

    // Scalars first as a list, Markdown blocks after.
    for entry in &m.metadata {
        match &entry.value {
            MetadataValue::Markdown(_) => {}
            MetadataValue::Path(p) => {
                section.push_str(&format!("- **{}:** `{}`\n", entry.label, p.display()))
            }
            value => section.push_str(&format!("- **{}:** {}\n", entry.label, value)),
        }
    }
    section.push('\n');

    for entry in &m.metadata {
        if let MetadataValue::Markdown(md) = &entry.value {
            section.push_str(&format!("### {}\n\n{}\n\n", entry.label, md.trim_end()));
        }
    }

    section
}

/// Generate the report footer.
fn generate_footer() -> String {
    "---\n\n*Report generated by hnassets*\n".to_string()
}

/// Generate a JSON report.
pub fn generate_json_report(report: &RunReport) -> PipelineResult<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AssetKey, ItemRecord};
    use chrono::Utc;
    use serde_json::json;
    use std::path::PathBuf;

    fn item(title: &str, score: u64) -> ItemRecord {
        let mut record: ItemRecord =
            serde_json::from_value(json!({"score": score, "by": "pg"})).unwrap();
        record.title = Some(title.to_string());
        record
    }

    fn create_test_report() -> RunReport {
        RunReport {
            started_at: Utc::now(),
            duration_seconds: 2.5,
            data_dir: PathBuf::from("data"),
            materializations: vec![
                Materialization::new(AssetKey::Topstories)
                    .with_artifact(PathBuf::from("data/topstories.csv"))
                    .with_metadata("num_records", MetadataValue::Int(2))
                    .with_metadata("preview", MetadataValue::Markdown("| x |\n".to_string())),
                Materialization::new(AssetKey::MostFrequentWords)
                    .with_metadata("plot", MetadataValue::Markdown("![img](data:...)".to_string())),
            ],
        }
    }

    #[test]
    fn test_story_preview_limits_rows() {
        let table = StoryTable::new((0..8).map(|i| item(&format!("Story {}", i), i)).collect());
        let preview = story_preview(&table, PREVIEW_ROWS);

        let lines: Vec<&str> = preview.lines().collect();
        assert_eq!(lines.len(), 2 + PREVIEW_ROWS);
        assert_eq!(lines[0], "|    | title | by | score |");
        assert_eq!(lines[1], "|---:|:---|:---|---:|");
        assert_eq!(lines[2], "| 0 | Story 0 | pg | 0 |");
    }

    #[test]
    fn test_cells_are_escaped() {
        let table = StoryTable::new(vec![item("a | b\nc", 1)]);
        let preview = story_preview(&table, PREVIEW_ROWS);
        assert!(preview.contains("a \\| b c"));
    }

    #[test]
    fn test_empty_preview_has_header() {
        let preview = story_preview(&StoryTable::default(), PREVIEW_ROWS);
        assert_eq!(preview, "|    | title |\n|---:|:---|\n");
    }

    #[test]
    fn test_iris_preview() {
        let records = vec![IrisRecord {
            sepal_length_cm: 5.1,
            sepal_width_cm: 3.5,
            petal_length_cm: 1.4,
            petal_width_cm: 0.2,
            species: "Iris-setosa".to_string(),
        }];
        let preview = iris_preview(&records, PREVIEW_ROWS);
        assert!(preview.contains("| 0 | 5.1 | 3.5 | 1.4 | 0.2 | Iris-setosa |"));
    }

    #[test]
    fn test_generate_markdown_report() {
        let markdown = generate_markdown_report(&create_test_report());

        assert!(markdown.contains("# hnassets Run Report"));
        assert!(markdown.contains("- [topstories](#topstories)"));
        assert!(markdown.contains("## most_frequent_words"));
        assert!(markdown.contains("- **num_records:** 2"));
        assert!(markdown.contains("### plot"));
        assert!(markdown.contains("`data/topstories.csv`"));
    }

    #[test]
    fn test_generate_json_report() {
        let json = generate_json_report(&create_test_report()).unwrap();

        assert!(json.contains("\"materializations\""));
        assert!(json.contains("\"asset\": \"most_frequent_words\""));
        assert!(json.contains("\"type\": \"markdown\""));
    }
}
