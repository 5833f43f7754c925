//! Report output: data previews, the word chart and run reports.

pub mod chart;
pub mod generator;

pub use chart::{default_title, encode_png, markdown_image, render_bar_chart, ChartOptions};
pub use generator::{generate_json_report, generate_markdown_report, iris_preview, story_preview};
