//! Bar chart rendering for word frequencies.
//!
//! Draws with plotters into an in-memory RGB buffer, then encodes the
//! buffer as PNG. Text uses the bundled DejaVu Sans face so rendering does
//! not depend on fonts installed on the host.

use crate::analysis::DEFAULT_TOP_K;
use crate::error::{PipelineError, PipelineResult};
use crate::models::WordFrequencyTable;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::{DynamicImage, ImageFormat, RgbImage};
use plotters::prelude::*;
use plotters::style::{register_font, FontStyle};
use std::io::Cursor;
use std::sync::OnceLock;

const FONT_FAMILY: &str = "sans-serif";
static FONT_BYTES: &[u8] = include_bytes!("../../assets/DejaVuSans.ttf");
static FONT_REGISTERED: OnceLock<Result<(), String>> = OnceLock::new();

const BAR: RGBColor = RGBColor(31, 119, 180);

const TITLE_SIZE: u32 = 24;
const LABEL_SIZE: u32 = 14;
const X_LABEL_AREA: u32 = 140;
const Y_LABEL_AREA: u32 = 60;
const TARGET_TICKS: u64 = 5;

/// Chart title for a top-`k` word table.
pub fn default_title(top_k: usize) -> String {
    format!("Top {} Words in Hacker News Titles", top_k)
}

/// Chart dimensions and title.
#[derive(Debug, Clone)]
pub struct ChartOptions {
    pub width: u32,
    pub height: u32,
    pub title: String,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 600,
            title: default_title(DEFAULT_TOP_K),
        }
    }
}

fn chart_error(err: impl std::fmt::Display) -> PipelineError {
    PipelineError::Chart(err.to_string())
}

fn register_embedded_font() -> PipelineResult<()> {
    FONT_REGISTERED
        .get_or_init(|| {
            register_font(FONT_FAMILY, FontStyle::Normal, FONT_BYTES)
                .map_err(|_| "bundled font is not a valid TrueType face".to_string())
        })
        .clone()
        .map_err(PipelineError::Chart)
}

/// Pick a tick step so the axis shows about five integer ticks.
fn tick_step(max: u64) -> u64 {
    max.div_ceil(TARGET_TICKS).max(1)
}

/// Axis maximum: the first multiple of `step` at or above `max`, at least one step.
fn axis_max(max: u64, step: u64) -> u64 {
    max.div_ceil(step).max(1) * step
}

/// Render the word frequencies as a bar chart.
///
/// One bar per token in table order, y axis with integer ticks, token
/// labels rotated under their bar.
pub fn render_bar_chart(words: &WordFrequencyTable, options: &ChartOptions) -> PipelineResult<RgbImage> {
    register_embedded_font()?;

    let (width, height) = (options.width, options.height);
    let mut buffer = vec![0u8; width as usize * height as usize * 3];
    let tokens: Vec<&str> = words.tokens().collect();
    let slots = tokens.len().max(1) as u32;
    let step = tick_step(words.max_count());
    let y_max = axis_max(words.max_count(), step);

    {
        let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(chart_error)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(&options.title, (FONT_FAMILY, TITLE_SIZE))
            .margin(15)
            .x_label_area_size(X_LABEL_AREA)
            .y_label_area_size(Y_LABEL_AREA)
            .build_cartesian_2d((0u32..slots).into_segmented(), 0u64..y_max)
            .map_err(chart_error)?;

        let label_style = (FONT_FAMILY, LABEL_SIZE)
            .into_font()
            .transform(FontTransform::Rotate90);

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(slots as usize)
            .x_label_formatter(&|value: &SegmentValue<u32>| match value {
                SegmentValue::CenterOf(i) => tokens
                    .get(*i as usize)
                    .map(|t| t.to_string())
                    .unwrap_or_default(),
                _ => String::new(),
            })
            .x_label_style(label_style)
            .y_labels((y_max / step + 1) as usize)
            .y_label_style((FONT_FAMILY, LABEL_SIZE))
            .draw()
            .map_err(chart_error)?;

        chart
            .draw_series(
                Histogram::vertical(&chart)
                    .style(BAR.filled())
                    .margin(4)
                    .data(words.0.iter().enumerate().map(|(i, (_, count))| (i as u32, *count))),
            )
            .map_err(chart_error)?;

        root.present().map_err(chart_error)?;
    }

    RgbImage::from_raw(width, height, buffer)
        .ok_or_else(|| PipelineError::Chart("pixel buffer does not match chart size".to_string()))
}

/// Encode an image as PNG bytes.
pub fn encode_png(img: &RgbImage) -> PipelineResult<Vec<u8>> {
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(img.clone()).write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

/// Wrap PNG bytes in an inline Markdown image.
pub fn markdown_image(png: &[u8]) -> String {
    format!("![img](data:image/png;base64,{})", STANDARD.encode(png))
}
