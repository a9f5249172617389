use camino::Utf8Path;
use plotters::prelude::*;

use crate::error::OraError;
use crate::labels::{DEFAULT_LABEL_WORDS, clean_label};
use crate::results::ResultsTable;

pub const PLOT_FILE_NAME: &str = "enrichment_plot.png";

const BAR_COLOR: RGBColor = RGBColor(0x19, 0x76, 0xD2);

/// One horizontal bar: cleaned term label and `-log10(adjusted p-value)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub label: String,
    pub value: f64,
}

/// Selects the `top` most significant records and lays them out bottom to top,
/// so the smallest adjusted p-value ends up last (drawn topmost).
pub fn prepare_bars(table: &ResultsTable, top: usize) -> Vec<Bar> {
    let mut bars: Vec<Bar> = table
        .top(top)
        .into_iter()
        .map(|record| Bar {
            label: clean_label(&record.term, DEFAULT_LABEL_WORDS),
            value: neg_log10(record.adjusted_p_value),
        })
        .collect();
    bars.reverse();
    bars
}

/// p-values of exactly zero are clamped so the bar stays finite.
pub fn neg_log10(p_value: f64) -> f64 {
    -p_value.max(f64::MIN_POSITIVE).log10()
}

pub trait ChartRenderer: Send + Sync {
    fn render(&self, bars: &[Bar], path: &Utf8Path) -> Result<(), OraError>;
}

#[derive(Debug, Clone)]
pub struct PngChartRenderer {
    pub width: u32,
    pub row_height: u32,
}

impl Default for PngChartRenderer {
    fn default() -> Self {
        Self {
            width: 1000,
            row_height: 60,
        }
    }
}

impl ChartRenderer for PngChartRenderer {
    fn render(&self, bars: &[Bar], path: &Utf8Path) -> Result<(), OraError> {
        if bars.is_empty() {
            return Err(OraError::Plot("no bars to draw".to_string()));
        }

        let rows = bars.len();
        let height = u32::try_from(rows)
            .ok()
            .and_then(|count| self.row_height.checked_mul(count))
            .and_then(|body| body.checked_add(120))
            .ok_or_else(|| OraError::Plot(format!("{rows} rows do not fit in one chart")))?;
        let longest_label = bars
            .iter()
            .map(|bar| bar.label.chars().count())
            .max()
            .unwrap_or(0);
        let label_area = (longest_label as u32 * 8 + 20).clamp(80, self.width / 2);
        let x_max = bars.iter().map(|bar| bar.value).fold(0.0, f64::max);
        let x_max = if x_max > 0.0 { x_max * 1.05 } else { 1.0 };
        let labels: Vec<&str> = bars.iter().map(|bar| bar.label.as_str()).collect();

        let root = BitMapBackend::new(path.as_std_path(), (self.width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(plot_error)?;

        let mut chart = ChartBuilder::on(&root)
            .caption("Most enriched categories", ("sans-serif", 22))
            .margin(15)
            .x_label_area_size(50)
            .y_label_area_size(label_area)
            .build_cartesian_2d(0f64..x_max, (0usize..rows).into_segmented())
            .map_err(plot_error)?;

        chart
            .configure_mesh()
            .disable_y_mesh()
            .y_labels(rows)
            .y_label_formatter(&|value: &SegmentValue<usize>| match value {
                SegmentValue::Exact(idx) | SegmentValue::CenterOf(idx) => {
                    labels.get(*idx).map(|label| label.to_string()).unwrap_or_default()
                }
                SegmentValue::Last => String::new(),
            })
            .x_desc("-log10(Adjusted P-value)")
            .axis_desc_style(("sans-serif", 16))
            .label_style(("sans-serif", 14))
            .draw()
            .map_err(plot_error)?;

        chart
            .draw_series(
                Histogram::horizontal(&chart)
                    .style(BAR_COLOR.filled())
                    .margin(6)
                    .data(bars.iter().enumerate().map(|(idx, bar)| (idx, bar.value))),
            )
            .map_err(plot_error)?;

        root.present().map_err(plot_error)?;
        Ok(())
    }
}

fn plot_error<E: std::fmt::Display>(err: E) -> OraError {
    OraError::Plot(err.to_string())
}
