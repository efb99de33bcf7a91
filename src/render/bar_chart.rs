use std::io::Cursor;

use image::{ImageFormat, RgbImage};
use plotters::coord::Shift;
use plotters::prelude::*;
use thiserror::Error;

use crate::processing::statistics::{GroupStats, StatsTable};
use crate::render::fonts::{ensure_chart_font, CHART_FONT_FAMILY};
use crate::render::theme::{bar_color, ChartTheme};

pub const CHART_WIDTH: u32 = 1000;
pub const CHART_HEIGHT: u32 = 600;

/// Width of one bar in x-axis units; a group spans one unit.
const BAR_WIDTH: f64 = 0.38;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("drawing failed: {0}")]
    Draw(String),
    #[error("pixel buffer does not match {width}x{height}")]
    Buffer { width: u32, height: u32 },
    #[error("JPEG encoding failed: {0}")]
    Encode(#[from] image::ImageError),
}

/// The statistics drawn as bars, in cluster order.
const SERIES: [(&str, fn(&GroupStats) -> f64); 2] = [("sum", bar_sum), ("mean", bar_mean)];

fn bar_sum(stats: &GroupStats) -> f64 {
    stats.sum
}

fn bar_mean(stats: &GroupStats) -> f64 {
    stats.mean.unwrap_or(0.0)
}

/// Render a clustered bar chart of sum and mean per group as JPEG bytes.
pub fn render_stats_chart(
    title: &str,
    table: &StatsTable,
    theme: ChartTheme,
) -> Result<Vec<u8>, RenderError> {
    let with_text = ensure_chart_font(None);

    let mut buffer = vec![0u8; (CHART_WIDTH * CHART_HEIGHT * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (CHART_WIDTH, CHART_HEIGHT))
            .into_drawing_area();
        draw_stats_chart(&root, title, table, theme, with_text)
            .map_err(|e| RenderError::Draw(e.to_string()))?;
    }

    let image = RgbImage::from_raw(CHART_WIDTH, CHART_HEIGHT, buffer).ok_or(RenderError::Buffer {
        width: CHART_WIDTH,
        height: CHART_HEIGHT,
    })?;
    let mut jpeg = Vec::new();
    image.write_to(&mut Cursor::new(&mut jpeg), ImageFormat::Jpeg)?;
    Ok(jpeg)
}

/// Y-axis range that always includes zero, padded by 10% of the span.
fn value_range(table: &StatsTable) -> (f64, f64) {
    let (min, max) = table
        .groups()
        .iter()
        .flat_map(|(_, s)| SERIES.iter().map(move |(_, value)| value(s)))
        .filter(|v| v.is_finite())
        .fold((0.0f64, 0.0f64), |(lo, hi), v| (lo.min(v), hi.max(v)));

    let padding = (max - min) * 0.1;
    let y_min = if min < 0.0 { min - padding } else { 0.0 };
    let y_max = if max > 0.0 { max + padding } else { 0.0 };
    if y_max - y_min <= f64::EPSILON {
        (y_min, y_min + 1.0)
    } else {
        (y_min, y_max)
    }
}

fn draw_stats_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    title: &str,
    table: &StatsTable,
    theme: ChartTheme,
    with_text: bool,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    root.fill(&theme.background())?;

    let groups = table.groups();
    let labels: Vec<&str> = table.labels().collect();
    let text_color = theme.text();
    let grid_color = theme.grid();
    let (y_min, y_max) = value_range(table);
    let x_max = groups.len().max(1) as f64 - 0.5;

    let mut builder = ChartBuilder::on(root);
    builder.margin(24);
    if with_text {
        builder
            .caption(title, (CHART_FONT_FAMILY, 28).into_font().color(&text_color))
            .x_label_area_size(48)
            .y_label_area_size(80);
    }
    let mut chart = builder.build_cartesian_2d(-0.5f64..x_max, y_min..y_max)?;

    if with_text {
        // Only whole x positions are group centres.
        let label_at = |x: &f64| {
            let idx = x.round();
            if (x - idx).abs() > 1e-6 || idx < 0.0 {
                return String::new();
            }
            labels
                .get(idx as usize)
                .map(|l| l.to_string())
                .unwrap_or_default()
        };
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(groups.len().max(1))
            .y_labels(10)
            .x_label_formatter(&label_at)
            .axis_style(ShapeStyle::from(&text_color))
            .light_line_style(ShapeStyle::from(&grid_color))
            .bold_line_style(ShapeStyle::from(&grid_color))
            .label_style((CHART_FONT_FAMILY, 14).into_font().color(&text_color))
            .draw()?;
    }

    for (series_idx, (name, value)) in SERIES.iter().copied().enumerate() {
        let color = bar_color(series_idx);
        let offset = series_idx as f64 * BAR_WIDTH - BAR_WIDTH;
        let bars = groups.iter().enumerate().map(move |(i, (_, stats))| {
            let v = value(stats);
            let top = if v.is_finite() { v } else { 0.0 };
            let x0 = i as f64 + offset;
            Rectangle::new([(x0, 0.0), (x0 + BAR_WIDTH, top)], color.filled())
        });
        let series = chart.draw_series(bars)?;
        if with_text {
            series.label(name).legend(move |(x, y)| {
                Rectangle::new([(x, y - 6), (x + 14, y + 6)], color.filled())
            });
        }
    }

    if with_text {
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(&theme.background().mix(0.85))
            .border_style(&text_color)
            .label_font((CHART_FONT_FAMILY, 14).into_font().color(&text_color))
            .draw()?;
    }

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{coerce_to_numeric, parse_csv, CURRENCY_MARKER};
    use crate::processing::statistics::group_stats;

    fn table(csv: &[u8]) -> StatsTable {
        let ds = parse_csv(csv, ",").unwrap();
        let values = coerce_to_numeric(&ds.column("Amount").unwrap().cells, CURRENCY_MARKER).unwrap();
        group_stats(ds.column("Zeitindex").unwrap(), &values)
    }

    fn is_jpeg(bytes: &[u8]) -> bool {
        bytes.starts_with(&[0xFF, 0xD8, 0xFF])
    }

    #[test]
    fn renders_a_jpeg() {
        let t = table(b"PID,Zeitindex,Amount\n1,t1,10\n1,t1,20\n2,t2,5\n");
        let jpeg = render_stats_chart("Amount Sum and Mean", &t, ChartTheme::Light).unwrap();
        assert!(is_jpeg(&jpeg));
        let decoded = image::load_from_memory(&jpeg).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (CHART_WIDTH, CHART_HEIGHT));
    }

    #[test]
    fn renders_negative_values_and_dark_theme() {
        let t = table(b"PID,Zeitindex,Amount\n1,a,-3\n1,b,7\n");
        let jpeg = render_stats_chart("Amount Sum and Mean", &t, ChartTheme::Dark).unwrap();
        assert!(is_jpeg(&jpeg));
    }

    #[test]
    fn renders_an_empty_table() {
        let jpeg = render_stats_chart("Empty Sum and Mean", &StatsTable::default(), ChartTheme::Light)
            .unwrap();
        assert!(is_jpeg(&jpeg));
    }

    #[test]
    fn range_includes_zero_and_pads() {
        let t = table(b"PID,Zeitindex,Amount\n1,a,10\n");
        assert_eq!(value_range(&t), (0.0, 11.0));
        assert_eq!(value_range(&StatsTable::default()), (0.0, 1.0));
    }
}
