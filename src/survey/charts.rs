// Chart rendering with plotters. Everything here is presentation: the
// bar and line data arrive already ordered and colored by the library.

use chrono::Duration;
use log::info;
use plotters::prelude::*;
use snafu::prelude::*;

use party_rating::{party_color, PartyMean, TimeSeries};

use crate::survey::SurveyResult;

const CHART_SIZE: (u32, u32) = (1200, 600);
const LEGEND_WIDTH: u32 = 200;

fn rgb(c: (u8, u8, u8)) -> RGBColor {
    RGBColor(c.0, c.1, c.2)
}

/// Legend entries for the line chart, one per column in column order.
fn legend_rows(series: &TimeSeries) -> Vec<(String, (u8, u8, u8))> {
    series
        .columns
        .iter()
        .map(|c| (c.party.clone(), party_color(&c.party)))
        .collect()
}

/// One bar per category in canonical order, canonical color, with the
/// one-decimal percentage above each bar. The y-axis tops out at 1.15
/// times the tallest bar.
pub fn draw_bar_chart(means: &[PartyMean], path: &str) -> SurveyResult<()> {
    let max = means.iter().map(|m| m.mean).fold(0.0f64, f64::max);
    let y_max = if max > 0.0 { max * 1.15 } else { 1.0 };

    let res = (|| -> Result<(), Box<dyn std::error::Error>> {
        let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE)?;
        let mut chart = ChartBuilder::on(&root)
            .caption("政党別 平均支持率", ("sans-serif", 30))
            .margin(10)
            .x_label_area_size(60)
            .y_label_area_size(50)
            .build_cartesian_2d((0usize..means.len()).into_segmented(), 0f64..y_max)?;
        chart
            .configure_mesh()
            .x_labels(means.len())
            .x_label_formatter(&|seg| match seg {
                SegmentValue::CenterOf(i) | SegmentValue::Exact(i) => means
                    .get(*i)
                    .map(|m| m.party.clone())
                    .unwrap_or_default(),
                _ => String::new(),
            })
            .y_desc("支持率（％）")
            .draw()?;

        for (idx, m) in means.iter().enumerate() {
            let color = rgb(party_color(&m.party));
            chart.draw_series(std::iter::once(Rectangle::new(
                [
                    (SegmentValue::Exact(idx), 0.0),
                    (SegmentValue::Exact(idx + 1), m.mean),
                ],
                color.filled(),
            )))?;
            chart.draw_series(std::iter::once(Text::new(
                format!("{:.1}%", m.mean),
                (SegmentValue::CenterOf(idx), m.mean),
                ("sans-serif", 14),
            )))?;
        }
        root.present()?;
        Ok(())
    })();
    if let Err(e) = res {
        whatever!("failed to render the bar chart {}: {}", path, e);
    }
    info!("draw_bar_chart: wrote {}", path);
    Ok(())
}

/// One line per selected category, drawn in canonical order with the
/// canonical color, dates on the x-axis and a grid mesh. The legend is
/// drawn in a band to the right of the plot, clear of the data.
pub fn draw_line_chart(series: &TimeSeries, path: &str) -> SurveyResult<()> {
    let y_max = series.max_value().unwrap_or(1.0) * 1.1;
    let (mut min_date, mut max_date) = match (series.dates.first(), series.dates.last()) {
        (Some(first), Some(last)) => (*first, *last),
        _ => whatever!("cannot draw a line chart from an empty time series"),
    };
    if min_date == max_date {
        // A single survey day still needs a non-degenerate axis.
        min_date = min_date - Duration::days(1);
        max_date = max_date + Duration::days(1);
    }

    let res = (|| -> Result<(), Box<dyn std::error::Error>> {
        let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE)?;
        let (plot_area, legend_area) =
            root.split_horizontally((CHART_SIZE.0 - LEGEND_WIDTH) as i32);
        let mut chart = ChartBuilder::on(&plot_area)
            .caption("政党別 支持率の推移", ("sans-serif", 30))
            .margin(10)
            .x_label_area_size(50)
            .y_label_area_size(50)
            .build_cartesian_2d(min_date..max_date, 0f64..y_max)?;
        chart
            .configure_mesh()
            .x_desc("調査日")
            .y_desc("支持率（%）")
            .x_label_formatter(&|d| d.format("%Y-%m-%d").to_string())
            .draw()?;

        for col in series.columns.iter() {
            let color = rgb(party_color(&col.party));
            let points: Vec<_> = series
                .dates
                .iter()
                .zip(col.values.iter())
                .filter_map(|(d, v)| v.map(|v| (*d, v)))
                .collect();
            chart.draw_series(LineSeries::new(points, color.stroke_width(2)))?;
        }

        for (idx, (party, color)) in legend_rows(series).into_iter().enumerate() {
            let y = 60 + idx as i32 * 26;
            let color = rgb(color);
            legend_area.draw(&PathElement::new(
                vec![(10, y), (40, y)],
                color.stroke_width(2),
            ))?;
            legend_area.draw(&Text::new(party, (48, y - 8), ("sans-serif", 16)))?;
        }
        root.present()?;
        Ok(())
    })();
    if let Err(e) = res {
        whatever!("failed to render the line chart {}: {}", path, e);
    }
    info!("draw_line_chart: wrote {}", path);
    Ok(())
}
