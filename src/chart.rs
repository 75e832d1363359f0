use chrono::{Duration, NaiveDate};
use serde::Serialize;
use std::collections::BTreeSet;

use crate::aggregator::{AggregatedBucket, Granularity};
use crate::record::Method;

/// Summed volumes of one method, aligned with `ChartData::periods`
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Series {
    pub method: Method,
    pub values: Vec<u64>,
}

/// Everything a renderer needs for the stacked volume chart
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChartData {
    pub title: String,
    pub granularity: Granularity,
    /// Period starts, oldest first
    pub periods: Vec<NaiveDate>,
    /// One series per method present, in `Method` order
    pub series: Vec<Series>,
    /// Initially visible date range, `None` when there is no data
    pub window: Option<(NaiveDate, NaiveDate)>,
}

impl ChartData {
    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    /// Stacked height of period `index`
    pub fn period_total(&self, index: usize) -> u64 {
        self.series
            .iter()
            .filter_map(|s| s.values.get(index))
            .sum()
    }

    /// Indices of the periods inside the visible window
    pub fn visible_indices(&self) -> Vec<usize> {
        match self.window {
            Some((start, end)) => self
                .periods
                .iter()
                .enumerate()
                .filter(|(_, p)| **p >= start && **p <= end)
                .map(|(i, _)| i)
                .collect(),
            None => Vec::new(),
        }
    }
}

pub fn chart_title(granularity: Granularity) -> &'static str {
    match granularity {
        Granularity::Daily => "Volume journalier par méthode",
        Granularity::Weekly => "Volume hebdomadaire par méthode",
    }
}

/// Days shown before the latest period when the chart opens
pub fn window_days(granularity: Granularity) -> i64 {
    match granularity {
        Granularity::Daily => 15,
        Granularity::Weekly => 8 * 7,
    }
}

/// Pivot aggregated buckets into aligned per-method series.
///
/// Buckets may arrive in any order; periods without a given method get 0.
pub fn build_chart(buckets: &[AggregatedBucket], granularity: Granularity) -> ChartData {
    let mut periods: Vec<NaiveDate> = buckets.iter().map(|b| b.period_start).collect();
    periods.sort();
    periods.dedup();

    let methods: BTreeSet<&Method> = buckets.iter().map(|b| &b.method).collect();
    let series = methods
        .into_iter()
        .map(|method| {
            let mut values = vec![0u64; periods.len()];
            for bucket in buckets.iter().filter(|b| b.method == *method) {
                if let Ok(i) = periods.binary_search(&bucket.period_start) {
                    values[i] += bucket.volume_sum;
                }
            }
            Series {
                method: method.clone(),
                values,
            }
        })
        .collect();

    let window = periods
        .last()
        .map(|end| (*end - Duration::days(window_days(granularity)), *end));

    ChartData {
        title: chart_title(granularity).to_string(),
        granularity,
        periods,
        series,
        window,
    }
}

/// Pixel size of rendered charts
#[derive(Clone, Debug)]
pub struct ChartOptions {
    pub width: u32,
    pub height: u32,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 520,
        }
    }
}

#[cfg(feature = "web")]
mod render {
    use plotters::prelude::*;
    use std::path::Path;

    use super::{ChartData, ChartOptions};
    use crate::record::Method;

    fn method_color(method: &Method) -> RGBColor {
        match method {
            Method::Sonde => RGBColor(31, 119, 180),
            Method::Naturel => RGBColor(255, 127, 14),
            Method::Other(_) => RGBColor(127, 127, 127),
        }
    }

    /// Draw the visible window of `data` as stacked bars into a PNG at `path`
    pub fn render_png(
        data: &ChartData,
        options: &ChartOptions,
        path: &Path,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let visible = data.visible_indices();
        let labels: Vec<String> = visible
            .iter()
            .map(|i| data.periods[*i].format("%d/%m").to_string())
            .collect();
        let max_total = visible
            .iter()
            .map(|i| data.period_total(*i))
            .max()
            .unwrap_or(0)
            .max(100);

        let root = BitMapBackend::new(path, (options.width, options.height)).into_drawing_area();
        root.fill(&WHITE)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(&data.title, ("sans-serif", 30).into_font())
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(0f64..visible.len().max(1) as f64, 0f64..max_total as f64 * 1.1)?;

        let x_formatter = |x: &f64| {
            labels
                .get(x.floor() as usize)
                .cloned()
                .unwrap_or_default()
        };
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(visible.len().clamp(1, 16))
            .x_label_formatter(&x_formatter)
            .x_desc("Date")
            .y_desc("Volume total (mL)")
            .draw()?;

        let mut bottoms = vec![0u64; visible.len()];
        for series in &data.series {
            let color = method_color(&series.method);
            let bars: Vec<Rectangle<(f64, f64)>> = visible
                .iter()
                .enumerate()
                .map(|(x, i)| {
                    let low = bottoms[x];
                    let high = low + series.values[*i];
                    bottoms[x] = high;
                    Rectangle::new(
                        [(x as f64 + 0.15, low as f64), (x as f64 + 0.85, high as f64)],
                        color.filled(),
                    )
                })
                .collect();

            chart
                .draw_series(bars)?
                .label(series.method.as_str())
                .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
        }

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;

        root.present()?;
        Ok(())
    }

    /// Render to PNG bytes through a temporary file
    pub fn render_png_bytes(
        data: &ChartData,
        options: &ChartOptions,
    ) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
        let file = tempfile::Builder::new().suffix(".png").tempfile()?;
        render_png(data, options, file.path())?;
        Ok(std::fs::read(file.path())?)
    }
}

#[cfg(feature = "web")]
pub use render::{render_png, render_png_bytes};
