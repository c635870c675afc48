// Chart projection: history window -> labels + values

use crate::buffer::SampleBuffer;
use crate::models::{ChartSeries, Timestamped};

/// Projects a window into a chart series: one label (display time) and one
/// value per retained sample, oldest first. No smoothing is applied.
pub fn build_series<T, F>(buffer: &SampleBuffer<T>, label: &str, value: F) -> ChartSeries
where
    T: Timestamped,
    F: Fn(&T) -> f64,
{
    let (labels, values) = buffer
        .iter()
        .map(|sample| (sample.timestamp().to_string(), value(sample)))
        .unzip();
    ChartSeries {
        label: label.to_string(),
        labels,
        values,
    }
}
