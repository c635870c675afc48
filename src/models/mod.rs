// Domain models: collector wire format, windowed samples, latest values, render model

mod sample;
mod snapshot;
mod system;
mod view;

pub use sample::{NetworkSpeedSample, Sample, Timestamped};
pub use snapshot::{MONITORING_STOPPED_MESSAGE, RawProcess, RawSnapshot};
pub use system::{MonitoringState, NetworkTotals, ProcessInfo, SystemInfo};
pub use view::{ChartSeries, DashboardView, NetworkTotalsView, SystemInfoView};
