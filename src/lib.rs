//! Krishi irrigation dashboard.
//!
//! Subscribes to a realtime feed of soil and weather sensor records, keeps the
//! latest normalized reading with short trend histories, and derives an
//! irrigation recommendation for each record. The result is served as JSON
//! for a thin dashboard client.
//!
//! Modules follow the Explicit Module Boundary Pattern (EMBP): siblings import
//! each other through the re-exports below rather than by path.

pub mod config;
pub mod dashboard;
pub mod feed;
pub mod models;
pub mod recommend;
pub mod routes;
pub mod trend;
pub mod view;

pub use config::Config;
pub use dashboard::{DashboardEvent, DashboardSnapshot, FeedStatus};
pub use feed::{FeedClient, FeedError, Subscription};
pub use models::{Metric, RawSensorRecord, Sample, SensorReading, SENTINEL};
pub use recommend::{
    recommend, recommend_with, Recommendation, ADVISORY_ADEQUATE, ADVISORY_CRITICAL,
    ADVISORY_HEAT, ADVISORY_LOW, ADVISORY_RAIN,
};
pub use trend::{TrendBuffer, TrendPoint, Trends, TREND_CAPACITY};
pub use view::{charts, ChartSeries, DashboardView};
