//! Observability
//!
//! Logging, metrics, and the structured event stream.

pub mod events;
pub mod logging;
pub mod metrics;

pub use events::{Event, EventEmitter, EventObserver, StopReason};
pub use logging::{LogFormat, LogTarget, init_logging};
pub use metrics::{MetricsObserver, init_metrics};
