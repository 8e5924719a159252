//! Handlers 模块

pub mod health;
pub mod loggers;
pub mod metrics;
pub mod notifications;
pub mod reports;

pub use health::*;
pub use loggers::*;
pub use metrics::*;
pub use notifications::*;
pub use reports::*;
