//! Handler 共用的辅助函数

pub mod params;
pub mod response;

pub use params::*;
pub use response::*;
