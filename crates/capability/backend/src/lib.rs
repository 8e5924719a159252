//! # Hydro Backend 模块
//!
//! 看板访问遥测后端 REST 接口的统一抽象。
//!
//! ## 模块说明
//!
//! - [`traits`]：`Backend` 接口（记录仪、读数、时序、配置、通知）
//! - [`error`]：后端访问错误类型
//! - [`http`]：基于 reqwest 的生产实现，另含认证代理调用
//! - [`in_memory`]：内存实现，记录调用次数与请求体，用于测试和本地演示
//!
//! ## 约束
//!
//! - 所有调用一次性执行，不做重试
//! - 认证 token 由外部管理，本模块不持有会话
//! - 时序接口按日期区间请求，区间裁剪仍由调用方再做一次
//!
//! ## 使用示例
//!
//! ```rust,ignore
//! use hydro_backend::{Backend, HttpBackend};
//!
//! let backend = HttpBackend::new("http://127.0.0.1:3000", None)?;
//! let loggers = backend.list_loggers().await?;
//! ```

pub mod error;
pub mod http;
pub mod in_memory;
pub mod traits;

pub use error::BackendError;
pub use http::HttpBackend;
pub use in_memory::InMemoryBackend;
pub use traits::Backend;
