//! # Dispatcher
//!
//! 批量投递模块。
//!
//! 负责：
//! - 缓冲渲染后的行，按条数 / 时间触发 flush
//! - 下游过载时冷却到下一个 flush 窗口，其他失败固定延迟重试
//! - 只在批次被接收后提交 offset

pub mod backoff;
pub mod batch;
pub mod coordinator;
pub mod error;
pub mod metrics;
pub mod run_loop;
pub mod sinks;

#[cfg(test)]
mod test_support;

pub use backoff::Backoff;
pub use batch::{Batch, OffsetSpan};
pub use contracts::{BulkSink, FlushPolicy, RenderedRow, SendError};
pub use coordinator::{CoordinatorState, FlushCoordinator, FlushOutcome};
pub use error::DispatcherError;
pub use metrics::{FlushSnapshot, FlushStats};
pub use run_loop::{RunLoop, RunSummary};
pub use sinks::{ClickHouseSink, ConfiguredSink, LogSink, create_sink};
