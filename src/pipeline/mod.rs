//! Request pipeline: one shared queue, a fixed worker pool and per-request
//! reply tickets that callers poll or wait on.

pub mod manager;
pub mod queue;
pub mod types;

pub use manager::Pipeline;
pub use queue::{RequestQueue, ResponseTable, Ticket};
pub use types::{CorrelationId, Request, RequestKind, Response};
