//! Background job entity.

pub mod model;
pub mod payload;
pub mod status;
pub mod store;

pub use model::{Job, NewJob};
pub use payload::JobPayload;
pub use status::JobStatus;
pub use store::JobStore;
