//! Concrete PostgreSQL store implementations.

pub mod article;
pub mod job;

pub use article::PgArticleStore;
pub use job::PgJobStore;
