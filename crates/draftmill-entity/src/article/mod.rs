//! Article pipeline entity.

pub mod model;
pub mod progress;
pub mod stage;
pub mod store;

pub use model::Article;
pub use progress::StageProgress;
pub use stage::ArticleStage;
pub use store::ArticleStore;
