pub mod cache;
pub mod input;
pub mod logging;
pub(crate) mod progress_bar_builder;

pub use cache::EmbeddingCache;
pub use input::read_text;
pub use logging::verbose_from_env;
