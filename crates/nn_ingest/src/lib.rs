pub mod extract;
pub mod manager;
pub mod sources;

pub use extract::HtmlExtractor;
pub use manager::Pipeline;
pub use sources::RssFetcher;

pub mod prelude {
    pub use super::{HtmlExtractor, Pipeline, RssFetcher};
    pub use nn_core::{ArticleExtractor, FeedFetcher};
}
