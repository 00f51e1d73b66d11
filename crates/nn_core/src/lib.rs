pub mod error;
pub mod providers;
pub mod store;
pub mod types;

pub use error::Error;
pub use providers::{ArticleExtractor, FeedFetcher, SpeechSynthesizer, Summarizer};
pub use store::RecordStore;
pub use types::{Article, NewSummary, Settings, SummaryRecord, TtsProvider, Voice};

pub type Result<T> = std::result::Result<T, Error>;

pub mod prelude {
    pub use super::{Article, Error, RecordStore, Result, Settings};
}
