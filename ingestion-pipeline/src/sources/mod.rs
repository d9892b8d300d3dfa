pub mod summarizer;
pub mod youtube;

pub use summarizer::LlmSummarizer;
pub use youtube::YoutubeClient;
