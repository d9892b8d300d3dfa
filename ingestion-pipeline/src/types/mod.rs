pub mod record;
pub mod summary;
pub mod video;

pub use record::VideoRecord;
pub use summary::{EventDate, ExtractedSnippet, SummaryResponse};
pub use video::VideoMetadata;
