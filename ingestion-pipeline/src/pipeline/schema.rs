//! Property names and fixed values of the three data sources the pipeline writes to.

pub const STATUS: &str = "Status";
pub const ADDING_DATE: &str = "Adding Date";
pub const INBOX: &str = "Inbox";

pub mod entity {
    pub const NAME: &str = "Name";
    pub const ALIASES: &str = "Aliases";
}

pub mod media {
    pub const TITLE: &str = "Title";
    pub const MEDIA_TYPE: &str = "Media Type";
    pub const VIDEO: &str = "Video";
    pub const AUTHOR: &str = "Author/Creator";
    pub const URL: &str = "URL";
    pub const PUBLISHING_DATE: &str = "Publishing Date";
}

pub mod snippet {
    pub const CONTEXT: &str = "Context";
    pub const SOURCE: &str = "Source";
    pub const ENTITIES: &str = "Entities";
    pub const NOTE_TYPE: &str = "Note Type";
    pub const AUTOMATED_NOTE: &str = "Automated Note";
    pub const EVENT_DATE: &str = "Event Date";
    pub const START_DATE: &str = "Start Date";
    pub const END_DATE: &str = "End Date";

    /// Dropped on the second write attempt after the store rejects a snippet.
    pub const DEGRADABLE: &[&str] = &[START_DATE, END_DATE];
}
