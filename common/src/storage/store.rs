use async_trait::async_trait;
use thiserror::Error;

use super::types::{
    block::Block, filter::Filter, property::Properties, ParentRef, StoredRecord,
};

/// Errors surfaced by a record store.
///
/// `Validation` is kept apart from every other failure: callers retry a
/// rejected request shape, never a transport or server fault.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("record store rejected the request ({status}): {message}")]
    Validation { status: u16, message: String },
    #[error("record store returned {status}: {message}")]
    Http { status: u16, message: String },
    #[error("record store transport failure: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected record store response: {0}")]
    Decode(String),
}

impl StoreError {
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        if status == 400 {
            Self::Validation { status, message }
        } else {
            Self::Http { status, message }
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Returns every record of `data_source_id` matching `filter`.
    async fn query(
        &self,
        data_source_id: &str,
        filter: &Filter,
    ) -> Result<Vec<StoredRecord>, StoreError>;

    /// Creates one record under `parent` with `properties` and optional body `children`.
    async fn create_record(
        &self,
        parent: &ParentRef,
        properties: &Properties,
        children: &[Block],
    ) -> Result<StoredRecord, StoreError>;
}
