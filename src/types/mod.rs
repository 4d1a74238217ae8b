//! Core data model for retrieval and synthesis

pub mod item;
pub mod query;
pub mod response;

pub use item::{ExcerptItem, LocationAnchor, RetrievedItem, SummaryItem};
pub use query::{AnswerRequest, ChatRole, ChatTurn};
pub use response::{AnswerResponse, SourceRecord, TimeSegment};
