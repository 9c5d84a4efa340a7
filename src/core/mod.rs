pub mod normalizer;
pub mod relay;
pub mod writer;

pub use crate::domain::model::{RecordBatch, SinkTarget, WriteReport};
pub use crate::domain::ports::{PrimaryStore, SpreadsheetSink, TokenProvider};
pub use crate::utils::error::Result;
