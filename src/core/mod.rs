pub mod batch;
pub mod engine;
pub mod normalize;
pub mod source;
pub mod translate;

pub use crate::domain::model::{
    BatchReport, Operation, RecordError, SecretRecord, SourceOutcome, TabularRow,
};
pub use crate::domain::ports::{SecretStore, StoreStatus};
pub use crate::utils::error::Result;
