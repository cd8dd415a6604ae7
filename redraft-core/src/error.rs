use crate::objects::ObjectId;
use crate::state::Axis;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PdfError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unknown object identifier: {0}")]
    UnknownIdentifier(ObjectId),

    #[error("Object identifier {0} was retired by a rollback")]
    RetiredIdentifier(ObjectId),

    #[error("Object identifier {0} was allocated but never written")]
    UnresolvedReference(ObjectId),

    #[error("Object {id} is not a {expected}")]
    UnexpectedRecord { id: ObjectId, expected: &'static str },

    #[error("Object {from} references {to}, which is not a live object")]
    DanglingReference { from: ObjectId, to: ObjectId },

    #[error("Transaction misuse: {0}")]
    TransactionMisuse(String),

    #[error("State stack underflow on axis {0:?}")]
    StateStackUnderflow(Axis),

    #[error("Document has no current page")]
    NoCurrentPage,

    #[error("Invalid page number: {0}")]
    InvalidPageNumber(u32),

    #[error("Invalid PDF structure: {0}")]
    InvalidStructure(String),

    #[cfg(feature = "serde")]
    #[error("Invalid options: {0}")]
    InvalidOptions(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PdfError>;
