use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CollectionError {
    #[error("missing argument: {0}")]
    InvalidArgument(&'static str),
    #[error("item with key {0} already exists")]
    AlreadyExists(String),
    #[error("no item with key {0}")]
    NotFound(String),
    #[error("offset {offset} is out of range for a destination of length {len}")]
    OutOfRange { offset: usize, len: usize },
    #[error("destination has room for {available} entries, {required} are required")]
    InsufficientCapacity { required: usize, available: usize },
}
