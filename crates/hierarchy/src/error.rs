use thiserror::Error;

pub type Result<T> = std::result::Result<T, HierarchyError>;

#[derive(Error, Debug)]
pub enum HierarchyError {
    #[error("invalid node id {0}: must be -1 (root) or non-negative")]
    InvalidId(i64),

    #[error("no {0} given for child lookup")]
    MissingNode(&'static str),

    #[error("feed parse error: {0}")]
    Feed(#[from] serde_json::Error),

    #[error("feed read error: {0}")]
    Io(#[from] std::io::Error),
}
