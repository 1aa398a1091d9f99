use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The node is neither in its initial state nor holding a transaction.
    /// Happens when a node is reused after its transaction was committed or
    /// rolled back.
    #[error("transaction args mismatch")]
    TransactionArgsMismatch,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl Error {
    pub fn is_misuse(&self) -> bool {
        matches!(self, Self::TransactionArgsMismatch)
    }
}
