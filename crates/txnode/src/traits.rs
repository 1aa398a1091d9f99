//! Trait definitions for the database boundary.
//!
//! These traits abstract the database handle and its transactions so the
//! node can be unit tested with mocks. The Postgres implementations live in
//! [`crate::postgres`].

/// A handle to the database that statements can be prepared on directly or
/// that can begin a transaction.
#[cfg_attr(
    test,
    mockall::automock(type Statement = String; type Transaction = MockTransaction;)
)]
#[async_trait::async_trait]
pub trait Database: Send + Sync {
    type Statement: Send;
    type Transaction: Transaction<Statement = Self::Statement>;

    /// Prepares a statement outside of any transaction.
    async fn prepare(&self, query: &str) -> Result<Self::Statement, sqlx::Error>;

    async fn begin(&self) -> Result<Self::Transaction, sqlx::Error>;
}

/// An open transaction. Committing or rolling back consumes it.
#[cfg_attr(test, mockall::automock(type Statement = String;))]
#[async_trait::async_trait]
pub trait Transaction: Send + Sized {
    type Statement: Send;

    async fn prepare(&mut self, query: &str) -> Result<Self::Statement, sqlx::Error>;

    async fn commit(self) -> Result<(), sqlx::Error>;

    async fn rollback(self) -> Result<(), sqlx::Error>;
}
