//! Chaining of SQL operations through one optional database transaction.
//!
//! A [`TxNode`] is created before a chain of operations starts and handed to
//! every operation by `&mut`. The first statement prepared through the node
//! begins the transaction, later statements reuse it and only the operation
//! marked as the end of the chain commits. Any operation may roll back.

pub mod error;
pub mod log;
pub mod node;
pub mod postgres;
pub mod traits;

pub use {
    error::Error,
    log::{ErrorLog, TracingLog},
    node::TxNode,
    postgres::PgTransaction,
    traits::{Database, Transaction},
};

// Design:
//
// Every operation of a chain takes `&mut TxNode<_>` next to the database
// handle. This allows callers to decide whether an operation runs as part of
// a bigger transaction (an active node shared by all operations) or
// standalone (`TxNode::disabled()`). Operations call `rollback` or
// `rollback_and_report` on their error path and `commit_if_needed` on
// success; the node makes sure that only the end of the chain commits.
//
// A node is never cloned since the transaction identity has to be preserved
// across the whole chain. Dropping a node that still owns an uncommitted
// transaction rolls it back.
