use {
    crate::{
        error::Error,
        log::ErrorLog,
        traits::{Database, Transaction},
    },
    std::fmt,
};

/// A node in a chain of operations sharing one transaction.
///
/// The node is threaded through the chain by `&mut`. It lazily begins the
/// transaction on the first prepared statement and commits it only from the
/// operation marked with [`TxNode::set_end`].
pub enum TxNode<T> {
    /// Passthrough mode. Every statement runs directly against the database
    /// and finalizing is a no-op.
    Disabled,
    Active(State<T>),
}

pub struct State<T> {
    started: bool,
    transaction: Option<T>,
    is_end: bool,
}

impl<T> TxNode<T> {
    /// A node ready to begin a transaction on its first prepared statement.
    pub fn new() -> Self {
        Self::Active(State {
            started: true,
            transaction: None,
            is_end: false,
        })
    }

    pub fn disabled() -> Self {
        Self::Disabled
    }

    /// Marks this point of the chain as the one committing the transaction.
    pub fn set_end(&mut self) {
        if let Self::Active(state) = self {
            state.is_end = true;
        }
    }

    pub fn unset_end(&mut self) {
        if let Self::Active(state) = self {
            state.is_end = false;
        }
    }

    pub fn is_disabled(&self) -> bool {
        matches!(self, Self::Disabled)
    }

    pub fn is_end(&self) -> bool {
        matches!(self, Self::Active(state) if state.is_end)
    }

    /// Whether the next prepared statement begins a new transaction.
    pub fn is_started(&self) -> bool {
        matches!(self, Self::Active(state) if state.started)
    }

    pub fn has_transaction(&self) -> bool {
        matches!(self, Self::Active(state) if state.transaction.is_some())
    }
}

impl<T: Transaction> TxNode<T> {
    /// Prepares `query` on the chain's transaction, beginning it on `db` if
    /// this is the first statement of the chain. A disabled node prepares
    /// directly on `db`.
    ///
    /// When beginning the transaction fails the node is left untouched. When
    /// the transaction was begun but preparing the statement fails, the
    /// transaction stays open: the caller has to roll it back on its error
    /// path.
    pub async fn prepare<D>(&mut self, db: &D, query: &str) -> Result<T::Statement, Error>
    where
        D: Database<Transaction = T, Statement = T::Statement>,
    {
        let state = match self {
            Self::Disabled => return Ok(db.prepare(query).await?),
            Self::Active(state) => state,
        };

        if state.started {
            let transaction = db.begin().await?;
            state.started = false;
            let transaction = state.transaction.insert(transaction);
            return Ok(transaction.prepare(query).await?);
        }

        match state.transaction.as_mut() {
            Some(transaction) => Ok(transaction.prepare(query).await?),
            None => Err(Error::TransactionArgsMismatch),
        }
    }

    /// Rolls back the transaction if one was begun. Any node of the chain may
    /// roll back, regardless of whether it is the end.
    pub async fn rollback(&mut self) -> Result<(), Error> {
        match self.take_transaction(|_| true) {
            Some(transaction) => Ok(transaction.rollback().await?),
            None => Ok(()),
        }
    }

    /// Commits the transaction if one was begun and this node is the end of
    /// the chain. Does nothing otherwise.
    pub async fn commit_if_needed(&mut self) -> Result<(), Error> {
        match self.take_transaction(|state| state.is_end) {
            Some(transaction) => Ok(transaction.commit().await?),
            None => Ok(()),
        }
    }

    /// Rolls back the transaction and reports both the rollback failure (if
    /// any) and `err` to `log`.
    ///
    /// The returned error is always `err` with `operation` as context. A
    /// failed rollback only shows up in the log.
    pub async fn rollback_and_report(
        &mut self,
        log: &dyn ErrorLog,
        operation: &str,
        err: impl Into<anyhow::Error>,
    ) -> anyhow::Error {
        let err = err.into();
        if let Err(rollback_err) = self.rollback().await {
            log.error(&format!("{operation}: rollback transaction: {rollback_err}"));
        }
        log.error(&format!("{operation}: {err}"));
        err.context(operation.to_owned())
    }

    /// The transaction statements of this node execute on, `None` in
    /// passthrough mode.
    pub(crate) fn executor(&mut self) -> Result<Option<&mut T>, Error> {
        match self {
            Self::Disabled => Ok(None),
            Self::Active(State {
                transaction: Some(transaction),
                ..
            }) => Ok(Some(transaction)),
            Self::Active(_) => Err(Error::TransactionArgsMismatch),
        }
    }

    fn take_transaction(&mut self, condition: impl Fn(&State<T>) -> bool) -> Option<T> {
        match self {
            Self::Active(state) if condition(state) => state.transaction.take(),
            _ => None,
        }
    }
}

impl<T> Default for TxNode<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for TxNode<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disabled => f.write_str("Disabled"),
            Self::Active(state) => f
                .debug_struct("Active")
                .field("started", &state.started)
                .field("transaction", &state.transaction.is_some())
                .field("is_end", &state.is_end)
                .finish(),
        }
    }
}
