use {
    crate::{
        error::Error,
        node::TxNode,
        traits::{Database, Transaction},
    },
    sqlx::{
        PgPool,
        Postgres,
        postgres::{PgArguments, PgQueryResult, PgStatement},
        query::Query,
    },
};

pub type PgTransaction = sqlx::Transaction<'static, Postgres>;

#[async_trait::async_trait]
impl Database for PgPool {
    type Statement = PgStatement<'static>;
    type Transaction = PgTransaction;

    async fn prepare(&self, query: &str) -> Result<Self::Statement, sqlx::Error> {
        let statement = sqlx::Executor::prepare(self, query).await?;
        Ok(sqlx::Statement::to_owned(&statement))
    }

    async fn begin(&self) -> Result<Self::Transaction, sqlx::Error> {
        sqlx::Pool::begin(self).await
    }
}

#[async_trait::async_trait]
impl Transaction for PgTransaction {
    type Statement = PgStatement<'static>;

    async fn prepare(&mut self, query: &str) -> Result<Self::Statement, sqlx::Error> {
        let statement = sqlx::Executor::prepare(&mut **self, query).await?;
        Ok(sqlx::Statement::to_owned(&statement))
    }

    async fn commit(self) -> Result<(), sqlx::Error> {
        sqlx::Transaction::commit(self).await
    }

    async fn rollback(self) -> Result<(), sqlx::Error> {
        sqlx::Transaction::rollback(self).await
    }
}

impl TxNode<PgTransaction> {
    /// Executes `query` where the node routes statements to: directly on
    /// `pool` in passthrough mode, on the chain's transaction otherwise.
    ///
    /// Postgres statements are not tied to the connection they were prepared
    /// on, so queries built from statements returned by [`TxNode::prepare`]
    /// have to be executed through here to stay inside the transaction. An
    /// active node that has not begun its transaction (or already finished
    /// it) fails with [`Error::TransactionArgsMismatch`].
    pub async fn execute(
        &mut self,
        pool: &PgPool,
        query: Query<'_, Postgres, PgArguments>,
    ) -> Result<PgQueryResult, Error> {
        let result = match self.executor()? {
            Some(transaction) => query.execute(&mut **transaction).await?,
            None => query.execute(pool).await?,
        };
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use {super::*, sqlx::Statement as _};

    const CREATE_TABLE: &str =
        "CREATE TABLE IF NOT EXISTS txnode_tests (chain TEXT NOT NULL, position INT NOT NULL)";
    const INSERT: &str = "INSERT INTO txnode_tests (chain, position) VALUES ($1, $2)";

    async fn connect(chain: &str) -> PgPool {
        let pool = PgPool::connect("postgresql://").await.unwrap();
        sqlx::query(CREATE_TABLE).execute(&pool).await.unwrap();
        sqlx::query("DELETE FROM txnode_tests WHERE chain = $1")
            .bind(chain)
            .execute(&pool)
            .await
            .unwrap();
        pool
    }

    async fn count(pool: &PgPool, chain: &str) -> i64 {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM txnode_tests WHERE chain = $1")
            .bind(chain)
            .fetch_one(pool)
            .await
            .unwrap()
    }

    async fn insert(node: &mut TxNode<PgTransaction>, pool: &PgPool, chain: &str, position: i32) {
        let statement = node.prepare(pool, INSERT).await.unwrap();
        node.execute(pool, statement.query().bind(chain).bind(position))
            .await
            .unwrap();
    }

    #[tokio::test]
    #[ignore]
    async fn postgres_chain_commits_at_end() {
        let pool = connect("commit").await;
        let mut node = TxNode::new();

        insert(&mut node, &pool, "commit", 0).await;
        node.commit_if_needed().await.unwrap();
        node.set_end();
        insert(&mut node, &pool, "commit", 1).await;
        assert_eq!(count(&pool, "commit").await, 0);

        node.commit_if_needed().await.unwrap();
        assert_eq!(count(&pool, "commit").await, 2);
    }

    #[tokio::test]
    #[ignore]
    async fn postgres_chain_rolls_back() {
        let pool = connect("rollback").await;
        let mut node = TxNode::new();

        insert(&mut node, &pool, "rollback", 0).await;
        let err = node.prepare(&pool, "INSERT INTO missing_table VALUES (1)").await;
        assert!(err.is_err());
        node.rollback().await.unwrap();

        assert_eq!(count(&pool, "rollback").await, 0);
    }

    #[tokio::test]
    #[ignore]
    async fn postgres_disabled_node_autocommits() {
        let pool = connect("disabled").await;
        let mut node = TxNode::disabled();

        insert(&mut node, &pool, "disabled", 0).await;
        node.rollback().await.unwrap();

        assert_eq!(count(&pool, "disabled").await, 1);
    }
}
