//! Operations on the `txchain_entries` table. Each operation takes the node
//! of the chain it runs in.

use {
    anyhow::Result,
    sqlx::{PgPool, Statement as _, postgres::PgQueryResult},
    txnode::{PgTransaction, TracingLog, TxNode},
};

pub async fn create_table(pool: &PgPool) -> Result<()> {
    const QUERY: &str = r#"
CREATE TABLE IF NOT EXISTS txchain_entries (
    id BIGSERIAL PRIMARY KEY,
    chain_position INT NOT NULL,
    note TEXT NOT NULL
)
    "#;
    // Schema changes never join a chain.
    let mut node = TxNode::<PgTransaction>::disabled();
    let statement = node.prepare(pool, QUERY).await?;
    node.execute(pool, statement.query()).await?;
    Ok(())
}

/// Inserts one entry as part of the chain `node` belongs to. Commits the
/// chain if `node` is marked as its end, rolls it back on failure.
pub async fn insert_entry(
    node: &mut TxNode<PgTransaction>,
    pool: &PgPool,
    position: i32,
    note: Option<&str>,
) -> Result<()> {
    match try_insert_entry(node, pool, position, note).await {
        Ok(_) => Ok(node.commit_if_needed().await?),
        Err(err) => Err(node
            .rollback_and_report(&TracingLog, "insert_entry", err)
            .await),
    }
}

async fn try_insert_entry(
    node: &mut TxNode<PgTransaction>,
    pool: &PgPool,
    position: i32,
    note: Option<&str>,
) -> Result<PgQueryResult, txnode::Error> {
    const QUERY: &str = "INSERT INTO txchain_entries (chain_position, note) VALUES ($1, $2)";
    let statement = node.prepare(pool, QUERY).await?;
    node.execute(pool, statement.query().bind(position).bind(note))
        .await
}

pub async fn count(pool: &PgPool) -> Result<i64> {
    const QUERY: &str = "SELECT COUNT(*) FROM txchain_entries";
    Ok(sqlx::query_scalar::<_, i64>(QUERY).fetch_one(pool).await?)
}
