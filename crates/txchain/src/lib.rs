pub mod arguments;
pub mod entries;

use {
    anyhow::{Context, Result},
    arguments::Arguments,
    sqlx::PgPool,
    txnode::{PgTransaction, TxNode},
};

/// Records every entry of `args` through one chain of operations sharing a
/// single transaction (unless disabled). The last operation commits.
pub async fn run(args: Arguments) -> Result<()> {
    let pool =
        PgPool::connect_lazy(args.db_url.as_str()).context("failed to create database pool")?;
    entries::create_table(&pool).await?;

    let mut node: TxNode<PgTransaction> = if args.no_transaction {
        TxNode::disabled()
    } else {
        TxNode::new()
    };
    let end = args.entries.len().saturating_sub(1);
    for (position, note) in args.entries.iter().enumerate() {
        if position == end {
            node.set_end();
        }
        // A missing note violates the table's NOT NULL constraint.
        let note = (args.fail_at != Some(position)).then_some(note.as_str());
        let position = i32::try_from(position).context("chain too long")?;
        entries::insert_entry(&mut node, &pool, position, note).await?;
        tracing::debug!(position, ?node, "recorded entry");
    }

    let stored = entries::count(&pool).await?;
    tracing::info!(chain = args.entries.len(), stored, "chain finished");
    Ok(())
}
