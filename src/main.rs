//! Builds a small range-sum tree, queries it, applies a point update and
//! queries it again.
//!
//! Set `RUST_LOG=debug` (or `trace`) to also see the tree's own events.

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use implicit_segment_tree::SumTree;

fn main() -> Result<()> {
    init_logging();

    info!("Segment tree implementation for range based queries");

    let values = [1, 3, 5, 7, 9, 11];
    let mut tree = SumTree::new(&values).context("failed to build segment tree")?;
    info!("{:?}", tree.nodes());
    info!("Sum of values in range [1, 3]: {}", tree.query(1, 3));

    tree.update(2, 10).context("failed to update segment tree")?;
    info!("Tree after update: {:?}", tree.nodes());
    info!(
        "After update => sum of values in range [1, 3]: {}",
        tree.query(1, 3)
    );

    print!("{}", tree);
    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
