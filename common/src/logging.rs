//! Common logging initializer.
//!

use eyre::Result;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use tracing_tree::HierarchicalLayer;

/// Initialise `tracing` for a binary.
///
/// Filters come from `RUST_LOG` as usual.  With `use_tree` we get the
/// hierarchical per-span output, otherwise the plain fmt layer.
///
pub fn init_logging(use_tree: bool) -> Result<()> {
    // Load filters from environment
    //
    let filter = EnvFilter::from_default_env();

    // Do we want hierarchical output?
    //
    let tree = if use_tree {
        Some(
            HierarchicalLayer::new(2)
                .with_ansi(true)
                .with_span_retrace(true)
                .with_targets(true)
                .with_bracketed_fields(true),
        )
    } else {
        None
    };

    let fmt = if use_tree {
        None
    } else {
        Some(tracing_subscriber::fmt::layer())
    };

    // Combine filters & layers
    //
    tracing_subscriber::registry()
        .with(filter)
        .with(tree)
        .with(fmt)
        .init();

    Ok(())
}
