use std::io::Write;

use anyhow::Context;

use storefront_core::ProductId;
use storefront_inspect::{Step, replay};

fn main() -> anyhow::Result<()> {
    storefront_observability::init();

    let mut args = std::env::args().skip(1);
    let Some(path) = args.next() else {
        anyhow::bail!("usage: storefront-inspect <variations.json> [attribute=value | reset]...");
    };

    let product_id = match std::env::var("PRODUCT_ID") {
        Ok(raw) => raw.parse::<ProductId>()?,
        Err(_) => ProductId::new(0),
    };

    let steps = args
        .map(|raw| Step::parse(&raw))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let blob = std::fs::read_to_string(&path).with_context(|| format!("failed to read {path}"))?;
    tracing::info!(%product_id, path = %path, steps = steps.len(), "replaying selections");

    let reports = replay(product_id, &blob, &steps)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for report in &reports {
        serde_json::to_writer(&mut out, report)?;
        writeln!(out)?;
    }
    Ok(())
}
