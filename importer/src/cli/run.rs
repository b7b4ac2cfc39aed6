//! run subcommand
//!
//! Imports the configured window once.

use crate::importer::Importer;

/// Execute one import run
///
/// Returns an error naming every failed check if any check failed.
pub async fn execute(importer: &Importer) -> Result<(), anyhow::Error> {
    let report = importer.run().await?;
    let skipped = report.skipped.len();
    let processed = report.into_result()?;
    println!(
        "{} check(s) successfully processed ({} skipped).",
        processed, skipped
    );
    Ok(())
}
