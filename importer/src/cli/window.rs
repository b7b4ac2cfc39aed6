//! window subcommand
//!
//! Prints the minute buckets the next run would process.

use crate::config::ImportSettings;
use crate::dedup::bucket_key;
use crate::window::compute_window;

/// Execute the window command
pub fn execute(settings: &ImportSettings) -> Result<(), anyhow::Error> {
    let window = compute_window(settings.start_minutes_ago, settings.end_minutes_ago)?;
    let (from, to) = window.result_range_secs();
    println!(
        "{} bucket(s), results fetched from {} to {} (epoch seconds)",
        window.len(),
        from,
        to
    );
    for bucket in window.buckets() {
        println!("{}", bucket_key(*bucket));
    }
    Ok(())
}
