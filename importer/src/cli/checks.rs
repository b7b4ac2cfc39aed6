//! checks subcommand
//!
//! Lists the remote checks and whether each one is eligible for import.

use crate::pingdom::CheckSource;

/// Execute the checks command
pub async fn execute(source: &dyn CheckSource) -> Result<(), anyhow::Error> {
    let checks = source.list_checks().await?;
    if checks.is_empty() {
        println!("No checks found");
        return Ok(());
    }

    println!("KEY\tRESOLUTION\tELIGIBLE");
    for check in checks {
        println!(
            "{}\t{}m\t{}",
            check.key(),
            check.resolution,
            if check.is_eligible() { "yes" } else { "no" }
        );
    }
    Ok(())
}
