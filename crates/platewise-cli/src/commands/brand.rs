//! Brand command implementation.

use crate::cli::BrandArgs;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use platewise_analyzer::load_brand_table;

/// Execute the brand command.
pub fn execute_brand(args: BrandArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let table = load_brand_table(&config.analyzer)?;

    match table.lookup(&args.text) {
        Some(found) => println!("{}", formatter.format_brand_match(&found)?),
        None => println!(
            "{}",
            formatter.warning(&format!("No brand item matches '{}'", args.text))
        ),
    }

    Ok(())
}
