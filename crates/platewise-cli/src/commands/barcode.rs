//! Barcode command implementation.

use crate::cli::BarcodeArgs;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use platewise_catalog::{FoodDatabase, OpenFoodFactsClient};

/// Execute the barcode command.
pub async fn execute_barcode(args: BarcodeArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let client = OpenFoodFactsClient::new(&config.analyzer.food_database)?;

    match client.lookup_barcode(&args.code).await? {
        Some(product) => println!("{}", formatter.format_products(&[product])?),
        None => println!("{}", formatter.warning(&format!("No product found for barcode {}", args.code.trim()))),
    }

    Ok(())
}
