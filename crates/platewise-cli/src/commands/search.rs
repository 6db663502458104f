//! Search command implementation.

use crate::cli::SearchArgs;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use platewise_catalog::{FoodDatabase, OpenFoodFactsClient};

/// Largest accepted `--limit`
const MAX_LIMIT: usize = 50;

/// Execute the search command.
pub async fn execute_search(args: SearchArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    validate_limit(args.limit)?;
    if args.query.trim().is_empty() {
        return Err(CliError::InvalidInput("Search query cannot be empty".to_string()));
    }

    let client = OpenFoodFactsClient::new(&config.analyzer.food_database)?;
    let products = client.search_by_name(&args.query, args.limit).await?;
    println!("{}", formatter.format_products(&products)?);

    Ok(())
}

fn validate_limit(limit: usize) -> Result<()> {
    if limit == 0 || limit > MAX_LIMIT {
        return Err(CliError::InvalidInput(format!(
            "Limit must be between 1 and {}",
            MAX_LIMIT
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_bounds() {
        assert!(validate_limit(1).is_ok());
        assert!(validate_limit(MAX_LIMIT).is_ok());
        assert!(validate_limit(0).is_err());
        assert!(validate_limit(MAX_LIMIT + 1).is_err());
    }
}
