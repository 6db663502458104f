//! Analyze command implementation.

use crate::cli::AnalyzeArgs;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use platewise_analyzer::{MealAnalyzer, MealType, PromptBuilder};
use platewise_vision::CredentialPool;
use tracing::debug;

/// Execute the analyze command.
pub async fn execute_analyze(args: AnalyzeArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let prompt = build_prompt(&args)?;

    let mut analyzer_config = config.analyzer.clone();
    if args.no_verify {
        analyzer_config.verify = false;
    }

    let analyzer = if args.demo {
        MealAnalyzer::demo(analyzer_config)
    } else {
        let pool = CredentialPool::from_config_and_env(&analyzer_config.vision.api_keys);
        debug!(credentials = pool.len(), "Loaded vision credentials");
        MealAnalyzer::from_config(analyzer_config, pool)?
    };

    let report = analyzer.analyze_file(&args.image, &prompt).await?;
    println!("{}", formatter.format_report(&report)?);

    Ok(())
}

/// Prompt carrying the user's meal category and notes
fn build_prompt(args: &AnalyzeArgs) -> Result<PromptBuilder> {
    let mut prompt = PromptBuilder::new();
    if let Some(meal) = args.meal.as_deref() {
        prompt = prompt.with_meal_type(parse_meal_type(meal)?);
    }
    if let Some(notes) = &args.notes {
        prompt = prompt.with_notes(notes.as_str());
    }
    Ok(prompt)
}

fn parse_meal_type(value: &str) -> Result<MealType> {
    MealType::parse(value).ok_or_else(|| {
        CliError::InvalidInput(format!(
            "Unknown meal type '{}'; use breakfast, lunch, dinner or snack",
            value
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_meal_type() {
        assert_eq!(parse_meal_type("Dinner").unwrap(), MealType::Dinner);
        assert!(matches!(parse_meal_type("elevenses"), Err(CliError::InvalidInput(_))));
    }

    fn args(meal: Option<&str>, notes: Option<&str>) -> AnalyzeArgs {
        AnalyzeArgs {
            image: "meal.jpg".into(),
            demo: true,
            no_verify: false,
            meal: meal.map(str::to_string),
            notes: notes.map(str::to_string),
        }
    }

    #[test]
    fn test_build_prompt_carries_hints() {
        let prompt = build_prompt(&args(Some("snack"), Some("two slices"))).unwrap().build();
        assert!(prompt.contains("logged this as snack"));
        assert!(prompt.contains("two slices"));

        let plain = build_prompt(&args(None, None)).unwrap().build();
        assert_eq!(plain, PromptBuilder::new().build());

        assert!(build_prompt(&args(Some("brunch"), None)).is_err());
    }
}
