//! List command implementation

use crate::output;
use anyhow::{Context, Result};
use cbench_framework::{Registry, TestCase};
use clap::Args;
use serde::Serialize;

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Only list tests whose name contains this text
    pub pattern: Option<String>,

    /// Also show arguments and predefined cases
    #[arg(short, long)]
    pub verbose: bool,

    /// Print the listing as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct ArgumentDescription {
    name: &'static str,
    description: &'static str,
    default: &'static str,
}

#[derive(Debug, Serialize)]
struct TestDescription {
    name: &'static str,
    description: &'static str,
    apis: Vec<String>,
    arguments: Vec<ArgumentDescription>,
    cases: Vec<&'static str>,
}

impl TestDescription {
    fn new(test: &dyn TestCase) -> Self {
        Self {
            name: test.name(),
            description: test.description(),
            apis: test.apis().iter().map(|api| api.to_string()).collect(),
            arguments: test
                .arguments()
                .iter()
                .map(|spec| ArgumentDescription {
                    name: spec.name,
                    description: spec.description,
                    default: spec.default,
                })
                .collect(),
            cases: test.cases().to_vec(),
        }
    }
}

fn describe(registry: &Registry, pattern: Option<&str>) -> Vec<TestDescription> {
    registry
        .iter()
        .filter(|test| pattern.map_or(true, |pattern| test.name().contains(pattern)))
        .map(TestDescription::new)
        .collect()
}

pub fn run(args: ListArgs) -> Result<()> {
    let registry = cbench_benchmarks::registry();
    let tests = describe(&registry, args.pattern.as_deref());

    if args.json {
        let json = serde_json::to_string_pretty(&tests).context("Failed to serialize test list")?;
        println!("{}", json);
        return Ok(());
    }

    if tests.is_empty() {
        output::warning("No tests match the given pattern");
        return Ok(());
    }

    output::info(&format!("{} test(s) registered", tests.len()));
    for test in &tests {
        println!();
        output::heading(test.name);
        println!("  {}", test.description);
        println!("  APIs: {}", test.apis.join(", "));
        if args.verbose {
            for argument in &test.arguments {
                output::item(
                    argument.name,
                    argument.description,
                    &format!("(default: {})", argument.default),
                );
            }
            for case in &test.cases {
                output::item("case", case, "");
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_filters_by_pattern() {
        let registry = cbench_benchmarks::registry();

        let all = describe(&registry, None);
        assert_eq!(all.len(), registry.len());

        let blits = describe(&registry, Some("MultipleBlits"));
        let names: Vec<&str> = blits.iter().map(|test| test.name).collect();
        assert_eq!(names, vec!["UsmCopyMultipleBlits", "UsmFillMultipleBlits"]);
        assert!(blits[0].arguments.iter().any(|arg| arg.name == "blitters"));
        assert_eq!(blits[0].apis, vec!["ocl", "l0", "host"]);
    }

    #[test]
    fn test_json_listing_shape() {
        let registry = cbench_benchmarks::registry();
        let tests = describe(&registry, Some("CopyBandwidth"));
        let json = serde_json::to_value(&tests).unwrap();
        assert_eq!(json[0]["name"], "CopyBandwidth");
        assert_eq!(json[0]["arguments"][0]["name"], "size");
        assert_eq!(json[0]["apis"][2], "host");
    }
}
