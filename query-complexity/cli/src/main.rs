use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use anyhow::Result;
use clap::Parser;
use query_complexity::ComplexityLimit;
use query_complexity::ComplexityLimitConfig;
use query_complexity::ValidationError;
use query_complexity::calculator::operation_complexities;
use query_complexity::validation::parse_document;
use query_complexity::validation::validate;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

/// CLI arguments. See <https://docs.rs/clap/latest/clap/_derive/index.html>
#[derive(Parser)]
#[command(version, about)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Scores every operation of a query document and reports those over the limit
    Check {
        /// The path to the YAML complexity limit configuration
        #[arg(short, long)]
        config: PathBuf,
        /// The path to the query document, or `-` for stdin
        query: PathBuf,
    },
    /// Prints the JSON schema of the configuration file
    ConfigSchema,
}

#[derive(Debug, Serialize)]
struct OperationReport<'doc> {
    name: Option<&'doc str>,
    complexity: u64,
}

#[derive(Debug, Serialize)]
struct Report<'doc> {
    operations: Vec<OperationReport<'doc>>,
    errors: Vec<ValidationError>,
}

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    match args.command {
        Command::Check { config, query } => check(&config, &query),
        Command::ConfigSchema => {
            let schema = schemars::schema_for!(ComplexityLimitConfig);
            println!("{}", serde_json::to_string_pretty(&schema)?);
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        io::read_to_string(io::stdin()).context("could not read the query from stdin")
    } else {
        fs::read_to_string(path).with_context(|| format!("could not read {}", path.display()))
    }
}

fn check(config_path: &Path, query_path: &Path) -> Result<ExitCode> {
    let config = fs::read_to_string(config_path)
        .with_context(|| format!("could not read {}", config_path.display()))?;
    let config = ComplexityLimitConfig::from_yaml(&config)?;
    let limit = ComplexityLimit::new(config)?;
    tracing::debug!(?limit, "loaded complexity limit");

    let source = read_input(query_path)?;
    let document = parse_document(source, query_path)?;

    let report = Report {
        operations: operation_complexities(&document, limit.cost_settings())
            .into_iter()
            .map(|(name, complexity)| OperationReport { name, complexity })
            .collect(),
        errors: validate(&document, &[&limit]),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(if report.errors.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use insta::assert_json_snapshot;

    use super::*;

    fn write_file(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn check_passes_cheap_queries() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_file(&dir, "limits.yaml", "max_complexity: 5");
        let query = write_file(&dir, "query.graphql", "{ user { id name } }");
        assert_eq!(check(&config, &query).unwrap(), ExitCode::SUCCESS);
    }

    #[test]
    fn check_fails_expensive_queries() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_file(
            &dir,
            "limits.yaml",
            "max_complexity: 3\nfield_costs:\n  posts: 3\n",
        );
        let query = write_file(&dir, "query.graphql", "{ user { posts { id } } }");
        assert_eq!(check(&config, &query).unwrap(), ExitCode::FAILURE);
    }

    #[test]
    fn check_rejects_invalid_configuration() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_file(&dir, "limits.yaml", "max_complexity: 0");
        let query = write_file(&dir, "query.graphql", "{ a }");
        let error = check(&config, &query).unwrap_err();
        assert_eq!(error.to_string(), "max_complexity must be a positive integer");
    }

    #[test]
    fn check_rejects_unparsable_queries() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_file(&dir, "limits.yaml", "max_complexity: 5");
        let query = write_file(&dir, "query.graphql", "{ a ");
        assert!(check(&config, &query).is_err());
    }

    #[test]
    fn report_lists_operations() {
        let document = parse_document("query A { a { b } }\n{ c }", "query.graphql").unwrap();
        let limit = ComplexityLimit::new(ComplexityLimitConfig::new(10)).unwrap();
        let report = Report {
            operations: operation_complexities(&document, limit.cost_settings())
                .into_iter()
                .map(|(name, complexity)| OperationReport { name, complexity })
                .collect(),
            errors: validate(&document, &[&limit]),
        };
        assert_json_snapshot!(report, @r###"
        {
          "operations": [
            {
              "name": "A",
              "complexity": 2
            },
            {
              "name": null,
              "complexity": 1
            }
          ],
          "errors": []
        }
        "###);
    }
}
