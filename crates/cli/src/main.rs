use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand};
use colored::Colorize;
use filter_state::{FilterCategory, FilterState, FilterValues, ItemValue, Record, filter_records};
use serde_json::Value;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// filter-items - Filter a JSON array of records by category selections
#[derive(Parser)]
#[command(name = "filter-items")]
#[command(about = "Case-insensitive substring filtering over JSON records", long_about = None)]
struct Cli {
    /// JSON file holding an array of records (reads stdin when omitted)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Selection as key=value; repeat a key to require several values
    #[arg(short, long = "filter", value_name = "KEY=VALUE")]
    filters: Vec<String>,

    /// JSON file with a selection mapping, e.g. {"name": ["jo"]}
    #[arg(short, long)]
    selections: Option<PathBuf>,

    /// Derived category as key=field1,field2 (fields joined with a space)
    #[arg(short, long = "category", value_name = "KEY=FIELDS")]
    categories: Vec<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the records that pass every selection
    Apply {
        /// Evaluate records in parallel
        #[arg(long)]
        parallel: bool,

        /// Print compact JSON instead of pretty-printed
        #[arg(long)]
        compact: bool,
    },

    /// Show how each selection key narrows the records
    Inspect,
}

fn main() -> Result<()> {
    // Logs go to stderr so stdout stays valid JSON
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let start = Instant::now();
    let records = load_records(cli.input.as_deref())?;
    tracing::info!("Loaded {} records in {:?}", records.len(), start.elapsed());

    let values = build_selections(cli.selections.as_deref(), &cli.filters)?;
    let categories = cli
        .categories
        .iter()
        .map(|spec| parse_category(spec))
        .collect::<Result<Vec<_>>>()?;

    let mut state = FilterState::for_records(records, categories);
    state.set_filter_values(values);

    match cli.command {
        Commands::Apply { parallel, compact } => handle_apply(&state, parallel, compact)?,
        Commands::Inspect => handle_inspect(&state),
    }

    Ok(())
}

/// Read the record array from a file, or stdin when no path is given.
fn load_records(path: Option<&Path>) -> Result<Vec<Value>> {
    let raw = match path {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read records from stdin")?;
            buf
        }
    };

    let parsed: Value = serde_json::from_str(&raw).context("Input is not valid JSON")?;
    match parsed {
        Value::Array(records) => Ok(records),
        other => bail!("Expected a JSON array of records, found {}", json_kind(&other)),
    }
}

/// Selections from the optional JSON file, then `--filter` pairs appended.
fn build_selections(path: Option<&Path>, pairs: &[String]) -> Result<FilterValues> {
    let mut values = match path {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            FilterValues::from_json(&raw)
                .with_context(|| format!("Invalid selection file {}", path.display()))?
        }
        None => FilterValues::new(),
    };

    for pair in pairs {
        values.push_pair(pair)?;
    }
    Ok(values)
}

/// Parse `key=field1,field2` into a category joining those record fields.
fn parse_category(spec: &str) -> Result<FilterCategory<Value>> {
    let (key, fields) = spec
        .split_once('=')
        .ok_or_else(|| anyhow!("Invalid category '{}': expected key=field1,field2", spec))?;

    let key = key.trim();
    let fields: Vec<String> = fields
        .split(',')
        .map(str::trim)
        .filter(|field| !field.is_empty())
        .map(str::to_string)
        .collect();

    if key.is_empty() || fields.is_empty() {
        bail!("Invalid category '{}': key and at least one field are required", spec);
    }

    Ok(FilterCategory::new(key, move |record: &Value| {
        let parts: Vec<String> = fields
            .iter()
            .map(|field| record.field(field))
            .filter(ItemValue::is_truthy)
            .map(|value| value.to_match_string())
            .collect();
        if parts.is_empty() {
            ItemValue::Absent
        } else {
            ItemValue::Text(parts.join(" "))
        }
    }))
}

/// Handle the 'apply' command
fn handle_apply(state: &FilterState<Value>, parallel: bool, compact: bool) -> Result<()> {
    let start = Instant::now();
    let filtered = if parallel {
        state.par_filtered_items()
    } else {
        state.filtered_items()
    };
    let elapsed = start.elapsed();

    let output = if compact {
        serde_json::to_string(&filtered)?
    } else {
        serde_json::to_string_pretty(&filtered)?
    };
    println!("{}", output);

    eprintln!(
        "{} {} of {} records matched in {:?}",
        "✓".green(),
        filtered.len().to_string().bold(),
        state.items().len(),
        elapsed
    );
    Ok(())
}

/// Handle the 'inspect' command
fn handle_inspect(state: &FilterState<Value>) {
    let values = state.filter_values();
    let total = state.items().len();

    eprintln!("{}", "Selections:".bold().blue());
    if !values.is_active() {
        eprintln!("  (no active filters, all {} records pass)", total);
        return;
    }

    for (key, selected) in values {
        let source = if state.category(key).is_some() {
            "category".green()
        } else {
            "field".yellow()
        };
        if selected.is_empty() {
            eprintln!("{}{} [{}] no constraint", "• ".green(), key, source);
            continue;
        }

        let single = FilterValues::new().with(key.as_str(), selected.iter().cloned());
        let matched = filter_records(state.items(), &single, state.categories()).len();
        eprintln!(
            "{}{} [{}] {:?} -> {} of {}",
            "• ".green(),
            key,
            source,
            selected,
            matched,
            total
        );
    }

    eprintln!(
        "{} {} of {} records pass all selections",
        "✓".green(),
        state.filtered_items().len().to_string().bold(),
        total
    );
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_category_joins_fields() {
        let category = parse_category("fullName=first, last").unwrap();
        assert_eq!(category.key(), "fullName");
        assert_eq!(
            category.value_of(&json!({"first": "Jo", "last": "Do"})),
            ItemValue::from("Jo Do")
        );
        assert_eq!(
            category.value_of(&json!({"last": "Do"})),
            ItemValue::from("Do")
        );
        assert_eq!(category.value_of(&json!({})), ItemValue::Absent);
    }

    #[test]
    fn test_parse_category_rejects_bad_specs() {
        assert!(parse_category("nofields").is_err());
        assert!(parse_category("=a,b").is_err());
        assert!(parse_category("key=").is_err());
    }

    #[test]
    fn test_build_selections_from_pairs() {
        let pairs = vec!["name=jo".to_string(), "name=do".to_string()];
        let values = build_selections(None, &pairs).unwrap();
        assert_eq!(values.get("name").map(<[String]>::len), Some(2));
        assert!(build_selections(None, &["broken".to_string()]).is_err());
    }
}
