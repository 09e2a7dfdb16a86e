use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use serde_json::Value;

use crate::spec::{build_registry, load_and_build_registry, load_spec, SchemaRegistry};
use crate::validator::Validator;

/// Command-line interface for oasguard
///
/// Compiles OpenAPI documents into validator registries and checks
/// JSON payloads against the compiled schemas.
#[derive(Parser)]
#[command(name = "oasguard")]
#[command(about = "OpenAPI schema validator registry", long_about = None)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Compile a spec and report the validators it yields
    Check {
        /// Path to the OpenAPI specification file (YAML or JSON)
        #[arg(short, long)]
        spec: PathBuf,

        /// Report format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Validate a JSON payload against a compiled schema
    Validate {
        /// Path to the OpenAPI specification file (YAML or JSON)
        #[arg(short, long)]
        spec: PathBuf,

        /// Component schema name to validate against
        #[arg(long, conflicts_with_all = ["path", "method", "status"])]
        component: Option<String>,

        /// Path template of the operation (e.g. /pets/{id})
        #[arg(long, requires = "method")]
        path: Option<String>,

        /// HTTP method of the operation
        #[arg(long, requires = "path")]
        method: Option<String>,

        /// Response status code; validates that response body instead
        /// of the request body
        #[arg(long)]
        status: Option<u16>,

        /// JSON payload file (stdin when omitted)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
}

/// Report format for `check`
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Serialize)]
struct RegistrySummary {
    components: Vec<String>,
    operations: Vec<OperationSummary>,
}

#[derive(Serialize)]
struct OperationSummary {
    path: String,
    method: String,
    request_body: bool,
    responses: Vec<u16>,
}

/// Execute the CLI command provided by the user
///
/// # Errors
///
/// Returns an error if the spec cannot be loaded or compiled, the
/// payload cannot be read or parsed, or the selected schema does not
/// exist in the registry.
pub fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match &cli.command {
        Commands::Check { spec, format } => run_check(spec, *format),
        Commands::Validate {
            spec,
            component,
            path,
            method,
            status,
            input,
        } => run_validate(
            spec,
            component.as_deref(),
            path.as_deref(),
            method.as_deref(),
            *status,
            input.as_deref(),
        ),
    }
}

fn run_check(spec: &Path, format: OutputFormat) -> anyhow::Result<()> {
    let doc = load_spec(spec)?;
    let registry = build_registry(&doc)?;
    let summary = summarize(&registry);
    match format {
        OutputFormat::Text => {
            println!(
                "compiled {} component schema(s) and {} operation(s) from {}",
                summary.components.len(),
                summary.operations.len(),
                spec.display()
            );
            for name in &summary.components {
                println!("  component {name}");
            }
            for op in &summary.operations {
                let body = if op.request_body { " request-body" } else { "" };
                let statuses = if op.responses.is_empty() {
                    String::new()
                } else {
                    let codes: Vec<String> =
                        op.responses.iter().map(|s| s.to_string()).collect();
                    format!(" responses: {}", codes.join(", "))
                };
                println!("  {} {}{}{}", op.method, op.path, body, statuses);
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }
    Ok(())
}

/// Flatten the registry into a stable, sorted report.
fn summarize(registry: &SchemaRegistry) -> RegistrySummary {
    let mut components: Vec<String> = registry.components.keys().cloned().collect();
    components.sort();

    let mut operations = Vec::new();
    for (path, methods) in &registry.paths {
        for (method, op) in methods {
            let mut responses: Vec<u16> = op.responses.keys().copied().collect();
            responses.sort_unstable();
            operations.push(OperationSummary {
                path: path.clone(),
                method: method.to_string(),
                request_body: op.request_body.is_some(),
                responses,
            });
        }
    }
    operations.sort_by(|a, b| (&a.path, &a.method).cmp(&(&b.path, &b.method)));

    RegistrySummary {
        components,
        operations,
    }
}

fn run_validate(
    spec: &Path,
    component: Option<&str>,
    path: Option<&str>,
    method: Option<&str>,
    status: Option<u16>,
    input: Option<&Path>,
) -> anyhow::Result<()> {
    let registry = load_and_build_registry(spec)?;
    let validator = select_validator(&registry, component, path, method, status)?;
    let payload = read_payload(input)?;
    if validator.is_valid(&payload) {
        println!("valid");
        Ok(())
    } else {
        eprintln!("invalid: payload rejected by schema");
        std::process::exit(1);
    }
}

fn select_validator<'a>(
    registry: &'a SchemaRegistry,
    component: Option<&str>,
    path: Option<&str>,
    method: Option<&str>,
    status: Option<u16>,
) -> anyhow::Result<&'a Validator> {
    if let Some(name) = component {
        return registry
            .component(name)
            .ok_or_else(|| anyhow!("no component schema named {name:?} in the spec"));
    }
    let (path, method) = match (path, method) {
        (Some(p), Some(m)) => (p, m),
        _ => bail!("pass --component NAME, or --path and --method to pick an operation"),
    };
    let method: http::Method = method
        .to_uppercase()
        .parse()
        .map_err(|_| anyhow!("unrecognized HTTP method {method:?}"))?;
    let operation = registry
        .operation(path, &method)
        .ok_or_else(|| anyhow!("spec declares no {method} {path} operation"))?;
    match status {
        Some(code) => operation
            .response(code)
            .ok_or_else(|| anyhow!("operation declares no JSON body for status {code}")),
        None => operation
            .request_body
            .as_ref()
            .ok_or_else(|| anyhow!("operation declares no JSON request body")),
    }
}

fn read_payload(input: Option<&Path>) -> anyhow::Result<Value> {
    let content = match input {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };
    Ok(serde_json::from_str(&content)?)
}
