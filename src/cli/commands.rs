use crate::logging::{init_logging, LogConfig};
use crate::router::{score, PathResolution, PathResolver};
use crate::runtime_config::ResolverConfig;
use crate::spec::load_contract;
use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use http::Method;
use serde_json::json;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

/// Command-line interface for oaspath
///
/// Resolves request URLs against an OpenAPI contract and inspects how its
/// path templates will be matched.
#[derive(Parser, Debug)]
#[command(name = "oaspath")]
#[command(about = "OpenAPI request path resolution", long_about = None, version)]
pub struct Cli {
    /// Debug-level pretty logs with source locations (otherwise OASPATH_LOG_*, default warn)
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve request URLs to path templates
    Resolve {
        /// Path to the OpenAPI contract (YAML or JSON)
        #[arg(short, long)]
        spec: PathBuf,

        /// HTTP method of the requests
        #[arg(short = 'X', long, default_value = "GET")]
        method: String,

        /// Print results as JSON
        #[arg(long, default_value_t = false)]
        json: bool,

        /// Request URLs, absolute (`https://host/base/pets/1`) or origin-form (`/pets/1`)
        #[arg(required = true, num_args = 1..)]
        urls: Vec<String>,
    },
    /// List path templates in declaration order with their specificity
    Routes {
        /// Path to the OpenAPI contract (YAML or JSON)
        #[arg(short, long)]
        spec: PathBuf,
    },
    /// Report path templates that can never match
    Check {
        /// Path to the OpenAPI contract (YAML or JSON)
        #[arg(short, long)]
        spec: PathBuf,

        /// Exit with error code if any malformed template is found
        #[arg(long, default_value_t = false)]
        fail_on_error: bool,
    },
}

/// Parse arguments, initialise logging and run the selected command.
pub fn run_cli() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    init_logging(&log_config(cli.verbose))?;

    let stdout = io::stdout();
    let ok = execute(&cli, &mut stdout.lock())?;
    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

/// Logging for a CLI run: the development profile under `--verbose`,
/// otherwise the environment with `warn` unless a level is set.
pub(crate) fn log_config(verbose: bool) -> LogConfig {
    if verbose {
        return LogConfig::default_dev();
    }
    let mut config = LogConfig::from_env();
    if std::env::var_os("OASPATH_LOG_LEVEL").is_none() {
        config.log_level = "warn".to_string();
    }
    config
}

/// Run a parsed command, writing its report to `out`.
///
/// Returns `false` when the command found failures that should produce a
/// non-zero exit status.
pub fn execute(cli: &Cli, out: &mut impl Write) -> anyhow::Result<bool> {
    match &cli.command {
        Commands::Resolve {
            spec,
            method,
            json,
            urls,
        } => {
            let method = parse_method(method)?;
            let resolver = build_resolver(spec, ResolverConfig::from_env())?;
            let resolutions: Vec<(&String, PathResolution)> = urls
                .iter()
                .map(|url| (url, resolver.resolve(&method, url)))
                .collect();

            if *json {
                let report: Vec<_> = resolutions
                    .iter()
                    .map(|(url, resolution)| {
                        json!({
                            "method": method.as_str(),
                            "url": url,
                            "matched": resolution.is_match(),
                            "template": resolution.matched_template,
                            "engine": resolution.engine,
                            "errors": resolution.errors,
                        })
                    })
                    .collect();
                serde_json::to_writer_pretty(&mut *out, &report)?;
                writeln!(out)?;
            } else {
                for (url, resolution) in &resolutions {
                    write_resolution(out, &method, url, resolution)?;
                }
            }

            Ok(resolutions.iter().all(|(_, r)| r.is_match()))
        }
        Commands::Routes { spec } => {
            let resolver = build_resolver(spec, ResolverConfig::from_env())?;
            write_routes(out, &resolver)?;
            Ok(true)
        }
        Commands::Check {
            spec,
            fail_on_error,
        } => {
            let config = ResolverConfig {
                precompile: true,
                ..ResolverConfig::from_env()
            };
            let resolver = build_resolver(spec, config)?;
            let malformed = resolver.malformed_templates();
            if malformed.is_empty() {
                writeln!(
                    out,
                    "✅ {} templates, none malformed",
                    resolver.templates().count()
                )?;
            } else {
                for entry in malformed {
                    writeln!(out, "❌ {}: {}", entry.template, entry.error)?;
                }
                writeln!(
                    out,
                    "{} of {} templates will never match",
                    malformed.len(),
                    resolver.templates().count()
                )?;
            }
            Ok(!(*fail_on_error && !malformed.is_empty()))
        }
    }
}

fn parse_method(method: &str) -> anyhow::Result<Method> {
    Method::from_bytes(method.to_ascii_uppercase().as_bytes())
        .map_err(|e| anyhow!("invalid HTTP method '{method}': {e}"))
}

fn build_resolver(spec: &Path, config: ResolverConfig) -> anyhow::Result<PathResolver> {
    let contract = load_contract(spec)?;
    PathResolver::with_config(Arc::new(contract), config)
        .with_context(|| format!("building resolver for {}", spec.display()))
}

fn write_resolution(
    out: &mut impl Write,
    method: &Method,
    url: &str,
    resolution: &PathResolution,
) -> io::Result<()> {
    match (&resolution.matched_template, resolution.is_match()) {
        (Some(template), true) => writeln!(
            out,
            "✅ {method} {url} → {template} ({})",
            resolution.engine
        )?,
        _ => writeln!(out, "❌ {method} {url}")?,
    }
    for error in &resolution.errors {
        writeln!(out, "    {}", error.message)?;
        writeln!(out, "    {}", error.reason)?;
        if let Some(template) = &error.spec_path {
            writeln!(out, "    closest template: {template}")?;
        }
    }
    Ok(())
}

fn write_routes(out: &mut impl Write, resolver: &PathResolver) -> io::Result<()> {
    writeln!(
        out,
        "[routes] base_paths={:?} count={} indexed={}",
        resolver.base_paths(),
        resolver.templates().count(),
        resolver.indexed_template_count()
    )?;

    let paths = resolver.contract().paths.iter().flatten();
    for (template, item) in paths {
        let indexed = resolver
            .indexed_matcher()
            .is_some_and(|lookup| lookup.is_indexed(template));
        let methods: Vec<String> = item.methods().iter().map(Method::to_string).collect();
        writeln!(
            out,
            "[route] {template} methods=[{}] score={:#x} engine={}",
            methods.join(","),
            score(template),
            if indexed { "indexed" } else { "linear" }
        )?;
    }
    Ok(())
}
