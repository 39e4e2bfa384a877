//! # CLI Module
//!
//! Command-line access to path resolution, for checking a contract without
//! writing code.
//!
//! ## Commands
//!
//! ### `resolve`
//!
//! Resolve one or more request URLs and show the matched template:
//!
//! ```bash
//! oaspath resolve --spec openapi.yaml -X GET https://x.com/api/pets/42 /api/pets/mine
//! ```
//!
//! Options:
//! - `--spec <FILE>` - Path to the OpenAPI contract (required)
//! - `-X, --method <METHOD>` - HTTP method (default: GET)
//! - `--json` - Machine-readable output including validation errors
//!
//! Exits with status 1 if any URL fails to resolve.
//!
//! ### `routes`
//!
//! List templates in declaration order with their methods, specificity score
//! and which engine serves them:
//!
//! ```bash
//! oaspath routes --spec openapi.yaml
//! ```
//!
//! ### `check`
//!
//! Report templates whose placeholder braces cannot be compiled:
//!
//! ```bash
//! oaspath check --spec openapi.yaml --fail-on-error
//! ```
//!
//! ## Usage from Code
//!
//! ```rust,no_run
//! use oaspath::cli::{execute, Cli};
//! use clap::Parser;
//!
//! let cli = Cli::parse_from(["oaspath", "routes", "--spec", "openapi.yaml"]);
//! let ok = execute(&cli, &mut std::io::stdout())?;
//! # Ok::<(), anyhow::Error>(())
//! ```

mod commands;


pub use commands::{execute, run_cli, Cli, Commands};
