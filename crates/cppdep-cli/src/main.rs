#![forbid(unsafe_code)]

mod output;

use anyhow::Context;
use clap::Parser;
use cppdep_core::{DEFAULT_CONFIG_FILE, Project, ReportOptions};
use cppdep_graph::report::text::DependencyListing;
use std::env;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[allow(clippy::struct_excessive_bools)]
#[command(
    name = "cppdep",
    author,
    version = cppdep_core::VERSION,
    about = "cppdep: physical dependency analysis of C/C++ components, packages, and package groups",
    long_about = None,
    after_help = "EXAMPLES:\n    # Analyze the project described by ./.cppdep.yml\n    cppdep\n\n    # List reduced dependencies and write DOT graphs\n    cppdep -l --graph-dir graphs\n\n    # Machine-readable report\n    cppdep -c path/to/.cppdep.yml --json -o report.json"
)]
struct Cli {
    /// Path to the YAML project configuration.
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// List the reduced dependencies of every node.
    #[arg(short = 'l', long, conflicts_with = "list_unreduced")]
    list_reduced: bool,

    /// List all direct dependencies of every node, reduced or not.
    #[arg(short = 'L', long)]
    list_unreduced: bool,

    /// Write the report to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Write `<view>_orig/_cycles/_final.dot` graphs into this directory.
    #[arg(long)]
    graph_dir: Option<PathBuf>,

    /// Emit JSON output instead of human-readable text.
    #[arg(long)]
    json: bool,

    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    /// Derive the dependency listing from the `-l`/`-L` flags.
    const fn listing(&self) -> DependencyListing {
        if self.list_reduced {
            DependencyListing::Reduced
        } else if self.list_unreduced {
            DependencyListing::Unreduced
        } else {
            DependencyListing::None
        }
    }

    fn report_options(&self) -> ReportOptions {
        ReportOptions {
            listing: self.listing(),
            graph_dir: self.graph_dir.clone(),
            json: self.json,
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("CPPDEP_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "cppdep=debug,info"
        } else {
            "cppdep=info,warn"
        })
    });

    let format = env::var("CPPDEP_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    // The report owns stdout.
    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let project = Project::load(&cli.config)
        .with_context(|| format!("failed to load project {}", cli.config.display()))?;
    debug!(
        components = project.components.len(),
        externals = project.externals.len(),
        "project ready"
    );

    let mut out = output::open(cli.output.as_deref())?;
    project
        .analyze(out.as_mut(), &cli.report_options())
        .context("dependency analysis failed")?;
    out.flush().context("failed to flush report")?;

    if let Some(path) = &cli.output {
        info!(path = %path.display(), "report written");
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output::render_error(&err);
            ExitCode::FAILURE
        }
    }
}
