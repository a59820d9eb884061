mod client;
mod local;

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use directories::BaseDirs;

use vdoc_core::config::{self, CONFIG_FILE_NAME, VdocConfig};
use vdoc_core::pipeline::{self, RunOptions};
use vdoc_core::report::Report;
use vdoc_core::transform;
use vdoc_core::verbs::infer_verb;
use vdoc_core::{ExampleSource, MetamodelSource, NoExamples};
use vdoc_html::{HtmlRenderer, SiteWriter};

use crate::client::{HttpExamples, HttpSource};
use crate::local::DirectorySource;

#[derive(Parser)]
#[command(name = "vdoc", about = "vAPI metamodel reference generator", version)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the HTML reference
    Generate(GenerateArgs),

    /// Print the normalized view of a single component
    Inspect {
        /// Component identifier, e.g. com.vmware.vcenter
        #[arg(long)]
        component: String,

        /// Output format
        #[arg(long, default_value = "yaml")]
        format: InspectFormat,

        #[command(flatten)]
        source: SourceArgs,
    },

    /// Initialize a new vdoc configuration
    Init {
        /// Overwrite existing files
        #[arg(long)]
        force: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Where the metamodel is read from.
#[derive(Args)]
struct SourceArgs {
    /// Testbed whose metadata host is looked up in the registry
    #[arg(short, long)]
    testbed: Option<String>,

    /// Metadata service host, bypassing the testbed registry
    #[arg(long)]
    host: Option<String>,

    /// Read saved responses from a directory instead of the metadata service
    #[arg(long, conflicts_with = "host")]
    from_dir: Option<PathBuf>,
}

#[derive(Args)]
struct GenerateArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Output path, `~` expands to the home directory
    #[arg(short, long)]
    output: Option<String>,

    /// Directory with templates overriding the built-in ones
    #[arg(short = 'p', long)]
    templates: Option<PathBuf>,

    /// Show warnings
    #[arg(short = 'w', long)]
    show_warnings: bool,

    /// Show statistics
    #[arg(short = 's', long)]
    show_stats: bool,

    /// Show API counts
    #[arg(short = 'c', long)]
    show_count: bool,

    /// Include internal APIs
    #[arg(short, long)]
    internal: bool,

    /// Use raw metadata
    #[arg(short, long)]
    raw: bool,

    /// Fetch examples
    #[arg(short, long)]
    examples: bool,
}

#[derive(Clone, ValueEnum)]
enum InspectFormat {
    Yaml,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    match cli.command {
        Commands::Generate(args) => cmd_generate(args),

        Commands::Inspect {
            component,
            format,
            source,
        } => cmd_inspect(&component, format, &source),

        Commands::Init { force } => cmd_init(force),

        Commands::Completions { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            clap_complete::generate(shell, &mut cmd, "vdoc", &mut std::io::stdout());
            Ok(())
        }
    }
}

/// Try to load the project config file from the current directory.
fn try_load_config() -> Result<Option<VdocConfig>> {
    let config_path = PathBuf::from(CONFIG_FILE_NAME);
    config::load_config(&config_path).map_err(|e| anyhow::anyhow!(e))
}

/// Expand a leading `~` to the home directory.
fn expand_home(path: &str) -> PathBuf {
    if path == "~" || path.starts_with("~/") {
        if let Some(dirs) = BaseDirs::new() {
            return dirs.home_dir().join(path[1..].trim_start_matches('/'));
        }
    }
    PathBuf::from(path)
}

fn timeout(cfg: &VdocConfig) -> Option<Duration> {
    cfg.timeout_secs.map(Duration::from_secs)
}

/// Pick the metamodel source. Resolving the testbed host is part of the bootstrap, so any
/// failure here ends the run.
fn open_source(args: &SourceArgs, cfg: &VdocConfig) -> Result<Box<dyn MetamodelSource>> {
    if let Some(ref dir) = args.from_dir {
        eprintln!("Reading metadata from {}", dir.display());
        return Ok(Box::new(DirectorySource::new(dir)));
    }

    let host = match args.host.clone().or_else(|| cfg.host.clone()) {
        Some(host) => host,
        None => {
            let testbed = args.testbed.as_deref().unwrap_or(&cfg.testbed.name);
            let registry = cfg.testbed.registry_url.as_deref().with_context(|| {
                format!(
                    "no metadata host: pass --host, set `host` in {CONFIG_FILE_NAME}, or configure `testbed.registry_url`"
                )
            })?;
            eprintln!("Fetching {testbed} testbed...");
            client::resolve_testbed_host(registry, testbed, timeout(cfg))
                .with_context(|| format!("failed to resolve testbed {testbed}"))?
        }
    };

    let base_url = format!("{}://{}{}", cfg.scheme, host, cfg.metamodel_path);
    eprintln!("Fetching metadata from {base_url}");
    let source = HttpSource::new(base_url, cfg.insecure_tls, timeout(cfg))?;
    Ok(Box::new(source))
}

fn cmd_generate(args: GenerateArgs) -> Result<()> {
    let cfg = try_load_config()?.unwrap_or_default();
    let source = open_source(&args.source, &cfg)?;

    let output = expand_home(args.output.as_deref().unwrap_or(&cfg.output));
    let templates = args.templates.or_else(|| cfg.templates.as_ref().map(PathBuf::from));
    let renderer = HtmlRenderer::with_overrides(templates.as_deref())
        .context("failed to load templates")?;

    let mut options = RunOptions::from_config(&cfg);
    options.include_internal = args.internal;
    options.raw = args.raw;
    options.show_warnings = args.show_warnings;
    options.site.root = output
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    options.site.testbed = Some(
        args.source
            .testbed
            .unwrap_or_else(|| cfg.testbed.name.clone()),
    );

    let examples: Box<dyn ExampleSource> = if args.examples {
        Box::new(HttpExamples::new(&cfg.examples_url, timeout(&cfg))?)
    } else {
        Box::new(NoExamples)
    };

    eprintln!("Output path: {}", output.display());
    let mut writer = SiteWriter::new(&output, renderer);
    let report = pipeline::run(&*source, &*examples, &mut writer, &options)?;

    if args.show_stats {
        print_component_stats(&report);
    }
    if args.show_stats || args.show_count {
        print!("{}", report.totals.summary());
    }
    for skipped in &report.skipped {
        eprintln!("  skipped {}: {}", skipped.name, skipped.reason);
    }
    if !args.show_warnings && !report.warnings.is_empty() {
        eprintln!(
            "{} warnings recorded in warnings.html (use -w to print them)",
            report.warnings.len()
        );
    }
    eprintln!("Wrote {} pages to {}", writer.written(), output.display());
    Ok(())
}

fn print_component_stats(report: &Report) {
    println!(
        "{:<40} {:>5} {:>5} {:>5} {:>5} {:>6} {:>7} {:>8}",
        "Component", "GET", "PUT", "POST", "PATCH", "DELETE", "Unknown", "Internal"
    );
    for (name, totals) in &report.per_component {
        println!(
            "{:<40} {:>5} {:>5} {:>5} {:>5} {:>6} {:>7} {:>8}",
            name,
            totals.get,
            totals.put,
            totals.post,
            totals.patch,
            totals.delete,
            totals.unknown,
            totals.internal
        );
    }
    println!();
}

fn cmd_inspect(component: &str, format: InspectFormat, source_args: &SourceArgs) -> Result<()> {
    let cfg = try_load_config()?.unwrap_or_default();
    let source = open_source(source_args, &cfg)?;
    let doc = source
        .fetch_component(component)
        .with_context(|| format!("failed to fetch component {component}"))?;
    let catalog = transform::normalize(&doc);

    let summary = build_inspect_summary(&catalog);

    match format {
        InspectFormat::Yaml => {
            let yaml = serde_yaml_ng::to_string(&summary)?;
            print!("{}", yaml);
        }
        InspectFormat::Json => {
            let json = serde_json::to_string_pretty(&summary)?;
            println!("{}", json);
        }
    }

    Ok(())
}

fn build_inspect_summary(catalog: &vdoc_core::model::Catalog) -> serde_json::Value {
    let packages: Vec<serde_json::Value> = catalog
        .packages()
        .map(|(id, package)| {
            let services: Vec<serde_json::Value> = catalog
                .services_of(id)
                .map(|(_, service)| {
                    let operations: Vec<serde_json::Value> = service
                        .operations
                        .iter()
                        .map(|op| {
                            serde_json::json!({
                                "name": op.name,
                                "verb": infer_verb(op).verb().map(|v| v.to_string()),
                                "path": op.request_mapping.path,
                            })
                        })
                        .collect();
                    serde_json::json!({
                        "name": service.name,
                        "internal": service.internal,
                        "released": service.released,
                        "operations": operations,
                    })
                })
                .collect();
            serde_json::json!({
                "name": package.name,
                "services": services,
                "structures": package.structures.as_ref().map_or(0, |s| s.len()),
                "enumerations": package.enumerations.len(),
            })
        })
        .collect();

    serde_json::json!({
        "component": catalog.component.name,
        "packages": packages,
        "structures": catalog.structures().count(),
        "enumerations": catalog.enumerations().count(),
        "constants": catalog.constants().count(),
    })
}

fn cmd_init(force: bool) -> Result<()> {
    let config_path = PathBuf::from(CONFIG_FILE_NAME);

    if config_path.exists() && !force {
        anyhow::bail!(
            "{} already exists. Use --force to overwrite.",
            config_path.display()
        );
    }

    fs::write(&config_path, config::default_config_content())?;
    eprintln!("Created {}", config_path.display());
    Ok(())
}
