//! ontorel CLI: load ontologies and inspect their typed views.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};

use ontorel::config::ConfigFile;
use ontorel::engine::{Engine, EngineConfig};
use ontorel::ingest::{self, InputFormat};
use ontorel::summary::StatisticKind;

#[derive(Parser)]
#[command(
    name = "ontorel",
    version,
    about = "Triple-store ingestion and typed views for RDF/OWL ontologies"
)]
struct Cli {
    /// Data directory for persistent storage.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// TOML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a file into a stanza, replacing what it held.
    Load {
        /// Stanza (source ontology) name.
        #[arg(long)]
        stanza: String,

        /// Input file.
        #[arg(long)]
        file: PathBuf,

        /// Input format (turtle, ntriples, nquads, rdfxml, jsonl). Guessed from
        /// the extension when omitted.
        #[arg(long)]
        format: Option<String>,

        /// Add to the stanza's statements instead of replacing them.
        #[arg(long)]
        append: bool,
    },

    /// Show engine info and statistics.
    Info,

    /// Classify a node, or every node.
    Classify {
        /// Node in IRI or CURIE form.
        node: Option<String>,

        /// Classify every node and print per-category counts.
        #[arg(long, conflicts_with = "node")]
        all: bool,
    },

    /// Print every well-formed RDF list.
    Lists,

    /// Print a summary statistic (predicates, instances, subclasses).
    Stats {
        kind: StatisticKind,
    },

    /// Materialize a relation as JSON.
    Relation {
        /// Relation name.
        name: Option<String>,

        /// List relation names instead.
        #[arg(long, conflicts_with = "name")]
        list: bool,
    },

    /// Report every classification, list and axiom finding.
    Check,
}

fn engine_config(cli: &Cli) -> Result<EngineConfig> {
    let mut config = match &cli.config {
        Some(path) => ConfigFile::load(path)?.to_engine_config(),
        None => EngineConfig::default(),
    };
    if let Some(dir) = &cli.data_dir {
        config.data_dir = Some(dir.clone());
    }
    Ok(config)
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let engine = Engine::new(engine_config(&cli)?)?;

    match cli.command {
        Commands::Load {
            stanza,
            file,
            format,
            append,
        } => {
            let format = match format {
                Some(name) => name.parse::<InputFormat>()?,
                None => InputFormat::from_path(&file).ok_or_else(|| {
                    miette::miette!(
                        help = "pass --format explicitly",
                        "cannot guess the format of {}",
                        file.display()
                    )
                })?,
            };
            let statements = ingest::read_file(&file, format, &stanza)?;
            if append {
                let report = engine.ingest(statements)?;
                println!(
                    "Loaded {} statements into {stanza} ({} duplicates)",
                    report.inserted, report.duplicates
                );
            } else {
                let outcome = engine.replace_all(&stanza, statements)?;
                println!(
                    "Replaced stanza {stanza}: {} -> {} statements",
                    outcome.previous, outcome.current
                );
            }
        }

        Commands::Info => {
            print!("{}", engine.info());
        }

        Commands::Classify { node, all } => {
            if all {
                let (_, partition) = engine.classify_all()?;
                println!("{} nodes", partition.len());
                for (tag, count) in partition.counts() {
                    println!("  {:<32} {count}", tag.relation_name());
                }
                if !partition.findings().is_empty() {
                    println!("{} findings (see `ontorel check`)", partition.findings().len());
                }
            } else {
                let Some(node) = node else {
                    miette::bail!("give a node or --all");
                };
                let classification = engine.classify(&node)?;
                println!("{node}: {}", classification.category);
                for finding in classification.findings {
                    eprintln!("{:?}", miette::Report::new(finding));
                }
            }
        }

        Commands::Lists => {
            let lists = engine.materialize_lists()?;
            for list in &lists.lists {
                println!("{} ({})", list.head, list.members.join(" "));
            }
            for finding in lists.findings.findings() {
                eprintln!("{:?}", miette::Report::new(finding.clone()));
            }
        }

        Commands::Stats { kind } => {
            for (element, count) in engine.compute(kind)? {
                println!("{count:>8}  {element}");
            }
        }

        Commands::Relation { name, list } => {
            if list {
                for relation in engine.schema().relations() {
                    match relation.parent {
                        Some(parent) => println!("{} < {parent}", relation.name),
                        None => println!("{}", relation.name),
                    }
                }
            } else {
                let Some(name) = name else {
                    miette::bail!("give a relation name or --list");
                };
                let rows = engine.relation(&name)?;
                let json = serde_json::to_string_pretty(&rows).into_diagnostic()?;
                println!("{json}");
            }
        }

        Commands::Check => {
            let report = engine.check()?;
            for finding in report.findings() {
                eprintln!("{:?}", miette::Report::new(finding.clone()));
            }
            println!(
                "{} findings ({} conflicting types, {} malformed lists)",
                report.len(),
                report.conflicting_types(),
                report.malformed_lists()
            );
        }
    }

    Ok(())
}
