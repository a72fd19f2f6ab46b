//! BigCQ CLI
//!
//! - `generate`: CSV of ACE verbalizations + Turtle patterns → `query_to_cqs_<n>.json`
//! - `analyze`: show the axiom shape of one verbalization
//! - `materialize`: sentences with property ids swapped for verbs, for an external parser
//! - `expand`: every synonym variant of a template
//! - `summary`: dataset statistics without writing files

use anyhow::{Context, Result};
use bigcq_cli::{
    build_analyzer, group_by_query, read_rows, run_pipeline, select_rows, write_groups,
    PipelineConfig, PipelineContext, PipelineOutput, RunReport, SkipReason, Summary,
};
use bigcq_gen::{
    unresolved_markers, GeneratorConfig, SynonymDictionary, SynsetExpander, TemplateCatalog,
    TemplatePaths,
};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "bigcq")]
#[command(
    author,
    version,
    about = "BigCQ: competency questions and SPARQL-OWL queries from ACE axiom verbalizations"
)]
struct Cli {
    /// Debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct RunArgs {
    /// Input CSV: id, verbalization, axiom pattern
    #[arg(short, long)]
    input: PathBuf,
    /// Directory with the template families and synonym_classes.json
    #[arg(short, long, default_value = "patterns")]
    patterns: PathBuf,
    /// Precomputed dependency parses (JSON); heuristic parser otherwise
    #[arg(long)]
    parses: Option<PathBuf>,
    /// Worker threads (default: available parallelism)
    #[arg(short, long)]
    jobs: Option<usize>,
    /// Per-row cap on template variants
    #[arg(long, default_value_t = bigcq_gen::DEFAULT_MAX_VARIANTS_PER_ROW)]
    max_variants: usize,
    /// Disable the per-row variant cap
    #[arg(long, conflicts_with = "max_variants")]
    no_variant_limit: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate query → CQ mapping files.
    Generate {
        #[command(flatten)]
        run: RunArgs,
        /// Output directory (must not exist)
        #[arg(short, long, default_value = "BigCQ_mapping")]
        out: PathBuf,
        /// Also write summary statistics as JSON
        #[arg(long)]
        summary: Option<PathBuf>,
    },

    /// Print the axiom shape of one verbalization as JSON.
    Analyze {
        verbalization: String,
        #[arg(long)]
        parses: Option<PathBuf>,
    },

    /// Emit one materialized sentence per usable row.
    Materialize {
        #[arg(short, long)]
        input: PathBuf,
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Print every synonym expansion of a template.
    Expand {
        template: String,
        #[arg(short, long, default_value = "patterns")]
        patterns: PathBuf,
    },

    /// Run generation and print statistics without writing files.
    Summary {
        #[command(flatten)]
        run: RunArgs,
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Generate { run, out, summary } => cmd_generate(&run, &out, summary.as_deref()),
        Commands::Analyze {
            verbalization,
            parses,
        } => cmd_analyze(&verbalization, parses.as_deref()),
        Commands::Materialize { input, out } => cmd_materialize(&input, out.as_deref()),
        Commands::Expand { template, patterns } => cmd_expand(&template, &patterns),
        Commands::Summary { run, json } => cmd_summary(&run, json),
    }
}

fn run_rows(run: &RunArgs) -> Result<PipelineOutput> {
    let catalog = TemplateCatalog::load(&TemplatePaths::new(&run.patterns))
        .with_context(|| format!("loading templates from {}", run.patterns.display()))?;
    let analyzer = build_analyzer(run.parses.as_deref()).context("loading parser")?;
    let config = GeneratorConfig {
        max_variants_per_row: (!run.no_variant_limit).then_some(run.max_variants),
    };

    let rows = read_rows(&run.input)?;
    let (rows, dropped) = select_rows(rows);
    for (row, reason) in &dropped {
        warn!(id = %row.id, line = row.line, %reason, "skipping row");
    }
    let reasons: Vec<SkipReason> = dropped.iter().map(|(_, r)| *r).collect();

    let ctx = PipelineContext {
        analyzer,
        catalog,
        config,
    };
    let output = run_pipeline(&rows, &reasons, &ctx, &PipelineConfig { jobs: run.jobs })?;
    print_report(&output.report);
    Ok(output)
}

fn print_report(report: &RunReport) {
    eprintln!(
        "{} processed {} of {} rows",
        "ok".green().bold(),
        report.processed,
        report.rows_read
    );
    for (reason, count) in &report.skipped {
        eprintln!("  {} {reason}: {count}", "skipped".yellow());
    }
}

fn cmd_generate(run: &RunArgs, out: &Path, summary: Option<&Path>) -> Result<()> {
    let output = run_rows(run)?;
    let groups = group_by_query(&output.rows);
    let written = write_groups(out, &groups)?;
    eprintln!(
        "{} {} ({} files)",
        "wrote".green().bold(),
        out.display().to_string().bold(),
        written.len()
    );

    if let Some(path) = summary {
        let json = serde_json::to_string_pretty(&Summary::compute(&output.rows))?;
        fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        eprintln!("{} {}", "wrote".green().bold(), path.display().to_string().bold());
    }
    Ok(())
}

fn cmd_analyze(verbalization: &str, parses: Option<&Path>) -> Result<()> {
    let analyzer = build_analyzer(parses).context("loading parser")?;
    let shape = analyzer.analyze(verbalization)?;
    println!("{}", serde_json::to_string_pretty(&shape)?);
    Ok(())
}

fn cmd_materialize(input: &Path, out: Option<&Path>) -> Result<()> {
    let analyzer = build_analyzer(None)?;
    let (rows, _) = select_rows(read_rows(input)?);

    let mut lines = Vec::with_capacity(rows.len());
    for row in &rows {
        match analyzer.materialize(&row.verbalization) {
            Ok(m) => lines.push(m.text),
            Err(err) => warn!(id = %row.id, line = row.line, error = %err, "skipping row"),
        }
    }
    let text = lines.join("\n");

    match out {
        Some(path) => {
            fs::write(path, text + "\n").with_context(|| format!("writing {}", path.display()))?;
            eprintln!("{} {}", "wrote".green().bold(), path.display().to_string().bold());
        }
        None => println!("{text}"),
    }
    Ok(())
}

fn cmd_expand(template: &str, patterns: &Path) -> Result<()> {
    let synonyms = SynonymDictionary::load(&TemplatePaths::new(patterns).synonyms())?;
    let expander = SynsetExpander::new(&synonyms);
    for variant in expander.expand(template) {
        let left = unresolved_markers(&variant);
        if !left.is_empty() {
            warn!(variant = %variant, markers = ?left, "markers without a synonym set");
        }
        println!("{variant}");
    }
    Ok(())
}

fn cmd_summary(run: &RunArgs, json: bool) -> Result<()> {
    let output = run_rows(run)?;
    let summary = Summary::compute(&output.rows);
    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print!("{summary}");
    }
    Ok(())
}
