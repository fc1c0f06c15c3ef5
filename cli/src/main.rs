//! FoodNet CLI: command-line interface for county influence analysis
//!
//! Runs the influence pipeline over a GeoJSON boundary file and a
//! county-year measures CSV. Logs go to stderr, results to stdout or a file.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use comfy_table::{ContentArrangement, Table};
use foodnet::{
    load_counties, Combiner, GeoJsonSource, InfluencePipeline, InfluenceRow, Measure,
    MeasureTable, PipelineConfig, PipelineReport,
};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{info, Level};

#[derive(Parser)]
#[command(name = "foodnet", version, about = "County influence analysis for food access")]
struct Cli {
    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: OutputFormat,

    /// Log at DEBUG instead of INFO
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(clap::Args)]
struct ConfigArgs {
    /// YAML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Analysis year; repeat for several years
    #[arg(long = "year")]
    years: Vec<i32>,

    /// PageRank damping factor
    #[arg(long)]
    damping: Option<f64>,

    /// Weighting measure, e.g. payroll_density
    #[arg(long)]
    measure: Option<Measure>,

    /// Weighting combiner: mean, product, geometric_mean, min or max
    #[arg(long)]
    combiner: Option<Combiner>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the adjacency graph and rank counties for each year
    Run {
        /// County boundaries as a GeoJSON FeatureCollection
        #[arg(long)]
        boundaries: PathBuf,

        /// County-year measures CSV
        #[arg(long)]
        measures: PathBuf,

        #[command(flatten)]
        settings: ConfigArgs,

        /// Write results here instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Rows per year in table output
        #[arg(long, default_value_t = 10)]
        top: usize,
    },
    /// Export the county adjacency edge list as CSV
    Adjacency {
        /// County boundaries as a GeoJSON FeatureCollection
        #[arg(long)]
        boundaries: PathBuf,

        #[command(flatten)]
        settings: ConfigArgs,

        /// Write the edge list here instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Print the effective configuration as YAML
    Config {
        #[command(flatten)]
        settings: ConfigArgs,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::INFO })
        .with_writer(io::stderr)
        .init();

    let result = match cli.command {
        Commands::Run {
            boundaries,
            measures,
            settings,
            output,
            top,
        } => run_pipeline(&boundaries, &measures, &settings, output.as_deref(), top, cli.format),
        Commands::Adjacency {
            boundaries,
            settings,
            output,
        } => run_adjacency(&boundaries, &settings, output.as_deref()),
        Commands::Config { settings } => run_config(&settings),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

/// File configuration with command-line overrides applied, validated
fn load_config(args: &ConfigArgs) -> Result<PipelineConfig> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::from_yaml_file(path)
            .with_context(|| format!("reading configuration {}", path.display()))?,
        None => PipelineConfig::default(),
    };

    if !args.years.is_empty() {
        config.years = args.years.clone();
    }
    if let Some(damping) = args.damping {
        config.pagerank.damping_factor = damping;
    }
    if let Some(measure) = args.measure {
        config.weighting.measure = measure;
    }
    if let Some(combiner) = args.combiner {
        config.weighting.combiner = combiner;
    }

    config.validate().context("invalid configuration")?;
    Ok(config)
}

fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    Ok(match path {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("creating {}", path.display()))?,
        )),
        None => Box::new(io::stdout().lock()),
    })
}

fn run_pipeline(
    boundaries: &Path,
    measures: &Path,
    settings: &ConfigArgs,
    output: Option<&Path>,
    top: usize,
    format: OutputFormat,
) -> Result<()> {
    let config = load_config(settings)?;
    let pipeline = InfluencePipeline::new(config)?;

    let table = MeasureTable::from_csv_path(measures)
        .with_context(|| format!("reading measures {}", measures.display()))?;
    let report = pipeline
        .run(&GeoJsonSource::from_path(boundaries), &table)
        .with_context(|| format!("running pipeline on {}", boundaries.display()))?;

    for warning in report.warnings() {
        eprintln!("Warning: {}", warning);
    }

    let mut out = open_output(output)?;
    match format {
        OutputFormat::Json => report.write_json(&mut out)?,
        OutputFormat::Csv => report.write_csv(&mut out)?,
        OutputFormat::Table => print_tables(&report, top, &mut *out)?,
    }
    out.flush()?;

    if let Some(path) = output {
        info!("Wrote results to {}", path.display());
    }
    Ok(())
}

fn print_tables(report: &PipelineReport, top: usize, out: &mut dyn Write) -> Result<()> {
    writeln!(
        out,
        "{} counties, {} adjacency edges, {} skipped for geometry, {} without geometry",
        report.nodes,
        report.edges,
        report.skipped_geometry.len(),
        report.boundaries.missing_geometry.len()
    )?;

    for year in &report.years {
        writeln!(out)?;
        writeln!(
            out,
            "{}: {} iterations, {}, {} components, {} counties missing {}",
            year.year,
            year.iterations,
            if year.converged { "converged" } else { "NOT converged" },
            year.components,
            year.missing_measures.len(),
            report.config.weighting.measure
        )?;

        if year.rows.is_empty() {
            writeln!(out, "(no results)")?;
            continue;
        }

        let mut table = Table::new();
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec![
            "Rank", "County", "Name", "PageRank", "Degree", "Weighted degree", "At risk",
        ]);
        for row in year.rows.iter().take(top) {
            table.add_row(table_cells(row));
        }
        writeln!(out, "{}", table)?;
        writeln!(out, "{} row(s)", year.rows.len())?;
    }
    Ok(())
}

fn table_cells(row: &InfluenceRow) -> Vec<String> {
    vec![
        row.rank.to_string(),
        row.county.to_string(),
        row.name.clone().unwrap_or_default(),
        format!("{:.6}", row.pagerank),
        row.degree.to_string(),
        format!("{:.3}", row.weighted_degree),
        match row.at_risk {
            Some(true) => "yes".to_string(),
            Some(false) => "no".to_string(),
            None => "-".to_string(),
        },
    ]
}

fn run_adjacency(boundaries: &Path, settings: &ConfigArgs, output: Option<&Path>) -> Result<()> {
    let config = load_config(settings)?;
    let pipeline = InfluencePipeline::new(config)?;

    let counties = load_counties(&GeoJsonSource::from_path(boundaries))
        .with_context(|| format!("loading boundaries {}", boundaries.display()))?;
    let adjacency = pipeline.build_adjacency(&counties);

    for skipped in &adjacency.skipped {
        eprintln!("Skipped {}: {}", skipped.county, skipped.error);
    }

    let mut out = open_output(output)?;
    adjacency.write_csv(&mut out)?;
    out.flush()?;
    Ok(())
}

fn run_config(settings: &ConfigArgs) -> Result<()> {
    let config = load_config(settings)?;
    print!("{}", config.to_yaml_string()?);
    Ok(())
}
