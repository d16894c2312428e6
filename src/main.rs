use anyhow::{Context, bail};
use clap::{Parser, Subcommand, ValueEnum};
use quakecat::{Catalog, CatalogQuery, CatalogSource, Region, export, scan_duplicates};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::ops::ControlFlow;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(version, about = "Offline seismic event catalog tools", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load catalogs and print aggregate statistics
    Stats {
        #[arg(required = true)]
        sources: Vec<PathBuf>,

        /// Latitude rows (0 = default)
        #[arg(short, long, default_value_t = 0)]
        bins: usize,
    },

    /// Merge catalogs (dropping duplicates) into the fixed-width export format
    Export {
        #[arg(required = true)]
        sources: Vec<PathBuf>,

        /// Output file; stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Report duplicate and colliding event ids without resolving them
    Duplicates {
        #[arg(required = true)]
        sources: Vec<PathBuf>,

        #[arg(short, long, value_enum, default_value_t = DuplicateMode::Primary)]
        mode: DuplicateMode,
    },

    /// Print the records matching a filter
    Query {
        #[arg(required = true)]
        sources: Vec<PathBuf>,

        /// Rectangle as min_lat,max_lat,min_lon,max_lon
        #[arg(
            long,
            value_delimiter = ',',
            allow_hyphen_values = true,
            conflicts_with = "circle"
        )]
        rect: Option<Vec<f64>>,

        /// Circle as lat,lon,radius_km
        #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
        circle: Option<Vec<f64>>,

        /// Window start, ms since the epoch
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        start: i64,

        /// Window end, ms since the epoch; equal to start means "until now"
        #[arg(long, allow_hyphen_values = true)]
        end: Option<i64>,

        #[arg(long, default_value_t = -100.0, allow_hyphen_values = true)]
        min_depth: f64,

        #[arg(long, default_value_t = 1000.0, allow_hyphen_values = true)]
        max_depth: f64,

        #[arg(long, default_value_t = -10.0, allow_hyphen_values = true)]
        min_mag: f64,

        /// Event id (primary or alias) to leave out
        #[arg(long)]
        exclude: Option<String>,

        /// Stop after this many matches
        #[arg(long)]
        limit: Option<usize>,

        #[arg(short, long, default_value_t = 0)]
        bins: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum DuplicateMode {
    /// Records skipped because their primary id repeats
    Primary,
    /// Ids claimed by two different events
    Secondary,
}

fn to_sources(paths: Vec<PathBuf>) -> Vec<CatalogSource> {
    paths.into_iter().map(CatalogSource::Path).collect()
}

fn region_from_args(rect: Option<Vec<f64>>, circle: Option<Vec<f64>>) -> anyhow::Result<Region> {
    match (rect, circle) {
        (Some(r), None) if r.len() == 4 => Ok(Region::rectangle(r[0], r[1], r[2], r[3])),
        (None, Some(c)) if c.len() == 3 => Ok(Region::circle(c[0], c[1], c[2])),
        (None, None) => Ok(Region::world()),
        _ => bail!("expected --rect with 4 values or --circle with 3 values"),
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quakecat=info,info".into()),
        )
        .init();

    let args = Args::parse();

    match args.command {
        Command::Stats { sources, bins } => {
            let catalog = Catalog::load(bins, &to_sources(sources))?;
            print!("{}", catalog.stats());
        }

        Command::Export { sources, output } => {
            let catalog = Catalog::load(0, &to_sources(sources))?;
            let written = match output {
                Some(path) => {
                    let file = File::create(&path)
                        .with_context(|| format!("creating {}", path.display()))?;
                    export::write_export(&catalog, BufWriter::new(file))?
                }
                None => export::write_export(&catalog, io::stdout().lock())?,
            };
            info!("Wrote {} export lines", written);
        }

        Command::Duplicates { sources, mode } => {
            let report = scan_duplicates(&to_sources(sources))?;
            let mut out = io::stdout().lock();
            match mode {
                DuplicateMode::Primary => {
                    for record in &report.skipped {
                        writeln!(out, "{} {}:{}", record.id, record.source_name, record.line)?;
                    }
                }
                DuplicateMode::Secondary => {
                    for collision in report.cross_event_collisions() {
                        writeln!(out, "{}", collision)?;
                    }
                }
            }
        }

        Command::Query {
            sources,
            rect,
            circle,
            start,
            end,
            min_depth,
            max_depth,
            min_mag,
            exclude,
            limit,
            bins,
        } => {
            let mut query = CatalogQuery::new()
                .region(region_from_args(rect, circle)?)
                .time_window(start, end.unwrap_or(start))
                .depth_range(min_depth, max_depth)
                .min_magnitude(min_mag);
            if let Some(id) = exclude {
                query = query.exclude(id);
            }

            let catalog = Catalog::load(bins, &to_sources(sources))?;
            let limit = limit.unwrap_or(usize::MAX);
            let mut out = io::stdout().lock();
            let mut printed = 0;
            let mut write_error = None;

            let _ = catalog.visit(&query, |entry| {
                if printed >= limit {
                    return ControlFlow::Break(());
                }
                if let Err(e) = writeln!(out, "{}", entry) {
                    write_error = Some(e);
                    return ControlFlow::Break(());
                }
                printed += 1;
                ControlFlow::Continue(())
            })?;

            if let Some(e) = write_error {
                return Err(e.into());
            }
            info!("{} matching events", printed);
        }
    }

    Ok(())
}
