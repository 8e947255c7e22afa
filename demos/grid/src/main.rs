//! `grid`: motorshed of a synthetic street grid.
//!
//! Builds a 12×12 grid (see [`network`]), resolves a next hop for every
//! street toward downtown and writes `edges.csv` / `stage_summaries.csv`.
//!
//! Routing runs in-process by default.  Set `MOTORSHED_OSRM_URL` to use a
//! live OSRM service instead (responses are cached in
//! `MOTORSHED_OSRM_CACHE` when set); the grid coordinates then need to lie
//! on the service's map.
//!
//! With `--both` the pipeline runs once per orientation and writes the two
//! tables to `<out_dir>/towards` and `<out_dir>/away`.
//!
//! Run with:
//!   cargo run -p grid --release -- [--both] [config.json] [out_dir]

mod network;

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use ms_core::PipelineConfig;
use ms_engine::{Pipeline, PipelineReport};
use ms_oracle::{GraphOracle, OsrmClient, OsrmConfig, RoutingOracle};
use ms_output::{CsvWriter, TableOutputObserver};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

fn oracle(raw: &ms_graph::RawGraph) -> Result<Box<dyn RoutingOracle>> {
    match std::env::var("MOTORSHED_OSRM_URL") {
        Ok(base_url) => {
            let config = OsrmConfig {
                base_url,
                cache_path: std::env::var_os("MOTORSHED_OSRM_CACHE").map(PathBuf::from),
                ..Default::default()
            };
            info!(url = %config.base_url, "routing via OSRM");
            Ok(Box::new(OsrmClient::new(config).context("creating OSRM client")?))
        }
        Err(_) => {
            info!("routing in-process");
            Ok(Box::new(GraphOracle::new(raw)))
        }
    }
}

fn main() -> Result<()> {
    init_tracing();

    let (flags, positional): (Vec<String>, Vec<String>) =
        std::env::args().skip(1).partition(|a| a.starts_with("--"));
    let both = flags.iter().any(|f| f == "--both");
    let mut args = positional.into_iter();
    let config = match args.next() {
        Some(path) => PipelineConfig::from_json_path(Path::new(&path))
            .with_context(|| format!("loading config {path}"))?,
        None => PipelineConfig::default(),
    };
    let out_dir = PathBuf::from(args.next().unwrap_or_else(|| "output".to_owned()));

    let raw = network::build_network();
    let reference = network::reference();
    info!(
        nodes = raw.node_count(),
        edges = raw.edge_count(),
        reference = %reference,
        orientation = config.orientation.as_str(),
        "network built"
    );

    let t0 = Instant::now();
    let oracle = oracle(&raw)?;
    let pipeline = Pipeline::new(config)?;

    if both {
        let mut towards = TableOutputObserver::new(CsvWriter::new(&out_dir.join("towards"))?);
        let mut away = TableOutputObserver::new(CsvWriter::new(&out_dir.join("away"))?);
        let run = pipeline.run_both(&raw, reference, oracle.as_ref(), &mut towards, &mut away)?;
        for (name, observer) in [("towards", &mut towards), ("away", &mut away)] {
            if let Some(e) = observer.take_error() {
                return Err(e).with_context(|| format!("writing {name} output"));
            }
        }
        print_report("towards", &run.towards.report);
        print_report("away", &run.away.report);
    } else {
        let mut table = pipeline.build_table(&raw, reference)?;
        let mut observer = TableOutputObserver::new(CsvWriter::new(&out_dir)?);
        let report = pipeline.run(&mut table, oracle.as_ref(), &mut observer)?;
        if let Some(e) = observer.take_error() {
            return Err(e).context("writing output");
        }
        print_report(pipeline.config().orientation.as_str(), &report);
    }

    println!("wrote {} in {:.2?}", out_dir.display(), t0.elapsed());
    Ok(())
}

fn print_report(label: &str, report: &PipelineReport) {
    let p = &report.propagation;
    println!("[{label}] {}", report.counts);
    println!(
        "[{label}] consensus: {} iterations, {} requests ({} failed), {} newly resolved",
        report.consensus.iterations,
        report.consensus.requests,
        report.consensus.failed_requests,
        report.consensus.newly_resolved,
    );
    println!(
        "[{label}] traffic:   seeded {:.1}, absorbed {:.1}, dropped {:.1}, trapped {:.1}{}",
        p.seeded,
        p.absorbed,
        p.dropped,
        p.trapped,
        if p.stalled { " (stalled)" } else { "" },
    );
}
