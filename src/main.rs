mod error;
mod regions;
mod brasilio;
mod normalize;
mod axis;
mod aggregate;
mod fanout;
mod persist;
mod graph;
mod report;

use std::path::PathBuf;
use std::time::{Duration,Instant};

use clap::Parser;
use tracing::{info,error};
use tracing_subscriber::EnvFilter;

use error::Result;


#[derive(Parser,Debug)]
#[command(name = "covid19-brazil-rs")]
#[command(about = "Aggregates the Brasil.IO COVID-19 dataset by country, region and state", long_about = None)]
struct Cli {
    /// URL or local path of caso_full.csv(.gz)
    #[arg(short, long, default_value = brasilio::CASO_FULL_URL)]
    source: String,

    /// Directory for the downloaded dataset
    #[arg(long, default_value = "cache")]
    cache_dir: PathBuf,

    /// Reuse a cached download younger than this many minutes
    #[arg(long, default_value_t = 30)]
    cache_max_age: u64,

    /// Directory for the cleaned and aggregated datasets
    #[arg(short, long, default_value = "data")]
    data_dir: PathBuf,

    /// Directory for the charts
    #[arg(short, long, default_value = "images")]
    graph_dir: PathBuf,

    /// Directory for the text reports
    #[arg(short, long, default_value = "reports")]
    report_dir: PathBuf,

    #[arg(long, default_value_t = false)]
    skip_graphs: bool,

    #[arg(long, default_value_t = false)]
    skip_report: bool,
}

impl Cli {

    fn cache_max_age(&self) -> Duration {
	Duration::from_secs(self.cache_max_age.saturating_mul(60))
    }

}


fn main() {

    tracing_subscriber::fmt()
	.with_env_filter(EnvFilter::try_from_default_env()
			 .unwrap_or_else(|_| EnvFilter::new("info")))
	.with_writer(std::io::stderr)
	.init();

    let cli = Cli::parse();
    let start = Instant::now();

    match run(&cli) {
	Ok(()) => info!(elapsed_secs = start.elapsed().as_secs_f64(), "Finished"),
	Err(err) => {
	    error!("{}", err);
	    std::process::exit(1);
	}
    }

}


fn run(cli: &Cli) -> Result<()> {

    let raw = brasilio::caso_full(&cli.source, &cli.cache_dir, cli.cache_max_age())?;

    let records = normalize::normalize(raw)?;
    let (axis, last_available_date) = axis::build_axis(&records)?;
    info!(days = axis.len(), last_available_date = %last_available_date, "Date axis built");

    let data = fanout::fanout(&records, &axis, last_available_date)?;
    let snapshot = fanout::state_snapshot(&records, last_available_date);

    // Nothing is written before this point.
    persist::save_all(&cli.data_dir, &records, &data)?;

    if !cli.skip_graphs {
	graph::all_graphs(&cli.graph_dir, &data.country, &data.regions,
			  &snapshot, last_available_date)?;
    }

    if !cli.skip_report {
	report::write_report(&cli.report_dir, &data.country, last_available_date)?;
    }

    Ok(())

}
