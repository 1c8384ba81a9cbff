use std::io::{self, BufRead};
use std::path::PathBuf;
use std::process::ExitCode;
use std::thread;
use std::time::Duration;

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{error, info};

use rental_mapper::config::AppConfig;
use rental_mapper::errors::AppResult;
use rental_mapper::logging::init_tracing;
use rental_mapper::pipeline::{Pipeline, RunObserver, RunReport, ScrapeController};

#[derive(Parser, Debug)]
#[command(name = "rental_mapper")]
#[command(about = "Scrape rental listings, geocode them and publish a clustered map")]
struct Cli {
    /// Listing-index URL containing a {page} placeholder
    #[arg(long)]
    url_template: Option<String>,

    /// Number of index pages to fetch
    #[arg(long)]
    max_pages: Option<u32>,

    /// Table output path
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Map output path
    #[arg(long)]
    map: Option<PathBuf>,

    /// Also write an .xlsx workbook here
    #[arg(long)]
    xlsx: Option<PathBuf>,

    /// Skip page, geocoding and retry pauses (local fixtures only)
    #[arg(long)]
    no_pause: bool,

    /// Print the run report as JSON
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn apply(self, mut config: AppConfig) -> AppResult<AppConfig> {
        if let Some(template) = self.url_template {
            config.scrape.listing_url_template = template;
        }
        if let Some(pages) = self.max_pages {
            config.scrape.max_pages = pages;
        }
        if let Some(csv) = self.csv {
            config.output.csv_path = csv;
        }
        if let Some(map) = self.map {
            config.output.map_path = map;
        }
        if self.xlsx.is_some() {
            config.output.xlsx_path = self.xlsx;
        }
        if self.no_pause {
            config = config.without_pauses();
        }
        config.validate()?;
        Ok(config)
    }
}

/// Drives the terminal progress bar. Cancellation goes through the controller instead.
struct TerminalObserver {
    bar: ProgressBar,
}

impl TerminalObserver {
    fn new(bar: ProgressBar) -> Self {
        Self { bar }
    }
}

fn progress_bar() -> ProgressBar {
    let bar = ProgressBar::new(0);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.green/dim}] {pos}/{len} {elapsed}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░"),
    );
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

impl RunObserver for TerminalObserver {
    fn on_progress(&self, completed: usize, total: usize) {
        self.bar.set_length(total as u64);
        self.bar.set_position(completed as u64);
    }

    fn on_cancel_requested(&self) -> bool {
        false
    }
}

/// Typing `q` or `stop` plays the stop button.
fn watch_stdin(controller: ScrapeController) {
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if matches!(line.trim(), "q" | "stop") {
                controller.stop();
                break;
            }
        }
    });
}

fn run(cli: Cli) -> AppResult<Option<RunReport>> {
    let config = cli.apply(AppConfig::from_env()?)?;
    let pipeline = Pipeline::from_config(config)?;

    let bar = progress_bar();
    let controller = ScrapeController::new();
    let Some(handle) = controller.start(pipeline, TerminalObserver::new(bar.clone())) else {
        return Ok(None);
    };
    info!("scraping; type q + Enter to stop");
    watch_stdin(controller.clone());

    let joined = handle.join();
    bar.finish_and_clear();
    match joined {
        Ok(result) => result.map(Some),
        Err(_) => {
            error!("scrape worker panicked");
            Ok(None)
        }
    }
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    let json = cli.json;

    match run(cli) {
        Ok(Some(report)) => {
            if json {
                match serde_json::to_string_pretty(&report) {
                    Ok(text) => println!("{text}"),
                    Err(e) => error!(error = %e, "failed to encode report"),
                }
            } else {
                print!("{report}");
            }
            ExitCode::SUCCESS
        }
        Ok(None) => ExitCode::FAILURE,
        Err(e) => {
            error!(error = %e, "run failed");
            ExitCode::FAILURE
        }
    }
}
