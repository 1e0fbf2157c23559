#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the potential student map.
//!
//! Loads the tract table once, then either serves the HTTP API or answers
//! a single query on the terminal.

mod config;
mod output;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use clap::{Parser, Subcommand};
use student_map_analytics_models::{Granularity, Metric};
use student_map_dataset::query::{QuerySettings, StudentQuery, run_query};
use student_map_dataset::table::TractTable;
use student_map_geocoder::nominatim::NominatimGeocoder;
use student_map_server::{AppState, run_server};

use crate::config::AppConfig;

#[derive(Parser)]
#[command(name = "student_map", about = "Potential student map by census tract")]
struct Cli {
    /// Config file (defaults to `$STUDENT_MAP_CONFIG`, then `student_map.toml`)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the HTTP API
    Serve {
        /// Bind address (overrides config and `BIND_ADDR`)
        #[arg(long)]
        bind: Option<String>,
        /// Port (overrides config and `PORT`)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Print potential students around an address
    Report {
        /// Address to center the search on. Without one, every tract is shown
        /// by neighborhood.
        #[arg(long)]
        address: Option<String>,
        /// Search radius in miles (1-20)
        #[arg(long)]
        radius: Option<u32>,
        /// `tract` or `neighborhood`
        #[arg(long, default_value = "neighborhood")]
        granularity: Granularity,
        /// `total`, `white` or `non_white`
        #[arg(long, default_value = "total")]
        metric: Metric,
        /// Skip the heat overlay legend
        #[arg(long)]
        no_heat: bool,
    },
    /// Print every neighborhood of the city, largest first
    CitySummary,
    /// Print the neighborhood lookup table and unmatched tracts
    Neighborhoods,
}

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");
    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref())?;

    let start = Instant::now();
    let table = TractTable::load(&config.data)?;
    log::info!(
        "Loaded {} tracts in {:.2}s",
        table.len(),
        start.elapsed().as_secs_f64()
    );

    let settings = QuerySettings {
        default_center: config.map.default_center,
        geocode_timeout: config.geocoder.timeout(),
    };

    match cli.command {
        Commands::Serve { bind, port } => {
            let mut server = config.server.with_env_overrides();
            if let Some(bind) = bind {
                server.bind_addr = bind;
            }
            if let Some(port) = port {
                server.port = port;
            }

            let state = AppState {
                table: Arc::new(table),
                geocoder: Arc::new(NominatimGeocoder::new(&config.geocoder)?),
                settings,
                map: config.map,
            };
            run_server(state, &server).await?;
        }
        Commands::Report {
            address,
            radius,
            granularity,
            metric,
            no_heat,
        } => {
            let geocoder = NominatimGeocoder::new(&config.geocoder)?;
            let query = StudentQuery {
                address,
                radius_miles: radius.unwrap_or(config.map.default_radius_miles),
                granularity,
                metric,
                show_heat_overlay: !no_heat,
            };
            let result = run_query(&table, &geocoder, &query, &settings).await?;
            output::print_report(&result);
        }
        Commands::CitySummary => {
            output::print_rows(&table.city_summary());
        }
        Commands::Neighborhoods => {
            output::print_neighborhoods(&table);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_parses_granularity_and_metric() {
        let cli = Cli::try_parse_from([
            "student_map",
            "report",
            "--granularity",
            "tract",
            "--metric",
            "non_white",
            "--radius",
            "5",
            "--no-heat",
        ])
        .unwrap();

        let Commands::Report {
            address,
            radius,
            granularity,
            metric,
            no_heat,
        } = cli.command
        else {
            panic!("expected the report command");
        };
        assert_eq!(address, None);
        assert_eq!(radius, Some(5));
        assert_eq!(granularity, Granularity::Tract);
        assert_eq!(metric, Metric::NonWhite);
        assert!(no_heat);
    }

    #[test]
    fn report_defaults_to_neighborhood_total() {
        let cli = Cli::try_parse_from(["student_map", "report"]).unwrap();
        let Commands::Report {
            granularity,
            metric,
            no_heat,
            ..
        } = cli.command
        else {
            panic!("expected the report command");
        };
        assert_eq!(granularity, Granularity::Neighborhood);
        assert_eq!(metric, Metric::Total);
        assert!(!no_heat);
    }

    #[test]
    fn unknown_metric_is_rejected() {
        assert!(Cli::try_parse_from(["student_map", "report", "--metric", "purple"]).is_err());
    }

    #[test]
    fn global_config_and_serve_overrides() {
        let cli = Cli::try_parse_from([
            "student_map",
            "serve",
            "--port",
            "9000",
            "--config",
            "custom.toml",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("custom.toml")));
        assert!(matches!(
            cli.command,
            Commands::Serve {
                bind: None,
                port: Some(9000)
            }
        ));
    }
}
