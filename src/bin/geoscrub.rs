//! geoscrub - Observation Quality Control CLI
//!
//! Command-line interface for cleaning, flagging, and filtering tables of
//! crowdsourced geolocated observations.

use clap::{Parser, Subcommand};
use geoscrub::data::ObservationTable;
use geoscrub::error::Result;
use geoscrub::filter::{
    filter_duplicates_with_stats, filter_invalid_coords_with_stats,
    filter_poor_geolocation_with_stats, CoordBounds,
};
use geoscrub::flag::{landcover, mosquito};
use geoscrub::pipeline::{mosquito_pipeline, Pipeline, PipelineConfig};
use geoscrub::profile::profile_completeness;
use std::path::PathBuf;

/// Quality control for crowdsourced geolocated observations
#[derive(Parser)]
#[command(name = "geoscrub")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Remove rows with out-of-range coordinates
    FilterCoords {
        /// Path to input CSV
        #[arg(short, long)]
        input: PathBuf,

        /// Output path for the filtered CSV
        #[arg(short, long)]
        output: PathBuf,

        /// Latitude column name
        #[arg(long, default_value = "Latitude")]
        latitude: String,

        /// Longitude column name
        #[arg(long, default_value = "Longitude")]
        longitude: String,

        /// Keep coordinates lying exactly on the range boundary
        #[arg(long)]
        inclusive: bool,
    },

    /// Remove whole groups of near-identical rows
    FilterDuplicates {
        /// Path to input CSV
        #[arg(short, long)]
        input: PathBuf,

        /// Output path for the filtered CSV
        #[arg(short, long)]
        output: PathBuf,

        /// Comma-separated grouping columns
        #[arg(short, long)]
        columns: String,

        /// Group size at which a cluster is removed
        #[arg(short, long, default_value = "10")]
        group_size: usize,
    },

    /// Remove rows whose GPS fix merely repeats the grid center
    FilterGeolocation {
        /// Path to input CSV
        #[arg(short, long)]
        input: PathBuf,

        /// Output path for the filtered CSV
        #[arg(short, long)]
        output: PathBuf,

        /// GPS latitude column name
        #[arg(long, default_value = "Latitude")]
        latitude: String,

        /// GPS longitude column name
        #[arg(long, default_value = "Longitude")]
        longitude: String,

        /// Grid-center latitude column name
        #[arg(long, default_value = "MGRSLatitude")]
        grid_latitude: String,

        /// Grid-center longitude column name
        #[arg(long, default_value = "MGRSLongitude")]
        grid_longitude: String,
    },

    /// Run a pipeline from a YAML configuration file
    Run {
        /// Path to pipeline configuration YAML
        #[arg(short, long)]
        config: PathBuf,

        /// Path to input CSV
        #[arg(short, long)]
        input: PathBuf,

        /// Output path for the processed CSV
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Profile the completeness of a CSV
    Profile {
        /// Path to input CSV
        #[arg(short, long)]
        input: PathBuf,

        /// Output format: text, json, or yaml
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Clean and flag raw mosquito habitat data
    Mosquito {
        /// Path to raw input CSV
        #[arg(short, long)]
        input: PathBuf,

        /// Output path for the flagged CSV
        #[arg(short, long)]
        output: PathBuf,

        /// Keep only rows with an identified genus
        #[arg(long)]
        has_genus: bool,

        /// Keep only rows with a container water source
        #[arg(long)]
        is_container: bool,

        /// Keep only rows with at least one valid photo
        #[arg(long)]
        has_photos: bool,

        /// Keep only rows with at least this many larvae
        #[arg(long)]
        min_larvae: Option<i64>,
    },

    /// Clean and flag raw land cover data
    Landcover {
        /// Path to raw input CSV
        #[arg(short, long)]
        input: PathBuf,

        /// Output path for the flagged CSV
        #[arg(short, long)]
        output: PathBuf,

        /// Keep only rows with at least one classification
        #[arg(long)]
        has_classification: bool,

        /// Keep only rows with at least one valid photo
        #[arg(long)]
        has_photo: bool,

        /// Keep only rows classified in all four directions
        #[arg(long)]
        has_all_classifications: bool,

        /// Keep only rows with valid photos in all six directions
        #[arg(long)]
        has_all_photos: bool,
    },

    /// Generate an example pipeline configuration
    Example {
        /// Output path for the example YAML
        #[arg(short, long, default_value = "pipeline.yaml")]
        output: PathBuf,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::FilterCoords {
            input,
            output,
            latitude,
            longitude,
            inclusive,
        } => cmd_filter_coords(&input, &output, &latitude, &longitude, inclusive),

        Commands::FilterDuplicates {
            input,
            output,
            columns,
            group_size,
        } => cmd_filter_duplicates(&input, &output, &columns, group_size),

        Commands::FilterGeolocation {
            input,
            output,
            latitude,
            longitude,
            grid_latitude,
            grid_longitude,
        } => cmd_filter_geolocation(
            &input,
            &output,
            &latitude,
            &longitude,
            &grid_latitude,
            &grid_longitude,
        ),

        Commands::Run {
            config,
            input,
            output,
        } => cmd_run(&config, &input, &output),

        Commands::Profile { input, format } => cmd_profile(&input, &format),

        Commands::Mosquito {
            input,
            output,
            has_genus,
            is_container,
            has_photos,
            min_larvae,
        } => cmd_mosquito(
            &input,
            &output,
            mosquito::QualityFilter {
                has_genus,
                is_container,
                has_photos,
                min_larvae_count: min_larvae,
            },
        ),

        Commands::Landcover {
            input,
            output,
            has_classification,
            has_photo,
            has_all_classifications,
            has_all_photos,
        } => cmd_landcover(
            &input,
            &output,
            landcover::QualityFilter {
                has_classification,
                has_photo,
                has_all_classifications,
                has_all_photos,
            },
        ),

        Commands::Example { output } => cmd_example(&output),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn load_table(input_path: &PathBuf) -> Result<ObservationTable> {
    eprintln!("Loading observations from {:?}...", input_path);
    let table = ObservationTable::from_csv(input_path)?;
    eprintln!(
        "Loaded {} rows x {} columns",
        table.n_rows(),
        table.n_columns()
    );
    Ok(table)
}

fn write_table(table: &ObservationTable, output_path: &PathBuf) -> Result<()> {
    eprintln!("Writing {} rows to {:?}...", table.n_rows(), output_path);
    table.to_csv(output_path)
}

/// Filter out rows with invalid coordinates
fn cmd_filter_coords(
    input_path: &PathBuf,
    output_path: &PathBuf,
    latitude: &str,
    longitude: &str,
    inclusive: bool,
) -> Result<()> {
    let table = load_table(input_path)?;

    let bounds = if inclusive {
        CoordBounds::Inclusive
    } else {
        CoordBounds::Exclusive
    };
    let (filtered, stats) = filter_invalid_coords_with_stats(&table, latitude, longitude, bounds)?;
    println!("{}", stats);

    write_table(&filtered, output_path)
}

/// Filter out over-duplicated row groups
fn cmd_filter_duplicates(
    input_path: &PathBuf,
    output_path: &PathBuf,
    columns: &str,
    group_size: usize,
) -> Result<()> {
    let table = load_table(input_path)?;

    let columns: Vec<String> = columns
        .split(',')
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect();
    eprintln!("Grouping on {:?} with group size {}", columns, group_size);

    let (filtered, stats) = filter_duplicates_with_stats(&table, &columns, group_size)?;
    println!("{}", stats);

    write_table(&filtered, output_path)
}

/// Filter out rows with grid-center coordinates in the GPS columns
fn cmd_filter_geolocation(
    input_path: &PathBuf,
    output_path: &PathBuf,
    latitude: &str,
    longitude: &str,
    grid_latitude: &str,
    grid_longitude: &str,
) -> Result<()> {
    let table = load_table(input_path)?;

    let (filtered, stats) = filter_poor_geolocation_with_stats(
        &table,
        latitude,
        longitude,
        grid_latitude,
        grid_longitude,
    )?;
    println!("{}", stats);

    write_table(&filtered, output_path)
}

/// Run a pipeline from configuration
fn cmd_run(config_path: &PathBuf, input_path: &PathBuf, output_path: &PathBuf) -> Result<()> {
    eprintln!("Loading pipeline configuration from {:?}...", config_path);
    let config_str = std::fs::read_to_string(config_path)?;
    let config = PipelineConfig::from_yaml(&config_str)?;

    let table = load_table(input_path)?;

    eprintln!("Running pipeline '{}'...", config.name);
    let pipeline = Pipeline::from_config(&config);
    let (processed, report) = pipeline.run(&table)?;

    println!("{}", report);
    write_table(&processed, output_path)?;

    eprintln!("Done! {} rows removed", report.rows_removed());
    Ok(())
}

/// Profile table completeness
fn cmd_profile(input_path: &PathBuf, format: &str) -> Result<()> {
    let table = load_table(input_path)?;

    let profile = profile_completeness(&table);

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&profile)?),
        "yaml" => println!("{}", serde_yaml::to_string(&profile)?),
        _ => print!("{}", profile),
    }

    Ok(())
}

/// Clean, flag, and optionally quality-filter raw mosquito habitat data
fn cmd_mosquito(
    input_path: &PathBuf,
    output_path: &PathBuf,
    criteria: mosquito::QualityFilter,
) -> Result<()> {
    let table = load_table(input_path)?;

    eprintln!("Cleaning...");
    let mut cleaned = mosquito::apply_cleanup(&table)?;
    eprintln!("Adding flags...");
    mosquito::add_flags(&mut cleaned)?;

    let flagged = mosquito::quality_filter(&cleaned, criteria)?;
    if flagged.n_rows() < cleaned.n_rows() {
        eprintln!(
            "Quality filter kept {} of {} rows",
            flagged.n_rows(),
            cleaned.n_rows()
        );
    }

    write_table(&flagged, output_path)
}

/// Clean, flag, and optionally quality-filter raw land cover data
fn cmd_landcover(
    input_path: &PathBuf,
    output_path: &PathBuf,
    criteria: landcover::QualityFilter,
) -> Result<()> {
    let table = load_table(input_path)?;

    eprintln!("Cleaning...");
    let mut cleaned = landcover::apply_cleanup(&table)?;
    eprintln!("Adding flags...");
    landcover::add_flags(&mut cleaned)?;

    let flagged = landcover::quality_filter(&cleaned, criteria)?;
    if flagged.n_rows() < cleaned.n_rows() {
        eprintln!(
            "Quality filter kept {} of {} rows",
            flagged.n_rows(),
            cleaned.n_rows()
        );
    }

    write_table(&flagged, output_path)
}

/// Generate example pipeline configuration
fn cmd_example(output_path: &PathBuf) -> Result<()> {
    let config = mosquito_pipeline().to_config(Some(
        "Standard cleanup and flag pipeline for mosquito habitat data",
    ));
    let yaml = config.to_yaml()?;

    std::fs::write(output_path, &yaml)?;
    eprintln!("Wrote example pipeline to {:?}", output_path);
    eprintln!();
    eprintln!("Contents:");
    println!("{}", yaml);

    Ok(())
}
