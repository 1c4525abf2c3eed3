//! # Bulbo CLI
//!
//! Runs one shallow-footing analysis from the terminal and prints the
//! technical summary followed by its JSON. The request comes either from a
//! JSON file (`--request`) or from a catalog soil plus footing flags.
//!
//! ```text
//! geo_cli --soil "Areia Média" -L 2 -B 2 -q 200 --embedment 1 --shape square --csv bulb.csv
//! ```
//!
//! Set `RUST_LOG=debug` for solver timing and validation details.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use geo_core::equations::BearingFactorMethod;
use geo_core::file_io::{export_bulb_csv, export_outcome_json, load_project, load_request, save_project, FileLock};
use geo_core::models::FootingShape;
use geo_core::validation::nbr::{LoadCombination, SoilClass, StructureType};
use geo_core::{analyze, AnalysisRequest, GeoError, GeoResult, Project, Settings, SoilDatabase, TechnicalSummary, UnitSystem};
use structopt::StructOpt;

/// Command line options
#[derive(StructOpt, Debug)]
#[structopt(
    name = "geo_cli",
    about = "Stress bulb, bearing capacity and settlement of a shallow footing"
)]
struct Options {
    /// Catalog soil name (case-insensitive)
    #[structopt(long, default_value = "Areia Média")]
    soil: String,

    /// Footing length L (m)
    #[structopt(short = "L", long, default_value = "2.0")]
    length: f64,

    /// Footing width B (m)
    #[structopt(short = "B", long, default_value = "2.0")]
    width: f64,

    /// Applied pressure q (kPa)
    #[structopt(short = "q", long, default_value = "200.0")]
    pressure: f64,

    /// Deepest grid level (m); 3 × the greatest footing dimension when omitted
    #[structopt(long)]
    depth_end: Option<f64>,

    /// Points per grid axis
    #[structopt(short = "n", long, default_value = "20")]
    resolution: usize,

    /// Embedment depth Df (m)
    #[structopt(long, default_value = "0.0")]
    embedment: f64,

    /// strip | square | circular | rectangular
    #[structopt(long, default_value = "rectangular", parse(try_from_str = parse_shape))]
    shape: FootingShape,

    /// terzaghi | vesic
    #[structopt(long, default_value = "terzaghi", parse(try_from_str = parse_method))]
    method: BearingFactorMethod,

    /// Water table depth below ground (m)
    #[structopt(long)]
    water_table: Option<f64>,

    /// Rigid footing
    #[structopt(long)]
    rigid: bool,

    /// Load inclination from the vertical (degrees)
    #[structopt(long, default_value = "0.0")]
    inclination: f64,

    /// Load eccentricity along the width (m)
    #[structopt(long, default_value = "0.0")]
    ecc_width: f64,

    /// Load eccentricity along the length (m)
    #[structopt(long, default_value = "0.0")]
    ecc_length: f64,

    /// Apply Hansen depth factors
    #[structopt(long)]
    depth_factors: bool,

    /// NBR 6122 load combination: normal | special | exceptional
    #[structopt(long, parse(try_from_str = parse_combination))]
    combination: Option<LoadCombination>,

    /// NBR 6122 structure: ordinary_building | tall_building | bridge_viaduct | tank_silo
    #[structopt(long, parse(try_from_str = parse_structure))]
    structure: Option<StructureType>,

    /// Soil class for the presumptive pressure (overrides the catalog's)
    #[structopt(long, parse(try_from_str = parse_soil_class))]
    soil_class: Option<SoilClass>,

    /// SI | MKS | imperial
    #[structopt(long, default_value = "SI", parse(try_from_str = parse_units))]
    units: UnitSystem,

    /// Read the whole request from a JSON file instead of the flags above
    #[structopt(long, parse(from_os_str))]
    request: Option<PathBuf>,

    /// Soil catalog TOML replacing the built-in one
    #[structopt(long, parse(from_os_str))]
    catalog: Option<PathBuf>,

    /// Settings TOML
    #[structopt(long, parse(from_os_str))]
    config: Option<PathBuf>,

    /// Write the stress bulb as CSV
    #[structopt(long, parse(from_os_str))]
    csv: Option<PathBuf>,

    /// Write the full outcome as JSON
    #[structopt(long, parse(from_os_str))]
    json: Option<PathBuf>,

    /// Append the request to a .bulbo project file (created if missing)
    #[structopt(long, parse(from_os_str))]
    project: Option<PathBuf>,

    /// Lock owner when writing the project
    #[structopt(long, default_value = "geo_cli")]
    engineer: String,

    /// List catalog soils and exit
    #[structopt(long)]
    list_soils: bool,
}

fn parse_shape(s: &str) -> Result<FootingShape, String> {
    match s.trim().to_lowercase().as_str() {
        "strip" => Ok(FootingShape::Strip),
        "square" => Ok(FootingShape::Square),
        "circular" => Ok(FootingShape::Circular),
        "rectangular" => Ok(FootingShape::Rectangular),
        other => Err(format!("unknown shape '{}'", other)),
    }
}

fn parse_method(s: &str) -> Result<BearingFactorMethod, String> {
    match s.trim().to_lowercase().as_str() {
        "terzaghi" => Ok(BearingFactorMethod::Terzaghi),
        "vesic" => Ok(BearingFactorMethod::Vesic),
        other => Err(format!("unknown bearing method '{}'", other)),
    }
}

/// Match `s` against the snake_case serde names of `options`
fn parse_named<T: Copy + serde::Serialize>(s: &str, options: &[T], what: &str) -> Result<T, String> {
    let wanted = s.trim().to_lowercase().replace(['-', ' '], "_");
    options
        .iter()
        .copied()
        .find(|o| serde_json::to_value(o).ok().and_then(|v| v.as_str().map(|n| n == wanted)) == Some(true))
        .ok_or_else(|| format!("unknown {} '{}'", what, s))
}

fn parse_combination(s: &str) -> Result<LoadCombination, String> {
    parse_named(s, &LoadCombination::ALL, "load combination")
}

fn parse_structure(s: &str) -> Result<StructureType, String> {
    parse_named(s, &StructureType::ALL, "structure type")
}

fn parse_soil_class(s: &str) -> Result<SoilClass, String> {
    parse_named(s, &SoilClass::ALL, "soil class")
}

fn parse_units(s: &str) -> Result<UnitSystem, String> {
    UnitSystem::ALL
        .iter()
        .copied()
        .find(|u| u.to_string().eq_ignore_ascii_case(s.trim()))
        .ok_or_else(|| format!("unknown unit system '{}'", s))
}

fn load_catalog(options: &Options) -> GeoResult<SoilDatabase> {
    match &options.catalog {
        Some(path) => SoilDatabase::load_catalog(path),
        None => SoilDatabase::builtin().map(|db| (*db).clone()),
    }
}

fn build_request(options: &Options, catalog: &SoilDatabase) -> GeoResult<AnalysisRequest> {
    if let Some(path) = &options.request {
        log::info!("Reading request from {}", path.display());
        return load_request(path);
    }

    let entry = catalog.lookup(&options.soil)?;
    let mut request = AnalysisRequest::for_catalog_soil(entry, options.length, options.width, options.pressure);
    request.label = format!("{} {}×{} m", entry.name, options.length, options.width);
    request.grid.resolution = options.resolution;
    if let Some(depth_end) = options.depth_end {
        request.grid.depth_end = depth_end;
    }
    request.embedment_depth_m = options.embedment;
    request.shape = options.shape;
    request.bearing_method = options.method;
    request.water_table_depth_m = options.water_table;
    request.rigid = options.rigid;
    request.bearing_options.load_inclination_deg = options.inclination;
    request.bearing_options.eccentricity_width_m = options.ecc_width;
    request.bearing_options.eccentricity_length_m = options.ecc_length;
    request.bearing_options.depth_factors = options.depth_factors;
    request.load_combination = options.combination;
    request.structure_type = options.structure;
    if options.soil_class.is_some() {
        request.soil_class = options.soil_class;
    }
    Ok(request)
}

fn append_to_project(path: &Path, owner: &str, request: &AnalysisRequest) -> GeoResult<()> {
    let _lock = FileLock::acquire(path, owner)?;
    let mut project = if path.exists() {
        load_project(path)?
    } else {
        Project::new(owner, "", "")
    };
    project.add_analysis(request.clone());
    save_project(&project, path)
}

fn run(options: &Options) -> GeoResult<bool> {
    let catalog = load_catalog(options)?;

    if options.list_soils {
        for entry in catalog.entries() {
            println!(
                "{:<14} γ={:>5.1}  φ={:>4.1}  c={:>5.1}  E={:>8.0}  {}",
                entry.name, entry.unit_weight, entry.friction_angle, entry.cohesion, entry.elastic_modulus, entry.description
            );
        }
        return Ok(true);
    }

    let settings = match &options.config {
        Some(path) => Settings::from_toml_file(path)?,
        None => Settings::default(),
    };

    let request = build_request(options, &catalog)?;
    let outcome = analyze(&request, &settings)?;
    let summary = TechnicalSummary::from_outcome(&outcome);

    println!("{}", summary.render_text(options.units));

    if let Some(path) = &options.csv {
        let rows = export_bulb_csv(&outcome, path)?;
        println!("Stress bulb: {} rows written to {}", rows, path.display());
    }
    if let Some(path) = &options.json {
        export_outcome_json(&outcome, path)?;
        println!("Full outcome written to {}", path.display());
    }
    if let Some(path) = &options.project {
        append_to_project(path, &options.engineer, &request)?;
        println!("Request added to project {}", path.display());
    }

    println!();
    println!("JSON Output (for LLM/API use):");
    let json = serde_json::to_string_pretty(&summary).map_err(GeoError::serialization)?;
    println!("{}", json);

    Ok(summary.passes())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let options = Options::from_args();

    match run(&options) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            for violation in e.violations() {
                eprintln!("  - {}", violation);
            }
            if let Ok(json) = serde_json::to_string_pretty(&e) {
                eprintln!();
                eprintln!("Error JSON:");
                eprintln!("{}", json);
            }
            ExitCode::from(2)
        }
    }
}
