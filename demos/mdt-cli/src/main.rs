//! mdt — road-network emissions from the command line.
//!
//! Builds the structural network from saved Overpass responses (or a live
//! Overpass endpoint / OSM PBF extract with the matching feature), attaches
//! hourly traffic flow and survey vehicle mixes, computes hourly emissions
//! and prints the network summary.
//!
//! ```text
//! mdt --config mdt.toml --temperature 4 --modifiers 1,0.8,1,1,1.2
//! RUST_LOG=debug mdt --overpass-json centre.json --flow flow.json --json
//! ```

mod settings;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use clap::Parser;
use log::info;

use mdt_core::{FIRST_HOUR, HOURS};
use mdt_emissions::EmissionsConfig;
use mdt_ingest::{load_flow_json, load_overpass_json, load_survey_csv, network_from_ways};
use mdt_network::{NetworkSummary, Network};
use mdt_pipeline::{PipelineBuilder, PipelineObserver, Stage};

use settings::Settings;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Settings file.  Missing means defaults.
    #[arg(long, short, default_value = "mdt.toml")]
    config: PathBuf,

    /// Saved Overpass JSON responses, merged in order.
    #[arg(long, value_delimiter = ',')]
    overpass_json: Vec<PathBuf>,

    /// Overpass QL query files to run live (feature `overpass`).
    #[arg(long, value_delimiter = ',')]
    overpass_query: Vec<PathBuf>,

    /// OSM PBF extract (feature `osm`).
    #[arg(long)]
    pbf: Option<PathBuf>,

    /// Flow dataset JSON.
    #[arg(long)]
    flow: Option<PathBuf>,

    /// Traffic count CSV.
    #[arg(long)]
    survey: Option<PathBuf>,

    /// Emission parameter TOML replacing the built-in tables.
    #[arg(long)]
    emissions: Option<PathBuf>,

    /// Ambient temperature, °C.
    #[arg(long, allow_hyphen_values = true)]
    temperature: Option<f64>,

    /// Petrol share of car and van fleets.
    #[arg(long)]
    petrol_share: Option<f64>,

    /// Five vehicle-category modifiers: two-wheeled, car, bus, van, HGV.
    #[arg(long, value_delimiter = ',')]
    modifiers: Option<Vec<f64>>,

    /// Segment ids to close before computing emissions.
    #[arg(long, value_delimiter = ',')]
    close: Vec<u64>,

    /// Simplify until no more joins are possible.
    #[arg(long)]
    until_stable: bool,

    /// Also simplify the structural network.
    #[arg(long)]
    simplify_topology: bool,

    /// Skip simplification of the flow network.
    #[arg(long)]
    no_simplify_flow: bool,

    /// Print the summary as JSON.
    #[arg(long)]
    json: bool,
}

/// Logs stage timings.
struct StageTimer {
    started: Instant,
}

impl PipelineObserver for StageTimer {
    fn on_stage_start(&mut self, _stage: Stage) {
        self.started = Instant::now();
    }

    fn on_stage_end(&mut self, stage: Stage, network: &Network) {
        info!(
            "{stage}: {:.2?} ({} segments)",
            self.started.elapsed(),
            network.segment_count()
        );
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let mut settings = Settings::load(&args.config)?;
    apply_overrides(&mut settings, &args)?;

    let emissions = match &settings.inputs.emissions {
        Some(path) => EmissionsConfig::load(path).with_context(|| format!("loading {}", path.display()))?,
        None => EmissionsConfig::default(),
    };

    let mut builder = PipelineBuilder::new()
        .emissions(emissions)
        .config(settings.pipeline_config());

    builder = add_topology(builder, &settings)?;

    let flow_path = settings
        .inputs
        .flow
        .as_ref()
        .context("no flow dataset: set inputs.flow or pass --flow")?;
    builder = builder.flow_network(
        load_flow_json(flow_path).with_context(|| format!("loading {}", flow_path.display()))?,
    );

    if let Some(path) = &settings.inputs.survey {
        builder = builder.survey(load_survey_csv(path)?);
    }

    let t0 = Instant::now();
    let output = builder
        .build()?
        .run(&mut StageTimer { started: Instant::now() })?;
    info!("pipeline finished in {:.2?}", t0.elapsed());

    if args.json {
        println!("{}", serde_json::to_string_pretty(&output.summary)?);
    } else {
        print_summary(&output.summary);
    }
    Ok(())
}

fn apply_overrides(settings: &mut Settings, args: &Args) -> Result<()> {
    let inputs = &mut settings.inputs;
    if !args.overpass_json.is_empty() {
        inputs.overpass_json = args.overpass_json.clone();
    }
    if !args.overpass_query.is_empty() {
        inputs.overpass_queries = args.overpass_query.clone();
    }
    if args.pbf.is_some() {
        inputs.pbf = args.pbf.clone();
    }
    if args.flow.is_some() {
        inputs.flow = args.flow.clone();
    }
    if args.survey.is_some() {
        inputs.survey = args.survey.clone();
    }
    if args.emissions.is_some() {
        inputs.emissions = args.emissions.clone();
    }

    let scenario = &mut settings.scenario;
    if let Some(t) = args.temperature {
        scenario.temperature_c = t;
    }
    if let Some(p) = args.petrol_share {
        scenario.petrol_share = p;
    }
    if let Some(m) = &args.modifiers {
        let m: [f64; 5] = m
            .as_slice()
            .try_into()
            .with_context(|| format!("--modifiers needs 5 values, got {}", m.len()))?;
        scenario.modifiers = Some(m);
    }

    if !args.close.is_empty() {
        settings.pipeline.closed = args.close.clone();
    }
    if args.until_stable {
        settings.pipeline.until_stable = true;
    }
    if args.simplify_topology {
        settings.pipeline.simplify_topology = true;
    }
    if args.no_simplify_flow {
        settings.pipeline.simplify_flow = false;
    }
    Ok(())
}

fn add_topology(mut builder: PipelineBuilder, settings: &Settings) -> Result<PipelineBuilder> {
    let inputs = &settings.inputs;

    for path in &inputs.overpass_json {
        let ways = load_overpass_json(path).with_context(|| format!("loading {}", path.display()))?;
        builder = builder.topology_network(network_from_ways(ways)?);
    }

    if !inputs.overpass_queries.is_empty() {
        builder = add_overpass_queries(builder, inputs)?;
    }

    if let Some(pbf) = &inputs.pbf {
        builder = add_pbf(builder, pbf)?;
    }

    if inputs.overpass_json.is_empty() && inputs.overpass_queries.is_empty() && inputs.pbf.is_none() {
        bail!("no topology input: set inputs.overpass_json, inputs.overpass_queries or inputs.pbf");
    }
    Ok(builder)
}

#[cfg(feature = "overpass")]
fn add_overpass_queries(builder: PipelineBuilder, inputs: &settings::Inputs) -> Result<PipelineBuilder> {
    use mdt_ingest::overpass::OverpassSource;

    let queries = inputs
        .overpass_queries
        .iter()
        .map(|p| std::fs::read_to_string(p).with_context(|| format!("reading {}", p.display())))
        .collect::<Result<Vec<_>>>()?;
    let source = match &inputs.overpass_url {
        Some(url) => OverpassSource::with_endpoint(url.clone(), queries),
        None => OverpassSource::new(queries),
    };
    Ok(builder.topology_source(source))
}

#[cfg(not(feature = "overpass"))]
fn add_overpass_queries(_builder: PipelineBuilder, _inputs: &settings::Inputs) -> Result<PipelineBuilder> {
    bail!("live Overpass queries need the `overpass` feature")
}

#[cfg(feature = "osm")]
fn add_pbf(builder: PipelineBuilder, path: &std::path::Path) -> Result<PipelineBuilder> {
    Ok(builder.topology_source(mdt_ingest::osm::OsmPbfSource::new(path)))
}

#[cfg(not(feature = "osm"))]
fn add_pbf(_builder: PipelineBuilder, _path: &std::path::Path) -> Result<PipelineBuilder> {
    bail!("PBF input needs the `osm` feature")
}

fn print_summary(summary: &NetworkSummary) {
    println!("segments: {}", summary.segment_count);
    println!();
    println!("{:>5}  {:>10}  {:>12}  {:>9}", "hour", "speed km/h", "emissions g", "flow veh");
    for h in 0..HOURS {
        println!(
            "{:>3}:00  {:>10.2}  {:>12.2}  {:>9.2}",
            FIRST_HOUR as usize + h,
            summary.mean_speed[h],
            summary.mean_emissions[h],
            summary.mean_flow[h]
        );
    }

    let daily = summary.daily();
    println!();
    println!("daily mean speed:     {:.2} km/h", daily.speed.mean);
    println!("daily mean emissions: {:.2} g", daily.emissions.mean);
    println!("daily mean flow:      {:.2} veh/h", daily.flow.mean);
    println!("max segment speed:    {:.2} km/h", summary.max_mean_speed);

    match summary.worst_emitter {
        Some((id, e)) => println!("worst emitter:        {id} ({e:.2} g/h)"),
        None => println!("worst emitter:        none"),
    }
    match summary.most_congested {
        Some((id, spi)) => println!("most congested:       {id} (SPI {spi:.1})"),
        None => println!("most congested:       none qualifying"),
    }
}
