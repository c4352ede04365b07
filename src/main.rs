use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use worldgen::biomes::biome_histogram;
use worldgen::erosion::{ErosionParams, ErosionPreset, RiverWalk};
use worldgen::structures::PoiStrictness;
use worldgen::{preview, WorldConfig};

#[derive(Parser, Debug)]
#[command(name = "worldgen")]
#[command(about = "Generate a seeded 2D world: terrain, biomes, rivers, structures and cave tiles")]
struct Args {
    /// JSON configuration file; flags below override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Width of the grid in cells
    #[arg(short = 'W', long)]
    width: Option<usize>,

    /// Height of the grid in cells
    #[arg(short = 'H', long)]
    height: Option<usize>,

    /// Seed, integer or text (uses random seed if not specified)
    #[arg(short, long)]
    seed: Option<String>,

    /// Fractal noise octaves
    #[arg(long)]
    octaves: Option<u32>,

    /// Amplitude falloff per octave
    #[arg(long)]
    persistence: Option<f64>,

    /// Base noise frequency per cell
    #[arg(long)]
    scale: Option<f64>,

    /// Automaton initial fill probability
    #[arg(long)]
    fill: Option<f64>,

    /// Automaton birth threshold (filled neighbors)
    #[arg(long)]
    birth: Option<u8>,

    /// Automaton survival threshold (filled neighbors)
    #[arg(long)]
    death: Option<u8>,

    /// Automaton smoothing steps
    #[arg(long)]
    automata_iterations: Option<usize>,

    /// Erosion preset (replaces all erosion settings before the overrides below)
    #[arg(short, long, value_enum)]
    erosion: Option<ErosionPreset>,

    /// Thermal erosion passes
    #[arg(long)]
    thermal_iterations: Option<usize>,

    /// Thermal erosion talus threshold
    #[arg(long)]
    talus: Option<f32>,

    /// Box-filter smoothing passes
    #[arg(long)]
    smooth_iterations: Option<usize>,

    /// Rivers to carve
    #[arg(long)]
    rivers: Option<usize>,

    /// Keep rivers from stepping back into cells they already carved
    #[arg(long)]
    river_no_backtrack: bool,

    /// Cities requested
    #[arg(long)]
    cities: Option<usize>,

    /// Point-of-interest draws
    #[arg(long)]
    pois: Option<usize>,

    /// Redraw unmatched POI cells up to this many times instead of dropping them
    #[arg(long)]
    poi_retries: Option<usize>,

    /// Write a biome preview with rivers and structures (PNG)
    #[arg(long)]
    preview: Option<PathBuf>,

    /// Write the automaton mask preview (PNG)
    #[arg(long)]
    mask_preview: Option<PathBuf>,

    /// Export the whole world as JSON
    #[arg(long)]
    json: Option<PathBuf>,
}

impl Args {
    fn to_config(&self) -> worldgen::Result<WorldConfig> {
        let mut config = match &self.config {
            Some(path) => WorldConfig::from_json_file(path)?,
            None => WorldConfig::default(),
        };

        if let Some(v) = self.width { config.width = v; }
        if let Some(v) = self.height { config.height = v; }
        if let Some(v) = &self.seed { config.seed = Some(v.clone()); }

        if let Some(v) = self.octaves { config.noise.octaves = v; }
        if let Some(v) = self.persistence { config.noise.persistence = v; }
        if let Some(v) = self.scale { config.noise.scale = v; }

        if let Some(v) = self.fill { config.automata.fill_probability = v; }
        if let Some(v) = self.birth { config.automata.birth_threshold = v; }
        if let Some(v) = self.death { config.automata.death_threshold = v; }
        if let Some(v) = self.automata_iterations { config.automata.iterations = v; }

        if let Some(preset) = self.erosion {
            config.erosion = ErosionParams::from_preset(preset);
        }
        if let Some(v) = self.thermal_iterations { config.erosion.thermal_iterations = v; }
        if let Some(v) = self.talus { config.erosion.talus = v; }
        if let Some(v) = self.smooth_iterations { config.erosion.smooth_iterations = v; }
        if let Some(v) = self.rivers { config.erosion.river_count = v; }
        if self.river_no_backtrack { config.erosion.river_walk = RiverWalk::NoBacktrack; }

        if let Some(v) = self.cities { config.structures.cities = v; }
        if let Some(v) = self.pois { config.structures.pois = v; }
        if let Some(max_attempts) = self.poi_retries {
            config.structures.poi_strictness = PoiStrictness::Retry { max_attempts };
        }

        Ok(config)
    }
}

fn run(args: &Args) -> worldgen::Result<()> {
    let config = args.to_config()?;
    let world = worldgen::generate_world(&config)?;

    info!(seeds = %world.seeds, "seeds");
    for (biome, count) in biome_histogram(&world.biomes) {
        info!(
            biome = biome.name(),
            cells = count,
            percent = (1000.0 * count as f64 / world.biomes.len() as f64).round() / 10.0,
            "biome coverage"
        );
    }
    for structure in world.structures.iter() {
        info!(
            kind = structure.kind.id(),
            x = structure.x,
            y = structure.y,
            biome = structure.attributes.biome.name(),
            "structure"
        );
    }

    if let Some(path) = &args.preview {
        preview::save_png(&preview::render_world(&world), path)?;
        info!(path = %path.display(), "saved world preview");
    }
    if let Some(path) = &args.mask_preview {
        preview::save_png(&preview::render_mask(&world.mask), path)?;
        info!(path = %path.display(), "saved mask preview");
    }
    if let Some(path) = &args.json {
        world.write_json(path)?;
        info!(path = %path.display(), "exported world");
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}
