//! GA TSP Solver - Command Line Interface
//!
//! Evolves a shortest closed tour through a set of 2-D cities with an
//! elitist genetic algorithm.

use clap::{Parser, Subcommand, ValueEnum};
use ga_tsp_solver::benchmark::{Benchmark, BenchmarkConfig};
use ga_tsp_solver::config::RunConfig;
use ga_tsp_solver::error::Result;
use ga_tsp_solver::heuristics::construction::SeedingKind;
use ga_tsp_solver::heuristics::genetic::GeneticAlgorithm;
use ga_tsp_solver::instance::CityTable;
use ga_tsp_solver::output::{create_unique_dir, TextFileSink};
use ga_tsp_solver::visualization::{ImageFormat, NoRender, RouteRenderer, Visualizer};

use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "ga-tsp-solver")]
#[command(version = "1.0")]
#[command(about = "Elitist genetic algorithm for the Euclidean TSP")]
struct Cli {
    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evolve a tour and write the run artifacts
    Solve {
        /// JSON run configuration; flags below override its fields
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Coordinate file
        #[arg(long)]
        cities: Option<PathBuf>,

        /// Population size
        #[arg(short, long)]
        population: Option<usize>,

        /// Number of generations
        #[arg(short, long)]
        generations: Option<usize>,

        /// Random seed
        #[arg(short, long)]
        seed: Option<u64>,

        /// Seeding strategy
        #[arg(long, value_enum)]
        seeding: Option<Seeding>,

        /// Base name of the run directory
        #[arg(short, long)]
        output_dir: Option<String>,

        /// File name of the best tour inside the run directory
        #[arg(long)]
        best_tour_file: Option<String>,

        /// Do not draw routes
        #[arg(long)]
        no_render: bool,

        /// Write images as PNG instead of SVG
        #[arg(long)]
        png: bool,

        /// Also write the solution as JSON
        #[arg(long)]
        json: Option<PathBuf>,
    },

    /// Compare the seeding strategies over several seeds
    Compare {
        /// Coordinate file
        #[arg(long)]
        cities: PathBuf,

        /// Number of runs per strategy
        #[arg(short, long, default_value = "10")]
        runs: usize,

        #[arg(short, long, default_value = "20")]
        population: usize,

        #[arg(short, long, default_value = "2000")]
        generations: usize,

        /// Seed of the first run
        #[arg(short, long, default_value = "23432")]
        seed: u64,

        /// Run one seed at a time
        #[arg(long)]
        sequential: bool,

        /// Directory for runs.csv, summary.csv and report.txt
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Analyze a coordinate file
    Analyze {
        /// Coordinate file
        #[arg(long)]
        cities: PathBuf,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
enum Seeding {
    /// Uniformly random permutations
    Random,
    /// Nearest neighbor tours from random starts, jittered by swaps
    Greedy,
}

impl From<Seeding> for SeedingKind {
    fn from(seeding: Seeding) -> Self {
        match seeding {
            Seeding::Random => SeedingKind::UniformRandom,
            Seeding::Greedy => SeedingKind::NearestNeighbor,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let verbose = cli.verbose;
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let outcome = match cli.command {
        Commands::Solve {
            config,
            cities,
            population,
            generations,
            seed,
            seeding,
            output_dir,
            best_tour_file,
            no_render,
            png,
            json,
        } => load_run_config(config.as_deref()).and_then(|mut run| {
            if let Some(cities) = cities {
                run.cities = Some(cities);
            }
            if let Some(population) = population {
                run.population_size = population;
            }
            if let Some(generations) = generations {
                run.generations = generations;
            }
            if let Some(seed) = seed {
                run.seed = seed;
            }
            if let Some(seeding) = seeding {
                run.seeding = seeding.into();
            }
            if let Some(output_dir) = output_dir {
                run.output_dir = output_dir;
            }
            if let Some(best_tour_file) = best_tour_file {
                run.best_tour_file = best_tour_file;
            }
            if no_render {
                run.render = false;
            }
            if png {
                run.image_format = ImageFormat::Png;
            }
            solve(&run, json.as_deref(), verbose)
        }),

        Commands::Compare {
            cities,
            runs,
            population,
            generations,
            seed,
            sequential,
            output,
        } => {
            let config = BenchmarkConfig {
                runs,
                population_size: population,
                generations,
                base_seed: seed,
                parallel: !sequential,
            };
            compare_seedings(&cities, config, output.as_deref())
        }

        Commands::Analyze { cities } => analyze_cities(&cities),
    };

    if let Err(e) = outcome {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn load_run_config(path: Option<&Path>) -> Result<RunConfig> {
    match path {
        Some(path) => RunConfig::load(path),
        None => Ok(RunConfig::default()),
    }
}

/// `base` may carry parent directories; only its last component is made unique
fn provision_run_dir(base: &str) -> Result<PathBuf> {
    let base = Path::new(base);
    let parent = match base.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&parent)?;

    let name = base
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "Routes".to_string());
    create_unique_dir(&parent, &name)
}

fn solve(run: &RunConfig, json: Option<&Path>, verbose: bool) -> Result<()> {
    let ga_config = run.ga_config()?;
    let path = run.cities_path()?;

    println!("Loading cities from {:?}...", path);
    let cities = CityTable::from_file(path)?;

    if verbose {
        println!("{}", cities.statistics());
    }

    let run_dir = provision_run_dir(&run.output_dir)?;
    println!(
        "Evolving {} tours for {} generations ({} seeding, seed {})...",
        ga_config.population_size, ga_config.generations, ga_config.seeding, ga_config.seed
    );

    let progress = ProgressBar::new(ga_config.generations as u64);
    let template = "{bar:40} {pos}/{len} gen  {msg}  [{elapsed_precise}]";
    if let Ok(style) = ProgressStyle::with_template(template) {
        progress.set_style(style);
    }

    let mut renderer: Box<dyn RouteRenderer> = if run.render {
        Box::new(Visualizer::with_format(run.image_format))
    } else {
        Box::new(NoRender)
    };
    let mut sink = TextFileSink::new(run_dir.join(&run.best_tour_file));

    let mut ga = GeneticAlgorithm::new(cities, ga_config)?.with_progress(progress);
    let solution = ga.run(renderer.as_mut(), &mut sink, &run_dir)?;

    let stats_path = run_dir.join("statistics.csv");
    ga.statistics().export_to_csv(&stats_path)?;
    let chart_path = Visualizer::with_format(run.image_format)
        .save_convergence_chart(ga.statistics(), &run_dir)?;

    println!("\n========== Results ==========");
    println!("Minimum length: {:.4}", solution.length);
    println!("Seeding: {}", solution.seeding);
    println!("Generations: {}", solution.generations);
    println!("Time: {:.4}s", solution.computation_time);
    println!("Run directory: {:?}", run_dir);
    println!("Best tour: {:?}", sink.path);
    println!("Statistics: {:?}", stats_path);
    println!("Convergence chart: {:?}", chart_path);

    if verbose {
        println!("\nTour: {:?}", solution.tour);
    }

    if let Some(out_path) = json {
        let text = serde_json::to_string_pretty(&solution)?;
        std::fs::write(out_path, text)?;
        println!("Solution saved to {:?}", out_path);
    }

    Ok(())
}

fn compare_seedings(path: &Path, config: BenchmarkConfig, output: Option<&Path>) -> Result<()> {
    let cities = CityTable::from_file(path)?;

    println!(
        "Comparing seeding strategies on {} (n={}, {} runs each)...\n",
        cities.name,
        cities.len(),
        config.runs
    );

    let mut benchmark = Benchmark::new(config);
    benchmark.run_all(&cities)?;

    let report = benchmark.generate_report();
    println!("{}", report);

    if let Some(output) = output {
        std::fs::create_dir_all(output)?;

        let results_path = output.join("runs.csv");
        benchmark.export_to_csv(&results_path)?;
        println!("Results exported to {:?}", results_path);

        let stats_path = output.join("summary.csv");
        benchmark.export_statistics_csv(&stats_path)?;
        println!("Statistics exported to {:?}", stats_path);

        let report_path = output.join("report.txt");
        std::fs::write(&report_path, &report)?;
        println!("Report saved to {:?}", report_path);
    }

    Ok(())
}

fn analyze_cities(path: &Path) -> Result<()> {
    let cities = CityTable::from_file(path)?;

    println!("========== City Table Analysis ==========\n");
    println!("{}", cities.statistics());

    Ok(())
}
