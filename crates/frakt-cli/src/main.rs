//! frakt CLI: render fractals, check formulas, estimate memory.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};

use frakt_core::config::EngineConfig;
use frakt_core::params::{FractalParameters, ImageSize, ParamValue};
use frakt_core::progress::ProgressInfo;
use frakt_core::region::ComplexRegion;
use frakt_core::result::FractalResult;
use frakt_engine::{CustomFormula, Generator, Julia, Mandelbrot};
use frakt_exec::{CancelToken, Executor};
use frakt_formula::{compile, find_template, RecommendedSettings};
use frakt_mem::ResourceManager;

#[derive(Parser)]
#[command(name = "frakt")]
#[command(about = "Escape-time fractal computation core", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute a fractal and print a summary (optionally dump the grid as JSON)
    Render {
        #[command(flatten)]
        request: RequestArgs,

        /// Worker threads (0 = hardware parallelism)
        #[arg(long, default_value = "0")]
        threads: usize,

        /// Write the result grid and metadata as JSON to this path
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Suppress progress output
        #[arg(short, long)]
        quiet: bool,
    },

    /// Compile a formula and report its metadata, or the typed rejection
    Check {
        /// Formula text, e.g. "z**2 + c"
        formula: String,
    },

    /// Print the memory estimate and downgrade plan for a proposed render
    Estimate {
        #[command(flatten)]
        request: RequestArgs,
    },
}

/// Flags shared by `render` and `estimate`, so an estimate invocation can
/// be upgraded to a render without editing anything but the verb.
#[derive(Args)]
struct RequestArgs {
    /// Generator: "mandelbrot", "julia", a template name, or use --formula
    #[arg(short, long, default_value = "mandelbrot")]
    generator: String,

    /// Custom iteration formula (overrides --generator)
    #[arg(short, long)]
    formula: Option<String>,

    #[arg(long, default_value = "-2.0")]
    re_min: f64,
    #[arg(long, default_value = "1.0")]
    re_max: f64,
    #[arg(long, default_value = "-1.5")]
    im_min: f64,
    #[arg(long, default_value = "1.5")]
    im_max: f64,

    #[arg(long, default_value = "800")]
    width: u32,
    #[arg(long, default_value = "600")]
    height: u32,

    #[arg(short = 'n', long, default_value = "1000")]
    iterations: u32,

    /// Escape radius override
    #[arg(long)]
    escape_radius: Option<f64>,

    /// Fixed c (real part) for Julia-style exploration
    #[arg(long)]
    c_real: Option<f64>,

    /// Fixed c (imaginary part) for Julia-style exploration
    #[arg(long)]
    c_imag: Option<f64>,
}

impl RequestArgs {
    fn parameters(&self) -> Result<FractalParameters, String> {
        let region = ComplexRegion::from_bounds(self.re_min, self.re_max, self.im_min, self.im_max)
            .map_err(|e| e.to_string())?;
        let size = ImageSize::new(self.width, self.height).map_err(|e| e.to_string())?;

        let mut custom = BTreeMap::new();
        if let Some(radius) = self.escape_radius {
            custom.insert("escape_radius".to_string(), ParamValue::Float(radius));
        }
        if self.c_real.is_some() || self.c_imag.is_some() {
            custom.insert(
                "c".to_string(),
                ParamValue::Complex {
                    re: self.c_real.unwrap_or(0.0),
                    im: self.c_imag.unwrap_or(0.0),
                },
            );
        }

        FractalParameters::new(region, self.iterations, size, custom).map_err(|e| e.to_string())
    }

    fn generator(&self, params: &FractalParameters) -> Result<Box<dyn Generator>, String> {
        if let Some(text) = &self.formula {
            let compiled = compile(text).map_err(|e| e.to_string())?;
            return Ok(Box::new(CustomFormula::from_params(compiled, params)));
        }
        match self.generator.as_str() {
            "mandelbrot" => Ok(Box::new(Mandelbrot::from_params(params))),
            "julia" => Ok(Box::new(Julia::from_params(params))),
            name => {
                let template = find_template(name)
                    .ok_or_else(|| format!("unknown generator or template '{name}'"))?;
                let compiled = compile(template.formula).map_err(|e| e.to_string())?;
                Ok(Box::new(CustomFormula::from_params(compiled, params)))
            }
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match cli.command {
        Commands::Render {
            request,
            threads,
            output,
            quiet,
        } => cmd_render(&request, threads, output.as_deref(), quiet),
        Commands::Check { formula } => cmd_check(&formula),
        Commands::Estimate { request } => cmd_estimate(&request),
    }
}

fn cmd_render(
    request: &RequestArgs,
    threads: usize,
    output: Option<&std::path::Path>,
    quiet: bool,
) -> ExitCode {
    let params = match request.parameters() {
        Ok(p) => p,
        Err(e) => return fail(&e),
    };
    let generator = match request.generator(&params) {
        Ok(g) => g,
        Err(e) => return fail(&e),
    };

    let mut config = EngineConfig::from_env();
    config.worker_threads = threads;
    // One progress line per percent, not per row.
    if config.progress_rows == 0 {
        config.progress_rows = (params.image_size().height() / 100).max(1);
    }
    let resources = Arc::new(ResourceManager::new(&config));
    let executor = match Executor::new(config, resources) {
        Ok(e) => e,
        Err(e) => return fail(&e.to_string()),
    };

    let progress = |info: &ProgressInfo| {
        eprintln!(
            "{:?}: {}/{} rows ({:.1}%), elapsed {:.1}s, remaining ~{:.1}s",
            info.status,
            info.current_step,
            info.total_steps,
            info.percentage(),
            info.elapsed.as_secs_f64(),
            info.estimated_remaining.as_secs_f64(),
        );
    };

    let cancel = CancelToken::new();
    let result = executor.calculate(
        generator.as_ref(),
        &params,
        if quiet { None } else { Some(&progress) },
        &cancel,
    );

    match result {
        Ok(result) => {
            print_summary(&result);
            if let Some(path) = output {
                if let Err(e) = write_result(path, &result) {
                    return fail(&format!("writing {}: {e}", path.display()));
                }
                println!("grid written to {}", path.display());
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            if let Some(plan) = e.optimization_plan() {
                eprintln!("downgrade plan: {}", plan_summary(plan));
            }
            fail(&e.to_string())
        }
    }
}

fn cmd_check(formula: &str) -> ExitCode {
    match compile(formula) {
        Ok(compiled) => {
            let variables: Vec<&str> = compiled
                .used_variables()
                .iter()
                .map(|v| v.as_str())
                .collect();
            let recommended = RecommendedSettings::for_formula(&compiled);
            println!("formula:          {}", compiled.source());
            println!("variables:        {}", variables.join(", "));
            println!("complexity:       {:.1}", compiled.complexity_score());
            println!("recommended:      {} iterations, escape radius {}",
                recommended.max_iterations, recommended.escape_radius);
            ExitCode::SUCCESS
        }
        Err(e) => fail(&format!("rejected: {e}")),
    }
}

fn cmd_estimate(request: &RequestArgs) -> ExitCode {
    let params = match request.parameters() {
        Ok(p) => p,
        Err(e) => return fail(&e),
    };
    let size = params.image_size();

    let config = EngineConfig::from_env();
    let resources = ResourceManager::new(&config);

    let estimated =
        ResourceManager::estimate_usage(size.width(), size.height(), params.max_iterations());
    let plan =
        resources.optimize_for_large_computation(size.width(), size.height(), params.max_iterations());

    println!("estimated:  {:.1} MiB", estimated as f64 / (1024.0 * 1024.0));
    println!(
        "available:  {:.1} MiB",
        plan.available_bytes as f64 / (1024.0 * 1024.0)
    );
    println!(
        "verdict:    {}",
        if plan.sufficient {
            "fits"
        } else {
            "does not fit comfortably"
        }
    );
    if !plan.sufficient {
        println!("plan:       {}", plan_summary(&plan));
    }
    ExitCode::SUCCESS
}

fn plan_summary(plan: &frakt_mem::OptimizationPlan) -> String {
    let mut parts = Vec::new();
    if let Some((w, h)) = plan.suggested_size {
        parts.push(format!("reduce image to {w}x{h}"));
    }
    if let Some(iters) = plan.suggested_iterations {
        parts.push(format!("reduce iterations to {iters}"));
    }
    if plan.enable_chunking {
        parts.push("enable chunked execution".to_string());
    }
    if parts.is_empty() {
        parts.push("no downgrade needed".to_string());
    }
    parts.join("; ")
}

fn print_summary(result: &FractalResult) {
    let grid = result.iteration_data();
    let cells = grid.as_slice();
    let max = cells.iter().copied().max().unwrap_or(0);
    let bounded = cells.iter().filter(|&&v| v == max).count();
    println!(
        "{}x{} computed in {:.3}s",
        grid.width(),
        grid.height(),
        result.calculation_time().as_secs_f64()
    );
    println!(
        "iteration counts: max {max}, {bounded} pixels at that count ({:.1}%)",
        bounded as f64 / cells.len() as f64 * 100.0
    );
    for key in ["generator_name", "memory_usage_mb", "peak_memory_mb"] {
        if let Some(value) = result.metadata().get(key) {
            println!("{key}: {value}");
        }
    }
}

fn write_result(path: &std::path::Path, result: &FractalResult) -> Result<(), String> {
    let json = serde_json::to_vec_pretty(result).map_err(|e| e.to_string())?;
    std::fs::write(path, json).map_err(|e| e.to_string())
}

fn fail(message: &str) -> ExitCode {
    eprintln!("error: {message}");
    ExitCode::FAILURE
}
