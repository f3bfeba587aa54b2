// CLI for estimating wire bundle diameters
use std::env;
use std::process;
use tracing_subscriber::EnvFilter;
use wire_bundle::{
    run_batch, run_seeded, BatchSummary, BundleConfig, BundleError, PackingParams, PackingResult,
};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage();
        return;
    }

    let command = &args[1];
    let outcome = match command.as_str() {
        "run" => run_config(&args[2..]),
        "batch" => batch_config(&args[2..]),
        "radii" => run_radii(&args[2..]),
        "generate" => generate_config(&args[2..]),
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        _ => {
            println!("Unknown command: {}", command);
            print_usage();
            process::exit(2);
        }
    };

    if let Err(e) = outcome {
        eprintln!("Error: {}", e);
        process::exit(1);
    }

    #[cfg(feature = "profiling")]
    wire_bundle::PROFILER.lock().log_and_clear();
}

fn print_usage() {
    println!("\nWire bundle diameter estimator\n");
    println!("Usage: wire_bundle <command> [options]\n");
    println!("Commands:");
    println!("  run <config.toml> [--json] [--seed N]   Single packing run");
    println!("  batch <config.toml> [--json]            Monte-Carlo runs from the [batch] section");
    println!("  radii <r1> <r2> ... [--seed N]          Single run with default parameters");
    println!("  generate <out.toml>                     Write a sample bundle config\n");
    println!("Set RUST_LOG=debug (or trace) for per-iteration logging.");
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}

fn seed_arg(args: &[String]) -> Result<Option<u64>, BundleError> {
    match args.iter().position(|a| a == "--seed") {
        None => Ok(None),
        Some(i) => args
            .get(i + 1)
            .and_then(|s| s.parse().ok())
            .map(Some)
            .ok_or_else(|| BundleError::Usage("--seed needs an integer value".to_string())),
    }
}

/// Positional arguments, skipping flags and the value after `--seed`.
fn positional(args: &[String]) -> Vec<&String> {
    let mut out = Vec::new();
    let mut skip = false;
    for a in args {
        if skip {
            skip = false;
            continue;
        }
        if a == "--seed" {
            skip = true;
            continue;
        }
        if a.starts_with("--") {
            continue;
        }
        out.push(a);
    }
    out
}

fn config_path(args: &[String]) -> Result<&String, BundleError> {
    positional(args)
        .into_iter()
        .next()
        .ok_or_else(|| BundleError::Usage("please specify a bundle config file".to_string()))
}

fn run_config(args: &[String]) -> Result<(), BundleError> {
    let config = BundleConfig::load_from_file(config_path(args)?)?;
    let radii = config.radii()?;
    let seed = seed_arg(args)?.unwrap_or(config.batch.seed);
    let result = run_seeded(&radii, &config.params, seed);
    if has_flag(args, "--json") {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_result(&result, radii.len());
    }
    Ok(())
}

fn batch_config(args: &[String]) -> Result<(), BundleError> {
    let config = BundleConfig::load_from_file(config_path(args)?)?;
    let radii = config.radii()?;
    let summary = run_batch(&radii, &config.params, &config.batch);
    if has_flag(args, "--json") {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary, &config);
    }
    Ok(())
}

fn run_radii(args: &[String]) -> Result<(), BundleError> {
    let mut radii = Vec::new();
    for a in positional(args) {
        let r: f64 = a
            .parse()
            .map_err(|_| BundleError::Usage(format!("not a radius: {}", a)))?;
        radii.push(r);
    }
    let seed = seed_arg(args)?.unwrap_or(wire_bundle::batch::config::DEFAULT_SEED);
    let result = run_seeded(&radii, &PackingParams::default(), seed);
    if has_flag(args, "--json") {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_result(&result, radii.len());
    }
    Ok(())
}

fn generate_config(args: &[String]) -> Result<(), BundleError> {
    let output = config_path(args)?;
    BundleConfig::sample().to_file(output)?;
    println!("Sample bundle config written to {}", output);
    Ok(())
}

fn print_result(result: &PackingResult, requested: usize) {
    println!("\nWires packed:        {} (of {} given)", result.final_circles.len(), requested);
    println!("Bundle diameter:     {:.4}", result.diameter());
    println!("Container radius:    {:.4}", result.container_radius);
    println!("Converged:           {}", result.converged);
    println!("Outer iterations:    {}", result.iterations);
    println!("Final penetration:   {:.6}", result.final_avg_penetration);
}

fn print_summary(summary: &BatchSummary, config: &BundleConfig) {
    println!("\nRuns:                {} ({} converged)", summary.runs.len(), summary.converged_runs);
    println!(
        "Diameter min/avg/max:  {:.4} / {:.4} / {:.4}",
        summary.raw.min, summary.raw.avg, summary.raw.max
    );
    println!(
        "With wrap {:.3} and tolerance x{:.3}:  {:.4} / {:.4} / {:.4}",
        config.batch.wrap_thickness,
        config.batch.tolerance_factor,
        summary.adjusted.min,
        summary.adjusted.avg,
        summary.adjusted.max
    );
}
