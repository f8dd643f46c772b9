use anyhow::{Context, Result};
use clonevo_sim::simulation::{
    BalancingStrategy, Configuration, CycleOutcome, Observers, RunSummary, Simulation, TimingLog,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;

use crate::args::RunArgs;
use crate::printing::{print_parameters, print_run_summary, print_timings};

pub fn run_simulation(args: &RunArgs) -> Result<()> {
    println!("🧬 Clonevo - Running Simulation");
    println!("============================================\n");

    let mut config = Configuration::from_json_file(&args.config).with_context(|| {
        format!(
            "Failed to load configuration. Did you run 'clonevo init -o {}' first?",
            args.config.display()
        )
    })?;
    apply_overrides(&mut config, args)?;
    config.validate().context("Configuration is invalid")?;

    println!("Configuration:");
    print_parameters(&config);

    let base_seed = config.execution.seed_or_random();
    let iterations = config.execution.iterations;
    let mut summaries = Vec::with_capacity(iterations);
    tracing::debug!(base_seed, iterations, "starting runs");

    for iteration in 0..iterations {
        let timings = Arc::new(TimingLog::new());
        let observers = Observers::default().with_hooks(timings.clone());
        let mut sim = Simulation::seeded(config.clone(), base_seed, iteration, observers)
            .map_err(|e| anyhow::anyhow!("Failed to initialize simulation: {e}"))?;

        println!(
            "Running iteration {}/{} (up to {} cycles)...",
            iteration + 1,
            iterations,
            config.execution.max_cycles
        );
        let summary = run_iteration(&mut sim, args.progress)?;

        print_run_summary(&summary);
        if args.timings {
            print_timings(&timings.timings());
        }
        summaries.push(summary);
    }

    if let Some(path) = &args.summary {
        let json = serde_json::to_string_pretty(&summaries)
            .context("Failed to serialize run summaries")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("\n✓ Summaries written: {}", path.display());
    }

    println!("\n✓ Simulation complete!");
    Ok(())
}

fn apply_overrides(config: &mut Configuration, args: &RunArgs) -> Result<()> {
    if let Some(seed) = args.seed {
        config.execution.seed = Some(seed);
    }
    if let Some(name) = &args.balancer {
        config.execution.balancing = name
            .parse::<BalancingStrategy>()
            .map_err(|e| anyhow::anyhow!(e))
            .context("Invalid balancing strategy")?;
    }
    if let Some(iterations) = args.iterations {
        config.execution.iterations = iterations;
    }
    Ok(())
}

fn run_iteration(sim: &mut Simulation, show_progress: bool) -> Result<RunSummary> {
    let pb = if show_progress {
        let pb = ProgressBar::new(sim.config().execution.max_cycles);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}",
                )?
                .progress_chars("#>-"),
        );
        Some(pb)
    } else {
        None
    };

    loop {
        let cycle = sim.cycle();
        match sim
            .step()
            .map_err(|e| anyhow::anyhow!("Cycle {cycle}: {e}"))?
        {
            CycleOutcome::Continue(summary) => {
                if let Some(pb) = &pb {
                    pb.inc(1);
                    pb.set_message(format!("{} cells", summary.population));
                }
            }
            CycleOutcome::Finished(reason) => {
                if let Some(pb) = &pb {
                    pb.finish_with_message(reason.to_string());
                }
                break;
            }
        }
    }

    sim.summary()
        .context("Simulation stopped without a summary")
}
