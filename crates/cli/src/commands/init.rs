use anyhow::{Context, Result};
use clonevo_sim::simulation::{
    BalancingStrategy, Configuration, ExecutionConfig, GeneSource, MutationConfig,
    PopulationConfig,
};

use crate::args::InitArgs;
use crate::printing::print_parameters;

pub fn init_simulation(args: &InitArgs) -> Result<()> {
    println!("🧬 Clonevo - Clonal Evolution Simulator");
    println!("============================================\n");

    let config = build_config(args)?;

    println!("Configuration:");
    print_parameters(&config);

    config
        .validate()
        .context("Configuration is invalid")?;

    config
        .to_json_file(&args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    println!("✓ Configuration written: {}", args.output.display());
    println!("\nSimulation initialized successfully!");
    println!("  Initial size: {}", config.population.initial_size);
    println!("  Max cycles: {}", config.execution.max_cycles);
    println!(
        "\n💡 Use 'clonevo run -c {}' to start the simulation",
        args.output.display()
    );

    Ok(())
}

pub fn build_config(args: &InitArgs) -> Result<Configuration> {
    let balancing = args
        .balancer
        .parse::<BalancingStrategy>()
        .map_err(|e| anyhow::anyhow!(e))
        .context("Invalid balancing strategy")?;

    let genes = match &args.gene_table {
        Some(path) => GeneSource::Table { path: path.clone() },
        None => GeneSource::Uniform {
            driver_genes: args.driver_genes,
            driver_gene_size: args.driver_gene_size,
            driver_advantage: args.driver_advantage,
            passenger_genes: args.passenger_genes,
            passenger_gene_size: args.passenger_gene_size,
            passenger_advantage: args.passenger_advantage,
        },
    };

    let mut population = PopulationConfig::new(args.initial_size);
    population.carrying_capacity = args.carrying_capacity;

    Ok(Configuration::new(
        ExecutionConfig::new(args.shards, args.max_cycles, args.max_cells, args.seed)
            .with_iterations(args.iterations)
            .with_balancing(balancing),
        population,
        MutationConfig::new(args.mutation_rate, genes),
    ))
}
