use clonevo_sim::genome::{GeneTable, GenomeHalf};
use clonevo_sim::simulation::{Configuration, GeneSource, RunSummary, ShardTiming};

pub fn print_parameters(config: &Configuration) {
    let execution = &config.execution;
    let population = &config.population;
    let mutation = &config.mutation;

    println!("\n📋 Simulation Configuration");
    println!("  • Shards: {} [-s, --shards]", execution.shards);
    println!("  • Max Cycles: {} [-c, --max-cycles]", execution.max_cycles);
    println!("  • Cell Ceiling: {} [--max-cells]", execution.max_cells);
    println!("  • Iterations: {} [-i, --iterations]", execution.iterations);
    println!("  • Balancer: {} [-b, --balancer]", execution.balancing);
    if let Some(seed) = execution.seed {
        println!("  • Random Seed: {seed} [--seed]");
    } else {
        println!("  • Random Seed: Random [--seed]");
    }

    println!("\n🧫 Population");
    println!("  • Initial Size: {} [-n, --initial-size]", population.initial_size);
    println!(
        "  • Carrying Capacity: {} [-k, --carrying-capacity]",
        population.carrying_capacity()
    );

    println!("\n⚡ Mutation Parameters");
    println!("  • Mutation Rate: {:.2e} [-m, --mutation-rate]", mutation.mutation_rate);
    match &mutation.genes {
        GeneSource::Uniform {
            driver_genes,
            driver_gene_size,
            driver_advantage,
            passenger_genes,
            passenger_gene_size,
            passenger_advantage,
        } => {
            println!("  • Genes: Uniform");
            println!(
                "    - Drivers: {driver_genes} × {driver_gene_size} loci, advantage {driver_advantage}"
            );
            println!(
                "    - Passengers: {passenger_genes} × {passenger_gene_size} loci, advantage {passenger_advantage}"
            );
        }
        GeneSource::Table { path } => {
            println!("  • Genes: Table {} [--gene-table]", path.display());
        }
    }
    println!();
}

pub fn print_gene_table(genes: &GeneTable) {
    println!("\n🧬 Gene Layout");
    for half in [GenomeHalf::Driver, GenomeHalf::Passenger] {
        let region = genes.region(half);
        println!(
            "  • {half}: {} genes, {} loci",
            region.genes().len(),
            region.width()
        );
    }
}

pub fn print_run_summary(summary: &RunSummary) {
    println!("\n📊 Iteration {} (seed {})", summary.iteration, summary.seed);
    println!("  • Stopped: {} after {} cycles", summary.stop_reason, summary.cycles);
    println!("  • Final Population: {}", summary.final_population);
    println!("  • Driver Mutations: {}", summary.driver_mutations);
    println!("  • Passenger Mutations: {}", summary.passenger_mutations);
    println!("  • Distinct Genomes: {}", summary.genomes);
}

pub fn print_timings(timings: &[ShardTiming]) {
    println!("  • Shard Timings:");
    for (shard, timing) in timings.iter().enumerate() {
        println!(
            "    - shard {shard}: {} steps, mean {:.3} ms, slowest {:.3} ms",
            timing.steps,
            timing.mean().as_secs_f64() * 1e3,
            timing.slowest.as_secs_f64() * 1e3
        );
    }
}
