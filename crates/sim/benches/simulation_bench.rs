use clonevo_sim::simulation::{BalancingStrategy, SimulationBuilder};
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

fn builder(cells: usize, shards: usize) -> SimulationBuilder {
    SimulationBuilder::new()
        .initial_size(cells)
        .max_cycles(10)
        .shards(shards)
        .seed(42)
        .mutation_rate(0.01)
        .uniform_genes(100, 1000, 0.1, 900, 1000, 0.001)
}

fn bench_simulation_init(c: &mut Criterion) {
    let mut group = c.benchmark_group("simulation_init");

    group.bench_function("default_init", |b| {
        b.iter(|| black_box(builder(black_box(10_000), black_box(4)).build().unwrap()))
    });

    group.finish();
}

fn bench_simulation_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("simulation_step");
    let cells = 20_000;

    group.throughput(Throughput::Elements(cells as u64));

    for shards in [1usize, 2, 4, 8] {
        group.bench_with_input(BenchmarkId::new("shards", shards), &shards, |b, &shards| {
            b.iter_batched(
                || builder(cells, shards).build().unwrap(),
                |mut sim| {
                    sim.step().unwrap();
                    black_box(sim)
                },
                criterion::BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

fn bench_balancers(c: &mut Criterion) {
    let mut group = c.benchmark_group("simulation_run_balancer");
    let cells = 5_000;
    let cycles = 10;

    group.throughput(Throughput::Elements((cells * cycles) as u64));

    for strategy in BalancingStrategy::ALL {
        group.bench_with_input(
            BenchmarkId::new("run_full", strategy),
            &strategy,
            |b, &strategy| {
                b.iter_batched(
                    || {
                        builder(cells, 4)
                            .max_cycles(cycles as u64)
                            .balancing(strategy)
                            .build()
                            .unwrap()
                    },
                    |mut sim| black_box(sim.run().unwrap()),
                    criterion::BatchSize::SmallInput,
                )
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_simulation_init, bench_simulation_step, bench_balancers);
criterion_main!(benches);
