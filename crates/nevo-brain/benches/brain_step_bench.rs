use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::SeedableRng;

use nevo_brain::{build, Brain, NUM_INPUTS};
use nevo_genome::{Command, Genome, Opcode, ARG_NONE};

fn chain_genome(links: usize) -> Genome {
    // Seed program plus a chain of weight units feeding fresh sumsis.
    let mut genome = Genome::seed();
    for _ in 0..links {
        genome.commands.push(Command::new(Opcode::NewSumsi, ARG_NONE));
        genome.commands.push(Command::new(Opcode::NewWeight, 50));
        genome.commands.push(Command::new(Opcode::WeightToSumsiIn, 0));
        genome.commands.push(Command::new(Opcode::SumsiToWeightCtrl, 1));
    }
    genome.commands.push(Command::new(Opcode::SumsiToOut, ARG_NONE));
    genome
}

fn built_brain(links: usize) -> Brain {
    let mut genome = chain_genome(links);
    let mut rng = StdRng::seed_from_u64(1234);
    let mut brain = build(&mut genome, &mut rng).expect("bench brain build");
    brain.play_init(&mut rng);
    brain
}

fn bench_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("brain_step");
    let inputs: [f32; NUM_INPUTS] = [0.3, -0.2, 0.8, 0.1, -0.9, 0.4, 12.0, 0.5, 1.0];

    for &links in &[8usize, 32, 96] {
        group.throughput(Throughput::Elements(links as u64));
        group.bench_with_input(BenchmarkId::new("chain", links), &links, |b, &n| {
            b.iter_batched(
                || built_brain(n),
                |mut brain| {
                    // 40 steps matches the seed genome's thinking time.
                    for _ in 0..40 {
                        brain.step(&inputs);
                    }
                    brain.output()
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

criterion_group!(benches, bench_step);
criterion_main!(benches);
