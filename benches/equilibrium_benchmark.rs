use criterion::{black_box, criterion_group, criterion_main, Criterion};
use olg_equilibrium::config::ModelConfig;
use olg_equilibrium::core::agent::Agent;
use olg_equilibrium::core::utility::{LogUtility, UtilityFunction};
use olg_equilibrium::market::aggregation::market_imbalance;
use olg_equilibrium::market::economy::Economy;
use olg_equilibrium::market::equilibrium::find_equilibrium;
use olg_equilibrium::optimization::agent_solver::solve_agent;
use olg_equilibrium::sector::fiscal::FiscalPolicy;
use olg_equilibrium::simulation::stress_test::{generate_random_population, PopulationConfig};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;

fn random_economy(type_count: usize) -> Economy {
    let config = PopulationConfig {
        type_count,
        ..Default::default()
    };
    let population = generate_random_population(&config, &mut StdRng::seed_from_u64(17))
        .expect("valid population config");
    Economy::new(population, 0.02).expect("valid growth rate")
}

fn bench_agent_solve(c: &mut Criterion) {
    let utility: Arc<dyn UtilityFunction> = Arc::new(LogUtility::new(0.96).unwrap());
    let agent = Agent::new("saver", utility, 10.0, 3.0).unwrap();
    let fiscal = FiscalPolicy::default();

    c.bench_function("agent_solve", |b| {
        b.iter(|| solve_agent(black_box(&agent), black_box(1.05), 0.02, &fiscal))
    });
}

fn bench_imbalance_100_types(c: &mut Criterion) {
    let economy = random_economy(100);

    c.bench_function("imbalance_100_types", |b| {
        b.iter(|| market_imbalance(black_box(&economy), black_box(1.05)))
    });
}

fn bench_equilibrium_baseline(c: &mut Criterion) {
    let economy = ModelConfig::default().build_economy().unwrap();

    c.bench_function("equilibrium_baseline", |b| {
        b.iter(|| find_equilibrium(black_box(&economy), 0.8, 1.5))
    });
}

fn bench_equilibrium_production(c: &mut Criterion) {
    let config = ModelConfig::from_json_str(r#"{"firm": {}}"#).unwrap();
    let economy = config.build_economy().unwrap();

    c.bench_function("equilibrium_production", |b| {
        b.iter(|| find_equilibrium(black_box(&economy), 0.5, 2.0))
    });
}

fn bench_equilibrium_100_types(c: &mut Criterion) {
    let economy = random_economy(100);

    c.bench_function("equilibrium_100_types", |b| {
        b.iter(|| find_equilibrium(black_box(&economy), 0.05, 20.0))
    });
}

criterion_group!(
    benches,
    bench_agent_solve,
    bench_imbalance_100_types,
    bench_equilibrium_baseline,
    bench_equilibrium_production,
    bench_equilibrium_100_types
);
criterion_main!(benches);
