use approx::assert_relative_eq;
use olg_equilibrium::config::ModelConfig;
use olg_equilibrium::core::agent::Agent;
use olg_equilibrium::core::population::Population;
use olg_equilibrium::core::utility::{CrraUtility, LogUtility, UtilityFunction};
use olg_equilibrium::market::aggregation::{market_imbalance, market_snapshot};
use olg_equilibrium::market::economy::{AgentFailurePolicy, Economy};
use olg_equilibrium::market::equilibrium::{find_equilibrium, EquilibriumError, EquilibriumSolver};
use olg_equilibrium::optimization::agent_solver::solve_agent;
use olg_equilibrium::sector::fiscal::FiscalPolicy;
use olg_equilibrium::sector::production::ProductionTechnology;
use olg_equilibrium::simulation::comparative_statics::{linspace, ComparativeStatics, Parameter};
use std::sync::Arc;

fn baseline_population() -> Population {
    let utility: Arc<dyn UtilityFunction> = Arc::new(LogUtility::new(0.96).unwrap());
    let saver = Agent::new("saver", utility.clone(), 10.0, 3.0).unwrap();
    let borrower = Agent::new("borrower", utility, 3.0, 10.0).unwrap();
    Population::two_type(saver, borrower, 0.5).unwrap()
}

fn exchange_economy() -> Economy {
    Economy::new(baseline_population(), 0.02).unwrap()
}

fn production_economy() -> Economy {
    exchange_economy().with_technology(ProductionTechnology::new(1.0, 0.33, 0.05).unwrap())
}

/// Baseline two-type pure-exchange economy clears at its closed-form rate.
#[test]
fn pure_exchange_clears() {
    let economy = exchange_economy();
    let equilibrium = find_equilibrium(&economy, 0.8, 1.5).unwrap();

    assert!(
        equilibrium.imbalance.abs() < 1e-8,
        "imbalance at R* was {}",
        equilibrium.imbalance
    );
    assert!(market_imbalance(&economy, equilibrium.gross_rate).unwrap().abs() < 1e-8);
    assert_relative_eq!(equilibrium.gross_rate, 1.0625, max_relative = 1e-7);

    // Saver lends exactly what the borrower borrows
    let snapshot = market_snapshot(&economy, equilibrium.gross_rate).unwrap();
    let savings: Vec<f64> = snapshot
        .agents
        .iter()
        .map(|o| o.decision.unwrap().savings)
        .collect();
    assert!(savings[0] > 0.0 && savings[1] < 0.0);
    assert!((savings[0] + savings[1]).abs() < 1e-7);
}

/// Investment demand raises the equilibrium interest rate.
#[test]
fn production_raises_equilibrium_rate() {
    let exchange = find_equilibrium(&exchange_economy(), 0.8, 1.5).unwrap();
    let production = find_equilibrium(&production_economy(), 0.5, 2.0).unwrap();

    assert!(production.gross_rate > exchange.gross_rate);
    assert!(production.imbalance.abs() < 1e-8);

    let snapshot = market_snapshot(&production_economy(), production.gross_rate).unwrap();
    let firm = snapshot.firm.unwrap();
    assert!(firm.capital_demand > 0.0);
    assert_relative_eq!(snapshot.investment, firm.capital_demand);
    assert_relative_eq!(snapshot.private_savings, firm.capital_demand, epsilon = 1e-8);
}

/// The default production bracket contains the equilibrium.
#[test]
fn production_default_bracket() {
    let economy = production_economy();
    let equilibrium = EquilibriumSolver::default().find_default(&economy).unwrap();
    assert!(equilibrium.gross_rate > 1.01 && equilibrium.gross_rate < 1.5);
}

/// A bracket without a sign change is reported, not papered over.
#[test]
fn narrow_bracket_is_a_bracketing_error() {
    let err = find_equilibrium(&production_economy(), 1.0, 1.001).unwrap_err();
    match err {
        EquilibriumError::Bracketing {
            r_min,
            r_max,
            imbalance_min,
            imbalance_max,
        } => {
            assert_eq!(r_min, 1.0);
            assert_eq!(r_max, 1.001);
            assert_eq!(imbalance_min.signum(), imbalance_max.signum());
        }
        other => panic!("expected bracketing error, got {other}"),
    }
}

/// A government running a surplus adds to national savings and lowers R*.
#[test]
fn public_savings_lower_rate() {
    let base = find_equilibrium(&production_economy(), 0.5, 2.0).unwrap();
    let surplus = FiscalPolicy::new(0.1, 0.0, 0.0, 0.0).unwrap();
    let economy = production_economy().with_fiscal_policy(surplus);
    let taxed = find_equilibrium(&economy, 0.5, 2.0).unwrap();

    let snapshot = market_snapshot(&economy, taxed.gross_rate).unwrap();
    assert!(snapshot.public_savings > 0.0);
    assert!(taxed.gross_rate < base.gross_rate);
}

/// CRRA households: the economy still clears and every agent satisfies
/// its budget.
#[test]
fn crra_economy_clears() {
    let utility: Arc<dyn UtilityFunction> = Arc::new(CrraUtility::new(0.96, 2.0).unwrap());
    let saver = Agent::new("saver", utility.clone(), 10.0, 3.0).unwrap();
    let borrower = Agent::new("borrower", utility, 3.0, 10.0).unwrap();
    let economy = Economy::new(Population::two_type(saver, borrower, 0.5).unwrap(), 0.02).unwrap();

    let equilibrium = find_equilibrium(&economy, 0.8, 1.5).unwrap();
    assert!(equilibrium.imbalance.abs() < 1e-8);

    for member in economy.population().members() {
        let decision = solve_agent(
            &member.agent,
            equilibrium.gross_rate,
            0.02,
            &FiscalPolicy::default(),
        )
        .unwrap();
        assert!(decision.budget_residual(equilibrium.gross_rate).abs() < 1e-6);
    }
}

/// With the propagate policy a corner-seeking agent aborts the search; with
/// zero substitution the rest of the market still clears.
#[test]
fn failure_policies() {
    let linear: Arc<dyn UtilityFunction> = Arc::new(|c_y: f64, c_o: f64| c_y + c_o);
    let log: Arc<dyn UtilityFunction> = Arc::new(LogUtility::new(0.96).unwrap());
    let population = Population::new(vec![
        (Agent::new("saver", log.clone(), 10.0, 3.0).unwrap(), 0.45),
        (Agent::new("borrower", log, 3.0, 10.0).unwrap(), 0.45),
        (Agent::new("trader", linear, 5.0, 5.0).unwrap(), 0.1),
    ])
    .unwrap();

    let strict = Economy::new(population.clone(), 0.02)
        .unwrap()
        .with_failure_policy(AgentFailurePolicy::Propagate);
    let err = find_equilibrium(&strict, 0.8, 1.5).unwrap_err();
    assert!(matches!(
        err,
        EquilibriumError::AgentFailure { ref agent, .. } if agent.as_str() == "trader"
    ));

    let lenient = Economy::new(population, 0.02).unwrap();
    let equilibrium = find_equilibrium(&lenient, 0.8, 1.5).unwrap();
    assert_relative_eq!(equilibrium.gross_rate, 1.0625, max_relative = 1e-7);
    let snapshot = market_snapshot(&lenient, equilibrium.gross_rate).unwrap();
    let failed: Vec<_> = snapshot.failed_agents().map(|id| id.as_str()).collect();
    assert_eq!(failed, vec!["trader"]);
}

/// Config file → economy → equilibrium.
#[test]
fn config_pipeline() {
    let json = r#"{
        "beta": 0.96,
        "phi": 0.5,
        "g": 0.02,
        "endowments": {
            "saver": {"young": 10.0, "old": 3.0},
            "borrower": {"young": 3.0, "old": 10.0}
        },
        "firm": {"A": 1.0, "alpha": 0.33, "delta": 0.05},
        "bracket": [0.5, 2.0]
    }"#;
    let config = ModelConfig::from_json_str(json).unwrap();
    let economy = config.build_economy().unwrap();
    let (r_min, r_max) = config.bracket();
    let from_config = find_equilibrium(&economy, r_min, r_max).unwrap();
    let direct = find_equilibrium(&production_economy(), 0.5, 2.0).unwrap();
    assert_eq!(from_config.gross_rate, direct.gross_rate);
}

/// A pension sweep solves every point and records its report.
#[test]
fn pension_sweep() {
    let json = r#"{"firm": {}, "government": {"balanced_budget": true}, "bracket": [1.01, 3.0]}"#;
    let statics = ComparativeStatics::new(ModelConfig::from_json_str(json).unwrap());
    let report = statics.run(Parameter::TaxRateYoung, &linspace(0.0, 0.2, 5));

    assert_eq!(report.points.len(), 5);
    assert_eq!(report.solved_count(), 5);
    let rates: Vec<f64> = report.points.iter().filter_map(|p| p.r_star).collect();
    assert!(rates.windows(2).all(|w| w[1] >= w[0]));

    let json = serde_json::to_string(&report).unwrap();
    assert!(json.contains("\"parameter\":\"tax_rate_young\""));
}

/// Snapshots serialize for the CLI's JSON output.
#[test]
fn snapshot_serializes() {
    let snapshot = market_snapshot(&production_economy(), 1.2).unwrap();
    let value = serde_json::to_value(&snapshot).unwrap();
    assert_eq!(value["gross_rate"], 1.2);
    assert_eq!(value["agents"].as_array().unwrap().len(), 2);
    assert!(value["firm"]["capital_demand"].as_f64().unwrap() > 0.0);
    assert!(snapshot.to_string().contains("imbalance"));
}
