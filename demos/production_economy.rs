//! Adding a Cobb-Douglas firm to the baseline economy.
//!
//! Household savings must now fund the firm's capital, which pushes the
//! equilibrium interest rate up.

use olg_equilibrium::prelude::*;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    println!("╔══════════════════════════════════════════════╗");
    println!("║  olg-equilibrium: Production Example         ║");
    println!("╚══════════════════════════════════════════════╝\n");

    let exchange = ModelConfig::default();
    let production =
        ModelConfig::from_json_str(r#"{"firm": {"A": 1.0, "alpha": 0.33, "delta": 0.05}}"#)?;

    let without_firm = find_equilibrium(&exchange.build_economy()?, 0.8, 1.5)?;
    let economy = production.build_economy()?;
    let with_firm = find_equilibrium(&economy, 0.5, 2.0)?;

    println!("Pure exchange:   {}", without_firm);
    println!("With production: {}", with_firm);
    println!(
        "Investment demand raises r* by {:.2} percentage points\n",
        (with_firm.net_rate - without_firm.net_rate) * 100.0
    );

    print!("{}", market_snapshot(&economy, with_firm.gross_rate)?);
    println!();

    println!("━━━ Sensitivity to total factor productivity ━━━\n");
    let report = ComparativeStatics::new(production).run(Parameter::Tfp, &linspace(0.8, 1.2, 5));
    print!("{}", report);

    Ok(())
}
