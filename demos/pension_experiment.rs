//! Pay-as-you-go pensions in a production economy.
//!
//! A tax on the young is handed to the old as a lump-sum transfer. The
//! young save less, so capital becomes scarcer and the interest rate rises.

use olg_equilibrium::prelude::*;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    println!("╔══════════════════════════════════════════════╗");
    println!("║  olg-equilibrium: Pension Experiment         ║");
    println!("╚══════════════════════════════════════════════╝\n");

    let config = ModelConfig::from_json_str(
        r#"{
            "firm": {},
            "government": {"balanced_budget": true},
            "bracket": [1.01, 3.0]
        }"#,
    )?;

    let statics = ComparativeStatics::new(config);
    let report = statics.run(Parameter::TaxRateYoung, &linspace(0.0, 0.3, 7));
    print!("{}", report);
    println!();

    let solved: Vec<_> = report.points.iter().filter(|p| p.r_star.is_some()).collect();
    if let (Some(first), Some(last)) = (solved.first(), solved.last()) {
        if let (Some(low), Some(high)) = (first.net_rate(), last.net_rate()) {
            println!(
                "Raising the payroll tax from {:.0}% to {:.0}% moves r* from {:.2}% to {:.2}%",
                first.value * 100.0,
                last.value * 100.0,
                low * 100.0,
                high * 100.0
            );
        }
    }

    Ok(())
}
