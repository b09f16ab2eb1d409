//! Pure-exchange economy with a saver and a borrower.
//!
//! Shows the credit market on either side of the equilibrium, then solves
//! for the rate at which lending equals borrowing.

use olg_equilibrium::prelude::*;
use std::sync::Arc;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    println!("╔══════════════════════════════════════════════╗");
    println!("║  olg-equilibrium: Pure Exchange Example      ║");
    println!("╚══════════════════════════════════════════════╝\n");

    let utility = Arc::new(LogUtility::new(0.96)?);
    let saver = Agent::new("saver", utility.clone(), 10.0, 3.0)?;
    let borrower = Agent::new("borrower", utility, 3.0, 10.0)?;
    let economy = Economy::new(Population::two_type(saver, borrower, 0.5)?, 0.02)?;

    println!("━━━ Credit market at trial rates ━━━\n");
    for rate in linspace(0.9, 1.2, 7) {
        println!("R = {:.3}  imbalance = {:>+10.6}", rate, market_imbalance(&economy, rate)?);
    }
    println!();

    println!("━━━ Equilibrium ━━━\n");
    let equilibrium = find_equilibrium(&economy, 0.8, 1.5)?;
    println!("{}\n", equilibrium);
    print!("{}", market_snapshot(&economy, equilibrium.gross_rate)?);

    Ok(())
}
