use std::path::PathBuf;

use anyhow::Result;
use colored::Colorize;
use migrade_gate::RunFacts;
use migrade_loader::{discover_scripts, load_catalog, load_config};
use migrade_runner::{plan_decisions, DecisionOutcome};

use crate::utils::load_store;

pub fn cmd_plan(empty_db: bool, never_ran: bool, store: Option<PathBuf>) -> Result<()> {
    let config = load_config()?;
    let catalog = load_catalog(config.plugins_dir())?;
    let scripts = discover_scripts(config.scripts_dir())?;
    let mut store = load_store(store)?;

    let facts = RunFacts {
        empty_db,
        never_ran,
    };

    println!("{}", "Run facts:".bright_cyan().bold());
    println!("  {} {}", "Empty database:".cyan(), empty_db);
    println!("  {} {}", "Never ran:".cyan(), never_ran);
    println!(
        "  {} {}",
        "Known plugins:".cyan(),
        catalog.len().to_string().bright_yellow()
    );
    println!();

    let decisions = plan_decisions(&config, facts, &mut store, catalog, &scripts);

    let included = decisions
        .iter()
        .filter(|d| d.outcome == DecisionOutcome::Included)
        .count();
    for decision in &decisions {
        let marker = match decision.outcome {
            DecisionOutcome::Included => "include".green(),
            DecisionOutcome::Excluded => "exclude".red(),
            DecisionOutcome::Unmatched => "unmatched".yellow(),
        };
        println!("  {:9} {}", marker, decision.rel);
    }
    println!();
    println!(
        "{} {} {} {}",
        "Would include".bright_cyan().bold(),
        included.to_string().bright_yellow(),
        "of".bright_cyan().bold(),
        decisions.len().to_string().bright_yellow()
    );
    Ok(())
}
