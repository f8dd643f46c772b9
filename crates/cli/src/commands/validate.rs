use anyhow::{Context, Result};
use clonevo_sim::simulation::Configuration;
use std::path::Path;

use crate::printing::{print_gene_table, print_parameters};

pub fn validate_config(path: &Path) -> Result<()> {
    println!("🔍 Validating configuration: {}", path.display());

    if !path.exists() {
        anyhow::bail!("Configuration file does not exist");
    }

    let config = Configuration::from_json_file(path).context("Failed to read configuration")?;
    println!("✓ Format: OK");

    let (genes, model) = config
        .resolve_model()
        .context("Configuration is invalid")?;
    println!("✓ Parameters: OK");

    print_parameters(&config);
    print_gene_table(&genes);

    println!("\n🎲 Division Outcomes");
    println!("  • Clean: {:.4}", model.no_mutation_probability());
    println!("  • Driver: {:.4}", model.driver_probability());
    println!("  • Passenger: {:.4}", model.passenger_probability());

    println!("\n{}", "=".repeat(50));
    println!("✓ Validation complete: No issues found");

    Ok(())
}
