use crate::core::config::MonitorConfig;
use anyhow::{Context, Result};
use colored::Colorize;
use std::fs;
use std::path::Path;

pub fn handle_config(matches: &clap::ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some(("show", _)) => show_config(),
        Some(("export", sub_matches)) => {
            let file = sub_matches
                .get_one::<String>("file")
                .context("File argument is required")?;
            export_config(Path::new(file))
        }
        Some(("import", sub_matches)) => {
            let file = sub_matches
                .get_one::<String>("file")
                .context("File argument is required")?;
            import_config(Path::new(file))
        }
        Some(("reset", _)) => reset_config(),
        _ => {
            println!("Use 'pulse config --help' for more information.");
            Ok(())
        }
    }
}

fn show_config() -> Result<()> {
    let config = MonitorConfig::load()?;
    let path = MonitorConfig::get_config_path()?;

    println!("{}", "Config file:".white());
    println!("{}", path.display().to_string().cyan().bold());
    println!();
    println!("{}", config.export_json()?);
    Ok(())
}

fn export_config(file: &Path) -> Result<()> {
    let config = MonitorConfig::load()?;
    fs::write(file, config.export_json()?)
        .with_context(|| format!("Failed to write export file: {:?}", file))?;

    println!(
        "{} {}",
        "✓ Settings exported to:".green(),
        file.display()
    );
    Ok(())
}

fn import_config(file: &Path) -> Result<()> {
    let data = fs::read_to_string(file)
        .with_context(|| format!("Failed to read import file: {:?}", file))?;
    let config = MonitorConfig::import_json(&data)?;
    config.save()?;

    println!(
        "{} {}",
        "✓ Settings imported from:".green(),
        file.display()
    );
    println!(
        "{}",
        format!(
            "Interval {}s, network history {} points",
            config.update_interval, config.network_history_points
        )
        .dimmed()
    );
    Ok(())
}

fn reset_config() -> Result<()> {
    MonitorConfig::default().save()?;
    println!("{}", "✓ Settings reset to defaults".green());
    Ok(())
}
