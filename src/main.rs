use anyhow::{Context, Result};
use clap::Parser;
use gg_visualize::{export::ExperimentTables, plotting, PlotConfig, ResultTable};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "gg-visualize")]
#[command(about = "Plot regular vs weighted vs supervised accuracy per sparsity level", long_about = None)]
struct Cli {
    /// Results log of the regular runs
    #[arg(short = 'r', long = "regular_results", value_parser = existing_file)]
    regular_results: PathBuf,

    /// Results log of the weighted runs
    #[arg(short = 'w', long = "weighted_results", value_parser = existing_file)]
    weighted_results: PathBuf,

    /// Results log of the supervised upper-bound run (single sparsity row)
    #[arg(short = 's', long = "supervised_results", value_parser = existing_file)]
    supervised_results: PathBuf,

    /// Output image; `.svg` selects the SVG backend
    #[arg(short, long, default_value = "gg_experiment.png")]
    output: PathBuf,

    /// Figure title
    #[arg(long)]
    title: Option<String>,

    #[arg(long, default_value_t = 2000)]
    width: u32,

    #[arg(long, default_value_t = 2000)]
    height: u32,

    /// Also write the aggregated tables as JSON
    #[arg(long)]
    export_json: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

/// Accept only paths that exist and are not directories.
fn existing_file(raw: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(raw);
    if !path.exists() {
        return Err(format!("path {} does not exist", raw));
    }
    if path.is_dir() {
        return Err(format!("path {} is a directory", raw));
    }
    Ok(path)
}

fn load_table(kind: &str, path: &Path) -> Result<ResultTable> {
    let table = ResultTable::from_file(path)
        .with_context(|| format!("parsing {} results from {}", kind, path.display()))?;
    println!(
        "  - {}: {} sparsity rows × {} tasks (seed {})",
        kind,
        table.rows().len(),
        table.columns().len(),
        table
            .seed()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "-".to_string())
    );
    Ok(table)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let mut config = PlotConfig {
        size: (cli.width, cli.height),
        output_path: cli.output.clone(),
        ..PlotConfig::default()
    };
    if let Some(title) = cli.title.clone() {
        config.title = title;
    }

    println!("📁 Loading results logs:");
    let regular = load_table("regular", &cli.regular_results)?;
    let weighted = load_table("weighted", &cli.weighted_results)?;
    let supervised = load_table("supervised", &cli.supervised_results)?;
    println!();

    if let Some(path) = &cli.export_json {
        ExperimentTables::new(&regular, &weighted, &supervised)
            .save_json(path)
            .with_context(|| format!("exporting tables to {}", path.display()))?;
        println!("💾 Aggregated tables saved to: {}", path.display());
    }

    println!("🎨 Plotting {} sparsity levels...", regular.rows().len());
    plotting::plot_figure(&regular, &weighted, &supervised, &config)
        .context("plotting sparsity grid")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn existing_file_accepts_a_regular_file() {
        let file = NamedTempFile::new().unwrap();
        let raw = file.path().to_str().unwrap();
        assert_eq!(existing_file(raw), Ok(file.path().to_path_buf()));
    }

    #[test]
    fn existing_file_rejects_missing_path() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("absent.csv");
        let err = existing_file(missing.to_str().unwrap()).unwrap_err();
        assert!(err.contains("does not exist"));
    }

    #[test]
    fn existing_file_rejects_directory() {
        let dir = TempDir::new().unwrap();
        let err = existing_file(dir.path().to_str().unwrap()).unwrap_err();
        assert!(err.contains("is a directory"));
    }

    #[test]
    fn cli_requires_all_three_logs() {
        let file = NamedTempFile::new().unwrap();
        let path = file.path().to_str().unwrap();
        let parsed = Cli::try_parse_from(["gg-visualize", "-r", path, "-w", path, "-s", path]);
        let cli = parsed.unwrap();
        assert_eq!(cli.output, PathBuf::from("gg_experiment.png"));

        let missing = Cli::try_parse_from(["gg-visualize", "-r", path, "-w", path]);
        assert!(missing.is_err());
    }
}
