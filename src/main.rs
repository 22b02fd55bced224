use std::fmt::Write as _;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use specheck_core::config::VaultBackend;
use specheck_core::{ComplianceStatus, Config, ValidationInputs, ValidationReport, Validator};

const USAGE: &str = "\
usage: specheck [--config PATH] [--vault env|dotenv] <SPECIFICATION> <QUALITY_DOCUMENT>

Extracts requirements from SPECIFICATION and checks QUALITY_DOCUMENT against them.
Both files must be .pdf or .docx.";

#[derive(Debug, Default, PartialEq, Eq)]
struct CliArgs {
    config: Option<PathBuf>,
    vault: Option<String>,
    specification: Option<PathBuf>,
    quality_document: Option<PathBuf>,
    help: bool,
}

fn parse_args(args: &[String]) -> anyhow::Result<CliArgs> {
    let mut cli = CliArgs::default();
    let mut positional = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-h" | "--help" => cli.help = true,
            "--config" => {
                let value = iter.next().context("--config requires a path")?;
                cli.config = Some(PathBuf::from(value));
            }
            "--vault" => {
                let value = iter.next().context("--vault requires a backend name")?;
                cli.vault = Some(value.clone());
            }
            flag if flag.starts_with("--") => anyhow::bail!("unknown option: {flag}"),
            _ => positional.push(PathBuf::from(arg)),
        }
    }
    if positional.len() > 2 {
        anyhow::bail!("expected two documents, got {}", positional.len());
    }
    let mut positional = positional.into_iter();
    cli.specification = positional.next();
    cli.quality_document = positional.next();
    Ok(cli)
}

/// Priority: `--config` > `SPECHECK_CONFIG` env > `config/default.toml`.
fn resolve_config_path(cli: &CliArgs) -> PathBuf {
    if let Some(path) = &cli.config {
        return path.clone();
    }
    if let Ok(path) = std::env::var("SPECHECK_CONFIG") {
        return PathBuf::from(path);
    }
    PathBuf::from("config/default.toml")
}

fn init_subscriber() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn render(report: &ValidationReport) -> String {
    let mut out = String::new();
    out.push_str("## Full Validation Report\n\n");
    out.push_str(report.full_listing());
    out.push('\n');

    if let Some(summary) = report.summary() {
        out.push_str("\n## Summary\n\n");
        out.push_str(&summary);
        out.push('\n');
    }

    let results = report.report();
    if !results.is_empty() {
        let _ = writeln!(
            out,
            "\n{} requirements evaluated: {} met, {} partially met, {} missing",
            results.len(),
            results.count(ComplianceStatus::Met),
            results.count(ComplianceStatus::PartiallyMet),
            results.count(ComplianceStatus::Missing),
        );
        let unclassified = results.unclassified();
        if unclassified > 0 {
            let _ = writeln!(out, "{unclassified} without a recognised status");
        }
    }
    out
}

async fn run(cli: CliArgs) -> anyhow::Result<()> {
    let config_path = resolve_config_path(&cli);
    let mut config = Config::load(&config_path)?;
    if let Some(backend) = &cli.vault {
        config.vault.backend = match backend.as_str() {
            "env" => VaultBackend::Env,
            "dotenv" => VaultBackend::Dotenv,
            other => anyhow::bail!("unknown vault backend: {other}"),
        };
    }
    config.validate()?;
    tracing::debug!(path = %config_path.display(), "configuration loaded");

    let validator = Validator::new(&config)?;
    let vault = config.vault_provider();
    let inputs = ValidationInputs {
        specification: cli.specification.map(Into::into),
        quality_document: cli.quality_document.map(Into::into),
    };

    let report = validator.run(vault.as_ref(), inputs).await?;
    if let Some(mismatch) = report.mismatch() {
        eprintln!("warning: {mismatch}");
    }
    print!("{}", render(&report));
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let cli = match parse_args(&args) {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("error: {e}\n\n{USAGE}");
            return ExitCode::from(2);
        }
    };
    if cli.help {
        println!("{USAGE}");
        return ExitCode::SUCCESS;
    }

    init_subscriber();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
