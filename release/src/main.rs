//! `release` command line: contributors, release notes and version bumps.

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use eyre::WrapErr;
use octocat::{fetch_to_file, FileFetch, GithubClient};
use release::{bump_version, render_notes, ReleaseConfiguration};
use tracing_subscriber::EnvFilter;
use versioning::VersionInfo;

#[derive(Debug, Parser)]
#[command(version, about = "Release notes and versioning tasks")]
struct Args {
    /// Release configuration file.
    #[arg(short, long, default_value = "release.toml")]
    config: Utf8PathBuf,

    /// Report changes without writing files. Overrides the configuration.
    #[arg(long)]
    dry_run: Option<bool>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Collect all project contributors into the contributors file.
    Contributors,

    /// Render release notes from a JSON file of release records.
    Notes {
        /// Release records, newest first.
        releases: Utf8PathBuf,

        /// Write the notes here instead of standard output.
        #[arg(short, long)]
        output: Option<Utf8PathBuf>,
    },

    /// Increment the version in the version file.
    Bump {
        /// Record the current version as notable. Defaults to whether it is
        /// a notable release.
        #[arg(long)]
        notable: Option<bool>,
    },

    /// Show the current version.
    Version,
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = ReleaseConfiguration::load(&args.config)?.with_dry_run(args.dry_run);

    match args.command {
        Command::Contributors => contributors(&config).await,
        Command::Notes { releases, output } => notes(&config, releases, output).await,
        Command::Bump { notable } => {
            let bump = bump_version(&config, notable)?;
            println!("{} -> {}", bump.previous, bump.next);
            Ok(())
        }
        Command::Version => {
            let info = VersionInfo::load(&config.version.file)?;
            println!("{}", info.version());
            if info.is_notable_release() {
                println!("notable release");
            }
            if !info.notable_versions().is_empty() {
                println!("notable versions: {}", info.notable_versions().join(", "));
            }
            Ok(())
        }
    }
}

async fn contributors(config: &ReleaseConfiguration) -> eyre::Result<()> {
    let token = ReleaseConfiguration::token()
        .wrap_err_with(|| format!("Reading Github token from {}", release::TOKEN_ENV))?;
    let client = GithubClient::new(token);

    let outcome = fetch_to_file(
        &client,
        &config.github.repository,
        &config.github.contributors_file,
        config.github.skip_contributors || config.dry_run,
    )
    .await
    .wrap_err("Collecting contributors")?;

    if let FileFetch::Written(fetch) = outcome {
        println!(
            "{} contributors written to {}",
            fetch.contributors.len(),
            config.github.contributors_file
        );
        if let Some(error) = fetch.error {
            tracing::warn!(
                path = %config.github.contributors_file,
                "Contributor collection incomplete, delete the file to retry: {error}"
            );
        }
    }

    Ok(())
}

async fn notes(
    config: &ReleaseConfiguration,
    releases: Utf8PathBuf,
    output: Option<Utf8PathBuf>,
) -> eyre::Result<()> {
    let rendered = render_notes(config, &releases).await?;

    match output {
        Some(path) if !config.dry_run => {
            tokio::fs::write(&path, rendered)
                .await
                .wrap_err_with(|| format!("Writing release notes to {path}"))?;
            tracing::info!(%path, "Wrote release notes");
        }
        _ => print!("{rendered}"),
    }

    Ok(())
}
