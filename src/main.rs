use anyhow::{Context, Result};
use clap::Parser;
use std::process::Stdio;

mod actions;
mod app;
mod config;
mod error;
mod heuristics;
mod session;
mod tmux;
mod window;

use actions::{Cli, OutputFormat};
use app::{App, Report};
use config::Config;
use error::{Error, Outcome};
use tmux::TmuxClient;

#[tokio::main]
async fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            std::process::exit(parse_exit_code(&e));
        }
    };
    let format = cli.output;

    // Initialize logging; stdout is reserved for command output
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(level.into())
                .from_env_lossy(),
        )
        .init();

    if let Err(e) = run(cli).await {
        report_error(&e, format);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::from_env();
    let client = TmuxClient::new(&config);
    let cwd = std::env::current_dir().context("Failed to determine working directory")?;

    let app = App::new(client.clone(), cli.session, cwd);
    let report = app.handle_action(cli.action).await?;
    print!("{}", report.render(cli.output)?);

    if let Report::Attach(resolution) = &report {
        attach(&client, &resolution.session)?;
    }
    Ok(())
}

/// Usage errors exit 1 like every other failure; `--help` and `--version`
/// exit 0.
fn parse_exit_code(err: &clap::Error) -> i32 {
    if err.use_stderr() {
        1
    } else {
        0
    }
}

/// Hand the terminal over to `tmux attach` until the user detaches
fn attach(client: &TmuxClient, session: &str) -> Result<()> {
    let cmd = client.attach_command(session);
    let status = std::process::Command::new(&cmd[0])
        .args(&cmd[1..])
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .context("Failed to attach to session")?;

    if !status.success() {
        anyhow::bail!("Failed to attach to session: tmux exited with {}", status);
    }
    Ok(())
}

fn report_error(err: &anyhow::Error, format: OutputFormat) {
    match format {
        OutputFormat::Json => match serde_json::to_string_pretty(&Outcome::failure(err)) {
            Ok(json) => eprintln!("{}", json),
            Err(_) => eprintln!("Error: {}", err),
        },
        OutputFormat::Text => {
            eprintln!("Error: {:#}", err);
            if let Some(detail) = err.downcast_ref::<Error>().and_then(Error::detail) {
                eprintln!("Details: {}", detail);
            }
        }
    }
}
