//! `ofs`: command-line front end for the object storage client.

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use ofs_client::{Client, Download, Listing, Notifier, Response};
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

mod cli;

use cli::{Cli, Commands};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(command = cli.command.name(), error = %err, "Command failed");
            if let Some(webhook_url) = &cli.slack_webhook_url {
                let text = format!("ofs {} failed", cli.command.name());
                if let Err(notify_err) = ofs_client::notify::notify(&text, webhook_url, Some(&err)) {
                    warn!(error = %notify_err, "Failed to post failure notification");
                }
            }
            eprintln!("Error: {err:?}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn connect(cli: &Cli) -> anyhow::Result<Client> {
    let credentials = cli.credentials.credentials()?;
    let http = reqwest::blocking::Client::builder()
        .timeout(cli.timeout())
        .build()
        .context("failed to build HTTP client")?;
    Client::with_http_client(credentials, http).context("failed to authenticate")
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let response = match &cli.command {
        Commands::CreateContainer { name } => connect(cli)?.create_container(name)?,
        Commands::Get {
            uri,
            output,
            omit_folders,
        } => match connect(cli)?.get_object(uri, output, *omit_folders)? {
            Download::Saved { response, path } => {
                println!("saved {}", path.display());
                response
            }
            Download::Failed(response) => response,
        },
        Commands::Put { file, put_path } => connect(cli)?.put_object(file, put_path)?,
        Commands::Delete { uri } => connect(cli)?.delete_object(uri)?,
        Commands::List { container, prefix } => {
            match connect(cli)?.list_objects(container, prefix)? {
                Listing::Objects(objects) => {
                    for object in objects {
                        println!("{}\t{}", object.bytes.unwrap_or_default(), object.name);
                    }
                    return Ok(());
                }
                Listing::Failed(response) => response,
            }
        }
        Commands::Publish { container } => connect(cli)?.enable_public_access(container)?,
        Commands::Unpublish { container } => connect(cli)?.disable_public_access(container)?,
        Commands::Notify { text } => {
            let webhook_url = cli
                .slack_webhook_url
                .as_deref()
                .context("missing --slack-webhook-url / SLACK_WEBHOOK_URL")?;
            Notifier::new()?.notify(text, webhook_url, None)?;
            return Ok(());
        }
    };
    report(&response)
}

fn report(response: &Response) -> anyhow::Result<()> {
    println!("{}", response.status);
    if !response.is_success() {
        anyhow::bail!("server answered {}: {}", response.status, response.text());
    }
    Ok(())
}
