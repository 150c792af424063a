mod cli;

use clap::Parser;
use cli::{Cli, Commands};
use std::sync::Arc;

use clipfetch::config::Config;
use clipfetch::media::Cookies;
use clipfetch::pipeline::MetadataProbe;
use clipfetch::storage::Workspace;
use clipfetch::tools::{self, YtDlp};
use clipfetch::{api, observability};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.clone())?;
    observability::init_tracing(&config.telemetry.log_filter);

    match cli.command {
        Commands::Serve(args) => {
            if let Some(address) = args.address {
                config.server.bind_addr = address;
            }
            api::run(config).await?
        }
        Commands::Probe(args) => {
            let extractor = Arc::new(YtDlp::new(config.extractor.clone()));
            let workspace = Workspace::new(config.downloads.work_dir.clone());
            let cookies = match args.cookies.as_deref() {
                Some(raw) => Cookies::parse(raw)?,
                None => None,
            };
            if cookies.is_some() {
                workspace.prepare().await?;
            }

            let probe = MetadataProbe::new(extractor, workspace);
            let info = probe.probe(&args.url, cookies.as_ref()).await?;
            println!("{}", serde_json::to_string_pretty(&info)?);
        }
        Commands::CheckTools => {
            let statuses = [
                tools::inspect("yt-dlp", &config.extractor.binary, "--version").await,
                tools::inspect("ffmpeg", &config.transcoder.binary, "-version").await,
            ];

            let mut missing = Vec::new();
            for status in &statuses {
                match (&status.resolved, &status.version) {
                    (Some(path), version) => println!(
                        "{:<8} {} ({})",
                        status.name,
                        path.display(),
                        version.as_deref().unwrap_or("version unknown")
                    ),
                    (None, _) => {
                        println!("{:<8} not found: {}", status.name, status.binary);
                        missing.push(status.name);
                    }
                }
            }

            if !missing.is_empty() {
                return Err(format!("missing tools: {}", missing.join(", ")).into());
            }
        }
    }

    Ok(())
}
