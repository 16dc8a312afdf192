//! bewell-launch: marketing operations for the Be.Well app launch.
//!
//! Sends campaign SMS to a segment, prepares CRM wing imports, diffs
//! prospect lists against existing users, and serves the install redirect.

use clap::builder::TypedValueParser;
use clap::{Parser, Subcommand};
use launch_channels::{CampaignDispatcher, CampaignRequest};
use launch_core::event_bus::TracingSink;
use launch_core::types::Wing;
use launch_core::{LaunchConfig, RedirectServiceConfig};
use launch_redirect::RedirectServer;
use launch_segmentation::diff::write_diffed_prospects;
use launch_segmentation::wings::{write_wing_files, DEFAULT_WINGS};
use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "bewell-launch")]
#[command(about = "Be.Well launch campaign tooling")]
#[command(version)]
struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Send the campaign SMS to every contact in a segment
    SendSms {
        /// Segment name, e.g. "APA"
        segment: String,
        /// "WING A" or "WING B"
        wing: String,
    },
    /// Split a member export into randomized CRM import files
    Segment {
        path_to_csv: PathBuf,
        segment_name: String,
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
        #[arg(long, default_value_t = DEFAULT_WINGS, value_parser = clap::value_parser!(u8).range(1..=26).map(usize::from))]
        wings: usize,
    },
    /// Remove existing app users and already-messaged contacts from a prospect list
    Diff {
        #[arg(long)]
        prospects: PathBuf,
        #[arg(long)]
        app_users: PathBuf,
        #[arg(long)]
        marketed: PathBuf,
        #[arg(long)]
        out: PathBuf,
    },
    /// Serve the install-redirect page
    ServeRedirect {
        #[arg(long, env = "REDIRECT__HOST")]
        host: Option<String>,
        #[arg(long, env = "REDIRECT__PORT")]
        port: Option<u16>,
    },
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "bewell_launch=info,launch_channels=info,launch_segmentation=info,launch_redirect=info,launch_core=info,tower_http=info"
            .into()
    });
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.json);

    match cli.command {
        Command::SendSms { segment, wing } => send_sms(segment, &wing).await,
        Command::Segment {
            path_to_csv,
            segment_name,
            out_dir,
            wings,
        } => {
            let files = write_wing_files(
                &path_to_csv,
                &segment_name,
                &out_dir,
                wings,
                &mut rand::thread_rng(),
            )?;
            for file in &files {
                info!(wing = %file.label, rows = file.rows, path = %file.path.display(), "Wing file ready");
            }
            Ok(())
        }
        Command::Diff {
            prospects,
            app_users,
            marketed,
            out,
        } => {
            let summary = write_diffed_prospects(&prospects, &app_users, &marketed, &out)?;
            info!(
                prospects = summary.prospects,
                blacklisted = summary.blacklisted,
                kept = summary.kept,
                out = %out.display(),
                "Diff complete"
            );
            Ok(())
        }
        Command::ServeRedirect { host, port } => {
            let mut config = RedirectServiceConfig::load()?;
            if let Some(host) = host {
                config.redirect.host = host;
            }
            if let Some(port) = port {
                config.redirect.port = port;
            }
            RedirectServer::from_config(&config)?.start_http().await
        }
    }
}

async fn send_sms(segment: String, wing: &str) -> anyhow::Result<()> {
    let wing: Wing = wing.parse()?;
    let config = LaunchConfig::load()?;
    info!(segment = %segment, wing = %wing, "Configuration loaded");

    let dispatcher = CampaignDispatcher::from_config(&config)?.with_event_sink(Arc::new(TracingSink));

    let stop = dispatcher.stop_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, stopping after the current contact");
            stop.store(true, Ordering::Relaxed);
        }
    });

    let request = CampaignRequest::new(segment, wing, &config.tracking_url_b);
    let report = dispatcher.run(&request).await?;
    info!(
        total = report.total,
        attempted = report.attempted,
        succeeded = report.succeeded,
        failed = report.failed,
        elapsed_secs = report.elapsed_secs,
        aborted = report.aborted.as_deref().unwrap_or("no"),
        "Campaign finished"
    );
    Ok(())
}
