use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use house_points::config::config_io::{default_config_path, load_config};
use house_points::engine::engine::Engine;
use house_points::engine::ledger::PointLedger;
use house_points::engine::protocol::{EngineCommand, EngineResponse};
use house_points::store::points_store::{JsonFileStore, NullStore, PointsStore};
use house_points::transport::slack::SlackClient;
use house_points::transport::ChatTransport;

#[derive(Parser, Debug)]
#[command(name = "house-points", about = "Keeps the house cup tally for a Slack channel")]
struct Args {
    /// Config file (JSON). Defaults to the user config directory.
    #[arg(long, env = "HOUSE_POINTS_CONFIG")]
    config: Option<PathBuf>,

    /// Start from an empty tally instead of the stored one.
    #[arg(long)]
    reset: bool,

    /// Never write the points file.
    #[arg(long)]
    dry_run: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "house_points=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let config_path = args.config.unwrap_or_else(default_config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;

    let store: Box<dyn PointsStore> = match (&config.points_file, args.dry_run) {
        (Some(path), false) => Box::new(JsonFileStore::new(path)),
        _ => Box::new(NullStore),
    };

    let slack = SlackClient::new(&config.slack_token, &config.channel);
    if config.announce_startup {
        slack.post(&config.channel, "I'm alive!", None)?;
    }

    let directory = slack.member_directory().context("listing channel members")?;
    if directory.is_empty() {
        warn!(channel = %config.channel, "channel has no members, nobody is a prefect");
    }
    let prefects = directory.resolve(&config.prefects);
    let announcers = directory.resolve(config.announcer_names());
    if config.announce_startup {
        let mentions: Vec<String> = prefects.iter().map(|id| format!("<@{}>", id)).collect();
        slack.post(
            &config.channel,
            &format!("Your prefects will be: {}", mentions.join(",")),
            None,
        )?;
    }

    let mut ledger = PointLedger::load(store.as_ref(), prefects, config.special_subjects.clone());
    if args.reset {
        info!("resetting tally");
        ledger.reset();
    }

    let (cmd_tx, cmd_rx) = mpsc::channel();
    let (resp_tx, resp_rx) = mpsc::channel();

    let channel = config.channel.clone();
    let engine_thread = thread::spawn(move || {
        let mut engine = Engine::new(cmd_rx, resp_tx, ledger, store, &channel, announcers);
        engine.run();
    });

    let mut poller = slack.clone();
    let interval = Duration::from_secs(config.poll_interval_secs.max(1));
    thread::spawn(move || loop {
        match poller.poll() {
            Ok(events) => {
                for event in events {
                    if cmd_tx.send(EngineCommand::Chat(event)).is_err() {
                        return;
                    }
                }
            }
            Err(e) if e.is_fatal() => {
                error!(error = %e, "cannot keep polling, shutting down");
                let _ = cmd_tx.send(EngineCommand::Shutdown);
                return;
            }
            Err(e) => warn!(error = %e, "poll failed"),
        }
        if cmd_tx.send(EngineCommand::Tick).is_err() {
            return;
        }
        thread::sleep(interval);
    });

    info!(channel = %config.channel, "listening");
    while let Ok(resp) = resp_rx.recv() {
        if let Err(e) = deliver(&slack, &config.special_subjects, resp) {
            error!(error = %e, "failed to post");
        }
    }

    // the response channel only closes once the engine has flushed and stopped
    if engine_thread.join().is_err() {
        error!("engine thread panicked");
    }
    anyhow::bail!("engine stopped")
}

fn deliver(
    slack: &SlackClient,
    subjects: &[house_points::model::persona::SpecialSubject],
    resp: EngineResponse,
) -> anyhow::Result<()> {
    match resp {
        EngineResponse::Post { channel, outcome } => {
            let persona = outcome
                .persona()
                .and_then(|key| subjects.iter().find(|s| s.key.eq_ignore_ascii_case(key)));
            slack.post(&channel, outcome.text(), persona)?;
        }
        EngineResponse::Chart { channel, chart } => {
            slack.post(&channel, &chart, None)?;
        }
        EngineResponse::Standings { channel, lines } => {
            slack.post(&channel, &lines.join("\n"), None)?;
        }
    }
    Ok(())
}
