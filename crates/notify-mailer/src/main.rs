//! `notify-mailer` - forwards missed calls and chat messages to email.
//!
//! Reads notification events as JSON lines on stdin and mails the matching
//! ones using the preferences file. Ctrl-C stops reading, interrupts any
//! pending retry pause, and waits for in-flight deliveries.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

use anyhow::Context;
use notify_mailer_core::{
    ConfigSource, Dispatcher, FeedEvent, FileConfigSource, NoKeepAwake, RetryRunner, SmtpMailer,
    TaskSink, Worker,
};
use std::ffi::OsString;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const CONFIG_ENV: &str = "NOTIFY_MAILER_CONFIG";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "notify_mailer=info,notify_mailer_core=info,notify_mailer_smtp=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let path = config_path(std::env::args_os().nth(1), std::env::var_os(CONFIG_ENV))?;
    info!(path = %path.display(), "Starting notify-mailer");

    let (shutdown_tx, mut shutdown) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutdown requested");
            let _ = shutdown_tx.send(true);
        }
    });

    let runner = RetryRunner::new().with_shutdown(shutdown.clone());
    let worker = Worker::new(SmtpMailer::default(), runner, NoKeepAwake);
    let dispatcher = Dispatcher::new(FileConfigSource::new(path), worker)
        .with_feedback(|text| warn!(target: "notify_mailer::feedback", "{text}"));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => match line.context("reading event feed")? {
                Some(line) => handle_line(&dispatcher, &line),
                None => {
                    info!("Event feed closed");
                    break;
                }
            },
            Ok(_) = shutdown.wait_for(|stop| *stop) => break,
        }
    }

    let outcomes = dispatcher.sink().drain().await;
    info!(deliveries = outcomes.len(), "Stopped");
    Ok(())
}

/// Resolves the preferences file: explicit argument, then environment,
/// then the per-user config directory.
fn config_path(arg: Option<OsString>, env: Option<OsString>) -> anyhow::Result<PathBuf> {
    if let Some(path) = arg.or(env) {
        return Ok(PathBuf::from(path));
    }

    dirs::config_dir()
        .map(|dir| dir.join("notify-mailer").join("config.json"))
        .context("no config directory; pass the preferences file as an argument")
}

fn handle_line<C: ConfigSource, S: TaskSink>(dispatcher: &Dispatcher<C, S>, line: &str) {
    let line = line.trim();
    if line.is_empty() {
        return;
    }

    match FeedEvent::parse(line) {
        Ok(event) => dispatcher.handle(&event),
        Err(e) => warn!("Skipping malformed event: {e}"),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use notify_mailer_core::{DeliveryTask, Preferences, StaticConfigSource};
    use std::sync::Mutex;

    #[test]
    fn test_argument_wins_over_environment() {
        let path = config_path(Some("/tmp/a.json".into()), Some("/tmp/b.json".into())).unwrap();
        assert_eq!(path, PathBuf::from("/tmp/a.json"));

        let path = config_path(None, Some("/tmp/b.json".into())).unwrap();
        assert_eq!(path, PathBuf::from("/tmp/b.json"));
    }

    #[test]
    fn test_default_path_in_config_dir() {
        if let Ok(path) = config_path(None, None) {
            assert!(path.ends_with("notify-mailer/config.json"));
        }
    }

    #[derive(Default)]
    struct Count(Mutex<usize>);

    impl TaskSink for Count {
        fn submit(&self, _task: DeliveryTask) {
            *self.0.lock().unwrap() += 1;
        }
    }

    #[test]
    fn test_malformed_and_blank_lines_are_skipped() {
        let prefs = Preferences {
            enabled: true,
            ..Preferences::default()
        };
        let dispatcher = Dispatcher::new(StaticConfigSource::new(prefs), Count::default());

        handle_line(&dispatcher, "");
        handle_line(&dispatcher, "   ");
        handle_line(&dispatcher, "not json");
        handle_line(&dispatcher, r#"{"event":"connected","active":[]}"#);

        assert_eq!(*dispatcher.sink().0.lock().unwrap(), 0);
    }
}
