use cmdr_common::config::ServerConfig;
use cmdr_common::error::{CmdrError, CmdrResult};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::runtime::Builder as TokioBuilder;
use tokio::sync::mpsc;
use tokio::task::LocalSet;
use tracing_subscriber::EnvFilter;

use super::ServerApp;
use crate::ingress::{InputEvent, parse_input_line};

pub(super) fn run_server() -> CmdrResult<()> {
    let config = ServerConfig::default().with_env_overrides();
    init_tracing(&config.log_filter);

    let runtime = TokioBuilder::new_current_thread().build()?;
    let local_set = LocalSet::new();
    runtime.block_on(local_set.run_until(async move {
        let app = ServerApp::new(config)?;
        println!("{}", app.startup_summary());

        // Stdin is read on its own fiber; every event is processed on the event fiber.
        let (event_sender, event_receiver) = mpsc::unbounded_channel::<InputEvent>();
        let ingress_fiber = tokio::task::spawn_local(stdin_ingress_fiber(event_sender));
        let event_fiber = tokio::task::spawn_local(event_fiber(app, event_receiver));
        let _ = ingress_fiber.await;
        let _ = event_fiber.await;
        Ok::<(), CmdrError>(())
    }))
}

fn init_tracing(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init();
}

async fn stdin_ingress_fiber(event_sender: mpsc::UnboundedSender<InputEvent>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                if event_sender.send(parse_input_line(&line)).is_err() {
                    break;
                }
            }
            Ok(None) => break,
            Err(error) => {
                tracing::error!("stdin read failed: {error}");
                break;
            }
        }
    }
}

async fn event_fiber(app: ServerApp, mut event_receiver: mpsc::UnboundedReceiver<InputEvent>) {
    while let Some(event) = event_receiver.recv().await {
        app.handle_event(event);
    }
    tracing::info!("input closed, shutting down");
}
