use std::cell::RefCell;
use std::rc::Rc;

use cmdr_common::config::{SeedPlayer, ServerConfig};
use cmdr_common::ids::{PlayerId, Rank};
use cmdr_core::host::{LogLevel, LogSink};

use crate::app::ServerApp;

pub(super) const ADMIRAL: PlayerId = 1;
pub(super) const BOB: PlayerId = 2;
pub(super) const CAROL: PlayerId = 3;

#[derive(Default)]
pub(super) struct RecordingLog {
    entries: RefCell<Vec<(LogLevel, String)>>,
}

impl RecordingLog {
    pub(super) fn at(&self, level: LogLevel) -> Vec<String> {
        self.entries
            .borrow()
            .iter()
            .filter(|(entry_level, _)| *entry_level == level)
            .map(|(_, message)| message.clone())
            .collect()
    }
}

impl LogSink for RecordingLog {
    fn log(&self, level: LogLevel, message: &str) {
        self.entries.borrow_mut().push((level, message.to_owned()));
    }
}

/// Quiet server with an admin, a player, and a moderator online.
pub(super) fn test_app() -> (ServerApp, Rc<RecordingLog>) {
    let config = ServerConfig {
        echo_transcript: false,
        seed_players: vec![
            SeedPlayer {
                name: "[gold]Admiral".to_owned(),
                rank: Rank::Admin,
            },
            SeedPlayer {
                name: "Bob".to_owned(),
                rank: Rank::Player,
            },
            SeedPlayer {
                name: "[sky]Carol".to_owned(),
                rank: Rank::Moderator,
            },
        ],
        ..ServerConfig::default()
    };
    let log = Rc::new(RecordingLog::default());
    let app = ServerApp::with_log_sink(config, log.clone()).expect("demo app must start");
    (app, log)
}

pub(super) fn fail_line(app: &ServerApp, message: &str) -> String {
    format!("{}{message}", app.config.engine.fail_prefix)
}

pub(super) fn success_line(app: &ServerApp, message: &str) -> String {
    format!("{}{message}", app.config.engine.success_prefix)
}
