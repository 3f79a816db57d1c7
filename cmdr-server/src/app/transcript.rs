//! Output sink that renders lines addressed to players on stdout.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use cmdr_common::ids::PlayerId;
use cmdr_core::host::OutputSink;
use cmdr_core::player::PlayerDirectory;

use super::roster::Roster;

const HISTORY_LIMIT: usize = 512;

/// One line delivered to a player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    /// Receiving player.
    pub recipient: PlayerId,
    /// Line text including color tags.
    pub text: String,
}

/// Prints `[-> name] text` for every delivered line and keeps a bounded history.
#[derive(Debug)]
pub struct Transcript {
    roster: Rc<Roster>,
    echo: bool,
    history: RefCell<VecDeque<Delivery>>,
}

impl Transcript {
    /// Creates a transcript. With `echo` unset lines are only kept in history.
    #[must_use]
    pub fn new(roster: Rc<Roster>, echo: bool) -> Self {
        Self {
            roster,
            echo,
            history: RefCell::new(VecDeque::new()),
        }
    }

    /// Sends `text` to every online player.
    pub fn broadcast(&self, text: &str) {
        for player in self.roster.online_players() {
            self.send_line(player.id, text);
        }
    }

    /// Recent lines delivered to `recipient`, oldest first.
    #[must_use]
    pub fn lines_for(&self, recipient: PlayerId) -> Vec<String> {
        self.history
            .borrow()
            .iter()
            .filter(|delivery| delivery.recipient == recipient)
            .map(|delivery| delivery.text.clone())
            .collect()
    }
}

impl OutputSink for Transcript {
    fn send_line(&self, recipient: PlayerId, text: &str) {
        if self.echo {
            let name = self
                .roster
                .get(recipient)
                .map_or_else(|| format!("#{recipient}"), |player| player.plain_name());
            println!("[-> {name}] {text}");
        }
        let mut history = self.history.borrow_mut();
        if history.len() == HISTORY_LIMIT {
            history.pop_front();
        }
        history.push_back(Delivery {
            recipient,
            text: text.to_owned(),
        });
    }
}
