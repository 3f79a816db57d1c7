//! In-memory roster of connected players.

use std::cell::{Cell, RefCell};

use cmdr_common::ids::{PlayerId, Rank};
use cmdr_core::player::{Player, PlayerDirectory, exact_matches, fuzzy_match};

/// Connected players in join order.
#[derive(Debug, Default)]
pub struct Roster {
    players: RefCell<Vec<Player>>,
    last_id: Cell<PlayerId>,
}

impl Roster {
    /// Connects a new player and returns its snapshot.
    pub fn join(&self, name: &str, rank: Rank) -> Player {
        let id = self.last_id.get().saturating_add(1);
        self.last_id.set(id);
        let player = Player::new(id, name).with_rank(rank);
        self.players.borrow_mut().push(player.clone());
        tracing::info!(player_id = id, name, %rank, "player joined");
        player
    }

    /// Disconnects a player. Returns the last snapshot when the player was online.
    pub fn leave(&self, id: PlayerId) -> Option<Player> {
        let mut players = self.players.borrow_mut();
        let index = players.iter().position(|player| player.id == id)?;
        let player = players.remove(index);
        tracing::info!(player_id = id, name = %player.name, "player left");
        Some(player)
    }

    /// Applies `change` to an online player and returns the updated snapshot.
    pub fn update(&self, id: PlayerId, change: impl FnOnce(&mut Player)) -> Option<Player> {
        let mut players = self.players.borrow_mut();
        let player = players.iter_mut().find(|player| player.id == id)?;
        change(player);
        Some(player.clone())
    }

    /// Number of online players.
    #[must_use]
    pub fn len(&self) -> usize {
        self.players.borrow().len()
    }
}

impl PlayerDirectory for Roster {
    fn get(&self, id: PlayerId) -> Option<Player> {
        self.players
            .borrow()
            .iter()
            .find(|player| player.id == id)
            .cloned()
    }

    fn lookup_by_name(&self, name: &str) -> Option<Player> {
        fuzzy_match(self.players.borrow().iter(), name).cloned()
    }

    fn lookup_all_by_name_exact(&self, name: &str) -> Vec<Player> {
        exact_matches(self.players.borrow().iter(), name)
            .into_iter()
            .cloned()
            .collect()
    }

    fn online_players(&self) -> Vec<Player> {
        self.players.borrow().clone()
    }
}
