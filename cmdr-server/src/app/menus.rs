//! Pending selection menus answered by later input lines.

use std::cell::RefCell;
use std::rc::Rc;

use cmdr_common::ids::PlayerId;
use cmdr_core::containers::HotMap;
use cmdr_core::host::{ChoiceCallback, ChoiceRequest, MenuOutcome, MenuPresenter, OutputSink};

use super::transcript::Transcript;

struct PendingMenu {
    option_count: usize,
    allow_cancel: bool,
    on_chosen: ChoiceCallback,
}

/// How a menu answer was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAnswer {
    /// The menu's continuation ran.
    Delivered,
    /// The player has no open menu.
    NoMenu,
    /// The option index is outside the menu; the menu stays open.
    OutOfRange,
    /// The menu cannot be dismissed; it stays open.
    NotCancellable,
}

/// At most one open menu per player. Presenting a new menu cancels the previous one.
pub struct PendingMenus {
    pending: RefCell<HotMap<PlayerId, PendingMenu>>,
    transcript: Rc<Transcript>,
}

impl PendingMenus {
    /// Creates an empty registry rendering menus through `transcript`.
    #[must_use]
    pub fn new(transcript: Rc<Transcript>) -> Self {
        Self {
            pending: RefCell::new(HotMap::new()),
            transcript,
        }
    }

    /// Number of open menus.
    #[must_use]
    pub fn open_count(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Whether `player` has an open menu.
    #[must_use]
    pub fn is_open(&self, player: PlayerId) -> bool {
        self.pending.borrow().contains_key(&player)
    }

    /// Answers the open menu of `player`.
    pub fn answer(&self, player: PlayerId, outcome: MenuOutcome) -> MenuAnswer {
        let menu = {
            let mut pending = self.pending.borrow_mut();
            let Some(menu) = pending.get(&player) else {
                return MenuAnswer::NoMenu;
            };
            match outcome {
                MenuOutcome::Chosen(index) if index >= menu.option_count => {
                    return MenuAnswer::OutOfRange;
                }
                MenuOutcome::Cancelled if !menu.allow_cancel => {
                    return MenuAnswer::NotCancellable;
                }
                _ => {}
            }
            pending.remove(&player)
        };
        match menu {
            Some(menu) => {
                (menu.on_chosen)(outcome);
                MenuAnswer::Delivered
            }
            None => MenuAnswer::NoMenu,
        }
    }

    /// Cancels the open menu of a player who disconnected.
    pub fn discard(&self, player: PlayerId) {
        let menu = self.pending.borrow_mut().remove(&player);
        if let Some(menu) = menu {
            tracing::debug!(player_id = player, "discarding menu of departed player");
            (menu.on_chosen)(MenuOutcome::Cancelled);
        }
    }

    fn render(&self, request: &ChoiceRequest) {
        let recipient = request.requester;
        self.transcript
            .send_line(recipient, &format!("[accent]{}", request.title));
        self.transcript.send_line(recipient, &request.prompt);
        for (index, label) in request.options.iter().enumerate() {
            self.transcript
                .send_line(recipient, &format!("[lightgray]{}.[white] {label}", index + 1));
        }
        let hint = if request.allow_cancel {
            "[lightgray]Answer with !choose <you> <number>, or !cancel <you>."
        } else {
            "[lightgray]Answer with !choose <you> <number>."
        };
        self.transcript.send_line(recipient, hint);
    }
}

impl MenuPresenter for PendingMenus {
    fn present_choices(&self, request: ChoiceRequest, on_chosen: ChoiceCallback) {
        self.render(&request);
        let replaced = self.pending.borrow_mut().insert(
            request.requester,
            PendingMenu {
                option_count: request.options.len(),
                allow_cancel: request.allow_cancel,
                on_chosen,
            },
        );
        if let Some(replaced) = replaced {
            tracing::debug!(
                player_id = request.requester,
                "new menu replaces an unanswered one"
            );
            (replaced.on_chosen)(MenuOutcome::Cancelled);
        }
    }
}

impl std::fmt::Debug for PendingMenus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingMenus")
            .field("open", &self.open_count())
            .finish_non_exhaustive()
    }
}
