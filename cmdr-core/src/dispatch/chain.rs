use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use cmdr_common::error::CmdrError;
use cmdr_common::ids::PlayerId;

use super::DispatchServices;
use crate::command::{ArgValue, ArgumentDescriptor, ResolvedArgs};
use crate::host::{ChoiceRequest, LogLevel, MenuOutcome};
use crate::player::Player;

/// Continuation run once every queued argument has been selected.
pub type ChainCompletion = Box<dyn FnOnce(ResolvedArgs)>;

/// A chain in the `Pending` state: partial result plus the arguments still to select.
struct ResolutionChain {
    resolved: ResolvedArgs,
    queue: VecDeque<ArgumentDescriptor>,
    requester: PlayerId,
    services: DispatchServices,
    on_complete: ChainCompletion,
}

/// A chain in the `AwaitingChoice` state, shared with the menu callback that settles it.
///
/// `presenting` is set while `present_choices` is on the stack. A callback that fires during
/// that window parks the advanced chain in `chain` and sets `ready`, so the driving loop picks
/// it up instead of the callback recursing.
struct AwaitingChoice {
    chain: RefCell<Option<ResolutionChain>>,
    descriptor: ArgumentDescriptor,
    candidates: Vec<Player>,
    presenting: Cell<bool>,
    ready: Cell<bool>,
}

/// Resolves queued arguments through menus, then runs `on_complete` exactly once.
///
/// With an empty queue `on_complete` runs synchronously. Otherwise the front argument is
/// presented to `requester` with the live roster as options; each selection is folded into the
/// partial result before the next argument is presented. A cancelled menu drops the chain and
/// `on_complete` never runs.
pub fn resolve_chain(
    resolved: ResolvedArgs,
    queue: VecDeque<ArgumentDescriptor>,
    requester: PlayerId,
    services: DispatchServices,
    on_complete: ChainCompletion,
) {
    drive(ResolutionChain {
        resolved,
        queue,
        requester,
        services,
        on_complete,
    });
}

/// Advances a chain until it completes, fails, or suspends on a menu.
fn drive(mut chain: ResolutionChain) {
    loop {
        let Some(descriptor) = chain.queue.pop_front() else {
            tracing::debug!(requester = chain.requester, "argument resolution complete");
            (chain.on_complete)(chain.resolved);
            return;
        };
        if !descriptor.kind.is_menu_resolvable() {
            let error = CmdrError::UnresolvableArgument(format!(
                "{} of type {}",
                descriptor.name, descriptor.kind
            ));
            tracing::error!(requester = chain.requester, "{error}");
            chain.services.log.log(LogLevel::Error, &error.to_string());
            return;
        }

        let candidates = chain.services.players.online_players();
        let request = ChoiceRequest {
            title: chain.services.config.player_menu_title.clone(),
            prompt: format!("Select a player for the argument \"{}\"", descriptor.name),
            requester: chain.requester,
            options: candidates.iter().map(|player| player.name.clone()).collect(),
            allow_cancel: true,
        };
        let menus = Rc::clone(&chain.services.menus);
        tracing::debug!(
            requester = chain.requester,
            argument = %descriptor.name,
            options = candidates.len(),
            "awaiting menu selection"
        );
        let awaiting = Rc::new(AwaitingChoice {
            chain: RefCell::new(Some(chain)),
            descriptor,
            candidates,
            presenting: Cell::new(true),
            ready: Cell::new(false),
        });
        let settle_handle = Rc::clone(&awaiting);
        menus.present_choices(
            request,
            Box::new(move |outcome| settle_handle.settle(outcome)),
        );
        awaiting.presenting.set(false);

        if !awaiting.ready.get() {
            return;
        }
        let Some(next) = awaiting.chain.borrow_mut().take() else {
            return;
        };
        chain = next;
    }
}

impl AwaitingChoice {
    fn settle(&self, outcome: MenuOutcome) {
        let Some(mut chain) = self.chain.borrow_mut().take() else {
            return;
        };
        let chosen = match outcome {
            MenuOutcome::Chosen(index) => {
                let chosen = self.candidates.get(index).cloned();
                if chosen.is_none() {
                    tracing::warn!(
                        requester = chain.requester,
                        index,
                        "menu answered with an out-of-range option; dropping command"
                    );
                }
                chosen
            }
            MenuOutcome::Cancelled => None,
        };
        let Some(player) = chosen else {
            tracing::debug!(
                requester = chain.requester,
                argument = %self.descriptor.name,
                "argument resolution cancelled"
            );
            return;
        };

        chain
            .resolved
            .insert(self.descriptor.name.clone(), ArgValue::Player(player));
        if self.presenting.get() {
            *self.chain.borrow_mut() = Some(chain);
            self.ready.set(true);
        } else {
            drive(chain);
        }
    }
}
