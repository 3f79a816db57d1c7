//! Recording fakes for the host collaborators, shared by dispatch tests.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use cmdr_common::config::EngineConfig;
use cmdr_common::error::{CmdrError, CmdrResult};
use cmdr_common::ids::{PlayerId, Rank};

use super::{DispatchServices, Dispatcher};
use crate::containers::HotMap;
use crate::host::{
    Caller, ChoiceCallback, ChoiceRequest, CommandSubstrate, ConsoleExec, LogLevel, LogSink,
    MenuOutcome, MenuPresenter, OutputSink, SubstrateHandler,
};
use crate::player::{Player, PlayerDirectory, exact_matches, fuzzy_match};

pub(super) const ADMIRAL: PlayerId = 1;
pub(super) const BOB: PlayerId = 2;
pub(super) const CAROL: PlayerId = 3;

/// Default roster: an admin, a plain player, and a moderator.
pub(super) fn crew() -> Vec<Player> {
    vec![
        Player::new(ADMIRAL, "[gold]Admiral").with_rank(Rank::Admin),
        Player::new(BOB, "Bob"),
        Player::new(CAROL, "[sky]Carol").with_rank(Rank::Moderator),
    ]
}

#[derive(Default)]
pub(super) struct FakeDirectory {
    players: RefCell<Vec<Player>>,
}

impl FakeDirectory {
    pub(super) fn new(players: Vec<Player>) -> Self {
        Self {
            players: RefCell::new(players),
        }
    }

    pub(super) fn join(&self, player: Player) {
        self.players.borrow_mut().push(player);
    }

    pub(super) fn leave(&self, id: PlayerId) {
        self.players.borrow_mut().retain(|player| player.id != id);
    }

    pub(super) fn update(&self, id: PlayerId, change: impl FnOnce(&mut Player)) {
        if let Some(player) = self
            .players
            .borrow_mut()
            .iter_mut()
            .find(|player| player.id == id)
        {
            change(player);
        }
    }
}

impl PlayerDirectory for FakeDirectory {
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

/// Menu that records requests and either answers from a script or parks the callback.
#[derive(Default)]
pub(super) struct ScriptedMenu {
    requests: RefCell<Vec<ChoiceRequest>>,
    pending: RefCell<VecDeque<ChoiceCallback>>,
    scripted: RefCell<VecDeque<MenuOutcome>>,
    always: Cell<Option<MenuOutcome>>,
}

impl ScriptedMenu {
    pub(super) fn requests(&self) -> Vec<ChoiceRequest> {
        self.requests.borrow().clone()
    }

    pub(super) fn request_count(&self) -> usize {
        self.requests.borrow().len()
    }

    pub(super) fn pending_count(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Answers the oldest parked menu. Returns `false` when nothing is parked.
    pub(super) fn answer(&self, outcome: MenuOutcome) -> bool {
        let callback = self.pending.borrow_mut().pop_front();
        match callback {
            Some(callback) => {
                callback(outcome);
                true
            }
            None => false,
        }
    }

    /// Answers the next presented menu synchronously, inside `present_choices`.
    pub(super) fn script(&self, outcome: MenuOutcome) {
        self.scripted.borrow_mut().push_back(outcome);
    }

    /// Answers every presented menu synchronously.
    pub(super) fn always(&self, outcome: MenuOutcome) {
        self.always.set(Some(outcome));
    }
}

impl MenuPresenter for ScriptedMenu {
    fn present_choices(&self, request: ChoiceRequest, on_chosen: ChoiceCallback) {
        self.requests.borrow_mut().push(request);
        let scripted = self.scripted.borrow_mut().pop_front();
        match scripted.or(self.always.get()) {
            Some(outcome) => on_chosen(outcome),
            None => self.pending.borrow_mut().push_back(on_chosen),
        }
    }
}

#[derive(Default)]
pub(super) struct RecordingOutput {
    lines: RefCell<Vec<(PlayerId, String)>>,
}

impl RecordingOutput {
    pub(super) fn lines_for(&self, recipient: PlayerId) -> Vec<String> {
        self.lines
            .borrow()
            .iter()
            .filter(|(to, _)| *to == recipient)
            .map(|(_, text)| text.clone())
            .collect()
    }

    pub(super) fn total(&self) -> usize {
        self.lines.borrow().len()
    }
}

impl OutputSink for RecordingOutput {
    fn send_line(&self, recipient: PlayerId, text: &str) {
        self.lines.borrow_mut().push((recipient, text.to_owned()));
    }
}

#[derive(Default)]
pub(super) struct RecordingLog {
    entries: RefCell<Vec<(LogLevel, String)>>,
}

impl RecordingLog {
    pub(super) fn entries(&self) -> Vec<(LogLevel, String)> {
        self.entries.borrow().clone()
    }

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

struct Registration {
    usage: String,
    handler: SubstrateHandler,
}

/// Minimal whitespace-splitting substrate.
#[derive(Default)]
pub(super) struct FakeSubstrate {
    commands: RefCell<HotMap<String, Registration>>,
    registrations: Cell<usize>,
    reject: RefCell<Option<String>>,
}

impl FakeSubstrate {
    pub(super) fn invoke(&self, caller: Caller, name: &str, args: &[&str]) -> bool {
        let handler = self
            .commands
            .borrow()
            .get(name)
            .map(|registration| Rc::clone(&registration.handler));
        let Some(handler) = handler else {
            return false;
        };
        let tokens = args.iter().map(|arg| (*arg).to_owned()).collect::<Vec<_>>();
        handler(caller, &tokens);
        true
    }

    pub(super) fn usage(&self, name: &str) -> Option<String> {
        self.commands
            .borrow()
            .get(name)
            .map(|registration| registration.usage.clone())
    }

    pub(super) fn command_count(&self) -> usize {
        self.commands.borrow().len()
    }

    pub(super) fn registrations(&self) -> usize {
        self.registrations.get()
    }

    pub(super) fn reject_name(&self, name: &str) {
        *self.reject.borrow_mut() = Some(name.to_owned());
    }
}

impl CommandSubstrate for FakeSubstrate {
    fn register(
        &self,
        name: &str,
        usage: &str,
        _description: &str,
        handler: SubstrateHandler,
    ) -> CmdrResult<()> {
        if self.reject.borrow().as_deref() == Some(name) {
            return Err(CmdrError::Substrate(format!("refused {name}")));
        }
        self.registrations.set(self.registrations.get() + 1);
        self.commands.borrow_mut().insert(
            name.to_owned(),
            Registration {
                usage: usage.to_owned(),
                handler,
            },
        );
        Ok(())
    }

    fn remove_command(&self, name: &str) {
        self.commands.borrow_mut().remove(name);
    }
}

impl ConsoleExec for FakeSubstrate {
    fn exec_console(&self, line: &str) -> CmdrResult<()> {
        let mut words = line.split_whitespace();
        let Some(name) = words.next() else {
            return Err(CmdrError::Substrate("empty line".to_owned()));
        };
        let args = words.collect::<Vec<_>>();
        if self.invoke(Caller::Console, name, &args) {
            Ok(())
        } else {
            Err(CmdrError::Substrate(format!("unknown command {name}")))
        }
    }
}

/// Fully wired dispatcher over recording fakes.
pub(super) struct Harness {
    pub(super) directory: Rc<FakeDirectory>,
    pub(super) menus: Rc<ScriptedMenu>,
    pub(super) output: Rc<RecordingOutput>,
    pub(super) log: Rc<RecordingLog>,
    pub(super) client: Rc<FakeSubstrate>,
    pub(super) console: Rc<FakeSubstrate>,
    pub(super) dispatcher: Dispatcher,
}

impl Harness {
    pub(super) fn new() -> Self {
        Self::with_players(crew())
    }

    pub(super) fn with_players(players: Vec<Player>) -> Self {
        let directory = Rc::new(FakeDirectory::new(players));
        let menus = Rc::new(ScriptedMenu::default());
        let output = Rc::new(RecordingOutput::default());
        let log = Rc::new(RecordingLog::default());
        let client = Rc::new(FakeSubstrate::default());
        let console = Rc::new(FakeSubstrate::default());
        let console_exec: Rc<dyn ConsoleExec> = console.clone();
        let services = DispatchServices::new(
            EngineConfig::default(),
            directory.clone(),
            menus.clone(),
            output.clone(),
            log.clone(),
        )
        .with_console(&console_exec);
        Self {
            directory,
            menus,
            output,
            log,
            client,
            console,
            dispatcher: Dispatcher::new(services),
        }
    }

    pub(super) fn services(&self) -> DispatchServices {
        self.dispatcher.services().clone()
    }

    pub(super) fn run(&self, player: PlayerId, name: &str, args: &[&str]) -> bool {
        self.client.invoke(Caller::Player(player), name, args)
    }

    pub(super) fn run_console(&self, name: &str, args: &[&str]) -> bool {
        self.console.invoke(Caller::Console, name, args)
    }

    pub(super) fn lines(&self, player: PlayerId) -> Vec<String> {
        self.output.lines_for(player)
    }

    pub(super) fn fail_line(&self, message: &str) -> String {
        format!("{}{message}", self.services().config.fail_prefix)
    }

    pub(super) fn success_line(&self, message: &str) -> String {
        format!("{}{message}", self.services().config.success_prefix)
    }
}
