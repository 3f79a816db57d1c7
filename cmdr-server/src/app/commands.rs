//! Demo command set installed on the client and console tables.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use cmdr_common::ids::{PlayerId, Rank};
use cmdr_core::containers::HotMap;
use cmdr_core::host::OutputSink;
use cmdr_core::player::PlayerDirectory;
use cmdr_core::{
    CommandContext, CommandDefinition, ConsoleCommandDefinition, Dispatcher, HandlerError,
    HandlerResult, Permission, Player, fail,
};
use cmdr_facade::CommandTable;

use super::menus::PendingMenus;
use super::roster::Roster;
use super::transcript::Transcript;

/// State shared by the demo commands.
pub(super) struct CommandEnv {
    pub(super) roster: Rc<Roster>,
    pub(super) menus: Rc<PendingMenus>,
    pub(super) transcript: Rc<Transcript>,
    pub(super) dispatcher: Dispatcher,
    pub(super) console_table: Weak<CommandTable>,
    pub(super) votes: RefCell<HotMap<PlayerId, bool>>,
}

type Run = fn(&CommandEnv, &CommandContext<'_>) -> HandlerResult;

fn client(
    env: &Rc<CommandEnv>,
    name: &'static str,
    args: &[&'static str],
    description: &'static str,
    permission: Permission,
    run: Run,
) -> CommandDefinition {
    let env = Rc::clone(env);
    CommandDefinition::new(name, args, description, permission, move |ctx| run(&env, ctx))
}

fn console(
    env: &Rc<CommandEnv>,
    name: &'static str,
    args: &[&'static str],
    description: &'static str,
    run: Run,
) -> ConsoleCommandDefinition {
    let env = Rc::clone(env);
    ConsoleCommandDefinition::new(name, args, description, move |ctx| run(&env, ctx))
}

/// Commands players type behind the client prefix.
pub(super) fn client_commands(env: &Rc<CommandEnv>) -> Vec<CommandDefinition> {
    vec![
        client(env, "help", &[], "Lists the commands you can use", Permission::all(), help),
        client(env, "players", &[], "Lists online players", Permission::all(), players),
        client(
            env,
            "warn",
            &["target:player", "reason:string"],
            "Warns a player",
            Permission::moderator(),
            warn,
        ),
        client(
            env,
            "kick",
            &["target:player", "reason:string?"],
            "Disconnects a player",
            Permission::moderator(),
            kick,
        ),
        client(env, "mute", &["target:player"], "Mutes a player", Permission::moderator(), mute),
        client(
            env,
            "unmute",
            &["target:player"],
            "Unmutes a player",
            Permission::moderator(),
            unmute,
        ),
        client(
            env,
            "restrict",
            &["target:player", "enabled:boolean"],
            "Stops or frees a player",
            Permission::moderator(),
            restrict,
        ),
        client(env, "me", &["action:string"], "Describes an action", Permission::chat(), me),
        client(
            env,
            "vote",
            &["choice:boolean"],
            "Votes yes or no",
            Permission::not_restricted(),
            vote,
        ),
        client(
            env,
            "rank",
            &["target:namedPlayer?"],
            "Shows a player's rank",
            Permission::all(),
            rank,
        ),
        client(
            env,
            "whois",
            &["target:exactPlayer"],
            "Shows details about a player",
            Permission::trusted(),
            whois,
        ),
        client(env, "perks", &[], "Lists membership perks", Permission::member(), perks),
        client(env, "crash", &[], "Crashes the command", Permission::admin(), crash).hidden(),
    ]
}

/// Commands typed at the server console.
pub(super) fn console_commands(env: &Rc<CommandEnv>) -> Vec<ConsoleCommandDefinition> {
    vec![
        console(env, "help", &[], "Lists console commands", console_help),
        console(env, "join", &["name:string"], "Connects a player", join),
        console(env, "leave", &["target:exactPlayer"], "Disconnects a player", leave),
        console(
            env,
            "setrank",
            &["target:exactPlayer", "rank:string"],
            "Changes a player's rank",
            set_rank,
        ),
        console(
            env,
            "membership",
            &["target:exactPlayer", "enabled:boolean"],
            "Grants or revokes a membership",
            membership,
        ),
        console(env, "say", &["message:string"], "Broadcasts a server message", say),
        console(env, "exec", &["command:string"], "Runs a console command line", exec),
        console(env, "status", &[], "Shows server status", status),
    ]
}

fn sender<'a>(ctx: &CommandContext<'a>) -> Result<&'a Player, HandlerError> {
    ctx.sender
        .ok_or_else(|| HandlerError::unexpected("interactive command ran without a sender"))
}

fn player_arg<'a>(ctx: &CommandContext<'a>, name: &str) -> Result<&'a Player, HandlerError> {
    ctx.args
        .player(name)
        .ok_or_else(|| HandlerError::Unexpected(format!("argument {name} was not resolved")))
}

fn text_arg<'a>(ctx: &CommandContext<'a>, name: &str) -> Result<&'a str, HandlerError> {
    ctx.args
        .text(name)
        .ok_or_else(|| HandlerError::Unexpected(format!("argument {name} was not resolved")))
}

fn bool_arg(ctx: &CommandContext<'_>, name: &str) -> Result<bool, HandlerError> {
    ctx.args
        .boolean(name)
        .ok_or_else(|| HandlerError::Unexpected(format!("argument {name} was not resolved")))
}

/// Re-reads `target` from the roster; menus may have been answered after it left.
fn online(env: &CommandEnv, target: &Player) -> Result<Player, HandlerError> {
    match env.roster.get(target.id) {
        Some(player) => Ok(player),
        None => fail("Target is offline"),
    }
}

fn help(env: &CommandEnv, ctx: &CommandContext<'_>) -> HandlerResult {
    let caller = sender(ctx)?;
    let listings = env.dispatcher.visible_commands(caller);
    ctx.output(format!("[orange]-- Commands ({}) --", listings.len()));
    for listing in listings {
        let usage = if listing.usage.is_empty() {
            String::new()
        } else {
            format!(" {}", listing.usage)
        };
        ctx.output(format!(
            "{}/{}[white]{usage} [lightgray]- {}",
            listing.permission.color(),
            listing.name,
            listing.description
        ));
    }
    Ok(())
}

fn players(env: &CommandEnv, ctx: &CommandContext<'_>) -> HandlerResult {
    let online = env.roster.online_players();
    ctx.output(format!("[orange]-- Players online: {} --", online.len()));
    for player in online {
        ctx.output(format!(
            "{}{}[white] ({}) [lightgray]#{}",
            player.rank.color(),
            player.name,
            player.rank,
            player.id
        ));
    }
    Ok(())
}

fn warn(env: &CommandEnv, ctx: &CommandContext<'_>) -> HandlerResult {
    let caller = sender(ctx)?;
    let target = online(env, player_arg(ctx, "target")?)?;
    let reason = text_arg(ctx, "reason")?;
    if target.id == caller.id {
        return fail("You cannot warn yourself.");
    }
    env.transcript.send_line(
        target.id,
        &format!(
            "[scarlet]You have been warned by {}[scarlet]: [white]{reason}",
            caller.name
        ),
    );
    ctx.success(format!("Warned {} for: {reason}", target.plain_name()));
    Ok(())
}

fn kick(env: &CommandEnv, ctx: &CommandContext<'_>) -> HandlerResult {
    let caller = sender(ctx)?;
    let target = online(env, player_arg(ctx, "target")?)?;
    let reason = ctx.args.text("reason").unwrap_or("No reason given");
    if target.id == caller.id {
        return fail("You cannot kick yourself.");
    }
    if target.ranks_at_least(caller.rank) {
        return fail("You cannot kick a player of equal or higher rank.");
    }
    env.transcript.send_line(
        target.id,
        &format!("[scarlet]You were kicked by {}: {reason}", caller.plain_name()),
    );
    env.menus.discard(target.id);
    env.roster.leave(target.id);
    env.transcript
        .broadcast(&format!("[accent]{}[accent] was kicked.", target.name));
    Ok(())
}

fn mute(env: &CommandEnv, ctx: &CommandContext<'_>) -> HandlerResult {
    set_muted(env, ctx, true)
}

fn unmute(env: &CommandEnv, ctx: &CommandContext<'_>) -> HandlerResult {
    set_muted(env, ctx, false)
}

fn set_muted(env: &CommandEnv, ctx: &CommandContext<'_>, muted: bool) -> HandlerResult {
    let target = online(env, player_arg(ctx, "target")?)?;
    if target.muted == muted {
        let state = if muted { "already muted" } else { "not muted" };
        return fail(format!("{} is {state}.", target.plain_name()));
    }
    env.roster.update(target.id, |player| player.muted = muted);
    let (notice, done) = if muted {
        ("[scarlet]You have been muted.", "Muted")
    } else {
        ("[#48e076]You can chat again.", "Unmuted")
    };
    env.transcript.send_line(target.id, notice);
    ctx.success(format!("{done} {}.", target.plain_name()));
    Ok(())
}

fn restrict(env: &CommandEnv, ctx: &CommandContext<'_>) -> HandlerResult {
    let caller = sender(ctx)?;
    let target = online(env, player_arg(ctx, "target")?)?;
    let enabled = bool_arg(ctx, "enabled")?;
    if target.ranks_at_least(caller.rank) && target.id != caller.id {
        return fail("You cannot restrict a player of equal or higher rank.");
    }
    env.roster
        .update(target.id, |player| player.restricted = enabled);
    let state = if enabled { "restricted" } else { "free" };
    env.transcript
        .send_line(target.id, &format!("[accent]You are now {state}."));
    ctx.success(format!("{} is now {state}.", target.plain_name()));
    Ok(())
}

fn me(env: &CommandEnv, ctx: &CommandContext<'_>) -> HandlerResult {
    let caller = sender(ctx)?;
    let action = text_arg(ctx, "action")?;
    env.transcript
        .broadcast(&format!("[accent]* {}[accent] {action}", caller.name));
    Ok(())
}

fn vote(env: &CommandEnv, ctx: &CommandContext<'_>) -> HandlerResult {
    let caller = sender(ctx)?;
    let choice = bool_arg(ctx, "choice")?;
    let (yes, no) = {
        let mut votes = env.votes.borrow_mut();
        votes.insert(caller.id, choice);
        let yes = votes.values().filter(|vote| **vote).count();
        (yes, votes.len() - yes)
    };
    let word = if choice { "yes" } else { "no" };
    ctx.success(format!("You voted {word}. Tally: {yes} yes, {no} no."));
    Ok(())
}

fn rank(_env: &CommandEnv, ctx: &CommandContext<'_>) -> HandlerResult {
    let caller = sender(ctx)?;
    let target = ctx.args.player("target").unwrap_or(caller);
    ctx.output(format!(
        "{}[white] is rank {}{}",
        target.name,
        target.rank.color(),
        target.rank
    ));
    Ok(())
}

fn whois(env: &CommandEnv, ctx: &CommandContext<'_>) -> HandlerResult {
    let target = online(env, player_arg(ctx, "target")?)?;
    let yes_no = |flag: bool| if flag { "yes" } else { "no" };
    ctx.output(format!("[orange]-- {} --", target.plain_name()));
    ctx.output(format!("id: {}", target.id));
    ctx.output(format!("display name: {}", target.name));
    ctx.output(format!("rank: {}", target.rank));
    ctx.output(format!(
        "muted: {}, restricted: {}, member: {}",
        yes_no(target.muted),
        yes_no(target.restricted),
        yes_no(target.member)
    ));
    Ok(())
}

fn perks(_env: &CommandEnv, ctx: &CommandContext<'_>) -> HandlerResult {
    ctx.output("[pink]Membership perks: colored names, priority queue, and a warm welcome.");
    Ok(())
}

fn crash(_env: &CommandEnv, ctx: &CommandContext<'_>) -> HandlerResult {
    let caller = sender(ctx)?;
    panic!("crash requested by {}", caller.plain_name());
}

fn console_help(env: &CommandEnv, ctx: &CommandContext<'_>) -> HandlerResult {
    let Some(table) = env.console_table.upgrade() else {
        return Err(HandlerError::unexpected("console table is gone"));
    };
    for entry in table.help_entries() {
        ctx.output(format!("{} {} - {}", entry.name, entry.usage, entry.description));
    }
    Ok(())
}

fn join(env: &CommandEnv, ctx: &CommandContext<'_>) -> HandlerResult {
    let name = text_arg(ctx, "name")?;
    let player = env.roster.join(name, Rank::Player);
    env.transcript
        .broadcast(&format!("[accent]{}[accent] has connected.", player.name));
    ctx.success(format!("{} joined as #{}.", player.plain_name(), player.id));
    Ok(())
}

fn leave(env: &CommandEnv, ctx: &CommandContext<'_>) -> HandlerResult {
    let target = player_arg(ctx, "target")?;
    env.menus.discard(target.id);
    if env.roster.leave(target.id).is_none() {
        return fail("Target is offline");
    }
    env.transcript
        .broadcast(&format!("[accent]{}[accent] has disconnected.", target.name));
    ctx.success(format!("{} left.", target.plain_name()));
    Ok(())
}

fn set_rank(env: &CommandEnv, ctx: &CommandContext<'_>) -> HandlerResult {
    let target = player_arg(ctx, "target")?;
    let requested = text_arg(ctx, "rank")?;
    let Some(rank) = Rank::from_name(requested) else {
        let known = Rank::ALL.map(Rank::name).join(", ");
        return fail(format!("Unknown rank \"{requested}\". Expected one of: {known}"));
    };
    if env.roster.update(target.id, |player| player.rank = rank).is_none() {
        return fail("Target is offline");
    }
    env.transcript.send_line(
        target.id,
        &format!("[accent]Your rank is now {}{rank}[accent].", rank.color()),
    );
    ctx.success(format!("{} is now {rank}.", target.plain_name()));
    Ok(())
}

fn membership(env: &CommandEnv, ctx: &CommandContext<'_>) -> HandlerResult {
    let target = player_arg(ctx, "target")?;
    let enabled = bool_arg(ctx, "enabled")?;
    if env
        .roster
        .update(target.id, |player| player.member = enabled)
        .is_none()
    {
        return fail("Target is offline");
    }
    let state = if enabled { "granted to" } else { "revoked from" };
    ctx.success(format!("Membership {state} {}.", target.plain_name()));
    Ok(())
}

fn say(env: &CommandEnv, ctx: &CommandContext<'_>) -> HandlerResult {
    let message = text_arg(ctx, "message")?;
    env.transcript
        .broadcast(&format!("[scarlet][Server]:[white] {message}"));
    ctx.output(format!("Server: {message}"));
    Ok(())
}

fn exec(_env: &CommandEnv, ctx: &CommandContext<'_>) -> HandlerResult {
    let line = text_arg(ctx, "command")?;
    ctx.exec_console(line)
        .map_err(|error| HandlerError::Command(error.user_message()))
}

fn status(env: &CommandEnv, ctx: &CommandContext<'_>) -> HandlerResult {
    ctx.output(format!(
        "{} players online, {} open menus, {} votes cast",
        env.roster.len(),
        env.menus.open_count(),
        env.votes.borrow().len()
    ));
    Ok(())
}
