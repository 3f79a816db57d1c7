mod testkit;

use super::ServerApp;
use cmdr_common::config::ServerConfig;
use cmdr_common::error::CmdrError;
use cmdr_common::ids::Rank;
use cmdr_core::host::LogLevel;
use cmdr_core::player::PlayerDirectory;
use googletest::prelude::*;
use rstest::rstest;
use testkit::{ADMIRAL, BOB, CAROL, fail_line, success_line, test_app};

const UNKNOWN_COMMAND: &str = "[scarlet]Unknown command. Check [lightgray]/help[scarlet].";

#[rstest]
fn startup_installs_both_command_tables() {
    let (app, _log) = test_app();

    assert_that!(app.facade.client.len(), eq(13));
    assert_that!(app.facade.console.len(), eq(8));
    assert_that!(app.roster.len(), eq(3));
    assert_that!(
        app.startup_summary().as_str(),
        eq("cmdr-server bootstrap: client_commands=13, console_commands=8, players_online=3, prefix=\"/\"")
    );
}

#[rstest]
fn invalid_config_is_rejected() {
    let config = ServerConfig {
        client_command_prefix: " ".to_owned(),
        ..ServerConfig::default()
    };
    let result = ServerApp::new(config);
    assert_that!(
        matches!(result, Err(CmdrError::InvalidConfig(_))),
        eq(true)
    );
}

#[rstest]
fn warn_with_name_and_free_text_reason() {
    let (app, _log) = test_app();

    app.handle_line("@Admiral /warn Bob throwing rocks at base");

    assert_that!(
        &app.transcript.lines_for(BOB),
        eq(&vec![
            "[scarlet]You have been warned by [gold]Admiral[scarlet]: [white]throwing rocks at base"
                .to_owned()
        ])
    );
    assert_that!(
        &app.transcript.lines_for(ADMIRAL),
        eq(&vec![success_line(&app, "Warned Bob for: throwing rocks at base")])
    );
}

#[rstest]
fn warn_without_arguments_fails_before_any_menu() {
    let (app, _log) = test_app();

    app.handle_line("@Admiral /warn");

    assert_that!(app.menus.open_count(), eq(0));
    assert_that!(
        &app.transcript.lines_for(ADMIRAL),
        eq(&vec![fail_line(&app, "Missing required argument \"reason\".")])
    );
}

#[rstest]
fn kick_target_is_picked_from_a_menu() {
    let (app, _log) = test_app();

    app.handle_line("@Admiral /kick");
    assert_that!(app.menus.is_open(ADMIRAL), eq(true));
    assert_that!(app.roster.len(), eq(3));

    app.handle_line("!choose Admiral 2");

    assert_that!(app.menus.open_count(), eq(0));
    assert_that!(app.roster.get(BOB).is_none(), eq(true));
    assert_that!(
        app.transcript.lines_for(BOB).first().map(String::as_str),
        eq(Some("[scarlet]You were kicked by Admiral: No reason given"))
    );
    assert_that!(
        app.transcript.lines_for(CAROL).last().map(String::as_str),
        eq(Some("[accent]Bob[accent] was kicked."))
    );
}

#[rstest]
fn cancelled_menu_runs_nothing() {
    let (app, _log) = test_app();

    app.handle_line("@Admiral /kick");
    app.handle_line("!cancel Admiral");
    app.handle_line("!cancel Admiral");

    assert_that!(app.roster.len(), eq(3));
    assert_that!(app.menus.open_count(), eq(0));
    assert_that!(
        app.transcript.lines_for(ADMIRAL).last().map(String::as_str),
        eq(Some(fail_line(&app, "You have no open menu.").as_str()))
    );
}

#[rstest]
fn out_of_range_choice_keeps_the_menu_open() {
    let (app, _log) = test_app();

    app.handle_line("@Carol /mute");
    app.handle_line("!choose Carol 9");

    assert_that!(app.menus.is_open(CAROL), eq(true));
    assert_that!(
        app.transcript.lines_for(CAROL).last().map(String::as_str),
        eq(Some(fail_line(&app, "That option is not in the menu.").as_str()))
    );

    app.handle_line("!choose Carol 2");
    assert_that!(app.roster.get(BOB).map(|bob| bob.muted), eq(Some(true)));
}

#[rstest]
fn leaving_discards_the_open_menu() {
    let (app, _log) = test_app();

    app.handle_line("@Admiral /kick");
    app.handle_line("leave Admiral");

    assert_that!(app.menus.open_count(), eq(0));
    assert_that!(app.roster.len(), eq(2));
}

#[rstest]
fn surplus_tokens_show_the_usage() {
    let (app, _log) = test_app();

    app.handle_line("@Bob /vote yes please");

    assert_that!(
        &app.transcript.lines_for(BOB),
        eq(&vec![fail_line(&app, "Too many arguments! Usage: <choice>")])
    );
}

#[rstest]
fn unknown_and_hidden_commands_look_the_same_to_players() {
    let (app, _log) = test_app();

    app.handle_line("@Bob /nosuch");
    app.handle_line("@Bob /crash");

    assert_that!(
        &app.transcript.lines_for(BOB),
        eq(&vec![UNKNOWN_COMMAND.to_owned(), UNKNOWN_COMMAND.to_owned()])
    );
}

#[rstest]
fn crash_shows_detail_to_admins() {
    let (app, _log) = test_app();

    app.handle_line("@Admiral /crash");

    assert_that!(
        &app.transcript.lines_for(ADMIRAL),
        eq(&vec![
            "[scarlet]\u{274c} An error occurred while executing the command!".to_owned(),
            "handler panicked: crash requested by Admiral".to_owned(),
        ])
    );
}

#[rstest]
fn staff_commands_deny_players() {
    let (app, _log) = test_app();

    app.handle_line("@Bob /warn Admiral spam");

    assert_that!(
        &app.transcript.lines_for(BOB),
        eq(&vec![fail_line(
            &app,
            "You do not have the required permission (mod) to execute this command"
        )])
    );
    assert_that!(app.transcript.lines_for(ADMIRAL).is_empty(), eq(true));
}

#[rstest]
fn moderators_cannot_kick_admins() {
    let (app, _log) = test_app();

    app.handle_line("@Carol /kick Admiral");

    assert_that!(app.roster.len(), eq(3));
    assert_that!(
        &app.transcript.lines_for(CAROL),
        eq(&vec![fail_line(
            &app,
            "You cannot kick a player of equal or higher rank."
        )])
    );
}

#[rstest]
fn help_lists_only_permitted_visible_commands() {
    let (app, _log) = test_app();

    app.handle_line("@Bob /help");

    let lines = app.transcript.lines_for(BOB);
    assert_that!(lines.len(), eq(6));
    assert_that!(lines[0].as_str(), eq("[orange]-- Commands (5) --"));
    assert_that!(lines[1].as_str(), eq("[sky]/help[white] [lightgray]- Lists the commands you can use"));
    assert_that!(
        lines[5].as_str(),
        eq("[sky]/vote[white] <choice> [lightgray]- Votes yes or no")
    );
}

#[rstest]
fn chat_is_broadcast_until_the_player_is_muted() {
    let (app, _log) = test_app();

    app.handle_line("@Bob hello");
    assert_that!(
        &app.transcript.lines_for(CAROL),
        eq(&vec!["[coral][[Bob[coral]]:[white] hello".to_owned()])
    );

    app.handle_line("@Carol /mute Bob");
    app.handle_line("@Bob hello again");

    assert_that!(
        app.transcript.lines_for(BOB).last().map(String::as_str),
        eq(Some(
            fail_line(
                &app,
                "You do not have the required permission (chat) to execute this command"
            )
            .as_str()
        ))
    );
    assert_that!(app.transcript.lines_for(CAROL).len(), eq(2));
}

#[rstest]
fn membership_unlocks_perks() {
    let (app, _log) = test_app();

    app.handle_line("@Bob /perks");
    app.handle_line("membership Bob yes");
    app.handle_line("@Bob /perks");

    let lines = app.transcript.lines_for(BOB);
    assert_that!(
        lines[0].as_str(),
        eq(fail_line(
            &app,
            "You must have a [scarlet]Membership[yellow] to use this command."
        )
        .as_str())
    );
    assert_that!(lines[1].starts_with("[pink]Membership perks"), eq(true));
}

#[rstest]
fn restricted_players_cannot_vote() {
    let (app, _log) = test_app();

    app.handle_line("@Carol /restrict Bob yes");
    app.handle_line("@Bob /vote yes");
    app.handle_line("@Carol /vote no");

    assert_that!(
        app.transcript.lines_for(BOB).last().map(String::as_str),
        eq(Some(
            fail_line(
                &app,
                "You do not have the required permission (player) to execute this command"
            )
            .as_str()
        ))
    );
    assert_that!(
        app.transcript.lines_for(CAROL).last().map(String::as_str),
        eq(Some(success_line(&app, "You voted no. Tally: 0 yes, 1 no.").as_str()))
    );
}

#[rstest]
fn console_join_takes_the_rest_of_the_line() {
    let (app, log) = test_app();

    app.handle_line("join Dave the Brave");

    assert_that!(
        &app.roster.get(4).map(|dave| dave.name),
        eq(&Some("Dave the Brave".to_owned()))
    );
    assert_that!(
        &log.at(LogLevel::Info),
        eq(&vec!["Dave the Brave joined as #4.".to_owned()])
    );
}

#[rstest]
fn console_exec_runs_nested_lines() {
    let (app, log) = test_app();

    app.handle_line("exec setrank Bob trusted");
    app.handle_line("exec nosuch");

    assert_that!(app.roster.get(BOB).map(|bob| bob.rank), eq(Some(Rank::Trusted)));
    assert_that!(
        &log.at(LogLevel::Warn),
        eq(&vec!["command substrate error: unknown command nosuch".to_owned()])
    );
}

#[rstest]
fn console_validation_and_failures_are_logged() {
    let (app, log) = test_app();

    app.handle_line("leave");
    app.handle_line("setrank Bob boss");
    app.handle_line("teleport Bob");
    app.handle_line("status now");

    assert_that!(
        &log.at(LogLevel::Error),
        eq(&vec![
            "Missing required argument \"target\".".to_owned(),
            "Unknown command teleport. Type 'help' for a list of commands.".to_owned(),
            "Too many arguments! Usage: ".to_owned(),
        ])
    );
    assert_that!(
        &log.at(LogLevel::Warn),
        eq(&vec![
            "Unknown rank \"boss\". Expected one of: player, trusted, mod, admin, manager"
                .to_owned()
        ])
    );
}

#[rstest]
fn operator_mistakes_are_logged() {
    let (app, log) = test_app();

    app.handle_line("@Zed hello");
    app.handle_line("!choose Bob zero");

    assert_that!(
        &log.at(LogLevel::Error),
        eq(&vec![
            "No connected player matches \"Zed\".".to_owned(),
            "Invalid option number \"zero\"".to_owned(),
        ])
    );
}

#[rstest]
fn status_reports_counts() {
    let (app, log) = test_app();

    app.handle_line("@Admiral /kick");
    app.handle_line("@Bob /vote yes");
    app.handle_line("status");

    assert_that!(
        &log.at(LogLevel::Info),
        eq(&vec!["3 players online, 1 open menus, 1 votes cast".to_owned()])
    );
}
