//! Built-in plugin behaviour against a populated directory
//! Run with: cargo test --test builtin_plugins_test

mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use common::*;
use parley_bot::application::messaging::{DispatchOutcome, Dispatcher};
use parley_bot::plugins::builtin::BUILTIN_PLUGINS;
use parley_bot::plugins::PluginManager;

fn loaded(api: Arc<FakeApi>) -> Dispatcher {
    let paths = BUILTIN_PLUGINS.iter().map(|p| p.to_string()).collect();
    let mut d = dispatcher(api, PluginManager::with_builtins()).with_plugin_paths(paths);
    assert_eq!(d.load_plugins().len(), BUILTIN_PLUGINS.len());
    d
}

#[test]
fn test_whoami_mentions_room_sender() {
    ensure_init();
    let mut d = loaded(Arc::new(FakeApi::default()));
    let outcome = d.dispatch(room_message("Alice Smith", "@ParleyBot whoami"));
    assert_eq!(
        outcome.reply(),
        Some("@alice you are Alice Smith (1_42@chat.example.com)")
    );
}

#[test]
fn test_whoami_in_direct_chat_has_no_mention() {
    ensure_init();
    let mut d = loaded(Arc::new(FakeApi::default()));
    assert_eq!(
        d.dispatch(direct_message(43, "whoami")).reply(),
        Some("you are Bob Jones (1_43@chat.example.com)")
    );
}

#[test]
fn test_whois_and_rooms() {
    ensure_init();
    let mut d = loaded(Arc::new(FakeApi::default()));
    assert_eq!(
        d.dispatch(direct_message(42, "whois Bob Jones")).reply(),
        Some("Bob Jones is @BobJones (1_43@chat.example.com)")
    );
    assert_eq!(d.dispatch(direct_message(42, "whois Nobody")).reply(), Some("No user named Nobody"));
    assert_eq!(d.dispatch(direct_message(42, "rooms")).reply(), Some("Lobby"));
}

#[test]
fn test_refresh_triggers_one_rebuild() {
    ensure_init();
    let api = Arc::new(FakeApi::default());
    let mut d = loaded(api.clone());

    d.dispatch(direct_message(42, "whoami"));
    d.dispatch(direct_message(42, "whoami"));
    assert_eq!(api.user_calls.load(Ordering::SeqCst), 1);

    assert_eq!(d.dispatch(direct_message(42, "refresh")).reply(), Some("Directory refreshed"));
    d.dispatch(direct_message(42, "whoami"));
    d.dispatch(direct_message(42, "whoami"));
    assert_eq!(api.user_calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_ping_is_global_and_aliased() {
    ensure_init();
    let mut d = loaded(Arc::new(FakeApi::default()));
    assert_eq!(d.dispatch(room_message("Bob Jones", "ping")).reply(), Some("pong"));
    assert_eq!(d.dispatch(room_message("Bob Jones", "!ping")).reply(), Some("pong"));
    // echo is not global
    assert_eq!(d.dispatch(room_message("Bob Jones", "echo hi")), DispatchOutcome::Unhandled);
    assert_eq!(
        d.dispatch(room_message("Bob Jones", "@ParleyBot echo hi there")).reply(),
        Some("@BobJones hi there")
    );
}

#[test]
fn test_greeting_replies_with_mention() {
    ensure_init();
    let mut d = loaded(Arc::new(FakeApi::default()));
    assert_eq!(
        d.dispatch(room_message("Bob Jones", "Hi everyone")).reply(),
        Some("@BobJones hello!")
    );
}

#[test]
fn test_shipped_posts_status_and_stays_unhandled() {
    ensure_init();
    let api = Arc::new(FakeApi::default());
    let mut d = loaded(api.clone());

    let outcome = d.dispatch(room_message("Alice Smith", "we shipped the release"));
    assert_eq!(outcome, DispatchOutcome::Unhandled);

    let posted = api.posted();
    assert_eq!(posted.len(), 1);
    assert_eq!(posted[0].room_id, "7");
    assert_eq!(posted[0].from, NICKNAME);
    assert_eq!(posted[0].color, "green");
    assert_eq!(posted[0].message_format, "html");
    assert_eq!(posted[0].message, "<b>Alice Smith</b> shipped something");
}

#[test]
fn test_own_echo_does_not_trigger_content() {
    ensure_init();
    let api = Arc::new(FakeApi::default());
    let mut d = loaded(api.clone());
    assert_eq!(d.dispatch(room_message(NICKNAME, "hello everyone, I shipped it")), DispatchOutcome::Unhandled);
    assert!(api.posted().is_empty());
}

#[test]
fn test_help_lists_builtin_commands() {
    ensure_init();
    let mut d = loaded(Arc::new(FakeApi::default()));
    let help = d.dispatch(direct_message(42, "help"));
    let text = help.reply().unwrap();
    assert!(text.starts_with("Available commands:"));
    assert!(text.contains("\nping - Check the bot is alive"));
    assert!(text.contains("\nwhois - Look up a user by display name"));
    assert!(!text.contains("refresh"));
}

#[test]
fn test_reload_keeps_commands_working() {
    ensure_init();
    let mut d = loaded(Arc::new(FakeApi::default()));
    let before = d.registry().len();
    assert_eq!(
        d.dispatch(direct_message(42, "load_plugins")).reply(),
        Some("Reloading plugin modules and classes..")
    );
    assert_eq!(d.registry().len(), before);
    assert_eq!(d.dispatch(direct_message(42, "ping")).reply(), Some("pong"));
}
