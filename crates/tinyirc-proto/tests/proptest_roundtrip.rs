//! Property-based tests for the message grammar.
//!
//! Any message whose middle parameters are non-empty, space-free and not
//! colon-led, optionally followed by one free-form trailing parameter,
//! must survive `parse(to_line(m))` unchanged.

use proptest::prelude::*;
use tinyirc_proto::{Message, MessageParseError, Prefix, SerializeError};

fn nickname_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z\\[\\]\\\\^_`{|}][a-zA-Z0-9\\-\\[\\]\\\\^_`{|}]{0,8}")
        .expect("valid regex")
}

fn username_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("~?[a-zA-Z][a-zA-Z0-9]{0,9}").expect("valid regex")
}

fn hostname_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("([a-z0-9]{1,8}\\.){0,3}[a-z][a-z0-9]{0,8}").expect("valid regex")
}

fn prefix_strategy() -> impl Strategy<Value = Option<Prefix>> {
    prop_oneof![
        Just(None),
        (nickname_strategy(), username_strategy(), hostname_strategy())
            .prop_map(|(n, u, h)| Some(Prefix::new(n, u, h))),
        hostname_strategy()
            .prop_map(|h| Some(Prefix::ServerName(format!("irc.{}", h)))),
    ]
}

fn command_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        prop::string::string_regex("[A-Za-z]{1,12}").expect("valid regex"),
        prop::string::string_regex("[0-9]{3}").expect("valid regex"),
    ]
}

/// Middle parameter: no leading colon, no space, NUL, CR or LF.
fn middle_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[^ :\0\r\n][^ \0\r\n]{0,20}").expect("valid regex")
}

/// Trailing parameter: anything but NUL, CR and LF, including empty.
fn trailing_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just(" ".to_string()),
        Just(":".to_string()),
        Just(": leading colon".to_string()),
        Just("multiple   spaces   here".to_string()),
        prop::string::string_regex("[^\0\r\n]{0,80}").expect("valid regex"),
    ]
}

fn message_strategy() -> impl Strategy<Value = Message> {
    (
        prefix_strategy(),
        command_strategy(),
        prop::collection::vec(middle_strategy(), 0..10),
        prop::option::of(trailing_strategy()),
    )
        .prop_map(|(prefix, command, mut params, trailing)| {
            params.extend(trailing);
            Message {
                prefix,
                command,
                params,
            }
        })
}

proptest! {
    #[test]
    fn roundtrip_preserves_message(msg in message_strategy()) {
        let line = msg.to_line().expect("well-formed message serializes");
        let parsed = Message::parse(&line).expect("serialized line parses");
        prop_assert_eq!(parsed, msg);
    }

    #[test]
    fn parse_never_panics(line in "[^\r\n]{0,120}") {
        let _ = Message::parse(&line);
    }

    #[test]
    fn spaced_param_before_last_is_refused(
        command in command_strategy(),
        bad in "[a-z]{1,5} [a-z]{1,5}",
        last in middle_strategy(),
    ) {
        let msg = Message::new(command, vec![bad, last]);
        let is_trailing_not_last = matches!(
            msg.to_line(),
            Err(SerializeError::TrailingNotLast { index: 0, .. })
        );
        prop_assert!(is_trailing_not_last);
    }
}

#[test]
fn empty_line_is_not_a_message() {
    assert_eq!(Message::parse(""), Err(MessageParseError::EmptyMessage));
}
