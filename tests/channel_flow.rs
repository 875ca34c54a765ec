//! Integration tests for channel flows: JOIN, NAMES and PART.

mod common;

use common::TestServer;

const CHANNELS: &str = r##"
[[channel]]
name = "#locked"
key = "sesame"

[[channel]]
name = "#lobby"
topic = "Welcome to the lobby"
"##;

#[tokio::test]
async fn test_join_and_names() {
    let server = TestServer::spawn_with(16680, CHANNELS)
        .await
        .expect("Failed to spawn test server");

    let mut alice = server.connect("alice").await.unwrap();
    let mut bob = server.connect("bob").await.unwrap();
    alice.register().await.unwrap();
    bob.register().await.unwrap();

    alice.join("#test").await.unwrap();
    let joined = alice.recv_numeric("366").await.unwrap();
    let codes: Vec<&str> = joined.iter().map(|m| m.command.as_str()).collect();
    assert_eq!(codes, vec!["JOIN", "331", "353", "366"]);
    assert_eq!(joined[2].param(3), Some("alice"));

    bob.join("#TEST").await.unwrap();
    let joined = bob.recv_numeric("366").await.unwrap();
    assert_eq!(joined[0].command, "JOIN");
    assert_eq!(joined[2].param(3), Some("alice bob"));

    // Alice sees bob arrive.
    let seen = alice.recv().await.unwrap();
    assert_eq!(seen.command, "JOIN");
    assert_eq!(
        seen.prefix.map(|p| p.to_string()),
        Some("bob!~bob@127.0.0.1".to_string())
    );

    alice.send_raw("NAMES #test,#missing").await.unwrap();
    let names = alice.recv_numeric("366").await.unwrap();
    assert_eq!(names[0].param(3), Some("alice bob"));
    let end = alice.recv().await.unwrap();
    assert_eq!(end.command, "366");
    assert_eq!(end.param(1), Some("#missing"));
}

#[tokio::test]
async fn test_predeclared_channels() {
    let server = TestServer::spawn_with(16681, CHANNELS)
        .await
        .expect("Failed to spawn test server");
    let mut carol = server.connect("carol").await.unwrap();
    carol.register().await.unwrap();

    carol.join("#lobby").await.unwrap();
    let joined = carol.recv_numeric("366").await.unwrap();
    assert_eq!(joined[1].command, "332");
    assert_eq!(joined[1].param(2), Some("Welcome to the lobby"));

    carol.join("#locked").await.unwrap();
    let refused = carol.recv().await.unwrap();
    assert_eq!(refused.command, "475");
    assert_eq!(refused.param(1), Some("#locked"));

    carol.send_raw("JOIN #locked,#lobby sesame").await.unwrap();
    let joined = carol.recv_numeric("366").await.unwrap();
    assert_eq!(joined[0].command, "JOIN");
    assert_eq!(joined[0].param(0), Some("#locked"));
}

#[tokio::test]
async fn test_part_and_quit_are_seen_by_peers() {
    let server = TestServer::spawn(16682)
        .await
        .expect("Failed to spawn test server");

    let mut alice = server.connect("alice").await.unwrap();
    let mut bob = server.connect("bob").await.unwrap();
    alice.register().await.unwrap();
    bob.register().await.unwrap();

    alice.join("#a,#b,#c").await.unwrap();
    for _ in 0..3 {
        alice.recv_numeric("366").await.unwrap();
    }
    bob.join("#a,#b,#c").await.unwrap();
    for _ in 0..3 {
        bob.recv_numeric("366").await.unwrap();
    }
    alice.drain().await;

    bob.send_raw("PART #a").await.unwrap();
    let part = bob.recv().await.unwrap();
    assert_eq!(part.command, "PART");
    let seen = alice.recv().await.unwrap();
    assert_eq!(seen.command, "PART");
    assert_eq!(seen.param(0), Some("#a"));

    bob.send_raw("PART #a").await.unwrap();
    assert_eq!(bob.recv().await.unwrap().command, "442");

    bob.send_raw("QUIT :bye all").await.unwrap();
    let quit = alice.recv().await.unwrap();
    assert_eq!(quit.command, "QUIT");
    assert_eq!(quit.param(0), Some("bye all"));
    assert_eq!(quit.prefix.and_then(|p| p.nick().map(str::to_owned)).as_deref(), Some("bob"));

    // Two shared channels, one QUIT.
    assert!(alice
        .recv_timeout(std::time::Duration::from_millis(300))
        .await
        .is_err());
}

#[tokio::test]
async fn test_bad_channel_names() {
    let server = TestServer::spawn(16683)
        .await
        .expect("Failed to spawn test server");
    let mut dave = server.connect("dave").await.unwrap();
    dave.register().await.unwrap();

    dave.send_raw("JOIN nohash").await.unwrap();
    let reply = dave.recv().await.unwrap();
    assert_eq!(reply.command, "403");
    assert_eq!(reply.param(1), Some("nohash"));

    dave.send_raw("JOIN").await.unwrap();
    assert_eq!(dave.recv().await.unwrap().command, "461");
}
