//! Test IRC client.
//!
//! Provides an IRC client for integration testing that can send commands
//! and assert on received responses.

use std::time::Duration;

use tinyirc_proto::Message;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::time::timeout;

/// A test IRC client.
pub struct TestClient {
    reader: BufReader<OwnedReadHalf>,
    writer: BufWriter<OwnedWriteHalf>,
    nick: String,
}

impl TestClient {
    /// Connect to a test server.
    pub async fn connect(address: &str, nick: &str) -> anyhow::Result<Self> {
        let stream = TcpStream::connect(address).await?;
        let (read_half, write_half) = stream.into_split();

        Ok(Self {
            reader: BufReader::new(read_half),
            writer: BufWriter::new(write_half),
            nick: nick.to_string(),
        })
    }

    /// Send a raw IRC line; CRLF is appended when missing.
    pub async fn send_raw(&mut self, line: &str) -> anyhow::Result<()> {
        self.writer.write_all(line.as_bytes()).await?;
        if !line.ends_with("\r\n") {
            self.writer.write_all(b"\r\n").await?;
        }
        self.writer.flush().await?;
        Ok(())
    }

    /// Receive a single message from the server.
    pub async fn recv(&mut self) -> anyhow::Result<Message> {
        self.recv_timeout(Duration::from_secs(5)).await
    }

    /// Receive a message with a timeout. EOF is an error.
    pub async fn recv_timeout(&mut self, dur: Duration) -> anyhow::Result<Message> {
        let mut line = String::new();
        let read = timeout(dur, self.reader.read_line(&mut line)).await??;
        if read == 0 {
            anyhow::bail!("connection closed");
        }
        Message::parse(line.trim_end_matches(['\r', '\n']))
            .map_err(|e| anyhow::anyhow!("Parse error: {}", e))
    }

    /// Receive messages until the given predicate returns true.
    pub async fn recv_until<F>(&mut self, mut predicate: F) -> anyhow::Result<Vec<Message>>
    where
        F: FnMut(&Message) -> bool,
    {
        let mut messages = Vec::new();
        loop {
            let msg = self.recv().await?;
            let done = predicate(&msg);
            messages.push(msg);
            if done {
                break;
            }
        }
        Ok(messages)
    }

    /// Receive until a numeric with `code` arrives.
    pub async fn recv_numeric(&mut self, code: &str) -> anyhow::Result<Vec<Message>> {
        self.recv_until(|msg| msg.command == code).await
    }

    /// Discard whatever arrives within a short window.
    pub async fn drain(&mut self) {
        while self
            .recv_timeout(Duration::from_millis(100))
            .await
            .is_ok()
        {}
    }

    /// True once the server has closed the connection.
    pub async fn is_closed(&mut self) -> bool {
        let mut line = String::new();
        matches!(
            timeout(Duration::from_secs(5), self.reader.read_line(&mut line)).await,
            Ok(Ok(0)) | Ok(Err(_))
        )
    }

    /// Register with the server (NICK + USER) and wait for the end of MOTD.
    pub async fn register(&mut self) -> anyhow::Result<Vec<Message>> {
        let nick = self.nick.clone();
        self.send_raw(&format!("NICK {nick}")).await?;
        self.send_raw(&format!("USER {nick} 0 * :Test User {nick}"))
            .await?;

        let messages = self.recv_numeric("376").await?;
        if messages.iter().any(|msg| msg.command == "001") {
            Ok(messages)
        } else {
            anyhow::bail!("Registration failed: no RPL_WELCOME received")
        }
    }

    /// Join a channel.
    #[allow(dead_code)]
    pub async fn join(&mut self, channel: &str) -> anyhow::Result<()> {
        self.send_raw(&format!("JOIN {channel}")).await
    }
}
