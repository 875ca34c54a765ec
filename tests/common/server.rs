//! Test server management.
//!
//! Spawns and manages tinyircd instances for integration testing.

use std::process::{Child, Command};
use std::time::Duration;

use tempfile::TempDir;
use tokio::time::sleep;

/// A test server instance.
pub struct TestServer {
    child: Child,
    port: u16,
    _data_dir: TempDir,
}

impl TestServer {
    /// Spawn a test server with the default test configuration.
    pub async fn spawn(port: u16) -> anyhow::Result<Self> {
        Self::spawn_with(port, "").await
    }

    /// Spawn a test server, appending `extra` TOML to the configuration.
    pub async fn spawn_with(port: u16, extra: &str) -> anyhow::Result<Self> {
        Self::spawn_with_timeouts(port, 30, 30, extra).await
    }

    /// Spawn a test server with explicit idle timeouts in seconds.
    pub async fn spawn_with_timeouts(
        port: u16,
        ping: u64,
        timeout: u64,
        extra: &str,
    ) -> anyhow::Result<Self> {
        let data_dir = tempfile::tempdir()?;
        let config_path = data_dir.path().join("config.toml");
        let config_content = format!(
            r#"
[server]
name = "test.server"
network = "TestNet"
sid = "00T"
resolve_hostnames = false
metrics_port = 0

[server.idle_timeouts]
ping = {ping}
timeout = {timeout}

[listen]
address = "127.0.0.1:{port}"

[motd]
lines = ["Test Server"]

{extra}
"#
        );
        std::fs::write(&config_path, config_content)?;

        let child = Command::new(env!("CARGO_BIN_EXE_tinyircd"))
            .arg(&config_path)
            .env("RUST_LOG", "warn")
            .spawn()?;

        let server = Self {
            child,
            port,
            _data_dir: data_dir,
        };
        server.wait_until_ready().await?;
        Ok(server)
    }

    /// Wait until the server is accepting connections.
    async fn wait_until_ready(&self) -> anyhow::Result<()> {
        for _ in 0..50 {
            if tokio::net::TcpStream::connect(("127.0.0.1", self.port))
                .await
                .is_ok()
            {
                return Ok(());
            }
            sleep(Duration::from_millis(100)).await;
        }
        anyhow::bail!("Server failed to start within 5 seconds")
    }

    /// Get the server address.
    pub fn address(&self) -> String {
        format!("127.0.0.1:{}", self.port)
    }

    /// Create a new test client connected to this server.
    pub async fn connect(&self, nick: &str) -> anyhow::Result<super::client::TestClient> {
        super::client::TestClient::connect(&self.address(), nick).await
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
