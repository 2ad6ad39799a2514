//! Shared test fixtures.

use std::time::Duration;

use kokuban_server::{ServerConfig, run};

/// A server instance running on a dedicated port for one test.
pub struct TestServer {
    port: u16,
}

impl TestServer {
    /// Spawn the server on the given port and wait until it accepts
    /// TCP connections.
    pub async fn start(port: u16) -> Self {
        tokio::spawn(run(ServerConfig {
            host: "127.0.0.1".to_string(),
            port,
        }));
        let server = Self { port };
        server.wait_ready().await;
        server
    }

    pub fn base_url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    #[allow(dead_code)] // not every test binary opens a websocket
    pub fn ws_url(&self) -> String {
        format!("ws://127.0.0.1:{}/ws", self.port)
    }

    async fn wait_ready(&self) {
        for _ in 0..100 {
            if tokio::net::TcpStream::connect(("127.0.0.1", self.port))
                .await
                .is_ok()
            {
                return;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("server did not start on port {}", self.port);
    }
}
