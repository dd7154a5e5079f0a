//! JSON-lines transport to a helper process.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::io::{self, BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("failed to spawn '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },
    #[error("helper i/o error: {0}")]
    Io(#[from] io::Error),
    #[error("helper closed its output")]
    Closed,
    #[error("helper did not answer within {0} ms")]
    Timeout(u64),
    #[error("malformed helper message: {0}")]
    Json(#[from] serde_json::Error),
}

/// How to launch a helper process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessConfig {
    /// Executable to run
    pub command: String,
    /// Arguments passed to the executable
    #[serde(default)]
    pub args: Vec<String>,
    /// Per-request reply deadline (None = wait forever)
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

impl ProcessConfig {
    pub fn new(command: &str, args: &[&str]) -> Self {
        Self {
            command: command.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
            timeout_ms: None,
        }
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }
}

struct Running {
    child: Child,
    stdin: ChildStdin,
    replies: Receiver<io::Result<String>>,
}

/// A helper process answering one JSON line per JSON request line.
///
/// The process is spawned lazily on the first request. If it times out or
/// dies, it is killed and a fresh one is spawned on the next request, so a
/// late reply can never be mistaken for the answer to a newer request.
pub struct JsonLineProcess {
    config: ProcessConfig,
    running: Option<Running>,
}

impl JsonLineProcess {
    pub fn new(config: ProcessConfig) -> Self {
        Self {
            config,
            running: None,
        }
    }

    /// Spawn the helper now instead of on first use.
    pub fn start(&mut self) -> Result<(), BridgeError> {
        self.ensure_running().map(|_| ())
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Send one request and wait for its reply.
    pub fn request<Req, Resp>(&mut self, request: &Req) -> Result<Resp, BridgeError>
    where
        Req: Serialize,
        Resp: DeserializeOwned,
    {
        let line = serde_json::to_string(request)?;
        let timeout_ms = self.config.timeout_ms;
        let running = self.ensure_running()?;

        let sent = writeln!(running.stdin, "{line}").and_then(|_| running.stdin.flush());
        if let Err(e) = sent {
            self.shutdown();
            return Err(e.into());
        }

        let reply = match timeout_ms {
            Some(ms) => match running.replies.recv_timeout(Duration::from_millis(ms)) {
                Ok(reply) => reply,
                Err(RecvTimeoutError::Timeout) => {
                    warn!(command = %self.config.command, ms, "Helper timed out, restarting");
                    self.shutdown();
                    return Err(BridgeError::Timeout(ms));
                }
                Err(RecvTimeoutError::Disconnected) => {
                    self.shutdown();
                    return Err(BridgeError::Closed);
                }
            },
            None => match running.replies.recv() {
                Ok(reply) => reply,
                Err(_) => {
                    self.shutdown();
                    return Err(BridgeError::Closed);
                }
            },
        };

        let reply = match reply {
            Ok(reply) => reply,
            Err(e) => {
                self.shutdown();
                return Err(e.into());
            }
        };
        debug!(
            command = %self.config.command,
            request = %line,
            reply = %reply,
            "Helper round-trip"
        );
        Ok(serde_json::from_str(&reply)?)
    }

    /// Kill the helper. The next request spawns a new one.
    pub fn shutdown(&mut self) {
        if let Some(mut running) = self.running.take() {
            if let Err(e) = running.child.kill() {
                debug!(error = %e, "Helper already exited");
            }
            let _ = running.child.wait();
        }
    }

    fn ensure_running(&mut self) -> Result<&mut Running, BridgeError> {
        if self.running.is_none() {
            self.running = Some(self.spawn()?);
        }
        self.running.as_mut().ok_or(BridgeError::Closed)
    }

    fn spawn(&self) -> Result<Running, BridgeError> {
        let spawn_error = |source| BridgeError::Spawn {
            command: self.config.command.clone(),
            source,
        };
        let mut child = Command::new(&self.config.command)
            .args(&self.config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(spawn_error)?;

        let missing = |what: &str| spawn_error(io::Error::other(format!("no {what} pipe")));
        let stdin = child.stdin.take().ok_or_else(|| missing("stdin"))?;
        let stdout = child.stdout.take().ok_or_else(|| missing("stdout"))?;

        // Replies are read on a separate thread so requests can time out.
        let (tx, replies) = mpsc::channel();
        thread::spawn(move || {
            for line in BufReader::new(stdout).lines() {
                let stop = line.is_err();
                if tx.send(line).is_err() || stop {
                    break;
                }
            }
        });

        info!(
            command = %self.config.command,
            args = ?self.config.args,
            pid = child.id(),
            "Helper started"
        );
        Ok(Running {
            child,
            stdin,
            replies,
        })
    }
}

impl Drop for JsonLineProcess {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
#[path = "process_tests.rs"]
mod process_tests;
