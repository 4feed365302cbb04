use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::MoveSourceError;

use super::remote::ModelEndpoint;
use super::source::{AbortHandle, MoveRequest};

/// How to launch a model server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
}

/// One reply line from the model server.
#[derive(Debug, Deserialize)]
struct MoveReply {
    column: Option<i64>,
}

struct Pipes {
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}

/// The running child, shared with abort handles so it can be killed while a
/// request is blocked reading its output.
type ChildSlot = Arc<Mutex<Option<Child>>>;

fn kill(slot: &ChildSlot) {
    let mut guard = match slot.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    if let Some(mut child) = guard.take() {
        let _ = child.kill();
        let _ = child.wait();
    }
}

/// A model server running as a child process.
///
/// The process is started on the first request and kept for later ones.
/// Each request is one JSON [`MoveRequest`] per line on its stdin; it answers
/// with one `{"column": <int or null>}` line on its stdout.
pub struct ProcessEndpoint {
    config: EndpointConfig,
    child: ChildSlot,
    pipes: Option<Pipes>,
}

impl ProcessEndpoint {
    pub fn new(config: EndpointConfig) -> Self {
        ProcessEndpoint {
            config,
            child: Arc::new(Mutex::new(None)),
            pipes: None,
        }
    }

    /// Process id of the running server, if one is running.
    pub fn pid(&self) -> Option<u32> {
        let guard = self.child.lock().ok()?;
        guard.as_ref().map(Child::id)
    }

    fn spawn(&mut self) -> Result<(), MoveSourceError> {
        info!(command = %self.config.command, "starting model server");
        let mut child = Command::new(&self.config.command)
            .args(&self.config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                MoveSourceError::Unavailable(format!("cannot start '{}': {e}", self.config.command))
            })?;

        let stdin = child.stdin.take();
        let stdout = child.stdout.take();
        let mut slot = self
            .child
            .lock()
            .map_err(|_| MoveSourceError::Unavailable("model server state poisoned".into()))?;
        *slot = Some(child);
        drop(slot);

        let (Some(stdin), Some(stdout)) = (stdin, stdout) else {
            self.shutdown();
            return Err(MoveSourceError::Unavailable(
                "model server has no stdio pipes".into(),
            ));
        };
        self.pipes = Some(Pipes {
            stdin,
            stdout: BufReader::new(stdout),
        });
        Ok(())
    }

    fn exchange(pipes: &mut Pipes, request: &MoveRequest) -> Result<String, MoveSourceError> {
        let mut line = serde_json::to_string(request)
            .map_err(|e| MoveSourceError::MalformedReply(e.to_string()))?;
        line.push('\n');
        pipes.stdin.write_all(line.as_bytes())?;
        pipes.stdin.flush()?;

        let mut reply = String::new();
        if pipes.stdout.read_line(&mut reply)? == 0 {
            return Err(MoveSourceError::Unavailable(
                "model server closed its output".into(),
            ));
        }
        Ok(reply)
    }

    fn shutdown(&mut self) {
        self.pipes = None;
        kill(&self.child);
    }
}

impl ModelEndpoint for ProcessEndpoint {
    fn request_move(&mut self, request: &MoveRequest) -> Result<Option<i64>, MoveSourceError> {
        if self.pipes.is_none() {
            self.spawn()?;
        }
        let pipes = self
            .pipes
            .as_mut()
            .ok_or_else(|| MoveSourceError::Unavailable("model server not running".into()))?;

        let reply = match Self::exchange(pipes, request) {
            Ok(reply) => reply,
            Err(err) => {
                // Next request starts a fresh process
                warn!(command = %self.config.command, error = %err, "model server failed");
                self.shutdown();
                return Err(err);
            }
        };

        let parsed: MoveReply = serde_json::from_str(reply.trim())
            .map_err(|e| MoveSourceError::MalformedReply(format!("{e}: {}", reply.trim())))?;
        Ok(parsed.column)
    }

    fn abort_handle(&self) -> Option<AbortHandle> {
        let child = Arc::clone(&self.child);
        Some(AbortHandle::new(move || kill(&child)))
    }
}

impl Drop for ProcessEndpoint {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// One model server shared by every game of a tier, so the model is loaded
/// once rather than per game.
#[derive(Clone)]
pub struct SharedEndpoint {
    inner: Arc<Mutex<ProcessEndpoint>>,
    abort: Option<AbortHandle>,
}

impl SharedEndpoint {
    pub fn new(endpoint: ProcessEndpoint) -> Self {
        let abort = endpoint.abort_handle();
        SharedEndpoint {
            inner: Arc::new(Mutex::new(endpoint)),
            abort,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, ProcessEndpoint>, MoveSourceError> {
        self.inner
            .lock()
            .map_err(|_| MoveSourceError::Unavailable("model server state poisoned".into()))
    }

    pub fn pid(&self) -> Option<u32> {
        self.lock().ok()?.pid()
    }
}

impl ModelEndpoint for SharedEndpoint {
    fn request_move(&mut self, request: &MoveRequest) -> Result<Option<i64>, MoveSourceError> {
        self.lock()?.request_move(request)
    }

    fn abort_handle(&self) -> Option<AbortHandle> {
        self.abort.clone()
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::game::Board;

    fn shell(script: &str) -> ProcessEndpoint {
        ProcessEndpoint::new(EndpointConfig {
            command: "sh".into(),
            args: vec!["-c".into(), script.into()],
        })
    }

    fn request() -> MoveRequest {
        MoveRequest::new(&Board::new(), Some(3))
    }

    #[test]
    fn test_reads_column_per_request() {
        let mut endpoint = shell(r#"while read line; do echo '{"column": 2}'; done"#);
        assert_eq!(endpoint.request_move(&request()).unwrap(), Some(2));
        assert_eq!(endpoint.request_move(&request()).unwrap(), Some(2));
    }

    #[test]
    fn test_null_column_is_no_move() {
        let mut endpoint = shell(r#"while read line; do echo '{"column": null}'; done"#);
        assert_eq!(endpoint.request_move(&request()).unwrap(), None);
    }

    #[test]
    fn test_garbage_reply_is_malformed() {
        let mut endpoint = shell("while read line; do echo 'thinking...'; done");
        assert!(matches!(
            endpoint.request_move(&request()),
            Err(MoveSourceError::MalformedReply(_))
        ));
    }

    #[test]
    fn test_exited_server_is_unavailable() {
        let mut endpoint = shell("exit 0");
        assert!(endpoint.request_move(&request()).is_err());
    }

    #[test]
    fn test_abort_kills_blocked_server() {
        let mut endpoint = shell("exec sleep 30");
        let abort = endpoint.abort_handle().unwrap();

        let worker = std::thread::spawn(move || {
            let reply = endpoint.request_move(&request());
            (reply, endpoint)
        });
        std::thread::sleep(std::time::Duration::from_millis(200));
        abort.abort();

        let (reply, endpoint) = worker.join().unwrap();
        assert!(reply.is_err());
        assert_eq!(endpoint.pid(), None);
    }

    #[test]
    fn test_restarts_after_abort() {
        let mut endpoint = shell(r#"while read line; do echo '{"column": 4}'; done"#);
        assert_eq!(endpoint.request_move(&request()).unwrap(), Some(4));
        let first = endpoint.pid().unwrap();

        endpoint.abort_handle().unwrap().abort();
        // The stale pipes fail once, then a fresh server answers
        let _ = endpoint.request_move(&request());
        assert_eq!(endpoint.request_move(&request()).unwrap(), Some(4));
        assert_ne!(endpoint.pid(), Some(first));
    }

    #[test]
    fn test_shared_endpoint_keeps_one_server() {
        let shared = SharedEndpoint::new(shell(
            r#"while read line; do echo '{"column": 1}'; done"#,
        ));
        let mut a = shared.clone();
        let mut b = shared.clone();
        assert_eq!(a.request_move(&request()).unwrap(), Some(1));
        let pid = shared.pid();
        assert!(pid.is_some());
        assert_eq!(b.request_move(&request()).unwrap(), Some(1));
        assert_eq!(shared.pid(), pid);
    }

    #[test]
    fn test_missing_command_is_unavailable() {
        let mut endpoint = ProcessEndpoint::new(EndpointConfig {
            command: "/nonexistent/model-server".into(),
            args: Vec::new(),
        });
        assert!(matches!(
            endpoint.request_move(&request()),
            Err(MoveSourceError::Unavailable(_))
        ));
    }
}
