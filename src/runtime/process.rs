//! JVM-hosted engine
//!
//! The checker runs in one long-lived JVM child process. Requests and
//! responses are newline-delimited JSON on its stdin/stdout; stderr is
//! forwarded to the log.

use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::config::EngineSettings;
use crate::error::{Result, ValidatorError};

use super::artifacts::EngineArtifacts;
use super::engine::{Engine, EngineFault, EngineLauncher, RawIssue};

/// How long the engine gets to exit after its stdin is closed
const SHUTDOWN_GRACE_PERIOD: Duration = Duration::from_secs(2);
const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(20);

#[derive(Serialize)]
struct Request<'a> {
    id: u64,
    method: &'static str,
    expression: &'a str,
}

#[derive(Deserialize)]
struct Response {
    id: u64,
    #[serde(default)]
    issues: Option<Vec<RawIssue>>,
    #[serde(default)]
    error: Option<ErrorBody>,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
    #[serde(default)]
    cause: Option<String>,
}

/// Engine living in a JVM child process
pub struct JvmEngine {
    child: Child,
    stdin: Option<BufWriter<ChildStdin>>,
    stdout: BufReader<ChildStdout>,
    stderr_drain: Option<JoinHandle<()>>,
    next_id: u64,
}

impl JvmEngine {
    /// Spawn `command` with piped stdio and take ownership of the pipes
    pub fn spawn(mut command: Command) -> io::Result<Self> {
        let mut child = command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        let pipes = (child.stdin.take(), child.stdout.take(), child.stderr.take());
        let (Some(stdin), Some(stdout), Some(stderr)) = pipes else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(io::Error::other("engine stdio pipes unavailable"));
        };

        let drain = thread::Builder::new()
            .name("engine-stderr".to_string())
            .spawn(move || {
                for line in BufReader::new(stderr).lines().map_while(|l| l.ok()) {
                    log::debug!(target: "engine", "{}", line);
                }
            });
        let stderr_drain = match drain {
            Ok(handle) => handle,
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(e);
            }
        };

        Ok(Self {
            child,
            stdin: Some(BufWriter::new(stdin)),
            stdout: BufReader::new(stdout),
            stderr_drain: Some(stderr_drain),
            next_id: 1,
        })
    }

    fn send(&mut self, request: &Request<'_>) -> std::result::Result<(), EngineFault> {
        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| EngineFault::Exited("engine stdin already closed".to_string()))?;
        serde_json::to_writer(&mut *stdin, request)
            .map_err(|e| EngineFault::Protocol(format!("cannot encode request: {e}")))?;
        stdin.write_all(b"\n")?;
        stdin.flush()?;
        Ok(())
    }

    /// Read until the reply to request `id`.
    ///
    /// Lines that are not JSON objects (logger banners, stray prints) and
    /// replies to earlier requests are skipped.
    fn receive(&mut self, id: u64) -> std::result::Result<Response, EngineFault> {
        let mut line = String::new();
        loop {
            line.clear();
            if self.stdout.read_line(&mut line)? == 0 {
                return Err(EngineFault::Exited(self.exit_description()));
            }
            let text = line.trim_end();
            let value = match serde_json::from_str::<serde_json::Value>(text) {
                Ok(value) if value.is_object() => value,
                _ => {
                    log::debug!(target: "engine", "Skipping stdout noise: {}", text);
                    continue;
                }
            };
            let response: Response = serde_json::from_value(value)
                .map_err(|e| EngineFault::Protocol(format!("{e}: {text}")))?;

            if response.id < id {
                log::debug!(target: "engine", "Skipping stale reply to request {}", response.id);
                continue;
            }
            if response.id != id {
                return Err(EngineFault::Protocol(format!(
                    "response id {} does not match request id {}",
                    response.id, id
                )));
            }
            return Ok(response);
        }
    }

    fn exit_description(&mut self) -> String {
        match self.child.try_wait() {
            Ok(Some(status)) => status.to_string(),
            Ok(None) => "stdout closed".to_string(),
            Err(e) => e.to_string(),
        }
    }

    fn wait_for_exit(&mut self, grace: Duration) -> io::Result<bool> {
        let deadline = Instant::now() + grace;
        loop {
            if self.child.try_wait()?.is_some() {
                return Ok(true);
            }
            if Instant::now() >= deadline {
                return Ok(false);
            }
            thread::sleep(EXIT_POLL_INTERVAL);
        }
    }
}

impl Engine for JvmEngine {
    fn check(&mut self, expression: &str) -> std::result::Result<Vec<RawIssue>, EngineFault> {
        let id = self.next_id;
        self.next_id += 1;

        self.send(&Request {
            id,
            method: "check",
            expression,
        })?;
        let response = self.receive(id)?;
        match (response.error, response.issues) {
            (Some(error), _) => Err(EngineFault::Reported {
                message: error.message,
                cause: error.cause,
            }),
            (None, Some(issues)) => Ok(issues),
            (None, None) => Err(EngineFault::Protocol(
                "response carries neither issues nor error".to_string(),
            )),
        }
    }

    fn shutdown(&mut self) -> std::result::Result<(), EngineFault> {
        // EOF on stdin asks the engine to exit
        drop(self.stdin.take());
        if !self.wait_for_exit(SHUTDOWN_GRACE_PERIOD)? {
            log::warn!("Engine did not exit within {:?}, killing it", SHUTDOWN_GRACE_PERIOD);
            self.child.kill()?;
            self.child.wait()?;
        }
        if let Some(drain) = self.stderr_drain.take() {
            let _ = drain.join();
        }
        Ok(())
    }
}

impl Drop for JvmEngine {
    fn drop(&mut self) {
        if let Ok(None) = self.child.try_wait() {
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}

/// Launches the checker on a JVM using the configured artifacts
#[derive(Debug, Clone)]
pub struct JvmLauncher {
    settings: EngineSettings,
}

impl JvmLauncher {
    pub fn new(settings: EngineSettings) -> Self {
        Self { settings }
    }

    /// Full JVM command line: options, classpath, entry point
    pub fn command(&self, artifacts: &EngineArtifacts) -> Result<Command> {
        let mut command = Command::new(self.settings.resolved_java());
        command
            .args(&self.settings.jvm_args)
            .arg("-cp")
            .arg(artifacts.classpath()?)
            .arg(self.settings.resolved_main_class());
        Ok(command)
    }
}

impl EngineLauncher for JvmLauncher {
    fn launch(&self) -> Result<Box<dyn Engine>> {
        let artifacts = EngineArtifacts::locate(&self.settings)?;
        let command = self.command(&artifacts)?;
        let java = self.settings.resolved_java();
        log::info!(
            "Launching engine {} with {}",
            self.settings.resolved_main_class(),
            java.display()
        );

        let engine = JvmEngine::spawn(command).map_err(|e| {
            let hint = if e.kind() == io::ErrorKind::NotFound {
                "install a Java runtime, set JAVA_HOME, or pass --java"
            } else {
                "check that the Java executable is runnable"
            };
            ValidatorError::configuration(java, format!("cannot start Java: {e}"), hint)
        })?;
        Ok(Box::new(engine))
    }
}
