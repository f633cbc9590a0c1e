use std::ffi::OsString;
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::payterms::tools::accounting::AccountingSystem;
use crate::payterms::tools::error::{Result, ToolError};
use crate::payterms::tools::model::UpsertOutcome;

/// Accounting system reached through an external bridge program.
///
/// The bridge owns the vendor binding. It is started on
/// [`connect`](AccountingSystem::connect) and talks newline-delimited JSON
/// over its stdin and stdout:
///
/// ```text
/// bridge -> {"status":"ready"}            (or {"status":"unavailable","reason":"..."})
/// tool   -> {"name":"Net 30","discount_days":30}
/// bridge -> {"outcome":"created"}         (or "updated", or "failed" with a "reason")
/// ```
///
/// Exactly one reply line is expected per request. Once a reply is missing or
/// malformed the session is out of sync: later records fail without being
/// sent, so no reply is ever credited to the wrong term.
///
/// The bridge must exit once its stdin closes. It is killed if it is still
/// running after the shutdown grace period.
///
/// The bridge's stderr is inherited so its diagnostics reach the user.
#[derive(Debug)]
pub struct CommandBridge {
    program: OsString,
    args: Vec<OsString>,
    shutdown_grace: Duration,
    session: Option<BridgeSession>,
}

/// How long the bridge may take to exit after its stdin closes.
pub const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(20);

#[derive(Debug)]
struct BridgeSession {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    /// Set once a reply could not be matched to its request.
    out_of_sync: bool,
}

#[derive(Debug, Serialize)]
struct UpsertRequest<'a> {
    name: &'a str,
    discount_days: u32,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum Handshake {
    Ready,
    Unavailable {
        #[serde(default)]
        reason: String,
    },
}

impl CommandBridge {
    pub fn new<I, A>(program: impl Into<OsString>, args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<OsString>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            shutdown_grace: DEFAULT_SHUTDOWN_GRACE,
            session: None,
        }
    }

    /// Overrides [`DEFAULT_SHUTDOWN_GRACE`].
    pub fn with_shutdown_grace(mut self, grace: Duration) -> Self {
        self.shutdown_grace = grace;
        self
    }

    fn program_label(&self) -> String {
        self.program.to_string_lossy().into_owned()
    }

    fn spawn(&self) -> Result<BridgeSession> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|error| {
                ToolError::Connection(format!(
                    "cannot start bridge '{}': {error}",
                    self.program_label()
                ))
            })?;

        let (Some(stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(ToolError::Connection("bridge pipes are unavailable".into()));
        };

        Ok(BridgeSession {
            child,
            stdin,
            stdout: BufReader::new(stdout),
            out_of_sync: false,
        })
    }
}

impl BridgeSession {
    fn read_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        if self.stdout.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    }

    fn handshake(&mut self) -> Result<()> {
        let line = self
            .read_line()?
            .ok_or_else(|| ToolError::Connection("bridge exited before the handshake".into()))?;
        let handshake: Handshake = serde_json::from_str(line.trim()).map_err(|error| {
            ToolError::Connection(format!("malformed bridge handshake: {error}"))
        })?;
        match handshake {
            Handshake::Ready => Ok(()),
            Handshake::Unavailable { reason } => Err(ToolError::Connection(reason)),
        }
    }

    fn exchange(&mut self, request: &UpsertRequest<'_>) -> UpsertOutcome {
        if self.out_of_sync {
            return UpsertOutcome::failed("bridge session out of sync");
        }

        match self.round_trip(request) {
            Ok(outcome) => outcome,
            Err(reason) => {
                warn!(name = request.name, %reason, "bridge session out of sync");
                self.out_of_sync = true;
                UpsertOutcome::failed(reason)
            }
        }
    }

    fn send(&mut self, request: &UpsertRequest<'_>) -> Result<()> {
        serde_json::to_writer(&mut self.stdin, request)?;
        self.stdin.write_all(b"\n")?;
        self.stdin.flush()?;
        Ok(())
    }

    fn round_trip(
        &mut self,
        request: &UpsertRequest<'_>,
    ) -> std::result::Result<UpsertOutcome, String> {
        self.send(request)
            .map_err(|error| format!("cannot send request to bridge: {error}"))?;

        let line = self
            .read_line()
            .map_err(|error| format!("cannot read bridge reply: {error}"))?
            .ok_or_else(|| "bridge closed the connection".to_string())?;
        serde_json::from_str(line.trim())
            .map_err(|error| format!("malformed bridge reply '{}': {error}", line.trim()))
    }

    fn shutdown(self, grace: Duration) -> Result<()> {
        let BridgeSession {
            mut child,
            stdin,
            stdout,
            ..
        } = self;
        drop(stdin);
        drop(stdout);

        let deadline = Instant::now() + grace;
        let status = loop {
            if let Some(status) = child.try_wait()? {
                break status;
            }
            if Instant::now() >= deadline {
                let _ = child.kill();
                let _ = child.wait();
                return Err(ToolError::Connection(format!(
                    "bridge still running {}ms after its input closed, killed",
                    grace.as_millis()
                )));
            }
            thread::sleep(EXIT_POLL_INTERVAL);
        };

        if status.success() {
            Ok(())
        } else {
            Err(ToolError::Connection(format!("bridge exited with {status}")))
        }
    }
}

impl AccountingSystem for CommandBridge {
    #[instrument(level = "debug", skip(self), fields(program = %self.program_label()))]
    fn connect(&mut self) -> Result<()> {
        if let Some(session) = self.session.take() {
            let _ = session.shutdown(self.shutdown_grace);
        }

        let mut session = self.spawn()?;
        if let Err(error) = session.handshake() {
            let _ = session.child.kill();
            let _ = session.shutdown(self.shutdown_grace);
            return Err(error);
        }

        debug!("bridge is ready");
        self.session = Some(session);
        Ok(())
    }

    fn upsert_payment_term(&mut self, name: &str, discount_days: u32) -> UpsertOutcome {
        let Some(session) = self.session.as_mut() else {
            return UpsertOutcome::failed("session is not open");
        };
        let request = UpsertRequest {
            name,
            discount_days,
        };
        session.exchange(&request)
    }

    fn disconnect(&mut self) -> Result<()> {
        match self.session.take() {
            Some(session) => session.shutdown(self.shutdown_grace),
            None => Ok(()),
        }
    }
}

impl Drop for CommandBridge {
    fn drop(&mut self) {
        if let Some(mut session) = self.session.take() {
            let _ = session.child.kill();
            let _ = session.child.wait();
        }
    }
}
