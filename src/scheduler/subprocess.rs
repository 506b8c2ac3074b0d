/*!
 * Subprocess Controller
 * Runs a scheduling policy as a child process over a JSON-lines pipe
 *
 * # Protocol
 *
 * Every message is one JSON object on one line of the child's stdin:
 *
 * ```text
 * {"type":"start","logical_cores":4,"ram_capacity":48,"disk_capacity":128,"core_labels":[...]}
 * {"type":"tick","events":[{"type":"PROC_NEW","pid":1}, ...]}
 * ```
 *
 * The child answers each `tick` with exactly one line holding a JSON array of
 * actions, possibly empty. `start` gets no answer. A child that has exited
 * reports `Closed` on every later call.
 */

use super::shadow::ShadowState;
use super::traits::Controller;
use super::types::{Action, StartupInfo};
use crate::core::errors::{ControllerError, ControllerResult};
use crate::monitoring::Event;
use serde::Serialize;
use std::io::{self, BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use tracing::{debug, info};

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Message<'a> {
    Start {
        #[serde(flatten)]
        info: &'a StartupInfo,
    },
    Tick {
        events: &'a [Event],
    },
}

pub struct SubprocessController {
    name: String,
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    line: String,
}

impl SubprocessController {
    /// Spawn `program` with `args`; its stderr is inherited
    pub fn spawn(program: &str, args: &[String]) -> ControllerResult<Self> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| ControllerError::Io("child stdin unavailable".into()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| ControllerError::Io("child stdout unavailable".into()))?;

        info!(program, pid = child.id(), "controller process started");
        Ok(Self {
            name: program.to_string(),
            child,
            stdin,
            stdout: BufReader::new(stdout),
            line: String::new(),
        })
    }

    fn send(&mut self, message: &Message<'_>) -> ControllerResult<()> {
        let mut line = serde_json::to_vec(message)?;
        line.push(b'\n');
        self.stdin
            .write_all(&line)
            .and_then(|()| self.stdin.flush())
            .map_err(|err| match err.kind() {
                io::ErrorKind::BrokenPipe => ControllerError::Closed,
                _ => err.into(),
            })
    }

    fn receive(&mut self) -> ControllerResult<Vec<Action>> {
        self.line.clear();
        if self.stdout.read_line(&mut self.line)? == 0 {
            return Err(ControllerError::Closed);
        }
        let actions: Vec<Action> = serde_json::from_str(self.line.trim_end())?;
        debug!(actions = actions.len(), "controller answered");
        Ok(actions)
    }
}

impl Controller for SubprocessController {
    fn name(&self) -> &str {
        &self.name
    }

    fn on_start(&mut self, info: &StartupInfo) -> ControllerResult<()> {
        self.send(&Message::Start { info })
    }

    fn schedule(&mut self, _state: &ShadowState, events: &[Event]) -> ControllerResult<Vec<Action>> {
        self.send(&Message::Tick { events })?;
        self.receive()
    }
}

impl Drop for SubprocessController {
    fn drop(&mut self) {
        // the child may already have exited
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
