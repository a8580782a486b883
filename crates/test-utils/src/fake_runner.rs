use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use autodeploy::commands::CommandLine;
use autodeploy::exec::{CommandResult, ProcessRunner};
use autodeploy::types::OutputMode;

/// One recorded invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub cmd: CommandLine,
    pub mode: OutputMode,
}

/// Shared, cloneable view of the calls a [`FakeRunner`] received.
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    calls: Arc<Mutex<Vec<Call>>>,
}

impl CallLog {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Rendered command lines, in call order.
    pub fn commands(&self) -> Vec<String> {
        self.calls().iter().map(|c| c.cmd.to_string()).collect()
    }

    pub fn count(&self, cmd: &CommandLine) -> usize {
        self.calls().iter().filter(|c| &c.cmd == cmd).count()
    }

    /// Index of the first call of `cmd`, if any.
    pub fn position(&self, cmd: &CommandLine) -> Option<usize> {
        self.calls().iter().position(|c| &c.cmd == cmd)
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn push(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

/// A fake process runner that:
/// - records every command it was asked to run
/// - answers from a per-command script; the last scripted answer repeats
/// - answers `None` (failure) for commands that were never scripted
#[derive(Debug, Default)]
pub struct FakeRunner {
    responses: HashMap<CommandLine, VecDeque<CommandResult>>,
    log: CallLog,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `response` for the next call of `cmd`.
    pub fn on(mut self, cmd: CommandLine, response: Option<&str>) -> Self {
        self.responses
            .entry(cmd)
            .or_default()
            .push_back(response.map(str::to_string));
        self
    }

    pub fn log(&self) -> CallLog {
        self.log.clone()
    }
}

impl ProcessRunner for FakeRunner {
    fn run<'a>(
        &'a mut self,
        cmd: &'a CommandLine,
        mode: OutputMode,
    ) -> Pin<Box<dyn Future<Output = CommandResult> + Send + 'a>> {
        self.log.push(Call {
            cmd: cmd.clone(),
            mode,
        });

        let response = match self.responses.get_mut(cmd) {
            Some(queue) if queue.len() > 1 => queue.pop_front().flatten(),
            Some(queue) => queue.front().cloned().flatten(),
            None => None,
        };

        Box::pin(async move { response })
    }
}
