/*!
 * Scripted tool runner for tests
 * Replays canned replies per sub-command and records every invocation
 */

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::io;
use std::sync::Mutex;

use crate::runner::{ToolOutput, ToolRunner};

#[derive(Debug, Clone)]
pub enum Reply {
    Exit {
        code: i32,
        stdout: String,
        stderr: String,
    },
    NotFound,
}

impl Reply {
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self::Exit {
            code: 0,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn fail(code: i32, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self::Exit {
            code,
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }
}

/// Replies are queued per sub-command (first argument). An unscripted call
/// succeeds with empty output, unless the runner was built with `missing()`.
#[derive(Debug, Default)]
pub struct ScriptedRunner {
    replies: Mutex<HashMap<String, VecDeque<Reply>>>,
    calls: Mutex<Vec<Vec<String>>>,
    missing: bool,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Behaves as if the program were not installed.
    pub fn missing() -> Self {
        Self {
            missing: true,
            ..Self::default()
        }
    }

    pub fn reply(self, subcommand: &str, reply: Reply) -> Self {
        self.replies
            .lock()
            .unwrap()
            .entry(subcommand.to_string())
            .or_default()
            .push_back(reply);
        self
    }

    /// Every invocation so far as `[program, args...]`.
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, subcommand: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call.get(1).map(String::as_str) == Some(subcommand))
            .count()
    }
}

#[async_trait]
impl ToolRunner for ScriptedRunner {
    async fn run(&self, program: &str, args: &[&str]) -> io::Result<ToolOutput> {
        let mut call = vec![program.to_string()];
        call.extend(args.iter().map(|arg| arg.to_string()));
        self.calls.lock().unwrap().push(call);

        if self.missing {
            return Err(io::Error::new(io::ErrorKind::NotFound, program.to_string()));
        }

        let subcommand = args.first().copied().unwrap_or_default();
        let reply = self
            .replies
            .lock()
            .unwrap()
            .get_mut(subcommand)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| Reply::ok(""));

        match reply {
            Reply::Exit {
                code,
                stdout,
                stderr,
            } => Ok(ToolOutput {
                success: code == 0,
                status: format!("exit status: {}", code),
                stdout,
                stderr,
            }),
            Reply::NotFound => Err(io::Error::new(io::ErrorKind::NotFound, program.to_string())),
        }
    }
}
