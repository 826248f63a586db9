//! Test double for [`CommandRunner`].
//!
//! Compiled for this crate's own tests and, through the `test-support`
//! feature, for integration tests.

use std::io::Write;
use std::sync::Mutex;

use crate::command_runner::CommandRunner;
use crate::error::Result;

#[derive(Debug, Clone)]
struct MockResponse {
    pattern: String,
    exit_code: i32,
    output: String,
}

/// Records commands and replays canned responses.
///
/// Responses are matched by substring against the full command text; the
/// first registered match wins. Unmatched commands succeed with no output.
#[derive(Debug, Default)]
pub struct MockCommandRunner {
    responses: Vec<MockResponse>,
    calls: Mutex<Vec<String>>,
}

impl MockCommandRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a response for commands containing `pattern`.
    pub fn respond(
        mut self,
        pattern: impl Into<String>,
        exit_code: i32,
        output: impl Into<String>,
    ) -> Self {
        self.responses.push(MockResponse {
            pattern: pattern.into(),
            exit_code,
            output: output.into(),
        });
        self
    }

    /// Make commands containing `pattern` exit with `exit_code`.
    pub fn fail(self, pattern: impl Into<String>, exit_code: i32) -> Self {
        self.respond(pattern, exit_code, "")
    }

    /// Every command executed so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    /// Executed commands that contain `needle`.
    pub fn calls_matching(&self, needle: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|call| call.contains(needle))
            .collect()
    }
}

impl CommandRunner for MockCommandRunner {
    fn execute(&self, command: &str, sink: &mut dyn Write) -> Result<i32> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(command.to_string());
        }

        match self
            .responses
            .iter()
            .find(|response| command.contains(&response.pattern))
        {
            Some(response) => {
                sink.write_all(response.output.as_bytes())?;
                Ok(response.exit_code)
            }
            None => Ok(0),
        }
    }
}
