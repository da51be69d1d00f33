//! Command execution abstraction for testability
//!
//! Sources and the backup manager never spawn processes themselves; they hand
//! an [`Invocation`] to a [`CommandExecutor`]. Tests swap in
//! [`mock::MockExecutor`].

use super::command::{CommandOutput, Invocation};
use anyhow::Result;
use std::time::Duration;

/// Abstraction for command execution, enabling mocking in tests
pub trait CommandExecutor: Send + Sync {
    /// Run the invocation to completion with optional timeout
    fn execute(&self, invocation: &Invocation, timeout: Option<Duration>) -> Result<CommandOutput>;
}

/// Default implementation using real subprocess calls
#[derive(Debug, Clone, Default)]
pub struct RealExecutor;

impl RealExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl CommandExecutor for RealExecutor {
    fn execute(&self, invocation: &Invocation, timeout: Option<Duration>) -> Result<CommandOutput> {
        super::command::run_invocation(invocation, timeout)
    }
}

/// A mock executor for testing that records calls and returns configured responses
/// Available for use in external test crates
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    /// Response configuration for mock
    #[derive(Clone, Debug)]
    pub enum MockResponse {
        /// Exit zero. `stdout` is written to the redirect file when one is set.
        Success { stdout: String },
        /// Exit non-zero with the given combined output
        Failure { output: String, exit_code: i32 },
        /// The process could not be started
        LaunchError { message: String },
    }

    impl Default for MockResponse {
        fn default() -> Self {
            MockResponse::Success {
                stdout: String::new(),
            }
        }
    }

    /// Mock executor for testing
    #[derive(Clone, Default)]
    pub struct MockExecutor {
        /// Recorded invocations
        calls: Arc<Mutex<Vec<Invocation>>>,
        /// Pre-configured responses: program name -> queue of responses
        responses: Arc<Mutex<HashMap<String, Vec<MockResponse>>>>,
        /// Default response when no specific response is configured
        default_response: Arc<Mutex<MockResponse>>,
    }

    impl MockExecutor {
        pub fn new() -> Self {
            Self::default()
        }

        /// Configure the response for every call to a program
        pub fn expect(self, program: &str, response: MockResponse) -> Self {
            self.responses
                .lock()
                .unwrap()
                .insert(program.to_string(), vec![response]);
            self
        }

        /// Configure one response per call to a program, in call order. The
        /// last response repeats once the sequence is exhausted.
        pub fn expect_sequence(self, program: &str, responses: Vec<MockResponse>) -> Self {
            self.responses
                .lock()
                .unwrap()
                .insert(program.to_string(), responses);
            self
        }

        /// Set the default response for unconfigured programs
        pub fn with_default_response(self, response: MockResponse) -> Self {
            *self.default_response.lock().unwrap() = response;
            self
        }

        /// Get all recorded invocations
        pub fn get_calls(&self) -> Vec<Invocation> {
            self.calls.lock().unwrap().clone()
        }

        /// Get recorded invocations of a specific program
        pub fn calls_to(&self, program: &str) -> Vec<Invocation> {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .filter(|c| c.program == program)
                .cloned()
                .collect()
        }

        /// Check if a program was called
        pub fn was_called(&self, program: &str) -> bool {
            self.call_count(program) > 0
        }

        /// Get number of calls to a specific program
        pub fn call_count(&self, program: &str) -> usize {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .filter(|c| c.program == program)
                .count()
        }

        fn next_response(&self, program: &str) -> MockResponse {
            let mut responses = self.responses.lock().unwrap();
            match responses.get_mut(program) {
                Some(queue) if queue.len() > 1 => queue.remove(0),
                Some(queue) if queue.len() == 1 => queue[0].clone(),
                _ => self.default_response.lock().unwrap().clone(),
            }
        }
    }

    impl CommandExecutor for MockExecutor {
        fn execute(&self, invocation: &Invocation, _timeout: Option<Duration>) -> Result<CommandOutput> {
            self.calls.lock().unwrap().push(invocation.clone());

            match self.next_response(&invocation.program) {
                MockResponse::Success { stdout } => {
                    let log = match invocation.stdout_file {
                        Some(ref path) => {
                            std::fs::write(path, &stdout)?;
                            String::new()
                        }
                        None => stdout,
                    };
                    Ok(CommandOutput {
                        success: true,
                        exit_code: Some(0),
                        log,
                    })
                }
                MockResponse::Failure { output, exit_code } => Ok(CommandOutput {
                    success: false,
                    exit_code: Some(exit_code),
                    log: output,
                }),
                MockResponse::LaunchError { message } => Err(anyhow::anyhow!(message)),
            }
        }
    }
}
