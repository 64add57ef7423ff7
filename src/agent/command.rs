//! External-program move generator.
//!
//! The composed prompt is written to the program's stdin as
//! `{"system": "...", "messages": [{"role": ..., "content": ...}, ...]}`
//! and the program's stdout is parsed as a move response. This is how a
//! language model is wired in: the program is a thin bridge to the model
//! API.

use std::collections::BTreeMap;
use std::io::{ErrorKind, Read, Write};
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::agent::prompt::{Message, PromptComposer, WORLD_REPRESENTATION, extract_system_message};
use crate::agent::{MoveGenerator, PlayerView, parse_moves};
use crate::config::{CommandConfig, PromptSource};
use crate::error::GenerateError;
use crate::game::Proposal;

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Request written to the program's stdin.
#[derive(Debug, Serialize)]
pub struct CommandRequest<'a> {
    /// System prompt (empty if the chain has none).
    pub system: &'a str,
    /// Remaining messages in order.
    pub messages: &'a [Message],
}

/// Runs an external program once per turn.
#[derive(Debug)]
pub struct CommandGenerator {
    name: String,
    program: String,
    args: Vec<String>,
    timeout: Option<Duration>,
    composer: PromptComposer,
    prompts: Vec<PromptSource>,
}

impl CommandGenerator {
    /// Create a generator from its config.
    #[must_use]
    pub fn new(name: impl Into<String>, config: &CommandConfig) -> Self {
        Self {
            name: name.into(),
            program: config.program.clone(),
            args: config.args.clone(),
            timeout: config.timeout_secs.map(Duration::from_secs),
            composer: PromptComposer::new(config.prompts_dir.clone()),
            prompts: config.turn_prompt_config.clone(),
        }
    }

    /// Build the message chain for `view`.
    ///
    /// # Errors
    ///
    /// Returns an error if the view cannot be serialized or a prompt fails
    /// to compose.
    pub fn message_chain(&self, view: &PlayerView) -> Result<Vec<Message>, GenerateError> {
        let world = serde_yaml::to_value(view)?;
        let injected = BTreeMap::from([(WORLD_REPRESENTATION.to_string(), world)]);
        Ok(self.composer.compose(&self.prompts, &injected)?)
    }

    /// Run the program on `input` and return its stdout.
    ///
    /// The timeout covers the whole exchange, including writing `input`.
    fn run(&self, input: &[u8]) -> Result<String, GenerateError> {
        let deadline = self
            .timeout
            .and_then(|limit| Some((Instant::now().checked_add(limit)?, limit)));
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());
        let writer = feed(child.stdin.take(), input.to_vec());

        let waited = match deadline {
            Some((at, limit)) => wait_until(&mut child, at, limit),
            None => child.wait().map_err(GenerateError::from),
        };
        let status = match waited {
            Ok(status) => status,
            Err(e) => {
                reap(&mut child);
                return Err(e);
            }
        };
        // Programs may exit without reading their input.
        match writer.join() {
            Ok(Err(e)) if e.kind() != ErrorKind::BrokenPipe => return Err(e.into()),
            _ => {}
        }
        let stdout = stdout.join().unwrap_or_default();
        let stderr = stderr.join().unwrap_or_default();

        if !status.success() {
            return Err(GenerateError::ExitStatus {
                status,
                stderr: stderr.trim().to_string(),
            });
        }
        Ok(stdout)
    }
}

/// Read a pipe to the end on a helper thread.
fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> thread::JoinHandle<String> {
    thread::spawn(move || {
        let mut text = String::new();
        if let Some(mut pipe) = pipe {
            // A broken pipe just means the child is gone.
            let _ = pipe.read_to_string(&mut text);
        }
        text
    })
}

/// Write `input` to a pipe on a helper thread, closing it when done.
fn feed<W: Write + Send + 'static>(
    pipe: Option<W>,
    input: Vec<u8>,
) -> thread::JoinHandle<std::io::Result<()>> {
    thread::spawn(move || match pipe {
        Some(mut pipe) => pipe.write_all(&input),
        None => Ok(()),
    })
}

/// Kill `child` and collect its exit status, ignoring failures.
fn reap(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

/// Wait for `child`, killing it once `deadline` has passed.
fn wait_until(
    child: &mut Child,
    deadline: Instant,
    limit: Duration,
) -> Result<std::process::ExitStatus, GenerateError> {
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(status);
        }
        if Instant::now() >= deadline {
            reap(child);
            return Err(GenerateError::Timeout(limit));
        }
        thread::sleep(POLL_INTERVAL);
    }
}

impl MoveGenerator for CommandGenerator {
    fn name(&self) -> &str {
        &self.name
    }

    fn generate(&mut self, view: &PlayerView) -> Result<Proposal, GenerateError> {
        let chain = self.message_chain(view)?;
        let (system, messages) = extract_system_message(&chain);
        let request = serde_json::to_vec(&CommandRequest {
            system: &system,
            messages: &messages,
        })
        .map_err(|e| GenerateError::MalformedResponse(format!("could not encode request: {e}")))?;

        tracing::debug!(
            agent = %self.name,
            program = %self.program,
            messages = messages.len(),
            "running move generator"
        );
        let raw = self.run(&request)?;
        let moves = parse_moves(&raw)?;
        Ok(Proposal {
            moves,
            raw_output: Some(raw),
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::game::GameState;
    use std::fs;
    use std::path::Path;

    fn config(program: &str, args: &[&str], prompts_dir: &Path) -> CommandConfig {
        CommandConfig {
            program: program.to_string(),
            args: args.iter().map(ToString::to_string).collect(),
            timeout_secs: Some(5),
            prompts_dir: prompts_dir.to_path_buf(),
            turn_prompt_config: Vec::new(),
        }
    }

    fn view() -> PlayerView {
        PlayerView::new(&GameState::from_config(&GameConfig::default()).unwrap(), 1)
    }

    #[test]
    fn test_reads_moves_from_stdout() {
        let dir = tempfile::tempdir().unwrap();
        let reply = r#"{"moves": [{"source": [0, 2], "destination": [1, 2], "units": 1}]}"#;
        let script = format!("cat > /dev/null; echo '{reply}'");
        let mut agent = CommandGenerator::new("sh", &config("sh", &["-c", &script], dir.path()));

        let proposal = agent.generate(&view()).unwrap();
        assert_eq!(proposal.moves.len(), 1);
        assert_eq!(proposal.raw_output.as_deref().map(str::trim), Some(reply));
    }

    #[test]
    fn test_request_carries_system_prompt() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("p.yaml"),
            "- role: system\n  content: be brief\n- role: user\n  content: go\n",
        )
        .unwrap();
        let mut cfg = config("cat", &[], dir.path());
        cfg.turn_prompt_config = vec![PromptSource {
            prompt_filepath: "p.yaml".to_string(),
            template_params: BTreeMap::new(),
        }];
        // `cat` echoes the request, which has no "moves" key.
        let proposal = CommandGenerator::new("echo", &cfg).generate(&view()).unwrap();
        assert!(proposal.moves.is_empty());
        let raw = proposal.raw_output.unwrap();
        assert!(raw.contains("\"system\":\"be brief\""));
        assert!(raw.contains("\"role\":\"user\""));
    }

    #[test]
    fn test_nonzero_exit() {
        let dir = tempfile::tempdir().unwrap();
        let mut agent =
            CommandGenerator::new("fail", &config("sh", &["-c", "echo oops >&2; exit 3"], dir.path()));
        match agent.generate(&view()) {
            Err(GenerateError::ExitStatus { stderr, .. }) => assert_eq!(stderr, "oops"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = config("sleep", &["5"], dir.path());
        cfg.timeout_secs = Some(1);
        let result = CommandGenerator::new("slow", &cfg).generate(&view());
        assert!(matches!(result, Err(GenerateError::Timeout(_))));
    }

    #[test]
    fn test_timeout_covers_unread_input() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = config("sleep", &["4"], dir.path());
        cfg.timeout_secs = Some(1);
        let agent = CommandGenerator::new("deaf", &cfg);

        // Far more than a pipe buffer holds, and the program never reads it.
        let started = Instant::now();
        let result = agent.run(&vec![b'x'; 1 << 20]);
        assert!(matches!(result, Err(GenerateError::Timeout(_))));
        assert!(started.elapsed() < Duration::from_secs(3));
    }

    #[test]
    fn test_large_input_is_delivered() {
        let dir = tempfile::tempdir().unwrap();
        let agent = CommandGenerator::new("count", &config("wc", &["-c"], dir.path()));
        let output = agent.run(&vec![b'x'; 1 << 20]).unwrap();
        assert_eq!(output.trim(), "1048576");
    }

    #[test]
    fn test_missing_program() {
        let dir = tempfile::tempdir().unwrap();
        let mut agent = CommandGenerator::new("ghost", &config("/no/such/program", &[], dir.path()));
        assert!(matches!(agent.generate(&view()), Err(GenerateError::Io(_))));
    }
}
