//! Canned move generators for tests and replays.

use std::collections::VecDeque;

use crate::agent::{MoveGenerator, PlayerView, parse_moves};
use crate::error::GenerateError;
use crate::game::{Proposal, ProposedMove};

/// One scripted turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptStep {
    /// Propose these moves.
    Moves(Vec<ProposedMove>),
    /// Answer with this raw text, parsed like a real generator's answer.
    Raw(String),
    /// Fail this turn.
    Fail,
}

/// Plays back a fixed script, one step per turn, then stays idle.
#[derive(Debug, Clone)]
pub struct ScriptedGenerator {
    name: String,
    steps: VecDeque<ScriptStep>,
}

impl ScriptedGenerator {
    /// Create a generator from explicit steps.
    #[must_use]
    pub fn new(name: impl Into<String>, steps: impl IntoIterator<Item = ScriptStep>) -> Self {
        Self {
            name: name.into(),
            steps: steps.into_iter().collect(),
        }
    }

    /// One move list per turn.
    #[must_use]
    pub fn from_moves(name: impl Into<String>, turns: Vec<Vec<ProposedMove>>) -> Self {
        Self::new(name, turns.into_iter().map(ScriptStep::Moves))
    }

    /// One raw response per turn.
    #[must_use]
    pub fn from_responses(name: impl Into<String>, responses: Vec<String>) -> Self {
        Self::new(name, responses.into_iter().map(ScriptStep::Raw))
    }

    /// Steps not yet played.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.steps.len()
    }
}

impl MoveGenerator for ScriptedGenerator {
    fn name(&self) -> &str {
        &self.name
    }

    fn generate(&mut self, _view: &PlayerView) -> Result<Proposal, GenerateError> {
        match self.steps.pop_front() {
            None => Ok(Proposal::empty()),
            Some(ScriptStep::Moves(moves)) => Ok(Proposal::from_moves(moves)),
            Some(ScriptStep::Raw(text)) => {
                let moves = parse_moves(&text)?;
                Ok(Proposal {
                    moves,
                    raw_output: Some(text),
                })
            }
            Some(ScriptStep::Fail) => Err(GenerateError::MalformedResponse(
                "scripted failure".to_string(),
            )),
        }
    }
}
