//! Parsing of move-generator answers.
//!
//! Generators answer with `{"moves": [{"source": [x, y], "destination":
//! [x, y], "units": n}, ...]}`. Language models like to wrap that in prose
//! or code fences, so the outermost JSON object in the text is used.

use serde::{Deserialize, Serialize};

use crate::error::GenerateError;
use crate::game::ProposedMove;

/// The answer document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveResponse {
    /// Proposed moves in order.
    #[serde(default)]
    pub moves: Vec<ProposedMove>,
}

/// Slice from the first `{` to the last `}`.
fn outermost_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

/// Parse the moves out of a generator's raw answer.
///
/// # Errors
///
/// Returns [`GenerateError::MalformedResponse`] if the text holds no JSON
/// object or the object is not a move response.
pub fn parse_moves(text: &str) -> Result<Vec<ProposedMove>, GenerateError> {
    if text.trim().is_empty() {
        return Err(GenerateError::MalformedResponse("empty response".to_string()));
    }
    let json = outermost_object(text)
        .ok_or_else(|| GenerateError::MalformedResponse("no JSON object in response".to_string()))?;
    let response: MoveResponse = serde_json::from_str(json)
        .map_err(|e| GenerateError::MalformedResponse(e.to_string()))?;
    Ok(response.moves)
}

/// Serialize moves in the answer format.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn format_moves(moves: &[ProposedMove]) -> Result<String, serde_json::Error> {
    serde_json::to_string(&MoveResponse {
        moves: moves.to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Position;

    #[test]
    fn test_plain_json() {
        let moves =
            parse_moves(r#"{"moves": [{"source": [0, 2], "destination": [1, 2], "units": 2}]}"#)
                .unwrap();
        assert_eq!(moves, vec![ProposedMove::new(Position::new(0, 2), Position::new(1, 2), 2)]);
    }

    #[test]
    fn test_wrapped_in_prose() {
        let text = "Here are my moves:\n```json\n{\"moves\": [{\"source\": [4, 2], \"destination\": [3, 2], \"units\": 1}]}\n```\nGood luck!";
        let moves = parse_moves(text).unwrap();
        assert_eq!(moves.len(), 1);
        assert_eq!(moves[0].destination, Position::new(3, 2));
    }

    #[test]
    fn test_missing_moves_is_empty() {
        assert!(parse_moves("{}").unwrap().is_empty());
    }

    #[test]
    fn test_malformed() {
        assert!(matches!(parse_moves(""), Err(GenerateError::MalformedResponse(_))));
        assert!(matches!(parse_moves("no idea"), Err(GenerateError::MalformedResponse(_))));
        assert!(matches!(
            parse_moves(r#"{"moves": [{"source": "a1"}]}"#),
            Err(GenerateError::MalformedResponse(_))
        ));
        assert!(matches!(parse_moves("} backwards {"), Err(GenerateError::MalformedResponse(_))));
    }

    #[test]
    fn test_format_then_parse() {
        let moves = vec![ProposedMove::new(Position::new(1, 1), Position::new(1, 2), 3)];
        let text = format_moves(&moves).unwrap();
        assert!(text.contains("\"units\":3"));
        assert_eq!(parse_moves(&text).unwrap(), moves);
    }
}
