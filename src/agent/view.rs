//! Player-scoped snapshot of the board, handed to move generators.
//!
//! Unit counts are relative to the viewing player ("your" and "enemy"), so
//! the same prompt works for either seat.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::game::{GameState, GameStatus, PlayerId, Position, opponent};

/// A cell address in `{x, y}` form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

impl From<Position> for Coordinate {
    fn from(pos: Position) -> Self {
        Self { x: pos.x, y: pos.y }
    }
}

impl From<Coordinate> for Position {
    fn from(c: Coordinate) -> Self {
        Self::new(c.x, c.y)
    }
}

/// Who holds a cell, from the viewer's side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Controller {
    /// Only the viewer has units here.
    You,
    /// Only the opponent has units here.
    Enemy,
}

/// Turn and status information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameInfo {
    /// Turn being played.
    pub current_turn: u32,
    /// Turn limit.
    pub max_turns: u32,
    /// Whether the game is still running.
    pub game_status: GameStatus,
}

/// Unit counts on one cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellUnits {
    /// Viewer's units.
    pub your_units: u32,
    /// Opponent's units.
    pub enemy_units: u32,
}

/// One cell as seen by the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellView {
    /// Cell address.
    pub position: Coordinate,
    /// Unit counts.
    pub units: CellUnits,
    /// Sole holder, if any.
    pub controlled_by: Option<Controller>,
}

/// Cells held by each side.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlledTerritories {
    /// Cells only the viewer occupies.
    pub your_territory: Vec<Coordinate>,
    /// Cells only the opponent occupies.
    pub enemy_territory: Vec<Coordinate>,
}

/// The board part of the view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardView {
    /// Territory summary.
    pub controlled_territories: ControlledTerritories,
    /// Every cell keyed by `"x,y"`.
    pub cells: BTreeMap<String, CellView>,
}

/// What one player sees before choosing moves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerView {
    /// Viewing player; not part of the serialized view.
    #[serde(skip)]
    pub player: PlayerId,
    /// Turn and status.
    pub game_info: GameInfo,
    /// Board contents.
    pub board: BoardView,
}

/// Key used for a cell in [`BoardView::cells`].
#[must_use]
pub fn cell_key(pos: Position) -> String {
    format!("{},{}", pos.x, pos.y)
}

impl PlayerView {
    /// Build `player`'s view of `state`.
    #[must_use]
    pub fn new(state: &GameState, player: PlayerId) -> Self {
        let enemy = opponent(player);
        let mut board = BoardView::default();

        for (pos, tile) in state.world.iter() {
            let units = CellUnits {
                your_units: tile.count_owned_by(player),
                enemy_units: tile.count_owned_by(enemy),
            };
            let controlled_by = if units.your_units > 0 && units.enemy_units == 0 {
                Some(Controller::You)
            } else if units.enemy_units > 0 && units.your_units == 0 {
                Some(Controller::Enemy)
            } else {
                None
            };
            match controlled_by {
                Some(Controller::You) => board.controlled_territories.your_territory.push(pos.into()),
                Some(Controller::Enemy) => {
                    board.controlled_territories.enemy_territory.push(pos.into());
                }
                None => {}
            }
            board.cells.insert(
                cell_key(pos),
                CellView {
                    position: pos.into(),
                    units,
                    controlled_by,
                },
            );
        }

        Self {
            player,
            game_info: GameInfo {
                current_turn: state.current_turn,
                max_turns: state.max_turns,
                game_status: state.status,
            },
            board,
        }
    }

    /// Cell at `pos`, if it is on the board.
    #[must_use]
    pub fn cell(&self, pos: Position) -> Option<&CellView> {
        self.board.cells.get(&cell_key(pos))
    }

    /// Cells where the viewer has units, in canonical order.
    #[must_use]
    pub fn own_stacks(&self) -> Vec<(Position, u32)> {
        let mut stacks: Vec<(Position, u32)> = self
            .board
            .cells
            .values()
            .filter(|cell| cell.units.your_units > 0)
            .map(|cell| (cell.position.into(), cell.units.your_units))
            .collect();
        stacks.sort();
        stacks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::game::Unit;

    fn opening() -> GameState {
        GameState::from_config(&GameConfig::default()).unwrap()
    }

    #[test]
    fn test_view_is_player_relative() {
        let state = opening();
        let one = PlayerView::new(&state, 1);
        let two = PlayerView::new(&state, 2);

        assert_eq!(one.cell(Position::new(0, 2)).unwrap().units.your_units, 2);
        assert_eq!(two.cell(Position::new(0, 2)).unwrap().units.enemy_units, 2);
        assert_eq!(one.board.controlled_territories.your_territory, vec![Coordinate { x: 0, y: 2 }]);
        assert_eq!(two.board.controlled_territories.your_territory, vec![Coordinate { x: 4, y: 2 }]);
        assert_eq!(one.board.cells.len(), 25);
    }

    #[test]
    fn test_mixed_cell_has_no_controller() {
        let state = opening();
        let pos = Position::new(2, 2);
        let state = state.with_world(state.world.with_units(pos, vec![Unit::new(1), Unit::new(2)]));
        let view = PlayerView::new(&state, 1);
        assert_eq!(view.cell(pos).unwrap().controlled_by, None);
        assert_eq!(view.cell(Position::new(4, 2)).unwrap().controlled_by, Some(Controller::Enemy));
    }

    #[test]
    fn test_json_shape() {
        let view = PlayerView::new(&opening(), 1);
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["game_info"]["current_turn"], 1);
        assert_eq!(json["game_info"]["game_status"], "in_progress");
        assert_eq!(json["board"]["cells"]["0,2"]["controlled_by"], "you");
        assert_eq!(json["board"]["cells"]["1,1"]["controlled_by"], serde_json::Value::Null);
        assert_eq!(json["board"]["cells"]["4,2"]["position"]["x"], 4);
        assert!(json.get("player").is_none());
    }

    #[test]
    fn test_own_stacks() {
        let view = PlayerView::new(&opening(), 2);
        assert_eq!(view.own_stacks(), vec![(Position::new(4, 2), 2)]);
    }
}
