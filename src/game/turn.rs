//! Per-turn records: submissions, the validated move table and action logs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::PlayerConfig;
use crate::game::{PLAYER_ONE, PLAYER_TWO, PlayerId, PlayerState, Position, World};

/// A move as proposed by a move generator.
///
/// Serialized in the `{"source": [x, y], "destination": [x, y], "units": n}`
/// shape that move generators answer with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposedMove {
    /// Cell the units leave.
    pub source: Position,
    /// Cell the units enter.
    pub destination: Position,
    /// Number of units requested.
    #[serde(rename = "units", alias = "unit_count")]
    pub unit_count: u32,
}

impl ProposedMove {
    /// Create a new proposed move.
    #[must_use]
    pub const fn new(source: Position, destination: Position, unit_count: u32) -> Self {
        Self {
            source,
            destination,
            unit_count,
        }
    }
}

/// Output of one move-generation call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    /// Proposed moves in the order they were returned.
    pub moves: Vec<ProposedMove>,
    /// Raw generator output, if the generator produced text.
    pub raw_output: Option<String>,
}

impl Proposal {
    /// A proposal with no moves.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// A proposal made of the given moves.
    #[must_use]
    pub fn from_moves(moves: Vec<ProposedMove>) -> Self {
        Self {
            moves,
            raw_output: None,
        }
    }
}

/// A validated move, stored under its source cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedMove {
    /// Cell the units enter.
    pub destination: Position,
    /// Number of units to move (already clamped).
    #[serde(rename = "units", alias = "unit_count")]
    pub unit_count: u32,
}

/// Serialized form of one [`InputMoves`] entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputMovesEntry {
    /// Source cell.
    pub source: Position,
    /// Validated moves per player.
    pub moves: BTreeMap<PlayerId, Vec<PlannedMove>>,
}

/// Validated moves keyed by source cell, then by player.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<InputMovesEntry>", into = "Vec<InputMovesEntry>")]
pub struct InputMoves {
    by_source: BTreeMap<Position, BTreeMap<PlayerId, Vec<PlannedMove>>>,
}

impl InputMoves {
    /// Register a source cell with an empty move list for every player.
    pub fn touch(&mut self, source: Position, num_players: u8) {
        let entry = self.by_source.entry(source).or_default();
        for player in 1..=num_players {
            entry.entry(player).or_default();
        }
    }

    /// Append a validated move for `player` at `source`.
    pub fn push(&mut self, source: Position, player: PlayerId, planned: PlannedMove) {
        self.by_source
            .entry(source)
            .or_default()
            .entry(player)
            .or_default()
            .push(planned);
    }

    /// Whether `source` has an entry (even with empty lists).
    #[must_use]
    pub fn contains_source(&self, source: Position) -> bool {
        self.by_source.contains_key(&source)
    }

    /// Per-player move lists at `source`, players in ascending id order.
    #[must_use]
    pub fn at(&self, source: Position) -> Option<&BTreeMap<PlayerId, Vec<PlannedMove>>> {
        self.by_source.get(&source)
    }

    /// Validated moves for `player` at `source`.
    #[must_use]
    pub fn get(&self, source: Position, player: PlayerId) -> &[PlannedMove] {
        self.by_source
            .get(&source)
            .and_then(|moves| moves.get(&player))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Source cells with entries, in canonical order.
    pub fn sources(&self) -> impl Iterator<Item = Position> + '_ {
        self.by_source.keys().copied()
    }

    /// Every move as `(source, player, move)`.
    pub fn iter(&self) -> impl Iterator<Item = (Position, PlayerId, &PlannedMove)> {
        self.by_source.iter().flat_map(|(source, players)| {
            players
                .iter()
                .flat_map(move |(player, moves)| moves.iter().map(move |m| (*source, *player, m)))
        })
    }

    /// Total number of validated moves.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_source.values().flat_map(BTreeMap::values).map(Vec::len).sum()
    }

    /// Whether no moves were validated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Vec<InputMovesEntry>> for InputMoves {
    fn from(entries: Vec<InputMovesEntry>) -> Self {
        Self {
            by_source: entries.into_iter().map(|e| (e.source, e.moves)).collect(),
        }
    }
}

impl From<InputMoves> for Vec<InputMovesEntry> {
    fn from(moves: InputMoves) -> Self {
        moves
            .by_source
            .into_iter()
            .map(|(source, moves)| InputMovesEntry { source, moves })
            .collect()
    }
}

/// One executed move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRecord {
    /// Cell the units left.
    pub source: Position,
    /// Cell the units entered.
    pub destination: Position,
    /// Number of units moved.
    #[serde(rename = "units")]
    pub unit_count: u32,
    /// Player whose order this was.
    pub player_id: PlayerId,
}

/// One spawned unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnRecord {
    /// Cell the unit appeared on.
    pub position: Position,
    /// Owner of the new unit.
    pub player_id: PlayerId,
}

/// One resolved combat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatRecord {
    /// Cell the combat happened on.
    pub position: Position,
    /// Units lost per owner, never more than the owner had.
    pub casualties: BTreeMap<PlayerId, u32>,
}

impl CombatRecord {
    /// Units lost by `player` (zero if absent).
    #[must_use]
    pub fn casualties_of(&self, player: PlayerId) -> u32 {
        self.casualties.get(&player).copied().unwrap_or(0)
    }

    /// Units lost by player one.
    #[must_use]
    pub fn player_1_casualties(&self) -> u32 {
        self.casualties_of(PLAYER_ONE)
    }

    /// Units lost by player two.
    #[must_use]
    pub fn player_2_casualties(&self) -> u32 {
        self.casualties_of(PLAYER_TWO)
    }
}

/// Bookkeeping for a single turn.
///
/// `world` is the snapshot after the most recent phase that touched it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnRecord {
    /// Turn this record belongs to.
    pub turn_number: u32,
    /// World snapshot.
    pub world: World,
    /// Player one's submission.
    pub player_one: PlayerState,
    /// Player two's submission.
    pub player_two: PlayerState,
    /// Validated move table consumed by the move phase.
    pub input_moves: InputMoves,
    /// Moves executed, in execution order.
    pub move_log: Vec<MoveRecord>,
    /// Units spawned, in cell order.
    pub spawn_log: Vec<SpawnRecord>,
    /// Combats resolved, in cell order.
    pub combat_log: Vec<CombatRecord>,
}

impl TurnRecord {
    /// Create an empty record for `turn_number`.
    #[must_use]
    pub fn new(
        turn_number: u32,
        world: World,
        player_one_config: PlayerConfig,
        player_two_config: PlayerConfig,
    ) -> Self {
        Self {
            turn_number,
            world,
            player_one: PlayerState::new(player_one_config),
            player_two: PlayerState::new(player_two_config),
            input_moves: InputMoves::default(),
            move_log: Vec::new(),
            spawn_log: Vec::new(),
            combat_log: Vec::new(),
        }
    }

    /// Bookkeeping for `player`, if it is one of the two seats.
    #[must_use]
    pub fn player(&self, player: PlayerId) -> Option<&PlayerState> {
        match player {
            PLAYER_ONE => Some(&self.player_one),
            PLAYER_TWO => Some(&self.player_two),
            _ => None,
        }
    }

    /// Replace the world snapshot.
    #[must_use]
    pub fn with_world(mut self, world: World) -> Self {
        self.world = world;
        self
    }

    /// Replace one player's bookkeeping. Unknown ids are ignored.
    #[must_use]
    pub fn with_player(mut self, player: PlayerId, state: PlayerState) -> Self {
        match player {
            PLAYER_ONE => self.player_one = state,
            PLAYER_TWO => self.player_two = state,
            _ => {}
        }
        self
    }

    /// Replace the validated move table.
    #[must_use]
    pub fn with_input_moves(mut self, input_moves: InputMoves) -> Self {
        self.input_moves = input_moves;
        self
    }

    /// Append executed moves.
    #[must_use]
    pub fn with_moves(mut self, records: impl IntoIterator<Item = MoveRecord>) -> Self {
        self.move_log.extend(records);
        self
    }

    /// Append a spawn.
    #[must_use]
    pub fn with_spawn(mut self, record: SpawnRecord) -> Self {
        self.spawn_log.push(record);
        self
    }

    /// Append a combat.
    #[must_use]
    pub fn with_combat(mut self, record: CombatRecord) -> Self {
        self.combat_log.push(record);
        self
    }
}
