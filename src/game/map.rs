//! Board, tile and unit types.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::Add;

use serde::{Deserialize, Serialize};

use crate::game::PlayerId;

/// A cell address on the board.
///
/// Positions are pure keys: they carry no topology beyond equality,
/// ordering and vector addition for derived positions. Ordering is by `x`
/// then `y`, which is the canonical cell order of every phase pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "(i32, i32)", into = "(i32, i32)")]
pub struct Position {
    /// Column (or axial `q` on hexagonal boards).
    pub x: i32,
    /// Row (or axial `r` on hexagonal boards).
    pub y: i32,
}

impl Position {
    /// Create a new position.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl Add for Position {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

impl From<(i32, i32)> for Position {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

impl From<Position> for (i32, i32) {
    fn from(pos: Position) -> Self {
        (pos.x, pos.y)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A single combatant.
///
/// Units are immutable values. Killing a unit means leaving it out of the
/// next tile's unit list; health is never decremented in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    /// Owning player.
    pub owner: PlayerId,
    /// Hit points (units die in one hit under the current rules).
    pub health: u32,
    /// Movement allowance.
    pub movement_points: u32,
}

impl Unit {
    /// Create a fresh unit for `owner` with one health and one movement point.
    #[must_use]
    pub const fn new(owner: PlayerId) -> Self {
        Self {
            owner,
            health: 1,
            movement_points: 1,
        }
    }
}

/// A board cell and its occupants.
///
/// Unit order only matters as a tie-break: when an action consumes part of
/// a stack, the first units in list order are the ones taken.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    /// Address of this tile.
    pub position: Position,
    /// Units present, in insertion order.
    pub units: Vec<Unit>,
}

impl Tile {
    /// Create a tile holding the given units.
    #[must_use]
    pub fn new(position: Position, units: Vec<Unit>) -> Self {
        Self { position, units }
    }

    /// Create an empty tile.
    #[must_use]
    pub fn empty(position: Position) -> Self {
        Self::new(position, Vec::new())
    }

    /// Whether no units are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Total number of units on this tile.
    #[must_use]
    pub fn unit_count(&self) -> u32 {
        count(self.units.len())
    }

    /// Number of units owned by `player`.
    #[must_use]
    pub fn count_owned_by(&self, player: PlayerId) -> u32 {
        count(self.units.iter().filter(|u| u.owner == player).count())
    }

    /// Distinct owners present, in order of first appearance.
    #[must_use]
    pub fn owners(&self) -> Vec<PlayerId> {
        let mut owners = Vec::new();
        for unit in &self.units {
            if !owners.contains(&unit.owner) {
                owners.push(unit.owner);
            }
        }
        owners
    }

    /// The sole owner of every unit here, if there is exactly one.
    #[must_use]
    pub fn controller(&self) -> Option<PlayerId> {
        match self.owners().as_slice() {
            [owner] => Some(*owner),
            _ => None,
        }
    }

    /// Split the units into per-owner stacks.
    ///
    /// Owners appear in first-appearance order and each stack keeps the
    /// tile's list order.
    #[must_use]
    pub fn stacks(&self) -> Vec<(PlayerId, Vec<Unit>)> {
        split_by_owner(&self.units)
    }
}

/// Split units into per-owner stacks, owners in first-appearance order.
#[must_use]
pub fn split_by_owner(units: &[Unit]) -> Vec<(PlayerId, Vec<Unit>)> {
    let mut stacks: Vec<(PlayerId, Vec<Unit>)> = Vec::new();
    for unit in units {
        match stacks.iter_mut().find(|(owner, _)| *owner == unit.owner) {
            Some((_, stack)) => stack.push(*unit),
            None => stacks.push((unit.owner, vec![*unit])),
        }
    }
    stacks
}

/// Saturating conversion for unit counts.
pub(crate) fn count(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

/// Axial neighbour offsets on a hexagonal board.
const HEX_NEIGHBORS: [Position; 6] = [
    Position::new(1, 0),
    Position::new(1, -1),
    Position::new(0, -1),
    Position::new(-1, 0),
    Position::new(-1, 1),
    Position::new(0, 1),
];

/// Orthogonal neighbour offsets on a rectangular board.
const RECT_NEIGHBORS: [Position; 4] = [
    Position::new(0, -1),
    Position::new(0, 1),
    Position::new(-1, 0),
    Position::new(1, 0),
];

/// Shape of the playing field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum BoardShape {
    /// `width` x `height` grid with cells `0 <= x < width`, `0 <= y < height`.
    Rectangular {
        /// Number of columns.
        width: u16,
        /// Number of rows.
        height: u16,
    },
    /// Hexagon of axial cells within `radius` steps of the origin.
    Hexagonal {
        /// Distance from the centre to an edge cell.
        radius: u16,
    },
}

impl BoardShape {
    /// A `size` x `size` rectangular board.
    #[must_use]
    pub const fn square(size: u16) -> Self {
        Self::Rectangular {
            width: size,
            height: size,
        }
    }

    /// All cell positions of this board in canonical order.
    #[must_use]
    pub fn positions(&self) -> Vec<Position> {
        match *self {
            Self::Rectangular { width, height } => (0..i32::from(width))
                .flat_map(|x| (0..i32::from(height)).map(move |y| Position::new(x, y)))
                .collect(),
            Self::Hexagonal { radius } => {
                let r = i32::from(radius);
                (-r..=r)
                    .flat_map(|q| {
                        let lo = (-r).max(-q - r);
                        let hi = r.min(-q + r);
                        (lo..=hi).map(move |s| Position::new(q, s))
                    })
                    .collect()
            }
        }
    }

    /// Number of cells on this board.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        match *self {
            Self::Rectangular { width, height } => usize::from(width) * usize::from(height),
            Self::Hexagonal { radius } => {
                let r = usize::from(radius);
                3 * r * (r + 1) + 1
            }
        }
    }

    /// Starting cells for player one (west) and player two (east).
    ///
    /// Returns `None` when the board cannot hold two distinct start cells.
    #[must_use]
    pub fn starting_positions(&self) -> Option<(Position, Position)> {
        match *self {
            Self::Rectangular { width, height } => {
                if width < 2 || height == 0 {
                    return None;
                }
                let row = i32::from(height / 2);
                Some((
                    Position::new(0, row),
                    Position::new(i32::from(width) - 1, row),
                ))
            }
            Self::Hexagonal { radius } => {
                if radius == 0 {
                    return None;
                }
                let r = i32::from(radius);
                Some((Position::new(-r, 0), Position::new(r, 0)))
            }
        }
    }

    /// Offsets to the cells adjacent to any position on this board.
    #[must_use]
    pub fn neighbor_offsets(&self) -> &'static [Position] {
        match self {
            Self::Rectangular { .. } => &RECT_NEIGHBORS,
            Self::Hexagonal { .. } => &HEX_NEIGHBORS,
        }
    }
}

/// The board: exactly one tile per valid position.
///
/// The key set is fixed when the world is built; only occupancy changes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Tile>", into = "Vec<Tile>")]
pub struct World {
    /// Tiles keyed by position.
    tiles: BTreeMap<Position, Tile>,
}

impl World {
    /// Build an empty world for the given board shape.
    #[must_use]
    pub fn new(shape: BoardShape) -> Self {
        Self::from_tiles(shape.positions().into_iter().map(Tile::empty))
    }

    /// Build a world from tiles; later tiles replace earlier ones at the same position.
    pub fn from_tiles(tiles: impl IntoIterator<Item = Tile>) -> Self {
        Self {
            tiles: tiles.into_iter().map(|t| (t.position, t)).collect(),
        }
    }

    /// Number of cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Whether the world has no cells at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Whether `pos` is a valid cell.
    #[must_use]
    pub fn contains(&self, pos: Position) -> bool {
        self.tiles.contains_key(&pos)
    }

    /// Get the tile at `pos`.
    #[must_use]
    pub fn get(&self, pos: Position) -> Option<&Tile> {
        self.tiles.get(&pos)
    }

    /// Replace the units on an existing cell.
    ///
    /// Returns `false` (and changes nothing) if `pos` is not a valid cell.
    pub fn set_units(&mut self, pos: Position, units: Vec<Unit>) -> bool {
        match self.tiles.get_mut(&pos) {
            Some(tile) => {
                tile.units = units;
                true
            }
            None => false,
        }
    }

    /// Copy of this world with the units on `pos` replaced.
    #[must_use]
    pub fn with_units(&self, pos: Position, units: Vec<Unit>) -> Self {
        let mut world = self.clone();
        world.set_units(pos, units);
        world
    }

    /// Iterate over positions in canonical order.
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.tiles.keys().copied()
    }

    /// Iterate over all positions and tiles.
    pub fn iter(&self) -> impl Iterator<Item = (Position, &Tile)> {
        self.tiles.iter().map(|(pos, tile)| (*pos, tile))
    }

    /// Whether both worlds have exactly the same set of cells.
    #[must_use]
    pub fn same_cells(&self, other: &Self) -> bool {
        self.tiles.len() == other.tiles.len() && self.tiles.keys().eq(other.tiles.keys())
    }

    /// Total units on the board.
    #[must_use]
    pub fn total_units(&self) -> u32 {
        self.tiles.values().map(Tile::unit_count).sum()
    }

    /// Total units owned by `player`.
    #[must_use]
    pub fn units_of(&self, player: PlayerId) -> u32 {
        self.tiles.values().map(|t| t.count_owned_by(player)).sum()
    }

    /// Unit totals for players `1..=num_players` (zero counts included).
    #[must_use]
    pub fn unit_counts(&self, num_players: u8) -> BTreeMap<PlayerId, u32> {
        let mut counts: BTreeMap<PlayerId, u32> = (1..=num_players).map(|p| (p, 0)).collect();
        for unit in self.tiles.values().flat_map(|t| &t.units) {
            *counts.entry(unit.owner).or_insert(0) += 1;
        }
        counts
    }

    /// Smallest and largest coordinates present, for rendering.
    #[must_use]
    pub fn bounds(&self) -> Option<(Position, Position)> {
        let mut iter = self.tiles.keys();
        let first = *iter.next()?;
        Some(iter.fold((first, first), |(lo, hi), p| {
            (
                Position::new(lo.x.min(p.x), lo.y.min(p.y)),
                Position::new(hi.x.max(p.x), hi.y.max(p.y)),
            )
        }))
    }
}

impl From<Vec<Tile>> for World {
    fn from(tiles: Vec<Tile>) -> Self {
        Self::from_tiles(tiles)
    }
}

impl From<World> for Vec<Tile> {
    fn from(world: World) -> Self {
        world.tiles.into_values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_add() {
        assert_eq!(Position::new(1, 2) + Position::new(-1, 3), Position::new(0, 5));
    }

    #[test]
    fn test_position_ordering_is_column_major() {
        let mut positions = vec![Position::new(1, 0), Position::new(0, 1), Position::new(0, 0)];
        positions.sort();
        assert_eq!(
            positions,
            vec![Position::new(0, 0), Position::new(0, 1), Position::new(1, 0)]
        );
    }

    #[test]
    fn test_position_serializes_as_pair() {
        let json = serde_json::to_string(&Position::new(3, 4)).unwrap();
        assert_eq!(json, "[3,4]");
        let back: Position = serde_json::from_str("[3,4]").unwrap();
        assert_eq!(back, Position::new(3, 4));
    }

    #[test]
    fn test_rectangular_world_creation() {
        let world = World::new(BoardShape::square(5));
        assert_eq!(world.len(), 25);
        assert!(world.contains(Position::new(4, 4)));
        assert!(!world.contains(Position::new(5, 0)));
        assert!(!world.contains(Position::new(-1, 0)));
        assert_eq!(world.positions().next(), Some(Position::new(0, 0)));
    }

    #[test]
    fn test_hexagonal_world_creation() {
        let shape = BoardShape::Hexagonal { radius: 2 };
        let world = World::new(shape);
        assert_eq!(world.len(), 19);
        assert_eq!(shape.cell_count(), 19);
        assert!(world.contains(Position::new(0, 0)));
        assert!(world.contains(Position::new(2, -2)));
        assert!(!world.contains(Position::new(2, 2)));

        let (west, east) = shape.starting_positions().unwrap();
        assert!(world.contains(west));
        assert!(world.contains(east));
    }

    #[test]
    fn test_starting_positions_rectangular() {
        let (west, east) = BoardShape::square(5).starting_positions().unwrap();
        assert_eq!(west, Position::new(0, 2));
        assert_eq!(east, Position::new(4, 2));
    }

    #[test]
    fn test_starting_positions_degenerate() {
        assert!(BoardShape::square(1).starting_positions().is_none());
        assert!(BoardShape::Hexagonal { radius: 0 }.starting_positions().is_none());
    }

    #[test]
    fn test_tile_stacks_and_controller() {
        let pos = Position::new(0, 0);
        let tile = Tile::new(pos, vec![Unit::new(2), Unit::new(1), Unit::new(2)]);
        assert_eq!(tile.owners(), vec![2, 1]);
        assert_eq!(tile.controller(), None);
        let stacks = tile.stacks();
        assert_eq!(stacks[0].0, 2);
        assert_eq!(stacks[0].1.len(), 2);
        assert_eq!(stacks[1].0, 1);

        let solo = Tile::new(pos, vec![Unit::new(1), Unit::new(1)]);
        assert_eq!(solo.controller(), Some(1));
        assert_eq!(Tile::empty(pos).controller(), None);
    }

    #[test]
    fn test_set_units_rejects_unknown_cell() {
        let mut world = World::new(BoardShape::square(2));
        assert!(!world.set_units(Position::new(9, 9), vec![Unit::new(1)]));
        assert_eq!(world.len(), 4);
        assert!(world.set_units(Position::new(1, 1), vec![Unit::new(1)]));
        assert_eq!(world.units_of(1), 1);
    }

    #[test]
    fn test_unit_counts_include_absent_players() {
        let world = World::new(BoardShape::square(3)).with_units(Position::new(1, 1), vec![Unit::new(1)]);
        let counts = world.unit_counts(2);
        assert_eq!(counts.get(&1), Some(&1));
        assert_eq!(counts.get(&2), Some(&0));
    }

    #[test]
    fn test_world_serializes_as_tile_list() {
        let world = World::new(BoardShape::square(2)).with_units(Position::new(0, 1), vec![Unit::new(2)]);
        let json = serde_json::to_string(&world).unwrap();
        let back: World = serde_json::from_str(&json).unwrap();
        assert_eq!(back, world);
    }

    #[test]
    fn test_bounds() {
        let world = World::new(BoardShape::Hexagonal { radius: 1 });
        let (lo, hi) = world.bounds().unwrap();
        assert_eq!(lo, Position::new(-1, -1));
        assert_eq!(hi, Position::new(1, 1));
    }
}
