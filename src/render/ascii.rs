//! ASCII board renderer for terminal viewing.

#![allow(clippy::format_push_string)]

use crate::game::{PLAYER_ONE, PLAYER_TWO, Position, World};

/// ANSI color codes for players one and two.
const PLAYER_COLORS: [&str; 2] = [
    "\x1b[31m", // Player 1: Red
    "\x1b[34m", // Player 2: Blue
];

const RESET: &str = "\x1b[0m";
const DIM: &str = "\x1b[2m";

/// Shown instead of a zero count.
const EMPTY: &str = "•";

/// Width of one rendered cell, without the leading `|`.
const CELL_WIDTH: usize = 5;

/// Render the board as a grid of `P1 P2` unit counts.
///
/// Output format:
/// ```text
///     |  0  |  1  |  2  |
///     -------------------
///  0  | • • | • • | • • |
///  1  | 2 • | • • | • 2 |
///     -------------------
///      P1 P2 P1 P2 P1 P2
/// ```
///
/// Positions inside the bounding box that are not cells (hexagonal boards)
/// are left blank.
#[must_use]
pub fn render_world(world: &World, color: bool) -> String {
    let Some((lo, hi)) = world.bounds() else {
        return String::from("(empty board)\n");
    };
    let columns = usize::try_from(hi.x - lo.x + 1).unwrap_or(0);
    let rule = format!("    {}\n", "-".repeat(columns * (CELL_WIDTH + 1) + 1));

    let mut output = String::from("    ");
    for x in lo.x..=hi.x {
        output.push_str(&format!("|{x:^CELL_WIDTH$}"));
    }
    output.push_str("|\n");
    output.push_str(&rule);

    for y in lo.y..=hi.y {
        output.push_str(&format!("{y:2}  "));
        for x in lo.x..=hi.x {
            output.push('|');
            output.push_str(&render_cell(world, Position::new(x, y), color));
        }
        output.push_str("|\n");
    }

    output.push_str(&rule);
    output.push_str(&format!("     {}\n", "P1 P2 ".repeat(columns)));
    output
}

/// One cell, exactly [`CELL_WIDTH`] visible characters wide.
fn render_cell(world: &World, pos: Position, color: bool) -> String {
    let Some(tile) = world.get(pos) else {
        return " ".repeat(CELL_WIDTH);
    };
    let one = count_text(tile.count_owned_by(PLAYER_ONE), 0, color);
    let two = count_text(tile.count_owned_by(PLAYER_TWO), 1, color);
    format!("{} {}", pad_left(&one.0, one.1, 2), pad_right(&two.0, two.1, 2))
}

/// Display text and its visible width.
fn count_text(count: u32, seat: usize, color: bool) -> (String, usize) {
    if count == 0 {
        let text = if color {
            format!("{DIM}{EMPTY}{RESET}")
        } else {
            EMPTY.to_string()
        };
        return (text, 1);
    }
    let digits = count.to_string();
    let width = digits.len();
    if color {
        (format!("{}{digits}{RESET}", PLAYER_COLORS[seat]), width)
    } else {
        (digits, width)
    }
}

fn pad_left(text: &str, visible: usize, width: usize) -> String {
    format!("{}{text}", " ".repeat(width.saturating_sub(visible)))
}

fn pad_right(text: &str, visible: usize, width: usize) -> String {
    format!("{text}{}", " ".repeat(width.saturating_sub(visible)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{BoardShape, Unit};

    #[test]
    fn test_plain_grid() {
        let world = World::new(BoardShape::square(2))
            .with_units(Position::new(0, 1), vec![Unit::new(1), Unit::new(1)])
            .with_units(Position::new(1, 0), vec![Unit::new(2)]);
        let text = render_world(&world, false);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "    |  0  |  1  |");
        assert_eq!(lines[1], "    -------------");
        assert_eq!(lines[2], " 0  | • • | • 1 |");
        assert_eq!(lines[3], " 1  | 2 • | • • |");
        assert_eq!(lines[5], "     P1 P2 P1 P2 ");
    }

    #[test]
    fn test_colored_grid_keeps_counts() {
        let world = World::new(BoardShape::square(2)).with_units(Position::new(0, 0), vec![Unit::new(1)]);
        let text = render_world(&world, true);
        assert!(text.contains("\x1b[31m1\x1b[0m"));
    }

    #[test]
    fn test_hex_board_blanks_non_cells() {
        let world = World::new(BoardShape::Hexagonal { radius: 1 });
        let text = render_world(&world, false);
        // (-1, -1) and (1, 1) are outside a radius-1 hexagon.
        assert!(text.lines().nth(2).unwrap().starts_with("-1  |     |"));
    }

    #[test]
    fn test_empty_world() {
        assert_eq!(render_world(&World::default(), false), "(empty board)\n");
    }
}
