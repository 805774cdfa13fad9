//! Headless text presentation of the world.
//!
//! One glyph per cell, rows top to bottom:
//!
//! | Glyph | Meaning |
//! |-------|---------|
//! | `.` | unvisited |
//! | `+` | visited |
//! | `O` | obstacle, not yet identified |
//! | `#` | obstacle, identified |
//! | `^ > v <` | robot facing north/east/south/west |

use crate::core::types::{Cell, Heading};
use crate::core::world::World;
use std::fmt::Write;
use std::time::Duration;

pub fn cell_glyph(cell: Cell) -> char {
    match cell {
        Cell::Unvisited => '.',
        Cell::Visited => '+',
        Cell::ObstacleUnidentified => 'O',
        Cell::ObstacleIdentified => '#',
        Cell::RobotOccupied => '@',
    }
}

pub fn heading_glyph(heading: Heading) -> char {
    match heading {
        Heading::North => '^',
        Heading::East => '>',
        Heading::South => 'v',
        Heading::West => '<',
    }
}

/// Draw the grid; the robot cell shows the heading arrow
pub fn render_world(world: &World) -> String {
    let grid = world.grid();
    let robot = world.robot();
    let mut out = String::with_capacity((grid.width() + 1) * grid.height());

    for (row, cells) in grid.rows().enumerate() {
        for (col, &cell) in cells.iter().enumerate() {
            let glyph = match robot {
                Some(r) if r.position().as_tuple() == (col, row) => heading_glyph(r.heading()),
                _ => cell_glyph(cell),
            };
            out.push(glyph);
        }
        out.push('\n');
    }
    out
}

pub fn legend() -> String {
    let mut out = String::new();
    let entries = [
        (Cell::Unvisited, "Unvisited"),
        (Cell::Visited, "Visited"),
        (Cell::ObstacleUnidentified, "Obstacle (unidentified)"),
        (Cell::ObstacleIdentified, "Obstacle (identified)"),
    ];
    for (cell, label) in entries {
        let _ = writeln!(out, "{}  {}", cell_glyph(cell), label);
    }
    let arrows: String = Heading::ALL.iter().map(|&h| heading_glyph(h)).collect();
    let _ = writeln!(out, "{}  Robot", arrows);
    out
}

/// "Time: Ns", whole seconds
pub fn elapsed_line(elapsed: Duration) -> String {
    format!("Time: {}s", elapsed.as_secs())
}
