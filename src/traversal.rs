use std::collections::HashSet;

use tracing::trace;

use crate::board::Board;
use crate::geometry::{Coordinate, Direction};

/// Compute where a robot sliding from `start` towards `dir` comes to rest.
///
/// The robot stops in front of a wall, the board edge, a blocker cell or any
/// cell in `occupied`. Deflectors whose colour differs from `color` turn the
/// robot and it keeps sliding from the deflector cell; matching deflectors are
/// passed straight through. A ricochet that would revisit a deflector with the
/// same heading never comes to rest and is reported as not moving at all.
///
/// Returns `start` when the robot cannot move.
pub fn resolve(
    board: &Board,
    start: Coordinate,
    dir: Direction,
    occupied: &[Coordinate],
    color: &str,
) -> Coordinate {
    let mut position = start;
    let mut heading = dir;
    // Deflection points seen so far, only allocated once a deflection happens
    let mut deflections: Option<HashSet<(Coordinate, Direction)>> = None;

    loop {
        if board.is_wall_blocking(position, heading) {
            break;
        }

        let candidate = position.translate(heading);
        if !board.in_bounds(candidate) || board.is_blocked_cell(candidate) {
            break;
        }
        if occupied.iter().any(|&pos| pos == candidate && pos != start) {
            break;
        }

        position = candidate;

        if let Some(deflector) = board.deflector_at(position) {
            if !deflector.allows(color) {
                let seen = deflections.get_or_insert_with(HashSet::new);
                if !seen.insert((position, heading)) {
                    trace!(%start, %dir, %position, "ricochet loop, move rejected");
                    return start;
                }
                let turned = deflector.deflect(heading);
                trace!(%position, from = %heading, to = %turned, "deflected");
                heading = turned;
            }
        }
    }

    position
}
