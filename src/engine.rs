//! Step-wise "bounce" game mode.
//!
//! Unlike sliding, a bouncer advances a single cell per step and reverses its
//! heading whenever it runs into an obstruction or lands on a bounce pad.

use std::ops::ControlFlow;

use tracing::trace;

use crate::board::Board;
use crate::geometry::{Coordinate, Direction};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bouncer {
    pub position: Coordinate,
    pub heading: Direction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Advance one cell, reversing on walls, blockers, the board edge and pads.
    Bounce,
    /// Skip the remaining rules of the step once a goal has been reached.
    GoalCheck,
}

impl Rule {
    fn apply(self, board: &Board, bouncer: &mut Bouncer, goals: &[Coordinate]) -> ControlFlow<()> {
        match self {
            Rule::Bounce => {
                let next = bouncer.position.translate(bouncer.heading);
                if board.is_wall_blocking(bouncer.position, bouncer.heading)
                    || !board.is_free(next)
                {
                    bouncer.heading = bouncer.heading.opposite();
                } else {
                    bouncer.position = next;
                    if board.is_bounce_pad(next) {
                        bouncer.heading = bouncer.heading.opposite();
                    }
                }
                trace!(position = %bouncer.position, heading = %bouncer.heading, "bounce");
                ControlFlow::Continue(())
            }
            Rule::GoalCheck => {
                if goals.contains(&bouncer.position) {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            }
        }
    }
}

/// Outcome of `Engine::run_until_goal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Run {
    pub bouncer: Bouncer,
    pub steps: usize,
    pub reached: bool,
}

pub struct Engine {
    rules: Vec<Rule>,
}

impl Engine {
    pub fn new(rules: impl IntoIterator<Item = Rule>) -> Self {
        Engine {
            rules: rules.into_iter().collect(),
        }
    }

    /// Apply every rule once, in order.
    pub fn step(&self, board: &Board, bouncer: &mut Bouncer, goals: &[Coordinate]) {
        for rule in &self.rules {
            if rule.apply(board, bouncer, goals).is_break() {
                break;
            }
        }
    }

    pub fn run_until_goal(
        &self,
        board: &Board,
        mut bouncer: Bouncer,
        goals: &[Coordinate],
        max_steps: usize,
    ) -> Run {
        let mut steps = 0;
        while steps < max_steps && !goals.contains(&bouncer.position) {
            self.step(board, &mut bouncer, goals);
            steps += 1;
        }
        Run {
            bouncer,
            steps,
            reached: goals.contains(&bouncer.position),
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Engine::new([Rule::GoalCheck, Rule::Bounce])
    }
}
