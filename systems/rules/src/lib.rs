#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Rule engine that turns one agent action per tick into world mutations,
//! score changes and the resulting percept.

use wumpus_core::{Action, CellFlags, Coord, Event, Orientation, Percept};
use wumpus_world::World;

/// Flat cost paid for every action except [`Action::NoAction`].
pub const ACTION_COST: i32 = 1;
/// Reward for picking up the gold.
pub const GOLD_REWARD: i32 = 1000;
/// Extra cost of firing the arrow.
pub const ARROW_COST: i32 = 10;
/// Penalty applied on the tick the agent dies.
pub const DEATH_PENALTY: i32 = 1000;

/// Applies actions to a [`World`] and remembers the score and latest percept.
///
/// The engine does not own the world; the host passes it in on every call.
/// Once the world reports a finished game every further action is ignored.
#[derive(Clone, Debug, Default)]
pub struct RuleEngine {
    percept: Percept,
    score: i32,
    last_score: i32,
    tick: u32,
}

impl RuleEngine {
    /// Creates an engine with a zero score at tick zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new game: zero score, zero tick, empty percept.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Current score.
    #[must_use]
    pub fn score(&self) -> i32 {
        self.score
    }

    /// Score change caused by the most recent action.
    #[must_use]
    pub fn reward(&self) -> i32 {
        self.score - self.last_score
    }

    /// Number of actions accepted since the last reset.
    #[must_use]
    pub fn tick(&self) -> u32 {
        self.tick
    }

    /// Latest percept tagged with the current tick, or `None` once the game
    /// has finished.
    #[must_use]
    pub fn percept(&self, world: &World) -> Option<Percept> {
        if world.game_finished() {
            return None;
        }
        Some(self.percept.at(self.tick))
    }

    /// Applies a single action to the world.
    ///
    /// Precondition violations such as grabbing without gold present or
    /// shooting without an arrow are absorbed: they cost the flat action fee
    /// and change nothing else.
    pub fn apply(&mut self, action: Action, world: &mut World, out_events: &mut Vec<Event>) {
        self.percept = Percept::default();

        if world.game_finished() {
            return;
        }

        let Some(agent) = world.agent_location() else {
            tracing::warn!(%action, "ignoring action, no agent placed in the world");
            return;
        };

        self.tick = self.tick.saturating_add(1);
        let orientation = world.orientation();
        let ahead = location_ahead(orientation, agent);

        self.last_score = self.score;
        tracing::debug!(%action, tick = self.tick, %agent, "applying action");
        out_events.push(Event::ActionTaken {
            action,
            tick: self.tick,
        });

        if action != Action::NoAction {
            self.score -= ACTION_COST;
        }

        match action {
            Action::Forward => {
                if world.contains(ahead, CellFlags::WALL) {
                    self.percept.bump = true;
                    out_events.push(Event::Bumped { wall: ahead });
                } else {
                    world.set_agent_location(ahead);
                    out_events.push(Event::AgentMoved {
                        from: agent,
                        to: ahead,
                    });
                }
            }
            Action::Grab => {
                if world.contains(agent, CellFlags::GOLD) {
                    world.set_has_gold(true);
                    self.score += GOLD_REWARD;
                    world.remove_flags(agent, CellFlags::GOLD);
                    out_events.push(Event::GoldGrabbed { cell: agent });
                }
            }
            Action::Shoot => {
                if world.has_arrow() {
                    self.score -= ARROW_COST;
                    out_events.push(Event::ArrowShot);
                    let hit = trace_arrow(world, orientation, ahead);
                    world.set_has_arrow(false);
                    if let Some(cell) = hit {
                        world.set_wumpus_alive(false);
                        self.percept.scream = true;
                        out_events.push(Event::WumpusKilled { cell });
                    }
                }
            }
            Action::Climb => {
                if world.start_location() == Some(agent) {
                    tracing::info!(score = self.score, "agent climbed out of the cave");
                    world.set_climbed_out();
                    out_events.push(Event::ClimbedOut);
                    self.report_score(out_events);
                    return;
                }
            }
            Action::TurnRight => {
                world.set_orientation(orientation.turned_right().degrees());
            }
            Action::TurnLeft => {
                world.set_orientation(orientation.turned_left().degrees());
            }
            Action::NoAction => {}
        }

        if world.agent_killed() {
            self.score -= DEATH_PENALTY;
            if let Some(cell) = world.agent_location() {
                tracing::info!(%cell, "agent was killed");
                out_events.push(Event::AgentKilled { cell });
            }
        }

        self.report_score(out_events);
        self.calc_percepts(world);
    }

    fn report_score(&self, out_events: &mut Vec<Event>) {
        if self.score != self.last_score {
            out_events.push(Event::ScoreChanged {
                from: self.last_score,
                to: self.score,
            });
        }
    }

    fn calc_percepts(&mut self, world: &World) {
        let Some(agent) = world.agent_location() else {
            return;
        };
        for neighbor in agent.neighbors() {
            self.percept.stench |= world.contains(neighbor, CellFlags::WUMPUS);
            self.percept.breeze |= world.contains(neighbor, CellFlags::PIT);
        }
        self.percept.glitter = world.contains(agent, CellFlags::GOLD);
    }
}

/// Cell one step ahead of `cell` along `orientation`.
///
/// Orientations other than the four cardinal values, and steps that would
/// leave the `i32` coordinate range, return `cell` unchanged.
#[must_use]
pub fn location_ahead(orientation: Orientation, cell: Coord) -> Coord {
    let step = match orientation.degrees() {
        0 => cell.checked_offset(1, 0),
        90 => cell.checked_offset(0, 1),
        180 => cell.checked_offset(-1, 0),
        270 => cell.checked_offset(0, -1),
        _ => None,
    };
    step.unwrap_or(cell)
}

/// Follows the arrow from `from` until it meets a wall, leaves the written
/// part of the world, or hits the living wumpus.
fn trace_arrow(world: &World, orientation: Orientation, from: Coord) -> Option<Coord> {
    if !world.wumpus_alive() {
        return None;
    }
    let bounds = world.bounds()?;
    let mut cell = from;
    while bounds.contains(cell) && !world.contains(cell, CellFlags::WALL) {
        if world.contains(cell, CellFlags::WUMPUS) {
            return Some(cell);
        }
        let next = location_ahead(orientation, cell);
        if next == cell {
            break;
        }
        cell = next;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_ahead_follows_cardinals() {
        let origin = Coord::new(4, 4);
        assert_eq!(location_ahead(Orientation::EAST, origin), Coord::new(5, 4));
        assert_eq!(location_ahead(Orientation::NORTH, origin), Coord::new(4, 5));
        assert_eq!(location_ahead(Orientation::WEST, origin), Coord::new(3, 4));
        assert_eq!(location_ahead(Orientation::SOUTH, origin), Coord::new(4, 3));
    }

    #[test]
    fn location_ahead_ignores_non_cardinal_orientation() {
        let origin = Coord::new(4, 4);
        assert_eq!(location_ahead(Orientation::from_degrees(45), origin), origin);
        assert_eq!(location_ahead(Orientation::from_degrees(-90), origin), origin);
    }

    #[test]
    fn location_ahead_stops_at_the_coordinate_range() {
        let edge = Coord::new(i32::MAX, i32::MIN);
        assert_eq!(location_ahead(Orientation::EAST, edge), edge);
        assert_eq!(location_ahead(Orientation::SOUTH, edge), edge);
        assert_eq!(
            location_ahead(Orientation::WEST, edge),
            Coord::new(i32::MAX - 1, i32::MIN)
        );
    }

    #[test]
    fn arrow_fired_at_the_edge_of_the_range_terminates() {
        let mut world = World::new();
        world.set_agent_location(Coord::new(i32::MAX, 0));
        world.set_wumpus_location(Coord::new(1, 0));
        assert_eq!(
            trace_arrow(&world, Orientation::EAST, Coord::new(i32::MAX, 0)),
            None
        );
    }

    #[test]
    fn arrow_stops_at_walls() {
        let mut world = World::new();
        world.set_square(Coord::new(2, 0), CellFlags::GROUND | CellFlags::WALL);
        world.set_wumpus_location(Coord::new(3, 0));
        assert_eq!(trace_arrow(&world, Orientation::EAST, Coord::new(1, 0)), None);
    }

    #[test]
    fn arrow_leaves_the_world_without_hitting() {
        let mut world = World::new();
        world.set_wumpus_location(Coord::new(0, 2));
        assert_eq!(trace_arrow(&world, Orientation::EAST, Coord::new(1, 0)), None);
    }

    #[test]
    fn arrow_hits_wumpus_in_line() {
        let mut world = World::new();
        world.set_wumpus_location(Coord::new(0, 2));
        assert_eq!(
            trace_arrow(&world, Orientation::NORTH, Coord::new(0, 1)),
            Some(Coord::new(0, 2))
        );
    }

    #[test]
    fn percept_is_absent_after_game_finished() {
        let mut world = World::new();
        let engine = RuleEngine::new();
        assert!(engine.percept(&world).is_some());
        world.set_climbed_out();
        assert!(engine.percept(&world).is_none());
    }

    #[test]
    fn reset_clears_score_and_tick() {
        let mut world = World::new();
        let mut engine = RuleEngine::new();
        let mut events = Vec::new();
        engine.apply(Action::TurnLeft, &mut world, &mut events);
        assert_eq!(engine.score(), -1);
        assert_eq!(engine.tick(), 1);

        engine.reset();
        assert_eq!(engine.score(), 0);
        assert_eq!(engine.reward(), 0);
        assert_eq!(engine.tick(), 0);
    }
}
