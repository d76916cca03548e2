#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Wumpus World simulator.
//!
//! This crate defines the vocabulary that connects drivers, the authoritative
//! world, and the rule systems. Editors submit [`Command`] values describing
//! terrain edits, the world executes them via its `apply` entry point, and the
//! rule engine consumes one [`Action`] per tick. Both report what changed as
//! [`Event`] values, while agents observe the cave exclusively through
//! [`Percept`] snapshots.

use std::fmt;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Location of a single cave cell. The grid is unbounded in every direction.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Coord {
    x: i32,
    y: i32,
}

impl Coord {
    /// Creates a new cell coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Horizontal component of the coordinate.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Vertical component of the coordinate.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Returns the coordinate shifted by the provided offsets, or `None` when
    /// the result leaves the `i32` range.
    #[must_use]
    pub const fn checked_offset(self, dx: i32, dy: i32) -> Option<Self> {
        match (self.x.checked_add(dx), self.y.checked_add(dy)) {
            (Some(x), Some(y)) => Some(Self::new(x, y)),
            _ => None,
        }
    }

    /// Orthogonal neighbours of the cell; diagonals are never included and
    /// neighbours beyond the `i32` range are skipped rather than wrapped.
    pub fn neighbors(self) -> impl Iterator<Item = Coord> {
        [(0, 1), (0, -1), (1, 0), (-1, 0)]
            .into_iter()
            .filter_map(move |(dx, dy)| self.checked_offset(dx, dy))
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

bitflags! {
    /// Terrain and item flags stored for a single cell.
    ///
    /// A cell may hold any combination. Only cells carrying [`CellFlags::GROUND`]
    /// count as populated cave floor; the remaining flags are still tracked on
    /// ungrounded cells but such cells are inert for presentation.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct CellFlags: u32 {
        /// Walkable cave floor.
        const GROUND  = 0x001;
        /// Bottomless pit; entering it kills the agent.
        const PIT     = 0x002;
        /// The gold the agent is looking for.
        const GOLD    = 0x004;
        /// Impassable rock that stops movement and arrows.
        const WALL    = 0x008;
        /// Current agent position.
        const AGENT   = 0x010;
        /// Current wumpus position.
        const WUMPUS  = 0x020;
        /// Cell the agent starts from and must climb out of.
        const START   = 0x040;
        /// Draft felt next to a pit.
        const BREEZE  = 0x080;
        /// Stench smelled next to the wumpus.
        const SMELL   = 0x100;
        /// Cell already explored by the agent.
        const VISITED = 0x200;
        /// Cell judged safe.
        const OK      = 0x400;
    }
}

impl CellFlags {
    /// Mask of a cell that is absent from the grid.
    pub const CLEAR: Self = Self::empty();

    /// Reinterprets a signed on-disk mask, keeping unknown bits intact.
    #[must_use]
    pub const fn from_mask(mask: i32) -> Self {
        Self::from_bits_retain(mask as u32)
    }

    /// Signed mask representation used by the world file format.
    #[must_use]
    pub const fn mask(self) -> i32 {
        self.bits() as i32
    }
}

/// Facing direction of the agent measured in degrees counter-clockwise from +x.
///
/// Values are stored modulo 360 using truncating remainder, so only the four
/// cardinal values produced by turning are meaningful to the rules.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Orientation(i32);

impl Orientation {
    /// Facing +x.
    pub const EAST: Self = Self(0);
    /// Facing +y.
    pub const NORTH: Self = Self(90);
    /// Facing -x.
    pub const WEST: Self = Self(180);
    /// Facing -y.
    pub const SOUTH: Self = Self(270);

    /// Creates an orientation from arbitrary degrees, storing `degrees % 360`.
    #[must_use]
    pub const fn from_degrees(degrees: i32) -> Self {
        Self(degrees % 360)
    }

    /// Stored orientation in degrees.
    #[must_use]
    pub const fn degrees(self) -> i32 {
        self.0
    }

    /// Orientation after a quarter turn counter-clockwise.
    #[must_use]
    pub const fn turned_left(self) -> Self {
        Self::from_degrees(self.0 + 90)
    }

    /// Orientation after a quarter turn clockwise.
    #[must_use]
    pub const fn turned_right(self) -> Self {
        Self::from_degrees(self.0 + 270)
    }
}

/// Discrete actions an agent may take during a single tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Step one cell ahead along the current orientation.
    Forward,
    /// Pick up gold lying in the current cell.
    Grab,
    /// Fire the single arrow straight ahead.
    Shoot,
    /// Leave the cave; only succeeds on the start cell.
    Climb,
    /// Quarter turn counter-clockwise.
    TurnLeft,
    /// Quarter turn clockwise.
    TurnRight,
    /// Do nothing and pay nothing.
    NoAction,
}

impl Action {
    /// Every action in protocol code order.
    pub const ALL: [Action; 7] = [
        Action::Forward,
        Action::Grab,
        Action::Shoot,
        Action::Climb,
        Action::TurnRight,
        Action::TurnLeft,
        Action::NoAction,
    ];

    /// Maps an agent-supplied token onto an action.
    ///
    /// Unrecognised tokens are never rejected: they resolve to
    /// [`Action::NoAction`] and a warning is logged.
    #[must_use]
    pub fn parse(token: &str) -> Self {
        match token.trim() {
            "forward" => Self::Forward,
            "grab" => Self::Grab,
            "shoot" => Self::Shoot,
            "climb" => Self::Climb,
            "turn(left)" | "left" => Self::TurnLeft,
            "turn(right)" | "right" => Self::TurnRight,
            "noop" => Self::NoAction,
            other => {
                tracing::warn!(token = other, "ignoring unknown action");
                Self::NoAction
            }
        }
    }

    /// Canonical token accepted by [`Action::parse`].
    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::Forward => "forward",
            Self::Grab => "grab",
            Self::Shoot => "shoot",
            Self::Climb => "climb",
            Self::TurnLeft => "turn(left)",
            Self::TurnRight => "turn(right)",
            Self::NoAction => "noop",
        }
    }

    /// Numeric protocol code of the action.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::Forward => 1,
            Self::Grab => 2,
            Self::Shoot => 3,
            Self::Climb => 4,
            Self::TurnRight => 5,
            Self::TurnLeft => 6,
            Self::NoAction => 7,
        }
    }

    /// Resolves a numeric protocol code, falling back to [`Action::NoAction`].
    #[must_use]
    pub fn from_code(code: i32) -> Self {
        Self::ALL
            .into_iter()
            .find(|action| action.code() == code)
            .unwrap_or_else(|| {
                tracing::warn!(code, "ignoring unknown action code");
                Self::NoAction
            })
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Sensory snapshot valid for exactly one tick.
///
/// Percepts are derived from the world after every action and must never be
/// cached across ticks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Percept {
    /// A pit lies in one of the four neighbouring cells.
    pub breeze: bool,
    /// The wumpus occupies one of the four neighbouring cells.
    pub stench: bool,
    /// The last forward step ran into a wall.
    pub bump: bool,
    /// The last arrow killed the wumpus.
    pub scream: bool,
    /// Gold lies in the agent's cell.
    pub glitter: bool,
    /// Tick at which the percept was produced.
    pub time: u32,
}

impl Percept {
    /// Names of the percepts that are currently active, in protocol order.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        [
            (self.breeze, "breeze"),
            (self.stench, "stench"),
            (self.bump, "bump"),
            (self.scream, "scream"),
            (self.glitter, "glitter"),
        ]
        .into_iter()
        .filter_map(|(active, name)| active.then_some(name))
        .collect()
    }

    /// Same sensory fields tagged with a different tick.
    #[must_use]
    pub const fn at(self, time: u32) -> Self {
        Self { time, ..self }
    }
}

impl fmt::Display for Percept {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = |active: bool, name: &'static str| -> String {
            if active {
                name.to_owned()
            } else {
                format!("no {name}")
            }
        };
        write!(
            f,
            "percept([{},{},{},{},{}],{})",
            label(self.breeze, "breeze"),
            label(self.stench, "stench"),
            label(self.bump, "bump"),
            label(self.scream, "scream"),
            label(self.glitter, "glitter"),
            self.time
        )
    }
}

/// Axis-aligned rectangle in grid coordinates, stored as inclusive minimum
/// and maximum corners so it can span the whole `i32` range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bounds {
    min: Coord,
    max: Coord,
}

impl Bounds {
    /// Single-cell rectangle anchored at the provided coordinate.
    #[must_use]
    pub const fn around(cell: Coord) -> Self {
        Self {
            min: cell,
            max: cell,
        }
    }

    /// Grows the rectangle just enough to contain `cell`.
    pub fn include(&mut self, cell: Coord) {
        self.min = Coord::new(self.min.x().min(cell.x()), self.min.y().min(cell.y()));
        self.max = Coord::new(self.max.x().max(cell.x()), self.max.y().max(cell.y()));
    }

    /// Reports whether the cell lies inside the rectangle.
    #[must_use]
    pub const fn contains(&self, cell: Coord) -> bool {
        cell.x() >= self.min.x()
            && cell.x() <= self.max.x()
            && cell.y() >= self.min.y()
            && cell.y() <= self.max.y()
    }

    /// Lowest x coordinate covered.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.min.x()
    }

    /// Lowest y coordinate covered.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.min.y()
    }

    /// Number of columns covered.
    #[must_use]
    pub const fn width(&self) -> i64 {
        self.max.x() as i64 - self.min.x() as i64 + 1
    }

    /// Number of rows covered.
    #[must_use]
    pub const fn height(&self) -> i64 {
        self.max.y() as i64 - self.min.y() as i64 + 1
    }
}

/// Inclusive block of cells selected by an editor drag, normalised so that
/// `first` holds the minimum corner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CellRegion {
    first: Coord,
    last: Coord,
}

impl CellRegion {
    /// Creates a region spanning both corners inclusively, in any order.
    #[must_use]
    pub fn between(a: Coord, b: Coord) -> Self {
        Self {
            first: Coord::new(a.x().min(b.x()), a.y().min(b.y())),
            last: Coord::new(a.x().max(b.x()), a.y().max(b.y())),
        }
    }

    /// Minimum corner of the region.
    #[must_use]
    pub const fn first(&self) -> Coord {
        self.first
    }

    /// Maximum corner of the region.
    #[must_use]
    pub const fn last(&self) -> Coord {
        self.last
    }

    /// Every cell of the region in column-major order.
    pub fn cells(&self) -> impl Iterator<Item = Coord> {
        let (first, last) = (self.first, self.last);
        (first.x()..=last.x())
            .flat_map(move |x| (first.y()..=last.y()).map(move |y| Coord::new(x, y)))
    }

    /// Cells on the border of the region, each reported once.
    pub fn outline(&self) -> impl Iterator<Item = Coord> {
        let (first, last) = (self.first, self.last);
        self.cells().filter(move |cell| {
            cell.x() == first.x()
                || cell.x() == last.x()
                || cell.y() == first.y()
                || cell.y() == last.y()
        })
    }
}

/// Editor commands that express all permissible terrain mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Overwrites the cell with bare ground.
    PaintGround {
        /// Cell to overwrite.
        cell: Coord,
    },
    /// Overwrites the cell with a grounded wall.
    PaintWall {
        /// Cell to overwrite.
        cell: Coord,
    },
    /// Removes the wall flag from the cell.
    EraseWall {
        /// Cell to edit.
        cell: Coord,
    },
    /// Overwrites the cell with a grounded pit and refreshes breezes.
    PaintPit {
        /// Cell to overwrite.
        cell: Coord,
    },
    /// Removes the pit flag from the cell and refreshes breezes.
    ErasePit {
        /// Cell to edit.
        cell: Coord,
    },
    /// Moves both the agent and its start cell.
    PlaceAgent {
        /// New agent and start location.
        cell: Coord,
    },
    /// Moves the wumpus and the stench around it.
    PlaceWumpus {
        /// New wumpus location.
        cell: Coord,
    },
    /// Moves the gold.
    PlaceGold {
        /// New gold location.
        cell: Coord,
    },
    /// Wipes every flag from the cell.
    ClearCell {
        /// Cell to wipe.
        cell: Coord,
    },
    /// Overwrites every cell of the region with bare ground.
    FillGround {
        /// Region to fill.
        region: CellRegion,
    },
    /// Wipes every cell of the region.
    ClearRegion {
        /// Region to wipe.
        region: CellRegion,
    },
    /// Surrounds the region with grounded walls along its border cells.
    WallRegion {
        /// Region whose outline becomes wall.
        region: CellRegion,
    },
    /// Restores the dynamic game state while keeping the authored terrain.
    Reset,
}

/// Events broadcast after processing commands or actions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// An editor command rewrote a cell.
    CellEdited {
        /// Cell that was edited.
        cell: Coord,
        /// Flags stored in the cell after the edit.
        flags: CellFlags,
    },
    /// The dynamic game state returned to its initial values.
    WorldReset,
    /// The rule engine accepted an action for the current tick.
    ActionTaken {
        /// Action that was applied.
        action: Action,
        /// Tick assigned to the action.
        tick: u32,
    },
    /// The agent moved between two cells.
    AgentMoved {
        /// Cell the agent left.
        from: Coord,
        /// Cell the agent entered.
        to: Coord,
    },
    /// The agent walked into a wall and stayed put.
    Bumped {
        /// Wall cell that blocked the step.
        wall: Coord,
    },
    /// The agent picked up the gold.
    GoldGrabbed {
        /// Cell the gold was taken from.
        cell: Coord,
    },
    /// The agent spent its arrow.
    ArrowShot,
    /// The arrow killed the wumpus.
    WumpusKilled {
        /// Cell where the wumpus died.
        cell: Coord,
    },
    /// The agent left the cave through the start cell.
    ClimbedOut,
    /// The agent entered a deadly cell.
    AgentKilled {
        /// Cell where the agent died.
        cell: Coord,
    },
    /// The score changed during the tick.
    ScoreChanged {
        /// Score before the action.
        from: i32,
        /// Score after the action.
        to: i32,
    },
}

/// Lifecycle states reported to an attached agent platform.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnvironmentState {
    /// A world is being prepared; no game is in progress.
    Initializing,
    /// Actions are accepted.
    Running,
    /// The game exists but actions are refused.
    Paused,
    /// The environment was torn down.
    Killed,
}

/// Classification of a finished game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// The agent walked into the living wumpus.
    EatenByWumpus,
    /// The agent fell into a pit.
    FellIntoPit,
    /// The agent climbed out carrying the gold.
    ClimbedOutRich,
    /// The agent climbed out without the gold.
    ClimbedOutEmptyHanded,
}
