#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for the Wumpus World simulator.

mod grid;

use wumpus_core::{Bounds, CellFlags, Command, Coord, Event, Orientation};

pub use grid::GridStore;

const DEFAULT_START: Coord = Coord::new(0, 0);
const DEFAULT_GOLD: Coord = Coord::new(2, 2);

/// Represents the authoritative cave together with the agent's status.
///
/// The agent, wumpus, gold and start locations are each owned by a single
/// field; the matching grid flag is kept in sync on every relocation so that
/// exactly one cell carries each of them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct World {
    grid: GridStore,
    agent: Option<Coord>,
    wumpus: Option<Coord>,
    gold: Option<Coord>,
    start: Option<Coord>,
    orientation: Orientation,
    has_arrow: bool,
    has_gold: bool,
    climbed_out: bool,
    wumpus_alive: bool,
}

impl World {
    /// Creates a world with the start at (0,0), gold at (2,2) and the agent
    /// standing on the start cell.
    #[must_use]
    pub fn new() -> Self {
        let mut world = Self {
            grid: GridStore::new(),
            agent: None,
            wumpus: None,
            gold: None,
            start: None,
            orientation: Orientation::EAST,
            has_arrow: true,
            has_gold: false,
            climbed_out: false,
            wumpus_alive: true,
        };
        world.set_start_location(DEFAULT_START);
        world.set_gold_location(DEFAULT_GOLD);
        world.reset();
        world
    }

    /// Restores the dynamic game state without touching the authored terrain.
    pub fn reset(&mut self) {
        self.set_orientation(0);
        if let Some(start) = self.start {
            self.set_agent_location(start);
        }
        self.has_arrow = true;
        self.has_gold = false;
        self.climbed_out = false;
        self.wumpus_alive = true;

        self.recompute_breeze();
        self.recompute_smell();
        if let Some(gold) = self.gold {
            let flags = self.grid.get(gold) | CellFlags::GOLD;
            self.grid.set(gold, flags);
        }
        tracing::debug!(agent = ?self.agent, "world reset");
    }

    /// Read-only access to the underlying grid.
    #[must_use]
    pub fn grid(&self) -> &GridStore {
        &self.grid
    }

    /// Flags stored for the cell.
    #[must_use]
    pub fn square(&self, cell: Coord) -> CellFlags {
        self.grid.get(cell)
    }

    /// Overwrites the full mask of the cell.
    pub fn set_square(&mut self, cell: Coord, flags: CellFlags) {
        self.grid.set(cell, flags);
    }

    /// Merges flags into the cell, grounding it when absent.
    pub fn add_flags(&mut self, cell: Coord, flags: CellFlags) {
        self.grid.add_flags(cell, flags);
    }

    /// Clears flags from the cell; removing `GROUND` or `CLEAR` wipes it.
    pub fn remove_flags(&mut self, cell: Coord, flags: CellFlags) {
        self.grid.remove_flags(cell, flags);
    }

    /// Reports whether every bit of `flags` is set in the cell.
    #[must_use]
    pub fn contains(&self, cell: Coord, flags: CellFlags) -> bool {
        self.grid.contains(cell, flags)
    }

    /// Smallest rectangle covering every coordinate ever written.
    #[must_use]
    pub fn bounds(&self) -> Option<Bounds> {
        self.grid.bounds()
    }

    /// Moves the agent, clearing the flag at its previous location.
    pub fn set_agent_location(&mut self, cell: Coord) {
        relocate(&mut self.grid, &mut self.agent, cell, CellFlags::AGENT);
    }

    /// Current agent location, if one was ever set.
    #[must_use]
    pub fn agent_location(&self) -> Option<Coord> {
        self.agent
    }

    /// Moves the wumpus, clearing the flag at its previous location.
    pub fn set_wumpus_location(&mut self, cell: Coord) {
        relocate(&mut self.grid, &mut self.wumpus, cell, CellFlags::WUMPUS);
    }

    /// Current wumpus location, if one was ever set.
    #[must_use]
    pub fn wumpus_location(&self) -> Option<Coord> {
        self.wumpus
    }

    /// Moves the gold, clearing the flag at its previous location.
    pub fn set_gold_location(&mut self, cell: Coord) {
        relocate(&mut self.grid, &mut self.gold, cell, CellFlags::GOLD);
    }

    /// Current gold location, if one was ever set.
    #[must_use]
    pub fn gold_location(&self) -> Option<Coord> {
        self.gold
    }

    /// Moves the start cell, clearing the flag at its previous location.
    pub fn set_start_location(&mut self, cell: Coord) {
        relocate(&mut self.grid, &mut self.start, cell, CellFlags::START);
    }

    /// Current start location, if one was ever set.
    #[must_use]
    pub fn start_location(&self) -> Option<Coord> {
        self.start
    }

    /// Stores `degrees % 360` as the agent's facing.
    pub fn set_orientation(&mut self, degrees: i32) {
        self.orientation = Orientation::from_degrees(degrees);
    }

    /// Agent facing.
    #[must_use]
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Records whether the agent still carries its arrow.
    pub fn set_has_arrow(&mut self, has_arrow: bool) {
        self.has_arrow = has_arrow;
    }

    /// Reports whether the agent still carries its arrow.
    #[must_use]
    pub fn has_arrow(&self) -> bool {
        self.has_arrow
    }

    /// Records whether the agent carries the gold.
    pub fn set_has_gold(&mut self, has_gold: bool) {
        self.has_gold = has_gold;
    }

    /// Reports whether the agent carries the gold.
    #[must_use]
    pub fn has_gold(&self) -> bool {
        self.has_gold
    }

    /// Marks the agent as having left the cave.
    pub fn set_climbed_out(&mut self) {
        self.climbed_out = true;
    }

    /// Reports whether the agent left the cave.
    #[must_use]
    pub fn climbed_out(&self) -> bool {
        self.climbed_out
    }

    /// Records whether the wumpus is alive.
    pub fn set_wumpus_alive(&mut self, alive: bool) {
        self.wumpus_alive = alive;
    }

    /// Reports whether the wumpus is alive.
    #[must_use]
    pub fn wumpus_alive(&self) -> bool {
        self.wumpus_alive
    }

    /// The agent dies on a cell holding the living wumpus or a pit.
    #[must_use]
    pub fn agent_killed(&self) -> bool {
        let Some(agent) = self.agent else {
            return false;
        };
        let eaten = self.grid.contains(agent, CellFlags::WUMPUS) && self.wumpus_alive;
        eaten || self.grid.contains(agent, CellFlags::PIT)
    }

    /// The game ends when the agent climbed out or died.
    #[must_use]
    pub fn game_finished(&self) -> bool {
        self.climbed_out || self.agent_killed()
    }

    /// A game can run when an agent is placed and alive.
    #[must_use]
    pub fn is_runnable(&self) -> bool {
        self.agent.is_some() && !self.agent_killed()
    }

    /// Rebuilds every breeze from the current pits.
    pub fn recompute_breeze(&mut self) {
        for cell in self.grid.cells_with(CellFlags::BREEZE) {
            self.grid.remove_flags(cell, CellFlags::BREEZE);
        }
        for pit in self.grid.cells_with(CellFlags::PIT) {
            for neighbor in pit.neighbors() {
                mark_nearby(&mut self.grid, neighbor, CellFlags::BREEZE);
            }
        }
    }

    /// Rebuilds the stench around the current wumpus location.
    pub fn recompute_smell(&mut self) {
        for cell in self.grid.cells_with(CellFlags::SMELL) {
            self.grid.remove_flags(cell, CellFlags::SMELL);
        }
        if let Some(wumpus) = self.wumpus {
            for neighbor in wumpus.neighbors() {
                mark_nearby(&mut self.grid, neighbor, CellFlags::SMELL);
            }
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided editor command to the world.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    tracing::debug!(?command, "applying editor command");
    match command {
        Command::PaintGround { cell } => {
            world.set_square(cell, CellFlags::GROUND);
            edited(world, cell, out_events);
        }
        Command::PaintWall { cell } => {
            world.set_square(cell, CellFlags::WALL | CellFlags::GROUND);
            edited(world, cell, out_events);
        }
        Command::EraseWall { cell } => {
            world.remove_flags(cell, CellFlags::WALL);
            edited(world, cell, out_events);
        }
        Command::PaintPit { cell } => {
            world.set_square(cell, CellFlags::PIT | CellFlags::GROUND);
            world.recompute_breeze();
            edited(world, cell, out_events);
        }
        Command::ErasePit { cell } => {
            world.remove_flags(cell, CellFlags::PIT);
            world.recompute_breeze();
            edited(world, cell, out_events);
        }
        Command::PlaceAgent { cell } => {
            world.set_agent_location(cell);
            world.set_start_location(cell);
            edited(world, cell, out_events);
        }
        Command::PlaceWumpus { cell } => {
            if let Some(previous) = world.wumpus_location() {
                for neighbor in previous.neighbors() {
                    world.remove_flags(neighbor, CellFlags::SMELL);
                }
            }
            world.set_wumpus_location(cell);
            for neighbor in cell.neighbors() {
                world.add_flags(neighbor, CellFlags::SMELL);
            }
            edited(world, cell, out_events);
        }
        Command::PlaceGold { cell } => {
            world.set_gold_location(cell);
            edited(world, cell, out_events);
        }
        Command::ClearCell { cell } => {
            world.set_square(cell, CellFlags::CLEAR);
            edited(world, cell, out_events);
        }
        Command::FillGround { region } => {
            for cell in region.cells() {
                world.set_square(cell, CellFlags::GROUND);
                edited(world, cell, out_events);
            }
        }
        Command::ClearRegion { region } => {
            for cell in region.cells() {
                world.set_square(cell, CellFlags::CLEAR);
                edited(world, cell, out_events);
            }
        }
        Command::WallRegion { region } => {
            for cell in region.outline() {
                world.set_square(cell, CellFlags::WALL | CellFlags::GROUND);
                edited(world, cell, out_events);
            }
        }
        Command::Reset => {
            world.reset();
            out_events.push(Event::WorldReset);
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use wumpus_core::{Bounds, CellFlags, Coord, Orientation};

    use super::World;

    /// Singleton locations tracked by the world.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct Landmarks {
        /// Current agent location.
        pub agent: Option<Coord>,
        /// Current wumpus location.
        pub wumpus: Option<Coord>,
        /// Current gold location.
        pub gold: Option<Coord>,
        /// Cell the agent starts from.
        pub start: Option<Coord>,
    }

    /// Immutable snapshot of the agent's status flags.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct AgentStatus {
        /// Cell currently occupied by the agent.
        pub location: Option<Coord>,
        /// Direction the agent faces.
        pub orientation: Orientation,
        /// Indicates whether the arrow is still available.
        pub has_arrow: bool,
        /// Indicates whether the agent picked up the gold.
        pub has_gold: bool,
        /// Indicates whether the agent left the cave.
        pub climbed_out: bool,
        /// Indicates whether the wumpus still lives.
        pub wumpus_alive: bool,
    }

    /// Captures the singleton locations of the world.
    #[must_use]
    pub fn landmarks(world: &World) -> Landmarks {
        Landmarks {
            agent: world.agent,
            wumpus: world.wumpus,
            gold: world.gold,
            start: world.start,
        }
    }

    /// Captures the agent's status flags.
    #[must_use]
    pub fn agent_status(world: &World) -> AgentStatus {
        AgentStatus {
            location: world.agent,
            orientation: world.orientation,
            has_arrow: world.has_arrow,
            has_gold: world.has_gold,
            climbed_out: world.climbed_out,
            wumpus_alive: world.wumpus_alive,
        }
    }

    /// Bounding rectangle an editor should present.
    #[must_use]
    pub fn bounds(world: &World) -> Option<Bounds> {
        world.bounds()
    }

    /// Every stored cell in ascending coordinate order, clear cells included.
    #[must_use]
    pub fn stored_cells(world: &World) -> Vec<(Coord, CellFlags)> {
        world.grid.iter().collect()
    }

    /// Cells that count as cave floor, i.e. carry `GROUND`.
    #[must_use]
    pub fn populated_cells(world: &World) -> Vec<(Coord, CellFlags)> {
        world
            .grid
            .iter()
            .filter(|(_, flags)| flags.contains(CellFlags::GROUND))
            .collect()
    }
}

fn relocate(grid: &mut GridStore, slot: &mut Option<Coord>, cell: Coord, flag: CellFlags) {
    if let Some(previous) = slot.replace(cell) {
        grid.remove_flags(previous, flag);
    }
    grid.add_flags(cell, flag);
}

fn mark_nearby(grid: &mut GridStore, cell: Coord, flag: CellFlags) {
    if grid.get(cell) == CellFlags::CLEAR {
        grid.set(cell, flag);
    } else {
        grid.add_flags(cell, flag);
    }
}

fn edited(world: &World, cell: Coord, out_events: &mut Vec<Event>) {
    out_events.push(Event::CellEdited {
        cell,
        flags: world.square(cell),
    });
}
