//! Subcommand implementations.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use wumpus_core::{
    Action, CellFlags, CellRegion, Command as EditorCommand, Coord, EnvironmentState, Event,
    Outcome,
};
use wumpus_system_persistence::{load_from_path, save_to_path};
use wumpus_system_session::{EnvironmentObserver, Session};
use wumpus_world::{apply, query, World};

use crate::{config::CliConfig, world_transfer};

/// Author a new world and save it.
#[derive(Debug, Args)]
pub(crate) struct NewArgs {
    /// Where to write the world file
    #[arg(long, value_name = "FILE")]
    out: PathBuf,

    /// Cell the agent starts on
    #[arg(long, value_name = "X,Y", value_parser = parse_coord)]
    start: Option<Coord>,

    /// Cell holding the gold
    #[arg(long, value_name = "X,Y", value_parser = parse_coord)]
    gold: Option<Coord>,

    /// Cell holding the wumpus
    #[arg(long, value_name = "X,Y", value_parser = parse_coord)]
    wumpus: Option<Coord>,

    /// Cell holding a pit; repeat for more pits
    #[arg(long = "pit", value_name = "X,Y", value_parser = parse_coord)]
    pits: Vec<Coord>,

    /// Cell holding a wall; repeat for more walls
    #[arg(long = "wall", value_name = "X,Y", value_parser = parse_coord)]
    walls: Vec<Coord>,

    /// Ground a W by H cave at the origin and wall it in
    #[arg(long, value_name = "W,H", value_parser = parse_size)]
    size: Option<CaveSize>,
}

impl NewArgs {
    pub(crate) fn execute(self) -> Result<()> {
        let world = self.build_world();
        save_to_path(&world, &self.out)
            .with_context(|| format!("failed to write world file {}", self.out.display()))?;
        println!(
            "wrote {} cells to {}",
            world.grid().len(),
            self.out.display()
        );
        Ok(())
    }

    fn build_world(&self) -> World {
        let mut world = World::new();
        let mut commands = Vec::new();

        if let Some(size) = self.size {
            let last = Coord::new(size.width - 1, size.height - 1);
            let outside = Coord::new(size.width, size.height);
            commands.push(EditorCommand::FillGround {
                region: CellRegion::between(Coord::new(0, 0), last),
            });
            commands.push(EditorCommand::WallRegion {
                region: CellRegion::between(Coord::new(-1, -1), outside),
            });
        }
        commands.extend(self.walls.iter().map(|&cell| EditorCommand::PaintWall { cell }));
        commands.extend(self.pits.iter().map(|&cell| EditorCommand::PaintPit { cell }));
        if let Some(cell) = self.wumpus {
            commands.push(EditorCommand::PlaceWumpus { cell });
        }
        if let Some(cell) = self.gold.or(world.gold_location()) {
            commands.push(EditorCommand::PlaceGold { cell });
        }
        if let Some(cell) = self.start.or(world.start_location()) {
            commands.push(EditorCommand::PlaceAgent { cell });
        }

        let mut events = Vec::new();
        for command in commands {
            apply(&mut world, command, &mut events);
        }
        tracing::debug!(edits = events.len(), "authored world");
        world
    }
}

/// Play a world by feeding it a list of actions.
#[derive(Debug, Args)]
pub(crate) struct PlayArgs {
    /// World file to play; defaults to the configured world or a fresh cave
    #[arg(long, value_name = "FILE")]
    world: Option<PathBuf>,

    /// Actions to take, e.g. forward turn(left) grab shoot climb
    #[arg(value_name = "ACTION")]
    actions: Vec<String>,
}

impl PlayArgs {
    pub(crate) fn execute(self, config: &CliConfig) -> Result<()> {
        let world = match self.world.as_ref().or(config.world.as_ref()) {
            Some(path) => load_from_path(path)
                .with_context(|| format!("failed to load world file {}", path.display()))?,
            None => World::new(),
        };
        if !world.is_runnable() {
            bail!("the world has no living agent to play");
        }

        let mut session = Session::new(world, LoggingObserver);
        session.init();
        if !config.session.start_paused {
            session.start();
        }

        let mut events = Vec::new();
        for token in &self.actions {
            if session.world().game_finished() {
                tracing::warn!(%token, "game already finished, ignoring remaining actions");
                break;
            }
            let action = Action::parse(token);
            events.clear();
            if session.is_paused() {
                session.next_step(action, &mut events);
            } else {
                session.perform(action, &mut events)?;
            }
            for event in &events {
                tracing::debug!(?event, "game event");
            }
            println!("{}", tick_line(session.time(), action, &events, session.score()));
            if let Some(percept) = session.percept() {
                println!("    {percept}");
            }
        }

        match session.outcome() {
            Some(outcome) => println!("outcome: {}", describe_outcome(outcome)),
            None => println!("game still running after {} ticks", session.time()),
        }
        println!("final score: {}", session.score());
        session.kill();
        Ok(())
    }
}

/// Print the contents of a world file.
#[derive(Debug, Args)]
pub(crate) struct InspectArgs {
    /// World file to inspect
    #[arg(long, value_name = "FILE")]
    world: PathBuf,
}

impl InspectArgs {
    pub(crate) fn execute(self) -> Result<()> {
        let world = load_from_path(&self.world)
            .with_context(|| format!("failed to load world file {}", self.world.display()))?;

        match query::bounds(&world) {
            Some(bounds) => println!(
                "bounds: x={} y={} width={} height={}",
                bounds.x(),
                bounds.y(),
                bounds.width(),
                bounds.height()
            ),
            None => println!("bounds: empty"),
        }
        let landmarks = query::landmarks(&world);
        println!("start: {}", describe_location(landmarks.start));
        println!("agent: {}", describe_location(landmarks.agent));
        println!("wumpus: {}", describe_location(landmarks.wumpus));
        println!("gold: {}", describe_location(landmarks.gold));
        println!("cells:");
        for (cell, flags) in query::stored_cells(&world) {
            println!("  {cell} {}", flag_names(flags));
        }
        Ok(())
    }
}

/// Print a world file as a single-line transfer string.
#[derive(Debug, Args)]
pub(crate) struct ExportArgs {
    /// World file to export
    #[arg(long, value_name = "FILE")]
    world: PathBuf,
}

impl ExportArgs {
    pub(crate) fn execute(self) -> Result<()> {
        let world = load_from_path(&self.world)
            .with_context(|| format!("failed to load world file {}", self.world.display()))?;
        let encoded = world_transfer::encode_world(&world).context("failed to encode world")?;
        println!("{encoded}");
        Ok(())
    }
}

/// Turn a transfer string back into a world file.
#[derive(Debug, Args)]
pub(crate) struct ImportArgs {
    /// Transfer string produced by `export`
    #[arg(value_name = "STRING")]
    value: String,

    /// Where to write the world file
    #[arg(long, value_name = "FILE")]
    out: PathBuf,
}

impl ImportArgs {
    pub(crate) fn execute(self) -> Result<()> {
        let world = world_transfer::decode_world(&self.value).context("invalid world string")?;
        save_to_path(&world, &self.out)
            .with_context(|| format!("failed to write world file {}", self.out.display()))?;
        println!("imported {} cells into {}", world.grid().len(), self.out.display());
        Ok(())
    }
}

/// Width and height of a grounded cave.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct CaveSize {
    width: i32,
    height: i32,
}

struct LoggingObserver;

impl EnvironmentObserver for LoggingObserver {
    fn state_changed(&mut self, state: EnvironmentState) {
        tracing::info!(?state, "environment state changed");
    }

    fn entity_registered(&mut self, name: &str) {
        tracing::info!(%name, "entity registered");
    }

    fn entity_unregistered(&mut self, name: &str) {
        tracing::info!(%name, "entity unregistered");
    }
}

fn parse_pair(value: &str) -> Result<(i32, i32), String> {
    let (first, second) = value
        .split_once(',')
        .ok_or_else(|| format!("expected two comma separated numbers, got '{value}'"))?;
    let first = first
        .trim()
        .parse::<i32>()
        .map_err(|error| format!("invalid number '{first}': {error}"))?;
    let second = second
        .trim()
        .parse::<i32>()
        .map_err(|error| format!("invalid number '{second}': {error}"))?;
    Ok((first, second))
}

fn parse_coord(value: &str) -> Result<Coord, String> {
    let (x, y) = parse_pair(value)?;
    Ok(Coord::new(x, y))
}

fn parse_size(value: &str) -> Result<CaveSize, String> {
    let (width, height) = parse_pair(value)?;
    if width < 1 || height < 1 {
        return Err(format!("cave size must be at least 1,1, got '{value}'"));
    }
    Ok(CaveSize { width, height })
}

fn tick_line(time: u32, action: Action, events: &[Event], score: i32) -> String {
    let mut notes = Vec::new();
    for event in events {
        let note = match event {
            Event::Bumped { .. } => "bump",
            Event::GoldGrabbed { .. } => "gold",
            Event::ArrowShot => "arrow",
            Event::WumpusKilled { .. } => "scream",
            Event::ClimbedOut => "climbed out",
            Event::AgentKilled { .. } => "killed",
            _ => continue,
        };
        notes.push(note);
    }
    let mut line = format!("{time:>4} {:<12} score {score}", action.token());
    if !notes.is_empty() {
        line.push_str(&format!(" [{}]", notes.join(", ")));
    }
    line
}

fn describe_outcome(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::EatenByWumpus => "eaten by the wumpus",
        Outcome::FellIntoPit => "fell into a pit",
        Outcome::ClimbedOutRich => "climbed out with the gold",
        Outcome::ClimbedOutEmptyHanded => "climbed out empty handed",
    }
}

fn describe_location(cell: Option<Coord>) -> String {
    cell.map_or_else(|| "none".to_owned(), |cell| cell.to_string())
}

fn flag_names(flags: CellFlags) -> String {
    if flags.is_empty() {
        return "CLEAR".to_owned();
    }
    flags
        .iter_names()
        .map(|(name, _)| name)
        .collect::<Vec<_>>()
        .join("|")
}
