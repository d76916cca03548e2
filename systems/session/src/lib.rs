#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Game host that paces the rule engine, tracks the pause flag and reports
//! lifecycle changes to an observer.

use wumpus_core::{Action, CellFlags, EnvironmentState, Event, Outcome, Percept};
use wumpus_system_rules::RuleEngine;
use wumpus_world::World;

/// Name under which the single controllable agent is registered.
pub const ENTITY_NAME: &str = "caveExplorer";

/// Errors reported by [`Session::perform`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// The session is paused or the game already finished.
    #[error("the game is not running")]
    NotRunning,
}

/// Receives lifecycle notifications from a [`Session`].
///
/// Every method defaults to a no-op so observers only implement what they
/// care about.
pub trait EnvironmentObserver {
    /// Called whenever the environment enters a different state.
    fn state_changed(&mut self, state: EnvironmentState) {
        let _ = state;
    }

    /// Called when the controllable entity becomes available.
    fn entity_registered(&mut self, name: &str) {
        let _ = name;
    }

    /// Called when the controllable entity goes away.
    fn entity_unregistered(&mut self, name: &str) {
        let _ = name;
    }
}

/// Observer that ignores every notification.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullObserver;

impl EnvironmentObserver for NullObserver {}

/// Owns a world, the rule engine and the pause flag of one running game.
#[derive(Debug)]
pub struct Session<O> {
    world: World,
    engine: RuleEngine,
    observer: O,
    paused: bool,
    state: Option<EnvironmentState>,
    entity_registered: bool,
}

impl<O: EnvironmentObserver> Session<O> {
    /// Creates a paused session around `world` without notifying anyone.
    ///
    /// Call [`Session::init`] to announce the session to the observer.
    pub fn new(world: World, observer: O) -> Self {
        Self {
            world,
            engine: RuleEngine::new(),
            observer,
            paused: true,
            state: None,
            entity_registered: false,
        }
    }

    /// Announces the session and prepares a fresh game.
    pub fn init(&mut self) {
        self.notify(EnvironmentState::Initializing);
        self.reset();
    }

    /// Restarts the game on the current terrain and pauses it.
    pub fn reset(&mut self) {
        self.engine.reset();
        self.world.reset();
        self.paused = true;
        self.notify(EnvironmentState::Paused);
        if !self.entity_registered {
            self.entity_registered = true;
            self.observer.entity_registered(ENTITY_NAME);
        }
        tracing::debug!("session reset");
    }

    /// Lets actions through.
    pub fn start(&mut self) {
        self.set_paused(false);
    }

    /// Blocks actions until the session is started again.
    pub fn pause(&mut self) {
        self.set_paused(true);
    }

    /// Switches between the paused and running modes.
    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
        if paused {
            self.notify(EnvironmentState::Paused);
        } else {
            self.notify(EnvironmentState::Running);
        }
    }

    /// Reports whether the session is paused.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// A session runs while it is not paused and the game is not over.
    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.paused && !self.world.game_finished()
    }

    /// Runs one perception-action cycle regardless of the pause flag.
    ///
    /// Does nothing once the game is over. When this step ends the game the
    /// observer sees the environment go back to initializing and the entity
    /// disappear.
    pub fn next_step(&mut self, action: Action, out_events: &mut Vec<Event>) {
        if self.world.game_finished() {
            return;
        }

        self.engine.apply(action, &mut self.world, out_events);

        if self.world.game_finished() {
            tracing::info!(
                score = self.engine.score(),
                outcome = ?self.outcome(),
                "game finished"
            );
            self.notify(EnvironmentState::Initializing);
            self.unregister_entity();
        }
    }

    /// Runs one step on behalf of the agent, refusing when not running.
    pub fn perform(
        &mut self,
        action: Action,
        out_events: &mut Vec<Event>,
    ) -> Result<(), SessionError> {
        if !self.is_running() {
            tracing::warn!(%action, "rejecting action, game is not running");
            return Err(SessionError::NotRunning);
        }
        self.next_step(action, out_events);
        Ok(())
    }

    /// Swaps in a freshly authored or loaded world and restarts the game on it.
    pub fn replace_world(&mut self, world: World) {
        self.world = world;
        self.reset();
    }

    /// Shuts the environment down.
    pub fn kill(&mut self) {
        self.unregister_entity();
        self.notify(EnvironmentState::Killed);
    }

    /// Latest percept, or `None` once the game is over.
    #[must_use]
    pub fn percept(&self) -> Option<Percept> {
        self.engine.percept(&self.world)
    }

    /// Current score.
    #[must_use]
    pub fn score(&self) -> i32 {
        self.engine.score()
    }

    /// Score change caused by the latest action.
    #[must_use]
    pub fn reward(&self) -> i32 {
        self.engine.reward()
    }

    /// Number of actions taken in this game.
    #[must_use]
    pub fn time(&self) -> u32 {
        self.engine.tick()
    }

    /// Read-only access to the world being played.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Most recently announced environment state.
    #[must_use]
    pub fn state(&self) -> Option<EnvironmentState> {
        self.state
    }

    /// Read-only access to the observer.
    #[must_use]
    pub fn observer(&self) -> &O {
        &self.observer
    }

    /// How the game ended, or `None` while it is still going.
    #[must_use]
    pub fn outcome(&self) -> Option<Outcome> {
        if !self.world.game_finished() {
            return None;
        }
        let agent = self.world.agent_location();
        let outcome = if agent.is_some() && agent == self.world.wumpus_location() {
            Outcome::EatenByWumpus
        } else if agent.is_some_and(|cell| self.world.contains(cell, CellFlags::PIT)) {
            Outcome::FellIntoPit
        } else if self.world.has_gold() {
            Outcome::ClimbedOutRich
        } else {
            Outcome::ClimbedOutEmptyHanded
        };
        Some(outcome)
    }

    fn notify(&mut self, state: EnvironmentState) {
        if self.state == Some(state) {
            return;
        }
        self.state = Some(state);
        tracing::debug!(?state, "environment state changed");
        self.observer.state_changed(state);
    }

    fn unregister_entity(&mut self) {
        if self.entity_registered {
            self.entity_registered = false;
            self.observer.entity_unregistered(ENTITY_NAME);
        }
    }
}
