//! Scene sequencing
//!
//! The director owns exactly one active scene. Scenes ask for a transition by
//! returning a `SceneRequest` from `tick`; the session of a finished game
//! travels with the request back to the selection screen.

use crate::Tuning;
use crate::consts::{DEFAULT_CHALLENGE, MAX_CHALLENGE, MIN_CHALLENGE};
use crate::sim::challenge::clamp_challenge_count;
use crate::sim::{GameSession, GameState, RoundPhase, TickInput, tick};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneId {
    Selection,
    Play,
}

/// Transition asked for by the active scene
#[derive(Debug, Clone)]
pub enum SceneRequest {
    StartGame { challenge_count: usize },
    ReturnToSelection { last: GameSession },
}

/// What every scene can do
pub trait Scene {
    fn id(&self) -> SceneId;

    fn on_enter(&mut self) {}

    fn on_exit(&mut self) {}

    /// Buffer input for the next tick
    fn handle_input(&mut self, input: &TickInput);

    /// Advance one fixed step, optionally requesting a transition
    fn tick(&mut self, dt: f32) -> Option<SceneRequest>;

    fn game_state(&self) -> Option<&GameState> {
        None
    }

    fn game_state_mut(&mut self) -> Option<&mut GameState> {
        None
    }
}

/// Challenge size picker shown before each game
#[derive(Debug, Clone)]
pub struct SelectionScene {
    pub challenge_count: usize,
    /// Session of the game that just ended, if any
    pub last: Option<GameSession>,
    confirmed: bool,
}

impl Default for SelectionScene {
    fn default() -> Self {
        Self {
            challenge_count: DEFAULT_CHALLENGE,
            last: None,
            confirmed: false,
        }
    }
}

impl SelectionScene {
    /// Selection after a finished game keeps that game's challenge size
    pub fn after_game(last: GameSession) -> Self {
        Self {
            challenge_count: last.challenge_count,
            last: Some(last),
            confirmed: false,
        }
    }

    pub fn choices() -> std::ops::RangeInclusive<usize> {
        MIN_CHALLENGE..=MAX_CHALLENGE
    }
}

impl Scene for SelectionScene {
    fn id(&self) -> SceneId {
        SceneId::Selection
    }

    fn on_enter(&mut self) {
        match &self.last {
            Some(last) => log::info!(
                "Back at selection (last score {}, best streak {})",
                last.total_score,
                last.best_streak
            ),
            None => log::info!("Choose how many sushi to remember"),
        }
    }

    fn handle_input(&mut self, input: &TickInput) {
        if let Some(count) = input.select_count {
            self.challenge_count = clamp_challenge_count(count);
        }
        if input.confirm || input.idle_mode {
            self.confirmed = true;
        }
    }

    fn tick(&mut self, _dt: f32) -> Option<SceneRequest> {
        if !self.confirmed {
            return None;
        }
        self.confirmed = false;
        Some(SceneRequest::StartGame {
            challenge_count: self.challenge_count,
        })
    }
}

/// The gameplay scene, wrapping the simulation
#[derive(Debug, Clone)]
pub struct PlayScene {
    pub state: GameState,
    pending: TickInput,
}

impl PlayScene {
    pub fn new(state: GameState) -> Self {
        Self {
            state,
            pending: TickInput::default(),
        }
    }
}

impl Scene for PlayScene {
    fn id(&self) -> SceneId {
        SceneId::Play
    }

    fn on_enter(&mut self) {
        log::info!(
            "Game started: {} sushi per round, seed {}",
            self.state.challenge_count(),
            self.state.seed
        );
    }

    fn on_exit(&mut self) {
        log::info!("Leaving game (score {})", self.state.session.total_score);
    }

    fn handle_input(&mut self, input: &TickInput) {
        // Held state is replaced; one-shots accumulate until consumed
        self.pending.move_dir = input.move_dir;
        self.pending.idle_mode = input.idle_mode;
        self.pending.confirm |= input.confirm;
        if input.pointer_x.is_some() {
            self.pending.pointer_x = input.pointer_x;
        }
    }

    fn tick(&mut self, dt: f32) -> Option<SceneRequest> {
        if self.state.round.phase == RoundPhase::GameOver {
            let restart =
                self.pending.confirm || self.pending.pointer_x.is_some() || self.pending.idle_mode;
            self.pending.confirm = false;
            self.pending.pointer_x = None;
            return restart.then(|| SceneRequest::ReturnToSelection {
                last: self.state.session.clone(),
            });
        }

        tick(&mut self.state, &self.pending, dt);
        self.pending.confirm = false;
        self.pending.pointer_x = None;
        None
    }

    fn game_state(&self) -> Option<&GameState> {
        Some(&self.state)
    }

    fn game_state_mut(&mut self) -> Option<&mut GameState> {
        Some(&mut self.state)
    }
}

/// Owns the active scene and performs transitions
pub struct Director {
    active: Box<dyn Scene>,
    tuning: Tuning,
    base_seed: u64,
    games_started: u64,
    /// Bumped on every transition so hosts can rebuild their sprites
    generation: u64,
}

impl Director {
    pub fn new(tuning: Tuning, seed: u64) -> Self {
        let mut active: Box<dyn Scene> = Box::new(SelectionScene::default());
        active.on_enter();
        Self {
            active,
            tuning,
            base_seed: seed,
            games_started: 0,
            generation: 0,
        }
    }

    /// Feed input and run one fixed step
    pub fn update(&mut self, input: &TickInput, dt: f32) {
        self.active.handle_input(input);
        if let Some(request) = self.active.tick(dt) {
            self.transition(request);
        }
    }

    fn transition(&mut self, request: SceneRequest) {
        let mut next: Box<dyn Scene> = match request {
            SceneRequest::StartGame { challenge_count } => {
                let seed = self.base_seed.wrapping_add(self.games_started);
                self.games_started += 1;
                Box::new(PlayScene::new(GameState::new(
                    seed,
                    challenge_count,
                    self.tuning.clone(),
                )))
            }
            SceneRequest::ReturnToSelection { last } => {
                Box::new(SelectionScene::after_game(last))
            }
        };
        self.active.on_exit();
        next.on_enter();
        self.active = next;
        self.generation += 1;
    }

    pub fn active_id(&self) -> SceneId {
        self.active.id()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn game_state(&self) -> Option<&GameState> {
        self.active.game_state()
    }

    pub fn game_state_mut(&mut self) -> Option<&mut GameState> {
        self.active.game_state_mut()
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }
}
