//! Session controller.
//!
//! Owns the filtered dataset, the random source and the single active
//! session. A new game replaces the session wholesale.

use rand::SeedableRng;
use rand_pcg::Pcg64Mcg;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dataset::{Dataset, FilterConfig, RawRecord};
use crate::error::EngineError;
use crate::generator;
use crate::model::{PuzzleInstance, Variant};
use crate::moves::{self, Intent, MoveOutcome};
use crate::scorer::{self, ScoreResult};
use crate::state::PuzzleState;
use crate::traits::DataProvider;

/// Configuration for the game engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Which puzzle to deal.
    pub variant: Variant,
    /// Dataset filtering thresholds.
    #[serde(default)]
    pub filter: FilterConfig,
    /// Fixed seed for reproducible games.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            variant: Variant::Rank,
            filter: FilterConfig::default(),
            seed: None,
        }
    }
}

/// One dealt puzzle and the player's progress on it.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    id: Uuid,
    instance: PuzzleInstance,
    state: PuzzleState,
}

impl Session {
    fn new(instance: PuzzleInstance) -> Self {
        let state = PuzzleState::new(&instance);
        Self {
            id: Uuid::new_v4(),
            instance,
            state,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn instance(&self) -> &PuzzleInstance {
        &self.instance
    }

    pub fn state(&self) -> &PuzzleState {
        &self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }
}

/// The game engine.
pub struct GameEngine {
    dataset: Dataset,
    rng: Pcg64Mcg,
    session: Session,
    games_started: u64,
}

impl GameEngine {
    /// Filter `records` and deal the first game.
    pub fn new(records: Vec<RawRecord>, config: &EngineConfig) -> Result<Self, EngineError> {
        let dataset = Dataset::build(records, config.variant, &config.filter)?;
        Self::from_dataset(dataset, config.seed)
    }

    /// Deal the first game from an already filtered dataset.
    pub fn from_dataset(dataset: Dataset, seed: Option<u64>) -> Result<Self, EngineError> {
        let mut rng = match seed {
            Some(seed) => Pcg64Mcg::seed_from_u64(seed),
            None => Pcg64Mcg::from_entropy(),
        };
        let instance = generator::deal(&dataset, &mut rng)?;
        let session = Session::new(instance);
        tracing::info!(
            session = %session.id,
            variant = %dataset.variant(),
            questions = dataset.len(),
            "started new game"
        );
        Ok(Self {
            dataset,
            rng,
            session,
            games_started: 1,
        })
    }

    /// Load records from `provider`, then behave like [`GameEngine::new`].
    ///
    /// Provider failures surface as [`EngineError::DataUnavailable`] unless the
    /// provider already returned an `EngineError`.
    pub async fn from_provider(
        provider: &dyn DataProvider,
        config: &EngineConfig,
    ) -> Result<Self, EngineError> {
        let records = provider.load().await.map_err(|e| match e.downcast::<EngineError>() {
            Ok(engine_error) => engine_error,
            Err(other) => {
                EngineError::DataUnavailable(format!("{}: {other:#}", provider.name()))
            }
        })?;
        tracing::debug!(provider = provider.name(), records = records.len(), "loaded records");
        Self::new(records, config)
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn variant(&self) -> Variant {
        self.dataset.variant()
    }

    pub fn games_started(&self) -> u64 {
        self.games_started
    }

    /// Discard the current session and deal a fresh one.
    pub fn start_new_game(&mut self) -> Result<&Session, EngineError> {
        let instance = generator::deal(&self.dataset, &mut self.rng)?;
        self.session = Session::new(instance);
        self.games_started += 1;
        tracing::info!(session = %self.session.id, variant = %self.variant(), "started new game");
        Ok(&self.session)
    }

    /// Apply one player intent to the active session.
    pub fn handle(&mut self, intent: Intent) -> Result<MoveOutcome, EngineError> {
        if intent == Intent::NewGame {
            self.start_new_game()?;
            return Ok(MoveOutcome::NewGame);
        }

        let session = &mut self.session;
        match moves::apply(&session.instance, &mut session.state, &intent) {
            Ok(outcome) => {
                tracing::debug!(session = %session.id, intent = %intent, "intent accepted");
                Ok(outcome)
            }
            Err(e) => {
                tracing::debug!(session = %session.id, intent = %intent, "intent rejected: {e}");
                Err(e)
            }
        }
    }

    /// Score the active session.
    pub fn score(&self) -> Result<ScoreResult, EngineError> {
        scorer::score(&self.session.instance, &self.session.state)
    }
}
