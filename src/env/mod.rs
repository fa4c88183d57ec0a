//! Patrol environment: episode state, dynamics, observations and rewards.
//!
//! [`PatrolEnv`] owns a [`SimState`] and exposes the lifecycle
//! `seed`/`reset`/`step`/`render`/`close`. Route planning and rendering are
//! optional capabilities injected at construction.

pub mod config;
pub mod dynamics;
pub mod environment;
pub mod error;
pub mod metrics;
pub mod observation;
pub mod render;
pub mod reward;
pub mod state;

pub use config::{EnvConfig, TargetLayout};
pub use environment::{PatrolEnv, StepInfo, StepResult};
pub use error::EnvError;
pub use metrics::EvaluationMetrics;
pub use observation::{Observation, ObservationBuilder, StepGraphs};
pub use render::{LogRenderer, RenderMode, Renderer, Snapshot};
pub use reward::RewardComputer;
pub use state::SimState;
