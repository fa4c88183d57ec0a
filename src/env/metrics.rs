//! Evaluation metrics for the patrol environment.
//!
//! Runs a policy for a number of episodes and aggregates coverage and reward.

use std::fmt;

use super::environment::PatrolEnv;
use super::error::EnvError;
use crate::routing::Policy;

/// Aggregated evaluation metrics over multiple episodes.
#[derive(Debug, Clone)]
pub struct EvaluationMetrics {
    /// Mean cumulative reward (targets visited) per episode.
    pub mean_reward: f64,
    /// Mean percentage of initially active targets visited.
    pub mean_pct_covered: f64,
    /// Mean number of steps per episode.
    pub mean_episode_length: f64,
    /// Episodes that ended with every target visited.
    pub n_completed: usize,
    /// Number of episodes evaluated.
    pub n_episodes: usize,
}

#[derive(Debug, Default)]
struct EpisodeStats {
    cumulative_reward: f64,
    n_active: usize,
    steps: u32,
    completed: bool,
}

impl EvaluationMetrics {
    /// Evaluates a policy over multiple episodes and returns aggregated metrics.
    ///
    /// # Arguments
    ///
    /// * `env` - The environment to evaluate in; reset before every episode
    /// * `policy` - The policy to evaluate
    /// * `n_episodes` - Number of episodes to run
    pub fn evaluate(
        env: &mut PatrolEnv,
        policy: &mut dyn Policy,
        n_episodes: usize,
    ) -> Result<Self, EnvError> {
        let mut all_stats = Vec::with_capacity(n_episodes);

        for _ in 0..n_episodes {
            env.reset()?;
            let mut stats = EpisodeStats {
                n_active: env.n_targets() - env.state().n_visited_targets(),
                ..EpisodeStats::default()
            };

            loop {
                let actions = policy.select_actions(env)?;
                let result = env.step(&actions)?;
                stats.steps += 1;

                if result.done {
                    stats.cumulative_reward = env.cumulative_reward();
                    stats.completed = env.state().all_targets_visited();
                    break;
                }
            }

            all_stats.push(stats);
        }

        let n = all_stats.len().max(1) as f64;
        let mean_reward = all_stats.iter().map(|s| s.cumulative_reward).sum::<f64>() / n;
        let mean_episode_length = all_stats.iter().map(|s| s.steps as f64).sum::<f64>() / n;
        let mean_pct_covered = all_stats
            .iter()
            .map(|s| {
                if s.n_active > 0 {
                    s.cumulative_reward / s.n_active as f64 * 100.0
                } else {
                    100.0
                }
            })
            .sum::<f64>()
            / n;

        Ok(Self {
            mean_reward,
            mean_pct_covered,
            mean_episode_length,
            n_completed: all_stats.iter().filter(|s| s.completed).count(),
            n_episodes,
        })
    }
}

impl fmt::Display for EvaluationMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "=== Evaluation Metrics ({} episodes) ===",
            self.n_episodes
        )?;
        writeln!(f, "  Mean reward:          {:.2}", self.mean_reward)?;
        writeln!(f, "  Mean % covered:       {:.1}%", self.mean_pct_covered)?;
        writeln!(
            f,
            "  Mean episode length:  {:.1}",
            self.mean_episode_length
        )?;
        writeln!(
            f,
            "  Completed episodes:   {}/{}",
            self.n_completed, self.n_episodes
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::{EnvConfig, TargetLayout};
    use crate::routing::{ControllerMode, RoutingController};
    use crate::types::Position;

    fn small_config() -> EnvConfig {
        let targets = (0..4)
            .flat_map(|i| (0..4).map(move |j| Position::new(i as f64 * 5.0, j as f64 * 5.0)))
            .collect();
        EnvConfig {
            n_robots: 2,
            layout: TargetLayout::Explicit(targets),
            n_actions: 3,
            max_edges_per_agent: 6,
            episode_length: 10,
            ..EnvConfig::default()
        }
    }

    #[test]
    fn evaluate_completes() {
        let mut env = PatrolEnv::new(small_config(), 42).unwrap();
        let mut policy = RoutingController::new(ControllerMode::Random);
        let metrics = EvaluationMetrics::evaluate(&mut env, &mut policy, 3).unwrap();
        assert_eq!(metrics.n_episodes, 3);
        assert!(metrics.mean_episode_length <= 10.0);
        assert!(metrics.mean_pct_covered >= 0.0 && metrics.mean_pct_covered <= 100.0);
    }

    #[test]
    fn report_mentions_episode_count() {
        let mut env = PatrolEnv::new(small_config(), 7).unwrap();
        let mut policy = RoutingController::new(ControllerMode::Greedy);
        let metrics = EvaluationMetrics::evaluate(&mut env, &mut policy, 2).unwrap();
        let report = metrics.to_string();
        assert!(report.contains("2 episodes"));
        assert!(report.contains("Completed episodes"));
    }
}
