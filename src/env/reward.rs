//! Reward and termination for the patrol environment.

use super::config::EnvConfig;
use super::state::SimState;

/// Computes rewards and episode termination.
pub struct RewardComputer;

impl RewardComputer {
    /// Reward for one step: the number of targets first visited during it.
    ///
    /// `visited_before` is the visited-target count taken before this step's
    /// sensing update.
    pub fn compute(visited_before: usize, state: &SimState) -> f64 {
        state.n_visited_targets().saturating_sub(visited_before) as f64
    }

    /// An episode ends once the step budget is spent or every target is visited.
    pub fn is_done(state: &SimState, config: &EnvConfig) -> bool {
        state.step_counter >= config.episode_length || state.all_targets_visited()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Position;

    fn state() -> SimState {
        SimState::new(
            vec![Position::origin()],
            vec![Position::origin()],
            &[Position::new(1.0, 0.0), Position::new(2.0, 0.0)],
            &[0, 1],
        )
    }

    #[test]
    fn reward_counts_new_visits() {
        let mut s = state();
        let before = s.n_visited_targets();
        assert_eq!(RewardComputer::compute(before, &s), 0.0);
        s.mark_visited([1, 2]);
        assert_eq!(RewardComputer::compute(before, &s), 2.0);
    }

    #[test]
    fn done_on_budget_or_full_coverage() {
        let config = EnvConfig {
            episode_length: 3,
            ..EnvConfig::default()
        };
        let mut s = state();
        assert!(!RewardComputer::is_done(&s, &config));
        s.step_counter = 3;
        assert!(RewardComputer::is_done(&s, &config));
        s.step_counter = 1;
        s.mark_visited([1, 2]);
        assert!(RewardComputer::is_done(&s, &config));
    }
}
