//! Robot motion between environment steps.

use super::config::EnvConfig;
use super::state::SimState;

/// Advances every robot toward its commanded agent over `n_substeps`.
///
/// Per sub-step the control law is `a = clip(gain · (goal - p), ±a_max)`.
/// In velocity-control mode `a` moves the position directly; otherwise it is
/// integrated as a double integrator with velocity clipped to `±v_max`.
/// Target rows never move.
///
/// `commanded[i]` is the agent index robot `i` is steering toward.
pub fn integrate(state: &mut SimState, commanded: &[usize], config: &EnvConfig) {
    let ddt = config.ddt();
    for _ in 0..config.n_substeps {
        for (robot, &goal) in commanded.iter().enumerate() {
            let to_goal = state.positions[goal] - state.positions[robot];
            let accel = (to_goal * config.action_gain).clipped(config.a_max);

            if config.velocity_control {
                state.positions[robot] += accel * ddt;
            } else {
                let v = state.velocities[robot];
                state.positions[robot] += v * ddt + accel * (0.5 * ddt * ddt);
                state.velocities[robot] = (v + accel * ddt).clipped(config.v_max);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Position;

    fn one_robot(start: Position, velocity: Position) -> SimState {
        SimState::new(
            vec![start],
            vec![velocity],
            &[Position::new(0.0, 0.0), Position::new(3.0, 0.0)],
            &[1],
        )
    }

    #[test]
    fn velocity_control_converges_without_overshoot() {
        let config = EnvConfig::default();
        let mut s = one_robot(Position::origin(), Position::origin());
        integrate(&mut s, &[2], &config);
        let p = s.positions[0];
        assert!(p.x > 2.5 && p.x < 3.0, "robot at {}", p);
        assert_eq!(p.y, 0.0);
        // target rows untouched
        assert_eq!(s.positions[2], Position::new(3.0, 0.0));
    }

    #[test]
    fn acceleration_is_clipped() {
        let config = EnvConfig {
            n_substeps: 1,
            dt: 1.0,
            ..EnvConfig::default()
        };
        let mut s = SimState::new(
            vec![Position::origin()],
            vec![Position::origin()],
            &[Position::new(100.0, -100.0), Position::new(0.0, 50.0)],
            &[],
        );
        integrate(&mut s, &[1], &config);
        assert_eq!(s.positions[0], Position::new(3.0, -3.0));
    }

    #[test]
    fn double_integrator_clips_velocity() {
        let config = EnvConfig {
            velocity_control: false,
            ..EnvConfig::default()
        };
        let mut s = one_robot(Position::new(-50.0, 0.0), Position::new(2.9, 0.0));
        integrate(&mut s, &[1], &config);
        let v = s.velocities[0];
        assert!(v.x <= config.v_max + 1e-12);
        assert!(s.positions[0].x > -50.0);
        assert_eq!(s.velocities[1], Position::origin());
    }
}
