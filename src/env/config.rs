//! Configuration for the patrol environment.

use super::error::EnvError;
use crate::lattice::{generate_lattice, reject_collisions, Rect};
use crate::types::Position;

/// Where the stationary targets come from.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TargetLayout {
    /// Use these positions as-is.
    Explicit(Vec<Position>),
    /// Square lattice over `bounds`, minus every point inside an obstacle.
    Lattice {
        bounds: Rect,
        spacing: f64,
        obstacles: Vec<Rect>,
    },
}

impl TargetLayout {
    /// Produces the target positions for this layout.
    pub fn positions(&self) -> Vec<Position> {
        match self {
            TargetLayout::Explicit(points) => points.clone(),
            TargetLayout::Lattice {
                bounds,
                spacing,
                obstacles,
            } => reject_collisions(generate_lattice(bounds, *spacing), obstacles),
        }
    }
}

/// Configuration for the patrol environment.
///
/// Controls the target layout, graph radii, robot dynamics, observation
/// padding, and episode length.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnvConfig {
    // --- Agents ---
    /// Number of robots R.
    pub n_robots: usize,
    /// Target layout strategy.
    pub layout: TargetLayout,
    /// Fraction of targets left unvisited at reset.
    pub frac_active_targets: f64,
    /// Exact set of unvisited targets at reset; overrides the fraction.
    pub active_targets: Option<Vec<usize>>,
    /// Exact robot start positions at reset; overrides random placement.
    pub robot_starts: Option<Vec<Position>>,

    // --- Graph radii ---
    /// Robot-robot communication radius.
    pub comm_radius: f64,
    /// Target-target motion radius; also robot-target planning radius.
    pub motion_radius: f64,
    /// Robot-target sensing radius for marking targets visited.
    pub sensor_radius: f64,
    /// Uniform edge cost used by the time matrix.
    pub edge_time: f64,

    // --- Actions and observation padding ---
    /// Movement edges (discrete actions) per robot.
    pub n_actions: usize,
    /// Padded edge slots per agent; capacity = agents × this.
    pub max_edges_per_agent: usize,
    /// Upper bound of the uniform jitter added by the k-sampled graph.
    pub sample_jitter: f64,

    // --- Dynamics ---
    /// Duration of one environment step.
    pub dt: f64,
    /// Integration sub-steps per environment step.
    pub n_substeps: usize,
    /// Componentwise velocity bound.
    pub v_max: f64,
    /// Componentwise acceleration bound.
    pub a_max: f64,
    /// Proportional gain of the control law.
    pub action_gain: f64,
    /// Acceleration drives position directly when true; double integrator otherwise.
    pub velocity_control: bool,

    // --- Episode ---
    /// Steps per episode.
    pub episode_length: u32,
}

impl EnvConfig {
    /// Sub-step duration.
    pub fn ddt(&self) -> f64 {
        self.dt / self.n_substeps as f64
    }

    /// Number of targets that start unvisited for a layout with `n_targets`.
    pub fn n_active(&self, n_targets: usize) -> usize {
        match &self.active_targets {
            Some(active) => active.len(),
            None => (n_targets as f64 * self.frac_active_targets) as usize,
        }
    }

    /// Checks the configuration against the resolved target count.
    ///
    /// Degenerate graph queries are rejected here so they never surface
    /// mid-episode.
    pub fn validate(&self, n_targets: usize) -> Result<(), EnvError> {
        let invalid = |msg: String| Err(EnvError::InvalidConfig(msg));

        if self.n_robots == 0 {
            return invalid("at least one robot is required".into());
        }
        if self.n_robots > n_targets {
            return invalid(format!(
                "{} robots need at least as many targets, layout has {}",
                self.n_robots, n_targets
            ));
        }
        if self.n_actions == 0 {
            return invalid("n_actions must be positive".into());
        }
        if self.n_actions + 1 > n_targets {
            return invalid(format!(
                "{} actions per robot need {} targets, layout has {}",
                self.n_actions,
                self.n_actions + 1,
                n_targets
            ));
        }
        for (name, value) in [
            ("comm_radius", self.comm_radius),
            ("motion_radius", self.motion_radius),
            ("sensor_radius", self.sensor_radius),
            ("edge_time", self.edge_time),
            ("dt", self.dt),
            ("v_max", self.v_max),
            ("a_max", self.a_max),
        ] {
            if !(value > 0.0 && value.is_finite()) {
                return invalid(format!("{} must be positive and finite, got {}", name, value));
            }
        }
        if self.n_substeps == 0 {
            return invalid("n_substeps must be positive".into());
        }
        if self.episode_length == 0 {
            return invalid("episode_length must be positive".into());
        }
        if !(0.0..=1.0).contains(&self.frac_active_targets) {
            return invalid(format!(
                "frac_active_targets must lie in [0, 1], got {}",
                self.frac_active_targets
            ));
        }
        if let Some(active) = &self.active_targets {
            if let Some(&bad) = active.iter().find(|&&t| t >= n_targets) {
                return invalid(format!("active target {} out of range 0..{}", bad, n_targets));
            }
            let mut seen = vec![false; n_targets];
            for &t in active {
                if std::mem::replace(&mut seen[t], true) {
                    return invalid(format!("active target {} listed more than once", t));
                }
            }
        }
        if let Some(starts) = &self.robot_starts {
            if starts.len() != self.n_robots {
                return invalid(format!(
                    "{} robot start positions given for {} robots",
                    starts.len(),
                    self.n_robots
                ));
            }
        }
        Ok(())
    }
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            n_robots: 5,
            layout: TargetLayout::Lattice {
                bounds: Rect::new(0.0, 200.0, 0.0, 200.0),
                spacing: 5.5,
                // four corner blocks leave a cross-shaped corridor
                obstacles: vec![
                    Rect::new(0.0, 90.0, 0.0, 90.0),
                    Rect::new(110.0, 200.0, 110.0, 200.0),
                    Rect::new(0.0, 90.0, 110.0, 200.0),
                    Rect::new(110.0, 200.0, 0.0, 90.0),
                ],
            },
            frac_active_targets: 0.75,
            active_targets: None,
            robot_starts: None,
            comm_radius: 6.0,
            motion_radius: 6.0,
            sensor_radius: 2.0,
            edge_time: 1.0,
            n_actions: 4,
            max_edges_per_agent: 5,
            sample_jitter: 0.1,
            dt: 2.0,
            n_substeps: 5,
            v_max: 3.0,
            a_max: 3.0,
            action_gain: 1.0,
            velocity_control: true,
            episode_length: 50,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let cfg = EnvConfig::default();
        let n_targets = cfg.layout.positions().len();
        assert!(n_targets > cfg.n_actions);
        assert!(cfg.validate(n_targets).is_ok());
        assert!((cfg.ddt() - 0.4).abs() < 1e-12);
    }

    #[test]
    fn default_layout_avoids_obstacles() {
        let cfg = EnvConfig::default();
        let TargetLayout::Lattice { obstacles, .. } = &cfg.layout else {
            panic!("default layout should be a lattice");
        };
        for p in cfg.layout.positions() {
            assert!(obstacles.iter().all(|o| !o.contains(&p)));
        }
    }

    #[test]
    fn too_many_actions_fail_fast() {
        let cfg = EnvConfig {
            n_robots: 1,
            n_actions: 4,
            ..EnvConfig::default()
        };
        assert!(matches!(cfg.validate(4), Err(EnvError::InvalidConfig(_))));
        assert!(cfg.validate(5).is_ok());
    }

    #[test]
    fn bad_values_rejected() {
        let base = EnvConfig::default();
        let cases = [
            EnvConfig { n_robots: 0, ..base.clone() },
            EnvConfig { sensor_radius: 0.0, ..base.clone() },
            EnvConfig { n_substeps: 0, ..base.clone() },
            EnvConfig { frac_active_targets: 1.5, ..base.clone() },
            EnvConfig { active_targets: Some(vec![999]), ..base.clone() },
            EnvConfig { active_targets: Some(vec![3, 1, 3]), ..base.clone() },
            EnvConfig { robot_starts: Some(vec![Position::origin()]), ..base.clone() },
        ];
        for cfg in cases {
            assert!(cfg.validate(100).is_err(), "{:?} should be rejected", cfg);
        }
    }

    #[test]
    fn active_count_from_fraction_or_list() {
        let cfg = EnvConfig::default();
        assert_eq!(cfg.n_active(100), 75);
        let cfg = EnvConfig {
            active_targets: Some(vec![1, 2]),
            ..cfg
        };
        assert_eq!(cfg.n_active(100), 2);
    }
}
