//! Rendering hook: the environment hands a read-only snapshot to an injected
//! renderer and keeps no drawing state of its own.

use log::info;

use crate::graph::EdgeSet;
use crate::types::Position;

/// How [`PatrolEnv::render`](super::PatrolEnv::render) should behave.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// Draw through the injected renderer; an error if none was provided.
    Human,
    /// Do nothing.
    None,
}

/// Read-only view of the simulation at one step.
#[derive(Debug, Clone, Copy)]
pub struct Snapshot<'a> {
    pub step: u32,
    pub robots: &'a [Position],
    pub targets: &'a [Position],
    /// Visited flag per target.
    pub visited: &'a [bool],
    /// Static motion edges, target-local indices.
    pub motion_edges: &'a EdgeSet,
}

impl Snapshot<'_> {
    pub fn n_visited(&self) -> usize {
        self.visited.iter().filter(|&&v| v).count()
    }
}

/// Receives snapshots when the environment is rendered.
///
/// # Example
///
/// ```rust,ignore
/// struct Trail(Vec<Vec<Position>>);
///
/// impl Renderer for Trail {
///     fn draw(&mut self, snapshot: &Snapshot<'_>) {
///         self.0.push(snapshot.robots.to_vec());
///     }
/// }
/// ```
pub trait Renderer: Send {
    /// Draws one frame.
    fn draw(&mut self, snapshot: &Snapshot<'_>);

    /// Releases any display resources. Called from `close`.
    fn close(&mut self) {}
}

/// Renderer that writes a one-line summary per frame through `log`.
#[derive(Debug, Default)]
pub struct LogRenderer;

impl Renderer for LogRenderer {
    fn draw(&mut self, snapshot: &Snapshot<'_>) {
        let robots: Vec<String> = snapshot.robots.iter().map(|p| p.to_string()).collect();
        info!(
            "step {}: {}/{} targets visited, robots at [{}]",
            snapshot.step,
            snapshot.n_visited(),
            snapshot.targets.len(),
            robots.join(", ")
        );
    }
}
