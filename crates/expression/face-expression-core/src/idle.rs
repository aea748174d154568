//! Idle behavior scheduler.
//!
//! Counts seconds of inactivity and, once `timeout` is reached with an empty
//! queue and an idle player, picks one of the configured idle expressions.
//! Explicit activity (enqueue or start of a normal/interrupt expression)
//! resets the count.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, warn};

use crate::data::{Expression, Priority};
use crate::library::ExpressionLibrary;

/// Slack on the timeout comparison; absorbs f32 step rounding (0.02 * 250 < 5.0).
const TIMEOUT_EPSILON: f64 = 1e-4;

#[derive(Debug)]
pub struct IdleScheduler {
    timeout: f32,
    // f64 so thousands of small steps do not drift
    idle_elapsed: f64,
    candidates: Vec<String>,
    rng: StdRng,
}

impl IdleScheduler {
    /// `seed` makes the candidate choice reproducible.
    pub fn new(timeout: f32, candidates: Vec<String>, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            timeout,
            idle_elapsed: 0.0,
            candidates,
            rng,
        }
    }

    pub fn timeout(&self) -> f32 {
        self.timeout
    }

    pub fn idle_elapsed(&self) -> f32 {
        self.idle_elapsed as f32
    }

    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    pub fn advance(&mut self, dt: f32) {
        if dt > 0.0 {
            self.idle_elapsed += f64::from(dt);
        }
    }

    pub fn reset(&mut self) {
        self.idle_elapsed = 0.0;
    }

    /// Pick an idle expression if the timeout has elapsed and nothing else is going on.
    ///
    /// The count resets whenever a pick is attempted, even if the chosen name
    /// is missing from the library.
    pub fn maybe_trigger_idle(
        &mut self,
        library: &ExpressionLibrary,
        queue_empty: bool,
        player_idle: bool,
    ) -> Option<Arc<Expression>> {
        let due = self.idle_elapsed + TIMEOUT_EPSILON >= f64::from(self.timeout);
        if !due || !queue_empty || !player_idle {
            return None;
        }
        self.reset();
        if self.candidates.is_empty() {
            return None;
        }
        let name = &self.candidates[self.rng.gen_range(0..self.candidates.len())];
        match library.get(name) {
            Ok(expression) if expression.priority == Priority::Idle => {
                debug!(expression = %name, "idle behavior triggered");
                Some(expression)
            }
            Ok(expression) => {
                debug!(expression = %name, "idle behavior triggered (demoted to idle priority)");
                Some(Arc::new(Expression {
                    priority: Priority::Idle,
                    ..(*expression).clone()
                }))
            }
            Err(err) => {
                warn!(%err, "idle expression unavailable");
                None
            }
        }
    }
}
