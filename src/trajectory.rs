//! Binary hop trajectories.
//!
//! `v[n+1] = v[n]` with probability `p_stay`, otherwise `-v[n]`;
//! `x[n+1] = x[n] + v[n]`. Positions lag velocities by one step.

use rand::Rng;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Trajectory {
    /// Each entry is exactly +1 or -1.
    pub velocity: Vec<i8>,
    pub position: Vec<f64>,
}

impl Trajectory {
    pub fn len(&self) -> usize {
        self.position.len()
    }

    pub fn is_empty(&self) -> bool {
        self.position.is_empty()
    }
}

/// Simulate one trajectory of `n_steps` samples.
///
/// Consumes exactly `n_steps` uniform draws from `rng`: one for the initial
/// direction and one per subsequent step.
pub fn simulate_trajectory<R: Rng + ?Sized>(p_stay: f64, n_steps: usize, rng: &mut R) -> Trajectory {
    if n_steps == 0 {
        return Trajectory::default();
    }

    let mut velocity = Vec::with_capacity(n_steps);
    let mut position = Vec::with_capacity(n_steps);

    velocity.push(if rng.gen::<f64>() < 0.5 { 1_i8 } else { -1_i8 });
    position.push(0.0);

    for n in 1..n_steps {
        let previous = velocity[n - 1];
        let next = if rng.gen::<f64>() < p_stay {
            previous
        } else {
            -previous
        };
        velocity.push(next);
        position.push(position[n - 1] + f64::from(previous));
    }

    Trajectory { velocity, position }
}
