//! Spring animations sampled at arbitrary times.
//!
//! A [`Spring`] is an analytic damped harmonic oscillator: position and
//! velocity are pure functions of the query time, so callers can sample it
//! from any frame without advancing hidden state. Re-targeting is explicit
//! ([`Spring::offset_by`], [`Spring::retarget`]).
//!
//! Parameters follow the response/damping-ratio model:
//! `stiffness = (2π / response)²`, unit mass, `damping = 4π·ζ / response`.

use std::f64::consts::PI;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Refresh rate the completion epsilons are tuned for.
pub const REFERENCE_REFRESH_HZ: f64 = 60.0;

/// Lower bound on the damping ratio. An undamped spring would never settle.
const MIN_DAMPING_RATIO: f64 = 0.01;

/// Lower bound on the response, in seconds.
const MIN_RESPONSE: f64 = 0.001;

/// Response used in reduced-motion mode.
const REDUCED_MOTION_RESPONSE: f64 = 0.05;

/// Spring parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpringConfig {
    /// Period of the undamped oscillation, in seconds.
    pub response: f64,
    /// 1.0 is critically damped, lower values overshoot.
    pub damping_ratio: f64,
    /// Position tolerance for completion at the reference refresh rate.
    pub epsilon: f64,
    /// Velocity tolerance (units per second) for completion at the reference
    /// refresh rate.
    pub velocity_epsilon: f64,
    /// Refresh rate of the display the animation is shown on.
    pub display_refresh_hz: f64,
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self {
            response: 0.5,
            damping_ratio: 1.0,
            epsilon: 0.5,
            velocity_epsilon: 5.0,
            display_refresh_hz: REFERENCE_REFRESH_HZ,
        }
    }
}

impl SpringConfig {
    pub fn new(response: f64, damping_ratio: f64) -> Self {
        Self {
            response,
            damping_ratio,
            ..Default::default()
        }
    }

    /// Build from a perceived duration and a bounce amount in `[0, 1)`.
    ///
    /// A bounce of 0 is critically damped; larger values overshoot more.
    pub fn from_duration_bounce(duration: Duration, bounce: f64) -> Self {
        let bounce = bounce.clamp(0.0, 0.99);
        Self::new(duration.as_secs_f64(), 1.0 - bounce)
    }

    pub fn with_refresh_rate(mut self, hz: f64) -> Self {
        self.display_refresh_hz = hz;
        self
    }

    /// Near-instant, critically damped variant that keeps the same epsilons.
    pub fn reduced_motion(&self) -> Self {
        Self {
            response: REDUCED_MOTION_RESPONSE,
            damping_ratio: 1.0,
            ..*self
        }
    }

    fn response(&self) -> f64 {
        if self.response.is_finite() {
            self.response.max(MIN_RESPONSE)
        } else {
            MIN_RESPONSE
        }
    }

    fn damping_ratio(&self) -> f64 {
        if self.damping_ratio.is_finite() {
            self.damping_ratio.clamp(MIN_DAMPING_RATIO, 1.0)
        } else {
            1.0
        }
    }

    /// Natural angular frequency ω₀.
    fn omega(&self) -> f64 {
        2.0 * PI / self.response()
    }

    /// Factor applied to the epsilons so higher refresh rates converge to the
    /// same visual result.
    fn epsilon_scale(&self) -> f64 {
        if self.display_refresh_hz > 0.0 {
            REFERENCE_REFRESH_HZ / self.display_refresh_hz
        } else {
            1.0
        }
    }
}

/// One-dimensional spring from `from` to `to`, started at `start`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spring {
    from: f64,
    to: f64,
    initial_velocity: f64,
    start: Duration,
    config: SpringConfig,
}

impl Spring {
    pub fn new(from: f64, to: f64, initial_velocity: f64, start: Duration, config: SpringConfig) -> Self {
        Self {
            from,
            to,
            initial_velocity: if initial_velocity.is_finite() {
                initial_velocity
            } else {
                0.0
            },
            start,
            config,
        }
    }

    pub fn from(&self) -> f64 {
        self.from
    }

    pub fn to(&self) -> f64 {
        self.to
    }

    pub fn start(&self) -> Duration {
        self.start
    }

    pub fn config(&self) -> &SpringConfig {
        &self.config
    }

    fn elapsed(&self, at: Duration) -> f64 {
        at.saturating_sub(self.start).as_secs_f64()
    }

    /// Displacement from the target and its derivative at elapsed time `t`.
    fn displacement(&self, t: f64) -> (f64, f64) {
        let x0 = self.from - self.to;
        let v0 = self.initial_velocity;
        let omega = self.config.omega();
        let zeta = self.config.damping_ratio();

        if zeta >= 1.0 {
            // Critically damped: x(t) = e^(-ωt) (x0 + B t), B = v0 + ω x0.
            let b = v0 + omega * x0;
            let decay = (-omega * t).exp();
            let x = decay * (x0 + b * t);
            let v = decay * (b - omega * (x0 + b * t));
            (x, v)
        } else {
            // Underdamped: x(t) = e^(-βt) (x0 cos ωd t + C sin ωd t).
            let beta = zeta * omega;
            let omega_d = omega * (1.0 - zeta * zeta).sqrt();
            let c = (v0 + beta * x0) / omega_d;
            let decay = (-beta * t).exp();
            let (sin, cos) = (omega_d * t).sin_cos();
            let x = decay * (x0 * cos + c * sin);
            let v = decay * (-beta * (x0 * cos + c * sin) + omega_d * (c * cos - x0 * sin));
            (x, v)
        }
    }

    /// Position at `at`.
    pub fn value(&self, at: Duration) -> f64 {
        self.to + self.displacement(self.elapsed(at)).0
    }

    /// Velocity (units per second) at `at`.
    pub fn velocity(&self, at: Duration) -> f64 {
        self.displacement(self.elapsed(at)).1
    }

    /// Both position and velocity are within the refresh-scaled epsilons.
    pub fn is_complete(&self, at: Duration) -> bool {
        let (x, v) = self.displacement(self.elapsed(at));
        let scale = self.config.epsilon_scale();
        x.abs() <= self.config.epsilon * scale && v.abs() <= self.config.velocity_epsilon * scale
    }

    /// Shift both endpoints by `delta`. The motion relative to the target is
    /// unchanged, so there is no visible discontinuity beyond the shift itself.
    pub fn offset_by(&mut self, delta: f64) {
        self.from += delta;
        self.to += delta;
    }

    /// Aim at a new target from the current position, keeping the current
    /// velocity so the motion stays continuous.
    pub fn retarget(&self, at: Duration, to: f64) -> Spring {
        Spring::new(self.value(at), to, self.velocity(at), at, self.config)
    }

    /// Earliest sample time (searched on a frame grid) at which the spring is
    /// complete, giving up after `limit`.
    pub fn settle_time(&self, limit: Duration) -> Option<Duration> {
        let hz = if self.config.display_refresh_hz > 0.0 {
            self.config.display_refresh_hz
        } else {
            REFERENCE_REFRESH_HZ
        };
        let frame = Duration::from_secs_f64(1.0 / hz);
        let mut t = self.start;
        let end = self.start + limit;
        while t <= end {
            if self.is_complete(t) {
                return Some(t);
            }
            t += frame;
        }
        None
    }
}
