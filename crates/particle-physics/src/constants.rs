//! Constants for the 2D particle kernel
//!
//! These are tuned for visible motion at interactive scale, not physical accuracy.

/// Number of `f32` slots per particle record: `x, y, vx, vy, type`
pub const STRIDE: usize = 5;

/// Gravitational acceleration (m/s²)
pub const G: f32 = 9.81;

/// Amplification applied to gravity so motion is visible on screen
pub const GRAVITY_SCALE: f32 = 15.0;

/// Spatial frequency of the wind field along `y` (period ≈ 628 world units)
pub const WIND_FREQUENCY: f32 = 0.01;

/// Peak horizontal wind acceleration
pub const WIND_STRENGTH: f32 = 50.0;

/// Velocity retained after bouncing off a wall
pub const RESTITUTION: f32 = 0.8;

/// Turbulence phase coefficients: `sin(x * X + y * Y)`
pub const TURBULENCE_FREQ_X: f32 = 10.0;
pub const TURBULENCE_FREQ_Y: f32 = 6.0;

/// Turbulence amplitude before folding with [`TURBULENCE_MODULUS`]
pub const TURBULENCE_GAIN: f32 = 99.0;

/// Remainder modulus that bounds turbulence to (-0.1, 0.1)
pub const TURBULENCE_MODULUS: f32 = 0.1;

/// Initial velocity is drawn from ±this on each axis
pub const INITIAL_SPEED: f32 = 40.0;

/// Upper bound on a single step's dt (seconds), applied by the frame driver
pub const MAX_DT: f32 = 0.05;
