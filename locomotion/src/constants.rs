/*!
Default tunables for the character controller.

These seed [`ControllerSettings`](crate::config::ControllerSettings) and the
animation defaults. Units are meters, seconds and degrees unless stated
otherwise. Hosts override them through deserialized settings.
*/

/// Radius of the character's capsule collider (meters).
pub const DEFAULT_COLLIDER_RADIUS: f32 = 0.4;

/// Standing height of the character's capsule collider (meters).
pub const DEFAULT_COLLIDER_HEIGHT: f32 = 1.8;

/// Separation kept between the collider and surfaces (meters).
/// Too large creates visible gaps; too small risks jitter on contact.
pub const DEFAULT_SKIN_WIDTH: f32 = 0.02;

/// Extra ground-probe reach while standing on a moving platform (meters).
/// Keeps the character latched when the platform drops faster than gravity would.
pub const DEFAULT_PLATFORM_STICKINESS: f32 = 0.1;

/// Steepest walkable slope (degrees from horizontal).
pub const DEFAULT_MAX_SLOPE_DEG: f32 = 45.0;

/// Tallest obstacle the controller steps onto without an ability (meters).
pub const DEFAULT_MAX_STEP_HEIGHT: f32 = 0.35;

/// Height above the feet at which the forward obstacle probe is fired (meters).
pub const DEFAULT_STEP_PROBE_HEIGHT: f32 = 0.05;

/// Scale applied to the vertical impulse needed to clear a detected step.
pub const DEFAULT_STEP_IMPULSE_SCALE: f32 = 1.0;

/// Planar speed while grounded when root motion is off (m/s).
pub const DEFAULT_GROUND_SPEED: f32 = 4.0;

/// Planar speed while airborne when root motion is off (m/s).
pub const DEFAULT_AIR_SPEED: f32 = 1.5;

/// Gravity magnitude (m/s^2, positive value).
pub const GRAVITY_MPS2: f32 = 9.81;

/// Damping rate applied to externally applied lateral velocity (1/s).
pub const DEFAULT_EXTERNAL_FORCE_DAMPING: f32 = 8.0;

/// Maximum yaw rate when turning toward the desired facing (deg/s).
pub const DEFAULT_ROTATION_SPEED_DEG: f32 = 540.0;

/// Input magnitude above which the character counts as moving.
pub const DEFAULT_MOVING_THRESHOLD: f32 = 0.01;

/// Transition duration used by default state requests (seconds).
pub const DEFAULT_TRANSITION_DURATION: f32 = 0.2;

/// Acceptance radius used by move-towards requests that don't set one (meters).
pub const DEFAULT_MOVE_TOWARDS_ACCEPTANCE: f32 = 0.05;

/// Facing error tolerated before a move-towards request counts as arrived (degrees).
pub const MOVE_TOWARDS_FACING_TOLERANCE_DEG: f32 = 1.0;

/// Practical small distance for comparisons (meters).
pub const DIST_EPS: f32 = 1.0e-5;

/// Vertical speed below which the controller may be considered grounded (m/s).
pub const GROUNDING_VERTICAL_SPEED: f32 = 0.05;

/// Default state names.
pub const DEFAULT_IDLE_STATE: &str = "Idle";
pub const DEFAULT_MOVEMENT_STATE: &str = "Movement";
pub const DEFAULT_EMPTY_STATE: &str = "Empty";
