//! Quad-X throttle mixing
//!
//! Maps attitude to an illustrative per-rotor throttle split: tilting the
//! airframe raises the throttle on the side that tilts down. It visualises the
//! control effort an attitude implies and is not a stabilisation law.

use core::fmt;

use serde::Serialize;

use crate::types::MixerSettings;

/// Throttle limits in percent
const MIN_THROTTLE: f64 = 0.0;
const MAX_THROTTLE: f64 = 100.0;

/// Rotor position in the quad-X layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MotorId {
    FrontLeft,
    FrontRight,
    BackLeft,
    BackRight,
}

impl MotorId {
    /// All rotors in command order
    pub const ALL: [MotorId; 4] = [
        MotorId::FrontLeft,
        MotorId::FrontRight,
        MotorId::BackLeft,
        MotorId::BackRight,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            MotorId::FrontLeft => "FL",
            MotorId::FrontRight => "FR",
            MotorId::BackLeft => "BL",
            MotorId::BackRight => "BR",
        }
    }

    /// Fixed propeller direction; diagonal pairs share a direction
    pub fn spin(&self) -> Spin {
        match self {
            MotorId::FrontLeft | MotorId::BackRight => Spin::Clockwise,
            MotorId::FrontRight | MotorId::BackLeft => Spin::CounterClockwise,
        }
    }

    fn index(&self) -> usize {
        match self {
            MotorId::FrontLeft => 0,
            MotorId::FrontRight => 1,
            MotorId::BackLeft => 2,
            MotorId::BackRight => 3,
        }
    }
}

/// Propeller rotation direction seen from above.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Spin {
    Clockwise,
    CounterClockwise,
}

/// One rotor's throttle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Motor {
    pub id: MotorId,
    /// Throttle percentage in `0..=100`
    pub throttle: f64,
    pub spin: Spin,
}

impl Motor {
    fn new(id: MotorId, throttle: f64) -> Self {
        Self {
            id,
            throttle,
            spin: id.spin(),
        }
    }

    /// Illustrative rotor speed for a linear throttle-to-RPM model
    pub fn rpm(&self, max_rpm: f64) -> f64 {
        self.throttle / MAX_THROTTLE * max_rpm
    }
}

/// Throttle for all four rotors, in FL, FR, BL, BR order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MotorCommand {
    motors: [Motor; 4],
}

impl MotorCommand {
    /// Every rotor stopped
    pub fn idle() -> Self {
        Self::from_throttles([0.0; 4])
    }

    fn from_throttles(throttles: [f64; 4]) -> Self {
        let [fl, fr, bl, br] = throttles;
        Self {
            motors: [
                Motor::new(MotorId::FrontLeft, fl),
                Motor::new(MotorId::FrontRight, fr),
                Motor::new(MotorId::BackLeft, bl),
                Motor::new(MotorId::BackRight, br),
            ],
        }
    }

    pub fn motors(&self) -> &[Motor; 4] {
        &self.motors
    }

    pub fn get(&self, id: MotorId) -> Motor {
        self.motors[id.index()]
    }

    pub fn throttles(&self) -> [f64; 4] {
        self.motors.map(|m| m.throttle)
    }

    /// Whole-percent duty cycles, truncated toward zero, for PWM outputs
    pub fn duty_cycles(&self) -> [u8; 4] {
        self.motors.map(|m| m.throttle as u8)
    }

    pub fn is_idle(&self) -> bool {
        self.motors.iter().all(|m| m.throttle == 0.0)
    }
}

impl Default for MotorCommand {
    fn default() -> Self {
        Self::idle()
    }
}

impl fmt::Display for MotorCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, motor) in self.motors.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}:{}%", motor.id.label(), motor.throttle.round())?;
        }
        Ok(())
    }
}

/// Converts pitch and roll into a clamped quad-X throttle split.
///
/// # Example
/// ```
/// use quad_attitude::{MotorId, MotorMixer};
///
/// let mixer = MotorMixer::new();
///
/// // Level and connected: every rotor sits at hover throttle
/// let level = mixer.mix(0.0, 0.0, true);
/// assert_eq!(level.throttles(), [55.0; 4]);
///
/// // Nose down: the front pair works harder
/// let nose_down = mixer.mix(15.0, 0.0, true);
/// assert!(nose_down.get(MotorId::FrontLeft).throttle > nose_down.get(MotorId::BackLeft).throttle);
///
/// // Link lost: everything stops
/// assert!(mixer.mix(15.0, -10.0, false).is_idle());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotorMixer {
    settings: MixerSettings,
}

impl MotorMixer {
    pub fn new() -> Self {
        Self::with_settings(MixerSettings::default())
    }

    pub fn with_settings(settings: MixerSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> MixerSettings {
        self.settings
    }

    /// Mix pitch and roll (degrees) into a motor command
    ///
    /// Positive pitch is nose-down and raises the front pair; positive roll
    /// raises the right pair. A disconnected link skips mixing and returns an
    /// idle command.
    pub fn mix(&self, pitch_deg: f64, roll_deg: f64, connected: bool) -> MotorCommand {
        if !connected {
            return MotorCommand::idle();
        }

        let (mix_pitch, mix_roll) = self.differentials(pitch_deg, roll_deg);
        let base = self.settings.hover_throttle;

        MotorCommand::from_throttles(
            [
                base + mix_pitch - mix_roll,
                base + mix_pitch + mix_roll,
                base - mix_pitch - mix_roll,
                base - mix_pitch + mix_roll,
            ]
            .map(clamp_throttle),
        )
    }

    /// Pitch and roll throttle differentials in percentage points
    pub fn differentials(&self, pitch_deg: f64, roll_deg: f64) -> (f64, f64) {
        let pitch_in = self.normalise(pitch_deg);
        let roll_in = self.normalise(roll_deg);
        (
            pitch_in * self.settings.pitch_gain * self.settings.authority,
            roll_in * self.settings.roll_gain * self.settings.authority,
        )
    }

    fn normalise(&self, angle_deg: f64) -> f64 {
        let normalised = (angle_deg / self.settings.full_scale_deg).clamp(-1.0, 1.0);
        // NaN input contributes no differential
        if normalised.is_nan() { 0.0 } else { normalised }
    }
}

impl Default for MotorMixer {
    fn default() -> Self {
        Self::new()
    }
}

fn clamp_throttle(throttle: f64) -> f64 {
    // NaN settings cannot be allowed to reach a rotor
    if throttle.is_nan() {
        return MIN_THROTTLE;
    }
    throttle.clamp(MIN_THROTTLE, MAX_THROTTLE)
}
