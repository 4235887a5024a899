//! Arm positions and the fixed movement sequences built from them

use super::Color;
use std::time::Duration;

/// Servo positions, expressed as 50 Hz PWM duty cycles
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArmPosition {
    Down,
    Center,
    Up,
}

impl ArmPosition {
    /// Duty cycle in percent
    pub fn duty_percent(&self) -> f64 {
        match self {
            ArmPosition::Down => 2.5,
            ArmPosition::Center => 7.5,
            ArmPosition::Up => 12.5,
        }
    }
}

/// One beat of a choreography
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    Move(ArmPosition, Duration),
    Light(Color),
}

const BEAT: Duration = Duration::from_millis(200);

/// Colors cycled through while dancing
pub const DANCE_COLORS: [Color; 7] = [
    Color::Red,
    Color::Green,
    Color::Blue,
    Color::White,
    Color::Yellow,
    Color::Purple,
    Color::Orange,
];

pub fn wave() -> Vec<Step> {
    use ArmPosition::*;
    [Center, Down, Up, Down, Up, Center]
        .into_iter()
        .map(|p| Step::Move(p, BEAT))
        .collect()
}

pub fn raise() -> Vec<Step> {
    vec![Step::Move(ArmPosition::Up, Duration::from_secs(1))]
}

pub fn lower() -> Vec<Step> {
    vec![Step::Move(ArmPosition::Down, Duration::from_secs(1))]
}

pub fn dance() -> Vec<Step> {
    let mut steps = Vec::with_capacity(DANCE_COLORS.len() * 5 + 2);
    for color in DANCE_COLORS {
        steps.push(Step::Move(ArmPosition::Center, BEAT));
        steps.push(Step::Light(color));
        steps.push(Step::Move(ArmPosition::Down, BEAT));
        steps.push(Step::Move(ArmPosition::Up, BEAT));
        steps.push(Step::Move(ArmPosition::Center, BEAT));
    }
    steps.push(Step::Move(ArmPosition::Center, Duration::from_millis(500)));
    steps.push(Step::Light(Color::Off));
    steps
}
