use std::time::Duration;

use foundation::{Aabb2, LngLat, MAP_HOME};

pub const DEFAULT_ZOOM: f64 = 4.0;
pub const RESET_DURATION: Duration = Duration::from_millis(1500);
pub const PITCH_DURATION: Duration = Duration::from_millis(1000);
pub const FIT_DURATION: Duration = Duration::from_millis(1500);
pub const FIT_PADDING_PX: f64 = 50.0;
/// How long a manual pitch change stays "in progress" (animation plus slack).
pub const MANUAL_PITCH_HOLD: Duration = Duration::from_millis(1100);

/// The four discrete camera tilts offered to the user.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum PitchStep {
    #[default]
    Flat,
    Tilt30,
    Tilt60,
    Tilt75,
}

impl PitchStep {
    pub const ALL: [PitchStep; 4] = [
        PitchStep::Flat,
        PitchStep::Tilt30,
        PitchStep::Tilt60,
        PitchStep::Tilt75,
    ];

    pub fn degrees(self) -> u32 {
        match self {
            PitchStep::Flat => 0,
            PitchStep::Tilt30 => 30,
            PitchStep::Tilt60 => 60,
            PitchStep::Tilt75 => 75,
        }
    }

    pub fn from_degrees(degrees: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.degrees() == degrees)
    }

    pub fn label(self) -> &'static str {
        match self {
            PitchStep::Flat => "2D view",
            PitchStep::Tilt30 => "30° view",
            PitchStep::Tilt60 => "60° view",
            PitchStep::Tilt75 => "75° view",
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CameraState {
    pub center: LngLat,
    pub zoom: f64,
    pub pitch: PitchStep,
    pub bearing: f64,
}

impl Default for CameraState {
    fn default() -> Self {
        Self {
            center: MAP_HOME,
            zoom: DEFAULT_ZOOM,
            pitch: PitchStep::Flat,
            bearing: 0.0,
        }
    }
}

/// An animated camera move for the renderer to perform.
///
/// `None` fields are left as the renderer currently has them.
#[derive(Debug, Clone, PartialEq)]
pub enum CameraCommand {
    EaseTo {
        center: Option<LngLat>,
        zoom: Option<f64>,
        pitch: Option<f64>,
        bearing: Option<f64>,
        duration: Duration,
    },
    FitBounds {
        bounds: Aabb2,
        padding: f64,
        duration: Duration,
    },
}

impl CameraCommand {
    /// Fit the camera to `bounds` with the standard padding and duration.
    pub fn fit(bounds: Aabb2) -> Self {
        CameraCommand::FitBounds {
            bounds,
            padding: FIT_PADDING_PX,
            duration: FIT_DURATION,
        }
    }
}

/// Tracks the user-facing camera state and turns user intents into commands.
///
/// The renderer lets a newer animation interrupt an older one, so nothing here
/// queues: the last command issued wins.
#[derive(Debug, Default)]
pub struct CameraController {
    state: CameraState,
    manual_pitch_until_ms: Option<f64>,
}

impl CameraController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &CameraState {
        &self.state
    }

    pub fn pitch(&self) -> PitchStep {
        self.state.pitch
    }

    pub fn reset(&mut self) -> CameraCommand {
        self.state = CameraState::default();
        self.manual_pitch_until_ms = None;
        CameraCommand::EaseTo {
            center: Some(self.state.center),
            zoom: Some(self.state.zoom),
            pitch: Some(0.0),
            bearing: Some(0.0),
            duration: RESET_DURATION,
        }
    }

    /// Exclusive pitch selection; `now_ms` is the caller's clock.
    pub fn set_pitch(&mut self, step: PitchStep, now_ms: f64) -> CameraCommand {
        self.state.pitch = step;
        self.manual_pitch_until_ms = Some(now_ms + MANUAL_PITCH_HOLD.as_secs_f64() * 1000.0);
        CameraCommand::EaseTo {
            center: None,
            zoom: None,
            pitch: Some(step.degrees() as f64),
            bearing: None,
            duration: PITCH_DURATION,
        }
    }

    pub fn is_manual_pitch(&self, now_ms: f64) -> bool {
        self.manual_pitch_until_ms.is_some_and(|until| now_ms < until)
    }

    pub fn fit_bounds(&mut self, bounds: Aabb2) -> CameraCommand {
        self.state.center = bounds.center();
        CameraCommand::fit(bounds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn pitch_steps_round_trip_through_degrees() {
        for step in PitchStep::ALL {
            assert_eq!(PitchStep::from_degrees(step.degrees()), Some(step));
        }
        assert_eq!(PitchStep::from_degrees(45), None);
    }

    #[test]
    fn selecting_a_pitch_replaces_the_previous_one() {
        let mut cam = CameraController::new();
        cam.set_pitch(PitchStep::Tilt60, 0.0);
        let cmd = cam.set_pitch(PitchStep::Tilt30, 10.0);
        assert_eq!(cam.pitch(), PitchStep::Tilt30);
        assert_eq!(
            cmd,
            CameraCommand::EaseTo {
                center: None,
                zoom: None,
                pitch: Some(30.0),
                bearing: None,
                duration: PITCH_DURATION,
            }
        );
    }

    #[test]
    fn manual_pitch_flag_expires() {
        let mut cam = CameraController::new();
        cam.set_pitch(PitchStep::Tilt75, 1000.0);
        assert!(cam.is_manual_pitch(2000.0));
        assert!(!cam.is_manual_pitch(2100.0));
    }

    #[test]
    fn reset_returns_home_flat() {
        let mut cam = CameraController::new();
        cam.set_pitch(PitchStep::Tilt75, 0.0);
        let cmd = cam.reset();
        assert_eq!(cam.pitch(), PitchStep::Flat);
        assert_eq!(
            cmd,
            CameraCommand::EaseTo {
                center: Some(LngLat::new(-54.0, -15.0)),
                zoom: Some(4.0),
                pitch: Some(0.0),
                bearing: Some(0.0),
                duration: RESET_DURATION,
            }
        );
    }

    #[test]
    fn fit_uses_standard_padding() {
        let mut cam = CameraController::new();
        let b = Aabb2::new([0.0, 0.0], [2.0, 2.0]);
        let cmd = cam.fit_bounds(b);
        assert_eq!(cam.state().center, LngLat::new(1.0, 1.0));
        assert_eq!(
            cmd,
            CameraCommand::FitBounds {
                bounds: b,
                padding: 50.0,
                duration: FIT_DURATION,
            }
        );
    }
}
