// alight_core/src/prelude.rs

// --- Core Abstractions (The main contracts of the library) ---
pub use crate::clock::{Clock, ManualClock, MonotonicClock};
pub use crate::estimation::{EstimatorInput, StateEstimator};
pub use crate::interfaces::{CommandSink, PoseProvider, TargetProvider};
pub use crate::models::dynamics::Dynamics;
pub use crate::models::measurement::Measurement;

// --- Core Data Structures (The "nouns" of the library) ---
pub use crate::config::{
    AxisGains, CarrotConfig, ControllerConfig, EstimatorConfig, LandingConfig, MissionConfig,
    PidGains, PresenceConfig, TrackingConfig,
};
pub use crate::error::{ConfigError, ControlError, EstimationError, GuidanceError, TrackerError};
pub use crate::frames::{FrameAwareState, FrameId, StateVariable};
pub use crate::types::{AttitudeCommand, Pose, TargetObservation, Timestamp};

// --- Subsystems ---
pub use crate::control::{cascaded::CascadedController, pid::Pid};
pub use crate::control_loop::ControlLoop;
pub use crate::estimation::filters::kf::KalmanFilter;
pub use crate::guidance::SetpointGenerator;
pub use crate::mission::{Mission, MissionOutput, MissionState, TickInput};
pub use crate::tracking::{TargetEstimate, TargetTracker};

// --- Concrete Model Implementations (Export common ones for convenience) ---
pub use crate::models::dynamics::constant_acceleration::ConstantAccelerationModel;
pub use crate::models::measurement::relative_position::RelativePositionModel;
