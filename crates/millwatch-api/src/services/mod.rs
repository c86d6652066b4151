// Services layer
// Services own request validation and id generation, calling the store traits directly

pub mod alert;
pub mod rule;
pub mod sensor;
pub mod vision;

pub use alert::AlertService;
pub use rule::RuleService;
pub use sensor::SensorService;
pub use vision::VisionService;
