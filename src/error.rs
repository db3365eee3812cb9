/// Errors raised by the wheel engine and its session.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WheelError {
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Wheel is still spinning")]
    Spinning,
}
