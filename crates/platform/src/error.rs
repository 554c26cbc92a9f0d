#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    #[error("No battery found")]
    NoBattery,

    #[error("Battery error: {0}")]
    Battery(#[from] starship_battery::Error),

    #[error("{0} counter is not supported on this system")]
    Unsupported(&'static str),
}

pub type Result<T> = std::result::Result<T, PlatformError>;
