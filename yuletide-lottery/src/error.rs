use thiserror::Error;

pub type Result<T> = std::result::Result<T, GameError>;

#[derive(Error, Debug)]
pub enum GameError {
    #[error("Yuletide core error: {0}")]
    Core(#[from] yuletide_core::YuletideError),

    #[error("Platform error: {0}")]
    Platform(#[from] yuletide_core::PlatformError),

    #[error("Spawn loop is already running")]
    AlreadyRunning,

    #[error("No channel to spawn gifts in")]
    NoChannels,
}
