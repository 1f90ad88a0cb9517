use thiserror::Error;

/// Reasons the wheel declines a request. None of these change session state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WheelError {
    #[error("there are no names on the wheel")]
    NoParticipants,
    #[error("the wheel is already spinning")]
    AlreadySpinning,
    #[error("names can't be changed while the wheel is spinning")]
    SpinInProgress,
    #[error("name is empty")]
    EmptyName,
    #[error("{0} is already on the wheel")]
    DuplicateName(String),
    #[error("there is no name at position {index} (the wheel has {len})")]
    NoSuchParticipant { index: usize, len: usize },
    #[error("no ad step is pending")]
    NotAwaitingAd,
    #[error("the wheel is not animating")]
    NotAnimating,
}
