use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StabilityError {
    #[error("stability monitor is already waiting")]
    AlreadyWaiting,
    #[error("frame went away before the wait started")]
    FrameGone,
    #[error("stability wait ended without a report")]
    Interrupted,
}

impl From<StabilityError> for soulbrowser_core_types::SoulError {
    fn from(value: StabilityError) -> Self {
        soulbrowser_core_types::SoulError::new(value.to_string())
    }
}
