use soulbrowser_core_types::SoulError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("dispatcher busy: an action is already in flight")]
    Busy,
}

impl From<DispatchError> for SoulError {
    fn from(value: DispatchError) -> Self {
        SoulError::new(value.to_string())
    }
}
