use floatwin_core::CommandError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Overlay state lock was poisoned")]
    StatePoisoned,
    #[error(transparent)]
    Overlay(#[from] floatwin_core::Error),
    #[error("Unexpected command reply: {0}")]
    Reply(#[from] serde_json::Error),
    #[error("Tauri error: {0}")]
    Tauri(#[from] tauri::Error),
    #[cfg(target_os = "android")]
    #[error("Android plugin error: {0}")]
    Mobile(#[from] tauri::plugin::mobile::PluginInvokeError),
}

impl From<Error> for CommandError {
    fn from(e: Error) -> Self {
        let code = match &e {
            Error::Overlay(inner) => inner.code(),
            Error::StatePoisoned => "STATE_POISONED",
            Error::Reply(_) => "INVALID_REPLY",
            Error::Tauri(_) => "PLATFORM_ERROR",
            #[cfg(target_os = "android")]
            Error::Mobile(_) => "PLATFORM_ERROR",
        };
        CommandError {
            code: code.to_string(),
            message: e.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
