pub mod att;
pub mod bridge;
pub mod bus;
pub mod config;
pub mod connectivity;
pub mod dialog;
pub mod error;
pub mod export;
pub mod logger;
pub mod probes;
pub mod resolver;
pub mod sdk;
pub mod storage;
pub mod types;
pub mod webview;

pub use crate::bus::SdkEvent;
pub use crate::config::Config;
pub use crate::error::{SdkError, SdkResult};
pub use crate::export::{ConsentExport, GoogleConsentFlags};
pub use crate::logger::LogsMode;
pub use crate::sdk::{ConsentSdk, ConsentSdkBuilder, SdkState};
pub use crate::types::{AttFlags, ConsentScope, ConsentState, ConsentStatus, DialogMode};
