pub mod types;
pub mod error;
pub mod navigation;
pub mod script;
pub mod config;


pub use error::{Error, Result};
pub use types::{CharacterInfo, ScriptVariant};
pub use navigation::NavigationState;
pub use script::{ScriptConverter, TableConverter};
pub use config::{ApiCredential, resolve_credential};
