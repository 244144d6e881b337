//! Service configuration: typed settings, environment loading, validation.

pub mod loader;
pub mod settings;
pub mod validator;

pub use loader::*;
pub use settings::*;
pub use validator::*;
