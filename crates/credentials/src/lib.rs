//! Encrypted local storage and resolution of login credentials.
//!
//! Credentials are taken from the environment first, then from the
//! encrypted store, then from an interactive prompt.

pub mod error;
pub mod prompt;
pub mod providers;
pub mod record;
pub mod store;

pub use error::{CredentialError, CredentialResult};
pub use providers::{CredentialChain, CredentialProvider, EnvProvider, PromptProvider, Resolved, StoreProvider};
pub use record::Credentials;
pub use store::CredentialStore;
