//! Ordered credential sources: environment, encrypted store, prompt.

use crate::error::{CredentialError, CredentialResult};
use crate::prompt::{Prompter, TerminalPrompter};
use crate::record::Credentials;
use crate::store::CredentialStore;

pub const EMAIL_VAR: &str = "CHATGPT_EMAIL";
pub const PASSWORD_VAR: &str = "CHATGPT_PASSWORD";

/// One place credentials may come from.
pub trait CredentialProvider: Send + Sync {
    /// Short name used in logs and in the resolution result.
    fn name(&self) -> &'static str;

    /// `Ok(None)` means "not available here, try the next source".
    fn credentials(&self) -> CredentialResult<Option<Credentials>>;
}

// ---------------------------------------------------------------------------
// Environment
// ---------------------------------------------------------------------------

type Lookup = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Reads `CHATGPT_EMAIL` and `CHATGPT_PASSWORD`; both must be non-empty.
pub struct EnvProvider {
    lookup: Lookup,
}

impl EnvProvider {
    pub fn from_env() -> Self {
        Self::with_lookup(|var| std::env::var(var).ok())
    }

    pub fn with_lookup(lookup: impl Fn(&str) -> Option<String> + Send + Sync + 'static) -> Self {
        Self {
            lookup: Box::new(lookup),
        }
    }

    fn var(&self, name: &str) -> Option<String> {
        (self.lookup)(name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }
}

impl CredentialProvider for EnvProvider {
    fn name(&self) -> &'static str {
        "environment"
    }

    fn credentials(&self) -> CredentialResult<Option<Credentials>> {
        Ok(match (self.var(EMAIL_VAR), self.var(PASSWORD_VAR)) {
            (Some(email), Some(password)) => Some(Credentials::new(email, password)),
            _ => None,
        })
    }
}

// ---------------------------------------------------------------------------
// Encrypted store
// ---------------------------------------------------------------------------

pub struct StoreProvider {
    store: CredentialStore,
}

impl StoreProvider {
    pub fn new(store: CredentialStore) -> Self {
        Self { store }
    }
}

impl CredentialProvider for StoreProvider {
    fn name(&self) -> &'static str {
        "store"
    }

    fn credentials(&self) -> CredentialResult<Option<Credentials>> {
        Ok(self.store.load())
    }
}

// ---------------------------------------------------------------------------
// Interactive prompt
// ---------------------------------------------------------------------------

/// Asks for an email and a masked password, then offers to save them when
/// a store is attached.
pub struct PromptProvider<P = TerminalPrompter> {
    prompter: P,
    save_to: Option<CredentialStore>,
}

impl PromptProvider<TerminalPrompter> {
    pub fn terminal(save_to: Option<CredentialStore>) -> Self {
        Self::new(TerminalPrompter, save_to)
    }
}

impl<P: Prompter> PromptProvider<P> {
    pub fn new(prompter: P, save_to: Option<CredentialStore>) -> Self {
        Self { prompter, save_to }
    }
}

impl<P: Prompter> CredentialProvider for PromptProvider<P> {
    fn name(&self) -> &'static str {
        "prompt"
    }

    fn credentials(&self) -> CredentialResult<Option<Credentials>> {
        let email = self.prompter.read_line("Email: ")?;
        let password = self.prompter.read_secret("Password: ")?;
        if email.is_empty() || password.is_empty() {
            return Ok(None);
        }
        let credentials = Credentials::new(email, password);

        if let Some(store) = &self.save_to {
            if self.prompter.confirm("Save credentials securely? (y/N): ")? {
                store.save(&credentials)?;
            }
        }
        Ok(Some(credentials))
    }
}

// ---------------------------------------------------------------------------
// Chain
// ---------------------------------------------------------------------------

/// Credentials together with the provider that supplied them.
#[derive(Debug)]
pub struct Resolved {
    pub source: &'static str,
    pub credentials: Credentials,
}

/// Providers tried in order; the first to return credentials wins.
pub struct CredentialChain {
    providers: Vec<Box<dyn CredentialProvider>>,
}

impl CredentialChain {
    pub fn new(providers: Vec<Box<dyn CredentialProvider>>) -> Self {
        Self { providers }
    }

    /// Environment, then `store`, then an interactive prompt that can save
    /// into `store`.
    pub fn standard(store: CredentialStore) -> Self {
        Self::new(vec![
            Box::new(EnvProvider::from_env()),
            Box::new(StoreProvider::new(store.clone())),
            Box::new(PromptProvider::terminal(Some(store))),
        ])
    }

    /// A failing provider is logged and skipped.
    pub fn resolve(&self) -> CredentialResult<Resolved> {
        for provider in &self.providers {
            match provider.credentials() {
                Ok(Some(credentials)) => {
                    tracing::info!(source = provider.name(), email = %credentials.email, "Credentials resolved");
                    return Ok(Resolved {
                        source: provider.name(),
                        credentials,
                    });
                }
                Ok(None) => tracing::debug!(source = provider.name(), "No credentials from source"),
                Err(e) => tracing::warn!(source = provider.name(), error = %e, "Credential source failed"),
            }
        }

        let tried: Vec<_> = self.providers.iter().map(|p| p.name()).collect();
        Err(CredentialError::NotFound(tried.join(", ")))
    }
}
