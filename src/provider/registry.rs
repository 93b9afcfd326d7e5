//! Name-keyed lookup of compiled-in analysis backends.

use super::{anthropic, openai, AnalysisProvider, ProviderError, ProviderResult, ProviderSettings};

/// Builds a ready provider from an API key and settings.
pub type Constructor =
    fn(String, &ProviderSettings) -> ProviderResult<Box<dyn AnalysisProvider>>;

/// One backend the binary knows about.
///
/// `constructor` is `None` when the backend's cargo feature is disabled:
/// the name is still recognized so users get an actionable message instead
/// of "unsupported".
#[derive(Clone)]
pub struct ProviderRegistration {
    pub name: &'static str,
    pub feature: &'static str,
    pub credential_var: &'static str,
    pub constructor: Option<Constructor>,
}

impl std::fmt::Debug for ProviderRegistration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistration")
            .field("name", &self.name)
            .field("feature", &self.feature)
            .field("credential_var", &self.credential_var)
            .field("available", &self.constructor.is_some())
            .finish()
    }
}

/// Resolves configured provider names into provider instances.
#[derive(Debug, Clone)]
pub struct ProviderRegistry {
    registrations: Vec<ProviderRegistration>,
}

impl ProviderRegistry {
    /// Registry with an explicit set of registrations.
    pub fn new(registrations: Vec<ProviderRegistration>) -> Self {
        Self { registrations }
    }

    /// Registry with every backend shipped in this crate.
    pub fn builtin() -> Self {
        Self::new(vec![openai::registration(), anthropic::registration()])
    }

    /// Registered names, in registration order.
    pub fn names(&self) -> Vec<&'static str> {
        self.registrations.iter().map(|r| r.name).collect()
    }

    /// Names whose backend is compiled in.
    pub fn available(&self) -> Vec<&'static str> {
        self.registrations
            .iter()
            .filter(|r| r.constructor.is_some())
            .map(|r| r.name)
            .collect()
    }

    pub fn get(&self, name: &str) -> Option<&ProviderRegistration> {
        let wanted = name.trim();
        self.registrations
            .iter()
            .find(|r| r.name.eq_ignore_ascii_case(wanted))
    }

    /// Resolve `name`, reading the API key from the process environment.
    pub fn resolve(
        &self,
        name: &str,
        settings: &ProviderSettings,
    ) -> ProviderResult<Box<dyn AnalysisProvider>> {
        self.resolve_with(name, settings, |var| std::env::var(var).ok())
    }

    /// Resolve `name` with an explicit credential lookup.
    ///
    /// Checks run in order: unknown name, backend not compiled in, missing
    /// or blank credential. No network activity happens here.
    pub fn resolve_with<F>(
        &self,
        name: &str,
        settings: &ProviderSettings,
        lookup: F,
    ) -> ProviderResult<Box<dyn AnalysisProvider>>
    where
        F: Fn(&str) -> Option<String>,
    {
        let registration = self
            .get(name)
            .ok_or_else(|| ProviderError::Unsupported(name.to_string()))?;

        let constructor = registration
            .constructor
            .ok_or(ProviderError::Unavailable {
                provider: registration.name,
                feature: registration.feature,
            })?;

        let api_key = lookup(registration.credential_var)
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .ok_or(ProviderError::MissingCredential {
                var: registration.credential_var,
            })?;

        tracing::debug!(provider = registration.name, "resolved analysis provider");
        constructor(api_key, settings)
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
