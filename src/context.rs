//! Application-scoped context shared across webhook invocations.

use std::sync::Arc;

use crate::{mapping::MappingStore, messaging::Messenger, signature::SignatureVerifier};

/// Holds the collaborators built once at cold start.
#[derive(Clone)]
pub struct AppContext {
    verifier: Arc<dyn SignatureVerifier>,
    store: Arc<dyn MappingStore>,
    messenger: Arc<dyn Messenger>,
    public_base_url: String,
}

impl AppContext {
    pub fn new(
        verifier: Arc<dyn SignatureVerifier>,
        store: Arc<dyn MappingStore>,
        messenger: Arc<dyn Messenger>,
        public_base_url: impl Into<String>,
    ) -> Self {
        Self {
            verifier,
            store,
            messenger,
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn verifier(&self) -> &dyn SignatureVerifier {
        self.verifier.as_ref()
    }

    pub fn store(&self) -> &dyn MappingStore {
        self.store.as_ref()
    }

    pub fn messenger(&self) -> &dyn Messenger {
        self.messenger.as_ref()
    }

    /// Base URL that tokens are appended to, without a trailing slash.
    pub fn public_base_url(&self) -> &str {
        &self.public_base_url
    }
}
