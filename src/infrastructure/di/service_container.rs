//! Service container for dependency injection
//!
//! Wires up all services with their dependencies. This is the explicit
//! application context: nothing in the crate reaches for global state.

use std::sync::Arc;
use std::time::Duration;

use crate::application::services::{AuthService, ChatService, TreeService};
use crate::application::ApiClient;
use crate::config::Settings;
use crate::infrastructure::traits::{
    FileSessionStore, FileSystem, HttpTransport, RealFileSystem, Selector, SessionStore,
    SkimSelector, UreqTransport,
};

/// Container holding all application services.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    /// Interactive selector
    pub selector: Arc<dyn Selector>,

    /// Shared REST client (owns the session store)
    pub api: Arc<ApiClient>,

    pub auth: AuthService,
    pub trees: TreeService,
    pub chat: ChatService,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
        let transport = Arc::new(UreqTransport::new(Duration::from_secs(settings.timeout_secs)));
        let store = Arc::new(FileSessionStore::new(fs.clone(), settings.session_file.clone()));
        Self::with_deps(settings, fs, transport, store, Arc::new(SkimSelector))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(
        settings: Settings,
        fs: Arc<dyn FileSystem>,
        transport: Arc<dyn HttpTransport>,
        store: Arc<dyn SessionStore>,
        selector: Arc<dyn Selector>,
    ) -> Self {
        let settings = Arc::new(settings);
        let api = Arc::new(ApiClient::new(&settings.api_url, transport, store));

        Self {
            auth: AuthService::new(api.clone()),
            trees: TreeService::new(api.clone()),
            chat: ChatService::new(api.clone(), fs.clone()),
            settings,
            fs,
            selector,
            api,
        }
    }
}
