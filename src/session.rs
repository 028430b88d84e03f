//! Lazily initialized provider handle
//!
//! A [`ProviderSession`] creates the remote provider on first use and shares
//! it for as long as the owning service lives. Concurrent first callers all
//! wait on the same initialization. A failed initialization leaves the
//! session empty so the next caller tries again; a successful one is never
//! repeated.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use futures::FutureExt;
use futures::future::BoxFuture;
use tokio::sync::OnceCell;
use tracing::info;

use crate::error::{Error, Result};

type Initializer<P> = Box<dyn Fn() -> BoxFuture<'static, Result<P>> + Send + Sync>;

/// Holds the provider handle once it has been established
pub struct ProviderSession<P> {
    handle: OnceCell<Arc<P>>,
    init: Option<Initializer<P>>,
    initializations: AtomicUsize,
}

impl<P> std::fmt::Debug for ProviderSession<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderSession")
            .field("initialized", &self.is_initialized())
            .field("initializations", &self.initializations())
            .finish()
    }
}

impl<P> ProviderSession<P> {
    pub fn is_initialized(&self) -> bool {
        self.handle.initialized()
    }

    /// Number of initializations this session has run; at most one
    pub fn initializations(&self) -> usize {
        self.initializations.load(Ordering::SeqCst)
    }
}

impl<P: Send + Sync + 'static> ProviderSession<P> {
    /// Session that runs `init` on first use
    pub fn lazy<F, Fut>(init: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<P>> + Send + 'static,
    {
        Self {
            handle: OnceCell::new(),
            init: Some(Box::new(move || init().boxed())),
            initializations: AtomicUsize::new(0),
        }
    }

    /// Session around an already established provider
    pub fn ready(provider: P) -> Self {
        Self {
            handle: OnceCell::new_with(Some(Arc::new(provider))),
            init: None,
            initializations: AtomicUsize::new(0),
        }
    }

    /// The established provider, if any
    pub fn get(&self) -> Option<&Arc<P>> {
        self.handle.get()
    }

    /// The provider handle, creating it on first use
    pub async fn get_or_init(&self, correlation_id: &str) -> Result<&Arc<P>> {
        self.handle
            .get_or_try_init(|| async {
                let init = self.init.as_ref().ok_or_else(|| {
                    Error::Configuration("no embedding provider configured".to_string())
                })?;
                let provider = init().await?;
                self.initializations.fetch_add(1, Ordering::SeqCst);
                info!(correlation_id, "Provider session initialized");
                Ok::<_, Error>(Arc::new(provider))
            })
            .await
    }
}
