use futures::{FutureExt, future::BoxFuture};
use std::{
    collections::HashMap,
    future::Future,
    panic::AssertUnwindSafe,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};
use tokio::sync::OnceCell;

use crate::{boundary::panic_message, error::LoadError, routes::ViewId, view::View};

/// A loaded view, or why it could not be loaded. Memoised per view.
pub type LoadResult = Result<Arc<dyn View>, LoadError>;

/// Produces a view's code on demand.
pub type ViewFactory = Arc<dyn Fn() -> BoxFuture<'static, LoadResult> + Send + Sync>;

/// LoadState
///
/// Non-blocking answer to "can this view render yet".
#[derive(Clone)]
pub enum LoadState {
    Pending,
    Ready(Arc<dyn View>),
    Failed(LoadError),
}

struct Module {
    factory: ViewFactory,
    cell: Arc<OnceCell<LoadResult>>,
    requested: AtomicBool,
}

/// DeferredViewLoader
///
/// Holds the factories for every view and fetches each one the first time its
/// route is visited, never before. Each view is fetched at most once; concurrent
/// first visits share the same fetch.
pub struct DeferredViewLoader {
    modules: HashMap<ViewId, Module>,
    in_flight: Arc<AtomicUsize>,
}

impl DeferredViewLoader {
    pub fn builder() -> DeferredViewLoaderBuilder {
        DeferredViewLoaderBuilder::default()
    }

    /// Whether the fetch for `view` has been started.
    pub fn is_requested(&self, view: ViewId) -> bool {
        self.modules
            .get(&view)
            .is_some_and(|m| m.requested.load(Ordering::SeqCst))
    }

    /// Fetches currently outstanding.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Reports whether `view` is ready, starting its fetch in the background on
    /// the first call. Must be called inside a Tokio runtime.
    pub fn poll(&self, view: ViewId) -> LoadState {
        let Some(module) = self.modules.get(&view) else {
            return LoadState::Failed(LoadError::Unregistered(view));
        };

        if let Some(result) = module.cell.get() {
            return into_state(result);
        }

        if !module.requested.swap(true, Ordering::SeqCst) {
            let cell = module.cell.clone();
            let factory = module.factory.clone();
            let in_flight = self.in_flight.clone();
            tokio::spawn(async move {
                cell.get_or_init(|| fetch(view, factory, in_flight)).await;
            });
        }

        // The spawned fetch may already have finished on another worker.
        match module.cell.get() {
            Some(result) => into_state(result),
            None => LoadState::Pending,
        }
    }

    /// Waits for `view`'s code, fetching it if nobody has yet.
    pub async fn load(&self, view: ViewId) -> LoadResult {
        let module = self
            .modules
            .get(&view)
            .ok_or(LoadError::Unregistered(view))?;
        module.requested.store(true, Ordering::SeqCst);

        module
            .cell
            .get_or_init(|| fetch(view, module.factory.clone(), self.in_flight.clone()))
            .await
            .clone()
    }
}

async fn fetch(view: ViewId, factory: ViewFactory, in_flight: Arc<AtomicUsize>) -> LoadResult {
    let _in_flight = InFlight::enter(in_flight);
    tracing::debug!(%view, "fetching view code");

    // A panicking factory becomes a memoised failure like any other.
    let result = AssertUnwindSafe(async { factory().await })
        .catch_unwind()
        .await
        .unwrap_or_else(|payload| Err(LoadError::Panicked(view, panic_message(&*payload))));

    if let Err(e) = &result {
        tracing::error!(%view, error = %e, "view code failed to load");
    }
    result
}

/// Counts one outstanding fetch until dropped, including on unwind or when the
/// awaiting future is cancelled.
struct InFlight(Arc<AtomicUsize>);

impl InFlight {
    fn enter(counter: Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

fn into_state(result: &LoadResult) -> LoadState {
    match result {
        Ok(view) => LoadState::Ready(view.clone()),
        Err(e) => LoadState::Failed(e.clone()),
    }
}

/// DeferredViewLoaderBuilder
///
/// Registers factories. Registration never runs them.
#[derive(Default)]
pub struct DeferredViewLoaderBuilder {
    factories: HashMap<ViewId, ViewFactory>,
}

impl DeferredViewLoaderBuilder {
    /// Registers the factory for `view`, replacing any earlier one.
    pub fn register<F, Fut>(mut self, view: ViewId, factory: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = LoadResult> + Send + 'static,
    {
        let factory: ViewFactory =
            Arc::new(move || -> BoxFuture<'static, LoadResult> { Box::pin(factory()) });
        self.factories.insert(view, factory);
        self
    }

    pub fn build(self) -> DeferredViewLoader {
        let modules = self
            .factories
            .into_iter()
            .map(|(view, factory)| {
                let module = Module {
                    factory,
                    cell: Arc::new(OnceCell::new()),
                    requested: AtomicBool::new(false),
                };
                (view, module)
            })
            .collect();

        DeferredViewLoader {
            modules,
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }
}
