use std::sync::Arc;

use crate::{
    boundary::{FALLBACK_MESSAGE, FaultBoundary},
    error::ViewFault,
    gate::{AuthorizationGate, GateDecision},
    loader::{DeferredViewLoader, LoadState},
    routes::{ResolvedRoute, RouteTable, ViewId},
    session::{SessionStatus, SessionVerifier},
    store::KeyValueStore,
    view::{Markup, RenderContext},
};

/// Frame
///
/// The rendered state of the routed region. Exactly one of these at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// Gate placeholder while the session check is outstanding.
    Loading,
    /// The shared placeholder while any view's code is being fetched.
    Suspended,
    /// Navigate to `to`. `replace` means no new history entry.
    Redirect { to: &'static str, replace: bool },
    View { view: ViewId, markup: Markup },
    Fault { message: &'static str },
}

impl Frame {
    /// Whether the frame can change without a new navigation.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Frame::Loading | Frame::Suspended)
    }
}

struct MountedRoute {
    route: ResolvedRoute,
    gate: Option<AuthorizationGate>,
}

/// AppShell
///
/// Composes the routed region: boundary outermost, then route resolution, then
/// the gate for protected entries, then the deferred view. One shell is one
/// mount; a trapped fault lasts until the shell is replaced.
pub struct AppShell {
    table: RouteTable,
    loader: Arc<DeferredViewLoader>,
    verifier: Arc<dyn SessionVerifier>,
    store: Arc<dyn KeyValueStore>,
    boundary: FaultBoundary,
    mounted: MountedRoute,
}

impl AppShell {
    /// Mounts the shell at `location`. Must be called inside a Tokio runtime,
    /// since a protected location starts its session check immediately.
    pub fn new(
        table: RouteTable,
        loader: Arc<DeferredViewLoader>,
        verifier: Arc<dyn SessionVerifier>,
        store: Arc<dyn KeyValueStore>,
        location: &str,
    ) -> Self {
        let mounted = mount(&table, &verifier, location);
        Self {
            table,
            loader,
            verifier,
            store,
            boundary: FaultBoundary::new(),
            mounted,
        }
    }

    pub fn route(&self) -> &ResolvedRoute {
        &self.mounted.route
    }

    pub fn boundary(&self) -> &FaultBoundary {
        &self.boundary
    }

    /// Unmounts the current route (its gate and any pending check with it) and
    /// mounts `location`.
    pub fn navigate(&mut self, location: &str) {
        let next = mount(&self.table, &self.verifier, location);
        let previous = std::mem::replace(&mut self.mounted, next);
        if let Some(gate) = previous.gate {
            // The check keeps running; its result is discarded.
            drop(gate.unmount());
        }
    }

    /// Renders the current frame without waiting on anything.
    pub fn render(&mut self) -> Frame {
        let Self {
            loader,
            store,
            boundary,
            mounted,
            ..
        } = self;

        if boundary.is_faulted() {
            return fault_frame();
        }

        let session = match &mounted.gate {
            Some(gate) => match gate.decision() {
                GateDecision::Pending => return Frame::Loading,
                GateDecision::Redirect(to) => return Frame::Redirect { to, replace: true },
                GateDecision::Grant => gate.status(),
            },
            None => SessionStatus::Unknown,
        };

        let view = match loader.poll(mounted.route.view()) {
            LoadState::Pending => return Frame::Suspended,
            LoadState::Failed(e) => {
                boundary.trap(ViewFault::Load(e));
                return fault_frame();
            }
            LoadState::Ready(view) => view,
        };

        let ctx = RenderContext {
            path: &mounted.route.path,
            params: &mounted.route.params,
            session: &session,
            store: &**store,
        };
        match boundary.guard(|| view.render(&ctx)) {
            Some(markup) => Frame::View {
                view: view.id(),
                markup,
            },
            None => fault_frame(),
        }
    }

    /// Drives the current mount until it produces a terminal frame.
    pub async fn settle(&mut self) -> Frame {
        loop {
            match self.render() {
                Frame::Loading => {
                    if let Some(gate) = self.mounted.gate.as_mut() {
                        gate.settled().await;
                    }
                }
                Frame::Suspended => {
                    // Whatever the outcome, the next render picks it up.
                    let _ = self.loader.load(self.mounted.route.view()).await;
                }
                frame => return frame,
            }
        }
    }
}

fn mount(table: &RouteTable, verifier: &Arc<dyn SessionVerifier>, location: &str) -> MountedRoute {
    let route = table.resolve(location);
    let gate = route
        .protection()
        .requirement()
        .map(|requirement| AuthorizationGate::mount(requirement, verifier.clone()));

    tracing::debug!(
        path = %route.path,
        view = %route.view(),
        protection = ?route.protection(),
        "route mounted"
    );
    MountedRoute { route, gate }
}

fn fault_frame() -> Frame {
    Frame::Fault {
        message: FALLBACK_MESSAGE,
    }
}
