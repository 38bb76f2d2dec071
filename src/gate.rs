use futures::FutureExt;
use std::{
    panic::AssertUnwindSafe,
    sync::{Arc, Weak},
};
use tokio::{sync::watch, task::JoinHandle};
use uuid::Uuid;

use crate::{
    routes::Requirement,
    session::{SessionStatus, SessionVerifier},
};

/// Correlates the log lines of one gate mount.
pub type MountId = Uuid;

type StatusCell = watch::Sender<SessionStatus>;

/// GateDecision
///
/// What a gate renders for a given session status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// Verification outstanding; render the loading placeholder.
    Pending,
    /// Replace the current location with this login path.
    Redirect(&'static str),
    /// Render the protected child.
    Grant,
}

/// decide
///
/// The gate's whole policy. An authenticated non-admin at an admin gate goes to
/// the standard login path, not the admin one.
pub fn decide(requirement: Requirement, status: &SessionStatus) -> GateDecision {
    match (requirement, status) {
        (_, SessionStatus::Unknown) => GateDecision::Pending,
        (_, SessionStatus::Unauthenticated) => GateDecision::Redirect(requirement.login_path()),
        (Requirement::User, SessionStatus::Authenticated(_)) => GateDecision::Grant,
        (Requirement::Admin, SessionStatus::Authenticated(role)) if role.is_admin() => {
            GateDecision::Grant
        }
        (Requirement::Admin, SessionStatus::Authenticated(_)) => {
            GateDecision::Redirect(Requirement::User.login_path())
        }
    }
}

/// Commit
///
/// What happened to a verification result when it came back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commit {
    Applied,
    /// The mount had already resolved; the status is written at most once.
    AlreadyResolved,
    /// The gate was unmounted before the result arrived.
    Discarded,
}

/// Applies a verification result only if the gate that asked for it is still mounted.
fn commit(cell: &Weak<StatusCell>, outcome: SessionStatus) -> Commit {
    let Some(cell) = cell.upgrade() else {
        return Commit::Discarded;
    };

    let applied = cell.send_if_modified(|status| {
        if status.is_unknown() && !outcome.is_unknown() {
            *status = outcome;
            true
        } else {
            false
        }
    });

    if applied {
        Commit::Applied
    } else {
        Commit::AlreadyResolved
    }
}

/// AuthorizationGate
///
/// Wraps one protected route visit. Mounting starts exactly one verification;
/// rendering only reads the status. Dropping the gate unmounts it: the status
/// cell goes away, and the still-running verification finds nothing to commit to.
///
/// Must be mounted inside a Tokio runtime.
pub struct AuthorizationGate {
    requirement: Requirement,
    mount_id: MountId,
    cell: Arc<StatusCell>,
    status: watch::Receiver<SessionStatus>,
    verification: Option<JoinHandle<Commit>>,
}

impl AuthorizationGate {
    pub fn mount(requirement: Requirement, verifier: Arc<dyn SessionVerifier>) -> Self {
        let (tx, status) = watch::channel(SessionStatus::Unknown);
        let cell = Arc::new(tx);
        let weak = Arc::downgrade(&cell);
        let mount_id = Uuid::new_v4();

        tracing::debug!(%mount_id, ?requirement, "gate mounted, verifying session");

        let verification = tokio::spawn(async move {
            // A panicking verifier is just another failed verification.
            let outcome = AssertUnwindSafe(verifier.verify())
                .catch_unwind()
                .await
                .unwrap_or(SessionStatus::Unauthenticated);

            let result = commit(&weak, outcome);
            match result {
                Commit::Discarded => {
                    tracing::debug!(%mount_id, "gate unmounted before verification resolved, result discarded")
                }
                Commit::Applied => tracing::debug!(%mount_id, "gate resolved"),
                Commit::AlreadyResolved => {}
            }
            result
        });

        Self {
            requirement,
            mount_id,
            cell,
            status,
            verification: Some(verification),
        }
    }

    pub fn requirement(&self) -> Requirement {
        self.requirement
    }

    pub fn mount_id(&self) -> MountId {
        self.mount_id
    }

    pub fn status(&self) -> SessionStatus {
        self.cell.borrow().clone()
    }

    /// What to render right now. Never blocks.
    pub fn decision(&self) -> GateDecision {
        decide(self.requirement, &self.cell.borrow())
    }

    /// Waits until verification has resolved and returns the terminal decision.
    pub async fn settled(&mut self) -> GateDecision {
        let requirement = self.requirement;
        match self.status.wait_for(|status| !status.is_unknown()).await {
            Ok(status) => decide(requirement, &status),
            // The sender lives in `self.cell`, so this is unreachable while the
            // gate exists. Fail closed regardless.
            Err(_) => decide(requirement, &SessionStatus::Unauthenticated),
        }
    }

    /// Unmounts the gate, handing back the verification task if it was still
    /// running so the caller can observe what became of its result.
    pub fn unmount(mut self) -> Option<JoinHandle<Commit>> {
        tracing::debug!(mount_id = %self.mount_id, "gate unmounted");
        let verification = self.verification.take();
        drop(self);
        verification
    }

    #[cfg(test)]
    fn weak_cell(&self) -> Weak<StatusCell> {
        Arc::downgrade(&self.cell)
    }
}
