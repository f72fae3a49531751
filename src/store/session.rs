use crate::{
    domain::{Identity, Role},
    storage::Storage,
    store::slot::{Persistable, StateSlot},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

/// The signed-in identity, if any
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    #[serde(default)]
    pub user: Option<Identity>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub is_authenticated: bool,
}

impl SessionState {
    pub fn login(&mut self, user: Identity, token: impl Into<String>) {
        self.user = Some(user);
        self.token = Some(token.into());
        self.is_authenticated = true;
    }

    /// Same as [`login`](Self::login); registration is not checked for
    /// existing users
    pub fn register(&mut self, user: Identity, token: impl Into<String>) {
        self.login(user, token);
    }

    pub fn logout(&mut self) {
        *self = Self::default();
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(Role::Admin)
    }

    pub fn is_member(&self) -> bool {
        self.has_role(Role::Member)
    }

    fn has_role(&self, role: Role) -> bool {
        self.user.as_ref().map(|user| user.role == role).unwrap_or(false)
    }
}

impl Persistable for SessionState {
    type Snapshot = SessionState;

    fn to_snapshot(&self) -> SessionState {
        self.clone()
    }

    fn from_snapshot(snapshot: SessionState) -> Self {
        snapshot
    }
}

/// Tracks the signed-in identity and mirrors it to storage
pub struct SessionStore {
    slot: StateSlot<SessionState>,
}

impl SessionStore {
    pub async fn open(storage: Arc<dyn Storage>, key: impl Into<String>) -> Self {
        Self {
            slot: StateSlot::open(storage, key.into()).await,
        }
    }

    pub fn snapshot(&self) -> Arc<SessionState> {
        self.slot.current()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<SessionState>> {
        self.slot.subscribe()
    }

    pub fn user(&self) -> Option<Identity> {
        self.snapshot().user.clone()
    }

    pub fn token(&self) -> Option<String> {
        self.snapshot().token.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.snapshot().is_authenticated
    }

    pub fn is_admin(&self) -> bool {
        self.snapshot().is_admin()
    }

    pub fn is_member(&self) -> bool {
        self.snapshot().is_member()
    }

    pub async fn login(&mut self, user: Identity, token: impl Into<String>) {
        debug!(user_id = %user.id, role = %user.role, "login");
        let mut next = self.slot.draft();
        next.login(user, token);
        self.slot.commit(next).await;
    }

    pub async fn register(&mut self, user: Identity, token: impl Into<String>) {
        debug!(user_id = %user.id, role = %user.role, "register");
        let mut next = self.slot.draft();
        next.register(user, token);
        self.slot.commit(next).await;
    }

    pub async fn logout(&mut self) {
        debug!("logout");
        let mut next = self.slot.draft();
        next.logout();
        self.slot.commit(next).await;
    }
}
