use std::collections::HashMap;
use std::fmt::{Debug, Display};
use std::hash::Hash;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, warn};

use crate::persistence::{PersistError, SnapshotFile};

/// How many fresh ids the actor tries before giving up on a crowded id space.
const MAX_ID_ATTEMPTS: usize = 32;

// =============================================================================
// 1. THE ABSTRACTION (Traits with Hooks, Params, and Actions)
// =============================================================================

/// Trait that any stored record must implement to be managed by ResourceActor.
///
/// Hooks run against a draft copy of the record. The actor only commits the
/// draft when the hook succeeds, so a failing hook never leaves a half-applied
/// change behind.
pub trait Entity: Clone + Debug + Send + Sync + Serialize + DeserializeOwned + 'static {
    type Id: Eq + Hash + Clone + Send + Sync + Display + Debug;
    type CreateParams: Send + Sync + Debug;
    type Patch: Send + Sync + Debug;
    type Action: Send + Sync + Debug;
    type ActionResult: Send + Sync + Debug;
    type Error: std::error::Error + Clone + Send + Sync + 'static;

    fn id(&self) -> &Self::Id;

    /// Construct the full record from the id and creation params.
    fn from_create_params(id: Self::Id, params: Self::CreateParams) -> Result<Self, Self::Error>;

    // --- Lifecycle Hooks ---

    fn on_create(&mut self) -> Result<(), Self::Error> { Ok(()) }
    fn on_update(&mut self, patch: Self::Patch) -> Result<(), Self::Error>;
    fn on_delete(&self) -> Result<(), Self::Error> { Ok(()) }

    // --- Action Handler ---

    /// Handle a domain-specific action.
    fn handle_action(&mut self, action: Self::Action) -> Result<Self::ActionResult, Self::Error>;

    /// Blank record used when an action targets an id that does not exist yet.
    /// Returning `None` makes such actions fail with `NotFound`.
    fn vacant(_id: &Self::Id) -> Option<Self> { None }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum FrameworkError<E> {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Item already exists: {0}")]
    AlreadyExists(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Actor closed")]
    ActorClosed,
    #[error("Actor dropped")]
    ActorDropped,
    #[error("{0}")]
    Entity(E),
}

// =============================================================================
// 2. THE GENERIC MESSAGES
// =============================================================================

pub type Response<T, E> = oneshot::Sender<Result<T, FrameworkError<E>>>;

type EntityResponse<T, R> = Response<R, <T as Entity>::Error>;

/// Extra precondition checked atomically right before a delete.
pub type DeleteGuard<T> = fn(&T) -> Result<(), <T as Entity>::Error>;

pub enum ResourceRequest<T: Entity> {
    Create {
        id: Option<T::Id>,
        params: T::CreateParams,
        respond_to: EntityResponse<T, T::Id>,
    },
    Get {
        id: T::Id,
        respond_to: EntityResponse<T, Option<T>>,
    },
    List {
        respond_to: EntityResponse<T, Vec<T>>,
    },
    Update {
        id: T::Id,
        patch: T::Patch,
        respond_to: EntityResponse<T, T>,
    },
    Delete {
        id: T::Id,
        guard: Option<DeleteGuard<T>>,
        respond_to: EntityResponse<T, T>,
    },
    Action {
        id: T::Id,
        action: T::Action,
        respond_to: EntityResponse<T, T::ActionResult>,
    },
}

// =============================================================================
// 3. THE GENERIC ACTOR SERVER
// =============================================================================

pub struct ResourceActor<T: Entity> {
    receiver: mpsc::Receiver<ResourceRequest<T>>,
    store: HashMap<T::Id, T>,
    next_id_fn: Box<dyn Fn() -> T::Id + Send + Sync>,
    snapshot: Option<SnapshotFile>,
}

impl<T: Entity> ResourceActor<T> {
    pub fn new(
        buffer_size: usize,
        next_id_fn: impl Fn() -> T::Id + Send + Sync + 'static,
    ) -> (Self, ResourceClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            store: HashMap::new(),
            next_id_fn: Box::new(next_id_fn),
            snapshot: None,
        };
        let client = ResourceClient::new(sender);
        (actor, client)
    }

    /// Back the store with a snapshot file, loading whatever it already holds.
    pub fn with_snapshot(mut self, snapshot: SnapshotFile) -> Result<Self, PersistError> {
        let items: Vec<T> = snapshot.load()?;
        debug!(path = %snapshot.path().display(), records = items.len(), "Snapshot loaded");
        self.store = items.into_iter().map(|item| (item.id().clone(), item)).collect();
        self.snapshot = Some(snapshot);
        Ok(self)
    }

    pub async fn run(mut self) {
        while let Some(msg) = self.receiver.recv().await {
            match msg {
                ResourceRequest::Create { id, params, respond_to } => {
                    let result = self.handle_create(id, params).await;
                    let _ = respond_to.send(result);
                }
                ResourceRequest::Get { id, respond_to } => {
                    let item = self.store.get(&id).cloned();
                    let _ = respond_to.send(Ok(item));
                }
                ResourceRequest::List { respond_to } => {
                    let items = self.store.values().cloned().collect();
                    let _ = respond_to.send(Ok(items));
                }
                ResourceRequest::Update { id, patch, respond_to } => {
                    let result = self.handle_update(id, patch).await;
                    let _ = respond_to.send(result);
                }
                ResourceRequest::Delete { id, guard, respond_to } => {
                    let result = self.handle_delete(id, guard).await;
                    let _ = respond_to.send(result);
                }
                ResourceRequest::Action { id, action, respond_to } => {
                    let result = self.handle_action(id, action).await;
                    let _ = respond_to.send(result);
                }
            }
        }
        debug!("Resource actor stopped");
    }

    async fn handle_create(
        &mut self,
        id: Option<T::Id>,
        params: T::CreateParams,
    ) -> Result<T::Id, FrameworkError<T::Error>> {
        let id = match id {
            Some(id) if self.store.contains_key(&id) => {
                return Err(FrameworkError::AlreadyExists(id.to_string()));
            }
            Some(id) => id,
            None => self.fresh_id()?,
        };

        let mut item = T::from_create_params(id.clone(), params).map_err(FrameworkError::Entity)?;
        item.on_create().map_err(FrameworkError::Entity)?;
        self.store.insert(id.clone(), item);

        if let Err(e) = self.persist().await {
            // Compensate: the record never becomes visible.
            self.store.remove(&id);
            return Err(e);
        }
        Ok(id)
    }

    async fn handle_update(&mut self, id: T::Id, patch: T::Patch) -> Result<T, FrameworkError<T::Error>> {
        let current = self
            .store
            .get(&id)
            .cloned()
            .ok_or_else(|| FrameworkError::NotFound(id.to_string()))?;

        let mut draft = current.clone();
        draft.on_update(patch).map_err(FrameworkError::Entity)?;
        self.commit(id, draft.clone(), Some(current)).await?;
        Ok(draft)
    }

    async fn handle_delete(
        &mut self,
        id: T::Id,
        guard: Option<DeleteGuard<T>>,
    ) -> Result<T, FrameworkError<T::Error>> {
        let item = self
            .store
            .get(&id)
            .ok_or_else(|| FrameworkError::NotFound(id.to_string()))?;
        if let Some(guard) = guard {
            guard(item).map_err(FrameworkError::Entity)?;
        }
        item.on_delete().map_err(FrameworkError::Entity)?;

        let removed = self
            .store
            .remove(&id)
            .ok_or_else(|| FrameworkError::NotFound(id.to_string()))?;
        if let Err(e) = self.persist().await {
            self.store.insert(id, removed);
            return Err(e);
        }
        Ok(removed)
    }

    async fn handle_action(
        &mut self,
        id: T::Id,
        action: T::Action,
    ) -> Result<T::ActionResult, FrameworkError<T::Error>> {
        let current = self.store.get(&id).cloned();
        let mut draft = match current.clone().or_else(|| T::vacant(&id)) {
            Some(item) => item,
            None => return Err(FrameworkError::NotFound(id.to_string())),
        };

        let result = draft.handle_action(action).map_err(FrameworkError::Entity)?;
        self.commit(id, draft, current).await?;
        Ok(result)
    }

    /// Store `draft` under `id`, restoring `previous` if the snapshot write fails.
    async fn commit(&mut self, id: T::Id, draft: T, previous: Option<T>) -> Result<(), FrameworkError<T::Error>> {
        self.store.insert(id.clone(), draft);
        if let Err(e) = self.persist().await {
            match previous {
                Some(previous) => self.store.insert(id, previous),
                None => self.store.remove(&id),
            };
            return Err(e);
        }
        Ok(())
    }

    fn fresh_id(&self) -> Result<T::Id, FrameworkError<T::Error>> {
        for _ in 0..MAX_ID_ATTEMPTS {
            let id = (self.next_id_fn)();
            if !self.store.contains_key(&id) {
                return Ok(id);
            }
            warn!(id = %id, "Generated id already taken, retrying");
        }
        Err(FrameworkError::Storage("could not generate a free id".to_string()))
    }

    async fn persist(&self) -> Result<(), FrameworkError<T::Error>> {
        let Some(snapshot) = &self.snapshot else {
            return Ok(());
        };
        let items: Vec<&T> = self.store.values().collect();
        snapshot.save(&items).await.map_err(|e| {
            error!(path = %snapshot.path().display(), error = %e, "Snapshot write failed");
            FrameworkError::Storage(e.to_string())
        })
    }
}

// =============================================================================
// 4. THE GENERIC CLIENT
// =============================================================================

pub struct ResourceClient<T: Entity> {
    sender: mpsc::Sender<ResourceRequest<T>>,
}

// Manual impl: a derive would require `T: Clone` on the handle itself.
impl<T: Entity> Clone for ResourceClient<T> {
    fn clone(&self) -> Self {
        Self { sender: self.sender.clone() }
    }
}

impl<T: Entity> ResourceClient<T> {
    pub fn new(sender: mpsc::Sender<ResourceRequest<T>>) -> Self {
        Self { sender }
    }

    async fn request<R>(
        &self,
        build: impl FnOnce(EntityResponse<T, R>) -> ResourceRequest<T>,
    ) -> Result<R, FrameworkError<T::Error>> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(build(respond_to))
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }

    pub async fn create(&self, params: T::CreateParams) -> Result<T::Id, FrameworkError<T::Error>> {
        self.request(|respond_to| ResourceRequest::Create { id: None, params, respond_to }).await
    }

    /// Create under a caller-chosen id. Fails with `AlreadyExists` if taken.
    pub async fn create_with_id(&self, id: T::Id, params: T::CreateParams) -> Result<T::Id, FrameworkError<T::Error>> {
        self.request(|respond_to| ResourceRequest::Create { id: Some(id), params, respond_to }).await
    }

    pub async fn get(&self, id: T::Id) -> Result<Option<T>, FrameworkError<T::Error>> {
        self.request(|respond_to| ResourceRequest::Get { id, respond_to }).await
    }

    pub async fn list(&self) -> Result<Vec<T>, FrameworkError<T::Error>> {
        self.request(|respond_to| ResourceRequest::List { respond_to }).await
    }

    pub async fn update(&self, id: T::Id, patch: T::Patch) -> Result<T, FrameworkError<T::Error>> {
        self.request(|respond_to| ResourceRequest::Update { id, patch, respond_to }).await
    }

    pub async fn delete(&self, id: T::Id) -> Result<T, FrameworkError<T::Error>> {
        self.request(|respond_to| ResourceRequest::Delete { id, guard: None, respond_to }).await
    }

    /// Delete only if `guard` accepts the record as it is when the actor gets to it.
    pub async fn delete_if(&self, id: T::Id, guard: DeleteGuard<T>) -> Result<T, FrameworkError<T::Error>> {
        self.request(|respond_to| ResourceRequest::Delete { id, guard: Some(guard), respond_to }).await
    }

    pub async fn perform_action(&self, id: T::Id, action: T::Action) -> Result<T::ActionResult, FrameworkError<T::Error>> {
        self.request(|respond_to| ResourceRequest::Action { id, action, respond_to }).await
    }
}

// =============================================================================
// 5. EXAMPLE USAGE (Test)
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;

    // --- Domain Definition ---

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    struct Tally {
        id: String,
        label: String,
        count: u32,
        locked: bool,
    }

    #[derive(Debug)]
    struct TallyCreate {
        label: String,
    }

    #[derive(Debug)]
    struct TallyPatch {
        label: Option<String>,
    }

    #[derive(Debug)]
    enum TallyAction {
        Bump(u32),
        Lock,
    }

    #[derive(Debug, Clone, PartialEq, Error)]
    enum TallyError {
        #[error("tally is locked")]
        Locked,
        #[error("label must not be empty")]
        EmptyLabel,
    }

    impl Entity for Tally {
        type Id = String;
        type CreateParams = TallyCreate;
        type Patch = TallyPatch;
        type Action = TallyAction;
        type ActionResult = u32;
        type Error = TallyError;

        fn id(&self) -> &String { &self.id }

        fn from_create_params(id: String, params: TallyCreate) -> Result<Self, TallyError> {
            if params.label.is_empty() {
                return Err(TallyError::EmptyLabel);
            }
            Ok(Self { id, label: params.label, count: 0, locked: false })
        }

        fn on_update(&mut self, patch: TallyPatch) -> Result<(), TallyError> {
            if let Some(label) = patch.label {
                self.label = label;
            }
            Ok(())
        }

        fn on_delete(&self) -> Result<(), TallyError> {
            if self.locked { Err(TallyError::Locked) } else { Ok(()) }
        }

        fn handle_action(&mut self, action: TallyAction) -> Result<u32, TallyError> {
            match action {
                TallyAction::Bump(n) => {
                    // Mutate first, then fail: the actor must discard the draft.
                    self.count += n;
                    if self.locked {
                        return Err(TallyError::Locked);
                    }
                    Ok(self.count)
                }
                TallyAction::Lock => {
                    self.locked = true;
                    Ok(self.count)
                }
            }
        }

        fn vacant(id: &String) -> Option<Self> {
            id.starts_with("auto_").then(|| Self {
                id: id.clone(),
                label: "auto".into(),
                count: 0,
                locked: false,
            })
        }
    }

    fn spawn_tally_actor() -> ResourceClient<Tally> {
        let counter = Arc::new(AtomicU64::new(1));
        let next_id = move || format!("tally_{}", counter.fetch_add(1, Ordering::SeqCst));
        let (actor, client) = ResourceActor::new(10, next_id);
        tokio::spawn(actor.run());
        client
    }

    // --- Tests ---

    #[tokio::test]
    async fn test_create_action_and_get() {
        let client = spawn_tally_actor();

        let id = client.create(TallyCreate { label: "juice".into() }).await.unwrap();
        assert_eq!(id, "tally_1");

        assert_eq!(client.perform_action(id.clone(), TallyAction::Bump(3)).await.unwrap(), 3);
        assert_eq!(client.perform_action(id.clone(), TallyAction::Bump(2)).await.unwrap(), 5);

        let tally = client.get(id).await.unwrap().unwrap();
        assert_eq!(tally.count, 5);
    }

    #[tokio::test]
    async fn test_failed_action_leaves_record_unchanged() {
        let client = spawn_tally_actor();
        let id = client.create(TallyCreate { label: "juice".into() }).await.unwrap();
        client.perform_action(id.clone(), TallyAction::Bump(1)).await.unwrap();
        client.perform_action(id.clone(), TallyAction::Lock).await.unwrap();

        let err = client.perform_action(id.clone(), TallyAction::Bump(10)).await.unwrap_err();
        assert_eq!(err, FrameworkError::Entity(TallyError::Locked));

        let tally = client.get(id).await.unwrap().unwrap();
        assert_eq!(tally.count, 1);
    }

    #[tokio::test]
    async fn test_create_with_taken_id_is_rejected() {
        let client = spawn_tally_actor();
        client
            .create_with_id("fixed".into(), TallyCreate { label: "a".into() })
            .await
            .unwrap();

        let err = client
            .create_with_id("fixed".into(), TallyCreate { label: "b".into() })
            .await
            .unwrap_err();
        assert_eq!(err, FrameworkError::AlreadyExists("fixed".into()));
        assert_eq!(client.get("fixed".into()).await.unwrap().unwrap().label, "a");
    }

    #[tokio::test]
    async fn test_vacant_records_spring_into_existence_on_action() {
        let client = spawn_tally_actor();

        assert_eq!(client.perform_action("auto_1".into(), TallyAction::Bump(4)).await.unwrap(), 4);
        assert_eq!(client.get("auto_1".into()).await.unwrap().unwrap().count, 4);

        let err = client.perform_action("other".into(), TallyAction::Bump(1)).await.unwrap_err();
        assert_eq!(err, FrameworkError::NotFound("other".into()));
    }

    #[tokio::test]
    async fn test_delete_hook_can_veto() {
        let client = spawn_tally_actor();
        let id = client.create(TallyCreate { label: "x".into() }).await.unwrap();
        client.perform_action(id.clone(), TallyAction::Lock).await.unwrap();

        assert_eq!(client.delete(id.clone()).await.unwrap_err(), FrameworkError::Entity(TallyError::Locked));
        assert!(client.get(id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_guard_is_checked_in_the_actor() {
        fn only_untouched(tally: &Tally) -> Result<(), TallyError> {
            if tally.count == 0 { Ok(()) } else { Err(TallyError::Locked) }
        }

        let client = spawn_tally_actor();
        let id = client.create(TallyCreate { label: "x".into() }).await.unwrap();
        client.perform_action(id.clone(), TallyAction::Bump(1)).await.unwrap();
        assert!(client.delete_if(id.clone(), only_untouched).await.is_err());

        let fresh = client.create(TallyCreate { label: "y".into() }).await.unwrap();
        let removed = client.delete_if(fresh.clone(), only_untouched).await.unwrap();
        assert_eq!(removed.label, "y");
        assert!(client.get(fresh).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_snapshot_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = SnapshotFile::in_dir(dir.path(), "tallies");

        let (actor, client) = ResourceActor::<Tally>::new(10, || "tally_x".to_string());
        let handle = tokio::spawn(actor.with_snapshot(snapshot.clone()).unwrap().run());
        let id = client.create(TallyCreate { label: "kept".into() }).await.unwrap();
        client.perform_action(id.clone(), TallyAction::Bump(7)).await.unwrap();
        drop(client);
        handle.await.unwrap();

        let (actor, client) = ResourceActor::<Tally>::new(10, || "tally_y".to_string());
        tokio::spawn(actor.with_snapshot(snapshot).unwrap().run());
        let tally = client.get(id).await.unwrap().unwrap();
        assert_eq!(tally.count, 7);
        assert_eq!(client.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_snapshot_write_rolls_back_create() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = SnapshotFile::new(dir.path().join("missing").join("tallies.json"));

        let (actor, client) = ResourceActor::<Tally>::new(10, || "tally_z".to_string());
        tokio::spawn(actor.with_snapshot(snapshot).unwrap().run());

        let err = client.create(TallyCreate { label: "lost".into() }).await.unwrap_err();
        assert!(matches!(err, FrameworkError::Storage(_)));
        assert!(client.get("tally_z".into()).await.unwrap().is_none());
    }
}
