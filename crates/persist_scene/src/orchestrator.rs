//! The scene state machine.
//!
//! [`SceneOrchestrator`] owns the live [`World`] of the active scene, the
//! [`SnapshotCache`] of every other scene, and the [`SceneHost`] that loads
//! and unloads scenes. Every transition is an `async fn(&mut self)`, so a
//! second transition cannot start before the first has finished.
//!
//! ## Entering a scene
//!
//! 1. The host loads the scene and reports its authored entities, which are
//!    instantiated as roots (with their authored children).
//! 2. The scene's cached roots, if any, are taken out of the cache. An entry
//!    whose stable id names a live entity refreshes that entity in place;
//!    every other entry is instantiated as a new root. An entry that fails to
//!    decode is logged and skipped.
//! 3. Authored entities without a cached entry keep their authored state.
//!
//! ## Leaving a scene
//!
//! Every root is captured (recursively) and stored in the cache under the
//! scene's name, the world is cleared, and the host unloads the scene.

use persist_codec::{Reader, Writer};
use persist_core::{EntityId, PersistError, Snapshot, World};
use tracing::{debug, error, info};

use crate::cache::SnapshotCache;
use crate::error::SceneError;
use crate::host::SceneHost;
use crate::layout::{AuthoredEntity, SceneLayout};
use crate::state::SceneState;

/// Coordinates scene transitions, the snapshot cache, and whole-game
/// save/load.
#[derive(Debug)]
pub struct SceneOrchestrator<H> {
    host: H,
    world: World,
    cache: SnapshotCache,
    state: SceneState,
}

impl<H: SceneHost> SceneOrchestrator<H> {
    /// Create an orchestrator with no active scene and an empty cache.
    #[must_use]
    pub fn new(host: H, world: World) -> Self {
        Self {
            host,
            world,
            cache: SnapshotCache::new(),
            state: SceneState::NoActiveScene,
        }
    }

    #[must_use]
    pub fn state(&self) -> &SceneState {
        &self.state
    }

    /// Name of the active scene, if one is active.
    #[must_use]
    pub fn active_scene(&self) -> Option<&str> {
        match &self.state {
            SceneState::Active(name) => Some(name),
            _ => None,
        }
    }

    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    #[must_use]
    pub fn cache(&self) -> &SnapshotCache {
        &self.cache
    }

    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Instantiate a template into the active scene at runtime.
    ///
    /// Runtime spawns never carry a stable id. Returns `Ok(None)` if the
    /// template is unknown.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::InvalidState`] without an active scene.
    pub fn spawn(
        &mut self,
        template_id: &str,
        parent: Option<EntityId>,
    ) -> Result<Option<EntityId>, SceneError> {
        self.require_active("spawn")?;
        Ok(self.world.instantiate(template_id, None, parent)?)
    }

    /// Enter a scene for the first time, ignoring any cached state.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::InvalidState`] if a scene is active, or the
    /// host's error if the scene cannot be loaded.
    pub async fn start_fresh(&mut self, name: &str) -> Result<(), SceneError> {
        if self.state != SceneState::NoActiveScene {
            return Err(self.invalid_state("start a fresh scene"));
        }
        info!(scene = name, "starting fresh");
        self.enter(name, false).await
    }

    /// Save and close the active scene (if any), then enter `name`,
    /// restoring its cached state.
    ///
    /// # Errors
    ///
    /// Host errors on either side of the switch, or any error raised while
    /// capturing or restoring entities.
    pub async fn switch_scene(&mut self, name: &str) -> Result<(), SceneError> {
        if let Some(from) = self.active_scene() {
            info!(from, to = name, "switching scene");
            self.close_active(true).await?;
        }
        self.enter(name, true).await
    }

    /// Save the active scene into the cache and unload it.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::InvalidState`] without an active scene, or the
    /// host's error.
    pub async fn close_scene(&mut self) -> Result<(), SceneError> {
        self.require_active("close a scene")?;
        self.close_active(true).await
    }

    /// Move a root entity of the active scene, with its subtree, into the
    /// cache of another scene. It is recreated there on the next visit.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::InvalidState`] without an active scene,
    /// [`SceneError::SameScene`] if `target` is the active scene,
    /// [`PersistError::UnknownEntity`] or [`PersistError::NotRoot`] for
    /// entities that cannot be moved, and [`PersistError::DuplicateStableId`]
    /// if the subtree carries a stable id already cached for `target`.
    pub fn move_entity(&mut self, id: EntityId, target: &str) -> Result<(), SceneError> {
        let active = self.require_active("move an entity")?;
        if active == target {
            return Err(SceneError::SameScene(active));
        }
        if !self.world.contains(id) {
            return Err(PersistError::UnknownEntity(id).into());
        }
        if !self.world.is_root(id) {
            return Err(PersistError::NotRoot(id).into());
        }

        let snapshot = Snapshot::capture(&self.world, id)?;
        if let Some(taken) = snapshot
            .stable_ids()
            .into_iter()
            .find(|stable_id| self.cache.holds_stable_id(target, stable_id))
        {
            return Err(PersistError::DuplicateStableId(taken.to_owned()).into());
        }
        let entities = snapshot.node_count();
        self.cache.append(target, snapshot);
        self.world.despawn(id);
        info!(entity = %id, from = %active, to = target, entities, "moved entity to scene");
        Ok(())
    }

    /// Write the whole game: the active scene's name, then every cached
    /// scene plus a snapshot of the active one. The active scene stays
    /// loaded and untouched.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::InvalidState`] without an active scene, or any
    /// error raised while capturing or writing.
    pub fn save_all(&self, writer: &mut Writer) -> Result<(), SceneError> {
        let active = self.require_active("save the game")?;
        let mut cache = self.cache.clone();
        cache.store(active.as_str(), self.capture_active()?);

        writer.write_string(&active)?;
        cache.write_to(writer)?;
        info!(scene = %active, scenes = cache.len(), bytes = writer.len(), "saved game");
        Ok(())
    }

    /// [`save_all`](Self::save_all) into a fresh buffer.
    ///
    /// # Errors
    ///
    /// See [`save_all`](Self::save_all).
    pub fn save_to_bytes(&self) -> Result<Vec<u8>, SceneError> {
        let mut writer = Writer::new();
        self.save_all(&mut writer)?;
        Ok(writer.into_bytes())
    }

    /// Replace the whole game with one read from `reader`.
    ///
    /// The stream is decoded and every entity body validated before anything
    /// changes; a bad stream leaves the active scene and the cache as they
    /// were. Then the active scene is closed without saving, the cache is
    /// replaced, and the saved active scene is entered as
    /// [`switch_scene`](Self::switch_scene) would.
    ///
    /// # Errors
    ///
    /// Any decode error (nothing changed), or a host error during the
    /// switch.
    pub async fn load_all(&mut self, reader: &mut Reader<'_>) -> Result<(), SceneError> {
        let (active, cache) = self.read_game(reader)?;
        self.restore_game(active, cache).await
    }

    /// [`load_all`](Self::load_all) from a complete save file, rejecting
    /// trailing bytes.
    ///
    /// # Errors
    ///
    /// See [`load_all`](Self::load_all).
    pub async fn load_from_bytes(&mut self, bytes: &[u8]) -> Result<(), SceneError> {
        let mut reader = Reader::new(bytes)?;
        let (active, cache) = self.read_game(&mut reader)?;
        reader.finish()?;
        self.restore_game(active, cache).await
    }

    fn read_game(&self, reader: &mut Reader<'_>) -> Result<(String, SnapshotCache), SceneError> {
        let active = reader.read_string()?;
        let cache = SnapshotCache::read_from(reader)?;
        cache.validate(self.world.registry())?;
        Ok((active, cache))
    }

    async fn restore_game(&mut self, active: String, cache: SnapshotCache) -> Result<(), SceneError> {
        info!(scene = %active, scenes = cache.len(), "loading game");
        self.close_active(false).await?;
        self.cache = cache;
        self.enter(&active, true).await
    }

    fn capture_active(&self) -> Result<Vec<Snapshot>, PersistError> {
        self.world
            .roots()
            .iter()
            .map(|&root| Snapshot::capture(&self.world, root))
            .collect()
    }

    /// Close the active scene, if any, optionally caching its roots first.
    async fn close_active(&mut self, save: bool) -> Result<(), SceneError> {
        let SceneState::Active(name) = &self.state else {
            return Ok(());
        };
        let name = name.clone();
        self.state = SceneState::Closing(name.clone());

        if save {
            match self.capture_active() {
                Ok(roots) => {
                    debug!(scene = %name, roots = roots.len(), "captured scene");
                    self.cache.store(name.as_str(), roots);
                }
                Err(err) => {
                    self.state = SceneState::Active(name);
                    return Err(err.into());
                }
            }
        }

        let despawned = self.world.clear();
        let unloaded = self.host.unload_scene(&name).await;
        self.state = SceneState::NoActiveScene;
        if let Err(err) = unloaded {
            error!(scene = %name, error = %err, "failed to unload scene");
            return Err(err.into());
        }
        info!(scene = %name, saved = save, despawned, "closed scene");
        Ok(())
    }

    async fn enter(&mut self, name: &str, restore: bool) -> Result<(), SceneError> {
        self.state = SceneState::Loading(name.to_owned());
        let layout = match self.host.load_scene(name).await {
            Ok(layout) => layout,
            Err(err) => {
                error!(scene = name, error = %err, "failed to load scene");
                self.state = SceneState::NoActiveScene;
                return Err(err.into());
            }
        };

        let restored = self.build_scene(name, &layout, restore);
        self.state = SceneState::Active(name.to_owned());

        let (authored, restored) = restored?;
        info!(
            scene = name,
            authored,
            restored,
            roots = self.world.roots().len(),
            "scene active"
        );
        Ok(())
    }

    /// Populate the world from the layout, then apply the scene's cached
    /// entries if `restore` is set. Returns the number of authored and
    /// restored entities.
    fn build_scene(
        &mut self,
        name: &str,
        layout: &SceneLayout,
        restore: bool,
    ) -> Result<(usize, usize), PersistError> {
        let authored = self.populate(&layout.entities, None)?;
        let entries = if restore {
            self.cache.take(name)
        } else {
            Vec::new()
        };
        Ok((authored, self.reconcile(entries)))
    }

    /// Instantiate authored entities and their children. Returns how many
    /// were created; unknown templates are skipped with their children.
    fn populate(
        &mut self,
        entities: &[AuthoredEntity],
        parent: Option<EntityId>,
    ) -> Result<usize, PersistError> {
        let mut created = 0;
        for authored in entities {
            let Some(id) = self.world.instantiate(
                &authored.template_id,
                Some(authored.stable_id.clone()),
                parent,
            )?
            else {
                continue;
            };
            self.world.set_transform(id, authored.transform)?;
            created += 1 + self.populate(&authored.children, Some(id))?;
        }
        Ok(created)
    }

    /// Apply cached root entries to the freshly populated world. Returns how
    /// many entries were applied or instantiated; an entry that fails is
    /// logged and does not stop its siblings.
    fn reconcile(&mut self, entries: Vec<Snapshot>) -> usize {
        let (mut updated, mut spawned, mut failed) = (0, 0, 0);
        for entry in entries {
            let live = entry
                .stable_id
                .as_deref()
                .and_then(|stable_id| self.world.find_by_stable_id(stable_id));
            let result = match live {
                Some(id) => self
                    .world
                    .detach(id)
                    .and_then(|()| entry.apply_to(&mut self.world, id))
                    .map(|()| updated += 1),
                None => entry
                    .instantiate(&mut self.world, None)
                    .map(|created| spawned += usize::from(created.is_some())),
            };
            if let Err(err) = result {
                failed += 1;
                error!(
                    template_id = %entry.template_id,
                    stable_id = ?entry.stable_id,
                    error = %err,
                    "failed to restore cached entity"
                );
            }
        }
        debug!(updated, spawned, failed, "reconciled cached entities");
        updated + spawned
    }

    fn require_active(&self, operation: &'static str) -> Result<String, SceneError> {
        self.active_scene()
            .map(str::to_owned)
            .ok_or_else(|| self.invalid_state(operation))
    }

    fn invalid_state(&self, operation: &'static str) -> SceneError {
        SceneError::InvalidState {
            operation,
            state: self.state.clone(),
        }
    }
}
