use crate::alias_map::AliasMap;
use crate::artifact_store::ArtifactStore;
use anyhow::{Result, anyhow};
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use micromegas_tracing::prelude::*;
use std::sync::{Arc, Mutex};

type SharedLoad = Shared<BoxFuture<'static, Result<Arc<AliasMap>, Arc<anyhow::Error>>>>;

enum CacheState {
    Empty,
    Populating(SharedLoad),
    Populated(Arc<AliasMap>),
}

/// Observable state of an [`AliasMapCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Empty,
    Populating,
    Populated,
}

/// Read-through cache of the published alias map.
///
/// - Lazy loading: the artifact is read on first use
/// - Single flight: callers arriving while a load is in progress await that same load
/// - No expiry: a populated map is served until [`AliasMapCache::invalidate`] or process exit
/// - A populated but empty map is treated as missing and reloaded
pub struct AliasMapCache {
    store: Arc<ArtifactStore>,
    state: Mutex<CacheState>,
}

impl AliasMapCache {
    pub fn new(store: Arc<ArtifactStore>) -> Self {
        Self {
            store,
            state: Mutex::new(CacheState::Empty),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, CacheState>> {
        self.state
            .lock()
            .map_err(|_| anyhow!("alias map cache lock poisoned"))
    }

    pub fn status(&self) -> Result<CacheStatus> {
        Ok(match &*self.lock()? {
            CacheState::Empty => CacheStatus::Empty,
            CacheState::Populating(_) => CacheStatus::Populating,
            CacheState::Populated(_) => CacheStatus::Populated,
        })
    }

    pub async fn get(&self) -> Result<Arc<AliasMap>> {
        let load = {
            let mut state = self.lock()?;
            match &*state {
                CacheState::Populated(map) if !map.is_empty() => return Ok(map.clone()),
                CacheState::Populating(load) => load.clone(),
                _ => {
                    let load = Self::load(self.store.clone()).boxed().shared();
                    *state = CacheState::Populating(load.clone());
                    load
                }
            }
        };

        let result = load.clone().await;
        let mut state = self.lock()?;
        let owns_state =
            matches!(&*state, CacheState::Populating(current) if current.ptr_eq(&load));
        match result {
            Ok(map) => {
                if owns_state {
                    *state = CacheState::Populated(map.clone());
                }
                Ok(map)
            }
            Err(e) => {
                if owns_state {
                    *state = CacheState::Empty;
                }
                Err(anyhow!("loading alias map: {e:?}"))
            }
        }
    }

    async fn load(store: Arc<ArtifactStore>) -> Result<Arc<AliasMap>, Arc<anyhow::Error>> {
        let map = store.read_alias_map().await.map_err(Arc::new)?;
        info!(
            "alias map not in cache, read {} assets from {}",
            map.nb_assets(),
            store.artifact_url()
        );
        Ok(Arc::new(map))
    }

    /// Loads the map ahead of the first batch. A failure is logged and retried on first use.
    pub async fn warm_up(&self) {
        if let Err(e) = self.get().await {
            warn!("warming up alias map cache: {e:?}");
        }
    }

    /// Forgets the cached map; the next [`AliasMapCache::get`] reads the artifact again.
    pub fn invalidate(&self) -> Result<()> {
        *self.lock()? = CacheState::Empty;
        Ok(())
    }
}
