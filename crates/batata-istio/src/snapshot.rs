//! Resource Snapshot
//!
//! A snapshot is an immutable, versioned view of the mesh services. It is
//! created empty, built exactly once from a [`ResourceManager`], and then only
//! read by the generators. A newer registry view gets a new snapshot.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use chrono::Local;
use parking_lot::Mutex;
use tracing::{debug, info};

use crate::config::IstioConfig;
use crate::model::{IstioContext, IstioService};

/// Source of the current mesh services
pub trait ResourceManager: Send + Sync {
    /// Current mesh services keyed by display name
    fn services(&self) -> BTreeMap<String, Arc<IstioService>>;
}

/// Supplies the numeric part of snapshot versions
pub trait VersionCounter: Send + Sync {
    /// Next value; must never repeat within the process
    fn next(&self) -> u64;
}

/// Process-lifetime counter starting at 0
#[derive(Debug, Default)]
pub struct MonotonicVersionCounter {
    next: AtomicU64,
}

impl MonotonicVersionCounter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl VersionCounter for MonotonicVersionCounter {
    fn next(&self) -> u64 {
        self.next.fetch_add(1, Ordering::SeqCst)
    }
}

#[derive(Debug)]
struct Built {
    context: IstioContext,
    version: String,
    version_number: u64,
}

/// Build-once view of the mesh services
pub struct ResourceSnapshot {
    config: Arc<IstioConfig>,
    counter: Arc<dyn VersionCounter>,
    built: OnceLock<Built>,
    build_lock: Mutex<()>,
}

impl ResourceSnapshot {
    /// Create an empty, not yet initialized snapshot
    pub fn new(config: Arc<IstioConfig>, counter: Arc<dyn VersionCounter>) -> Self {
        Self {
            config,
            counter,
            built: OnceLock::new(),
            build_lock: Mutex::new(()),
        }
    }

    /// Pull the services from `manager` and assign a version.
    ///
    /// Only the first call does any work; concurrent callers wait for it and
    /// later calls return immediately.
    pub fn initialize(&self, manager: &dyn ResourceManager) {
        if self.built.get().is_some() {
            return;
        }

        let _guard = self.build_lock.lock();
        if self.built.get().is_some() {
            return;
        }

        let context = IstioContext::new(manager.services());
        let version_number = self.counter.next();
        let version = format!(
            "{}/{}",
            Local::now().format("%Y-%m-%dT%H:%M:%S%:z"),
            version_number
        );

        info!(
            version = %version,
            services = context.len(),
            hosts = context.host_count(),
            "Resource snapshot built"
        );

        if self
            .built
            .set(Built {
                context,
                version,
                version_number,
            })
            .is_err()
        {
            debug!("Resource snapshot was already built");
        }
    }

    pub fn is_completed(&self) -> bool {
        self.built.get().is_some()
    }

    /// Mesh services, `None` until initialized
    pub fn context(&self) -> Option<&IstioContext> {
        self.built.get().map(|b| &b.context)
    }

    /// `<timestamp>/<n>`, `None` until initialized
    pub fn version(&self) -> Option<&str> {
        self.built.get().map(|b| b.version.as_str())
    }

    /// The `<n>` part of the version; strictly increasing across snapshots
    pub fn version_number(&self) -> Option<u64> {
        self.built.get().map(|b| b.version_number)
    }

    pub fn config(&self) -> &IstioConfig {
        &self.config
    }
}

impl std::fmt::Debug for ResourceSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceSnapshot")
            .field("version", &self.version())
            .field("services", &self.context().map(IstioContext::len))
            .finish()
    }
}

/// Creates snapshots sharing one configuration and one version counter
#[derive(Clone)]
pub struct SnapshotFactory {
    config: Arc<IstioConfig>,
    counter: Arc<dyn VersionCounter>,
}

impl SnapshotFactory {
    pub fn new(config: IstioConfig) -> Self {
        Self::with_counter(Arc::new(config), Arc::new(MonotonicVersionCounter::new()))
    }

    pub fn with_counter(config: Arc<IstioConfig>, counter: Arc<dyn VersionCounter>) -> Self {
        Self { config, counter }
    }

    pub fn config(&self) -> &Arc<IstioConfig> {
        &self.config
    }

    /// Empty snapshot, to be initialized by the caller
    pub fn create(&self) -> ResourceSnapshot {
        ResourceSnapshot::new(self.config.clone(), self.counter.clone())
    }

    /// Snapshot initialized from the manager's current services
    pub fn build(&self, manager: &dyn ResourceManager) -> Arc<ResourceSnapshot> {
        let snapshot = self.create();
        snapshot.initialize(manager);
        Arc::new(snapshot)
    }
}
