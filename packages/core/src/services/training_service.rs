//! Training Service
//!
//! The single logical writer over the app state. All mutations - logging,
//! hierarchy edits, device-originated logs - funnel through this service,
//! which keeps the in-memory tree and journal consistent, persists changes
//! through the injected store, and mirrors the hierarchy to a paired watch.
//!
//! # Persistence policy
//!
//! Additive writes (new logs, hierarchy edits) never fail the caller: a
//! failed write is retried once, then abandoned with a warning, leaving the
//! in-memory state authoritative until the next successful save. Destructive
//! operations (deleting a log or a subtree) surface persistence failures as
//! [`ServiceError::PersistenceFailed`] so the caller can reload.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::bridge::{WatchBridge, WatchMessage};
use crate::db::TrainingStore;
use crate::models::{seed, Journal, NodeUpdate, TrainingNode, WorkoutLog, UNKNOWN_NODE_NAME};
use crate::services::error::ServiceError;

/// Application-context key under which the hierarchy is mirrored to the
/// paired device.
const WATCH_CONTEXT_KEY: &str = "trainingData";

/// Journal counters for the dashboard header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionCounts {
    pub total: usize,
    pub today: usize,
}

struct AppState {
    tree: TrainingNode,
    journal: Journal,
}

/// Orchestrates the training hierarchy, workout journal, persistence and the
/// companion device bridge.
pub struct TrainingService {
    state: Mutex<AppState>,
    store: Arc<dyn TrainingStore>,
    bridge: Option<Arc<WatchBridge>>,
    watch_task: Mutex<Option<JoinHandle<()>>>,
}

impl TrainingService {
    /// Load state from the store and start the service. With a bridge
    /// attached, a background task serializes device-logged workouts through
    /// the same mutation path as local ones.
    pub async fn load(
        store: Arc<dyn TrainingStore>,
        bridge: Option<Arc<WatchBridge>>,
    ) -> anyhow::Result<Arc<Self>> {
        let tree = store.load_tree().await?;
        let logs = match store.load_logs().await {
            Ok(logs) => logs,
            Err(e) => {
                warn!("Stored logs unreadable, falling back to defaults: {e}");
                seed::default_logs()
            }
        };
        info!(
            nodes = tree.node_count(),
            logs = logs.len(),
            "training service loaded"
        );

        let service = Arc::new(Self {
            state: Mutex::new(AppState {
                tree,
                journal: Journal::new(logs),
            }),
            store,
            bridge: bridge.clone(),
            watch_task: Mutex::new(None),
        });

        if let Some(bridge) = bridge {
            let handle = spawn_watch_listener(&service, &bridge);
            *service.watch_task.lock().await = Some(handle);
        }
        Ok(service)
    }

    /// Stop the device listener. Messages arriving afterwards go nowhere.
    pub async fn shutdown(&self) {
        if let Some(handle) = self.watch_task.lock().await.take() {
            handle.abort();
        }
    }

    // --- Snapshots ---

    pub async fn tree(&self) -> TrainingNode {
        self.state.lock().await.tree.clone()
    }

    pub async fn logs(&self) -> Vec<WorkoutLog> {
        self.state.lock().await.journal.entries().to_vec()
    }

    pub async fn recent_logs(&self, n: usize) -> Vec<WorkoutLog> {
        self.state.lock().await.journal.recent(n).to_vec()
    }

    /// Node-id to color map for chart rendering.
    pub async fn color_index(&self) -> HashMap<String, String> {
        self.state.lock().await.tree.color_index()
    }

    pub async fn session_counts(&self, now: DateTime<Utc>) -> SessionCounts {
        let state = self.state.lock().await;
        SessionCounts {
            total: state.journal.len(),
            today: state.journal.logged_today(now),
        }
    }

    // --- Logging ---

    /// Log a workout against `node_id` at the current time.
    pub async fn log_workout(
        &self,
        node_id: &str,
        value: f64,
        notes: Option<String>,
    ) -> WorkoutLog {
        self.log_workout_at(node_id, value, notes, Utc::now()).await
    }

    /// Log a workout with an explicit timestamp. Unknown node ids are
    /// accepted and display as [`UNKNOWN_NODE_NAME`]; they contribute no
    /// tree value.
    pub async fn log_workout_at(
        &self,
        node_id: &str,
        value: f64,
        notes: Option<String>,
        logged_at: DateTime<Utc>,
    ) -> WorkoutLog {
        let log = {
            let mut state = self.state.lock().await;
            let name = state
                .tree
                .name_of(node_id)
                .unwrap_or(UNKNOWN_NODE_NAME)
                .to_string();
            let log = WorkoutLog::new(node_id, name, value, notes, logged_at);
            state.journal.record(log.clone());
            state.tree = state.tree.with_value_delta(node_id, value);
            log
        };

        self.persist_log_write(&log).await;
        self.mirror_tree().await;
        log
    }

    /// Apply a log that was recorded on the companion device.
    async fn apply_device_log(&self, log: WorkoutLog) {
        debug!(node_id = %log.node_id, value = log.value, "device log received");
        {
            let mut state = self.state.lock().await;
            state.tree = state.tree.with_value_delta(&log.node_id, log.value);
            state.journal.record(log.clone());
        }
        self.persist_log_write(&log).await;
        self.mirror_tree().await;
    }

    /// Delete a log and reverse its value contribution (floored at zero).
    pub async fn delete_log(&self, log_id: &str) -> Result<WorkoutLog, ServiceError> {
        let log = {
            let mut state = self.state.lock().await;
            let log = state
                .journal
                .remove(log_id)
                .ok_or_else(|| ServiceError::log_not_found(log_id))?;
            state.tree = state.tree.with_value_delta(&log.node_id, -log.value);
            log
        };

        self.store
            .delete_log(log_id)
            .await
            .map_err(|e| ServiceError::persistence_failed("workout log deletion", e))?;
        self.store
            .adjust_node_value(&log.node_id, -log.value)
            .await
            .map_err(|e| ServiceError::persistence_failed("node value reversal", e))?;
        self.mirror_tree().await;
        Ok(log)
    }

    // --- Hierarchy edits ---

    /// Add a new child under `parent_id` and return the updated tree.
    /// Unknown parents leave the tree unchanged.
    pub async fn add_child(&self, parent_id: &str) -> TrainingNode {
        let tree = {
            let mut state = self.state.lock().await;
            state.tree = state.tree.with_child_added(parent_id);
            state.tree.clone()
        };
        self.persist_tree(&tree).await;
        self.mirror_tree().await;
        tree
    }

    /// Rename and/or recolor a node. Unknown ids are a no-op.
    pub async fn update_node(&self, node_id: &str, update: &NodeUpdate) -> TrainingNode {
        let tree = {
            let mut state = self.state.lock().await;
            state.tree = state.tree.with_node_updated(node_id, update);
            state.tree.clone()
        };
        self.persist_tree(&tree).await;
        self.mirror_tree().await;
        tree
    }

    /// Delete a node and its whole subtree, purging every log that
    /// references a removed node. The root is protected; unknown ids are a
    /// no-op.
    pub async fn delete_node(&self, node_id: &str) -> Result<(), ServiceError> {
        let (tree, dropped) = {
            let mut state = self.state.lock().await;
            if node_id == TrainingNode::ROOT_ID || state.tree.id == node_id {
                return Err(ServiceError::protected_node(node_id));
            }
            let Some(tree) = state.tree.with_subtree_removed(node_id) else {
                return Err(ServiceError::protected_node(node_id));
            };
            let removed_ids = state.tree.subtree_ids(node_id);
            let dropped = state.journal.retain_outside(&removed_ids);
            state.tree = tree.clone();
            (tree, dropped)
        };
        info!(
            node_id,
            purged_logs = dropped.len(),
            "deleted hierarchy subtree"
        );

        self.store
            .save_tree(&tree)
            .await
            .map_err(|e| ServiceError::persistence_failed("hierarchy deletion", e))?;
        for log in &dropped {
            self.store
                .delete_log(&log.id)
                .await
                .map_err(|e| ServiceError::persistence_failed("log purge", e))?;
        }
        self.mirror_tree().await;
        Ok(())
    }

    /// Restore the seed hierarchy and log history.
    pub async fn reset(&self) -> Result<(), ServiceError> {
        {
            let mut state = self.state.lock().await;
            state.tree = seed::default_tree();
            state.journal = Journal::new(seed::default_logs());
        }
        self.store
            .reset()
            .await
            .map_err(|e| ServiceError::persistence_failed("reset", e))?;
        self.mirror_tree().await;
        Ok(())
    }

    // --- Persistence helpers ---

    /// Persist an additive log write: the journal row plus the paired node
    /// value adjustment. Each write is retried once, then abandoned.
    async fn persist_log_write(&self, log: &WorkoutLog) {
        if let Err(e) = self.store.save_log(log).await {
            warn!("Failed to save workout log, retrying: {e}");
            if let Err(e) = self.store.save_log(log).await {
                warn!("Abandoning workout log save: {e}");
            }
        }
        if let Err(e) = self.store.adjust_node_value(&log.node_id, log.value).await {
            warn!("Failed to adjust node value, retrying: {e}");
            if let Err(e) = self.store.adjust_node_value(&log.node_id, log.value).await {
                warn!("Abandoning node value adjustment: {e}");
            }
        }
    }

    async fn persist_tree(&self, tree: &TrainingNode) {
        if let Err(e) = self.store.save_tree(tree).await {
            warn!("Failed to save hierarchy, retrying: {e}");
            if let Err(e) = self.store.save_tree(tree).await {
                warn!("Abandoning hierarchy save: {e}");
            }
        }
    }

    /// Mirror the current hierarchy to the paired device, if any.
    async fn mirror_tree(&self) {
        let Some(bridge) = &self.bridge else {
            return;
        };
        let tree = self.state.lock().await.tree.clone();
        match serde_json::to_value(&tree) {
            Ok(payload) => {
                bridge.push_context(WATCH_CONTEXT_KEY, payload);
            }
            Err(e) => warn!("Failed to encode hierarchy for device mirror: {e}"),
        }
    }
}

fn spawn_watch_listener(service: &Arc<TrainingService>, bridge: &WatchBridge) -> JoinHandle<()> {
    let mut rx = bridge.subscribe_inbound();
    let weak = Arc::downgrade(service);
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(WatchMessage::WorkoutLog(log)) => {
                    let Some(service) = weak.upgrade() else {
                        break;
                    };
                    service.apply_device_log(log).await;
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!("Watch listener lagged, {skipped} messages dropped");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

#[cfg(test)]
#[path = "training_service_test.rs"]
mod training_service_test;
