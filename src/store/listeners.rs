//! Live project subscriptions, owned by the signed-in session.

use std::{collections::HashMap, time::Duration};

use tokio::{sync::mpsc, task::JoinHandle, time::sleep};

use super::{FileProjectStore, Project};

#[derive(Debug, Clone, PartialEq)]
pub enum ProjectEvent {
    Updated(Project),
    Error(String),
}

/// Maps project id → running watch task. Cancels whatever it still holds when dropped.
#[derive(Debug, Default)]
pub struct ListenerRegistry {
    listeners: HashMap<String, JoinHandle<()>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts watching `id`, replacing any previous listener for it.
    ///
    /// The current document is delivered first, then every change to it.
    /// A missing document produces no events until it appears.
    pub fn listen(
        &mut self,
        store: FileProjectStore,
        user: &str,
        id: &str,
        interval: Duration,
        tx: mpsc::UnboundedSender<ProjectEvent>,
    ) {
        self.stop(id);
        let user = user.to_string();
        let project_id = id.to_string();
        let handle = tokio::spawn(async move {
            let mut seen = None;
            loop {
                let stamp = store.modified_at(&user, &project_id);
                if stamp.is_some() && stamp != seen {
                    seen = stamp;
                    let event = match store.get(&user, &project_id) {
                        Ok(project) => ProjectEvent::Updated(project),
                        Err(e) => {
                            log::warn!("listener for {} failed: {}", project_id, e);
                            ProjectEvent::Error(e.to_string())
                        }
                    };
                    if tx.send(event).is_err() {
                        break;
                    }
                }
                if tx.is_closed() {
                    break;
                }
                sleep(interval).await;
            }
            log::debug!("listener for {} finished", project_id);
        });
        self.listeners.insert(id.to_string(), handle);
    }

    pub fn stop(&mut self, id: &str) -> bool {
        match self.listeners.remove(id) {
            Some(handle) => {
                handle.abort();
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        for (_, handle) in self.listeners.drain() {
            handle.abort();
        }
    }

    pub fn active(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.listeners.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn is_listening(&self, id: &str) -> bool {
        self.listeners.contains_key(id)
    }
}

impl Drop for ListenerRegistry {
    fn drop(&mut self) {
        self.clear();
    }
}

/// The signed-in user and the subscriptions opened on their behalf.
#[derive(Debug)]
pub struct Session {
    pub user_id: String,
    pub listeners: ListenerRegistry,
}

impl Session {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self { user_id: user_id.into(), listeners: ListenerRegistry::new() }
    }

    pub fn sign_out(mut self) {
        self.listeners.clear();
        log::info!("signed out {}", self.user_id);
    }
}
