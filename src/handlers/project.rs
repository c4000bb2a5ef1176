//! Project handlers: CRUD on the local store plus live watching.

use std::time::Duration;

use anyhow::{anyhow, Result};
use owo_colors::OwoColorize;
use tokio::sync::mpsc;

use code_debugger::{
    config::Config,
    printer::print_project_line,
    store::{FileProjectStore, ProjectEvent, Session},
    Language,
};

pub struct ProjectHandler {
    store: FileProjectStore,
    user: String,
}

impl ProjectHandler {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            store: FileProjectStore::from_config(cfg),
            user: cfg.get("USER_ID").unwrap_or_else(|| "local".into()),
        }
    }

    pub fn list(&self) -> Result<()> {
        for p in self.store.list(&self.user)? {
            print_project_line(&p);
        }
        Ok(())
    }

    pub fn create(&self, name: &str, language: Language, code: Option<&str>) -> Result<()> {
        let p = self.store.create(&self.user, name, language, code)?;
        println!("Created project {} ({})", p.id, p.name);
        Ok(())
    }

    pub fn show(&self, id: &str) -> Result<()> {
        let p = self.store.get(&self.user, id)?;
        print_project_line(&p);
        println!("\n{}", p.code);
        Ok(())
    }

    pub fn save(&self, id: &str, code: &str) -> Result<()> {
        let p = self.store.update_code(&self.user, id, code)?;
        println!("Saved {} at {}", p.id, p.last_modified.to_rfc3339());
        Ok(())
    }

    pub fn delete(&self, id: &str) -> Result<()> {
        self.store.delete(&self.user, id)?;
        println!("Deleted {}", id);
        Ok(())
    }

    /// Prints every change to `id` until Ctrl-C.
    pub async fn watch(&self, id: &str, interval: Duration) -> Result<()> {
        // Fail fast on unknown ids instead of waiting silently.
        self.store.get(&self.user, id)?;

        let mut session = Session::new(self.user.clone());
        let (tx, mut rx) = mpsc::unbounded_channel();
        session.listeners.listen(self.store.clone(), &self.user, id, interval, tx);
        println!("Watching {} (Ctrl-C to stop)", id.magenta());

        loop {
            tokio::select! {
                ev = rx.recv() => match ev {
                    Some(ProjectEvent::Updated(p)) => {
                        print_project_line(&p);
                        println!("{}\n", p.code);
                    }
                    Some(ProjectEvent::Error(msg)) => eprintln!("{} {}", "listener error:".red(), msg),
                    None => break,
                },
                res = tokio::signal::ctrl_c() => {
                    res.map_err(|e| anyhow!("waiting for Ctrl-C: {}", e))?;
                    break;
                }
            }
        }
        session.sign_out();
        Ok(())
    }
}
