//! In-memory `Vcs` for testing
//!
//! Holds one linear stack, oldest first. A revset naming a change id or
//! bookmark resolves to that revision; any other revset resolves to the
//! whole stack.

use async_trait::async_trait;
use jj_stack::error::{Error, Result};
use jj_stack::repo::Vcs;
use jj_stack::types::Revision;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

pub struct MockVcs {
    stack: Mutex<Vec<Revision>>,
    remote: String,
    remote_url: String,
    // Call tracking
    revset_calls: Mutex<Vec<String>>,
    bookmark_revsets: Mutex<Vec<String>>,
    chain_root_revsets: Mutex<Vec<String>>,
    set_bookmark_calls: Mutex<Vec<(String, String)>>,
    track_calls: Mutex<Vec<String>>,
    pushed: Mutex<Vec<String>>,
    abandoned: Mutex<Vec<String>>,
    rebases: Mutex<Vec<(String, String)>>,
    fetches: AtomicUsize,
    // Error injection
    error_on_push: Mutex<Option<String>>,
}

impl MockVcs {
    pub fn new(stack: Vec<Revision>) -> Self {
        Self {
            stack: Mutex::new(stack),
            remote: "origin".to_string(),
            remote_url: "git@github.com:owner/repo.git".to_string(),
            revset_calls: Mutex::new(Vec::new()),
            bookmark_revsets: Mutex::new(Vec::new()),
            chain_root_revsets: Mutex::new(Vec::new()),
            set_bookmark_calls: Mutex::new(Vec::new()),
            track_calls: Mutex::new(Vec::new()),
            pushed: Mutex::new(Vec::new()),
            abandoned: Mutex::new(Vec::new()),
            rebases: Mutex::new(Vec::new()),
            fetches: AtomicUsize::new(0),
            error_on_push: Mutex::new(None),
        }
    }

    pub fn fail_push(&self, msg: &str) {
        *self.error_on_push.lock().unwrap() = Some(msg.to_string());
    }

    /// Replace a revision in place, keyed by change id
    pub fn update(&self, revision: Revision) {
        let mut stack = self.stack.lock().unwrap();
        if let Some(slot) = stack
            .iter_mut()
            .find(|r| r.change_id == revision.change_id)
        {
            *slot = revision;
        }
    }

    pub fn stack(&self) -> Vec<Revision> {
        self.stack.lock().unwrap().clone()
    }

    pub fn get_revset_calls(&self) -> Vec<String> {
        self.revset_calls.lock().unwrap().clone()
    }

    pub fn get_bookmark_revsets(&self) -> Vec<String> {
        self.bookmark_revsets.lock().unwrap().clone()
    }

    pub fn get_chain_root_revsets(&self) -> Vec<String> {
        self.chain_root_revsets.lock().unwrap().clone()
    }

    pub fn get_set_bookmark_calls(&self) -> Vec<(String, String)> {
        self.set_bookmark_calls.lock().unwrap().clone()
    }

    pub fn get_track_calls(&self) -> Vec<String> {
        self.track_calls.lock().unwrap().clone()
    }

    pub fn get_pushed(&self) -> Vec<String> {
        self.pushed.lock().unwrap().clone()
    }

    pub fn get_abandoned(&self) -> Vec<String> {
        self.abandoned.lock().unwrap().clone()
    }

    pub fn get_rebases(&self) -> Vec<(String, String)> {
        self.rebases.lock().unwrap().clone()
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

fn names(revision: &Revision, rev: &str) -> bool {
    revision.change_id == rev || revision.bookmark.as_deref() == Some(rev)
}

#[async_trait]
impl Vcs for MockVcs {
    async fn revisions(&self, revset: &str) -> Result<Vec<Revision>> {
        self.revset_calls.lock().unwrap().push(revset.to_string());
        let stack = self.stack.lock().unwrap();
        if let Some(revision) = stack.iter().find(|r| names(r, revset)) {
            return Ok(vec![revision.clone()]);
        }
        Ok(stack.clone())
    }

    async fn fetch(&self) -> Result<()> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn set_bookmark(&self, name: &str, change_id: &str) -> Result<()> {
        self.set_bookmark_calls
            .lock()
            .unwrap()
            .push((name.to_string(), change_id.to_string()));
        let mut stack = self.stack.lock().unwrap();
        let revision = stack
            .iter_mut()
            .find(|r| r.change_id == change_id)
            .ok_or_else(|| Error::RevisionNotFound(change_id.to_string()))?;
        revision.bookmark = Some(name.to_string());
        Ok(())
    }

    async fn track_bookmark(&self, name: &str) -> Result<()> {
        self.track_calls.lock().unwrap().push(name.to_string());
        Ok(())
    }

    async fn push_bookmark(&self, name: &str) -> Result<()> {
        if let Some(msg) = self.error_on_push.lock().unwrap().clone() {
            return Err(Error::Jj {
                command: format!("git push -b {name}"),
                stderr: msg,
            });
        }
        self.pushed.lock().unwrap().push(name.to_string());
        let mut stack = self.stack.lock().unwrap();
        for revision in stack
            .iter_mut()
            .filter(|r| r.bookmark.as_deref() == Some(name))
        {
            revision.remote_outdated = false;
        }
        Ok(())
    }

    async fn abandon(&self, revs: &[String]) -> Result<()> {
        self.abandoned.lock().unwrap().extend(revs.iter().cloned());
        self.stack
            .lock()
            .unwrap()
            .retain(|r| !revs.iter().any(|rev| names(r, rev)));
        Ok(())
    }

    async fn rebase(&self, source: &str, destination: &str) -> Result<()> {
        self.rebases
            .lock()
            .unwrap()
            .push((source.to_string(), destination.to_string()));
        Ok(())
    }

    async fn chain_roots(&self, revset: &str) -> Result<Vec<String>> {
        self.chain_root_revsets
            .lock()
            .unwrap()
            .push(revset.to_string());
        Ok(self
            .stack
            .lock()
            .unwrap()
            .first()
            .map(|r| vec![r.change_id.clone()])
            .unwrap_or_default())
    }

    async fn bookmarks(&self, revset: &str) -> Result<Vec<String>> {
        self.bookmark_revsets
            .lock()
            .unwrap()
            .push(revset.to_string());
        Ok(self
            .stack
            .lock()
            .unwrap()
            .iter()
            .filter_map(|r| r.bookmark.clone())
            .collect())
    }

    async fn remote_url(&self, remote: &str) -> Result<String> {
        if remote == self.remote {
            Ok(self.remote_url.clone())
        } else {
            Err(Error::RemoteNotFound(remote.to_string()))
        }
    }

    fn remote(&self) -> &str {
        &self.remote
    }
}
