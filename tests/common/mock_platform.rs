//! Mock platform service for testing
//!
//! Keeps an in-memory set of PRs keyed by head branch, so orchestrators see
//! the effects of their own calls (a PR created on one run is found on the
//! next).
//!
//! Features:
//! - Auto-incrementing PR and comment ids
//! - Call tracking for verification
//! - Scripted merge data per PR
//! - Error injection for failure path testing

use async_trait::async_trait;
use jj_stack::error::{Error, Result};
use jj_stack::platform::PlatformService;
use jj_stack::types::{MergeData, MergeMethod, PlatformConfig, PrComment, PrState, PullRequest};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

use super::fixtures::{github_config, mergeable, pr_url};

/// Call record for `create_pr`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePrCall {
    pub head: String,
    pub base: String,
    pub title: String,
    pub draft: bool,
}

/// Call record for `update_pr`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdatePrCall {
    pub pr_number: u64,
    pub title: String,
    pub base: String,
}

pub struct MockPlatformService {
    config: PlatformConfig,
    login: String,
    default_branch: String,
    next_pr_number: AtomicU64,
    next_comment_id: AtomicU64,
    prs: Mutex<HashMap<String, PullRequest>>,
    comments: Mutex<HashMap<u64, Vec<PrComment>>>,
    merge_data: Mutex<HashMap<u64, VecDeque<MergeData>>>,
    // Call tracking
    find_pr_calls: Mutex<Vec<String>>,
    create_pr_calls: Mutex<Vec<CreatePrCall>>,
    update_pr_calls: Mutex<Vec<UpdatePrCall>>,
    merge_data_calls: Mutex<Vec<u64>>,
    ready_calls: Mutex<Vec<u64>>,
    merge_calls: Mutex<Vec<(u64, MergeMethod)>>,
    close_calls: Mutex<Vec<u64>>,
    deleted_branches: Mutex<Vec<String>>,
    current_user_calls: AtomicUsize,
    is_merged_calls: AtomicUsize,
    // Error injection
    reject_drafts: AtomicBool,
    error_on_create_pr: Mutex<Option<String>>,
    error_on_merge_data: Mutex<Option<String>>,
    error_on_delete_branch: Mutex<Option<String>>,
    is_merged_failures: AtomicUsize,
}

impl Default for MockPlatformService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockPlatformService {
    pub fn new() -> Self {
        Self {
            config: github_config(),
            login: "alice".to_string(),
            default_branch: "main".to_string(),
            next_pr_number: AtomicU64::new(1),
            next_comment_id: AtomicU64::new(1000),
            prs: Mutex::new(HashMap::new()),
            comments: Mutex::new(HashMap::new()),
            merge_data: Mutex::new(HashMap::new()),
            find_pr_calls: Mutex::new(Vec::new()),
            create_pr_calls: Mutex::new(Vec::new()),
            update_pr_calls: Mutex::new(Vec::new()),
            merge_data_calls: Mutex::new(Vec::new()),
            ready_calls: Mutex::new(Vec::new()),
            merge_calls: Mutex::new(Vec::new()),
            close_calls: Mutex::new(Vec::new()),
            deleted_branches: Mutex::new(Vec::new()),
            current_user_calls: AtomicUsize::new(0),
            is_merged_calls: AtomicUsize::new(0),
            reject_drafts: AtomicBool::new(false),
            error_on_create_pr: Mutex::new(None),
            error_on_merge_data: Mutex::new(None),
            error_on_delete_branch: Mutex::new(None),
            is_merged_failures: AtomicUsize::new(0),
        }
    }

    // === Setup ===

    /// Register an existing PR; later PR numbers are allocated above it
    pub fn add_pr(&self, pr: PullRequest) {
        self.next_pr_number
            .fetch_max(pr.number + 1, Ordering::SeqCst);
        self.prs.lock().unwrap().insert(pr.head_ref.clone(), pr);
    }

    /// Responses for successive `get_merge_data` calls; the last one repeats
    pub fn script_merge_data(&self, pr_number: u64, responses: Vec<MergeData>) {
        self.merge_data
            .lock()
            .unwrap()
            .insert(pr_number, responses.into());
    }

    pub fn set_comments(&self, pr_number: u64, comments: Vec<PrComment>) {
        self.comments.lock().unwrap().insert(pr_number, comments);
    }

    // === Error injection ===

    /// Refuse draft PRs the way a repository without draft support does
    pub fn reject_drafts(&self) {
        self.reject_drafts.store(true, Ordering::SeqCst);
    }

    /// Make the next `create_pr` fail
    pub fn fail_create_pr_once(&self, msg: &str) {
        *self.error_on_create_pr.lock().unwrap() = Some(msg.to_string());
    }

    pub fn fail_merge_data(&self, msg: &str) {
        *self.error_on_merge_data.lock().unwrap() = Some(msg.to_string());
    }

    pub fn fail_delete_branch(&self, msg: &str) {
        *self.error_on_delete_branch.lock().unwrap() = Some(msg.to_string());
    }

    /// Make the next `n` merge-status checks fail
    pub fn fail_is_merged_times(&self, n: usize) {
        self.is_merged_failures.store(n, Ordering::SeqCst);
    }

    // === Inspection ===

    pub fn pr(&self, branch: &str) -> Option<PullRequest> {
        self.prs.lock().unwrap().get(branch).cloned()
    }

    pub fn comments(&self, pr_number: u64) -> Vec<PrComment> {
        self.comments
            .lock()
            .unwrap()
            .get(&pr_number)
            .cloned()
            .unwrap_or_default()
    }

    pub fn get_find_pr_calls(&self) -> Vec<String> {
        self.find_pr_calls.lock().unwrap().clone()
    }

    pub fn get_create_pr_calls(&self) -> Vec<CreatePrCall> {
        self.create_pr_calls.lock().unwrap().clone()
    }

    pub fn get_update_pr_calls(&self) -> Vec<UpdatePrCall> {
        self.update_pr_calls.lock().unwrap().clone()
    }

    pub fn get_merge_data_calls(&self) -> Vec<u64> {
        self.merge_data_calls.lock().unwrap().clone()
    }

    pub fn is_merged_calls(&self) -> usize {
        self.is_merged_calls.load(Ordering::SeqCst)
    }

    pub fn get_ready_calls(&self) -> Vec<u64> {
        self.ready_calls.lock().unwrap().clone()
    }

    pub fn get_merge_calls(&self) -> Vec<(u64, MergeMethod)> {
        self.merge_calls.lock().unwrap().clone()
    }

    pub fn get_close_calls(&self) -> Vec<u64> {
        self.close_calls.lock().unwrap().clone()
    }

    pub fn get_deleted_branches(&self) -> Vec<String> {
        self.deleted_branches.lock().unwrap().clone()
    }

    pub fn current_user_calls(&self) -> usize {
        self.current_user_calls.load(Ordering::SeqCst)
    }

    fn with_pr<T>(&self, pr_number: u64, f: impl FnOnce(&mut PullRequest) -> T) -> Result<T> {
        self.prs
            .lock()
            .unwrap()
            .values_mut()
            .find(|pr| pr.number == pr_number)
            .map(f)
            .ok_or_else(|| Error::GitHubApi(format!("PR #{pr_number} not found")))
    }
}

#[async_trait]
impl PlatformService for MockPlatformService {
    async fn find_pr_by_branch(&self, head_branch: &str) -> Result<Option<PullRequest>> {
        self.find_pr_calls
            .lock()
            .unwrap()
            .push(head_branch.to_string());
        Ok(self.pr(head_branch))
    }

    async fn create_pr(
        &self,
        head: &str,
        base: &str,
        title: &str,
        draft: bool,
    ) -> Result<PullRequest> {
        self.create_pr_calls.lock().unwrap().push(CreatePrCall {
            head: head.to_string(),
            base: base.to_string(),
            title: title.to_string(),
            draft,
        });

        if let Some(msg) = self.error_on_create_pr.lock().unwrap().take() {
            return Err(Error::GitHubApi(msg));
        }
        if draft && self.reject_drafts.load(Ordering::SeqCst) {
            return Err(Error::DraftPrsUnsupported);
        }

        let number = self.next_pr_number.fetch_add(1, Ordering::SeqCst);
        let pr = PullRequest {
            number,
            html_url: pr_url(number),
            base_ref: base.to_string(),
            head_ref: head.to_string(),
            title: title.to_string(),
            state: PrState::Open,
            node_id: Some(format!("PR_node{number}")),
            is_draft: draft,
        };
        self.prs
            .lock()
            .unwrap()
            .insert(head.to_string(), pr.clone());
        Ok(pr)
    }

    async fn update_pr(&self, pr_number: u64, title: &str, base: &str) -> Result<PullRequest> {
        self.update_pr_calls.lock().unwrap().push(UpdatePrCall {
            pr_number,
            title: title.to_string(),
            base: base.to_string(),
        });
        self.with_pr(pr_number, |pr| {
            pr.title = title.to_string();
            pr.base_ref = base.to_string();
            pr.clone()
        })
    }

    async fn close_pr(&self, pr_number: u64) -> Result<()> {
        self.close_calls.lock().unwrap().push(pr_number);
        self.with_pr(pr_number, |pr| pr.state = PrState::Closed)
    }

    async fn get_merge_data(&self, pr_number: u64) -> Result<MergeData> {
        self.merge_data_calls.lock().unwrap().push(pr_number);
        if let Some(msg) = self.error_on_merge_data.lock().unwrap().clone() {
            return Err(Error::GitHubApi(msg));
        }

        let mut scripts = self.merge_data.lock().unwrap();
        let data = match scripts.get_mut(&pr_number) {
            Some(queue) if queue.len() > 1 => queue.pop_front(),
            Some(queue) => queue.front().cloned(),
            None => None,
        };
        Ok(data.unwrap_or_else(mergeable))
    }

    async fn mark_ready_for_review(&self, pr: &PullRequest) -> Result<()> {
        self.ready_calls.lock().unwrap().push(pr.number);
        self.with_pr(pr.number, |pr| pr.is_draft = false)
    }

    async fn merge_pr(&self, pr_number: u64, method: MergeMethod) -> Result<()> {
        self.merge_calls.lock().unwrap().push((pr_number, method));
        self.with_pr(pr_number, |pr| pr.state = PrState::Merged)
    }

    async fn is_merged(&self, pr_number: u64) -> Result<bool> {
        self.is_merged_calls.fetch_add(1, Ordering::SeqCst);
        let failing = self
            .is_merged_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(Error::GitHubApi("secondary rate limit".to_string()));
        }
        self.with_pr(pr_number, |pr| pr.state == PrState::Merged)
    }

    async fn list_pr_comments(&self, pr_number: u64) -> Result<Vec<PrComment>> {
        Ok(self.comments(pr_number))
    }

    async fn create_pr_comment(&self, pr_number: u64, body: &str) -> Result<()> {
        let id = self.next_comment_id.fetch_add(1, Ordering::SeqCst);
        self.comments
            .lock()
            .unwrap()
            .entry(pr_number)
            .or_default()
            .push(PrComment {
                id,
                body: body.to_string(),
            });
        Ok(())
    }

    async fn update_pr_comment(&self, pr_number: u64, comment_id: u64, body: &str) -> Result<()> {
        let mut comments = self.comments.lock().unwrap();
        let comment = comments
            .get_mut(&pr_number)
            .and_then(|list| list.iter_mut().find(|c| c.id == comment_id))
            .ok_or_else(|| Error::GitHubApi(format!("comment {comment_id} not found")))?;
        comment.body = body.to_string();
        Ok(())
    }

    async fn delete_pr_comment(&self, pr_number: u64, comment_id: u64) -> Result<()> {
        if let Some(list) = self.comments.lock().unwrap().get_mut(&pr_number) {
            list.retain(|c| c.id != comment_id);
        }
        Ok(())
    }

    async fn delete_branch(&self, branch: &str) -> Result<()> {
        if let Some(msg) = self.error_on_delete_branch.lock().unwrap().clone() {
            return Err(Error::GitHubApi(msg));
        }
        self.deleted_branches
            .lock()
            .unwrap()
            .push(branch.to_string());
        Ok(())
    }

    async fn current_user(&self) -> Result<String> {
        self.current_user_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.login.clone())
    }

    async fn default_branch(&self) -> Result<String> {
        Ok(self.default_branch.clone())
    }

    fn config(&self) -> &PlatformConfig {
        &self.config
    }
}
