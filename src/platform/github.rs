//! GitHub platform service implementation

use crate::error::{Error, Result};
use crate::platform::PlatformService;
use crate::types::{
    MergeData, MergeMethod, MergeableState, PlatformConfig, PrComment, PrState, PullRequest,
    ReviewDecision, StatusState,
};
use async_trait::async_trait;
use octocrab::Octocrab;
use octocrab::models::{CommentId, IssueState};
use serde::Deserialize;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

const MERGE_DATA_QUERY: &str = r"
    query getPrMergeData($owner: String!, $repo: String!, $prNumber: Int!) {
        repository(owner: $owner, name: $repo) {
            pullRequest(number: $prNumber) {
                reviewDecision
                mergeable
                canBeRebased
                statusCheckRollup {
                    state
                }
            }
        }
    }
";

const MARK_READY_MUTATION: &str = r"
    mutation MarkPullRequestReadyForReview($pullRequestId: ID!) {
        markPullRequestReadyForReview(input: { pullRequestId: $pullRequestId }) {
            pullRequest {
                number
            }
        }
    }
";

#[derive(Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Deserialize)]
struct GraphQlError {
    message: String,
}

impl<T> GraphQlResponse<T> {
    fn into_data(self) -> std::result::Result<T, String> {
        if let Some(errors) = self.errors
            && !errors.is_empty()
        {
            let messages: Vec<_> = errors.into_iter().map(|e| e.message).collect();
            return Err(messages.join(", "));
        }
        self.data
            .ok_or_else(|| "no data in GraphQL response".to_string())
    }
}

#[derive(Deserialize)]
struct MergeDataQuery {
    repository: Option<MergeDataRepository>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MergeDataRepository {
    pull_request: Option<GraphQlMergeData>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GraphQlMergeData {
    review_decision: Option<ReviewDecision>,
    mergeable: MergeableState,
    can_be_rebased: bool,
    status_check_rollup: Option<StatusCheckRollup>,
}

#[derive(Deserialize)]
struct StatusCheckRollup {
    state: StatusState,
}

impl From<GraphQlMergeData> for MergeData {
    fn from(data: GraphQlMergeData) -> Self {
        Self {
            review_decision: data.review_decision,
            mergeable: data.mergeable,
            can_be_rebased: data.can_be_rebased,
            status_check_rollup: data.status_check_rollup.map(|rollup| rollup.state),
        }
    }
}

/// Whether a PR creation failure means the repository rejects drafts
///
/// GitHub answers 422 with "Draft pull requests are not supported in this
/// repository" on plans without draft support.
pub fn is_draft_unsupported(message: &str) -> bool {
    message.contains("Draft pull requests are not supported")
}

/// GitHub service using octocrab
pub struct GitHubService {
    client: Octocrab,
    config: PlatformConfig,
    current_user: OnceCell<String>,
    default_branch: OnceCell<String>,
}

impl GitHubService {
    /// Create a new GitHub service
    pub fn new(token: &str, owner: String, repo: String, host: Option<String>) -> Result<Self> {
        let mut builder = Octocrab::builder().personal_token(token.to_string());

        if let Some(ref h) = host {
            let base_url = format!("https://{h}/api/v3");
            builder = builder
                .base_uri(&base_url)
                .map_err(|e| Error::GitHubApi(e.to_string()))?;
        }

        let client = builder
            .build()
            .map_err(|e| Error::GitHubApi(e.to_string()))?;

        Ok(Self {
            client,
            config: PlatformConfig { owner, repo, host },
            current_user: OnceCell::new(),
            default_branch: OnceCell::new(),
        })
    }

    async fn graphql<T: serde::de::DeserializeOwned>(
        &self,
        query: &str,
        variables: serde_json::Value,
    ) -> std::result::Result<T, String> {
        let response: GraphQlResponse<T> = self
            .client
            .graphql(&serde_json::json!({
                "query": query,
                "variables": variables,
            }))
            .await
            .map_err(|e| e.to_string())?;
        response.into_data()
    }
}

/// Helper to convert octocrab PR to our `PullRequest` type
fn pr_from_octocrab(pr: &octocrab::models::pulls::PullRequest) -> PullRequest {
    let state = if pr.merged_at.is_some() {
        PrState::Merged
    } else if matches!(pr.state, Some(IssueState::Closed)) {
        PrState::Closed
    } else {
        PrState::Open
    };

    PullRequest {
        number: pr.number,
        html_url: pr
            .html_url
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default(),
        base_ref: pr.base.ref_field.clone(),
        head_ref: pr.head.ref_field.clone(),
        title: pr.title.as_deref().unwrap_or_default().to_string(),
        state,
        node_id: pr.node_id.clone(),
        is_draft: pr.draft.unwrap_or(false),
    }
}

#[async_trait]
impl PlatformService for GitHubService {
    async fn find_pr_by_branch(&self, head_branch: &str) -> Result<Option<PullRequest>> {
        debug!(head_branch, "finding PR by branch");
        let head = format!("{}:{}", &self.config.owner, head_branch);

        let prs = self
            .client
            .pulls(&self.config.owner, &self.config.repo)
            .list()
            .head(head)
            .state(octocrab::params::State::All)
            .per_page(1)
            .send()
            .await?;

        let result = prs.items.first().map(pr_from_octocrab);
        if let Some(ref pr) = result {
            debug!(pr_number = pr.number, state = %pr.state, "found PR");
        } else {
            debug!(head_branch, "no PR found");
        }
        Ok(result)
    }

    async fn create_pr(
        &self,
        head: &str,
        base: &str,
        title: &str,
        draft: bool,
    ) -> Result<PullRequest> {
        debug!(head, base, draft, "creating PR");
        let pr = self
            .client
            .pulls(&self.config.owner, &self.config.repo)
            .create(title, head, base)
            .body("")
            .draft(draft)
            .send()
            .await
            .map_err(|e| {
                let detail = format!("{e:?}");
                if draft && is_draft_unsupported(&detail) {
                    warn!(head, "repository does not support draft PRs");
                    Error::DraftPrsUnsupported
                } else {
                    Error::from(e)
                }
            })?;

        let result = pr_from_octocrab(&pr);
        debug!(pr_number = result.number, "created PR");
        Ok(result)
    }

    async fn update_pr(&self, pr_number: u64, title: &str, base: &str) -> Result<PullRequest> {
        debug!(pr_number, title, base, "updating PR");
        let pr = self
            .client
            .pulls(&self.config.owner, &self.config.repo)
            .update(pr_number)
            .title(title)
            .base(base)
            .send()
            .await?;

        debug!(pr_number, "updated PR");
        Ok(pr_from_octocrab(&pr))
    }

    async fn close_pr(&self, pr_number: u64) -> Result<()> {
        debug!(pr_number, "closing PR");
        self.client
            .pulls(&self.config.owner, &self.config.repo)
            .update(pr_number)
            .state(octocrab::params::pulls::State::Closed)
            .send()
            .await?;
        debug!(pr_number, "closed PR");
        Ok(())
    }

    async fn get_merge_data(&self, pr_number: u64) -> Result<MergeData> {
        debug!(pr_number, "fetching merge data");
        let query: MergeDataQuery = self
            .graphql(
                MERGE_DATA_QUERY,
                serde_json::json!({
                    "owner": self.config.owner,
                    "repo": self.config.repo,
                    "prNumber": pr_number,
                }),
            )
            .await
            .map_err(|message| Error::MergeData { pr_number, message })?;

        let data: MergeData = query
            .repository
            .and_then(|repository| repository.pull_request)
            .ok_or_else(|| Error::MergeData {
                pr_number,
                message: "pull request missing from response".to_string(),
            })?
            .into();

        debug!(
            pr_number,
            mergeable = ?data.mergeable,
            review = ?data.review_decision,
            checks = ?data.status_check_rollup,
            "fetched merge data"
        );
        Ok(data)
    }

    async fn mark_ready_for_review(&self, pr: &PullRequest) -> Result<()> {
        debug!(pr_number = pr.number, "marking PR ready for review");
        let node_id = pr.node_id.as_deref().ok_or_else(|| {
            Error::GitHubApi(format!("PR #{} missing node_id for GraphQL mutation", pr.number))
        })?;

        let _: serde_json::Value = self
            .graphql(
                MARK_READY_MUTATION,
                serde_json::json!({ "pullRequestId": node_id }),
            )
            .await
            .map_err(|e| Error::GitHubApi(format!("marking PR #{} ready failed: {e}", pr.number)))?;

        debug!(pr_number = pr.number, "marked PR ready for review");
        Ok(())
    }

    async fn merge_pr(&self, pr_number: u64, method: MergeMethod) -> Result<()> {
        debug!(pr_number, %method, "merging PR");

        let octocrab_method = match method {
            MergeMethod::Squash => octocrab::params::pulls::MergeMethod::Squash,
            MergeMethod::Merge => octocrab::params::pulls::MergeMethod::Merge,
            MergeMethod::Rebase => octocrab::params::pulls::MergeMethod::Rebase,
        };

        let result = self
            .client
            .pulls(&self.config.owner, &self.config.repo)
            .merge(pr_number)
            .method(octocrab_method)
            .send()
            .await
            .map_err(|e| Error::GitHubApi(format!("merging PR #{pr_number} failed: {e}")))?;

        debug!(pr_number, merged = result.merged, sha = ?result.sha, "merge requested");
        Ok(())
    }

    async fn is_merged(&self, pr_number: u64) -> Result<bool> {
        let merged = self
            .client
            .pulls(&self.config.owner, &self.config.repo)
            .is_merged(pr_number)
            .await?;
        debug!(pr_number, merged, "checked merge status");
        Ok(merged)
    }

    async fn list_pr_comments(&self, pr_number: u64) -> Result<Vec<PrComment>> {
        debug!(pr_number, "listing PR comments");
        let comments = self
            .client
            .issues(&self.config.owner, &self.config.repo)
            .list_comments(pr_number)
            .per_page(100)
            .send()
            .await?;

        let result: Vec<PrComment> = comments
            .items
            .into_iter()
            .map(|c| PrComment {
                id: c.id.0,
                body: c.body.unwrap_or_default(),
            })
            .collect();
        debug!(pr_number, count = result.len(), "listed PR comments");
        Ok(result)
    }

    async fn create_pr_comment(&self, pr_number: u64, body: &str) -> Result<()> {
        debug!(pr_number, "creating PR comment");
        self.client
            .issues(&self.config.owner, &self.config.repo)
            .create_comment(pr_number, body)
            .await?;
        Ok(())
    }

    async fn update_pr_comment(&self, pr_number: u64, comment_id: u64, body: &str) -> Result<()> {
        debug!(pr_number, comment_id, "updating PR comment");
        self.client
            .issues(&self.config.owner, &self.config.repo)
            .update_comment(CommentId(comment_id), body)
            .await?;
        Ok(())
    }

    async fn delete_pr_comment(&self, pr_number: u64, comment_id: u64) -> Result<()> {
        debug!(pr_number, comment_id, "deleting PR comment");
        self.client
            .issues(&self.config.owner, &self.config.repo)
            .delete_comment(CommentId(comment_id))
            .await?;
        Ok(())
    }

    async fn delete_branch(&self, branch: &str) -> Result<()> {
        debug!(branch, "deleting remote branch");
        self.client
            .repos(&self.config.owner, &self.config.repo)
            .delete_ref(&octocrab::params::repos::Reference::Branch(
                branch.to_string(),
            ))
            .await?;
        Ok(())
    }

    async fn current_user(&self) -> Result<String> {
        self.current_user
            .get_or_try_init(|| async {
                let user = self.client.current().user().await?;
                debug!(login = %user.login, "resolved current user");
                Ok::<_, Error>(user.login)
            })
            .await
            .cloned()
    }

    async fn default_branch(&self) -> Result<String> {
        self.default_branch
            .get_or_try_init(|| async {
                let repo = self
                    .client
                    .repos(&self.config.owner, &self.config.repo)
                    .get()
                    .await?;
                let branch = repo.default_branch.unwrap_or_else(|| "main".to_string());
                debug!(%branch, "resolved default branch");
                Ok::<_, Error>(branch)
            })
            .await
            .cloned()
    }

    fn config(&self) -> &PlatformConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_draft_unsupported() {
        assert!(is_draft_unsupported(
            "Validation Failed: Draft pull requests are not supported in this repository."
        ));
        assert!(!is_draft_unsupported("Validation Failed: A pull request already exists"));
    }

    #[test]
    fn test_merge_data_response_parses() {
        let json = serde_json::json!({
            "data": {
                "repository": {
                    "pullRequest": {
                        "reviewDecision": "APPROVED",
                        "mergeable": "MERGEABLE",
                        "canBeRebased": true,
                        "statusCheckRollup": { "state": "PENDING" }
                    }
                }
            }
        });

        let response: GraphQlResponse<MergeDataQuery> = serde_json::from_value(json).unwrap();
        let data: MergeData = response
            .into_data()
            .unwrap()
            .repository
            .unwrap()
            .pull_request
            .unwrap()
            .into();

        assert_eq!(data.review_decision, Some(ReviewDecision::Approved));
        assert_eq!(data.mergeable, MergeableState::Mergeable);
        assert!(data.can_be_rebased);
        assert_eq!(data.status_check_rollup, Some(StatusState::Pending));
    }

    #[test]
    fn test_merge_data_without_checks_or_review() {
        let json = serde_json::json!({
            "data": {
                "repository": {
                    "pullRequest": {
                        "reviewDecision": null,
                        "mergeable": "UNKNOWN",
                        "canBeRebased": false,
                        "statusCheckRollup": null
                    }
                }
            }
        });

        let response: GraphQlResponse<MergeDataQuery> = serde_json::from_value(json).unwrap();
        let data: MergeData = response
            .into_data()
            .unwrap()
            .repository
            .unwrap()
            .pull_request
            .unwrap()
            .into();

        assert_eq!(data.review_decision, None);
        assert_eq!(data.mergeable, MergeableState::Unknown);
        assert_eq!(data.status_check_rollup, None);
    }

    #[test]
    fn test_graphql_errors_are_joined() {
        let json = serde_json::json!({
            "data": null,
            "errors": [
                { "message": "Could not resolve to a PullRequest" },
                { "message": "rate limited" }
            ]
        });

        let response: GraphQlResponse<MergeDataQuery> = serde_json::from_value(json).unwrap();
        let Err(message) = response.into_data() else {
            panic!("expected GraphQL errors");
        };
        assert_eq!(message, "Could not resolve to a PullRequest, rate limited");
    }
}
