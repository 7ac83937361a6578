use std::sync::Arc;

use tokio::sync::{broadcast, RwLock};

use crate::alerts::{Alert, AlertHub};
use crate::api::{Post, SocialApi};
use crate::error::{ApiError, Result};
use crate::storage::{Database, Session};

use super::view::*;

/// A post with its comments and reactions, kept as the server last sent it.
///
/// Every mutation waits for the server and then replaces the whole post with
/// the returned aggregate. Nothing is patched locally and nothing is shown
/// before the server confirms. Responses apply in arrival order.
pub struct PostThread<A: SocialApi> {
    api: Arc<A>,
    db: Arc<Database>,
    post: RwLock<Post>,
    alerts: AlertHub,
}

impl<A: SocialApi> PostThread<A> {
    pub fn new(api: Arc<A>, db: Arc<Database>, post: Post) -> Self {
        Self {
            api,
            db,
            post: RwLock::new(post),
            alerts: AlertHub::new(),
        }
    }

    /// Open a thread by id (post detail screen, notification deep link).
    pub async fn open(api: Arc<A>, db: Arc<Database>, post_id: &str) -> Result<Self> {
        let session = Session::load(&db)?;
        let post = api.fetch_post(&session.token, post_id).await?;
        Ok(Self::new(api, db, post))
    }

    pub fn subscribe_alerts(&self) -> broadcast::Receiver<Alert> {
        self.alerts.subscribe()
    }

    pub async fn post(&self) -> Post {
        self.post.read().await.clone()
    }

    /// Install a server aggregate wholesale. Aggregates for another post are
    /// refused.
    pub async fn replace(&self, aggregate: Post) -> bool {
        let mut post = self.post.write().await;
        if post.id != aggregate.id {
            log::warn!(
                "Ignoring aggregate for post {} while showing {}",
                aggregate.id,
                post.id
            );
            return false;
        }
        *post = aggregate;
        true
    }

    // ── Derived views ───────────────────────────────────────────────────

    pub async fn comment_threads(&self) -> Vec<CommentThread> {
        organize_comments(&self.post.read().await.comments)
    }

    pub async fn reaction_counts(&self) -> Vec<ReactionCount> {
        reaction_histogram(&self.post.read().await.reactions)
    }

    pub async fn comment_count(&self) -> usize {
        comment_count(&*self.post.read().await)
    }

    /// The signed-in user's reaction on the post, if any.
    pub async fn my_reaction(&self) -> Option<String> {
        let session = Session::load(&self.db).ok()?;
        let post = self.post.read().await;
        user_reaction(&post.reactions, &session.user_id).map(str::to_string)
    }

    // ── Mutations ───────────────────────────────────────────────────────

    pub async fn reload(&self) -> Result<Post> {
        let (session, post_id) = self.prepare("Post").await?;
        let result = self.api.fetch_post(&session.token, &post_id).await;
        self.apply("Post", result).await
    }

    pub async fn add_reaction(&self, kind: &str) -> Result<Post> {
        let (session, post_id) = self.prepare("Reaction").await?;
        let result = self.api.add_reaction(&session.token, &post_id, kind).await;
        self.apply("Reaction", result).await
    }

    pub async fn remove_reaction(&self) -> Result<Post> {
        let (session, post_id) = self.prepare("Reaction").await?;
        let result = self.api.remove_reaction(&session.token, &post_id).await;
        self.apply("Reaction", result).await
    }

    /// Pick a reaction from the picker. The server decides whether this adds,
    /// replaces or removes the user's reaction; the change is read back from
    /// the returned post.
    pub async fn toggle_reaction(&self, kind: &str) -> Result<ReactionChange> {
        let (session, post_id) = self.prepare("Reaction").await?;
        let before = {
            let post = self.post.read().await;
            user_reaction(&post.reactions, &session.user_id).map(str::to_string)
        };

        let result = self.api.add_reaction(&session.token, &post_id, kind).await;
        let post = self.apply("Reaction", result).await?;

        let change = reaction_change(
            before.as_deref(),
            user_reaction(&post.reactions, &session.user_id),
        );
        log::debug!("Reaction on {}: {:?}", post_id, change);
        Ok(change)
    }

    pub async fn add_comment(&self, content: &str) -> Result<Post> {
        let content = self.validate_text("Comment", content)?;
        let (session, post_id) = self.prepare("Comment").await?;
        let result = self.api.add_comment(&session.token, &post_id, content).await;
        self.apply("Comment", result).await
    }

    pub async fn reply_comment(&self, comment_id: &str, content: &str) -> Result<Post> {
        let content = self.validate_text("Reply", content)?;
        let (session, post_id) = self.prepare("Reply").await?;
        let result = self
            .api
            .reply_comment(&session.token, &post_id, comment_id, content)
            .await;
        self.apply("Reply", result).await
    }

    pub async fn add_comment_reaction(&self, comment_id: &str, kind: &str) -> Result<Post> {
        let (session, post_id) = self.prepare("Reaction").await?;
        let result = self
            .api
            .add_comment_reaction(&session.token, &post_id, comment_id, kind)
            .await;
        self.apply("Reaction", result).await
    }

    async fn prepare(&self, action: &str) -> Result<(Session, String)> {
        let session = Session::load(&self.db).map_err(|e| self.fail(action, e))?;
        let post_id = self.post.read().await.id.clone();
        Ok((session, post_id))
    }

    fn validate_text<'a>(&self, action: &str, content: &'a str) -> Result<&'a str> {
        let trimmed = content.trim();
        if trimmed.is_empty() {
            let err = ApiError::Invalid("Write something first.".to_string());
            return Err(self.fail(action, err));
        }
        Ok(trimmed)
    }

    async fn apply(&self, action: &str, result: Result<Post>) -> Result<Post> {
        match result {
            Ok(post) => {
                if !self.replace(post.clone()).await {
                    return Err(self.fail(
                        action,
                        ApiError::Parse(format!("server returned post {}", post.id)),
                    ));
                }
                Ok(post)
            }
            Err(e) => Err(self.fail(action, e)),
        }
    }

    fn fail(&self, action: &str, err: ApiError) -> ApiError {
        self.alerts.publish(Alert::from_error(action, &err));
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Comment, Reaction, UserRef};
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays canned aggregates and records what was asked.
    #[derive(Default)]
    struct StubSocial {
        responses: Mutex<VecDeque<Result<Post>>>,
        calls: Mutex<Vec<String>>,
    }

    impl StubSocial {
        fn replying(responses: Vec<Result<Post>>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into()),
                calls: Mutex::default(),
            })
        }

        fn next(&self, call: String) -> Result<Post> {
            self.calls.lock().unwrap().push(call);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(ApiError::Network("no scripted response".into())))
        }
    }

    #[async_trait]
    impl SocialApi for StubSocial {
        async fn fetch_post(&self, _token: &str, post_id: &str) -> Result<Post> {
            self.next(format!("fetch {}", post_id))
        }

        async fn add_reaction(&self, token: &str, post_id: &str, kind: &str) -> Result<Post> {
            assert_eq!(token, "tok");
            self.next(format!("react {} {}", post_id, kind))
        }

        async fn remove_reaction(&self, _token: &str, post_id: &str) -> Result<Post> {
            self.next(format!("unreact {}", post_id))
        }

        async fn add_comment(&self, _token: &str, post_id: &str, content: &str) -> Result<Post> {
            self.next(format!("comment {} {}", post_id, content))
        }

        async fn reply_comment(
            &self,
            _token: &str,
            post_id: &str,
            comment_id: &str,
            content: &str,
        ) -> Result<Post> {
            self.next(format!("reply {} {} {}", post_id, comment_id, content))
        }

        async fn add_comment_reaction(
            &self,
            _token: &str,
            post_id: &str,
            comment_id: &str,
            kind: &str,
        ) -> Result<Post> {
            self.next(format!("comment-react {} {} {}", post_id, comment_id, kind))
        }
    }

    fn signed_in() -> Arc<Database> {
        let db = Database::open_in_memory().unwrap();
        db.set_setting("authToken", "tok").unwrap();
        db.set_setting("userId", "me").unwrap();
        Arc::new(db)
    }

    fn post(id: &str, reactions: &[(&str, &str)], comments: Vec<Comment>) -> Post {
        Post {
            id: id.to_string(),
            author: UserRef::Id("author".to_string()),
            content: "New scanners arrived".to_string(),
            reactions: reactions
                .iter()
                .map(|(user, kind)| Reaction {
                    user: UserRef::Id(user.to_string()),
                    kind: kind.to_string(),
                })
                .collect(),
            comments,
            created_at: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
        }
    }

    fn comment(id: &str, parent: Option<&str>, t: i64) -> Comment {
        Comment {
            id: id.to_string(),
            author: UserRef::Id("me".to_string()),
            content: "ok".to_string(),
            parent_comment: parent.map(str::to_string),
            reactions: vec![],
            created_at: Utc.timestamp_opt(t, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn same_reaction_twice_removes_it() {
        let api = StubSocial::replying(vec![
            Ok(post("p1", &[("me", "like")], vec![])),
            Ok(post("p1", &[], vec![])),
        ]);
        let thread = PostThread::new(api.clone(), signed_in(), post("p1", &[], vec![]));

        assert_eq!(
            thread.toggle_reaction("like").await.unwrap(),
            ReactionChange::Added("like".into())
        );
        assert_eq!(thread.my_reaction().await.as_deref(), Some("like"));

        assert_eq!(
            thread.toggle_reaction("like").await.unwrap(),
            ReactionChange::Removed("like".into())
        );
        assert!(thread.post().await.reactions.is_empty());
        assert_eq!(thread.my_reaction().await, None);
        assert_eq!(
            *api.calls.lock().unwrap(),
            vec!["react p1 like", "react p1 like"]
        );
    }

    #[tokio::test]
    async fn different_reaction_is_reported_as_replace() {
        let api = StubSocial::replying(vec![Ok(post(
            "p1",
            &[("me", "love"), ("u2", "like")],
            vec![],
        ))]);
        let thread = PostThread::new(
            api,
            signed_in(),
            post("p1", &[("me", "like"), ("u2", "like")], vec![]),
        );

        assert_eq!(
            thread.toggle_reaction("love").await.unwrap(),
            ReactionChange::Replaced { from: "like".into(), to: "love".into() }
        );
        let counts = thread.reaction_counts().await;
        assert_eq!(counts.len(), 2);
        assert!(counts.iter().all(|c| c.count == 1));
    }

    #[tokio::test]
    async fn reply_replaces_aggregate_and_rebuilds_threads() {
        let after = post(
            "p1",
            &[],
            vec![comment("1", None, 10), comment("2", Some("1"), 12), comment("3", None, 20)],
        );
        let api = StubSocial::replying(vec![Ok(after.clone())]);
        let before = post("p1", &[], vec![comment("1", None, 10), comment("3", None, 20)]);
        let thread = PostThread::new(api.clone(), signed_in(), before);

        let returned = thread.reply_comment("1", "  agreed ").await.unwrap();
        assert_eq!(returned, after);
        assert_eq!(thread.post().await, after);
        assert_eq!(api.calls.lock().unwrap()[0], "reply p1 1 agreed");

        let threads = thread.comment_threads().await;
        let order: Vec<&str> = threads.iter().map(|t| t.comment.id.as_str()).collect();
        assert_eq!(order, vec!["3", "1"]);
        assert_eq!(threads[1].replies[0].id, "2");
        assert_eq!(thread.comment_count().await, 3);
    }

    #[tokio::test]
    async fn failure_keeps_aggregate_and_alerts() {
        let api = StubSocial::replying(vec![Err(ApiError::Http {
            status: 404,
            message: "Post not found".into(),
        })]);
        let original = post("p1", &[("u2", "wow")], vec![]);
        let thread = PostThread::new(api, signed_in(), original.clone());
        let mut alerts = thread.subscribe_alerts();

        assert!(thread.add_comment_reaction("c1", "like").await.is_err());
        assert_eq!(thread.post().await, original);
        let alert = alerts.try_recv().unwrap();
        assert_eq!(alert.message, "Post not found");
    }

    #[tokio::test]
    async fn blank_comment_is_not_sent() {
        let api = StubSocial::replying(vec![]);
        let thread = PostThread::new(api.clone(), signed_in(), post("p1", &[], vec![]));

        let err = thread.add_comment("   ").await.unwrap_err();
        assert!(matches!(err, ApiError::Invalid(_)));
        assert!(api.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn aggregate_for_other_post_is_refused() {
        let api = StubSocial::replying(vec![Ok(post("p2", &[], vec![]))]);
        let thread = PostThread::new(api, signed_in(), post("p1", &[], vec![]));

        assert!(thread.add_reaction("like").await.is_err());
        assert_eq!(thread.post().await.id, "p1");
    }

    #[tokio::test]
    async fn signed_out_user_cannot_mutate() {
        let api = StubSocial::replying(vec![]);
        let db = Arc::new(Database::open_in_memory().unwrap());
        let thread = PostThread::new(api.clone(), db, post("p1", &[], vec![]));

        assert_eq!(
            thread.remove_reaction().await.unwrap_err(),
            ApiError::NotLoggedIn
        );
        assert!(api.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn open_fetches_by_id() {
        let api = StubSocial::replying(vec![Ok(post("p9", &[], vec![]))]);
        let thread = PostThread::open(api.clone(), signed_in(), "p9").await.unwrap();
        assert_eq!(thread.post().await.id, "p9");
        assert_eq!(api.calls.lock().unwrap()[0], "fetch p9");
    }

    #[tokio::test]
    async fn views_follow_the_latest_aggregate() {
        let api = StubSocial::replying(vec![Ok(post(
            "p1",
            &[("me", "love"), ("u2", "like"), ("u3", "love")],
            vec![comment("1", None, 10), comment("2", Some("1"), 12)],
        ))]);
        let thread = PostThread::new(api, signed_in(), post("p1", &[], vec![]));
        assert_eq!(thread.comment_count().await, 0);

        thread.add_comment("hello").await.unwrap();
        assert_eq!(thread.comment_count().await, 2);
        assert_eq!(thread.comment_threads().await.len(), 1);
        assert_eq!(thread.reaction_counts().await[0].kind, "love");
        assert_eq!(thread.my_reaction().await.as_deref(), Some("love"));
    }
}
