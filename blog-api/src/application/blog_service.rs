use std::collections::HashMap;

use tracing::info;

use crate::data::comment_repository::CommentRepository;
use crate::data::pagination::{PageResult, Pagination};
use crate::data::post_repository::{NewPost, PostFilter, PostPatch, PostRepository};
use crate::domain::comment::Comment;
use crate::domain::error::{DomainError, Resource};
use crate::domain::post::{
    CreatePostRequest, EMBEDDED_COMMENTS_LIMIT, Post, PostWithComments, UpdatePostRequest,
};

pub(crate) struct BlogService<P: PostRepository, C: CommentRepository> {
    posts: P,
    comments: C,
}

impl<P: PostRepository, C: CommentRepository> BlogService<P, C> {
    pub(crate) fn new(posts: P, comments: C) -> Self {
        Self { posts, comments }
    }

    pub(crate) async fn create_post(
        &self,
        user_id: i64,
        req: CreatePostRequest,
    ) -> Result<Post, DomainError> {
        let req = req.validate()?;

        let new_post = NewPost {
            title: req.title,
            content: req.content,
            user_id,
        };
        let post = self.posts.create_post(new_post).await?;
        info!(post_id = post.id, user_id, "post created");
        Ok(post)
    }

    pub(crate) async fn get_post(&self, id: i64) -> Result<PostWithComments, DomainError> {
        let post = self
            .posts
            .get_post(id)
            .await?
            .ok_or(DomainError::NotFound(Resource::Post))?;

        let mut threads = self.attach_comments(vec![post]).await?;
        threads.pop().ok_or(DomainError::NotFound(Resource::Post))
    }

    pub(crate) async fn update_post(
        &self,
        actor_user_id: i64,
        req: UpdatePostRequest,
    ) -> Result<Post, DomainError> {
        let req = req.validate()?;
        let patch = PostPatch {
            title: req.title,
            content: req.content,
        };
        self.posts
            .update_post_owned(req.id, actor_user_id, patch)
            .await?
            .ok_or(DomainError::NotFound(Resource::Post))
    }

    pub(crate) async fn delete_post(
        &self,
        actor_user_id: i64,
        post_id: i64,
    ) -> Result<(), DomainError> {
        let deleted = self.posts.delete_post_owned(post_id, actor_user_id).await?;
        if !deleted {
            return Err(DomainError::NotFound(Resource::Post));
        }
        info!(post_id, user_id = actor_user_id, "post deleted");
        Ok(())
    }

    pub(crate) async fn list_user_posts(
        &self,
        user_id: i64,
    ) -> Result<Vec<PostWithComments>, DomainError> {
        let posts = self.posts.list_user_posts(user_id).await?;
        self.attach_comments(posts).await
    }

    pub(crate) async fn page_posts(
        &self,
        filter: PostFilter,
        pagination: Pagination,
    ) -> Result<PageResult<Post>, DomainError> {
        self.posts.page_posts(filter, pagination).await
    }

    async fn attach_comments(
        &self,
        posts: Vec<Post>,
    ) -> Result<Vec<PostWithComments>, DomainError> {
        let ids: Vec<i64> = posts.iter().map(|post| post.id).collect();
        let mut by_post: HashMap<i64, Vec<Comment>> = HashMap::new();
        for comment in self
            .comments
            .recent_comments(&ids, EMBEDDED_COMMENTS_LIMIT)
            .await?
        {
            by_post.entry(comment.post_id).or_default().push(comment);
        }

        Ok(posts
            .into_iter()
            .map(|post| {
                let comments = by_post.remove(&post.id).unwrap_or_default();
                PostWithComments { post, comments }
            })
            .collect())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use chrono::{Duration, Utc};

    use super::BlogService;
    use crate::data::comment_repository::{
        CommentFilter, CommentRepository, NewComment, OwnedComment,
    };
    use crate::data::pagination::{PageResult, Pagination};
    use crate::data::post_repository::{NewPost, PostFilter, PostPatch, PostRepository};
    use crate::domain::comment::Comment;
    use crate::domain::error::{DomainError, Resource};
    use crate::domain::post::{CreatePostRequest, Post, UpdatePostRequest};

    /// In-memory store shared by the post and comment fakes.
    #[derive(Clone, Default)]
    pub(crate) struct FakeStore {
        posts: Arc<Mutex<Vec<Post>>>,
        comments: Arc<Mutex<Vec<Comment>>>,
    }

    impl FakeStore {
        pub(crate) fn add_post(&self, id: i64, user_id: i64) -> Post {
            let post = sample_post(id, "title", "body", user_id);
            self.posts
                .lock()
                .expect("posts mutex poisoned")
                .push(post.clone());
            post
        }

        pub(crate) fn add_comment(&self, id: i64, post_id: i64, user_id: i64) -> Comment {
            let comment = sample_comment(id, post_id, user_id, id);
            self.comments
                .lock()
                .expect("comments mutex poisoned")
                .push(comment.clone());
            comment
        }

        pub(crate) fn post_count(&self) -> usize {
            self.posts.lock().expect("posts mutex poisoned").len()
        }

        pub(crate) fn comment(&self, id: i64) -> Option<Comment> {
            self.comments
                .lock()
                .expect("comments mutex poisoned")
                .iter()
                .find(|c| c.id == id)
                .cloned()
        }

        fn next_id<T>(items: &[T]) -> i64 {
            items.len() as i64 + 100
        }
    }

    #[async_trait]
    impl PostRepository for FakeStore {
        async fn create_post(&self, input: NewPost) -> Result<Post, DomainError> {
            let mut posts = self.posts.lock().expect("posts mutex poisoned");
            let post = sample_post(
                Self::next_id(&posts),
                &input.title,
                &input.content,
                input.user_id,
            );
            posts.push(post.clone());
            Ok(post)
        }

        async fn get_post(&self, id: i64) -> Result<Option<Post>, DomainError> {
            Ok(self
                .posts
                .lock()
                .expect("posts mutex poisoned")
                .iter()
                .find(|p| p.id == id)
                .cloned())
        }

        async fn get_posts(&self, ids: &[i64]) -> Result<Vec<Post>, DomainError> {
            Ok(self
                .posts
                .lock()
                .expect("posts mutex poisoned")
                .iter()
                .filter(|p| ids.contains(&p.id))
                .cloned()
                .collect())
        }

        async fn update_post_owned(
            &self,
            post_id: i64,
            owner_id: i64,
            patch: PostPatch,
        ) -> Result<Option<Post>, DomainError> {
            let mut posts = self.posts.lock().expect("posts mutex poisoned");
            Ok(posts
                .iter_mut()
                .find(|p| p.id == post_id && p.user_id == owner_id)
                .map(|p| {
                    p.title = patch.title;
                    p.content = patch.content;
                    p.clone()
                }))
        }

        async fn delete_post_owned(&self, post_id: i64, owner_id: i64) -> Result<bool, DomainError> {
            let mut posts = self.posts.lock().expect("posts mutex poisoned");
            let before = posts.len();
            posts.retain(|p| !(p.id == post_id && p.user_id == owner_id));
            Ok(posts.len() < before)
        }

        async fn list_user_posts(&self, user_id: i64) -> Result<Vec<Post>, DomainError> {
            Ok(self
                .posts
                .lock()
                .expect("posts mutex poisoned")
                .iter()
                .filter(|p| p.user_id == user_id)
                .cloned()
                .collect())
        }

        async fn page_posts(
            &self,
            filter: PostFilter,
            pagination: Pagination,
        ) -> Result<PageResult<Post>, DomainError> {
            let window = pagination.paginate();
            let matching: Vec<Post> = self
                .posts
                .lock()
                .expect("posts mutex poisoned")
                .iter()
                .filter(|p| filter.user_id.is_none_or(|user_id| p.user_id == user_id))
                .cloned()
                .collect();
            let total = matching.len() as i64;
            let data = matching
                .into_iter()
                .skip(window.offset as usize)
                .take(window.limit as usize)
                .collect();
            Ok(PageResult::new(data, total, window))
        }
    }

    #[async_trait]
    impl CommentRepository for FakeStore {
        async fn create_comment(&self, input: NewComment) -> Result<Comment, DomainError> {
            let mut comments = self.comments.lock().expect("comments mutex poisoned");
            let id = Self::next_id(&comments);
            let mut comment = sample_comment(id, input.post_id, input.user_id, id);
            comment.content = input.content;
            comments.push(comment.clone());
            Ok(comment)
        }

        async fn get_comment(&self, id: i64) -> Result<Option<Comment>, DomainError> {
            Ok(self.comment(id))
        }

        async fn update_comment_owned(
            &self,
            target: OwnedComment,
            content: String,
        ) -> Result<Option<Comment>, DomainError> {
            let mut comments = self.comments.lock().expect("comments mutex poisoned");
            Ok(comments
                .iter_mut()
                .find(|c| {
                    c.id == target.id && c.user_id == target.owner_id && c.post_id == target.post_id
                })
                .map(|c| {
                    c.content = content;
                    c.clone()
                }))
        }

        async fn delete_comment_owned(&self, id: i64, owner_id: i64) -> Result<bool, DomainError> {
            let mut comments = self.comments.lock().expect("comments mutex poisoned");
            let before = comments.len();
            comments.retain(|c| !(c.id == id && c.user_id == owner_id));
            Ok(comments.len() < before)
        }

        async fn list_user_comments(&self, user_id: i64) -> Result<Vec<Comment>, DomainError> {
            Ok(self
                .comments
                .lock()
                .expect("comments mutex poisoned")
                .iter()
                .filter(|c| c.user_id == user_id)
                .cloned()
                .collect())
        }

        async fn recent_comments(
            &self,
            post_ids: &[i64],
            per_post: i64,
        ) -> Result<Vec<Comment>, DomainError> {
            let mut matching: Vec<Comment> = self
                .comments
                .lock()
                .expect("comments mutex poisoned")
                .iter()
                .filter(|c| post_ids.contains(&c.post_id))
                .cloned()
                .collect();
            matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

            let mut out = Vec::new();
            for post_id in post_ids {
                out.extend(
                    matching
                        .iter()
                        .filter(|c| c.post_id == *post_id)
                        .take(per_post as usize)
                        .cloned(),
                );
            }
            Ok(out)
        }

        async fn page_comments(
            &self,
            filter: CommentFilter,
            pagination: Pagination,
        ) -> Result<PageResult<Comment>, DomainError> {
            let window = pagination.paginate();
            let matching: Vec<Comment> = self
                .comments
                .lock()
                .expect("comments mutex poisoned")
                .iter()
                .filter(|c| filter.user_id.is_none_or(|user_id| c.user_id == user_id))
                .filter(|c| filter.post_id.is_none_or(|post_id| c.post_id == post_id))
                .cloned()
                .collect();
            let total = matching.len() as i64;
            let data = matching
                .into_iter()
                .skip(window.offset as usize)
                .take(window.limit as usize)
                .collect();
            Ok(PageResult::new(data, total, window))
        }
    }

    fn service(store: &FakeStore) -> BlogService<FakeStore, FakeStore> {
        BlogService::new(store.clone(), store.clone())
    }

    #[tokio::test]
    async fn create_post_stamps_owner_and_normalizes() {
        let store = FakeStore::default();

        let req = CreatePostRequest {
            title: "  title  ".to_string(),
            content: "  content  ".to_string(),
        };
        let created = service(&store)
            .create_post(10, req)
            .await
            .expect("create_post must succeed");

        assert_eq!(created.title, "title");
        assert_eq!(created.content, "content");
        assert_eq!(created.user_id, 10);
        assert_eq!(store.post_count(), 1);
    }

    #[tokio::test]
    async fn get_post_returns_not_found_when_missing() {
        let store = FakeStore::default();

        let err = service(&store)
            .get_post(42)
            .await
            .expect_err("post must be missing");
        assert!(matches!(err, DomainError::NotFound(Resource::Post)));
    }

    #[tokio::test]
    async fn get_post_embeds_at_most_ten_recent_comments() {
        let store = FakeStore::default();
        store.add_post(1, 10);
        for id in 1..=12 {
            store.add_comment(id, 1, 20);
        }

        let thread = service(&store).get_post(1).await.expect("post exists");

        assert_eq!(thread.comments.len(), 10);
        assert_eq!(thread.comments[0].id, 12);
        assert!(thread.comments.iter().all(|c| c.id > 2));
    }

    #[tokio::test]
    async fn update_post_by_owner_succeeds() {
        let store = FakeStore::default();
        store.add_post(7, 10);

        let req = UpdatePostRequest {
            id: 7,
            title: "  new  ".to_string(),
            content: "  body  ".to_string(),
        };
        let updated = service(&store)
            .update_post(10, req)
            .await
            .expect("update must succeed");
        assert_eq!(updated.id, 7);
        assert_eq!(updated.title, "new");
    }

    #[tokio::test]
    async fn foreign_and_missing_posts_fail_identically() {
        let store = FakeStore::default();
        store.add_post(7, 99);
        let service = service(&store);

        let update = |id| UpdatePostRequest {
            id,
            title: "title".to_string(),
            content: "body".to_string(),
        };
        let foreign = service.update_post(10, update(7)).await.expect_err("foreign");
        let missing = service.update_post(10, update(8)).await.expect_err("missing");
        assert_eq!(foreign.to_string(), missing.to_string());
        assert!(matches!(foreign, DomainError::NotFound(Resource::Post)));

        let foreign = service.delete_post(10, 7).await.expect_err("foreign");
        let missing = service.delete_post(10, 8).await.expect_err("missing");
        assert_eq!(foreign.to_string(), missing.to_string());
        assert!(matches!(foreign, DomainError::NotFound(Resource::Post)));
        assert_eq!(store.post_count(), 1);
    }

    #[tokio::test]
    async fn delete_post_by_owner_removes_it() {
        let store = FakeStore::default();
        store.add_post(7, 10);

        service(&store)
            .delete_post(10, 7)
            .await
            .expect("owner may delete");
        assert_eq!(store.post_count(), 0);
    }

    #[tokio::test]
    async fn page_posts_applies_user_filter() {
        let store = FakeStore::default();
        for id in 1..=5 {
            store.add_post(id, if id % 2 == 0 { 20 } else { 10 });
        }

        let page = service(&store)
            .page_posts(PostFilter { user_id: Some(10) }, Pagination::new(1, 2))
            .await
            .expect("page must load");

        assert_eq!(page.total, 3);
        assert_eq!(page.data.len(), 2);
        assert_eq!(page.total_pages, 2);
        assert!(page.data.iter().all(|p| p.user_id == 10));
    }

    pub(crate) fn sample_post(id: i64, title: &str, content: &str, user_id: i64) -> Post {
        Post::new(
            id,
            title.to_string(),
            content.to_string(),
            user_id,
            Utc::now(),
            Utc::now(),
        )
        .expect("sample post must be valid")
    }

    fn sample_comment(id: i64, post_id: i64, user_id: i64, age_rank: i64) -> Comment {
        let created_at = Utc::now() - Duration::days(365) + Duration::seconds(age_rank);
        Comment::new(id, "comment", user_id, post_id, created_at, created_at)
            .expect("sample comment must be valid")
    }
}
