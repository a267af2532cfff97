use std::collections::HashMap;

use tracing::info;

use crate::data::comment_repository::{CommentFilter, CommentRepository, NewComment, OwnedComment};
use crate::data::pagination::{PageResult, Pagination};
use crate::data::post_repository::PostRepository;
use crate::domain::comment::{
    Comment, CommentWithPost, CreateCommentRequest, UpdateCommentRequest,
};
use crate::domain::error::{DomainError, Resource};

pub(crate) struct CommentService<C: CommentRepository, P: PostRepository> {
    comments: C,
    posts: P,
}

impl<C: CommentRepository, P: PostRepository> CommentService<C, P> {
    pub(crate) fn new(comments: C, posts: P) -> Self {
        Self { comments, posts }
    }

    pub(crate) async fn add_comment(
        &self,
        user_id: i64,
        req: CreateCommentRequest,
    ) -> Result<Comment, DomainError> {
        let req = req.validate()?;
        self.ensure_post_exists(req.post_id).await?;

        let comment = self
            .comments
            .create_comment(NewComment {
                content: req.content,
                user_id,
                post_id: req.post_id,
            })
            .await?;
        info!(comment_id = comment.id, post_id = comment.post_id, user_id, "comment created");
        Ok(comment)
    }

    pub(crate) async fn update_comment(
        &self,
        actor_user_id: i64,
        req: UpdateCommentRequest,
    ) -> Result<Comment, DomainError> {
        let req = req.validate()?;
        self.ensure_post_exists(req.post_id).await?;

        let target = OwnedComment {
            id: req.id,
            owner_id: actor_user_id,
            post_id: req.post_id,
        };
        self.comments
            .update_comment_owned(target, req.content)
            .await?
            .ok_or(DomainError::NotFound(Resource::Comment))
    }

    pub(crate) async fn delete_comment(
        &self,
        actor_user_id: i64,
        comment_id: i64,
    ) -> Result<(), DomainError> {
        let deleted = self
            .comments
            .delete_comment_owned(comment_id, actor_user_id)
            .await?;
        if !deleted {
            return Err(DomainError::NotFound(Resource::Comment));
        }
        info!(comment_id, user_id = actor_user_id, "comment deleted");
        Ok(())
    }

    pub(crate) async fn get_comment(&self, id: i64) -> Result<CommentWithPost, DomainError> {
        let comment = self
            .comments
            .get_comment(id)
            .await?
            .ok_or(DomainError::NotFound(Resource::Comment))?;

        let post = self.posts.get_post(comment.post_id).await?;
        Ok(CommentWithPost { comment, post })
    }

    pub(crate) async fn list_user_comments(
        &self,
        user_id: i64,
    ) -> Result<Vec<CommentWithPost>, DomainError> {
        let comments = self.comments.list_user_comments(user_id).await?;

        let mut post_ids: Vec<i64> = comments.iter().map(|c| c.post_id).collect();
        post_ids.sort_unstable();
        post_ids.dedup();
        let posts: HashMap<i64, _> = self
            .posts
            .get_posts(&post_ids)
            .await?
            .into_iter()
            .map(|post| (post.id, post))
            .collect();

        Ok(comments
            .into_iter()
            .map(|comment| {
                let post = posts.get(&comment.post_id).cloned();
                CommentWithPost { comment, post }
            })
            .collect())
    }

    pub(crate) async fn page_comments(
        &self,
        filter: CommentFilter,
        pagination: Pagination,
    ) -> Result<PageResult<Comment>, DomainError> {
        self.comments.page_comments(filter, pagination).await
    }

    async fn ensure_post_exists(&self, post_id: i64) -> Result<(), DomainError> {
        match self.posts.get_post(post_id).await? {
            Some(_) => Ok(()),
            None => Err(DomainError::PostMissing),
        }
    }
}
