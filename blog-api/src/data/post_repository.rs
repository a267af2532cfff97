use std::sync::Arc;

use async_trait::async_trait;

use crate::data::pagination::{PageResult, Pagination};
use crate::domain::error::DomainError;
use crate::domain::post::Post;

#[derive(Debug, Clone)]
pub(crate) struct NewPost {
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) user_id: i64,
}

#[derive(Debug, Clone)]
pub(crate) struct PostPatch {
    pub(crate) title: String,
    pub(crate) content: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct PostFilter {
    pub(crate) user_id: Option<i64>,
}

#[async_trait]
pub(crate) trait PostRepository: Send + Sync {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError>;
    async fn get_post(&self, id: i64) -> Result<Option<Post>, DomainError>;
    async fn get_posts(&self, ids: &[i64]) -> Result<Vec<Post>, DomainError>;
    async fn update_post_owned(
        &self,
        post_id: i64,
        owner_id: i64,
        patch: PostPatch,
    ) -> Result<Option<Post>, DomainError>;
    async fn delete_post_owned(&self, post_id: i64, owner_id: i64) -> Result<bool, DomainError>;
    async fn list_user_posts(&self, user_id: i64) -> Result<Vec<Post>, DomainError>;
    async fn page_posts(
        &self,
        filter: PostFilter,
        pagination: Pagination,
    ) -> Result<PageResult<Post>, DomainError>;
}

pub(crate) type DynPostRepository = Arc<dyn PostRepository>;

#[async_trait]
impl<T: PostRepository + ?Sized> PostRepository for Arc<T> {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError> {
        (**self).create_post(input).await
    }

    async fn get_post(&self, id: i64) -> Result<Option<Post>, DomainError> {
        (**self).get_post(id).await
    }

    async fn get_posts(&self, ids: &[i64]) -> Result<Vec<Post>, DomainError> {
        (**self).get_posts(ids).await
    }

    async fn update_post_owned(
        &self,
        post_id: i64,
        owner_id: i64,
        patch: PostPatch,
    ) -> Result<Option<Post>, DomainError> {
        (**self).update_post_owned(post_id, owner_id, patch).await
    }

    async fn delete_post_owned(&self, post_id: i64, owner_id: i64) -> Result<bool, DomainError> {
        (**self).delete_post_owned(post_id, owner_id).await
    }

    async fn list_user_posts(&self, user_id: i64) -> Result<Vec<Post>, DomainError> {
        (**self).list_user_posts(user_id).await
    }

    async fn page_posts(
        &self,
        filter: PostFilter,
        pagination: Pagination,
    ) -> Result<PageResult<Post>, DomainError> {
        (**self).page_posts(filter, pagination).await
    }
}
