use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::data::pagination::{PageResult, PageWindow, PagedQuery, Pagination, get_paginated_data};
use crate::data::post_repository::{NewPost, PostFilter, PostPatch, PostRepository};
use crate::domain::error::{DomainError, Resource};
use crate::domain::post::Post;

const POST_COLUMNS: &str = "id, title, content, user_id, created_at, updated_at";

#[derive(Debug, Clone)]
pub(crate) struct PostgresPostRepository {
    pool: PgPool,
}

impl PostgresPostRepository {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct PostRow {
    id: i64,
    title: String,
    content: String,
    user_id: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

struct PostPageQuery<'a> {
    pool: &'a PgPool,
    filter: PostFilter,
}

impl PostPageQuery<'_> {
    fn push_filter(&self, builder: &mut QueryBuilder<'_, Postgres>) {
        if let Some(user_id) = self.filter.user_id {
            builder.push(" WHERE user_id = ").push_bind(user_id);
        }
    }
}

#[async_trait]
impl PagedQuery for PostPageQuery<'_> {
    type Item = Post;

    async fn count(&self) -> Result<i64, DomainError> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM posts");
        self.push_filter(&mut builder);

        builder
            .build_query_scalar::<i64>()
            .fetch_one(self.pool)
            .await
            .map_err(map_post_db_error)
    }

    async fn fetch(&self, window: PageWindow) -> Result<Vec<Post>, DomainError> {
        let mut builder = QueryBuilder::<Postgres>::new(format!("SELECT {POST_COLUMNS} FROM posts"));
        self.push_filter(&mut builder);
        builder
            .push(" ORDER BY created_at DESC, id DESC LIMIT ")
            .push_bind(window.limit)
            .push(" OFFSET ")
            .push_bind(window.offset);

        let rows = builder
            .build_query_as::<PostRow>()
            .fetch_all(self.pool)
            .await
            .map_err(map_post_db_error)?;

        rows.into_iter().map(map_row_to_post).collect()
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError> {
        let row = sqlx::query_as::<_, PostRow>(&format!(
            "INSERT INTO posts (title, content, user_id) VALUES ($1, $2, $3) RETURNING {POST_COLUMNS}"
        ))
        .bind(input.title)
        .bind(input.content)
        .bind(input.user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        map_row_to_post(row)
    }

    async fn get_post(&self, id: i64) -> Result<Option<Post>, DomainError> {
        let row = sqlx::query_as::<_, PostRow>(&format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        row.map(map_row_to_post).transpose()
    }

    async fn get_posts(&self, ids: &[i64]) -> Result<Vec<Post>, DomainError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query_as::<_, PostRow>(&format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE id = ANY($1)"
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        rows.into_iter().map(map_row_to_post).collect()
    }

    async fn update_post_owned(
        &self,
        post_id: i64,
        owner_id: i64,
        patch: PostPatch,
    ) -> Result<Option<Post>, DomainError> {
        let row = sqlx::query_as::<_, PostRow>(&format!(
            r#"
            UPDATE posts
            SET title = $3,
                content = $4,
                updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING {POST_COLUMNS}
            "#
        ))
        .bind(post_id)
        .bind(owner_id)
        .bind(patch.title)
        .bind(patch.content)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        row.map(map_row_to_post).transpose()
    }

    async fn delete_post_owned(&self, post_id: i64, owner_id: i64) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1 AND user_id = $2")
            .bind(post_id)
            .bind(owner_id)
            .execute(&self.pool)
            .await
            .map_err(map_post_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_user_posts(&self, user_id: i64) -> Result<Vec<Post>, DomainError> {
        let rows = sqlx::query_as::<_, PostRow>(&format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE user_id = $1 ORDER BY created_at DESC, id DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        rows.into_iter().map(map_row_to_post).collect()
    }

    async fn page_posts(
        &self,
        filter: PostFilter,
        pagination: Pagination,
    ) -> Result<PageResult<Post>, DomainError> {
        let query = PostPageQuery {
            pool: &self.pool,
            filter,
        };
        get_paginated_data(&query, Some(pagination)).await
    }
}

fn map_row_to_post(row: PostRow) -> Result<Post, DomainError> {
    Post::new(
        row.id,
        row.title,
        row.content,
        row.user_id,
        row.created_at,
        row.updated_at,
    )
    .map_err(|err| DomainError::Unexpected(err.to_string()))
}

fn map_post_db_error(err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &err
        && db_err.code().as_deref() == Some("23503")
    {
        return DomainError::NotFound(Resource::User);
    }
    DomainError::Unexpected(err.to_string())
}
