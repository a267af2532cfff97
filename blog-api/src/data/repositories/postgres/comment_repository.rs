use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::data::comment_repository::{
    CommentFilter, CommentRepository, NewComment, OwnedComment,
};
use crate::data::pagination::{PageResult, PageWindow, PagedQuery, Pagination, get_paginated_data};
use crate::domain::comment::Comment;
use crate::domain::error::{DomainError, Resource};

const COMMENT_COLUMNS: &str = "id, content, user_id, post_id, created_at, updated_at";

#[derive(Debug, Clone)]
pub(crate) struct PostgresCommentRepository {
    pool: PgPool,
}

impl PostgresCommentRepository {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct CommentRow {
    id: i64,
    content: String,
    user_id: i64,
    post_id: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

struct CommentPageQuery<'a> {
    pool: &'a PgPool,
    filter: CommentFilter,
}

impl CommentPageQuery<'_> {
    fn push_filter(&self, builder: &mut QueryBuilder<'_, Postgres>) {
        builder.push(" WHERE TRUE");
        if let Some(user_id) = self.filter.user_id {
            builder.push(" AND user_id = ").push_bind(user_id);
        }
        if let Some(post_id) = self.filter.post_id {
            builder.push(" AND post_id = ").push_bind(post_id);
        }
    }
}

#[async_trait]
impl PagedQuery for CommentPageQuery<'_> {
    type Item = Comment;

    async fn count(&self) -> Result<i64, DomainError> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM comments");
        self.push_filter(&mut builder);

        builder
            .build_query_scalar::<i64>()
            .fetch_one(self.pool)
            .await
            .map_err(map_comment_db_error)
    }

    async fn fetch(&self, window: PageWindow) -> Result<Vec<Comment>, DomainError> {
        let mut builder =
            QueryBuilder::<Postgres>::new(format!("SELECT {COMMENT_COLUMNS} FROM comments"));
        self.push_filter(&mut builder);
        builder
            .push(" ORDER BY created_at DESC, id DESC LIMIT ")
            .push_bind(window.limit)
            .push(" OFFSET ")
            .push_bind(window.offset);

        let rows = builder
            .build_query_as::<CommentRow>()
            .fetch_all(self.pool)
            .await
            .map_err(map_comment_db_error)?;

        rows.into_iter().map(map_row_to_comment).collect()
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn create_comment(&self, input: NewComment) -> Result<Comment, DomainError> {
        let row = sqlx::query_as::<_, CommentRow>(&format!(
            "INSERT INTO comments (content, user_id, post_id) VALUES ($1, $2, $3) RETURNING {COMMENT_COLUMNS}"
        ))
        .bind(input.content)
        .bind(input.user_id)
        .bind(input.post_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_comment_db_error)?;

        map_row_to_comment(row)
    }

    async fn get_comment(&self, id: i64) -> Result<Option<Comment>, DomainError> {
        let row = sqlx::query_as::<_, CommentRow>(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_comment_db_error)?;

        row.map(map_row_to_comment).transpose()
    }

    async fn update_comment_owned(
        &self,
        target: OwnedComment,
        content: String,
    ) -> Result<Option<Comment>, DomainError> {
        let row = sqlx::query_as::<_, CommentRow>(&format!(
            r#"
            UPDATE comments
            SET content = $4,
                updated_at = NOW()
            WHERE id = $1 AND user_id = $2 AND post_id = $3
            RETURNING {COMMENT_COLUMNS}
            "#
        ))
        .bind(target.id)
        .bind(target.owner_id)
        .bind(target.post_id)
        .bind(content)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_comment_db_error)?;

        row.map(map_row_to_comment).transpose()
    }

    async fn delete_comment_owned(&self, id: i64, owner_id: i64) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await
            .map_err(map_comment_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_user_comments(&self, user_id: i64) -> Result<Vec<Comment>, DomainError> {
        let rows = sqlx::query_as::<_, CommentRow>(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments WHERE user_id = $1 ORDER BY created_at DESC, id DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_comment_db_error)?;

        rows.into_iter().map(map_row_to_comment).collect()
    }

    async fn recent_comments(
        &self,
        post_ids: &[i64],
        per_post: i64,
    ) -> Result<Vec<Comment>, DomainError> {
        if post_ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query_as::<_, CommentRow>(&format!(
            r#"
            SELECT {COMMENT_COLUMNS}
            FROM (
                SELECT {COMMENT_COLUMNS},
                       ROW_NUMBER() OVER (PARTITION BY post_id ORDER BY created_at DESC, id DESC) AS rn
                FROM comments
                WHERE post_id = ANY($1)
            ) ranked
            WHERE rn <= $2
            ORDER BY post_id, created_at DESC, id DESC
            "#
        ))
        .bind(post_ids)
        .bind(per_post)
        .fetch_all(&self.pool)
        .await
        .map_err(map_comment_db_error)?;

        rows.into_iter().map(map_row_to_comment).collect()
    }

    async fn page_comments(
        &self,
        filter: CommentFilter,
        pagination: Pagination,
    ) -> Result<PageResult<Comment>, DomainError> {
        let query = CommentPageQuery {
            pool: &self.pool,
            filter,
        };
        get_paginated_data(&query, Some(pagination)).await
    }
}

fn map_row_to_comment(row: CommentRow) -> Result<Comment, DomainError> {
    Comment::new(
        row.id,
        row.content,
        row.user_id,
        row.post_id,
        row.created_at,
        row.updated_at,
    )
    .map_err(|err| DomainError::Unexpected(err.to_string()))
}

fn map_comment_db_error(err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &err
        && db_err.code().as_deref() == Some("23503")
    {
        return match db_err.constraint() {
            Some("comments_post_id_fkey") => DomainError::PostMissing,
            _ => DomainError::NotFound(Resource::User),
        };
    }
    DomainError::Unexpected(err.to_string())
}
