use axum::extract::State;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::posts::PostDto;
use crate::data::comment_repository::CommentFilter;
use crate::data::pagination::{PageResult, Pagination};
use crate::domain::comment::{
    Comment, CommentWithPost, CreateCommentRequest, UpdateCommentRequest,
};
use crate::infrastructure::settings::Locale;
use crate::presentation::AppState;
use crate::presentation::http::app_error::AppResult;
use crate::presentation::http::extract::{IdPath, ValidatedJson};
use crate::presentation::http::middleware::auth::AuthenticatedUser;
use crate::presentation::http::response::ApiResponse;
use crate::presentation::http::validation::{FieldLabel, LabeledFields, required};

const POST_ID_LABEL: FieldLabel = FieldLabel::labeled("post_id", &[(Locale::Zh, "文章ID")]);
const CONTENT_LABEL: FieldLabel = FieldLabel::labeled("content", &[(Locale::Zh, "评论内容")]);

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub(crate) struct CreateCommentDto {
    #[validate(range(min = 1, code = "required"))]
    pub(crate) post_id: i64,
    #[validate(custom(function = "required"))]
    pub(crate) content: String,
}

impl LabeledFields for CreateCommentDto {
    const FIELD_LABELS: &'static [FieldLabel] = &[POST_ID_LABEL, CONTENT_LABEL];
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub(crate) struct UpdateCommentDto {
    #[validate(range(min = 1, code = "required"))]
    pub(crate) id: i64,
    #[validate(range(min = 1, code = "required"))]
    pub(crate) post_id: i64,
    #[validate(custom(function = "required"))]
    pub(crate) content: String,
}

impl LabeledFields for UpdateCommentDto {
    const FIELD_LABELS: &'static [FieldLabel] =
        &[FieldLabel::plain("id"), POST_ID_LABEL, CONTENT_LABEL];
}

/// Page request; `user_id` and `post_id` filter when positive.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub(crate) struct CommentPageRequestDto {
    pub(crate) page: i64,
    pub(crate) page_size: i64,
    pub(crate) user_id: Option<i64>,
    pub(crate) post_id: Option<i64>,
}

impl LabeledFields for CommentPageRequestDto {
    const FIELD_LABELS: &'static [FieldLabel] = &[];
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct CommentDto {
    pub(crate) id: i64,
    pub(crate) content: String,
    pub(crate) user_id: i64,
    pub(crate) post_id: i64,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

/// A comment with the post it was left on; `post` is null if it is gone.
#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct CommentDetailDto {
    #[serde(flatten)]
    pub(crate) comment: CommentDto,
    pub(crate) post: Option<PostDto>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct CommentPageDto {
    pub(crate) data: Vec<CommentDto>,
    pub(crate) total: i64,
    pub(crate) page: i64,
    pub(crate) page_size: i64,
    pub(crate) total_pages: i64,
    pub(crate) has_more: bool,
}

impl From<Comment> for CommentDto {
    fn from(comment: Comment) -> Self {
        Self {
            id: comment.id,
            content: comment.content,
            user_id: comment.user_id,
            post_id: comment.post_id,
            created_at: comment.created_at,
            updated_at: comment.updated_at,
        }
    }
}

impl From<CommentWithPost> for CommentDetailDto {
    fn from(view: CommentWithPost) -> Self {
        Self {
            comment: view.comment.into(),
            post: view.post.map(PostDto::from),
        }
    }
}

impl From<PageResult<Comment>> for CommentPageDto {
    fn from(page: PageResult<Comment>) -> Self {
        let page = page.map(CommentDto::from);
        Self {
            data: page.data,
            total: page.total,
            page: page.page,
            page_size: page.page_size,
            total_pages: page.total_pages,
            has_more: page.has_more,
        }
    }
}

#[utoipa::path(
    post,
    path = "/comment/add",
    tag = "comments",
    security(
        ("bearer_auth" = [])
    ),
    request_body = CreateCommentDto,
    responses(
        (status = 200, description = "Envelope; code 0 carries the comment, 2003 when the post does not exist", body = CommentDto)
    )
)]
pub(crate) async fn add_comment(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    ValidatedJson(dto): ValidatedJson<CreateCommentDto>,
) -> AppResult<ApiResponse<CommentDto>> {
    let req = CreateCommentRequest {
        post_id: dto.post_id,
        content: dto.content,
    };

    let comment = state.comment_service.add_comment(auth.user_id, req).await?;
    Ok(ApiResponse::success(comment.into(), ""))
}

#[utoipa::path(
    post,
    path = "/comment/update",
    tag = "comments",
    security(
        ("bearer_auth" = [])
    ),
    request_body = UpdateCommentDto,
    responses(
        (status = 200, description = "Envelope; code 0 carries the comment, 2003 when the post or the caller's comment is missing", body = CommentDto)
    )
)]
pub(crate) async fn update_comment(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    ValidatedJson(dto): ValidatedJson<UpdateCommentDto>,
) -> AppResult<ApiResponse<CommentDto>> {
    let req = UpdateCommentRequest {
        id: dto.id,
        post_id: dto.post_id,
        content: dto.content,
    };

    let comment = state
        .comment_service
        .update_comment(auth.user_id, req)
        .await?;
    Ok(ApiResponse::success(comment.into(), ""))
}

#[utoipa::path(
    get,
    path = "/comment/{id}",
    tag = "comments",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Comment id")
    ),
    responses(
        (status = 200, description = "Envelope; code 0 carries the comment and its post", body = CommentDetailDto)
    )
)]
pub(crate) async fn get_comment(
    State(state): State<AppState>,
    _auth: AuthenticatedUser,
    IdPath(id): IdPath,
) -> AppResult<ApiResponse<CommentDetailDto>> {
    let view = state.comment_service.get_comment(id).await?;
    Ok(ApiResponse::success(view.into(), ""))
}

#[utoipa::path(
    delete,
    path = "/comment/{id}",
    tag = "comments",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Comment id")
    ),
    responses(
        (status = 200, description = "Envelope; code 0 on delete, 2003 when the caller owns no such comment")
    )
)]
pub(crate) async fn delete_comment(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    IdPath(id): IdPath,
) -> AppResult<ApiResponse<()>> {
    state.comment_service.delete_comment(auth.user_id, id).await?;
    Ok(ApiResponse::success((), ""))
}

#[utoipa::path(
    get,
    path = "/comment/user",
    tag = "comments",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Envelope; code 0 carries the caller's comments", body = [CommentDetailDto])
    )
)]
pub(crate) async fn list_user_comments(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
) -> AppResult<ApiResponse<Vec<CommentDetailDto>>> {
    let views = state
        .comment_service
        .list_user_comments(auth.user_id)
        .await?;
    Ok(ApiResponse::success(
        views.into_iter().map(CommentDetailDto::from).collect(),
        "",
    ))
}

#[utoipa::path(
    post,
    path = "/comment/page",
    tag = "comments",
    security(
        ("bearer_auth" = [])
    ),
    request_body = CommentPageRequestDto,
    responses(
        (status = 200, description = "Envelope; code 0 carries one page of comments, newest first", body = CommentPageDto)
    )
)]
pub(crate) async fn page_comments(
    State(state): State<AppState>,
    _auth: AuthenticatedUser,
    ValidatedJson(dto): ValidatedJson<CommentPageRequestDto>,
) -> AppResult<ApiResponse<CommentPageDto>> {
    let filter = CommentFilter {
        user_id: dto.user_id.filter(|id| *id > 0),
        post_id: dto.post_id.filter(|id| *id > 0),
    };
    let pagination = Pagination::new(dto.page, dto.page_size);

    let page = state
        .comment_service
        .page_comments(filter, pagination)
        .await?;
    Ok(ApiResponse::success(page.into(), ""))
}
