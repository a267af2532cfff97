use axum::extract::State;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::comments::CommentDto;
use crate::data::pagination::{PageResult, Pagination};
use crate::data::post_repository::PostFilter;
use crate::domain::post::{CreatePostRequest, Post, PostWithComments, UpdatePostRequest};
use crate::infrastructure::settings::Locale;
use crate::presentation::AppState;
use crate::presentation::http::app_error::AppResult;
use crate::presentation::http::extract::{IdPath, ValidatedJson};
use crate::presentation::http::middleware::auth::AuthenticatedUser;
use crate::presentation::http::response::ApiResponse;
use crate::presentation::http::validation::{FieldLabel, LabeledFields, required, trimmed};

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub(crate) struct CreatePostDto {
    #[serde(deserialize_with = "trimmed")]
    #[validate(custom(function = "required"), length(max = 200))]
    pub(crate) title: String,
    #[validate(custom(function = "required"))]
    pub(crate) content: String,
}

impl LabeledFields for CreatePostDto {
    const FIELD_LABELS: &'static [FieldLabel] = &[
        FieldLabel::labeled("title", &[(Locale::Zh, "标题")]),
        FieldLabel::labeled("content", &[(Locale::Zh, "内容")]),
    ];
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub(crate) struct UpdatePostDto {
    #[validate(range(min = 1, code = "required"))]
    pub(crate) id: i64,
    #[serde(deserialize_with = "trimmed")]
    #[validate(custom(function = "required"), length(max = 200))]
    pub(crate) title: String,
    #[validate(custom(function = "required"))]
    pub(crate) content: String,
}

impl LabeledFields for UpdatePostDto {
    const FIELD_LABELS: &'static [FieldLabel] = &[
        FieldLabel::plain("id"),
        FieldLabel::labeled("title", &[(Locale::Zh, "标题")]),
        FieldLabel::labeled("content", &[(Locale::Zh, "内容")]),
    ];
}

/// Page request; `user_id` filters when positive.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub(crate) struct PostPageRequestDto {
    pub(crate) page: i64,
    pub(crate) page_size: i64,
    pub(crate) user_id: Option<i64>,
}

impl LabeledFields for PostPageRequestDto {
    const FIELD_LABELS: &'static [FieldLabel] = &[];
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct PostDto {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) user_id: i64,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

/// A post with its most recent comments.
#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct PostDetailDto {
    #[serde(flatten)]
    pub(crate) post: PostDto,
    pub(crate) comments: Vec<CommentDto>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct PostPageDto {
    pub(crate) data: Vec<PostDto>,
    pub(crate) total: i64,
    pub(crate) page: i64,
    pub(crate) page_size: i64,
    pub(crate) total_pages: i64,
    pub(crate) has_more: bool,
}

impl From<Post> for PostDto {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            title: post.title,
            content: post.content,
            user_id: post.user_id,
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

impl From<PostWithComments> for PostDetailDto {
    fn from(thread: PostWithComments) -> Self {
        Self {
            post: thread.post.into(),
            comments: thread.comments.into_iter().map(CommentDto::from).collect(),
        }
    }
}

impl From<PageResult<Post>> for PostPageDto {
    fn from(page: PageResult<Post>) -> Self {
        let page = page.map(PostDto::from);
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
    path = "/post/add",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    request_body = CreatePostDto,
    responses(
        (status = 200, description = "Envelope; code 0 carries the created post", body = PostDto)
    )
)]
pub(crate) async fn add_post(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    ValidatedJson(dto): ValidatedJson<CreatePostDto>,
) -> AppResult<ApiResponse<PostDto>> {
    let req = CreatePostRequest {
        title: dto.title,
        content: dto.content,
    };

    let post = state.blog_service.create_post(auth.user_id, req).await?;
    Ok(ApiResponse::success(post.into(), ""))
}

#[utoipa::path(
    post,
    path = "/post/update",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    request_body = UpdatePostDto,
    responses(
        (status = 200, description = "Envelope; code 0 carries the updated post, 2002 when the caller owns no such post", body = PostDto)
    )
)]
pub(crate) async fn update_post(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    ValidatedJson(dto): ValidatedJson<UpdatePostDto>,
) -> AppResult<ApiResponse<PostDto>> {
    let req = UpdatePostRequest {
        id: dto.id,
        title: dto.title,
        content: dto.content,
    };

    let post = state.blog_service.update_post(auth.user_id, req).await?;
    Ok(ApiResponse::success(post.into(), ""))
}

#[utoipa::path(
    get,
    path = "/post/{id}",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    responses(
        (status = 200, description = "Envelope; code 0 carries the post and its recent comments", body = PostDetailDto)
    )
)]
pub(crate) async fn get_post(
    State(state): State<AppState>,
    _auth: AuthenticatedUser,
    IdPath(id): IdPath,
) -> AppResult<ApiResponse<PostDetailDto>> {
    let thread = state.blog_service.get_post(id).await?;
    Ok(ApiResponse::success(thread.into(), ""))
}

#[utoipa::path(
    delete,
    path = "/post/{id}",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    responses(
        (status = 200, description = "Envelope; code 0 on delete, 2002 when the caller owns no such post")
    )
)]
pub(crate) async fn delete_post(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    IdPath(id): IdPath,
) -> AppResult<ApiResponse<()>> {
    state.blog_service.delete_post(auth.user_id, id).await?;
    Ok(ApiResponse::success((), ""))
}

#[utoipa::path(
    get,
    path = "/post/user",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Envelope; code 0 carries the caller's posts", body = [PostDetailDto])
    )
)]
pub(crate) async fn list_user_posts(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
) -> AppResult<ApiResponse<Vec<PostDetailDto>>> {
    let threads = state.blog_service.list_user_posts(auth.user_id).await?;
    Ok(ApiResponse::success(
        threads.into_iter().map(PostDetailDto::from).collect(),
        "",
    ))
}

#[utoipa::path(
    post,
    path = "/post/page",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    request_body = PostPageRequestDto,
    responses(
        (status = 200, description = "Envelope; code 0 carries one page of posts, newest first", body = PostPageDto)
    )
)]
pub(crate) async fn page_posts(
    State(state): State<AppState>,
    _auth: AuthenticatedUser,
    ValidatedJson(dto): ValidatedJson<PostPageRequestDto>,
) -> AppResult<ApiResponse<PostPageDto>> {
    let filter = PostFilter {
        user_id: dto.user_id.filter(|id| *id > 0),
    };
    let pagination = Pagination::new(dto.page, dto.page_size);

    let page = state.blog_service.page_posts(filter, pagination).await?;
    Ok(ApiResponse::success(page.into(), ""))
}
