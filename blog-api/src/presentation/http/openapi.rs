use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::presentation::http::handlers::auth::{AuthResponseDto, LoginDto, RegisterDto};
use crate::presentation::http::handlers::comments::{
    CommentDetailDto, CommentDto, CommentPageDto, CommentPageRequestDto, CreateCommentDto,
    UpdateCommentDto,
};
use crate::presentation::http::handlers::posts::{
    CreatePostDto, PostDetailDto, PostDto, PostPageDto, PostPageRequestDto, UpdatePostDto,
};
use crate::presentation::http::handlers::system::HealthDto;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "blog-api",
        description = "Every response is a `{code, msg, data}` envelope with HTTP 200; `code` 0 is success."
    ),
    paths(
        crate::presentation::http::handlers::system::hello,
        crate::presentation::http::handlers::system::healthz,
        crate::presentation::http::handlers::auth::register,
        crate::presentation::http::handlers::auth::login,
        crate::presentation::http::handlers::posts::add_post,
        crate::presentation::http::handlers::posts::update_post,
        crate::presentation::http::handlers::posts::get_post,
        crate::presentation::http::handlers::posts::delete_post,
        crate::presentation::http::handlers::posts::list_user_posts,
        crate::presentation::http::handlers::posts::page_posts,
        crate::presentation::http::handlers::comments::add_comment,
        crate::presentation::http::handlers::comments::update_comment,
        crate::presentation::http::handlers::comments::get_comment,
        crate::presentation::http::handlers::comments::delete_comment,
        crate::presentation::http::handlers::comments::list_user_comments,
        crate::presentation::http::handlers::comments::page_comments
    ),
    components(
        schemas(
            HealthDto,
            RegisterDto,
            LoginDto,
            AuthResponseDto,
            CreatePostDto,
            UpdatePostDto,
            PostPageRequestDto,
            PostDto,
            PostDetailDto,
            PostPageDto,
            CreateCommentDto,
            UpdateCommentDto,
            CommentPageRequestDto,
            CommentDto,
            CommentDetailDto,
            CommentPageDto
        )
    ),
    tags(
        (name = "system", description = "Liveness endpoints"),
        (name = "auth", description = "Registration and login"),
        (name = "posts", description = "Post endpoints"),
        (name = "comments", description = "Comment endpoints")
    ),
    modifiers(&SecurityAddon)
)]
pub(crate) struct ApiDoc;

pub(crate) struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let mut components = openapi.components.take().unwrap_or_default();
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
        openapi.components = Some(components);
    }
}
