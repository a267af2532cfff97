use std::sync::Arc;

use crate::application::auth_service::AuthService;
use crate::application::blog_service::BlogService;
use crate::application::comment_service::CommentService;
use crate::data::comment_repository::DynCommentRepository;
use crate::data::post_repository::DynPostRepository;
use crate::data::user_repository::DynUserRepository;
use crate::infrastructure::jwt::JwtService;
use crate::infrastructure::settings::Locale;

pub(crate) mod http;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) auth_service: Arc<AuthService<DynUserRepository>>,
    pub(crate) blog_service: Arc<BlogService<DynPostRepository, DynCommentRepository>>,
    pub(crate) comment_service: Arc<CommentService<DynCommentRepository, DynPostRepository>>,
    pub(crate) jwt: Arc<JwtService>,
    /// Language of validation messages.
    pub(crate) locale: Locale,
    pub(crate) body_limit_bytes: usize,
}

impl AppState {
    pub(crate) fn new(
        users: DynUserRepository,
        posts: DynPostRepository,
        comments: DynCommentRepository,
        jwt: Arc<JwtService>,
        locale: Locale,
        body_limit_bytes: usize,
    ) -> Self {
        Self {
            auth_service: Arc::new(AuthService::new(users, jwt.clone())),
            blog_service: Arc::new(BlogService::new(posts.clone(), comments.clone())),
            comment_service: Arc::new(CommentService::new(comments, posts)),
            jwt,
            locale,
            body_limit_bytes,
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::io;
    use std::sync::{Arc, Mutex};

    use serde_json::Value;
    use tracing::subscriber::DefaultGuard;

    use super::AppState;
    use crate::application::auth_service::tests::{FakeUserRepo, test_jwt};
    use crate::application::blog_service::tests::FakeStore;
    use crate::infrastructure::settings::Locale;

    pub(crate) const TEST_BODY_LIMIT: usize = 64 * 1024;

    /// State backed by in-memory fakes; the returned handles see every write.
    pub(crate) fn fake_state(locale: Locale) -> (AppState, FakeUserRepo, FakeStore) {
        let users = FakeUserRepo::default();
        let store = FakeStore::default();
        let state = AppState::new(
            Arc::new(users.clone()),
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            test_jwt(),
            locale,
            TEST_BODY_LIMIT,
        );
        (state, users, store)
    }

    pub(crate) fn bearer_for(state: &AppState, user_id: i64, username: &str) -> String {
        let token = state
            .jwt
            .generate_token(user_id, username)
            .expect("test token must be issued");
        format!("Bearer {token}")
    }

    /// JSON log lines written while the guard from [`CapturedLogs::install`]
    /// is alive on the current thread.
    #[derive(Clone, Default)]
    pub(crate) struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        pub(crate) fn install() -> (Self, DefaultGuard) {
            let logs = Self::default();
            let writer = logs.clone();
            let subscriber = tracing_subscriber::fmt()
                .json()
                .with_writer(move || writer.clone())
                .finish();
            (logs, tracing::subscriber::set_default(subscriber))
        }

        /// `fields` of every event logged with `message`.
        pub(crate) fn events(&self, message: &str) -> Vec<Value> {
            let raw = self.0.lock().expect("log buffer").clone();
            String::from_utf8_lossy(&raw)
                .lines()
                .filter_map(|line| serde_json::from_str::<Value>(line).ok())
                .map(|event| event["fields"].clone())
                .filter(|fields| fields["message"] == message)
                .collect()
        }
    }

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().expect("log buffer").extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }
}
