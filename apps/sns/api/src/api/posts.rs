use axum::Router;
use domain_posts::{
    PgCommentStore, PgLikeStore, PgNotificationStore, PgPostStore, PgUserDirectory, PostService,
    handlers,
};

pub fn router(state: &crate::state::AppState) -> Router {
    let service = PostService::new(
        PgUserDirectory::new(state.db.clone()),
        PgPostStore::new(state.db.clone()),
        PgLikeStore::new(state.db.clone()),
        PgCommentStore::new(state.db.clone()),
        PgNotificationStore::new(state.db.clone()),
    );
    handlers::router(service, state.jwt_auth.clone())
}
