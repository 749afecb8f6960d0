// src/routes.rs

use axum::{
    Router, http::Method,
    middleware,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::{
    handlers::{auth, comments, my_posts, posts, profiles},
    state::AppState,
    utils::jwt::{auth_middleware, optional_auth_middleware},
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (user, posts, my-posts, comments, profiles).
/// * Applies global middleware (Trace, CORS) and static media serving.
/// * Injects global state (Database Pool + Config).
pub fn create_router(state: AppState) -> Router {
    let origins = [
        "http://localhost:3000".parse().unwrap(),
        "http://127.0.0.1:3000".parse().unwrap(),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let user_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/token", post(auth::obtain_token))
        .route("/token/refresh", post(auth::refresh_token))
        .merge(
            Router::new()
                .route("/logout", post(auth::logout))
                .layer(middleware::from_fn_with_state(
                    state.clone(),
                    auth_middleware,
                )),
        );

    // The public feed falls back to all posts for anonymous requesters,
    // so its routes take the optional variant of the auth layer.
    let post_routes = Router::new()
        .route("/", get(posts::list_posts))
        .route("/{id}", get(posts::get_post))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            optional_auth_middleware,
        ))
        .merge(
            Router::new()
                .route("/liked-posts", get(posts::liked_posts))
                .route("/{id}/like", post(posts::like_post))
                .route("/{id}/comment", post(posts::comment_post))
                .layer(middleware::from_fn_with_state(
                    state.clone(),
                    auth_middleware,
                )),
        );

    let my_post_routes = Router::new()
        .route("/", get(my_posts::list_my_posts).post(my_posts::create_post))
        .route(
            "/{id}",
            get(my_posts::get_my_post)
                .put(my_posts::update_my_post)
                .delete(my_posts::delete_my_post),
        )
        .route("/{id}/upload-image", post(my_posts::upload_image))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let comment_routes = Router::new()
        .route("/", get(comments::list_comments))
        .route(
            "/{id}",
            get(comments::get_comment)
                .put(comments::update_comment)
                .delete(comments::delete_comment),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let profile_routes = Router::new()
        .route("/", get(profiles::list_profiles))
        .route("/following", get(profiles::following))
        .route("/{id}", get(profiles::get_profile))
        .route("/{id}/follow-user", post(profiles::follow_user))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let my_profile_routes = Router::new()
        .route(
            "/",
            get(profiles::get_my_profile)
                .post(profiles::create_my_profile)
                .put(profiles::update_my_profile)
                .delete(profiles::delete_my_profile),
        )
        .route("/followers", get(profiles::my_followers))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .nest("/api/user", user_routes)
        .nest("/api/posts", post_routes)
        .nest("/api/my-posts", my_post_routes)
        .nest("/api/comments", comment_routes)
        .nest("/api/profiles", profile_routes)
        .nest("/api/my-profile", my_profile_routes)
        .nest_service("/media", ServeDir::new(&state.config.media_root))
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
