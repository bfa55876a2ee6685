//! End-to-end dispatch scenarios driven through the public API, no sockets.

use phoebe::{
    HandlerError, Method, Request, Response, Router, RouterConfig, StatusCode, catch, health,
};

fn get(path: &str) -> Request {
    Request::new(Method::GET, path)
}

// ── Error forwarding ──────────────────────────────────────────────────────────

#[tokio::test]
async fn failing_handler_lands_in_the_default_stage() {
    async fn explode(_req: Request) -> Result<Response, HandlerError> {
        Err("Test error".into())
    }

    let app = Router::new().get("/error", explode).into_mux();
    let resp = app.dispatch(get("/error")).await;

    assert_eq!(resp.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(resp.header("content-type"), Some("application/json"));
    assert_eq!(resp.body(), br#"{"error":"Test error"}"#);
}

#[tokio::test]
async fn failure_before_the_first_await_is_treated_the_same() {
    async fn explode_early(req: Request) -> Result<Response, HandlerError> {
        // Fails before ever yielding.
        let _id: u64 = req.param("id").unwrap_or("not a number").parse()?;
        tokio::task::yield_now().await;
        Ok(Response::text("unreachable"))
    }

    let app = Router::new().get("/users/{id}", explode_early).into_mux();
    let resp = app.dispatch(get("/users/abc")).await;
    assert_eq!(resp.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn successful_fallible_handler_is_transparent() {
    async fn succeed(_req: Request) -> Result<Response, HandlerError> {
        Ok(Response::json(br#"{"success":true}"#.to_vec()))
    }

    let app = Router::new().get("/success", succeed).into_mux();
    let resp = app.dispatch(get("/success")).await;

    assert_eq!(resp.status_code(), StatusCode::OK);
    assert_eq!(resp.body(), br#"{"success":true}"#);
}

#[tokio::test]
async fn custom_stage_decides_the_outcome() {
    async fn explode(_req: Request) -> Result<Response, HandlerError> {
        Err("Test error".into())
    }

    let app = Router::new().get("/error", explode).catch(catch::text).into_mux();
    let resp = app.dispatch(get("/error")).await;

    assert_eq!(resp.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(resp.body(), b"Test error");
}

// ── Plain handlers stay plain ─────────────────────────────────────────────────

#[tokio::test]
async fn plain_handler_rendering_its_own_error_is_not_upgraded() {
    async fn teapot(_req: Request) -> Response {
        Response::status(StatusCode::IM_A_TEAPOT)
    }

    let app = Router::new().get("/tea", teapot).into_mux();
    let resp = app.dispatch(get("/tea")).await;

    // The hand-rolled status arrives as-is; the stage never runs.
    assert_eq!(resp.status_code(), StatusCode::IM_A_TEAPOT);
    assert!(resp.body().is_empty());
}

#[tokio::test]
async fn built_in_health_handlers_register_as_plain() {
    let app = Router::new()
        .get("/healthz", health::liveness)
        .get("/readyz", health::readiness)
        .into_mux();

    assert_eq!(app.dispatch(get("/healthz")).await.body(), b"ok");
    assert_eq!(app.dispatch(get("/readyz")).await.body(), b"ready");
}

// ── Middleware and param guards ───────────────────────────────────────────────

#[derive(Clone)]
struct Flag(&'static str);

#[tokio::test]
async fn middleware_state_reaches_the_handler() {
    async fn set_flag(mut req: Request) -> Request {
        req.extensions_mut().insert(Flag("set"));
        req
    }
    async fn echo_flag(req: Request) -> Response {
        let flag = req.extensions().get::<Flag>().map(|f| f.0).unwrap_or("missing");
        Response::text(flag)
    }

    let app = Router::new().middleware(set_flag).get("/flag", echo_flag).into_mux();
    assert_eq!(app.dispatch(get("/flag")).await.body(), b"set");
}

#[tokio::test]
async fn failing_middleware_reaches_the_stage_before_any_route() {
    async fn deny(_req: Request) -> Result<Request, HandlerError> {
        Err("nope".into())
    }
    async fn never(_req: Request) -> Response {
        unreachable!("handler must not run after middleware failure")
    }

    let app = Router::new().middleware(deny).get("/x", never).into_mux();
    let resp = app.dispatch(get("/x")).await;
    assert_eq!(resp.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(resp.body(), br#"{"error":"nope"}"#);
}

#[tokio::test]
async fn middleware_runs_even_for_unrouted_requests() {
    async fn deny(_req: Request) -> Result<Request, HandlerError> {
        Err("ran before 404".into())
    }

    // No routes at all: the stage answer proves middleware ran before the
    // lookup could miss.
    let app = Router::new().middleware(deny).into_mux();
    let resp = app.dispatch(get("/nowhere")).await;
    assert_eq!(resp.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(resp.body(), br#"{"error":"ran before 404"}"#);
}

#[tokio::test]
async fn param_guard_runs_before_the_handler() {
    async fn must_be_numeric(req: Request, value: String) -> Result<Request, HandlerError> {
        value.parse::<u64>()?;
        Ok(req)
    }
    async fn show(req: Request) -> Response {
        Response::text(req.param("id").unwrap_or("?").to_owned())
    }

    let app = Router::new()
        .param("id", must_be_numeric)
        .get("/users/{id}", show)
        .into_mux();

    assert_eq!(app.dispatch(get("/users/42")).await.body(), b"42");
    let rejected = app.dispatch(get("/users/forty-two")).await;
    assert_eq!(rejected.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn guards_for_unmatched_params_do_not_run() {
    async fn never(_req: Request, _value: String) -> Result<Request, HandlerError> {
        Err("guard must not run".into())
    }
    async fn ok(_req: Request) -> Response {
        Response::text("ok")
    }

    let app = Router::new().param("id", never).get("/static", ok).into_mux();
    assert_eq!(app.dispatch(get("/static")).await.body(), b"ok");
}

// ── Verb separation and match-all ─────────────────────────────────────────────

#[tokio::test]
async fn get_and_post_on_one_path_reach_distinct_handlers() {
    async fn on_get(_req: Request) -> Result<Response, HandlerError> {
        Ok(Response::text("from get"))
    }
    async fn on_post(_req: Request) -> Result<Response, HandlerError> {
        Ok(Response::text("from post"))
    }

    let app = Router::new().get("/thing", on_get).post("/thing", on_post).into_mux();

    assert_eq!(app.dispatch(get("/thing")).await.body(), b"from get");
    assert_eq!(
        app.dispatch(Request::new(Method::POST, "/thing")).await.body(),
        b"from post"
    );
}

#[tokio::test]
async fn match_all_covers_every_verb_but_yields_to_specific_routes() {
    async fn fallback(_req: Request) -> Response {
        Response::text("all")
    }
    async fn specific(_req: Request) -> Response {
        Response::text("get")
    }

    let app = Router::new().all("/thing", fallback).get("/thing", specific).into_mux();

    assert_eq!(app.dispatch(get("/thing")).await.body(), b"get");
    for method in [Method::POST, Method::PUT, Method::DELETE, Method::PATCH] {
        let resp = app.dispatch(Request::new(method, "/thing")).await;
        assert_eq!(resp.body(), b"all");
    }
}

// ── Matching config ───────────────────────────────────────────────────────────

#[tokio::test]
async fn relaxed_defaults_ignore_case_and_trailing_slash() {
    async fn ok(_req: Request) -> Response {
        Response::text("ok")
    }

    let app = Router::new().get("/Users", ok).into_mux();
    assert_eq!(app.dispatch(get("/users/")).await.status_code(), StatusCode::OK);
    assert_eq!(app.dispatch(get("/USERS")).await.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn strict_and_case_sensitive_configs_bind() {
    async fn ok(_req: Request) -> Response {
        Response::text("ok")
    }

    let cfg = RouterConfig { case_sensitive: true, strict: true, ..Default::default() };
    let app = Router::with_config(cfg).get("/Users", ok).into_mux();

    assert_eq!(app.dispatch(get("/Users")).await.status_code(), StatusCode::OK);
    assert_eq!(app.dispatch(get("/users")).await.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(app.dispatch(get("/Users/")).await.status_code(), StatusCode::NOT_FOUND);
}

// ── Nesting ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn nested_router_answers_under_its_prefix() {
    async fn profile(req: Request) -> Response {
        Response::text(format!("user {}", req.param("id").unwrap_or("?")))
    }

    let users = Router::new().get("/{id}", profile);
    let app = Router::new().nest("/users", users).into_mux();

    assert_eq!(app.dispatch(get("/users/7")).await.body(), b"user 7");
    assert_eq!(app.dispatch(get("/users")).await.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn merge_params_exposes_prefix_parameters_to_the_child() {
    async fn show(req: Request) -> Response {
        let tenant = req.param("tenant").unwrap_or("-");
        let id = req.param("id").unwrap_or("-");
        Response::text(format!("{tenant}/{id}"))
    }

    let merged = Router::with_config(RouterConfig { merge_params: true, ..Default::default() })
        .get("/items/{id}", show);
    let isolated = Router::new().get("/items/{id}", show);

    let app = Router::new()
        .nest("/a/{tenant}", merged)
        .nest("/b/{tenant}", isolated)
        .into_mux();

    assert_eq!(app.dispatch(get("/a/acme/items/9")).await.body(), b"acme/9");
    assert_eq!(app.dispatch(get("/b/acme/items/9")).await.body(), b"-/9");
}

#[tokio::test]
async fn parent_middleware_wraps_nested_dispatch() {
    async fn set_flag(mut req: Request) -> Request {
        req.extensions_mut().insert(Flag("parent"));
        req
    }
    async fn echo(req: Request) -> Response {
        Response::text(req.extensions().get::<Flag>().map(|f| f.0).unwrap_or("missing"))
    }

    let child = Router::new().get("/inner", echo);
    let app = Router::new().middleware(set_flag).nest("/sub", child).into_mux();

    assert_eq!(app.dispatch(get("/sub/inner")).await.body(), b"parent");
}
