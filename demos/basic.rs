//! Minimal phoebe example — CRUD-style JSON endpoints with fallible handlers.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example basic
//!
//! Try:
//!   curl http://localhost:3000/users/42
//!   curl http://localhost:3000/users/not-a-number   # → 500 from the error stage
//!   curl -X POST http://localhost:3000/users \
//!        -H 'content-type: application/json' \
//!        -d '{"name":"alice"}'
//!   curl http://localhost:3000/healthz

use phoebe::{HandlerError, Request, Response, Router, Server, StatusCode, health};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let app = Router::new()
        .get("/users/{id}", get_user)
        .post("/users", create_user)
        .delete("/users/{id}", delete_user)
        .get("/healthz", health::liveness)
        .get("/readyz", health::readiness)
        .into_mux();

    Server::bind("0.0.0.0:3000")
        .serve(app)
        .await
        .expect("server error");
}

// GET /users/{id}
//
// Fallible handler: the `?` on parse sends bad ids straight to the error
// stage — no hand-rolled 500s here.
async fn get_user(req: Request) -> Result<Response, HandlerError> {
    let id: u64 = req.param("id").unwrap_or_default().parse()?;
    Ok(Response::json(format!(r#"{{"id":"{id}","name":"alice"}}"#).into_bytes()))
}

// POST /users
//
// Plain handler: it renders its own failure as 400, so phoebe leaves it
// exactly as written.
async fn create_user(req: Request) -> Response {
    if req.body().is_empty() {
        return Response::status(StatusCode::BAD_REQUEST);
    }

    // Real app: let input: CreateUser = serde_json::from_slice(req.body())?;
    Response::builder()
        .status(StatusCode::CREATED)
        .header("location", "/users/99")
        .json(r#"{"id":"99","name":"new_user"}"#.as_bytes().to_vec())
}

// DELETE /users/{id} → 204 No Content
async fn delete_user(_req: Request) -> Response {
    Response::status(StatusCode::NO_CONTENT)
}
