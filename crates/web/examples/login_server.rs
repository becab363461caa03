//! Serves the pages under `crates/web/static` plus a form login.
//!
//! Try it with:
//! ```text
//! curl -i http://127.0.0.1:8080/index.html
//! curl -i -d 'account=gugu&password=password' http://127.0.0.1:8080/login
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use http::header::LOCATION;
use http::{HeaderValue, StatusCode};
use jwp_http::protocol::{Request, Response};
use jwp_web::router::{get, post, Router};
use jwp_web::{handler_fn, BoxError, Handler, Server, StaticResources};
use serde::Deserialize;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Deserialize)]
struct LoginForm {
    account: String,
    password: String,
}

struct LoginHandler {
    users: HashMap<String, String>,
    resources: Arc<StaticResources>,
}

impl Handler for LoginHandler {
    fn handle(&self, request: Request) -> Result<Response, BoxError> {
        let Ok(form) = request.form::<LoginForm>() else {
            return Ok(self.resources.default_page_for(StatusCode::UNAUTHORIZED));
        };

        if self.users.get(&form.account) != Some(&form.password) {
            info!(account = %form.account, "login rejected");
            return Ok(self.resources.default_page_for(StatusCode::UNAUTHORIZED));
        }

        info!(account = %form.account, "login accepted");
        let index = self.resources.resolve_static("/index.html")?;
        Ok(index.with_status(StatusCode::FOUND).with_header(LOCATION, HeaderValue::from_static("/index.html")))
    }
}

#[tokio::main]
async fn main() {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let resources = Arc::new(StaticResources::with_default_pages(concat!(env!("CARGO_MANIFEST_DIR"), "/static")));
    let users = HashMap::from([("gugu".to_string(), "password".to_string())]);

    let index_resources = Arc::clone(&resources);
    let router = Router::builder()
        .route("/", get(handler_fn(move |_request: Request| index_resources.resolve_static("/index.html"))))
        .route("/login", get(handler_fn({
            let resources = Arc::clone(&resources);
            move |_request: Request| resources.resolve_static("/login.html")
        })))
        .route("/login", post(LoginHandler { users, resources: Arc::clone(&resources) }))
        .build()
        .expect("routes must be valid");

    Server::builder()
        .bind("127.0.0.1:8080")
        .router(router)
        .resources(resources)
        .build()
        .unwrap()
        .start()
        .await;
}
