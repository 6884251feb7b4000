//! Server rendered HTML pages: the home page and the leaderboard table
//! along with the error page shown when the leaderboard cannot be loaded

use crate::{
    config::Config,
    services::leaderboard::{
        models::{LeaderboardEntry, LeaderboardRequest, Segment},
        FetchError, Leaderboard,
    },
    utils::html::escape,
};
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Extension, Router,
};
use indoc::formatdoc;
use log::error;
use std::sync::Arc;

/// Title shown on the leaderboard page
const LEADERBOARD_TITLE: &str = "Merdeka Contest Leaderboard";

/// Router function creates a new router with all the underlying
/// routes for this file.
///
/// Prefix: /
pub fn router() -> Router {
    Router::new()
        .route("/", get(home))
        .route("/leaderboard", get(leaderboard_page))
}

/// GET /
async fn home() -> Html<String> {
    Html(render_home())
}

/// GET /leaderboard
///
/// Fetches the configured contest leaderboard from the upstream and
/// renders it as a table
async fn leaderboard_page(
    Extension(config): Extension<Arc<Config>>,
    Extension(leaderboard): Extension<Arc<Leaderboard>>,
) -> Result<Html<String>, FetchError> {
    let renderer = &config.renderer;
    let request = LeaderboardRequest {
        contest_id: renderer.contest_id.into(),
        segment: Segment::new(renderer.page_size, 0),
    };

    let entries = leaderboard
        .fetch(renderer.shape.shapes(), &request)
        .await
        .map_err(|err| {
            error!("Failed to load leaderboard: {}", err);
            err
        })?;

    Ok(Html(render_leaderboard(&entries)))
}

fn render_home() -> String {
    formatdoc! {r#"
        <!DOCTYPE html>
        <html lang="en">
        <head><meta charset="utf-8"><title>Home</title></head>
        <body>
        <main style="padding: 2rem">
            <h1>Home</h1>
            <p><a href="/leaderboard">Go to Leaderboard</a></p>
        </main>
        </body>
        </html>
    "#}
}

/// Renders the entries into the leaderboard table, the rank of each
/// entry is its position in the list
fn render_leaderboard(entries: &[LeaderboardEntry]) -> String {
    let rows: String = entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            format!(
                "            <tr><td>#{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                index + 1,
                escape(&entry.full_name),
                escape(&entry.country),
                entry.login,
                format_performance(entry.performance),
                escape(entry.nickname.as_deref().unwrap_or("N/A")),
            )
        })
        .collect();

    formatdoc! {r#"
        <!DOCTYPE html>
        <html lang="en">
        <head><meta charset="utf-8"><title>{title}</title></head>
        <body>
        <main style="max-width: 800px; margin: 0 auto; padding: 2rem">
            <h1 style="font-size: 2rem; font-weight: bold; text-align: center">{title}</h1>
            <table border="1" cellpadding="8" style="width: 100%; margin-top: 16px">
            <thead>
            <tr><th>Rank</th><th>Full Name</th><th>Country</th><th>Login</th><th>Performance</th><th>Nickname</th></tr>
            </thead>
            <tbody>
        {rows}    </tbody>
            </table>
        </main>
        </body>
        </html>
    "#, title = LEADERBOARD_TITLE, rows = rows}
}

/// Rounds the performance to the nearest whole percent
fn format_performance(value: f64) -> String {
    format!("{:.0}%", value.round())
}

fn render_error(message: &str) -> String {
    formatdoc! {r#"
        <!DOCTYPE html>
        <html lang="en">
        <head><meta charset="utf-8"><title>Failed to load leaderboard</title></head>
        <body>
        <main style="max-width: 800px; margin: 0 auto; padding: 2rem">
            <h1>Failed to load leaderboard</h1>
            <pre style="white-space: pre-wrap; background: #111; color: #eee; padding: 12px">{message}</pre>
            <form method="get" action="/leaderboard">
                <button type="submit" style="margin-top: 12px">Retry</button>
            </form>
        </main>
        </body>
        </html>
    "#, message = escape(message)}
}

/// IntoResponse implementation for FetchError showing the error
/// message on the error page
impl IntoResponse for FetchError {
    fn into_response(self) -> Response {
        let page = render_error(&self.to_string());
        (StatusCode::BAD_GATEWAY, Html(page)).into_response()
    }
}

#[cfg(test)]
mod test {
    use super::{format_performance, render_error, render_leaderboard};
    use crate::{
        routes::router,
        services::leaderboard::{models::LeaderboardEntry, Leaderboard},
        utils::mock::{test_config, MockUpstream},
    };
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        routing::post,
        Json, Router,
    };
    use serde_json::json;
    use std::sync::Arc;
    use tower::ServiceExt;

    #[test]
    fn test_render_row() {
        let entries: Vec<LeaderboardEntry> = serde_json::from_value(json!([
            {"login": 1, "fullName": "A", "country": "MY", "performance": 87.6, "nickname": null}
        ]))
        .unwrap();

        let page = render_leaderboard(&entries);
        assert!(page.contains(
            "<tr><td>#1</td><td>A</td><td>MY</td><td>1</td><td>88%</td><td>N/A</td></tr>"
        ));
    }

    #[test]
    fn test_render_order_and_escape() {
        let entries: Vec<LeaderboardEntry> = serde_json::from_value(json!([
            {"login": 9, "fullName": "<b>Z</b>", "country": "SG", "performance": 99.5, "nickname": "zed"},
            {"login": 3, "fullName": "Amy & Co", "country": "MY", "performance": 12.4, "nickname": null}
        ]))
        .unwrap();

        let page = render_leaderboard(&entries);
        let first = page.find("<td>#1</td><td>&lt;b&gt;Z&lt;/b&gt;</td>").unwrap();
        let second = page.find("<td>#2</td><td>Amy &amp; Co</td>").unwrap();
        assert!(first < second);
        assert!(page.contains("<td>100%</td><td>zed</td>"));
        assert!(page.contains("<td>12%</td><td>N/A</td>"));
    }

    #[test]
    fn test_format_performance() {
        assert_eq!(format_performance(87.6), "88%");
        assert_eq!(format_performance(87.4), "87%");
        assert_eq!(format_performance(2.5), "3%");
        assert_eq!(format_performance(100.0), "100%");
    }

    #[test]
    fn test_render_error() {
        let page = render_error("Failed <500>");
        assert!(page.contains("<h1>Failed to load leaderboard</h1>"));
        assert!(page.contains("Failed &lt;500&gt;"));
        assert!(page.contains("Retry"));
    }

    #[tokio::test]
    async fn test_leaderboard_page() {
        let upstream = MockUpstream::spawn(Router::new().route(
            "/contests/:id/leaderboard",
            post(|| async {
                Json(json!([
                    {"login": 1, "fullName": "A", "country": "MY", "performance": 87.6, "nickname": null}
                ]))
            }),
        ))
        .await;

        let config = test_config(&upstream.base_url);
        let leaderboard = Leaderboard::new(&config.upstream).unwrap();
        let app = router(Arc::new(config), Arc::new(leaderboard));

        let req = Request::builder()
            .uri("/leaderboard")
            .body(Body::empty())
            .unwrap();
        let res = app.oneshot(req).await.unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(
            res.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/html; charset=utf-8"
        );
        let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let body = String::from_utf8(body.to_vec()).unwrap();
        assert!(body.contains("<td>#1</td>"));
        assert!(body.contains("<td>88%</td><td>N/A</td>"));
        assert_eq!(
            upstream.hits(),
            vec!["POST /contests/10/leaderboard".to_string()]
        );
    }

    #[tokio::test]
    async fn test_leaderboard_page_error() {
        let base_url = MockUpstream::unreachable().await;
        let config = test_config(&base_url);
        let leaderboard = Leaderboard::new(&config.upstream).unwrap();
        let app = router(Arc::new(config), Arc::new(leaderboard));

        let req = Request::builder()
            .uri("/leaderboard")
            .body(Body::empty())
            .unwrap();
        let res = app.oneshot(req).await.unwrap();

        assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
        let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let body = String::from_utf8(body.to_vec()).unwrap();
        assert!(body.contains("Failed to load leaderboard"));
        assert!(body.contains("path-scoped POST"));
        assert!(body.contains("flat POST"));
        assert!(body.contains("query GET"));
        assert!(body.contains("Retry"));
    }

    #[tokio::test]
    async fn test_home() {
        let config = test_config("http://upstream.test");
        let leaderboard = Leaderboard::new(&config.upstream).unwrap();
        let app = router(Arc::new(config), Arc::new(leaderboard));

        let req = Request::builder().uri("/").body(Body::empty()).unwrap();
        let res = app.oneshot(req).await.unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let body = String::from_utf8(body.to_vec()).unwrap();
        assert!(body.contains(r#"<a href="/leaderboard">Go to Leaderboard</a>"#));
    }
}
