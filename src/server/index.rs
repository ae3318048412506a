use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};

use super::files::{listing_for, PathQuery};
use super::AppContext;
use crate::html;
use crate::view::{self, ListingView};

/// `GET /?path=`：不依赖脚本的浏览页
pub async fn browse(State(context): State<AppContext>, Query(query): Query<PathQuery>) -> Response {
    let requested = query.relative();
    match listing_for(context.root(), requested.clone()).await {
        Ok(listing) => {
            let crumbs = view::breadcrumbs(&listing.current_path);
            let page = html::page(&listing.current_path, &crumbs, &view::listing(listing.files), None);
            Html(page).into_response()
        }
        Err(e) => {
            let status = e.status();
            if status == StatusCode::INTERNAL_SERVER_ERROR {
                tracing::error!(path = %requested, error = %e, "browse failed");
            }
            let page = html::page(
                &requested,
                &view::breadcrumbs(""),
                &ListingView::Empty,
                Some(&e.to_string()),
            );
            (status, Html(page)).into_response()
        }
    }
}
