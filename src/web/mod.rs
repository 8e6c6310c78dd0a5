//! Browser form in front of the search/enrich chain.

mod html;

use std::time::Duration;

use axum::Router;
use axum::extract::{Form, State};
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use serde::Deserialize;
use tracing::{error, info, warn};

use crate::apollo::{ApolloClient, ApolloError};
use crate::contact::{QueryError, SearchQuery};
use crate::enrich::find_contacts;
use crate::export::{ExportError, to_csv};
use html::Notice;

#[derive(Clone)]
pub struct AppState {
    pub client: ApolloClient,
    pub pacing: Duration,
}

/// Raw form fields. Everything is a string so a half-filled form can be
/// re-rendered as submitted.
#[derive(Debug, Default, Deserialize)]
pub struct ContactForm {
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub designation: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub limit: String,
}

impl ContactForm {
    fn to_query(&self) -> Result<SearchQuery, QueryError> {
        let limit = self.limit.trim().parse::<u32>().ok();
        SearchQuery::new(&self.domain, &self.designation, Some(self.location.as_str()), limit)
    }
}

#[derive(Debug, thiserror::Error)]
enum AppError {
    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Apollo(#[from] ApolloError),

    #[error(transparent)]
    Export(#[from] ExportError),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::Query(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Apollo(ApolloError::ApiKeyNotSet | ApolloError::InvalidBaseUrl(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Apollo(_) => StatusCode::BAD_GATEWAY,
            AppError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn notice(&self) -> Notice {
        match self {
            AppError::Query(e) => Notice::Error(e.to_string()),
            _ => Notice::Error(format!("Error: {self}")),
        }
    }

    fn into_page(self, form: &ContactForm) -> Response {
        match &self {
            AppError::Query(_) => warn!(error = %self, "rejected form submission"),
            _ => error!(error = %self, "contact search failed"),
        }
        (self.status(), Html(html::form_page(form, Some(&self.notice())))).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(show_form).post(submit))
        .route("/contacts.csv", post(download_csv))
        .with_state(state)
}

pub async fn serve(addr: &str, state: AppState) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "contact finder listening");
    axum::serve(listener, router(state)).await
}

async fn show_form() -> Html<String> {
    Html(html::form_page(&ContactForm::default(), None))
}

async fn submit(State(state): State<AppState>, Form(form): Form<ContactForm>) -> Response {
    match search(&state, &form).await {
        Ok((query, contacts, csv)) => {
            let notice = if contacts.is_empty() {
                Notice::Warning("No matching people found.".to_string())
            } else {
                Notice::Success(query.summary(contacts.len()))
            };
            Html(html::results_page(&form, &notice, &contacts, &csv)).into_response()
        }
        Err(e) => e.into_page(&form),
    }
}

async fn download_csv(State(state): State<AppState>, Form(form): Form<ContactForm>) -> Response {
    match search(&state, &form).await {
        Ok((_, _, csv)) => (
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"contacts.csv\"",
                ),
            ],
            csv,
        )
            .into_response(),
        Err(e) => e.into_page(&form),
    }
}

async fn search(
    state: &AppState,
    form: &ContactForm,
) -> Result<(SearchQuery, Vec<crate::contact::Contact>, Vec<u8>), AppError> {
    let query = form.to_query()?;
    info!(
        domain = %query.domain,
        designation = %query.designation,
        limit = query.limit,
        "form search"
    );
    let contacts = find_contacts(&state.client, &query, state.pacing).await?;
    let csv = to_csv(&contacts)?;
    Ok((query, contacts, csv))
}
