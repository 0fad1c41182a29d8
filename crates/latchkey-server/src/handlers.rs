//! HTTP handlers for the authorization server endpoints.

use axum::{
    Form, Json,
    extract::{FromRequest, Path, Query, Request, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use latchkey_auth::middleware::oauth_error_json;
use latchkey_auth::{
    AuthError, AuthorizationRequest, BearerAuth, Client, ClientRegistration, GrantType,
    TokenRequest,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::server::AppState;

// =============================================================================
// Health
// =============================================================================

pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

// =============================================================================
// Client registration
// =============================================================================

/// Body of `POST /clients`.
#[derive(Debug, Deserialize)]
pub struct RegisterClientRequest {
    #[serde(default)]
    pub redirect_uris: Vec<String>,
    /// Grant type names; both supported grants when omitted.
    #[serde(default)]
    pub grant_types: Option<Vec<String>>,
}

/// Client as returned over HTTP. The secret is only present right after
/// registration.
#[derive(Debug, Serialize, Deserialize)]
pub struct ClientResponse {
    pub client_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    pub redirect_uris: Vec<String>,
    pub grant_types: Vec<GrantType>,
}

impl ClientResponse {
    fn with_secret(client: Client) -> Self {
        Self {
            client_id: client.client_id,
            client_secret: Some(client.client_secret),
            redirect_uris: client.redirect_uris,
            grant_types: client.grant_types,
        }
    }

    fn public(client: Client) -> Self {
        Self {
            client_secret: None,
            ..Self::with_secret(client)
        }
    }
}

pub async fn register_client(
    State(state): State<AppState>,
    payload: Result<Json<RegisterClientRequest>, axum::extract::rejection::JsonRejection>,
) -> Result<impl IntoResponse, AuthError> {
    let Json(body) = payload.map_err(|e| AuthError::invalid_registration(e.body_text()))?;

    let mut registration = ClientRegistration::new(body.redirect_uris);
    if let Some(names) = body.grant_types {
        let grant_types = names
            .iter()
            .map(|name| {
                GrantType::parse(name).ok_or_else(|| {
                    AuthError::invalid_registration(format!("unsupported grant type: {name}"))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        registration = registration.with_grant_types(grant_types);
    }

    let client = state.provider.registry().register(registration).await?;
    Ok((StatusCode::CREATED, Json(ClientResponse::with_secret(client))))
}

pub async fn get_client(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
) -> Result<Json<ClientResponse>, AuthError> {
    let client = state.provider.registry().get(&client_id).await?;
    Ok(Json(ClientResponse::public(client)))
}

// =============================================================================
// Authorization endpoint
// =============================================================================

/// `GET /authorize`.
///
/// The resource owner must already be authenticated upstream; the subject
/// comes from the configured [`SubjectResolver`](crate::subject::SubjectResolver).
pub async fn authorize(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(request): Query<AuthorizationRequest>,
) -> Response {
    let Some(subject) = state.subjects.resolve(&headers) else {
        debug!(client_id = %request.client_id, "Authorization request without a subject");
        return (
            StatusCode::UNAUTHORIZED,
            no_store_headers(),
            Json(oauth_error_json(
                "login_required",
                "The resource owner is not authenticated",
            )),
        )
            .into_response();
    };

    match state
        .provider
        .authorization()
        .authorize(&request, &subject)
        .await
    {
        Ok(response) => (no_store_headers(), Json(response)).into_response(),
        Err(e) => e.into_response(),
    }
}

// =============================================================================
// Token endpoint
// =============================================================================

/// `POST /token`.
///
/// Accepts `application/x-www-form-urlencoded` (RFC 6749 Section 4.1.3) or a
/// JSON body.
pub async fn token(State(state): State<AppState>, request: Request) -> Response {
    let request = match parse_token_request(request, &state).await {
        Ok(r) => r,
        Err(response) => return response,
    };

    debug!(
        grant_type = %request.grant_type,
        client_id = ?request.client_id,
        "Processing token request"
    );

    if let Err(e) = authenticate_client(&state, &request).await {
        return e.into_response();
    }

    match state.provider.tokens().exchange(&request).await {
        Ok(response) => (no_store_headers(), Json(response)).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn parse_token_request(request: Request, state: &AppState) -> Result<TokenRequest, Response> {
    let is_json = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/json"));

    let parsed = if is_json {
        Json::<TokenRequest>::from_request(request, state)
            .await
            .map(|Json(r)| r)
            .map_err(|e| e.body_text())
    } else {
        Form::<TokenRequest>::from_request(request, state)
            .await
            .map(|Form(r)| r)
            .map_err(|e| e.body_text())
    };

    parsed.map_err(|description| {
        (
            StatusCode::BAD_REQUEST,
            no_store_headers(),
            Json(oauth_error_json("invalid_request", &description)),
        )
            .into_response()
    })
}

/// Checks `client_secret` when a client presents one (client_secret_post).
///
/// Public clients relying on PKCE alone send no secret and are not checked
/// here.
async fn authenticate_client(state: &AppState, request: &TokenRequest) -> Result<(), AuthError> {
    let Some(secret) = request.client_secret.as_deref() else {
        return Ok(());
    };
    let client_id = request
        .client_id
        .as_deref()
        .ok_or_else(|| AuthError::invalid_client("client_secret without client_id"))?;

    let client = match state.provider.registry().get(client_id).await {
        Ok(client) => client,
        Err(AuthError::NotFound { .. }) => {
            return Err(AuthError::invalid_client("client authentication failed"));
        }
        Err(e) => return Err(e),
    };

    if !client.verify_secret(secret) {
        return Err(AuthError::invalid_client("client authentication failed"));
    }
    Ok(())
}

// =============================================================================
// Protected resources
// =============================================================================

/// `GET /userinfo`: the subject of the presented access token.
pub async fn userinfo(BearerAuth(auth): BearerAuth) -> impl IntoResponse {
    Json(json!({ "sub": auth.subject() }))
}

fn no_store_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    headers
}
