use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Client as HttpClient;
use serde::Deserialize;

use super::{error_from_response, ApiError, PrincipalResolver};
use crate::models::Principal;

/// Subset of the GoTrue user object we rely on
#[derive(Debug, Deserialize)]
struct SupabaseUser {
    id: String,
}

/// Resolves dashboard bearer tokens through the Supabase auth endpoint
pub struct SupabaseAuth {
    http_client: HttpClient,
    base_url: String,
    service_key: String,
}

impl SupabaseAuth {
    pub fn new(http_client: HttpClient, base_url: &str, service_key: String) -> Self {
        Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            service_key,
        }
    }

    fn create_headers(&self, bearer: &str) -> Result<HeaderMap, ApiError> {
        let mut headers = HeaderMap::new();

        let api_key = HeaderValue::from_str(&self.service_key)
            .map_err(|e| ApiError::RequestError(format!("Invalid service key header: {}", e)))?;
        headers.insert("apikey", api_key);

        // A bearer that cannot be a header value is simply a bad credential
        let auth_value = HeaderValue::from_str(&format!("Bearer {}", bearer))
            .map_err(|e| ApiError::Unauthorized(format!("Malformed bearer: {}", e)))?;
        headers.insert(AUTHORIZATION, auth_value);

        Ok(headers)
    }
}

#[async_trait]
impl PrincipalResolver for SupabaseAuth {
    /// GET /auth/v1/user
    async fn resolve(&self, bearer: &str) -> Result<Option<Principal>, ApiError> {
        let headers = match self.create_headers(bearer) {
            Ok(headers) => headers,
            Err(ApiError::Unauthorized(_)) => return Ok(None),
            Err(e) => return Err(e),
        };

        let response = self
            .http_client
            .get(format!("{}/auth/v1/user", self.base_url))
            .headers(headers)
            .send()
            .await?;

        if !response.status().is_success() {
            return match error_from_response(response).await {
                ApiError::Unauthorized(_) | ApiError::Forbidden(_) => Ok(None),
                other => Err(other),
            };
        }

        let user = response.json::<SupabaseUser>().await?;
        Ok(Some(Principal { user_id: user.id }))
    }
}
