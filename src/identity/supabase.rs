use {
    axum::async_trait,
    reqwest::{header::ACCEPT, Client, RequestBuilder, Response},
    serde::Deserialize,
    serde_json::json,
    tracing::debug,
    url::Url,
};

use crate::{
    model::Profile,
    util::{IdentityConfig, RequiredEnv, ServiceRoleKey},
    Error,
};

use super::{Identity, IdentityProvider};

const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";
const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct PasswordGrant {
    #[serde(default)]
    user: Option<Identity>,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    error: Option<String>,
    error_description: Option<String>,
    msg: Option<String>,
    message: Option<String>,
}

impl ErrorBody {
    fn into_message(self) -> Option<String> {
        self.error_description
            .or(self.msg)
            .or(self.message)
            .or(self.error)
    }
}

/// Talks to the GoTrue auth endpoint and the PostgREST profile table of one project.
#[derive(Debug, Clone)]
pub struct SupabaseClient {
    http: Client,
    base_url: Url,
    service_role_key: ServiceRoleKey,
    profile_table: String,
}

impl SupabaseClient {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(env: &RequiredEnv, identity: &IdentityConfig) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(identity.timeout())
            .build()?;

        Ok(Self {
            http,
            base_url: with_trailing_slash(env.supabase_url.clone()),
            service_role_key: env.service_role_key.clone(),
            profile_table: identity.profile_table.clone(),
        })
    }

    fn sign_in_url(&self) -> Result<Url, Error> {
        let mut url = self.base_url.join("auth/v1/token")?;
        url.query_pairs_mut().append_pair("grant_type", "password");
        Ok(url)
    }

    fn profile_url(&self, id: &str) -> Result<Url, Error> {
        let mut url = self
            .base_url
            .join(&format!("rest/v1/{}", self.profile_table))?;
        url.query_pairs_mut()
            .append_pair("select", "*")
            .append_pair("id", &format!("eq.{id}"));
        Ok(url)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        let key = self.service_role_key.secret();
        request.header("apikey", key).bearer_auth(key)
    }
}

fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

async fn error_from(response: Response) -> Error {
    let status = response.status();
    let message = response
        .json::<ErrorBody>()
        .await
        .ok()
        .and_then(ErrorBody::into_message)
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown error").to_string());

    Error::IdentityService {
        status: status.as_u16(),
        message,
    }
}

#[async_trait]
impl IdentityProvider for SupabaseClient {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<Identity>, Error> {
        let response = self
            .authorized(self.http.post(self.sign_in_url()?))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from(response).await);
        }

        let grant = response.json::<PasswordGrant>().await?;
        debug!(has_user = grant.user.is_some(), "Password grant accepted");
        Ok(grant.user)
    }

    async fn fetch_profile(&self, id: &str) -> Result<Profile, Error> {
        let response = self
            .authorized(self.http.get(self.profile_url(id)?))
            .header(ACCEPT, SINGLE_OBJECT)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from(response).await);
        }

        Ok(response.json::<Profile>().await?)
    }
}
