//! Identity bridge.
//!
//! The identity provider redirects back with a bearer token in the URL
//! fragment. The token is exchanged once for the user profile, the derived
//! [`Identity`] is stored as a local session, and the caller continues to
//! the capability that required it. There is no refresh: the session lives
//! as long as the caller keeps it.

use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};

use crate::{model::Identity, prelude::*, sv};

pub const AUTHORIZE_URL: &str = "https://discord.com/api/oauth2/authorize";
pub const API_URL: &str = "https://discord.com/api/";

/// Capabilities that need an identity.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
  #[default]
  Support,
  Apply,
}

impl Capability {
  fn parse(value: &str) -> Option<Self> {
    match value {
      "support" => Some(Capability::Support),
      "apply" => Some(Capability::Apply),
      _ => None,
    }
  }

  fn as_str(self) -> &'static str {
    match self {
      Capability::Support => "support",
      Capability::Apply => "apply",
    }
  }
}

/// Profile returned by the provider's `users/@me`.
#[derive(Debug, Clone, Deserialize)]
pub struct Profile {
  pub id: String,
  pub username: String,
  #[serde(default)]
  pub discriminator: Option<String>,
  #[serde(default)]
  pub avatar: Option<String>,
}

impl From<Profile> for Identity {
  fn from(profile: Profile) -> Self {
    let name = match profile.discriminator.as_deref() {
      Some(tag) if !tag.is_empty() && tag != "0" => {
        format!("{}#{tag}", profile.username)
      }
      _ => profile.username,
    };
    Identity::new(name, profile.id, profile.avatar.as_deref())
  }
}

/// Redirect URI for `current`: its origin and path only.
pub fn redirect_uri(current: &Url) -> String {
  let mut url = current.clone();
  url.set_query(None);
  url.set_fragment(None);
  url.to_string()
}

/// Provider authorization URL asking for the `identify` scope only.
pub fn authorize_url(client_id: &str, redirect: &str, next: Capability) -> Url {
  let mut url = Url::parse(AUTHORIZE_URL).expect("static authorize url");
  url
    .query_pairs_mut()
    .append_pair("client_id", client_id)
    .append_pair("redirect_uri", redirect)
    .append_pair("response_type", "token")
    .append_pair("scope", "identify")
    .append_pair("state", next.as_str());
  url
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
  pub access_token: String,
  pub next: Option<Capability>,
}

/// Parse `access_token` (and the `state` we sent) out of a URL fragment.
pub fn parse_fragment(fragment: &str) -> Option<Fragment> {
  let mut token = None;
  let mut next = None;

  for pair in fragment.trim_start_matches('#').split('&') {
    match pair.split_once('=') {
      Some(("access_token", value)) if !value.is_empty() => {
        token = Some(value.to_string())
      }
      Some(("state", value)) => next = Capability::parse(value),
      _ => {}
    }
  }

  token.map(|access_token| Fragment { access_token, next })
}

#[derive(Debug, Clone, Serialize)]
pub struct Completed {
  pub session: String,
  pub identity: Identity,
  /// Callback URL with the token fragment removed.
  pub redirect: String,
  pub next: Capability,
}

pub struct Bridge {
  client: Client,
  api: Url,
  client_id: Option<String>,
}

impl Bridge {
  pub fn new(client_id: Option<String>) -> Self {
    Self {
      client: Client::new(),
      api: Url::parse(API_URL).expect("static api url"),
      client_id,
    }
  }

  pub fn client_id(&self) -> Option<&str> {
    self.client_id.as_deref()
  }

  /// Exchange `token` for the provider profile. Never retried.
  pub async fn exchange(&self, token: &str) -> Result<Identity> {
    let url = self
      .api
      .join("users/@me")
      .map_err(|err| Error::Internal(err.to_string()))?;

    let response = self
      .client
      .get(url)
      .bearer_auth(token)
      .send()
      .await
      .map_err(|err| Error::Identity(err.to_string()))?;

    if !response.status().is_success() {
      return Err(Error::Identity(format!(
        "provider answered {}",
        response.status()
      )));
    }

    let profile: Profile =
      response.json().await.map_err(|err| Error::Identity(err.to_string()))?;
    Ok(profile.into())
  }

  /// Finish a provider redirect landing on `callback`.
  pub async fn complete(
    &self,
    db: &DatabaseConnection,
    callback: &str,
    next: Option<Capability>,
  ) -> Result<Completed> {
    let mut url = Url::parse(callback)
      .map_err(|err| Error::validation(format!("bad callback url: {err}")))?;

    let fragment = url
      .fragment()
      .and_then(parse_fragment)
      .ok_or_else(|| Error::Identity("no access token in callback".into()))?;
    url.set_fragment(None);

    let identity = self.exchange(&fragment.access_token).await?;
    let session = sv::Session::new(db).create(&identity).await?;
    info!("Identity `{}` ({}) signed in", identity.name, identity.id);

    Ok(Completed {
      session,
      identity,
      redirect: url.to_string(),
      next: next.or(fragment.next).unwrap_or_default(),
    })
  }
}
