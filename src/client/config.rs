//! Client-level defaults captured once at construction.

// self
use crate::{
	_prelude::*,
	error::ConfigError,
	metadata::{DiscoveryDocument, MetadataSource},
};

/// Scope requested when the configuration does not name one.
pub const DEFAULT_SCOPE: &str = "openid";

/// Immutable client defaults; per-call [`SigninOptions`](crate::client::SigninOptions)
/// override individual fields without mutating them.
///
/// Deserializes from the camelCase shape used by browser OIDC clients
/// (`clientId`, `redirectUri`, `extraQueryParams`, ...).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
	/// Client identifier registered with the provider.
	pub client_id: String,
	/// Client secret, persisted with the pending signin for the token exchange.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub client_secret: Option<String>,
	/// Requested scope (defaults to `openid`).
	#[serde(default = "default_scope")]
	pub scope: String,
	/// Redirect URI the provider sends the user agent back to.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub redirect_uri: Option<String>,
	/// Base URL of the provider.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub authority: Option<String>,
	/// Explicit discovery URL.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub metadata_url: Option<String>,
	/// Inline discovery document.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub metadata: Option<DiscoveryDocument>,
	/// `prompt` request parameter.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub prompt: Option<String>,
	/// `display` request parameter.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub display: Option<String>,
	/// `max_age` request parameter in seconds.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub max_age: Option<u64>,
	/// `ui_locales` request parameter.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub ui_locales: Option<String>,
	/// `id_token_hint` request parameter.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub id_token_hint: Option<String>,
	/// `login_hint` request parameter.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub login_hint: Option<String>,
	/// `acr_values` request parameter.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub acr_values: Option<String>,
	/// `resource` request parameter.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub resource: Option<String>,
	/// `response_mode` request parameter.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub response_mode: Option<String>,
	/// Additional parameters appended to the authorization URL.
	#[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
	pub extra_query_params: BTreeMap<String, String>,
	/// Additional parameters kept for the later token request.
	#[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
	pub extra_token_params: BTreeMap<String, String>,
}
impl ClientConfig {
	/// Creates a new builder for the provided client identifier.
	pub fn builder(client_id: impl Into<String>) -> ClientConfigBuilder {
		ClientConfigBuilder::new(client_id)
	}

	/// Parses and validates a JSON configuration payload.
	pub fn from_json_str(payload: &str) -> Result<Self, ConfigError> {
		let mut deserializer = serde_json::Deserializer::from_str(payload);
		let config: Self = serde_path_to_error::deserialize(&mut deserializer)
			.map_err(|source| ConfigError::InvalidConfig { source: Arc::new(source) })?;

		config.validate()?;

		Ok(config)
	}

	/// Discovery inputs for the client's metadata service.
	pub fn metadata_source(&self) -> MetadataSource {
		MetadataSource {
			authority: self.authority.clone(),
			metadata_url: self.metadata_url.clone(),
			metadata: self.metadata.clone(),
		}
	}

	fn validate(&self) -> Result<(), ConfigError> {
		if self.client_id.trim().is_empty() {
			return Err(ConfigError::MissingClientId);
		}

		Ok(())
	}
}

/// Builder for [`ClientConfig`] values.
#[derive(Debug)]
pub struct ClientConfigBuilder(ClientConfig);
impl ClientConfigBuilder {
	/// Creates a builder seeded with the client identifier and the default scope.
	pub fn new(client_id: impl Into<String>) -> Self {
		Self(ClientConfig {
			client_id: client_id.into(),
			client_secret: None,
			scope: default_scope(),
			redirect_uri: None,
			authority: None,
			metadata_url: None,
			metadata: None,
			prompt: None,
			display: None,
			max_age: None,
			ui_locales: None,
			id_token_hint: None,
			login_hint: None,
			acr_values: None,
			resource: None,
			response_mode: None,
			extra_query_params: BTreeMap::new(),
			extra_token_params: BTreeMap::new(),
		})
	}

	/// Sets the client secret.
	pub fn client_secret(mut self, secret: impl Into<String>) -> Self {
		self.0.client_secret = Some(secret.into());

		self
	}

	/// Overrides the default scope.
	pub fn scope(mut self, scope: impl Into<String>) -> Self {
		self.0.scope = scope.into();

		self
	}

	/// Sets the redirect URI.
	pub fn redirect_uri(mut self, uri: impl Into<String>) -> Self {
		self.0.redirect_uri = Some(uri.into());

		self
	}

	/// Sets the provider authority.
	pub fn authority(mut self, authority: impl Into<String>) -> Self {
		self.0.authority = Some(authority.into());

		self
	}

	/// Sets an explicit discovery URL.
	pub fn metadata_url(mut self, url: impl Into<String>) -> Self {
		self.0.metadata_url = Some(url.into());

		self
	}

	/// Supplies the discovery document inline.
	pub fn metadata(mut self, document: DiscoveryDocument) -> Self {
		self.0.metadata = Some(document);

		self
	}

	/// Sets the default `prompt`.
	pub fn prompt(mut self, value: impl Into<String>) -> Self {
		self.0.prompt = Some(value.into());

		self
	}

	/// Sets the default `display`.
	pub fn display(mut self, value: impl Into<String>) -> Self {
		self.0.display = Some(value.into());

		self
	}

	/// Sets the default `max_age`.
	pub fn max_age(mut self, seconds: u64) -> Self {
		self.0.max_age = Some(seconds);

		self
	}

	/// Sets the default `ui_locales`.
	pub fn ui_locales(mut self, value: impl Into<String>) -> Self {
		self.0.ui_locales = Some(value.into());

		self
	}

	/// Sets the default `id_token_hint`.
	pub fn id_token_hint(mut self, value: impl Into<String>) -> Self {
		self.0.id_token_hint = Some(value.into());

		self
	}

	/// Sets the default `login_hint`.
	pub fn login_hint(mut self, value: impl Into<String>) -> Self {
		self.0.login_hint = Some(value.into());

		self
	}

	/// Sets the default `acr_values`.
	pub fn acr_values(mut self, value: impl Into<String>) -> Self {
		self.0.acr_values = Some(value.into());

		self
	}

	/// Sets the default `resource`.
	pub fn resource(mut self, value: impl Into<String>) -> Self {
		self.0.resource = Some(value.into());

		self
	}

	/// Sets the default `response_mode`.
	pub fn response_mode(mut self, value: impl Into<String>) -> Self {
		self.0.response_mode = Some(value.into());

		self
	}

	/// Adds one extra authorization query parameter.
	pub fn extra_query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.0.extra_query_params.insert(key.into(), value.into());

		self
	}

	/// Adds one extra token request parameter.
	pub fn extra_token_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.0.extra_token_params.insert(key.into(), value.into());

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<ClientConfig, ConfigError> {
		self.0.validate()?;

		Ok(self.0)
	}
}

fn default_scope() -> String {
	DEFAULT_SCOPE.into()
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn builder_applies_default_scope_and_rejects_blank_client_id() {
		let config = ClientConfig::builder("abc")
			.authority("https://idp.example.com")
			.build()
			.expect("Config with a client id should build.");

		assert_eq!(config.scope, DEFAULT_SCOPE);
		assert_eq!(
			config.metadata_source(),
			MetadataSource::authority("https://idp.example.com")
		);
		assert!(matches!(ClientConfig::builder(" ").build(), Err(ConfigError::MissingClientId)));
	}

	#[test]
	fn json_configuration_uses_camel_case_keys() {
		let config = ClientConfig::from_json_str(
			r#"{
				"clientId": "abc",
				"redirectUri": "https://app/cb",
				"maxAge": 600,
				"extraQueryParams": { "audience": "api" },
				"metadata": { "authorization_endpoint": "https://idp/auth" }
			}"#,
		)
		.expect("Camel-case payload should parse.");

		assert_eq!(config.client_id, "abc");
		assert_eq!(config.scope, DEFAULT_SCOPE);
		assert_eq!(config.redirect_uri.as_deref(), Some("https://app/cb"));
		assert_eq!(config.max_age, Some(600));
		assert_eq!(config.extra_query_params.get("audience").map(String::as_str), Some("api"));
		assert!(config.metadata.is_some());
	}

	#[test]
	fn json_configuration_reports_the_failing_path() {
		let err = ClientConfig::from_json_str(r#"{ "clientId": "abc", "maxAge": "soon" }"#)
			.expect_err("A textual max age should be rejected.");

		match err {
			ConfigError::InvalidConfig { source } => assert_eq!(source.path().to_string(), "maxAge"),
			other => panic!("Unexpected error: {other:?}"),
		}
		assert!(matches!(
			ClientConfig::from_json_str(r#"{ "clientId": "" }"#),
			Err(ConfigError::MissingClientId)
		));
	}
}
