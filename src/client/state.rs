//! Pending signin state persisted right before the redirect.

// std
use std::ops::Not;
// self
use crate::{
	_prelude::*,
	client::{ClientConfig, SigninOptions, overlay},
	id::CorrelationId,
	store::StoreError,
};

/// Record stored under `oidc-client:<id>` so the redirect-back can be correlated and the
/// token request completed.
///
/// Absent optional fields are left out of the JSON entirely.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigninState {
	/// Correlation identifier (also the storage key suffix).
	pub id: CorrelationId,
	/// Client identifier.
	pub client_id: String,
	/// Client secret, if the client is confidential.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub client_secret: Option<String>,
	/// Provider authority.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub authority: Option<String>,
	/// Redirect URI sent with the request.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub redirect_uri: Option<String>,
	/// Scope sent with the request.
	pub scope: String,
	/// Extra parameters for the later token request.
	#[serde(
		rename = "extraTokenParams",
		default,
		skip_serializing_if = "BTreeMap::is_empty"
	)]
	pub extra_token_params: BTreeMap<String, String>,
	/// Response mode sent with the request.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub response_mode: Option<String>,
	/// `state` value sent to the provider; always equal to `id`.
	pub state: CorrelationId,
	/// Free-form tag describing the kind of signin.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub request_type: Option<String>,
	/// Whether the callback should skip the userinfo request.
	#[serde(rename = "skipUserInfo", default, skip_serializing_if = "Not::not")]
	pub skip_user_info: bool,
}
impl SigninState {
	/// Overlays `options` onto `config` for the signin identified by `id`.
	pub fn new(config: &ClientConfig, options: &SigninOptions, id: CorrelationId) -> Self {
		Self {
			client_id: config.client_id.clone(),
			client_secret: config.client_secret.clone(),
			authority: config.authority.clone(),
			redirect_uri: overlay(&options.redirect_uri, &config.redirect_uri),
			scope: options.scope.clone().unwrap_or_else(|| config.scope.clone()),
			extra_token_params: options
				.extra_token_params
				.clone()
				.unwrap_or_else(|| config.extra_token_params.clone()),
			response_mode: overlay(&options.response_mode, &config.response_mode),
			state: id.clone(),
			request_type: options.request_type.clone(),
			skip_user_info: options.skip_user_info,
			id,
		}
	}

	/// Serializes the record to the JSON text written to storage.
	pub fn to_json(&self) -> Result<String, StoreError> {
		serde_json::to_string(self).map_err(|e| StoreError::Serialization {
			message: format!("Failed to serialize pending signin {}: {e}", self.id),
		})
	}

	/// Parses a record previously written by [`SigninState::to_json`].
	pub fn from_json(payload: &str) -> Result<Self, StoreError> {
		serde_json::from_str(payload).map_err(|e| StoreError::Serialization {
			message: format!("Failed to parse pending signin: {e}"),
		})
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::{Value, json};
	// self
	use super::*;

	fn config() -> ClientConfig {
		ClientConfig::builder("abc")
			.client_secret("shh")
			.authority("https://idp.example.com")
			.redirect_uri("https://app/cb")
			.extra_token_param("audience", "api")
			.build()
			.expect("Config fixture should build.")
	}

	#[test]
	fn options_override_defaults_without_touching_them() {
		let config = config();
		let options = SigninOptions::default()
			.with_scope("openid email")
			.with_request_type("si:r")
			.with_skip_user_info(true);
		let id = CorrelationId::new("id-1").expect("Identifier fixture should be valid.");
		let state = SigninState::new(&config, &options, id.clone());

		assert_eq!(state.scope, "openid email");
		assert_eq!(state.redirect_uri.as_deref(), Some("https://app/cb"));
		assert_eq!(state.state, id);
		assert_eq!(state.request_type.as_deref(), Some("si:r"));
		assert!(state.skip_user_info);
		assert_eq!(config.scope, "openid");
	}

	#[test]
	fn json_uses_the_persisted_field_names() {
		let id = CorrelationId::new("id-2").expect("Identifier fixture should be valid.");
		let state = SigninState::new(&config(), &SigninOptions::default(), id);
		let payload = state.to_json().expect("State should serialize.");
		let value: Value = serde_json::from_str(&payload).expect("Payload should be JSON.");

		assert_eq!(
			value,
			json!({
				"id": "id-2",
				"client_id": "abc",
				"client_secret": "shh",
				"authority": "https://idp.example.com",
				"redirect_uri": "https://app/cb",
				"scope": "openid",
				"extraTokenParams": { "audience": "api" },
				"state": "id-2",
			})
		);
		assert_eq!(SigninState::from_json(&payload).expect("Payload should parse back."), state);
	}
}
