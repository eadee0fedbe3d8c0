//! Authorization-code signin redirect: per-call options, request properties, and the
//! orchestration that persists pending state before navigating to the provider.
//!
//! [`OidcClient::signin_redirect`] resolves the authorization endpoint, mints a
//! [`CorrelationId`], writes the [`SigninState`] under `oidc-client:<id>`, folds the
//! [`SigninRequest`] properties into the endpoint, and hands the URL to the navigator.
//! Metadata resolution always completes before anything is stored or navigated.

// self
use crate::{
	_prelude::*,
	client::{ClientConfig, OidcClient, SigninState, overlay},
	error::ConfigError,
	http::{DiscoveryHttpClient, TransportErrorMapper},
	id::CorrelationId,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	query::{self, QueryValue},
	store::{self, SigninStore},
};

/// `response_type` of every request built here.
pub const RESPONSE_TYPE_CODE: &str = "code";

/// Per-call overrides for [`OidcClient::signin_redirect`].
///
/// Unset fields fall back to the client's [`ClientConfig`]; a set field wins even when it
/// is empty (and is then omitted from the URL).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SigninOptions {
	/// Redirect URI override.
	pub redirect_uri: Option<String>,
	/// Scope override.
	pub scope: Option<String>,
	/// `prompt` override.
	pub prompt: Option<String>,
	/// `display` override.
	pub display: Option<String>,
	/// `max_age` override in seconds.
	pub max_age: Option<u64>,
	/// `ui_locales` override.
	pub ui_locales: Option<String>,
	/// `id_token_hint` override.
	pub id_token_hint: Option<String>,
	/// `login_hint` override.
	pub login_hint: Option<String>,
	/// `acr_values` override.
	pub acr_values: Option<String>,
	/// `resource` override.
	pub resource: Option<String>,
	/// `response_mode` override.
	pub response_mode: Option<String>,
	/// Replaces the configured extra query parameters.
	pub extra_query_params: Option<BTreeMap<String, String>>,
	/// Replaces the configured extra token parameters.
	pub extra_token_params: Option<BTreeMap<String, String>>,
	/// Request object (`request`) passed by value.
	pub request: Option<String>,
	/// Request object passed by reference (`request_uri`).
	pub request_uri: Option<String>,
	/// Free-form tag stored with the pending signin.
	pub request_type: Option<String>,
	/// Stored with the pending signin to tell the callback to skip userinfo.
	pub skip_user_info: bool,
}
impl SigninOptions {
	/// Overrides the redirect URI.
	pub fn with_redirect_uri(mut self, uri: impl Into<String>) -> Self {
		self.redirect_uri = Some(uri.into());

		self
	}

	/// Overrides the scope.
	pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
		self.scope = Some(scope.into());

		self
	}

	/// Overrides `prompt`.
	pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
		self.prompt = Some(prompt.into());

		self
	}

	/// Overrides `max_age`.
	pub fn with_max_age(mut self, seconds: u64) -> Self {
		self.max_age = Some(seconds);

		self
	}

	/// Overrides `display`.
	pub fn with_display(mut self, value: impl Into<String>) -> Self {
		self.display = Some(value.into());

		self
	}

	/// Overrides `ui_locales`.
	pub fn with_ui_locales(mut self, locales: impl Into<String>) -> Self {
		self.ui_locales = Some(locales.into());

		self
	}

	/// Overrides `id_token_hint`.
	pub fn with_id_token_hint(mut self, hint: impl Into<String>) -> Self {
		self.id_token_hint = Some(hint.into());

		self
	}

	/// Overrides `acr_values`.
	pub fn with_acr_values(mut self, value: impl Into<String>) -> Self {
		self.acr_values = Some(value.into());

		self
	}

	/// Overrides `resource`.
	pub fn with_resource(mut self, value: impl Into<String>) -> Self {
		self.resource = Some(value.into());

		self
	}

	/// Overrides `login_hint`.
	pub fn with_login_hint(mut self, hint: impl Into<String>) -> Self {
		self.login_hint = Some(hint.into());

		self
	}

	/// Overrides `response_mode`.
	pub fn with_response_mode(mut self, mode: impl Into<String>) -> Self {
		self.response_mode = Some(mode.into());

		self
	}

	/// Replaces the extra query parameters.
	pub fn with_extra_query_params<I, K, V>(mut self, params: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<String>,
	{
		self.extra_query_params =
			Some(params.into_iter().map(|(k, v)| (k.into(), v.into())).collect());

		self
	}

	/// Replaces the extra token request parameters stored with the pending signin.
	pub fn with_extra_token_params<I, K, V>(mut self, params: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<String>,
	{
		self.extra_token_params =
			Some(params.into_iter().map(|(k, v)| (k.into(), v.into())).collect());

		self
	}

	/// Sets the `request` parameter (a request object JWT).
	pub fn with_request(mut self, request: impl Into<String>) -> Self {
		self.request = Some(request.into());

		self
	}

	/// Sets the `request_uri` parameter.
	pub fn with_request_uri(mut self, uri: impl Into<String>) -> Self {
		self.request_uri = Some(uri.into());

		self
	}

	/// Tags the pending signin with a request type.
	pub fn with_request_type(mut self, request_type: impl Into<String>) -> Self {
		self.request_type = Some(request_type.into());

		self
	}

	/// Sets the skip-userinfo flag stored with the pending signin.
	pub fn with_skip_user_info(mut self, skip: bool) -> Self {
		self.skip_user_info = skip;

		self
	}
}

/// Authorization request properties; never persisted, only serialized into the URL.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SigninRequest {
	/// `client_id`.
	pub client_id: String,
	/// `redirect_uri`.
	pub redirect_uri: Option<String>,
	/// `scope`.
	pub scope: String,
	/// `prompt`.
	pub prompt: Option<String>,
	/// `display`.
	pub display: Option<String>,
	/// `max_age`.
	pub max_age: Option<u64>,
	/// `ui_locales`.
	pub ui_locales: Option<String>,
	/// `id_token_hint`.
	pub id_token_hint: Option<String>,
	/// `login_hint`.
	pub login_hint: Option<String>,
	/// `acr_values`.
	pub acr_values: Option<String>,
	/// `resource`.
	pub resource: Option<String>,
	/// Extra parameters flattened into the query.
	pub extra_query_params: BTreeMap<String, String>,
	/// `response_mode`.
	pub response_mode: Option<String>,
	/// `state`; the same identifier keys the pending signin in storage.
	pub state: CorrelationId,
	/// `request`.
	pub request: Option<String>,
	/// `request_uri`.
	pub request_uri: Option<String>,
}
impl SigninRequest {
	/// Overlays `options` onto `config`, forcing `state` to `id`.
	pub fn new(config: &ClientConfig, options: &SigninOptions, id: CorrelationId) -> Self {
		Self {
			client_id: config.client_id.clone(),
			redirect_uri: overlay(&options.redirect_uri, &config.redirect_uri),
			scope: options.scope.clone().unwrap_or_else(|| config.scope.clone()),
			prompt: overlay(&options.prompt, &config.prompt),
			display: overlay(&options.display, &config.display),
			max_age: options.max_age.or(config.max_age),
			ui_locales: overlay(&options.ui_locales, &config.ui_locales),
			id_token_hint: overlay(&options.id_token_hint, &config.id_token_hint),
			login_hint: overlay(&options.login_hint, &config.login_hint),
			acr_values: overlay(&options.acr_values, &config.acr_values),
			resource: overlay(&options.resource, &config.resource),
			extra_query_params: options
				.extra_query_params
				.clone()
				.unwrap_or_else(|| config.extra_query_params.clone()),
			response_mode: overlay(&options.response_mode, &config.response_mode),
			state: id,
			request: options.request.clone(),
			request_uri: options.request_uri.clone(),
		}
	}

	/// Properties in wire order; unset optional fields are left out.
	pub fn properties(&self) -> Vec<(&'static str, QueryValue)> {
		let optional = |name: &'static str, value: &Option<String>| {
			value.as_ref().map(|value| (name, QueryValue::from(value.as_str())))
		};

		[
			Some(("client_id", QueryValue::from(self.client_id.as_str()))),
			optional("redirect_uri", &self.redirect_uri),
			Some(("scope", QueryValue::from(self.scope.as_str()))),
			Some(("response_type", QueryValue::from(RESPONSE_TYPE_CODE))),
			optional("prompt", &self.prompt),
			optional("display", &self.display),
			self.max_age.map(|seconds| ("max_age", QueryValue::Number(seconds))),
			optional("ui_locales", &self.ui_locales),
			optional("id_token_hint", &self.id_token_hint),
			optional("login_hint", &self.login_hint),
			optional("acr_values", &self.acr_values),
			optional("resource", &self.resource),
			Some(("extraQueryParams", QueryValue::Map(self.extra_query_params.clone()))),
			optional("response_mode", &self.response_mode),
			Some(("state", QueryValue::from(&*self.state))),
			optional("request", &self.request),
			optional("request_uri", &self.request_uri),
		]
		.into_iter()
		.flatten()
		.collect()
	}
}

/// Folds the truthy request properties into `authorization_endpoint`.
pub fn create_signin_redirect_url(authorization_endpoint: &str, request: &SigninRequest) -> String {
	request
		.properties()
		.into_iter()
		.filter(|(_, value)| value.is_truthy())
		.fold(authorization_endpoint.to_owned(), |url, (name, value)| {
			query::add_query_param(url, name, &value)
		})
}

impl<C, M> OidcClient<C, M>
where
	C: ?Sized + DiscoveryHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Starts an authorization-code signin and navigates the user agent to the provider.
	///
	/// Any discovery failure propagates before storage is touched. On success exactly one
	/// entry is written under `oidc-client:<state>` and the navigator has been invoked.
	///
	/// The navigator receives the built URL after [`Url`] parsing, which normalizes it: the host
	/// is lowercased, a default port is dropped, and dot segments are resolved. Query pairs are
	/// kept as encoded by [`create_signin_redirect_url`].
	pub async fn signin_redirect(&self, options: SigninOptions) -> Result<()> {
		const KIND: FlowKind = FlowKind::SigninRedirect;

		let span = FlowSpan::new(KIND, "signin_redirect");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let authorization_endpoint = self.metadata.authorization_endpoint().await?;

				Url::parse(&authorization_endpoint).map_err(|source| {
					ConfigError::InvalidAuthorizationEndpoint {
						url: authorization_endpoint.clone(),
						source,
					}
				})?;

				let id = CorrelationId::generate();
				let state = SigninState::new(&self.config, &options, id.clone());
				let key = store::pending_signin_key(&id);

				self.store.set_item(&key, state.to_json()?).await?;
				obs::record_flow_step(KIND, "pending_state_stored");

				let request = SigninRequest::new(&self.config, &options, id);
				let redirect_url = create_signin_redirect_url(&authorization_endpoint, &request);
				let redirect_url = Url::parse(&redirect_url).map_err(|source| {
					ConfigError::InvalidAuthorizationEndpoint { url: redirect_url.clone(), source }
				})?;

				self.navigator.navigate(&redirect_url);
				obs::record_flow_step(KIND, "navigated");

				Ok(())
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}
}
