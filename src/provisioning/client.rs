//! Provisioning API client operations.

// self
use crate::{
	_prelude::*,
	config::ProvisioningConfig,
	error::ConfigError,
	flows::TokenCache,
	http::{self, ReqwestHttpClient, UpstreamHttpClient, UpstreamRequest, UpstreamResponse},
	oauth::ClientCredentialsGrant,
	obs::{self, CallKind},
	provisioning::model::{
		CreateProjectRequest, OperationRecord, ProjectList, RoleBinding, project_names,
	},
};

/// Provisioning client specialized for the crate's default reqwest transport.
pub type ReqwestProvisioningClient = ProvisioningClient<ReqwestHttpClient>;

/// Typed client over the provisioning API.
///
/// The client and its [`TokenCache`] share one HTTP transport. Every operation resolves a
/// valid token first (renewing it when absent or expired) and then performs exactly one
/// upstream call with `Authorization: Bearer {access_token}`. Upstream failures surface as
/// [`Error::Upstream`] without retries.
pub struct ProvisioningClient<C>
where
	C: ?Sized + UpstreamHttpClient,
{
	/// HTTP client used for provisioning calls.
	pub http_client: Arc<C>,
	/// Provisioning API base URL.
	pub api_url: Url,
	/// Token cache owned by this client.
	pub tokens: TokenCache<C>,
}
impl<C> ProvisioningClient<C>
where
	C: ?Sized + UpstreamHttpClient,
{
	/// Creates a client that reuses the caller-provided transport for API and token calls.
	pub fn with_http_client(
		config: &ProvisioningConfig,
		http_client: impl Into<Arc<C>>,
	) -> Result<Self> {
		let http_client = http_client.into();
		let grant = ClientCredentialsGrant::from_config(config)?;

		Ok(Self {
			tokens: TokenCache::new(grant, http_client.clone()),
			http_client,
			api_url: config.api_url.clone(),
		})
	}

	/// `POST /v1/clusters/{cluster}/projects`; returns the upstream body.
	pub async fn create_project(&self, cluster: &str, project: &str) -> Result<Value> {
		let payload = CreateProjectRequest::new(project).payload()?;

		self.call(
			"create_project",
			Method::POST,
			&["v1", "clusters", cluster, "projects"],
			Some(payload),
		)
		.await?
		.json_value()
	}

	/// `GET /v1/clusters/{cluster}/projects`; returns the base names of the projects that
	/// carry the `-{cluster}` suffix, in upstream order.
	pub async fn get_projects(&self, cluster: &str) -> Result<Vec<String>> {
		let list: ProjectList = self
			.call("get_projects", Method::GET, &["v1", "clusters", cluster, "projects"], None)
			.await?
			.json()?;

		Ok(project_names(cluster, &list.projects))
	}

	/// `DELETE /v1/clusters/{cluster}/projects/{project}`; returns the upstream body.
	pub async fn delete_project(&self, cluster: &str, project: &str) -> Result<Value> {
		self.call(
			"delete_project",
			Method::DELETE,
			&["v1", "clusters", cluster, "projects", project],
			None,
		)
		.await?
		.json_value()
	}

	/// `PUT .../rolebindings/users` with `{user, role}`; returns the upstream body.
	pub async fn add_role_binding(
		&self,
		cluster: &str,
		project: &str,
		binding: &RoleBinding,
	) -> Result<Value> {
		self.call(
			"add_role_binding",
			Method::PUT,
			&["v1", "clusters", cluster, "projects", project, "rolebindings", "users"],
			Some(binding.payload()?),
		)
		.await?
		.json_value()
	}

	/// `GET .../rolebindings`; returns the upstream body.
	pub async fn get_role_bindings(&self, cluster: &str, project: &str) -> Result<Value> {
		self.call(
			"get_role_bindings",
			Method::GET,
			&["v1", "clusters", cluster, "projects", project, "rolebindings"],
			None,
		)
		.await?
		.json_value()
	}

	/// `DELETE .../rolebindings/users` with `{user, role}` as the request body; returns the
	/// upstream body.
	pub async fn delete_role_binding(
		&self,
		cluster: &str,
		project: &str,
		binding: &RoleBinding,
	) -> Result<Value> {
		self.call(
			"delete_role_binding",
			Method::DELETE,
			&["v1", "clusters", cluster, "projects", project, "rolebindings", "users"],
			Some(binding.payload()?),
		)
		.await?
		.json_value()
	}

	/// `GET /v1/operations/{id}`; returns the upstream body.
	pub async fn operation_result(&self, operation_id: &str) -> Result<Value> {
		self.call("operation_result", Method::GET, &["v1", "operations", operation_id], None)
			.await?
			.json_value()
	}

	/// Resolves the outcome of a role-binding action recorded by operation `operation_id`.
	///
	/// Returns `Ok(None)` when the record has no `details`, no entry for `action`, or no
	/// `User-{user}-{role}` entry under it.
	pub async fn update_role_binding_result(
		&self,
		operation_id: &str,
		action: &str,
		binding: &RoleBinding,
	) -> Result<Option<Value>> {
		let record = OperationRecord::from_value(self.operation_result(operation_id).await?);

		Ok(record.role_binding_outcome(action, binding).cloned())
	}

	async fn call(
		&self,
		stage: &'static str,
		method: Method,
		segments: &[&str],
		payload: Option<Value>,
	) -> Result<UpstreamResponse> {
		obs::observe(CallKind::Provisioning, stage, async move {
			let token = self.tokens.access_token().await?;
			let url = http::endpoint(&self.api_url, segments)?;
			let mut request = UpstreamRequest::new(method, url).bearer(&token.access_token);

			if let Some(payload) = &payload {
				request = request.json(payload);
			}

			http::send(self.http_client.as_ref(), request).await
		})
		.await
	}
}
impl ProvisioningClient<ReqwestHttpClient> {
	/// Creates a client that provisions its own reqwest transport.
	pub fn from_config(config: &ProvisioningConfig) -> Result<Self> {
		let client = ReqwestClient::builder().build().map_err(ConfigError::from)?;

		Self::with_http_client(config, ReqwestHttpClient::with_client(client))
	}
}
impl<C> Debug for ProvisioningClient<C>
where
	C: ?Sized + UpstreamHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ProvisioningClient")
			.field("api_url", &self.api_url.as_str())
			.field("tokens", &self.tokens)
			.finish()
	}
}
