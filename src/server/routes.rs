//! Request handlers.

// crates.io
use axum::{
	Json,
	extract::{Path, Query, State},
	http::header::CONTENT_TYPE,
	response::{IntoResponse, Response},
};
// self
use crate::{
	_prelude::*,
	provisioning::RoleBinding,
	server::{ApiError, AppState},
};

/// Body accepted by the project creation route.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectBody {
	/// Base project name.
	pub project_name: String,
}

/// Query string of the role-binding result route.
#[derive(Clone, Debug, Deserialize)]
pub struct RoleBindingResultQuery {
	/// Action name recorded by the operation, e.g. `addRoleBinding`.
	pub action: String,
	/// User name.
	pub user: String,
	/// Role name.
	pub role: String,
}

/// Liveness probe.
pub async fn health() -> &'static str {
	"ok"
}

/// Forwards any request below the GitHub prefix upstream.
pub async fn forward(
	State(state): State<AppState>,
	method: Method,
	Path(path): Path<String>,
	body: Bytes,
) -> Result<Response, ApiError> {
	let body = state.github.forward(method, &path, Some(body)).await?;

	Ok(([(CONTENT_TYPE, "application/json")], body).into_response())
}

/// Forwards a request on the GitHub prefix itself to the upstream base URL.
pub async fn forward_root(
	State(state): State<AppState>,
	method: Method,
	body: Bytes,
) -> Result<Response, ApiError> {
	let body = state.github.forward(method, "", Some(body)).await?;

	Ok(([(CONTENT_TYPE, "application/json")], body).into_response())
}

/// Lists the projects of a cluster by base name.
pub async fn list_projects(
	State(state): State<AppState>,
	Path(cluster): Path<String>,
) -> Result<Json<Vec<String>>, ApiError> {
	Ok(Json(state.provisioning.get_projects(&cluster).await?))
}

/// Creates a project in a cluster.
pub async fn create_project(
	State(state): State<AppState>,
	Path(cluster): Path<String>,
	Json(body): Json<CreateProjectBody>,
) -> Result<Json<Value>, ApiError> {
	Ok(Json(state.provisioning.create_project(&cluster, &body.project_name).await?))
}

/// Deletes a project.
pub async fn delete_project(
	State(state): State<AppState>,
	Path((cluster, project)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
	Ok(Json(state.provisioning.delete_project(&cluster, &project).await?))
}

/// Lists the role bindings of a project.
pub async fn list_role_bindings(
	State(state): State<AppState>,
	Path((cluster, project)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
	Ok(Json(state.provisioning.get_role_bindings(&cluster, &project).await?))
}

/// Grants a role to a user on a project.
pub async fn add_role_binding(
	State(state): State<AppState>,
	Path((cluster, project)): Path<(String, String)>,
	Json(binding): Json<RoleBinding>,
) -> Result<Json<Value>, ApiError> {
	Ok(Json(state.provisioning.add_role_binding(&cluster, &project, &binding).await?))
}

/// Revokes a role from a user on a project.
pub async fn delete_role_binding(
	State(state): State<AppState>,
	Path((cluster, project)): Path<(String, String)>,
	Json(binding): Json<RoleBinding>,
) -> Result<Json<Value>, ApiError> {
	Ok(Json(state.provisioning.delete_role_binding(&cluster, &project, &binding).await?))
}

/// Returns the raw operation record.
pub async fn operation_result(
	State(state): State<AppState>,
	Path(operation_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
	Ok(Json(state.provisioning.operation_result(&operation_id).await?))
}

/// Returns the outcome recorded for one user/role pair, or 404 when the operation has none.
pub async fn role_binding_result(
	State(state): State<AppState>,
	Path(operation_id): Path<String>,
	Query(query): Query<RoleBindingResultQuery>,
) -> Result<Json<Value>, ApiError> {
	let binding = RoleBinding::new(query.user, query.role);

	state
		.provisioning
		.update_role_binding_result(&operation_id, &query.action, &binding)
		.await?
		.map(Json)
		.ok_or_else(|| {
			ApiError::not_found(format!(
				"Operation `{operation_id}` has no `{}` outcome for `{}`.",
				query.action,
				binding.operation_key()
			))
		})
}
