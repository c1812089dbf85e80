//! Wire shapes and reshaping helpers for the provisioning API.

// self
use crate::_prelude::*;

/// Business line stamped on every project the gateway creates.
pub const BUSINESS_LINE: &str = "GTS";

/// Project identified by its cluster and base name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Project {
	/// Cluster hosting the project.
	pub cluster: String,
	/// Base project name, without the cluster suffix.
	pub name: String,
}
impl Project {
	/// Creates a project reference.
	pub fn new(cluster: impl Into<String>, name: impl Into<String>) -> Self {
		Self { cluster: cluster.into(), name: name.into() }
	}

	/// Parses an upstream composite name, returning `None` when it does not end in
	/// `-{cluster}`.
	pub fn from_upstream(cluster: &str, composite: &str) -> Option<Self> {
		composite
			.strip_suffix(cluster)
			.and_then(|rest| rest.strip_suffix('-'))
			.map(|name| Self::new(cluster, name))
	}
}

/// Keeps the upstream names that belong to `cluster` and strips their suffix, preserving order.
pub fn project_names<I, S>(cluster: &str, upstream: I) -> Vec<String>
where
	I: IntoIterator<Item = S>,
	S: AsRef<str>,
{
	upstream
		.into_iter()
		.filter_map(|composite| Project::from_upstream(cluster, composite.as_ref()))
		.map(|project| project.name)
		.collect()
}

/// Body of `GET /v1/clusters/{cluster}/projects`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct ProjectList {
	/// Upstream composite project names.
	#[serde(default)]
	pub projects: Vec<String>,
}

/// Body of `POST /v1/clusters/{cluster}/projects`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
	/// Owning business line.
	pub business_line: String,
	/// Base project name; upstream appends the cluster suffix.
	pub project_suffix: String,
}
impl CreateProjectRequest {
	/// Request for a project named `project` under [`BUSINESS_LINE`].
	pub fn new(project: impl Into<String>) -> Self {
		Self { business_line: BUSINESS_LINE.into(), project_suffix: project.into() }
	}

	/// JSON payload sent upstream.
	pub fn payload(&self) -> Result<Value> {
		serde_json::to_value(self).map_err(|source| Error::Encode { source })
	}
}

/// User/role pair bound to a project; also the body of the role-binding user endpoints.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoleBinding {
	/// User name.
	pub user: String,
	/// Role granted to the user.
	pub role: String,
}
impl RoleBinding {
	/// Creates a user/role pair.
	pub fn new(user: impl Into<String>, role: impl Into<String>) -> Self {
		Self { user: user.into(), role: role.into() }
	}

	/// Key under which an operation reports the outcome for this binding.
	pub fn operation_key(&self) -> String {
		format!("User-{}-{}", self.user, self.role)
	}

	/// JSON payload sent upstream.
	pub fn payload(&self) -> Result<Value> {
		serde_json::to_value(self).map_err(|source| Error::Encode { source })
	}
}

/// Loose view over an operation record returned by `GET /v1/operations/{id}`.
///
/// Only `details[action]["User-{user}-{role}"]` is ever read, so the rest of the record is kept
/// as untyped JSON and never validated.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct OperationRecord {
	/// Outcomes grouped by action name, when the operation reports any.
	#[serde(default)]
	pub details: Option<Value>,
}
impl OperationRecord {
	/// Interprets an untyped operation body; anything without a `details` member is empty.
	pub fn from_value(value: Value) -> Self {
		Self { details: value.get("details").filter(|details| !details.is_null()).cloned() }
	}

	/// Looks up `details[action]["User-{user}-{role}"]`; `None` when any level is missing, is
	/// not an object, or the outcome is `null`.
	pub fn role_binding_outcome(&self, action: &str, binding: &RoleBinding) -> Option<&Value> {
		self.details
			.as_ref()?
			.as_object()?
			.get(action)?
			.as_object()?
			.get(&binding.operation_key())
			.filter(|outcome| !outcome.is_null())
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	// self
	use super::*;

	#[test]
	fn project_names_keep_cluster_members_in_order() {
		let names = project_names("C", ["a-C", "b-other", "c-C"]);

		assert_eq!(names, vec!["a".to_owned(), "c".to_owned()]);
	}

	#[test]
	fn suffix_requires_separator() {
		assert_eq!(Project::from_upstream("prod", "app-prod"), Some(Project::new("prod", "app")));
		assert_eq!(Project::from_upstream("prod", "appprod"), None);
		assert_eq!(
			Project::from_upstream("prod", "my-app-prod").map(|p| p.name),
			Some("my-app".into())
		);
	}

	#[test]
	fn create_request_uses_camel_case() {
		let request = CreateProjectRequest::new("billing");

		assert_eq!(
			request.payload().expect("Create request should serialize."),
			json!({"businessLine": "GTS", "projectSuffix": "billing"})
		);
		assert_eq!(
			RoleBinding::new("alice", "edit").payload().expect("Role binding should serialize."),
			json!({"user": "alice", "role": "edit"})
		);
	}

	#[test]
	fn role_binding_outcome_covers_each_missing_level() {
		let binding = RoleBinding::new("alice", "admin");
		let present = OperationRecord::from_value(json!({
			"details": { "addRoleBinding": { "User-alice-admin": { "status": "done" } } }
		}));

		assert_eq!(
			present.role_binding_outcome("addRoleBinding", &binding),
			Some(&json!({ "status": "done" }))
		);

		let no_details = OperationRecord::from_value(json!({ "id": "op-1" }));

		assert_eq!(no_details.role_binding_outcome("addRoleBinding", &binding), None);
		assert_eq!(present.role_binding_outcome("deleteRoleBinding", &binding), None);
		assert_eq!(
			present.role_binding_outcome("addRoleBinding", &RoleBinding::new("bob", "admin")),
			None
		);
	}

	#[test]
	fn null_records_and_outcomes_are_absent() {
		let binding = RoleBinding::new("alice", "view");
		let empty = OperationRecord::from_value(Value::Null);
		let null_leaf = OperationRecord::from_value(json!({
			"details": { "add": { "User-alice-view": null } }
		}));
		let null_action = OperationRecord::from_value(json!({ "details": { "add": null } }));

		assert_eq!(empty.role_binding_outcome("add", &binding), None);
		assert_eq!(null_leaf.role_binding_outcome("add", &binding), None);
		assert_eq!(null_action.role_binding_outcome("add", &binding), None);
	}

	#[test]
	fn unrelated_details_entries_do_not_break_lookup() {
		let binding = RoleBinding::new("alice", "admin");
		let mixed = OperationRecord::from_value(json!({
			"details": { "addRoleBinding": { "User-alice-admin": "ok" }, "summary": "1 action" }
		}));
		let scalar_action = OperationRecord::from_value(json!({ "details": { "add": "done" } }));
		let scalar_details = OperationRecord::from_value(json!({ "details": [1, 2] }));

		assert_eq!(mixed.role_binding_outcome("addRoleBinding", &binding), Some(&json!("ok")));
		assert_eq!(mixed.role_binding_outcome("summary", &binding), None);
		assert_eq!(scalar_action.role_binding_outcome("add", &binding), None);
		assert_eq!(scalar_details.role_binding_outcome("add", &binding), None);
	}
}
