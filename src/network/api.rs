//! Typed backend calls on top of the authenticated client

use serde_json::Value;

use crate::error::{ApiError, ApiResult};
use crate::models::{
    permissions_of, DashboardTotals, Page, PageRequest, PasswordChange, Resource, RolePermissions,
};
use crate::network::client::ApiClient;
use crate::network::endpoints;

impl ApiClient {
    /// One page of rows plus the total row count
    pub async fn fetch_page(
        &self,
        resource: Resource,
        page: PageRequest,
    ) -> ApiResult<(Vec<Value>, u64)> {
        let page: Page = self.send_json(endpoints::page(resource, page)).await?;
        Ok(page.into_parts())
    }

    /// Search results; the backend answers with a bare array or a paged object
    pub async fn search(&self, resource: Resource, term: &str) -> ApiResult<Vec<Value>> {
        let body: Value = self.send_json(endpoints::search(resource, term)).await?;
        Ok(match body {
            Value::Array(rows) => rows,
            Value::Object(_) => serde_json::from_value::<Page>(body)?.into_parts().0,
            _ => Vec::new(),
        })
    }

    /// Create a record, returning whatever the server echoed back.
    ///
    /// The users endpoint reports a duplicate e-mail either as HTTP 409 or
    /// as a 2xx whose body is the number `409`; both come back as a 409
    /// status error.
    pub async fn create(&self, resource: Resource, record: Value) -> ApiResult<Value> {
        let body: Value = self.send_json(endpoints::create(resource, record)).await?;
        if body.as_u64() == Some(409) {
            return Err(ApiError::Status {
                status: 409,
                body: body.to_string(),
            });
        }
        Ok(body)
    }

    pub async fn update(&self, resource: Resource, id: &str, record: Value) -> ApiResult<Value> {
        self.send_json(endpoints::update(resource, id, record)).await
    }

    pub async fn delete(&self, resource: Resource, id: &str) -> ApiResult<()> {
        self.send(endpoints::delete(resource, id)).await?;
        Ok(())
    }

    pub async fn set_user_active(&self, id: &str, active: bool) -> ApiResult<()> {
        self.send(endpoints::set_user_active(id, active)).await?;
        Ok(())
    }

    pub async fn dashboard_totals(&self) -> ApiResult<DashboardTotals> {
        let body: Value = self.send_json(endpoints::dashboard_totals()).await?;
        Ok(DashboardTotals::from_value(body))
    }

    /// Role names offered in the user dialog (keys of the response object)
    pub async fn role_names(&self) -> ApiResult<Vec<String>> {
        let body: Value = self.send_json(endpoints::role_names()).await?;
        Ok(match body {
            Value::Object(map) => map.keys().cloned().collect(),
            Value::Array(items) => items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
            _ => Vec::new(),
        })
    }

    /// Default permissions for a new role
    pub async fn admin_role_permissions(&self) -> ApiResult<RolePermissions> {
        let body: Value = self.send_json(endpoints::admin_role()).await?;
        Ok(permissions_of(&body))
    }

    pub async fn role_permissions(&self, id: &str) -> ApiResult<RolePermissions> {
        let body: Value = self.send_json(endpoints::role(id)).await?;
        Ok(permissions_of(&body))
    }

    /// The user record for `email`
    pub async fn fetch_profile(&self, email: &str) -> ApiResult<Value> {
        let body: Value = self.send_json(endpoints::profile(email)).await?;
        match body {
            Value::Array(mut users) if !users.is_empty() => Ok(users.swap_remove(0)),
            Value::Object(_) => Ok(body),
            _ => Err(ApiError::Decode(format!("no user found for {}", email))),
        }
    }

    pub async fn update_password(&self, change: &PasswordChange) -> ApiResult<()> {
        self.send(endpoints::update_password(change)).await?;
        Ok(())
    }

    /// Invoice PDF bytes, rendered by the backend
    pub async fn generate_pdf(&self, payload: Value) -> ApiResult<Vec<u8>> {
        Ok(self.send(endpoints::generate_pdf(payload)).await?.body)
    }

    pub async fn view_pdf(&self, payload: Value) -> ApiResult<Vec<u8>> {
        Ok(self.send(endpoints::view_pdf(payload)).await?.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::testing::FakeBackend;
    use crate::network::transport::Transport;
    use crate::session::Session;
    use crate::storage::LogoutMarker;
    use serde_json::json;
    use std::sync::Arc;
    use tempfile::{tempdir, TempDir};

    fn signed_in(backend: &Arc<FakeBackend>) -> (ApiClient, TempDir) {
        let dir = tempdir().unwrap();
        backend.accept_token("good");
        let session = Arc::new(Session::new());
        session.sign_in("good");
        let transport: Arc<dyn Transport> = backend.clone();
        let client = ApiClient::new(transport, session, LogoutMarker::new(dir.path(), 300));
        (client, dir)
    }

    #[tokio::test]
    async fn test_fetch_page() {
        let backend = FakeBackend::new();
        backend.route(
            "/projects/paging",
            200,
            r#"{"data":[{"id":1},{"id":2}],"totalCount":42}"#,
        );
        let (client, _dir) = signed_in(&backend);

        let (rows, total) = client
            .fetch_page(Resource::Projects, PageRequest::default())
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(total, 42);
    }

    #[tokio::test]
    async fn test_search_accepts_array_or_page() {
        let backend = FakeBackend::new();
        backend.route("/companies/search", 200, r#"[{"id":1}]"#);
        backend.route("/contacts/search", 200, r#"{"data":[{"id":1},{"id":2}],"totalCount":2}"#);
        let (client, _dir) = signed_in(&backend);

        assert_eq!(client.search(Resource::Companies, "a").await.unwrap().len(), 1);
        assert_eq!(client.search(Resource::Contacts, "a").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_create_duplicate_email_as_body() {
        let backend = FakeBackend::new();
        backend.route("/users", 200, "409");
        let (client, _dir) = signed_in(&backend);

        let err = client.create(Resource::Users, json!({})).await.unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn test_role_names_are_object_keys() {
        let backend = FakeBackend::new();
        backend.route("/roles/role-name", 200, r#"{"Admin":1,"Viewer":2}"#);
        let (client, _dir) = signed_in(&backend);

        let mut names = client.role_names().await.unwrap();
        names.sort();
        assert_eq!(names, vec!["Admin", "Viewer"]);
    }

    #[tokio::test]
    async fn test_profile_takes_first_user() {
        let backend = FakeBackend::new();
        backend.route("/users", 200, r#"[{"userEmail":"a@b.c"}]"#);
        let (client, _dir) = signed_in(&backend);

        let user = client.fetch_profile("a@b.c").await.unwrap();
        assert_eq!(user["userEmail"], "a@b.c");
    }

    #[tokio::test]
    async fn test_totals_survive_empty_body() {
        let backend = FakeBackend::new();
        backend.route("/element-sum", 200, "");
        let (client, _dir) = signed_in(&backend);

        let totals = client.dashboard_totals().await.unwrap();
        assert_eq!(totals.get("total_users"), 0);
    }

    #[tokio::test]
    async fn test_pdf_bytes_pass_through() {
        let backend = FakeBackend::new();
        backend.route("/pdf/pdf-generate", 200, "%PDF-1.7");
        let (client, _dir) = signed_in(&backend);

        let bytes = client.generate_pdf(json!({"id": 1})).await.unwrap();
        assert_eq!(bytes, b"%PDF-1.7");
    }
}
