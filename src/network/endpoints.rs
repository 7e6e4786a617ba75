//! Request builders for every backend endpoint
//!
//! Pure functions: nothing here touches the network, so paths and query
//! strings can be checked without a server.

use serde_json::{json, Value};

use crate::models::{PageRequest, PasswordChange, Resource};
use crate::network::transport::ApiRequest;

pub const ELEMENT_SUM_PATH: &str = "/element-sum";
pub const ROLE_NAMES_PATH: &str = "/roles/role-name";
pub const ADMIN_ROLE_PATH: &str = "/roles/admin-role";
pub const UPDATE_PASSWORD_PATH: &str = "/users/update-password";
pub const PDF_GENERATE_PATH: &str = "/pdf/pdf-generate";
pub const PDF_VIEW_PATH: &str = "/pdf/pdf-view";

/// `GET /{resource}/paging?pageIndex=&pageSize=`
pub fn page(resource: Resource, page: PageRequest) -> ApiRequest {
    page.query()
        .into_iter()
        .fold(ApiRequest::get(format!("/{}/paging", resource.path())), |req, (k, v)| {
            req.query(k, v)
        })
}

/// `GET /{resource}/search?query=`
pub fn search(resource: Resource, term: &str) -> ApiRequest {
    ApiRequest::get(format!("/{}/search", resource.path())).query("query", term.trim())
}

pub fn create(resource: Resource, record: Value) -> ApiRequest {
    ApiRequest::post(format!("/{}", resource.path())).json(record)
}

pub fn update(resource: Resource, id: &str, record: Value) -> ApiRequest {
    ApiRequest::put(format!("/{}/{}", resource.path(), id)).json(record)
}

pub fn delete(resource: Resource, id: &str) -> ApiRequest {
    ApiRequest::delete(format!("/{}/{}", resource.path(), id))
}

/// Flip a user's `isActive` switch
pub fn set_user_active(id: &str, active: bool) -> ApiRequest {
    update(Resource::Users, id, json!({ "isActive": active }))
}

pub fn dashboard_totals() -> ApiRequest {
    ApiRequest::get(ELEMENT_SUM_PATH)
}

pub fn role_names() -> ApiRequest {
    ApiRequest::get(ROLE_NAMES_PATH)
}

/// Permission template offered to new roles
pub fn admin_role() -> ApiRequest {
    ApiRequest::get(ADMIN_ROLE_PATH)
}

pub fn role(id: &str) -> ApiRequest {
    ApiRequest::get(format!("/{}/{}", Resource::Roles.path(), id))
}

/// `GET /users?email=`
pub fn profile(email: &str) -> ApiRequest {
    ApiRequest::get(format!("/{}", Resource::Users.path())).query("email", email)
}

pub fn update_password(change: &PasswordChange) -> ApiRequest {
    // PasswordChange only holds strings
    let body = serde_json::to_value(change).unwrap_or(Value::Null);
    ApiRequest::put(UPDATE_PASSWORD_PATH).json(body)
}

pub fn generate_pdf(payload: Value) -> ApiRequest {
    ApiRequest::post(PDF_GENERATE_PATH).json(payload)
}

pub fn view_pdf(payload: Value) -> ApiRequest {
    ApiRequest::post(PDF_VIEW_PATH).json(payload)
}
