use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::constants::DEFAULT_PAGE_SIZE;

/// HTTP Method enum
#[allow(clippy::upper_case_acronyms)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpMethod {
    GET,
    POST,
    PUT,
    DELETE,
}

impl HttpMethod {
    pub fn as_str(&self) -> &str {
        match self {
            HttpMethod::GET => "GET",
            HttpMethod::POST => "POST",
            HttpMethod::PUT => "PUT",
            HttpMethod::DELETE => "DELETE",
        }
    }
}

/// Backend collections managed through paged tables
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Resource {
    Companies,
    Contacts,
    Projects,
    Users,
    Roles,
}

/// How a table cell is rendered
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    /// Expiry date, shown with "Expires in ..." hint
    Validity,
    /// Timestamp shown as relative time ("3 days ago")
    LastSeen,
    /// Boolean switch
    Active,
}

#[derive(Clone, Copy, Debug)]
pub struct Column {
    pub key: &'static str,
    pub header: &'static str,
    pub kind: ColumnKind,
}

const fn col(key: &'static str, header: &'static str, kind: ColumnKind) -> Column {
    Column { key, header, kind }
}

const USER_COLUMNS: &[Column] = &[
    col("userFirstName", "Name", ColumnKind::Text),
    col("userEmail", "Email", ColumnKind::Text),
    col("userRoles", "Roles", ColumnKind::Text),
    col("validUntil", "Validity", ColumnKind::Validity),
    col("lastLogin", "Last Seen", ColumnKind::LastSeen),
    col("isActive", "Active", ColumnKind::Active),
];

const ROLE_COLUMNS: &[Column] = &[
    col("roleName", "Role", ColumnKind::Text),
    col("roleDescription", "Description", ColumnKind::Text),
];

const PROJECT_COLUMNS: &[Column] = &[
    col("title", "Title", ColumnKind::Text),
    col("productionYear", "Year", ColumnKind::Text),
    col("country", "Country", ColumnKind::Text),
    col("produzent", "Producer", ColumnKind::Text),
    col("regie", "Director", ColumnKind::Text),
];

const COMPANY_COLUMNS: &[Column] = &[
    col("companyName", "Company", ColumnKind::Text),
    col("companyEmail", "Email", ColumnKind::Text),
    col("companyPhone", "Phone", ColumnKind::Text),
    col("companyCity", "City", ColumnKind::Text),
];

const CONTACT_COLUMNS: &[Column] = &[
    col("contactName", "Name", ColumnKind::Text),
    col("contactEmail", "Email", ColumnKind::Text),
    col("contactPhone", "Phone", ColumnKind::Text),
    col("companyName", "Company", ColumnKind::Text),
];

impl Resource {
    pub const ALL: [Resource; 5] = [
        Resource::Companies,
        Resource::Contacts,
        Resource::Projects,
        Resource::Users,
        Resource::Roles,
    ];

    /// Path segment on the backend
    pub fn path(&self) -> &'static str {
        match self {
            Resource::Companies => "companies",
            Resource::Contacts => "contacts",
            Resource::Projects => "projects",
            Resource::Users => "users",
            Resource::Roles => "roles",
        }
    }

    pub fn columns(&self) -> &'static [Column] {
        match self {
            Resource::Companies => COMPANY_COLUMNS,
            Resource::Contacts => CONTACT_COLUMNS,
            Resource::Projects => PROJECT_COLUMNS,
            Resource::Users => USER_COLUMNS,
            Resource::Roles => ROLE_COLUMNS,
        }
    }

    /// Skeleton record offered when adding a new row
    pub fn template(&self) -> Value {
        let mut record = serde_json::Map::new();
        for column in self.columns() {
            let value = match column.kind {
                ColumnKind::Active => Value::Bool(true),
                ColumnKind::Validity | ColumnKind::LastSeen => continue,
                ColumnKind::Text => Value::String(String::new()),
            };
            record.insert(column.key.to_string(), value);
        }
        if *self == Resource::Users {
            record.insert("userPass".to_string(), Value::String(String::new()));
        }
        Value::Object(record)
    }
}

/// Extract the record id, which the backend sends as number or string
pub fn record_id(record: &Value) -> Option<String> {
    match record.get("id")? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Server-side paging position (0-based page index)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRequest {
    pub page_index: u32,
    pub page_size: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        PageRequest {
            page_index: 0,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    pub fn new(page_index: u32, page_size: u32) -> Self {
        PageRequest {
            page_index,
            page_size: if page_size == 0 { DEFAULT_PAGE_SIZE } else { page_size },
        }
    }

    pub fn query(&self) -> Vec<(String, String)> {
        vec![
            ("pageIndex".to_string(), self.page_index.to_string()),
            ("pageSize".to_string(), self.page_size.to_string()),
        ]
    }
}

/// One page of rows as returned by `/{resource}/paging`
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub data: Option<Vec<Value>>,
    #[serde(default, rename = "totalCount")]
    pub total_count: u64,
}

impl Page {
    /// Rows and total; an empty or missing page counts as zero rows overall
    pub fn into_parts(self) -> (Vec<Value>, u64) {
        match self.data {
            Some(rows) if !rows.is_empty() => (rows, self.total_count),
            _ => (Vec::new(), 0),
        }
    }
}

/// Footer numbers for a paged table
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PaginationSummary {
    pub start: u64,
    pub end: u64,
    pub count: u64,
    pub total_pages: u64,
}

impl PaginationSummary {
    pub fn new(page: PageRequest, count: u64) -> Self {
        let size = u64::from(page.page_size.max(1));
        let index = u64::from(page.page_index);
        let start = if count == 0 { 0 } else { index * size + 1 };
        let end = count.min((index + 1) * size);
        let total_pages = count.div_ceil(size).max(1);
        PaginationSummary {
            start,
            end,
            count,
            total_pages,
        }
    }

    pub fn label(&self) -> String {
        format!("Show {}–{} of {} results", self.start, self.end, self.count)
    }
}

/// Body of `/auth/login` and `/auth/refresh`
#[derive(Clone, Debug, Deserialize)]
pub struct TokenResponse {
    #[serde(default, rename = "accessToken")]
    pub access_token: Option<String>,
}

/// Counters returned by `/element-sum`
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DashboardTotals(pub serde_json::Map<String, Value>);

impl DashboardTotals {
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => DashboardTotals(map),
            _ => DashboardTotals::default(),
        }
    }

    /// Counter value, 0 when missing or not a number
    pub fn get(&self, key: &str) -> u64 {
        self.0.get(key).and_then(Value::as_u64).unwrap_or(0)
    }
}

/// Access flags a role grants on one resource
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    #[serde(default)]
    pub read: bool,
    #[serde(default)]
    pub write: bool,
    #[serde(default)]
    pub option: String,
}

pub type RolePermissions = BTreeMap<String, Permission>;

/// Read `rolePermission` out of a role record, tolerating missing fields
pub fn permissions_of(role: &Value) -> RolePermissions {
    let Some(Value::Object(resources)) = role.get("rolePermission") else {
        return RolePermissions::new();
    };
    resources
        .iter()
        .map(|(name, flags)| {
            let permission = Permission {
                read: flags.get("read").and_then(Value::as_bool).unwrap_or(false),
                write: flags.get("write").and_then(Value::as_bool).unwrap_or(false),
                option: flags
                    .get("option")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
            };
            (name.clone(), permission)
        })
        .collect()
}

/// Payload of `PUT /users/update-password`
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChange {
    pub email: String,
    pub current_password: String,
    pub new_password: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_pagination_summary() {
        let summary = PaginationSummary::new(PageRequest::new(1, 20), 45);
        assert_eq!(summary.start, 21);
        assert_eq!(summary.end, 40);
        assert_eq!(summary.total_pages, 3);
        assert_eq!(summary.label(), "Show 21–40 of 45 results");

        let last = PaginationSummary::new(PageRequest::new(2, 20), 45);
        assert_eq!((last.start, last.end), (41, 45));
    }

    #[test]
    fn test_pagination_summary_empty() {
        let summary = PaginationSummary::new(PageRequest::default(), 0);
        assert_eq!((summary.start, summary.end, summary.total_pages), (0, 0, 1));
    }

    #[test]
    fn test_zero_page_size_falls_back() {
        assert_eq!(PageRequest::new(0, 0).page_size, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_empty_page_resets_total() {
        let page: Page = serde_json::from_value(json!({"data": [], "totalCount": 12})).unwrap();
        assert_eq!(page.into_parts(), (Vec::new(), 0));

        let page: Page = serde_json::from_value(json!({"totalCount": 3})).unwrap();
        assert_eq!(page.into_parts().1, 0);

        let page: Page =
            serde_json::from_value(json!({"data": [{"id": 1}], "totalCount": 31})).unwrap();
        assert_eq!(page.into_parts().1, 31);
    }

    #[test]
    fn test_record_id_number_or_string() {
        assert_eq!(record_id(&json!({"id": 7})).as_deref(), Some("7"));
        assert_eq!(record_id(&json!({"id": "a1"})).as_deref(), Some("a1"));
        assert_eq!(record_id(&json!({"id": ""})), None);
        assert_eq!(record_id(&json!({})), None);
    }

    #[test]
    fn test_permissions_default_missing_fields() {
        let role = json!({
            "rolePermission": {
                "Node": {"read": true, "option": "all"},
                "User": {"write": true}
            }
        });
        let perms = permissions_of(&role);
        assert_eq!(perms["Node"], Permission { read: true, write: false, option: "all".into() });
        assert_eq!(perms["User"], Permission { read: false, write: true, option: String::new() });
        assert!(permissions_of(&json!({})).is_empty());
    }

    #[test]
    fn test_totals_missing_counter_is_zero() {
        let totals = DashboardTotals::from_value(json!({"total_users": 5}));
        assert_eq!(totals.get("total_users"), 5);
        assert_eq!(totals.get("total_projects"), 0);
    }

    #[test]
    fn test_user_template_has_password() {
        let template = Resource::Users.template();
        assert!(template.get("userPass").is_some());
        assert_eq!(template.get("isActive"), Some(&Value::Bool(true)));
        assert!(template.get("lastLogin").is_none());
    }
}
