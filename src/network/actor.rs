//! Network actor - runs backend calls in the Tokio async runtime

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::app::guard;
use crate::error::ApiError;
use crate::messages::network::{ApiCall, PdfKind};
use crate::messages::{NetworkCommand, NetworkResponse};
use crate::network::client::ApiClient;
use crate::storage::Storage;

/// Network actor that executes `ApiCall`s through the authenticated client
pub struct NetworkActor {
    client: Arc<ApiClient>,
    storage: Arc<Storage>,
    response_tx: mpsc::UnboundedSender<NetworkResponse>,
    active_requests: JoinSet<()>,
}

impl NetworkActor {
    pub fn new(
        client: Arc<ApiClient>,
        storage: Arc<Storage>,
        response_tx: mpsc::UnboundedSender<NetworkResponse>,
    ) -> Self {
        NetworkActor {
            client,
            storage,
            response_tx,
            active_requests: JoinSet::new(),
        }
    }

    /// Run the network actor message loop
    pub async fn run(mut self, mut cmd_rx: mpsc::UnboundedReceiver<NetworkCommand>) {
        loop {
            tokio::select! {
                biased;

                cmd = cmd_rx.recv() => {
                    match cmd {
                        Some(NetworkCommand::Execute { id, call }) => {
                            let response_tx = self.response_tx.clone();
                            let client = self.client.clone();
                            let storage = self.storage.clone();

                            self.active_requests.spawn(async move {
                                let kind = call.kind();
                                tracing::info!(id, call = ?kind, "Executing call");
                                let result = execute_call(&client, &storage, id, call).await;
                                tracing::info!(id, call = ?kind, "Call completed");
                                let _ = response_tx.send(result);
                            });
                        }

                        Some(NetworkCommand::Shutdown) => {
                            self.active_requests.abort_all();
                            break;
                        }

                        None => break,
                    }
                }

                // Clean up completed tasks
                Some(result) = self.active_requests.join_next() => {
                    if let Err(e) = result {
                        if e.is_panic() {
                            tracing::error!(error = %e, "Network task panicked");
                        }
                    }
                }
            }
        }
    }
}

/// Run one call to completion and turn the outcome into a response
pub async fn execute_call(
    client: &ApiClient,
    storage: &Storage,
    id: u64,
    call: ApiCall,
) -> NetworkResponse {
    let kind = call.kind();

    let result: Result<NetworkResponse, ApiError> = async {
        Ok(match call {
            ApiCall::Bootstrap => NetworkResponse::Bootstrapped {
                id,
                state: guard::bootstrap(client).await,
            },

            ApiCall::Login { email, password } => {
                client.login(&email, &password).await?;
                NetworkResponse::LoggedIn { id }
            }

            ApiCall::Logout => {
                client.logout().await;
                NetworkResponse::LoggedOut { id }
            }

            ApiCall::FetchPage { resource, page } => {
                let (rows, total) = client.fetch_page(resource, page).await?;
                NetworkResponse::Page { id, resource, rows, total }
            }

            ApiCall::Search { resource, term } => {
                let rows = client.search(resource, &term).await?;
                let total = rows.len() as u64;
                NetworkResponse::Page { id, resource, rows, total }
            }

            ApiCall::Create { resource, record } => {
                let record = client.create(resource, record).await?;
                NetworkResponse::Created { id, resource, record }
            }

            ApiCall::Update { resource, id: record_id, record } => {
                let echoed = client.update(resource, &record_id, record.clone()).await?;
                let record = if echoed.is_object() { echoed } else { record };
                NetworkResponse::Updated { id, resource, record_id, record }
            }

            ApiCall::Delete { resource, id: record_id } => {
                client.delete(resource, &record_id).await?;
                NetworkResponse::Deleted { id, resource, record_id }
            }

            ApiCall::SetUserActive { id: record_id, active } => {
                client.set_user_active(&record_id, active).await?;
                NetworkResponse::UserActiveSet { id, record_id, active }
            }

            ApiCall::DashboardTotals => NetworkResponse::Totals {
                id,
                totals: client.dashboard_totals().await?,
            },

            ApiCall::RoleNames => NetworkResponse::RoleNames {
                id,
                names: client.role_names().await?,
            },

            ApiCall::AdminPermissions => NetworkResponse::Permissions {
                id,
                permissions: client.admin_role_permissions().await?,
            },

            ApiCall::RolePermissions { id: role_id } => NetworkResponse::Permissions {
                id,
                permissions: client.role_permissions(&role_id).await?,
            },

            ApiCall::Profile { email } => NetworkResponse::Profile {
                id,
                user: client.fetch_profile(&email).await?,
            },

            ApiCall::UpdatePassword(change) => {
                client.update_password(&change).await?;
                NetworkResponse::PasswordUpdated { id }
            }

            ApiCall::Pdf { kind, id: record_id, payload } => {
                let bytes = fetch_pdf(client, kind, payload).await?;
                match storage.save_download(&kind.file_name(&record_id), &bytes) {
                    Ok(path) => NetworkResponse::PdfSaved { id, path },
                    Err(e) => NetworkResponse::SaveFailed {
                        id,
                        message: format!("{:#}", e),
                    },
                }
            }
        })
    }
    .await;

    match result {
        Ok(response) => response,
        Err(ApiError::SessionExpired) => NetworkResponse::SessionExpired { id },
        Err(error) => {
            tracing::warn!(id, call = ?kind, error = %error, "Call failed");
            NetworkResponse::Failed { id, call: kind, error }
        }
    }
}

async fn fetch_pdf(client: &ApiClient, kind: PdfKind, payload: Value) -> Result<Vec<u8>, ApiError> {
    match kind {
        PdfKind::Generate => client.generate_pdf(payload).await,
        PdfKind::View => client.view_pdf(payload).await,
    }
}
