use serde::Deserialize;
use std::path::PathBuf;

use crate::domain::Session;
use crate::store::Store;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// One process serves one interactive session: at most one workspace and at
/// most one authenticated user at a time.
pub struct AppState {
    pub workspace: Option<PathBuf>,
    pub store: Option<Store>,
    pub session: Option<Session>,
}
