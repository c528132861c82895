#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use grafsync::client::{DashboardSummary, FolderDescriptor};
use grafsync::config::{Credentials, RequestTimeouts};
use grafsync::{ApiError, ClientFactory, MonitoringApi};
use serde_json::Value;
use tempfile::TempDir;

/// Canned monitoring server for one section.
#[derive(Default)]
pub struct FakeApi {
    pub folder_id: Option<i64>,
    pub dashboards: Vec<(String, String, Value)>,
    pub datasources: Option<Value>,
    pub alerts: Option<Value>,
    pub requests: Mutex<Vec<String>>,
}

impl FakeApi {
    pub fn healthy(folder_id: i64) -> Self {
        Self {
            folder_id: Some(folder_id),
            datasources: Some(serde_json::json!([{"id": 1, "name": "Prometheus"}])),
            alerts: Some(serde_json::json!([{"id": 4, "name": "High CPU"}])),
            ..Default::default()
        }
    }

    pub fn with_dashboard(mut self, uid: &str, title: &str, body: Value) -> Self {
        self.dashboards.push((uid.to_string(), title.to_string(), body));
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    fn record(&self, path: String) -> String {
        self.requests.lock().unwrap().push(path.clone());
        path
    }
}

fn http_500(path: &str) -> ApiError {
    ApiError::HttpError {
        url: format!("http://fake:3000/api/{path}"),
        status: 500,
        body: "Internal Server Error".to_string(),
    }
}

#[async_trait]
impl MonitoringApi for FakeApi {
    async fn folder(&self) -> Result<FolderDescriptor, ApiError> {
        let path = self.record("folders".to_string());
        match self.folder_id {
            Some(id) => Ok(FolderDescriptor {
                id,
                uid: None,
                title: None,
            }),
            None => Err(ApiError::ReadTimeout {
                url: format!("http://fake:3000/api/{path}"),
            }),
        }
    }

    async fn list_dashboards(&self, folder_id: i64) -> Result<Vec<DashboardSummary>, ApiError> {
        self.record(format!("search?folderIds={folder_id}"));
        Ok(self
            .dashboards
            .iter()
            .map(|(uid, title, _)| DashboardSummary::new(uid.as_str(), title.as_str()))
            .collect())
    }

    async fn dashboard(&self, uid: &str) -> Result<Value, ApiError> {
        let path = self.record(format!("dashboards/uid/{uid}"));
        self.dashboards
            .iter()
            .find(|(u, _, _)| u == uid)
            .map(|(_, _, body)| body.clone())
            .ok_or_else(|| http_500(&path))
    }

    async fn datasources(&self) -> Result<Value, ApiError> {
        let path = self.record("datasources".to_string());
        self.datasources.clone().ok_or_else(|| http_500(&path))
    }

    async fn alerts(&self) -> Result<Value, ApiError> {
        let path = self.record("alerts".to_string());
        self.alerts.clone().ok_or_else(|| http_500(&path))
    }
}

/// Hands out the fake registered for a section's `host`.
#[derive(Default)]
pub struct FakeFactory {
    apis: HashMap<String, Arc<FakeApi>>,
    built: Mutex<Vec<(String, RequestTimeouts)>>,
}

impl FakeFactory {
    pub fn with_host(mut self, host: &str, api: FakeApi) -> Self {
        self.apis.insert(host.to_string(), Arc::new(api));
        self
    }

    pub fn api(&self, host: &str) -> Arc<FakeApi> {
        self.apis[host].clone()
    }

    /// Hosts a client was built for, with the timeouts it got.
    pub fn built(&self) -> Vec<(String, RequestTimeouts)> {
        self.built.lock().unwrap().clone()
    }
}

impl ClientFactory for FakeFactory {
    fn build(
        &self,
        credentials: &Credentials,
        timeouts: RequestTimeouts,
    ) -> Result<Arc<dyn MonitoringApi>, ApiError> {
        self.built
            .lock()
            .unwrap()
            .push((credentials.host.clone(), timeouts));
        match self.apis.get(&credentials.host) {
            Some(api) => Ok(api.clone()),
            None => Err(ApiError::ClientBuild(format!(
                "no fake for host {}",
                credentials.host
            ))),
        }
    }
}

/// Temporary data directory with an `ini/` folder.
pub struct DataDir {
    pub dir: TempDir,
}

impl DataDir {
    pub fn new(sections: &str, base: Option<&str>) -> Self {
        let dir = TempDir::new().unwrap();
        let ini = dir.path().join("ini");
        std::fs::create_dir_all(&ini).unwrap();
        std::fs::write(ini.join("grafana.ini"), sections).unwrap();
        if let Some(base) = base {
            std::fs::write(ini.join("base.ini"), base).unwrap();
        }
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn join(&self, rel: &str) -> PathBuf {
        self.dir.path().join(rel)
    }

    pub fn read_json(&self, rel: &str) -> Value {
        let content = std::fs::read_to_string(self.join(rel)).unwrap();
        serde_json::from_str(&content).unwrap()
    }
}

pub fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .current_dir(dir)
        .args(args)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// Turns `dir` into a work tree on `master` with a local identity.
pub fn init_work_tree(dir: &Path) {
    git(dir, &["init", "-q"]);
    git(dir, &["symbolic-ref", "HEAD", "refs/heads/master"]);
    git(dir, &["config", "user.email", "backup@example.com"]);
    git(dir, &["config", "user.name", "Backup"]);
    git(dir, &["config", "commit.gpgsign", "false"]);
}
