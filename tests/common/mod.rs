//! In-memory fakes of the ECS API and secrets vault shared by the
//! integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use ecspod::{
    ContainerDefinition, EcsClient, Error, PodDefinitionOptions, RegisterTaskDefinitionRequest,
    Result, RunTaskRequest, SecretVault, TaskInfo,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;

// =============================================================================
// Fake ECS Client
// =============================================================================

#[derive(Debug, Default)]
pub struct EcsState {
    pub definitions: HashMap<String, RegisterTaskDefinitionRequest>,
    pub register_calls: usize,
    pub deregistered: Vec<String>,
    pub tasks: HashMap<String, TaskInfo>,
    pub runs: Vec<RunTaskRequest>,
    pub stop_calls: Vec<String>,
    next_id: usize,
}

#[derive(Debug, Default)]
pub struct FakeEcsClient {
    pub state: Mutex<EcsState>,
    fail_run: AtomicBool,
}

impl FakeEcsClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent `run_task` fail.
    pub fn fail_runs(&self) {
        self.fail_run.store(true, Ordering::SeqCst);
    }

    pub async fn register_calls(&self) -> usize {
        self.state.lock().await.register_calls
    }

    pub async fn deregistered(&self) -> Vec<String> {
        self.state.lock().await.deregistered.clone()
    }

    pub async fn stop_calls(&self) -> Vec<String> {
        self.state.lock().await.stop_calls.clone()
    }

    pub async fn definition(&self, id: &str) -> Option<RegisterTaskDefinitionRequest> {
        self.state.lock().await.definitions.get(id).cloned()
    }

    pub async fn set_task_status(&self, task_id: &str, last_status: &str) {
        if let Some(task) = self.state.lock().await.tasks.get_mut(task_id) {
            task.last_status = last_status.to_string();
        }
    }

    pub async fn forget_task(&self, task_id: &str) {
        self.state.lock().await.tasks.remove(task_id);
    }
}

#[async_trait]
impl EcsClient for FakeEcsClient {
    async fn register_task_definition(
        &self,
        req: RegisterTaskDefinitionRequest,
    ) -> Result<String> {
        let mut state = self.state.lock().await;
        state.register_calls += 1;
        state.next_id += 1;
        let id = format!("{}:{}", req.family, state.next_id);
        state.definitions.insert(id.clone(), req);
        Ok(id)
    }

    async fn deregister_task_definition(&self, id: &str) -> Result<()> {
        let mut state = self.state.lock().await;
        if state.definitions.remove(id).is_none() {
            return Err(Error::not_found("task definition", id));
        }
        state.deregistered.push(id.to_string());
        Ok(())
    }

    async fn run_task(&self, req: RunTaskRequest) -> Result<TaskInfo> {
        if self.fail_run.load(Ordering::SeqCst) {
            return Err(Error::Client {
                operation: "RunTask".to_string(),
                reason: "no capacity".to_string(),
            });
        }
        let mut state = self.state.lock().await;
        state.next_id += 1;
        let task = TaskInfo {
            task_id: format!("task-{}", state.next_id),
            cluster: req.cluster.clone(),
            task_definition_id: req.task_definition_id.clone(),
            last_status: "PENDING".to_string(),
            stopped_reason: None,
            created_at: Some(chrono::Utc::now()),
        };
        state.tasks.insert(task.task_id.clone(), task.clone());
        state.runs.push(req);
        Ok(task)
    }

    async fn describe_task(&self, _cluster: Option<&str>, task_id: &str) -> Result<TaskInfo> {
        self.state
            .lock()
            .await
            .tasks
            .get(task_id)
            .cloned()
            .ok_or_else(|| Error::not_found("task", task_id))
    }

    async fn stop_task(&self, _cluster: Option<&str>, task_id: &str, reason: &str) -> Result<()> {
        let mut state = self.state.lock().await;
        state.stop_calls.push(task_id.to_string());
        let task = state
            .tasks
            .get_mut(task_id)
            .ok_or_else(|| Error::not_found("task", task_id))?;
        task.last_status = "STOPPED".to_string();
        task.stopped_reason = Some(reason.to_string());
        Ok(())
    }
}

// =============================================================================
// Fake Secret Vault
// =============================================================================

#[derive(Debug, Default)]
pub struct VaultState {
    /// id -> (name, value)
    pub secrets: HashMap<String, (String, String)>,
    pub deleted: Vec<String>,
    next_id: usize,
}

#[derive(Debug, Default)]
pub struct FakeVault {
    pub state: Mutex<VaultState>,
}

impl FakeVault {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn secret(&self, id: &str) -> Option<(String, String)> {
        self.state.lock().await.secrets.get(id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.secrets.len()
    }

    pub async fn deleted(&self) -> Vec<String> {
        self.state.lock().await.deleted.clone()
    }
}

#[async_trait]
impl SecretVault for FakeVault {
    async fn create_secret(&self, name: &str, value: &str) -> Result<String> {
        let mut state = self.state.lock().await;
        state.next_id += 1;
        let id = format!("secret-{}", state.next_id);
        state
            .secrets
            .insert(id.clone(), (name.to_string(), value.to_string()));
        Ok(id)
    }

    async fn delete_secret(&self, id: &str) -> Result<()> {
        let mut state = self.state.lock().await;
        state.secrets.remove(id);
        state.deleted.push(id.to_string());
        Ok(())
    }
}

// =============================================================================
// Option Builders
// =============================================================================

/// A container that is valid on its own.
pub fn container(name: &str, image: &str) -> ContainerDefinition {
    ContainerDefinition::new()
        .with_name(name)
        .with_image(image)
        .with_memory_mb(128)
        .with_cpu(128)
}

/// A fully named, valid definition.
pub fn named_definition(name: &str) -> PodDefinitionOptions {
    PodDefinitionOptions::new()
        .with_name(name)
        .add_container_definitions([container("app", "nginx:1.25"), container("sidecar", "envoy:1.29")])
}
