use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;

use super::transport::{GraphqlRequest, GraphqlTransport, ReqwestGraphqlTransport};
use super::types::{CurrentTracking, Project, RemoteError, StoppedTracking, Task};
use crate::config::{Credential, PluginConfig};

const CURRENT_TRACKING_QUERY: &str = r#"
query currentTracking {
  currentTracking {
    start
    task {
      id
    }
  }
}
"#;

const TASK_QUERY: &str = r#"
query Task($taskId: ID!) {
  task(taskId: $taskId) {
    id
    title
  }
}
"#;

const TRACKING_START_MUTATION: &str = r#"
mutation trackingStart($taskId: ID!) {
  trackingStart(taskId: $taskId) {
    start
    task {
      id
    }
  }
}
"#;

const TRACKING_STOP_MUTATION: &str = r#"
mutation trackingStop {
  trackingStop {
    id
    task {
      id
    }
  }
}
"#;

const MY_PROJECTS_QUERY: &str = r#"
query myProjects($from: Date!) {
  projects(from: $from) {
    title
    tasks {
      id
      title
    }
  }
}
"#;

/// Remote operations the plugin needs from Timebook
#[async_trait]
pub trait TrackingApi: Send + Sync {
    async fn current_tracking(&self) -> Result<Option<CurrentTracking>, RemoteError>;

    async fn task(&self, task_id: &str) -> Result<Option<Task>, RemoteError>;

    async fn tracking_start(&self, task_id: &str) -> Result<CurrentTracking, RemoteError>;

    /// Returns `None` when the server had nothing to stop.
    async fn tracking_stop(&self) -> Result<Option<StoppedTracking>, RemoteError>;

    /// Projects (with their tasks) the user can book on from `from` onwards.
    async fn projects(&self, from: NaiveDate) -> Result<Vec<Project>, RemoteError>;
}

pub struct GraphqlTrackingClient {
    transport: Arc<dyn GraphqlTransport>,
}

impl GraphqlTrackingClient {
    pub fn new(config: &PluginConfig, credential: Credential) -> Result<Self, RemoteError> {
        let transport =
            ReqwestGraphqlTransport::new(&config.api.url, credential, config.request_timeout())?;
        Ok(Self::with_transport(Arc::new(transport)))
    }

    pub fn with_transport(transport: Arc<dyn GraphqlTransport>) -> Self {
        Self { transport }
    }

    async fn run<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<T, RemoteError> {
        let data = self
            .transport
            .execute(GraphqlRequest::new(query, variables))
            .await
            .map_err(|err| err.during(operation))?;
        serde_json::from_value(data).map_err(|err| {
            RemoteError::new(operation, format!("unexpected response shape: {err}"))
        })
    }
}

#[async_trait]
impl TrackingApi for GraphqlTrackingClient {
    async fn current_tracking(&self) -> Result<Option<CurrentTracking>, RemoteError> {
        let response: CurrentTrackingResponse = self
            .run("currentTracking", CURRENT_TRACKING_QUERY, json!({}))
            .await?;
        response
            .current_tracking
            .map(|node| node.into_tracking("currentTracking"))
            .transpose()
    }

    async fn task(&self, task_id: &str) -> Result<Option<Task>, RemoteError> {
        let response: TaskResponse = self
            .run("task", TASK_QUERY, json!({ "taskId": task_id }))
            .await?;
        Ok(response.task.map(Into::into))
    }

    async fn tracking_start(&self, task_id: &str) -> Result<CurrentTracking, RemoteError> {
        let response: TrackingStartResponse = self
            .run("trackingStart", TRACKING_START_MUTATION, json!({ "taskId": task_id }))
            .await?;
        response.tracking_start.into_tracking("trackingStart")
    }

    async fn tracking_stop(&self) -> Result<Option<StoppedTracking>, RemoteError> {
        let response: TrackingStopResponse = self
            .run("trackingStop", TRACKING_STOP_MUTATION, json!({}))
            .await?;
        Ok(response.tracking_stop.map(|node| StoppedTracking {
            task_id: node.task.id,
        }))
    }

    async fn projects(&self, from: NaiveDate) -> Result<Vec<Project>, RemoteError> {
        let response: ProjectsResponse = self
            .run(
                "projects",
                MY_PROJECTS_QUERY,
                json!({ "from": from.format("%Y-%m-%d").to_string() }),
            )
            .await?;
        Ok(response
            .projects
            .into_iter()
            .map(|project| Project {
                title: project.title,
                tasks: project.tasks.into_iter().map(Into::into).collect(),
            })
            .collect())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CurrentTrackingResponse {
    current_tracking: Option<TrackingNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TrackingStartResponse {
    tracking_start: TrackingNode,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TrackingStopResponse {
    tracking_stop: Option<StoppedNode>,
}

#[derive(Debug, Deserialize)]
struct TaskResponse {
    task: Option<TaskNode>,
}

#[derive(Debug, Deserialize)]
struct ProjectsResponse {
    projects: Vec<ProjectNode>,
}

#[derive(Debug, Deserialize)]
struct TrackingNode {
    start: String,
    task: TaskRef,
}

impl TrackingNode {
    fn into_tracking(self, operation: &'static str) -> Result<CurrentTracking, RemoteError> {
        let start = DateTime::parse_from_rfc3339(&self.start)
            .map_err(|err| {
                RemoteError::new(operation, format!("invalid start timestamp {:?}: {err}", self.start))
            })?
            .with_timezone(&Utc);
        Ok(CurrentTracking::new(start, self.task.id))
    }
}

#[derive(Debug, Deserialize)]
struct StoppedNode {
    task: TaskRef,
}

#[derive(Debug, Deserialize)]
struct TaskRef {
    id: String,
}

#[derive(Debug, Deserialize)]
struct TaskNode {
    id: String,
    title: String,
}

impl From<TaskNode> for Task {
    fn from(node: TaskNode) -> Self {
        Task {
            id: node.id,
            title: node.title,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ProjectNode {
    title: String,
    #[serde(default)]
    tasks: Vec<TaskNode>,
}
