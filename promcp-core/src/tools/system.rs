//! Host metrics tools: `system_info`, `cpu_info`, `memory_info`

use super::result::ToolError;
use super::tool::{Tool, ToolExecutionContext, ToolMetadata, ToolSchema};
use crate::system::SystemInfoProvider;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// Which snapshot a [`SystemTool`] returns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemMetric {
    System,
    Cpu,
    Memory,
}

impl SystemMetric {
    fn metadata(&self) -> ToolMetadata {
        match self {
            SystemMetric::System => ToolMetadata::new("system_info", "Get system information")
                .with_returns("Platform, kernel, hostname, CPUs, memory, uptime and load averages"),
            SystemMetric::Cpu => ToolMetadata::new("cpu_info", "Get CPU information")
                .with_returns("CPU count, model, speed, per-core usage and load averages"),
            SystemMetric::Memory => ToolMetadata::new("memory_info", "Get memory information")
                .with_returns("Total, free and used memory in bytes and used percentage"),
        }
    }
}

/// Reports one kind of host snapshot
pub struct SystemTool {
    metadata: ToolMetadata,
    metric: SystemMetric,
    provider: SystemInfoProvider,
}

impl SystemTool {
    pub fn new(metric: SystemMetric, provider: SystemInfoProvider) -> Self {
        Self {
            metadata: metric.metadata(),
            metric,
            provider,
        }
    }

    /// All three host metrics tools
    pub fn all(provider: SystemInfoProvider) -> Vec<Arc<dyn Tool>> {
        [SystemMetric::System, SystemMetric::Cpu, SystemMetric::Memory]
            .into_iter()
            .map(|metric| Arc::new(SystemTool::new(metric, provider.clone())) as Arc<dyn Tool>)
            .collect()
    }
}

#[async_trait]
impl Tool for SystemTool {
    fn metadata(&self) -> &ToolMetadata {
        &self.metadata
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema::empty()
    }

    async fn execute(&self, _args: Value, ctx: &ToolExecutionContext) -> Result<Value, ToolError> {
        tracing::debug!(request_id = ?ctx.request_id, tool = %self.metadata.name, "Reading host metrics");

        match self.metric {
            SystemMetric::System => to_value(self.provider.system_info().await?),
            SystemMetric::Cpu => to_value(self.provider.cpu_info().await?),
            SystemMetric::Memory => to_value(self.provider.memory_info()?),
        }
    }
}

fn to_value(snapshot: impl Serialize) -> Result<Value, ToolError> {
    serde_json::to_value(snapshot)
        .map_err(|e| ToolError::internal(format!("Failed to serialize snapshot: {}", e)))
}
