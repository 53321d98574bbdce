//! 工具执行器
//!
//! 持有 ToolRegistry；每次调用输出结构化审计日志（JSON）。
//! 远端请求各自带超时，这里不再额外套超时：中途取消会让会话状态停在半更新的位置。

use std::time::Instant;

use crate::core::AgentError;
use crate::react::ToolCall;
use crate::tools::{ToolContext, ToolRegistry};

pub struct ToolExecutor {
    registry: ToolRegistry,
}

impl ToolExecutor {
    pub fn new(registry: ToolRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// 本批调用中第一个未注册的工具名
    pub fn first_unknown<'c>(&self, calls: &'c [ToolCall]) -> Option<&'c str> {
        calls
            .iter()
            .map(|c| c.tool.as_str())
            .find(|name| !self.registry.contains(name))
    }

    pub async fn execute(
        &self,
        call: &ToolCall,
        ctx: &mut ToolContext<'_>,
    ) -> Result<serde_json::Value, AgentError> {
        let start = Instant::now();
        let args_preview = args_preview(&call.args);
        let result = self
            .registry
            .execute(&call.tool, ctx, call.args.clone())
            .await;

        let audit = serde_json::json!({
            "event": "tool_audit",
            "tool": call.tool,
            "call_id": call.call_id,
            "ok": result.is_ok(),
            "outcome": match &result {
                Ok(_) => "ok".to_string(),
                Err(e) => e.to_string(),
            },
            "duration_ms": start.elapsed().as_millis() as u64,
            "args_preview": args_preview,
        });
        tracing::info!(audit = %audit.to_string(), "tool");

        result
    }
}

fn args_preview(args: &serde_json::Value) -> String {
    let s = args.to_string();
    if s.len() > 200 {
        format!("{}...", s.chars().take(200).collect::<String>())
    } else {
        s
    }
}
