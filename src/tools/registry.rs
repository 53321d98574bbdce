//! 工具注册表
//!
//! 每个意图实现 Tool trait（name / description / parameters_schema / execute），由 ToolRegistry 按名注册与查找。
//! 工具执行时拿到 ToolContext：本轮独占的会话状态 + 搜索引擎。

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use schemars::{schema_for, JsonSchema};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::core::{AgentError, SessionState};
use crate::search::SearchEngine;

/// 工具执行上下文：编排器在分发期间把会话状态的可变借用交给工具
pub struct ToolContext<'a> {
    pub state: &'a mut SessionState,
    pub engine: &'a SearchEngine,
}

#[async_trait]
pub trait Tool: Send + Sync {
    /// 工具名称（用于 JSON 中的 "tool" 字段）
    fn name(&self) -> &str;

    /// 工具描述（供决策模型理解功能）
    fn description(&self) -> &str;

    /// 参数 JSON Schema，默认无参数
    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {},
            "required": []
        })
    }

    /// 执行工具，返回写回 transcript 的结构化结果
    async fn execute(&self, ctx: &mut ToolContext<'_>, args: Value) -> Result<Value, AgentError>;
}

/// 由参数类型生成 JSON Schema
pub fn schema_of<T: JsonSchema>() -> Value {
    serde_json::to_value(schema_for!(T)).unwrap_or_else(|_| serde_json::json!({"type": "object"}))
}

/// 解析工具参数；null 视为空对象
pub fn parse_args<T: DeserializeOwned>(tool: &str, args: Value) -> Result<T, AgentError> {
    let args = if args.is_null() {
        Value::Object(Default::default())
    } else {
        args
    };
    serde_json::from_value(args).map_err(|e| AgentError::InvalidArguments {
        tool: tool.to_string(),
        reason: e.to_string(),
    })
}

/// 按注册顺序保存工具，保证生成的工具说明稳定
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
    order: Vec<String>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, tool: impl Tool + 'static) {
        let name = tool.name().to_string();
        if self.tools.insert(name.clone(), Arc::new(tool)).is_none() {
            self.order.push(name);
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub async fn execute(
        &self,
        name: &str,
        ctx: &mut ToolContext<'_>,
        args: Value,
    ) -> Result<Value, AgentError> {
        let tool = self
            .get(name)
            .ok_or_else(|| AgentError::ToolNotFound(name.to_string()))?;
        tool.execute(ctx, args).await
    }

    pub fn tool_names(&self) -> Vec<String> {
        self.order.clone()
    }

    /// 工具说明 JSON（名称、描述、参数 schema），拼入 system prompt
    pub fn to_schema_json(&self) -> String {
        let tools: Vec<Value> = self
            .order
            .iter()
            .filter_map(|name| self.tools.get(name))
            .map(|tool| {
                serde_json::json!({
                    "name": tool.name(),
                    "description": tool.description(),
                    "parameters": tool.parameters_schema()
                })
            })
            .collect();
        serde_json::to_string_pretty(&tools).unwrap_or_else(|_| "[]".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SearchSection;
    use crate::remote::MockRecordSource;

    struct Ping;

    #[async_trait]
    impl Tool for Ping {
        fn name(&self) -> &str {
            "ping"
        }

        fn description(&self) -> &str {
            "Reply with pong and the cache size"
        }

        async fn execute(
            &self,
            ctx: &mut ToolContext<'_>,
            _args: Value,
        ) -> Result<Value, AgentError> {
            Ok(serde_json::json!({"pong": ctx.state.cache.len()}))
        }
    }

    #[tokio::test]
    async fn test_execute_and_unknown_tool() {
        let mut registry = ToolRegistry::new();
        registry.register(Ping);
        let engine = SearchEngine::new(Arc::new(MockRecordSource::new()), SearchSection::default());
        let mut state = SessionState::default();
        let mut ctx = ToolContext {
            state: &mut state,
            engine: &engine,
        };

        let out = registry.execute("ping", &mut ctx, Value::Null).await.unwrap();
        assert_eq!(out["pong"], 0);

        let err = registry.execute("book_flight", &mut ctx, Value::Null).await.unwrap_err();
        assert_eq!(err, AgentError::ToolNotFound("book_flight".to_string()));
    }

    #[test]
    fn test_schema_json_lists_tools_in_order() {
        let mut registry = ToolRegistry::new();
        registry.register(Ping);
        registry.register(Ping);
        assert_eq!(registry.tool_names(), vec!["ping".to_string()]);
        let schema = registry.to_schema_json();
        assert!(schema.contains("\"name\": \"ping\""));
        assert!(schema.contains("pong"));
    }

    #[test]
    fn test_parse_args_reports_tool_name() {
        #[derive(serde::Deserialize, Debug)]
        struct Args {
            #[allow(dead_code)]
            city: String,
        }
        let err = parse_args::<Args>("set_city", serde_json::json!({"town": "Pune"})).unwrap_err();
        assert!(matches!(err, AgentError::InvalidArguments { ref tool, .. } if tool == "set_city"));
    }
}
