//! set_city / find_drivers：设置城市与拉取下一页司机

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::core::AgentError;
use crate::tools::{parse_args, schema_of, Tool, ToolContext};

#[derive(Debug, Deserialize, JsonSchema)]
struct SetCityArgs {
    /// City the user wants a cab in
    city: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct FindDriversArgs {
    /// City to search; defaults to the current city
    #[serde(default)]
    city: Option<String>,
}

/// set_city：城市变化时整体重置搜索状态
pub struct SetCityTool;

#[async_trait]
impl Tool for SetCityTool {
    fn name(&self) -> &str {
        "set_city"
    }

    fn description(&self) -> &str {
        "Set or update the user's city. Call this first, and again whenever the user names a different city (this clears previously found drivers and filters)."
    }

    fn parameters_schema(&self) -> Value {
        schema_of::<SetCityArgs>()
    }

    async fn execute(&self, ctx: &mut ToolContext<'_>, args: Value) -> Result<Value, AgentError> {
        let args: SetCityArgs = parse_args(self.name(), args)?;
        let city = args.city.trim();
        if city.is_empty() {
            return Err(AgentError::InvalidArguments {
                tool: self.name().to_string(),
                reason: "city must not be empty".to_string(),
            });
        }
        let reset = ctx.state.set_location(city);
        Ok(json!({
            "city_updated": ctx.state.location,
            "state_reset": reset,
        }))
    }
}

/// find_drivers：拉取下一页司机并补全详情写入缓存（用户此时看不到司机）
pub struct FindDriversTool;

#[async_trait]
impl Tool for FindDriversTool {
    fn name(&self) -> &str {
        "find_drivers"
    }

    fn description(&self) -> &str {
        "Fetch the NEXT page of available drivers for the current city into the local cache. Use after set_city, or when the user wants more drivers and none unseen are left."
    }

    fn parameters_schema(&self) -> Value {
        schema_of::<FindDriversArgs>()
    }

    async fn execute(&self, ctx: &mut ToolContext<'_>, args: Value) -> Result<Value, AgentError> {
        let args: FindDriversArgs = parse_args(self.name(), args)?;
        if let Some(city) = args.city.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
            ctx.state.set_location(city);
        }
        let outcome = ctx.engine.advance_page(ctx.state).await?;
        let mut result = serde_json::to_value(&outcome).unwrap_or_else(|_| json!({}));
        if let Some(obj) = result.as_object_mut() {
            obj.insert("city".to_string(), json!(ctx.state.location));
            obj.insert("cache_size".to_string(), json!(ctx.state.cache.len()));
            obj.insert(
                "unseen_in_cache".to_string(),
                json!(ctx.state.cache.unseen().count()),
            );
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::config::SearchSection;
    use crate::core::SessionState;
    use crate::remote::MockRecordSource;
    use crate::search::SearchEngine;

    fn engine() -> SearchEngine {
        let source = MockRecordSource::new()
            .with_page(
                "Pune",
                1,
                vec![
                    json!({"id": "d1", "phoneNo": "+911"}),
                    json!({"id": "d2", "phoneNo": "+912"}),
                ],
            )
            .with_detail("d1", json!({"age": 30}))
            .with_detail("d2", json!({"age": 40}));
        SearchEngine::new(Arc::new(source), SearchSection::default())
    }

    #[tokio::test]
    async fn test_set_city_then_find_drivers() {
        let engine = engine();
        let mut state = SessionState::default();
        let mut ctx = ToolContext {
            state: &mut state,
            engine: &engine,
        };

        let out = SetCityTool.execute(&mut ctx, json!({"city": " Pune "})).await.unwrap();
        assert_eq!(out["city_updated"], "Pune");
        assert_eq!(out["state_reset"], true);

        let out = FindDriversTool.execute(&mut ctx, json!({"city": "pune"})).await.unwrap();
        assert_eq!(out["status"], "fetched");
        assert_eq!(out["cache_size"], 2);
        assert_eq!(out["unseen_in_cache"], 2);
        assert_eq!(ctx.state.page_cursor, 2);
    }

    #[tokio::test]
    async fn test_find_drivers_without_city_is_error() {
        let engine = engine();
        let mut state = SessionState::default();
        let mut ctx = ToolContext {
            state: &mut state,
            engine: &engine,
        };
        let err = FindDriversTool.execute(&mut ctx, json!({})).await.unwrap_err();
        assert_eq!(err, AgentError::LocationNotSet);
    }

    #[tokio::test]
    async fn test_set_city_rejects_blank() {
        let engine = engine();
        let mut state = SessionState::default();
        let mut ctx = ToolContext {
            state: &mut state,
            engine: &engine,
        };
        let err = SetCityTool.execute(&mut ctx, json!({"city": "  "})).await.unwrap_err();
        assert!(matches!(err, AgentError::InvalidArguments { .. }));
        assert!(ctx.state.location.is_none());
    }
}
