//! get_driver_contact_info：按 id 从缓存取电话；未命中时返回结构化的 not found，而不是错误

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::core::AgentError;
use crate::tools::{parse_args, schema_of, Tool, ToolContext};

#[derive(Debug, Deserialize, JsonSchema)]
struct ContactArgs {
    /// Id of the driver the user wants to book
    #[serde(alias = "driver_id_for_contact")]
    driver_id: String,
}

pub struct GetContactTool;

#[async_trait]
impl Tool for GetContactTool {
    fn name(&self) -> &str {
        "get_driver_contact_info"
    }

    fn description(&self) -> &str {
        "Final step: get the phone number of a driver (by driver_id) once the user confirms they want to book."
    }

    fn parameters_schema(&self) -> Value {
        schema_of::<ContactArgs>()
    }

    async fn execute(&self, ctx: &mut ToolContext<'_>, args: Value) -> Result<Value, AgentError> {
        let args: ContactArgs = parse_args(self.name(), args)?;
        let id = args.driver_id.trim();
        Ok(match ctx.state.cache.get(id) {
            Some(record) => json!({
                "driver_id": id,
                "name": record.display_name(),
                "contact_info": record.phone_no,
            }),
            None => {
                tracing::info!(driver_id = %id, "contact requested for unknown driver");
                json!({
                    "driver_id": id,
                    "error": "Driver not found in cache.",
                })
            }
        })
    }
}
