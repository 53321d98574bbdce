//! 列表接口返回的候选司机（premium driver）
//!
//! 只做校验与轻量清洗，不做任何修改；补全详情后被 EnrichedRecord 包裹。

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::records::ValidationError;

/// 已认证车辆摘要
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub reg_no: String,
    pub model: String,
    #[serde(default)]
    pub is_commercial: Option<bool>,
    #[serde(rename = "perKmCost", default)]
    pub per_km_cost: Option<f64>,
    #[serde(rename = "vehicleType")]
    pub vehicle_type: String,
}

/// 候选记录：id、显示名、电话、可选车辆
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(rename = "phoneNo")]
    pub phone_no: String,
    #[serde(default)]
    pub profile_image: Option<String>,
    #[serde(rename = "userName", default)]
    pub user_name: Option<String>,
    #[serde(rename = "verifiedVehicles", default)]
    pub verified_vehicles: Vec<Vehicle>,
}

impl CandidateRecord {
    /// 展示用名称：userName 优先，其次 name，最后 id
    pub fn display_name(&self) -> &str {
        self.user_name
            .as_deref()
            .or(self.name.as_deref())
            .unwrap_or(&self.id)
    }
}

/// 校验单条候选记录；`perKmCost` 为对象时按缺失处理
pub fn parse_candidate(raw: &Value) -> Result<CandidateRecord, ValidationError> {
    let mut raw = raw.clone();
    let obj = raw
        .as_object_mut()
        .ok_or_else(|| ValidationError::InvalidShape("candidate is not an object".to_string()))?;

    if let Some(Value::Array(vehicles)) = obj.get_mut("verifiedVehicles") {
        for vehicle in vehicles.iter_mut() {
            if let Some(v) = vehicle.as_object_mut() {
                if matches!(v.get("perKmCost"), Some(Value::Object(_))) {
                    v.insert("perKmCost".to_string(), Value::Null);
                }
            }
        }
    }

    let record: CandidateRecord = serde_json::from_value(raw)
        .map_err(|e| ValidationError::InvalidShape(format!("candidate: {e}")))?;
    if record.id.trim().is_empty() {
        return Err(ValidationError::MissingField("id"));
    }
    Ok(record)
}

/// 解析列表接口响应：`data` 缺失或不是数组视为空页；逐条校验，非法记录单独丢弃
pub fn parse_candidate_page(response: &Value) -> Vec<CandidateRecord> {
    let Some(items) = response.get("data").and_then(Value::as_array) else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|raw| match parse_candidate(raw) {
            Ok(c) => Some(c),
            Err(e) => {
                tracing::warn!(error = %e, "discarding invalid candidate record");
                None
            }
        })
        .collect()
}
