//! 补全后的司机档案：候选记录 + 详情接口字段
//!
//! 合并规则：详情缺失 phoneNo / userName 时回退到候选记录；带默认值的字段为 null 时取默认值。
//! 合并结果整体再做一次结构校验，失败则返回 ValidationError，由调用方丢弃该记录。

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::records::{CandidateRecord, ValidationError};

/// 简介：字符串或多段文本
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Bio {
    Text(String),
    Lines(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedRecord {
    pub existing_info: CandidateRecord,
    pub age: Option<u32>,
    pub connections: u32,
    pub bio: Option<Bio>,
    pub experience: u32,
    pub is_pet_allowed: Option<bool>,
    pub languages: Vec<String>,
    pub married: Option<bool>,
    pub phone_no: String,
    pub routes: Vec<HashMap<String, String>>,
    pub trip_types: Vec<String>,
    pub user_name: Option<String>,
    pub training_content: Vec<HashMap<String, String>>,
    pub vehicle_ownership: Vec<bool>,
    pub verified_languages: Vec<Value>,
    pub onboarded_at: Option<String>,
}

impl EnrichedRecord {
    /// 身份与候选记录一致
    pub fn id(&self) -> &str {
        &self.existing_info.id
    }

    pub fn display_name(&self) -> &str {
        self.user_name
            .as_deref()
            .unwrap_or_else(|| self.existing_info.display_name())
    }

    /// 展示给决策模型的摘要视图，不含电话号码（电话仅通过 get_driver_contact_info 提供）
    pub fn summary(&self) -> Value {
        let vehicles: Vec<Value> = self
            .existing_info
            .verified_vehicles
            .iter()
            .map(|v| {
                serde_json::json!({
                    "model": v.model,
                    "vehicleType": v.vehicle_type,
                    "perKmCost": v.per_km_cost,
                })
            })
            .collect();
        serde_json::json!({
            "id": self.id(),
            "name": self.display_name(),
            "age": self.age,
            "experience": self.experience,
            "connections": self.connections,
            "languages": self.languages,
            "isPetAllowed": self.is_pet_allowed,
            "married": self.married,
            "bio": self.bio,
            "tripTypes": self.trip_types,
            "routes": self.routes,
            "vehicles": vehicles,
            "onboardedAt": self.onboarded_at,
        })
    }
}

/// 从详情接口响应中取出详情对象：列表取第一个；缺失、null、空对象、空列表都视为无详情
pub fn extract_detail(response: &Value) -> Option<&Map<String, Value>> {
    let data = response.get("data")?;
    let detail = match data {
        Value::Array(items) => items.first()?,
        other => other,
    };
    detail.as_object().filter(|m| !m.is_empty())
}

fn field_or(detail: &Map<String, Value>, key: &str, default: Value) -> Value {
    match detail.get(key) {
        Some(Value::Null) | None => default,
        Some(v) => v.clone(),
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<Value> {
    value
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(|s| Value::String(s.to_string()))
}

/// 合并候选记录与详情，返回校验后的档案
pub fn merge_detail(
    candidate: &CandidateRecord,
    detail: &Map<String, Value>,
) -> Result<EnrichedRecord, ValidationError> {
    let existing_info = serde_json::to_value(candidate)
        .map_err(|e| ValidationError::InvalidShape(e.to_string()))?;

    let phone_no = non_empty_str(detail.get("phoneNo"))
        .unwrap_or_else(|| Value::String(candidate.phone_no.clone()));
    let user_name = non_empty_str(detail.get("userName")).unwrap_or_else(|| {
        candidate
            .user_name
            .clone()
            .map(Value::String)
            .unwrap_or(Value::Null)
    });

    let empty = || Value::Array(Vec::new());
    let combined = serde_json::json!({
        "existingInfo": existing_info,
        "age": field_or(detail, "age", Value::Null),
        "connections": field_or(detail, "connections", Value::from(0)),
        "bio": field_or(detail, "bio", Value::Null),
        "experience": field_or(detail, "experience", Value::from(0)),
        "isPetAllowed": field_or(detail, "isPetAllowed", Value::Null),
        "languages": field_or(detail, "languages", empty()),
        "married": field_or(detail, "married", Value::Null),
        "phoneNo": phone_no,
        "routes": field_or(detail, "routes", empty()),
        "tripTypes": field_or(detail, "tripTypes", empty()),
        "userName": user_name,
        "trainingContent": field_or(detail, "trainingContent", empty()),
        "vehicleOwnership": field_or(detail, "vehicleOwnership", empty()),
        "verifiedLanguages": field_or(detail, "verifiedLanguages", empty()),
        "onboardedAt": field_or(detail, "onboardedAt", Value::Null),
    });

    let record: EnrichedRecord = serde_json::from_value(combined)
        .map_err(|e| ValidationError::InvalidShape(format!("{}: {e}", candidate.id)))?;
    if record.id() != candidate.id {
        return Err(ValidationError::IdentityMismatch);
    }
    Ok(record)
}
