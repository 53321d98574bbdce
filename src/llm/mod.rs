//! LLM 层：决策模型客户端抽象与实现（OpenAI 兼容 / Gemini / DeepSeek / Mock）

pub mod mock;
pub mod openai;
pub mod traits;

use std::sync::Arc;

pub use mock::{MockLlmClient, ScriptedLlmClient};
pub use openai::OpenAiClient;
pub use traits::LlmClient;

use crate::config::AppConfig;

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai/";
pub const GEMINI_DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEEPSEEK_BASE_URL: &str = "https://api.deepseek.com";
pub const DEEPSEEK_DEFAULT_MODEL: &str = "deepseek-chat";
pub const OPENAI_DEFAULT_MODEL: &str = "gpt-4o-mini";

/// 后端选择结果：(base_url, 默认模型, API Key 环境变量名)
fn provider_profile(provider: &str) -> (Option<&'static str>, &'static str, &'static str) {
    match provider {
        "openai" => (None, OPENAI_DEFAULT_MODEL, "OPENAI_API_KEY"),
        "deepseek" => (Some(DEEPSEEK_BASE_URL), DEEPSEEK_DEFAULT_MODEL, "DEEPSEEK_API_KEY"),
        _ => (Some(GEMINI_BASE_URL), GEMINI_DEFAULT_MODEL, "GOOGLE_API_KEY"),
    }
}

/// 根据配置与环境变量选择决策模型后端；对应 API Key 未设置时退回 Mock
pub fn create_llm_from_config(cfg: &AppConfig) -> Arc<dyn LlmClient> {
    let provider = cfg.llm.provider.to_lowercase();
    let (default_base, default_model, key_var) = provider_profile(&provider);

    let Ok(api_key) = std::env::var(key_var) else {
        tracing::warn!("{} not set, using Mock LLM", key_var);
        return Arc::new(MockLlmClient);
    };

    let model = cfg
        .llm
        .model
        .clone()
        .unwrap_or_else(|| default_model.to_string());
    let base = cfg.llm.base_url.as_deref().or(default_base);
    tracing::info!(provider = %provider, model = %model, "Using LLM");

    Arc::new(
        OpenAiClient::new(base, &model, &api_key)
            .with_temperature(cfg.llm.temperature)
            .with_timeout(cfg.llm.timeouts.request),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_profiles() {
        assert_eq!(provider_profile("openai").2, "OPENAI_API_KEY");
        assert_eq!(provider_profile("deepseek").0, Some(DEEPSEEK_BASE_URL));
        let (base, model, key) = provider_profile("gemini");
        assert_eq!(base, Some(GEMINI_BASE_URL));
        assert_eq!(model, GEMINI_DEFAULT_MODEL);
        assert_eq!(key, "GOOGLE_API_KEY");
    }
}
