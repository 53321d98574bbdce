//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `SAHAYAK__*` 覆盖（双下划线表示嵌套，如 `SAHAYAK__SEARCH__MAX_FILTER_DEPTH=3`）。

use std::path::PathBuf;

use serde::Deserialize;

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub app: AppSection,
    pub llm: LlmSection,
    pub api: ApiSection,
    pub search: SearchSection,
    pub agent: AgentSection,
}

/// [app] 段：助手名、对话轮数上限、退出口令
#[derive(Debug, Clone, Deserialize)]
pub struct AppSection {
    #[serde(default = "default_app_name")]
    pub name: String,
    /// 对话历史保留轮数（传给决策模型的 transcript 长度）
    #[serde(default = "default_max_context_turns")]
    pub max_context_turns: usize,
    #[serde(default = "default_quit_phrases")]
    pub quit_phrases: Vec<String>,
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            max_context_turns: default_max_context_turns(),
            quit_phrases: default_quit_phrases(),
        }
    }
}

fn default_app_name() -> String {
    "CabSwale Sahayak".to_string()
}

fn default_max_context_turns() -> usize {
    30
}

fn default_quit_phrases() -> Vec<String> {
    vec!["quit".into(), "exit".into()]
}

/// [llm] 段：后端选择、模型与超时
#[derive(Debug, Clone, Deserialize)]
pub struct LlmSection {
    /// 后端：gemini / openai / deepseek；实际选择还取决于对应的 API Key 是否存在
    #[serde(default = "default_provider")]
    pub provider: String,
    pub model: Option<String>,
    pub base_url: Option<String>,
    #[serde(default)]
    pub temperature: f32,
    #[serde(default)]
    pub timeouts: LlmTimeoutsSection,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: None,
            base_url: None,
            temperature: 0.0,
            timeouts: LlmTimeoutsSection::default(),
        }
    }
}

fn default_provider() -> String {
    "gemini".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmTimeoutsSection {
    #[serde(default = "default_request_timeout")]
    pub request: u64,
}

impl Default for LlmTimeoutsSection {
    fn default() -> Self {
        Self {
            request: default_request_timeout(),
        }
    }
}

fn default_request_timeout() -> u64 {
    60
}

/// [api] 段：远端司机数据接口
#[derive(Debug, Clone, Deserialize)]
pub struct ApiSection {
    #[serde(default = "default_api_base_url")]
    pub base_url: String,
    /// 分页列表接口（按城市）
    #[serde(default = "default_listing_path")]
    pub listing_path: String,
    /// 单个司机详情接口
    #[serde(default = "default_detail_path")]
    pub detail_path: String,
    /// 单次请求超时（秒）
    #[serde(default = "default_api_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiSection {
    fn default() -> Self {
        Self {
            base_url: default_api_base_url(),
            listing_path: default_listing_path(),
            detail_path: default_detail_path(),
            timeout_secs: default_api_timeout_secs(),
        }
    }
}

impl ApiSection {
    pub fn listing_url(&self) -> String {
        join_url(&self.base_url, &self.listing_path)
    }

    pub fn detail_url(&self) -> String {
        join_url(&self.base_url, &self.detail_path)
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

fn default_api_base_url() -> String {
    "https://us-central1-cabswale-ai.cloudfunctions.net".to_string()
}

fn default_listing_path() -> String {
    "/typesense-getPartnersByLocation".to_string()
}

fn default_detail_path() -> String {
    "/partners-getPartnerData".to_string()
}

fn default_api_timeout_secs() -> u64 {
    15
}

/// [search] 段：分页大小、过滤重试深度、详情并发宽度
#[derive(Debug, Clone, Deserialize)]
pub struct SearchSection {
    #[serde(default = "default_page_limit")]
    pub page_limit: usize,
    /// 过滤结果为空时最多自动翻页重试的次数
    #[serde(default = "default_max_filter_depth")]
    pub max_filter_depth: u32,
    #[serde(default = "default_enrich_concurrency")]
    pub enrich_concurrency: usize,
    /// 单次 run_filter 最多返回的司机数
    #[serde(default = "default_present_limit")]
    pub present_limit: usize,
}

impl Default for SearchSection {
    fn default() -> Self {
        Self {
            page_limit: default_page_limit(),
            max_filter_depth: default_max_filter_depth(),
            enrich_concurrency: default_enrich_concurrency(),
            present_limit: default_present_limit(),
        }
    }
}

fn default_page_limit() -> usize {
    10
}

fn default_max_filter_depth() -> u32 {
    5
}

fn default_enrich_concurrency() -> usize {
    10
}

fn default_present_limit() -> usize {
    10
}

/// [agent] 段：单轮内决策-分发循环次数上限（防活锁）
#[derive(Debug, Clone, Deserialize)]
pub struct AgentSection {
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
}

impl Default for AgentSection {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
        }
    }
}

fn default_max_iterations() -> usize {
    20
}

/// 从 config 目录加载配置，环境变量 SAHAYAK__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 最后叠加环境变量 SAHAYAK__*（双下划线表示嵌套键）
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("SAHAYAK")
            .separator("__")
            .try_parsing(true),
    );

    let c = builder.build()?;
    c.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_match_original_search_limits() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.search.page_limit, 10);
        assert_eq!(cfg.search.max_filter_depth, 5);
        assert_eq!(cfg.search.enrich_concurrency, 10);
        assert_eq!(cfg.api.timeout_secs, 15);
        assert_eq!(cfg.agent.max_iterations, 20);
        assert!(cfg.app.quit_phrases.contains(&"quit".to_string()));
    }

    #[test]
    fn test_endpoint_urls_are_joined_once() {
        let api = ApiSection {
            base_url: "http://127.0.0.1:9000/".to_string(),
            listing_path: "/list".to_string(),
            detail_path: "detail".to_string(),
            timeout_secs: 1,
        };
        assert_eq!(api.listing_url(), "http://127.0.0.1:9000/list");
        assert_eq!(api.detail_url(), "http://127.0.0.1:9000/detail");
    }

    #[test]
    fn test_explicit_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[search]\nmax_filter_depth = 2\npresent_limit = 4\n\n[api]\ntimeout_secs = 3"
        )
        .unwrap();

        let cfg = load_config(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(cfg.search.max_filter_depth, 2);
        assert_eq!(cfg.search.present_limit, 4);
        assert_eq!(cfg.search.page_limit, 10);
        assert_eq!(cfg.api.timeout_secs, 3);
    }
}
