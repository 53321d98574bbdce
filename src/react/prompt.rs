//! System prompt 组装
//!
//! 基础 prompt（config/prompts/system.txt 或内置默认）+ 可用工具 + 调用格式 + 当前会话状态快照。

use crate::core::SessionSnapshot;

/// 未找到 prompt 文件时使用
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are \"CabSwale Sahayak\", a cab booking assistant who speaks Hinglish. \
Ask for the user's city and call set_city, then call find_drivers to fill the driver cache. \
Use filter_drivers to get drivers who have not been shown yet (pass criteria when the user states a preference), \
present up to 5 of them briefly, and call get_driver_contact_info when the user wants to book.";

/// 按顺序查找 prompt 文件，找不到时返回内置默认
pub fn load_system_prompt() -> String {
    ["config/prompts/system.txt", "../config/prompts/system.txt"]
        .into_iter()
        .find_map(|p| std::fs::read_to_string(p).ok())
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string())
}

/// 拼接本次决策使用的完整 system prompt
pub fn build_system_prompt(
    base: &str,
    tools_schema: &str,
    call_format_schema: &str,
    snapshot: &SessionSnapshot,
) -> String {
    format!(
        "{base}\n\n## Available tools\n{tools_schema}\n\n\
         ## Tool call format\n\
         To call tools, output ONLY JSON: one object {{\"tool\": \"name\", \"args\": {{...}}}} \
         or an array of such objects (executed in order). To answer the user, output plain text with no JSON.\n\
         {call_format_schema}\n\n{}",
        snapshot.render()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SessionState;

    #[test]
    fn test_build_includes_all_sections() {
        let mut state = SessionState::default();
        state.set_location("Pune");
        let prompt = build_system_prompt("BASE", "[tools]", "{schema}", &state.snapshot(5));
        assert!(prompt.starts_with("BASE"));
        assert!(prompt.contains("## Available tools\n[tools]"));
        assert!(prompt.contains("{schema}"));
        assert!(prompt.contains("City: Pune"));
        assert!(prompt.contains("Filter Search Attempts: 0/5"));
    }

    #[test]
    fn test_load_system_prompt_is_never_empty() {
        assert!(!load_system_prompt().trim().is_empty());
    }
}
