//! 对话流程集成测试：脚本化决策模型 + Mock 数据源，走完整的 Conversation

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use cab_sahayak::agent::FAILURE_NOTICE;
    use cab_sahayak::config::AppConfig;
    use cab_sahayak::llm::ScriptedLlmClient;
    use cab_sahayak::memory::{Message, Role};
    use cab_sahayak::remote::MockRecordSource;
    use cab_sahayak::{Conversation, Reply};
    use serde_json::{json, Value};

    fn candidate(id: &str) -> Value {
        json!({
            "id": id,
            "name": format!("Driver {id}"),
            "phoneNo": format!("+91{id}"),
            "verifiedVehicles": [{"reg_no": "MH12AB1234", "model": "Dzire", "vehicleType": "sedan", "perKmCost": {"base": 12}}],
        })
    }

    fn detail(pets: bool) -> Value {
        json!({"isPetAllowed": pets, "languages": ["Hindi", "Marathi"], "married": true, "age": 35})
    }

    /// 第 1 页 10 个司机，其中 p1_3、p1_7 允许宠物；第 2 页 3 个司机，其中 p2_1 允许宠物
    fn pune_source() -> MockRecordSource {
        let mut source = MockRecordSource::new();
        let page1: Vec<Value> = (0..10).map(|i| candidate(&format!("p1_{i}"))).collect();
        source = source.with_page("Pune", 1, page1);
        for i in 0..10 {
            let id = format!("p1_{i}");
            source = source.with_detail(&id, detail(i == 3 || i == 7));
        }
        let page2: Vec<Value> = (0..3).map(|i| candidate(&format!("p2_{i}"))).collect();
        source = source.with_page("Pune", 2, page2);
        for i in 0..3 {
            let id = format!("p2_{i}");
            source = source.with_detail(&id, detail(i == 1));
        }
        source
    }

    fn tool_results<'a>(messages: &'a [Message], tool: &str) -> Vec<Value> {
        messages
            .iter()
            .filter(|m| m.role == Role::Tool && m.tool_name.as_deref() == Some(tool))
            .filter_map(|m| serde_json::from_str(&m.content).ok())
            .collect()
    }

    fn matched_ids(result: &Value) -> Vec<String> {
        result["matched_drivers"]
            .as_array()
            .map(|drivers| {
                drivers
                    .iter()
                    .filter_map(|d| d["id"].as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }

    #[tokio::test]
    async fn test_find_filter_retry_and_contact() {
        let llm = Arc::new(ScriptedLlmClient::new([
            // 第 1 轮：设置城市并拉取第一页
            r#"[{"tool": "set_city", "args": {"city": "Pune"}}, {"tool": "find_drivers", "args": {}}]"#,
            "Pune me drivers mil gaye. Koi preference?",
            // 第 2 轮：宠物过滤
            r#"{"tool": "filter_drivers", "args": {"isPetAllowed": true}}"#,
            "Do drivers mile jo pets allow karte hain.",
            // 第 3 轮：同样条件再过滤，触发自动翻页
            r#"{"tool": "filter_drivers", "args": {"isPetAllowed": true}}"#,
            "Ek aur driver mila.",
            // 第 4 轮：取联系方式
            r#"{"tool": "get_driver_contact_info", "args": {"driver_id": "p1_3"}}"#,
            "Driver Driver p1_3 ka number +91p1_3 hai.",
        ]));
        let source = Arc::new(pune_source());
        let mut conv =
            Conversation::with_components(&AppConfig::default(), llm.clone(), source.clone());

        let reply = conv.handle("Pune se cab chahiye").await;
        assert_eq!(reply, Reply::Say("Pune me drivers mil gaye. Koi preference?".to_string()));
        assert_eq!(conv.state().cache.len(), 10);
        assert_eq!(conv.state().page_cursor, 2);

        conv.handle("pet allowed wala chahiye").await;
        let filters = tool_results(conv.state().transcript.messages(), "filter_drivers");
        let first: HashSet<String> = matched_ids(&filters[0]).into_iter().collect();
        assert_eq!(first, HashSet::from(["p1_3".to_string(), "p1_7".to_string()]));
        assert_eq!(filters[0]["auto_fetches"], 0);
        // 摘要不含电话
        assert!(!filters[0].to_string().contains("+91p1_3"));

        conv.handle("aur dikhao").await;
        let filters = tool_results(conv.state().transcript.messages(), "filter_drivers");
        assert_eq!(matched_ids(&filters[1]), vec!["p2_1".to_string()]);
        assert_eq!(filters[1]["auto_fetches"], 1);
        assert_eq!(filters[1]["filter_search_depth"], 1);
        assert_eq!(
            source.listing_calls(),
            vec![("Pune".to_string(), 1), ("Pune".to_string(), 2)]
        );
        assert_eq!(conv.state().cache.presented_count(), 3);

        conv.handle("p1_3 book karo").await;
        let contact = tool_results(conv.state().transcript.messages(), "get_driver_contact_info");
        assert_eq!(contact[0]["contact_info"], "+91p1_3");
        assert_eq!(llm.remaining(), 0);

        // 最后一次决策前的状态快照
        let prompts = llm.prompts();
        let last = prompts.last().unwrap();
        assert!(last.contains("City: Pune"));
        assert!(last.contains("Total Drivers in Cache: 13"));
    }

    #[tokio::test]
    async fn test_city_change_resets_search_state() {
        let llm = Arc::new(ScriptedLlmClient::new([
            r#"[{"tool": "set_city", "args": {"city": "Pune"}}, {"tool": "find_drivers"}, {"tool": "filter_drivers", "args": {"language": "hindi"}}]"#,
            "Pune ke drivers.",
            r#"{"tool": "find_drivers", "args": {"city": "Mumbai"}}"#,
            "Mumbai me abhi koi driver nahi hai.",
        ]));
        let source = Arc::new(pune_source());
        let mut conv = Conversation::with_components(&AppConfig::default(), llm, source.clone());

        conv.handle("Pune").await;
        assert!(!conv.state().active_filters.is_empty());
        assert_eq!(conv.state().cache.presented_count(), 10);

        conv.handle("nahi, Mumbai").await;
        let state = conv.state();
        assert_eq!(state.location.as_deref(), Some("Mumbai"));
        assert!(state.cache.is_empty());
        assert_eq!(state.cache.presented_count(), 0);
        assert!(state.active_filters.is_empty());
        assert_eq!(state.filter_retry_depth, 0);
        // Mumbai 第 1 页为空：标记耗尽，游标不动
        assert!(state.exhausted);
        assert_eq!(state.page_cursor, 1);
        // transcript 保留
        assert!(state
            .transcript
            .messages()
            .iter()
            .any(|m| m.content == "Pune ke drivers."));
        assert_eq!(source.listing_calls().last(), Some(&("Mumbai".to_string(), 1)));
    }

    #[tokio::test]
    async fn test_unknown_tool_ends_turn_with_notice() {
        let llm = Arc::new(ScriptedLlmClient::new([
            r#"[{"tool": "set_city", "args": {"city": "Pune"}}, {"tool": "book_flight"}]"#,
        ]));
        let mut conv = Conversation::with_components(
            &AppConfig::default(),
            llm,
            Arc::new(MockRecordSource::new()),
        );

        assert_eq!(conv.handle("Pune").await, Reply::Say(FAILURE_NOTICE.to_string()));
        // 整批校验在分发前完成，set_city 没有执行
        assert!(conv.state().location.is_none());
    }

    #[tokio::test]
    async fn test_iteration_ceiling_from_config() {
        let mut cfg = AppConfig::default();
        cfg.agent.max_iterations = 2;
        let llm = Arc::new(ScriptedLlmClient::new(
            std::iter::repeat(r#"{"tool": "clear_filters"}"#).take(5),
        ));
        let mut conv =
            Conversation::with_components(&cfg, llm.clone(), Arc::new(MockRecordSource::new()));

        assert_eq!(conv.handle("loop").await, Reply::Say(FAILURE_NOTICE.to_string()));
        assert_eq!(llm.remaining(), 3);
    }
}
