//! 过滤引擎
//!
//! 所有条件为 AND；未设置（None）的条件不参与判断。
//! - languages：忽略大小写，与档案语言列表中任一项相等即满足
//! - isPetAllowed / married：与档案取值严格相等（档案缺失该值时不满足）

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::records::EnrichedRecord;
use crate::search::RecordCache;

/// 当前生效的过滤条件
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FilterCriteria {
    /// Spoken language the driver must know, e.g. "hindi"
    #[serde(default, alias = "language", skip_serializing_if = "Option::is_none")]
    pub languages: Option<String>,
    /// Whether the driver must allow pets
    #[serde(
        rename = "isPetAllowed",
        alias = "pets_allowed",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub is_pet_allowed: Option<bool>,
    /// Required marital status
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub married: Option<bool>,
}

impl FilterCriteria {
    pub fn is_empty(&self) -> bool {
        self.languages.is_none() && self.is_pet_allowed.is_none() && self.married.is_none()
    }

    /// 规范化：语言去空白并转小写，空字符串视为未设置
    pub fn normalized(mut self) -> Self {
        self.languages = self
            .languages
            .map(|l| l.trim().to_lowercase())
            .filter(|l| !l.is_empty());
        self
    }

    /// 合并：other 中已设置的条件覆盖当前值，未设置的保留
    pub fn merge(&mut self, other: FilterCriteria) {
        if other.languages.is_some() {
            self.languages = other.languages;
        }
        if other.is_pet_allowed.is_some() {
            self.is_pet_allowed = other.is_pet_allowed;
        }
        if other.married.is_some() {
            self.married = other.married;
        }
    }

    pub fn matches(&self, record: &EnrichedRecord) -> bool {
        if let Some(lang) = &self.languages {
            let lang = lang.to_lowercase();
            if !record.languages.iter().any(|l| l.to_lowercase() == lang) {
                return false;
            }
        }
        if let Some(pets) = self.is_pet_allowed {
            if record.is_pet_allowed != Some(pets) {
                return false;
            }
        }
        if let Some(married) = self.married {
            if record.married != Some(married) {
                return false;
            }
        }
        true
    }
}

/// 返回至多 limit 条未展示且满足条件的档案（缓存插入顺序，不排序）
pub fn filter_unseen<'a>(
    cache: &'a RecordCache,
    criteria: &FilterCriteria,
    limit: usize,
) -> Vec<&'a EnrichedRecord> {
    cache
        .unseen()
        .filter(|r| criteria.matches(r))
        .take(limit)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::cache::tests::record;

    fn lang(l: &str) -> FilterCriteria {
        FilterCriteria {
            languages: Some(l.to_string()),
            ..Default::default()
        }
    }

    fn pets(p: bool) -> FilterCriteria {
        FilterCriteria {
            is_pet_allowed: Some(p),
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_criteria_matches_everything() {
        let c = FilterCriteria::default();
        assert!(c.is_empty());
        assert!(c.matches(&record("a", &[], None)));
        assert!(c.matches(&record("b", &["Tamil"], Some(false))));
    }

    #[test]
    fn test_language_is_case_insensitive_membership() {
        let r = record("a", &["Hindi", "Marathi"], None);
        assert!(lang("hindi").matches(&r));
        assert!(lang("MARATHI").matches(&r));
        assert!(!lang("tamil").matches(&r));
        assert!(!lang("hindi").matches(&record("b", &[], None)));
    }

    #[test]
    fn test_categorical_exact_match() {
        assert!(pets(true).matches(&record("a", &[], Some(true))));
        assert!(!pets(true).matches(&record("a", &[], Some(false))));
        assert!(!pets(true).matches(&record("a", &[], None)));
        assert!(pets(false).matches(&record("a", &[], Some(false))));
    }

    #[test]
    fn test_conjunction_equals_independent_matches() {
        let records = [
            record("a", &["Hindi"], Some(true)),
            record("b", &["Hindi"], Some(false)),
            record("c", &["Tamil"], Some(true)),
            record("d", &[], None),
        ];
        let mut both = lang("hindi");
        both.merge(pets(true));
        for r in &records {
            assert_eq!(
                both.matches(r),
                lang("hindi").matches(r) && pets(true).matches(r),
                "record {}",
                r.id()
            );
        }
    }

    #[test]
    fn test_merge_overrides_only_set_fields() {
        let mut active = lang("hindi");
        active.merge(pets(true));
        active.merge(FilterCriteria {
            languages: Some("tamil".into()),
            ..Default::default()
        });
        assert_eq!(active.languages.as_deref(), Some("tamil"));
        assert_eq!(active.is_pet_allowed, Some(true));
    }

    #[test]
    fn test_args_accept_original_aliases() {
        let c: FilterCriteria =
            serde_json::from_value(serde_json::json!({"language": " Hindi ", "pets_allowed": true}))
                .unwrap();
        let c = c.normalized();
        assert_eq!(c.languages.as_deref(), Some("hindi"));
        assert_eq!(c.is_pet_allowed, Some(true));
    }

    #[test]
    fn test_filter_unseen_skips_presented_and_limits() {
        let mut cache = RecordCache::new();
        cache.upsert_many(vec![
            record("a", &["Hindi"], None),
            record("b", &["Hindi"], None),
            record("c", &["Tamil"], None),
            record("d", &["hindi"], None),
        ]);
        cache.mark_presented(["a"]);
        let got: Vec<_> = filter_unseen(&cache, &lang("hindi"), 1)
            .iter()
            .map(|r| r.id())
            .collect();
        assert_eq!(got, vec!["b"]);
        let got: Vec<_> = filter_unseen(&cache, &lang("hindi"), 10)
            .iter()
            .map(|r| r.id())
            .collect();
        assert_eq!(got, vec!["b", "d"]);
    }
}
