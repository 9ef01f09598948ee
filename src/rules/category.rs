//! Category derivation from listing text
//!
//! Ordered keyword buckets; the first bucket whose keyword occurs in the
//! lowercased description wins. Each bucket carries the object labels that
//! are implausible for listings of that category.

/// One category bucket: keywords that select it and objects forbidden in it.
#[derive(Debug)]
pub struct CategoryRule {
    pub category: &'static str,
    /// Case-insensitive substring keywords.
    pub keywords: &'static [&'static str],
    pub forbidden_objects: &'static [&'static str],
}

/// Fixed bucket table, checked in priority order.
pub const CATEGORY_RULES: &[CategoryRule] = &[
    CategoryRule {
        category: "мебель",
        keywords: &["стул", "кресло", "стол", "мебель"],
        forbidden_objects: &["person", "car", "animal", "laptop"],
    },
    CategoryRule {
        category: "аудиотехника",
        keywords: &["наушники", "колонка", "плеер", "аудио"],
        forbidden_objects: &["person", "car", "animal", "food"],
    },
    CategoryRule {
        category: "телефоны",
        keywords: &["телефон", "смартфон", "айфон", "самсунг"],
        forbidden_objects: &["person", "car", "animal", "cat", "dog"],
    },
    CategoryRule {
        category: "обувь",
        keywords: &["шлепанцы", "обувь", "ботинки", "кроссовки"],
        forbidden_objects: &["person", "car", "laptop", "book"],
    },
];

/// Category assigned when no bucket matches. Carries no forbidden objects.
pub const DEFAULT_CATEGORY: &str = "другое";

/// Result of the category lookup.
#[derive(Debug, Clone, Copy)]
pub struct CategoryMatch {
    pub category: &'static str,
    pub forbidden_objects: &'static [&'static str],
}

/// Derive the category and its forbidden-object list from description text.
pub fn categorize(text: &str) -> CategoryMatch {
    let text_lower = text.to_lowercase();
    for rule in CATEGORY_RULES {
        if rule.keywords.iter().any(|kw| text_lower.contains(kw)) {
            return CategoryMatch {
                category: rule.category,
                forbidden_objects: rule.forbidden_objects,
            };
        }
    }
    CategoryMatch {
        category: DEFAULT_CATEGORY,
        forbidden_objects: &[],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chair_keyword_maps_to_furniture() {
        let matched = categorize("Продам офисный стул, почти новый");
        assert_eq!(matched.category, "мебель");
        assert!(matched.forbidden_objects.contains(&"person"));
        assert!(matched.forbidden_objects.contains(&"laptop"));
    }

    #[test]
    fn lookup_is_case_insensitive() {
        assert_eq!(categorize("СТУЛ для кухни").category, "мебель");
        assert_eq!(categorize("Новый АЙФОН 15").category, "телефоны");
    }

    #[test]
    fn unmatched_text_falls_back_to_default_with_empty_forbidden_set() {
        let matched = categorize("набор посуды из шести предметов");
        assert_eq!(matched.category, DEFAULT_CATEGORY);
        assert!(matched.forbidden_objects.is_empty());
    }

    #[test]
    fn first_bucket_wins_on_multi_bucket_text() {
        // Matches both мебель ("стол") and телефоны ("телефон"); bucket
        // order decides.
        let matched = categorize("стол с подставкой под телефон");
        assert_eq!(matched.category, "мебель");
    }

    #[test]
    fn every_rule_has_keywords_and_forbidden_objects() {
        for rule in CATEGORY_RULES {
            assert!(!rule.keywords.is_empty());
            assert!(!rule.forbidden_objects.is_empty());
        }
    }
}
