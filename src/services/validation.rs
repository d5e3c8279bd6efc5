//! Split allocation validation
//!
//! Checks a proposed list of splits against the required fields, the category
//! cache and the parent transaction total. Validation never fails: every split
//! and every rule is evaluated and the outcome is a [`ValidationReport`]
//! listing blocking issues and non-blocking warnings in a deterministic order
//! (split position, then rule order, with the total mismatch last).
//!
//! The computation is pure. It reads the cache snapshot it is given and
//! performs no I/O; a `None` cache skips the category checks.

use serde::{Serialize, Serializer};
use std::fmt;

use crate::config::Settings;
use crate::models::{CategoryId, GroupType, Money, RawSplit, Split, SplitField};
use crate::services::category::suggest_alternative;
use crate::storage::CategoryCache;

/// Largest accepted gap between the split sum and the expected total
pub const TOLERANCE: Money = Money::from_cents(1);

/// Configurable validation rules
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationRules {
    /// Group types the upstream API refuses for split allocations
    pub restricted_group_types: Vec<GroupType>,
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            restricted_group_types: vec![GroupType::Business],
        }
    }
}

impl ValidationRules {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            restricted_group_types: settings.restricted_group_types.clone(),
        }
    }
}

/// A category named in a suggestion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRef {
    pub id: CategoryId,
    pub name: String,
}

/// A blocking problem: the split list must not be submitted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Issue {
    /// The split list is empty
    NoSplits,
    /// A required field is absent or blank (1-based position)
    MissingField { position: usize, field: SplitField },
    /// The category id is not in the loaded cache
    UnknownCategory {
        position: usize,
        category_id: CategoryId,
    },
    /// The category's group type is rejected upstream
    RestrictedCategory {
        position: usize,
        category_id: CategoryId,
        category_name: String,
        group_type: GroupType,
        alternative: Option<CategoryRef>,
    },
    /// The splits do not reconcile with the expected total
    TotalMismatch {
        sum: Money,
        expected: Money,
        difference: Money,
    },
    /// The split sum or its difference from the total does not fit in cents
    AmountOverflow,
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoSplits => write!(f, "No splits provided"),
            Self::MissingField { position, field } => {
                write!(f, "Split {}: missing {}", position, field)
            }
            Self::UnknownCategory {
                position,
                category_id,
            } => write!(
                f,
                "Split {}: category '{}' not found in category cache",
                position, category_id
            ),
            Self::RestrictedCategory {
                position,
                category_id,
                category_name,
                group_type,
                alternative,
            } => {
                write!(
                    f,
                    "Split {}: category '{}' ({}) is in a {} group, which the API rejects for splits",
                    position, category_name, category_id, group_type
                )?;
                match alternative {
                    Some(alt) => write!(f, "; use '{}' ({}) instead", alt.name, alt.id),
                    None => write!(f, "; choose a category from an unrestricted group"),
                }
            }
            Self::TotalMismatch {
                sum,
                expected,
                difference,
            } => write!(
                f,
                "Splits sum to {} but the transaction total is {} (difference {})",
                sum,
                expected,
                difference.format_signed("$")
            ),
            Self::AmountOverflow => write!(
                f,
                "Split amounts are too large to total; check for a mistyped amount"
            ),
        }
    }
}

/// A non-blocking observation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// Positive amount on what is normally an expense split
    PositiveAmount { position: usize, amount: Money },
    /// Empty or whitespace-only note
    MissingNote { position: usize },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PositiveAmount { position, amount } => write!(
                f,
                "Split {}: amount {} is positive; expense splits are usually negative (ignore for refunds)",
                position, amount
            ),
            Self::MissingNote { position } => write!(
                f,
                "Split {}: no notes; add itemized detail of what was purchased",
                position
            ),
        }
    }
}

/// Outcome of validating a split list
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    valid: bool,
    split_count: usize,
    sum: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    expected_total: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    difference: Option<Money>,
    categories_checked: bool,
    #[serde(serialize_with = "serialize_messages")]
    issues: Vec<Issue>,
    #[serde(serialize_with = "serialize_messages")]
    warnings: Vec<Warning>,
    #[serde(skip)]
    accepted: Vec<Split>,
}

fn serialize_messages<T: fmt::Display, S: Serializer>(
    items: &[T],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(items.iter().map(ToString::to_string))
}

impl ValidationReport {
    /// True iff there are no blocking issues
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn issue_messages(&self) -> Vec<String> {
        self.issues.iter().map(ToString::to_string).collect()
    }

    pub fn warning_messages(&self) -> Vec<String> {
        self.warnings.iter().map(ToString::to_string).collect()
    }

    /// Sum of every split amount that was present
    pub fn sum(&self) -> Money {
        self.sum
    }

    pub fn expected_total(&self) -> Option<Money> {
        self.expected_total
    }

    /// `sum - expected_total`, when a total was supplied
    pub fn difference(&self) -> Option<Money> {
        self.difference
    }

    pub fn split_count(&self) -> usize {
        self.split_count
    }

    /// Whether category existence and type checks ran
    pub fn categories_checked(&self) -> bool {
        self.categories_checked
    }

    /// The validated splits, only when the report is valid
    pub fn into_splits(self) -> Option<Vec<Split>> {
        self.valid.then_some(self.accepted)
    }
}

/// Validates split lists under a set of rules
#[derive(Debug, Clone, Default)]
pub struct SplitValidator {
    rules: ValidationRules,
}

impl SplitValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rules(rules: ValidationRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &ValidationRules {
        &self.rules
    }

    /// Validate `splits` against the optional total and cache snapshot
    pub fn validate(
        &self,
        splits: &[RawSplit],
        expected_total: Option<Money>,
        categories: Option<&CategoryCache>,
    ) -> ValidationReport {
        let mut issues = Vec::new();
        let mut warnings = Vec::new();
        let mut accepted = Vec::with_capacity(splits.len());

        if splits.is_empty() {
            issues.push(Issue::NoSplits);
        }

        for (index, raw) in splits.iter().enumerate() {
            let position = index + 1;

            for field in raw.missing_fields() {
                issues.push(Issue::MissingField { position, field });
            }

            if let Some(amount) = raw.amount.filter(Money::is_positive) {
                warnings.push(Warning::PositiveAmount { position, amount });
            }

            if let (Some(cache), Some(category_id)) = (categories, raw.category()) {
                self.check_category(cache, position, category_id, &mut issues);
            }

            if !raw.has_note() {
                warnings.push(Warning::MissingNote { position });
            }

            if let Ok(split) = raw.clone().into_split() {
                accepted.push(split);
            }
        }

        // Integer cents, so no rounding happens until display
        let total = splits
            .iter()
            .filter_map(|s| s.amount)
            .try_fold(Money::zero(), Money::checked_add);
        let sum = total.unwrap_or_default();
        let difference = match (total, expected_total) {
            (Some(sum), Some(expected)) => sum.checked_sub(expected),
            _ => None,
        };

        match (total, expected_total, difference) {
            (None, _, _) | (Some(_), Some(_), None) => issues.push(Issue::AmountOverflow),
            (Some(_), Some(expected), Some(difference))
                if difference.cents().unsigned_abs() > TOLERANCE.cents().unsigned_abs() =>
            {
                issues.push(Issue::TotalMismatch {
                    sum,
                    expected,
                    difference,
                });
            }
            _ => {}
        }

        ValidationReport {
            valid: issues.is_empty(),
            split_count: splits.len(),
            sum,
            expected_total,
            difference,
            categories_checked: categories.is_some(),
            issues,
            warnings,
            accepted,
        }
    }

    fn check_category(
        &self,
        cache: &CategoryCache,
        position: usize,
        category_id: &CategoryId,
        issues: &mut Vec<Issue>,
    ) {
        let restricted = &self.rules.restricted_group_types;

        match cache.lookup(category_id.as_str()) {
            None => issues.push(Issue::UnknownCategory {
                position,
                category_id: category_id.clone(),
            }),
            Some(category) if category.has_group_type_in(restricted) => {
                let alternative =
                    suggest_alternative(cache, category, restricted).map(|alt| CategoryRef {
                        id: alt.id.clone(),
                        name: alt.name.clone(),
                    });

                issues.push(Issue::RestrictedCategory {
                    position,
                    category_id: category.id.clone(),
                    category_name: category.name.clone(),
                    group_type: category.group_type,
                    alternative,
                });
            }
            Some(_) => {}
        }
    }
}

/// Validate with the default rules
pub fn validate(
    splits: &[RawSplit],
    expected_total: Option<Money>,
    categories: Option<&CategoryCache>,
) -> ValidationReport {
    SplitValidator::new().validate(splits, expected_total, categories)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;
    use chrono::Utc;

    fn cents(c: i64) -> Money {
        Money::from_cents(c)
    }

    fn split(amount: i64, category: &str) -> RawSplit {
        RawSplit::new("Costco", cents(amount), category, Some("itemized"))
    }

    fn cache() -> CategoryCache {
        CategoryCache::from_categories(
            vec![
                Category::new("catX", "Groceries", "g1", "Food & Dining", GroupType::Expense),
                Category::new("catY", "Household", "g2", "Shopping", GroupType::Expense),
                Category::new("catB", "Office Supplies", "g3", "Business", GroupType::Business),
                Category::new("catO", "Office Supplies", "g2", "Shopping", GroupType::Expense),
                Category::new("catS", "Software", "g3", "Business", GroupType::Business),
            ],
            "test",
            Utc::now(),
        )
    }

    fn large_cache(n: usize) -> CategoryCache {
        let categories = (0..n).map(|i| {
            Category::new(
                format!("cat_{i}"),
                format!("Category {i}"),
                format!("grp_{}", i % 8),
                format!("Group {}", i % 8),
                GroupType::Expense,
            )
        });
        CategoryCache::from_categories(categories, "test", Utc::now())
    }

    #[test]
    fn test_scenario_a_exact_total() {
        let cache = cache();
        let report = validate(
            &[split(-2078, "catX"), split(-2013, "catY")],
            Some(cents(-4091)),
            Some(&cache),
        );

        assert!(report.is_valid());
        assert_eq!(report.sum(), cents(-4091));
        assert_eq!(report.difference(), Some(Money::zero()));
        assert!(report.warnings().is_empty());
    }

    #[test]
    fn test_scenario_b_one_cent_passes() {
        let cache = cache();
        let report = validate(
            &[split(-2078, "catX"), split(-2012, "catY")],
            Some(cents(-4091)),
            Some(&cache),
        );

        assert!(report.is_valid());
        assert_eq!(report.sum(), cents(-4090));
        assert_eq!(report.difference(), Some(cents(1)));
    }

    #[test]
    fn test_two_cents_fails() {
        let report = validate(
            &[split(-2078, "catX"), split(-2011, "catY")],
            Some(cents(-4091)),
            None,
        );

        assert!(!report.is_valid());
        assert_eq!(
            report.issues(),
            &[Issue::TotalMismatch {
                sum: cents(-4089),
                expected: cents(-4091),
                difference: cents(2),
            }]
        );
        assert_eq!(
            report.issue_messages()[0],
            "Splits sum to -$40.89 but the transaction total is -$40.91 (difference +$0.02)"
        );
    }

    #[test]
    fn test_tolerance_boundary_is_symmetric() {
        let under = validate(&[split(-4092, "catX")], Some(cents(-4091)), None);
        assert!(under.is_valid());
        assert_eq!(under.difference(), Some(cents(-1)));

        let far_under = validate(&[split(-4093, "catX")], Some(cents(-4091)), None);
        assert!(!far_under.is_valid());
    }

    #[test]
    fn test_sum_is_exact_for_many_small_amounts() {
        // 0.1 added ten times drifts in f64; cents do not
        let splits: Vec<_> = (0..10).map(|_| split(-10, "catX")).collect();
        let report = validate(&splits, Some(cents(-100)), None);
        assert!(report.is_valid());
        assert_eq!(report.sum(), cents(-100));
    }

    #[test]
    fn test_oversized_amounts_are_a_blocking_issue() {
        let splits = crate::services::parse_splits(
            r#"[
                {"merchant": "A", "amount": "90000000000000000", "categoryId": "catX", "notes": "x"},
                {"merchant": "B", "amount": "90000000000000000", "categoryId": "catY", "notes": "y"}
            ]"#,
            crate::services::SplitFormat::Json,
        )
        .unwrap();

        let report = validate(&splits, None, None);
        assert!(!report.is_valid());
        assert_eq!(report.issues(), &[Issue::AmountOverflow]);
        assert!(serde_json::to_string(&report).is_ok());
    }

    #[test]
    fn test_difference_overflow_is_a_blocking_issue() {
        let report = validate(
            &[split(i64::MAX - 5, "catX")],
            Some(cents(-100)),
            None,
        );
        assert_eq!(report.issues(), &[Issue::AmountOverflow]);
        assert_eq!(report.difference(), None);
    }

    #[test]
    fn test_no_expected_total_only_reports_sum() {
        let report = validate(&[split(-500, "catX"), split(-250, "catY")], None, None);
        assert!(report.is_valid());
        assert_eq!(report.sum(), cents(-750));
        assert_eq!(report.difference(), None);
    }

    #[test]
    fn test_missing_merchant_and_category_are_two_issues() {
        let raw = RawSplit {
            amount: Some(cents(-500)),
            notes: Some("x".into()),
            ..RawSplit::default()
        };
        let report = validate(&[raw], None, None);

        assert_eq!(
            report.issues(),
            &[
                Issue::MissingField {
                    position: 1,
                    field: SplitField::Merchant
                },
                Issue::MissingField {
                    position: 1,
                    field: SplitField::Category
                },
            ]
        );
    }

    #[test]
    fn test_missing_amount_contributes_nothing() {
        let mut raw = split(0, "catX");
        raw.amount = None;
        let report = validate(&[raw, split(-300, "catY")], Some(cents(-300)), None);

        assert_eq!(report.sum(), cents(-300));
        assert_eq!(
            report.issue_messages(),
            vec!["Split 1: missing amount".to_string()]
        );
    }

    #[test]
    fn test_restricted_category_always_blocks() {
        let cache = cache();
        let report = validate(&[split(-999, "catB")], Some(cents(-999)), Some(&cache));

        assert!(!report.is_valid());
        assert_eq!(report.issues().len(), 1);
        match &report.issues()[0] {
            Issue::RestrictedCategory {
                position,
                group_type,
                alternative,
                ..
            } => {
                assert_eq!(*position, 1);
                assert_eq!(*group_type, GroupType::Business);
                assert_eq!(alternative.as_ref().unwrap().id.as_str(), "catO");
            }
            other => panic!("unexpected issue {other:?}"),
        }
        assert!(report.issue_messages()[0].ends_with("use 'Office Supplies' (catO) instead"));
    }

    #[test]
    fn test_restricted_category_blocks_alongside_missing_fields() {
        let cache = cache();
        let raw = RawSplit {
            merchant: Some("  ".into()),
            category_id: Some("catB".into()),
            notes: Some("pens".into()),
            ..RawSplit::default()
        };
        let report = validate(&[raw], None, Some(&cache));

        assert!(!report.is_valid());
        let issues = report.issues();
        assert_eq!(issues.len(), 3);
        assert_eq!(
            issues[..2],
            [
                Issue::MissingField {
                    position: 1,
                    field: SplitField::Merchant
                },
                Issue::MissingField {
                    position: 1,
                    field: SplitField::Amount
                },
            ]
        );
        assert!(matches!(
            &issues[2],
            Issue::RestrictedCategory { position: 1, group_type: GroupType::Business, .. }
        ));
    }

    #[test]
    fn test_restricted_category_without_alternative() {
        let cache = cache();
        let report = validate(&[split(-999, "catS")], None, Some(&cache));
        assert!(report.issue_messages()[0]
            .ends_with("choose a category from an unrestricted group"));
    }

    #[test]
    fn test_custom_restricted_types() {
        let cache = cache();
        let validator = SplitValidator::with_rules(ValidationRules {
            restricted_group_types: vec![GroupType::Expense],
        });

        let report = validator.validate(&[split(-100, "catB")], None, Some(&cache));
        assert!(report.is_valid());

        let report = validator.validate(&[split(-100, "catX")], None, Some(&cache));
        assert!(!report.is_valid());
    }

    #[test]
    fn test_unknown_category_absent_vs_loaded_cache() {
        let splits = [split(-100, "cat_missing")];

        let degraded = validate(&splits, None, None);
        assert!(degraded.is_valid());
        assert!(!degraded.categories_checked());

        let cache = cache();
        let checked = validate(&splits, None, Some(&cache));
        assert_eq!(
            checked.issues(),
            &[Issue::UnknownCategory {
                position: 1,
                category_id: CategoryId::from("cat_missing"),
            }]
        );
    }

    #[test]
    fn test_scenario_c_unknown_in_large_cache() {
        let cache = large_cache(80);
        assert_eq!(cache.len(), 80);

        let report = validate(
            &[split(-100, "cat_3"), split(-200, "cat_999")],
            Some(cents(-300)),
            Some(&cache),
        );

        assert_eq!(report.issues().len(), 1);
        assert!(report.issue_messages()[0].contains("'cat_999'"));
        assert!(report.issue_messages()[0].starts_with("Split 2:"));
    }

    #[test]
    fn test_scenario_d_empty_note_is_single_warning() {
        let cache = cache();
        let raw = RawSplit::new("Target", cents(-1500), "catY", Some(""));
        let report = validate(&[raw], Some(cents(-1500)), Some(&cache));

        assert!(report.is_valid());
        assert_eq!(report.warnings(), &[Warning::MissingNote { position: 1 }]);
    }

    #[test]
    fn test_positive_amount_is_warning_only() {
        let report = validate(&[split(1250, "catX")], Some(cents(1250)), None);

        assert!(report.is_valid());
        assert_eq!(
            report.warnings(),
            &[Warning::PositiveAmount {
                position: 1,
                amount: cents(1250)
            }]
        );
    }

    #[test]
    fn test_empty_split_list_blocks() {
        let report = validate(&[], None, None);
        assert_eq!(report.issues(), &[Issue::NoSplits]);
        assert_eq!(report.sum(), Money::zero());
    }

    #[test]
    fn test_issue_ordering() {
        let cache = cache();
        let splits = vec![
            RawSplit {
                amount: Some(cents(-100)),
                category_id: Some("nope".into()),
                ..RawSplit::default()
            },
            split(-200, "catB"),
            RawSplit::default(),
        ];
        let report = validate(&splits, Some(cents(-1)), Some(&cache));

        let messages = report.issue_messages();
        assert_eq!(messages.len(), 7);
        assert_eq!(messages[0], "Split 1: missing merchant");
        assert!(messages[1].starts_with("Split 1: category 'nope'"));
        assert!(messages[2].starts_with("Split 2: category 'Office Supplies'"));
        assert_eq!(messages[3], "Split 3: missing merchant");
        assert_eq!(messages[4], "Split 3: missing amount");
        assert_eq!(messages[5], "Split 3: missing category");
        assert!(messages[6].starts_with("Splits sum to"));

        let warnings = report.warning_messages();
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].starts_with("Split 1:"));
        assert!(warnings[1].starts_with("Split 3:"));
    }

    #[test]
    fn test_deterministic_output() {
        let cache = cache();
        let splits = vec![
            split(-100, "catB"),
            RawSplit::default(),
            split(50, "unknown"),
        ];

        let first = validate(&splits, Some(cents(-10)), Some(&cache));
        let second = validate(&splits, Some(cents(-10)), Some(&cache));

        assert_eq!(first.issue_messages(), second.issue_messages());
        assert_eq!(first.warning_messages(), second.warning_messages());
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_into_splits_only_when_valid() {
        let report = validate(&[split(-100, "catX")], Some(cents(-100)), None);
        let splits = report.into_splits().unwrap();
        assert_eq!(splits[0].merchant(), "Costco");

        let report = validate(&[split(-100, "catX")], Some(cents(-500)), None);
        assert!(report.into_splits().is_none());
    }

    #[test]
    fn test_report_json() {
        let report = validate(&[split(-2078, "catX")], Some(cents(-2078)), None);
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["valid"], true);
        assert_eq!(json["sum"], -20.78);
        assert_eq!(json["difference"], 0.0);
        assert_eq!(json["issues"], serde_json::json!([]));
        assert_eq!(json["categories_checked"], false);
    }
}
