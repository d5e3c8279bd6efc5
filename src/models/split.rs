//! Split models
//!
//! A split is one line item of a divided transaction. Input arrives as a
//! [`RawSplit`] whose fields may all be missing; a [`Split`] can only be
//! obtained from one by passing the required-field check, so downstream code
//! never sees unchecked records.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::CategoryId;
use super::money::Money;

/// An untrusted split record as supplied by the caller
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawSplit {
    /// Merchant label
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merchant: Option<String>,

    /// Signed amount (negative for expenses)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Money>,

    /// Category identifier
    #[serde(
        alias = "category_id",
        alias = "category",
        skip_serializing_if = "Option::is_none"
    )]
    pub category_id: Option<CategoryId>,

    /// Free-text note
    #[serde(alias = "note", skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl RawSplit {
    /// Build a raw split with every field present
    pub fn new(
        merchant: impl Into<String>,
        amount: Money,
        category_id: impl Into<CategoryId>,
        notes: Option<&str>,
    ) -> Self {
        Self {
            merchant: Some(merchant.into()),
            amount: Some(amount),
            category_id: Some(category_id.into()),
            notes: notes.map(str::to_string),
        }
    }

    /// List every required field that is absent or blank, in field order
    pub fn missing_fields(&self) -> Vec<SplitField> {
        let mut missing = Vec::new();

        if self.merchant.as_deref().map_or(true, is_blank) {
            missing.push(SplitField::Merchant);
        }
        if self.amount.is_none() {
            missing.push(SplitField::Amount);
        }
        if self.category_id.as_ref().map_or(true, |id| is_blank(id.as_str())) {
            missing.push(SplitField::Category);
        }

        missing
    }

    /// Category identifier, if present and not blank
    pub fn category(&self) -> Option<&CategoryId> {
        self.category_id
            .as_ref()
            .filter(|id| !is_blank(id.as_str()))
    }

    /// Whether the note carries any non-whitespace text
    pub fn has_note(&self) -> bool {
        self.notes.as_deref().is_some_and(|n| !is_blank(n))
    }

    /// Pass the required-field check, or report every missing field
    pub fn into_split(self) -> Result<Split, Vec<SplitField>> {
        let missing = self.missing_fields();
        match (self.merchant, self.amount, self.category_id) {
            (Some(merchant), Some(amount), Some(category_id)) if missing.is_empty() => Ok(Split {
                merchant,
                amount,
                category_id,
                notes: self.notes.filter(|n| !is_blank(n)),
            }),
            _ => Err(missing),
        }
    }
}

fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

/// A required split field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitField {
    Merchant,
    Amount,
    Category,
}

impl fmt::Display for SplitField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Merchant => write!(f, "merchant"),
            Self::Amount => write!(f, "amount"),
            Self::Category => write!(f, "category"),
        }
    }
}

/// A split that has passed the required-field check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Split {
    merchant: String,
    amount: Money,
    category_id: CategoryId,
    #[serde(skip_serializing_if = "Option::is_none")]
    notes: Option<String>,
}

impl Split {
    pub fn merchant(&self) -> &str {
        &self.merchant
    }

    pub fn amount(&self) -> Money {
        self.amount
    }

    pub fn category_id(&self) -> &CategoryId {
        &self.category_id
    }

    /// The note, if it carries any text
    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} [{}]", self.merchant, self.amount, self.category_id)
    }
}
