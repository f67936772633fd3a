//! Two-tier task categories and their completion-update rules.
//!
//! A category may declare rules that, when a task in that category is
//! completed, write a user-supplied value into the maintenance record of the
//! task's vehicle or plant (next service date, next service mileage and so
//! on). Rules are declarative: the category names the target, the column and
//! the value type, and the completing user supplies the value.

use super::{AssetKind, CategoryId, ParseValueError, TaskDomainError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

const MAX_FIELD_NAME_LEN: usize = 63;
const MAX_TEXT_VALUE_LEN: usize = 500;

/// Maintenance table a completion rule writes into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaintenanceTarget {
    /// Per-vehicle maintenance record.
    VehicleMaintenance,
    /// Per-plant maintenance record.
    PlantMaintenance,
}

impl MaintenanceTarget {
    /// Returns the canonical storage representation (also the table name).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::VehicleMaintenance => "vehicle_maintenance",
            Self::PlantMaintenance => "plant_maintenance",
        }
    }

    /// Returns the asset kind whose records live in this table.
    #[must_use]
    pub const fn asset_kind(self) -> AssetKind {
        match self {
            Self::VehicleMaintenance => AssetKind::Vehicle,
            Self::PlantMaintenance => AssetKind::Plant,
        }
    }
}

impl TryFrom<&str> for MaintenanceTarget {
    type Error = ParseValueError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim() {
            "vehicle_maintenance" => Ok(Self::VehicleMaintenance),
            "plant_maintenance" => Ok(Self::PlantMaintenance),
            _ => Err(ParseValueError {
                kind: "maintenance target",
                value: value.to_owned(),
            }),
        }
    }
}

impl fmt::Display for MaintenanceTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declared type of a completion value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionValueType {
    /// Calendar date, `YYYY-MM-DD`.
    Date,
    /// Odometer reading in miles.
    Mileage,
    /// Whole engine hours.
    Hours,
    /// Free text.
    Text,
}

impl CompletionValueType {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Mileage => "mileage",
            Self::Hours => "hours",
            Self::Text => "text",
        }
    }

    /// Parses a raw user-supplied value.
    ///
    /// Returns `None` when the value does not fit the type.
    #[must_use]
    pub fn parse(self, raw: &str) -> Option<CompletionValue> {
        let trimmed = raw.trim();
        match self {
            Self::Date => NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
                .ok()
                .map(CompletionValue::Date),
            Self::Mileage => parse_whole_number(trimmed).map(CompletionValue::Mileage),
            Self::Hours => parse_whole_number(trimmed).map(CompletionValue::Hours),
            Self::Text => {
                let length = trimmed.chars().count();
                (length > 0 && length <= MAX_TEXT_VALUE_LEN)
                    .then(|| CompletionValue::Text(trimmed.to_owned()))
            }
        }
    }
}

impl TryFrom<&str> for CompletionValueType {
    type Error = ParseValueError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim() {
            "date" => Ok(Self::Date),
            "mileage" => Ok(Self::Mileage),
            "hours" => Ok(Self::Hours),
            "text" => Ok(Self::Text),
            _ => Err(ParseValueError {
                kind: "completion value type",
                value: value.to_owned(),
            }),
        }
    }
}

impl fmt::Display for CompletionValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts digits with `,`, `_` or space grouping, e.g. `12,500`.
fn parse_whole_number(raw: &str) -> Option<u32> {
    let digits: String = raw
        .chars()
        .filter(|ch| !matches!(ch, ',' | '_' | ' '))
        .collect();
    if digits.is_empty() || !digits.chars().all(|ch| ch.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Typed value ready to be written into a maintenance record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum CompletionValue {
    /// Calendar date.
    Date(NaiveDate),
    /// Odometer reading.
    Mileage(u32),
    /// Engine hours.
    Hours(u32),
    /// Free text.
    Text(String),
}

impl fmt::Display for CompletionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            Self::Mileage(miles) => write!(f, "{miles} miles"),
            Self::Hours(hours) => write!(f, "{hours} hours"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

/// Maintenance column name written by a completion rule.
///
/// Restricted to lowercase ASCII identifiers so adapters can use it as a
/// column name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FieldName(String);

impl FieldName {
    /// Creates a validated field name.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidFieldName`] when the value is not a
    /// lowercase identifier starting with a letter, or is longer than 63
    /// characters.
    pub fn new(value: impl Into<String>) -> Result<Self, TaskDomainError> {
        let raw = value.into();
        let mut chars = raw.chars();
        let starts_with_letter = chars.next().is_some_and(|ch| ch.is_ascii_lowercase());
        let rest_valid =
            chars.all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '_');
        if !starts_with_letter || !rest_valid || raw.len() > MAX_FIELD_NAME_LEN {
            return Err(TaskDomainError::InvalidFieldName(raw));
        }
        Ok(Self(raw))
    }

    /// Returns the field name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for FieldName {
    type Error = TaskDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<FieldName> for String {
    fn from(value: FieldName) -> Self {
        value.0
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Declarative rule applied when a task in the owning category completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionUpdateRule {
    /// Table the value is written into.
    pub target: MaintenanceTarget,
    /// Column written.
    pub field: FieldName,
    /// Type the supplied value must parse as.
    pub value_type: CompletionValueType,
    /// Prompt shown to the completing user.
    pub label: String,
}

impl CompletionUpdateRule {
    /// Creates a validated rule.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidFieldName`] for a bad column name and
    /// [`TaskDomainError::EmptyRuleLabel`] for a blank label.
    pub fn new(
        target: MaintenanceTarget,
        field: impl Into<String>,
        value_type: CompletionValueType,
        label: impl Into<String>,
    ) -> Result<Self, TaskDomainError> {
        let label_text = label.into();
        if label_text.trim().is_empty() {
            return Err(TaskDomainError::EmptyRuleLabel);
        }
        Ok(Self {
            target,
            field: FieldName::new(field)?,
            value_type,
            label: label_text.trim().to_owned(),
        })
    }

    /// Validates a raw value against the rule's declared type.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidCompletionValue`] when the value does
    /// not parse as the declared type.
    pub fn validate(&self, raw: &str) -> Result<ValidatedCompletionUpdate, TaskDomainError> {
        let value = self.value_type.parse(raw).ok_or_else(|| {
            TaskDomainError::InvalidCompletionValue {
                field: self.field.to_string(),
                expected: self.value_type,
                value: raw.to_owned(),
            }
        })?;
        Ok(ValidatedCompletionUpdate {
            rule: self.clone(),
            value,
        })
    }
}

/// Rule paired with a value that has passed type validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatedCompletionUpdate {
    /// Rule being applied.
    pub rule: CompletionUpdateRule,
    /// Parsed value.
    pub value: CompletionValue,
}

/// Task category. Top-level categories have no parent; subcategories have a
/// top-level parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    id: CategoryId,
    name: String,
    parent: Option<CategoryId>,
    completion_updates: Vec<CompletionUpdateRule>,
}

impl Category {
    /// Creates a top-level category.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyCategoryName`] for a blank name.
    pub fn top_level(
        name: impl Into<String>,
        completion_updates: Vec<CompletionUpdateRule>,
    ) -> Result<Self, TaskDomainError> {
        Ok(Self {
            id: CategoryId::new(),
            name: validated_name(name)?,
            parent: None,
            completion_updates,
        })
    }

    /// Creates a subcategory under `parent`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyCategoryName`] for a blank name and
    /// [`TaskDomainError::NotTopLevelCategory`] when `parent` is itself a
    /// subcategory.
    pub fn subcategory(
        name: impl Into<String>,
        parent: &Self,
        completion_updates: Vec<CompletionUpdateRule>,
    ) -> Result<Self, TaskDomainError> {
        if !parent.is_top_level() {
            return Err(TaskDomainError::NotTopLevelCategory(parent.id));
        }
        Ok(Self {
            id: CategoryId::new(),
            name: validated_name(name)?,
            parent: Some(parent.id),
            completion_updates,
        })
    }

    /// Reconstructs a category from persisted storage.
    #[must_use]
    pub const fn from_persisted(
        id: CategoryId,
        name: String,
        parent: Option<CategoryId>,
        completion_updates: Vec<CompletionUpdateRule>,
    ) -> Self {
        Self {
            id,
            name,
            parent,
            completion_updates,
        }
    }

    /// Returns the identifier.
    #[must_use]
    pub const fn id(&self) -> CategoryId {
        self.id
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the parent category, if this is a subcategory.
    #[must_use]
    pub const fn parent(&self) -> Option<CategoryId> {
        self.parent
    }

    /// Returns `true` when the category has no parent.
    #[must_use]
    pub const fn is_top_level(&self) -> bool {
        self.parent.is_none()
    }

    /// Returns the declared completion rules.
    #[must_use]
    pub fn completion_updates(&self) -> &[CompletionUpdateRule] {
        &self.completion_updates
    }
}

fn validated_name(name: impl Into<String>) -> Result<String, TaskDomainError> {
    let raw = name.into();
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(TaskDomainError::EmptyCategoryName);
    }
    Ok(trimmed.to_owned())
}

/// Category and optional subcategory assigned to a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CategoryRef {
    /// Top-level category.
    pub category: CategoryId,
    /// Optional subcategory of `category`.
    pub subcategory: Option<CategoryId>,
}

impl CategoryRef {
    /// Validates a category pair and returns the reference.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::NotTopLevelCategory`],
    /// [`TaskDomainError::NotSubcategory`] or
    /// [`TaskDomainError::SubcategoryMismatch`] when the pair does not form a
    /// valid two-tier selection.
    pub fn validate(
        category: &Category,
        subcategory: Option<&Category>,
    ) -> Result<Self, TaskDomainError> {
        if !category.is_top_level() {
            return Err(TaskDomainError::NotTopLevelCategory(category.id()));
        }
        if let Some(sub) = subcategory {
            match sub.parent() {
                None => return Err(TaskDomainError::NotSubcategory(sub.id())),
                Some(parent) if parent != category.id() => {
                    return Err(TaskDomainError::SubcategoryMismatch {
                        category: category.id(),
                        subcategory: sub.id(),
                    });
                }
                Some(_) => {}
            }
        }
        Ok(Self {
            category: category.id(),
            subcategory: subcategory.map(Category::id),
        })
    }
}

/// Returns the completion rules for a task in `category`/`subcategory`.
///
/// Subcategory rules come first. A category rule for the same target and
/// field as a subcategory rule is dropped.
#[must_use]
pub fn resolve_completion_rules(
    category: &Category,
    subcategory: Option<&Category>,
) -> Vec<CompletionUpdateRule> {
    let mut rules: Vec<CompletionUpdateRule> = subcategory
        .map(|sub| sub.completion_updates().to_vec())
        .unwrap_or_default();
    for rule in category.completion_updates() {
        let overridden = rules
            .iter()
            .any(|existing| existing.target == rule.target && existing.field == rule.field);
        if !overridden {
            rules.push(rule.clone());
        }
    }
    rules
}
