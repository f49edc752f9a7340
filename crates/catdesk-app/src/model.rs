// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::ids::CategoryId;

pub const CATEGORIES_COLLECTION: &str = "categories";
pub const CATEGORIES_QUERY: QueryKey = QueryKey::new(CATEGORIES_COLLECTION);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub icon_name: String,
    pub color: String,
    #[serde(default)]
    pub count: Option<i64>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub updated_at: Option<OffsetDateTime>,
}

impl Category {
    /// First character of the icon name, upper-cased. Empty when the icon name is empty.
    pub fn glyph(&self) -> String {
        self.icon_name
            .chars()
            .next()
            .map(|first| first.to_uppercase().collect())
            .unwrap_or_default()
    }

    pub fn description_text(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ListTab {
    #[default]
    List,
    FormBuilder,
}

impl ListTab {
    pub const ALL: [Self; 2] = [Self::List, Self::FormBuilder];

    pub const fn label(self) -> &'static str {
        match self {
            Self::List => "Categories",
            Self::FormBuilder => "Form Builder",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NotifyVariant {
    #[default]
    Default,
    Destructive,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub variant: NotifyVariant,
}

impl Notification {
    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: NotifyVariant::Default,
        }
    }

    pub fn destructive(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: NotifyVariant::Destructive,
        }
    }

    pub fn display(&self) -> String {
        if self.title.is_empty() {
            return self.description.clone();
        }
        if self.description.is_empty() {
            return self.title.clone();
        }
        format!("{}: {}", self.title, self.description)
    }
}

/// Identifies one cached query. Invalidation is matched on the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QueryKey(&'static str);

impl QueryKey {
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub const fn as_str(self) -> &'static str {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CollectionSnapshot {
    pub items: Vec<Category>,
    pub is_loading: bool,
}
