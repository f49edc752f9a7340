// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, bail};
use serde::Serialize;

use crate::{Category, CategoryId};

pub const DEFAULT_ICON_NAME: &str = "folder";
pub const DEFAULT_COLOR: &str = "#6366f1";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryFormInput {
    pub title: String,
    pub description: Option<String>,
    pub icon_name: String,
    pub color: String,
}

impl CategoryFormInput {
    pub fn blank() -> Self {
        Self {
            title: String::new(),
            description: None,
            icon_name: DEFAULT_ICON_NAME.to_owned(),
            color: DEFAULT_COLOR.to_owned(),
        }
    }

    pub fn from_category(category: &Category) -> Self {
        Self {
            title: category.title.clone(),
            description: category.description.clone(),
            icon_name: category.icon_name.clone(),
            color: category.color.clone(),
        }
    }

    /// Builds an input from raw drawer text. Blank description is stored as absent.
    pub fn from_fields(title: &str, description: &str, icon_name: &str, color: &str) -> Self {
        let description = description.trim();
        Self {
            title: title.trim().to_owned(),
            description: (!description.is_empty()).then(|| description.to_owned()),
            icon_name: icon_name.trim().to_owned(),
            color: color.trim().to_owned(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            bail!("category title is required -- enter a title and retry");
        }
        if self.icon_name.trim().is_empty() {
            bail!("category icon is required -- enter an icon name and retry");
        }
        if self.color.trim().is_empty() {
            bail!("category color is required -- enter a color such as {DEFAULT_COLOR}");
        }
        Ok(())
    }
}

/// What the drawer writes on submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawerMode {
    Create,
    Edit(CategoryId),
}

impl DrawerMode {
    pub const fn title(&self) -> &'static str {
        match self {
            Self::Create => "Add Category",
            Self::Edit(_) => "Edit Category",
        }
    }

    pub const fn is_edit(&self) -> bool {
        matches!(self, Self::Edit(_))
    }
}
