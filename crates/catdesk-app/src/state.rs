// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{Category, CategoryId, ListTab, Notification};

/// Screen state for the category list. Dropped when the screen exits.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CategoryListState {
    pub search_query: String,
    pub active_tab: ListTab,
    pub selected_category: Option<Category>,
    pub create_drawer_open: bool,
    pub edit_drawer_open: bool,
    pub status_line: Option<Notification>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryCommand {
    SetSearch(String),
    OpenCreateDrawer,
    CloseCreateDrawer,
    SelectForEdit(Category),
    CloseEditDrawer,
    SelectForFormBuilder(Category),
    ReturnToList,
    SwitchTab(ListTab),
    Notify(Notification),
    ClearStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryEvent {
    SearchChanged(String),
    TabChanged(ListTab),
    SelectionChanged(Option<CategoryId>),
    CreateDrawerToggled(bool),
    EditDrawerToggled(bool),
    StatusUpdated(Notification),
    StatusCleared,
}

impl CategoryListState {
    pub fn dispatch(&mut self, command: CategoryCommand) -> Vec<CategoryEvent> {
        match command {
            CategoryCommand::SetSearch(query) => {
                self.search_query = query;
                vec![CategoryEvent::SearchChanged(self.search_query.clone())]
            }
            CategoryCommand::OpenCreateDrawer => {
                self.create_drawer_open = true;
                vec![CategoryEvent::CreateDrawerToggled(true)]
            }
            CategoryCommand::CloseCreateDrawer => {
                self.create_drawer_open = false;
                vec![CategoryEvent::CreateDrawerToggled(false)]
            }
            CategoryCommand::SelectForEdit(category) => {
                let mut events = self.select(Some(category));
                self.edit_drawer_open = true;
                events.push(CategoryEvent::EditDrawerToggled(true));
                events
            }
            CategoryCommand::CloseEditDrawer => {
                self.edit_drawer_open = false;
                let mut events = vec![CategoryEvent::EditDrawerToggled(false)];
                // The form builder tab needs the selection it was opened with.
                if self.active_tab == ListTab::List {
                    events.extend(self.select(None));
                }
                events
            }
            CategoryCommand::SelectForFormBuilder(category) => {
                let mut events = self.select(Some(category));
                events.extend(self.set_tab(ListTab::FormBuilder));
                events
            }
            CategoryCommand::ReturnToList => {
                let mut events = self.set_tab(ListTab::List);
                events.extend(self.select(None));
                events
            }
            CategoryCommand::SwitchTab(ListTab::FormBuilder) if self.selected_category.is_none() => {
                vec![self.set_status(Notification::info(
                    "Form Builder",
                    "select a category first (c on a row)",
                ))]
            }
            CategoryCommand::SwitchTab(tab) => self.set_tab(tab),
            CategoryCommand::Notify(notification) => vec![self.set_status(notification)],
            CategoryCommand::ClearStatus => {
                self.status_line = None;
                vec![CategoryEvent::StatusCleared]
            }
        }
    }

    /// Tabs offered in the header. The form builder is only reachable with a selection.
    pub fn visible_tabs(&self) -> Vec<ListTab> {
        if self.selected_category.is_some() {
            ListTab::ALL.to_vec()
        } else {
            vec![ListTab::List]
        }
    }

    pub fn selected_id(&self) -> Option<&CategoryId> {
        self.selected_category.as_ref().map(|category| &category.id)
    }

    pub fn drawer_open(&self) -> bool {
        self.create_drawer_open || self.edit_drawer_open
    }

    fn select(&mut self, category: Option<Category>) -> Vec<CategoryEvent> {
        let changed = self.selected_id() != category.as_ref().map(|c| &c.id);
        self.selected_category = category;
        if changed {
            vec![CategoryEvent::SelectionChanged(self.selected_id().cloned())]
        } else {
            Vec::new()
        }
    }

    fn set_tab(&mut self, tab: ListTab) -> Vec<CategoryEvent> {
        if self.active_tab == tab {
            return Vec::new();
        }
        self.active_tab = tab;
        vec![CategoryEvent::TabChanged(tab)]
    }

    fn set_status(&mut self, notification: Notification) -> CategoryEvent {
        self.status_line = Some(notification.clone());
        CategoryEvent::StatusUpdated(notification)
    }
}
