// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, anyhow};
use catdesk_app::{
    CATEGORIES_COLLECTION, Category, CategoryFormInput, CategoryId, CategoryStore,
    DeleteOutcome, DrawerMode, FormBuilderPanel,
};
use catdesk_db::Store;
use catdesk_tui::InternalEvent;
use std::sync::mpsc::Sender;
use std::thread;

/// Stand-in editor for the form builder tab until a real one is wired in.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderPanel;

impl FormBuilderPanel for PlaceholderPanel {
    fn render_lines(&self, category_id: &CategoryId) -> Vec<String> {
        vec![
            format!("form builder for category {category_id}"),
            "no form fields configured".to_owned(),
        ]
    }
}

fn save(
    store: &dyn CategoryStore,
    collection: &str,
    mode: &DrawerMode,
    input: &CategoryFormInput,
) -> Result<Category> {
    input.validate()?;
    match mode {
        DrawerMode::Create => store.create(collection, input),
        DrawerMode::Edit(id) => store.update(collection, id, input),
    }
}

pub struct DbRuntime<'a> {
    store: &'a Store,
    panel: PlaceholderPanel,
}

impl<'a> DbRuntime<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self {
            store,
            panel: PlaceholderPanel,
        }
    }
}

impl catdesk_tui::AppRuntime for DbRuntime<'_> {
    fn load_categories(&mut self) -> Result<Vec<Category>> {
        self.store.list(CATEGORIES_COLLECTION)
    }

    fn submit_drawer(&mut self, mode: &DrawerMode, input: &CategoryFormInput) -> Result<Category> {
        save(self.store, CATEGORIES_COLLECTION, mode, input)
    }

    fn delete_category(&mut self, id: &CategoryId) -> Result<()> {
        self.store.delete_by_id(CATEGORIES_COLLECTION, id)
    }

    fn form_builder(&self) -> &dyn FormBuilderPanel {
        &self.panel
    }
}

pub struct RemoteRuntime {
    client: catdesk_remote::Client,
    collection: String,
    panel: PlaceholderPanel,
}

impl RemoteRuntime {
    pub fn new(client: catdesk_remote::Client, collection: &str) -> Self {
        Self {
            client,
            collection: collection.to_owned(),
            panel: PlaceholderPanel,
        }
    }
}

impl catdesk_tui::AppRuntime for RemoteRuntime {
    fn load_categories(&mut self) -> Result<Vec<Category>> {
        self.client.list(&self.collection)
    }

    fn submit_drawer(&mut self, mode: &DrawerMode, input: &CategoryFormInput) -> Result<Category> {
        save(&self.client, &self.collection, mode, input)
    }

    fn delete_category(&mut self, id: &CategoryId) -> Result<()> {
        self.client.delete_by_id(&self.collection, id)
    }

    fn form_builder(&self) -> &dyn FormBuilderPanel {
        &self.panel
    }

    /// Runs the request off the UI thread; the outcome comes back through `tx`.
    fn spawn_delete(
        &mut self,
        request_id: u64,
        id: CategoryId,
        tx: Sender<InternalEvent>,
    ) -> Result<()> {
        let client = self.client.clone();
        let collection = self.collection.clone();
        thread::Builder::new()
            .name(format!("delete-{request_id}"))
            .spawn(move || {
                let result = client.delete_by_id(&collection, &id);
                let outcome = DeleteOutcome::from_result(id, result);
                let _ = tx.send(InternalEvent::DeleteFinished {
                    request_id,
                    outcome,
                });
            })
            .map_err(|error| anyhow!("spawn delete worker: {error}"))?;
        Ok(())
    }
}
