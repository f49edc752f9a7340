// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;

use crate::{
    CATEGORIES_COLLECTION, CATEGORIES_QUERY, Category, CategoryFormInput, CategoryId,
    CollectionSnapshot, Notification, QueryKey,
};

pub const DELETE_SUCCESS_MESSAGE: &str = "Category deleted successfully";
pub const DELETE_FALLBACK_MESSAGE: &str = "Failed to delete category";

/// Remote or local data store holding the category collection.
pub trait CategoryStore {
    fn list(&self, collection: &str) -> Result<Vec<Category>>;
    fn create(&self, collection: &str, input: &CategoryFormInput) -> Result<Category>;
    fn update(
        &self,
        collection: &str,
        id: &CategoryId,
        input: &CategoryFormInput,
    ) -> Result<Category>;
    fn delete_by_id(&self, collection: &str, id: &CategoryId) -> Result<()>;
}

/// Cached read of a collection that can be marked stale.
pub trait CollectionProvider {
    fn snapshot(&self) -> CollectionSnapshot;
    fn invalidate(&mut self, key: QueryKey);
}

pub trait Notifier {
    fn notify(&mut self, notification: Notification);
}

/// Editor mounted on the form-builder tab for one category.
pub trait FormBuilderPanel {
    fn render_lines(&self, category_id: &CategoryId) -> Vec<String>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted(CategoryId),
    Failed { id: CategoryId, message: String },
}

impl DeleteOutcome {
    pub fn from_result(id: CategoryId, result: Result<()>) -> Self {
        match result {
            Ok(()) => Self::Deleted(id),
            Err(error) => Self::Failed {
                id,
                message: failure_message(&error)
                    .unwrap_or_else(|| DELETE_FALLBACK_MESSAGE.to_owned()),
            },
        }
    }

    pub fn id(&self) -> &CategoryId {
        match self {
            Self::Deleted(id) | Self::Failed { id, .. } => id,
        }
    }

    pub fn notification(&self) -> Notification {
        match self {
            Self::Deleted(_) => Notification::info("Success", DELETE_SUCCESS_MESSAGE),
            Self::Failed { message, .. } => Notification::destructive("Error", message.clone()),
        }
    }

    pub const fn invalidates(&self) -> bool {
        matches!(self, Self::Deleted(_))
    }
}

/// The failure's context chain joined outermost first, or `None` when no
/// link carries anything printable.
pub fn failure_message(error: &anyhow::Error) -> Option<String> {
    let parts: Vec<String> = error
        .chain()
        .map(|cause| cause.to_string().trim().to_owned())
        .filter(|part| !part.is_empty())
        .collect();
    (!parts.is_empty()).then(|| parts.join(": "))
}

/// Reports a finished delete: notifies, and on success invalidates the category query.
pub fn apply_delete_outcome<C, N>(outcome: &DeleteOutcome, cache: &mut C, notifier: &mut N)
where
    C: CollectionProvider + ?Sized,
    N: Notifier + ?Sized,
{
    match outcome {
        DeleteOutcome::Deleted(id) => {
            tracing::info!(category_id = %id, "category deleted");
        }
        DeleteOutcome::Failed { id, message } => {
            tracing::warn!(category_id = %id, error = %message, "category delete failed");
        }
    }
    notifier.notify(outcome.notification());
    if outcome.invalidates() {
        cache.invalidate(CATEGORIES_QUERY);
    }
}

pub fn delete_category<S, C, N>(
    store: &S,
    cache: &mut C,
    notifier: &mut N,
    id: &CategoryId,
) -> DeleteOutcome
where
    S: CategoryStore + ?Sized,
    C: CollectionProvider + ?Sized,
    N: Notifier + ?Sized,
{
    tracing::debug!(category_id = %id, "deleting category");
    let result = store.delete_by_id(CATEGORIES_COLLECTION, id);
    let outcome = DeleteOutcome::from_result(id.clone(), result);
    apply_delete_outcome(&outcome, cache, notifier);
    outcome
}

/// Completion callback for the create/edit drawer.
pub fn handle_mutation_success<C: CollectionProvider + ?Sized>(cache: &mut C) {
    cache.invalidate(CATEGORIES_QUERY);
}
