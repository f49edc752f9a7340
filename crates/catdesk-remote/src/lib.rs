// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use catdesk_app::{Category, CategoryFormInput, CategoryId, CategoryStore};
use reqwest::StatusCode;
use reqwest::blocking::{Client as HttpClient, RequestBuilder, Response};
use serde::Deserialize;
use std::time::Duration;
use url::Url;

const REST_PREFIX: &str = "rest/v1/";

/// Blocking client for a PostgREST-style backend.
#[derive(Debug, Clone)]
pub struct Client {
    base_url: Url,
    api_key: Option<String>,
    http: HttpClient,
}

impl Client {
    pub fn new(base_url: &str, api_key: Option<&str>, timeout: Duration) -> Result<Self> {
        let trimmed = base_url.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            bail!("remote.base_url must not be empty");
        }
        let base_url = Url::parse(&format!("{trimmed}/"))
            .with_context(|| format!("parse remote.base_url {trimmed:?}"))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            bail!(
                "remote.base_url {trimmed:?} must use http or https -- e.g. https://project.example.co"
            );
        }

        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("build HTTP client")?;

        Ok(Self {
            base_url,
            api_key: api_key
                .map(str::trim)
                .filter(|key| !key.is_empty())
                .map(str::to_owned),
            http,
        })
    }

    pub fn list_categories(&self, collection: &str) -> Result<Vec<Category>> {
        let url = self.endpoint(collection, &[("select", "*"), ("order", "title.asc")])?;
        let response = self
            .send(self.http.get(url))
            .with_context(|| format!("list {collection}"))?;
        response
            .json::<Vec<Category>>()
            .with_context(|| format!("decode {collection} rows"))
    }

    pub fn create_category(
        &self,
        collection: &str,
        input: &CategoryFormInput,
    ) -> Result<Category> {
        input.validate()?;
        let url = self.endpoint(collection, &[])?;
        let response = self.send(
            self.http
                .post(url)
                .header("Prefer", "return=representation")
                .json(input),
        )?;
        single_row(response, "created")
    }

    pub fn update_category(
        &self,
        collection: &str,
        id: &CategoryId,
        input: &CategoryFormInput,
    ) -> Result<Category> {
        input.validate()?;
        let filter = id_filter(id);
        let url = self.endpoint(collection, &[("id", &filter)])?;
        let response = self.send(
            self.http
                .patch(url)
                .header("Prefer", "return=representation")
                .json(input),
        )?;
        single_row(response, "updated")
            .with_context(|| format!("category {id} not found -- refresh the list and retry"))
    }

    /// Deletes by id. Failures carry the backend's own message, or an empty one.
    pub fn delete_category(&self, collection: &str, id: &CategoryId) -> Result<()> {
        let filter = id_filter(id);
        let url = self.endpoint(collection, &[("id", &filter)])?;
        self.send(self.http.delete(url))?;
        Ok(())
    }

    fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    fn endpoint(&self, collection: &str, query: &[(&str, &str)]) -> Result<Url> {
        if collection.is_empty() || collection.contains(['/', '?', '#']) {
            bail!("invalid collection name {collection:?}");
        }
        let mut url = self
            .base_url
            .join(REST_PREFIX)
            .and_then(|rest| rest.join(collection))
            .with_context(|| format!("build endpoint for {collection}"))?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    fn send(&self, request: RequestBuilder) -> Result<Response> {
        let request = match &self.api_key {
            Some(key) => request.header("apikey", key).bearer_auth(key),
            None => request,
        };
        let response = request
            .send()
            .map_err(|error| connection_error(self.base_url(), error))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(clean_error_response(status, &body));
        }
        Ok(response)
    }
}

impl CategoryStore for Client {
    fn list(&self, collection: &str) -> Result<Vec<Category>> {
        self.list_categories(collection)
    }

    fn create(&self, collection: &str, input: &CategoryFormInput) -> Result<Category> {
        self.create_category(collection, input)
    }

    fn update(
        &self,
        collection: &str,
        id: &CategoryId,
        input: &CategoryFormInput,
    ) -> Result<Category> {
        self.update_category(collection, id, input)
    }

    fn delete_by_id(&self, collection: &str, id: &CategoryId) -> Result<()> {
        self.delete_category(collection, id)
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    message: Option<String>,
}

fn id_filter(id: &CategoryId) -> String {
    format!("eq.{id}")
}

fn single_row(response: Response, verb: &str) -> Result<Category> {
    let mut rows = response
        .json::<Vec<Category>>()
        .with_context(|| format!("decode {verb} category"))?;
    if rows.is_empty() {
        bail!("backend returned no {verb} row");
    }
    Ok(rows.swap_remove(0))
}

fn connection_error(base_url: &str, error: reqwest::Error) -> anyhow::Error {
    tracing::warn!(base_url, error = %error, "remote request failed");
    anyhow!("cannot reach {base_url} -- check remote.base_url and your network ({error})")
}

fn clean_error_response(status: StatusCode, body: &str) -> anyhow::Error {
    tracing::warn!(status = status.as_u16(), "remote returned an error");
    if let Ok(parsed) = serde_json::from_str::<ErrorEnvelope>(body) {
        return anyhow!("{}", parsed.message.unwrap_or_default());
    }

    if body.len() < 100 && !body.contains('{') {
        return anyhow!("{}", body.trim());
    }

    anyhow!("")
}
