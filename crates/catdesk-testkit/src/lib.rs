// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use catdesk_app::{Category, CategoryFormInput, CategoryId};
use std::path::PathBuf;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

const CATEGORY_TITLES: [&str; 16] = [
    "Tech",
    "Food",
    "Travel",
    "Music",
    "Health",
    "Finance",
    "Sports",
    "Books",
    "Garden",
    "Fashion",
    "Gaming",
    "Pets",
    "Photography",
    "Science",
    "Art",
    "Education",
];

const ICON_NAMES: [&str; 12] = [
    "laptop", "utensils", "plane", "music", "heart", "wallet", "trophy", "book", "leaf", "shirt",
    "gamepad", "camera",
];

const COLORS: [&str; 10] = [
    "#3b82f6", "#ef4444", "#22c55e", "#f59e0b", "#a855f7", "#ec4899", "#14b8a6", "#6366f1",
    "#64748b", "#f97316",
];

const WORDS: [&str; 24] = [
    "gadgets",
    "recipes",
    "guides",
    "reviews",
    "tips",
    "news",
    "stories",
    "events",
    "tutorials",
    "deals",
    "ideas",
    "projects",
    "resources",
    "updates",
    "trends",
    "questions",
    "answers",
    "collections",
    "highlights",
    "picks",
    "favorites",
    "essentials",
    "basics",
    "insights",
];

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }

    fn bool(&mut self) -> bool {
        (self.next_u64() & 1) == 1
    }
}

/// Seeded generator for category rows. Same seed, same sequence.
#[derive(Debug, Clone)]
pub struct CategoryFaker {
    rng: DeterministicRng,
    next_id: u64,
}

impl CategoryFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
            next_id: 1,
        }
    }

    pub fn int_n(&mut self, n: usize) -> usize {
        self.rng.int_n(n)
    }

    pub fn form_input(&mut self) -> CategoryFormInput {
        let title = self.pick(&CATEGORY_TITLES).to_owned();
        let description = self.rng.bool().then(|| self.sentence(2, 5));
        CategoryFormInput {
            title,
            description,
            icon_name: self.pick(&ICON_NAMES).to_owned(),
            color: self.pick(&COLORS).to_owned(),
        }
    }

    /// A full row with a sequential id, as a backend would return it.
    pub fn category(&mut self) -> Category {
        let input = self.form_input();
        let id = CategoryId::new(format!("{:032x}", self.next_id));
        self.next_id += 1;
        Category {
            id,
            title: input.title,
            description: input.description,
            icon_name: input.icon_name,
            color: input.color,
            count: Some(self.rng.int_n(50) as i64),
            created_at: None,
            updated_at: None,
        }
    }

    pub fn categories(&mut self, count: usize) -> Vec<Category> {
        (0..count).map(|_| self.category()).collect()
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[self.rng.int_n(items.len())]
    }

    fn sentence(&mut self, min_words: usize, max_words: usize) -> String {
        let span = max_words.saturating_sub(min_words) + 1;
        let count = min_words + self.rng.int_n(span);
        let mut sentence = (0..count)
            .map(|_| self.pick(&WORDS))
            .collect::<Vec<_>>()
            .join(" ");
        if let Some(first) = sentence.get_mut(0..1) {
            first.make_ascii_uppercase();
        }
        sentence
    }
}

/// Hand-built row for scenario tests.
pub fn category(id: &str, title: &str, description: Option<&str>) -> Category {
    Category {
        id: CategoryId::new(id),
        title: title.to_owned(),
        description: description.map(str::to_owned),
        icon_name: "tag".to_owned(),
        color: "#64748b".to_owned(),
        count: Some(0),
        created_at: None,
        updated_at: None,
    }
}

pub fn temp_db_path() -> Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let db_path = dir.path().join("catdesk.db");
    Ok((dir, db_path))
}

pub fn fixture_datetime() -> &'static str {
    "2026-02-19T12:34:56Z"
}

pub fn parse_fixture_datetime() -> Result<OffsetDateTime> {
    OffsetDateTime::parse(fixture_datetime(), &Rfc3339).context("parse fixture datetime")
}

pub fn category_titles() -> &'static [&'static str] {
    &CATEGORY_TITLES
}
