//! Tool catalog: the SaaS products a visitor can pick, grouped by category.
//!
//! The catalog is loaded from `assets/catalog.toml` at startup; when the file
//! is missing or invalid the built-in list is used instead.  It feeds the
//! field in three ways: [`Catalog::filter`] narrows the candidates for a
//! search query, [`Catalog::defaults`] names the priority subset that is
//! always seeded first, and [`Catalog::estimate_savings`] prices a selection.
//!
//! ```toml
//! defaults = ["Slack", "Zoom"]
//!
//! [[tools]]
//! identity = "Slack"
//! category = "Communication"
//! price = 8.75
//! image = "icons/slack.png"
//! alternative = "Mattermost"
//! ```

use crate::error::{FieldError, FieldResult};
use bevy::prelude::*;
use serde::Deserialize;
use std::collections::HashSet;

/// One selectable tool.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CatalogEntry {
    pub identity: String,
    #[serde(default, rename = "image")]
    pub image_ref: Option<String>,
    /// Monthly price per seat.
    #[serde(default)]
    pub price: Option<f32>,
    #[serde(default)]
    pub category: String,
    /// Open-source replacement suggested for this tool.
    #[serde(default)]
    pub alternative: Option<String>,
}

impl CatalogEntry {
    pub fn new(identity: impl Into<String>, category: impl Into<String>, price: f32) -> Self {
        Self {
            identity: identity.into(),
            image_ref: None,
            price: Some(price),
            category: category.into(),
            alternative: None,
        }
    }

    fn with_alternative(mut self, alternative: &str) -> Self {
        self.alternative = Some(alternative.to_string());
        self
    }
}

/// Monthly and annual savings for a selection.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SavingsEstimate {
    pub monthly: f32,
    pub annual: f32,
    /// Selected tools that carried a price.
    pub priced_tools: usize,
}

/// Ordered tool list plus the default-selected identities.
#[derive(Resource, Debug, Clone, PartialEq, Deserialize)]
pub struct Catalog {
    #[serde(rename = "tools")]
    entries: Vec<CatalogEntry>,
    #[serde(default)]
    defaults: Vec<String>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Catalog {
    /// Build and validate a catalog.
    pub fn new(entries: Vec<CatalogEntry>, defaults: Vec<String>) -> FieldResult<Self> {
        let catalog = Self { entries, defaults };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Parse and validate TOML catalog text.
    pub fn from_toml_str(contents: &str) -> FieldResult<Self> {
        let catalog: Catalog = toml::from_str(contents).map_err(FieldError::CatalogParse)?;
        catalog.validate()?;
        Ok(catalog)
    }

    fn validate(&self) -> FieldResult<()> {
        let mut seen = HashSet::new();
        for entry in &self.entries {
            if !seen.insert(entry.identity.as_str()) {
                return Err(FieldError::DuplicateIdentity {
                    identity: entry.identity.clone(),
                });
            }
            if let Some(price) = entry.price {
                if !(price >= 0.0) {
                    return Err(FieldError::NegativePrice {
                        identity: entry.identity.clone(),
                        price,
                    });
                }
            }
        }
        Ok(())
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, identity: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.identity == identity)
    }

    /// Default identities that actually exist in the catalog.
    pub fn defaults(&self) -> Vec<String> {
        self.defaults
            .iter()
            .filter(|d| self.get(d).is_some())
            .cloned()
            .collect()
    }

    /// Entries whose identity or category contains `query`, ignoring case.
    /// A blank query matches everything.  Catalog order is preserved.
    pub fn filter(&self, query: &str) -> Vec<CatalogEntry> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return self.entries.clone();
        }
        self.entries
            .iter()
            .filter(|e| {
                e.identity.to_lowercase().contains(&needle)
                    || e.category.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect()
    }

    /// Entries grouped by category, groups in first-appearance order.
    pub fn by_category(&self) -> Vec<(&str, Vec<&CatalogEntry>)> {
        let mut groups: Vec<(&str, Vec<&CatalogEntry>)> = Vec::new();
        for entry in &self.entries {
            match groups.iter_mut().find(|(c, _)| *c == entry.category) {
                Some((_, members)) => members.push(entry),
                None => groups.push((entry.category.as_str(), vec![entry])),
            }
        }
        groups
    }

    /// `(tool, alternative)` pairs for the selected tools that name one,
    /// grouped by category.  Groups and tools keep catalog order; categories
    /// with nothing to suggest are left out.
    pub fn alternatives<'a, I>(&self, selected: I) -> Vec<(&str, Vec<(&str, &str)>)>
    where
        I: IntoIterator<Item = &'a String>,
    {
        let selected: HashSet<&str> = selected.into_iter().map(String::as_str).collect();
        self.by_category()
            .into_iter()
            .filter_map(|(category, members)| {
                let swaps: Vec<(&str, &str)> = members
                    .into_iter()
                    .filter(|e| selected.contains(e.identity.as_str()))
                    .filter_map(|e| Some((e.identity.as_str(), e.alternative.as_deref()?)))
                    .collect();
                (!swaps.is_empty()).then_some((category, swaps))
            })
            .collect()
    }

    /// Savings from replacing every selected, priced tool for `headcount` seats.
    /// Unknown identities are ignored.
    pub fn estimate_savings<'a, I>(&self, selected: I, headcount: u32) -> SavingsEstimate
    where
        I: IntoIterator<Item = &'a String>,
    {
        let selected: HashSet<&str> = selected.into_iter().map(String::as_str).collect();
        let mut estimate = SavingsEstimate::default();
        for entry in &self.entries {
            if !selected.contains(entry.identity.as_str()) {
                continue;
            }
            if let Some(price) = entry.price {
                estimate.monthly += price * headcount as f32;
                estimate.priced_tools += 1;
            }
        }
        estimate.annual = estimate.monthly * 12.0;
        estimate
    }

    /// The catalog used when `assets/catalog.toml` is unavailable.
    pub fn builtin() -> Self {
        let entries = vec![
            CatalogEntry::new("Slack", "Communication", 8.75).with_alternative("Mattermost"),
            CatalogEntry::new("Microsoft Teams", "Communication", 4.0)
                .with_alternative("Rocket.Chat"),
            CatalogEntry::new("Zoom", "Communication", 13.33).with_alternative("Jitsi Meet"),
            CatalogEntry::new("Google Workspace", "Productivity", 12.0)
                .with_alternative("Nextcloud"),
            CatalogEntry::new("Microsoft 365", "Productivity", 12.5)
                .with_alternative("LibreOffice"),
            CatalogEntry::new("Dropbox", "Storage", 15.0).with_alternative("Nextcloud"),
            CatalogEntry::new("Box", "Storage", 15.0).with_alternative("Seafile"),
            CatalogEntry::new("Notion", "Knowledge", 10.0).with_alternative("Outline"),
            CatalogEntry::new("Confluence", "Knowledge", 6.05).with_alternative("BookStack"),
            CatalogEntry::new("Jira", "Project Management", 8.15).with_alternative("Taiga"),
            CatalogEntry::new("Asana", "Project Management", 10.99)
                .with_alternative("OpenProject"),
            CatalogEntry::new("Trello", "Project Management", 5.0).with_alternative("Wekan"),
            CatalogEntry::new("Monday", "Project Management", 9.0).with_alternative("Plane"),
            CatalogEntry::new("Salesforce", "CRM", 25.0).with_alternative("SuiteCRM"),
            CatalogEntry::new("HubSpot", "CRM", 20.0).with_alternative("Twenty"),
            CatalogEntry::new("Zendesk", "Support", 19.0).with_alternative("Zammad"),
            CatalogEntry::new("Intercom", "Support", 29.0).with_alternative("Chatwoot"),
            CatalogEntry::new("GitHub", "Development", 4.0).with_alternative("Gitea"),
            CatalogEntry::new("GitLab", "Development", 29.0).with_alternative("Forgejo"),
            CatalogEntry::new("Figma", "Design", 15.0).with_alternative("Penpot"),
            CatalogEntry::new("1Password", "Security", 7.99).with_alternative("Vaultwarden"),
            CatalogEntry::new("LastPass", "Security", 4.0).with_alternative("Bitwarden"),
            CatalogEntry::new("Mailchimp", "Marketing", 13.0).with_alternative("Listmonk"),
            CatalogEntry::new("Calendly", "Scheduling", 10.0).with_alternative("Cal.com"),
            CatalogEntry::new("DocuSign", "Legal", 10.0).with_alternative("Documenso"),
        ];
        Self {
            entries,
            defaults: vec![
                "Slack".to_string(),
                "Google Workspace".to_string(),
                "Zoom".to_string(),
            ],
        }
    }
}

/// Startup system: replace the [`Catalog`] resource with `assets/catalog.toml`
/// if it exists and validates.
pub fn load_catalog(mut catalog: ResMut<Catalog>) {
    let path = "assets/catalog.toml";
    match std::fs::read_to_string(path) {
        Ok(contents) => match Catalog::from_toml_str(&contents) {
            Ok(loaded) if loaded.is_empty() => {
                warn!("{path} lists no tools; using built-in catalog");
            }
            Ok(loaded) => {
                info!("Loaded {} tools from {path}", loaded.len());
                *catalog = loaded;
            }
            Err(e) => warn!("{path}: {e}; using built-in catalog"),
        },
        Err(_) => info!("No {path} found; using built-in catalog"),
    }
}
