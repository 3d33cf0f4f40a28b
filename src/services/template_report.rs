//! Read-only reports over clubs and templates.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use serde::Serialize;

use crate::db::DbConn;
use crate::error::Result;
use crate::extract::ClubTemplates;
use crate::models::club;
use crate::models::template::{self, TemplateStatus};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateSummary {
    pub id: String,
    pub club_id: String,
    pub name: String,
    pub status: TemplateStatus,
    pub version: i32,
}

impl From<template::Model> for TemplateSummary {
    fn from(model: template::Model) -> Self {
        Self {
            id: model.id,
            club_id: model.club_id,
            name: model.name,
            status: model.status,
            version: model.version,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub total: usize,
    pub published: usize,
    pub draft: usize,
}

impl StatusCounts {
    fn add(&mut self, status: TemplateStatus) {
        self.total += 1;
        match status {
            TemplateStatus::Published => self.published += 1,
            TemplateStatus::Draft => self.draft += 1,
            TemplateStatus::Deleted => {}
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ClubComparison {
    pub club_id: String,
    /// Catalogue names with no row at all.
    pub missing: Vec<String>,
    /// Catalogue entries whose row is not published.
    pub not_published: Vec<TemplateSummary>,
    /// Catalogue entries present and published.
    pub published: Vec<String>,
    /// Non-deleted rows for the club that are not in the catalogue.
    pub extra: Vec<TemplateSummary>,
    pub counts: StatusCounts,
}

impl ClubComparison {
    pub fn in_sync(&self) -> bool {
        self.missing.is_empty() && self.not_published.is_empty()
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CompareReport {
    pub clubs: Vec<ClubComparison>,
}

impl CompareReport {
    pub fn in_sync(&self) -> bool {
        self.clubs.iter().all(ClubComparison::in_sync)
    }
}

async fn live_templates(db: &DbConn) -> Result<Vec<template::Model>> {
    Ok(template::Entity::find()
        .filter(template::Column::Status.ne(TemplateStatus::Deleted))
        .order_by_asc(template::Column::ClubId)
        .order_by_asc(template::Column::Name)
        .all(db)
        .await?)
}

/// Classify every catalogue template against the database.
pub async fn compare(db: &DbConn, catalogue: &[ClubTemplates]) -> Result<CompareReport> {
    let mut by_club: HashMap<String, Vec<template::Model>> = HashMap::new();
    for row in live_templates(db).await? {
        by_club.entry(row.club_id.clone()).or_default().push(row);
    }

    let clubs = catalogue
        .iter()
        .map(|club| {
            let rows = by_club.remove(&club.club_id).unwrap_or_default();
            let mut comparison = ClubComparison {
                club_id: club.club_id.clone(),
                ..Default::default()
            };

            for definition in &club.templates {
                match rows.iter().find(|row| row.id == definition.id) {
                    None => comparison.missing.push(definition.name.clone()),
                    Some(row) if row.status != TemplateStatus::Published => {
                        comparison.not_published.push(row.clone().into())
                    }
                    Some(_) => comparison.published.push(definition.name.clone()),
                }
            }

            let known: BTreeSet<&str> = club.templates.iter().map(|t| t.id.as_str()).collect();
            for row in rows {
                comparison.counts.add(row.status);
                if !known.contains(row.id.as_str()) {
                    comparison.extra.push(row.into());
                }
            }
            comparison
        })
        .collect();

    Ok(CompareReport { clubs })
}

#[derive(Debug, Clone, Serialize)]
pub struct ClubSummary {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub status: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CheckReport {
    pub clubs: Vec<ClubSummary>,
    /// Non-deleted templates ordered by club and name.
    pub templates: Vec<TemplateSummary>,
    /// Per club, per status counts of non-deleted templates.
    pub status_counts: BTreeMap<String, BTreeMap<String, usize>>,
}

impl CheckReport {
    pub fn published(&self) -> impl Iterator<Item = &TemplateSummary> {
        self.templates
            .iter()
            .filter(|t| t.status == TemplateStatus::Published)
    }
}

/// Snapshot of clubs and live templates.
pub async fn check(db: &DbConn) -> Result<CheckReport> {
    let clubs = club::Entity::find()
        .order_by_asc(club::Column::Id)
        .all(db)
        .await?
        .into_iter()
        .map(|c| ClubSummary {
            id: c.id,
            name: c.name,
            slug: c.slug,
            status: c.status,
        })
        .collect();

    let templates: Vec<TemplateSummary> = live_templates(db)
        .await?
        .into_iter()
        .map(TemplateSummary::from)
        .collect();

    let mut status_counts: BTreeMap<String, BTreeMap<String, usize>> = BTreeMap::new();
    for t in &templates {
        *status_counts
            .entry(t.club_id.clone())
            .or_default()
            .entry(t.status.to_string())
            .or_default() += 1;
    }

    Ok(CheckReport {
        clubs,
        templates,
        status_counts,
    })
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct LocalClubCheck {
    pub club_id: String,
    pub matching: Vec<String>,
    /// Present in the JavaScript source only.
    pub only_source: Vec<String>,
    /// Present in the built-in catalogue only.
    pub only_catalogue: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct LocalCheckReport {
    pub clubs: Vec<LocalClubCheck>,
}

impl LocalCheckReport {
    pub fn in_sync(&self) -> bool {
        self.clubs
            .iter()
            .all(|c| c.only_source.is_empty() && c.only_catalogue.is_empty())
    }
}

/// Compare extracted source templates with the built-in catalogue by id, without a database.
pub fn check_local(source: &[ClubTemplates], catalogue: &[ClubTemplates]) -> LocalCheckReport {
    let ids = |clubs: &[ClubTemplates], club_id: &str| -> BTreeSet<String> {
        clubs
            .iter()
            .filter(|c| c.club_id == club_id)
            .flat_map(|c| c.templates.iter().map(|t| t.id.clone()))
            .collect()
    };

    let club_ids: BTreeSet<&str> = source
        .iter()
        .chain(catalogue)
        .map(|c| c.club_id.as_str())
        .collect();

    let clubs = club_ids
        .into_iter()
        .map(|club_id| {
            let from_source = ids(source, club_id);
            let from_catalogue = ids(catalogue, club_id);
            LocalClubCheck {
                club_id: club_id.to_string(),
                matching: from_source.intersection(&from_catalogue).cloned().collect(),
                only_source: from_source.difference(&from_catalogue).cloned().collect(),
                only_catalogue: from_catalogue.difference(&from_source).cloned().collect(),
            }
        })
        .collect();

    LocalCheckReport { clubs }
}

impl fmt::Display for CompareReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for club in &self.clubs {
            writeln!(f, "Club: {}", club.club_id)?;
            if !club.missing.is_empty() {
                writeln!(f, "  Missing in database: {}", club.missing.join(", "))?;
            }
            for t in &club.not_published {
                writeln!(f, "  {}: status \"{}\", not \"published\"", t.name, t.status)?;
            }
            if !club.published.is_empty() {
                writeln!(f, "  In database and published: {}", club.published.join(", "))?;
            }
            for t in &club.extra {
                writeln!(f, "  Extra: {} (id: {}, status: {})", t.name, t.id, t.status)?;
            }
            writeln!(
                f,
                "  Total: {} | Published: {} | Draft: {}",
                club.counts.total, club.counts.published, club.counts.draft
            )?;
        }
        if self.in_sync() {
            write!(f, "All catalogue templates are published")
        } else {
            write!(f, "Out of sync: run `addicted-admin sync-fallback`")
        }
    }
}

impl fmt::Display for CheckReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Clubs:")?;
        for c in &self.clubs {
            writeln!(
                f,
                "  - {:<15} | {:<20} | slug: {:<15} | status: {}",
                c.id, c.name, c.slug, c.status
            )?;
        }

        writeln!(f, "Templates (excluding deleted): {}", self.templates.len())?;
        for t in &self.templates {
            writeln!(
                f,
                "  {:<15} {:<30} | status: {:<10} | v{} | id: {}",
                t.club_id, t.name, t.status, t.version, t.id
            )?;
        }

        writeln!(f, "Published:")?;
        for t in self.published() {
            writeln!(f, "  {} ({})", t.name, t.club_id)?;
        }

        write!(f, "Status counts:")?;
        for (club_id, counts) in &self.status_counts {
            write!(f, "\n  {club_id}:")?;
            for (status, count) in counts {
                write!(f, " {status}={count}")?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for LocalCheckReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for club in &self.clubs {
            writeln!(f, "Club: {}", club.club_id)?;
            if !club.matching.is_empty() {
                writeln!(f, "  Matching: {}", club.matching.join(", "))?;
            }
            if !club.only_source.is_empty() {
                writeln!(f, "  Only in source: {}", club.only_source.join(", "))?;
            }
            if !club.only_catalogue.is_empty() {
                writeln!(f, "  Only in catalogue: {}", club.only_catalogue.join(", "))?;
            }
        }
        if self.in_sync() {
            write!(f, "Source and catalogue match")
        } else {
            write!(f, "Source and catalogue differ")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::TemplateDefinition;
    use crate::templates::fallback_catalogue;

    fn definition(id: &str) -> TemplateDefinition {
        TemplateDefinition {
            id: id.to_string(),
            name: id.to_uppercase(),
            badge: None,
            description: None,
            config: Default::default(),
        }
    }

    #[test]
    fn test_check_local_detects_differences() {
        let source = vec![ClubTemplates {
            club_id: "hedonism".to_string(),
            templates: vec![definition("hedonism-classic"), definition("hedonism-new")],
        }];
        let report = check_local(&source, &fallback_catalogue());

        assert!(!report.in_sync());
        let hedonism = report.clubs.iter().find(|c| c.club_id == "hedonism").unwrap();
        assert_eq!(hedonism.matching, vec!["hedonism-classic"]);
        assert_eq!(hedonism.only_source, vec!["hedonism-new"]);
        assert_eq!(hedonism.only_catalogue, vec!["hedonism-mono", "hedonism-night"]);

        let nip = report.clubs.iter().find(|c| c.club_id == "not-in-paris").unwrap();
        assert_eq!(nip.only_catalogue.len(), 3);
    }

    #[test]
    fn test_check_local_identical_is_in_sync() {
        let report = check_local(&fallback_catalogue(), &fallback_catalogue());
        assert!(report.in_sync());
        assert!(report.to_string().contains("Source and catalogue match"));
    }

    #[test]
    fn test_status_counts_tally() {
        let mut counts = StatusCounts::default();
        counts.add(TemplateStatus::Published);
        counts.add(TemplateStatus::Draft);
        counts.add(TemplateStatus::Published);
        assert_eq!(
            counts,
            StatusCounts {
                total: 3,
                published: 2,
                draft: 1
            }
        );
    }
}
