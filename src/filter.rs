//! Client-side catalog filters.
//!
//! Every function is total and returns a fresh list; the input is never
//! modified. Empty constraint sets pass everything through.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::catalog::CatalogEntry;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSpec {
    pub search_term: String,
    pub partitions: BTreeSet<String>,
    /// Type names; needs enriched entries.
    pub types: BTreeSet<String>,
    /// Habitat names; needs enriched entries.
    pub habitats: BTreeSet<String>,
}

impl FilterSpec {
    pub fn has_constraints(&self) -> bool {
        !self.partitions.is_empty() || !self.types.is_empty() || !self.habitats.is_empty()
    }
}

pub fn by_text(list: &[CatalogEntry], term: &str) -> Vec<CatalogEntry> {
    if term.is_empty() {
        return list.to_vec();
    }
    let term = term.to_lowercase();
    list.iter()
        .filter(|entry| entry.name.to_lowercase().contains(&term))
        .cloned()
        .collect()
}

pub fn by_partition(list: &[CatalogEntry], partitions: &BTreeSet<String>) -> Vec<CatalogEntry> {
    if partitions.is_empty() {
        return list.to_vec();
    }
    list.iter()
        .filter(|entry| partitions.contains(&entry.partition))
        .cloned()
        .collect()
}

/// Keeps entries sharing at least one type with `types`. Entries that were
/// never enriched do not match.
pub fn by_tags(list: &[CatalogEntry], types: &BTreeSet<String>) -> Vec<CatalogEntry> {
    if types.is_empty() {
        return list.to_vec();
    }
    list.iter()
        .filter(|entry| {
            entry
                .types()
                .is_some_and(|tags| tags.iter().any(|tag| types.contains(tag)))
        })
        .cloned()
        .collect()
}

/// Keeps entries whose habitat is in `habitats`. Entries without a known
/// habitat do not match.
pub fn by_secondary_attr(list: &[CatalogEntry], habitats: &BTreeSet<String>) -> Vec<CatalogEntry> {
    if habitats.is_empty() {
        return list.to_vec();
    }
    list.iter()
        .filter(|entry| entry.habitat().is_some_and(|habitat| habitats.contains(habitat)))
        .cloned()
        .collect()
}

/// True when the filter reads fields that only enrichment provides.
pub fn needs_enrichment(spec: &FilterSpec) -> bool {
    !spec.types.is_empty() || !spec.habitats.is_empty()
}

/// Text and partition stages only; the set the enricher works on.
pub fn prefilter(list: &[CatalogEntry], term: &str, spec: &FilterSpec) -> Vec<CatalogEntry> {
    by_partition(&by_text(list, term), &spec.partitions)
}

/// text → partition → types → habitat.
pub fn apply_all(list: &[CatalogEntry], term: &str, spec: &FilterSpec) -> Vec<CatalogEntry> {
    let narrowed = prefilter(list, term, spec);
    let typed = by_tags(&narrowed, &spec.types);
    by_secondary_attr(&typed, &spec.habitats)
}
