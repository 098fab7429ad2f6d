//! Fuzzy tag clustering (the dispenser)
//!
//! Turns `<CATEGORY raw_value>` markers into numbered `<CATEGORY-N>` markers so
//! that repeated mentions of one value, allowing for small spelling
//! variation, share a number within a document.
//!
//! Clustering is representative based: the first unclustered value opens a
//! cluster and pulls in every remaining value within the edit-distance
//! threshold of *that representative*. Two members may therefore be further
//! apart from each other than the threshold. Numbers follow the order in
//! which clusters open, starting at 1 for each category.
//!
//! The patient category is not clustered; every patient marker becomes
//! `<PATIENT>`.

use crate::domain::Category;
use regex::{Captures, Regex};
use std::collections::HashMap;

/// Default maximum Damerau-Levenshtein distance for two values to cluster
pub const DEFAULT_MAX_EDIT_DISTANCE: usize = 1;

/// A group of raw values sharing one identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cluster<'a> {
    /// Sequential identifier within the category, from 1
    pub id: usize,
    /// Value that opened the cluster
    pub representative: &'a str,
    /// All values in the cluster in order of appearance, representative first
    pub members: Vec<&'a str>,
}

/// Group values into clusters around representatives
///
/// `values` are in order of appearance and may contain duplicates.
pub fn form_clusters<'a>(values: &[&'a str], max_distance: usize) -> Vec<Cluster<'a>> {
    let mut clusters = Vec::new();
    let mut remaining: Vec<&'a str> = values.to_vec();
    let mut dispenser = 1;

    while let Some((&representative, rest)) = remaining.split_first() {
        let mut members = vec![representative];
        let mut carried = Vec::with_capacity(rest.len());

        for &value in rest {
            if within_distance(representative, value, max_distance) {
                members.push(value);
            } else {
                carried.push(value);
            }
        }

        clusters.push(Cluster {
            id: dispenser,
            representative,
            members,
        });
        dispenser += 1;
        remaining = carried;
    }

    clusters
}

/// Whether two values are within `max_distance` edits of each other
///
/// Insertions, deletions, substitutions and adjacent transpositions each cost 1.
pub fn within_distance(a: &str, b: &str, max_distance: usize) -> bool {
    if a == b {
        return true;
    }
    let (len_a, len_b) = (a.chars().count(), b.chars().count());
    if len_a.abs_diff(len_b) > max_distance {
        return false;
    }
    strsim::damerau_levenshtein(a, b) <= max_distance
}

/// Numbers tagged values per category
#[derive(Debug, Clone)]
pub struct TagClusterer {
    max_distance: usize,
    patient_marker: Regex,
    category_markers: Vec<(Category, Regex)>,
}

impl TagClusterer {
    /// Create a clusterer with the given edit-distance threshold
    pub fn new(max_distance: usize) -> Self {
        let patient_marker = marker_regex(Category::Patient);
        let category_markers = Category::CLUSTERED
            .iter()
            .map(|&category| (category, marker_regex(category)))
            .collect();

        Self {
            max_distance,
            patient_marker,
            category_markers,
        }
    }

    pub fn max_distance(&self) -> usize {
        self.max_distance
    }

    /// Replace every `<CATEGORY value>` marker with its numbered form
    ///
    /// Markers of unknown categories and already-numbered markers are left as is.
    pub fn cluster(&self, text: &str) -> String {
        let mut text = self
            .patient_marker
            .replace_all(text, format!("<{}>", Category::Patient.label()).as_str())
            .into_owned();

        for (category, marker) in &self.category_markers {
            if let Some(numbered) = self.number_category(*category, marker, &text) {
                text = numbered;
            }
        }

        text
    }

    /// Number the markers of one category, `None` if the text has none
    fn number_category(&self, category: Category, marker: &Regex, text: &str) -> Option<String> {
        let values: Vec<&str> = marker
            .captures_iter(text)
            .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
            .collect();
        if values.is_empty() {
            return None;
        }

        let clusters = form_clusters(&values, self.max_distance);
        tracing::debug!(
            category = %category,
            values = values.len(),
            clusters = clusters.len(),
            "Clustered tagged values"
        );

        let mut assignment: HashMap<&str, usize> = HashMap::new();
        for cluster in &clusters {
            for member in &cluster.members {
                assignment.entry(*member).or_insert(cluster.id);
            }
        }

        let label = category.label();
        let numbered = marker.replace_all(text, |caps: &Captures| match assignment.get(&caps[1]) {
            Some(id) => format!("<{label}-{id}>"),
            None => caps[0].to_string(),
        });
        Some(numbered.into_owned())
    }
}

impl Default for TagClusterer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_EDIT_DISTANCE)
    }
}

fn marker_regex(category: Category) -> Regex {
    let pattern = format!(r"<{}\s([^>]+)>", regex::escape(category.label()));
    Regex::new(&pattern).expect("marker pattern built from a category label is valid")
}

/// Cluster tagged text with the default edit-distance threshold
pub fn cluster_tags(text: &str) -> String {
    TagClusterer::default().cluster(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cluster_example() {
        let text = "<NAME Jansen> and <NAME Janssen> and <NAME Peters>";
        assert_eq!(cluster_tags(text), "<NAME-1> and <NAME-1> and <NAME-2>");
    }

    #[test]
    fn test_patient_collapse() {
        let text = "<PATIENT Jan Jansen> zegt tegen <PATIENT J.> dat <PATIENT Xyz> komt";
        assert_eq!(
            cluster_tags(text),
            "<PATIENT> zegt tegen <PATIENT> dat <PATIENT> komt"
        );
    }

    #[test]
    fn test_transposition_counts_once() {
        assert!(within_distance("Jansen", "Jnasen", 1));
        assert!(!within_distance("Jansen", "Jnasne", 1));
    }

    #[test]
    fn test_representative_based_not_transitive() {
        // "abc" -> "abd" and "abc" -> "xbc" are distance 1, but "abd" -> "xbc" is 2.
        let clusters = form_clusters(&["abc", "abd", "xbc"], 1);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].members, vec!["abc", "abd", "xbc"]);

        // Opened by "abd" instead, "xbc" is too far from the representative.
        let clusters = form_clusters(&["abd", "abc", "xbc"], 1);
        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[1].representative, "xbc");
    }

    #[test]
    fn test_numbering_follows_first_appearance() {
        let text = "<DATE 3 mei> <DATE 1 juni> <DATE 3 mei> <DATE 9 juli>";
        assert_eq!(cluster_tags(text), "<DATE-1> <DATE-2> <DATE-1> <DATE-3>");
    }

    #[test]
    fn test_categories_numbered_independently() {
        let text = "<NAME Jansen> in <LOCATION Utrecht>, <NAME Peters> in <LOCATION Utrecht>";
        assert_eq!(
            cluster_tags(text),
            "<NAME-1> in <LOCATION-1>, <NAME-2> in <LOCATION-1>"
        );
    }

    #[test]
    fn test_patient_number_not_confused_with_patient() {
        let text = "<PATIENT Jan> heeft nummer <PATIENT_NUMBER 1234567>";
        assert_eq!(cluster_tags(text), "<PATIENT> heeft nummer <PATIENT_NUMBER-1>");
    }

    #[test]
    fn test_unknown_and_numbered_markers_untouched() {
        let text = "<FOO bar> <NAME-3> <NAME Jansen>";
        assert_eq!(cluster_tags(text), "<FOO bar> <NAME-3> <NAME-1>");
    }

    #[test]
    fn test_zero_threshold_is_exact_matching() {
        let clusterer = TagClusterer::new(0);
        let text = "<NAME Jansen> <NAME Janssen> <NAME Jansen>";
        assert_eq!(clusterer.cluster(text), "<NAME-1> <NAME-2> <NAME-1>");
    }

    #[test]
    fn test_output_is_lossy() {
        let a = cluster_tags("<NAME Jansen> belt");
        let b = cluster_tags("<NAME Peters> belt");
        // Distinct originals map to the same output; values cannot be recovered.
        assert_eq!(a, b);
        assert!(!a.contains("Jansen"));
    }

    #[test]
    fn test_text_without_markers() {
        assert_eq!(cluster_tags("geen markers hier"), "geen markers hier");
        assert_eq!(cluster_tags(""), "");
    }
}
