/// User-pinned location labels, most recently saved first. Labels are unique by exact
/// string; "Cape Town" and "cape town" are different entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SavedLocations {
    labels: Vec<String>,
}

impl SavedLocations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a persisted list, dropping later duplicates.
    pub fn from_labels(labels: Vec<String>) -> Self {
        let mut unique: Vec<String> = Vec::with_capacity(labels.len());
        for label in labels {
            if !unique.contains(&label) {
                unique.push(label);
            }
        }
        Self { labels: unique }
    }

    /// Insert `label` at the front. Returns false if it was already saved.
    pub fn save(&mut self, label: &str) -> bool {
        if self.contains(label) {
            return false;
        }
        self.labels.insert(0, label.to_string());
        true
    }

    /// Remove `label` by exact match. Returns false if it was not saved.
    pub fn remove(&mut self, label: &str) -> bool {
        let before = self.labels.len();
        self.labels.retain(|l| l != label);
        self.labels.len() != before
    }

    pub fn contains(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn saved(labels: &[&str]) -> SavedLocations {
        SavedLocations::from_labels(labels.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_save_new_label_goes_to_front() {
        let mut list = saved(&["Durban", "Paris"]);
        assert!(list.save("Cape Town"));
        assert_eq!(list.labels(), ["Cape Town", "Durban", "Paris"]);
    }

    #[test]
    fn test_save_existing_label_is_noop() {
        let mut list = saved(&["Durban", "Paris"]);
        assert!(!list.save("Paris"));
        assert_eq!(list.labels(), ["Durban", "Paris"]);
    }

    #[test]
    fn test_save_is_case_sensitive() {
        let mut list = saved(&["Paris"]);
        assert!(list.save("paris"));
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_remove_keeps_order() {
        let mut list = saved(&["A", "B", "C", "D"]);
        assert!(list.remove("B"));
        assert_eq!(list.labels(), ["A", "C", "D"]);
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let mut list = saved(&["A", "B"]);
        assert!(!list.remove("Z"));
        assert_eq!(list.labels(), ["A", "B"]);
    }

    #[test]
    fn test_from_labels_dedupes() {
        let list = saved(&["A", "B", "A", "C", "B"]);
        assert_eq!(list.labels(), ["A", "B", "C"]);
    }
}
