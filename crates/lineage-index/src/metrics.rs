//! Counters for provenance operations

/// Metrics collected by a [`crate::ProvenanceIndex`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexMetrics {
    /// Records created or overwritten
    pub attached: usize,

    /// Records soft-deleted through retraction
    pub retracted: usize,

    /// Records relabelled
    pub relabeled: usize,

    /// Records soft-deleted directly
    pub deleted: usize,

    /// Records marked hidden
    pub hidden: usize,

    /// Justified edges whose visibility source was rewritten
    pub downstream_edges_relabeled: usize,

    /// Downstream events enqueued
    pub notifications_published: usize,

    /// Downstream events the queue refused
    pub notification_failures: usize,
}

impl IndexMetrics {
    /// Create new empty metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an attachment
    pub fn record_attach(&mut self) {
        self.attached += 1;
    }

    /// Record a retraction
    pub fn record_retract(&mut self) {
        self.retracted += 1;
    }

    /// Record a relabel
    pub fn record_relabel(&mut self) {
        self.relabeled += 1;
    }

    /// Record a direct soft delete
    pub fn record_delete(&mut self) {
        self.deleted += 1;
    }

    /// Record a hide
    pub fn record_hide(&mut self) {
        self.hidden += 1;
    }

    /// Record rewritten downstream edges
    pub fn record_downstream(&mut self, edges: usize) {
        self.downstream_edges_relabeled += edges;
    }

    /// Record the outcome of one publish
    pub fn record_notification(&mut self, delivered: bool) {
        if delivered {
            self.notifications_published += 1;
        } else {
            self.notification_failures += 1;
        }
    }

    /// Total record mutations of any kind
    pub fn total_mutations(&self) -> usize {
        self.attached + self.retracted + self.relabeled + self.deleted + self.hidden
    }

    /// Generate a summary report of metrics
    pub fn summary(&self) -> String {
        let mut lines = vec![
            "Provenance Metrics Summary".to_string(),
            "==========================".to_string(),
            format!("Attached: {}", self.attached),
            format!("Retracted: {}", self.retracted),
            format!("Relabeled: {}", self.relabeled),
            format!("Deleted: {}", self.deleted),
            format!("Hidden: {}", self.hidden),
        ];

        if self.downstream_edges_relabeled > 0 || self.notification_failures > 0 {
            lines.push(String::new());
            lines.push(format!(
                "Downstream edges relabeled: {}",
                self.downstream_edges_relabeled
            ));
            lines.push(format!(
                "Notifications: {} published, {} failed",
                self.notifications_published, self.notification_failures
            ));
        }

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = IndexMetrics::new();
        assert_eq!(metrics.total_mutations(), 0);
        assert_eq!(metrics.notification_failures, 0);
    }

    #[test]
    fn test_record_counts() {
        let mut metrics = IndexMetrics::new();
        metrics.record_attach();
        metrics.record_attach();
        metrics.record_retract();
        metrics.record_hide();
        assert_eq!(metrics.attached, 2);
        assert_eq!(metrics.total_mutations(), 4);
    }

    #[test]
    fn test_notifications() {
        let mut metrics = IndexMetrics::new();
        metrics.record_notification(true);
        metrics.record_notification(false);
        metrics.record_notification(true);
        assert_eq!(metrics.notifications_published, 2);
        assert_eq!(metrics.notification_failures, 1);
    }

    #[test]
    fn test_summary() {
        let mut metrics = IndexMetrics::new();
        metrics.record_attach();
        assert!(!metrics.summary().contains("Downstream"));

        metrics.record_downstream(3);
        metrics.record_notification(false);
        let summary = metrics.summary();
        assert!(summary.contains("Attached: 1"));
        assert!(summary.contains("Downstream edges relabeled: 3"));
        assert!(summary.contains("0 published, 1 failed"));
    }
}
