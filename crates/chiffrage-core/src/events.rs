//! # Project Events
//!
//! Explicit mutation messages for the recomputation protocol.
//!
//! ## Why Explicit Messages?
//! ```text
//! Repository mutation                    Event                    Consumer
//! ───────────────────                    ─────                    ────────
//! insert/update/delete Selection    ──►  SelectionChanged    ──►  recompute P
//! create/approve/reject Request     ──►  RequestChanged      ──►  recompute P
//! finalize/validate/delete Session  ──►  SandblastChanged    ──►  recompute P
//! change CatalogItem price          ──►  CatalogPriceChanged ──►  recompute
//!                                                                 every P
//!                                                                 referencing
//!                                                                 the item
//! ```
//!
//! Every mutating operation on a contributing entity returns one of these;
//! the summary engine consumes it synchronously on the same control-flow
//! path, so a caller observes the updated summary immediately after its
//! own write. Keeping the trigger a plain value makes it testable without
//! any storage hook mechanism.

use serde::{Deserialize, Serialize};

/// A committed mutation that may change a project's summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProjectEvent {
    /// A selection of the project was created, updated or deleted.
    SelectionChanged { project_id: String },

    /// A custom request of the project was created, decided or deleted.
    RequestChanged { project_id: String },

    /// A sandblast session of the project was finalized, validated or
    /// deleted.
    SandblastChanged { project_id: String },

    /// A catalog item's price changed; affects every project with a
    /// selection referencing the item.
    CatalogPriceChanged { catalog_item_id: String },
}

impl ProjectEvent {
    /// The single affected project, when the event names one directly.
    ///
    /// `None` for [`ProjectEvent::CatalogPriceChanged`]: the affected set
    /// has to be resolved against the store (distinct referencing
    /// projects).
    pub fn project_id(&self) -> Option<&str> {
        match self {
            ProjectEvent::SelectionChanged { project_id }
            | ProjectEvent::RequestChanged { project_id }
            | ProjectEvent::SandblastChanged { project_id } => Some(project_id),
            ProjectEvent::CatalogPriceChanged { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_id_extraction() {
        let event = ProjectEvent::SelectionChanged {
            project_id: "p1".into(),
        };
        assert_eq!(event.project_id(), Some("p1"));

        let fan_out = ProjectEvent::CatalogPriceChanged {
            catalog_item_id: "item".into(),
        };
        assert_eq!(fan_out.project_id(), None);
    }
}
