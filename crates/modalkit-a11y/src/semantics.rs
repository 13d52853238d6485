#![forbid(unsafe_code)]

//! Roles, ARIA attribute names, and dialog semantics.

use modalkit_core::{Document, NodeId};

use crate::ids::DialogIds;

/// ARIA attribute names.
pub mod aria {
    pub const ROLE: &str = "role";
    pub const MODAL: &str = "aria-modal";
    pub const LABEL: &str = "aria-label";
    pub const LABELLED_BY: &str = "aria-labelledby";
    pub const DESCRIBED_BY: &str = "aria-describedby";
    pub const HIDDEN: &str = "aria-hidden";
}

/// Widget roles used by the modal subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Role {
    #[default]
    Dialog,
    AlertDialog,
    Presentation,
    Button,
    Group,
}

impl Role {
    /// The `role` attribute value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dialog => "dialog",
            Self::AlertDialog => "alertdialog",
            Self::Presentation => "presentation",
            Self::Button => "button",
            Self::Group => "group",
        }
    }
}

/// Caller overrides for the dialog's accessible label and description.
///
/// `label` wins over `labelled_by`; when neither is set the dialog is
/// labelled by its generated title id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessibleLabels {
    pub label: Option<String>,
    pub labelled_by: Option<String>,
    pub described_by: Option<String>,
}

impl AccessibleLabels {
    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    #[must_use]
    pub fn labelled_by(mut self, id: impl Into<String>) -> Self {
        self.labelled_by = Some(id.into());
        self
    }

    #[must_use]
    pub fn described_by(mut self, id: impl Into<String>) -> Self {
        self.described_by = Some(id.into());
        self
    }
}

/// Mark `panel` as a modal dialog labelled by the title and described by
/// the body.
pub fn apply_dialog_semantics(
    doc: &mut Document,
    panel: NodeId,
    ids: &DialogIds,
    role: Role,
    overrides: &AccessibleLabels,
) {
    doc.set_attr(panel, "id", ids.panel.clone());
    doc.set_attr(panel, aria::ROLE, role.as_str());
    doc.set_attr(panel, aria::MODAL, "true");

    if let Some(label) = &overrides.label {
        doc.set_attr(panel, aria::LABEL, label.clone());
        doc.remove_attr(panel, aria::LABELLED_BY);
    } else {
        let by = overrides.labelled_by.as_ref().unwrap_or(&ids.title);
        doc.set_attr(panel, aria::LABELLED_BY, by.clone());
        doc.remove_attr(panel, aria::LABEL);
    }

    let described = overrides.described_by.as_ref().unwrap_or(&ids.body);
    doc.set_attr(panel, aria::DESCRIBED_BY, described.clone());
}
