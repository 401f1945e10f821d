//! Descriptive task metadata and the partial-edit patch.

use super::TaskDomainError;
use serde::{Deserialize, Serialize};

/// Descriptive metadata owned by the managing role.
///
/// Category and title are required; the remaining fields are optional
/// annotations. None of these fields carry status or revision side effects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDetails {
    category: String,
    title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    subtask: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    elements: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    methodology: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    phase_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    comment: Option<String>,
}

impl TaskDetails {
    /// Creates validated details from the required fields.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::BlankField`] when the category or title is
    /// blank.
    pub fn new(
        category: impl Into<String>,
        title: impl Into<String>,
    ) -> Result<Self, TaskDomainError> {
        let category = non_blank(category.into(), "category")?;
        let title = non_blank(title.into(), "title")?;
        Ok(Self {
            category,
            title,
            subtask: None,
            elements: None,
            methodology: None,
            phase_label: None,
            comment: None,
        })
    }

    /// Sets the subtask annotation.
    #[must_use]
    pub fn with_subtask(mut self, subtask: impl Into<String>) -> Self {
        self.subtask = Some(subtask.into());
        self
    }

    /// Sets the elements annotation.
    #[must_use]
    pub fn with_elements(mut self, elements: impl Into<String>) -> Self {
        self.elements = Some(elements.into());
        self
    }

    /// Sets the methodology annotation.
    #[must_use]
    pub fn with_methodology(mut self, methodology: impl Into<String>) -> Self {
        self.methodology = Some(methodology.into());
        self
    }

    /// Sets the phase label annotation.
    #[must_use]
    pub fn with_phase_label(mut self, phase_label: impl Into<String>) -> Self {
        self.phase_label = Some(phase_label.into());
        self
    }

    /// Sets the manager comment.
    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Returns the task category.
    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Returns the task title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the subtask annotation, if any.
    #[must_use]
    pub fn subtask(&self) -> Option<&str> {
        self.subtask.as_deref()
    }

    /// Returns the elements annotation, if any.
    #[must_use]
    pub fn elements(&self) -> Option<&str> {
        self.elements.as_deref()
    }

    /// Returns the methodology annotation, if any.
    #[must_use]
    pub fn methodology(&self) -> Option<&str> {
        self.methodology.as_deref()
    }

    /// Returns the phase label annotation, if any.
    #[must_use]
    pub fn phase_label(&self) -> Option<&str> {
        self.phase_label.as_deref()
    }

    /// Returns the manager comment, if any.
    #[must_use]
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Applies a partial edit, validating any replaced required field.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::BlankField`] when a patched category or
    /// title is blank.
    pub fn apply(&mut self, patch: DescriptivePatch) -> Result<(), TaskDomainError> {
        if let Some(category) = patch.category {
            self.category = non_blank(category, "category")?;
        }
        if let Some(title) = patch.title {
            self.title = non_blank(title, "title")?;
        }
        if let Some(subtask) = patch.subtask {
            self.subtask = Some(subtask);
        }
        if let Some(elements) = patch.elements {
            self.elements = Some(elements);
        }
        if let Some(methodology) = patch.methodology {
            self.methodology = Some(methodology);
        }
        if let Some(phase_label) = patch.phase_label {
            self.phase_label = Some(phase_label);
        }
        if let Some(comment) = patch.comment {
            self.comment = Some(comment);
        }
        Ok(())
    }
}

/// Partial update to descriptive fields; `None` fields are left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DescriptivePatch {
    /// Replacement category, if any.
    pub category: Option<String>,
    /// Replacement title, if any.
    pub title: Option<String>,
    /// Replacement subtask annotation, if any.
    pub subtask: Option<String>,
    /// Replacement elements annotation, if any.
    pub elements: Option<String>,
    /// Replacement methodology annotation, if any.
    pub methodology: Option<String>,
    /// Replacement phase label, if any.
    pub phase_label: Option<String>,
    /// Replacement manager comment, if any.
    pub comment: Option<String>,
}

fn non_blank(value: String, field: &'static str) -> Result<String, TaskDomainError> {
    if value.trim().is_empty() {
        return Err(TaskDomainError::BlankField(field));
    }
    Ok(value)
}
