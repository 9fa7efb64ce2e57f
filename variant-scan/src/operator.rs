//! Operator popups
//!
//! Rendering is the host's concern; the scan pipeline only describes what
//! to show and waits for the answer.

use async_trait::async_trait;

/// Error popup (dismiss only)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorPopup {
    pub title: String,
    pub body: String,
}

impl ErrorPopup {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }
}

/// Single-select popup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionPopup {
    pub title: String,
    pub body: String,
    /// Item labels, in display order
    pub items: Vec<String>,
    pub confirm_text: String,
    pub cancel_text: String,
}

/// Host popup renderer
#[async_trait]
pub trait OperatorPrompt: Send + Sync {
    /// Show an error and wait until it is dismissed
    async fn show_error(&self, popup: ErrorPopup);

    /// Index of the chosen item, `None` when the operator cancels
    async fn select(&self, popup: SelectionPopup) -> Option<usize>;
}
