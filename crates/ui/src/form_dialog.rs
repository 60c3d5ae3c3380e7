//! A small two-field parameter dialog used to drive the button controller.

use buttonctl_application::{DialogActions, Validator};

pub const FIELD_LABEL: &str = "label";
pub const FIELD_WIDTH: &str = "width";
pub const FIELDS: [&str; 2] = [FIELD_LABEL, FIELD_WIDTH];

/// Parameters the dialog edits: a non-empty label and a positive width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormParams {
    pub label: String,
    pub width: String,
}

impl Default for FormParams {
    fn default() -> Self {
        Self {
            label: "figure".to_string(),
            width: "80".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FormDialog {
    committed: FormParams,
    edited: FormParams,
    applied: usize,
    closed: bool,
}

impl FormDialog {
    pub fn new(params: FormParams) -> Self {
        Self {
            edited: params.clone(),
            committed: params,
            applied: 0,
            closed: false,
        }
    }

    pub fn committed(&self) -> &FormParams {
        &self.committed
    }

    pub fn edited(&self) -> &FormParams {
        &self.edited
    }

    pub fn applied_count(&self) -> usize {
        self.applied
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn field(&self, field: &str) -> &str {
        match field {
            FIELD_WIDTH => &self.edited.width,
            _ => &self.edited.label,
        }
    }

    pub fn field_mut(&mut self, field: &str) -> &mut String {
        match field {
            FIELD_WIDTH => &mut self.edited.width,
            _ => &mut self.edited.label,
        }
    }
}

impl Validator for FormDialog {
    fn is_valid(&self) -> anyhow::Result<bool> {
        Ok(!self.edited.label.trim().is_empty())
    }

    fn invalid_fields(&self) -> Vec<String> {
        let width_ok = self
            .edited
            .width
            .trim()
            .parse::<u32>()
            .is_ok_and(|w| w > 0);
        if width_ok {
            Vec::new()
        } else {
            vec![FIELD_WIDTH.to_string()]
        }
    }
}

impl DialogActions for FormDialog {
    fn apply(&mut self) {
        self.committed = self.edited.clone();
        self.applied += 1;
    }

    fn restore(&mut self) {
        self.edited = self.committed.clone();
    }

    fn close(&mut self) {
        self.closed = true;
    }
}
