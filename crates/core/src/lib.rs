//! Core domain types for buttonctl: dialog state and button policies.

use serde::{Deserialize, Serialize};

mod policy;

pub use policy::PolicyKind;

/// The four controllable dialog actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Ok,
    Apply,
    Restore,
    Cancel,
}

impl Action {
    pub const ALL: [Action; 4] = [Action::Ok, Action::Apply, Action::Restore, Action::Cancel];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Ok => "ok",
            Action::Apply => "apply",
            Action::Restore => "restore",
            Action::Cancel => "cancel",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-dialog state the policies decide on.
///
/// `applied` is set after an Apply fired and cleared by the next field edit.
/// Apply also clears `changed`, so the controller never produces a state with
/// both bits set and `!applied` is implied wherever `changed` is required.
/// The no-repeated-apply policies still test it to state the rule directly;
/// the states with both bits set only appear in [`DialogState::all`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DialogState {
    pub valid: bool,
    pub read_only: bool,
    pub changed: bool,
    pub applied: bool,
}

impl DialogState {
    pub fn new(valid: bool, read_only: bool, changed: bool) -> Self {
        Self {
            valid,
            read_only,
            changed,
            applied: false,
        }
    }

    /// Every combination of the four state bits.
    pub fn all() -> impl Iterator<Item = DialogState> {
        (0u8..16).map(|bits| DialogState {
            valid: bits & 1 != 0,
            read_only: bits & 2 != 0,
            changed: bits & 4 != 0,
            applied: bits & 8 != 0,
        })
    }
}

/// Text shown on the cancel button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CancelLabel {
    Cancel,
    #[default]
    Close,
}

impl CancelLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            CancelLabel::Cancel => "Cancel",
            CancelLabel::Close => "Close",
        }
    }
}

/// Which actions are clickable right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ActionAvailability {
    pub ok: bool,
    pub apply: bool,
    pub restore: bool,
    pub cancel: bool,
    pub cancel_label: CancelLabel,
}

impl ActionAvailability {
    pub fn is_enabled(&self, action: Action) -> bool {
        match action {
            Action::Ok => self.ok,
            Action::Apply => self.apply,
            Action::Restore => self.restore,
            Action::Cancel => self.cancel,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Dark,
    Light,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Theme {
    type Err = &'static str;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "dark" => Ok(Theme::Dark),
            "light" => Ok(Theme::Light),
            _ => Err("unknown theme"),
        }
    }
}

/// A dialog type and the policy its button controller is built with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogEntry {
    pub name: String,
    pub policy: PolicyKind,
}

impl DialogEntry {
    pub fn new(name: impl Into<String>, policy: PolicyKind) -> Self {
        Self {
            name: name.into(),
            policy,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub theme: Theme,
    pub document_read_only: bool,
    pub dialogs: Vec<DialogEntry>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: Theme::Dark,
            document_read_only: false,
            dialogs: default_dialogs(),
        }
    }
}

impl Settings {
    pub fn normalize(&mut self) {
        for entry in &mut self.dialogs {
            entry.name = entry.name.trim().to_string();
        }
        self.dialogs.retain(|entry| !entry.name.is_empty());

        let mut seen: Vec<String> = Vec::with_capacity(self.dialogs.len());
        self.dialogs.retain(|entry| {
            let key = entry.name.to_ascii_lowercase();
            if seen.contains(&key) {
                false
            } else {
                seen.push(key);
                true
            }
        });

        if self.dialogs.is_empty() {
            self.dialogs = default_dialogs();
        }
    }

    pub fn cycle_theme(&mut self) {
        self.theme = match self.theme {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        };
    }

    pub fn toggle_document_read_only(&mut self) {
        self.document_read_only = !self.document_read_only;
    }

    pub fn policy_for(&self, name: &str) -> Option<PolicyKind> {
        self.dialogs
            .iter()
            .find(|entry| entry.name.eq_ignore_ascii_case(name))
            .map(|entry| entry.policy)
    }

    /// Advance the policy of the named dialog; returns the new policy.
    pub fn cycle_policy(&mut self, name: &str) -> Option<PolicyKind> {
        let entry = self
            .dialogs
            .iter_mut()
            .find(|entry| entry.name.eq_ignore_ascii_case(name))?;
        entry.policy = entry.policy.next();
        Some(entry.policy)
    }
}

fn default_dialogs() -> Vec<DialogEntry> {
    vec![
        DialogEntry::new("Citation", PolicyKind::OkApplyCancelReadOnly),
        DialogEntry::new("Graphics", PolicyKind::NoRepeatedApplyReadOnly),
        DialogEntry::new("Tabular Create", PolicyKind::OkCancelReadOnly),
        DialogEntry::new("Character", PolicyKind::OkApplyCancelReadOnly),
        DialogEntry::new("Print", PolicyKind::OkCancel),
        DialogEntry::new("Spellchecker", PolicyKind::Ignorant),
        DialogEntry::new("Preferences", PolicyKind::Preferences),
    ]
}
