//! Button policies: pure decision tables from dialog state to availability.

use serde::{Deserialize, Serialize};

use crate::{Action, ActionAvailability, CancelLabel, DialogState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PolicyKind {
    OkCancel,
    OkCancelReadOnly,
    OkApplyCancel,
    OkApplyCancelReadOnly,
    NoRepeatedApply,
    NoRepeatedApplyReadOnly,
    Preferences,
    Ignorant,
}

const OK_CANCEL: &[Action] = &[Action::Ok, Action::Cancel];
const OK_APPLY_CANCEL: &[Action] = &[Action::Ok, Action::Apply, Action::Cancel];
const ALL_ACTIONS: &[Action] = &Action::ALL;

impl PolicyKind {
    pub const ALL: [PolicyKind; 8] = [
        PolicyKind::OkCancel,
        PolicyKind::OkCancelReadOnly,
        PolicyKind::OkApplyCancel,
        PolicyKind::OkApplyCancelReadOnly,
        PolicyKind::NoRepeatedApply,
        PolicyKind::NoRepeatedApplyReadOnly,
        PolicyKind::Preferences,
        PolicyKind::Ignorant,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyKind::OkCancel => "ok-cancel",
            PolicyKind::OkCancelReadOnly => "ok-cancel-read-only",
            PolicyKind::OkApplyCancel => "ok-apply-cancel",
            PolicyKind::OkApplyCancelReadOnly => "ok-apply-cancel-read-only",
            PolicyKind::NoRepeatedApply => "no-repeated-apply",
            PolicyKind::NoRepeatedApplyReadOnly => "no-repeated-apply-read-only",
            PolicyKind::Preferences => "preferences",
            PolicyKind::Ignorant => "ignorant",
        }
    }

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|p| *p == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    /// Whether a read-only document disables OK, Apply and Restore.
    pub fn is_read_only_aware(&self) -> bool {
        matches!(
            self,
            PolicyKind::OkCancelReadOnly
                | PolicyKind::OkApplyCancelReadOnly
                | PolicyKind::NoRepeatedApplyReadOnly
        )
    }

    /// Buttons a dialog built with this policy shows, in display order.
    pub fn actions(&self) -> &'static [Action] {
        match self {
            PolicyKind::OkCancel | PolicyKind::OkCancelReadOnly => OK_CANCEL,
            PolicyKind::OkApplyCancel | PolicyKind::OkApplyCancelReadOnly => OK_APPLY_CANCEL,
            PolicyKind::NoRepeatedApply
            | PolicyKind::NoRepeatedApplyReadOnly
            | PolicyKind::Preferences
            | PolicyKind::Ignorant => ALL_ACTIONS,
        }
    }

    pub fn availability(&self, state: DialogState) -> ActionAvailability {
        let DialogState {
            valid,
            read_only,
            changed,
            applied,
        } = state;
        let writable = !(self.is_read_only_aware() && read_only);

        let (ok, apply, restore) = match self {
            PolicyKind::OkCancel => (valid, false, false),
            PolicyKind::OkCancelReadOnly => (valid && writable, false, false),
            PolicyKind::OkApplyCancel => (valid, valid && changed, false),
            PolicyKind::OkApplyCancelReadOnly => {
                (valid && writable, valid && changed && writable, false)
            }
            PolicyKind::NoRepeatedApply => (valid, valid && changed && !applied, changed),
            PolicyKind::NoRepeatedApplyReadOnly => (
                valid && writable,
                valid && changed && !applied && writable,
                changed && writable,
            ),
            PolicyKind::Preferences => (valid && changed, valid && changed, changed),
            PolicyKind::Ignorant => (true, true, true),
        };

        ActionAvailability {
            ok,
            apply,
            restore,
            cancel: true,
            cancel_label: if changed {
                CancelLabel::Cancel
            } else {
                CancelLabel::Close
            },
        }
    }

    /// Whether `action` may fire in `state`. Agrees with [`Self::availability`].
    pub fn permits(&self, action: Action, state: DialogState) -> bool {
        self.actions().contains(&action) && self.availability(state).is_enabled(action)
    }
}

impl std::fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PolicyKind {
    type Err = &'static str;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim().to_ascii_lowercase().replace('_', "-");
        PolicyKind::ALL
            .into_iter()
            .find(|policy| policy.as_str() == value)
            .ok_or("unknown button policy")
    }
}
