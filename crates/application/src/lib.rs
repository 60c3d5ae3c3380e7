//! Per-dialog button controller: tracks dialog state and drives action
//! availability through a [`PolicyKind`].

use buttonctl_core::{Action, ActionAvailability, DialogState, PolicyKind};

/// Answers whether the dialog's current input is acceptable.
///
/// Must be cheap and must not block; it runs on every edit.
pub trait Validator {
    fn is_valid(&self) -> anyhow::Result<bool>;

    /// Fields whose current contents fail their own check.
    fn invalid_fields(&self) -> Vec<String> {
        Vec::new()
    }
}

/// Callbacks a dialog supplies for the actions the controller dispatches.
pub trait DialogActions: Validator {
    fn apply(&mut self);
    fn restore(&mut self);
    fn close(&mut self);
}

/// Toolkit side of the controller: receives every recomputed availability.
pub trait ButtonView {
    /// The buttons the current policy exposes, in display order. Called on
    /// construction and whenever the policy is replaced.
    fn set_actions(&mut self, _actions: &'static [Action]) {}

    fn set_enabled(&mut self, availability: &ActionAvailability);

    /// Enable or disable an input registered with
    /// [`ButtonController::add_read_only_input`].
    fn set_input_enabled(&mut self, _id: &str, _enabled: bool) {}

    /// Fields to highlight as invalid; empty clears the highlight.
    fn mark_invalid(&mut self, _fields: &[String]) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigurationError {
    /// The policy can only be chosen before the dialog is first shown.
    PolicyLocked {
        current: PolicyKind,
        requested: PolicyKind,
    },
}

impl std::fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigurationError::PolicyLocked { current, requested } => write!(
                f,
                "cannot switch button policy from {current} to {requested} after the dialog was shown"
            ),
        }
    }
}

impl std::error::Error for ConfigurationError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Invocation {
    Dispatched,
    Rejected,
}

pub struct ButtonController<V> {
    policy: PolicyKind,
    state: DialogState,
    view: V,
    open: bool,
    policy_locked: bool,
    read_only_inputs: Vec<String>,
    invalid_fields: Vec<String>,
}

impl<V: ButtonView> ButtonController<V> {
    pub fn new(policy: PolicyKind, mut view: V) -> Self {
        view.set_actions(policy.actions());
        Self {
            policy,
            state: DialogState::default(),
            view,
            open: false,
            policy_locked: false,
            read_only_inputs: Vec::new(),
            invalid_fields: Vec::new(),
        }
    }

    pub fn policy(&self) -> PolicyKind {
        self.policy
    }

    pub fn state(&self) -> DialogState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn invalid_fields(&self) -> &[String] {
        &self.invalid_fields
    }

    pub fn availability(&self) -> ActionAvailability {
        self.policy.availability(self.state)
    }

    pub fn set_policy(&mut self, policy: PolicyKind) -> Result<(), ConfigurationError> {
        if self.policy_locked && policy != self.policy {
            let err = ConfigurationError::PolicyLocked {
                current: self.policy,
                requested: policy,
            };
            debug_assert!(false, "{err}");
            tracing::error!("{err}; keeping {}", self.policy);
            return Err(err);
        }
        self.policy = policy;
        self.view.set_actions(policy.actions());
        Ok(())
    }

    /// Inputs the view disables while the document is read-only.
    pub fn add_read_only_input(&mut self, id: impl Into<String>) {
        let id = id.into();
        if !self.read_only_inputs.contains(&id) {
            self.read_only_inputs.push(id);
        }
    }

    pub fn show<D: Validator + ?Sized>(&mut self, read_only: bool, dialog: &D) {
        self.open = true;
        self.policy_locked = true;
        self.state = DialogState {
            valid: false,
            read_only,
            changed: false,
            applied: false,
        };
        self.revalidate(dialog);
        tracing::debug!(
            "dialog shown with {} (valid={}, read_only={read_only})",
            self.policy,
            self.state.valid
        );
        self.refresh();
    }

    pub fn input_changed<D: Validator + ?Sized>(&mut self, dialog: &D) {
        if !self.open {
            tracing::debug!("input change ignored, dialog is closed");
            return;
        }
        self.state.changed = true;
        self.state.applied = false;
        self.revalidate(dialog);
        self.refresh();
    }

    pub fn read_only_changed(&mut self, read_only: bool) {
        self.state.read_only = read_only;
        self.refresh();
    }

    pub fn invoke<D: DialogActions + ?Sized>(
        &mut self,
        action: Action,
        dialog: &mut D,
    ) -> Invocation {
        if !self.open {
            tracing::debug!("rejected {action}: dialog is closed");
            return Invocation::Rejected;
        }
        if !self.policy.permits(action, self.state) {
            tracing::debug!(
                "rejected {action} under {} in state {:?}",
                self.policy,
                self.state
            );
            return Invocation::Rejected;
        }

        match action {
            Action::Ok => {
                dialog.apply();
                dialog.close();
                self.state.changed = false;
                self.state.applied = false;
                self.open = false;
            }
            Action::Apply => {
                dialog.apply();
                self.state.changed = false;
                self.state.applied = true;
            }
            Action::Restore => {
                dialog.restore();
                self.state.changed = false;
                self.state.applied = false;
                self.revalidate(&*dialog);
            }
            Action::Cancel => {
                dialog.close();
                self.open = false;
            }
        }

        self.refresh();
        Invocation::Dispatched
    }

    /// Push the current availability without changing any state.
    pub fn refresh(&mut self) {
        let availability = self.availability();
        self.view.set_enabled(&availability);

        let writable = !self.state.read_only;
        for id in &self.read_only_inputs {
            self.view.set_input_enabled(id, writable);
        }
        self.view.mark_invalid(&self.invalid_fields);
    }

    fn revalidate<D: Validator + ?Sized>(&mut self, dialog: &D) {
        let valid = match dialog.is_valid() {
            Ok(valid) => valid,
            Err(err) => {
                tracing::warn!("validator failed, treating input as invalid: {err:#}");
                false
            }
        };
        self.invalid_fields = dialog.invalid_fields();
        self.state.valid = valid && self.invalid_fields.is_empty();
    }
}
