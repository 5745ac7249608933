//! Debounced validation while a form is being edited.
//!
//! Every input schedules a re-check after a quiet period. A newer input for
//! the same trigger supersedes the pending one; a check that already started
//! runs to completion and reports, even if its values have since changed.
//! Checks are serialized on the shared context, so the newer check always
//! reports after the stale one.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use indexmap::IndexMap;
use parking_lot::{Mutex, RwLock};
use tokio::sync::Mutex as AsyncMutex;
use tokio::task::JoinHandle;
use tracing::{debug, error};

use super::context::ValidationContext;
use crate::config::LiveConfig;
use crate::foundation::{FieldLookup, FieldSource, FieldValue, FormData, ValidatorResult};
use crate::registry::CompiledRule;

// ============================================================================
// FORM STATE
// ============================================================================

/// The values currently shown by a form, shared with the validation context.
#[derive(Debug, Default)]
pub struct FormState {
    data: RwLock<FormData>,
    checked: RwLock<HashMap<String, bool>>,
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_data(data: FormData) -> Self {
        Self {
            data: RwLock::new(data),
            checked: RwLock::default(),
        }
    }

    /// Replaces every value of `field`.
    pub fn set(&self, field: &str, values: Vec<FieldValue>) {
        self.data.write().set_all(field, values);
    }

    pub fn set_checked(&self, field: &str, checked: bool) {
        self.checked.write().insert(field.to_owned(), checked);
    }

    pub fn snapshot(&self) -> FormData {
        self.data.read().clone()
    }
}

impl FieldSource for FormState {
    fn get_all(&self, key: &str) -> Vec<FieldValue> {
        self.data.read().values_of(key).to_vec()
    }
}

impl FieldLookup for FormState {
    fn raw_value(&self, key: &str) -> Option<String> {
        self.data
            .read()
            .values_of(key)
            .iter()
            .find_map(|value| value.as_text().map(str::to_owned))
    }

    fn is_checked(&self, key: &str) -> Option<bool> {
        self.checked.read().get(key).copied()
    }

    fn selected_files(&self, key: &str) -> usize {
        self.data
            .read()
            .values_of(key)
            .iter()
            .filter_map(FieldValue::as_file)
            .filter(|file| !file.is_placeholder())
            .count()
    }
}

// ============================================================================
// TRIGGERS AND REPORTS
// ============================================================================

/// What caused a live check; also the debounce key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LiveTrigger {
    /// The field's own rules, after input.
    Input(String),
    /// `required` only, after the field lost focus.
    Blur(String),
    /// `owner`'s groups that list `listener`, after input on `listener`.
    Group { owner: String, listener: String },
}

/// Result of one completed live check.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveReport {
    pub trigger: LiveTrigger,
    pub passed: bool,
    /// The whole visible error map after the check.
    pub errors: IndexMap<String, String>,
}

pub type LiveCallback = Arc<dyn Fn(&LiveReport) + Send + Sync>;

// ============================================================================
// LIVE VALIDATOR
// ============================================================================

struct LiveInner {
    context: AsyncMutex<ValidationContext>,
    form: Arc<FormState>,
    config: LiveConfig,
    generations: Mutex<HashMap<LiveTrigger, u64>>,
    callback: RwLock<Option<LiveCallback>>,
    /// Fields with rules of their own.
    watched: HashSet<String>,
    /// Fields with `required`, checked again on blur.
    blur_checked: HashSet<String>,
    /// Participant to the owners whose groups list it.
    listeners: HashMap<String, Vec<String>>,
}

impl LiveInner {
    async fn run(&self, trigger: &LiveTrigger) -> ValidatorResult<LiveReport> {
        let mut context = self.context.lock().await;
        let passed = match trigger {
            LiveTrigger::Input(field) => context.verify_field(field).await?,
            LiveTrigger::Blur(field) => context.verify_rule(field, "required").await?,
            LiveTrigger::Group { owner, listener } => {
                context.verify_group(owner, listener).await?
            }
        };
        Ok(LiveReport {
            trigger: trigger.clone(),
            passed,
            errors: context.errors().clone(),
        })
    }

    fn notify(&self, report: &LiveReport) {
        let callback = self.callback.read().clone();
        if let Some(callback) = callback {
            callback(report);
        }
    }
}

/// Re-validates fields in the background as the user types.
///
/// Cheap to clone; clones share the form, the context and pending checks.
/// Must be used inside a Tokio runtime.
#[derive(Clone)]
pub struct LiveValidator {
    inner: Arc<LiveInner>,
}

impl std::fmt::Debug for LiveValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveValidator")
            .field("config", &self.inner.config)
            .field("watched", &self.inner.watched)
            .finish_non_exhaustive()
    }
}

impl LiveValidator {
    /// Binds `context` to `form`; the context reads values and checkbox
    /// state from the form from now on.
    pub fn new(context: ValidationContext, form: Arc<FormState>, config: LiveConfig) -> Self {
        let mut watched = HashSet::new();
        let mut blur_checked = HashSet::new();
        let mut listeners: HashMap<String, Vec<String>> = HashMap::new();
        for (field, rules) in context.rules() {
            watched.insert(field.clone());
            if rules.contains("required") {
                blur_checked.insert(field.clone());
            }
            for rule in rules {
                if let CompiledRule::AnyOf(fields) | CompiledRule::OnlyAnyOf { fields, .. } = rule {
                    for participant in fields.keys() {
                        let owners = listeners.entry(participant.clone()).or_default();
                        if !owners.contains(field) {
                            owners.push(field.clone());
                        }
                    }
                }
            }
        }

        let context = context
            .with_shared_data(Arc::clone(&form) as Arc<dyn FieldSource>)
            .with_shared_lookup(Arc::clone(&form) as Arc<dyn FieldLookup>);
        Self {
            inner: Arc::new(LiveInner {
                context: AsyncMutex::new(context),
                form,
                config,
                generations: Mutex::default(),
                callback: RwLock::default(),
                watched,
                blur_checked,
                listeners,
            }),
        }
    }

    /// Called after every completed check, from the task that ran it.
    pub fn on_report(&self, callback: impl Fn(&LiveReport) + Send + Sync + 'static) {
        *self.inner.callback.write() = Some(Arc::new(callback));
    }

    pub fn form(&self) -> &Arc<FormState> {
        &self.inner.form
    }

    /// Sets `field` to one value and schedules the checks it affects.
    pub fn input(
        &self,
        field: &str,
        value: impl Into<FieldValue>,
    ) -> Vec<JoinHandle<Option<LiveReport>>> {
        self.input_all(field, vec![value.into()])
    }

    /// Sets every value of `field`, e.g. a multi-select or file list.
    pub fn input_all(
        &self,
        field: &str,
        values: Vec<FieldValue>,
    ) -> Vec<JoinHandle<Option<LiveReport>>> {
        self.inner.form.set(field, values);
        self.changed(field)
    }

    pub fn set_checked(&self, field: &str, checked: bool) -> Vec<JoinHandle<Option<LiveReport>>> {
        self.inner.form.set_checked(field, checked);
        self.changed(field)
    }

    /// Re-checks `required` right away; `None` when the field has none.
    pub fn blur(&self, field: &str) -> Option<JoinHandle<Option<LiveReport>>> {
        self.inner
            .blur_checked
            .contains(field)
            .then(|| self.schedule(LiveTrigger::Blur(field.to_owned()), Duration::ZERO))
    }

    /// Full submit-time pass over the current form.
    pub async fn verify_all(&self) -> ValidatorResult<bool> {
        self.inner.context.lock().await.verify_data().await
    }

    pub async fn errors(&self) -> IndexMap<String, String> {
        self.inner.context.lock().await.errors().clone()
    }

    pub async fn error(&self, field: &str) -> Option<String> {
        self.inner.context.lock().await.error(field).map(str::to_owned)
    }

    fn changed(&self, field: &str) -> Vec<JoinHandle<Option<LiveReport>>> {
        let mut handles = Vec::new();
        if self.inner.watched.contains(field) {
            handles.push(self.schedule(LiveTrigger::Input(field.to_owned()), self.inner.config.throttle()));
        }
        for owner in self.inner.listeners.get(field).into_iter().flatten() {
            let trigger = LiveTrigger::Group {
                owner: owner.clone(),
                listener: field.to_owned(),
            };
            handles.push(self.schedule(trigger, self.inner.config.conditional_throttle()));
        }
        handles
    }

    /// Runs `trigger` after `delay` unless it is scheduled again meanwhile.
    ///
    /// The handle yields `None` when superseded or when the rule set is
    /// broken.
    fn schedule(&self, trigger: LiveTrigger, delay: Duration) -> JoinHandle<Option<LiveReport>> {
        let generation = {
            let mut generations = self.inner.generations.lock();
            let counter = generations.entry(trigger.clone()).or_default();
            *counter += 1;
            *counter
        };
        let inner = Arc::clone(&self.inner);

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if inner.generations.lock().get(&trigger) != Some(&generation) {
                debug!(?trigger, generation, "live check superseded");
                return None;
            }
            match inner.run(&trigger).await {
                Ok(report) => {
                    debug!(?trigger, passed = report.passed, "live check completed");
                    inner.notify(&report);
                    Some(report)
                }
                Err(e) => {
                    error!(?trigger, error = %e, "live check failed");
                    None
                }
            }
        })
    }
}
