// 📝 Entity Forms
//
// One EntityForm drives the edit screen of one record. It owns the text
// fields, reads them back into an entity on save, validates, hands the
// entity to the persistence service and tells subscribed listeners that
// something changed.

pub mod field;

pub use field::{FieldKind, FormFields, TextField};

use crate::notifier::{ChangeListener, ChangeNotifier};
use crate::service::PersistenceService;
use crate::validation::{ParsePolicy, ValidationErrors};
use std::rc::Rc;
use thiserror::Error;
use tracing::{debug, info, warn};

// ============================================================================
// BINDING
// ============================================================================

/// Maps an entity to and from the text fields of its form
pub trait FormBinding: Clone + std::fmt::Debug + Sized {
    /// Short name used in logs and titles
    const KIND: &'static str;

    /// Empty fields, in display order, with their input constraints
    fn form_fields() -> FormFields;

    /// Entity attributes -> field text
    fn write_fields(&self, fields: &mut FormFields);

    /// Field text -> entity, or every field error found
    fn read_fields(fields: &FormFields, policy: ParsePolicy) -> Result<Self, ValidationErrors>;

    fn id(&self) -> Option<i64>;
}

// ============================================================================
// OUTCOMES & ERRORS
// ============================================================================

/// Form used before it was wired up. These are setup bugs, not user errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("Entity was null")]
    EntityNotSet,
    #[error("Service was null")]
    ServiceNotSet,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome {
    /// Persisted and listeners notified; the view should close
    Saved,
    /// Field errors found; nothing persisted, form stays open
    Invalid(ValidationErrors),
    /// Store refused the record; form stays open showing the message
    Failed(String),
}

impl SaveOutcome {
    pub fn should_close(&self) -> bool {
        matches!(self, SaveOutcome::Saved)
    }
}

/// Returned by cancel: the view closes without saving
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CloseRequest;

// ============================================================================
// ENTITY FORM
// ============================================================================

pub struct EntityForm<E: FormBinding> {
    entity: Option<E>,
    service: Option<Rc<dyn PersistenceService<E>>>,
    notifier: ChangeNotifier,
    fields: FormFields,
    errors: ValidationErrors,
    alert: Option<String>,
    policy: ParsePolicy,
}

pub type DepartmentForm = EntityForm<crate::entities::Department>;
pub type SellerForm = EntityForm<crate::entities::Seller>;

impl<E: FormBinding> EntityForm<E> {
    pub fn new() -> Self {
        Self::with_policy(ParsePolicy::default())
    }

    pub fn with_policy(policy: ParsePolicy) -> Self {
        EntityForm {
            entity: None,
            service: None,
            notifier: ChangeNotifier::new(),
            fields: E::form_fields(),
            errors: ValidationErrors::new(),
            alert: None,
            policy,
        }
    }

    pub fn set_entity(&mut self, entity: E) {
        self.entity = Some(entity);
    }

    pub fn set_service(&mut self, service: Rc<dyn PersistenceService<E>>) {
        self.service = Some(service);
    }

    pub fn subscribe(&mut self, listener: Rc<dyn ChangeListener>) {
        self.notifier.subscribe(listener);
    }

    pub fn entity(&self) -> Option<&E> {
        self.entity.as_ref()
    }

    /// Copies the entity into the fields and clears any earlier messages
    pub fn populate(&mut self) -> Result<(), FormError> {
        let entity = self.entity.as_ref().ok_or(FormError::EntityNotSet)?;
        entity.write_fields(&mut self.fields);
        self.errors.clear();
        self.alert = None;
        Ok(())
    }

    pub fn on_save(&mut self) -> Result<SaveOutcome, FormError> {
        if self.entity.is_none() {
            return Err(FormError::EntityNotSet);
        }
        let service = self.service.clone().ok_or(FormError::ServiceNotSet)?;

        self.errors.clear();
        self.alert = None;

        let mut updated = match E::read_fields(&self.fields, self.policy) {
            Ok(entity) => entity,
            Err(errors) => {
                warn!(kind = E::KIND, errors = %errors, "validation failed");
                self.errors = errors.clone();
                return Ok(SaveOutcome::Invalid(errors));
            }
        };

        if let Err(err) = service.save_or_update(&mut updated) {
            warn!(kind = E::KIND, error = %err, "error saving object");
            self.alert = Some(err.message().to_string());
            return Ok(SaveOutcome::Failed(err.message().to_string()));
        }

        info!(kind = E::KIND, id = ?updated.id(), "saved");
        self.entity = Some(updated);

        let notified = self.notifier.notify();
        debug!(kind = E::KIND, listeners = notified, "notified change listeners");

        Ok(SaveOutcome::Saved)
    }

    pub fn on_cancel(&self) -> CloseRequest {
        debug!(kind = E::KIND, "form cancelled");
        CloseRequest
    }

    pub fn fields(&self) -> &FormFields {
        &self.fields
    }

    pub fn fields_mut(&mut self) -> &mut FormFields {
        &mut self.fields
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    /// Message from the last failed persistence call
    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    pub fn listener_count(&self) -> usize {
        self.notifier.len()
    }

    pub fn is_new_record(&self) -> bool {
        self.entity.as_ref().map_or(true, |e| e.id().is_none())
    }
}

impl<E: FormBinding> Default for EntityForm<E> {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Department, Seller};
    use crate::service::PersistenceError;
    use crate::validation::{NOT_AN_EMAIL_MESSAGE, REQUIRED_MESSAGE};
    use chrono::NaiveDate;
    use std::cell::{Cell, RefCell};

    /// Records every save; fails them all when `fail` is set
    struct RecordingService<E> {
        saved: RefCell<Vec<E>>,
        fail: bool,
    }

    impl<E> RecordingService<E> {
        fn new(fail: bool) -> Rc<Self> {
            Rc::new(RecordingService {
                saved: RefCell::new(Vec::new()),
                fail,
            })
        }

        fn calls(&self) -> usize {
            self.saved.borrow().len()
        }
    }

    impl<E: FormBinding + SetId> PersistenceService<E> for RecordingService<E> {
        fn save_or_update(&self, entity: &mut E) -> Result<(), PersistenceError> {
            self.saved.borrow_mut().push(entity.clone());
            if self.fail {
                return Err(PersistenceError::new("disk full"));
            }
            if entity.id().is_none() {
                entity.set_id(self.calls() as i64);
            }
            Ok(())
        }

        fn find_all(&self) -> Result<Vec<E>, PersistenceError> {
            Ok(self.saved.borrow().clone())
        }

        fn find_by_id(&self, id: i64) -> Result<Option<E>, PersistenceError> {
            Ok(self.saved.borrow().iter().find(|e| e.id() == Some(id)).cloned())
        }

        fn delete_by_id(&self, _id: i64) -> Result<(), PersistenceError> {
            Ok(())
        }
    }

    trait SetId {
        fn set_id(&mut self, id: i64);
    }

    impl SetId for Seller {
        fn set_id(&mut self, id: i64) {
            self.id = Some(id);
        }
    }

    impl SetId for Department {
        fn set_id(&mut self, id: i64) {
            self.id = Some(id);
        }
    }

    fn counter(form: &mut SellerForm) -> Rc<Cell<usize>> {
        let hits = Rc::new(Cell::new(0));
        let seen = hits.clone();
        form.subscribe(Rc::new(move || seen.set(seen.get() + 1)));
        hits
    }

    fn create_test_form(service: Rc<RecordingService<Seller>>) -> SellerForm {
        let mut form = SellerForm::new();
        form.set_entity(Seller::default());
        form.set_service(service);
        form.populate().unwrap();
        form
    }

    fn fill(form: &mut SellerForm, name: &str, email: &str, birth: &str, salary: &str) {
        let fields = form.fields_mut();
        fields.set_text("name", name);
        fields.set_text("email", email);
        fields.set_text("birth_date", birth);
        fields.set_text("base_salary", salary);
    }

    #[test]
    fn test_populate_before_set_entity_fails() {
        let mut form = DepartmentForm::new();
        assert_eq!(form.populate(), Err(FormError::EntityNotSet));
    }

    #[test]
    fn test_save_without_entity_or_service_fails() {
        let mut form = SellerForm::new();
        assert_eq!(form.on_save(), Err(FormError::EntityNotSet));

        form.set_entity(Seller::default());
        assert_eq!(form.on_save(), Err(FormError::ServiceNotSet));
    }

    #[test]
    fn test_populate_writes_entity_into_fields() {
        let mut form = DepartmentForm::new();
        form.set_entity(Department::with_id(12, "Electronics"));
        form.populate().unwrap();

        assert_eq!(form.fields().text("id"), "12");
        assert_eq!(form.fields().text("name"), "Electronics");
        assert!(!form.fields().field("id").unwrap().is_editable());
        assert!(!form.is_new_record());
    }

    #[test]
    fn test_blank_name_is_rejected_without_persisting() {
        for name in ["", " ", "   \t"] {
            let service = RecordingService::new(false);
            let mut form = create_test_form(service.clone());
            let hits = counter(&mut form);
            fill(&mut form, name, "a@b.com", "", "");

            let outcome = form.on_save().unwrap();

            assert!(matches!(outcome, SaveOutcome::Invalid(_)));
            assert!(!outcome.should_close());
            assert_eq!(form.errors().get("name"), Some(REQUIRED_MESSAGE));
            assert_eq!(service.calls(), 0);
            assert_eq!(hits.get(), 0);
        }
    }

    #[test]
    fn test_email_without_at_sign_is_rejected() {
        for email in ["alice", "alice.example.com", "a b"] {
            let service = RecordingService::new(false);
            let mut form = create_test_form(service.clone());
            fill(&mut form, "Alice", email, "", "");

            form.on_save().unwrap();

            assert_eq!(form.errors().get("email"), Some(NOT_AN_EMAIL_MESSAGE));
            assert_eq!(service.calls(), 0);
        }
    }

    #[test]
    fn test_blank_email_reports_required_first() {
        let service = RecordingService::new(false);
        let mut form = create_test_form(service);
        fill(&mut form, "Alice", "   ", "", "");

        form.on_save().unwrap();

        assert_eq!(form.errors().get("email"), Some(REQUIRED_MESSAGE));
    }

    #[test]
    fn test_valid_save_persists_once_then_notifies() {
        let service = RecordingService::new(false);
        let mut form = create_test_form(service.clone());
        let hits = counter(&mut form);
        fill(&mut form, "Alice", "a@b.com", "01-01-2000", "1000.0");

        let outcome = form.on_save().unwrap();

        assert_eq!(outcome, SaveOutcome::Saved);
        assert!(outcome.should_close());
        assert_eq!(service.calls(), 1);

        let saved = service.saved.borrow()[0].clone();
        assert_eq!(saved.name, "Alice");
        assert_eq!(saved.email, "a@b.com");
        assert_eq!(saved.birth_date, NaiveDate::from_ymd_opt(2000, 1, 1));
        assert_eq!(saved.base_salary, Some(1000.0));

        assert_eq!(hits.get(), 1);
        assert_eq!(form.entity().unwrap().id, Some(1));
        assert!(form.errors().is_empty());
    }

    #[test]
    fn test_listener_runs_after_persistence() {
        let service = RecordingService::new(false);
        let mut form = create_test_form(service.clone());
        let calls_seen = Rc::new(Cell::new(None));
        let (seen, svc) = (calls_seen.clone(), service.clone());
        form.subscribe(Rc::new(move || seen.set(Some(svc.calls()))));
        fill(&mut form, "Alice", "a@b.com", "01-01-2000", "1000.0");

        form.on_save().unwrap();

        assert_eq!(calls_seen.get(), Some(1));
    }

    #[test]
    fn test_persistence_failure_keeps_form_open() {
        let service = RecordingService::new(true);
        let mut form = create_test_form(service.clone());
        let hits = counter(&mut form);
        fill(&mut form, "Alice", "a@b.com", "01-01-2000", "1000.0");

        let outcome = form.on_save().unwrap();

        assert_eq!(outcome, SaveOutcome::Failed("disk full".to_string()));
        assert!(!outcome.should_close());
        assert_eq!(form.alert(), Some("disk full"));
        assert_eq!(service.calls(), 1);
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn test_two_listeners_each_notified_once() {
        let service = RecordingService::new(false);
        let mut form = create_test_form(service);
        let first = counter(&mut form);
        let second = counter(&mut form);
        assert_eq!(form.listener_count(), 2);
        fill(&mut form, "Alice", "a@b.com", "", "");

        form.on_save().unwrap();

        assert_eq!(first.get(), 1);
        assert_eq!(second.get(), 1);
    }

    #[test]
    fn test_errors_cleared_on_next_successful_save() {
        let service = RecordingService::new(false);
        let mut form = create_test_form(service);
        fill(&mut form, "", "a@b.com", "", "");
        form.on_save().unwrap();
        assert!(!form.errors().is_empty());

        form.fields_mut().set_text("name", "Alice");
        assert_eq!(form.on_save().unwrap(), SaveOutcome::Saved);
        assert!(form.errors().is_empty());
    }

    #[test]
    fn test_department_form_update_keeps_id() {
        let service = RecordingService::<Department>::new(false);
        let mut form = DepartmentForm::new();
        form.set_entity(Department::with_id(5, "Books"));
        form.set_service(service.clone());
        form.populate().unwrap();
        form.fields_mut().set_text("name", "Comics");

        assert_eq!(form.on_save().unwrap(), SaveOutcome::Saved);
        assert_eq!(service.saved.borrow()[0], Department::with_id(5, "Comics"));
    }

    #[test]
    fn test_cancel_does_not_persist() {
        let service = RecordingService::new(false);
        let mut form = create_test_form(service.clone());
        let hits = counter(&mut form);
        fill(&mut form, "Alice", "a@b.com", "", "");

        assert_eq!(form.on_cancel(), CloseRequest);
        assert_eq!(service.calls(), 0);
        assert_eq!(hits.get(), 0);
    }
}
