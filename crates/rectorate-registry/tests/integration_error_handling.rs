/// Integration tests for failure handling in the school registry
///
/// A failing factory or event log must leave the registry, the ledger and
/// the log exactly as they were before the call.
use rectorate_access::{
    AccessLedger, Event, EventLogError, EventSink, Identity, InMemoryEventLog, SchoolHandle,
};
use rectorate_registry::{
    FactoryError, InMemorySchoolFactory, RegistryError, SchoolFactory, SchoolRegistry,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Event log that can be switched into a failing state
#[derive(Default)]
struct SwitchableSink {
    log: InMemoryEventLog,
    failing: AtomicBool,
}

impl SwitchableSink {
    fn fail(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

impl EventSink for SwitchableSink {
    fn publish(&self, events: &[Event]) -> Result<(), EventLogError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(EventLogError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "disk full",
            )));
        }
        self.log.publish(events)
    }
}

/// Factory that always returns the same handle
struct FixedFactory(SchoolHandle);

impl SchoolFactory for FixedFactory {
    fn create(&self, _name: &str, _director: Identity) -> Result<SchoolHandle, FactoryError> {
        Ok(self.0)
    }
}

/// Factory that refuses everything
struct ClosedFactory;

impl SchoolFactory for ClosedFactory {
    fn create(&self, name: &str, _director: Identity) -> Result<SchoolHandle, FactoryError> {
        Err(FactoryError::Rejected(format!("{} cannot be founded", name)))
    }
}

fn setup(factory: Arc<dyn SchoolFactory>) -> (Identity, Arc<SwitchableSink>, SchoolRegistry) {
    let rector = Identity::random();
    let sink = Arc::new(SwitchableSink::default());
    let ledger = Arc::new(AccessLedger::new(rector, sink.clone()).unwrap());
    let registry = SchoolRegistry::new(ledger, factory, sink.clone());
    (rector, sink, registry)
}

// ============================================================================
// Event log failures
// ============================================================================

#[test]
fn test_create_is_rolled_back_when_log_fails() {
    let (rector, sink, registry) = setup(Arc::new(InMemorySchoolFactory::new()));
    let director = Identity::random();

    sink.fail(true);
    let err = registry.create_school(rector, "S1", director).unwrap_err();
    assert!(matches!(err, RegistryError::EventLog(_)));

    assert_eq!(registry.school_count(), 0);
    assert!(!registry.is_director(&director));
    assert_eq!(sink.log.len(), 2);

    // The same request succeeds once the log recovers
    sink.fail(false);
    registry.create_school(rector, "S1", director).unwrap();
    assert_eq!(registry.school_count(), 1);
}

#[test]
fn test_delete_and_change_are_rolled_back_when_log_fails() {
    let (rector, sink, registry) = setup(Arc::new(InMemorySchoolFactory::new()));
    let d1 = Identity::random();
    let d2 = Identity::random();
    let school = registry.create_school(rector, "S1", d1).unwrap();
    let before = registry.snapshot();

    sink.fail(true);
    assert!(matches!(
        registry.change_school_director(rector, d1, d2),
        Err(RegistryError::EventLog(_))
    ));
    assert!(matches!(
        registry.delete_school(rector, school),
        Err(RegistryError::EventLog(_))
    ));

    assert_eq!(registry.snapshot(), before);
    assert_eq!(registry.director_of(&school), Some(d1));
    assert!(!registry.is_director(&d2));
}

#[test]
fn test_ledger_change_is_rolled_back_when_log_fails() {
    let (rector, sink, registry) = setup(Arc::new(InMemorySchoolFactory::new()));
    let admin = Identity::random();

    sink.fail(true);
    let err = registry
        .ledger()
        .grant_administrator(rector, admin)
        .unwrap_err();
    assert!(matches!(
        RegistryError::from(err),
        RegistryError::EventLog(EventLogError::Io(_))
    ));

    sink.fail(false);
    assert!(matches!(
        registry.create_school(admin, "S1", Identity::random()),
        Err(RegistryError::Unauthorized { .. })
    ));
}

// ============================================================================
// Factory failures
// ============================================================================

#[test]
fn test_factory_rejection_surfaces_as_collaborator_failure() {
    let (rector, sink, registry) = setup(Arc::new(ClosedFactory));

    let err = registry
        .create_school(rector, "S1", Identity::random())
        .unwrap_err();
    assert!(matches!(
        err,
        RegistryError::CollaboratorFailure(FactoryError::Rejected(_))
    ));
    assert!(err.to_string().contains("S1 cannot be founded"));
    assert_eq!(registry.school_count(), 0);
    assert_eq!(sink.log.len(), 2);
}

#[test]
fn test_factory_null_handle_is_rejected() {
    let (rector, sink, registry) = setup(Arc::new(FixedFactory(SchoolHandle::NULL)));
    let director = Identity::random();

    assert!(matches!(
        registry.create_school(rector, "S1", director),
        Err(RegistryError::CollaboratorFailure(FactoryError::NullHandle))
    ));
    assert!(!registry.is_director(&director));
    assert_eq!(sink.log.len(), 2);
}

#[test]
fn test_factory_reused_handle_is_rejected() {
    let handle = SchoolHandle::new(Identity::random());
    let (rector, sink, registry) = setup(Arc::new(FixedFactory(handle)));
    let d1 = Identity::random();
    let d2 = Identity::random();

    registry.create_school(rector, "S1", d1).unwrap();
    assert!(matches!(
        registry.create_school(rector, "S2", d2),
        Err(RegistryError::CollaboratorFailure(FactoryError::HandleInUse(h))) if h == handle
    ));

    assert_eq!(registry.director_of(&handle), Some(d1));
    assert!(!registry.is_director(&d2));
    assert_eq!(registry.school_count(), 1);
    assert_eq!(sink.log.len(), 4);
}

#[test]
fn test_precondition_failure_skips_factory() {
    let factory = Arc::new(InMemorySchoolFactory::new());
    let (rector, _sink, registry) = setup(factory.clone());
    let director = Identity::random();

    registry.create_school(rector, "S1", director).unwrap();
    let _ = registry.create_school(rector, "S2", director);
    let _ = registry.create_school(Identity::random(), "S3", Identity::random());

    assert_eq!(factory.created(), 1);
}
