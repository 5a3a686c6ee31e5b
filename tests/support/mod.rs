//! In-memory service manager used by the integration tests.
//!
//! Every handle handed out is counted while alive so tests can assert that
//! each lifecycle operation releases everything it opened.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use wgtun_daemon::lifecycle::{LifecycleTiming, ServiceStage, StageListener};
use wgtun_daemon::scm::{
    CreateSpec, ManagerConnection, NativeState, OsError, ServiceControlManager, ServiceHandle,
    ServiceStatus, ERROR_SERVICE_DOES_NOT_EXIST,
};

/// What happens when the start command is issued.
#[derive(Debug, Clone, Copy)]
pub enum StartBehavior {
    /// The service comes up and stays running.
    Runs,
    /// The start command succeeds but the service exits right away.
    SettlesStopped,
    /// The start command is rejected with the given code.
    Rejected(u32),
}

/// What happens when the stop control is issued.
#[derive(Debug, Clone, Copy)]
pub enum StopBehavior {
    /// Reports stop pending for this many queries, then stopped.
    StopsAfter(usize),
    /// Reports stop pending forever.
    Stuck,
    /// The stop control is rejected with the given code.
    Rejected(u32),
}

/// Record of a `create_service` call.
#[derive(Debug, Clone)]
pub struct Created {
    pub name: String,
    pub command_line: String,
    pub dependencies: Vec<String>,
}

#[derive(Debug)]
pub struct FakeState {
    pub exists: bool,
    pub state: NativeState,
    pub wait_hint: Duration,
    /// Remaining stop-pending queries; `None` never completes.
    pub pending_queries: Option<usize>,
    pub start_script: VecDeque<StartBehavior>,
    pub stop_behavior: StopBehavior,
    pub manager_error: Option<u32>,
    pub open_error: Option<u32>,
    pub create_error: Option<u32>,
    pub sid_error: Option<u32>,
    pub description_error: Option<u32>,
    pub query_error: Option<u32>,
    pub delete_error: Option<u32>,
    pub disable_error: Option<u32>,
    pub created: Vec<Created>,
    pub description: Option<String>,
    pub sid_unrestricted: bool,
    pub disabled: bool,
    /// Every name passed to `open_service`.
    pub opened: Vec<String>,
    pub calls: Vec<&'static str>,
}

impl Default for FakeState {
    fn default() -> Self {
        Self {
            exists: false,
            state: NativeState::Stopped,
            wait_hint: Duration::ZERO,
            pending_queries: Some(0),
            start_script: VecDeque::new(),
            stop_behavior: StopBehavior::StopsAfter(1),
            manager_error: None,
            open_error: None,
            create_error: None,
            sid_error: None,
            description_error: None,
            query_error: None,
            delete_error: None,
            disable_error: None,
            created: Vec::new(),
            description: None,
            sid_unrestricted: false,
            disabled: false,
            opened: Vec::new(),
            calls: Vec::new(),
        }
    }
}

struct Shared {
    state: Mutex<FakeState>,
    live_handles: AtomicUsize,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    fn acquire(self: &Arc<Self>) -> HandleGuard {
        self.live_handles.fetch_add(1, Ordering::SeqCst);
        HandleGuard(Arc::clone(self))
    }
}

struct HandleGuard(Arc<Shared>);

impl Drop for HandleGuard {
    fn drop(&mut self) {
        self.0.live_handles.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Scriptable service manager holding a single service.
#[derive(Clone)]
pub struct FakeScm {
    shared: Arc<Shared>,
}

impl FakeScm {
    /// A manager with no service installed.
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(FakeState::default()),
                live_handles: AtomicUsize::new(0),
            }),
        }
    }

    /// A manager with the service installed in `state`.
    pub fn with_service(state: NativeState) -> Self {
        let scm = Self::new();
        {
            let mut s = scm.state();
            s.exists = true;
            s.state = state;
        }
        scm
    }

    /// Queue start behaviors; once exhausted the service runs.
    pub fn script_starts(&self, behaviors: &[StartBehavior]) -> &Self {
        self.state().start_script.extend(behaviors.iter().copied());
        self
    }

    pub fn set_stop_behavior(&self, behavior: StopBehavior) -> &Self {
        self.state().stop_behavior = behavior;
        self
    }

    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        self.shared.lock()
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.state().calls.clone()
    }

    pub fn count(&self, call: &str) -> usize {
        self.state().calls.iter().filter(|c| **c == call).count()
    }

    pub fn live_handles(&self) -> usize {
        self.shared.live_handles.load(Ordering::SeqCst)
    }

    pub fn manager(&self) -> Arc<dyn ServiceControlManager> {
        Arc::new(self.clone())
    }
}

impl ServiceControlManager for FakeScm {
    fn connect(&self) -> Result<Box<dyn ManagerConnection + '_>, OsError> {
        let mut state = self.state();
        state.calls.push("connect");
        if let Some(code) = state.manager_error {
            return Err(OsError::new(code));
        }
        Ok(Box::new(FakeConnection {
            shared: Arc::clone(&self.shared),
            _guard: self.shared.acquire(),
        }))
    }
}

struct FakeConnection {
    shared: Arc<Shared>,
    _guard: HandleGuard,
}

impl FakeConnection {
    fn handle(&self) -> Box<dyn ServiceHandle + '_> {
        Box::new(FakeService {
            shared: Arc::clone(&self.shared),
            _guard: self.shared.acquire(),
        })
    }
}

impl ManagerConnection for FakeConnection {
    fn open_service(&self, name: &str) -> Result<Option<Box<dyn ServiceHandle + '_>>, OsError> {
        {
            let mut state = self.shared.lock();
            state.calls.push("open");
            state.opened.push(name.to_string());
            if let Some(code) = state.open_error {
                return Err(OsError::new(code));
            }
            if !state.exists {
                return Ok(None);
            }
        }
        Ok(Some(self.handle()))
    }

    fn create_service(
        &self,
        name: &str,
        spec: &CreateSpec,
    ) -> Result<Box<dyn ServiceHandle + '_>, OsError> {
        {
            let mut state = self.shared.lock();
            state.calls.push("create");
            if let Some(code) = state.create_error {
                return Err(OsError::new(code));
            }
            state.exists = true;
            state.state = NativeState::Stopped;
            state.created.push(Created {
                name: name.to_string(),
                command_line: spec.command_line.clone(),
                dependencies: spec.dependencies.clone(),
            });
        }
        Ok(self.handle())
    }
}

struct FakeService {
    shared: Arc<Shared>,
    _guard: HandleGuard,
}

impl ServiceHandle for FakeService {
    fn set_sid_type_unrestricted(&self) -> Result<(), OsError> {
        let mut state = self.shared.lock();
        state.calls.push("sid");
        if let Some(code) = state.sid_error {
            return Err(OsError::new(code));
        }
        state.sid_unrestricted = true;
        Ok(())
    }

    fn set_description(&self, description: &str) -> Result<(), OsError> {
        let mut state = self.shared.lock();
        state.calls.push("description");
        if let Some(code) = state.description_error {
            return Err(OsError::new(code));
        }
        state.description = Some(description.to_string());
        Ok(())
    }

    fn query_status(&self) -> Result<ServiceStatus, OsError> {
        let mut state = self.shared.lock();
        state.calls.push("query");
        if let Some(code) = state.query_error {
            return Err(OsError::new(code));
        }
        if !state.exists {
            return Err(OsError::new(ERROR_SERVICE_DOES_NOT_EXIST));
        }
        if state.state == NativeState::StopPending {
            match state.pending_queries {
                Some(0) => state.state = NativeState::Stopped,
                Some(n) => state.pending_queries = Some(n - 1),
                None => {}
            }
        }
        Ok(ServiceStatus::new(state.state).with_wait_hint(state.wait_hint))
    }

    fn start(&self) -> Result<(), OsError> {
        let mut state = self.shared.lock();
        state.calls.push("start");
        match state.start_script.pop_front().unwrap_or(StartBehavior::Runs) {
            StartBehavior::Runs => state.state = NativeState::Running,
            StartBehavior::SettlesStopped => state.state = NativeState::Stopped,
            StartBehavior::Rejected(code) => return Err(OsError::new(code)),
        }
        Ok(())
    }

    fn control_stop(&self) -> Result<ServiceStatus, OsError> {
        let mut state = self.shared.lock();
        state.calls.push("control_stop");
        match state.stop_behavior {
            StopBehavior::Rejected(code) => return Err(OsError::new(code)),
            StopBehavior::StopsAfter(n) => state.pending_queries = Some(n),
            StopBehavior::Stuck => state.pending_queries = None,
        }
        state.state = NativeState::StopPending;
        Ok(ServiceStatus::new(state.state))
    }

    fn delete(&self) -> Result<(), OsError> {
        let mut state = self.shared.lock();
        state.calls.push("delete");
        if let Some(code) = state.delete_error {
            return Err(OsError::new(code));
        }
        state.exists = false;
        state.state = NativeState::Stopped;
        Ok(())
    }

    fn disable(&self) -> Result<(), OsError> {
        let mut state = self.shared.lock();
        state.calls.push("disable");
        if let Some(code) = state.disable_error {
            return Err(OsError::new(code));
        }
        state.disabled = true;
        Ok(())
    }
}

/// Timing small enough to keep the suite fast.
pub fn fast_timing() -> LifecycleTiming {
    LifecycleTiming {
        settle_min: Duration::from_millis(1),
        settle_max: Duration::from_millis(2),
        stop_poll_interval: Duration::from_millis(1),
        stop_timeout: Duration::from_millis(200),
    }
}

/// Listener that records every stage it receives.
pub fn recorder() -> (Arc<Mutex<Vec<ServiceStage>>>, Arc<dyn StageListener>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let listener: Arc<dyn StageListener> =
        Arc::new(move |stage: ServiceStage| sink.lock().unwrap().push(stage));
    (seen, listener)
}
