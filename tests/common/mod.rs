//! Shared fixtures: a recording implementation of every collaborator port.

#![allow(dead_code)]

use power_sequencer::core::{Event, PowerState, PublicState};
use power_sequencer::shell::{
    Dispatcher, ManualTimers, PropertiesPort, ServicePort, VendorPort,
};
use power_sequencer::{SequencerBuilder, SequencerConfig};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// One collaborator call, in the order it was made.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    StartLayer1Bringup,
    StartProfileServices,
    EnableFull { restricted: bool },
    DisableFull,
    StopProfileServices,
    DisableProfileServices,
    StopLowPowerOnlyServices,
    UpdateUuids,
    StateChanged(PublicState, PublicState),
    RequestProcessRestart,
    ReadyForUse,
    FullDisableRequested,
    LowPowerDisableRequested,
    ClearDisableGuard,
    TeardownCleanup,
}

/// Records every call made through any of the three ports.
///
/// Synchronous results are configurable: by default enable and disable
/// succeed, no low-power services are running and the user is unrestricted.
pub struct Recorder {
    calls: Mutex<Vec<Call>>,
    public: Mutex<PublicState>,
    enable_ok: AtomicBool,
    disable_ok: AtomicBool,
    low_power_running: AtomicBool,
    restricted: AtomicBool,
}

impl Recorder {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            public: Mutex::new(PublicState::Off),
            enable_ok: AtomicBool::new(true),
            disable_ok: AtomicBool::new(true),
            low_power_running: AtomicBool::new(false),
            restricted: AtomicBool::new(false),
        })
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, call: &Call) -> usize {
        self.calls().iter().filter(|c| *c == call).count()
    }

    pub fn called(&self, call: &Call) -> bool {
        self.count(call) > 0
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn public(&self) -> PublicState {
        *self.public.lock().unwrap()
    }

    pub fn set_enable_ok(&self, ok: bool) {
        self.enable_ok.store(ok, Ordering::SeqCst);
    }

    pub fn set_disable_ok(&self, ok: bool) {
        self.disable_ok.store(ok, Ordering::SeqCst);
    }

    pub fn set_low_power_running(&self, running: bool) {
        self.low_power_running.store(running, Ordering::SeqCst);
    }

    pub fn set_restricted(&self, restricted: bool) {
        self.restricted.store(restricted, Ordering::SeqCst);
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

impl ServicePort for Recorder {
    fn start_layer1_bringup(&self) {
        self.record(Call::StartLayer1Bringup);
    }

    fn start_profile_services(&self) {
        self.record(Call::StartProfileServices);
    }

    fn enable_full(&self, restricted_user: bool) -> bool {
        self.record(Call::EnableFull {
            restricted: restricted_user,
        });
        self.enable_ok.load(Ordering::SeqCst)
    }

    fn disable_full(&self) -> bool {
        self.record(Call::DisableFull);
        self.disable_ok.load(Ordering::SeqCst)
    }

    fn stop_profile_services(&self) {
        self.record(Call::StopProfileServices);
    }

    fn disable_profile_services(&self) {
        self.record(Call::DisableProfileServices);
    }

    fn stop_low_power_only_services(&self) -> bool {
        self.record(Call::StopLowPowerOnlyServices);
        self.low_power_running.load(Ordering::SeqCst)
    }

    fn update_uuids(&self) {
        self.record(Call::UpdateUuids);
    }

    fn on_public_state_changed(&self, old: PublicState, new: PublicState) {
        self.record(Call::StateChanged(old, new));
    }

    fn request_process_restart(&self) {
        self.record(Call::RequestProcessRestart);
    }

    fn is_restricted_user(&self) -> bool {
        self.restricted.load(Ordering::SeqCst)
    }
}

impl PropertiesPort for Recorder {
    fn public_state(&self) -> PublicState {
        self.public()
    }

    fn set_public_state(&self, state: PublicState) {
        *self.public.lock().unwrap() = state;
    }

    fn on_ready_for_use(&self) {
        self.record(Call::ReadyForUse);
    }

    fn on_full_disable_requested(&self) {
        self.record(Call::FullDisableRequested);
    }

    fn on_low_power_disable_requested(&self) {
        self.record(Call::LowPowerDisableRequested);
    }

    fn clear_disable_guard(&self) {
        self.record(Call::ClearDisableGuard);
    }
}

impl VendorPort for Recorder {
    fn run_teardown_cleanup(&self) {
        self.record(Call::TeardownCleanup);
    }
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn builder(recorder: &Arc<Recorder>) -> SequencerBuilder {
    SequencerBuilder::new()
        .service(recorder)
        .properties(recorder)
        .vendor(recorder)
}

pub fn dispatcher(recorder: &Arc<Recorder>) -> Dispatcher<ManualTimers> {
    init_tracing();
    builder(recorder)
        .build_dispatcher(ManualTimers::new())
        .unwrap()
}

pub fn dispatcher_with(
    recorder: &Arc<Recorder>,
    config: SequencerConfig,
) -> Dispatcher<ManualTimers> {
    init_tracing();
    builder(recorder)
        .config(config)
        .build_dispatcher(ManualTimers::new())
        .unwrap()
}

/// Submit `events` and process everything.
pub fn drive(dispatcher: &mut Dispatcher<ManualTimers>, events: &[Event]) {
    for event in events {
        dispatcher.submit(*event);
    }
    dispatcher.run_until_idle();
}

pub fn to_layer1_on(dispatcher: &mut Dispatcher<ManualTimers>) {
    drive(
        dispatcher,
        &[Event::RequestLayer1On, Event::HardwareLayer1Started],
    );
    assert_eq!(dispatcher.state(), PowerState::Layer1On);
}

pub fn to_layer2_on(dispatcher: &mut Dispatcher<ManualTimers>) {
    to_layer1_on(dispatcher);
    drive(
        dispatcher,
        &[
            Event::RequestLayer2On,
            Event::HardwareLayer2Started,
            Event::HardwareEnabled,
        ],
    );
    assert_eq!(dispatcher.state(), PowerState::Layer2On);
}
