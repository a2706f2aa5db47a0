//! Mock VPC firmware, clock and delay for unit tests
extern crate std;

use core::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;
use std::vec::Vec;

use embassy_time::{Duration, Instant};
use embedded_hal_async::delay::DelayNs;
use vpc_services::acpi::{self, Args, Gateway, Method};
use vpc_services::vpc::{Command, Slot};

use crate::ec::Clock;

/// Gateway call as seen by the firmware
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Call {
    ReadSlot(Slot),
    WriteSlot(Slot, u32),
    Method(Method, Args),
}

#[derive(Default)]
struct State {
    /// State words returned by the get methods
    states: BTreeMap<&'static str, u32>,
    /// Results returned by the set methods
    results: BTreeMap<&'static str, u32>,
    /// EC registers by command code
    registers: BTreeMap<u32, u32>,
    config: u32,
    /// Busy reads per exchange
    busy: u32,
    pending: u32,
    staged: Option<u32>,
    data: u32,
    failing: Vec<&'static str>,
    failing_commands: Vec<u32>,
    calls: Vec<Call>,
}

/// Emulates the VPC ACPI methods and the EC behind them
#[derive(Default)]
pub(crate) struct Firmware {
    state: RefCell<State>,
}

impl Firmware {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn set_state(&self, get: Method, value: u32) {
        self.state.borrow_mut().states.insert(get.name(), value);
    }

    pub(crate) fn state(&self, get: Method) -> u32 {
        self.state.borrow().states.get(get.name()).copied().unwrap_or(0)
    }

    pub(crate) fn set_result(&self, set: Method, result: u32) {
        self.state.borrow_mut().results.insert(set.name(), result);
    }

    pub(crate) fn set_config(&self, config: u32) {
        self.state.borrow_mut().config = config;
    }

    pub(crate) fn set_register(&self, command: Command, value: u32) {
        self.state.borrow_mut().registers.insert(command.0, value);
    }

    pub(crate) fn register(&self, command: Command) -> Option<u32> {
        self.state.borrow().registers.get(&command.0).copied()
    }

    /// Command slot reads back busy `busy` times for every exchange
    pub(crate) fn set_busy(&self, busy: u32) {
        self.state.borrow_mut().busy = busy;
    }

    pub(crate) fn fail_method(&self, method: Method) {
        self.state.borrow_mut().failing.push(method.name());
    }

    /// Reject writes of `command` to the command slot
    pub(crate) fn fail_command(&self, command: Command) {
        self.state.borrow_mut().failing_commands.push(command.0);
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.state.borrow().calls.clone()
    }

    /// Command codes written to the command slot, in order
    pub(crate) fn commands(&self) -> Vec<u32> {
        self.state
            .borrow()
            .calls
            .iter()
            .filter_map(|call| match call {
                Call::WriteSlot(Slot::Command, command) => Some(*command),
                _ => None,
            })
            .collect()
    }

    /// Number of evaluations of `method`, failed ones included
    pub(crate) fn count(&self, method: Method) -> usize {
        self.state
            .borrow()
            .calls
            .iter()
            .filter(|call| match call {
                Call::ReadSlot(_) => method == acpi::READ_STATUS,
                Call::WriteSlot(_, _) => method == acpi::WRITE_STATUS,
                Call::Method(m, _) => *m == method,
            })
            .count()
    }

    pub(crate) fn last_argument(&self, method: Method) -> Option<u32> {
        self.state.borrow().calls.iter().rev().find_map(|call| match call {
            Call::Method(m, Args::One(arg)) if *m == method => Some(*arg),
            _ => None,
        })
    }

    fn slot(args: Args) -> Slot {
        match args {
            Args::One(0) | Args::Two(0, _) => Slot::Data,
            _ => Slot::Command,
        }
    }

    fn handle(&self, method: Method, args: Args) -> Result<u32, ()> {
        let mut state = self.state.borrow_mut();

        let call = match method {
            acpi::READ_STATUS => Call::ReadSlot(Self::slot(args)),
            acpi::WRITE_STATUS => match args {
                Args::Two(_, data) => Call::WriteSlot(Self::slot(args), data),
                _ => return Err(()),
            },
            _ => Call::Method(method, args),
        };
        state.calls.push(call);

        if state.failing.contains(&method.name()) {
            return Err(());
        }

        match call {
            Call::ReadSlot(Slot::Command) => {
                if state.pending > 0 {
                    state.pending -= 1;
                    Ok(1)
                } else {
                    Ok(0)
                }
            }
            Call::ReadSlot(Slot::Data) => Ok(state.data),
            Call::WriteSlot(Slot::Data, value) => {
                state.staged = Some(value);
                Ok(0)
            }
            Call::WriteSlot(Slot::Command, command) => {
                if state.failing_commands.contains(&command) {
                    return Err(());
                }

                match state.staged.take() {
                    Some(value) => {
                        state.registers.insert(command, value);
                    }
                    None => state.data = state.registers.get(&command).copied().unwrap_or(0),
                }
                state.pending = state.busy;
                Ok(0)
            }
            Call::Method(_, _) => Ok(Self::evaluate_method(&mut state, method, args)),
        }
    }

    fn evaluate_method(state: &mut State, method: Method, args: Args) -> u32 {
        let argument = match args {
            Args::One(argument) => argument,
            _ => 0,
        };

        match method {
            acpi::GET_CONFIG => state.config,
            acpi::GET_CLAMSHELL | acpi::GET_CONSERVATION | acpi::GET_FNLOCK => {
                state.states.get(method.name()).copied().unwrap_or(0)
            }
            acpi::SET_CLAMSHELL | acpi::SET_CONSERVATION | acpi::SET_FNLOCK => {
                let result = state.results.get(method.name()).copied().unwrap_or(0);
                if result != 0 {
                    return result;
                }

                // SCSM stores its argument as the new state
                if method == acpi::SET_CLAMSHELL {
                    state.states.insert(acpi::GET_CLAMSHELL.name(), argument);
                    return 0;
                }

                let (get, bit, on, off) = match method {
                    acpi::SET_CONSERVATION => (acpi::GET_CONSERVATION, 5, 0x3, 0x5),
                    _ => (acpi::GET_FNLOCK, 10, 0xE, 0xF),
                };
                let word = state.states.entry(get.name()).or_insert(0);
                if argument == on {
                    *word |= 1 << bit;
                } else if argument == off {
                    *word &= !(1 << bit);
                }
                0
            }
            _ => 0,
        }
    }
}

impl Gateway for &Firmware {
    type Error = ();

    async fn evaluate(&mut self, method: Method, args: Args) -> Result<u32, Self::Error> {
        self.handle(method, args)
    }
}

/// Manually advanced clock, starts at zero
#[derive(Clone, Default)]
pub(crate) struct MockClock {
    now_us: Rc<Cell<u64>>,
}

impl MockClock {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn advance(&self, duration: Duration) {
        self.now_us.set(self.now_us.get() + duration.as_micros());
    }

    pub(crate) fn elapsed(&self) -> Duration {
        Duration::from_micros(self.now_us.get())
    }
}

impl Clock for MockClock {
    fn now(&self) -> Instant {
        Instant::from_micros(self.now_us.get())
    }
}

/// Delay that advances a [`MockClock`] instead of waiting
pub(crate) struct MockDelay {
    clock: MockClock,
    /// Overrides the requested delay
    step: Option<Duration>,
}

impl MockDelay {
    pub(crate) fn new(clock: &MockClock) -> Self {
        Self {
            clock: clock.clone(),
            step: None,
        }
    }

    pub(crate) fn set_step(&mut self, step: Duration) {
        self.step = Some(step);
    }
}

impl DelayNs for MockDelay {
    async fn delay_ns(&mut self, ns: u32) {
        let step = self.step.unwrap_or(Duration::from_micros(ns as u64 / 1000));
        self.clock.advance(step);
    }
}
