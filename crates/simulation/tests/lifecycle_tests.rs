//! Lifecycle semantics: sleep/wake windows, interrupt ordering, stop
//! terminality, empty runs, and external cancellation.

use meshsim_core::{Behavior, Node, NodeContext};
use meshsim_loggers::{LogRecordKind, MemoryLog};
use meshsim_protocols::{PingClient, PingServer};
use meshsim_simulation::{Simulation, SimulationOptions};
use meshsim_types::{
    Address, Interrupt, InterruptKind, Message, NodeState, SimulationState, Timer, TimerKind,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

const SCRIPT_FIRE: TimerKind = TimerKind("script.fire");

/// Sends a fixed batch of interrupts to a target, either at init or after
/// a delay.
struct Scripted {
    target: Address,
    delay: Option<Duration>,
    interrupts: Vec<Interrupt>,
}

impl Behavior for Scripted {
    fn init(&mut self, ctx: &NodeContext<'_>) {
        match self.delay {
            Some(delay) => ctx.set_timer(Timer::new(SCRIPT_FIRE), delay),
            None => {
                for interrupt in self.interrupts.drain(..) {
                    ctx.send_interrupt(interrupt, &self.target);
                }
            }
        }
    }

    fn on_message(&mut self, _ctx: &NodeContext<'_>, _m: &Message, _f: &Address) -> bool {
        false
    }

    fn on_timer(&mut self, ctx: &NodeContext<'_>, timer: &Timer, _e: Duration) -> bool {
        if timer.kind() == SCRIPT_FIRE {
            for interrupt in self.interrupts.drain(..) {
                ctx.send_interrupt(interrupt, &self.target);
            }
            true
        } else {
            false
        }
    }
}

/// Records the kinds of custom interrupts it handles.
struct Recorder {
    seen: Arc<Mutex<Vec<&'static str>>>,
}

impl Behavior for Recorder {
    fn init(&mut self, _ctx: &NodeContext<'_>) {}

    fn on_message(&mut self, _ctx: &NodeContext<'_>, _m: &Message, _f: &Address) -> bool {
        false
    }

    fn on_timer(&mut self, _ctx: &NodeContext<'_>, _t: &Timer, _e: Duration) -> bool {
        false
    }

    fn on_interrupt(&mut self, _ctx: &NodeContext<'_>, interrupt: &Interrupt, _f: &Address) -> bool {
        if interrupt.kind().0.starts_with("custom.") {
            self.seen.lock().unwrap().push(interrupt.kind().0);
            true
        } else {
            false
        }
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn empty_registry_runs_to_the_deadline() {
    let log = Arc::new(MemoryLog::new());
    let mut sim = Simulation::new(
        SimulationOptions::default().with_duration(Duration::from_millis(200)),
    );
    sim.add_logger(log.clone());

    let stats = sim.run().await.unwrap();
    assert_eq!(sim.state(), SimulationState::Finished);
    assert_eq!(stats, Default::default());

    // Only the three simulation state transitions are logged.
    let records = log.records();
    assert_eq!(records.len(), 3);
    let states: Vec<SimulationState> = records
        .iter()
        .filter_map(|r| match r.kind {
            LogRecordKind::SimulationState(s) => Some(s),
            _ => None,
        })
        .collect();
    assert_eq!(
        states,
        vec![
            SimulationState::NotStarted,
            SimulationState::Running,
            SimulationState::Finished
        ]
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn external_cancellation_ends_an_unbounded_run() {
    let mut sim = Simulation::new(
        SimulationOptions::default().with_duration(Duration::ZERO),
    );
    sim.add_node(Node::new(
        Address::new("server"),
        PingServer::new(),
    ))
    .unwrap();

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(150)).await;
        trigger.cancel();
    });

    sim.run_until_cancelled(cancel).await.unwrap();
    assert_eq!(sim.state(), SimulationState::Finished);
}

#[tokio::test(flavor = "multi_thread")]
async fn sleeping_node_drops_messages_until_it_wakes() {
    let log = Arc::new(MemoryLog::new());
    let mut sim = Simulation::new(
        SimulationOptions::default()
            .with_latency(Duration::from_millis(10), Duration::from_millis(100))
            .with_duration(Duration::from_millis(1500)),
    );
    sim.add_logger(log.clone());

    let target = Address::new("target");
    sim.add_node(Node::new(target.clone(), PingServer::new())).unwrap();
    sim.add_node(Node::new(
        Address::new("pinger"),
        PingClient::new(target.clone(), Duration::from_millis(50)),
    ))
    .unwrap();
    sim.add_node(Node::new(
        Address::new("controller"),
        Scripted {
            target: target.clone(),
            delay: Some(Duration::from_millis(500)),
            interrupts: vec![Interrupt::sleep(Duration::from_millis(300))],
        },
    ))
    .unwrap();

    sim.run().await.unwrap();

    // The observed walk is Running, Sleeping, then Running again.
    assert_eq!(
        log.node_states(&target),
        vec![NodeState::Running, NodeState::Sleeping, NodeState::Running]
    );

    // Bound the asleep window by the logged state transitions rather than
    // wall-clock guesses, so timer drift cannot skew the assertions.
    let transitions: Vec<Duration> = log
        .records()
        .into_iter()
        .filter(|r| matches!(r.kind, LogRecordKind::NodeState(ref a, _) if a == &target))
        .map(|r| r.at)
        .collect();
    let (fell_asleep, woke_up) = (transitions[1], transitions[2]);
    assert!(woke_up - fell_asleep >= Duration::from_millis(300));

    let handles = log.message_handles_for(&target);
    assert!(
        handles.iter().any(|at| *at < fell_asleep),
        "target should handle pings before it sleeps"
    );
    assert!(
        !handles.iter().any(|at| *at > fell_asleep && *at < woke_up),
        "no pings may be handled while asleep: {handles:?}"
    );
    assert!(
        handles.iter().any(|at| *at > woke_up),
        "delivery should resume after waking: {handles:?}"
    );

    // Pings that arrived during the window were dropped, not deferred.
    let dropped_while_asleep = log.count(|kind| {
        matches!(kind, LogRecordKind::DropMessage(e) if e.to == target)
    });
    assert!(
        dropped_while_asleep >= 1,
        "a 300ms nap under 50ms pings should drop something"
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn interrupts_arrive_in_send_order_and_stop_is_terminal() {
    let log = Arc::new(MemoryLog::new());
    let mut sim = Simulation::new(
        SimulationOptions::default().with_duration(Duration::from_millis(300)),
    );
    sim.add_logger(log.clone());

    let receiver = Address::new("receiver");
    let seen = Arc::new(Mutex::new(Vec::new()));
    sim.add_node(Node::new(receiver.clone(), Recorder { seen: seen.clone() }))
        .unwrap();

    let stop = Interrupt::stop();
    let stop_id = stop.id();
    let after_stop = Interrupt::new(InterruptKind("custom.late"));
    let after_stop_id = after_stop.id();
    sim.add_node(Node::new(
        Address::new("commander"),
        Scripted {
            target: receiver.clone(),
            delay: None,
            interrupts: vec![
                Interrupt::new(InterruptKind("custom.first")),
                Interrupt::new(InterruptKind("custom.second")),
                stop,
                after_stop,
            ],
        },
    ))
    .unwrap();

    sim.run().await.unwrap();

    // FIFO from one sender to one receiver.
    assert_eq!(
        seen.lock().unwrap().as_slice(),
        &["custom.first", "custom.second"]
    );

    // Stop was handled, the interrupt after it was dropped, and nothing
    // at all is handled for the receiver once Stop lands.
    let stop_at = log
        .interrupt_handled_at(stop_id)
        .expect("stop interrupt handled");
    assert!(log.interrupt_handled_at(after_stop_id).is_none());
    let late_handles: Vec<_> = log
        .records()
        .into_iter()
        .filter(|r| r.at > stop_at)
        .filter(|r| match &r.kind {
            LogRecordKind::HandleMessage(e) => e.to == receiver,
            LogRecordKind::HandleTimer(e) => e.to == receiver,
            LogRecordKind::HandleInterrupt(e) => e.to == receiver,
            _ => false,
        })
        .collect();
    assert!(late_handles.is_empty(), "events handled after stop: {late_handles:?}");
    assert_eq!(log.node_states(&receiver), vec![NodeState::Running, NodeState::Stopped]);
}
