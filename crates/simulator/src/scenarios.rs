//! Demo scenario assembly.
//!
//! Each scenario wires reference protocol nodes into a [`Simulation`] and
//! returns a report closure that prints the protocol-level outcome after
//! the run.

use meshsim_core::Node;
use meshsim_protocols::{
    BebRelay, EchoClient, EchoServer, FailureDetector, FaultyProcess, HelloSender,
    MonarchicalElection, PingClient, PingServer,
};
use meshsim_simulation::{Simulation, SimulationOptions};
use meshsim_types::Address;
use std::sync::atomic::Ordering;
use std::time::Duration;
use tracing::info;

/// A wired simulation plus a closure reporting protocol outcomes.
pub struct Scenario {
    pub sim: Simulation,
    pub report: Box<dyn FnOnce() + Send>,
}

/// A client pinging a server every 200ms.
pub fn pingpong(options: SimulationOptions) -> Scenario {
    let mut sim = Simulation::new(options);
    let server_addr = Address::new("server");

    let client = PingClient::new(server_addr.clone(), Duration::from_millis(200));
    let server = PingServer::new();
    let (sent, pongs, pings) = (client.pings_sent(), client.pongs(), server.pings());

    sim.add_node(Node::new(Address::new("client"), client))
        .expect("fresh registry");
    sim.add_node(Node::new(server_addr, server))
        .expect("fresh registry");

    Scenario {
        sim,
        report: Box::new(move || {
            info!(
                pings_sent = sent.load(Ordering::Relaxed),
                pings_handled = pings.load(Ordering::Relaxed),
                pongs_handled = pongs.load(Ordering::Relaxed),
                "pingpong outcome"
            );
        }),
    }
}

/// A client bouncing greetings off an echo server every 250ms.
pub fn echo(options: SimulationOptions) -> Scenario {
    let mut sim = Simulation::new(options);
    let server_addr = Address::new("echo");

    let client = EchoClient::new(server_addr.clone(), Duration::from_millis(250));
    let server = EchoServer::new();
    let (reflected, echoed) = (client.reflected(), server.echoed());

    sim.add_node(Node::new(Address::new("client"), client))
        .expect("fresh registry");
    sim.add_node(Node::new(server_addr, server))
        .expect("fresh registry");

    Scenario {
        sim,
        report: Box::new(move || {
            info!(
                echoed = echoed.load(Ordering::Relaxed),
                reflected = reflected.load(Ordering::Relaxed),
                "echo outcome"
            );
        }),
    }
}

/// Three senders broadcasting staggered greetings through a relay.
pub fn broadcast(options: SimulationOptions) -> Scenario {
    let mut sim = Simulation::new(options);
    let relay_addr = Address::new("beb");
    let sender_addrs: Vec<Address> = (1..=3).map(|i| Address::new(format!("h{i}"))).collect();

    let mut peers = sender_addrs.clone();
    peers.push(relay_addr.clone());
    let relay = BebRelay::new(peers);
    let relay_delivered = relay.delivered();
    sim.add_node(Node::new(relay_addr.clone(), relay))
        .expect("fresh registry");

    let mut receiveds = Vec::new();
    for (i, address) in sender_addrs.iter().enumerate() {
        let sender = HelloSender::new(relay_addr.clone(), Duration::from_secs(i as u64));
        receiveds.push((address.clone(), sender.received()));
        sim.add_node(Node::new(address.clone(), sender))
            .expect("fresh registry");
    }

    Scenario {
        sim,
        report: Box::new(move || {
            for (address, received) in receiveds {
                info!(node = %address, delivered = received.lock().unwrap().len(), "broadcast outcome");
            }
            info!(
                node = "beb",
                delivered = relay_delivered.lock().unwrap().len(),
                "broadcast outcome"
            );
        }),
    }
}

/// Three crash-stop nodes with staggered lifetimes, watched by a failure
/// detector and an election node layered over its own detector subnode.
pub fn crash(options: SimulationOptions) -> Scenario {
    let timeout = options.max_latency * 10;
    let mut sim = Simulation::new(options);

    let faulty: Vec<Address> = (1..=3).map(|i| Address::new(format!("f{i}"))).collect();
    for (i, address) in faulty.iter().enumerate() {
        let lifetime = Duration::from_secs(2 * (i as u64 + 1));
        sim.add_node(Node::new(address.clone(), FaultyProcess::new(lifetime)))
            .expect("fresh registry");
    }

    let detector = FailureDetector::new(faulty.clone(), faulty.clone(), timeout);
    let detected = detector.detected();
    sim.add_node(Node::new(Address::new("pfd"), detector))
        .expect("fresh registry");

    let election = MonarchicalElection::new(faulty.clone());
    let elected = election.elected();
    sim.add_node(election.into_node(Address::new("le"), timeout))
        .expect("fresh registry");

    Scenario {
        sim,
        report: Box::new(move || {
            info!(crashed = ?detected.lock().unwrap(), "failure detector outcome");
            info!(leaders = ?elected.lock().unwrap(), "election outcome");
        }),
    }
}
