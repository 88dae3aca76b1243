//! Relay protocols: best-effort broadcast fan-out and perfect
//! point-to-point links.

use meshsim_core::{Behavior, Node, NodeContext};
use meshsim_protocols::{
    BebRelay, Delivery, Forward, Greeting, HelloSender, PlRelay, HELLO, PL_DELIVER, PL_SEND,
};
use meshsim_simulation::{Simulation, SimulationOptions};
use meshsim_types::{Address, Message, PayloadId, Timer};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[tokio::test(flavor = "multi_thread")]
async fn every_node_delivers_every_greeting() {
    let mut sim = Simulation::new(
        SimulationOptions::default().with_duration(Duration::from_secs(2)),
    );

    let relay_addr = Address::new("beb");
    let sender_addrs: Vec<Address> = (1..=3)
        .map(|i| Address::new(format!("h{i}")))
        .collect();
    let mut peers = sender_addrs.clone();
    peers.push(relay_addr.clone());

    let relay = BebRelay::new(peers);
    let relay_delivered = relay.delivered();
    sim.add_node(Node::new(relay_addr.clone(), relay)).unwrap();

    let mut sents = Vec::new();
    let mut receiveds = Vec::new();
    for (i, address) in sender_addrs.iter().enumerate() {
        let sender = HelloSender::new(
            relay_addr.clone(),
            Duration::from_millis(300) * i as u32,
        );
        sents.push(sender.sent());
        receiveds.push(sender.received());
        sim.add_node(Node::new(address.clone(), sender)).unwrap();
    }

    sim.run().await.unwrap();

    let broadcast: HashSet<_> = sents
        .iter()
        .flat_map(|s| s.lock().unwrap().clone())
        .collect();
    assert_eq!(broadcast.len(), 3, "three unique greetings were broadcast");

    for (i, received) in receiveds.iter().enumerate() {
        let received = received.lock().unwrap();
        assert_eq!(
            *received, broadcast,
            "h{} delivered {:?}, expected all of {:?}",
            i + 1,
            received,
            broadcast
        );
    }
    assert_eq!(
        *relay_delivered.lock().unwrap(),
        broadcast,
        "the relay delivers its own copy of every greeting"
    );
}

/// Hands one greeting to a [`PlRelay`] at init and records the
/// acknowledgements that come back.
struct LinkClient {
    relay: Address,
    destination: Address,
    sent: Arc<Mutex<Option<PayloadId>>>,
    acked: Arc<Mutex<Vec<PayloadId>>>,
}

impl Behavior for LinkClient {
    fn init(&mut self, ctx: &NodeContext<'_>) {
        let greeting = Message::with_data(HELLO, Greeting("over the link".into()));
        *self.sent.lock().unwrap() = Some(greeting.id());
        ctx.send_message(
            Message::with_data(
                PL_SEND,
                Forward {
                    destination: self.destination.clone(),
                    message: greeting,
                },
            ),
            &self.relay,
        );
    }

    fn on_message(&mut self, _ctx: &NodeContext<'_>, message: &Message, _from: &Address) -> bool {
        if message.kind() == PL_DELIVER {
            if let Some(delivery) = message.payload::<Delivery>() {
                self.acked.lock().unwrap().push(delivery.message.id());
            }
            true
        } else {
            false
        }
    }

    fn on_timer(&mut self, _ctx: &NodeContext<'_>, _t: &Timer, _e: Duration) -> bool {
        false
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn perfect_link_forwards_once_and_acknowledges() {
    let mut sim = Simulation::new(
        SimulationOptions::default().with_duration(Duration::from_millis(800)),
    );

    let relay = PlRelay::new();
    let forwarded = relay.forwarded();
    sim.add_node(Node::new(Address::new("pl"), relay)).unwrap();

    // An empty-peered broadcast relay makes a convenient sink: it records
    // every non-broadcast message delivered to it.
    let sink = BebRelay::new(Vec::new());
    let delivered = sink.delivered();
    sim.add_node(Node::new(Address::new("sink"), sink)).unwrap();

    let sent = Arc::new(Mutex::new(None));
    let acked = Arc::new(Mutex::new(Vec::new()));
    sim.add_node(Node::new(
        Address::new("app"),
        LinkClient {
            relay: Address::new("pl"),
            destination: Address::new("sink"),
            sent: sent.clone(),
            acked: acked.clone(),
        },
    ))
    .unwrap();

    sim.run().await.unwrap();

    let greeting_id = sent.lock().unwrap().expect("client sent one greeting");
    assert!(delivered.lock().unwrap().contains(&greeting_id));
    assert_eq!(acked.lock().unwrap().as_slice(), &[greeting_id]);
    assert_eq!(forwarded.lock().unwrap().len(), 1);
}
