//! Integration tests for morpho-telemetry.

use std::thread;

use morpho_telemetry::bus::EventBus;
use morpho_telemetry::events::{EventKind, SimulationEvent};
use morpho_telemetry::sinks::{TracingSink, VecSink};

#[test]
fn emit_and_flush() {
    let mut bus = EventBus::new();
    let sink = VecSink::new();
    bus.add_sink(Box::new(sink.clone()));

    bus.emit(SimulationEvent::new(0, EventKind::TickBegin { sim_time: 0.0 }));
    bus.emit(SimulationEvent::new(
        0,
        EventKind::TickEnd {
            wall_time: 0.001,
            success: true,
        },
    ));
    assert!(sink.is_empty());

    assert_eq!(bus.flush(), 2);
    let events = sink.events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].kind, EventKind::TickBegin { sim_time: 0.0 });
    assert_eq!(bus.dispatched(), 2);
}

#[test]
fn disabled_bus_drops_events() {
    let mut bus = EventBus::new();
    let sink = VecSink::new();
    bus.add_sink(Box::new(sink.clone()));
    bus.set_enabled(false);
    bus.emit(SimulationEvent::new(0, EventKind::Reset));
    assert_eq!(bus.flush(), 0);
    assert!(sink.is_empty());
}

#[test]
fn multiple_sinks_each_receive() {
    let mut bus = EventBus::new();
    let a = VecSink::new();
    let b = VecSink::new();
    bus.add_sink(Box::new(a.clone()));
    bus.add_sink(Box::new(b.clone()));
    bus.add_sink(Box::new(TracingSink::new()));
    assert_eq!(bus.sink_count(), 3);

    bus.emit_all((0..4).map(|t| SimulationEvent::new(t, EventKind::Energy { kinetic: 1.0 })));
    bus.finish();
    assert_eq!(a.len(), 4);
    assert_eq!(b.len(), 4);
}

#[test]
fn sender_from_other_thread() {
    let mut bus = EventBus::new();
    let sink = VecSink::new();
    bus.add_sink(Box::new(sink.clone()));

    let sender = bus.sender();
    thread::spawn(move || {
        sender.emit(SimulationEvent::new(
            3,
            EventKind::Custom {
                label: "sample".into(),
                payload: "{}".into(),
            },
        ))
    })
    .join()
    .unwrap();

    bus.flush();
    assert_eq!(sink.events()[0].tick, 3);
}

#[test]
fn failure_classification() {
    assert!(SimulationEvent::new(1, EventKind::GeometryFailure { bad_tets: 2 }).is_failure());
    assert!(SimulationEvent::new(
        1,
        EventKind::TickEnd {
            wall_time: 0.0,
            success: false
        }
    )
    .is_failure());
    assert!(!SimulationEvent::new(1, EventKind::Reset).is_failure());
}

#[test]
fn event_serialization() {
    let event = SimulationEvent::new(
        5,
        EventKind::Convergence {
            max_displacement: 1e-3,
            mean_displacement: 5e-4,
            max_velocity_delta: 0.2,
            mean_velocity_delta: 0.1,
        },
    );
    let json = serde_json::to_string(&event).unwrap();
    assert!(json.contains("max_displacement"));
    let recovered: SimulationEvent = serde_json::from_str(&json).unwrap();
    assert_eq!(recovered, event);
}
