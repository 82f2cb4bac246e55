//! Tests for the capability layer — `EventSource` by composition and the
//! `WithEvents` decorator.

use std::sync::{Arc, Mutex};

use signalbox::{Emitter, EventSource, WithEvents};

fn make_log() -> Arc<Mutex<Vec<String>>> {
    Arc::new(Mutex::new(Vec::new()))
}

// ============================================================================
// EventSource by composition
// ============================================================================

struct Thermostat {
    target: f64,
    events: Emitter<f64>,
}

impl Thermostat {
    fn new(target: f64) -> Self {
        Self {
            target,
            events: Emitter::new(),
        }
    }

    fn report(&self, celsius: f64) {
        if celsius > self.target {
            self.emit("over", &celsius);
        }
        self.emit("reading", &celsius);
    }
}

impl EventSource<f64> for Thermostat {
    fn emitter(&self) -> &Emitter<f64> {
        &self.events
    }
}

#[test]
fn host_type_gains_the_full_surface_through_one_accessor() {
    let thermostat = Thermostat::new(20.0);
    let log = make_log();

    {
        let log = Arc::clone(&log);
        thermostat.on("reading", move |c| log.lock().unwrap().push(format!("reading:{c}")));
    }
    {
        let log = Arc::clone(&log);
        thermostat.on("over", move |c| log.lock().unwrap().push(format!("over:{c}")));
    }

    thermostat.report(18.0);
    thermostat.report(23.0);

    assert_eq!(
        *log.lock().unwrap(),
        vec!["reading:18", "over:23", "reading:23"]
    );
}

#[test]
fn trait_provided_off_and_once_delegate() {
    let thermostat = Thermostat::new(20.0);
    let log = make_log();

    let id = {
        let log = Arc::clone(&log);
        thermostat.on("reading", move |_| log.lock().unwrap().push("on".to_string()))
    };
    {
        let log = Arc::clone(&log);
        thermostat.once("reading", move |_| log.lock().unwrap().push("once".to_string()));
    }

    thermostat.off("reading", id);
    thermostat.report(19.0);
    thermostat.report(19.0);

    assert_eq!(*log.lock().unwrap(), vec!["once"]);
    assert!(!thermostat.has_listeners("reading"));
}

#[test]
fn trait_wildcard_and_introspection_delegate() {
    let thermostat = Thermostat::new(20.0);
    let log = make_log();
    let log_clone = Arc::clone(&log);

    thermostat.on_any(move |channel, c| {
        log_clone.lock().unwrap().push(format!("{channel}:{c}"));
    });
    let id = thermostat.on("reading", |_| {});

    assert_eq!(thermostat.listeners("reading"), vec![id]);

    thermostat.report(25.0);
    assert_eq!(*log.lock().unwrap(), vec!["over:25", "reading:25"]);

    thermostat.clear_listeners();
    assert!(!thermostat.has_listeners("reading"));
}

// ============================================================================
// WithEvents decorator
// ============================================================================

#[derive(Debug, PartialEq)]
struct Door {
    name: &'static str,
}

#[test]
fn decorator_exposes_the_capability_and_the_host() {
    let mut door = WithEvents::<Door, ()>::new(Door { name: "front" });
    let log = make_log();
    let log_clone = Arc::clone(&log);

    door.on("opened", move |_| log_clone.lock().unwrap().push("opened".to_string()));
    door.emit("opened", &());

    assert_eq!(*log.lock().unwrap(), vec!["opened"]);
    assert_eq!(door.host().name, "front");

    door.host_mut().name = "back";
    assert_eq!(door.into_inner(), Door { name: "back" });
}

#[test]
fn decorated_hosts_have_independent_registries() {
    let first = WithEvents::<Door, ()>::new(Door { name: "a" });
    let second = WithEvents::<Door, ()>::new(Door { name: "b" });
    let log = make_log();
    let log_clone = Arc::clone(&log);

    first.on("opened", move |_| log_clone.lock().unwrap().push("first".to_string()));

    second.emit("opened", &());
    assert!(
        log.lock().unwrap().is_empty(),
        "subscribing on one host must never affect the other"
    );
    assert!(first.has_listeners("opened"));
    assert!(!second.has_listeners("opened"));

    first.emit("opened", &());
    assert_eq!(*log.lock().unwrap(), vec!["first"]);
}
