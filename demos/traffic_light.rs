//! Traffic Light State Machine
//!
//! This example demonstrates a cyclic machine driven by `run`.
//!
//! Key concepts:
//! - Each state nominates its successor from `process`
//! - The current state decides which successors are legal
//! - Hooks observe the previous and the next state
//! - The engine's own events show up with `RUST_LOG=waypoint=trace`
//!
//! Run with: cargo run --example traffic_light

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use waypoint::core::{State, StateKey};
use waypoint::{state_key, MachineBuilder};

state_key! {
    enum TrafficLight {
        Red,
        Green,
        Yellow,
    }
}

struct Lamp {
    color: TrafficLight,
    cycles_left: Arc<AtomicUsize>,
}

impl State<TrafficLight> for Lamp {
    fn id(&self) -> TrafficLight {
        self.color
    }

    fn is_valid_next_state(&self, next: &dyn State<TrafficLight>) -> bool {
        matches!(
            (self.color, next.id()),
            (TrafficLight::Red, TrafficLight::Green)
                | (TrafficLight::Green, TrafficLight::Yellow)
                | (TrafficLight::Yellow, TrafficLight::Red)
        )
    }

    fn did_enter(&self, from: Option<&dyn State<TrafficLight>>) {
        let from = from.map(|s| s.id());
        let from = from.as_ref().map_or("off", StateKey::name);
        println!("  {} -> {}", from, self.color.name());
    }

    fn process(&self) -> Option<TrafficLight> {
        match self.color {
            TrafficLight::Red => {
                let left = self.cycles_left.load(Ordering::SeqCst);
                if left == 0 {
                    return None;
                }
                self.cycles_left.store(left - 1, Ordering::SeqCst);
                Some(TrafficLight::Green)
            }
            TrafficLight::Green => Some(TrafficLight::Yellow),
            TrafficLight::Yellow => Some(TrafficLight::Red),
        }
    }

    fn will_exit(&self, to: Option<&dyn State<TrafficLight>>) {
        if to.is_none() {
            println!("  {} -> off", self.color.name());
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Traffic Light State Machine ===\n");

    let cycles_left = Arc::new(AtomicUsize::new(2));
    let lamp = |color| Lamp {
        color,
        cycles_left: Arc::clone(&cycles_left),
    };

    let machine = MachineBuilder::new()
        .state(lamp(TrafficLight::Red))
        .state(lamp(TrafficLight::Green))
        .state(lamp(TrafficLight::Yellow))
        .record_history(true)
        .build()
        .unwrap();

    println!("Running two full cycles:");
    machine.run(None).unwrap();

    let history = machine.history();
    println!("\nCommitted {} transitions", history.len());
    println!("Path: {:?}", history.get_path());

    println!("\nA manual jump from Red to Yellow is rejected:");
    println!("  enter(Yellow) = {}", machine.enter(TrafficLight::Yellow));
    println!("  current = {:?}", machine.current_id());

    println!("\n=== Example Complete ===");
}
