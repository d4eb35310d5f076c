//! Scenario tests for the run loop, manual transitions and concurrent use.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use waypoint::core::{BaseState, State};
use waypoint::{state_key, Machine, MachineError};

state_key! {
    enum Node {
        A,
        B,
        C,
        D,
        Missing,
    }
}

type Log = Arc<Mutex<Vec<String>>>;

/// State that logs every hook call, follows a fixed successor list and
/// yields a fixed next state.
struct Recorder {
    id: Node,
    successors: Vec<Node>,
    next: Option<Node>,
    log: Log,
}

impl Recorder {
    fn shared(
        id: Node,
        successors: &[Node],
        next: Option<Node>,
        log: &Log,
    ) -> Arc<dyn State<Node>> {
        Arc::new(Self {
            id,
            successors: successors.to_vec(),
            next,
            log: Arc::clone(log),
        })
    }

    fn push(&self, entry: String) {
        self.log.lock().push(entry);
    }
}

impl State<Node> for Recorder {
    fn id(&self) -> Node {
        self.id
    }

    fn is_valid_next_state(&self, next: &dyn State<Node>) -> bool {
        self.successors.contains(&next.id())
    }

    fn did_enter(&self, from: Option<&dyn State<Node>>) {
        self.push(format!("{:?}.did_enter({:?})", self.id, from.map(|s| s.id())));
    }

    fn process(&self) -> Option<Node> {
        self.push(format!("{:?}.process()", self.id));
        self.next
    }

    fn will_exit(&self, to: Option<&dyn State<Node>>) {
        self.push(format!("{:?}.will_exit({:?})", self.id, to.map(|s| s.id())));
    }
}

fn new_log() -> Log {
    Arc::new(Mutex::new(Vec::new()))
}

fn entries(log: &Log) -> Vec<String> {
    log.lock().clone()
}

#[test]
fn chain_calls_hooks_in_order() {
    let log = new_log();
    let machine = Machine::new(vec![
        Recorder::shared(Node::A, &[Node::B], Some(Node::B), &log),
        Recorder::shared(Node::B, &[], None, &log),
    ]);

    machine.run(Some(Node::A)).unwrap();

    assert_eq!(
        entries(&log),
        vec![
            "A.did_enter(None)",
            "A.process()",
            "A.will_exit(Some(B))",
            "B.did_enter(Some(A))",
            "B.process()",
            "B.will_exit(None)",
        ]
    );
    assert_eq!(machine.current_id(), Some(Node::B));
}

#[test]
fn self_rejecting_state_fails_on_second_hop() {
    let log = new_log();
    let machine = Machine::new(vec![Recorder::shared(Node::C, &[], Some(Node::C), &log)]);

    let result = machine.run(Some(Node::C));

    assert_eq!(
        result,
        Err(MachineError::InvalidTransition {
            from: Some(Node::C),
            to: Node::C
        })
    );
    assert_eq!(
        entries(&log),
        vec!["C.did_enter(None)", "C.process()", "C.will_exit(Some(C))"]
    );
    assert_eq!(machine.current_id(), Some(Node::C));
}

#[test]
fn unknown_start_fails_without_hooks() {
    let log = new_log();
    let machine = Machine::new(vec![Recorder::shared(Node::A, &[], None, &log)]);

    let result = machine.run(Some(Node::Missing));

    assert_eq!(
        result,
        Err(MachineError::UnknownState {
            state: Node::Missing,
            from: None
        })
    );
    assert!(entries(&log).is_empty());
    assert!(machine.current_state().is_none());
}

#[test]
fn unknown_next_state_fails_before_exit() {
    let log = new_log();
    let machine = Machine::new(vec![Recorder::shared(
        Node::A,
        &[Node::Missing],
        Some(Node::Missing),
        &log,
    )]);

    let result = machine.run(None);

    assert_eq!(
        result,
        Err(MachineError::UnknownState {
            state: Node::Missing,
            from: Some(Node::A)
        })
    );
    assert_eq!(entries(&log), vec!["A.did_enter(None)", "A.process()"]);
    assert_eq!(machine.current_id(), Some(Node::A));
}

#[test]
fn empty_machine_run_fails() {
    let machine: Arc<Machine<Node>> = Machine::new(Vec::new());

    assert_eq!(machine.run(None), Err(MachineError::Empty));
    assert!(!machine.can_enter(Node::A));
}

#[test]
fn manual_enter_exits_before_swapping() {
    let log = new_log();
    let machine = Machine::new(vec![
        Recorder::shared(Node::A, &[Node::B], Some(Node::B), &log),
        Recorder::shared(Node::B, &[], None, &log),
    ]);

    assert!(machine.enter(Node::A));
    assert!(machine.enter(Node::B));
    assert!(!machine.enter(Node::A));

    assert_eq!(
        entries(&log),
        vec![
            "A.did_enter(None)",
            "A.will_exit(Some(B))",
            "B.did_enter(Some(A))",
        ]
    );
    assert_eq!(machine.current_id(), Some(Node::B));
}

#[test]
fn continues_from_current_state() {
    let log = new_log();
    let machine = Machine::new(vec![
        Recorder::shared(Node::A, &[Node::B], Some(Node::B), &log),
        Recorder::shared(Node::B, &[], None, &log),
    ]);

    assert!(machine.enter(Node::A));
    machine.run(Some(Node::B)).unwrap();

    assert_eq!(
        entries(&log),
        vec![
            "A.did_enter(None)",
            "B.did_enter(Some(A))",
            "B.process()",
            "B.will_exit(None)",
        ]
    );
}

/// Loops on itself until `remaining` reaches zero.
struct Looper {
    remaining: AtomicUsize,
    cycles: AtomicUsize,
}

impl State<Node> for Looper {
    fn id(&self) -> Node {
        Node::D
    }

    fn is_valid_next_state(&self, next: &dyn State<Node>) -> bool {
        next.id() == Node::D
    }

    fn did_enter(&self, _from: Option<&dyn State<Node>>) {
        self.cycles.fetch_add(1, Ordering::SeqCst);
    }

    fn process(&self) -> Option<Node> {
        let left = self.remaining.load(Ordering::SeqCst);
        if left == 0 {
            return None;
        }
        self.remaining.store(left - 1, Ordering::SeqCst);
        Some(Node::D)
    }
}

#[test]
fn permitted_self_loop_reenters_each_time() {
    let looper = Arc::new(Looper {
        remaining: AtomicUsize::new(2),
        cycles: AtomicUsize::new(0),
    });
    let machine = Machine::new(vec![looper.clone() as Arc<dyn State<Node>>]);

    machine.run(None).unwrap();

    assert_eq!(looper.cycles.load(Ordering::SeqCst), 3);
}

/// Queries its machine from inside hooks and work.
#[derive(Default)]
struct Introspective {
    base: BaseState<Node>,
    seen: Mutex<Vec<Option<Node>>>,
}

impl State<Node> for Introspective {
    fn id(&self) -> Node {
        Node::A
    }

    fn is_valid_next_state(&self, next: &dyn State<Node>) -> bool {
        next.id() == Node::B
    }

    fn did_enter(&self, _from: Option<&dyn State<Node>>) {
        if let Some(machine) = self.base.machine() {
            self.seen.lock().push(machine.current_id());
        }
    }

    fn process(&self) -> Option<Node> {
        let machine = self.base.machine()?;
        self.seen.lock().push(machine.current_id());
        machine.can_enter(Node::B).then_some(Node::B)
    }

    fn will_exit(&self, _to: Option<&dyn State<Node>>) {
        if let Some(machine) = self.base.machine() {
            self.seen.lock().push(machine.current_id());
        }
    }

    fn base(&self) -> Option<&BaseState<Node>> {
        Some(&self.base)
    }
}

#[test]
fn states_can_query_their_machine_while_running() {
    let log = new_log();
    let introspective = Arc::new(Introspective::default());
    let machine = Machine::new(vec![
        introspective.clone() as Arc<dyn State<Node>>,
        Recorder::shared(Node::B, &[], None, &log),
    ]);

    machine.run(None).unwrap();

    assert!(introspective.base.is_owned_by(&machine));
    assert_eq!(
        *introspective.seen.lock(),
        vec![Some(Node::A), Some(Node::A), Some(Node::A)]
    );
    assert_eq!(machine.current_id(), Some(Node::B));
}

/// Records what its machine reports from inside the manual-transition hooks.
struct Observer {
    id: Node,
    successor: Node,
    base: BaseState<Node>,
    log: Log,
}

impl Observer {
    fn shared(id: Node, successor: Node, log: &Log) -> Arc<dyn State<Node>> {
        Arc::new(Self {
            id,
            successor,
            base: BaseState::new(),
            log: Arc::clone(log),
        })
    }

    fn note(&self, hook: &str) {
        if let Some(machine) = self.base.machine() {
            let entry = format!(
                "{:?}.{hook}: current={:?} can_enter({:?})={}",
                self.id,
                machine.current_id(),
                self.successor,
                machine.can_enter(self.successor)
            );
            self.log.lock().push(entry);
        }
    }
}

impl State<Node> for Observer {
    fn id(&self) -> Node {
        self.id
    }

    fn is_valid_next_state(&self, next: &dyn State<Node>) -> bool {
        next.id() == self.successor
    }

    fn did_enter(&self, _from: Option<&dyn State<Node>>) {
        self.note("did_enter");
    }

    fn will_exit(&self, _to: Option<&dyn State<Node>>) {
        self.note("will_exit");
    }

    fn base(&self) -> Option<&BaseState<Node>> {
        Some(&self.base)
    }
}

#[test]
fn manual_enter_hooks_see_current_state_and_hold_no_lock() {
    let log = new_log();
    let machine = Machine::new(vec![
        Observer::shared(Node::A, Node::B, &log),
        Observer::shared(Node::B, Node::C, &log),
    ]);

    assert!(machine.enter(Node::A));
    assert!(machine.enter(Node::B));

    assert_eq!(
        entries(&log),
        vec![
            "A.did_enter: current=Some(A) can_enter(B)=true",
            "A.will_exit: current=Some(A) can_enter(B)=true",
            "B.did_enter: current=Some(B) can_enter(C)=false",
        ]
    );
    assert_eq!(machine.current_id(), Some(Node::B));
}

#[test]
fn readers_never_observe_unregistered_state() {
    let log = new_log();
    let machine = Machine::new(vec![
        Recorder::shared(Node::A, &[Node::B], None, &log),
        Recorder::shared(Node::B, &[Node::A], None, &log),
    ]);
    assert!(machine.enter(Node::A));

    std::thread::scope(|scope| {
        for _ in 0..4 {
            let machine = &machine;
            scope.spawn(move || {
                for _ in 0..2_000 {
                    let current = machine.current_state().expect("a state is current");
                    let registered = machine.state(current.id()).expect("registered");
                    assert!(Arc::ptr_eq(&current, &registered));
                    assert!(matches!(current.id(), Node::A | Node::B));
                }
            });
        }

        scope.spawn(|| {
            for i in 0..1_000 {
                let target = if i % 2 == 0 { Node::B } else { Node::A };
                assert!(machine.enter(target));
            }
        });
    });

    assert_eq!(machine.current_id(), Some(Node::A));
}
