//! End-to-end checks of native error delivery through the installed handler.

use std::process::Command;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use parking_lot::Mutex;
use z3_bridge::bridge::{self, has_pending};
use z3_bridge::{
    BRIDGE_STATS, Config, Context, ContextId, ErrorCode, LBool, NativeError, SolverError,
    global_registry,
};

/// Count observer invocations on `ctx`.
fn count_errors(ctx: &Context) -> Arc<AtomicUsize> {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hits);
    ctx.set_error_observer(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    })
    .unwrap();
    hits
}

/// `x >= y` over two Booleans: rejected by libz3 with a sort mismatch.
fn trigger_sort_mismatch(ctx: &Context) -> SolverError {
    let b = ctx.bool_sort().unwrap();
    let x = ctx.constant(&ctx.symbol("x").unwrap(), &b).unwrap();
    let y = ctx.constant(&ctx.symbol("y").unwrap(), &b).unwrap();
    x.ge(&y).unwrap_err()
}

#[test]
fn well_formed_operation_delivers_nothing() {
    let ctx = Context::with_default_config().unwrap();
    let hits = count_errors(&ctx);

    let int = ctx.int_sort().unwrap();
    let x = ctx.constant(&ctx.symbol("x").unwrap(), &int).unwrap();
    let one = ctx.int(1, &int).unwrap();
    let sum = x.add(&[&one]).unwrap();

    assert_eq!(sum.to_string(), "(+ x 1)");
    assert_eq!(hits.load(Ordering::SeqCst), 0);
    assert!(!has_pending());
}

#[test]
fn invalid_operation_is_delivered_exactly_once() {
    let ctx = Context::with_default_config().unwrap();
    let seen: Arc<Mutex<Vec<NativeError>>> = Arc::default();
    let sink = Arc::clone(&seen);
    ctx.set_error_observer(move |err| sink.lock().push(err.clone()))
        .unwrap();

    let err = trigger_sort_mismatch(&ctx);
    let native = err.native().expect("native error");

    let observed = seen.lock().clone();
    assert_eq!(observed.len(), 1);
    assert_eq!(observed[0], *native);
    assert_eq!(native.context, ctx.id());
    assert_ne!(native.code, ErrorCode::OK);
    assert!(native.message.contains("Sort mismatch"), "{native}");
    assert!(!has_pending());
}

#[test]
fn error_on_one_context_does_not_touch_another() {
    let c1 = Context::with_default_config().unwrap();
    let c2 = Context::with_default_config().unwrap();
    assert_ne!(c1.id(), c2.id());
    let hits1 = count_errors(&c1);
    let hits2 = count_errors(&c2);

    let err = trigger_sort_mismatch(&c1);
    assert_eq!(err.native().map(|e| e.context), Some(c1.id()));
    assert_eq!(hits1.load(Ordering::SeqCst), 1);
    assert_eq!(hits2.load(Ordering::SeqCst), 0);

    let b = c2.bool_sort().unwrap();
    let p = c2.constant(&c2.symbol("p").unwrap(), &b).unwrap();
    let solver = c2.solver().unwrap();
    solver.assert(&p.or(&[&p.not().unwrap()]).unwrap()).unwrap();
    assert_eq!(solver.check().unwrap(), LBool::True);
    assert_eq!(hits2.load(Ordering::SeqCst), 0);
}

#[test]
fn context_stays_usable_after_an_error() {
    let ctx = Context::with_default_config().unwrap();
    let hits = count_errors(&ctx);
    let _ = trigger_sort_mismatch(&ctx);

    let int = ctx.int_sort().unwrap();
    let two = ctx.int(2, &int).unwrap();
    assert_eq!(two.mul(&[&two]).unwrap().to_string(), "(* 2 2)");
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[test]
fn reinstalling_the_handler_does_not_duplicate_delivery() {
    let ctx = Context::with_default_config().unwrap();
    ctx.install_error_handler().unwrap();
    ctx.install_error_handler().unwrap();
    assert_eq!(global_registry().install_count(ctx.id()), 3);
    assert_eq!(global_registry().lookup(ctx.id()).map(|o| o.is_none()), Some(true));

    let hits = count_errors(&ctx);
    let _ = trigger_sort_mismatch(&ctx);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[test]
fn panicking_observer_is_contained() {
    let ctx = Context::with_default_config().unwrap();
    ctx.set_error_observer(|_| panic!("observer failure"))
        .unwrap();
    let before = BRIDGE_STATS.snapshot();

    let err = trigger_sort_mismatch(&ctx);
    assert_eq!(err.native().map(|e| e.context), Some(ctx.id()));

    let delta = BRIDGE_STATS.snapshot().since(before);
    assert!(delta.observer_panics >= 1);
    assert!(delta.delivered >= 1);

    ctx.clear_error_observer();
    assert!(ctx.bool_val(true).is_ok());
}

#[test]
fn observer_is_not_called_after_clear() {
    let ctx = Context::with_default_config().unwrap();
    let hits = count_errors(&ctx);
    ctx.clear_error_observer();
    assert!(trigger_sort_mismatch(&ctx).native().is_some());
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[test]
fn installing_on_null_context_fails_setup() {
    // SAFETY: a null handle is rejected before any native call.
    let err = unsafe { bridge::install_error_handler(std::ptr::null_mut()) }.unwrap_err();
    assert!(matches!(err, SolverError::Registration(_)));
    assert!(!bridge::is_installed(ContextId::from_addr(0)));
}

#[test]
fn contexts_on_separate_threads_see_only_their_own_errors() {
    const THREADS: usize = 4;
    const ROUNDS: usize = 25;

    let workers: Vec<_> = (0..THREADS)
        .map(|_| {
            thread::spawn(|| {
                let ctx = Context::new(&Config::new().unwrap()).unwrap();
                let hits = count_errors(&ctx);
                let int = ctx.int_sort().unwrap();
                let n = ctx.int(7, &int).unwrap();
                for round in 0..ROUNDS {
                    if round % 2 == 0 {
                        let err = trigger_sort_mismatch(&ctx);
                        assert_eq!(err.native().map(|e| e.context), Some(ctx.id()));
                    } else {
                        assert_eq!(n.add(&[&n]).unwrap().to_string(), "(+ 7 7)");
                    }
                }
                (ctx.id(), hits.load(Ordering::SeqCst))
            })
        })
        .collect();

    for worker in workers {
        let (id, hits) = worker.join().unwrap();
        assert_eq!(hits, ROUNDS.div_ceil(2), "{id}");
    }
}

const CHILD_ENV: &str = "Z3_BRIDGE_UNHANDLED_CHILD";

/// Child half of `unhandled_error_terminates_the_process`. Does nothing in a
/// normal test run.
#[test]
fn unhandled_error_child() {
    if std::env::var_os(CHILD_ENV).is_none() {
        return;
    }
    let config = Config::new().unwrap();
    let ctx = Context::new_without_error_handler(&config).unwrap();
    let b = ctx.bool_sort().unwrap();
    let x = ctx.constant(&ctx.symbol("x").unwrap(), &b).unwrap();
    // libz3's default handler runs here.
    let _ = x.ge(&x);
    // Reaching this point means the default handler returned.
    std::process::exit(0);
}

#[test]
fn unhandled_error_terminates_the_process() {
    let exe = std::env::current_exe().unwrap();
    let output = Command::new(exe)
        .args(["--exact", "unhandled_error_child", "--nocapture", "--test-threads=1"])
        .env(CHILD_ENV, "1")
        .output()
        .unwrap();
    assert!(
        !output.status.success(),
        "default handler returned control: {:?}",
        output.status
    );
}
