//! Copy-on-write promotion is reported through the `log` facade.
//!
//! The logger is process-global, so every test here runs serially and clears
//! the capture buffer first.

mod util;

use std::sync::{Mutex, Once};

use log::{Level, LevelFilter, Log, Metadata, Record};
use serial_test::serial;
use tree_data::prelude::*;
use util::*;

struct Capture;

static RECORDS: Mutex<Vec<(Level, String)>> = Mutex::new(Vec::new());
static LOGGER: Capture = Capture;
static INIT: Once = Once::new();

impl Log for Capture {
    fn enabled(&self, _: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        if record.target().starts_with("tree_data") {
            RECORDS
                .lock()
                .unwrap()
                .push((record.level(), record.args().to_string()));
        }
    }

    fn flush(&self) {}
}

fn capture() {
    INIT.call_once(|| {
        log::set_logger(&LOGGER).unwrap();
        log::set_max_level(LevelFilter::Trace);
    });
    RECORDS.lock().unwrap().clear();
}

fn warnings() -> Vec<String> {
    RECORDS
        .lock()
        .unwrap()
        .iter()
        .filter(|(level, _)| *level == Level::Warn)
        .map(|(_, msg)| msg.clone())
        .collect()
}

#[test]
#[serial]
fn promotion_warns_once() {
    capture();
    let tdata = leaf_container();
    let mut view = tdata.select(Selector::range(0..2), Selector::positions([0, 1])).unwrap();
    let _ = view.x().unwrap();
    let _ = view.obst("tree").unwrap().edges();
    assert!(warnings().is_empty(), "reads never materialize");

    view.set_obs_column("test", 0..2i64).unwrap();
    view.set_obs_column("again", 0..2i64).unwrap();
    let w = warnings();
    assert_eq!(w.len(), 1, "{w:?}");
    assert!(w[0].contains("set_obs_column"), "{}", w[0]);
    assert!(w[0].contains("(2, 2)"), "{}", w[0]);
}

#[test]
#[serial]
fn actual_containers_do_not_warn() {
    capture();
    let mut tdata = leaf_container();
    tdata.set_x_value(0, 0, 1.0).unwrap();
    tdata.set_var_column("flag", vec![true; 8]).unwrap();
    assert!(warnings().is_empty());
}

#[test]
#[serial]
fn structural_rejection_does_not_warn() {
    capture();
    let tdata = leaf_container();
    let view = tdata.select(Selector::labels(["7"]), ..).unwrap();
    assert!(view.obst("tree").unwrap().remove_node("7").is_err());
    assert!(warnings().is_empty());
    assert!(view.is_view());
}

#[test]
#[serial]
fn ignore_handling_is_silent() {
    capture();
    let tdata = leaf_container()
        .with_options(TreeDataOptions::default().with_implicit_copy(ImplicitCopyHandling::Ignore));
    let mut view = tdata.select(Selector::range(0..2), ..).unwrap();
    view.set_x_value(0, 0, 3.0).unwrap();
    assert!(!view.is_view());
    assert!(warnings().is_empty());
}
