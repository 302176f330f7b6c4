mod support;

use sv_features::validation::validate;
use sv_features::{fill_event, FeatureBuffer, SvFiller, SvFillerConfig};
use support::events::random_event;

fn fill(jet_radius: f64, events: u64) -> FeatureBuffer {
    let filler = SvFiller::new(SvFillerConfig { jet_radius }).unwrap();
    let mut buffer = FeatureBuffer::new();
    filler.book(&mut buffer).unwrap();
    for seed in 0..events {
        let ev = random_event(2, 15, seed);
        fill_event(&filler, &ev.jets, &ev.event(), &mut buffer).unwrap();
    }
    buffer
}

#[test]
fn test_validation_basic() {
    let report = validate(&fill(0.8, 100));

    assert!(report.is_valid(), "Expected valid buffer: {}", report);
    assert_eq!(report.num_jets, 200);
    assert!(report.total_vertices > 0);
}

#[test]
fn test_validation_various_radii() {
    for r in [0.2, 0.4, 0.8, 1.2] {
        let report = validate(&fill(r, 50));
        assert!(report.is_valid(), "r={}: {}", r, report);
    }
}

#[test]
fn test_validation_unbooked_buffer() {
    let report = validate(&FeatureBuffer::new());
    assert!(!report.is_valid());
    assert!(report.summary().contains("missing features"));
}
