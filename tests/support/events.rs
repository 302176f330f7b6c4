#![allow(dead_code)]

use glam::DVec3;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::f64::consts::PI;
use sv_features::{Covariance3, Jet, PrimaryVertex, SecondaryVertex, SvEvent};

/// Owned collections for one synthetic event.
pub struct TestEvent {
    pub jets: Vec<Jet>,
    pub pvs: Vec<PrimaryVertex>,
    pub svs: Vec<SecondaryVertex>,
}

impl TestEvent {
    pub fn event(&self) -> SvEvent<'_> {
        SvEvent::new(&self.pvs, &self.svs)
    }
}

/// A primary vertex at the origin with isotropic resolution `sigma`.
pub fn origin_pv(sigma: f64) -> PrimaryVertex {
    PrimaryVertex::new(DVec3::ZERO, Covariance3::isotropic(sigma))
}

/// A vertex whose momentum points along (eta, phi) and which sits `flight`
/// (transverse) away from the origin in that direction.
pub fn sv_toward(eta: f64, phi: f64, flight: f64, sigma: f64) -> SecondaryVertex {
    let dir = DVec3::new(phi.cos(), phi.sin(), eta.sinh());
    let momentum = dir * 15.0;
    let mass: f64 = 2.0;
    SecondaryVertex::new(
        dir * flight,
        Covariance3::isotropic(sigma),
        momentum,
        (momentum.length_squared() + mass * mass).sqrt(),
    )
    .with_fit(3, 2.4, 2.0)
}

/// Random event: jets across the acceptance, SVs scattered around random jets
/// with some outside every cone.
pub fn random_event(num_jets: usize, num_svs: usize, seed: u64) -> TestEvent {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    random_event_with_rng(num_jets, num_svs, &mut rng)
}

pub fn random_event_with_rng<R: Rng + ?Sized>(
    num_jets: usize,
    num_svs: usize,
    rng: &mut R,
) -> TestEvent {
    let jets: Vec<Jet> = (0..num_jets)
        .map(|i| {
            let pt: f64 = rng.gen_range(200.0..1200.0);
            let eta: f64 = rng.gen_range(-2.4..2.4);
            let phi: f64 = rng.gen_range(-PI..PI);
            Jet::from_pt_eta_phi_e(i, pt, eta, phi, pt * eta.cosh() * 1.04)
        })
        .collect();

    let pv = PrimaryVertex::new(
        DVec3::new(
            rng.gen_range(-0.01..0.01),
            rng.gen_range(-0.01..0.01),
            rng.gen_range(-5.0..5.0),
        ),
        Covariance3::isotropic(rng.gen_range(0.0005..0.003)),
    );

    let svs = (0..num_svs)
        .map(|_| {
            let (eta, phi) = match jets.get(rng.gen_range(0..num_jets.max(1))) {
                Some(jet) => (
                    jet.eta + rng.gen_range(-1.0..1.0),
                    jet.phi + rng.gen_range(-1.0..1.0),
                ),
                None => (rng.gen_range(-2.4..2.4), rng.gen_range(-PI..PI)),
            };
            let dir = DVec3::new(phi.cos(), phi.sin(), eta.sinh());
            let flight: f64 = rng.gen_range(0.001..2.0);
            let pt: f64 = rng.gen_range(1.0..60.0);
            let mass: f64 = rng.gen_range(0.3..5.0);
            let momentum = dir * pt;
            let ndof = rng.gen_range(1..6u32) as f64;
            SecondaryVertex::new(
                pv.position + dir * flight,
                Covariance3::isotropic(rng.gen_range(0.002..0.06)),
                momentum,
                (momentum.length_squared() + mass * mass).sqrt(),
            )
            .with_fit(rng.gen_range(2..7), rng.gen_range(0.0..5.0) * ndof, ndof)
        })
        .collect();

    TestEvent {
        jets,
        pvs: vec![pv],
        svs,
    }
}
