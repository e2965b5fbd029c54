mod common;

use common::*;
use proptest::prelude::*;
use se_eos::Phase;

#[test]
fn classification_of_reference_states() {
    let ctx = shared_context();
    assert_eq!(ctx.phase(3000.0, 1e8), Phase::Condensed);
    assert_eq!(ctx.phase(12000.0, 1e6), Phase::Vapor);
    assert_eq!(ctx.phase(5000.0, 3e7), Phase::Supercritical);
    assert_eq!(ctx.phase(5000.0, 1e8), Phase::Supercritical);
    assert_eq!(ctx.phase(5000.0, 1e6), Phase::Mixture);
    assert_eq!(ctx.phase(3000.0, 1e-6), Phase::Invalid);
    assert!(ctx.vapor_quality(3000.0, 1e-6).is_nan());
    assert_eq!(ctx.vapor_quality(3000.0, 1e8), 0.0);
    assert_eq!(ctx.vapor_quality(12000.0, 1e6), 1.0);
}

#[test]
fn phase_codes_are_stable() {
    let codes: Vec<u8> = [
        Phase::Invalid,
        Phase::Condensed,
        Phase::Mixture,
        Phase::Vapor,
        Phase::Supercritical,
    ]
    .iter()
    .map(|p| p.code())
    .collect();
    assert_eq!(codes, vec![0, 1, 2, 3, 4]);
}

proptest! {
    #[test]
    fn every_state_gets_a_phase(s in -1e4f64..1e5, log_p in -8.0f64..12.0) {
        let ctx = shared_context();
        let p = 10f64.powf(log_p);
        let phase = ctx.phase(s, p);
        prop_assert!(Phase::from_code(phase.code()) == Some(phase));
        if p <= 1e-5 {
            prop_assert_eq!(phase, Phase::Invalid);
        } else {
            prop_assert_ne!(phase, Phase::Invalid);
        }
    }

    #[test]
    fn quality_is_a_fraction_inside_the_dome(s in 0.0f64..16000.0, log_p in -5.0f64..7.0) {
        let ctx = shared_context();
        let p = 10f64.powf(log_p);
        if ctx.phase(s, p) == Phase::Mixture {
            let q = ctx.vapor_quality(s, p);
            prop_assert!((0.0..=1.0).contains(&q), "q = {}", q);
        }
    }

    #[test]
    fn quality_grows_with_entropy(s in 0.0f64..15000.0, ds in 1.0f64..500.0, log_p in -5.0f64..6.0) {
        let ctx = shared_context();
        let p = 10f64.powf(log_p);
        let (a, b) = (ctx.phase(s, p), ctx.phase(s + ds, p));
        if a == Phase::Mixture && b == Phase::Mixture {
            let (qa, qb) = (ctx.vapor_quality(s, p), ctx.vapor_quality(s + ds, p));
            prop_assert!(qa.is_finite() && qb.is_finite(), "q = {}, {}", qa, qb);
            // strictly inside (0, 1) the lever rule is strictly increasing
            if qa > 0.0 && qb < 1.0 {
                prop_assert!(qb > qa);
            } else {
                prop_assert!(qb >= qa);
            }
        }
    }

    #[test]
    fn nan_inputs_are_invalid(v in -1e6f64..1e6) {
        let ctx = shared_context();
        prop_assert_eq!(ctx.phase(f64::NAN, v.abs()), Phase::Invalid);
        prop_assert_eq!(ctx.phase(v, f64::NAN), Phase::Invalid);
        prop_assert!(ctx.vapor_quality(v, f64::NAN).is_nan());
    }
}
