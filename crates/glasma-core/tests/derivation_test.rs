//! Determinism and scaling properties of the lattice parameter derivation.

use glasma_core::{derive, DerivedParameters, GlasmaError, InputSpec};

fn specs() -> Vec<InputSpec> {
    vec![
        InputSpec::default(),
        InputSpec {
            nx: 128,
            nt: 128,
            ..InputSpec::default()
        },
        InputSpec {
            nx: 2048,
            nt: 64,
            ll: 12.0,
            lt: 4.5,
            steps: 8,
            ..InputSpec::default()
        },
        InputSpec {
            sqrts: 5_020_000.0,
            m: 100.0,
            uv: 20_000.0,
            steps: 2,
            ..InputSpec::default()
        },
    ]
}

#[test]
fn test_derive_is_bit_reproducible() {
    for spec in specs() {
        spec.validate().unwrap();
        let first = derive(&spec).unwrap();
        let second = derive(&spec.clone()).unwrap();

        let bits = |p: &DerivedParameters| {
            [
                p.at_fm, p.al_fm, p.e0, p.at, p.al, p.dt, p.gamma, p.qs, p.alphas, p.g, p.mu,
                p.uvt, p.ir, p.sigma, p.sigma_c,
            ]
            .map(f64::to_bits)
        };
        assert_eq!(bits(&first), bits(&second));
        assert_eq!(first.a.map(f64::to_bits), second.a.map(f64::to_bits));
    }
}

#[test]
fn test_lattice_spacing_relations() {
    for spec in specs() {
        let params = derive(&spec).unwrap();

        assert_eq!(params.at, 1.0);
        assert_eq!(params.al, (spec.ll / spec.nx as f64) / (spec.lt / spec.nt as f64));
        assert_eq!(params.dt, params.al / f64::from(spec.steps));
        assert_eq!(params.a, [params.al, 1.0, 1.0]);
    }
}

#[test]
fn test_low_energy_is_a_derivation_error() {
    for sqrts in [1.0, 2.0, 0.5] {
        let spec = InputSpec {
            sqrts,
            ..InputSpec::default()
        };
        spec.validate().unwrap();
        assert!(matches!(
            derive(&spec),
            Err(GlasmaError::Derivation { ref stage, .. }) if stage == "alphas"
        ));
    }
}

#[test]
fn test_uv_below_ir_fails_validation() {
    let spec = InputSpec {
        uv: 100.0,
        m: 200.0,
        ..InputSpec::default()
    };
    let err = spec.validate().unwrap_err();
    assert!(matches!(err, GlasmaError::Validation { .. }));
    assert_eq!(err.field(), Some("uv"));
}
