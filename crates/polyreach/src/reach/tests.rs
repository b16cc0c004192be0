use super::*;
use nalgebra::{dmatrix, dvector, DVector};

fn square(r: f64, eng: &Engine) -> Polyhedron {
    Polyhedron::from_box(dvector![-r, -r], dvector![r, r], eng).unwrap()
}

/// Shift register `x1⁺ = x2`, `x2⁺ = u`, full-state output, zero gains.
fn shift_system() -> LinearSystem {
    LinearSystem::new(
        dmatrix![0.0, 1.0; 0.0, 0.0],
        dmatrix![0.0; 1.0],
        DMatrix::identity(2, 2),
        DMatrix::zeros(2, 1),
    )
    .unwrap()
}

fn assert_box(p: &Polyhedron, hi: &[f64]) {
    for (i, h) in hi.iter().enumerate() {
        let mut d = DVector::zeros(hi.len());
        d[i] = 1.0;
        assert!(p.contains_point(&(&d * *h), 1e-6), "{} misses +{h} e{i}", p.name());
        assert!(!p.contains_point(&(&d * (*h + 1e-3)), 1e-6), "{} exceeds +{h} e{i}", p.name());
        assert!(p.contains_point(&(&d * -*h), 1e-6), "{} misses -{h} e{i}", p.name());
    }
}

#[test]
fn shift_register_offsets() {
    let eng = Engine::default();
    let w = square(0.1, &eng);
    let xf = square(1.0, &eng);
    let y0 = square(2.0, &eng);
    let gains = FixedGains(vec![DMatrix::zeros(1, 2); 2]);

    let r = reachability_matrices(&shift_system(), &w, &xf, &y0, 3, &gains, &eng).unwrap();
    assert_eq!(r.y.len(), 3);
    assert_eq!(r.q.len(), 3);
    assert_eq!(r.l.len(), 3);

    assert_eq!(r.y[0].a(), y0.a());
    assert_eq!(r.y[0].b(), y0.b());
    assert_eq!(r.q[0].b(), xf.b());
    assert_eq!(r.y[0].name(), "Y[0]");
    assert_eq!(r.q[2].name(), "Q[2]");

    assert_eq!(r.l[1], dmatrix![0.0, 1.0; 0.0, 0.0]);
    assert_eq!(r.l[2], DMatrix::zeros(2, 2));

    assert_box(&r.q[1], &[0.9, 0.9]);
    assert_box(&r.q[2], &[0.8, 0.9]);
    assert_box(&r.y[1], &[1.9, 1.9]);
    assert_box(&r.y[2], &[1.8, 1.9]);
}

#[test]
fn tightened_sets_are_nested() {
    // double integrator with deadbeat feedback: A + B K is nilpotent
    let eng = Engine::default();
    let sys = LinearSystem::new(
        dmatrix![1.0, 1.0; 0.0, 1.0],
        dmatrix![0.0; 1.0],
        DMatrix::identity(2, 2),
        DMatrix::zeros(2, 1),
    )
    .unwrap();
    let k = dmatrix![-1.0, -2.0];
    let w = square(0.1, &eng);
    let y0 = square(2.0, &eng);
    let gains = FixedGains(vec![k.clone(), k]);

    let r = reachability_matrices(&sys, &w, &y0, &y0, 3, &gains, &eng).unwrap();
    assert!((&r.l[1] * &r.l[1]).norm() < 1e-12);
    for i in 0..2 {
        assert!(r.y[i].contains(&r.y[i + 1], &eng).unwrap(), "Y[{}] not in Y[{i}]", i + 1);
        assert!(r.q[i].contains(&r.q[i + 1], &eng).unwrap());
    }
    assert_box(&r.y[2], &[1.7, 1.7]);
}

#[test]
fn scalar_output_with_feedthrough() {
    // one output mixing both states plus the input: C + D K = [0.7, -0.1]
    let eng = Engine::default();
    let sys = LinearSystem::new(
        dmatrix![1.0, 1.0; 0.0, 1.0],
        dmatrix![0.0; 1.0],
        dmatrix![1.0, 0.5],
        dmatrix![0.3],
    )
    .unwrap();
    let w = square(0.1, &eng);
    let xf = square(1.0, &eng);
    let y0 = Polyhedron::from_box(dvector![-3.0], dvector![3.0], &eng).unwrap();
    let gains = FixedGains(vec![dmatrix![-1.0, -2.0]]);

    let r = reachability_matrices(&sys, &w, &xf, &y0, 2, &gains, &eng).unwrap();
    assert_eq!(r.y[1].dim(), 1);
    assert_eq!(r.l[1], dmatrix![1.0, 1.0; -1.0, -1.0]);

    // support of [0.7, -0.1] · W is 0.07 + 0.01
    let y1 = &r.y[1];
    assert_eq!(y1.ni(), 2);
    for i in 0..2 {
        assert!((y1.b()[i] - (3.0 - 0.08)).abs() < 1e-7, "row {i}: {}", y1.b()[i]);
    }
    assert!(y1.contains_point(&dvector![2.92], 1e-7));
    assert!(!y1.contains_point(&dvector![2.93], 1e-7));
    assert_box(&r.q[1], &[0.9, 0.9]);
}

#[test]
fn horizon_one_returns_inputs() {
    let eng = Engine::default();
    let w = square(0.1, &eng);
    let xf = square(1.0, &eng);
    let r = reachability_matrices(&shift_system(), &w, &xf, &xf, 1, &FixedGains::default(), &eng).unwrap();
    assert_eq!(r.y.len(), 1);
    assert_eq!(r.l, vec![DMatrix::<f64>::identity(2, 2)]);
}

#[test]
fn rejects_bad_shapes() {
    let eng = Engine::default();
    let w = square(0.1, &eng);
    let xf = square(1.0, &eng);
    let sys = shift_system();

    let err = reachability_matrices(&sys, &w, &xf, &xf, 0, &FixedGains::default(), &eng).unwrap_err();
    assert!(matches!(err, PolyError::Malformed(_)));

    let too_few = FixedGains(vec![DMatrix::zeros(1, 2)]);
    let err = reachability_matrices(&sys, &w, &xf, &xf, 3, &too_few, &eng).unwrap_err();
    assert!(matches!(err, PolyError::Malformed(_)));

    let wrong = FixedGains(vec![DMatrix::zeros(2, 1)]);
    let err = reachability_matrices(&sys, &w, &xf, &xf, 2, &wrong, &eng).unwrap_err();
    assert!(matches!(err, PolyError::Malformed(_)));

    let line = Polyhedron::from_box(dvector![-1.0], dvector![1.0], &eng).unwrap();
    let err = reachability_matrices(&sys, &line, &xf, &xf, 2, &FixedGains(vec![DMatrix::zeros(1, 2)]), &eng)
        .unwrap_err();
    assert!(matches!(err, PolyError::Malformed(_)));

    assert!(LinearSystem::new(DMatrix::zeros(2, 3), DMatrix::zeros(2, 1), DMatrix::zeros(1, 2), DMatrix::zeros(1, 1)).is_err());
}
