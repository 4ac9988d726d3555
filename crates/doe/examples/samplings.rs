use gpemu_doe::{Design, DesignKind, LhsKind, SamplingMethod};
use ndarray::array;

fn main() {
    let lower = array![0., -10., 5.];
    let upper = array![1., 10., 15.];
    let n = 8;

    println!("Take {n} samples in");
    println!("lower = {lower}, upper = {upper}\n");

    for kind in [
        DesignKind::SimpleRandom,
        DesignKind::LatinHypercube(LhsKind::Classic),
        DesignKind::LatinHypercube(LhsKind::Centered),
        DesignKind::Sobol { scramble: true },
    ] {
        println!("*** using {kind:?} sampling");
        let mut doe = Design::new(kind, lower.len(), Some(42))
            .and_then(|doe| doe.with_bounds(&lower, &upper))
            .expect("valid design configuration");
        let samples = doe.sample(n);
        println!("{samples}\n");
    }
}
