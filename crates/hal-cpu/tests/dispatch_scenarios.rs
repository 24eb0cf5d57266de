//! Boundary and concrete-scenario tests against the reference scalar
//! backend, plus a seeded-random parity check against every
//! accelerated backend this build carries and this host can run.

use neuronos_hal_core::{pack_group, BackendDescriptor, BYTES_PER_GROUP, GROUP_SIZE};

fn scalar() -> BackendDescriptor {
    neuronos_hal_cpu::scalar::descriptor()
}

fn packed_row(value: i8, groups: usize) -> Vec<u8> {
    let values = [value; GROUP_SIZE];
    let mut packed = [0u8; BYTES_PER_GROUP];
    pack_group(&values, &mut packed);
    packed.iter().copied().cycle().take(groups * BYTES_PER_GROUP).collect()
}

/// Scenario 1: all weights encoded as 2 (+1), all activations = 1, nrc = 1.
#[test]
fn scenario_all_plus_one_weights_unit_activations() {
    let d = scalar();
    let weights = packed_row(1, 1);
    let acts = [1i8; GROUP_SIZE];
    let mut out = [0f32; 1];
    let status = unsafe {
        (d.vec_dot)(GROUP_SIZE, out.as_mut_ptr(), 1, weights.as_ptr(), BYTES_PER_GROUP, acts.as_ptr(), GROUP_SIZE, 1)
    };
    assert!(status.is_ok());
    assert_eq!(out[0], 128.0);
}

/// Scenario 2: all weights encoded as 0 (-1), all activations = 1. The
/// scalar reference exposes the signed-ternary formulation, so the
/// expected result is -128.0 (not the raw-code formulation's 0.0).
#[test]
fn scenario_all_minus_one_weights_unit_activations() {
    let d = scalar();
    let weights = packed_row(-1, 1);
    let acts = [1i8; GROUP_SIZE];
    let mut out = [0f32; 1];
    let status = unsafe {
        (d.vec_dot)(GROUP_SIZE, out.as_mut_ptr(), 1, weights.as_ptr(), BYTES_PER_GROUP, acts.as_ptr(), GROUP_SIZE, 1)
    };
    assert!(status.is_ok());
    assert_eq!(out[0], -128.0);
}

/// Scenario 3: all weights encoded as 1 (0), activations = 5. The
/// signed-ternary sum is 0.0 regardless of the activation value.
#[test]
fn scenario_all_zero_weights_nonunit_activations() {
    let d = scalar();
    let weights = packed_row(0, 1);
    let acts = [5i8; GROUP_SIZE];
    let mut out = [0f32; 1];
    let status = unsafe {
        (d.vec_dot)(GROUP_SIZE, out.as_mut_ptr(), 1, weights.as_ptr(), BYTES_PER_GROUP, acts.as_ptr(), GROUP_SIZE, 1)
    };
    assert!(status.is_ok());
    assert_eq!(out[0], 0.0);
}

/// `n = qk` and `n = k*qk` for k in {1, 4, 16, 64}, each with nrc in
/// {1, 8, 9} (vector path, ultra-parallel path, parallel-plus-tail).
#[test]
fn boundary_group_counts_and_row_counts() {
    let d = scalar();
    for k in [1usize, 4, 16, 64] {
        let n = k * GROUP_SIZE;
        for &nrc in &[1usize, 8, 9] {
            let weights = packed_row(1, k);
            let mut full_weights = Vec::new();
            for _ in 0..nrc {
                full_weights.extend_from_slice(&weights);
            }
            let acts = vec![1i8; n * nrc];
            let mut out = vec![0f32; nrc];
            let status = unsafe {
                (d.vec_dot)(
                    n,
                    out.as_mut_ptr(),
                    1,
                    full_weights.as_ptr(),
                    weights.len(),
                    acts.as_ptr(),
                    n,
                    nrc,
                )
            };
            assert!(status.is_ok(), "k={k} nrc={nrc}");
            for &v in &out {
                assert_eq!(v, n as f32, "k={k} nrc={nrc}");
            }
        }
    }
}

/// Scenario 4: every accelerated backend feasible on this host matches
/// the scalar reference bit-exactly (as an integer sum cast to f32
/// once) on random weights and activations. `n = 2048`, `nrc = 8`.
#[test]
fn accelerated_backends_match_scalar_on_random_input() {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    const N: usize = 2048;
    const NRC: usize = 8;
    let groups = N / GROUP_SIZE;

    let mut rng = StdRng::seed_from_u64(0xA5A5_1234_CAFE_F00D);
    let mut values = vec![0i8; NRC * groups * GROUP_SIZE];
    for v in values.iter_mut() {
        *v = [-1i8, 0, 1][rng.gen_range(0..3)];
    }
    let row_bytes = groups * BYTES_PER_GROUP;
    let mut weights = vec![0u8; NRC * row_bytes];
    for row in 0..NRC {
        for g in 0..groups {
            let chunk: &[i8; GROUP_SIZE] =
                values[(row * groups + g) * GROUP_SIZE..(row * groups + g + 1) * GROUP_SIZE].try_into().unwrap();
            let mut packed = [0u8; BYTES_PER_GROUP];
            pack_group(chunk, &mut packed);
            let start = row * row_bytes + g * BYTES_PER_GROUP;
            weights[start..start + BYTES_PER_GROUP].copy_from_slice(&packed);
        }
    }
    let acts: Vec<i8> = (0..NRC * N).map(|_| rng.gen_range(-127i8..=127)).collect();

    let probed = neuronos_hal_cpu::probe();
    let mut scalar_out = vec![0f32; NRC];
    unsafe {
        (scalar().vec_dot)(N, scalar_out.as_mut_ptr(), 1, weights.as_ptr(), row_bytes, acts.as_ptr(), N, NRC);
    }

    let mut checked_any_accelerated = false;
    for descriptor in neuronos_hal_cpu::compiled_in_backends() {
        if descriptor.name == "scalar" || !descriptor.is_feasible(probed) {
            continue;
        }
        checked_any_accelerated = true;
        let mut out = vec![0f32; NRC];
        let status = unsafe {
            (descriptor.vec_dot)(N, out.as_mut_ptr(), 1, weights.as_ptr(), row_bytes, acts.as_ptr(), N, NRC)
        };
        assert!(status.is_ok(), "backend {} failed", descriptor.name);
        for row in 0..NRC {
            assert_eq!(out[row], scalar_out[row], "backend {} row {row} diverged from scalar", descriptor.name);
        }
    }

    if !checked_any_accelerated {
        eprintln!("no accelerated backend feasible on this host; scenario 4 only exercised the scalar reference");
    }
}
