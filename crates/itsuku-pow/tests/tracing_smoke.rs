//! Exercises the `tracing::debug!`/`info!` calls threaded through C3-C8
//! under a real subscriber, the way `librqbit`'s test harness wires one up
//! per test rather than leaving the crate's instrumentation unobserved.

use itsuku_pow::{prove, verify, CancelToken, Difficulty, Params};

#[test]
fn prove_and_verify_emit_tracing_events() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let params = Params::new(64, 64, 64, 16, 1, 2, 9, Difficulty::Bits(4)).unwrap();
    let challenge = vec![7u8; 64];
    let cancel = CancelToken::new();

    let proof = prove(&params, &challenge, params.d.clone(), 2, &cancel)
        .unwrap()
        .expect("difficulty=4 over T=16 should be found quickly");

    let result = verify(&params, &challenge, &proof.nonce, &proof.round_l, &proof.z, &params.d);
    assert!(result.is_ok(), "{result:?}");
}
