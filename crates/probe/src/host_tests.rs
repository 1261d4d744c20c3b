use super::*;

#[test]
fn refresh_always_produces_a_reading_for_cpu() {
    let mut sampler = HostSampler::new();
    let sample = sampler.refresh();
    assert!(matches!(sample.cpu_pct, Reading::Known(_)));
}

#[test]
fn repeated_refreshes_do_not_panic() {
    let mut sampler = HostSampler::new();
    for _ in 0..3 {
        let _ = sampler.refresh();
    }
}
