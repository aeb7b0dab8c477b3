//! Behavioural tests for the fallback group: selection, probing, dialing,
//! and scheduler lifecycle. Time is paused so probe ticks are deterministic.

use std::sync::Arc;
use std::time::Duration;

use proxy_fallback::adapters::{AdapterType, Metadata};
use proxy_fallback::group::{FallbackGroup, GroupError};

mod common;

use common::{as_endpoints, option, read_origin, MockProbe, Reachability, ScriptedEndpoint};

/// Let spawned scheduler and probe tasks run without crossing a probe tick.
async fn settle() {
    tokio::time::sleep(Duration::from_millis(10)).await;
}

fn validity(group: &FallbackGroup) -> Vec<bool> {
    group.candidates().iter().map(|c| c.is_valid()).collect()
}

fn target() -> Metadata {
    Metadata::tcp("example.com", 443)
}

#[tokio::test(start_paused = true)]
async fn now_is_first_candidate_when_all_reachable() {
    let endpoints = vec![
        ScriptedEndpoint::new("a", true),
        ScriptedEndpoint::new("b", true),
        ScriptedEndpoint::new("c", true),
    ];
    let group = FallbackGroup::new(&option("auto", 300), as_endpoints(&endpoints), MockProbe::new()).unwrap();

    assert_eq!(group.now(), "a");
    settle().await;
    assert_eq!(group.now(), "a");
    assert_eq!(validity(&group), vec![true, true, true]);
    assert_eq!(group.name(), "auto");
    assert_eq!(group.adapter_type(), AdapterType::Fallback);
}

#[tokio::test(start_paused = true)]
async fn now_follows_priority_order() {
    let endpoints = vec![ScriptedEndpoint::new("a", true), ScriptedEndpoint::new("b", true)];
    let group = FallbackGroup::new(&option("auto", 300), as_endpoints(&endpoints), MockProbe::new()).unwrap();
    settle().await;

    group.candidates()[0].set_valid(false);
    assert_eq!(group.now(), "b");

    group.candidates()[0].set_valid(true);
    assert_eq!(group.now(), "a");
}

#[tokio::test(start_paused = true)]
async fn now_reports_first_candidate_when_none_valid() {
    let endpoints = vec![ScriptedEndpoint::new("a", true), ScriptedEndpoint::new("b", true)];
    let probe = MockProbe::new();
    probe.set_all(&["a", "b"], Reachability::Down);

    let group = FallbackGroup::new(&option("auto", 300), as_endpoints(&endpoints), probe).unwrap();
    settle().await;

    assert_eq!(validity(&group), vec![false, false]);
    assert_eq!(group.now(), "a");
}

#[tokio::test(start_paused = true)]
async fn failures_are_isolated_per_candidate() {
    let endpoints = vec![
        ScriptedEndpoint::new("a", true),
        ScriptedEndpoint::new("b", true),
        ScriptedEndpoint::new("c", true),
        ScriptedEndpoint::new("d", true),
    ];
    let probe = MockProbe::new();
    probe.set("b", Reachability::Down);
    probe.set("d", Reachability::Panic);

    let group = FallbackGroup::new(&option("auto", 300), as_endpoints(&endpoints), probe.clone()).unwrap();
    settle().await;

    // "d" panicked mid-check and is marked invalid; the others keep their own results.
    assert_eq!(validity(&group), vec![true, false, true, false]);
    assert_eq!(probe.calls(), 4);
}

#[tokio::test(start_paused = true)]
async fn panicking_check_demotes_its_candidate() {
    let endpoints = vec![ScriptedEndpoint::new("a", true), ScriptedEndpoint::new("b", true)];
    let probe = MockProbe::new();
    probe.set("a", Reachability::Panic);

    let group = FallbackGroup::new(&option("auto", 300), as_endpoints(&endpoints), probe.clone()).unwrap();
    settle().await;
    assert_eq!(validity(&group), vec![false, true]);
    assert_eq!(group.now(), "b");

    probe.set("a", Reachability::Up);
    group.probe_now().await;
    assert_eq!(validity(&group), vec![true, true]);
    assert_eq!(group.now(), "a");
}

#[tokio::test(start_paused = true)]
async fn probe_now_waits_for_every_candidate() {
    let endpoints = vec![ScriptedEndpoint::new("a", true), ScriptedEndpoint::new("b", true)];
    let probe = MockProbe::new();
    let group = FallbackGroup::new(&option("auto", 300), as_endpoints(&endpoints), probe.clone()).unwrap();
    settle().await;

    probe.set_all(&["a", "b"], Reachability::Down);
    group.probe_now().await;
    assert_eq!(validity(&group), vec![false, false]);
    assert_eq!(probe.calls(), 4);
}

#[tokio::test(start_paused = true)]
async fn periodic_probe_demotes_and_restores() {
    let endpoints = vec![ScriptedEndpoint::new("a", true), ScriptedEndpoint::new("b", true)];
    let probe = MockProbe::new();
    let group = FallbackGroup::new(&option("auto", 10), as_endpoints(&endpoints), probe.clone()).unwrap();
    settle().await;
    assert_eq!(probe.calls(), 2);

    probe.set("a", Reachability::Down);
    tokio::time::sleep(Duration::from_secs(10)).await;
    settle().await;
    assert_eq!(group.now(), "b");
    assert_eq!(probe.calls(), 4);

    probe.set("a", Reachability::Up);
    tokio::time::sleep(Duration::from_secs(10)).await;
    settle().await;
    assert_eq!(group.now(), "a");
}

#[tokio::test(start_paused = true)]
async fn dial_falls_through_to_next_candidate() {
    let endpoints = vec![ScriptedEndpoint::new("a", false), ScriptedEndpoint::new("b", true)];
    let group = FallbackGroup::new(&option("auto", 300), as_endpoints(&endpoints), MockProbe::new()).unwrap();
    settle().await;

    let conn = group.dial(&target()).await.unwrap();
    assert_eq!(read_origin(conn).await, "b");
    assert_eq!(validity(&group), vec![false, true]);
    assert_eq!(group.now(), "b");

    // The demoted candidate is skipped on the next dial.
    let conn = group.dial(&target()).await.unwrap();
    assert_eq!(read_origin(conn).await, "b");
    assert_eq!(endpoints[0].dials(), 1);
    assert_eq!(endpoints[1].dials(), 2);
}

#[tokio::test(start_paused = true)]
async fn dial_via_names_the_candidate_that_answered() {
    let endpoints = vec![
        ScriptedEndpoint::new("a", false),
        ScriptedEndpoint::new("b", true),
        ScriptedEndpoint::new("c", true),
    ];
    let group = FallbackGroup::new(&option("auto", 300), as_endpoints(&endpoints), MockProbe::new()).unwrap();
    settle().await;

    // "a" still looks valid until the dial demotes it, so `now()` before
    // the dial would name the wrong candidate.
    assert_eq!(group.now(), "a");
    let (via, conn) = group.dial_via(&target()).await.unwrap();
    assert_eq!(via, "b");
    assert_eq!(read_origin(conn).await, "b");
}

#[tokio::test(start_paused = true)]
async fn dial_fails_once_every_candidate_is_exhausted() {
    let endpoints = vec![
        ScriptedEndpoint::new("a", false),
        ScriptedEndpoint::new("b", false),
        ScriptedEndpoint::new("c", false),
    ];
    let group = FallbackGroup::new(&option("auto", 300), as_endpoints(&endpoints), MockProbe::new()).unwrap();
    settle().await;

    let err = group.dial(&target()).await.err().unwrap();
    assert!(matches!(err, GroupError::NoUsableEndpoint { ref group } if group == "auto"));
    assert!(!err.is_configuration());
    assert_eq!(validity(&group), vec![false, false, false]);
    for endpoint in &endpoints {
        assert_eq!(endpoint.dials(), 1);
    }

    // Nothing is valid, so a second dial tries nobody.
    assert!(group.dial(&target()).await.is_err());
    for endpoint in &endpoints {
        assert_eq!(endpoint.dials(), 1);
    }
}

#[tokio::test(start_paused = true)]
async fn dial_skips_candidates_already_invalid() {
    let endpoints = vec![ScriptedEndpoint::new("a", true), ScriptedEndpoint::new("b", true)];
    let probe = MockProbe::new();
    probe.set("a", Reachability::Down);
    let group = FallbackGroup::new(&option("auto", 300), as_endpoints(&endpoints), probe).unwrap();
    settle().await;

    let conn = group.dial(&target()).await.unwrap();
    assert_eq!(read_origin(conn).await, "b");
    assert_eq!(endpoints[0].dials(), 0);
}

#[tokio::test(start_paused = true)]
async fn dial_failure_heals_on_next_successful_probe() {
    let endpoints = vec![ScriptedEndpoint::new("a", false), ScriptedEndpoint::new("b", true)];
    let group = FallbackGroup::new(&option("auto", 30), as_endpoints(&endpoints), MockProbe::new()).unwrap();
    settle().await;

    group.dial(&target()).await.unwrap();
    assert_eq!(group.now(), "b");

    endpoints[0].set_dial_ok(true);
    tokio::time::sleep(Duration::from_secs(30)).await;
    settle().await;
    assert_eq!(group.now(), "a");

    let conn = group.dial(&target()).await.unwrap();
    assert_eq!(read_origin(conn).await, "a");
}

#[tokio::test(start_paused = true)]
async fn construction_rejects_empty_candidates_without_side_effects() {
    let probe = MockProbe::new();
    let err = FallbackGroup::new(&option("empty", 1), Vec::new(), probe.clone()).unwrap_err();
    assert!(matches!(err, GroupError::NoEndpoints { ref group } if group == "empty"));
    assert!(err.is_configuration());

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(probe.calls(), 0);
}

#[test]
fn construction_outside_runtime_is_an_error() {
    let endpoints = vec![ScriptedEndpoint::new("a", true)];
    let probe = MockProbe::new();

    let err = FallbackGroup::new(&option("auto", 300), as_endpoints(&endpoints), probe.clone()).unwrap_err();
    assert!(matches!(err, GroupError::NoRuntime { ref group } if group == "auto"));
    assert_eq!(probe.calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn construction_rejects_malformed_url() {
    let endpoints = vec![ScriptedEndpoint::new("a", true)];
    let probe = MockProbe::new();

    for url in ["not a url", "http://", "mailto:ops@example.com", "gopher://example.com/"] {
        let mut opt = option("auto", 300);
        opt.url = url.to_string();
        let err = FallbackGroup::new(&opt, as_endpoints(&endpoints), probe.clone()).unwrap_err();
        assert!(matches!(err, GroupError::InvalidUrl { .. }), "url {:?} gave {:?}", url, err);
        assert!(err.is_configuration());
    }

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(probe.calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn close_stops_probe_scheduler() {
    let endpoints = vec![ScriptedEndpoint::new("a", true), ScriptedEndpoint::new("b", true)];
    let probe = MockProbe::new();
    let group = FallbackGroup::new(&option("auto", 1), as_endpoints(&endpoints), probe.clone()).unwrap();
    settle().await;
    assert_eq!(probe.calls(), 2);
    assert!(!group.is_closed());

    group.close();
    settle().await;
    assert!(group.is_closed());

    probe.set_all(&["a", "b"], Reachability::Down);
    tokio::time::sleep(Duration::from_secs(10)).await;

    assert_eq!(probe.calls(), 2);
    assert_eq!(validity(&group), vec![true, true]);
    // Dialing does not depend on the scheduler.
    let conn = group.dial(&target()).await.unwrap();
    assert_eq!(read_origin(conn).await, "a");
}

#[tokio::test(start_paused = true)]
async fn close_twice_does_not_hang() {
    let endpoints = vec![ScriptedEndpoint::new("a", true)];
    let group = FallbackGroup::new(&option("auto", 1), as_endpoints(&endpoints), MockProbe::new()).unwrap();
    settle().await;

    let closed = tokio::time::timeout(Duration::from_secs(1), async {
        group.close();
        group.close();
        settle().await;
        group.close();
    })
    .await;
    assert!(closed.is_ok());
    assert!(group.is_closed());
}

#[tokio::test(start_paused = true)]
async fn drop_stops_probe_scheduler() {
    let endpoints = vec![ScriptedEndpoint::new("a", true)];
    let probe = MockProbe::new();
    let group = FallbackGroup::new(&option("auto", 1), as_endpoints(&endpoints), probe.clone()).unwrap();
    settle().await;
    assert_eq!(probe.calls(), 1);

    drop(group);
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(probe.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn status_snapshot_serializes() {
    let endpoints = vec![ScriptedEndpoint::new("a", true), ScriptedEndpoint::new("b", true)];
    let probe = MockProbe::new();
    probe.set("a", Reachability::Down);
    let group = FallbackGroup::new(&option("auto", 300), as_endpoints(&endpoints), probe).unwrap();
    settle().await;

    let status = serde_json::to_value(group.status()).unwrap();
    assert_eq!(status["name"], "auto");
    assert_eq!(status["type"], "Fallback");
    assert_eq!(status["now"], "b");
    assert_eq!(status["all"][0]["name"], "a");
    assert_eq!(status["all"][0]["valid"], false);
    assert_eq!(status["all"][1]["type"], "Http");
    assert_eq!(status["all"][1]["valid"], true);
}

#[tokio::test(start_paused = true)]
async fn zero_delay_is_clamped() {
    let endpoints = vec![ScriptedEndpoint::new("a", true)];
    let group = FallbackGroup::new(&option("auto", 0), as_endpoints(&endpoints), Arc::new(common::MockProbe::default())).unwrap();
    assert_eq!(group.probe_interval(), Duration::from_secs(1));
    assert_eq!(group.probe_url().as_str(), "http://www.gstatic.com/generate_204");
}
