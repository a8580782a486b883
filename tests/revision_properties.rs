// tests/revision_properties.rs

use proptest::prelude::*;

use autodeploy::engine::{ReconcileOutcome, Reconciler};
use autodeploy_test_utils::builders::{ConfigFileBuilder, Scenario};

// Revision ids are drawn from a tiny alphabet so equal pairs come up often.
fn revision() -> impl Strategy<Value = Option<&'static str>> {
    prop_oneof![
        1 => Just(None),
        3 => prop::sample::select(vec!["abc123", "def456", "0badc0de"]).prop_map(Some),
    ]
}

fn liveness() -> impl Strategy<Value = Option<&'static str>> {
    prop::sample::select(vec![Some("true"), Some("false"), None])
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn deploy_happens_iff_revisions_differ(
        local in revision(),
        remote in revision(),
        alive in liveness(),
        fetch_ok in any::<bool>(),
        rebuild_ok in any::<bool>(),
    ) {
        let settings = ConfigFileBuilder::new().without_lock().build().deploy;
        let mut scenario = Scenario::new(&settings)
            .liveness(&[alive])
            .revisions(local, remote);
        if !fetch_ok {
            scenario = scenario.fetch_fails();
        }
        if !rebuild_ok {
            scenario = scenario.rebuild_fails();
        }
        let c = scenario.commands().clone();
        let runner = scenario.runner();
        let log = runner.log();
        let mut reconciler = Reconciler::new(settings, runner);

        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let outcome = rt.block_on(reconciler.reconcile());

        // Recovery is always issued before any version comparison.
        if alive != Some("true") {
            let start_at = log.position(&c.start);
            prop_assert!(start_at.is_some());
            prop_assert!(start_at < log.position(&c.local));
        }

        match (fetch_ok, local, remote) {
            (true, Some(l), Some(r)) if l == r => {
                prop_assert_eq!(outcome, ReconcileOutcome::NoOpUpToDate);
                prop_assert_eq!(log.count(&c.pull), 0);
                prop_assert_eq!(log.count(&c.rebuild), 0);
            }
            (true, Some(_), Some(_)) => {
                prop_assert_eq!(log.count(&c.pull), 1);
                prop_assert_eq!(log.count(&c.rebuild), 1);
                prop_assert!(log.position(&c.pull) < log.position(&c.rebuild));
                let expected = if rebuild_ok {
                    ReconcileOutcome::Deployed
                } else {
                    ReconcileOutcome::DeployFailed
                };
                prop_assert_eq!(outcome, expected);
            }
            _ => {
                prop_assert_eq!(outcome, ReconcileOutcome::FetchFailed);
                prop_assert_eq!(log.count(&c.pull), 0);
                prop_assert_eq!(log.count(&c.rebuild), 0);
            }
        }

        // Prune runs exactly when a rebuild ran and succeeded.
        let rebuilt_ok = log.count(&c.rebuild) == 1 && rebuild_ok;
        prop_assert_eq!(log.count(&c.prune), usize::from(rebuilt_ok));
    }
}
