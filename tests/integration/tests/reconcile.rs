//! Reconciliation pass tests against a real PostgreSQL.

use dm_model::{Roster, RosterEntry};
use dm_sync::PruneStrategy;

use crate::common::{keys, TestEnv};

/// Tests that a pass deletes absent pairs and keeps surviving ids.
#[tokio::test]
async fn test_replaces_absent_pairs() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;
    env.seed(&[("U1", "alice"), ("U2", "bob")]).await?;
    let alice_before = env.entry("U1", "alice").await?.expect("seeded");

    let outcome = env
        .reconciler()
        .reconcile(&keys(&[("U1", "alice"), ("U3", "carol")]))
        .await?;

    assert_eq!(outcome.live, keys(&[("U1", "alice"), ("U3", "carol")]));
    assert_eq!(env.live_keys().await?, outcome.live);
    assert!(env.entry("U2", "bob").await?.is_none());

    let alice_after = env.entry("U1", "alice").await?.expect("kept");
    assert_eq!(alice_after.id, alice_before.id);
    assert_eq!(alice_after.created_at, alice_before.created_at);

    assert_eq!(outcome.report.added, 1);
    assert_eq!(outcome.report.updated, 1);
    assert_eq!(outcome.report.removed, 1);

    Ok(())
}

/// Tests the first pass over an empty store.
#[tokio::test]
async fn test_inserts_into_empty_store() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;

    let outcome = env.reconciler().reconcile(&keys(&[("U1", "alice")])).await?;

    assert_eq!(outcome.live, keys(&[("U1", "alice")]));
    assert_eq!(outcome.report.added, 1);
    assert_eq!(outcome.report.removed, 0);

    let entries = env.entries().await?;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].external_id, "U1");
    assert_eq!(entries[0].display_name, "alice");

    Ok(())
}

/// Tests that repeating a pass only advances `updated_at`.
#[tokio::test]
async fn test_repeated_pass_is_idempotent() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;
    env.seed(&[("U1", "alice")]).await?;
    let roster = keys(&[("U1", "alice")]);
    let reconciler = env.reconciler();

    let first = reconciler.reconcile(&roster).await?;
    let after_first = env.entry("U1", "alice").await?.expect("present");

    let second = reconciler.reconcile(&roster).await?;
    let after_second = env.entry("U1", "alice").await?.expect("present");

    assert_eq!(first.live, roster);
    assert_eq!(second.live, roster);
    assert_eq!(after_second.id, after_first.id);
    assert_eq!(after_second.created_at, after_first.created_at);
    assert!(after_second.updated_at > after_first.updated_at);

    assert!(!second.report.changed());
    assert_eq!(second.report.updated, 1);

    Ok(())
}

/// Tests that an empty roster prunes every entry.
#[tokio::test]
async fn test_empty_roster_prunes_everything() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;
    env.seed(&[("U1", "alice"), ("U2", "bob")]).await?;

    let outcome = env.reconciler().reconcile(&keys(&[])).await?;

    assert!(outcome.live.is_empty());
    assert_eq!(outcome.report.removed, 2);
    assert!(env.entries().await?.is_empty());

    Ok(())
}

/// Tests convergence from an arbitrary prior state.
#[tokio::test]
async fn test_converges_regardless_of_prior_state() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;
    env.seed(&[("U1", "alice"), ("U1", "Alice L"), ("U9", "old"), ("U4", "dan")])
        .await?;

    let target = keys(&[("U1", "Alice L"), ("U4", "dan"), ("U5", "erin"), ("U6", "frank")]);
    let outcome = env.reconciler().reconcile(&target).await?;

    assert_eq!(outcome.live, target);
    assert_eq!(env.live_keys().await?, target);
    assert_eq!(outcome.report.added, 2);
    assert_eq!(outcome.report.updated, 2);
    assert_eq!(outcome.report.removed, 2);

    Ok(())
}

/// Tests that a renamed member is a delete plus an insert.
#[tokio::test]
async fn test_rename_replaces_row() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;
    env.seed(&[("U1", "alice")]).await?;
    let before = env.entry("U1", "alice").await?.expect("seeded");

    env.reconciler()
        .reconcile(&keys(&[("U1", "Alice Liddell")]))
        .await?;

    assert!(env.entry("U1", "alice").await?.is_none());
    let renamed = env.entry("U1", "Alice Liddell").await?.expect("inserted");
    assert_ne!(renamed.id, before.id);

    Ok(())
}

/// Tests that duplicate and deleted roster entries collapse to live keys.
#[tokio::test]
async fn test_roster_duplicates_and_deleted_members() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;

    let roster: Roster = vec![
        RosterEntry::new("U1", "alice"),
        RosterEntry::new("U1", "alice"),
        RosterEntry::new("U2", "bob").deleted(),
    ]
    .into_iter()
    .collect();

    let outcome = env.reconciler().reconcile(&roster.keys()).await?;

    assert_eq!(outcome.live, keys(&[("U1", "alice")]));
    assert_eq!(env.entries().await?.len(), 1);

    Ok(())
}

/// Tests that a rejected key aborts the whole pass.
#[tokio::test]
async fn test_constraint_violation_leaves_store_unchanged() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;
    env.seed(&[("U1", "alice"), ("U2", "bob")]).await?;
    let before = env.entries().await?;

    for strategy in [PruneStrategy::Timestamp, PruneStrategy::KeyDiff] {
        let err = env
            .reconciler()
            .with_strategy(strategy)
            .reconcile(&keys(&[("U3", "carol"), ("", "ghost")]))
            .await
            .unwrap_err();

        assert!(err.is_constraint_violation(), "unexpected error: {err}");
        assert_eq!(env.entries().await?, before);
    }

    Ok(())
}

/// Tests that the key-diff strategy converges like the timestamp strategy.
#[tokio::test]
async fn test_key_diff_strategy() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;
    env.seed(&[("U1", "alice"), ("U2", "bob")]).await?;
    let alice_before = env.entry("U1", "alice").await?.expect("seeded");

    let reconciler = env.reconciler().with_strategy(PruneStrategy::KeyDiff);
    let outcome = reconciler
        .reconcile(&keys(&[("U1", "alice"), ("U3", "carol")]))
        .await?;

    assert_eq!(outcome.report.strategy, PruneStrategy::KeyDiff);
    assert_eq!(outcome.live, keys(&[("U1", "alice"), ("U3", "carol")]));
    assert_eq!(outcome.report.removed, 1);
    assert_eq!(
        env.entry("U1", "alice").await?.expect("kept").id,
        alice_before.id
    );

    let emptied = reconciler.reconcile(&keys(&[])).await?;
    assert!(emptied.live.is_empty());
    assert_eq!(emptied.report.removed, 2);

    Ok(())
}
