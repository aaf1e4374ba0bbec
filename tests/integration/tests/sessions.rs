//! Caller-managed session tests.

use chrono::{Duration, Utc};
use dm_storage::{directory, DirectorySession};
use dm_sync::reconcile;

use crate::common::{keys, TestEnv};

/// Tests that a pass is invisible until the caller commits.
#[tokio::test]
async fn test_rollback_discards_pass() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;
    env.seed(&[("U1", "alice"), ("U2", "bob")]).await?;
    let before = env.entries().await?;

    let mut session = DirectorySession::begin(&env.pool).await?;
    let live = reconcile(&mut session, &keys(&[("U3", "carol")])).await?;
    assert_eq!(live, keys(&[("U3", "carol")]));

    // Other connections still see the old state.
    assert_eq!(env.entries().await?, before);

    session.rollback().await?;
    assert_eq!(env.entries().await?, before);

    Ok(())
}

/// Tests that dropping an uncommitted session rolls it back.
#[tokio::test]
async fn test_dropped_session_discards_pass() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;
    env.seed(&[("U1", "alice")]).await?;
    let before = env.entries().await?;

    {
        let mut session = DirectorySession::begin(&env.pool).await?;
        reconcile(&mut session, &keys(&[])).await?;
    }

    assert_eq!(env.entries().await?, before);

    Ok(())
}

/// Tests that a failed statement can be rolled back to the prior state.
#[tokio::test]
async fn test_failure_midway_rolls_back() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;
    env.seed(&[("U1", "alice")]).await?;
    let before = env.live_keys().await?;

    let mut session = DirectorySession::begin(&env.pool).await?;
    directory::upsert_touch(&mut session, &keys(&[("U2", "bob")]), Utc::now()).await?;
    let err = reconcile(&mut session, &keys(&[("", "ghost")]))
        .await
        .unwrap_err();
    assert!(err.is_constraint_violation());
    session.rollback().await?;

    assert_eq!(env.live_keys().await?, before);

    Ok(())
}

/// Tests that a committed session rejects further queries without I/O.
#[tokio::test]
async fn test_finished_session_is_invalid() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;

    let mut session = DirectorySession::begin(&env.pool).await?;
    reconcile(&mut session, &keys(&[("U1", "alice")])).await?;
    session.commit().await?;
    assert!(!session.is_active());

    let err = reconcile(&mut session, &keys(&[("U2", "bob")]))
        .await
        .unwrap_err();
    assert!(err.is_invalid_session());

    let err = directory::live_keys(&mut session).await.unwrap_err();
    assert!(err.is_invalid_session());
    assert!(session.commit().await.unwrap_err().is_invalid_session());

    assert_eq!(env.live_keys().await?, keys(&[("U1", "alice")]));

    Ok(())
}

/// Tests deletion by key, including keys that do not exist.
#[tokio::test]
async fn test_delete_by_keys() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;
    env.seed(&[("U1", "alice"), ("U2", "bob"), ("U3", "carol")]).await?;

    let mut session = DirectorySession::begin(&env.pool).await?;
    let removed = directory::delete_by_keys(
        &mut session,
        &keys(&[("U2", "bob"), ("U2", "robert"), ("U9", "nobody")]),
    )
    .await?;
    assert_eq!(removed, 1);

    assert_eq!(directory::delete_by_keys(&mut session, &keys(&[])).await?, 0);
    session.commit().await?;

    assert_eq!(env.live_keys().await?, keys(&[("U1", "alice"), ("U3", "carol")]));

    Ok(())
}

/// Tests that a row stamped in the future is still pruned or touched correctly.
#[tokio::test]
async fn test_clock_regression_still_prunes() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;
    env.seed(&[("U1", "alice"), ("U2", "bob")]).await?;

    let future = Utc::now() + Duration::hours(1);
    sqlx::query("UPDATE directory_entries SET updated_at = $1")
        .bind(future)
        .execute(&env.pool)
        .await?;

    let outcome = env.reconciler().reconcile(&keys(&[("U1", "alice")])).await?;

    assert_eq!(outcome.live, keys(&[("U1", "alice")]));
    let alice = env.entry("U1", "alice").await?.expect("touched");
    assert!(alice.updated_at > future);

    Ok(())
}
