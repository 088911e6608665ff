//! Launch scenarios with mocked collaborators
//!
//! Simulates proper execution, execution failure and a server that never
//! becomes reachable, with every combination of failing cleanup steps.

mod common;

use assert_matches::assert_matches;
use std::time::Duration;

use common::{TestFixtures, TestHelpers};
use launcher::services::FnProbe;
use launcher::{CleanupStep, Launcher, LauncherError, MemcachedLauncher, MockReadinessProbe, TaskHandle};

/// Readiness check that always succeeds
fn endpoint_listening(_address: &str, _timeout: Duration) -> bool {
    true
}

/// Readiness check that always fails
fn endpoint_not_listening(_address: &str, _timeout: Duration) -> bool {
    false
}

#[test]
fn test_build_command() {
    let launcher = MemcachedLauncher::new(launcher::MockExecutor::new(), TestFixtures::config());

    assert_eq!(launcher.build_command(), TestFixtures::EXPECTED_COMMAND);
    // Repeated builds are byte-identical
    assert_eq!(launcher.build_command(), launcher.build_command());
}

#[cfg(target_os = "linux")]
#[test]
fn test_build_command_with_pid_namespace() {
    use launcher::services::Namespace;
    use launcher::Decorator;
    use nix::sched::CloneFlags;

    let unshare = Namespace::new(CloneFlags::CLONE_NEWPID).unwrap();
    let decorators: Vec<Box<dyn Decorator>> = vec![Box::new(unshare)];
    let launcher = MemcachedLauncher::new(launcher::MockExecutor::new(), TestFixtures::config())
        .with_decorators(decorators);

    assert_eq!(
        launcher.build_command(),
        format!("unshare --fork --pid --mount-proc {}", TestFixtures::EXPECTED_COMMAND)
    );
}

#[tokio::test]
async fn test_launch_returns_executor_handle() {
    let executor = TestHelpers::executor_returning(TestFixtures::EXPECTED_COMMAND, TestHelpers::healthy_task());
    let launcher = MemcachedLauncher::new(executor, TestFixtures::config()).with_probe(TestHelpers::probe(true));

    let task = launcher.launch().await.expect("launch should succeed");

    assert_eq!(task.address(), TestFixtures::EXPECTED_HOST);
}

#[tokio::test]
async fn test_launch_hands_back_the_very_same_handle() {
    // A host no other fixture uses marks this handle
    let handed_out: Box<dyn TaskHandle> = Box::new(TestHelpers::healthy_task_at("10.20.30.40"));
    let identity = TestHelpers::handle_identity(handed_out.as_ref());

    let executor = TestHelpers::executor_handing_out(TestFixtures::EXPECTED_COMMAND, handed_out);
    let launcher = MemcachedLauncher::new(executor, TestFixtures::config())
        .with_probe(FnProbe::new(|address: &str, _| address == "10.20.30.40:11211"));

    let task = launcher.launch().await.expect("launch should succeed");

    assert_eq!(task.address(), "10.20.30.40");
    assert_eq!(TestHelpers::handle_identity(task.as_ref()), identity);
    // Dropping the mock verifies stop, clean and erase output were never called
    drop(task);
}

#[tokio::test]
async fn test_launch_with_function_probe() {
    let executor = TestHelpers::executor_returning(TestFixtures::EXPECTED_COMMAND, TestHelpers::healthy_task());
    let launcher = MemcachedLauncher::new(executor, TestFixtures::config())
        .with_probe(FnProbe::new(endpoint_listening));

    assert!(launcher.launch().await.is_ok());
}

#[tokio::test]
async fn test_execution_failure_is_returned_verbatim() {
    let executor = TestHelpers::failing_executor(TestFixtures::EXPECTED_COMMAND, "test");
    let mut probe = MockReadinessProbe::new();
    probe.expect_is_ready().times(0);

    let launcher = MemcachedLauncher::new(executor, TestFixtures::config()).with_probe(probe);

    let err = launcher.launch().await.err().expect("launch should fail");
    assert_eq!(err.to_string(), "test");
    assert_matches!(err, LauncherError::Execution(_));
}

#[tokio::test]
async fn test_not_ready_fails_even_when_cleanup_succeeds() {
    let task = TestHelpers::task_expecting_teardown(false, false, false);
    let executor = TestHelpers::executor_returning(TestFixtures::EXPECTED_COMMAND, task);
    let launcher = MemcachedLauncher::new(executor, TestFixtures::config()).with_probe(TestHelpers::probe(false));

    let err = launcher.launch().await.err().expect("launch should fail");

    assert_matches!(
        err,
        LauncherError::NotReady { ref address, timeout, ref cleanup, .. }
            if address == TestFixtures::EXPECTED_ADDRESS
                && timeout == TestFixtures::listen_timeout()
                && cleanup.is_empty()
    );
}

#[tokio::test]
async fn test_stop_failure_still_cleans_and_erases() {
    let task = TestHelpers::task_expecting_teardown(true, false, false);
    let executor = TestHelpers::executor_returning(TestFixtures::EXPECTED_COMMAND, task);
    let launcher = MemcachedLauncher::new(executor, TestFixtures::config())
        .with_probe(FnProbe::new(endpoint_not_listening));

    let err = launcher.launch().await.err().expect("launch should fail");

    let cleanup = err.cleanup_errors().expect("cleanup errors attached");
    assert_eq!(cleanup.failed_steps(), vec![CleanupStep::Stop]);
    assert!(err.to_string().contains("Test error code for stop"));
}

#[tokio::test]
async fn test_clean_failure_is_reported() {
    let task = TestHelpers::task_expecting_teardown(false, true, false);
    let executor = TestHelpers::executor_returning(TestFixtures::EXPECTED_COMMAND, task);
    let launcher = MemcachedLauncher::new(executor, TestFixtures::config())
        .with_probe(FnProbe::new(endpoint_not_listening));

    let err = launcher.launch().await.err().expect("launch should fail");

    let cleanup = err.cleanup_errors().expect("cleanup errors attached");
    assert_eq!(cleanup.failed_steps(), vec![CleanupStep::Clean]);
    assert!(err.to_string().contains("Test error code for clean"));
}

#[tokio::test]
async fn test_erase_output_failure_is_reported() {
    let task = TestHelpers::task_expecting_teardown(false, false, true);
    let executor = TestHelpers::executor_returning(TestFixtures::EXPECTED_COMMAND, task);
    let launcher = MemcachedLauncher::new(executor, TestFixtures::config())
        .with_probe(FnProbe::new(endpoint_not_listening));

    let err = launcher.launch().await.err().expect("launch should fail");

    let cleanup = err.cleanup_errors().expect("cleanup errors attached");
    assert_eq!(cleanup.failed_steps(), vec![CleanupStep::EraseOutput]);
    assert!(err.to_string().contains("Test error code for erasing output"));
}

#[tokio::test]
async fn test_any_cleanup_outcome_fails_the_launch() {
    for mask in 0u8..8 {
        let (fail_stop, fail_clean, fail_erase) = (mask & 1 != 0, mask & 2 != 0, mask & 4 != 0);

        let task = TestHelpers::task_expecting_teardown(fail_stop, fail_clean, fail_erase);
        let executor = TestHelpers::executor_returning(TestFixtures::EXPECTED_COMMAND, task);
        let launcher = MemcachedLauncher::new(executor, TestFixtures::config()).with_probe(TestHelpers::probe(false));

        let result = launcher.launch().await;
        let err = result.err().unwrap_or_else(|| panic!("launch should fail for mask {mask}"));

        let failed = err.cleanup_errors().map(|c| c.len()).unwrap_or_default();
        assert_eq!(failed, mask.count_ones() as usize, "mask {mask}");
    }
}

#[tokio::test]
async fn test_independent_launchers_run_concurrently() {
    let first = MemcachedLauncher::new(
        TestHelpers::executor_returning(TestFixtures::EXPECTED_COMMAND, TestHelpers::healthy_task()),
        TestFixtures::config(),
    )
    .with_probe(FnProbe::new(endpoint_listening));

    let second = MemcachedLauncher::new(
        TestHelpers::executor_returning(
            "test -p 11311 -u root -t 4 -m 4096 -c 2048 -T",
            TestHelpers::healthy_task(),
        ),
        TestFixtures::config_on_port(11311),
    )
    .with_probe(FnProbe::new(|address: &str, _| address == "127.0.0.1:11311"));

    let (a, b) = tokio::join!(first.launch(), second.launch());
    assert!(a.is_ok());
    assert!(b.is_ok());
}
