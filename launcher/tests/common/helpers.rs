//! Mock helpers for launcher tests
//!
//! Build mocked executors and task handles with the expectations the
//! launcher scenarios need.

use mockall::Sequence;

use launcher::{ExecutorError, MockExecutor, MockReadinessProbe, MockTaskHandle, TaskHandle};

use super::fixtures::TestFixtures;

pub struct TestHelpers;

impl TestHelpers {
    /// Task handle that must never be torn down
    pub fn healthy_task() -> MockTaskHandle {
        Self::healthy_task_at(TestFixtures::EXPECTED_HOST)
    }

    /// Healthy task handle reporting its own host, to tell it apart from others
    pub fn healthy_task_at(host: &str) -> MockTaskHandle {
        let mut task = MockTaskHandle::new();
        task.expect_address().return_const(host.to_string());
        task.expect_stop().times(0);
        task.expect_clean().times(0);
        task.expect_erase_output().times(0);
        task
    }

    /// Task handle expecting stop, clean and erase output exactly once, in that order
    ///
    /// Each flag makes the corresponding step fail.
    pub fn task_expecting_teardown(fail_stop: bool, fail_clean: bool, fail_erase: bool) -> MockTaskHandle {
        let mut task = MockTaskHandle::new();
        let mut seq = Sequence::new();

        task.expect_address()
            .return_const(TestFixtures::EXPECTED_HOST.to_string());
        task.expect_stop()
            .times(1)
            .in_sequence(&mut seq)
            .returning(move || Self::outcome(fail_stop, "Test error code for stop"));
        task.expect_clean()
            .times(1)
            .in_sequence(&mut seq)
            .returning(move || Self::outcome(fail_clean, "Test error code for clean"));
        task.expect_erase_output()
            .times(1)
            .in_sequence(&mut seq)
            .returning(move || Self::outcome(fail_erase, "Test error code for erasing output"));
        task
    }

    /// Executor expecting exactly the given command once and handing out `task`
    pub fn executor_returning(command: &'static str, task: MockTaskHandle) -> MockExecutor {
        Self::executor_handing_out(command, Box::new(task))
    }

    /// Executor expecting exactly the given command once and handing out the boxed handle as is
    pub fn executor_handing_out(command: &'static str, task: Box<dyn TaskHandle>) -> MockExecutor {
        let mut executor = MockExecutor::new();
        executor
            .expect_execute()
            .withf(move |cmd| cmd == command)
            .times(1)
            .return_once(move |_| Ok(task));
        executor
    }

    /// Heap address of a boxed handle, stable across moves of the box
    pub fn handle_identity(task: &dyn TaskHandle) -> *const () {
        std::ptr::from_ref(task).cast()
    }

    /// Executor failing once with the given message
    pub fn failing_executor(command: &'static str, message: &'static str) -> MockExecutor {
        let mut executor = MockExecutor::new();
        executor
            .expect_execute()
            .withf(move |cmd| cmd == command)
            .times(1)
            .returning(move |_| Err(ExecutorError::failed(message)));
        executor
    }

    /// Probe answering once with `ready` for the expected address and timeout
    pub fn probe(ready: bool) -> MockReadinessProbe {
        let mut probe = MockReadinessProbe::new();
        probe
            .expect_is_ready()
            .withf(|address, timeout| {
                address == TestFixtures::EXPECTED_ADDRESS && *timeout == TestFixtures::listen_timeout()
            })
            .times(1)
            .return_const(ready);
        probe
    }

    fn outcome(fail: bool, message: &str) -> Result<(), ExecutorError> {
        if fail {
            Err(ExecutorError::failed(message))
        } else {
            Ok(())
        }
    }
}
