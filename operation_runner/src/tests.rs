//! Runner and completion handle tests

#[cfg(test)]
mod tests {
    use crate::{wait_all, OperationRunner};
    use std::time::Duration;
    use store_object::StoreError;
    use tokio::sync::oneshot;

    #[tokio::test]
    async fn test_delivers_value() {
        let runner = OperationRunner::new();
        let mut handle = runner.run(async { Ok(42) });

        assert_eq!(handle.wait().await, Ok(42));
        assert!(handle.is_consumed());
    }

    #[tokio::test]
    async fn test_delivers_failure_as_value() {
        let runner = OperationRunner::new();
        let mut handle = runner.run(async {
            Err::<(), _>(StoreError::not_found("people", "{ name: \"Nobody\" }"))
        });

        let err = handle.wait().await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_second_wait_is_double_await() {
        let runner = OperationRunner::new();
        let mut handle = runner.run(async { Ok("done") });
        let operation = handle.operation();

        assert_eq!(handle.wait().await, Ok("done"));
        assert_eq!(
            handle.wait().await,
            Err(StoreError::DoubleAwait { operation })
        );
    }

    #[tokio::test]
    async fn test_double_await_after_failure() {
        let runner = OperationRunner::new();
        let mut handle = runner.run(async { Err::<u8, _>(StoreError::Validation("bad".into())) });

        assert!(matches!(handle.wait().await, Err(StoreError::Validation(_))));
        assert!(matches!(
            handle.wait().await,
            Err(StoreError::DoubleAwait { .. })
        ));
    }

    #[tokio::test]
    async fn test_panicking_operation_is_aborted_not_lost() {
        let runner = OperationRunner::new();
        let mut handle = runner.run(async {
            if true {
                panic!("operation blew up");
            }
            Ok(())
        });

        assert!(matches!(
            handle.wait().await,
            Err(StoreError::OperationAborted { .. })
        ));
    }

    #[tokio::test]
    async fn test_run_blocking() {
        let runner = OperationRunner::new();
        let mut handle = runner.run_blocking(|| Ok(vec![1, 2, 3]));

        assert_eq!(handle.wait().await, Ok(vec![1, 2, 3]));
    }

    #[tokio::test]
    async fn test_operations_overlap() {
        let runner = OperationRunner::new();
        let (release, gate) = oneshot::channel::<()>();

        // The first operation can only finish once the second has run.
        let mut blocked = runner.run(async move {
            gate.await
                .map_err(|_| StoreError::Validation("gate dropped".into()))?;
            Ok::<_, StoreError>("first")
        });
        let mut opener = runner.run(async move {
            release
                .send(())
                .map_err(|_| StoreError::Validation("gate closed".into()))?;
            Ok::<_, StoreError>("second")
        });

        assert_eq!(blocked.wait().await, Ok("first"));
        assert_eq!(opener.wait().await, Ok("second"));
    }

    #[tokio::test]
    async fn test_timed_out_wait_leaves_handle_usable() {
        let runner = OperationRunner::new();
        let (release, gate) = oneshot::channel::<()>();
        let mut handle = runner.run(async move {
            let _ = gate.await;
            Ok(7)
        });

        assert_eq!(handle.wait_timeout(Duration::from_millis(20)).await, None);
        assert!(!handle.is_consumed());

        release.send(()).unwrap();
        assert_eq!(handle.wait().await, Ok(7));
    }

    #[tokio::test]
    async fn test_wait_all_keeps_caller_order() {
        let runner = OperationRunner::new();
        let handles = vec![
            runner.run(async {
                tokio::time::sleep(Duration::from_millis(30)).await;
                Ok(1)
            }),
            runner.run(async { Ok(2) }),
            runner.run(async { Err(StoreError::Validation("three".into())) }),
        ];

        let results = wait_all(handles).await;
        assert_eq!(results[0], Ok(1));
        assert_eq!(results[1], Ok(2));
        assert!(results[2].is_err());
    }

    #[tokio::test]
    async fn test_operation_ids_are_distinct() {
        let runner = OperationRunner::new();
        let clone = runner.clone();
        let a = runner.run(async { Ok(()) });
        let b = clone.run(async { Ok(()) });

        assert_ne!(a.operation(), b.operation());
    }
}
