// Concurrent callers on an invalid token share one session create call.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use httpmock::Method::PUT;
    use httpmock::MockServer;
    use tokio::time::Duration;

    use crate::auth::session::SESSION_CREATE_PATH;
    use crate::auth::AuthError;
    use crate::tests::common::*;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_ensure_valid_refreshes_once() {
        let server = MockServer::start_async().await;
        let body = session_body(SESSION_TOKEN, &future_date());
        let session = server
            .mock_async(|when, then| {
                when.method(PUT).path(SESSION_CREATE_PATH);
                then.status(200)
                    .delay(Duration::from_millis(200))
                    .json_body(body);
            })
            .await;
        let manager = Arc::new(manager(&server).with_token(expired_token("stale")));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let manager = manager.clone();
                tokio::spawn(async move { manager.ensure_valid().await })
            })
            .collect();
        for handle in handles {
            handle.await.expect("join").expect("ensure_valid");
        }

        session.assert_hits_async(1).await;
        assert_eq!(manager.get_token().unwrap().value(), SESSION_TOKEN);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_intercepts_attach_the_same_token() {
        let server = MockServer::start_async().await;
        let body = session_body(SESSION_TOKEN, &future_date());
        let session = server
            .mock_async(|when, then| {
                when.method(PUT).path(SESSION_CREATE_PATH);
                then.status(200)
                    .delay(Duration::from_millis(100))
                    .json_body(body);
            })
            .await;
        let client = client(&server, None);

        let handles: Vec<_> = (0..6)
            .map(|i| {
                let client = client.clone();
                tokio::spawn(async move {
                    let request = client.request(reqwest::Method::GET, &format!("/customer/{i}")).await?;
                    Ok::<_, crate::client::ClientError>(request.build()?)
                })
            })
            .collect();
        for handle in handles {
            let request = handle.await.expect("join").expect("request");
            assert_eq!(request.headers()[http::header::AUTHORIZATION], SESSION_BASIC);
        }

        session.assert_hits_async(1).await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn waiters_share_a_failed_refresh() {
        let server = MockServer::start_async().await;
        let session = server
            .mock_async(|when, then| {
                when.method(PUT).path(SESSION_CREATE_PATH);
                then.status(500).delay(Duration::from_millis(200));
            })
            .await;
        let manager = Arc::new(manager(&server));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let manager = manager.clone();
                tokio::spawn(async move { manager.ensure_valid().await })
            })
            .collect();
        for handle in handles {
            let err = handle.await.expect("join").unwrap_err();
            assert!(matches!(err, AuthError::BadStatus(status) if status.as_u16() == 500), "{err}");
        }

        session.assert_hits_async(1).await;
        assert!(manager.get_token().is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn failed_refresh_lets_next_caller_try_again() {
        let server = MockServer::start_async().await;
        let mut failing = mock_session_raw(&server, 500, "").await;
        let manager = Arc::new(manager(&server));

        assert!(manager.ensure_valid().await.is_err());
        failing.assert_hits_async(1).await;
        assert!(manager.get_token().is_none());
        failing.delete_async().await;

        let session = mock_session(&server, SESSION_TOKEN).await;
        manager.ensure_valid().await.expect("second attempt");
        session.assert_hits_async(1).await;
        assert!(manager.is_valid());
    }
}
