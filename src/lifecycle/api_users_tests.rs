// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for lifecycle/api_users.rs

#[cfg(test)]
mod tests {
    use crate::context::Context;
    use crate::credentials::{web_service_secret, CredentialSet};
    use crate::errors::{EpicError, StoreError};
    use crate::lifecycle::api_users::*;
    use crate::memory_store::{InMemoryStore, StoreOp};
    use crate::store::ResourceStore;
    use k8s_openapi::api::core::v1::Secret;

    const NS: &str = "epic-acme";

    fn ctx_with(records: &[u8]) -> Context<InMemoryStore> {
        let ctx = Context::new(InMemoryStore::new()).with_hash_cost(4);
        let secret = web_service_secret(NS, &CredentialSet::parse(records));
        ctx.store.put(&secret).unwrap();
        ctx
    }

    async fn stored_credentials(ctx: &Context<InMemoryStore>) -> CredentialSet {
        let secret: Secret = ctx.store.get(Some(NS), "password").await.unwrap();
        CredentialSet::from_secret(&secret)
    }

    fn conflict() -> StoreError {
        StoreError::Conflict {
            kind: "Secret".to_string(),
            name: format!("{NS}/password"),
        }
    }

    #[test]
    fn test_check_password_minimum_length() {
        assert!(check_password("123456").is_ok());
        let err = check_password("12345").unwrap_err();
        assert!(matches!(err, EpicError::InvalidArgument { what: "password", .. }));
        assert!(!err.to_string().contains("12345"));
    }

    #[tokio::test]
    async fn test_create_appends_a_hashed_record() {
        let ctx = ctx_with(b"ws:hash\n");

        create_api_user(&ctx, "acme", "alice", "s3cret!").await.unwrap();

        let credentials = stored_credentials(&ctx).await;
        assert_eq!(credentials.usernames(), vec!["ws", "alice"]);
        assert!(credentials.verify("alice", "s3cret!"));
    }

    #[tokio::test]
    async fn test_create_short_password_makes_no_store_call() {
        let ctx = ctx_with(b"");
        ctx.store.clear_calls();

        let err = create_api_user(&ctx, "acme", "alice", "short").await.unwrap_err();
        assert!(matches!(err, EpicError::InvalidArgument { .. }));
        assert!(ctx.store.calls().is_empty());
    }

    #[tokio::test]
    async fn test_create_duplicate_writes_nothing() {
        let ctx = ctx_with(b"alice:hash\n");

        let err = create_api_user(&ctx, "acme", "alice", "another-pass").await.unwrap_err();
        assert_eq!(err.to_string(), "api-user alice exists in user namespace acme");
        assert!(ctx.store.calls_of(StoreOp::Update).is_empty());
        assert_eq!(stored_credentials(&ctx).await, CredentialSet::parse(b"alice:hash\n"));
    }

    #[tokio::test]
    async fn test_create_in_unknown_namespace_is_not_found() {
        let ctx = Context::new(InMemoryStore::new()).with_hash_cost(4);
        let err = create_api_user(&ctx, "acme", "alice", "s3cret!").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_create_retries_after_conflict() {
        let ctx = ctx_with(b"");
        ctx.store.fail_next(StoreOp::Update, "Secret", conflict());

        create_api_user(&ctx, "acme", "alice", "s3cret!").await.unwrap();

        assert_eq!(ctx.store.calls_of(StoreOp::Update).len(), 2);
        assert_eq!(stored_credentials(&ctx).await.usernames(), vec!["alice"]);
    }

    #[tokio::test]
    async fn test_delete_keeps_others_in_order() {
        let ctx = ctx_with(b"alice:h1\nbob:h2\ncarol:h3\n");

        delete_api_user(&ctx, "acme", "bob").await.unwrap();

        assert_eq!(
            stored_credentials(&ctx).await,
            CredentialSet::parse(b"alice:h1\ncarol:h3\n")
        );
    }

    #[tokio::test]
    async fn test_delete_absent_user_is_not_found() {
        let ctx = ctx_with(b"alice:h1\n");

        let err = delete_api_user(&ctx, "acme", "bob").await.unwrap_err();
        assert!(err.is_not_found());
        assert!(ctx.store.calls_of(StoreOp::Update).is_empty());
    }

    #[tokio::test]
    async fn test_delete_gives_up_on_persistent_conflict() {
        let ctx = ctx_with(b"alice:h1\n");
        for _ in 0..5 {
            ctx.store.fail_next(StoreOp::Update, "Secret", conflict());
        }

        let err = delete_api_user(&ctx, "acme", "alice").await.unwrap_err();
        assert!(err.is_conflict());
        assert_eq!(stored_credentials(&ctx).await.usernames(), vec!["alice"]);
    }

    #[tokio::test]
    async fn test_list_in_record_order() {
        let ctx = ctx_with(b"carol:h3\nalice:h1\n");
        assert_eq!(
            list_api_users(&ctx, "acme").await.unwrap(),
            vec!["carol".to_string(), "alice".to_string()]
        );
    }

    #[tokio::test]
    async fn test_list_empty_secret() {
        let ctx = ctx_with(b"");
        assert!(list_api_users(&ctx, "acme").await.unwrap().is_empty());
    }
}
