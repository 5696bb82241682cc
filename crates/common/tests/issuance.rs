mod common;

use ::common::prelude::*;
use ::common::relay::RelayError;

use crate::common::{setup_relay, setup_sequential_relay};

#[tokio::test]
async fn test_every_sanctioned_expiration_is_accepted() {
    let (relay, store) = setup_relay();

    for expiration in Expiration::ALL {
        for len in [0, 1, MAX_SECRET_BYTES / 2, MAX_SECRET_BYTES] {
            let id = relay
                .issue("s".repeat(len), expiration.into())
                .await
                .unwrap();
            // ids come back in canonical form
            assert_eq!(id.to_string().parse::<SecretId>().unwrap(), id);
        }
    }

    assert_eq!(store.len(), Expiration::ALL.len() * 4);
}

#[tokio::test]
async fn test_unsanctioned_expirations_are_rejected_for_any_payload() {
    let (relay, store) = setup_relay();

    for expiration in [0, -1, 1, 60, 3599, 3601, 86401, 604799, 1209600, i32::MIN] {
        for payload in ["", "x", "hunter2"] {
            let err = relay.issue(payload.into(), expiration).await.unwrap_err();
            assert!(
                matches!(err, RelayError::Validation(ValidationError::Expiration(_))),
                "expiration {expiration} gave {err:?}"
            );
        }
    }

    assert!(store.is_empty());
}

#[tokio::test]
async fn test_oversized_payloads_are_rejected() {
    let (relay, store) = setup_relay();
    let payload = "x".repeat(MAX_SECRET_BYTES + 1);

    for expiration in Expiration::ALL {
        let err = relay
            .issue(payload.clone(), expiration.into())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RelayError::Validation(ValidationError::TooLong(10_001))
        ));
    }

    // an invalid expiration also makes it a bad request, just for another reason
    assert!(matches!(
        relay.issue(payload, 42).await,
        Err(RelayError::Validation(_))
    ));
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_ids_are_never_reused() {
    let (relay, _) = setup_sequential_relay();

    let first = relay.issue("a".into(), 3600).await.unwrap();
    relay.redeem(&first.to_string()).await.unwrap();
    let second = relay.issue("a".into(), 3600).await.unwrap();

    assert_ne!(first, second);
    assert_eq!(first.to_string(), "00000000-0000-4000-8000-000000000000");
    assert_eq!(second.to_string(), "00000000-0000-4000-8000-000000000001");
}
