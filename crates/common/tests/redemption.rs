mod common;

use std::time::Duration;

use ::common::prelude::*;
use ::common::relay::RelayError;

use crate::common::setup_relay;

#[tokio::test]
async fn test_hunter2_scenario() {
    let (relay, store) = setup_relay();

    let id = relay.issue("hunter2".into(), 3600).await.unwrap();
    assert_eq!(store.len(), 1);

    assert_eq!(relay.redeem(&id.to_string()).await.unwrap(), "hunter2");
    assert!(store.is_empty());

    assert!(matches!(
        relay.redeem(&id.to_string()).await,
        Err(RelayError::NotFound)
    ));
}

#[tokio::test]
async fn test_malformed_ids_never_reach_the_store() {
    let (relay, _) = setup_relay();
    let id = relay.issue("keep me".into(), 3600).await.unwrap();

    let upper = id.to_string().to_uppercase();
    for raw in ["not-a-uuid", "", upper.as_str(), "../../etc/passwd"] {
        assert!(matches!(
            relay.redeem(raw).await,
            Err(RelayError::MalformedId)
        ));
    }

    // the rejected attempts did not consume the secret
    assert_eq!(relay.redeem(&id.to_string()).await.unwrap(), "keep me");
}

#[tokio::test]
async fn test_unknown_id_is_not_found() {
    let (relay, _) = setup_relay();
    let stranger = UuidV4Generator.generate();
    assert!(matches!(
        relay.redeem(&stranger.to_string()).await,
        Err(RelayError::NotFound)
    ));
}

#[tokio::test(start_paused = true)]
async fn test_expired_secrets_are_not_found() {
    let (relay, _) = setup_relay();
    let hour = relay.issue("hour".into(), 3600).await.unwrap();
    let day = relay.issue("day".into(), 86400).await.unwrap();

    tokio::time::advance(Duration::from_secs(3600)).await;

    assert!(matches!(
        relay.redeem(&hour.to_string()).await,
        Err(RelayError::NotFound)
    ));
    assert_eq!(relay.redeem(&day.to_string()).await.unwrap(), "day");
}

#[tokio::test]
async fn test_concurrent_redemptions_deliver_once() {
    let (relay, _) = setup_relay();
    let id = relay.issue("contested".into(), 604800).await.unwrap().to_string();

    let attempts: Vec<_> = (0..32)
        .map(|_| {
            let relay = relay.clone();
            let id = id.clone();
            tokio::spawn(async move { relay.redeem(&id).await })
        })
        .collect();

    let mut delivered = 0;
    for attempt in attempts {
        match attempt.await.unwrap() {
            Ok(payload) => {
                assert_eq!(payload, "contested");
                delivered += 1;
            }
            Err(RelayError::NotFound) => {}
            Err(e) => panic!("unexpected error: {e}"),
        }
    }
    assert_eq!(delivered, 1);
}
