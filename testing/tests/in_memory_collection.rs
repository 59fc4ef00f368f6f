//! Behaviour of the in-memory document store.

#![allow(clippy::unwrap_used)]

use clientdesk_core::store::{Collection, Filter, StoreError};
use clientdesk_core::HourlyRate;
use clientdesk_testing::{InMemoryCollection, fixtures, test_clock};

#[tokio::test]
async fn insert_get_and_delete() {
    let store = InMemoryCollection::<HourlyRate>::new();
    let rate = fixtures::hourly_rate(50_000, &test_clock());

    store.insert(&rate).await.unwrap();
    assert_eq!(store.get(&rate.id).await.unwrap(), Some(rate.clone()));

    assert!(store.delete(&rate.id).await.unwrap());
    assert!(!store.delete(&rate.id).await.unwrap());
    assert!(store.get(&rate.id).await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_insert_conflicts() {
    let store = InMemoryCollection::<HourlyRate>::new();
    let rate = fixtures::hourly_rate(50_000, &test_clock());
    store.insert(&rate).await.unwrap();

    let err = store.insert(&rate).await.unwrap_err();
    assert!(matches!(err, StoreError::Conflict { collection: "hourly_rates", .. }));
}

#[tokio::test]
async fn replace_requires_existing_document() {
    let store = InMemoryCollection::<HourlyRate>::new();
    let rate = fixtures::hourly_rate(50_000, &test_clock());
    assert!(matches!(
        store.replace(&rate).await,
        Err(StoreError::NotFound { .. })
    ));
}

#[tokio::test]
async fn find_filters_on_serialized_fields() {
    let store = InMemoryCollection::<HourlyRate>::new();
    let clock = test_clock();
    store.insert(&fixtures::hourly_rate(100, &clock)).await.unwrap();
    store.insert(&fixtures::hourly_rate(200, &clock)).await.unwrap();

    let hits = store.find(&Filter::new().eq("amount", 200)).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].amount.minor_units(), 200);
    assert_eq!(store.find(&Filter::new()).await.unwrap().len(), 2);
}

#[tokio::test]
async fn conditional_replace_only_applies_once() {
    let store = InMemoryCollection::<HourlyRate>::new();
    let clock = test_clock();
    let rate = fixtures::hourly_rate(100, &clock);
    store.insert(&rate).await.unwrap();

    let guard = Filter::new().eq("amount", 100);
    let mut first = rate.clone();
    first.amount = clientdesk_core::Money::from_minor(150);
    let mut second = rate.clone();
    second.amount = clientdesk_core::Money::from_minor(175);

    assert!(store.replace_if(&first, &guard).await.unwrap());
    assert!(!store.replace_if(&second, &guard).await.unwrap());
    assert_eq!(store.get(&rate.id).await.unwrap().unwrap().amount.minor_units(), 150);
}
