// ═══════════════════════════════════════════════════════════════════
// Document Tests — decoding at the store boundary, MemoryDocumentStore,
// import/export through the facade
// ═══════════════════════════════════════════════════════════════════

use chrono::NaiveDate;
use serde_json::json;
use uuid::Uuid;

use investor_tracker_core::documents::decode::{
    coerce_number, decode_entry, decode_investor, encode_entry, encode_investor,
};
use investor_tracker_core::documents::memory::MemoryDocumentStore;
use investor_tracker_core::documents::traits::{ChangeKind, Collection, Document, DocumentStore};
use investor_tracker_core::errors::CoreError;
use investor_tracker_core::models::entry::{PerformanceEntry, Subject};
use investor_tracker_core::models::investor::Investor;
use investor_tracker_core::models::session::Session;
use investor_tracker_core::services::auth_service::AdminCredentials;
use investor_tracker_core::InvestorTracker;

fn doc(id: impl Into<String>, fields: serde_json::Value) -> Document {
    Document {
        id: id.into(),
        fields,
    }
}

fn admin_tracker() -> (InvestorTracker, Session) {
    let tracker = InvestorTracker::create_new(
        AdminCredentials::from_plaintext("admin", "admin-password").unwrap(),
    );
    let session = tracker.login("admin", "admin-password").unwrap();
    (tracker, session)
}

// ═══════════════════════════════════════════════════════════════════
// Coercion & decoding
// ═══════════════════════════════════════════════════════════════════

mod decoding {
    use super::*;

    #[test]
    fn coerce_number_accepts_numbers_and_numeric_strings() {
        assert_eq!(coerce_number(Some(&json!(12.5))), Some(12.5));
        assert_eq!(coerce_number(Some(&json!(" 40 "))), Some(40.0));
        assert_eq!(coerce_number(Some(&json!("abc"))), None);
        assert_eq!(coerce_number(Some(&json!("NaN"))), None);
        assert_eq!(coerce_number(Some(&json!(null))), None);
        assert_eq!(coerce_number(Some(&json!(true))), None);
        assert_eq!(coerce_number(None), None);
    }

    #[test]
    fn entry_with_string_figures() {
        let id = Uuid::new_v4();
        let investor_id = Uuid::new_v4();
        let entry = decode_entry(&doc(
            id.to_string(),
            json!({
                "investorId": investor_id.to_string(),
                "year": "2024",
                "month": 3,
                "growthAmount": "150.25",
                "growthPercentage": 1.5,
                "deposit": "",
                "notes": "strong month"
            }),
        ))
        .unwrap();

        assert_eq!(entry.id, id);
        assert_eq!(entry.subject, Subject::Investor(investor_id));
        assert_eq!(entry.period(), (2024, 3));
        assert_eq!(entry.growth_amount, Some(150.25));
        assert_eq!(entry.growth_percentage, Some(1.5));
        assert_eq!(entry.deposit, None);
        assert_eq!(entry.withdrawal, None);
        assert_eq!(entry.notes.as_deref(), Some("strong month"));
    }

    #[test]
    fn entry_without_investor_is_portfolio() {
        for fields in [
            json!({"year": 2024, "month": 1}),
            json!({"year": 2024, "month": 1, "investorId": null}),
            json!({"year": 2024, "month": 1, "investorId": ""}),
        ] {
            let entry = decode_entry(&doc(Uuid::new_v4().to_string(), fields)).unwrap();
            assert_eq!(entry.subject, Subject::Portfolio);
        }
    }

    #[test]
    fn entry_rejections() {
        let cases = [
            doc("not-a-uuid", json!({"year": 2024, "month": 1})),
            doc(Uuid::new_v4().to_string(), json!({"month": 1})),
            doc(Uuid::new_v4().to_string(), json!({"year": 2024, "month": 13})),
            doc(Uuid::new_v4().to_string(), json!({"year": 2024, "month": 2.5})),
            doc(Uuid::new_v4().to_string(), json!({"year": 2024, "month": 1, "investorId": "bob"})),
            doc(Uuid::new_v4().to_string(), json!([1, 2, 3])),
        ];
        for case in cases {
            assert!(
                matches!(decode_entry(&case), Err(CoreError::ValidationError(_))),
                "expected rejection for {case:?}"
            );
        }
    }

    #[test]
    fn investor_fields_and_defaults() {
        let id = Uuid::new_v4();
        let investor = decode_investor(&doc(
            id.to_string(),
            json!({
                "name": " Ana Silva ",
                "email": "ana@example.com",
                "username": "ana",
                "createdAt": "2023-06-01T10:30:00Z"
            }),
        ))
        .unwrap();
        assert_eq!(investor.id, id);
        assert_eq!(investor.name, "Ana Silva");
        assert_eq!(investor.password_hash, "");
        assert_eq!(investor.starting_balance, 0.0);
        assert_eq!(investor.joined, NaiveDate::from_ymd_opt(2023, 6, 1).unwrap());
    }

    #[test]
    fn investor_requires_identity_fields() {
        let missing_email = doc(
            Uuid::new_v4().to_string(),
            json!({"name": "Ana", "username": "ana"}),
        );
        let err = decode_investor(&missing_email).unwrap_err();
        assert!(err.to_string().contains("email"));
    }

    #[test]
    fn encoded_records_decode_back() {
        let investor = Investor::new(
            "Bo",
            "bo@example.com",
            "bo",
            750.0,
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap(),
        );
        let entry = PerformanceEntry::new(Subject::Investor(investor.id), 2024, 4)
            .with_growth(12.0, 1.6)
            .with_flows(100.0, 0.0);

        let investor_doc = encode_investor(&investor);
        assert!(investor_doc.fields.get("passwordHash").is_none());
        assert_eq!(investor_doc.fields["joined"], "2024-02-29");
        assert_eq!(decode_investor(&investor_doc).unwrap(), investor);

        let entry_doc = encode_entry(&entry);
        assert_eq!(entry_doc.fields["investorId"], investor.id.to_string());
        assert_eq!(decode_entry(&entry_doc).unwrap(), entry);
    }
}

// ═══════════════════════════════════════════════════════════════════
// MemoryDocumentStore
// ═══════════════════════════════════════════════════════════════════

mod memory_store {
    use super::*;

    #[test]
    fn collection_names_and_owners() {
        assert_eq!(Collection::ALL.len(), 5);
        assert_eq!(Collection::ChatMessages.name(), "chatMessages");
        assert_eq!(Collection::Investors.owner_field(), Some("username"));
        assert_eq!(Collection::Performance.owner_field(), Some("investorId"));
        assert_eq!(Collection::NewsSources.owner_field(), None);
    }

    #[tokio::test]
    async fn put_get_delete() {
        let store = MemoryDocumentStore::new();
        store
            .put(Collection::NewsSources, "reuters", json!({"url": "https://example.com/rss"}))
            .await
            .unwrap();
        assert_eq!(store.len(Collection::NewsSources), 1);

        let fetched = store.get(Collection::NewsSources, "reuters").await.unwrap().unwrap();
        assert_eq!(fetched.fields["url"], "https://example.com/rss");
        assert!(store.get(Collection::Investors, "reuters").await.unwrap().is_none());

        assert!(store.delete(Collection::NewsSources, "reuters").await.unwrap());
        assert!(!store.delete(Collection::NewsSources, "reuters").await.unwrap());
        assert!(store.is_empty(Collection::NewsSources));
    }

    #[tokio::test]
    async fn rejects_empty_id_and_non_objects() {
        let store = MemoryDocumentStore::new();
        assert!(store.put(Collection::Consultations, " ", json!({})).await.is_err());
        assert!(store.put(Collection::Consultations, "c1", json!("text")).await.is_err());
    }

    #[tokio::test]
    async fn list_filters_by_owner() {
        let store = MemoryDocumentStore::new();
        store
            .put(Collection::ChatMessages, "m1", json!({"investorId": "inv-1", "text": "hi"}))
            .await
            .unwrap();
        store
            .put(Collection::ChatMessages, "m2", json!({"investorId": "inv-2", "text": "hello"}))
            .await
            .unwrap();
        store
            .put(Collection::ChatMessages, "m3", json!({"text": "no owner"}))
            .await
            .unwrap();

        assert_eq!(store.list(Collection::ChatMessages, None).await.unwrap().len(), 3);
        let mine = store.list(Collection::ChatMessages, Some("inv-1")).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].id, "m1");

        // Shared collections have no owner to match.
        store
            .put(Collection::NewsSources, "n1", json!({"investorId": "inv-1"}))
            .await
            .unwrap();
        assert!(store.list(Collection::NewsSources, Some("inv-1")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn subscribers_see_changes_for_their_collection() {
        let store = MemoryDocumentStore::new();
        let mut rx = store.subscribe(Collection::Consultations);

        store
            .put(Collection::Consultations, "c1", json!({"investorId": "inv-1"}))
            .await
            .unwrap();
        store
            .put(Collection::ChatMessages, "m1", json!({"investorId": "inv-1"}))
            .await
            .unwrap();
        store.delete(Collection::Consultations, "c1").await.unwrap();
        store.delete(Collection::Consultations, "never-existed").await.unwrap();

        let first = rx.recv().await.unwrap();
        assert_eq!(first.id, "c1");
        assert_eq!(first.kind, ChangeKind::Put);
        assert_eq!(rx.recv().await.unwrap().kind, ChangeKind::Delete);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn subscriber_waits_for_write_from_another_task() {
        let store = std::sync::Arc::new(MemoryDocumentStore::new());
        let mut rx = store.subscribe(Collection::ChatMessages);

        let writer = {
            let store = store.clone();
            tokio::spawn(async move {
                store
                    .put(Collection::ChatMessages, "m1", json!({"investorId": "inv-1"}))
                    .await
            })
        };

        let change = rx.recv().await.unwrap();
        assert_eq!(change.collection, Collection::ChatMessages);
        assert_eq!(change.id, "m1");
        writer.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn every_subscriber_gets_the_change() {
        let store = MemoryDocumentStore::new();
        let mut a = store.subscribe(Collection::Investors);
        let mut b = store.subscribe(Collection::Investors);
        store
            .put(Collection::Investors, "x", json!({"username": "x"}))
            .await
            .unwrap();
        assert_eq!(a.recv().await.unwrap().id, "x");
        assert_eq!(b.recv().await.unwrap().id, "x");
    }

    #[tokio::test]
    async fn dropped_subscriber_does_not_block_writes() {
        let store = MemoryDocumentStore::new();
        drop(store.subscribe(Collection::Investors));
        store
            .put(Collection::Investors, "x", json!({"username": "x"}))
            .await
            .unwrap();
        assert_eq!(store.len(Collection::Investors), 1);
    }
}

// ═══════════════════════════════════════════════════════════════════
// Import / export through InvestorTracker
// ═══════════════════════════════════════════════════════════════════

mod sync {
    use super::*;

    #[tokio::test]
    async fn import_decodes_and_reports_skips() {
        let store = MemoryDocumentStore::new();
        let investor_id = Uuid::new_v4();
        store
            .put(
                Collection::Investors,
                &investor_id.to_string(),
                json!({"name": "Ana", "email": "ana@example.com", "username": "ana", "startingBalance": "1000"}),
            )
            .await
            .unwrap();
        store
            .put(Collection::Investors, "legacy-id", json!({"name": "Old", "email": "o@example.com", "username": "old"}))
            .await
            .unwrap();
        store
            .put(
                Collection::Performance,
                &Uuid::new_v4().to_string(),
                json!({"investorId": investor_id.to_string(), "year": 2024, "month": 1, "growthAmount": 25, "growthPercentage": 2.5}),
            )
            .await
            .unwrap();
        store
            .put(
                Collection::Performance,
                &Uuid::new_v4().to_string(),
                json!({"investorId": Uuid::new_v4().to_string(), "year": 2024, "month": 1}),
            )
            .await
            .unwrap();

        let (mut tracker, admin) = admin_tracker();
        let report = tracker.import_from_store(&admin, &store).await.unwrap();
        assert_eq!(report.investors, 1);
        assert_eq!(report.entries, 1);
        assert_eq!(report.skipped.len(), 2);
        assert!(report.skipped.iter().any(|(id, _)| id == "legacy-id"));
        assert!(tracker.has_unsaved_changes());

        let chart = tracker.investor_chart(&admin, investor_id).unwrap();
        assert_eq!(chart.last_balance, 1025.0);
        assert_eq!(chart.average_growth_rate, 2.5);

        // Imported investors have no credentials yet.
        assert!(tracker.login("ana", "").is_err());

        // Re-importing leaves existing records alone.
        let again = tracker.import_from_store(&admin, &store).await.unwrap();
        assert_eq!(again.investors, 0);
        assert_eq!(again.entries, 0);
    }

    #[tokio::test]
    async fn export_then_import_into_fresh_tracker() {
        let (mut source, admin) = admin_tracker();
        let ana = source
            .add_investor(
                &admin,
                "Ana",
                "ana@example.com",
                "ana",
                500.0,
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                Some("ana-password"),
            )
            .unwrap();
        source
            .add_entry(&admin, PerformanceEntry::new(Subject::Investor(ana), 2024, 1).with_growth(5.0, 1.0))
            .unwrap();
        source
            .add_entry(&admin, PerformanceEntry::new(Subject::Portfolio, 2024, 1).with_growth(50.0, 1.0))
            .unwrap();

        let store = MemoryDocumentStore::new();
        let written = source.export_to_store(&admin, &store).await.unwrap();
        assert_eq!(written, 3);
        assert_eq!(store.len(Collection::Performance), 2);

        let (mut target, admin) = admin_tracker();
        let report = target.import_from_store(&admin, &store).await.unwrap();
        assert!(report.skipped.is_empty());
        assert_eq!(target.entry_count(), 2);
        // The password hash travels with the investor.
        assert!(target.login("ana", "ana-password").is_ok());
    }

    #[tokio::test]
    async fn investor_named_like_admin_is_skipped() {
        let store = MemoryDocumentStore::new();
        store
            .put(
                Collection::Investors,
                &Uuid::new_v4().to_string(),
                json!({"name": "Impostor", "email": "imp@example.com", "username": "Admin"}),
            )
            .await
            .unwrap();

        let (mut tracker, admin) = admin_tracker();
        let report = tracker.import_from_store(&admin, &store).await.unwrap();
        assert_eq!(report.investors, 0);
        assert_eq!(report.skipped.len(), 1);
        assert!(report.skipped[0].1.contains("reserved"));
    }

    #[tokio::test]
    async fn investors_cannot_sync() {
        let (mut tracker, admin) = admin_tracker();
        tracker
            .add_investor(
                &admin,
                "Ana",
                "ana@example.com",
                "ana",
                0.0,
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                Some("ana-password"),
            )
            .unwrap();
        let investor = tracker.login("ana", "ana-password").unwrap();
        let store = MemoryDocumentStore::new();
        assert!(matches!(
            tracker.import_from_store(&investor, &store).await,
            Err(CoreError::Unauthorized(_))
        ));
        assert!(tracker.export_to_store(&investor, &store).await.is_err());
    }
}
