mod common;

use ortho_backend::db::operations::user::{self, NewUser};
use ortho_backend::db::operations::{associations, languages, mistakes};
use std::time::Duration;

use ortho_backend::db::config::DbConfig;
use ortho_backend::db::Store;
use ortho_backend::services::ingest::{ingest, IngestError};
use ortho_backend::services::lemmatizer::{LowercaseLemmatizer, MorphLemmatizer};
use ortho_backend::services::reconciler::MistakeEntry;
use ortho_backend::services::statistics::{self, StatsScope};

fn entry(wrong: &str, correct: &str, position: usize, language: &str) -> MistakeEntry {
    MistakeEntry {
        wrong: wrong.to_string(),
        correct: correct.to_string(),
        position,
        language: language.to_string(),
    }
}

async fn add_user(store: &Store, email: &str, age: i64) -> i64 {
    user::create_user(
        store.pool(),
        &NewUser {
            email,
            name: "Test",
            surname: "User",
            age,
            password_hash: "x",
            token: email,
        },
    )
    .await
    .expect("create user")
}

#[tokio::test]
async fn repeated_ingestion_doubles_counts_without_new_rows() {
    let (store, _dir) = common::open_store().await;
    let user_id = add_user(&store, "a@example.com", 30).await;
    let entries = vec![
        entry("прагулка", "прогулка", 0, "ru"),
        entry("helo", "hello", 10, "en"),
    ];

    ingest(&store, &LowercaseLemmatizer, &entries, Some(user_id))
        .await
        .expect("first ingest");
    ingest(&store, &LowercaseLemmatizer, &entries, Some(user_id))
        .await
        .expect("second ingest");

    assert_eq!(mistakes::count_mistake_rows(store.pool()).await.unwrap(), 2);
    let acronyms: Vec<String> = languages::list_languages(store.pool())
        .await
        .unwrap()
        .into_iter()
        .map(|language| language.acronym)
        .collect();
    assert_eq!(acronyms, vec!["en", "ru"]);
    assert_eq!(
        associations::count_user_associations(store.pool(), user_id)
            .await
            .unwrap(),
        2
    );

    let walk = mistakes::find_mistake(store.pool(), "прогулка")
        .await
        .unwrap()
        .expect("mistake row");
    assert_eq!(walk.count, 2);
    let russian = languages::find_language(store.pool(), "ru")
        .await
        .unwrap()
        .expect("language row");
    assert_eq!(walk.language_id, russian.id);
    assert_eq!(
        associations::association_count(store.pool(), user_id, walk.id)
            .await
            .unwrap(),
        Some(2)
    );
}

#[tokio::test]
async fn same_word_twice_in_one_batch_counts_twice() {
    let (store, _dir) = common::open_store().await;
    let entries = vec![
        entry("helo", "hello", 0, "en"),
        entry("helo", "Hello", 5, "en"),
    ];

    let report = ingest(&store, &LowercaseLemmatizer, &entries, None)
        .await
        .expect("ingest");

    assert_eq!(report.committed, 2);
    let hello = mistakes::find_mistake(store.pool(), "hello")
        .await
        .unwrap()
        .expect("mistake row");
    assert_eq!(hello.count, 2);
    assert_eq!(mistakes::count_mistake_rows(store.pool()).await.unwrap(), 1);
}

#[tokio::test]
async fn anonymous_ingestion_creates_no_associations() {
    let (store, _dir) = common::open_store().await;
    let user_id = add_user(&store, "b@example.com", 40).await;

    ingest(
        &store,
        &LowercaseLemmatizer,
        &[entry("wrld", "world", 0, "en")],
        None,
    )
    .await
    .expect("ingest");

    assert_eq!(
        associations::count_user_associations(store.pool(), user_id)
            .await
            .unwrap(),
        0
    );
    assert_eq!(mistakes::total_mistake_count(store.pool()).await.unwrap(), 1);
}

#[tokio::test]
async fn unknown_user_is_rejected_before_writing() {
    let (store, _dir) = common::open_store().await;

    let err = ingest(
        &store,
        &LowercaseLemmatizer,
        &[entry("wrld", "world", 0, "en")],
        Some(42),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, IngestError::UserNotFound(42)));
    assert_eq!(mistakes::count_mistake_rows(store.pool()).await.unwrap(), 0);
}

#[tokio::test]
async fn global_language_totals_match_mistake_counts() {
    let (store, _dir) = common::open_store().await;
    let user_id = add_user(&store, "c@example.com", 19).await;

    ingest(
        &store,
        &LowercaseLemmatizer,
        &[
            entry("прагулка", "прогулка", 0, "ru"),
            entry("полисаднику", "палисаднику", 12, "ru"),
            entry("helo", "hello", 30, "en"),
        ],
        Some(user_id),
    )
    .await
    .expect("ingest");
    ingest(
        &store,
        &LowercaseLemmatizer,
        &[entry("helo", "hello", 0, "en")],
        None,
    )
    .await
    .expect("ingest");

    let by_language = statistics::stats_by_language(&store, StatsScope::Global)
        .await
        .unwrap();
    let sum: i64 = by_language.iter().map(|row| row.count).sum();
    assert_eq!(sum, mistakes::total_mistake_count(store.pool()).await.unwrap());
    assert_eq!(sum, 4);

    let mine = statistics::stats_by_language(&store, StatsScope::User(user_id))
        .await
        .unwrap();
    let en = mine.iter().find(|row| row.language == "en").expect("en row");
    assert_eq!(en.count, 1);
}

#[tokio::test]
async fn twenty_seven_year_old_lands_in_twenties_bracket() {
    let (store, _dir) = common::open_store().await;
    let user_id = add_user(&store, "d@example.com", 27).await;

    ingest(
        &store,
        &LowercaseLemmatizer,
        &[entry("helo", "hello", 0, "en")],
        Some(user_id),
    )
    .await
    .expect("ingest");

    let by_age = statistics::stats_by_age(&store).await.unwrap();
    assert_eq!(by_age.len(), 1);
    assert_eq!(by_age[0].age_range, "20 - 29");
    assert_eq!(by_age[0].count, 1);
}

#[tokio::test]
async fn user_listing_orders_by_count() {
    let (store, _dir) = common::open_store().await;
    let user_id = add_user(&store, "e@example.com", 33).await;

    ingest(
        &store,
        &LowercaseLemmatizer,
        &[
            entry("wrld", "world", 0, "en"),
            entry("helo", "hello", 5, "en"),
            entry("helo", "hello", 10, "en"),
        ],
        Some(user_id),
    )
    .await
    .expect("ingest");

    let listing = statistics::mistake_listing(&store, StatsScope::User(user_id))
        .await
        .unwrap();
    let names: Vec<&str> = listing.iter().map(|row| row.name.as_str()).collect();
    assert_eq!(names, vec!["hello", "world"]);
    assert_eq!(listing[0].count, 2);
    assert_eq!(listing[0].language, "en");
}

#[tokio::test]
async fn concurrent_ingestion_of_a_new_word_keeps_one_row() {
    let (store, _dir) = common::open_store().await;
    let entries = vec![entry("helo", "hello", 0, "en")];

    let mut handles = Vec::new();
    for _ in 0..4 {
        let store = store.clone();
        let entries = entries.clone();
        handles.push(tokio::spawn(async move {
            ingest(&store, &LowercaseLemmatizer, &entries, None).await
        }));
    }
    for handle in handles {
        handle.await.expect("join").expect("ingest");
    }

    assert_eq!(mistakes::count_mistake_rows(store.pool()).await.unwrap(), 1);
    assert_eq!(mistakes::total_mistake_count(store.pool()).await.unwrap(), 4);
}

#[tokio::test]
async fn inflections_of_one_word_share_a_mistake_row() {
    let (store, _dir) = common::open_store().await;
    let lemmatizer = MorphLemmatizer::russian();
    let entries = vec![
        entry("прагулка", "Прогулка", 0, "ru"),
        entry("прагулки", "прогулки", 10, "ru"),
        entry("прагулкой", "прогулкой", 20, "ru"),
    ];

    ingest(&store, &lemmatizer, &entries, None)
        .await
        .expect("ingest");

    assert_eq!(mistakes::count_mistake_rows(store.pool()).await.unwrap(), 1);
    let walk = mistakes::find_mistake(store.pool(), "прогулка")
        .await
        .unwrap()
        .expect("mistake row");
    assert_eq!(walk.count, 3);
}

#[tokio::test]
async fn failed_entry_stops_the_batch_and_keeps_earlier_commits() {
    let (store, _dir) = common::open_store().await;
    sqlx::query(
        r#"
        CREATE TRIGGER "reject_boom" BEFORE INSERT ON "mistakes"
        WHEN NEW."name" = 'boom'
        BEGIN
            SELECT RAISE(ABORT, 'boom rejected');
        END
        "#,
    )
    .execute(store.pool())
    .await
    .expect("create trigger");

    let entries = vec![
        entry("frist", "first", 0, "en"),
        entry("bom", "boom", 6, "en"),
        entry("thrid", "third", 10, "en"),
    ];

    let err = ingest(&store, &LowercaseLemmatizer, &entries, None)
        .await
        .unwrap_err();

    match err {
        IngestError::Store {
            index, committed, ..
        } => {
            assert_eq!(index, 1);
            assert_eq!(committed, 1);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(mistakes::find_mistake(store.pool(), "first")
        .await
        .unwrap()
        .is_some());
    assert!(mistakes::find_mistake(store.pool(), "boom")
        .await
        .unwrap()
        .is_none());
    assert!(mistakes::find_mistake(store.pool(), "third")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn lock_conflict_is_retried_once() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut config = DbConfig::at(dir.path().join("ortho.db"));
    config.busy_timeout = Duration::from_millis(500);
    let store = Store::open(&config).await.expect("open store");

    // Another writer holds the lock past the first attempt's busy timeout
    // but releases it while the retry is still waiting.
    let mut holder = store.pool().acquire().await.expect("acquire");
    sqlx::query("BEGIN IMMEDIATE")
        .execute(&mut *holder)
        .await
        .expect("lock");

    let task = {
        let store = store.clone();
        tokio::spawn(async move {
            ingest(
                &store,
                &LowercaseLemmatizer,
                &[entry("helo", "hello", 0, "en")],
                None,
            )
            .await
        })
    };

    tokio::time::sleep(Duration::from_millis(750)).await;
    sqlx::query("COMMIT")
        .execute(&mut *holder)
        .await
        .expect("unlock");
    drop(holder);

    let report = task.await.expect("join").expect("ingest");
    assert_eq!(report.committed, 1);
    assert_eq!(report.retried, 1);
    assert_eq!(mistakes::total_mistake_count(store.pool()).await.unwrap(), 1);
}

#[tokio::test]
async fn users_of_one_decade_are_summed_into_one_bracket() {
    let (store, _dir) = common::open_store().await;
    let younger = add_user(&store, "f@example.com", 21).await;
    let older = add_user(&store, "g@example.com", 29).await;
    let entries = vec![entry("helo", "hello", 0, "en")];

    ingest(&store, &LowercaseLemmatizer, &entries, Some(younger))
        .await
        .expect("ingest");
    ingest(&store, &LowercaseLemmatizer, &entries, Some(older))
        .await
        .expect("ingest");

    let by_age = statistics::stats_by_age(&store).await.unwrap();
    assert_eq!(by_age.len(), 1);
    assert_eq!(by_age[0].age_range, "20 - 29");
    assert_eq!(by_age[0].count, 2);
}
