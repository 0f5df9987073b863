use std::sync::Arc;
use std::time::Duration;

use companion::content::{
    AlQuranCloudClient, ContentRepository, Edition, FetchError, MuslimSalatClient,
    PrayerTimesRepository, VerseRepository,
};
use companion::core::{Companion, PreferenceStore, UiState, Update};
use companion::core::state::FAILURE_MESSAGE;
use tokio_test::{assert_err, assert_ok};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, path_regex, query_param},
};

// ============================================================================
// Helper Functions
// ============================================================================

const AL_FATIHA: &str = r#"{
    "code": 200,
    "status": "OK",
    "data": {
        "number": 1,
        "text": "In the name of Allah...",
        "edition": {"identifier": "quran-simple", "englishName": "Simple"},
        "surah": {
            "number": 1,
            "englishName": "Al-Faatiha",
            "englishNameTranslation": "The Opening",
            "numberOfAyahs": 7
        },
        "numberInSurah": 1
    }
}"#;

const JAKARTA: &str = r#"{
    "query": "jakarta",
    "city": "Jakarta",
    "country": "Indonesia",
    "timezone": "7",
    "qibla_direction": "295.15",
    "prayer_method_name": "Muslim World League",
    "items": [{
        "date_for": "2024-05-04",
        "fajr": "4:35 am",
        "shurooq": "5:50 am",
        "dhuhr": "11:50 am",
        "asr": "3:10 pm",
        "maghrib": "5:49 pm",
        "isha": "6:59 pm"
    }],
    "status_valid": 1,
    "status_description": "Success."
}"#;

fn verse_body(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_raw(AL_FATIHA.replace("In the name of Allah...", text), "application/json")
}

fn repository_for(server: &MockServer) -> ContentRepository {
    ContentRepository::new(
        Arc::new(AlQuranCloudClient::new(Some(server.uri()))),
        Arc::new(MuslimSalatClient::new(Some("test-key".to_string()), Some(server.uri()))),
    )
}

async fn next_update(rx: &mut tokio::sync::mpsc::UnboundedReceiver<Update>) -> Update {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for update")
        .expect("update channel closed")
}

// ============================================================================
// alquran.cloud Client Tests
// ============================================================================

#[tokio::test]
async fn test_fetch_verse_maps_all_fields() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ayah/1/quran-simple"))
        .respond_with(verse_body("In the name of Allah..."))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = AlQuranCloudClient::new(Some(mock_server.uri()));
    let verse = assert_ok!(client.fetch_verse(1, &Edition::default()).await);

    assert_eq!(verse.text, "In the name of Allah...");
    assert_eq!(verse.surah_number, 1);
    assert_eq!(verse.surah_name, "Al-Faatiha");
    assert_eq!(verse.surah_name_translation, "The Opening");
    assert_eq!(verse.ayah_number_in_surah, 1);
    assert_eq!(verse.total_ayahs_in_surah, 7);
    assert_eq!(verse.edition_name, "Simple");
}

#[tokio::test]
async fn test_fetch_random_verse_uses_edition_and_valid_number() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path_regex(r"^/ayah/[0-9]+/en\.sahih$"))
        .respond_with(verse_body("In the name of Allah, the Entirely Merciful"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = AlQuranCloudClient::new(Some(mock_server.uri()));
    let verse = assert_ok!(client.fetch_random_verse(&Edition::from("en.sahih")).await);
    assert_eq!(verse.text, "In the name of Allah, the Entirely Merciful");

    let requests = mock_server.received_requests().await.unwrap();
    let number: u16 = requests[0].url.path_segments().unwrap().nth(1).unwrap().parse().unwrap();
    assert!((1..=6236).contains(&number));
}

#[tokio::test]
async fn test_fetch_verse_non_2xx_is_network_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path_regex(r"^/ayah/"))
        .respond_with(ResponseTemplate::new(404).set_body_string(
            r#"{"code":404,"status":"NOT FOUND","data":"Please specify an Ayah number (1 to 6236)."}"#,
        ))
        .mount(&mock_server)
        .await;

    let client = AlQuranCloudClient::new(Some(mock_server.uri()));
    let err = assert_err!(client.fetch_verse(1, &Edition::from("xx.bogus")).await);
    match err {
        FetchError::Network(msg) => assert!(msg.contains("404"), "got: {msg}"),
        other => panic!("expected Network, got {other:?}"),
    }
}

#[tokio::test]
async fn test_fetch_verse_unexpected_shape_is_decode_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path_regex(r"^/ayah/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"code":200,"data":[]}"#))
        .mount(&mock_server)
        .await;

    let client = AlQuranCloudClient::new(Some(mock_server.uri()));
    let result = client.fetch_verse(1, &Edition::default()).await;
    assert!(matches!(result, Err(FetchError::Decode(_))));
}

#[tokio::test]
async fn test_fetch_verse_timeout_is_network_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path_regex(r"^/ayah/"))
        .respond_with(verse_body("late").set_delay(Duration::from_secs(2)))
        .mount(&mock_server)
        .await;

    let client =
        AlQuranCloudClient::with_timeout(Some(mock_server.uri()), Duration::from_millis(100));
    let result = client.fetch_verse(1, &Edition::default()).await;
    assert!(matches!(result, Err(FetchError::Network(_))));
}

#[tokio::test]
async fn test_unreachable_server_is_network_error() {
    // Nothing listens on port 9 (discard) in the test environment.
    let client = AlQuranCloudClient::new(Some("http://127.0.0.1:9/v1".to_string()));
    let result = client.fetch_verse(1, &Edition::default()).await;
    assert!(matches!(result, Err(FetchError::Network(_))));
}

// ============================================================================
// muslimsalat.com Client Tests
// ============================================================================

#[tokio::test]
async fn test_fetch_prayer_times() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/jakarta.json"))
        .and(query_param("key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_string(JAKARTA))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = MuslimSalatClient::new(Some("test-key".to_string()), Some(mock_server.uri()));
    let times = assert_ok!(client.fetch_prayer_times("jakarta").await);

    assert_eq!(times.city, "Jakarta");
    assert_eq!(times.country, "Indonesia");
    let today = times.today().unwrap();
    assert_eq!(today.fajr, "4:35 am");
    assert_eq!(today.isha, "6:59 pm");
    assert_eq!(today.date(), chrono::NaiveDate::from_ymd_opt(2024, 5, 4));
}

#[tokio::test]
async fn test_fetch_prayer_times_invalid_location_is_decode_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/atlantis.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"status_valid":0,"status_code":0,"status_description":"Invalid location."}"#,
        ))
        .mount(&mock_server)
        .await;

    let client = MuslimSalatClient::new(None, Some(mock_server.uri()));
    let result = client.fetch_prayer_times("atlantis").await;
    assert_eq!(result, Err(FetchError::Decode("Invalid location.".to_string())));
}

#[tokio::test]
async fn test_fetch_prayer_times_server_error_is_network_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
        .mount(&mock_server)
        .await;

    let client = MuslimSalatClient::new(None, Some(mock_server.uri()));
    let result = client.fetch_prayer_times("jakarta").await;
    assert!(matches!(result, Err(FetchError::Network(msg)) if msg.contains("503")));
}

// ============================================================================
// End-to-end through the Companion
// ============================================================================

#[tokio::test]
async fn test_end_to_end_success_exposes_all_fields() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path_regex(r"^/ayah/[0-9]+/quran-simple$"))
        .respond_with(verse_body("In the name of Allah..."))
        .mount(&mock_server)
        .await;

    let (mut app, mut rx) = Companion::new(
        repository_for(&mock_server),
        Arc::new(PreferenceStore::in_memory()),
    );
    app.fetch_random_verse();

    assert_eq!(next_update(&mut rx).await, Update::Verse(UiState::Loading));
    let Update::Verse(UiState::Success(verse)) = next_update(&mut rx).await else {
        panic!("expected a successful verse");
    };
    assert_eq!(verse.text, "In the name of Allah...");
    assert_eq!(verse.surah_number, 1);
    assert_eq!(verse.surah_name, "Al-Faatiha");
    assert_eq!(verse.surah_name_translation, "The Opening");
    assert_eq!(verse.ayah_number_in_surah, 1);
    assert_eq!(verse.total_ayahs_in_surah, 7);
    assert_eq!(verse.edition_name, "Simple");
    assert_eq!(next_update(&mut rx).await, Update::Favorite(false));
}

#[tokio::test]
async fn test_end_to_end_timeout_shows_generic_message() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(verse_body("late").set_delay(Duration::from_secs(2)))
        .mount(&mock_server)
        .await;

    let repository = ContentRepository::new(
        Arc::new(AlQuranCloudClient::with_timeout(
            Some(mock_server.uri()),
            Duration::from_millis(100),
        )),
        Arc::new(MuslimSalatClient::new(None, Some(mock_server.uri()))),
    );
    let (mut app, mut rx) = Companion::new(repository, Arc::new(PreferenceStore::in_memory()));
    app.fetch_random_verse();

    assert_eq!(next_update(&mut rx).await, Update::Verse(UiState::Loading));
    let Update::Verse(state) = next_update(&mut rx).await else {
        panic!("expected a verse update");
    };
    assert!(matches!(state, UiState::Failure(FetchError::Network(_))));
    assert_eq!(state.message(), Some(FAILURE_MESSAGE));
}

#[tokio::test]
async fn test_end_to_end_selected_edition_reaches_server() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path_regex(r"^/ayah/[0-9]+/en\.sahih$"))
        .respond_with(verse_body("In the name of Allah, the Entirely Merciful"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (mut app, mut rx) = Companion::new(
        repository_for(&mock_server),
        Arc::new(PreferenceStore::in_memory()),
    );
    app.set_ayah_edition(Edition::from("en.sahih"));
    app.fetch_random_verse();

    assert_eq!(next_update(&mut rx).await, Update::Verse(UiState::Loading));
    assert!(matches!(
        next_update(&mut rx).await,
        Update::Verse(UiState::Success(_))
    ));

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].url.path().ends_with("/en.sahih"));
}

#[tokio::test]
async fn test_end_to_end_favorite_persists_across_fetches() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path_regex(r"^/ayah/"))
        .respond_with(verse_body("In the name of Allah..."))
        .mount(&mock_server)
        .await;

    let store = Arc::new(PreferenceStore::in_memory());
    let (mut app, mut rx) = Companion::new(repository_for(&mock_server), Arc::clone(&store));

    app.fetch_random_verse();
    for _ in 0..3 {
        next_update(&mut rx).await;
    }
    assert_eq!(app.toggle_favorite(), Some(true));
    assert_eq!(next_update(&mut rx).await, Update::Favorite(true));

    // Same ayah again: the flag comes back set.
    app.fetch_random_verse();
    assert_eq!(next_update(&mut rx).await, Update::Verse(UiState::Loading));
    next_update(&mut rx).await;
    assert_eq!(next_update(&mut rx).await, Update::Favorite(true));
}
