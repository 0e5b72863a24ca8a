use polling_widget::db::{MemoryStorage, SqliteStorage, Storage};
use polling_widget::handlers::{handle_interaction, Interaction};
use polling_widget::view::PointerEvents;
use polling_widget::{
    IncrementMode, MountError, Page, PollMarkup, PollState, TallyStore, TOTAL_POLLS_KEY,
};
use serde_json::{json, Value};
use std::sync::Arc;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

async fn stored(storage: &dyn Storage, poll_id: &str) -> Value {
    let raw = storage.get_item(poll_id).await.unwrap().unwrap();
    serde_json::from_str(&raw).unwrap()
}

fn activate(poll_id: &str, answer: usize) -> Interaction {
    Interaction::Activate {
        poll_id: poll_id.to_string(),
        answer,
    }
}

#[tokio::test]
async fn yes_no_poll_single_vote() {
    init_logging();
    let storage = Arc::new(MemoryStorage::new());
    let mut page = Page::new(TallyStore::new(storage.clone()));

    page.mount(
        PollMarkup::new("p1")
            .title("Do you like polls?")
            .answer("Yes")
            .answer("No")
            .finished("{{count}} people voted"),
    )
    .unwrap();

    handle_interaction(&mut page, activate("p1", 0)).await;

    assert_eq!(
        stored(storage.as_ref(), "p1").await,
        json!({"Yes": 1, "totalPolls": 1})
    );

    let poll = page.poll("p1").unwrap();
    assert_eq!(poll.state(), PollState::Completed);
    assert_eq!(poll.answers()[0].presentation().result_text, "100%");
    assert_eq!(poll.answers()[1].presentation().result_text, "0%");
    assert_eq!(poll.finished_message(), Some("1 people voted"));

    let view = poll.presentation();
    assert!(view.footer_visible);
    assert_eq!(view.pointer_events, PointerEvents::None);
}

#[tokio::test]
async fn existing_tally_drives_percentages() {
    init_logging();
    let storage = Arc::new(MemoryStorage::new().with_item("p1", r#"{"A":1,"B":1,"totalPolls":2}"#));
    let mut page = Page::new(TallyStore::new(storage.clone()));
    page.mount(PollMarkup::new("p1").answer("A").answer("B"))
        .unwrap();

    handle_interaction(&mut page, activate("p1", 1)).await;

    let poll = page.poll("p1").unwrap();
    assert_eq!(poll.answers()[0].result(), Some(33));
    assert_eq!(poll.answers()[1].result(), Some(67));
    assert_eq!(
        stored(storage.as_ref(), "p1").await,
        json!({"A": 1, "B": 2, "totalPolls": 3})
    );
}

#[tokio::test]
async fn votes_survive_remount() {
    init_logging();
    let mut page = Page::new(TallyStore::new(Arc::new(MemoryStorage::new())));
    let markup = PollMarkup::new("p1").answer("Yes").answer("No").finished("{{ COUNT }} votes");

    for answer in [0, 1, 0] {
        page.unmount("p1");
        page.mount(markup.clone()).unwrap();
        handle_interaction(&mut page, activate("p1", answer)).await;
    }

    let record = page.store().read("p1").await;
    assert_eq!(record.total_polls(), 3);
    assert_eq!(record.count_for("Yes"), 2);
    assert_eq!(record.count_for("No"), 1);
    assert_eq!(page.poll("p1").unwrap().finished_message(), Some("3 votes"));
}

#[tokio::test]
async fn seeded_results_show_until_a_vote_replaces_them() {
    init_logging();
    let mut page = Page::new(TallyStore::new(Arc::new(MemoryStorage::new())));
    page.mount(
        PollMarkup::new("p1")
            .seeded_answer("Yes", "40")
            .seeded_answer("No", "sixty"),
    )
    .unwrap();

    let poll = page.poll("p1").unwrap();
    assert_eq!(poll.state(), PollState::Active);
    assert_eq!(poll.answers()[0].presentation().result_text, "40%");
    assert_eq!(poll.answers()[1].presentation().result_text, "0%");

    handle_interaction(&mut page, activate("p1", 1)).await;

    let poll = page.poll("p1").unwrap();
    assert_eq!(poll.answers()[0].result(), Some(0));
    assert_eq!(poll.answers()[1].result(), Some(100));
}

#[tokio::test]
async fn existing_unrelated_entries_survive_a_vote() {
    init_logging();
    let storage = Arc::new(
        MemoryStorage::new().with_item("p1", r#"{"A":1,"note":"x","B":1.5,"totalPolls":2}"#),
    );
    let mut page = Page::new(TallyStore::new(storage.clone()));
    page.mount(PollMarkup::new("p1").answer("A").answer("B"))
        .unwrap();

    handle_interaction(&mut page, activate("p1", 0)).await;

    assert_eq!(
        stored(storage.as_ref(), "p1").await,
        json!({"A": 2, "note": "x", "B": 1.5, "totalPolls": 3})
    );
    let poll = page.poll("p1").unwrap();
    assert_eq!(poll.answers()[0].result(), Some(67));
    assert_eq!(poll.answers()[1].result(), Some(33));
}

#[tokio::test]
async fn reserved_label_corrupts_total() {
    init_logging();
    let storage = Arc::new(MemoryStorage::new());
    let mut page = Page::new(TallyStore::new(storage.clone()));
    page.mount(PollMarkup::new("p1").answer(TOTAL_POLLS_KEY).answer("Other"))
        .unwrap();

    handle_interaction(&mut page, activate("p1", 0)).await;

    // The answer and the counter share one key, so one vote counts twice.
    assert_eq!(stored(storage.as_ref(), "p1").await, json!({"totalPolls": 2}));
    let poll = page.poll("p1").unwrap();
    assert_eq!(poll.answers()[0].result(), Some(100));
    assert_eq!(poll.answers()[1].result(), Some(0));
}

#[tokio::test]
async fn missing_id_is_fatal() {
    init_logging();
    let mut page = Page::new(TallyStore::new(Arc::new(MemoryStorage::new())));
    let markup: PollMarkup = serde_json::from_value(json!({
        "title": "No identity",
        "answers": [{"label": "Yes"}]
    }))
    .unwrap();

    assert_eq!(page.mount(markup).err(), Some(MountError::MissingId));
    assert!(page.is_empty());
}

#[tokio::test]
async fn sqlite_store_end_to_end() {
    init_logging();
    let sqlite = Arc::new(SqliteStorage::connect("sqlite::memory:", 1).await.unwrap());
    let store = TallyStore::new(sqlite.clone())
        .with_mode(IncrementMode::CompareAndSwap { max_retries: 3 });
    let mut page = Page::new(store);
    page.mount(PollMarkup::new("lunch").answer("Pizza").answer("Salad"))
        .unwrap();

    for answer in [0, 0, 1] {
        handle_interaction(&mut page, activate("lunch", answer)).await;
    }

    assert_eq!(
        stored(sqlite.as_ref(), "lunch").await,
        json!({"Pizza": 2, "Salad": 1, "totalPolls": 3})
    );
    let poll = page.poll("lunch").unwrap();
    assert_eq!(poll.answers()[0].result(), Some(67));
    assert_eq!(poll.answers()[1].result(), Some(33));
}
