use std::sync::Arc;

use futures::future::join_all;
use neonatal_dash::{
    Dashboard, DashboardSession, Dimension, FilterSelection, MapClick, MapEvent, MapSelection,
    SelectionInput, UiUpdate, UiValue,
};

use crate::utils::{dashboard, random_admissions};

fn input(dimension: Dimension, value: &str) -> SelectionInput {
    let value = Some(UiValue::One(value.to_string()));
    match dimension {
        Dimension::Country => SelectionInput {
            country: value,
            ..SelectionInput::default()
        },
        Dimension::Outcome => SelectionInput {
            outcome: value,
            ..SelectionInput::default()
        },
        _ => SelectionInput {
            year: value,
            ..SelectionInput::default()
        },
    }
}

/// Many sessions share one dashboard; each sees only its own filters
#[tokio::test]
async fn test_concurrent_sessions_are_isolated() {
    let shared: Arc<Dashboard> = Arc::new(dashboard(random_admissions(31, 1_000)));
    let updates = [
        (Dimension::Country, "Kenya"),
        (Dimension::Country, "Ghana"),
        (Dimension::Outcome, "Died"),
        (Dimension::Year, "2023"),
        (Dimension::Year, "1999"),
    ];

    let tasks = (0..40).map(|i| {
        let dashboard = Arc::clone(&shared);
        let (dimension, value) = updates[i % updates.len()];
        tokio::spawn(async move {
            let mut session = DashboardSession::new();
            let selection = session.apply(UiUpdate::dropdowns(input(dimension, value)));
            (selection.clone(), dashboard.snapshot(&selection))
        })
    });

    for result in join_all(tasks).await {
        let (selection, snapshot) = result.unwrap();
        let expected = shared.snapshot(&selection);
        assert_eq!(snapshot, expected);
        assert_eq!(snapshot.selection, selection);
    }
}

/// Concurrent identical requests all see the same view
#[tokio::test]
async fn test_concurrent_identical_requests() {
    let shared = Arc::new(dashboard(random_admissions(32, 2_000)));
    let selection = FilterSelection::new().with(Dimension::Country, ["Nigeria"]);

    let tasks = (0..16).map(|_| {
        let dashboard = Arc::clone(&shared);
        let selection = selection.clone();
        tokio::task::spawn_blocking(move || dashboard.view(&selection).len())
    });

    let lengths: Vec<usize> = join_all(tasks)
        .await
        .into_iter()
        .map(Result::unwrap)
        .collect();
    let expected = shared.view(&selection).len();
    assert!(lengths.iter().all(|len| *len == expected));
}

#[tokio::test]
async fn test_session_updates_are_last_write_wins() {
    let mut session = DashboardSession::new();

    session.apply(UiUpdate::map(MapEvent::click(MapClick::on("Lagos"))));
    session.apply(UiUpdate::map(MapEvent::click(MapClick::on("Accra"))));
    session.apply(UiUpdate::map(MapEvent::click(MapClick::missed())));

    assert_eq!(
        session.map_selection(),
        &MapSelection::Selected("Accra".to_string())
    );
    assert_eq!(session.selection().map_city.as_deref(), Some("Accra"));
}
