mod common;

use serde_json::json;

// ---------------------------------------------------------------------------
// Booking
// ---------------------------------------------------------------------------

#[tokio::test]
async fn book_pora_confirms_and_broadcasts() {
    let (addr, _state, store) = common::start_server().await;
    let admin = store.seed_user("Aziz", "Karimov");
    let member = store.seed_user("Bobur", "Saidov");
    let group = store.seed_group("Tahajjud ahli", &admin.id, 30);
    store.seed_member(&group.id, &member.id);
    let pora = store.seed_pora("5-pora", 5);

    let mut admin_ws = common::connect(addr, &common::mint_token(&admin.id)).await;
    common::send_event(&mut admin_ws, "join_group", json!({ "groupId": group.id })).await;
    common::recv_named(&mut admin_ws, "joined_group").await;

    let mut member_ws = common::connect(addr, &common::mint_token(&member.id)).await;
    common::send_event(&mut member_ws, "join_group", json!({ "groupId": group.id })).await;
    common::recv_named(&mut member_ws, "joined_group").await;
    common::recv_named(&mut admin_ws, "user_online").await;

    common::send_event(
        &mut member_ws,
        "book_pora",
        json!({ "poraId": pora.id, "groupId": group.id }),
    )
    .await;

    // The caller gets the confirmation first, then its own copy of the
    // room broadcast.
    let confirmed = common::recv_named(&mut member_ws, "booking_confirmed").await;
    assert!(confirmed["bookingId"].as_str().unwrap().starts_with("bkg_"));
    assert_eq!(confirmed["poraId"], pora.id);
    assert_eq!(confirmed["poraName"], "5-pora");
    common::recv_named(&mut member_ws, "pora_booked").await;

    let booked = common::recv_named(&mut admin_ws, "pora_booked").await;
    assert_eq!(booked["poraId"], pora.id);
    assert_eq!(booked["groupId"], group.id);
    assert_eq!(booked["userId"], member.id);
    assert_eq!(booked["userName"], "Bobur Saidov");

    let bookings = store.bookings_for_group(&group.id);
    assert_eq!(bookings.len(), 1);
    assert!(bookings[0].is_booked);
    assert!(!bookings[0].is_done);
}

#[tokio::test]
async fn booking_a_taken_pora_conflicts() {
    let (addr, _state, store) = common::start_server().await;
    let admin = store.seed_user("Aziz", "Karimov");
    let member = store.seed_user("Bobur", "Saidov");
    let group = store.seed_group("Tahajjud ahli", &admin.id, 30);
    store.seed_member(&group.id, &member.id);
    let pora = store.seed_pora("5-pora", 5);

    let mut member_ws = common::connect(addr, &common::mint_token(&member.id)).await;
    common::send_event(
        &mut member_ws,
        "book_pora",
        json!({ "poraId": pora.id, "groupId": group.id }),
    )
    .await;
    common::recv_named(&mut member_ws, "booking_confirmed").await;

    let mut admin_ws = common::connect(addr, &common::mint_token(&admin.id)).await;
    common::send_event(
        &mut admin_ws,
        "book_pora",
        json!({ "poraId": pora.id, "groupId": group.id }),
    )
    .await;
    let error = common::recv_error(&mut admin_ws).await;
    assert_eq!(error["message"], "This pora is already booked");
    assert_eq!(error["code"], "CONFLICT");

    assert_eq!(store.bookings_for_group(&group.id).len(), 1);
}

#[tokio::test]
async fn book_pora_requires_membership() {
    let (addr, _state, store) = common::start_server().await;
    let admin = store.seed_user("Aziz", "Karimov");
    let outsider = store.seed_user("Dilnoza", "Rahimova");
    let group = store.seed_group("Tahajjud ahli", &admin.id, 30);
    let pora = store.seed_pora("5-pora", 5);

    let mut ws = common::connect(addr, &common::mint_token(&outsider.id)).await;
    common::send_event(
        &mut ws,
        "book_pora",
        json!({ "poraId": pora.id, "groupId": group.id }),
    )
    .await;
    let error = common::recv_error(&mut ws).await;
    assert_eq!(error["message"], "Not a member of this group");
    assert_eq!(error["code"], "AUTHORIZATION_DENIED");
    assert!(store.bookings_for_group(&group.id).is_empty());
}

#[tokio::test]
async fn booking_an_unknown_pora_is_not_found() {
    let (addr, _state, store) = common::start_server().await;
    let admin = store.seed_user("Aziz", "Karimov");
    let group = store.seed_group("Tahajjud ahli", &admin.id, 30);

    let mut ws = common::connect(addr, &common::mint_token(&admin.id)).await;
    common::send_event(
        &mut ws,
        "book_pora",
        json!({ "poraId": "pora_missing", "groupId": group.id }),
    )
    .await;
    let error = common::recv_error(&mut ws).await;
    assert_eq!(error["message"], "Pora not found");
    assert_eq!(error["code"], "NOT_FOUND");
}

// ---------------------------------------------------------------------------
// Completion and the hatm cycle
// ---------------------------------------------------------------------------

#[tokio::test]
async fn complete_pora_requires_ownership() {
    let (addr, _state, store) = common::start_server().await;
    let admin = store.seed_user("Aziz", "Karimov");
    let member = store.seed_user("Bobur", "Saidov");
    let group = store.seed_group("Tahajjud ahli", &admin.id, 30);
    store.seed_member(&group.id, &member.id);
    let pora = store.seed_pora("5-pora", 5);

    let mut member_ws = common::connect(addr, &common::mint_token(&member.id)).await;
    common::send_event(
        &mut member_ws,
        "book_pora",
        json!({ "poraId": pora.id, "groupId": group.id }),
    )
    .await;
    let confirmed = common::recv_named(&mut member_ws, "booking_confirmed").await;
    let booking_id = confirmed["bookingId"].as_str().unwrap().to_string();

    let mut admin_ws = common::connect(addr, &common::mint_token(&admin.id)).await;
    common::send_event(
        &mut admin_ws,
        "complete_pora",
        json!({ "bookingId": booking_id }),
    )
    .await;
    let error = common::recv_error(&mut admin_ws).await;
    assert_eq!(error["message"], "Not authorized to complete this pora");
    assert_eq!(error["code"], "AUTHORIZATION_DENIED");
    assert_eq!(store.finished_count(&group.id), 0);
}

#[tokio::test]
async fn complete_pora_advances_the_group_counter() {
    let (addr, _state, store) = common::start_server().await;
    let admin = store.seed_user("Aziz", "Karimov");
    let member = store.seed_user("Bobur", "Saidov");
    let group = store.seed_group("Tahajjud ahli", &admin.id, 30);
    store.seed_member(&group.id, &member.id);
    let pora = store.seed_pora("5-pora", 5);

    let mut member_ws = common::connect(addr, &common::mint_token(&member.id)).await;
    common::send_event(&mut member_ws, "join_group", json!({ "groupId": group.id })).await;
    common::recv_named(&mut member_ws, "joined_group").await;

    common::send_event(
        &mut member_ws,
        "book_pora",
        json!({ "poraId": pora.id, "groupId": group.id }),
    )
    .await;
    let confirmed = common::recv_named(&mut member_ws, "booking_confirmed").await;
    let booking_id = confirmed["bookingId"].as_str().unwrap().to_string();
    common::recv_named(&mut member_ws, "pora_booked").await;

    common::send_event(
        &mut member_ws,
        "complete_pora",
        json!({ "bookingId": booking_id }),
    )
    .await;
    let done = common::recv_named(&mut member_ws, "completion_confirmed").await;
    assert_eq!(done["bookingId"], booking_id.as_str());
    assert_eq!(done["poraName"], "5-pora");

    let completed = common::recv_named(&mut member_ws, "pora_completed").await;
    assert_eq!(completed["totalFinished"], 1);
    assert_eq!(completed["hatmCompleted"], false);
    assert_eq!(completed["groupName"], "Tahajjud ahli");
    assert_eq!(completed["userName"], "Bobur Saidov");

    assert_eq!(store.finished_count(&group.id), 1);
    assert_eq!(store.hatm_count(&group.id), 0);
    assert!(store.booking(&booking_id).unwrap().is_done);
}

#[tokio::test]
async fn completing_twice_conflicts_and_counts_once() {
    let (addr, _state, store) = common::start_server().await;
    let admin = store.seed_user("Aziz", "Karimov");
    let group = store.seed_group("Tahajjud ahli", &admin.id, 30);
    let pora = store.seed_pora("5-pora", 5);

    let mut ws = common::connect(addr, &common::mint_token(&admin.id)).await;
    common::send_event(
        &mut ws,
        "book_pora",
        json!({ "poraId": pora.id, "groupId": group.id }),
    )
    .await;
    let confirmed = common::recv_named(&mut ws, "booking_confirmed").await;
    let booking_id = confirmed["bookingId"].as_str().unwrap().to_string();

    common::send_event(&mut ws, "complete_pora", json!({ "bookingId": booking_id })).await;
    common::recv_named(&mut ws, "completion_confirmed").await;

    common::send_event(&mut ws, "complete_pora", json!({ "bookingId": booking_id })).await;
    let error = common::recv_error(&mut ws).await;
    assert_eq!(error["message"], "Pora already completed");
    assert_eq!(error["code"], "CONFLICT");

    assert_eq!(store.finished_count(&group.id), 1);
}

#[tokio::test]
async fn completing_the_final_pora_closes_the_cycle() {
    let (addr, _state, store) = common::start_server().await;
    let admin = store.seed_user("Aziz", "Karimov");
    let group = store.seed_group("Tahajjud ahli", &admin.id, 30);
    let pora = store.seed_pora("30-pora", 30);
    store.seed_finished_count(&group.id, 29);

    let mut ws = common::connect(addr, &common::mint_token(&admin.id)).await;
    common::send_event(&mut ws, "join_group", json!({ "groupId": group.id })).await;
    common::recv_named(&mut ws, "joined_group").await;

    common::send_event(
        &mut ws,
        "book_pora",
        json!({ "poraId": pora.id, "groupId": group.id }),
    )
    .await;
    let confirmed = common::recv_named(&mut ws, "booking_confirmed").await;
    let booking_id = confirmed["bookingId"].as_str().unwrap().to_string();
    common::recv_named(&mut ws, "pora_booked").await;

    common::send_event(&mut ws, "complete_pora", json!({ "bookingId": booking_id })).await;
    common::recv_named(&mut ws, "completion_confirmed").await;

    // The closing completion reports the goal value, then the cycle event.
    let completed = common::recv_named(&mut ws, "pora_completed").await;
    assert_eq!(completed["totalFinished"], 30);
    assert_eq!(completed["hatmCompleted"], true);

    let hatm = common::recv_named(&mut ws, "hatm_completed").await;
    assert_eq!(hatm["groupId"], group.id);
    assert_eq!(hatm["groupName"], "Tahajjud ahli");
    assert_eq!(hatm["completedHatmCount"], 1);

    assert_eq!(store.finished_count(&group.id), 0);
    assert_eq!(store.hatm_count(&group.id), 1);
}

#[tokio::test]
async fn completing_an_unknown_booking_is_not_found() {
    let (addr, _state, store) = common::start_server().await;
    let admin = store.seed_user("Aziz", "Karimov");
    store.seed_group("Tahajjud ahli", &admin.id, 30);

    let mut ws = common::connect(addr, &common::mint_token(&admin.id)).await;
    common::send_event(&mut ws, "complete_pora", json!({ "bookingId": "bkg_missing" })).await;
    let error = common::recv_error(&mut ws).await;
    assert_eq!(error["message"], "Booking not found");
    assert_eq!(error["code"], "NOT_FOUND");
}

// ---------------------------------------------------------------------------
// Zikr counting
// ---------------------------------------------------------------------------

#[tokio::test]
async fn zikr_updates_accumulate_into_the_daily_tally() {
    let (addr, _state, store) = common::start_server().await;
    let admin = store.seed_user("Aziz", "Karimov");
    let member = store.seed_user("Malika", "Yusupova");
    let group = store.seed_group("Zikr ahli", &admin.id, 30);
    store.seed_member(&group.id, &member.id);
    let zikr = store.seed_zikr(&group.id, "Istighfar", 100);

    let mut admin_ws = common::connect(addr, &common::mint_token(&admin.id)).await;
    common::send_event(&mut admin_ws, "join_group", json!({ "groupId": group.id })).await;
    common::recv_named(&mut admin_ws, "joined_group").await;

    let mut member_ws = common::connect(addr, &common::mint_token(&member.id)).await;
    common::send_event(
        &mut member_ws,
        "update_zikr_count",
        json!({ "groupId": group.id, "zikrId": zikr.id, "count": 30 }),
    )
    .await;
    let confirmed = common::recv_named(&mut member_ws, "zikr_update_confirmed").await;
    assert!(confirmed["id"].as_str().unwrap().starts_with("zkc_"));
    assert_eq!(confirmed["totalCount"], 30);
    assert_eq!(confirmed["goalReached"], false);

    let updated = common::recv_named(&mut admin_ws, "zikr_count_updated").await;
    assert_eq!(updated["zikrName"], "Istighfar");
    assert_eq!(updated["userName"], "Malika Yusupova");
    assert_eq!(updated["count"], 30);
    assert_eq!(updated["totalCount"], 30);
    assert_eq!(updated["progress"], 30.0);
    assert_eq!(updated["goalReached"], false);

    common::send_event(
        &mut member_ws,
        "update_zikr_count",
        json!({ "groupId": group.id, "zikrId": zikr.id, "count": 80 }),
    )
    .await;
    let confirmed = common::recv_named(&mut member_ws, "zikr_update_confirmed").await;
    assert_eq!(confirmed["totalCount"], 110);
    assert_eq!(confirmed["goalReached"], true);

    let updated = common::recv_named(&mut admin_ws, "zikr_count_updated").await;
    assert_eq!(updated["progress"], 100.0);
    assert_eq!(updated["goalReached"], true);

    // Same caller, same day: one tally row, accumulated.
    let rows = store.zikr_count_rows(&zikr.id, &member.id);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].count, 110);
}

#[tokio::test]
async fn zikr_update_requires_membership() {
    let (addr, _state, store) = common::start_server().await;
    let admin = store.seed_user("Aziz", "Karimov");
    let outsider = store.seed_user("Dilnoza", "Rahimova");
    let group = store.seed_group("Zikr ahli", &admin.id, 30);
    let zikr = store.seed_zikr(&group.id, "Istighfar", 100);

    let mut ws = common::connect(addr, &common::mint_token(&outsider.id)).await;
    common::send_event(
        &mut ws,
        "update_zikr_count",
        json!({ "groupId": group.id, "zikrId": zikr.id, "count": 10 }),
    )
    .await;
    let error = common::recv_error(&mut ws).await;
    assert_eq!(error["message"], "Not a member of this group");
    assert_eq!(error["code"], "AUTHORIZATION_DENIED");
    assert!(store.zikr_count_rows(&zikr.id, &outsider.id).is_empty());
}

#[tokio::test]
async fn updating_an_unknown_zikr_is_not_found() {
    let (addr, _state, store) = common::start_server().await;
    let admin = store.seed_user("Aziz", "Karimov");
    let group = store.seed_group("Zikr ahli", &admin.id, 30);

    let mut ws = common::connect(addr, &common::mint_token(&admin.id)).await;
    common::send_event(
        &mut ws,
        "update_zikr_count",
        json!({ "groupId": group.id, "zikrId": "zikr_missing", "count": 10 }),
    )
    .await;
    let error = common::recv_error(&mut ws).await;
    assert_eq!(error["message"], "Zikr not found");
    assert_eq!(error["code"], "NOT_FOUND");
}
