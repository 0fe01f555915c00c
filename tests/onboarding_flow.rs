mod support;

use stridecoach::plans::model::week_start_after;
use stridecoach::profile::model::DayOfWeek;
use stridecoach::profile::ProfileStatus;

use support::{drive_full_questionnaire, fixture, joined_text, user, CHAT_ID, USER_ID};

#[tokio::test]
async fn start_greets_and_asks_the_first_question() {
    let (mut bot, _generator, store) = fixture();
    let replies = bot.handle_message(CHAT_ID, &user(), "/start").await;

    let text = joined_text(&replies);
    assert!(text.contains("StrideCoach"), "greeting missing: {text}");
    assert!(
        text.contains("What should I call you?"),
        "first question missing: {text}"
    );

    // First contact creates the durable record in onboarding status.
    let profile = store.profile(USER_ID).expect("profile created on /start");
    assert_eq!(profile.status, ProfileStatus::Onboarding);
    assert_eq!(profile.name, "Alex Moreno");
}

#[tokio::test]
async fn full_questionnaire_delivers_a_plan_and_enters_review() {
    let (mut bot, generator, store) = fixture();
    generator.push_ok(support::sample_plan());

    let replies = drive_full_questionnaire(&mut bot).await;
    let text = joined_text(&replies);

    assert!(text.contains("put your plan together"), "no progress note: {text}");
    assert!(text.contains("Tuesday — Intervals (8 km)"), "plan not rendered: {text}");
    assert!(text.contains("How does this look?"), "no review prompt: {text}");

    // The final reply carries the review keyboard.
    let last = replies.last().unwrap();
    let keyboard = last.keyboard.as_ref().expect("review keyboard");
    let callbacks: Vec<&str> = keyboard.inline_keyboard[0]
        .iter()
        .map(|b| b.callback_data.as_str())
        .collect();
    assert_eq!(callbacks, vec!["review:confirm", "review:edit"]);

    // Terminal action persisted the full profile wholesale.
    let profile = store.profile(USER_ID).expect("profile persisted");
    assert_eq!(profile.age, Some(34));
    assert_eq!(profile.weight_kg, Some(74.5));
    assert_eq!(profile.goal.as_deref(), Some("Half marathon"));
    assert_eq!(
        profile.preferred_days,
        vec![
            DayOfWeek::Monday,
            DayOfWeek::Tuesday,
            DayOfWeek::Thursday,
            DayOfWeek::Saturday
        ]
    );
    assert_eq!(profile.long_run_day, Some(DayOfWeek::Saturday));
    assert_eq!(profile.status, ProfileStatus::Onboarding);

    // One stored plan, keyed to next week's Monday, first generation.
    let plans = store.plans();
    assert_eq!(plans.len(), 1);
    assert_eq!(plans[0].user_id, USER_ID);
    assert_eq!(plans[0].generation, 1);
    assert_eq!(
        plans[0].week_start,
        week_start_after(chrono::Utc::now().date_naive())
    );
    assert_eq!(plans[0].profile_hash, profile.snapshot_hash());

    // The generator saw the profile, with no feedback on the first pass.
    let requests = generator.requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].feedback.is_none());
    assert_eq!(requests[0].profile.user_id, USER_ID);
}

#[tokio::test]
async fn text_without_a_session_points_at_start() {
    let (mut bot, _generator, _store) = fixture();
    let replies = bot.handle_message(CHAT_ID, &user(), "hello?").await;
    assert!(joined_text(&replies).contains("/start"));
}

#[tokio::test]
async fn restart_discards_collected_answers() {
    let (mut bot, _generator, _store) = fixture();
    let user = user();
    bot.handle_message(CHAT_ID, &user, "/start").await;
    bot.handle_message(CHAT_ID, &user, "Alex").await;
    bot.handle_message(CHAT_ID, &user, "34").await;

    // Explicit restart: back to the name question.
    let replies = bot.handle_message(CHAT_ID, &user, "/start").await;
    assert!(joined_text(&replies).contains("What should I call you?"));
}

#[tokio::test]
async fn cancel_destroys_the_session() {
    let (mut bot, _generator, _store) = fixture();
    let user = user();
    bot.handle_message(CHAT_ID, &user, "/start").await;
    assert_eq!(bot.active_sessions(), 1);

    let replies = bot.handle_message(CHAT_ID, &user, "/cancel").await;
    assert!(joined_text(&replies).contains("Cancelled"));
    assert_eq!(bot.active_sessions(), 0);

    // A second cancel has nothing to act on.
    let replies = bot.handle_message(CHAT_ID, &user, "/cancel").await;
    assert!(joined_text(&replies).contains("Nothing to cancel"));
}

#[tokio::test]
async fn suggestion_button_answers_the_pending_step() {
    let (mut bot, generator, _store) = fixture();
    generator.push_ok(support::sample_plan());
    let user = user();
    bot.handle_message(CHAT_ID, &user, "/start").await;
    for answer in &support::valid_answers()[..4] {
        bot.handle_message(CHAT_ID, &user, answer).await;
    }

    // Goal is pending; press the "Half marathon" button.
    let replies = bot
        .handle_callback(CHAT_ID, &user, "answer:Half marathon")
        .await;
    assert!(
        joined_text(&replies).contains("race or target date"),
        "should advance to the target-date question"
    );
}
