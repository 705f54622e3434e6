/// Conversation integration tests: full message-to-reply flows per user.

use quiz_engine::core::bank::{self, QuestionBank};
use quiz_engine::core::feedback::FeedbackPool;
use quiz_engine::core::machine::{ConversationMachine, APOLOGY, RIDDLE_LABEL, TRIVIA_LABEL};
use quiz_engine::core::round::QUIT_HINT;
use quiz_engine::core::transport::{Inbound, ReplyOptions, Transport};
use quiz_engine::schema::feedback::Polarity;
use quiz_engine::schema::question::{Choice, Difficulty, Question, QuestionId, Riddle};
use quiz_engine::schema::session::{ConvState, Pending, Session, UserId};
use std::collections::HashSet;
use std::convert::Infallible;
use std::path::Path;
use std::sync::{Arc, Mutex};

fn fixture_feedback() -> FeedbackPool {
    FeedbackPool::load_from_ron(Path::new("tests/fixtures/feedback.ron")).unwrap()
}

fn fixture_machine(seed: u64) -> ConversationMachine {
    let trivia = bank::load_trivia_ron(Path::new("tests/fixtures/trivia.ron")).unwrap();
    let riddles = bank::load_riddles_ron(Path::new("tests/fixtures/riddles.ron")).unwrap();
    ConversationMachine::builder()
        .seed(seed)
        .with_bank(QuestionBank::new(trivia, riddles).unwrap())
        .with_feedback(fixture_feedback())
        .build()
        .unwrap()
}

fn single_question_machine() -> ConversationMachine {
    let bank = QuestionBank::new(
        vec![Question {
            category: "Science &amp; Nature".to_string(),
            difficulty: Difficulty::Easy,
            prompt: "Which planet is known as the &quot;Red Planet&quot;?".to_string(),
            correct_answer: "Mars".to_string(),
            incorrect_answers: vec![
                "Venus".to_string(),
                "Jupiter".to_string(),
                "Mercury".to_string(),
            ],
        }],
        vec![Riddle {
            prompt: "I follow you all day long, but vanish when the sun goes down.".to_string(),
            answer: "a shadow".to_string(),
        }],
    )
    .unwrap();
    ConversationMachine::builder()
        .seed(7)
        .with_bank(bank)
        .with_feedback(fixture_feedback())
        .build()
        .unwrap()
}

async fn send(machine: &ConversationMachine, user: i64, text: &str) -> Vec<String> {
    machine
        .handle(Inbound::text(UserId(user), text))
        .await
        .into_iter()
        .map(|reply| reply.text)
        .collect()
}

async fn session(machine: &ConversationMachine, user: i64) -> Session {
    machine.session(UserId(user)).await.unwrap()
}

fn correct_choice(session: &Session) -> Choice {
    match session.pending() {
        Some(Pending::Trivia(pending)) => pending.correct_choice,
        other => panic!("expected a pending trivia question, got {:?}", other),
    }
}

fn wrong_choice(session: &Session) -> Choice {
    let correct = correct_choice(session);
    *Choice::ALL.iter().find(|c| **c != correct).unwrap()
}

#[tokio::test]
async fn correct_answer_on_single_question_pool() {
    let machine = single_question_machine();
    send(&machine, 1, "/start").await;
    let replies = send(&machine, 1, TRIVIA_LABEL).await;
    let prompt = replies.last().unwrap();
    assert!(prompt.starts_with("Which planet is known as the \"Red Planet\"?\n\n"));
    assert!(prompt.contains(") Mars"));

    let label = correct_choice(&session(&machine, 1).await).label();
    let replies = send(&machine, 1, label).await;

    assert!(fixture_feedback()
        .phrases(Polarity::Positive)
        .iter()
        .any(|p| p.text == replies[0]));
    assert_eq!(replies[1], "Your score: 1");
    // The pool is exhausted, so the same question starts the next cycle.
    assert!(replies[2].starts_with("Which planet"));

    let after = session(&machine, 1).await;
    assert_eq!(after.score, 1);
    assert_eq!(after.asked_trivia.len(), 1);
    assert!(matches!(after.state, ConvState::WaitingTriviaAnswer(_)));
}

#[tokio::test]
async fn answer_label_is_trimmed_but_case_sensitive() {
    let machine = single_question_machine();
    send(&machine, 1, TRIVIA_LABEL).await;
    let label = correct_choice(&session(&machine, 1).await).label();

    send(&machine, 1, &format!("  {}  ", label)).await;
    assert_eq!(session(&machine, 1).await.score, 1);

    let label = correct_choice(&session(&machine, 1).await).label();
    let replies = send(&machine, 1, &label.to_lowercase()).await;
    assert_eq!(replies[1], "The correct answer was: Mars");
    assert_eq!(session(&machine, 1).await.score, 1);
}

#[tokio::test]
async fn riddle_case_mismatch_reveals_stored_answer() {
    let machine = single_question_machine();
    send(&machine, 2, RIDDLE_LABEL).await;

    let replies = send(&machine, 2, "A Shadow").await;
    assert!(fixture_feedback()
        .phrases(Polarity::Negative)
        .iter()
        .any(|p| p.text == replies[0]));
    assert_eq!(replies[1], "The correct answer was: a shadow");
    assert_eq!(session(&machine, 2).await.score, 0);

    send(&machine, 2, "a shadow").await;
    assert_eq!(session(&machine, 2).await.score, 1);
}

#[tokio::test]
async fn negative_feedback_rotates_before_repeating() {
    let machine = fixture_machine(99);
    send(&machine, 3, TRIVIA_LABEL).await;

    let mut seen = HashSet::new();
    for _ in 0..3 {
        let wrong = wrong_choice(&session(&machine, 3).await);
        let replies = send(&machine, 3, wrong.label()).await;
        assert!(seen.insert(replies[0].clone()), "repeated {:?}", replies[0]);
    }
    assert_eq!(seen.len(), 3);

    // Fourth miss starts a new cycle; any phrase is allowed again.
    let wrong = wrong_choice(&session(&machine, 3).await);
    let replies = send(&machine, 3, wrong.label()).await;
    assert!(seen.contains(&replies[0]));
    assert_eq!(session(&machine, 3).await.negative_used.len(), 1);
}

#[tokio::test]
async fn trivia_does_not_repeat_within_a_cycle() {
    let machine = fixture_machine(5);
    send(&machine, 4, TRIVIA_LABEL).await;

    let mut asked = HashSet::new();
    for _ in 0..3 {
        let current = session(&machine, 4).await;
        let id = match current.pending() {
            Some(Pending::Trivia(pending)) => pending.question,
            other => panic!("expected trivia, got {:?}", other),
        };
        assert!(asked.insert(id));
        send(&machine, 4, "/skip").await;
    }
    assert_eq!(asked.len(), 3);
}

#[tokio::test]
async fn cancel_while_waiting_ends_conversation() {
    let machine = fixture_machine(1);
    send(&machine, 5, TRIVIA_LABEL).await;
    assert!(session(&machine, 5).await.pending().is_some());

    let replies = send(&machine, 5, "/cancel").await;
    assert_eq!(
        replies,
        vec!["Oh no... Did I insult you? I thought you wouldn't notice".to_string()]
    );
    let ended = session(&machine, 5).await;
    assert_eq!(ended.state, ConvState::Ended);
    assert!(ended.pending().is_none());

    // Nothing is answered until the user starts over.
    assert!(send(&machine, 5, "A").await.is_empty());
    assert_eq!(send(&machine, 5, "/start").await.len(), 1);
}

#[tokio::test]
async fn start_is_idempotent_and_keeps_progress() {
    let machine = single_question_machine();
    send(&machine, 6, TRIVIA_LABEL).await;
    let label = correct_choice(&session(&machine, 6).await).label();
    send(&machine, 6, label).await;

    let first = send(&machine, 6, "/start").await;
    let after_first = session(&machine, 6).await;
    let second = send(&machine, 6, "/start").await;
    let after_second = session(&machine, 6).await;

    assert_eq!(first, second);
    assert_eq!(after_first, after_second);
    assert_eq!(after_second.state, ConvState::Menu);
    assert_eq!(after_second.score, 1);
}

#[tokio::test]
async fn score_never_decreases_and_pending_matches_state() {
    let machine = fixture_machine(2024);
    let inputs = [
        "/start",
        TRIVIA_LABEL,
        "A",
        "B",
        "/skip",
        "C",
        "nonsense",
        "/start",
        RIDDLE_LABEL,
        "a piano",
        "a towel",
        "a shadow",
        "/skip",
        "/start",
        "D",
        TRIVIA_LABEL,
        "D",
        "/cancel",
        "A",
        "/start",
    ];

    let mut last_score = 0;
    for input in inputs {
        send(&machine, 7, input).await;
        let current = session(&machine, 7).await;
        assert!(current.score >= last_score, "score dropped after {:?}", input);
        assert_eq!(current.state.is_waiting(), current.pending().is_some());
        last_score = current.score;
    }
}

#[tokio::test]
async fn score_counts_exact_matches_only() {
    let machine = fixture_machine(77);
    send(&machine, 10, TRIVIA_LABEL).await;

    let mut hits = 0;
    for round in 0..24 {
        let current = session(&machine, 10).await;
        let right = correct_choice(&current).label();
        let answer = match round % 4 {
            0 => right.to_string(),
            1 => wrong_choice(&current).label().to_string(),
            2 => right.to_lowercase(),
            _ => format!("  {} ", right),
        };
        if round % 4 == 0 || round % 4 == 3 {
            hits += 1;
        }
        send(&machine, 10, &answer).await;
        assert_eq!(session(&machine, 10).await.score, hits, "after round {}", round);
    }

    send(&machine, 10, "/start").await;
    send(&machine, 10, RIDDLE_LABEL).await;
    for round in 0..6 {
        let answer = match session(&machine, 10).await.pending() {
            Some(Pending::Riddle(pending)) => pending.correct_answer.clone(),
            other => panic!("expected a pending riddle, got {:?}", other),
        };
        if round % 2 == 0 {
            send(&machine, 10, &answer).await;
            hits += 1;
        } else {
            send(&machine, 10, &answer.to_uppercase()).await;
        }
        assert_eq!(session(&machine, 10).await.score, hits);
    }
    assert_eq!(hits, 15);
}

#[tokio::test]
async fn contract_violation_apologizes_and_leaves_session_untouched() {
    let machine = single_question_machine();
    {
        let mut session = machine.sessions().checkout(UserId(12)).await;
        session.score = 4;
        session.asked_trivia.record(QuestionId(0));
        session.asked_trivia.record(QuestionId(99));
    }
    let before = session(&machine, 12).await;

    // Two recorded ids never equal the one-question pool, so the draw has
    // nothing left to pick from.
    let replies = send(&machine, 12, TRIVIA_LABEL).await;
    assert_eq!(replies, vec![APOLOGY.to_string()]);
    assert_eq!(session(&machine, 12).await, before);

    // Other users are unaffected.
    let replies = send(&machine, 13, TRIVIA_LABEL).await;
    assert!(replies.last().unwrap().starts_with("Which planet"));
}

#[tokio::test]
async fn quit_hint_appears_after_some_misses() {
    let machine = fixture_machine(31);
    send(&machine, 11, TRIVIA_LABEL).await;

    let mut hints = 0;
    for _ in 0..30 {
        let wrong = wrong_choice(&session(&machine, 11).await);
        let replies = send(&machine, 11, wrong.label()).await;
        assert!(replies[1].starts_with("The correct answer was: "));
        if replies.iter().any(|r| r == QUIT_HINT) {
            assert_eq!(replies[2], QUIT_HINT);
            hints += 1;
        }
    }
    assert!(hints > 0, "no quit hint in 30 misses");
    assert!(hints < 30, "quit hint after every miss");
    assert_eq!(session(&machine, 11).await.score, 0);
}

#[tokio::test]
async fn quit_hint_only_follows_a_miss() {
    let machine = fixture_machine(31);
    send(&machine, 8, TRIVIA_LABEL).await;
    for _ in 0..30 {
        let current = session(&machine, 8).await;
        let right = correct_choice(&current).label();
        let replies = send(&machine, 8, right).await;
        assert!(!replies.iter().any(|r| r == QUIT_HINT));
    }
    assert_eq!(session(&machine, 8).await.score, 30);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_users_get_independent_sessions() {
    let machine = Arc::new(fixture_machine(11));
    let mut handles = Vec::new();
    for user in 0..16i64 {
        let machine = Arc::clone(&machine);
        handles.push(tokio::spawn(async move {
            machine.handle(Inbound::text(UserId(user), "/start")).await;
            machine.handle(Inbound::text(UserId(user), TRIVIA_LABEL)).await;
            let label = correct_choice(&machine.session(UserId(user)).await.unwrap()).label();
            machine.handle(Inbound::text(UserId(user), label)).await;
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(machine.sessions().len().await, 16);
    for user in 0..16 {
        let s = machine.session(UserId(user)).await.unwrap();
        assert_eq!(s.score, 1);
        assert_eq!(s.asked_trivia.len(), 2);
    }
}

#[derive(Default)]
struct RecordingTransport {
    sent: Mutex<Vec<(UserId, String, Option<ReplyOptions>)>>,
}

impl Transport for RecordingTransport {
    type Error = Infallible;

    async fn send_text(
        &self,
        user_id: UserId,
        text: &str,
        options: Option<&ReplyOptions>,
    ) -> Result<(), Infallible> {
        self.sent
            .lock()
            .unwrap()
            .push((user_id, text.to_string(), options.cloned()));
        Ok(())
    }
}

#[tokio::test]
async fn dispatch_delivers_replies_in_order() {
    let machine = fixture_machine(3);
    let transport = RecordingTransport::default();

    machine
        .dispatch(
            Inbound::text(UserId(9), TRIVIA_LABEL).with_display_name("Grace"),
            &transport,
        )
        .await
        .unwrap();

    let sent = transport.sent.lock().unwrap();
    assert_eq!(sent.len(), 3);
    assert!(sent.iter().all(|(user, _, _)| *user == UserId(9)));
    assert_eq!(sent[0].1, "Welcome to Trivia knowledge! Let's get started...");
    assert_eq!(sent[1].1, "Ready to lose, Grace?");
    let keyboard = sent[2].2.as_ref().and_then(|o| o.keyboard.as_ref()).unwrap();
    assert_eq!(keyboard.rows, vec![vec!["A", "B"], vec!["C", "D"]]);
    assert!(keyboard.one_time);
}
