//! Ask CareBow interactive console.
//!
//! Usage: `carebow-triage [member_id] [age]`
//!
//! Type symptoms in plain language. Commands: `/act N`, `/helpful`,
//! `/unhelpful <reason>`, `/export`, `/json`, `/end`, `/status`, `/quit`.

use std::error::Error;
use std::io::Write;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use carebow_triage::adapters::{
    FileKeyValueStore, InMemoryKeyValueStore, InMemoryProfileReader, StubBookingGateway,
};
use carebow_triage::application::{AssistantError, CareAssistant};
use carebow_triage::config::{AppConfig, StorageBackend};
use carebow_triage::domain::conversation::{Message, Role};
use carebow_triage::domain::feedback::{FeedbackReason, FeedbackSubmission};
use carebow_triage::domain::foundation::{MemberId, MessageId, SessionId, UserId};
use carebow_triage::domain::membership::{AccessGrant, AccessResult};
use carebow_triage::domain::triage::MemberProfile;
use carebow_triage::ports::KeyValueStore;

const HELP: &str = "Commands: /act N, /helpful, /unhelpful <too_long|didnt_answer|felt_unsafe|other>, \
/export, /json, /end, /status, /quit";

fn print_message(message: &Message) {
    if message.role() == Role::User {
        return;
    }
    println!("\nCareBow: {}", message.text());
    if let Some(payload) = message.payload() {
        if !payload.quick_options.is_empty() {
            println!("  Options: {}", payload.quick_options.join(" | "));
        }
        for (i, action) in payload.suggested_actions.iter().enumerate() {
            println!("  [{}] {} - {}", i + 1, action.label, action.description);
        }
    }
}

fn print_status(assistant: &CareAssistant) {
    match assistant.access_status() {
        AccessResult::Allowed(AccessGrant::Subscribed) => println!("Subscribed."),
        AccessResult::Allowed(AccessGrant::TrialActive) => println!(
            "Trial active, {} day(s) left.",
            assistant.trial_days_remaining()
        ),
        AccessResult::Allowed(AccessGrant::TrialEligible) => {
            println!("Your first question starts the free trial.")
        }
        AccessResult::Allowed(AccessGrant::FreeQuestion { remaining }) => {
            println!("{remaining} free question(s) left.")
        }
        AccessResult::Denied(reason) => println!("{reason}"),
    }
}

fn last_assistant_message(assistant: &CareAssistant, session_id: &SessionId) -> Option<Message> {
    assistant
        .get_session(session_id)?
        .messages()
        .iter()
        .rev()
        .find(|m| m.role() == Role::Assistant)
        .cloned()
}

async fn rate(
    assistant: &mut CareAssistant,
    session_id: &SessionId,
    submission: impl FnOnce(SessionId, MessageId) -> FeedbackSubmission,
) -> Result<(), AssistantError> {
    let Some(message) = last_assistant_message(assistant, session_id) else {
        println!("Nothing to rate yet.");
        return Ok(());
    };
    assistant
        .submit_feedback(submission(*session_id, *message.id()))
        .await?;
    println!("Thanks for the feedback.");
    Ok(())
}

/// Handles one console line. Returns false when the console should exit.
async fn handle_line(
    assistant: &mut CareAssistant,
    current: &mut Option<SessionId>,
    user_id: &UserId,
    member_id: &MemberId,
    line: &str,
) -> Result<bool, AssistantError> {
    let (command, arg) = line.split_once(' ').unwrap_or((line, ""));
    let arg = arg.trim();

    if command == "/quit" {
        return Ok(false);
    }
    if command == "/help" {
        println!("{HELP}");
        return Ok(true);
    }
    if command == "/status" {
        print_status(assistant);
        return Ok(true);
    }

    if !command.starts_with('/') {
        let session_id = match current {
            Some(id) => *id,
            None => {
                let started = assistant
                    .start_new_session(user_id.clone(), member_id.clone())
                    .await?;
                if !started.recurring_symptoms.is_empty() {
                    println!(
                        "(Reported before: {})",
                        started.recurring_symptoms.join(", ")
                    );
                }
                *current.insert(*started.session.id())
            }
        };
        let outcome = assistant.send_message(&session_id, line).await?;
        for reply in &outcome.replies {
            print_message(reply);
        }
        return Ok(true);
    }

    let Some(session_id) = *current else {
        println!("No conversation yet. Describe what is going on to start one.");
        return Ok(true);
    };

    match command {
        "/act" => match arg.parse::<usize>() {
            Ok(n) if n >= 1 => {
                let taken = assistant.act_on_suggested_action(&session_id, n - 1).await?;
                println!("\nCareBow: {}: {}", taken.action.label, taken.action.description);
                if let Some(booking) = taken.booking {
                    let id = booking.order_id.or(booking.request_id).unwrap_or_default();
                    println!("  Booking reference: {id}");
                }
            }
            _ => println!("Usage: /act N"),
        },
        "/helpful" => {
            rate(assistant, &session_id, FeedbackSubmission::helpful).await?;
        }
        "/unhelpful" => {
            let reason = if arg.is_empty() {
                None
            } else {
                match arg.parse::<FeedbackReason>() {
                    Ok(reason) => Some(reason),
                    Err(error) => {
                        println!("{error}");
                        return Ok(true);
                    }
                }
            };
            rate(assistant, &session_id, |episode, message| {
                FeedbackSubmission::not_helpful(episode, message, reason)
            })
            .await?;
        }
        "/export" => println!("{}", assistant.get_session_export_text(&session_id).await?),
        "/json" => println!("{}", assistant.get_session_export_json(&session_id).await?),
        "/end" => {
            let ended = assistant.end_session(&session_id).await?;
            *current = None;
            println!(
                "\nSession ended. Data completeness: {}",
                ended.summary.data_completeness
            );
            for candidate in &ended.proposed_candidates {
                println!("  To remember: {} ({})", candidate.content, candidate.kind.label());
            }
        }
        _ => println!("{HELP}"),
    }
    Ok(true)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = AppConfig::load()?;
    config.validate()?;
    config.logging.init();

    let mut args = std::env::args().skip(1);
    let member_id = MemberId::new(args.next().unwrap_or_else(|| "me".to_string()))?;
    let age = args.next().map(|a| a.parse::<u32>()).transpose()?;
    let user_id = UserId::new("console")?;

    let store: Arc<dyn KeyValueStore> = match config.storage.backend {
        StorageBackend::File => Arc::new(FileKeyValueStore::new(&config.storage.data_dir)),
        StorageBackend::Memory => Arc::new(InMemoryKeyValueStore::new()),
    };
    let profiles = InMemoryProfileReader::new();
    if let Some(age) = age {
        profiles
            .insert(MemberProfile::new(member_id.clone()).with_age(age))
            .await;
    }

    let mut assistant = CareAssistant::load(
        config.assistant.clone(),
        store,
        Arc::new(profiles),
        Arc::new(StubBookingGateway::new()),
    )
    .await;
    info!(member_id = %member_id, backend = ?config.storage.backend, "console ready");

    let mut current = assistant.resume_session(&member_id).ok().map(|s| *s.id());
    match current.and_then(|id| last_assistant_message(&assistant, &id)) {
        Some(message) => print_message(&message),
        None => println!("Ask CareBow. Describe what is going on. {HELP}"),
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("\n> ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match handle_line(&mut assistant, &mut current, &user_id, &member_id, line).await {
            Ok(true) => {}
            Ok(false) => break,
            Err(error) => println!("{error}"),
        }
    }

    assistant.persist_all().await?;
    Ok(())
}
