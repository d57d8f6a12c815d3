// SPDX-FileCopyrightText: 2026 Aura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `aura shell` command implementation.
//!
//! A terminal stand-in for the chat frontend: lines typed at the prompt are
//! stored as user messages for `agent.user_id`, and AI messages are printed
//! as they arrive on the change feed. Replies come from a running
//! `aura serve`.

use aura_config::model::AuraConfig;
use aura_core::{
    AuraError, ChangeFeed, ChangeKind, MemoryStore, MessageStore, NewMessage, Sender,
    StorageAdapter, Subscription, UserId,
};
use aura_storage::SqliteStorage;
use colored::Colorize;
use rustyline::DefaultEditor;
use rustyline::ExternalPrinter;
use rustyline::error::ReadlineError;

/// Number of messages shown by `/history`.
const HISTORY_LINES: usize = 10;

/// Runs the `aura shell` interactive REPL.
pub async fn run_shell(config: AuraConfig) -> Result<(), AuraError> {
    let storage = SqliteStorage::new(config.storage.clone());
    storage.initialize().await?;
    let user = UserId::new(config.agent.user_id.clone());
    let companion = config.agent.name.clone();

    let mut rl = DefaultEditor::new()
        .map_err(|e| AuraError::Internal(format!("failed to initialize readline: {e}")))?;

    let subscription = storage.subscribe(&user).await?;
    let printer = match rl.create_external_printer() {
        Ok(mut printer) => tokio::spawn(print_replies(subscription, companion.clone(), move |line| {
            let _ = printer.print(line);
        })),
        Err(_) => tokio::spawn(print_replies(subscription, companion.clone(), |line| {
            println!("{line}");
        })),
    };

    println!("{}", format!("aura shell ({user})").bold().green());
    println!(
        "Type {} to exit, {} or {} to inspect state.\n",
        "/quit".yellow(),
        "/memory".yellow(),
        "/history".yellow()
    );

    let prompt = format!("{}> ", "you".green());
    loop {
        match rl.readline(&prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed == "/quit" || trimmed == "/exit" {
                    break;
                }
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(&line);

                let result = match trimmed {
                    "/memory" => show_memory(&storage, &user).await,
                    "/history" => show_history(&storage, &user, &companion).await,
                    text => storage
                        .append_message(&user, NewMessage::user(text))
                        .await
                        .map(|_| ()),
                };
                if let Err(e) = result {
                    eprintln!("{}: {e}", "error".red());
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("{}: {e}", "error".red());
                break;
            }
        }
    }

    printer.abort();
    storage.close().await
}

/// Prints every AI message added to the conversation until the feed ends.
async fn print_replies<F>(mut subscription: Subscription, companion: String, mut print: F)
where
    F: FnMut(String) + Send + 'static,
{
    while let Some(batch) = subscription.next().await {
        for change in batch {
            if change.kind == ChangeKind::Added && change.message.sender == Sender::Ai {
                print(format!("{}> {}", companion.cyan(), change.message.text));
            }
        }
    }
}

async fn show_memory(storage: &SqliteStorage, user: &UserId) -> Result<(), AuraError> {
    match storage.load_summary(user).await? {
        Some(summary) if !summary.is_empty() => println!("{}", summary.dimmed()),
        _ => println!("{}", "(no memory yet)".dimmed()),
    }
    Ok(())
}

async fn show_history(
    storage: &SqliteStorage,
    user: &UserId,
    companion: &str,
) -> Result<(), AuraError> {
    let mut messages = storage.latest_messages(user, HISTORY_LINES).await?;
    messages.reverse();
    for message in messages {
        let who = match message.sender {
            Sender::User => "you".green(),
            Sender::Ai => companion.cyan(),
        };
        println!("{} {who}> {}", message.created_at.dimmed(), message.text);
    }
    Ok(())
}
