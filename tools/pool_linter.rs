/// Pool Linter: validates trivia, riddle, and feedback pool files.
///
/// Usage: pool_linter [--trivia <file>] [--riddles <file>] [--feedback <file>]
///
/// With no arguments, lints the pools in `data/`.

use quiz_engine::core::bank;
use quiz_engine::core::feedback::FeedbackPool;
use quiz_engine::schema::feedback::Polarity;
use quiz_engine::schema::question::{Question, Riddle};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::process;

fn main() {
    let args: Vec<String> = std::env::args().collect();

    let mut trivia_path = None;
    let mut riddles_path = None;
    let mut feedback_path = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                println!("Usage: pool_linter [--trivia <file>] [--riddles <file>] [--feedback <file>]");
                process::exit(0);
            }
            "--trivia" if i + 1 < args.len() => {
                i += 1;
                trivia_path = Some(PathBuf::from(&args[i]));
            }
            "--riddles" if i + 1 < args.len() => {
                i += 1;
                riddles_path = Some(PathBuf::from(&args[i]));
            }
            "--feedback" if i + 1 < args.len() => {
                i += 1;
                feedback_path = Some(PathBuf::from(&args[i]));
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                process::exit(1);
            }
        }
        i += 1;
    }

    if trivia_path.is_none() && riddles_path.is_none() && feedback_path.is_none() {
        trivia_path = Some(PathBuf::from("data/trivia.ron"));
        riddles_path = Some(PathBuf::from("data/riddles.ron"));
        feedback_path = Some(PathBuf::from("data/feedback.ron"));
    }

    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if let Some(path) = &trivia_path {
        match bank::load_trivia_ron(path) {
            Ok(trivia) => {
                println!("Loaded {} trivia questions from {}", trivia.len(), path.display());
                lint_trivia(&trivia, &mut errors, &mut warnings);
            }
            Err(e) => errors.push(format!("{}: {}", path.display(), e)),
        }
    }

    if let Some(path) = &riddles_path {
        match bank::load_riddles_ron(path) {
            Ok(riddles) => {
                println!("Loaded {} riddles from {}", riddles.len(), path.display());
                lint_riddles(&riddles, &mut errors, &mut warnings);
            }
            Err(e) => errors.push(format!("{}: {}", path.display(), e)),
        }
    }

    if let Some(path) = &feedback_path {
        lint_feedback(path, &mut errors, &mut warnings);
    }

    println!("\n=== Pool Lint Report ===\n");

    if errors.is_empty() && warnings.is_empty() {
        println!("All checks passed!");
    }

    for warning in &warnings {
        println!("WARNING: {}", warning);
    }

    for error in &errors {
        println!("ERROR: {}", error);
    }

    println!(
        "\nSummary: {} errors, {} warnings",
        errors.len(),
        warnings.len()
    );

    if !errors.is_empty() {
        process::exit(1);
    }
}

fn lint_trivia(trivia: &[Question], errors: &mut Vec<String>, warnings: &mut Vec<String>) {
    if trivia.is_empty() {
        errors.push("trivia pool is empty".to_string());
    }

    let mut prompts = HashSet::new();
    for (index, question) in trivia.iter().enumerate() {
        if !question.is_well_formed() {
            errors.push(format!(
                "trivia #{} has {} incorrect answers, expected {}",
                index,
                question.incorrect_answers.len(),
                Question::INCORRECT_ANSWERS
            ));
        }

        let mut choices = HashSet::new();
        choices.insert(question.correct_answer.as_str());
        for answer in &question.incorrect_answers {
            if !choices.insert(answer.as_str()) {
                errors.push(format!("trivia #{} repeats answer choice {:?}", index, answer));
            }
        }

        if !prompts.insert(question.prompt.as_str()) {
            warnings.push(format!("trivia #{} duplicates an earlier prompt", index));
        }
    }
}

fn lint_riddles(riddles: &[Riddle], errors: &mut Vec<String>, warnings: &mut Vec<String>) {
    if riddles.is_empty() {
        errors.push("riddle pool is empty".to_string());
    }

    let mut prompts = HashSet::new();
    for (index, riddle) in riddles.iter().enumerate() {
        // Input is trimmed before comparison, so padded answers never match.
        if riddle.answer.trim() != riddle.answer {
            errors.push(format!(
                "riddle #{} answer {:?} has surrounding whitespace",
                index, riddle.answer
            ));
        }
        if riddle.answer.is_empty() {
            errors.push(format!("riddle #{} has an empty answer", index));
        }
        if !prompts.insert(riddle.prompt.as_str()) {
            warnings.push(format!("riddle #{} duplicates an earlier prompt", index));
        }
    }
}

fn lint_feedback(path: &Path, errors: &mut Vec<String>, warnings: &mut Vec<String>) {
    let pool = match FeedbackPool::load_from_ron(path) {
        Ok(pool) => pool,
        Err(e) => {
            errors.push(format!("{}: {}", path.display(), e));
            return;
        }
    };

    for polarity in [Polarity::Positive, Polarity::Negative] {
        println!(
            "Loaded {} {} phrases from {}",
            pool.len(polarity),
            polarity.name(),
            path.display()
        );
        let mut texts = HashSet::new();
        for phrase in pool.phrases(polarity) {
            if !texts.insert(phrase.text.as_str()) {
                warnings.push(format!(
                    "{} phrase {:?} appears more than once",
                    polarity.name(),
                    phrase.text
                ));
            }
        }
    }
}
