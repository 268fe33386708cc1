mod api_client;
mod cli;
mod config;
mod errors;
mod health;
mod i18n;
mod interview;
mod models;
mod session_store;
mod statistics;

use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use chrono::Utc;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::api_client::ApiClient;
use crate::cli::{read_text, Cli, Command, USAGE};
use crate::config::Config;
use crate::errors::ClientError;
use crate::health::{overlay_message, HealthHandle, HealthMachine, HealthPoller, HealthChecker};
use crate::i18n::{negotiate, translate, Language, MessageKey};
use crate::interview::InterviewController;
use crate::models::interview::{InterviewLength, InterviewType};
use crate::session_store::{FileSessionStore, MemorySessionStore, SessionStore};
use crate::statistics::{summarize, StatisticsReport, StatisticsSource, StatisticsView};

type Input = Lines<BufReader<Stdin>>;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Logs go to stderr; stdout carries command output only.
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.log_level))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = match Cli::parse(std::env::args().skip(1)) {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("{e}\n\n{USAGE}");
            std::process::exit(2);
        }
    };
    let language = negotiate(cli.lang.as_deref(), Some(config.language.code()));
    info!(
        "Starting JobMate v{} (backend {}, language {})",
        env!("CARGO_PKG_VERSION"),
        config.api_url,
        language.code()
    );

    let client = ApiClient::new(config.api_url.clone(), language, config.request_timeout())?;
    let store: Arc<dyn SessionStore> = if config.data_dir.as_os_str().is_empty() {
        info!("No data directory configured, interview results are kept in memory");
        Arc::new(MemorySessionStore::new(config.session_ttl()))
    } else {
        Arc::new(FileSessionStore::new(
            config.data_dir.clone(),
            config.session_ttl(),
        ))
    };
    let mut input = BufReader::new(tokio::io::stdin()).lines();

    if !cli.command.needs_backend() {
        if cli.command == Command::Health {
            return show_health(&client, &config).await;
        }
        println!("{USAGE}");
        return Ok(());
    }

    // Held for the whole command: keeps re-checking in the background and
    // stops polling when dropped.
    let health = HealthPoller::spawn(Arc::new(client.clone()), config.poll_policy());
    if !await_backend(&health, language, &mut input).await? {
        std::process::exit(1);
    }

    if let Err(e) = run(cli.command, client, store, language, &mut input).await {
        eprintln!("{e}");
        std::process::exit(1);
    }
    Ok(())
}

async fn show_health(client: &ApiClient, config: &Config) -> Result<()> {
    let mut machine = HealthMachine::new(config.poll_policy());
    machine.on_outcome(client.check_health().await);
    println!("{}", serde_json::to_string_pretty(machine.state())?);
    Ok(())
}

/// Blocks until the backend is ready, printing each phase. When polling gives
/// up the user can retry, which resets the poller.
async fn await_backend(health: &HealthHandle, lang: Language, input: &mut Input) -> Result<bool> {
    let policy = health.policy().clone();
    loop {
        let mut rx = health.subscribe();
        let progress = async {
            let mut last = String::new();
            loop {
                let message = overlay_message(&rx.borrow_and_update(), &policy, lang);
                if !message.is_empty() && message != last {
                    eprintln!("{message}");
                    last = message;
                }
                if rx.changed().await.is_err() {
                    break;
                }
            }
        };

        let outcome = tokio::select! {
            outcome = health.wait_until_ready() => outcome,
            _ = progress => Err(health.state()),
        };
        let state = match outcome {
            Ok(()) => return Ok(true),
            Err(state) => state,
        };

        eprintln!("{}", overlay_message(&state, &policy, lang));
        eprint!("Retry? [y/N] ");
        let answer = input.next_line().await?.unwrap_or_default();
        if !matches!(answer.trim(), "y" | "Y" | "yes") {
            return Ok(false);
        }
        health.reset();
    }
}

fn user_error(lang: Language) -> impl Fn(ClientError) -> anyhow::Error {
    move |e| anyhow!(e.user_message(lang))
}

async fn run(
    command: Command,
    client: ApiClient,
    store: Arc<dyn SessionStore>,
    lang: Language,
    input: &mut Input,
) -> Result<()> {
    match command {
        Command::Interview {
            interview_type,
            length,
            jd_file,
        } => {
            let mut ctl = InterviewController::new(Arc::new(client), store, lang);
            run_interview(&mut ctl, interview_type, length, jd_file.as_deref(), lang, input).await
        }
        Command::CvUpload { path } => {
            let cv = client.upload_cv(&path).await.map_err(user_error(lang))?;
            println!("CV {} uploaded ({})", cv.cv_id, cv.filename);
            println!("Words: {}", cv.analysis.word_count);
            println!("Skills: {}", cv.skills().join(", "));
            if !cv.analysis.missing_sections.is_empty() {
                println!("Missing sections: {}", cv.analysis.missing_sections.join(", "));
            }
            if !cv.analysis.ai_feedback.is_empty() {
                println!("\n{}", cv.analysis.ai_feedback);
            }
            Ok(())
        }
        Command::CvList => {
            let list = client.list_cvs().await.map_err(user_error(lang))?;
            println!("{} CV(s)", list.total_cvs);
            for cv in &list.cvs {
                println!(
                    "  {:<6} {:<32} {}",
                    cv.id,
                    cv.filename,
                    cv.upload_timestamp.as_deref().unwrap_or("")
                );
            }
            Ok(())
        }
        Command::CvShow { cv_id } => {
            let cv = client.get_cv(&cv_id).await.map_err(user_error(lang))?;
            println!("CV {} ({})", cv.cv_id, cv.filename);
            println!("Words: {}", cv.analysis.word_count);
            println!("Skills: {}", cv.analysis.extracted_skills.join(", "));
            if !cv.analysis.missing_sections.is_empty() {
                println!("Missing sections: {}", cv.analysis.missing_sections.join(", "));
            }
            if !cv.analysis.ai_feedback.is_empty() {
                println!("\n{}", cv.analysis.ai_feedback);
            }
            Ok(())
        }
        Command::CvSkills { cv_id } => {
            let skills = client.cv_skills(&cv_id).await.map_err(user_error(lang))?;
            println!("{} skill(s)", skills.total_skills);
            for skill in &skills.skills {
                println!("  {skill}");
            }
            Ok(())
        }
        Command::CvText { cv_id } => {
            let text = client.cv_raw_text(&cv_id).await.map_err(user_error(lang))?;
            info!(
                "CV {} has {} words, {} characters",
                text.cv_id, text.word_count, text.character_count
            );
            println!("{}", text.raw_text);
            Ok(())
        }
        Command::CvDelete { cv_id } => {
            let deleted = client.delete_cv(&cv_id).await.map_err(user_error(lang))?;
            println!("{}", deleted.message);
            Ok(())
        }
        Command::CoverLetter {
            cv_id,
            jd_file,
            language,
        } => {
            let jd = read_text(&jd_file)?;
            let letter = client
                .generate_cover_letter(&cv_id, &jd, &language)
                .await
                .map_err(user_error(lang))?;
            if let Some(company) = &letter.company_name {
                println!("Company: {company}\n");
            }
            println!("{}", letter.cover_letter);
            Ok(())
        }
        Command::Match { cv_id, jd_file } => {
            let jd = read_text(&jd_file)?;
            let result = client.match_job(&cv_id, &jd).await.map_err(user_error(lang))?;
            let overlap = result.overlap();
            println!("Skill match: {}%", overlap.match_percent);
            println!("  matched: {}", overlap.matched_skills.join(", "));
            println!("  missing: {}", overlap.missing_skills.join(", "));
            println!("Soft skill match: {}%", overlap.soft_skill_percent);
            println!("  matched: {}", overlap.matched_soft_skills.join(", "));
            println!("  missing: {}", overlap.missing_soft_skills.join(", "));
            for s in result.suggestions() {
                let priority = s.priority.as_deref().unwrap_or("-");
                println!("* [{}/{priority}] {}", s.category, s.description);
            }
            Ok(())
        }
        Command::Review { path } => {
            let code = read_text(&path)?;
            let review = client.review_code(&code).await.map_err(user_error(lang))?;
            println!("Language: {}\n", review.detected_language);
            println!("{}", review.review);
            Ok(())
        }
        Command::Stats { session_id } => {
            let view = StatisticsView::new(Arc::new(client), store);
            match view.load(session_id.as_deref()).await {
                Some(report) => print_report(&report),
                None => println!("{}", translate(lang, MessageKey::NoStatistics)),
            }
            Ok(())
        }
        Command::Health | Command::Help => Ok(()),
    }
}

async fn read_job_description(input: &mut Input) -> Result<String> {
    println!("Paste the job description, then an empty line:");
    let mut text = String::new();
    while let Some(line) = input.next_line().await? {
        if line.trim().is_empty() && !text.is_empty() {
            break;
        }
        text.push_str(&line);
        text.push('\n');
    }
    Ok(text)
}

async fn run_interview(
    ctl: &mut InterviewController,
    interview_type: InterviewType,
    length: InterviewLength,
    jd_file: Option<&Path>,
    lang: Language,
    input: &mut Input,
) -> Result<()> {
    'interview: loop {
        let jd = match jd_file {
            Some(path) => read_text(path)?,
            None => read_job_description(input).await?,
        };
        if !ctl.start_interview(&jd, interview_type, length).await {
            return Err(anyhow!(ctl.error().unwrap_or_default().to_string()));
        }

        loop {
            let session = ctl.session();
            if session.is_complete() {
                print_completion(ctl, lang);
                return Ok(());
            }
            let Some(question) = session.current_question() else {
                return Ok(());
            };
            println!(
                "\n[{}/{}] {}",
                session.current_question_index() + 1,
                length.expected_questions(),
                question.text
            );

            let Some(line) = input.next_line().await? else {
                return Ok(());
            };
            match line.trim() {
                ":quit" => return Ok(()),
                ":restart" => {
                    ctl.restart_interview();
                    continue 'interview;
                }
                "" => continue,
                answer => ctl.answer_input = answer.to_string(),
            }

            let answer = ctl.answer_input.clone();
            if ctl.submit_answer(&answer).await {
                if let Some(fb) = ctl.session().feedback().last() {
                    println!("> {}", fb.evaluation);
                }
            } else if let Some(error) = ctl.error() {
                eprintln!("{error}");
            }
        }
    }
}

fn print_completion(ctl: &InterviewController, lang: Language) {
    let session = ctl.session();
    println!("\n{}", translate(lang, MessageKey::InterviewComplete));
    for (i, fb) in session.feedback().iter().enumerate() {
        let score = fb.score.map(|s| format!("{s:.1}")).unwrap_or_else(|| "-".to_string());
        println!("\n{}. {} [{score}]", i + 1, fb.question);
        println!("   {}", fb.evaluation);
    }
    if let Some(snapshot) = session.snapshot(Utc::now()) {
        print_report(&summarize(&snapshot));
    }
}

fn print_report(report: &StatisticsReport) {
    let source = match report.source {
        StatisticsSource::Server => "server",
        StatisticsSource::Local => "last local interview",
    };
    println!("\nStatistics for {} ({source})", report.session_id);
    println!("Answered: {}  Average score: {:.1}", report.answered, report.average_score);
    for (label, value) in report.bar_chart.series() {
        println!("  {label:<10} {value:>5.1}");
    }
    for (label, value) in report.pie_chart.series() {
        println!("  {label:<10} {value:>5.1}");
    }
}
