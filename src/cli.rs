use crate::backup::ImportReport;
use crate::error::AppError;
use crate::models::Difficulty;
use crate::profiles::ProfileUpdate;
use crate::question_bank::{NewQuestion, SetFilter};
use crate::stats::PASS_THRESHOLD;
use crate::storage::KeyValueStore;
use crate::workspace::Workspace;
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser)]
#[command(name = "skillnotes")]
#[command(about = "Question banks, exams and XP badges in the terminal", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write every record to a backup file
    Export { path: Option<PathBuf> },
    /// Restore the valid sections of a backup file
    Import { path: PathBuf },
    /// Print exam statistics and the active profile's badges
    Stats,
    /// Manage question sets
    Set {
        #[command(subcommand)]
        action: SetCommands,
    },
    /// Manage the questions of the bank
    Question {
        #[command(subcommand)]
        action: QuestionCommands,
    },
    /// Edit or switch learner profiles
    Profile {
        #[command(subcommand)]
        action: ProfileCommands,
    },
    /// Badges of the active profile
    Badge {
        #[command(subcommand)]
        action: BadgeCommands,
    },
    /// Achievements of the active profile
    Achievement {
        #[command(subcommand)]
        action: AchievementCommands,
    },
}

#[derive(Subcommand)]
pub enum SetCommands {
    /// Create a question set
    Add {
        name: String,
        #[arg(short, long, default_value = "")]
        description: String,
    },
    /// List sets with their question counts
    List,
}

#[derive(Subcommand)]
pub enum QuestionCommands {
    /// Add a question to a set
    Add {
        #[arg(long)]
        set: u64,
        prompt: String,
        answer: String,
        #[arg(long, value_enum, default_value_t = Difficulty::Easy)]
        difficulty: Difficulty,
    },
    /// Replace the set, prompt, answer and difficulty of a question
    Edit {
        id: u64,
        #[arg(long)]
        set: u64,
        prompt: String,
        answer: String,
        #[arg(long, value_enum, default_value_t = Difficulty::Easy)]
        difficulty: Difficulty,
    },
    /// Delete a question
    Rm { id: u64 },
    /// List questions, optionally limited to one set or a search term
    List {
        #[arg(long)]
        set: Option<u64>,
        #[arg(long, default_value = "")]
        search: String,
    },
}

#[derive(Subcommand)]
pub enum ProfileCommands {
    /// List profiles, marking the active one
    List,
    /// Make a profile active
    Switch { id: String },
    /// Change the active profile's name, plan or accent colour
    Edit {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        plan: Option<String>,
        #[arg(long)]
        accent: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum BadgeCommands {
    /// Add a custom badge at 0 XP
    Add {
        name: String,
        #[arg(short, long, default_value = "")]
        description: String,
    },
}

#[derive(Subcommand)]
pub enum AchievementCommands {
    /// Record an achievement
    Add {
        title: String,
        #[arg(short, long, default_value = "")]
        description: String,
    },
}

pub fn run<S: KeyValueStore>(
    command: Commands,
    workspace: &mut Workspace<S>,
    data_dir: &Path,
) -> Result<(), AppError> {
    match command {
        Commands::Export { path } => {
            let path =
                path.unwrap_or_else(|| default_backup_path(data_dir, Local::now().date_naive()));
            export_to(workspace, &path)?;
            println!("Backup written to {}", path.display());
        }
        Commands::Import { path } => {
            let report = import_from(workspace, &path)?;
            println!("Imported {}", report.summary());
        }
        Commands::Stats => print!("{}", stats_summary(workspace)),
        Commands::Set { action } => print!("{}", run_set(action, workspace)?),
        Commands::Question { action } => print!("{}", run_question(action, workspace)?),
        Commands::Profile { action } => print!("{}", run_profile(action, workspace)?),
        Commands::Badge {
            action: BadgeCommands::Add { name, description },
        } => {
            let badge_id = workspace
                .add_badge(&name, &description)
                .ok_or_else(|| invalid("badge name must not be blank"))?;
            println!("Added badge {}", badge_id);
        }
        Commands::Achievement {
            action: AchievementCommands::Add { title, description },
        } => {
            if !workspace.add_achievement(&title, &description) {
                return Err(invalid("achievement title must not be blank"));
            }
            println!("Recorded achievement for {}", workspace.profiles.active().name);
        }
    }
    Ok(())
}

fn invalid(message: &str) -> AppError {
    AppError::InvalidInput(message.to_string())
}

pub fn run_set<S: KeyValueStore>(
    action: SetCommands,
    workspace: &mut Workspace<S>,
) -> Result<String, AppError> {
    match action {
        SetCommands::Add { name, description } => {
            let set_id = workspace
                .create_set(&name, &description)
                .ok_or_else(|| invalid("set name must not be blank"))?;
            Ok(format!("Created set {}\n", set_id))
        }
        SetCommands::List => {
            let bank = &workspace.bank;
            let mut out = String::new();
            for set in &bank.sets {
                let _ = writeln!(
                    out,
                    "{:>4}  {} ({} questions)  {}",
                    set.id,
                    set.name,
                    bank.questions_in_set(set.id).len(),
                    set.description
                );
            }
            Ok(out)
        }
    }
}

pub fn run_question<S: KeyValueStore>(
    action: QuestionCommands,
    workspace: &mut Workspace<S>,
) -> Result<String, AppError> {
    match action {
        QuestionCommands::Add {
            set,
            prompt,
            answer,
            difficulty,
        } => {
            let draft = NewQuestion {
                set_id: set,
                prompt,
                answer,
                difficulty,
            };
            let question_id = workspace
                .add_question(draft)
                .ok_or_else(|| invalid("question needs a prompt, an answer and an existing set"))?;
            Ok(format!("Added question {}\n", question_id))
        }
        QuestionCommands::Edit {
            id,
            set,
            prompt,
            answer,
            difficulty,
        } => {
            let draft = NewQuestion {
                set_id: set,
                prompt,
                answer,
                difficulty,
            };
            if !workspace.update_question(id, draft) {
                return Err(invalid("unknown question, blank field or unknown set"));
            }
            Ok(format!("Updated question {}\n", id))
        }
        QuestionCommands::Rm { id } => {
            if !workspace.delete_question(id) {
                return Err(invalid("unknown question"));
            }
            Ok(format!("Deleted question {}\n", id))
        }
        QuestionCommands::List { set, search } => {
            let filter = set.map(SetFilter::Only).unwrap_or(SetFilter::All);
            let bank = &workspace.bank;
            let mut out = String::new();
            for question in bank.filter(filter, &search) {
                let _ = writeln!(
                    out,
                    "{:>4}  [{}] {:<6}  {}",
                    question.id,
                    bank.set_name(question.set_id),
                    question.difficulty.as_str(),
                    question.prompt
                );
                let _ = writeln!(out, "      answer: {}", question.expected_answer);
            }
            if out.is_empty() {
                out.push_str("No matching questions\n");
            }
            Ok(out)
        }
    }
}

pub fn run_profile<S: KeyValueStore>(
    action: ProfileCommands,
    workspace: &mut Workspace<S>,
) -> Result<String, AppError> {
    match action {
        ProfileCommands::List => {
            let active_id = workspace.profiles.active_profile_id();
            let mut out = String::new();
            for profile in workspace.profiles.profiles() {
                let marker = if profile.id == active_id { "*" } else { " " };
                let _ = writeln!(
                    out,
                    "{} {:<8} {} ({})  {}/{} badges unlocked",
                    marker,
                    profile.id,
                    profile.name,
                    profile.plan,
                    profile.unlocked_badges(),
                    profile.badges.len()
                );
            }
            Ok(out)
        }
        ProfileCommands::Switch { id } => {
            if !workspace.switch_profile(&id) {
                return Err(invalid("unknown profile"));
            }
            Ok(format!("Active profile: {}\n", workspace.profiles.active().name))
        }
        ProfileCommands::Edit { name, plan, accent } => {
            let profile_id = workspace.profiles.active_profile_id().to_string();
            workspace.update_profile(&profile_id, ProfileUpdate { name, plan, accent });
            let profile = workspace.profiles.active();
            Ok(format!("{} ({}) {}\n", profile.name, profile.plan, profile.accent))
        }
    }
}

pub fn default_backup_path(data_dir: &Path, day: NaiveDate) -> PathBuf {
    data_dir.join(format!("skillnotes-backup-{}.json", day.format("%Y-%m-%d")))
}

pub fn export_to<S: KeyValueStore>(workspace: &Workspace<S>, path: &Path) -> Result<(), AppError> {
    let json = workspace.export_backup()?;
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, json)?;
    info!(path = %path.display(), "backup exported");
    Ok(())
}

pub fn import_from<S: KeyValueStore>(
    workspace: &mut Workspace<S>,
    path: &Path,
) -> Result<ImportReport, AppError> {
    let raw = fs::read_to_string(path)?;
    Ok(workspace.import_backup(&raw)?)
}

pub fn stats_summary<S: KeyValueStore>(workspace: &Workspace<S>) -> String {
    let stats = workspace.exams.stats();
    let profile = workspace.profiles.active();
    let mut out = String::new();

    let _ = writeln!(out, "Exams taken:   {}", stats.tests_taken);
    let _ = writeln!(out, "Passed (>={}): {}", PASS_THRESHOLD, stats.passed);
    let _ = writeln!(out, "Failed:        {}", stats.failed);
    let _ = writeln!(out, "Average score: {}%", stats.average_score);
    let _ = writeln!(out);
    let _ = writeln!(out, "{} ({})", profile.name, profile.plan);
    for badge in &profile.badges {
        let progress = badge.progress();
        let next = progress
            .next_milestone
            .map(|m| format!("next at {} XP", m))
            .unwrap_or_else(|| "max level".to_string());
        let _ = writeln!(
            out,
            "  {} {:<14} level {}/{}  {:>5} XP  {}",
            badge.get_icon(),
            badge.name,
            progress.level,
            progress.max_level,
            progress.xp,
            next
        );
    }
    out
}
