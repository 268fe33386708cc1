use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};

use crate::models::interview::{InterviewLength, InterviewType};

pub const USAGE: &str = "\
Usage: jobmate [--lang CODE] <command>

Commands:
  health                                   Show backend availability
  interview [--type T] [--length L] [--jd FILE]
                                           Run a mock interview (T: hr, technical, mixed, non_technical; L: short, medium, long)
  cv upload FILE                           Upload a PDF or DOCX resume
  cv list                                  List uploaded resumes
  cv show|skills|text|delete CV_ID         Show the analysis, skills or extracted text of a resume, or delete it
  cover-letter CV_ID JD_FILE [--language L]
                                           Generate a cover letter
  match CV_ID JD_FILE                      Match a resume against a job description
  review FILE                              Review a source file
  stats [SESSION_ID]                       Interview statistics (server, else last local interview)
  help                                     Show this message

Interview commands: type an answer and press enter; ':restart' starts over, ':quit' leaves.";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Health,
    Interview {
        interview_type: InterviewType,
        length: InterviewLength,
        jd_file: Option<PathBuf>,
    },
    CvUpload {
        path: PathBuf,
    },
    CvList,
    CvShow {
        cv_id: String,
    },
    CvSkills {
        cv_id: String,
    },
    CvText {
        cv_id: String,
    },
    CvDelete {
        cv_id: String,
    },
    CoverLetter {
        cv_id: String,
        jd_file: PathBuf,
        language: String,
    },
    Match {
        cv_id: String,
        jd_file: PathBuf,
    },
    Review {
        path: PathBuf,
    },
    Stats {
        session_id: Option<String>,
    },
    Help,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cli {
    pub lang: Option<String>,
    pub command: Command,
}

impl Cli {
    /// Parses arguments without the program name.
    pub fn parse<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut args: Vec<String> = args.into_iter().map(Into::into).collect();
        let lang = take_option(&mut args, "--lang")?;
        Ok(Cli {
            lang,
            command: Command::parse(args)?,
        })
    }
}

impl Command {
    pub fn parse(mut args: Vec<String>) -> Result<Self> {
        if args.is_empty() {
            return Ok(Command::Help);
        }
        let name = args.remove(0);
        let command = match name.as_str() {
            "health" => Command::Health,
            "help" | "--help" | "-h" => Command::Help,
            "interview" => {
                let interview_type = match take_option(&mut args, "--type")? {
                    Some(raw) => raw.parse::<InterviewType>().map_err(|e| anyhow!(e))?,
                    None => InterviewType::default(),
                };
                let length = match take_option(&mut args, "--length")? {
                    Some(raw) => raw.parse::<InterviewLength>().map_err(|e| anyhow!(e))?,
                    None => InterviewLength::default(),
                };
                let jd_file = take_option(&mut args, "--jd")?.map(PathBuf::from);
                Command::Interview {
                    interview_type,
                    length,
                    jd_file,
                }
            }
            "cv" => {
                let sub = positional(&mut args, "cv subcommand")?;
                match sub.as_str() {
                    "upload" => Command::CvUpload {
                        path: positional(&mut args, "FILE")?.into(),
                    },
                    "list" => Command::CvList,
                    "show" => Command::CvShow {
                        cv_id: positional(&mut args, "CV_ID")?,
                    },
                    "skills" => Command::CvSkills {
                        cv_id: positional(&mut args, "CV_ID")?,
                    },
                    "text" => Command::CvText {
                        cv_id: positional(&mut args, "CV_ID")?,
                    },
                    "delete" => Command::CvDelete {
                        cv_id: positional(&mut args, "CV_ID")?,
                    },
                    other => bail!(
                        "Unknown cv subcommand '{other}' (expected upload, list, show, skills, text or delete)"
                    ),
                }
            }
            "cover-letter" => {
                let language =
                    take_option(&mut args, "--language")?.unwrap_or_else(|| "English".to_string());
                Command::CoverLetter {
                    cv_id: positional(&mut args, "CV_ID")?,
                    jd_file: positional(&mut args, "JD_FILE")?.into(),
                    language,
                }
            }
            "match" => Command::Match {
                cv_id: positional(&mut args, "CV_ID")?,
                jd_file: positional(&mut args, "JD_FILE")?.into(),
            },
            "review" => Command::Review {
                path: positional(&mut args, "FILE")?.into(),
            },
            "stats" => Command::Stats {
                session_id: (!args.is_empty()).then(|| args.remove(0)),
            },
            other => bail!("Unknown command '{other}'. Run 'jobmate help' for usage."),
        };

        if let Some(extra) = args.first() {
            bail!("Unexpected argument '{extra}' for '{name}'");
        }
        Ok(command)
    }

    /// Every command except `health` and `help` talks to the backend's
    /// feature endpoints and must wait until it is ready.
    pub fn needs_backend(&self) -> bool {
        !matches!(self, Command::Health | Command::Help)
    }
}

/// Removes `flag VALUE` (or `flag=VALUE`) from `args`.
fn take_option(args: &mut Vec<String>, flag: &str) -> Result<Option<String>> {
    let prefix = format!("{flag}=");
    if let Some(i) = args.iter().position(|a| a.starts_with(&prefix)) {
        let arg = args.remove(i);
        return Ok(Some(arg[prefix.len()..].to_string()));
    }
    let Some(i) = args.iter().position(|a| a == flag) else {
        return Ok(None);
    };
    args.remove(i);
    if i >= args.len() || args[i].starts_with("--") {
        bail!("Option '{flag}' needs a value");
    }
    Ok(Some(args.remove(i)))
}

fn positional(args: &mut Vec<String>, what: &str) -> Result<String> {
    if args.is_empty() || args[0].starts_with("--") {
        return Err(anyhow!("Missing {what}"));
    }
    Ok(args.remove(0))
}

/// Reads a job description or source file as UTF-8 text.
pub fn read_text(path: &std::path::Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Cannot read {}", path.display()))
}
