use std::time::Duration;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use console::{Term, style};
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use kaabil_core::{
    Provider, SessionState, Tutor, TutorConfig, VideoReference, format_window,
};

/// CLI wrapper for Provider enum (needed for clap ValueEnum)
#[derive(Clone, Debug, ValueEnum)]
enum CliProvider {
    Grok,
    Openai,
    Gemini,
}

impl From<CliProvider> for Provider {
    fn from(cli: CliProvider) -> Self {
        match cli {
            CliProvider::Grok => Provider::Grok,
            CliProvider::Openai => Provider::Openai,
            CliProvider::Gemini => Provider::Gemini,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "kaabil")]
#[command(
    about = "Answer an AI-generated question about the last minutes of a YouTube video and get feedback"
)]
struct Cli {
    /// YouTube video URL (the id is taken from after the last `=`)
    url: String,

    /// Current playback time in seconds
    #[arg(short, long, default_value_t = 0)]
    time: u64,

    /// AI provider for questions and feedback. Defaults to KAABIL_PROVIDER or OpenAI.
    #[arg(short, long)]
    provider: Option<CliProvider>,

    /// Model override for the provider
    #[arg(short, long)]
    model: Option<String>,

    /// Transcript language preference, most preferred first (repeatable)
    #[arg(short, long = "lang")]
    lang: Vec<String>,
}

impl Cli {
    fn tutor_config(&self, mut config: TutorConfig) -> TutorConfig {
        if let Some(provider) = &self.provider {
            config.provider = provider.clone().into();
        }
        if let Some(model) = &self.model {
            config.model = Some(model.clone());
        }
        if !self.lang.is_empty() {
            config.languages = self.lang.clone();
        }
        config
    }
}

fn create_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

fn read_answer(term: &Term) -> Result<String> {
    loop {
        term.write_str(&format!("{} ", style("Your answer:").bold()))?;
        let answer = term.read_line()?;
        let answer = answer.trim();
        if !answer.is_empty() {
            return Ok(answer.to_string());
        }
    }
}

fn confirm_retry(term: &Term) -> Result<bool> {
    term.write_str(&format!("{} ", style("Retry feedback? [y/N]").yellow()))?;
    let reply = term.read_line()?;
    Ok(matches!(reply.trim().to_lowercase().as_str(), "y" | "yes"))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.tutor_config(TutorConfig::from_env());

    // Validate API key early
    let tutor = match Tutor::from_config(&config) {
        Ok(tutor) => tutor,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            std::process::exit(1);
        }
    };

    let video = VideoReference::from_url(&cli.url)?;
    let current_time = cli.time as f64;
    let term = Term::stdout();

    println!(
        "\n{}  {}\n",
        style("kaabil").cyan().bold(),
        style("Video Tutor").dim()
    );
    println!(
        "{} {}",
        style("Watch:").dim(),
        style(video.embed_url(cli.time)).cyan()
    );

    // Step 1: Transcript window
    let window_start = (current_time - tutor.window_secs()).max(0.0);
    let spinner = create_spinner(&format!(
        "Fetching transcript [{}]...",
        format_window(window_start, current_time)
    ));
    let excerpt = match tutor.fetch_transcript_window(video.id(), current_time).await {
        Ok(excerpt) => excerpt,
        Err(e) => {
            spinner.finish_and_clear();
            eprintln!("{} {}", style("Error:").red().bold(), e);
            std::process::exit(1);
        }
    };
    let words = excerpt.split_whitespace().count();
    spinner.finish_with_message(format!(
        "{} Transcript [{}]: {} words {}",
        style("✓").green().bold(),
        format_window(window_start, current_time),
        words,
        if words == 0 {
            style("(no captions in this window)").yellow().to_string()
        } else {
            String::new()
        }
    ));

    // Step 2: Question
    let mut session = SessionState::new();
    let spinner = create_spinner(&format!(
        "Generating question with {}...",
        tutor.provider_name()
    ));
    let question = match tutor.generate_question(&mut session, excerpt).await {
        Ok(question) => question,
        Err(e) => {
            spinner.finish_and_clear();
            eprintln!("{} {}", style("Error:").red().bold(), e);
            std::process::exit(1);
        }
    };
    spinner.finish_with_message(format!("{} Question ready", style("✓").green().bold()));

    println!("{}", style("─".repeat(60)).dim());
    println!("{} {}\n", style("Question:").bold(), question);

    // Step 3: Answer
    let answer = read_answer(&term)?;
    tutor.submit_answer(&mut session, answer);

    // Step 4: Feedback, retried on the same question until it succeeds or the user gives up
    loop {
        let spinner = create_spinner("Evaluating your answer...");
        match tutor.request_feedback(&mut session).await {
            Ok(Some(feedback)) => {
                spinner.finish_with_message(format!(
                    "{} Feedback ready",
                    style("✓").green().bold()
                ));
                println!("{}", style("─".repeat(60)).dim());
                println!("{}\n\n{}", style("Feedback on your answer:").bold(), feedback);
                break;
            }
            Ok(None) => {
                spinner.finish_and_clear();
                break;
            }
            Err(e) => {
                spinner.finish_and_clear();
                eprintln!("{} {}", style("Error:").red().bold(), e);
                if !confirm_retry(&term)? {
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_env_config() {
        let cli = Cli::try_parse_from([
            "kaabil",
            "https://www.youtube.com/watch?v=VID1",
            "--time",
            "300",
            "--provider",
            "grok",
            "--lang",
            "hi",
            "--lang",
            "en",
        ])
        .unwrap();

        assert_eq!(cli.time, 300);
        let config = cli.tutor_config(TutorConfig::default());
        assert_eq!(config.provider, Provider::Grok);
        assert_eq!(config.languages, vec!["hi", "en"]);
        assert!(config.model.is_none());
    }

    #[test]
    fn keeps_env_config_without_flags() {
        let cli = Cli::try_parse_from(["kaabil", "VID1"]).unwrap();
        let env = TutorConfig {
            provider: Provider::Gemini,
            model: Some("gemini-flash".to_string()),
            ..TutorConfig::default()
        };

        let config = cli.tutor_config(env);
        assert_eq!(config.provider, Provider::Gemini);
        assert_eq!(config.model.as_deref(), Some("gemini-flash"));
        assert_eq!(config.languages, vec!["en", "hi"]);
        assert_eq!(cli.time, 0);
    }

    #[test]
    fn negative_time_is_rejected() {
        assert!(Cli::try_parse_from(["kaabil", "VID1", "--time", "-5"]).is_err());
    }
}
