use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};

use consent_pdf::{
    Confirmation, ConsentConfig, ConsentForm, FormField, MemoryPad, Prompter, SessionStore,
    SignatureImage,
};

#[derive(Parser)]
#[command(name = "consent-pdf", version, about = "Fill in and render the AI scribe consent form")]
struct Cli {
    /// TOML file overriding the built-in clinic, doctors, text or layout
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Submit a form and save the rendered PDF
    Render(RenderArgs),
    /// List the selectable doctors and their contact addresses
    Doctors,
    /// Print the effective configuration as TOML
    ShowConfig,
}

#[derive(clap::Args)]
struct RenderArgs {
    #[arg(long, default_value = "")]
    name: String,
    /// Date of birth
    #[arg(long, default_value = "")]
    dob: String,
    /// Visit date
    #[arg(long, default_value = "")]
    date: String,
    #[arg(long, default_value = "")]
    doctor: String,
    /// PNG or JPEG image of the patient signature
    #[arg(long)]
    patient_signature: Option<PathBuf>,
    /// PNG or JPEG image of the witness signature
    #[arg(long)]
    witness_signature: Option<PathBuf>,
    /// Output path; defaults to the configured document filename
    #[arg(long, short)]
    out: Option<PathBuf>,
    /// Proceed without asking when a signature is missing
    #[arg(long, short)]
    yes: bool,
    /// Print the data URI handed to the confirmation step
    #[arg(long)]
    data_uri: bool,
    /// Print a JSON summary instead of the next steps
    #[arg(long)]
    json: bool,
}

struct TerminalPrompter {
    assume_yes: bool,
}

impl Prompter for TerminalPrompter {
    fn confirm(&mut self, message: &str) -> bool {
        if self.assume_yes {
            log::info!("{} (assuming yes)", message);
            return true;
        }
        eprint!("{} [y/N] ", message);
        if let Err(e) = io::stderr().flush() {
            log::warn!("could not show confirmation prompt: {}", e);
            return false;
        }
        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
    }

    fn notify(&mut self, message: &str) {
        eprintln!("{}", message);
    }
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<ConsentConfig> {
    match path {
        Some(p) => ConsentConfig::load(p).with_context(|| format!("loading {}", p.display())),
        None => Ok(ConsentConfig::default()),
    }
}

fn pad_from(path: Option<&PathBuf>) -> anyhow::Result<MemoryPad> {
    let mut pad = MemoryPad::new();
    if let Some(p) = path {
        let sig = SignatureImage::from_path(p)
            .with_context(|| format!("reading signature {}", p.display()))?;
        pad.draw(sig);
    }
    Ok(pad)
}

fn render(config: ConsentConfig, args: RenderArgs) -> anyhow::Result<()> {
    let office_email = config.clinic.office_email.clone();
    let patient = pad_from(args.patient_signature.as_ref())?;
    let witness = pad_from(args.witness_signature.as_ref())?;
    let mut form = ConsentForm::with_pads(Arc::new(config), Box::new(patient), Box::new(witness))?;

    form.update_field(FormField::Name, args.name);
    form.update_field(FormField::DateOfBirth, args.dob);
    form.update_field(FormField::VisitDate, args.date);
    form.update_field(FormField::Doctor, args.doctor);

    let mut store = SessionStore::new();
    let mut prompter = TerminalPrompter {
        assume_yes: args.yes,
    };
    form.submit(&mut prompter, &mut store)?;

    let confirmation = Confirmation::from_store(&store, office_email)?;
    let Some(download) = confirmation.download() else {
        bail!("submission succeeded but no document was handed off");
    };
    let out = args
        .out
        .unwrap_or_else(|| PathBuf::from(&download.filename));
    std::fs::write(&out, &download.bytes)
        .with_context(|| format!("writing {}", out.display()))?;
    log::info!("Saved {} ({} bytes)", out.display(), download.bytes.len());

    let handoff = consent_pdf::Handoff::load_from(&store)?
        .context("handoff disappeared from the session store")?;

    if args.data_uri {
        println!("{}", handoff.document.to_data_uri());
    }

    if args.json {
        let summary = serde_json::json!({
            "output": out.display().to_string(),
            "filename": download.filename,
            "mime": download.mime,
            "pages": handoff.document.page_count(),
            "bytes": download.bytes.len(),
            "sha256": handoff.document.digest(),
            "doctor_contact": handoff.contact,
            "office_email": confirmation.office_email(),
            "form": form.data(),
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else if !args.data_uri {
        println!("{}", confirmation.title());
        println!("{}", confirmation.message());
        println!();
        println!("Next Steps:");
        for (i, step) in confirmation.next_steps().iter().enumerate() {
            println!("  {}. {}", i + 1, step);
        }
        println!();
        println!("Saved: {} (sha256 {})", out.display(), handoff.document.digest());
    }

    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;

    match cli.command {
        Command::Render(args) => render(config, args),
        Command::Doctors => {
            for entry in config.doctors.entries() {
                println!("{}\t{}", entry.name, entry.contact);
            }
            Ok(())
        }
        Command::ShowConfig => {
            print!("{}", config.to_toml_string()?);
            Ok(())
        }
    }
}
