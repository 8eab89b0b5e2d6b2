use std::path::PathBuf;

use clap::{Parser, Subcommand};
use cvpress::{
    compositor::compose_resume,
    configuration::{Margins, RenderConfiguration},
    document::Document,
    error::{ContextError, ErrorKind},
    record::ResumeRecord,
    resume::{PersonalInfo, Resume},
    template::BuiltinTemplates,
};
use time::OffsetDateTime;

#[derive(Parser, Debug)]
#[command(version, about = "Render résumés stored as JSON into PDF documents", long_about = None)]
struct CliArguments {
    #[arg(
        long = "log-level",
        value_enum,
        default_value_t = LogLevel::Info,
        help = "Maximum level of the log messages printed to the standard error"
    )]
    log_level: LogLevel,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Copy, Clone, clap::ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(log_level: LogLevel) -> Self {
        match log_level {
            LogLevel::Off => log::LevelFilter::Off,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a résumé into a PDF file.
    Render {
        #[command(flatten)]
        input: InputArguments,
        #[arg(
            short = 'o',
            long = "output",
            value_name = "pdf_file",
            help = "Path of the PDF file, by default derived from the name on the résumé"
        )]
        output_pdf_path: Option<PathBuf>,
    },
    /// Print the drawing operations of a résumé as JSON instead of rendering them.
    Layout {
        #[command(flatten)]
        input: InputArguments,
    },
    /// Convert the JSON printed by `layout`, possibly edited, into a PDF file.
    Pdf {
        #[arg(short = 'd', long = "document", value_name = "json_file")]
        document_path: PathBuf,
        #[arg(short = 'o', long = "output", value_name = "pdf_file")]
        output_pdf_path: PathBuf,
    },
    /// List the identifiers and names of the available templates.
    Templates,
}

#[derive(clap::Args, Debug)]
struct InputArguments {
    #[arg(short = 'r', long = "resume", value_name = "json_file")]
    resume_path: PathBuf,
    #[arg(short = 't', long = "template", value_name = "template_id", default_value = "modern")]
    template_id: String,
    #[arg(short = 'c', long = "configuration", value_name = "json_file")]
    configuration_path: Option<PathBuf>,
    #[arg(
        long = "margins",
        value_name = "top,right,bottom,left",
        help = "Margins in millimeters, overriding the ones of the configuration"
    )]
    margins: Option<Margins>,
}

fn main() {
    if let Err(error) = fallible_main() {
        log::error!("{}", error);
        std::process::exit(1);
    }
}

fn fallible_main() -> Result<(), ContextError> {
    let arguments = CliArguments::parse();
    env_logger::builder()
        .filter_level(arguments.log_level.into())
        .init();
    log::debug!("{:?}", arguments);

    let templates = BuiltinTemplates::new();
    match arguments.command {
        Command::Render {
            input,
            output_pdf_path,
        } => {
            let (resume, configuration) = load_input(&input)?;
            let document =
                compose_resume(&resume, &input.template_id, &templates, &configuration)?;
            let output_pdf_path = output_pdf_path.unwrap_or_else(|| {
                PathBuf::from(default_file_name(
                    &resume.personal_info,
                    OffsetDateTime::now_utc(),
                ))
            });
            document.save_to_pdf_file(&output_pdf_path)?;
            // The path is the only thing printed on the standard output
            println!("{}", output_pdf_path.display());
        }
        Command::Layout { input } => {
            let (resume, configuration) = load_input(&input)?;
            let document =
                compose_resume(&resume, &input.template_id, &templates, &configuration)?;
            let json = serde_json::to_string_pretty(&document).map_err(|error| {
                ContextError::with_error(ErrorKind::Pdf, "Unable to serialize the layout", &error)
            })?;
            println!("{json}");
        }
        Command::Pdf {
            document_path,
            output_pdf_path,
        } => {
            let document = Document::from_path(&document_path)?;
            document.save_to_pdf_file(&output_pdf_path)?;
            println!("{}", output_pdf_path.display());
        }
        Command::Templates => {
            for (template_id, name) in templates.list() {
                println!("{template_id:<16}{name}");
            }
        }
    }

    Ok(())
}

fn load_input(input: &InputArguments) -> Result<(Resume, RenderConfiguration), ContextError> {
    let record = ResumeRecord::from_path(&input.resume_path)?;
    let mut configuration = match &input.configuration_path {
        Some(configuration_path) => RenderConfiguration::from_path(configuration_path)?,
        None => RenderConfiguration::default(),
    };
    if let Some(margins) = input.margins {
        configuration.margins = margins;
    }

    Ok((Resume::from_record(&record), configuration))
}

/// `<First>_<Last>_CV_<YYYYMMDD_HHMMSS>.pdf`, keeping only alphanumeric characters of the name.
fn default_file_name(personal_info: &PersonalInfo, now: OffsetDateTime) -> String {
    let name_parts: Vec<String> = [&personal_info.first_name, &personal_info.last_name]
        .into_iter()
        .map(|part| {
            part.chars()
                .filter(|character| character.is_alphanumeric())
                .collect::<String>()
        })
        .filter(|part| !part.is_empty())
        .collect();
    let name = if name_parts.is_empty() {
        "Resume".to_string()
    } else {
        name_parts.join("_")
    };

    format!(
        "{name}_CV_{:04}{:02}{:02}_{:02}{:02}{:02}.pdf",
        now.year(),
        now.month() as u8,
        now.day(),
        now.hour(),
        now.minute(),
        now.second()
    )
}
