//! Interactive post form.

use super::context::{self, Options};
use super::render::{self, TerminalClipboard};
use anyhow::Result;
use colored::Colorize;
use postcraft_application::{
    BuilderEvent, ContainerSize, CopyTarget, PostBuilder, PreviewRenderer, copy,
};
use postcraft_core::{
    FormField, GeneratedPost, HashtagCount, ImageSource, Platform, PostFormat, Tone,
};
use postcraft_infrastructure::{ImageExporter, PostcraftPaths};
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};
use std::borrow::Cow::{self, Borrowed, Owned};
use std::path::PathBuf;
use tokio::sync::mpsc::UnboundedReceiver;

const COMMANDS: &[&str] = &[
    "description",
    "platform",
    "format",
    "tone",
    "hashtags",
    "image",
    "remove",
    "show",
    "generate",
    "history",
    "copy",
    "download",
    "resize",
    "help",
    "quit",
];

const HELP: &str = "\
description <text>        what the post is about
platform <name>           instagram | facebook | twitter
format <name>             post | story (depends on the platform)
tone <name>               professional | casual | humorous | inspirational | promotional
hashtags on|off|<1-10>    toggle hashtags or set how many
image <path>...           attach reference images (up to 5)
remove <n>                detach reference image n
show                      show the form
generate                  generate caption, hashtags and image
history                   list generated posts
copy caption|hashtags     copy from the current post
download [dir]            save the current post's image
resize <width> <height>   set the preview container size
quit                      leave";

/// One line of REPL input.
#[derive(Debug, Clone, PartialEq)]
pub enum FormCommand {
    Set(FormField),
    AddImages(Vec<PathBuf>),
    /// Zero-based.
    RemoveImage(usize),
    Show,
    Generate,
    History,
    Copy(CopyTarget),
    Download(Option<PathBuf>),
    Resize(ContainerSize),
    Help,
    Quit,
}

pub fn parse_command(line: &str) -> Result<FormCommand, String> {
    let line = line.trim();
    let (command, rest) = match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    };

    let parsed = match command.to_ascii_lowercase().as_str() {
        "description" | "desc" => FormCommand::Set(FormField::Description(rest.to_string())),
        "platform" => FormCommand::Set(FormField::Platform(
            rest.parse::<Platform>()
                .map_err(|_| format!("unknown platform '{rest}'"))?,
        )),
        "format" => FormCommand::Set(FormField::PostFormat(
            rest.parse::<PostFormat>()
                .map_err(|_| format!("unknown format '{rest}'"))?,
        )),
        "tone" => FormCommand::Set(FormField::Tone(
            rest.parse::<Tone>().map_err(|_| format!("unknown tone '{rest}'"))?,
        )),
        "hashtags" => match rest {
            "on" => FormCommand::Set(FormField::WantHashtags(true)),
            "off" => FormCommand::Set(FormField::WantHashtags(false)),
            count => {
                let count: u8 = count
                    .parse()
                    .map_err(|_| format!("expected on, off or a number, got '{count}'"))?;
                let count = HashtagCount::new(count).map_err(|e| e.user_message())?;
                FormCommand::Set(FormField::HashtagCount(count))
            }
        },
        "image" | "images" => {
            if rest.is_empty() {
                return Err("usage: image <path>...".to_string());
            }
            FormCommand::AddImages(rest.split_whitespace().map(PathBuf::from).collect())
        }
        "remove" => {
            let index: usize = rest
                .parse()
                .map_err(|_| "usage: remove <n>".to_string())?;
            let index = index
                .checked_sub(1)
                .ok_or_else(|| "images are numbered from 1".to_string())?;
            FormCommand::RemoveImage(index)
        }
        "show" => FormCommand::Show,
        "generate" | "gen" => FormCommand::Generate,
        "history" => FormCommand::History,
        "copy" => match rest {
            "caption" => FormCommand::Copy(CopyTarget::Caption),
            "hashtags" => FormCommand::Copy(CopyTarget::Hashtags),
            _ => return Err("usage: copy caption|hashtags".to_string()),
        },
        "download" => FormCommand::Download((!rest.is_empty()).then(|| PathBuf::from(rest))),
        "resize" => {
            let mut parts = rest.split_whitespace().map(str::parse::<f64>);
            match (parts.next(), parts.next(), parts.next()) {
                (Some(Ok(width)), Some(Ok(height)), None) => FormCommand::Resize(
                    ContainerSize::new(width, height).map_err(|e| e.user_message())?,
                ),
                _ => return Err("usage: resize <width> <height>".to_string()),
            }
        }
        "help" | "?" => FormCommand::Help,
        "quit" | "exit" => FormCommand::Quit,
        other => return Err(format!("unknown command '{other}', type 'help'")),
    };

    Ok(parsed)
}

/// rustyline helper with command completion and hints.
#[derive(Clone)]
struct FormHelper;

impl Helper for FormHelper {}

impl Completer for FormHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];
        if line.contains(' ') {
            return Ok((0, vec![]));
        }
        let candidates = COMMANDS
            .iter()
            .filter(|cmd| cmd.starts_with(line))
            .map(|cmd| Pair {
                display: cmd.to_string(),
                replacement: cmd.to_string(),
            })
            .collect();
        Ok((0, candidates))
    }
}

impl Highlighter for FormHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        match line.split_once(' ') {
            Some((command, rest)) if COMMANDS.contains(&command) => {
                Owned(format!("{} {rest}", command.bright_cyan()))
            }
            _ if COMMANDS.contains(&line) => Owned(line.bright_cyan().to_string()),
            _ => Borrowed(line),
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for FormHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];
        if line.is_empty() || line.contains(' ') {
            return None;
        }
        COMMANDS
            .iter()
            .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
            .map(|cmd| cmd[line.len()..].to_string())
    }
}

impl Validator for FormHelper {}

pub async fn run(options: &Options) -> Result<()> {
    let mut builder = context::builder(options).await?;
    let mut events = builder.subscribe();
    let mut renderer = PreviewRenderer::new();

    let mut rl = Editor::new()?;
    rl.set_helper(Some(FormHelper));

    println!("{}", "=== Postcraft ===".bright_magenta().bold());
    println!(
        "{}",
        "Describe your post, then type 'generate'. 'help' lists commands.".bright_black()
    );
    println!();

    loop {
        let line = match rl.readline("post> ") {
            Ok(line) => line,
            Err(rustyline::error::ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type 'quit' to exit.".yellow());
                continue;
            }
            Err(rustyline::error::ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("{}", format!("Error: {err:?}").red());
                break;
            }
        };

        if line.trim().is_empty() {
            continue;
        }
        let _ = rl.add_history_entry(line.as_str());

        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(message) => {
                eprintln!("{}", message.red());
                continue;
            }
        };

        if command == FormCommand::Quit {
            break;
        }
        execute(&mut builder, &mut renderer, &mut events, command).await;
        render::drain_events(&mut events);
    }

    println!("{}", "Goodbye!".bright_green());
    Ok(())
}

async fn execute(
    builder: &mut PostBuilder,
    renderer: &mut PreviewRenderer,
    events: &mut UnboundedReceiver<BuilderEvent>,
    command: FormCommand,
) {
    match command {
        // Failures surface as notices through the event stream.
        FormCommand::Set(field) => {
            let _ = builder.set_field(field);
        }
        FormCommand::AddImages(paths) => {
            let offered = paths.len();
            let remaining = builder.request().remaining_reference_slots();
            let appended = builder
                .add_reference_images(paths.into_iter().map(ImageSource::from).collect())
                .await;
            if offered > remaining {
                println!(
                    "{}",
                    format!("Only {remaining} more image(s) fit; {appended} attached").yellow()
                );
            }
        }
        FormCommand::RemoveImage(index) => {
            if builder.remove_reference_image(index).is_none() {
                println!("{}", "No such image".bright_black());
            }
        }
        FormCommand::Show => print_form(builder),
        FormCommand::Generate => {
            generate_in_phases(builder, |post| {
                render::drain_events(events);
                render::print_preview(post, &renderer.render(post));
            })
            .await;
            render::drain_events(events);
        }
        FormCommand::History => {
            if builder.history().is_empty() {
                println!("{}", "Nothing generated yet".bright_black());
            }
            for (i, post) in builder.history().iter().enumerate() {
                let caption: String = post.caption.chars().take(60).collect();
                let image = if post.generated_image.is_some() { "image" } else { "no image" };
                println!(
                    "{:>2}. {} {} [{}] {}",
                    i + 1,
                    post.platform.label(),
                    post.format_label(),
                    image,
                    caption.bright_blue()
                );
            }
        }
        FormCommand::Copy(target) => match builder.current() {
            Some(post) => match copy(post, target, &mut TerminalClipboard) {
                Ok(notice) => render::print_notice(&notice),
                Err(err) => eprintln!("{}", err.user_message().red()),
            },
            None => eprintln!("{}", "Generate a post first".red()),
        },
        FormCommand::Download(dir) => match builder.current() {
            Some(post) => {
                let dir = dir.unwrap_or_else(PostcraftPaths::download_dir);
                match ImageExporter::new(dir).export(post).await {
                    Ok((path, notice)) => {
                        render::print_notice(&notice);
                        println!("{}", path.display());
                    }
                    Err(err) => eprintln!("{}", err.user_message().red()),
                }
            }
            None => eprintln!("{}", "Generate a post first".red()),
        },
        FormCommand::Resize(size) => {
            renderer.resize(size);
            if let Some(post) = builder.current() {
                render::print_preview(post, &renderer.render(post));
            }
        }
        FormCommand::Help => println!("{HELP}"),
        FormCommand::Quit => {}
    }
}

/// Shows the caption as soon as it exists, then again with the image.
/// A failed image step leaves the caption-only preview on screen.
async fn generate_in_phases(builder: &mut PostBuilder, mut show: impl FnMut(&GeneratedPost)) {
    let Ok(post_id) = builder.generate_text().await else {
        return;
    };
    if let Some(post) = builder.history().get(post_id) {
        show(post);
    }

    if builder.synthesize_image(post_id).await.is_err() {
        return;
    }
    if let Some(post) = builder.history().get(post_id) {
        show(post);
    }
}

fn print_form(builder: &PostBuilder) {
    let request = builder.request();
    let description = if request.description().trim().is_empty() {
        "(empty)".bright_black().to_string()
    } else {
        request.description().to_string()
    };
    let hashtags = match request.requested_hashtags() {
        Some(count) => count.get().to_string(),
        None => "off".to_string(),
    };

    println!("{} {description}", "description:".bright_cyan());
    println!(
        "{} {} {}",
        "platform:   ".bright_cyan(),
        request.platform().label(),
        request.template().label.bright_black()
    );
    println!("{} {}", "tone:       ".bright_cyan(), request.tone().label());
    println!("{} {hashtags}", "hashtags:   ".bright_cyan());
    println!(
        "{} {}",
        "images:     ".bright_cyan(),
        request.reference_images().len()
    );
}
