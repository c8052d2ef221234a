//! Terminal output for previews, notices and builder events.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use colored::Colorize;
use postcraft_application::{BuilderEvent, Clipboard, PreviewBlock, PreviewLayout};
use postcraft_core::{GeneratedPost, GenerationState, Notice, NoticeLevel};
use std::io::Write;
use tokio::sync::mpsc::UnboundedReceiver;

pub fn print_preview(post: &GeneratedPost, layout: &PreviewLayout) {
    let (width, height) = layout.scaled_size();
    println!(
        "{}",
        format!("{} {}", post.platform.label(), layout.format_label)
            .bright_magenta()
            .bold()
    );
    println!(
        "{}",
        format!(
            "{}x{} at scale {:.3} ({:.0}x{:.0})",
            layout.target.width, layout.target.height, layout.scale, width, height
        )
        .bright_black()
    );

    for block in &layout.blocks {
        match block {
            PreviewBlock::GeneratedImage(image) => println!(
                "{}",
                format!("[generated image, {}, {} bytes]", image.mime_type(), image.len()).green()
            ),
            PreviewBlock::ImagePlaceholder(text) => {
                println!("{}", format!("[no image] {text}").bright_black())
            }
            PreviewBlock::ReferenceGrid(images) => println!(
                "{}",
                format!("[{} reference image(s)]", images.len()).bright_black()
            ),
            PreviewBlock::Caption(caption) => {
                println!();
                for line in caption.lines() {
                    println!("{}", line.bright_blue());
                }
            }
            PreviewBlock::Hashtags(tags) => {
                println!();
                println!("{}", tags.cyan());
            }
        }
    }
    println!();
}

pub fn print_notice(notice: &Notice) {
    match notice.level {
        NoticeLevel::Success => println!("{}", notice.message.bright_green()),
        NoticeLevel::Info => println!("{}", notice.message.yellow()),
        NoticeLevel::Error => eprintln!("{}", notice.message.red()),
    }
}

/// Prints whatever the builder reported since the last call.
pub fn drain_events(events: &mut UnboundedReceiver<BuilderEvent>) {
    while let Ok(event) = events.try_recv() {
        match event {
            BuilderEvent::Notice(notice) => print_notice(&notice),
            BuilderEvent::StateChanged(state) => {
                if let Some(message) = state_message(&state) {
                    eprintln!("{}", message.bright_black());
                }
            }
            BuilderEvent::ReferenceImagesChanged { count } => {
                println!("{}", format!("{count} reference image(s) attached").bright_black())
            }
            BuilderEvent::PostGenerated(_) | BuilderEvent::ImageAttached { .. } => {}
        }
    }
}

fn state_message(state: &GenerationState) -> Option<&'static str> {
    match state {
        GenerationState::GeneratingText => Some("Generating caption..."),
        GenerationState::GeneratingImage { .. } => Some("Generating image..."),
        _ => None,
    }
}

/// Copies through the terminal with the OSC 52 escape sequence.
pub struct TerminalClipboard;

impl Clipboard for TerminalClipboard {
    fn set_text(&mut self, text: &str) -> postcraft_core::Result<()> {
        let mut stdout = std::io::stdout();
        write!(stdout, "\x1b]52;c;{}\x07", BASE64_STANDARD.encode(text))?;
        stdout.flush()?;
        Ok(())
    }
}
