use colored::Colorize;
use postcraft_core::{Platform, Tone};

pub fn run() {
    println!("{}", "Platforms and formats".bright_magenta().bold());
    for platform in Platform::all() {
        println!("  {}", platform.to_string().bright_cyan());
        for (format, template) in platform.templates() {
            println!(
                "    {:<6} {:>4}x{:<4}  {}",
                format.to_string(),
                template.width,
                template.height,
                template.label.bright_black()
            );
        }
    }

    println!();
    println!("{}", "Tones".bright_magenta().bold());
    for tone in Tone::all() {
        let marker = if tone == Tone::default() { " (default)" } else { "" };
        println!("  {}{}", tone.to_string().bright_cyan(), marker.bright_black());
    }
}
