use super::context::{self, Options};
use super::render::{self, TerminalClipboard};
use anyhow::{Result, anyhow};
use clap::{Args, ValueEnum};
use postcraft_application::{ContainerSize, CopyTarget, PreviewRenderer, copy};
use postcraft_core::{FormField, HashtagCount, ImageSource, Platform, PostFormat, Tone};
use postcraft_infrastructure::{ImageExporter, PostcraftPaths};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// What the post is about
    description: String,

    #[arg(long, short, default_value_t = Platform::Instagram)]
    platform: Platform,

    /// Post format; defaults to the platform's first format
    #[arg(long, short)]
    format: Option<PostFormat>,

    #[arg(long, short, default_value_t = Tone::Casual)]
    tone: Tone,

    /// Number of hashtags (1-10)
    #[arg(long, default_value_t = 5)]
    hashtags: u8,

    /// Do not ask for hashtags
    #[arg(long, conflicts_with = "hashtags")]
    no_hashtags: bool,

    /// Reference image; may be given up to five times
    #[arg(long = "image", short = 'i')]
    images: Vec<PathBuf>,

    /// Print the generated post as JSON instead of a preview
    #[arg(long)]
    json: bool,

    /// Save the generated image
    #[arg(long)]
    download: bool,

    /// Directory for --download (defaults to the download folder)
    #[arg(long, requires = "download")]
    output_dir: Option<PathBuf>,

    /// Copy part of the post to the clipboard
    #[arg(long, value_enum)]
    copy: Option<CopyArg>,

    /// Preview container size as WIDTHxHEIGHT
    #[arg(long, value_parser = parse_container)]
    container: Option<ContainerSize>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum CopyArg {
    Caption,
    Hashtags,
}

impl From<CopyArg> for CopyTarget {
    fn from(arg: CopyArg) -> Self {
        match arg {
            CopyArg::Caption => CopyTarget::Caption,
            CopyArg::Hashtags => CopyTarget::Hashtags,
        }
    }
}

fn parse_container(value: &str) -> Result<ContainerSize, String> {
    let (width, height) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{value}'"))?;
    let width: f64 = width.trim().parse().map_err(|_| format!("invalid width '{width}'"))?;
    let height: f64 = height.trim().parse().map_err(|_| format!("invalid height '{height}'"))?;
    ContainerSize::new(width, height).map_err(|e| e.user_message())
}

pub async fn run(options: &Options, args: GenerateArgs) -> Result<()> {
    let mut builder = context::builder(options).await?;
    let mut events = builder.subscribe();

    builder.set_field(FormField::Description(args.description))?;
    builder.set_field(FormField::Platform(args.platform))?;
    if let Some(format) = args.format {
        builder.set_field(FormField::PostFormat(format))?;
    }
    builder.set_field(FormField::Tone(args.tone))?;
    builder.set_field(FormField::WantHashtags(!args.no_hashtags))?;
    builder.set_field(FormField::HashtagCount(HashtagCount::new(args.hashtags)?))?;

    if !args.images.is_empty() {
        let offered = args.images.len();
        let sources = args.images.into_iter().map(ImageSource::from).collect();
        let appended = builder.add_reference_images(sources).await;
        if appended < offered {
            tracing::warn!(offered, appended, "some reference images were not attached");
        }
    }

    let result = builder.generate().await;
    render::drain_events(&mut events);
    let post = result?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&post)?);
    } else {
        let mut renderer = PreviewRenderer::new();
        if let Some(size) = args.container {
            renderer.resize(size);
        }
        render::print_preview(&post, &renderer.render(&post));
    }

    if args.download {
        let dir = args
            .output_dir
            .unwrap_or_else(PostcraftPaths::download_dir);
        match ImageExporter::new(dir).export(&post).await {
            Ok((path, notice)) => {
                render::print_notice(&notice);
                println!("{}", path.display());
            }
            Err(err) => return Err(anyhow!(err.user_message())),
        }
    }

    if let Some(target) = args.copy {
        let notice = copy(&post, target.into(), &mut TerminalClipboard)?;
        render::print_notice(&notice);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_container() {
        assert_eq!(
            parse_container("800x400"),
            Ok(ContainerSize::new(800.0, 400.0).unwrap())
        );
        assert_eq!(
            parse_container("1080X1920"),
            Ok(ContainerSize::new(1080.0, 1920.0).unwrap())
        );
        assert!(parse_container("800").is_err());
        assert!(parse_container("ax400").is_err());
        assert!(parse_container("0x400").is_err());
        assert!(parse_container("-800x400").is_err());
        assert!(parse_container("infx400").is_err());
    }
}
