//! The `webpify convert` command: local conversion without the HTTP service.

use clap::Args;
use std::path::{Path, PathBuf};
use webpify_core::pipeline::{disambiguate_against, output_name, ArchiveBuilder};
use webpify_core::{
    Config, ConversionOutcome, Converter, DiscoveredFile, FileDiscovery, FormatValidator,
    ImageInput,
};

/// Arguments for the `convert` command.
#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Image file or directory to convert
    #[arg(required = true)]
    pub input: PathBuf,

    /// Output directory for converted files
    #[arg(short, long, default_value = ".")]
    pub output: PathBuf,

    /// WebP quality 1-100 (defaults to conversion.default_quality)
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub quality: Option<u8>,

    /// Write every converted file into this ZIP archive instead
    #[arg(long)]
    pub archive: Option<PathBuf>,

    /// Follow symbolic links while walking the input directory
    #[arg(long)]
    pub follow_links: bool,
}

/// Execute the convert command.
pub async fn execute(args: ConvertArgs, config: Config) -> anyhow::Result<()> {
    let input = super::expand_path(&args.input);
    if !input.exists() {
        anyhow::bail!(
            "Input path does not exist: {:?}\n\n  Hint: Check the file path and try again.",
            input
        );
    }

    let converter = Converter::new(&config.conversion, &config.limits);
    let discovery = FileDiscovery::new(FormatValidator::new(&config.conversion))
        .follow_links(args.follow_links);
    let files = discovery.discover(&input);
    if files.is_empty() {
        tracing::warn!("No supported image files found at {:?}", input);
        return Ok(());
    }
    tracing::info!(
        "Found {} image(s) to convert ({:.1} MB)",
        files.len(),
        FileDiscovery::total_size(&files) as f64 / 1_000_000.0
    );

    let quality = i32::from(args.quality.unwrap_or(config.conversion.default_quality));

    match &args.archive {
        Some(archive) => {
            let archive_path = super::expand_path(archive);
            convert_to_archive(&converter, &files, quality, &archive_path).await
        }
        None => {
            let output_dir = super::expand_path(&args.output);
            convert_to_dir(&converter, &files, quality, &output_dir).await
        }
    }
}

/// Convert everything as one batch and write a single ZIP.
///
/// Same semantics as the HTTP endpoint: any failure aborts the whole batch.
async fn convert_to_archive(
    converter: &Converter,
    files: &[DiscoveredFile],
    quality: i32,
    archive_path: &Path,
) -> anyhow::Result<()> {
    let mut inputs = Vec::with_capacity(files.len());
    for file in files {
        let bytes = tokio::fs::read(&file.path).await?;
        inputs.push(ImageInput::new(bytes, file.file_name()));
    }

    let bytes = match converter.convert_all(inputs, quality).await? {
        ConversionOutcome::Archive { bytes, .. } => bytes,
        ConversionOutcome::Single(artifact) => {
            ArchiveBuilder::new().build(&[(artifact.filename, artifact.bytes)])?
        }
    };

    if let Some(parent) = archive_path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    tokio::fs::write(archive_path, &bytes).await?;
    tracing::info!(
        "Archive with {} file(s) written to {:?}",
        files.len(),
        archive_path
    );
    Ok(())
}

/// Convert files one by one into `output_dir`, continuing past failures.
async fn convert_to_dir(
    converter: &Converter,
    files: &[DiscoveredFile],
    quality: i32,
    output_dir: &Path,
) -> anyhow::Result<()> {
    tokio::fs::create_dir_all(output_dir).await?;

    // Files from different subdirectories may share a stem, and sources that
    // live in the output directory must not be overwritten.
    let reserved = sources_in_dir(files, output_dir);
    let targets = disambiguate_against(
        files.iter().map(|f| output_name(&f.file_name())).collect(),
        &reserved,
    );

    let progress = create_progress_bar(files.len() as u64);
    let start_time = std::time::Instant::now();
    let mut succeeded: u64 = 0;
    let mut failed: u64 = 0;
    let mut bytes_in: u64 = 0;
    let mut bytes_out: u64 = 0;

    for (file, target) in files.iter().zip(targets) {
        match convert_file(converter, file, quality).await {
            Ok(bytes) => {
                let destination = output_dir.join(&target);
                tokio::fs::write(&destination, &bytes).await?;
                succeeded += 1;
                bytes_in += file.size;
                bytes_out += bytes.len() as u64;
                tracing::debug!("Wrote {:?}", destination);
            }
            Err(e) => {
                failed += 1;
                progress.suspend(|| tracing::error!("Failed: {:?} - {}", file.path, e));
            }
        }

        progress.inc(1);
        let elapsed = start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            let rate = (succeeded + failed) as f64 / elapsed;
            progress.set_message(format!("{:.1} img/sec", rate));
        }
    }

    progress.finish_and_clear();
    print_summary(succeeded, failed, bytes_in, bytes_out, start_time.elapsed());

    if failed > 0 && succeeded == 0 {
        anyhow::bail!("All {} conversion(s) failed", failed);
    }
    Ok(())
}

/// Names of discovered sources that sit directly inside `dir`.
fn sources_in_dir(files: &[DiscoveredFile], dir: &Path) -> Vec<String> {
    let Ok(dir) = dir.canonicalize() else {
        return Vec::new();
    };
    files
        .iter()
        .filter(|f| {
            f.path
                .parent()
                .and_then(|parent| parent.canonicalize().ok())
                .is_some_and(|parent| parent == dir)
        })
        .map(|f| f.file_name())
        .collect()
}

async fn convert_file(
    converter: &Converter,
    file: &DiscoveredFile,
    quality: i32,
) -> anyhow::Result<Vec<u8>> {
    let bytes = tokio::fs::read(&file.path).await?;
    let input = ImageInput::new(bytes, file.file_name());
    let converter = converter.clone();
    let artifact =
        tokio::task::spawn_blocking(move || converter.convert_one(&input, quality)).await??;
    Ok(artifact.bytes)
}

fn create_progress_bar(total: u64) -> indicatif::ProgressBar {
    use indicatif::{ProgressBar, ProgressStyle};

    let pb = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-");
    pb.set_style(style);
    pb.set_message("starting...");
    pb
}

/// Print a formatted summary table after batch conversion.
fn print_summary(
    succeeded: u64,
    failed: u64,
    bytes_in: u64,
    bytes_out: u64,
    elapsed: std::time::Duration,
) {
    let saved = if bytes_in > 0 {
        100.0 * (1.0 - bytes_out as f64 / bytes_in as f64)
    } else {
        0.0
    };

    eprintln!();
    eprintln!("  ====================================");
    eprintln!("               Summary");
    eprintln!("  ====================================");
    eprintln!("    Converted:    {:>8}", succeeded);
    if failed > 0 {
        eprintln!("    Failed:       {:>8}", failed);
    }
    eprintln!("  ------------------------------------");
    eprintln!("    Input:        {:>7.1} MB", bytes_in as f64 / 1_000_000.0);
    eprintln!("    Output:       {:>7.1} MB", bytes_out as f64 / 1_000_000.0);
    eprintln!("    Saved:        {:>7.1}%", saved);
    eprintln!("    Duration:     {:>7.1}s", elapsed.as_secs_f64());
    eprintln!("  ====================================");
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat, RgbImage};
    use std::io::Cursor;

    fn write_png(path: &Path) {
        let img = DynamicImage::ImageRgb8(RgbImage::from_fn(12, 12, |x, y| {
            image::Rgb([(x * 20) as u8, (y * 20) as u8, 64])
        }));
        let mut buffer = Cursor::new(Vec::new());
        img.write_to(&mut buffer, ImageFormat::Png).unwrap();
        std::fs::write(path, buffer.into_inner()).unwrap();
    }

    fn args(input: &Path, output: &Path, archive: Option<PathBuf>) -> ConvertArgs {
        ConvertArgs {
            input: input.to_path_buf(),
            output: output.to_path_buf(),
            quality: Some(80),
            archive,
            follow_links: false,
        }
    }

    #[tokio::test]
    async fn test_convert_directory_writes_webp_files() {
        let src = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        std::fs::create_dir(src.path().join("sub")).unwrap();
        write_png(&src.path().join("a.png"));
        write_png(&src.path().join("sub").join("a.png"));
        std::fs::write(src.path().join("notes.txt"), b"skip me").unwrap();

        execute(args(src.path(), out.path(), None), Config::default())
            .await
            .unwrap();

        let first = std::fs::read(out.path().join("a.webp")).unwrap();
        assert_eq!(&first[8..12], b"WEBP");
        assert!(out.path().join("a-2.webp").exists());
        assert!(!out.path().join("notes.webp").exists());
    }

    #[tokio::test]
    async fn test_convert_to_archive() {
        let src = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        write_png(&src.path().join("one.png"));
        write_png(&src.path().join("two.png"));
        let archive_path = out.path().join("bundle.zip");

        execute(
            args(src.path(), out.path(), Some(archive_path.clone())),
            Config::default(),
        )
        .await
        .unwrap();

        let bytes = std::fs::read(&archive_path).unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 2);
        assert_eq!(archive.by_index(0).unwrap().name(), "one.webp");
        assert_eq!(archive.by_index(1).unwrap().name(), "two.webp");
    }

    #[tokio::test]
    async fn test_single_file_archive_still_zipped() {
        let src = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let input = src.path().join("solo.png");
        write_png(&input);
        let archive_path = out.path().join("solo.zip");

        execute(args(&input, out.path(), Some(archive_path.clone())), Config::default())
            .await
            .unwrap();

        let bytes = std::fs::read(&archive_path).unwrap();
        let archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_input_is_error() {
        let out = tempfile::tempdir().unwrap();
        let missing = out.path().join("missing");
        let err = execute(args(&missing, out.path(), None), Config::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[tokio::test]
    async fn test_all_failures_is_error() {
        let src = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        std::fs::write(src.path().join("fake.png"), b"not really").unwrap();

        let err = execute(args(src.path(), out.path(), None), Config::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("failed"));
    }

    #[tokio::test]
    async fn test_in_place_conversion_keeps_sources() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        write_png(&dir.path().join("sub").join("x.png"));
        let original = DynamicImage::ImageRgb8(RgbImage::new(40, 40));
        original.save(dir.path().join("x.webp")).unwrap();
        let original_bytes = std::fs::read(dir.path().join("x.webp")).unwrap();

        execute(args(dir.path(), dir.path(), None), Config::default())
            .await
            .unwrap();

        assert_eq!(
            std::fs::read(dir.path().join("x.webp")).unwrap(),
            original_bytes
        );
        let from_png = image::open(dir.path().join("x-2.webp")).unwrap();
        assert_eq!(from_png.width(), 12);
        let from_webp = image::open(dir.path().join("x-3.webp")).unwrap();
        assert_eq!(from_webp.width(), 40);
    }

    #[test]
    fn test_sources_in_dir_ignores_nested_files() {
        let dir = tempfile::tempdir().unwrap();
        let files = vec![
            DiscoveredFile {
                path: dir.path().join("top.png"),
                size: 1,
            },
            DiscoveredFile {
                path: dir.path().join("nested").join("deep.png"),
                size: 1,
            },
        ];
        assert_eq!(sources_in_dir(&files, dir.path()), vec!["top.png"]);
    }
}
