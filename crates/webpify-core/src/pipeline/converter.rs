//! Conversion orchestration - wires together all pipeline stages.

use futures_util::stream::{self, StreamExt, TryStreamExt};

use crate::config::{ConversionConfig, LimitsConfig};
use crate::error::{ConvertError, ConvertResult};
use crate::types::{ConversionOutcome, ConvertedArtifact, ImageInput};

use super::archive::ArchiveBuilder;
use super::decode::ImageDecoder;
use super::encode::WebpEncoder;
use super::naming::{disambiguate, output_name};
use super::validate::FormatValidator;

/// Converts batches of uploaded images to WebP.
///
/// Holds only immutable configuration, so one instance can serve any number
/// of concurrent requests.
#[derive(Debug, Clone)]
pub struct Converter {
    validator: FormatValidator,
    decoder: ImageDecoder,
    encoder: WebpEncoder,
    archiver: ArchiveBuilder,
    archive_name: String,
    parallel_workers: usize,
}

impl Converter {
    /// Create a converter with the given configuration.
    pub fn new(conversion: &ConversionConfig, limits: &LimitsConfig) -> Self {
        Self {
            validator: FormatValidator::new(conversion),
            decoder: ImageDecoder::new(limits.clone()),
            encoder: WebpEncoder::new(conversion),
            archiver: ArchiveBuilder::new(),
            archive_name: conversion.archive_name.clone(),
            parallel_workers: conversion.parallel_workers.max(1),
        }
    }

    /// Check every filename against the allow-list.
    pub fn validate_batch<S: AsRef<str>>(&self, filenames: &[S]) -> ConvertResult<()> {
        self.validator.validate_batch(filenames)
    }

    /// Whether a single filename would pass validation.
    pub fn is_valid_format(&self, filename: &str) -> bool {
        self.validator.is_valid_format(filename)
    }

    /// Run one input through decode, normalize and encode.
    ///
    /// Blocking: call from a worker thread when on an async runtime.
    pub fn convert_one(&self, input: &ImageInput, quality: i32) -> ConvertResult<ConvertedArtifact> {
        let start = std::time::Instant::now();

        let buffer = self.decoder.decode(&input.bytes, &input.filename)?;
        let decode_time = start.elapsed();
        tracing::trace!("  Decode: {:?}", decode_time);

        let encode_start = std::time::Instant::now();
        let bytes = self.encoder.encode(&buffer, quality, &input.filename)?;
        tracing::trace!("  Encode: {:?}", encode_start.elapsed());

        tracing::debug!(
            "Converted {:?} in {:?} ({}x{}, {} -> {} bytes)",
            input.filename,
            start.elapsed(),
            buffer.width,
            buffer.height,
            input.bytes.len(),
            bytes.len()
        );

        Ok(ConvertedArtifact {
            bytes,
            filename: output_name(&input.filename),
        })
    }

    /// Convert a batch and shape the result by its size.
    ///
    /// The whole batch is validated before any decoding. Files are converted on
    /// blocking worker threads, at most `parallel_workers` at a time, and
    /// results keep input order. The first failure aborts the batch.
    pub async fn convert_all(
        &self,
        inputs: Vec<ImageInput>,
        quality: i32,
    ) -> ConvertResult<ConversionOutcome> {
        if inputs.is_empty() {
            return Err(ConvertError::NoFiles);
        }
        let filenames: Vec<&str> = inputs.iter().map(|i| i.filename.as_str()).collect();
        self.validate_batch(&filenames)?;

        tracing::debug!("Converting {} file(s) at quality {}", inputs.len(), quality);

        let mut artifacts: Vec<ConvertedArtifact> = stream::iter(inputs)
            .map(|input| self.spawn_conversion(input, quality))
            .buffered(self.parallel_workers)
            .try_collect()
            .await?;

        if artifacts.len() == 1 {
            if let Some(artifact) = artifacts.pop() {
                return Ok(ConversionOutcome::Single(artifact));
            }
        }

        let names = disambiguate(artifacts.iter().map(|a| a.filename.clone()).collect());
        let entries: Vec<(String, Vec<u8>)> = names
            .into_iter()
            .zip(artifacts)
            .map(|(name, artifact)| (name, artifact.bytes))
            .collect();
        let bytes = self.archiver.build(&entries)?;

        Ok(ConversionOutcome::Archive {
            bytes,
            filename: self.archive_name.clone(),
        })
    }

    async fn spawn_conversion(
        &self,
        input: ImageInput,
        quality: i32,
    ) -> ConvertResult<ConvertedArtifact> {
        let converter = self.clone();
        let filename = input.filename.clone();
        tokio::task::spawn_blocking(move || converter.convert_one(&input, quality))
            .await
            .map_err(|e| {
                tracing::error!("Conversion task for {:?} failed: {}", filename, e);
                ConvertError::Internal(format!("conversion of {} did not complete", filename))
            })?
    }
}

impl Default for Converter {
    fn default() -> Self {
        Self::new(&ConversionConfig::default(), &LimitsConfig::default())
    }
}
