//! Rawlab CLI - apply one pixel kernel to an image file.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rawlab::prelude::*;
use std::path::{Path, PathBuf};

/// Apply a pixel kernel to an image and write the result.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Worker threads (0 = one per hardware thread).
    #[arg(long, default_value_t = 0)]
    threads: usize,

    /// Input image (PNG, JPEG, BMP or WebP).
    input: PathBuf,

    /// Output image; the format follows the extension.
    output: PathBuf,

    #[command(subcommand)]
    command: Command,
}

/// Options shared by the noise commands.
#[derive(clap::Args)]
struct NoiseArgs {
    /// Also write the noise mask to this path.
    #[arg(long, value_name = "PATH")]
    mask: Option<PathBuf>,

    /// Seed for reproducible output.
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Subcommand)]
enum Command {
    /// Gray from the unweighted channel mean.
    GrayAverage,
    /// Gray from Rec. 601 luma weights.
    GrayWeighted,
    /// Invert the color channels.
    Invert,
    /// Keep a single color channel.
    Channel {
        /// Channel to keep.
        #[arg(value_enum)]
        channel: ChannelArg,
    },
    /// Rotate 90 degrees counter-clockwise.
    RotateLeft,
    /// Rotate 90 degrees clockwise.
    RotateRight,
    /// Mirror top to bottom.
    FlipVertical,
    /// Mirror left to right.
    FlipHorizontal,
    /// Resize with bilinear interpolation.
    Scale {
        /// Scale factor, e.g. 0.5 or 2.
        factor: f64,
    },
    /// Average square blocks of pixels.
    Mosaic {
        /// Block side length in pixels.
        #[arg(default_value_t = 8)]
        cell_size: u32,
    },
    /// Salt-and-pepper noise.
    SaltPepper {
        /// Percentage of pixels hit, 0-100.
        #[arg(default_value_t = 10)]
        intensity: u32,
        #[command(flatten)]
        noise: NoiseArgs,
    },
    /// Additive Gaussian noise.
    Gaussian {
        /// Standard deviation in byte units.
        #[arg(default_value_t = 10.0)]
        sigma: f64,
        /// Leave the unpaired last pixel of an odd-sized image untouched.
        #[arg(long)]
        skip_trailing: bool,
        #[command(flatten)]
        noise: NoiseArgs,
    },
    /// Histogram equalization.
    Equalize {
        /// Treat the input as gray and equalize the blue channel.
        #[arg(long)]
        grayscale: bool,
    },
    /// Sobel edge detection.
    Edges,
    /// 3x3 Gaussian blur.
    Smooth,
    /// Convolve with a kernel read from a JSON file.
    Convolve {
        /// JSON file with `size`, `coefficients` and optional `scalar`/`bias`.
        #[arg(long, value_name = "PATH")]
        kernel: PathBuf,
        /// Convolve the blue channel only and write it as gray.
        #[arg(long)]
        grayscale: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ChannelArg {
    Blue,
    Green,
    Red,
}

impl From<ChannelArg> for Channel {
    fn from(arg: ChannelArg) -> Self {
        match arg {
            ChannelArg::Blue => Channel::Blue,
            ChannelArg::Green => Channel::Green,
            ChannelArg::Red => Channel::Red,
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let input = codec::open(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    info!(
        "loaded {} ({}x{})",
        args.input.display(),
        input.width(),
        input.height()
    );

    let config = ProcessingConfig::new().with_threads(args.threads);
    let (output, mask) = config
        .install(|| run(&args.command, &input))
        .context("failed to start worker pool")??;

    write(&output, &args.output)?;
    if let (Some(mask), Some(path)) = (mask, mask_path(&args.command)) {
        write(&mask, path)?;
    }
    Ok(())
}

/// Run the selected kernel; noise commands also return their mask.
fn run(command: &Command, input: &PixelBuffer) -> Result<(PixelBuffer, Option<PixelBuffer>)> {
    let output = match command {
        Command::GrayAverage => grayscale_average(input)?,
        Command::GrayWeighted => grayscale_weighted(input)?,
        Command::Invert => invert(input)?,
        Command::Channel { channel } => extract_channel(input, (*channel).into())?,
        Command::RotateLeft => rotate_left(input)?,
        Command::RotateRight => rotate_right(input)?,
        Command::FlipVertical => flip_vertical(input)?,
        Command::FlipHorizontal => flip_horizontal(input)?,
        Command::Scale { factor } => scale_bilinear(input, *factor)?,
        Command::Mosaic { cell_size } => mosaic(input, *cell_size)?,
        Command::SaltPepper { intensity, noise } => {
            let result = match noise.seed {
                Some(seed) => {
                    salt_and_pepper_noise_with_rng(input, *intensity, &mut StdRng::seed_from_u64(seed))?
                }
                None => salt_and_pepper_noise(input, *intensity)?,
            };
            return Ok((result.image, Some(result.mask)));
        }
        Command::Gaussian {
            sigma,
            skip_trailing,
            noise,
        } => {
            let trailing = if *skip_trailing {
                TrailingPixel::Skip
            } else {
                TrailingPixel::Perturb
            };
            let config = GaussianNoiseConfig::new(*sigma).with_trailing(trailing);
            let result = match noise.seed {
                Some(seed) => gaussian_noise_with(input, &config, &mut StdRng::seed_from_u64(seed))?,
                None => gaussian_noise_with(input, &config, &mut rand::rng())?,
            };
            return Ok((result.image, Some(result.mask)));
        }
        Command::Equalize { grayscale: true } => equalize_grayscale(input)?,
        Command::Equalize { grayscale: false } => equalize_full_color(input)?,
        Command::Edges => edge_detect(input)?,
        Command::Smooth => smooth(input)?,
        Command::Convolve { kernel, grayscale } => {
            let text = std::fs::read_to_string(kernel)
                .with_context(|| format!("failed to read kernel {}", kernel.display()))?;
            let kernel: Kernel = serde_json::from_str(&text)
                .with_context(|| format!("invalid kernel {}", kernel.display()))?;
            if *grayscale {
                convolve_grayscale(input, &kernel)?
            } else {
                convolve_full_color(input, &kernel)?
            }
        }
    };
    Ok((output, None))
}

fn mask_path(command: &Command) -> Option<&Path> {
    match command {
        Command::SaltPepper { noise, .. } | Command::Gaussian { noise, .. } => noise.mask.as_deref(),
        _ => None,
    }
}

fn write(buffer: &PixelBuffer, path: &Path) -> Result<()> {
    codec::save(buffer, path).with_context(|| format!("failed to write {}", path.display()))?;
    info!(
        "wrote {} ({}x{})",
        path.display(),
        buffer.width(),
        buffer.height()
    );
    Ok(())
}
