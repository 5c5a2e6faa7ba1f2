use std::{
    fs,
    path::{Path, PathBuf},
};

use clap::{Args, Parser, Subcommand};
use itertools::Itertools;
use log::info;

use famisprite::{
    chr_file::ChrFile,
    pal::{Color, Pal},
    Error,
};

#[derive(Debug, Parser)]
#[command(name = "famisprite")]
struct Cli {
    /// File written by commands that produce output
    #[arg(long, global = true, default_value = "./out.bin")]
    output: PathBuf,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Args)]
struct Window {
    /// Starting byte offset, decimal or 0x-prefixed hex
    #[arg(short, long, default_value = "0", value_parser = parse_offset)]
    offset: usize,
    /// Use two vertically stacked tiles (8x16 sprites)
    #[arg(short, long)]
    long: bool,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Prints the size and tile count of a CHR file
    Info { input: PathBuf },
    /// Draws the tile window at an offset
    Show {
        input: PathBuf,
        #[command(flatten)]
        window: Window,
        /// Draw glyphs without palette colors
        #[arg(long)]
        no_color: bool,
        /// Palette override as INDEX=RRGGBB, may be repeated
        #[arg(long = "color", value_parser = parse_palette_entry)]
        colors: Vec<(u8, Color)>,
    },
    /// Sets one pixel of the tile window and writes the result
    #[command(arg_required_else_help = true)]
    Paint {
        input: PathBuf,
        #[command(flatten)]
        window: Window,
        #[arg(short)]
        x: usize,
        #[arg(short)]
        y: usize,
        /// Color index (0-3)
        #[arg(short, long, value_parser = clap::value_parser!(u8).range(0..=3))]
        index: u8,
    },
    /// Fills the tile window with one color and writes the result
    #[command(arg_required_else_help = true)]
    Fill {
        input: PathBuf,
        #[command(flatten)]
        window: Window,
        /// Color index (0-3)
        #[arg(short, long, value_parser = clap::value_parser!(u8).range(0..=3))]
        index: u8,
    },
    /// Unpacks a CHR file to one byte per pixel
    Decode { input: PathBuf },
    /// Packs a file of one byte per pixel back to CHR
    Encode { input: PathBuf },
}

fn parse_offset(s: &str) -> Result<usize, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => usize::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid offset `{}`: {}", s, e))
}

fn parse_palette_entry(s: &str) -> Result<(u8, Color), String> {
    let (index, color) = s
        .split_once('=')
        .ok_or_else(|| format!("expected INDEX=RRGGBB, got `{}`", s))?;
    let index = index
        .parse::<u8>()
        .map_err(|e| format!("invalid index `{}`: {}", index, e))?;
    let color = color.parse::<Color>().map_err(|e| e.to_string())?;
    Ok((index, color))
}

fn open(input: &Path, window: &Window) -> Result<ChrFile, Error> {
    Ok(ChrFile::open(input)?.with_offset(window.offset, window.long))
}

fn print_info(input: &Path) -> Result<(), Error> {
    let file = ChrFile::open(input)?;
    println!("File:     {}", input.display());
    println!("Size:     {} bytes", file.len());
    println!("Tiles:    {}", file.tile_count());
    if file.trailing_bytes() != 0 {
        println!("Trailing: {} bytes", file.trailing_bytes());
    }
    Ok(())
}

fn show(
    input: &Path,
    window: &Window,
    color: bool,
    colors: &[(u8, Color)],
) -> Result<(), Error> {
    let file = open(input, window)?;
    let frame = file.load()?;

    let mut pal = Pal::new();
    for &(index, c) in colors {
        pal.set(c, index);
    }

    for line in frame.render(&pal, color) {
        println!("{}", line);
    }
    println!(
        "Palette: {}",
        pal.iter().enumerate().map(|(i, c)| format!("{}={}", i, c)).join(" ")
    );
    println!("Offset: {:X}", file.offset());
    Ok(())
}

fn paint(
    input: &Path,
    output: &Path,
    window: &Window,
    x: usize,
    y: usize,
    index: u8,
) -> Result<(), Error> {
    let mut file = open(input, window)?;
    let mut frame = file.load()?;
    frame.write_pixel(x, y, index)?;
    file.commit(&frame)?;
    file.save(output)?;
    println!(
        "Painted ({}, {}) at offset {:X} into `{}`",
        x,
        y,
        file.offset(),
        output.display()
    );
    Ok(())
}

fn fill(input: &Path, output: &Path, window: &Window, index: u8) -> Result<(), Error> {
    let mut file = open(input, window)?;
    let mut frame = file.load()?;
    frame.fill(index);
    file.commit(&frame)?;
    file.save(output)?;
    println!("Filled offset {:X} into `{}`", file.offset(), output.display());
    Ok(())
}

fn decode(input: &Path, output: &Path) -> Result<(), Error> {
    let file = ChrFile::open(input)?;
    let pixels = file.decode_all()?;
    fs::write(output, &pixels)?;
    info!("Wrote {} pixels to {}", pixels.len(), output.display());
    println!("Decoded {} tiles to `{}`", file.tile_count(), output.display());
    Ok(())
}

fn encode(input: &Path, output: &Path) -> Result<(), Error> {
    let pixels = fs::read(input)?;
    let file = ChrFile::from_pixels(&pixels)?;
    file.save(output)?;
    println!("Encoded {} tiles to `{}`", file.tile_count(), output.display());
    Ok(())
}

fn main() -> Result<(), Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Info { input } => print_info(input)?,
        Commands::Show {
            input,
            window,
            no_color,
            colors,
        } => show(input, window, !no_color, colors)?,
        Commands::Paint {
            input,
            window,
            x,
            y,
            index,
        } => paint(input, &cli.output, window, *x, *y, *index)?,
        Commands::Fill {
            input,
            window,
            index,
        } => fill(input, &cli.output, window, *index)?,
        Commands::Decode { input } => decode(input, &cli.output)?,
        Commands::Encode { input } => encode(input, &cli.output)?,
    }
    Ok(())
}
