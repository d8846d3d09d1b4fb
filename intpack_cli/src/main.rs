use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, Subcommand};

use intpack_codecs::{
    FreshBlockCodec, GammaCodec, IdentityCodec, Lz4BlockCompressor, PoolConfig, PooledBlockCodec,
    RiceCodec, ZstdBlockCompressor,
};
use intpack_core::{atled, delta, Codec, StatsSnapshot};

// ── CLI definition ─────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "intpack",
    about = "Integer list compression — pack, unpack, and compare codecs on id lists",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress a file of u32 ids into a packed file
    ///
    /// Non-integrated codecs (gamma, rice, zstd, lz4) delta-transform the
    /// input first; gamma additionally requires the ids to be strictly
    /// ascending so every gap is positive.
    Pack {
        /// Source file: little-endian u32s, or text with --text
        input: PathBuf,
        /// Destination packed file
        output: PathBuf,
        /// Codec to use: identity | gamma | rice | zstd | lz4
        #[arg(short, long, default_value = "rice")]
        codec: String,
        /// Parse the input as text, one decimal id per line
        #[arg(long)]
        text: bool,
    },
    /// Decompress a packed file back to little-endian u32s
    Unpack {
        /// Source packed file
        input: PathBuf,
        /// Destination file of little-endian u32s
        output: PathBuf,
    },
    /// Compress the same id list with every bundled codec and print a
    /// bytes-in / bytes-out / ratio table
    Ratio {
        /// Source file: little-endian u32s, or text with --text
        input: PathBuf,
        /// Parse the input as text, one decimal id per line
        #[arg(long)]
        text: bool,
    },
}

// ── Packed file format ─────────────────────────────────────────────────────
//
//   magic "IPK1" (4 bytes)
//   codec id (1 byte)
//   value count (u32 LE)
//   unit payload (codec-specific bytes)

const MAGIC: &[u8; 4] = b"IPK1";

const ID_IDENTITY: u8 = 0;
const ID_GAMMA: u8 = 1;
const ID_RICE: u8 = 2;
const ID_ZSTD: u8 = 3;
const ID_LZ4: u8 = 4;

/// CLI-side dispatch over the bundled codecs.
///
/// The `Codec` trait has a codec-specific unit type, so the binary keeps a
/// closed enum and serializes each unit kind to bytes itself: bit-stream
/// units are already bytes, int units are written as LE words.
enum AnyCodec {
    Identity(IdentityCodec),
    Gamma(GammaCodec),
    Rice(RiceCodec),
    Zstd(PooledBlockCodec<ZstdBlockCompressor>),
    Lz4(FreshBlockCodec<Lz4BlockCompressor, fn() -> Lz4BlockCompressor>),
}

impl AnyCodec {
    fn by_name(name: &str) -> anyhow::Result<Self> {
        match name {
            "identity" | "id" | "none" => Ok(Self::Identity(IdentityCodec::new())),
            "gamma" | "g" => Ok(Self::Gamma(GammaCodec::default())),
            "rice" | "r" => Ok(Self::Rice(RiceCodec::default())),
            "zstd" | "z" => Ok(Self::Zstd(PooledBlockCodec::new(
                ZstdBlockCompressor::default,
                PoolConfig::default(),
                false,
            ))),
            "lz4" | "l" => Ok(Self::Lz4(FreshBlockCodec::new(
                || Lz4BlockCompressor,
                false,
            ))),
            other => anyhow::bail!(
                "unknown codec '{}'. Valid options: identity, gamma, rice, zstd, lz4",
                other
            ),
        }
    }

    fn by_id(id: u8) -> anyhow::Result<Self> {
        match id {
            ID_IDENTITY => Self::by_name("identity"),
            ID_GAMMA => Self::by_name("gamma"),
            ID_RICE => Self::by_name("rice"),
            ID_ZSTD => Self::by_name("zstd"),
            ID_LZ4 => Self::by_name("lz4"),
            other => anyhow::bail!("unknown codec id {} in packed file", other),
        }
    }

    fn id(&self) -> u8 {
        match self {
            Self::Identity(_) => ID_IDENTITY,
            Self::Gamma(_) => ID_GAMMA,
            Self::Rice(_) => ID_RICE,
            Self::Zstd(_) => ID_ZSTD,
            Self::Lz4(_) => ID_LZ4,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Identity(_) => "identity",
            Self::Gamma(_) => "gamma",
            Self::Rice(_) => "rice",
            Self::Zstd(_) => "zstd",
            Self::Lz4(_) => "lz4",
        }
    }

    fn is_integrated(&self) -> bool {
        match self {
            Self::Identity(c) => c.is_integrated(),
            Self::Gamma(c) => c.is_integrated(),
            Self::Rice(c) => c.is_integrated(),
            Self::Zstd(c) => c.is_integrated(),
            Self::Lz4(c) => c.is_integrated(),
        }
    }

    fn stats(&self) -> StatsSnapshot {
        match self {
            Self::Identity(c) => c.stats(),
            Self::Gamma(c) => c.stats(),
            Self::Rice(c) => c.stats(),
            Self::Zstd(c) => c.stats(),
            Self::Lz4(c) => c.stats(),
        }
    }

    fn compress_to_bytes(&self, input: &[u32]) -> anyhow::Result<Vec<u8>> {
        let bytes = match self {
            Self::Identity(c) => words_to_bytes(&c.compress(input)?),
            Self::Gamma(c) => c.compress(input)?,
            Self::Rice(c) => c.compress(input)?,
            Self::Zstd(c) => words_to_bytes(&c.compress(input)?),
            Self::Lz4(c) => words_to_bytes(&c.compress(input)?),
        };
        Ok(bytes)
    }

    fn decompress_from_bytes(&self, payload: &[u8], output: &mut [u32]) -> anyhow::Result<()> {
        match self {
            Self::Identity(c) => {
                c.decompress(&bytes_to_words(payload)?, output)?;
            }
            Self::Gamma(c) => {
                c.decompress(&payload.to_vec(), output)?;
            }
            Self::Rice(c) => {
                c.decompress(&payload.to_vec(), output)?;
            }
            Self::Zstd(c) => {
                c.decompress(&bytes_to_words(payload)?, output)?;
            }
            Self::Lz4(c) => {
                c.decompress(&bytes_to_words(payload)?, output)?;
            }
        }
        Ok(())
    }
}

// ── Helpers ────────────────────────────────────────────────────────────────

fn words_to_bytes(words: &[u32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(words.len() * 4);
    for w in words {
        bytes.extend_from_slice(&w.to_le_bytes());
    }
    bytes
}

fn bytes_to_words(bytes: &[u8]) -> anyhow::Result<Vec<u32>> {
    if bytes.len() % 4 != 0 {
        anyhow::bail!("payload length {} is not a multiple of 4", bytes.len());
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}

fn read_ids(path: &PathBuf, text: bool) -> anyhow::Result<Vec<u32>> {
    let raw = fs::read(path).with_context(|| format!("reading input file {:?}", path))?;
    if text {
        let mut ids = Vec::new();
        for (lineno, line) in String::from_utf8_lossy(&raw).lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let id: u32 = line
                .parse()
                .with_context(|| format!("line {}: invalid id '{}'", lineno + 1, line))?;
            ids.push(id);
        }
        Ok(ids)
    } else {
        bytes_to_words(&raw)
    }
}

fn human_bytes(n: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut v = n as f64;
    let mut unit = 0;
    while v >= 1024.0 && unit < UNITS.len() - 1 {
        v /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} B", n)
    } else {
        format!("{:.2} {}", v, UNITS[unit])
    }
}

// ── Subcommand implementations ─────────────────────────────────────────────

fn run_pack(input: PathBuf, output: PathBuf, codec_name: &str, text: bool) -> anyhow::Result<()> {
    let codec = AnyCodec::by_name(codec_name)?;
    let mut ids = read_ids(&input, text)?;
    let count = ids.len();

    let t0 = Instant::now();
    if !codec.is_integrated() {
        delta(&mut ids);
    }
    let payload = codec
        .compress_to_bytes(&ids)
        .with_context(|| format!("compressing {} ids with {}", count, codec.name()))?;
    let elapsed = t0.elapsed();

    let mut packed = Vec::with_capacity(9 + payload.len());
    packed.extend_from_slice(MAGIC);
    packed.push(codec.id());
    packed.extend_from_slice(&(count as u32).to_le_bytes());
    packed.extend_from_slice(&payload);
    fs::write(&output, &packed).with_context(|| format!("writing output file {:?}", output))?;

    let stats = codec.stats();
    eprintln!("  codec       : {}", codec.name());
    eprintln!("  values      : {}", count);
    eprintln!("  raw size    : {}", human_bytes(stats.bytes_in));
    eprintln!("  compressed  : {}", human_bytes(stats.bytes_out));
    eprintln!("  ratio       : {:.2}x", stats.ratio());
    eprintln!("  elapsed     : {:.3}s", elapsed.as_secs_f64());
    Ok(())
}

fn run_unpack(input: PathBuf, output: PathBuf) -> anyhow::Result<()> {
    let packed = fs::read(&input).with_context(|| format!("reading packed file {:?}", input))?;
    if packed.len() < 9 || &packed[..4] != MAGIC {
        anyhow::bail!("{:?} is not an intpack file (bad magic)", input);
    }
    let codec = AnyCodec::by_id(packed[4])?;
    let count = u32::from_le_bytes([packed[5], packed[6], packed[7], packed[8]]) as usize;
    let payload = &packed[9..];

    let mut ids = vec![0u32; count];
    codec
        .decompress_from_bytes(payload, &mut ids)
        .with_context(|| format!("decompressing {} ids with {}", count, codec.name()))?;
    if !codec.is_integrated() {
        atled(&mut ids);
    }

    fs::write(&output, words_to_bytes(&ids))
        .with_context(|| format!("writing output file {:?}", output))?;
    eprintln!("  codec       : {}", codec.name());
    eprintln!("  values      : {}", count);
    Ok(())
}

fn run_ratio(input: PathBuf, text: bool) -> anyhow::Result<()> {
    let ids = read_ids(&input, text)?;
    println!("=== {} values from {:?} ===", ids.len(), input);
    println!();
    println!(
        "  {:<10}  {:>12}  {:>12}  {:>8}",
        "codec", "raw", "compressed", "ratio"
    );
    println!("  {}", "-".repeat(48));

    for name in ["identity", "gamma", "rice", "zstd", "lz4"] {
        let codec = AnyCodec::by_name(name)?;
        let mut block = ids.clone();
        if !codec.is_integrated() {
            delta(&mut block);
        }
        match codec.compress_to_bytes(&block) {
            Ok(_) => {
                let stats = codec.stats();
                println!(
                    "  {:<10}  {:>12}  {:>12}  {:>7.2}x",
                    name,
                    human_bytes(stats.bytes_in),
                    human_bytes(stats.bytes_out),
                    stats.ratio()
                );
            }
            // Gamma rejects zero gaps (duplicate or unsorted ids); report
            // instead of aborting the whole table.
            Err(e) => println!("  {:<10}  {}", name, e),
        }
    }
    Ok(())
}

// ── Entry point ────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Pack {
            input,
            output,
            codec,
            text,
        } => run_pack(input, output, &codec, text),
        Commands::Unpack { input, output } => run_unpack(input, output),
        Commands::Ratio { input, text } => run_ratio(input, text),
    }
}
