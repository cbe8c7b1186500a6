use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufWriter, Write};
use std::path::PathBuf;

use clap::Parser;
use memmap2::Mmap;

use concurrent_heavykeeper::{Config, TopK, TopKError};

/// Prints the K most frequent whitespace-separated tokens of the input.
#[derive(Parser, Debug)]
#[command(name = "topk-hk", version, about)]
struct Args {
    /// Input file; reads stdin when omitted
    #[arg(short = 'f', long = "file")]
    file: Option<PathBuf>,

    /// Number of top values to find
    #[arg(short = 'k', default_value_t = 10)]
    k: usize,

    /// Buckets per row; more memory, more accurate results
    #[arg(short = 'w', long, default_value_t = 2048)]
    width: usize,

    /// Number of rows in the sketch
    #[arg(short = 'd', long, default_value_t = 5)]
    depth: usize,

    /// Probability decay base
    #[arg(short = 'p', long, default_value_t = 0.9)]
    decay: f64,

    /// Number of ingestion workers
    #[arg(long, default_value_t = 4)]
    workers: usize,

    /// Hash seed; random when omitted
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();

    let seed = args.seed.unwrap_or_else(rand::random);
    let config = Config::new(
        args.k,
        args.width,
        args.depth,
        args.decay,
        seed,
        args.workers,
    );
    let topk = TopK::new(config)?;

    match &args.file {
        Some(path) => {
            let file = File::open(path)?;
            // SAFETY: the file is only read, and is not expected to be
            // truncated while the map is alive
            let data = unsafe { Mmap::map(&file)? };
            add_tokens(&topk, &data)?;
        }
        None => {
            // split on newlines only so a token never straddles two chunks
            for line in io::stdin().lock().split(b'\n') {
                add_tokens(&topk, &line?)?;
            }
        }
    }

    topk.drain();

    let mut out = BufWriter::new(io::stdout().lock());
    for node in topk.list() {
        writeln!(out, "{} {}", String::from_utf8_lossy(&node.item), node.count)?;
    }
    out.flush()?;
    Ok(())
}

/// Tokens are runs of bytes between ASCII whitespace; input need not be UTF-8.
fn tokens(data: &[u8]) -> impl Iterator<Item = &[u8]> {
    data.split(u8::is_ascii_whitespace).filter(|t| !t.is_empty())
}

fn add_tokens(topk: &TopK, data: &[u8]) -> Result<(), TopKError> {
    for token in tokens(data) {
        topk.add(token)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_split_on_ascii_whitespace() {
        let data = b"  a\tbb\r\n\x0cccc  a ";
        let tokens: Vec<&[u8]> = tokens(data).collect();
        assert_eq!(tokens, vec![&b"a"[..], b"bb", b"ccc", b"a"]);
    }

    #[test]
    fn test_tokens_keep_invalid_utf8() {
        let data = b"\xff\xfe x\xc3 \xff\xfe";
        let tokens: Vec<&[u8]> = tokens(data).collect();
        assert_eq!(tokens, vec![&b"\xff\xfe"[..], b"x\xc3", b"\xff\xfe"]);
    }

    #[test]
    fn test_add_tokens_counts_raw_bytes() {
        let topk = TopK::new(Config::new(2, 64, 4, 0.9, 7, 1)).unwrap();
        add_tokens(&topk, b"\xff\xfe x\n\xff\xfe").unwrap();
        topk.drain();
        assert_eq!(topk.count(&b"\xff\xfe"[..]), Some(2));
        assert_eq!(topk.count("x"), Some(1));
    }
}
