use clap::Parser;
use maxp_subset::subset;
use std::path::PathBuf;

/// Rewrites the maxp table of a font for a subset of its glyphs.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// The input font file.
    input: PathBuf,

    /// The output font file.
    #[arg(default_value = "res.otf")]
    output: PathBuf,

    /// Glyph IDs to keep, e.g. `3,6,10-20`, or `*` for all.
    #[arg(short, long, default_value = "0-5")]
    gids: String,

    /// The index of the font in a collection.
    #[arg(short, long, default_value_t = 0)]
    index: u32,
}

fn parse_gids(gids: &str) -> Result<Vec<u16>, String> {
    if gids == "*" {
        return Ok((0..u16::MAX).collect());
    }

    let mut parsed = vec![];
    let number = |s: &str| {
        s.trim().parse::<u16>().map_err(|_| format!("invalid glyph id: {s:?}"))
    };

    for el in gids.split(',').filter(|s| !s.is_empty()) {
        match el.split_once('-') {
            Some((first, second)) => {
                let (first, second) = (number(first)?, number(second)?);
                if first > second {
                    return Err(format!("invalid glyph range: {el:?}"));
                }
                parsed.extend(first..=second);
            }
            None => parsed.push(number(el)?),
        }
    }

    Ok(parsed)
}

// Note that this is more of an experimental CLI used for testing.
fn main() {
    env_logger::init();
    let args = Args::parse();

    let gids = match parse_gids(&args.gids) {
        Ok(gids) => gids,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    let data = match std::fs::read(&args.input) {
        Ok(data) => data,
        Err(e) => {
            eprintln!("failed to read {}: {e}", args.input.display());
            std::process::exit(1);
        }
    };

    let sub = match subset(&data, args.index, &gids) {
        Ok(sub) => sub,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    log::info!("{} -> {} bytes", data.len(), sub.len());

    if let Err(e) = std::fs::write(&args.output, sub) {
        eprintln!("failed to write {}: {e}", args.output.display());
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gid_lists() {
        assert_eq!(parse_gids("3"), Ok(vec![3]));
        assert_eq!(parse_gids("3,6,8"), Ok(vec![3, 6, 8]));
        assert_eq!(parse_gids("10-13,2"), Ok(vec![10, 11, 12, 13, 2]));
        assert_eq!(parse_gids("1,,2,"), Ok(vec![1, 2]));
        assert_eq!(parse_gids("*").map(|gids| gids.len()), Ok(65535));
    }

    #[test]
    fn invalid_gid_lists() {
        assert!(parse_gids("a").is_err());
        assert!(parse_gids("5-2").is_err());
        assert!(parse_gids("1-").is_err());
        assert!(parse_gids("70000").is_err());
    }
}
