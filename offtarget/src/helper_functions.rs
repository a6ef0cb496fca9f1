use std::env;
use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use tracing_subscriber::EnvFilter;

pub fn project_root() -> PathBuf {
    match env::var_os("PROJECT_ROOT") {
        Some(val) => PathBuf::from(val),
        None => {
            // Fall back to current directory if PROJECT_ROOT not set
            env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
        }
    }
}

/// `RUST_LOG` wins; otherwise `info`. Logs go to stderr so `stdout` stays
/// free for exported tables.
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();
}

/// `"stdout"` writes to the screen, anything else creates the file.
pub fn writer(output: &str) -> io::Result<Box<dyn Write>> {
    let writer: Box<dyn Write> = if output == "stdout" {
        Box::new(BufWriter::new(io::stdout()))
    } else {
        Box::new(BufWriter::new(File::create(output)?))
    };
    Ok(writer)
}

/// Whole input as text; `"stdin"` reads the standard input.
pub fn read_input(input: &str) -> io::Result<String> {
    let mut content = String::new();
    if input == "stdin" {
        io::stdin().read_to_string(&mut content)?;
    } else {
        File::open(Path::new(input))?.read_to_string(&mut content)?;
    }
    Ok(content)
}

/// File stem used to name exports and BED tracks.
pub fn display_stem(input: &str) -> String {
    if input == "stdin" {
        return "offtargets".to_string();
    }
    Path::new(input)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("offtargets")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_round_trip_through_helpers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hits.csv");
        let path_str = path.to_str().unwrap();
        {
            let mut out = writer(path_str).unwrap();
            out.write_all(b"Chr,Pos\nchr1,10\n").unwrap();
        }
        assert_eq!(read_input(path_str).unwrap(), "Chr,Pos\nchr1,10\n");
        assert!(read_input(dir.path().join("missing.csv").to_str().unwrap()).is_err());
    }

    #[test]
    fn stem_names_exports() {
        assert_eq!(display_stem("runs/guide_a.bed"), "guide_a");
        assert_eq!(display_stem("stdin"), "offtargets");
    }
}
