// crates/sf_cli/src/args.rs
//
// Deterministic, offline CLI argument parsing & validation.
// - No networked paths (reject http/https schemes)
// - --buildings selects the explicit-evaluate mode and conflicts with
//   --seed/--max-iterations, which only make sense for the SA search
// - Optional seed parsing (u64 decimal or 0x-hex up to 16 nybbles)
// - Light config "quick-check" without pulling the full schema validation

use clap::Parser;
use std::{
    env,
    fs,
    io::Read,
    path::{Path, PathBuf},
};

#[derive(Debug, Parser)]
pub struct Args {
    /// Parcel boundary, GeoJSON Polygon or MultiPolygon.
    #[arg(long)]
    pub parcel: PathBuf,

    /// Adjacent road edges, GeoJSON LineString features (optional).
    #[arg(long)]
    pub roads: Option<PathBuf>,

    /// Zoning limits + design parameters, JSON (PlanConfig shape).
    #[arg(long)]
    pub config: PathBuf,

    /// Explicit building layout to score; when given, skips the SA search
    /// and runs a single full-scoring evaluation instead.
    #[arg(long, conflicts_with_all = ["seed", "max_iterations"])]
    pub buildings: Option<PathBuf>,

    // Output & rendering
    #[arg(long, default_value = ".")]
    pub out: PathBuf,
    #[arg(long, value_parser = ["json", "html"], num_args = 0..=2)]
    pub render: Vec<String>,

    // Determinism & control
    /// Optimizer RNG seed; accepts decimal u64 or 0x-prefixed hex (<=16 hex digits).
    #[arg(long)]
    pub seed: Option<String>,
    #[arg(long)]
    pub max_iterations: Option<u64>,
    #[arg(long)]
    pub validate_only: bool,
    #[arg(long)]
    pub quiet: bool,
}

#[derive(Debug)]
pub enum CliError {
    Missing(&'static str),
    NonLocalPath(String),
    NotFound(String),
    BadSeed(String),
    ConfigQuick(String),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use CliError::*;
        match self {
            Missing(s) => write!(f, "missing required flag: {}", s),
            NonLocalPath(p) => write!(f, "path must be local file (no scheme): {}", p),
            NotFound(p) => write!(f, "file not found: {}", p),
            BadSeed(s) => write!(f, "invalid seed: {}", s),
            ConfigQuick(s) => write!(f, "config quick-check failed: {}", s),
        }
    }
}
impl std::error::Error for CliError {}

/// Entry point used by main.rs
pub fn parse_and_validate() -> Result<Args, CliError> {
    let mut args = Args::parse();

    if args.render.is_empty() {
        args.render.push("json".to_string());
    }

    ensure_local_exists(&args.parcel, "--parcel")?;
    ensure_local_exists(&args.config, "--config")?;
    if let Some(p) = &args.roads {
        ensure_local_exists(p, "--roads")?;
    }
    if let Some(p) = &args.buildings {
        ensure_local_exists(p, "--buildings")?;
    }

    quick_check_config_path(&args.config)?;

    args.out = normalize_path(&args.out);
    args.parcel = normalize_path(&args.parcel);
    args.config = normalize_path(&args.config);
    args.roads = args.roads.as_ref().map(normalize_path);
    args.buildings = args.buildings.as_ref().map(normalize_path);

    if let Some(s) = &args.seed {
        let _ = parse_seed_u64(s)?;
    }

    Ok(args)
}

/// Ensure a path is local (no scheme) and exists as a file.
fn ensure_local_exists(p: &PathBuf, label: &'static str) -> Result<(), CliError> {
    let s = p.to_string_lossy().to_string();
    if has_scheme(&s) {
        return Err(CliError::NonLocalPath(format!("{} {}", label, s)));
    }
    let meta = fs::metadata(p).map_err(|_| CliError::NotFound(format!("{} {}", label, s)))?;
    if !meta.is_file() {
        return Err(CliError::NotFound(format!("{} {}", label, s)));
    }
    Ok(())
}

/// Best-effort normalization to an absolute canonical path.
fn normalize_path(p: &PathBuf) -> PathBuf {
    fs::canonicalize(p).unwrap_or_else(|_| {
        if p.is_absolute() {
            p.clone()
        } else {
            env::current_dir().unwrap_or_else(|_| PathBuf::from(".")).join(p)
        }
    })
}

/// Parse seed as u64: decimal or 0x-hex (1..=16 nybbles).
pub fn parse_seed_u64(s: &str) -> Result<u64, CliError> {
    if let Some(rest) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        if rest.is_empty() || rest.len() > 16 || !rest.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(CliError::BadSeed(s.to_string()));
        }
        u64::from_str_radix(rest, 16).map_err(|_| CliError::BadSeed(s.to_string()))
    } else {
        if !s.chars().all(|c| c.is_ascii_digit()) {
            return Err(CliError::BadSeed(s.to_string()));
        }
        s.parse::<u64>().map_err(|_| CliError::BadSeed(s.to_string()))
    }
}

/// Lightweight shape check on the plan config, run before the full
/// `sf_io::config` validation so a malformed file fails fast:
/// - "zoning" and "design" keys present
/// - reject any "http://" or "https://" substrings anywhere (offline only)
fn quick_check_config_path(path: &Path) -> Result<(), CliError> {
    let mut f = fs::File::open(path).map_err(|_| CliError::NotFound(path.display().to_string()))?;
    let mut buf = Vec::new();
    const MAX_BYTES: usize = 4 * 1024 * 1024;
    f.take(MAX_BYTES as u64)
        .read_to_end(&mut buf)
        .map_err(|_| CliError::ConfigQuick("cannot read config bytes".into()))?;
    quick_check_config_bytes(&buf)
}

pub fn quick_check_config_bytes(bytes: &[u8]) -> Result<(), CliError> {
    let text = std::str::from_utf8(bytes)
        .map_err(|_| CliError::ConfigQuick("config must be UTF-8 JSON".into()))?;

    if !text.contains("\"zoning\"") {
        return Err(CliError::ConfigQuick("missing zoning".into()));
    }
    if !text.contains("\"design\"") {
        return Err(CliError::ConfigQuick("missing design".into()));
    }
    if text.contains("http://") || text.contains("https://") {
        return Err(CliError::ConfigQuick("URLs are not allowed (offline only)".into()));
    }

    Ok(())
}

fn has_scheme(s: &str) -> bool {
    s.contains("://") || s.starts_with("http:") || s.starts_with("https:")
}

// ------------------------------
// Tests (light, compile-time only)
// ------------------------------
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_decimal_ok() {
        assert_eq!(parse_seed_u64("12345").unwrap(), 12_345u64);
    }
    #[test]
    fn seed_hex_ok() {
        assert_eq!(
            parse_seed_u64("0xDEADBEEFCAFE1234").unwrap(),
            0xDEADBEEFCAFE1234u64
        );
    }
    #[test]
    fn seed_bad() {
        assert!(parse_seed_u64("0x").is_err());
        assert!(parse_seed_u64("0xZZ").is_err());
        assert!(parse_seed_u64("-1").is_err());
        assert!(parse_seed_u64("0x1234567890ABCDEF12").is_err()); // >16 nybbles
    }

    #[test]
    fn quick_check_config_minimal() {
        let src = br#"{"zoning":{},"design":{}}"#;
        assert!(quick_check_config_bytes(src).is_ok());
    }

    #[test]
    fn quick_check_config_missing_design() {
        let src = br#"{"zoning":{}}"#;
        assert!(quick_check_config_bytes(src).is_err());
    }

    #[test]
    fn quick_check_config_reject_urls() {
        let src = br#"{"zoning":{},"design":{},"note":"https://example.com"}"#;
        assert!(quick_check_config_bytes(src).is_err());
    }

    #[test]
    fn non_local_path_detection() {
        assert!(has_scheme("http://x"));
        assert!(has_scheme("scheme://x"));
        assert!(!has_scheme(r"C:\file.json"));
        assert!(!has_scheme(r"/tmp/file.json"));
    }

    #[test]
    fn normalize_path_best_effort() {
        let p = PathBuf::from("does/not/exist.txt");
        let abs = normalize_path(&p);
        assert!(abs.is_absolute());
    }
}
