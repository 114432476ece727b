// crates/sf_cli/src/main.rs
//
// Site-planning engine CLI — drives compute_envelope -> optimize/evaluate
// end-to-end, writes a canonical report artifact, and (optionally) renders
// it as JSON/HTML. Strictly offline & deterministic: no network, no OS RNG
// beyond the one-time seed draw `sf_pipeline::optimize_layout` makes when
// none is given.

mod args;

use args::{parse_and_validate, Args, CliError};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use sf_core::model::{BuildingSpec, Metrics, ProFormaResult, Scene};

#[cfg(feature = "report-json")]
use sf_report::render_json as render_json_report;
#[cfg(feature = "report-html")]
use sf_report::render_html as render_html_report;

const REPORT_JSON_FILE: &str = "report.json";
const REPORT_HTML_FILE: &str = "report.html";
const REPORT_HASH_FILE: &str = "report.sha256";

fn main() -> ExitCode {
    env_logger::init();

    let args = match parse_and_validate() {
        Ok(a) => a,
        Err(e) => {
            eprintln!("siteplan: error: {e}");
            return ExitCode::from(1);
        }
    };

    match run(args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("siteplan: error: {e}");
            ExitCode::from(1)
        }
    }
}

struct RunOutputs {
    scene: Scene,
    metrics: Metrics,
    proforma: Option<ProFormaResult>,
    seed_used: u64,
    iterations: u64,
    final_score: f64,
}

/// Run the whole orchestration. Returns the process exit code per policy.
fn run(args: Args) -> Result<ExitCode, String> {
    let parcel = sf_io::parcel::load_parcel_geojson(&args.parcel)
        .map_err(|e| format!("cannot load parcel {}: {e}", args.parcel.display()))?;
    let roads = match &args.roads {
        Some(p) => sf_io::parcel::load_roads_geojson(p)
            .map_err(|e| format!("cannot load roads {}: {e}", p.display()))?,
        None => Vec::new(),
    };
    let config = sf_io::config::load_plan_config(&args.config)
        .map_err(|e| format!("cannot load config {}: {e}", args.config.display()))?;

    if args.validate_only {
        if !args.quiet {
            println!("siteplan: parcel, roads, and config all parse and validate");
        }
        return Ok(ExitCode::from(0));
    }

    fs::create_dir_all(&args.out)
        .map_err(|e| format!("cannot create output directory {}: {e}", args.out.display()))?;

    let envelope = sf_pipeline::compute_envelope(&parcel, &roads, &config.zoning)
        .map_err(|e| format!("compute_envelope failed: {e}"))?;

    let outputs = if let Some(buildings_path) = &args.buildings {
        let buildings = load_buildings(buildings_path)?;
        let outcome = sf_pipeline::evaluate(&envelope, &roads, &buildings, &config.zoning, &config.design)
            .map_err(|e| format!("evaluate failed: {e}"))?;
        RunOutputs {
            scene: outcome.scene,
            metrics: outcome.metrics,
            proforma: outcome.proforma,
            seed_used: 0,
            iterations: 0,
            final_score: outcome.score,
        }
    } else {
        let seed = args.seed.as_deref().map(args::parse_seed_u64).transpose().map_err(|e| e.to_string())?;
        let mut progress_cb = |iter: u64, score: f64| {
            if !args.quiet {
                log::info!("optimize: iteration {iter}, score {score:.4}");
            }
        };
        let progress: Option<&mut dyn FnMut(u64, f64)> = if args.quiet { None } else { Some(&mut progress_cb) };
        let outcome = sf_pipeline::optimize_layout(
            &envelope,
            &roads,
            &config.zoning,
            &config.design,
            seed,
            args.max_iterations,
            None,
            progress,
        )
        .map_err(|e| format!("optimize failed: {e}"))?;
        RunOutputs {
            scene: outcome.best_scene,
            metrics: outcome.best_metrics,
            proforma: outcome.best_proforma,
            seed_used: outcome.seed_used,
            iterations: outcome.iterations,
            final_score: outcome.final_score,
        }
    };

    write_artifacts(&args.out, &outputs)?;

    if !args.render.is_empty() {
        render_reports(&args.out, &outputs, &args.render)?;
    }

    if !args.quiet {
        println!("siteplan: completed — zoning_compliant={}", outputs.metrics.zoning_compliant);
        println!("siteplan: far={:.3} units={} stalls={}/{}",
            outputs.metrics.far, outputs.metrics.achieved_units,
            outputs.metrics.stalls_provided, outputs.metrics.stalls_required);
        println!("siteplan: artifacts written to {}", args.out.display());
    }

    let code = if outputs.metrics.cancelled {
        ExitCode::from(2)
    } else if outputs.metrics.zoning_compliant {
        ExitCode::from(0)
    } else {
        ExitCode::from(3)
    };
    Ok(code)
}

fn load_buildings(path: &Path) -> Result<Vec<BuildingSpec>, String> {
    let raw = fs::read_to_string(path).map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    serde_json::from_str(&raw).map_err(|e| format!("cannot parse {} as a building list: {e}", path.display()))
}

/// Stamp the run with a SHA-256 of the report model's canonical (sorted-key)
/// form, so a caller can confirm two runs over the same seed produced
/// byte-identical output without depending on the report's declared
/// field ordering, which `sf_report`'s renderers keep stable for display
/// rather than for hashing.
fn write_artifacts(out_dir: &Path, outputs: &RunOutputs) -> Result<(), String> {
    #[cfg(feature = "report-json")]
    {
        let model = sf_report::build_model(
            &outputs.metrics,
            outputs.proforma.as_ref(),
            &outputs.scene,
            outputs.seed_used,
            outputs.iterations,
            outputs.final_score,
        );
        let hash = sf_io::hasher::sha256_canonical(&model).map_err(|e| format!("hash report model: {e}"))?;
        write_bytes_atomically(&out_dir.join(REPORT_HASH_FILE), hash.as_bytes())
            .map_err(|e| format!("write {}: {e}", REPORT_HASH_FILE))?;
    }
    #[cfg(not(feature = "report-json"))]
    {
        let _ = out_dir;
    }
    Ok(())
}

fn render_reports(out_dir: &Path, outputs: &RunOutputs, formats: &[String]) -> Result<(), String> {
    let model = sf_report::build_model(
        &outputs.metrics,
        outputs.proforma.as_ref(),
        &outputs.scene,
        outputs.seed_used,
        outputs.iterations,
        outputs.final_score,
    );

    for fmt in formats {
        match fmt.as_str() {
            #[cfg(feature = "report-json")]
            "json" => {
                let s = render_json_report(&model).map_err(|_| "failed to serialize report model".to_string())?;
                write_bytes_atomically(&out_dir.join(REPORT_JSON_FILE), s.as_bytes())
                    .map_err(|e| format!("write {}: {e}", REPORT_JSON_FILE))?;
            }
            #[cfg(feature = "report-html")]
            "html" => {
                let s = render_html_report(&model);
                write_bytes_atomically(&out_dir.join(REPORT_HTML_FILE), s.as_bytes())
                    .map_err(|e| format!("write {}: {e}", REPORT_HTML_FILE))?;
            }
            other => eprintln!("siteplan: warning: unknown or disabled --render format: {other}"),
        }
    }
    Ok(())
}

/// Write bytes with a single trailing LF and atomic rename.
fn write_bytes_atomically(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let tmp = tmp_path_for(path);
    {
        let mut f = fs::File::create(&tmp)?;
        f.write_all(bytes)?;
        if !bytes.last().is_some_and(|b| *b == b'\n') {
            f.write_all(b"\n")?;
        }
        f.sync_all()?;
    }
    fs::rename(&tmp, path)?;
    Ok(())
}

fn tmp_path_for(final_path: &Path) -> PathBuf {
    let mut s = final_path.as_os_str().to_owned();
    s.push(".tmp");
    PathBuf::from(s)
}
