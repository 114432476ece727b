//! Deterministic, offline HTML renderer (no external assets, no templating
//! engine). Builds the document by hand through [`HtmlBuilder`], the way the
//! rest of this crate favors explicit section methods over a general-purpose
//! templating dependency.

#![cfg(feature = "render_html")]

use std::fmt::Write as _;

use crate::{ElementCount, ReportModel, ViolationRow};

/// Escape text for HTML.
fn esc(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Format a non-negative integer with a narrow no-break space (U+202F)
/// thousands separator, so large stall/unit counts never wrap mid-number.
fn fmt_int(n: u32) -> String {
    let mut x = n as u64;
    let mut buf = [0u8; 24];
    let mut i = buf.len();
    let mut digits = 0usize;

    if x == 0 {
        return "0".to_string();
    }

    while x > 0 {
        if digits > 0 && digits % 3 == 0 {
            i -= 3;
            buf[i..i + 3].copy_from_slice(&[0xE2, 0x80, 0xAF]);
        }
        let d = (x % 10) as u8;
        i -= 1;
        buf[i] = b'0' + d;
        x /= 10;
        digits += 1;
    }
    String::from_utf8(buf[i..].to_vec()).unwrap()
}

fn fmt_f64(x: f64) -> String {
    format!("{:.1}", x)
}

pub struct HtmlBuilder {
    buf: String,
}

impl HtmlBuilder {
    pub fn new() -> Self {
        Self { buf: String::with_capacity(16 * 1024) }
    }

    fn start(&mut self, title: &str) {
        let _ = write!(
            self.buf,
            "<!doctype html><html lang=\"en\"><head><meta charset=\"utf-8\">\
             <meta name=\"viewport\" content=\"width=device-width,initial-scale=1\">\
             <title>{}</title>\
             <style>\
             body{{font-family:system-ui,-apple-system,Segoe UI,Roboto,Ubuntu,Arial,sans-serif;margin:24px;}}\
             h1,h2,h3{{margin:0.2em 0;}}\
             .grid{{display:grid;grid-template-columns:repeat(3,minmax(0,1fr));gap:8px}}\
             .pill{{display:inline-block;padding:.2em .6em;border-radius:9999px;background:#eee}}\
             table{{border-collapse:collapse}}\
             td,th{{padding:4px 8px;border-bottom:1px solid #ddd;text-align:left}}\
             </style></head><body>",
            esc(title),
        );
    }

    fn finish(mut self) -> String {
        self.buf.push_str("</body></html>");
        self.buf
    }

    fn section_cover(&mut self, title: &str, compliant: bool, score: &str) {
        let _ = write!(
            self.buf,
            "<h1>{}</h1><p><b>Zoning compliant:</b> {} &nbsp;|&nbsp; <b>Score:</b> {}</p>",
            esc(title),
            if compliant { "yes" } else { "no" },
            esc(score),
        );
    }

    fn section_layout(&mut self, m: &crate::LayoutSection) {
        let _ = write!(
            self.buf,
            "<h2>Layout</h2><div class=\"grid\">\
               <div><div class=\"pill\">FAR</div><div><b>{:.2}</b></div></div>\
               <div><div class=\"pill\">Coverage</div><div><b>{}%</b></div></div>\
               <div><div class=\"pill\">Parking ratio</div><div><b>{:.2}</b></div></div>\
               <div><div class=\"pill\">Units</div><div><b>{}</b></div></div>\
               <div><div class=\"pill\">Open space</div><div><b>{}%</b></div></div>\
               <div><div class=\"pill\">Stalls</div><div><b>{} / {}</b></div></div>\
             </div><p class=\"muted\">{}</p>",
            m.far,
            esc(&m.coverage_pct_1dp),
            m.parking_ratio,
            fmt_int(m.achieved_units),
            esc(&m.open_space_pct_1dp),
            fmt_int(m.stalls_provided),
            fmt_int(m.stalls_required),
            esc(&m.unit_mix_summary),
        );
    }

    fn section_feasibility(&mut self, compliant: bool, violations: &[ViolationRow], warnings: &[ViolationRow]) {
        let _ = write!(
            self.buf,
            "<h2>Feasibility</h2><p><b>Pass:</b> {}</p>",
            if compliant { "yes" } else { "no" },
        );
        self.violation_table("Violations", violations);
        self.violation_table("Warnings", warnings);
    }

    fn violation_table(&mut self, title: &str, rows: &[ViolationRow]) {
        if rows.is_empty() {
            return;
        }
        let _ = write!(self.buf, "<h3>{}</h3><table><thead><tr><th>Code</th><th>Message</th><th>Δ</th></tr></thead><tbody>", esc(title));
        for r in rows {
            let _ = write!(
                self.buf,
                "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
                esc(&r.code),
                esc(&r.message),
                r.delta.map(fmt_f64).unwrap_or_default(),
            );
        }
        self.buf.push_str("</tbody></table>");
    }

    fn section_proforma(&mut self, p: &crate::ProFormaSection) {
        let _ = write!(
            self.buf,
            "<h2>Pro forma</h2><div class=\"grid\">\
               <div><div class=\"pill\">Dev cost</div><div><b>${:.0}</b></div></div>\
               <div><div class=\"pill\">Cost / unit</div><div><b>${:.0}</b></div></div>\
               <div><div class=\"pill\">NOI</div><div><b>${:.0}</b></div></div>\
               <div><div class=\"pill\">Yield on cost</div><div><b>{}%</b></div></div>\
               <div><div class=\"pill\">Profit</div><div><b>${:.0}</b></div></div>\
               <div><div class=\"pill\">Cash on cash</div><div><b>{}%</b></div></div>\
             </div>",
            p.total_development_cost,
            p.cost_per_unit,
            p.noi,
            esc(&p.yield_on_cost_pct_1dp),
            p.profit,
            esc(&p.cash_on_cash_pct_1dp),
        );
    }

    fn section_scene(&mut self, counts: &[ElementCount], total_area: f64) {
        let _ = write!(self.buf, "<h2>Scene</h2><p>Total area: {:.0} sq ft</p><table><thead><tr><th>Kind</th><th>Count</th><th>Area (sq ft)</th></tr></thead><tbody>", total_area);
        for c in counts {
            let _ = write!(
                self.buf,
                "<tr><td>{}</td><td>{}</td><td>{:.0}</td></tr>",
                esc(&c.kind),
                fmt_int(c.count),
                c.area_sq_ft,
            );
        }
        self.buf.push_str("</tbody></table>");
    }

    fn section_integrity(&mut self, integ: &crate::IntegritySection) {
        let _ = write!(
            self.buf,
            "<h2>Integrity</h2><p><b>Engine:</b> {}/{} v{}<br><b>Seed:</b> {}<br><b>Iterations:</b> {}</p>",
            esc(&integ.engine_vendor),
            esc(&integ.engine_name),
            esc(&integ.engine_version),
            integ.seed_used,
            fmt_int(integ.iterations.min(u32::MAX as u64) as u32),
        );
    }
}

impl Default for HtmlBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn render_html(model: &ReportModel) -> String {
    let mut h = HtmlBuilder::new();
    h.start(&model.cover.title);
    h.section_cover(&model.cover.title, model.cover.zoning_compliant, &model.cover.final_score_1dp);
    h.section_layout(&model.layout);
    h.section_feasibility(model.feasibility.compliant, &model.feasibility.violations, &model.feasibility.warnings);
    if let Some(p) = &model.proforma {
        h.section_proforma(p);
    }
    h.section_scene(&model.scene.element_counts, model.scene.total_area_sq_ft);
    h.section_integrity(&model.integrity);
    h.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CoverSection, FeasibilitySection, IntegritySection, LayoutSection, SceneSection};

    fn model() -> ReportModel {
        ReportModel {
            cover: CoverSection { title: "Site Plan Report".into(), zoning_compliant: false, final_score_1dp: "0.6".into() },
            layout: LayoutSection {
                far: 1.5,
                coverage_pct_1dp: "40.0".into(),
                parking_ratio: 1.0,
                achieved_units: 50,
                unit_mix_summary: "mix".into(),
                open_space_pct_1dp: "20.0".into(),
                parking_angle_deg: 60.0,
                stalls_provided: 50,
                stalls_required: 48,
            },
            feasibility: FeasibilitySection {
                compliant: false,
                violations: vec![ViolationRow { code: "far_exceeded".into(), message: "FAR 2.2 > 2.0".into(), delta: Some(0.2), severity: "error".into() }],
                warnings: vec![],
            },
            proforma: None,
            scene: SceneSection { element_counts: vec![], total_area_sq_ft: 0.0 },
            integrity: IntegritySection {
                engine_vendor: "sf-engine".into(),
                engine_name: "sf".into(),
                engine_version: "0.1.0".into(),
                seed_used: 7,
                iterations: 100,
            },
        }
    }

    #[test]
    fn render_html_escapes_violation_messages() {
        let mut m = model();
        m.feasibility.violations[0].message = "<script>".into();
        let html = render_html(&m);
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn render_html_omits_proforma_section_when_absent() {
        let html = render_html(&model());
        assert!(!html.contains("Pro forma"));
    }
}
